//! Diff suppression helpers for string attributes

use serde_json::Value;

/// Two JSON documents are equivalent when they parse to the same value,
/// regardless of whitespace or key order.
pub fn json_equivalent(old: &str, new: &str) -> bool {
    if old == new {
        return true;
    }
    match (serde_json::from_str::<Value>(old), serde_json::from_str::<Value>(new)) {
        (Ok(old), Ok(new)) => old == new,
        _ => false,
    }
}

/// Phone numbers are compared by their digits only.
pub fn phone_numbers_equivalent(old: &str, new: &str) -> bool {
    let digits = |s: &str| s.chars().filter(char::is_ascii_digit).collect::<String>();
    digits(old) == digits(new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_ignores_formatting_and_key_order() {
        assert!(json_equivalent(r#"{"a": 1, "b": [true]}"#, r#"{"b":[true],"a":1}"#));
        assert!(!json_equivalent(r#"{"a": 1}"#, r#"{"a": 2}"#));
        assert!(!json_equivalent("not json", "{}"));
    }

    #[test]
    fn test_phone_numbers_compare_digits() {
        assert!(phone_numbers_equivalent("+1 (317) 555-0100", "+13175550100"));
        assert!(!phone_numbers_equivalent("+13175550100", "+13175550101"));
    }
}
