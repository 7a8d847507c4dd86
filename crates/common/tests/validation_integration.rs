//! Integration tests for validation module
//!
//! Combines field validators the way resource schemas attach them.

use cxform_common::validation::{
    FieldValidator, OneOfValidator, RangeValidator, StringValidator, ValidationError,
};

/// Collects every failure for a set of named values.
fn check_all(fields: &[(&str, &str)], validator: &dyn FieldValidator<str>) -> ValidationError {
    let mut errors = ValidationError::new();
    for (field, value) in fields {
        if let Err(message) = validator.validate(value) {
            errors.add_field_error(*field, message);
        }
    }
    errors
}

#[test]
fn test_validators_as_trait_objects() {
    let validators: Vec<Box<dyn FieldValidator<str>>> = vec![
        Box::new(StringValidator::new().not_empty()),
        Box::new(OneOfValidator::new(["Inbound", "Outbound"])),
    ];

    assert!(validators.iter().all(|v| v.validate("Inbound").is_ok()));
    assert_eq!(validators.iter().filter(|v| v.validate("").is_err()).count(), 2);
}

#[test]
fn test_collects_errors_per_field() {
    let validator = StringValidator::new().not_empty().max_length(5);
    let fields = [("name", ""), ("category", "too long here"), ("ok", "fine")];
    let errors = check_all(&fields, &validator);

    assert_eq!(errors.error_count(), 2);
    assert_eq!(errors.field_errors("name")[0].message, "Value cannot be empty");
    assert!(errors.field_errors("ok").is_empty());
    assert!(errors.into_result().is_err());
}

#[test]
fn test_token_validity_range() {
    let validator = RangeValidator::new(300i64, 172_800);
    assert!(validator.validate(&86_400).is_ok());
    assert!(validator.validate(&60).is_err());
    assert_eq!(validator.validate(&172_801).unwrap_err(), "Value must be between 300 and 172800");
}

#[test]
fn test_untrimmed_whitespace_only_value() {
    let validator = StringValidator::new().not_empty().trim(false);
    assert!(validator.validate("  ").is_ok());
    assert!(StringValidator::new().not_empty().validate("  ").is_err());
}
