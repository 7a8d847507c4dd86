use std::fmt::Display;

/// Checks one attribute value, returning a message on failure
pub trait FieldValidator<T: ?Sized> {
    fn validate(&self, value: &T) -> Result<(), String>;
}

/// Inclusive numeric bounds
#[derive(Debug, Clone)]
pub struct RangeValidator<T> {
    min: T,
    max: T,
}

impl<T: PartialOrd + Display> RangeValidator<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: PartialOrd + Display> FieldValidator<T> for RangeValidator<T> {
    fn validate(&self, value: &T) -> Result<(), String> {
        if *value < self.min || *value > self.max {
            return Err(format!("Value must be between {} and {}", self.min, self.max));
        }
        Ok(())
    }
}

/// Length and emptiness rules, counted in characters
#[derive(Debug, Clone)]
pub struct StringValidator {
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<regex::Regex>,
    not_empty: bool,
    trim: bool,
}

impl Default for StringValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl StringValidator {
    /// Trims surrounding whitespace before checking.
    pub const fn new() -> Self {
        Self { min_length: None, max_length: None, pattern: None, not_empty: false, trim: true }
    }

    pub const fn not_empty(mut self) -> Self {
        self.not_empty = true;
        self
    }

    pub const fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Require a match of `pattern` on the whole (trimmed) value.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.pattern = Some(regex::Regex::new(pattern)?);
        Ok(self)
    }

    pub const fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }
}

impl FieldValidator<str> for StringValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        let value = if self.trim { value.trim() } else { value };
        if self.not_empty && value.is_empty() {
            return Err("Value cannot be empty".to_string());
        }

        let length = value.chars().count();
        match (self.min_length, self.max_length) {
            (Some(min), _) if length < min => {
                Err(format!("Length must be at least {min} characters"))
            }
            (_, Some(max)) if length > max => {
                Err(format!("Length must not exceed {max} characters"))
            }
            _ => match &self.pattern {
                Some(pattern) if !pattern.is_match(value) => {
                    Err(format!("Value must match pattern: {}", pattern.as_str()))
                }
                _ => Ok(()),
            },
        }
    }
}

/// Accepts only values from a fixed, case-sensitive set
#[derive(Debug, Clone)]
pub struct OneOfValidator {
    allowed: Vec<String>,
}

impl OneOfValidator {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { allowed: allowed.into_iter().map(Into::into).collect() }
    }
}

impl FieldValidator<str> for OneOfValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if self.allowed.iter().any(|allowed| allowed == value) {
            Ok(())
        } else {
            Err(format!("Value must be one of: {}", self.allowed.join(", ")))
        }
    }
}
