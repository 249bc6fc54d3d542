use thiserror::Error;

/// Error when parsing an enum from its wire/database string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} '{invalid}'. Valid values: {}", .valid.join(", "))]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub invalid: String,
    pub valid: Vec<&'static str>,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, invalid: &str, all: &[&'static str]) -> Self {
        Self {
            kind,
            invalid: invalid.to_string(),
            valid: all.to_vec(),
        }
    }
}
