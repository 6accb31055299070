use std::fmt::{Display, Formatter};
use thiserror::Error;

pub const IP_ADDRESS_FIELD: &str = "ipAddress";
pub const IP_ADDRESS_REQUIRED: &str = "IP Address is required.";
pub const PLACEHOLDER: &str = "Search for any IP address or domain";

/// A submitted IP address or domain, never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value = input.trim();
        if value.is_empty() {
            return Err(ValidationError {
                field: IP_ADDRESS_FIELD,
                message: IP_ADDRESS_REQUIRED,
            });
        }

        Ok(SearchQuery(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SearchQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}
