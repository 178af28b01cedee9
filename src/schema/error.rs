use std::collections::HashMap;
use std::fmt;

/// A single failing location within a validated mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub loc: String,
    pub msg: String,
    pub kind: &'static str,
}

impl FieldError {
    pub fn new(loc: impl Into<String>, msg: impl Into<String>, kind: &'static str) -> Self {
        Self {
            loc: loc.into(),
            msg: msg.into(),
            kind,
        }
    }
}

/// Every failure found while validating one mapping against one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub model: String,
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(model: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            model: model.into(),
            errors,
        }
    }

    /// Field location to message, for the `field_errors` member of error bodies
    pub fn field_errors(&self) -> HashMap<String, String> {
        self.errors
            .iter()
            .map(|e| (e.loc.clone(), e.msg.clone()))
            .collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.errors.len();
        write!(
            f,
            "{} validation error{} for {}",
            count,
            if count == 1 { "" } else { "s" },
            self.model
        )?;
        for e in &self.errors {
            write!(f, "\n{}\n  {} (type={})", e.loc, e.msg, e.kind)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
