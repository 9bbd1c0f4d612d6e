//! Validation: validators, their outcomes, and the gate that runs them.
//!
//! When validation is enabled, a gate sits just outside the handler for every
//! command and query. It runs all validators registered for the request type
//! in order and gathers every error they report, across all of them. If any
//! error was gathered the dispatch fails with a [`ValidationFailure`] and the
//! handler never runs.

mod gate;
mod validator;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub(crate) use gate::ValidationGate;
pub(crate) use validator::{ErasedValidator, ValidatorAdapter};
pub use validator::Validator;

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    property: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ValidationError {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
            code: None,
        }
    }

    /// Attach a machine-readable code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.message)?;
        if let Some(code) = &self.code {
            write!(f, " [{}]", code)?;
        }
        Ok(())
    }
}

/// An ordered, non-empty list of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new(first: ValidationError) -> Self {
        Self(vec![first])
    }

    /// `None` when `errors` is empty.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn first(&self) -> &ValidationError {
        &self.0[0]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// What a validator concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(ValidationErrors),
}

impl ValidationOutcome {
    /// `Valid` when `errors` is empty, `Invalid` otherwise.
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        match ValidationErrors::from_vec(errors) {
            Some(errors) => ValidationOutcome::Invalid(errors),
            None => ValidationOutcome::Valid,
        }
    }

    /// Shorthand for a single failed rule.
    pub fn invalid(property: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationOutcome::Invalid(ValidationErrors::new(ValidationError::new(property, message)))
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn errors(&self) -> &[ValidationError] {
        match self {
            ValidationOutcome::Valid => &[],
            ValidationOutcome::Invalid(errors) => errors.as_slice(),
        }
    }
}

/// Accumulates rule checks into an outcome.
///
/// ```ignore
/// let mut rules = Rules::new();
/// rules
///     .check(!cmd.title.is_empty(), "title", "Title is required")
///     .check_with_code(cmd.title.len() <= 200, "title", "Title is too long", "MaxLength");
/// rules.into_outcome()
/// ```
#[derive(Debug, Default)]
pub struct Rules {
    errors: Vec<ValidationError>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error unless `condition` holds.
    pub fn check(
        &mut self,
        condition: bool,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> &mut Self {
        if !condition {
            self.errors.push(ValidationError::new(property, message));
        }
        self
    }

    pub fn check_with_code(
        &mut self,
        condition: bool,
        property: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> &mut Self {
        if !condition {
            self.errors
                .push(ValidationError::new(property, message).with_code(code));
        }
        self
    }

    /// Record an error unconditionally.
    pub fn error(&mut self, error: ValidationError) -> &mut Self {
        self.errors.push(error);
        self
    }

    pub fn into_outcome(self) -> ValidationOutcome {
        ValidationOutcome::from_errors(self.errors)
    }
}

/// The request failed validation; carries every error from every validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    request_type: &'static str,
    errors: ValidationErrors,
}

impl ValidationFailure {
    pub fn new(request_type: &'static str, errors: ValidationErrors) -> Self {
        Self {
            request_type,
            errors,
        }
    }

    pub fn request_type(&self) -> &'static str {
        self.request_type
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Messages grouped by property, in first-seen order within each property.
    pub fn by_property(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for error in &self.errors {
            grouped.entry(error.property()).or_default().push(error.message());
        }
        grouped
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "validation failed for {} with {} error(s): ",
            self.request_type,
            self.errors.len()
        )?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}
