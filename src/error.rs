// The error type shared by the domain logic, the database layer and the routes.
use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // Malformed or missing form input. Nothing has been persisted.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    // Competition settings that cannot produce a valid structure.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    // A result that cannot decide a winner, or a stage that is not over yet.
    #[error("incomplete result: {0}")]
    IncompleteResult(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("authentication required")]
    Unauthorized,

    #[error("admin privileges required")]
    Forbidden,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl Error {
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub fn incomplete_result(message: impl Into<String>) -> Self {
        Self::IncompleteResult(message.into())
    }
}

// Per-field messages, keyed by the name of the offending field.
#[derive(Debug, Default, Clone, PartialEq)]
#[derive(Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    // Add an error if the given text is blank.
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "is required");
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // Turn the collected messages into a result.
    pub fn into_result(self) -> Result<()> {
        match self.is_empty() {
            true => Ok(()),
            false => Err(Error::Validation(self)),
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<String> = self.0.iter().map(|(field, message)| format!("{field} {message}")).collect();
        write!(f, "{}", fields.join(", "))
    }
}
