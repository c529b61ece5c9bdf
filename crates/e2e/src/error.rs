//! Error types for the acceptance harness

use thiserror::Error;

use crate::fixtures::Role;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Environment not ready: {0}")]
    EnvironmentNotReady(String),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Login as {role} navigated to the dashboard but no credential was persisted under the auth-token storage key")]
    MissingCredential { role: Role },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

impl E2eError {
    /// Assertion failure with an expected/actual report.
    pub fn expected_actual(
        what: &str,
        expected: impl std::fmt::Debug,
        actual: impl std::fmt::Debug,
    ) -> Self {
        E2eError::AssertionFailed(format!("{what}: expected {expected:?}, got {actual:?}"))
    }
}
