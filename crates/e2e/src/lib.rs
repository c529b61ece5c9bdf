//! TimeTrack E2E acceptance harness
//!
//! Browser automation and HTTP API assertions for the TimeTrack time-tracking
//! application. Everything under test - the web app, the API server, and the
//! identity provider - is an external collaborator; this crate only drives
//! them and asserts.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  Suite runner (tests/e2e.rs)                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │  SuiteContext (one login per role at setup, read-only after) │
//! │    ├── SessionHelper ── PlaywrightHandle ── node/playwright  │
//! │    │     login / logout / verify_logged_in / idp_login       │
//! │    └── ApiClient ── reqwest                                  │
//! │          raw responses + is_success / is_forbidden /         │
//! │          is_unauthorized predicates                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Fixtures: Role, TestIdentity, Endpoints (env-configured)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod env;
pub mod error;
pub mod fixtures;
pub mod playwright;
pub mod runner;
pub mod scenarios;
pub mod session;

pub use api::{ApiClient, ApiResponse};
pub use error::{E2eError, E2eResult};
pub use fixtures::{Endpoints, Role, TestIdentity};
pub use runner::{Scenario, SuiteContext, SuiteSummary};
pub use session::{AuthenticatedSession, SessionHelper};
