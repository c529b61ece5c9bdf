//! Acceptance scenarios, grouped by concern
//!
//! Each module exposes a `scenarios()` list; [`all`] is the registration
//! order the suite runs in. Browser flows that mutate session state (the
//! logout flow) come after the groups that reuse the setup sessions.

pub mod api_authz;
pub mod auth;
pub mod idp;
pub mod navigation;
pub mod users;

use crate::runner::Scenario;

pub fn all() -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    scenarios.extend(auth::scenarios());
    scenarios.extend(navigation::scenarios());
    scenarios.extend(api_authz::scenarios());
    scenarios.extend(users::scenarios());
    scenarios.extend(auth::teardown_scenarios());
    scenarios.extend(idp::scenarios());
    scenarios
}
