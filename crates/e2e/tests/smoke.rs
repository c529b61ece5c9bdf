//! Live-environment smoke tests
//!
//! These need the TimeTrack web app and API running (and Playwright
//! installed), so they are ignored by default. Run with:
//! cargo test --package timetrack-e2e --test smoke -- --ignored

use std::time::Duration;

use timetrack_e2e::playwright::{PlaywrightConfig, PlaywrightHandle};
use timetrack_e2e::{env, ApiClient, Endpoints, Role, SessionHelper};

#[tokio::test]
#[ignore] // Requires a running environment
async fn environment_answers_within_the_bound() {
    let endpoints = Endpoints::from_env();
    env::wait_for_app(&endpoints, Duration::from_secs(30))
        .await
        .expect("web app and API should answer");
    env::check_idp(&endpoints).await;
}

#[tokio::test]
#[ignore] // Requires a running environment and Playwright
async fn admin_login_yields_a_usable_credential() {
    let endpoints = Endpoints::from_env();
    let playwright =
        PlaywrightHandle::new(PlaywrightConfig::default()).expect("playwright installed");
    let sessions = SessionHelper::new(endpoints.clone(), playwright);

    let session = sessions
        .login(Role::Admin)
        .await
        .expect("admin login should succeed");
    assert!(!session.bearer().is_empty());

    // The credential must authorize a direct API call.
    let api = ApiClient::new(endpoints).expect("client builds");
    let response = api
        .get("/time-entries", Some(session.bearer()))
        .await
        .expect("request should complete");
    assert!(
        response.is_success(),
        "expected success, got {} {}",
        response.status,
        response.body
    );
}
