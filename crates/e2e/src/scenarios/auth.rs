//! Credential login, remember-me, and logout flows

use crate::error::{E2eError, E2eResult};
use crate::fixtures::Role;
use crate::runner::{Scenario, ScenarioFuture, SuiteContext};

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "auth: every role lands on the dashboard with a credential",
            tags: &["auth", "ui", "smoke"],
            run: run_login_each_role,
        },
        Scenario {
            name: "auth: remember-me persists the storage flag",
            tags: &["auth", "ui"],
            run: run_remember_me,
        },
    ]
}

/// Flows that invalidate a browser session; run after the groups that
/// reuse the setup sessions.
pub fn teardown_scenarios() -> Vec<Scenario> {
    vec![Scenario {
        name: "auth: logout returns to the login route",
        tags: &["auth", "ui"],
        run: run_logout,
    }]
}

fn run_login_each_role(ctx: &SuiteContext) -> ScenarioFuture<'_> {
    Box::pin(login_each_role(ctx))
}

fn run_remember_me(ctx: &SuiteContext) -> ScenarioFuture<'_> {
    Box::pin(remember_me(ctx))
}

fn run_logout(ctx: &SuiteContext) -> ScenarioFuture<'_> {
    Box::pin(logout(ctx))
}

/// The sessions themselves were established during setup; here we assert
/// what the setup guaranteed: a non-empty credential and the authenticated
/// landing route, for every role.
async fn login_each_role(ctx: &SuiteContext) -> E2eResult<()> {
    for role in Role::ALL {
        let session = ctx.session(role);
        if session.bearer().is_empty() {
            return Err(E2eError::MissingCredential { role });
        }

        let route = ctx
            .sessions
            .navigate_and_capture_route(session, "/dashboard")
            .await?;
        if route != "/dashboard" {
            return Err(E2eError::expected_actual(
                &format!("landing route for {role}"),
                "/dashboard",
                route,
            ));
        }
    }
    Ok(())
}

/// A fresh login with the remember checkbox checked must persist the
/// `remember-me` flag as `"true"`. The helper asserts the flag itself.
async fn remember_me(ctx: &SuiteContext) -> E2eResult<()> {
    ctx.sessions.login_remembered(Role::Employee).await?;
    Ok(())
}

/// Logout drives a fresh session (own snapshot, own credential) so the
/// shared setup sessions stay untouched.
async fn logout(ctx: &SuiteContext) -> E2eResult<()> {
    let session = ctx.sessions.login_fresh(Role::Manager).await?;
    ctx.sessions.logout(&session).await
}
