//! Role-conditioned navigation visibility and route guards

use crate::error::{E2eError, E2eResult};
use crate::fixtures::Role;
use crate::runner::{Scenario, ScenarioFuture, SuiteContext};

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "navigation: restricted entries follow the role predicate",
            tags: &["navigation", "ui"],
            run: run_restricted_nav,
        },
        Scenario {
            name: "navigation: employee direct navigation redirects to the dashboard",
            tags: &["navigation", "ui"],
            run: run_employee_redirects,
        },
    ]
}

fn run_restricted_nav(ctx: &SuiteContext) -> ScenarioFuture<'_> {
    Box::pin(restricted_nav(ctx))
}

fn run_employee_redirects(ctx: &SuiteContext) -> ScenarioFuture<'_> {
    Box::pin(employee_redirects(ctx))
}

/// One loop over all roles; `verify_logged_in` applies the single
/// `sees_restricted_nav` rule, so the expectation lives in one place.
async fn restricted_nav(ctx: &SuiteContext) -> E2eResult<()> {
    for role in Role::ALL {
        ctx.sessions.verify_logged_in(ctx.session(role)).await?;
    }
    Ok(())
}

/// An employee typing a restricted route into the address bar must land
/// back on the dashboard.
async fn employee_redirects(ctx: &SuiteContext) -> E2eResult<()> {
    let employee = ctx.session(Role::Employee);

    for route in ["/customers", "/users"] {
        let landed = ctx
            .sessions
            .navigate_and_capture_route(employee, route)
            .await?;
        if landed != "/dashboard" {
            return Err(E2eError::expected_actual(
                &format!("employee navigating to {route}"),
                "/dashboard",
                landed,
            ));
        }
    }
    Ok(())
}
