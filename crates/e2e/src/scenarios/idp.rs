//! Identity-provider-backed login (integration-only)

use crate::error::E2eResult;
use crate::fixtures::Role;
use crate::runner::{Scenario, ScenarioFuture, SuiteContext};

pub fn scenarios() -> Vec<Scenario> {
    vec![Scenario {
        name: "idp: realm-scoped login surface accepts fixture credentials",
        tags: &["idp"],
        run: run_realm_login,
    }]
}

fn run_realm_login(ctx: &SuiteContext) -> ScenarioFuture<'_> {
    Box::pin(realm_login(ctx))
}

async fn realm_login(ctx: &SuiteContext) -> E2eResult<()> {
    ctx.sessions.idp_login(Role::Employee).await
}
