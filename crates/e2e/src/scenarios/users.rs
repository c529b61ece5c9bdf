//! User management round-trip

use serde_json::json;

use crate::error::{E2eError, E2eResult};
use crate::fixtures::Role;
use crate::runner::{Scenario, ScenarioFuture, SuiteContext};

pub fn scenarios() -> Vec<Scenario> {
    vec![Scenario {
        name: "users: admin-created employee appears in the user list",
        tags: &["api", "users"],
        run: run_admin_roundtrip,
    }]
}

fn run_admin_roundtrip(ctx: &SuiteContext) -> ScenarioFuture<'_> {
    Box::pin(admin_roundtrip(ctx))
}

/// Admin creates an employee with a unique email; a subsequent list read
/// must contain exactly that email with role `employee`.
async fn admin_roundtrip(ctx: &SuiteContext) -> E2eResult<()> {
    let email = unique_email();
    let admin = ctx.bearer(Role::Admin);

    let body = json!({
        "email": email,
        "password": "roundtrip-pass-1",
        "display_name": "Roundtrip User",
        "role": "employee",
    });
    let created = ctx.api.post("/users", Some(admin), &body).await?;
    if !created.is_success() {
        return Err(E2eError::expected_actual(
            "admin POST /users",
            "success",
            format!("{} {}", created.status, created.body),
        ));
    }

    let listed = ctx.api.get("/users", Some(admin)).await?;
    let users = listed
        .data()
        .and_then(|d| d.as_array())
        .ok_or_else(|| {
            E2eError::AssertionFailed(format!(
                "admin GET /users returned no data array: {} {}",
                listed.status, listed.body
            ))
        })?;

    let found = users.iter().any(|u| {
        u.get("email").and_then(|e| e.as_str()) == Some(email.as_str())
            && u.get("role").and_then(|r| r.as_str()) == Some("employee")
    });
    if !found {
        return Err(E2eError::AssertionFailed(format!(
            "user {email} with role employee missing from GET /users"
        )));
    }
    Ok(())
}

fn unique_email() -> String {
    format!(
        "e2e-user-{}@timetrack.test",
        chrono::Utc::now().timestamp_millis()
    )
}
