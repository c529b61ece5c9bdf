//! Direct API authorization boundaries

use serde_json::json;

use crate::api::ApiResponse;
use crate::error::{E2eError, E2eResult};
use crate::fixtures::{Role, TestIdentity};
use crate::runner::{Scenario, ScenarioFuture, SuiteContext};

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "api: employee creating a customer is forbidden",
            tags: &["api", "authz"],
            run: run_employee_customer_forbidden,
        },
        Scenario {
            name: "api: protected endpoints reject missing and garbage tokens",
            tags: &["api", "authz", "smoke"],
            run: run_bad_tokens_unauthorized,
        },
        Scenario {
            name: "api: employee sees only their own user record",
            tags: &["api", "authz"],
            run: run_employee_users_filtered,
        },
        Scenario {
            name: "api: employee project list contains only active projects",
            tags: &["api"],
            run: run_employee_active_projects,
        },
    ]
}

fn run_employee_customer_forbidden(ctx: &SuiteContext) -> ScenarioFuture<'_> {
    Box::pin(employee_customer_forbidden(ctx))
}

fn run_bad_tokens_unauthorized(ctx: &SuiteContext) -> ScenarioFuture<'_> {
    Box::pin(bad_tokens_unauthorized(ctx))
}

fn run_employee_users_filtered(ctx: &SuiteContext) -> ScenarioFuture<'_> {
    Box::pin(employee_users_filtered(ctx))
}

fn run_employee_active_projects(ctx: &SuiteContext) -> ScenarioFuture<'_> {
    Box::pin(employee_active_projects(ctx))
}

fn describe(response: &ApiResponse) -> String {
    format!("{} {}", response.status, response.body)
}

async fn employee_customer_forbidden(ctx: &SuiteContext) -> E2eResult<()> {
    let body = json!({ "name": "Forbidden Fruit Ltd" });
    let response = ctx
        .api
        .post("/customers", Some(ctx.bearer(Role::Employee)), &body)
        .await?;

    if !response.is_forbidden() {
        return Err(E2eError::expected_actual(
            "employee POST /customers",
            "403 with an error object",
            describe(&response),
        ));
    }
    Ok(())
}

async fn bad_tokens_unauthorized(ctx: &SuiteContext) -> E2eResult<()> {
    let missing = ctx.api.get("/time-entries", None).await?;
    if !missing.is_unauthorized() {
        return Err(E2eError::expected_actual(
            "GET /time-entries without a token",
            "401",
            describe(&missing),
        ));
    }

    let garbage = ctx
        .api
        .get("/time-entries", Some("not-a-real-token"))
        .await?;
    if !garbage.is_unauthorized() {
        return Err(E2eError::expected_actual(
            "GET /time-entries with a garbage token",
            "401",
            describe(&garbage),
        ));
    }
    Ok(())
}

/// The collection endpoint filters rather than denies: an employee gets a
/// 200 with exactly their own record, never a 403.
async fn employee_users_filtered(ctx: &SuiteContext) -> E2eResult<()> {
    let response = ctx
        .api
        .get("/users", Some(ctx.bearer(Role::Employee)))
        .await?;

    if response.status.as_u16() != 200 {
        return Err(E2eError::expected_actual(
            "employee GET /users",
            "200 (filtered list, not a denial)",
            describe(&response),
        ));
    }

    let users = response
        .data()
        .and_then(|d| d.as_array())
        .ok_or_else(|| E2eError::AssertionFailed(format!(
            "employee GET /users returned no data array: {}",
            describe(&response)
        )))?;

    let own_email = TestIdentity::for_role(Role::Employee).email;
    let emails: Vec<_> = users
        .iter()
        .filter_map(|u| u.get("email").and_then(|e| e.as_str()))
        .collect();
    if emails != [own_email] {
        return Err(E2eError::expected_actual(
            "employee-visible user records",
            [own_email],
            emails,
        ));
    }
    Ok(())
}

async fn employee_active_projects(ctx: &SuiteContext) -> E2eResult<()> {
    let response = ctx
        .api
        .get("/projects", Some(ctx.bearer(Role::Employee)))
        .await?;

    if !response.is_success() {
        return Err(E2eError::expected_actual(
            "employee GET /projects",
            "success",
            describe(&response),
        ));
    }

    let projects = response
        .data()
        .and_then(|d| d.as_array())
        .ok_or_else(|| E2eError::AssertionFailed(format!(
            "employee GET /projects returned no data array: {}",
            describe(&response)
        )))?;

    for project in projects {
        let active = project.get("is_active").and_then(|a| a.as_bool());
        if active != Some(true) {
            return Err(E2eError::AssertionFailed(format!(
                "employee project list contains an inactive entry: {project}"
            )));
        }
    }
    Ok(())
}
