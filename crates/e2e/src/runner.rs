//! Sequential scenario runner
//!
//! Scenarios run one at a time against a context built once per suite:
//! endpoints, the API client, the session helper, and one authenticated
//! session per role acquired during setup and read-only afterwards. A
//! failed scenario ends with its error; the suite moves on to the next.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::api::ApiClient;
use crate::error::{E2eError, E2eResult};
use crate::fixtures::{Endpoints, Role};
use crate::playwright::{PlaywrightConfig, PlaywrightHandle};
use crate::session::{AuthenticatedSession, SessionHelper};

pub type ScenarioFuture<'a> = Pin<Box<dyn Future<Output = E2eResult<()>> + 'a>>;

/// One acceptance scenario: a name, filter tags, and the flow itself.
pub struct Scenario {
    pub name: &'static str,
    pub tags: &'static [&'static str],
    pub run: for<'a> fn(&'a SuiteContext) -> ScenarioFuture<'a>,
}

/// Shared, read-only state for a scenario group.
pub struct SuiteContext {
    pub endpoints: Endpoints,
    pub api: ApiClient,
    pub sessions: SessionHelper,
    role_sessions: HashMap<Role, AuthenticatedSession>,
}

impl SuiteContext {
    /// Build the context and perform setup-level session acquisition: one
    /// login per role. Sessions are never mutated after this point.
    pub async fn setup(
        endpoints: Endpoints,
        playwright: PlaywrightConfig,
    ) -> E2eResult<Self> {
        let api = ApiClient::new(endpoints.clone())?;
        let helper = SessionHelper::new(endpoints.clone(), PlaywrightHandle::new(playwright)?);

        let mut role_sessions = HashMap::new();
        for role in Role::ALL {
            let session = helper.login(role).await?;
            role_sessions.insert(role, session);
        }

        Ok(Self {
            endpoints,
            api,
            sessions: helper,
            role_sessions,
        })
    }

    /// The session established for a role during setup.
    pub fn session(&self, role: Role) -> &AuthenticatedSession {
        self.role_sessions
            .get(&role)
            .expect("setup acquires a session for every role")
    }

    /// Bearer credential for a role.
    pub fn bearer(&self, role: Role) -> &str {
        self.session(role).bearer()
    }
}

/// Outcome of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub started_at: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl SuiteSummary {
    pub fn from_results(started_at: String, results: Vec<ScenarioResult>, duration_ms: u64) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            started_at,
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Select scenarios by tag and/or exact name. The filters intersect: a
/// named scenario that does not carry the requested tag selects nothing.
/// An unknown name is an error; an unmatched tag just selects nothing.
pub fn select<'a>(
    scenarios: &'a [Scenario],
    tag: Option<&str>,
    name: Option<&str>,
) -> E2eResult<Vec<&'a Scenario>> {
    let carries_tag = |s: &Scenario| tag.map_or(true, |t| s.tags.contains(&t));

    if let Some(name) = name {
        let found = scenarios
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::ScenarioNotFound(name.to_string()))?;
        return Ok(if carries_tag(found) { vec![found] } else { Vec::new() });
    }

    Ok(scenarios.iter().filter(|s| carries_tag(s)).collect())
}

/// Run scenarios strictly sequentially, log pass/fail per scenario, and
/// tally the outcome.
pub async fn run_scenarios(ctx: &SuiteContext, scenarios: &[&Scenario]) -> SuiteSummary {
    let started_at = chrono::Utc::now().to_rfc3339();
    let start = Instant::now();
    let mut results = Vec::with_capacity(scenarios.len());

    info!("Running {} scenario(s)...", scenarios.len());

    for scenario in scenarios {
        let scenario_start = Instant::now();
        let outcome = (scenario.run)(ctx).await;
        let duration_ms = scenario_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                info!("✓ {} ({} ms)", scenario.name, duration_ms);
                results.push(ScenarioResult {
                    name: scenario.name.to_string(),
                    success: true,
                    duration_ms,
                    error: None,
                });
            }
            Err(e) => {
                error!("✗ {} - {}", scenario.name, e);
                results.push(ScenarioResult {
                    name: scenario.name.to_string(),
                    success: false,
                    duration_ms,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let summary =
        SuiteSummary::from_results(started_at, results, start.elapsed().as_millis() as u64);

    info!("");
    info!(
        "Scenario results: {} passed, {} failed ({} ms)",
        summary.passed, summary.failed, summary.duration_ms
    );

    summary
}

/// Write the summary as JSON into the output directory.
pub fn write_summary(output_dir: &Path, summary: &SuiteSummary) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join("scenario-results.json");
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, success: bool) -> ScenarioResult {
        ScenarioResult {
            name: name.to_string(),
            success,
            duration_ms: 1,
            error: if success { None } else { Some("boom".into()) },
        }
    }

    fn noop(_: &SuiteContext) -> ScenarioFuture<'_> {
        Box::pin(async { Ok(()) })
    }

    const SCENARIOS: [Scenario; 3] = [
        Scenario {
            name: "auth: login each role",
            tags: &["auth", "ui"],
            run: noop,
        },
        Scenario {
            name: "api: employee forbidden",
            tags: &["api"],
            run: noop,
        },
        Scenario {
            name: "idp: realm login",
            tags: &["idp"],
            run: noop,
        },
    ];

    #[test]
    fn summary_tallies_pass_and_fail() {
        let summary = SuiteSummary::from_results(
            "2026-01-01T00:00:00Z".into(),
            vec![result("a", true), result("b", false), result("c", true)],
            42,
        );
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_passed());
    }

    #[test]
    fn select_by_tag_and_name() {
        let api_only = select(&SCENARIOS, Some("api"), None).unwrap();
        assert_eq!(api_only.len(), 1);
        assert_eq!(api_only[0].name, "api: employee forbidden");

        let by_name = select(&SCENARIOS, None, Some("idp: realm login")).unwrap();
        assert_eq!(by_name.len(), 1);

        let everything = select(&SCENARIOS, None, None).unwrap();
        assert_eq!(everything.len(), 3);

        // name and tag intersect rather than tag being dropped
        let matching_both = select(&SCENARIOS, Some("idp"), Some("idp: realm login")).unwrap();
        assert_eq!(matching_both.len(), 1);
        let tag_mismatch = select(&SCENARIOS, Some("api"), Some("idp: realm login")).unwrap();
        assert!(tag_mismatch.is_empty());

        assert!(matches!(
            select(&SCENARIOS, None, Some("nope")),
            Err(E2eError::ScenarioNotFound(_))
        ));
    }
}
