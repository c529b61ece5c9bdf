//! Environment readiness checks
//!
//! The web app, API, and identity provider are external collaborators; the
//! harness never spawns them. Before a suite runs we only verify they are
//! answering. The identity provider is optional for most scenario groups,
//! so its probe warns instead of failing.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};
use crate::fixtures::Endpoints;

/// Wait until both the web app and the API answer HTTP, or fail with an
/// environment-not-ready error. Not retried beyond the bound; a dead
/// environment is fatal, not a flake.
pub async fn wait_for_app(endpoints: &Endpoints, timeout: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    probe_until(&client, &endpoints.web_base, "web app", timeout).await?;
    probe_until(&client, &endpoints.api_url("/health"), "API", timeout).await?;
    Ok(())
}

async fn probe_until(
    client: &reqwest::Client,
    url: &str,
    what: &str,
    timeout: Duration,
) -> E2eResult<()> {
    let start = std::time::Instant::now();
    let mut attempts = 0usize;

    while start.elapsed() < timeout {
        attempts += 1;
        match client.get(url).send().await {
            // Any HTTP answer means the service is up; status interpretation
            // belongs to the scenarios.
            Ok(_) => {
                info!("{} is answering at {}", what, url);
                return Ok(());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {} at {}...", what, url);
                }
                if !e.is_connect() {
                    warn!("{} probe error: {}", what, e);
                }
            }
        }
        sleep(Duration::from_millis(100)).await;
    }

    Err(E2eError::EnvironmentNotReady(format!(
        "{what} did not answer at {url} after {attempts} attempts"
    )))
}

/// Probe the identity provider. Reachability failure only logs a caution;
/// scenario groups that do not touch the IdP may still run.
pub async fn check_idp(endpoints: &Endpoints) {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!("Identity provider probe skipped: {}", e);
            return;
        }
    };

    let url = format!("{}/realms/{}", endpoints.idp_base, endpoints.idp_realm);
    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            info!("Identity provider is answering at {}", url);
        }
        Ok(resp) => {
            warn!(
                "Identity provider returned {} at {}; idp-tagged scenarios may fail",
                resp.status(),
                url
            );
        }
        Err(e) => {
            warn!(
                "Identity provider unreachable at {} ({}); idp-tagged scenarios may fail",
                url, e
            );
        }
    }
}
