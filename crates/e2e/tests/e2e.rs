//! Acceptance suite entry point
//!
//! Runs the scenario catalogue against a live environment.
//! Run with: cargo test --package timetrack-e2e --test e2e

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use timetrack_e2e::playwright::{Browser, PlaywrightConfig};
use timetrack_e2e::runner::{run_scenarios, select, write_summary};
use timetrack_e2e::{env, scenarios, E2eResult, Endpoints, SuiteContext};

#[derive(Parser, Debug)]
#[command(name = "timetrack-e2e")]
#[command(about = "Acceptance test runner for TimeTrack")]
struct Args {
    /// Web application base URL (overrides TIMETRACK_E2E_WEB_URL)
    #[arg(long)]
    web_url: Option<String>,

    /// API base URL (overrides TIMETRACK_E2E_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Identity provider base URL (overrides TIMETRACK_E2E_IDP_URL)
    #[arg(long)]
    idp_url: Option<String>,

    /// Run only scenarios carrying this tag (intersects with --name)
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only the scenario with this exact name; with --tag, the
    /// scenario must also carry the tag or nothing runs
    #[arg(short, long)]
    name: Option<String>,

    /// List scenario names and exit
    #[arg(long)]
    list: bool,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Run in headless mode
    #[arg(long, default_value = "true")]
    headless: bool,

    /// Viewport width
    #[arg(long, default_value = "1280")]
    viewport_width: u32,

    /// Viewport height
    #[arg(long, default_value = "720")]
    viewport_height: u32,

    /// Seconds to wait for the environment to answer
    #[arg(long, default_value = "30")]
    readiness_timeout: u64,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let catalogue = scenarios::all();

    if args.list {
        for scenario in &catalogue {
            println!("{}  [{}]", scenario.name, scenario.tags.join(", "));
        }
        return Ok(true);
    }

    let mut endpoints = Endpoints::from_env();
    if let Some(web) = args.web_url {
        endpoints.web_base = web;
    }
    if let Some(api) = args.api_url {
        endpoints.api_base = api;
    }
    if let Some(idp) = args.idp_url {
        endpoints.idp_base = idp;
    }

    let selected = select(&catalogue, args.tag.as_deref(), args.name.as_deref())?;
    if selected.is_empty() {
        eprintln!("No scenarios matched the filter");
        return Ok(false);
    }

    // The app and API must be up; the identity provider only warns.
    env::wait_for_app(&endpoints, Duration::from_secs(args.readiness_timeout)).await?;
    env::check_idp(&endpoints).await;

    let playwright = PlaywrightConfig {
        browser: args.browser.parse::<Browser>()?,
        headless: args.headless,
        viewport_width: args.viewport_width,
        viewport_height: args.viewport_height,
        ..Default::default()
    };

    let ctx = SuiteContext::setup(endpoints, playwright).await?;
    let summary = run_scenarios(&ctx, &selected).await;
    write_summary(&args.output, &summary)?;

    Ok(summary.all_passed())
}
