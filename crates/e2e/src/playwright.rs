//! Playwright browser automation
//!
//! The harness generates a self-contained Playwright script per scenario,
//! runs it with `node`, and reads a sentinel-prefixed JSON object back from
//! stdout. One script run is one isolated browser context; the only state
//! that survives a run is an optional storage-state snapshot file.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;

use regex::Regex;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// Marker in front of the JSON result line printed by every script.
const RESULT_SENTINEL: &str = "__E2E_RESULT__";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Playwright(format!("unknown browser: {other}"))),
        }
    }
}

/// Configuration for the browser driver
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Directory holding per-role storage-state snapshots
    pub state_dir: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            state_dir: std::env::temp_dir().join("timetrack-e2e-state"),
        }
    }
}

/// A page script under construction.
///
/// The body is a sequence of statements executed with `page`, `context`, and
/// a `result` object in scope; whatever the body writes into `result` comes
/// back to Rust as JSON.
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    storage_state: Option<PathBuf>,
    body: String,
}

impl PageScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the browser context from a saved storage-state snapshot.
    pub fn with_storage_state(path: &Path) -> Self {
        Self {
            storage_state: Some(path.to_path_buf()),
            body: String::new(),
        }
    }

    /// Append one statement to the script body.
    pub fn line(&mut self, stmt: impl AsRef<str>) -> &mut Self {
        self.body.push_str("    ");
        self.body.push_str(stmt.as_ref());
        self.body.push('\n');
        self
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Escape a Rust string into a single-quoted JS string literal.
pub fn js_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Playwright browser handle
pub struct PlaywrightHandle {
    config: PlaywrightConfig,
}

impl PlaywrightHandle {
    pub fn new(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;
        std::fs::create_dir_all(&config.state_dir)?;
        Ok(Self { config })
    }

    /// Construct without the install check, for script-assembly tests.
    #[cfg(test)]
    pub(crate) fn new_unchecked(config: PlaywrightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }

    /// Check if Playwright is installed
    fn check_playwright_installed() -> E2eResult<()> {
        let output = std::process::Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Assemble the full Node script for a page script.
    pub fn build_script(&self, script: &PageScript) -> String {
        let storage_state = script
            .storage_state
            .as_ref()
            .map(|p| format!(",\n    storageState: {}", js_str(&p.to_string_lossy())))
            .unwrap_or_default();

        format!(
            r#"const {{ chromium, firefox, webkit }} = require('playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}{storage_state}
  }});
  const page = await context.newPage();
  const result = {{}};

  try {{
{body}
    console.log('{sentinel} ' + JSON.stringify(result));
  }} catch (error) {{
    console.error('{sentinel} ' + JSON.stringify({{ error: error.message }}));
    process.exit(1);
  }} finally {{
    await browser.close();
  }}
}})();
"#,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            width = self.config.viewport_width,
            height = self.config.viewport_height,
            storage_state = storage_state,
            body = script.body.trim_end(),
            sentinel = RESULT_SENTINEL,
        )
    }

    /// Run a page script and return the JSON object its body wrote into
    /// `result`.
    pub async fn run(&self, script: &PageScript) -> E2eResult<serde_json::Value> {
        let source = self.build_script(script);

        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scenario.js");
        std::fs::write(&script_path, &source)?;

        debug!("Running Playwright script: {}", script_path.display());

        let output = TokioCommand::new("node")
            .arg(&script_path)
            .current_dir(temp_dir.path())
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let message = extract_result(&stderr)
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| format!("script failed:\nstdout: {stdout}\nstderr: {stderr}"));

            // Playwright raises TimeoutError for expired bounded waits
            if message.contains("Timeout") || message.contains("exceeded") {
                return Err(E2eError::Timeout(message));
            }
            return Err(E2eError::Playwright(message));
        }

        extract_result(&stdout).ok_or_else(|| {
            E2eError::Playwright(format!("no result line in script output:\n{stdout}"))
        })
    }
}

/// Pull the sentinel JSON line out of process output.
fn extract_result(output: &str) -> Option<serde_json::Value> {
    let re = Regex::new(&format!(r"{RESULT_SENTINEL} (.*)")).ok()?;
    let captures = re.captures(output)?;
    serde_json::from_str(captures.get(1)?.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> PlaywrightHandle {
        PlaywrightHandle::new_unchecked(PlaywrightConfig::default())
    }

    #[test]
    fn script_wraps_body_with_result_plumbing() {
        let mut script = PageScript::new();
        script.line("await page.goto('http://127.0.0.1:5173/login');");

        let source = handle().build_script(&script);
        assert!(source.contains("chromium.launch({ headless: true })"));
        assert!(source.contains("await page.goto('http://127.0.0.1:5173/login');"));
        assert!(source.contains(RESULT_SENTINEL));
        assert!(!source.contains("storageState"), "no snapshot requested");
    }

    #[test]
    fn storage_state_is_included_when_requested() {
        let script = PageScript::with_storage_state(Path::new("/tmp/admin-storage-state.json"));
        let source = handle().build_script(&script);
        assert!(source.contains("storageState: '/tmp/admin-storage-state.json'"));
    }

    #[test]
    fn js_str_escapes_quotes_and_backslashes() {
        assert_eq!(js_str("plain"), "'plain'");
        assert_eq!(js_str("it's"), r"'it\'s'");
        assert_eq!(js_str(r"a\b"), r"'a\\b'");
        assert_eq!(js_str("a\nb"), r"'a\nb'");
    }

    #[test]
    fn result_line_is_extracted_from_mixed_output() {
        let output = format!("noise\n{RESULT_SENTINEL} {{\"token\":\"abc\"}}\n");
        let value = extract_result(&output).expect("result line present");
        assert_eq!(value["token"], "abc");
        assert!(extract_result("no sentinel here").is_none());
    }

    #[test]
    fn browser_parses_from_cli_names() {
        assert_eq!("firefox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert!("safari".parse::<Browser>().is_err());
    }
}
