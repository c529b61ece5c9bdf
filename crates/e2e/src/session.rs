//! Session helper - credential-based login, logout, and logged-in checks
//!
//! Drives the login form of the web app under test through the Playwright
//! driver, waits for the authenticated landing route, and reads the bearer
//! credential back out of client-side storage. Every role-specific entry
//! point is a parameterization of the same flow; the only role-conditioned
//! logic is the [`Role::sees_restricted_nav`] predicate.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::fixtures::{
    fresh_storage_state_path, storage_state_path, Endpoints, Role, TestIdentity, AUTH_TOKEN_KEY,
    REMEMBER_ME_KEY, RESTRICTED_NAV_ENTRIES,
};
use crate::playwright::{js_str, PageScript, PlaywrightHandle};

/// Bounded wait for the login form and post-login navigation.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Fixed settle delay before reading client-side storage after the
/// post-login redirect.
const CREDENTIAL_SETTLE: Duration = Duration::from_millis(500);

/// Settle delay for client-side route guards to finish redirecting.
const ROUTE_SETTLE: Duration = Duration::from_millis(750);

const LOGIN_IDENTIFIER_SELECTOR: &str = "input[type=\"text\"]";
const LOGIN_PASSWORD_SELECTOR: &str = "input[type=\"password\"]";

/// Marker thrown by the login script when the identifying field never
/// renders; distinguishes environment-not-ready from a failure later in
/// the flow.
const LOGIN_FORM_MARKER: &str = "login form did not render";

/// A browser-established session: the fixture identity, the extracted
/// bearer credential, and the storage-state snapshot that lets later
/// scripts open an already-authenticated context.
///
/// The credential is read once after login and never refreshed.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub identity: &'static TestIdentity,
    token: String,
    pub storage_state: PathBuf,
}

impl AuthenticatedSession {
    pub fn role(&self) -> Role {
        self.identity.role
    }

    pub fn bearer(&self) -> &str {
        &self.token
    }
}

pub struct SessionHelper {
    endpoints: Endpoints,
    playwright: PlaywrightHandle,
}

impl SessionHelper {
    pub fn new(endpoints: Endpoints, playwright: PlaywrightHandle) -> Self {
        Self {
            endpoints,
            playwright,
        }
    }

    /// Log the given role in through the credential form and extract the
    /// bearer credential. Writes the role's setup-level snapshot; once a
    /// suite has stored the session, that snapshot is read-only.
    pub async fn login(&self, role: Role) -> E2eResult<AuthenticatedSession> {
        self.login_with(role, false, false).await
    }

    /// Scenario-local login: same flow, but the snapshot goes to a unique
    /// path so the role's setup-level snapshot is never written over.
    pub async fn login_fresh(&self, role: Role) -> E2eResult<AuthenticatedSession> {
        self.login_with(role, false, true).await
    }

    pub async fn login_as_employee(&self) -> E2eResult<AuthenticatedSession> {
        self.login(Role::Employee).await
    }

    pub async fn login_as_manager(&self) -> E2eResult<AuthenticatedSession> {
        self.login(Role::Manager).await
    }

    pub async fn login_as_admin(&self) -> E2eResult<AuthenticatedSession> {
        self.login(Role::Admin).await
    }

    /// Login with the remember checkbox checked; also asserts the
    /// `remember-me` flag was persisted as `"true"`. Scenario-local, so
    /// the snapshot is fresh.
    pub async fn login_remembered(&self, role: Role) -> E2eResult<AuthenticatedSession> {
        self.login_with(role, true, true).await
    }

    /// Snapshot target for a login: the role-keyed setup path, or a unique
    /// per-call path for scenario-local logins.
    fn snapshot_path(&self, role: Role, fresh: bool) -> PathBuf {
        let state_dir = &self.playwright.config().state_dir;
        if fresh {
            fresh_storage_state_path(state_dir, role)
        } else {
            storage_state_path(state_dir, role)
        }
    }

    async fn login_with(
        &self,
        role: Role,
        remember: bool,
        fresh: bool,
    ) -> E2eResult<AuthenticatedSession> {
        let identity = TestIdentity::for_role(role);
        let state_path = self.snapshot_path(role, fresh);
        let script = self.login_script(identity, remember, &state_path);

        info!("Logging in as {} ({})", role, identity.email);

        let result = match self.playwright.run(&script).await {
            Ok(result) => result,
            Err(e) => return Err(self.classify_login_error(e)),
        };

        let token = result
            .get("token")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();
        if token.is_empty() {
            return Err(E2eError::MissingCredential { role });
        }

        if remember {
            let flag = result.get("remember").and_then(|r| r.as_str());
            if flag != Some("true") {
                return Err(E2eError::expected_actual(
                    "remember-me storage flag",
                    "true",
                    flag,
                ));
            }
        }

        debug!("Extracted credential for {} ({} chars)", role, token.len());

        Ok(AuthenticatedSession {
            identity,
            token,
            storage_state: state_path,
        })
    }

    fn login_script(
        &self,
        identity: &TestIdentity,
        remember: bool,
        state_path: &std::path::Path,
    ) -> PageScript {
        let timeout = LOGIN_TIMEOUT.as_millis();
        let mut script = PageScript::new();
        script
            .line(format!(
                "await page.goto({});",
                js_str(&self.endpoints.web_url("/login"))
            ))
            .line(format!(
                "await page.waitForSelector({sel}, {{ timeout: {timeout} }}).catch(() => {{ throw new Error({marker}); }});",
                sel = js_str(LOGIN_IDENTIFIER_SELECTOR),
                marker = js_str(LOGIN_FORM_MARKER),
            ))
            .line(format!(
                "await page.fill({}, {});",
                js_str(LOGIN_IDENTIFIER_SELECTOR),
                js_str(identity.email)
            ))
            .line(format!(
                "await page.fill({}, {});",
                js_str(LOGIN_PASSWORD_SELECTOR),
                js_str(identity.password)
            ));
        if remember {
            script.line("await page.getByRole('checkbox').check();");
        }
        script
            .line("await page.getByRole('button', { name: 'Sign in' }).click();")
            .line(format!(
                "await page.waitForURL('**/dashboard', {{ timeout: {timeout} }});"
            ))
            .line(format!(
                "await page.waitForTimeout({});",
                CREDENTIAL_SETTLE.as_millis()
            ))
            .line(format!(
                "result.token = await page.evaluate(() => localStorage.getItem({}));",
                js_str(AUTH_TOKEN_KEY)
            ));
        if remember {
            script.line(format!(
                "result.remember = await page.evaluate(() => localStorage.getItem({}));",
                js_str(REMEMBER_ME_KEY)
            ));
        }
        script.line(format!(
            "await context.storageState({{ path: {} }});",
            js_str(&state_path.to_string_lossy())
        ));
        script
    }

    /// The identifying field never rendering is an environment problem,
    /// not a login failure; the script throws a marker error for exactly
    /// that wait, so a later timeout (filling fields, post-submit
    /// navigation) keeps its own classification.
    fn classify_login_error(&self, err: E2eError) -> E2eError {
        match err {
            E2eError::Playwright(msg) | E2eError::Timeout(msg)
                if msg.contains(LOGIN_FORM_MARKER) =>
            {
                E2eError::EnvironmentNotReady(format!(
                    "{LOGIN_FORM_MARKER} at {}",
                    self.endpoints.web_url("/login")
                ))
            }
            other => other,
        }
    }

    /// Sign the session out through the UI and wait for return to the login
    /// route. Side effect only.
    pub async fn logout(&self, session: &AuthenticatedSession) -> E2eResult<()> {
        let timeout = LOGIN_TIMEOUT.as_millis();
        let role_menu = format!("[data-testid=\"user-menu-{}\"]", session.role());

        let mut script = PageScript::with_storage_state(&session.storage_state);
        script
            .line(format!(
                "await page.goto({});",
                js_str(&self.endpoints.web_url("/dashboard"))
            ))
            .line(format!("const roleMenu = page.locator({});", js_str(&role_menu)))
            .line("if (await roleMenu.count() > 0) { await roleMenu.click(); }")
            .line("else { await page.locator('[data-testid=\"user-menu\"]').click(); }")
            .line("await page.getByRole('menuitem', { name: 'Sign out' }).click();")
            .line(format!("await page.waitForURL('**/login', {{ timeout: {timeout} }});"));

        info!("Logging out {}", session.role());
        self.playwright.run(&script).await?;
        Ok(())
    }

    /// Assert the session is on the authenticated landing route and that
    /// the restricted navigation entries match the role predicate.
    pub async fn verify_logged_in(&self, session: &AuthenticatedSession) -> E2eResult<()> {
        let timeout = LOGIN_TIMEOUT.as_millis();
        let mut script = PageScript::with_storage_state(&session.storage_state);
        script
            .line(format!(
                "await page.goto({});",
                js_str(&self.endpoints.web_url("/dashboard"))
            ))
            .line(format!(
                "await page.waitForURL('**/dashboard', {{ timeout: {timeout} }});"
            ))
            .line("result.route = new URL(page.url()).pathname;");
        for entry in RESTRICTED_NAV_ENTRIES {
            script.line(format!(
                "result.{} = await page.getByRole('link', {{ name: {} }}).count() > 0;",
                nav_result_key(entry),
                js_str(entry)
            ));
        }

        let result = self.playwright.run(&script).await?;

        let route = result.get("route").and_then(|r| r.as_str()).unwrap_or("");
        if route != "/dashboard" {
            return Err(E2eError::expected_actual("route", "/dashboard", route));
        }

        let expected = session.role().sees_restricted_nav();
        for entry in RESTRICTED_NAV_ENTRIES {
            let visible = result
                .get(nav_result_key(entry))
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if visible != expected {
                return Err(E2eError::expected_actual(
                    &format!("'{}' nav entry visible for {}", entry, session.role()),
                    expected,
                    visible,
                ));
            }
        }
        Ok(())
    }

    /// Navigate an authenticated context to a route and report the route
    /// the client-side router settled on.
    pub async fn navigate_and_capture_route(
        &self,
        session: &AuthenticatedSession,
        route: &str,
    ) -> E2eResult<String> {
        let mut script = PageScript::with_storage_state(&session.storage_state);
        script
            .line(format!(
                "await page.goto({});",
                js_str(&self.endpoints.web_url(route))
            ))
            .line(format!(
                "await page.waitForTimeout({});",
                ROUTE_SETTLE.as_millis()
            ))
            .line("result.route = new URL(page.url()).pathname;");

        let result = self.playwright.run(&script).await?;
        Ok(result
            .get("route")
            .and_then(|r| r.as_str())
            .unwrap_or_default()
            .to_string())
    }

    /// Drive the realm-scoped identity-provider login surface. Integration
    /// scenarios only; the harness asserts the form was accepted, nothing
    /// more.
    pub async fn idp_login(&self, role: Role) -> E2eResult<()> {
        let identity = TestIdentity::for_role(role);
        let timeout = LOGIN_TIMEOUT.as_millis();

        let mut script = PageScript::new();
        script
            .line(format!(
                "await page.goto({});",
                js_str(&self.endpoints.idp_account_url())
            ))
            .line(format!(
                "await page.waitForSelector('input[name=\"username\"]', {{ timeout: {timeout} }});"
            ))
            .line(format!(
                "await page.fill('input[name=\"username\"]', {});",
                js_str(identity.email)
            ))
            .line(format!(
                "await page.fill('input[name=\"password\"]', {});",
                js_str(identity.password)
            ))
            .line("await page.click('input[type=\"submit\"]');")
            .line("await page.waitForLoadState('networkidle');")
            .line("result.form_gone = await page.locator('input[name=\"username\"]').count() === 0;");

        info!("Identity-provider login as {}", role);
        let result = self.playwright.run(&script).await?;

        let form_gone = result
            .get("form_gone")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !form_gone {
            return Err(E2eError::AssertionFailed(format!(
                "identity-provider login form still present after submitting as {role}"
            )));
        }
        Ok(())
    }
}

fn nav_result_key(entry: &str) -> String {
    format!("nav_{}", entry.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playwright::PlaywrightConfig;
    use std::path::Path;

    fn helper() -> SessionHelper {
        let endpoints = Endpoints {
            web_base: "http://web.test".into(),
            api_base: "http://api.test".into(),
            api_prefix: "/api/v1".into(),
            idp_base: "http://idp.test".into(),
            idp_realm: "timetrack".into(),
        };
        SessionHelper::new(
            endpoints,
            PlaywrightHandle::new_unchecked(PlaywrightConfig::default()),
        )
    }

    #[test]
    fn login_script_follows_the_form_flow_in_order() {
        let helper = helper();
        let identity = TestIdentity::for_role(Role::Manager);
        let script = helper.login_script(identity, false, Path::new("/tmp/state.json"));
        let body = script.body();

        let goto = body.find("page.goto('http://web.test/login')").unwrap();
        let wait = body.find("waitForSelector('input[type=\"text\"]'").unwrap();
        let fill_id = body.find("manager@timetrack.test").unwrap();
        let submit = body.find("getByRole('button', { name: 'Sign in' })").unwrap();
        let landed = body.find("waitForURL('**/dashboard'").unwrap();
        let token = body.find("localStorage.getItem('auth-token')").unwrap();
        assert!(goto < wait && wait < fill_id && fill_id < submit && submit < landed && landed < token);

        // settle delay sits between navigation and the storage read
        let settle = body.find("waitForTimeout(500)").unwrap();
        assert!(landed < settle && settle < token);

        assert!(!body.contains("remember-me"), "plain login skips the flag");
        assert!(body.contains("storageState({ path: '/tmp/state.json' })"));
    }

    #[test]
    fn remembered_login_checks_the_box_and_reads_the_flag() {
        let helper = helper();
        let identity = TestIdentity::for_role(Role::Employee);
        let script = helper.login_script(identity, true, Path::new("/tmp/state.json"));
        let body = script.body();

        assert!(body.contains("getByRole('checkbox').check()"));
        assert!(body.contains("localStorage.getItem('remember-me')"));
    }

    #[test]
    fn scenario_local_logins_do_not_target_the_setup_snapshot() {
        let helper = helper();
        let setup = helper.snapshot_path(Role::Employee, false);
        assert_eq!(
            setup,
            storage_state_path(&helper.playwright.config().state_dir, Role::Employee),
        );

        // a remembered/fresh login writes somewhere else entirely
        let fresh = helper.snapshot_path(Role::Employee, true);
        assert_ne!(fresh, setup);

        let identity = TestIdentity::for_role(Role::Employee);
        let script = helper.login_script(identity, true, &fresh);
        assert!(!script.body().contains(&setup.to_string_lossy().into_owned()));
    }

    #[test]
    fn form_wait_timeout_throws_the_marker() {
        let helper = helper();
        let identity = TestIdentity::for_role(Role::Admin);
        let script = helper.login_script(identity, false, Path::new("/tmp/state.json"));
        let body = script.body();

        let wait = body.find("waitForSelector('input[type=\"text\"]'").unwrap();
        let marker = body.find("throw new Error('login form did not render')").unwrap();
        assert!(marker > wait && marker < wait + 200, "marker belongs to the form wait");
        assert_eq!(body.matches("login form did not render").count(), 1);
    }

    #[test]
    fn only_the_marker_classifies_as_environment_not_ready() {
        let helper = helper();

        let form_missing =
            helper.classify_login_error(E2eError::Playwright("login form did not render".into()));
        assert!(matches!(form_missing, E2eError::EnvironmentNotReady(_)));

        // a timeout while filling the rendered form keeps its classification
        let fill_timeout = helper.classify_login_error(E2eError::Timeout(
            "page.fill: Timeout 15000ms exceeded waiting for locator('input[type=\"text\"]')".into(),
        ));
        assert!(matches!(fill_timeout, E2eError::Timeout(_)));

        let password_timeout = helper.classify_login_error(E2eError::Timeout(
            "page.fill: Timeout 15000ms exceeded waiting for locator('input[type=\"password\"]')"
                .into(),
        ));
        assert!(matches!(password_timeout, E2eError::Timeout(_)));
    }

    #[test]
    fn nav_keys_cover_both_restricted_entries() {
        let keys: Vec<_> = RESTRICTED_NAV_ENTRIES.iter().map(|e| nav_result_key(e)).collect();
        assert_eq!(keys, vec!["nav_customers", "nav_users"]);
    }
}
