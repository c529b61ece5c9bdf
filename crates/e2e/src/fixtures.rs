//! Static test fixtures - identities, roles, and environment endpoints

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Client-side storage key the app persists the bearer credential under.
pub const AUTH_TOKEN_KEY: &str = "auth-token";

/// Client-side storage key for the optional remember-me flag.
pub const REMEMBER_ME_KEY: &str = "remember-me";

/// Navigation entries that must be hidden from employees.
pub const RESTRICTED_NAV_ENTRIES: [&str; 2] = ["Customers", "Users"];

/// A role known to the application under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Employee, Role::Manager, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// The one role-visibility rule in the harness: everyone except an
    /// employee sees the restricted navigation entries ("Customers",
    /// "Users"). All UI-visibility assertions go through this predicate.
    pub fn sees_restricted_nav(self) -> bool {
        !matches!(self, Role::Employee)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed identity used to authenticate during tests.
///
/// Immutable for the lifetime of a run; never created or destroyed.
#[derive(Debug, Clone, Copy)]
pub struct TestIdentity {
    pub role: Role,
    pub email: &'static str,
    pub password: &'static str,
    pub display_name: &'static str,
}

const IDENTITIES: [TestIdentity; 3] = [
    TestIdentity {
        role: Role::Employee,
        email: "employee@timetrack.test",
        password: "employee-pass-1",
        display_name: "Erin Employee",
    },
    TestIdentity {
        role: Role::Manager,
        email: "manager@timetrack.test",
        password: "manager-pass-1",
        display_name: "Morgan Manager",
    },
    TestIdentity {
        role: Role::Admin,
        email: "admin@timetrack.test",
        password: "admin-pass-1",
        display_name: "Avery Admin",
    },
];

impl TestIdentity {
    pub fn for_role(role: Role) -> &'static TestIdentity {
        IDENTITIES
            .iter()
            .find(|i| i.role == role)
            .expect("an identity exists for every role")
    }

    pub fn all() -> &'static [TestIdentity] {
        &IDENTITIES
    }
}

/// Base URLs of the external collaborators.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Web application under test
    pub web_base: String,

    /// API server under test
    pub api_base: String,

    /// Fixed path prefix in front of every API endpoint
    pub api_prefix: String,

    /// Identity provider (integration scenarios only)
    pub idp_base: String,

    /// Realm used for the identity-provider login surface
    pub idp_realm: String,
}

impl Endpoints {
    /// Resolve endpoints from environment variables, with defaults for a
    /// local environment.
    pub fn from_env() -> Self {
        let env = |key: &str, default: &str| {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        Self {
            web_base: env("TIMETRACK_E2E_WEB_URL", "http://127.0.0.1:5173"),
            api_base: env("TIMETRACK_E2E_API_URL", "http://127.0.0.1:3000"),
            api_prefix: "/api/v1".to_string(),
            idp_base: env("TIMETRACK_E2E_IDP_URL", "http://127.0.0.1:8080"),
            idp_realm: env("TIMETRACK_E2E_IDP_REALM", "timetrack"),
        }
    }

    /// Full URL for an API path, e.g. `api_url("/customers")`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.api_base, self.api_prefix, path)
    }

    /// Full URL for a web-app route, e.g. `web_url("/login")`.
    pub fn web_url(&self, route: &str) -> String {
        format!("{}{}", self.web_base, route)
    }

    /// Realm-scoped identity-provider account page.
    pub fn idp_account_url(&self) -> String {
        format!("{}/realms/{}/account", self.idp_base, self.idp_realm)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Path of the storage-state snapshot for a role's setup-level session,
/// used to skip repeated logins within a run. Read-only once written.
pub fn storage_state_path(state_dir: &Path, role: Role) -> PathBuf {
    state_dir.join(format!("{}-storage-state.json", role.as_str()))
}

/// Snapshot path for a scenario-local login. Unique per call so a fresh
/// login never writes over the setup-level snapshot for the role.
pub fn fresh_storage_state_path(state_dir: &Path, role: Role) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    state_dir.join(format!("{}-fresh-{}-storage-state.json", role.as_str(), seq))
}
