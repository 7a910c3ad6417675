use std::path::PathBuf;

/// Gateway the probes run against when no base URL is given
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Test customer used for the login probe
pub const DEFAULT_SSN_ID: &str = "1001001";
pub const DEFAULT_PASSWORD: &str = "password123";

/// Login credentials sent to `/api/customers/login`
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub ssn_id: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            ssn_id: DEFAULT_SSN_ID.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

/// Probe run configuration
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Gateway base URL, without a trailing slash
    pub base_url: String,

    /// Credentials for the login step
    pub credentials: Credentials,

    /// Exit non-zero when any step does not pass
    pub strict: bool,

    /// Directory for results.json and junit.xml, if reports are enabled
    pub report_dir: Option<PathBuf>,
}

impl ProbeConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            ..Self::default()
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: Credentials::default(),
            strict: false,
            report_dir: None,
        }
    }
}

pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}
