use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AccrualConfig {
    /// Base URL of the accrual authority, e.g. `http://localhost:8081`. Any trailing slash is ignored.
    pub base_url: String,
    /// Upper bound on a single request, connection time included.
    pub timeout: Duration,
}

impl AccrualConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), timeout }
    }
}
