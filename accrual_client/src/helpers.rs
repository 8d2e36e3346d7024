use std::time::Duration;

/// Interprets the value of a `Retry-After` header. Only the delay-seconds form is supported; HTTP dates yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
