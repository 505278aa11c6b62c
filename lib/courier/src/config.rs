//! Transport settings.

use std::time::Duration;

/// Settings of the bundled [`HyperClient`](crate::HyperClient), set through
/// [`HyperClientBuilder`](crate::HyperClientBuilder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Limit on a whole exchange, from sending the request to the last body
    /// byte. `None` waits as long as the connection stays open.
    pub timeout: Option<Duration>,
    /// Limit on establishing a TCP connection.
    pub connect_timeout: Duration,
    /// Idle connections kept per host.
    pub pool_idle_per_host: usize,
    /// How long an idle connection stays pooled.
    pub pool_idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}
