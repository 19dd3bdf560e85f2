/// Configuration management
///
/// Loads configuration from environment variables into a type-safe struct.
/// Policy values are knobs, not laws of the domain; nothing in the engine
/// hard-codes them.
///
/// # Environment Variables
///
/// - `TASKCREW_TOKEN_SECRET`: secret for signing assertions (required, ≥32 chars)
/// - `TASKCREW_TOKEN_TTL_HOURS`: assertion lifetime (default: 24)
/// - `TASKCREW_WORKLOAD_CAPACITY`: concurrent tasks that equal 100% load (default: 5)
/// - `TASKCREW_IDLE_EFFICIENCY`: efficiency reported with zero completed tasks (default: 100)
/// - `TASKCREW_SCAN_DEADLINE_MS`: bound on any aggregation scan (default: 10000)
/// - `RUST_LOG`: log level (default: info)
///
/// # Example
///
/// ```no_run
/// use taskcrew_shared::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("capacity = {}", config.policy.workload_capacity);
/// # Ok(())
/// # }
/// ```
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Metric policy knobs
    pub policy: Policy,

    /// Assertion signing configuration
    pub token: TokenConfig,
}

/// Metric policy knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Number of concurrent active tasks that counts as 100% workload
    pub workload_capacity: u32,

    /// Efficiency reported for a principal with zero completed tasks
    ///
    /// Policy decision: a principal who has completed nothing has broken no
    /// deadline, so the default is 100.
    pub idle_efficiency: u8,

    /// Bounded deadline applied to every aggregation scan
    pub scan_deadline: Duration,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            workload_capacity: 5,
            idle_efficiency: 100,
            scan_deadline: Duration::from_millis(10_000),
        }
    }
}

/// Assertion signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Secret key for signing assertions
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Assertion lifetime in hours
    pub ttl_hours: i64,
}

impl TokenConfig {
    /// Builds a token configuration with the default 24-hour lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        TokenConfig {
            secret: secret.into(),
            ttl_hours: 24,
        }
    }

    /// Assertion lifetime as a chrono duration
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `TASKCREW_TOKEN_SECRET` is missing or too short,
    /// or if a numeric variable fails to parse or is out of range.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let secret = env::var("TASKCREW_TOKEN_SECRET")
            .map_err(|_| anyhow::anyhow!("TASKCREW_TOKEN_SECRET environment variable is required"))?;

        if secret.len() < 32 {
            anyhow::bail!("TASKCREW_TOKEN_SECRET must be at least 32 characters long");
        }

        let ttl_hours = env::var("TASKCREW_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<i64>()?;

        let workload_capacity = env::var("TASKCREW_WORKLOAD_CAPACITY")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()?;

        if workload_capacity == 0 {
            anyhow::bail!("TASKCREW_WORKLOAD_CAPACITY must be at least 1");
        }

        let idle_efficiency = env::var("TASKCREW_IDLE_EFFICIENCY")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<u8>()?;

        if idle_efficiency > 100 {
            anyhow::bail!("TASKCREW_IDLE_EFFICIENCY must be between 0 and 100");
        }

        let scan_deadline_ms = env::var("TASKCREW_SCAN_DEADLINE_MS")
            .unwrap_or_else(|_| "10000".to_string())
            .parse::<u64>()?;

        Ok(Self {
            policy: Policy {
                workload_capacity,
                idle_efficiency,
                scan_deadline: Duration::from_millis(scan_deadline_ms),
            },
            token: TokenConfig {
                secret,
                ttl_hours,
            },
        })
    }

    /// Builds a configuration from parts, for embedding and tests
    pub fn new(policy: Policy, token: TokenConfig) -> Self {
        Config { policy, token }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = Policy::default();
        assert_eq!(policy.workload_capacity, 5);
        assert_eq!(policy.idle_efficiency, 100);
        assert_eq!(policy.scan_deadline, Duration::from_millis(10_000));
    }

    #[test]
    fn test_token_config_ttl() {
        let token = TokenConfig::new("test-secret-key-at-least-32-bytes-long");
        assert_eq!(token.ttl(), chrono::Duration::hours(24));
    }
}
