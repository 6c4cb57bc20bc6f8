use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{HeraldError, Result};
use crate::reminder::{default_buckets, BucketSpec};

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Top-level config (herald.toml + HERALD_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeraldConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Shared secret expected in `X-Telegram-Bot-Api-Secret-Token` on
    /// webhook calls. `None` disables the check.
    pub webhook_secret: Option<String>,
    /// Fixed recipient for every reminder notification (the supervisor
    /// chat). Falls back to each reminder's owner chat when unset.
    pub notify_chat_id: Option<i64>,
    /// Chats allowed to issue commands. Empty list = open access.
    #[serde(default)]
    pub allow_chats: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Shared secret expected in `X-API-Key` on /sweep. `None` leaves the
    /// endpoint open.
    pub api_key: Option<String>,
    /// IANA zone used to interpret stored dates and times — applied
    /// uniformly, never the host's local zone.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Lead/tolerance tuning per bucket. The bucket set itself is fixed.
    #[serde(default = "default_buckets")]
    pub buckets: Vec<BucketSpec>,
    /// Dev mode: run the sweep in-process every N seconds instead of
    /// waiting for the external trigger.
    pub interval_secs: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timezone: default_timezone(),
            buckets: default_buckets(),
            interval_secs: None,
        }
    }
}

impl SweepConfig {
    /// Parse the configured zone name into a `chrono_tz::Tz`.
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse()
            .map_err(|_| HeraldError::Timezone(self.timezone.clone()))
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_timezone() -> String {
    "UTC".to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.herald/herald.db")
}

impl HeraldConfig {
    /// Load config from a TOML file with HERALD_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.herald/herald.toml
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: HeraldConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("HERALD_").split("_"))
            .extract()
            .map_err(|e| HeraldError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.herald/herald.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::Bucket;

    #[test]
    fn sweep_defaults() {
        let sweep = SweepConfig::default();
        assert_eq!(sweep.timezone, "UTC");
        assert_eq!(sweep.tz().unwrap(), chrono_tz::UTC);
        assert_eq!(sweep.buckets.len(), 2);
        assert!(sweep.api_key.is_none());
    }

    #[test]
    fn bad_timezone_is_rejected() {
        let sweep = SweepConfig {
            timezone: "Mars/Olympus_Mons".into(),
            ..SweepConfig::default()
        };
        assert!(matches!(sweep.tz(), Err(HeraldError::Timezone(_))));
    }

    #[test]
    fn bucket_tuning_deserialises_from_toml() {
        let sweep: SweepConfig = Figment::new()
            .merge(Toml::string(
                r#"
                timezone = "Europe/Oslo"
                [[buckets]]
                bucket = "24h"
                lead_hours = 48.0
                tolerance_hours = 1.0
                "#,
            ))
            .extract()
            .unwrap();
        assert_eq!(sweep.buckets.len(), 1);
        assert_eq!(sweep.buckets[0].bucket, Bucket::H24);
        assert_eq!(sweep.buckets[0].lead_hours, 48.0);
    }
}
