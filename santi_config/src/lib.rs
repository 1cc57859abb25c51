use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context};
use chrono_tz::Tz;
use config::{File, FileFormat};
pub use duration::Duration;
use email_address::EmailAddress;
use santi_models::environment::Environment;
use serde::{Deserialize, Deserializer};
use url::Url;

mod duration;

/// The default configuration, compiled into the binary.
pub const DEFAULT_CONFIG: &str = include_str!("../../config.toml");

/// Environment variable listing additional config files.
pub const CONFIG_PATHS_VAR: &str = "SANTI_CONFIG";

const ENV_PREFIX: &str = "SANTI";

/// Conventional environment variables mapped onto config keys.
const CONVENTIONAL_VARS: &[(&str, &str)] = &[
    ("RESEND_API_KEY", "email.api_key"),
    ("EMAIL_USER", "contact.email"),
    ("PORT", "http.port"),
];

/// Loads the configuration from the default config, the files listed in
/// `SANTI_CONFIG` and the process environment.
pub fn load() -> anyhow::Result<Config> {
    let paths = std::env::var_os(CONFIG_PATHS_VAR)
        .map(|paths| std::env::split_paths(&paths).collect::<Vec<_>>())
        .unwrap_or_default();
    build(&paths, &[], true)
}

/// Loads the configuration from the default config, the given files and
/// inline TOML overrides. The process environment is ignored.
pub fn load_with_overrides(
    paths: &[impl AsRef<Path>],
    overrides: &[&str],
) -> anyhow::Result<Config> {
    build(paths, overrides, false)
}

fn build(paths: &[impl AsRef<Path>], overrides: &[&str], env: bool) -> anyhow::Result<Config> {
    let builder = config::Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

    let builder = paths.iter().try_fold(builder, |builder, path| {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        anyhow::Ok(builder.add_source(File::from_str(&content, FileFormat::Toml)))
    })?;

    let mut builder = overrides.iter().fold(builder, |builder, x| {
        builder.add_source(File::from_str(x, FileFormat::Toml))
    });

    if env {
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        for &(var, key) in CONVENTIONAL_VARS {
            let value = std::env::var(var).ok().filter(|x| !x.trim().is_empty());
            builder = builder.set_override_option(key, value)?;
        }

        if let Ok(node_env) = std::env::var("NODE_ENV") {
            let environment = match node_env.as_str() {
                "production" => Environment::Production,
                _ => Environment::Development,
            };
            builder = builder.set_override("environment", environment.as_str())?;
        }
    }

    let config: Config = builder
        .build()?
        .try_deserialize()
        .context("Failed to load config")?;

    ensure!(
        !config.email.api_key.trim().is_empty(),
        "Invalid config: email.api_key must not be empty"
    );

    Ok(config)
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub http: HttpConfig,
    pub cache: CacheConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub rate_limit: RateLimitConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    pub static_dir: PathBuf,
    pub body_limit: usize,
    pub real_ip: Option<RealIpConfig>,
}

/// Where to find the address of the client when running behind a reverse
/// proxy.
#[derive(Debug, Deserialize)]
pub struct RealIpConfig {
    pub header: String,
    /// Only trust the header on connections from this address.
    pub set_from: Option<IpAddr>,
}

#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
    pub purge_interval: Duration,
}

#[derive(Deserialize)]
pub struct EmailConfig {
    pub api_key: String,
    pub endpoint: Url,
    pub from: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &"[redacted]")
            .field("endpoint", &self.endpoint)
            .field("from", &self.from)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    pub email: EmailAddress,
    #[serde(deserialize_with = "deserialize_timezone")]
    pub timezone: Tz,
    pub send_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitConfig {
    pub general: RateLimitPolicyConfig,
    pub contact: RateLimitPolicyConfig,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitPolicyConfig {
    pub max_requests: u64,
    pub window: Duration,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}

fn deserialize_timezone<'de, D>(deserializer: D) -> Result<Tz, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse()
        .map_err(|_| serde::de::Error::custom(format!("Unknown timezone: {name:?}")))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use santi_utils::assert_matches;

    use super::*;

    const REQUIRED: &[&str] = &[
        r#"email.api_key = "re_test""#,
        r#"contact.email = "info@example.com""#,
    ];

    fn load(overrides: &[&str]) -> anyhow::Result<Config> {
        load_with_overrides(&[] as &[PathBuf], overrides)
    }

    #[test]
    fn load_default_config() {
        let config = load(REQUIRED).unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.http.body_limit, 10 * 1024);
        assert!(config.cache.url.is_none());
        assert_eq!(config.email.api_key, "re_test");
        assert_eq!(config.contact.email.as_str(), "info@example.com");
        assert_eq!(config.contact.timezone, chrono_tz::Europe::Rome);
        assert_eq!(config.rate_limit.general.max_requests, 300);
        assert_eq!(*config.rate_limit.general.window, Duration::from_secs(180));
        assert_eq!(config.rate_limit.contact.max_requests, 5);
        assert_eq!(*config.rate_limit.contact.window, Duration::from_secs(3600));
    }

    #[test]
    fn debug_hides_api_key() {
        let config = load(REQUIRED).unwrap();
        let output = format!("{config:?}");
        assert!(!output.contains("re_test"));
        assert!(output.contains("[redacted]"));
    }

    #[test]
    fn missing_api_key() {
        assert_matches!(load(&[REQUIRED[1]]), Err(_));
    }

    #[test]
    fn blank_api_key() {
        for api_key in [r#"email.api_key = """#, r#"email.api_key = "  ""#] {
            assert_matches!(load(&[api_key, REQUIRED[1]]), Err(_));
        }
    }

    #[test]
    fn missing_destination_mailbox() {
        assert_matches!(load(&[REQUIRED[0]]), Err(_));
    }

    #[test]
    fn invalid_destination_mailbox() {
        assert_matches!(
            load(&[REQUIRED[0], r#"contact.email = "not an address""#]),
            Err(_)
        );
    }

    #[test]
    fn invalid_timezone() {
        let mut overrides = REQUIRED.to_vec();
        overrides.push(r#"contact.timezone = "Europe/Atlantis""#);
        assert_matches!(load(&overrides), Err(_));
    }

    #[test]
    fn production_overrides() {
        let mut overrides = REQUIRED.to_vec();
        overrides.push(r#"environment = "production""#);
        overrides.push(r#"http.real_ip = { header = "X-Real-Ip", set_from = "127.0.0.1" }"#);
        let config = load(&overrides).unwrap();

        assert_eq!(config.environment, Environment::Production);
        let real_ip = config.http.real_ip.unwrap();
        assert_eq!(real_ip.header, "X-Real-Ip");
        assert_eq!(real_ip.set_from, Some([127, 0, 0, 1].into()));
    }
}
