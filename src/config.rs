use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use config::Map;
use config::Source;
use serde::Deserialize;

use crate::engine::ReferencePolicy;

/// Looked up with any extension `config` supports, e.g. `config/ledgerbook.toml`.
pub const DEFAULT_CONFIG_FILE: &str = "config/ledgerbook";
pub const ENV_PREFIX: &str = "LEDGERBOOK";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub reference_policy: ReferencePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "ledgerbook=info".into(),
        }
    }
}

impl LedgerConfig {
    /// Reads the optional [`DEFAULT_CONFIG_FILE`] and then the process environment,
    /// e.g. `LEDGERBOOK_ENGINE__REFERENCE_POLICY=strict`. Later sources win.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or a value does not deserialize.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(File::with_name(DEFAULT_CONFIG_FILE).required(false), None)
    }

    /// Same as [`LedgerConfig::load`] with an explicit file source and, when `env` is
    /// `Some`, an explicit set of environment variables instead of the process ones.
    pub fn from_sources(
        file: impl Source + Send + Sync + 'static,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}
