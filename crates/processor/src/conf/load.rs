//! Load: config loading from file and environment variables.

use std::path::Path;
use std::fs::File;
use std::io::Read;

use super::model::ProcessorConfig;

const DEFAULT_CONFIG_PATH: &str = "/etc/log-processor/processor.toml";

impl ProcessorConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = std::env::var("PROCESSOR_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!("Config file not found at {}, using environment variables", config_path);
            Self::default()
        };

        // Environment variables override file config
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: ProcessorConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Overwrite fields whose `PROCESSOR_*` variable is set and parses.
    /// A set but unparsable value is logged and the current value kept.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(log_type) = std::env::var("PROCESSOR_LOG_TYPE") {
            self.log_type = log_type;
        }
        if let Some(has_header) = env_parse("PROCESSOR_HAS_HEADER") {
            self.has_header = has_header;
        }
        if let Some(max) = env_parse("PROCESSOR_MAX_LINE_SIZE") {
            self.max_line_size = max;
        }
        if let Some(output) = env_parse("PROCESSOR_OUTPUT") {
            self.output = output;
        }
    }

    /// Validate that configuration values are sane
    pub fn validate(&self) -> Result<(), String> {
        if self.log_type.trim().is_empty() {
            return Err("log_type must not be empty".to_string());
        }
        if self.max_line_size == 0 {
            return Err("max_line_size must be > 0".to_string());
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    parse_env_value(key, std::env::var(key).ok())
}

fn parse_env_value<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}
