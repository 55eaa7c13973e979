//! # vidlink Configuration System
//!
//! Hierarchical configuration for the vidlink receiver: channel ports,
//! decoding policy and telemetry.
//!
//! Sources are layered as defaults, `config/vidlink.yaml`,
//! `config/<VIDLINK_ENV>.yaml` and finally `VIDLINK_*` environment variables,
//! with `__` separating nested keys (`VIDLINK_DECODER__VERIFY_CHECKSUM=false`).

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod channels;
mod decoder;
mod error;
mod telemetry;
mod validation;

pub use channels::ChannelConfig;
pub use decoder::DecoderConfig;
pub use error::ConfigError;
pub use telemetry::TelemetryConfig;

const BASE_FILE: &str = "config/vidlink.yaml";
const ENV_PREFIX: &str = "VIDLINK_";

/// Top‑level configuration container for all vidlink components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq, Eq)]
pub struct VidlinkConfig {
    /// Channel port assignment.
    #[validate(nested)]
    #[serde(default)]
    pub channels: ChannelConfig,

    /// Decoding policy.
    #[validate(nested)]
    #[serde(default)]
    pub decoder: DecoderConfig,

    /// Logging and metrics.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl VidlinkConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default Values
    /// 2. `config/vidlink.yaml`. If missing, defaults are used.
    /// 3. `config/<environment>.yaml` - Environment‑specific overrides.
    /// 4. `VIDLINK_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(VidlinkConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        } else {
            println!("{} not found, using default configuration", BASE_FILE);
        }

        let env = std::env::var("VIDLINK_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration from a specific path, still honouring `VIDLINK_*` overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Self::extract(
            Figment::from(Serialized::defaults(VidlinkConfig::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        config.channels.validate_all()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn full_config_validation() {
        let config = VidlinkConfig::default();
        config.validate().expect("Default config should validate");
        config.channels.validate_all().expect("Default ports are distinct");
    }

    #[test]
    fn environment_override() {
        Jail::expect_with(|jail| {
            jail.set_env("VIDLINK_DECODER__VERIFY_CHECKSUM", "false");
            jail.set_env("VIDLINK_CHANNELS__DATA_PORT", "7007");
            let config = VidlinkConfig::load().expect("config loads");
            assert!(!config.decoder.verify_checksum);
            assert_eq!(config.channels.data_port, 7007);
            assert_eq!(config.channels.control_port, 6006);
            Ok(())
        });
    }

    #[test]
    fn yaml_file_with_size_string() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "vidlink.yaml",
                r#"
decoder:
  max_frame_size: "256KiB"
  extract_parameter_sets: false
telemetry:
  log_level: debug
"#,
            )?;
            let config = VidlinkConfig::load_from_path("vidlink.yaml").expect("config loads");
            assert_eq!(config.decoder.max_frame_size, 256 * 1024);
            assert!(!config.decoder.extract_parameter_sets);
            assert!(config.decoder.verify_checksum);
            assert_eq!(config.telemetry.log_level, "debug");
            assert_eq!(config.channels, ChannelConfig::default());
            Ok(())
        });
    }

    #[test]
    fn invalid_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "vidlink.yaml",
                "channels:\n  control_port: 6007\n",
            )?;
            assert!(matches!(
                VidlinkConfig::load_from_path("vidlink.yaml"),
                Err(ConfigError::Validation(_))
            ));

            jail.create_file("bad-level.yaml", "telemetry:\n  log_level: loud\n")?;
            assert!(matches!(
                VidlinkConfig::load_from_path("bad-level.yaml"),
                Err(ConfigError::Validation(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            VidlinkConfig::load_from_path("does/not/exist.yaml"),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
