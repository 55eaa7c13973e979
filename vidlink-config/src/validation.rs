// vidlink-config/src/validation.rs
//! Custom validation functions for configuration.

use validator::ValidationError;

use crate::channels::ChannelConfig;

/// Validate that every channel listens on its own port.
pub fn validate_distinct_ports(config: &ChannelConfig) -> Result<(), ValidationError> {
    let mut ports = config.ports();
    ports.sort_unstable();
    if ports.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(ValidationError::new("duplicate_port"));
    }
    Ok(())
}

/// Validate a tracing level name.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let re = regex::Regex::new("^(?i)(trace|debug|info|warn|error)$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;
    if re.is_match(level) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}
