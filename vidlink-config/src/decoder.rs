// vidlink-config/src/decoder.rs
//! Decoding policy applied by the receive engine.

use serde::{Deserialize, Deserializer, Serialize};
use validator::{self, Validate};

/// Decoder configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Drop frames whose XOR trailer does not match.
    #[serde(default = "default_true")]
    pub verify_checksum: bool,

    /// Look for SPS/PPS in every verified data packet.
    #[serde(default = "default_true")]
    pub extract_parameter_sets: bool,

    /// Largest reassembled picture, in bytes.
    #[validate(range(min = 64, max = 16777216))]
    #[serde(default = "default_max_frame_size", deserialize_with = "deserialize_size")]
    pub max_frame_size: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_frame_size() -> usize {
    1048576
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeValue {
    Num(usize),
    Str(String),
}

/// Accepts plain numbers or human-friendly sizes such as "512KiB".
fn deserialize_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    match SizeValue::deserialize(deserializer)? {
        SizeValue::Num(n) => Ok(n),
        SizeValue::Str(s) => parse_size(&s).map_err(serde::de::Error::custom),
    }
}

pub(crate) fn parse_size(s: &str) -> Result<usize, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (num_part, unit_part) = s.split_at(split);
    let number: f64 = num_part
        .parse()
        .map_err(|e| format!("Invalid size '{}': {}", s, e))?;
    let multiplier = match unit_part.trim().to_lowercase().as_str() {
        "kb" | "kib" => 1024.0,
        "mb" | "mib" => 1024.0 * 1024.0,
        "b" | "" => 1.0,
        _ => return Err(format!("Unknown size unit in '{}'", s)),
    };
    Ok((number * multiplier) as usize)
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            verify_checksum: default_true(),
            extract_parameter_sets: default_true(),
            max_frame_size: default_max_frame_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("4096"), Ok(4096));
        assert_eq!(parse_size("512KiB"), Ok(512 * 1024));
        assert_eq!(parse_size(" 2 MB "), Ok(2 * 1024 * 1024));
        assert_eq!(parse_size("1.5kb"), Ok(1536));
        assert!(parse_size("12 parsecs").is_err());
        assert!(parse_size("KiB").is_err());
    }

    #[test]
    fn test_frame_size_bounds() {
        let config = DecoderConfig {
            max_frame_size: 16,
            ..DecoderConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(DecoderConfig::default().validate().is_ok());
    }
}
