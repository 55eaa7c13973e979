// vidlink-config/src/channels.rs
//! Port assignment for the four protocol channels.

use serde::{Deserialize, Serialize};
use validator::{self, Validate, ValidationErrors};
use vidlink_protocol::channel::{CONTROL_PORT, DATA_PORT, MANAGE_PORT, TRANSFER_PORT};
use vidlink_protocol::Channel;

use crate::validation;

/// Listening ports, one per channel.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// H.264 data channel.
    #[validate(range(min = 1))]
    #[serde(default = "default_data_port")]
    pub data_port: u16,

    /// Control command channel.
    #[validate(range(min = 1))]
    #[serde(default = "default_control_port")]
    pub control_port: u16,

    /// Management command channel.
    #[validate(range(min = 1))]
    #[serde(default = "default_manage_port")]
    pub manage_port: u16,

    /// Raw transfer channel.
    #[validate(range(min = 1))]
    #[serde(default = "default_transfer_port")]
    pub transfer_port: u16,
}

fn default_data_port() -> u16 {
    DATA_PORT
}

fn default_control_port() -> u16 {
    CONTROL_PORT
}

fn default_manage_port() -> u16 {
    MANAGE_PORT
}

fn default_transfer_port() -> u16 {
    TRANSFER_PORT
}

impl ChannelConfig {
    /// Configured port for `channel`.
    pub fn port(&self, channel: Channel) -> u16 {
        match channel {
            Channel::Data => self.data_port,
            Channel::Control => self.control_port,
            Channel::Manage => self.manage_port,
            Channel::Transfer => self.transfer_port,
        }
    }

    /// Channel bound to `port`, if any.
    pub fn channel_for_port(&self, port: u16) -> Option<Channel> {
        Channel::ALL.into_iter().find(|c| self.port(*c) == port)
    }

    pub(crate) fn ports(&self) -> [u16; 4] {
        Channel::ALL.map(|c| self.port(c))
    }

    /// Range checks plus the cross-field check that no two channels share a port.
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        validation::validate_distinct_ports(self).map_err(|error| {
            let mut errors = ValidationErrors::new();
            errors.add("ports", error);
            errors
        })
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            data_port: default_data_port(),
            control_port: default_control_port(),
            manage_port: default_manage_port(),
            transfer_port: default_transfer_port(),
        }
    }
}
