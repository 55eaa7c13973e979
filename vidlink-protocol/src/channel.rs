//! ## vidlink-protocol::channel
//! The four logical channels and their well-known ports.

use std::fmt;

pub const CONTROL_PORT: u16 = 6006;
pub const DATA_PORT: u16 = 6007;
pub const MANAGE_PORT: u16 = 6008;
pub const TRANSFER_PORT: u16 = 6009;

/// A logical channel of the transfer protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// H.264 elementary-stream data.
    Data,
    /// Control commands.
    Control,
    /// Management commands.
    Manage,
    /// Raw addressed transfer with a one-byte length.
    Transfer,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Data,
        Channel::Control,
        Channel::Manage,
        Channel::Transfer,
    ];

    /// The default port this channel listens on.
    pub fn port(self) -> u16 {
        match self {
            Channel::Data => DATA_PORT,
            Channel::Control => CONTROL_PORT,
            Channel::Manage => MANAGE_PORT,
            Channel::Transfer => TRANSFER_PORT,
        }
    }

    /// Maps a default port back to its channel.
    pub fn from_port(port: u16) -> Option<Channel> {
        Channel::ALL.into_iter().find(|c| c.port() == port)
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Data => "data",
            Channel::Control => "control",
            Channel::Manage => "manage",
            Channel::Transfer => "transfer",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "data" => Ok(Channel::Data),
            "control" => Ok(Channel::Control),
            "manage" | "management" => Ok(Channel::Manage),
            "transfer" | "raw" => Ok(Channel::Transfer),
            other => Err(format!("unknown channel '{other}'")),
        }
    }
}
