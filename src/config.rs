//! Configuration loading.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::router::{ChannelDestination, ServerTarget};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Client identity and delivery behavior.
    #[serde(default)]
    pub irc: IrcConfig,
    /// Destination server blocks.
    #[serde(default)]
    pub server: Vec<ServerBlock>,
}

/// Client identity and delivery behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IrcConfig {
    /// Nick used for registration and as the message prefix.
    pub nick: String,
    /// How long to wait for the server's first numeric reply.
    pub registration_timeout_secs: u64,
    /// How long to drain inbound lines after QUIT.
    pub quit_drain_secs: u64,
    /// Accept invalid TLS certificates (legacy self-signed servers only).
    pub insecure_skip_verify: bool,
    /// Send NOTICE instead of PRIVMSG.
    pub use_notice: bool,
    /// Message channels without joining and parting them.
    pub skip_join: bool,
    /// Custom message template; defaults to the three-line notification.
    pub template: Option<TemplateConfig>,
}

impl Default for IrcConfig {
    fn default() -> Self {
        Self {
            nick: "notifirc".to_string(),
            registration_timeout_secs: 60,
            quit_drain_secs: 5,
            insecure_skip_verify: false,
            use_notice: false,
            skip_join: false,
            template: None,
        }
    }
}

/// A template is either a single line or a list of lines.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TemplateConfig {
    /// One template line.
    Single(String),
    /// Several template lines, one message each.
    Lines(Vec<String>),
}

impl TemplateConfig {
    /// Normalize to a list of template lines.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Single(line) => vec![line.clone()],
            Self::Lines(lines) => lines.clone(),
        }
    }
}

/// One destination server and its channels.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerBlock {
    /// Server hostname.
    pub host: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Wrap the connection in TLS.
    #[serde(default)]
    pub ssl: bool,
    /// Optional server password.
    pub password: Option<String>,
    /// Channels to notify on this server.
    pub channels: Vec<ChannelEntry>,
}

/// A channel entry is a bare name or a name with a join key.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChannelEntry {
    /// Bare channel name.
    Name(String),
    /// Channel with a join key.
    WithKey {
        /// Bare channel name.
        name: String,
        /// Join key.
        key: String,
    },
}

fn default_port() -> u16 {
    6667
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Flatten server blocks into routable channel destinations.
    pub fn destinations(&self) -> Vec<ChannelDestination> {
        let mut out = Vec::new();
        for block in &self.server {
            let target = ServerTarget {
                host: block.host.clone(),
                port: block.port,
                secure: block.ssl,
                password: block.password.clone(),
            };
            for entry in &block.channels {
                let (channel, key) = match entry {
                    ChannelEntry::Name(name) => (name.clone(), None),
                    ChannelEntry::WithKey { name, key } => (name.clone(), Some(key.clone())),
                };
                out.push(ChannelDestination {
                    target: target.clone(),
                    channel,
                    key,
                });
            }
        }
        out
    }
}
