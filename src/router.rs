//! Connection grouping.
//!
//! Pure partitioning of channel destinations by `(host, port)` so that
//! channels on the same server share one connection. No I/O; operates on
//! an explicit destination list so it is independently testable.

use std::collections::HashMap;

use crate::error::RouterError;

/// One IRC server endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTarget {
    /// Server hostname.
    pub host: String,
    /// Server port (6667 if the caller gave none).
    pub port: u16,
    /// Wrap the connection in TLS.
    pub secure: bool,
    /// Optional server password, sent as PASS before registration.
    pub password: Option<String>,
}

/// A channel on a specific server.
#[derive(Debug, Clone)]
pub struct ChannelDestination {
    /// The server to deliver through.
    pub target: ServerTarget,
    /// Bare channel name (no `#`).
    pub channel: String,
    /// Optional join key.
    pub key: Option<String>,
}

/// A channel entry within a connection group.
#[derive(Debug, Clone)]
pub struct ChannelSpec {
    /// Bare channel name.
    pub name: String,
    /// Optional join key.
    pub key: Option<String>,
}

/// All destinations sharing one `(host, port)` pair, served by exactly one
/// connection.
#[derive(Debug, Clone)]
pub struct ConnectionGroup {
    /// The shared endpoint.
    pub target: ServerTarget,
    /// Channels in caller order.
    pub channels: Vec<ChannelSpec>,
}

/// Partition destinations by `(host, port)`, preserving channel order
/// within each group and first-occurrence order across groups.
///
/// Rejects destination sets where two entries for the same `(host, port)`
/// disagree on TLS or password, since one socket cannot satisfy both.
pub fn group(destinations: &[ChannelDestination]) -> Result<Vec<ConnectionGroup>, RouterError> {
    let mut groups: Vec<ConnectionGroup> = Vec::new();
    let mut index: HashMap<(String, u16), usize> = HashMap::new();

    for dest in destinations {
        let slot = (dest.target.host.clone(), dest.target.port);
        let channel = ChannelSpec {
            name: dest.channel.clone(),
            key: dest.key.clone(),
        };

        match index.get(&slot) {
            Some(&i) => {
                let existing = &mut groups[i];
                if existing.target.secure != dest.target.secure {
                    return Err(RouterError::SecureMismatch {
                        host: dest.target.host.clone(),
                        port: dest.target.port,
                    });
                }
                if existing.target.password != dest.target.password {
                    return Err(RouterError::PasswordMismatch {
                        host: dest.target.host.clone(),
                        port: dest.target.port,
                    });
                }
                existing.channels.push(channel);
            }
            None => {
                index.insert(slot, groups.len());
                groups.push(ConnectionGroup {
                    target: dest.target.clone(),
                    channels: vec![channel],
                });
            }
        }
    }

    Ok(groups)
}
