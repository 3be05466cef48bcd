//! Client-to-server command construction and serialization.
//!
//! Only the commands the dispatcher emits are modeled. `Display` renders
//! the exact wire form (without the trailing CRLF, which the codec adds).
//! Channel names are passed bare by callers and prefixed with `#` here.

use std::fmt;

/// An outbound IRC client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// `PASS <password>` — sent before NICK when the server requires one.
    Pass(String),
    /// `NICK <nick>`
    Nick(String),
    /// `USER <nick> <nick> <nick> :<nick>` — the minimal registration form
    /// used for a single-purpose notification client.
    User(String),
    /// `JOIN #<channel>[ <key>]`
    Join {
        /// Bare channel name.
        channel: String,
        /// Optional channel key.
        key: Option<String>,
    },
    /// `PART #<channel>`
    Part(String),
    /// `PRIVMSG #<channel> :<text>`
    Privmsg {
        /// Bare channel name.
        channel: String,
        /// Message payload, one line.
        text: String,
    },
    /// `NOTICE #<channel> :<text>`
    Notice {
        /// Bare channel name.
        channel: String,
        /// Message payload, one line.
        text: String,
    },
    /// `PONG <args>` — echoes a PING argument verbatim.
    Pong(String),
    /// `QUIT`
    Quit,
}

impl ClientCommand {
    /// Command name for logging. Never includes arguments, so PASS lines
    /// cannot leak credentials into logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pass(_) => "PASS",
            Self::Nick(_) => "NICK",
            Self::User(_) => "USER",
            Self::Join { .. } => "JOIN",
            Self::Part(_) => "PART",
            Self::Privmsg { .. } => "PRIVMSG",
            Self::Notice { .. } => "NOTICE",
            Self::Pong(_) => "PONG",
            Self::Quit => "QUIT",
        }
    }

    /// Build a channel message, selecting PRIVMSG or NOTICE.
    pub fn message(channel: &str, text: &str, use_notice: bool) -> Self {
        if use_notice {
            Self::Notice {
                channel: channel.to_string(),
                text: text.to_string(),
            }
        } else {
            Self::Privmsg {
                channel: channel.to_string(),
                text: text.to_string(),
            }
        }
    }
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass(password) => write!(f, "PASS {password}"),
            Self::Nick(nick) => write!(f, "NICK {nick}"),
            Self::User(nick) => write!(f, "USER {nick} {nick} {nick} :{nick}"),
            Self::Join {
                channel,
                key: Some(key),
            } => write!(f, "JOIN #{channel} {key}"),
            Self::Join { channel, key: None } => write!(f, "JOIN #{channel}"),
            Self::Part(channel) => write!(f, "PART #{channel}"),
            Self::Privmsg { channel, text } => write!(f, "PRIVMSG #{channel} :{text}"),
            Self::Notice { channel, text } => write!(f, "NOTICE #{channel} :{text}"),
            Self::Pong(args) => write!(f, "PONG {args}"),
            Self::Quit => f.write_str("QUIT"),
        }
    }
}
