//! # notifirc-proto
//!
//! Wire-protocol primitives for the notifirc dispatcher.
//!
//! The dispatcher speaks a deliberately small subset of the IRC client
//! protocol: registration (`PASS`/`NICK`/`USER`), channel membership
//! (`JOIN`/`PART`), message delivery (`PRIVMSG`/`NOTICE`), keepalive
//! (`PONG`) and teardown (`QUIT`). This crate provides:
//!
//! - [`ClientCommand`]: typed construction and serialization of those
//!   outbound commands
//! - [`ServerLine`]: classification of inbound server lines into the two
//!   shapes the dispatcher reacts to (PING requests and numeric replies)
//! - [`LineCodec`]: a newline-terminated line codec for tokio

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod codec;
pub mod command;
pub mod error;
pub mod line;

pub use self::codec::LineCodec;
pub use self::command::ClientCommand;
pub use self::error::ProtoError;
pub use self::line::ServerLine;
