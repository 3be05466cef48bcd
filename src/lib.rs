//! notifirc - outbound IRC notification dispatcher.
//!
//! Delivers CI build-status messages to IRC channels spread across one or
//! more servers, opening exactly one connection per distinct `(host, port)`
//! target and sequencing registration, joins, message delivery, parts and
//! teardown on each.

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod router;
pub mod shorten;
pub mod template;
pub mod transport;

pub use crate::config::{Config, IrcConfig};
pub use crate::dispatch::{DispatchReport, Dispatcher, NotificationRequest};
pub use crate::error::{DispatchError, RouterError};
pub use crate::event::BuildEvent;
pub use crate::router::{ChannelDestination, ServerTarget};
