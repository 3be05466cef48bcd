//! Integration test common infrastructure.
//!
//! Provides a scripted in-process IRC server and helpers for building
//! dispatch requests against it.

pub mod server;

#[allow(unused_imports)]
pub use server::{FakeServer, FakeServerOptions};

use notifirc::{BuildEvent, ChannelDestination, Dispatcher, IrcConfig, NotificationRequest};

/// The build event used across the wire tests.
pub fn test_event() -> BuildEvent {
    BuildEvent {
        repository: "svenfuchs/minimal".into(),
        build_number: "2".into(),
        branch: "master".into(),
        commit: "62aae5f".into(),
        author: "Sven Fuchs".into(),
        message: "The build passed.".into(),
        compare_url: "https://github.com/svenfuchs/minimal/compare/master...develop".into(),
        build_url: "https://ci.example.org/svenfuchs/minimal/builds/2".into(),
    }
}

/// A dispatcher registering as `bot`, with test-friendly deadlines.
pub fn dispatcher() -> Dispatcher {
    Dispatcher::new(&test_irc_config())
}

pub fn test_irc_config() -> IrcConfig {
    IrcConfig {
        nick: "bot".into(),
        registration_timeout_secs: 5,
        quit_drain_secs: 5,
        ..IrcConfig::default()
    }
}

/// A request with default delivery flags and the standard test event.
pub fn request(destinations: Vec<ChannelDestination>) -> NotificationRequest {
    NotificationRequest {
        destinations,
        use_notice: false,
        skip_join: false,
        skip_registration_wait: false,
        template: None,
        event: test_event(),
    }
}

/// The three default-template lines as they appear on the wire for `bot`.
pub fn default_lines(command: &str, channel: &str) -> Vec<String> {
    vec![
        format!(
            "{command} #{channel} :[bot] svenfuchs/minimal#2 (master - 62aae5f : Sven Fuchs): The build passed."
        ),
        format!(
            "{command} #{channel} :[bot] Change view : https://github.com/svenfuchs/minimal/compare/master...develop"
        ),
        format!(
            "{command} #{channel} :[bot] Build details : https://ci.example.org/svenfuchs/minimal/builds/2"
        ),
    ]
}
