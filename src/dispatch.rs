//! Dispatch orchestration.
//!
//! Groups destinations by server, then delivers to each group in order:
//! open, register, join all channels, send every rendered line to every
//! channel, part all channels, quit. Groups are isolated from each other;
//! a bad server costs only its own channels.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::IrcConfig;
use crate::connection::{ConnectOptions, Connection};
use crate::error::DispatchError;
use crate::event::BuildEvent;
use crate::router::{self, ChannelDestination, ConnectionGroup};
use crate::shorten::{self, Identity, UrlShortener};
use crate::template::{self, TemplateVars};

/// One dispatch run's input.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    /// Channels to deliver to, in caller order.
    pub destinations: Vec<ChannelDestination>,
    /// Send NOTICE instead of PRIVMSG.
    pub use_notice: bool,
    /// Message channels without joining and parting them.
    pub skip_join: bool,
    /// Presume registration complete instead of waiting for a numeric.
    pub skip_registration_wait: bool,
    /// Custom template lines; `None` selects the default three-line one.
    pub template: Option<Vec<String>>,
    /// The build this notification announces.
    pub event: BuildEvent,
}

/// Outcome of one connection group.
#[derive(Debug)]
pub struct GroupOutcome {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Channels the group covered.
    pub channels: Vec<String>,
    /// Delivery result for the whole group.
    pub result: Result<(), DispatchError>,
}

/// Per-target outcomes of a dispatch run. A failed group is a partial
/// failure of the notification event, not a fatal error for the run.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// One outcome per connection group, in dispatch order.
    pub outcomes: Vec<GroupOutcome>,
}

impl DispatchReport {
    /// Number of groups fully delivered.
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of groups that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }
}

/// Delivers notifications, one connection per distinct `(host, port)`.
pub struct Dispatcher {
    nick: String,
    connect_opts: ConnectOptions,
    shortener: Arc<dyn UrlShortener>,
}

impl Dispatcher {
    /// Build a dispatcher from the IRC configuration, with the pass-through
    /// URL shortener.
    pub fn new(config: &IrcConfig) -> Self {
        Self {
            nick: config.nick.clone(),
            connect_opts: ConnectOptions {
                registration_timeout: Duration::from_secs(config.registration_timeout_secs),
                quit_drain: Duration::from_secs(config.quit_drain_secs),
                insecure_skip_verify: config.insecure_skip_verify,
            },
            shortener: Arc::new(Identity),
        }
    }

    /// Replace the URL-shortening collaborator.
    pub fn with_shortener(mut self, shortener: Arc<dyn UrlShortener>) -> Self {
        self.shortener = shortener;
        self
    }

    /// Deliver one notification to every destination.
    ///
    /// Fails fast only on an inconsistent destination set; everything after
    /// grouping is reported per target in the [`DispatchReport`].
    pub async fn run(&self, request: &NotificationRequest) -> Result<DispatchReport, DispatchError> {
        let groups = router::group(&request.destinations)?;

        let compare_url =
            shorten::shorten_or_original(self.shortener.as_ref(), &request.event.compare_url).await;
        let build_url =
            shorten::shorten_or_original(self.shortener.as_ref(), &request.event.build_url).await;
        let vars = TemplateVars::new(&request.event, compare_url, build_url);

        let mut report = DispatchReport::default();
        for group in groups {
            let channels: Vec<String> = group.channels.iter().map(|c| c.name.clone()).collect();
            let result = self.deliver_group(&group, request, &vars).await;
            match &result {
                Ok(()) => info!(
                    host = %group.target.host,
                    port = group.target.port,
                    channels = ?channels,
                    "notification delivered"
                ),
                Err(e) => warn!(
                    host = %group.target.host,
                    port = group.target.port,
                    error = %e,
                    "group delivery failed"
                ),
            }
            report.outcomes.push(GroupOutcome {
                host: group.target.host.clone(),
                port: group.target.port,
                channels,
                result,
            });
        }

        Ok(report)
    }

    async fn deliver_group(
        &self,
        group: &ConnectionGroup,
        request: &NotificationRequest,
        vars: &TemplateVars,
    ) -> Result<(), DispatchError> {
        let mut conn = Connection::open(&group.target, &self.nick, self.connect_opts).await?;

        let mut result = conn.await_registered(request.skip_registration_wait).await;

        // All channels are joined before any message is sent.
        if result.is_ok() && !request.skip_join {
            for channel in &group.channels {
                if let Err(e) = conn.join(&channel.name, channel.key.as_deref()).await {
                    result = Err(e);
                    break;
                }
            }
        }

        if result.is_ok() {
            let lines = template::render(request.template.as_deref(), vars, &self.nick);
            'sending: for channel in &group.channels {
                for line in &lines {
                    if let Err(e) = conn.say(line, &channel.name, request.use_notice).await {
                        result = Err(e);
                        break 'sending;
                    }
                }
            }
        }

        // Teardown runs on every path so the socket is not leaked. PART and
        // QUIT failures are logged rather than masking an earlier error.
        if !request.skip_join && conn.is_ready() {
            for channel in &group.channels {
                if let Err(e) = conn.leave(&channel.name).await {
                    warn!(
                        host = %group.target.host,
                        channel = %channel.name,
                        error = %e,
                        "PART failed"
                    );
                    break;
                }
            }
        }
        if let Err(e) = conn.quit().await {
            warn!(host = %group.target.host, error = %e, "QUIT failed");
        }

        result
    }
}
