//! notifirc - outbound IRC notification dispatcher.
//!
//! Reads a TOML configuration and a build-event JSON payload, then delivers
//! the rendered notification to every configured channel.

use anyhow::Context;
use notifirc::{BuildEvent, Config, Dispatcher, NotificationRequest};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "notifirc.toml".to_string());
    let event_path = args.next().unwrap_or_else(|| "-".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    let event: BuildEvent = if event_path == "-" {
        serde_json::from_reader(std::io::stdin().lock())
            .context("failed to parse build event from stdin")?
    } else {
        let raw = std::fs::read_to_string(&event_path)
            .with_context(|| format!("failed to read event file {event_path}"))?;
        serde_json::from_str(&raw).context("failed to parse build event")?
    };

    info!(
        repository = %event.repository,
        build = %event.build_number,
        targets = config.server.len(),
        "Dispatching IRC notifications"
    );

    let request = NotificationRequest {
        destinations: config.destinations(),
        use_notice: config.irc.use_notice,
        skip_join: config.irc.skip_join,
        skip_registration_wait: false,
        template: config.irc.template.as_ref().map(|t| t.lines()),
        event,
    };

    let dispatcher = Dispatcher::new(&config.irc);
    let report = dispatcher.run(&request).await?;

    info!(
        delivered = report.delivered(),
        failed = report.failed(),
        "Dispatch complete"
    );

    if !report.outcomes.is_empty() && report.delivered() == 0 {
        anyhow::bail!("all {} destination groups failed", report.failed());
    }
    Ok(())
}
