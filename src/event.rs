//! CI build-event payload.

use serde::Deserialize;

/// The rendered fields of a finished build, as handed over by the
/// surrounding notification pipeline.
///
/// These are the only pieces of the CI event model this crate knows about;
/// everything else (jobs, commits, repositories) stays upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildEvent {
    /// Repository slug, e.g. `svenfuchs/minimal`.
    pub repository: String,
    /// Build or job number, as rendered upstream.
    pub build_number: String,
    /// Branch the build ran on.
    pub branch: String,
    /// Commit sha. Shortened to seven characters when rendered.
    pub commit: String,
    /// Commit author display name.
    pub author: String,
    /// Human-readable status line, e.g. `The build passed.`.
    pub message: String,
    /// Change-view (compare) URL.
    pub compare_url: String,
    /// Build-details URL.
    pub build_url: String,
}
