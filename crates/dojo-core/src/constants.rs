//! Engine-wide constants.

use std::time::Duration;

/// Maximum number of new (non-follow-up) questions per interview.
///
/// The count-based completion rule built on this cap is authoritative; the
/// model's own completion judgment is advisory wording only.
pub const MAX_QUESTIONS: u32 = 6;

/// Number of recent messages included in turn-level generation requests.
/// Older context is intentionally dropped to bound prompt size.
pub const HISTORY_WINDOW: usize = 10;

/// How long a completed session is retained before sweeping.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(60 * 60);

/// Interval between background sweep passes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);
