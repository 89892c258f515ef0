// src/constants.rs

use std::time::Duration;

/// Storage key holding the serialized session collection
pub const SESSIONS_KEY: &str = "sessions";

/// Storage key holding the settings record
pub const SETTINGS_KEY: &str = "settings";

/// Suffix appended to a storage key when preserving unparseable data
pub const CORRUPT_KEY_SUFFIX: &str = ".corrupt";

/// Default standard countdown (25 minutes)
pub const DEFAULT_STANDARD_TIMER_SECS: u32 = 25 * 60;

/// Default Pomodoro work phase (25 minutes)
pub const DEFAULT_WORK_SECS: u32 = 25 * 60;

/// Default Pomodoro short break (5 minutes)
pub const DEFAULT_SHORT_BREAK_SECS: u32 = 5 * 60;

/// Default Pomodoro long break (15 minutes)
pub const DEFAULT_LONG_BREAK_SECS: u32 = 15 * 60;

/// Default number of work phases before a long break
pub const DEFAULT_LONG_BREAK_INTERVAL: u32 = 4;

/// Maximum configurable timer duration (24 hours)
pub const MAX_TIMER_SECS: u32 = 24 * 60 * 60;

/// Maximum work phases between long breaks
pub const MAX_LONG_BREAK_INTERVAL: u32 = 12;

/// Real-time interval between timer ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Elapsed seconds between automatic saves of a running session
pub const AUTOSAVE_INTERVAL_SECS: u64 = 60;

/// Number of sessions returned by recent-session views when no limit is given
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Name given to sessions saved without one
pub const UNTITLED_SESSION_NAME: &str = "Untitled Session";

/// Maximum session name length
pub const MAX_SESSION_NAME_LEN: usize = 200;

/// Maximum goal text length
pub const MAX_GOAL_TEXT_LEN: usize = 500;

/// Maximum description or reflection length
pub const MAX_NOTES_LEN: usize = 10_000;

/// Maximum display name length for blocked sites and study materials
pub const MAX_LINK_NAME_LEN: usize = 100;

/// Maximum URL length for blocked sites and study materials
pub const MAX_LINK_URL_LEN: usize = 500;

/// Host protocol message limit (1 MiB)
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;
