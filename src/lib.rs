// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod event_log;
pub mod palette;
pub mod persistence;
pub mod random;
pub mod runtime;
pub mod session;
pub mod summary;

pub use error::{ConfigError, PersistError, SessionError};
pub use session::{Phase, Progress, SlideMachine};

/// Scheduling tick; short enough to close the feedback window on time
pub const TICK_RATE_MS: u64 = 50;
