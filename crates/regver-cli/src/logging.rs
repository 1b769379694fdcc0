//! Tracing initialisation from the numeric `log_level` input.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Map a numeric level (10 debug, 20 info, 30 warning, 40 error,
/// 50 critical) onto a tracing filter. Levels below 10 enable everything.
pub fn level_filter(level: i64) -> LevelFilter {
  match level {
    i64::MIN..=9 => LevelFilter::TRACE,
    10..=19 => LevelFilter::DEBUG,
    20..=29 => LevelFilter::INFO,
    30..=39 => LevelFilter::WARN,
    _ => LevelFilter::ERROR,
  }
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
pub fn init(level: i64) {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(level_filter(level).into())
        .from_env_lossy(),
    )
    .init();
}
