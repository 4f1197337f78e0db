//! Logging setup for the command-line tool.
//!
//! Logs go to stderr so stdout carries only the JSON result.

use std::io;

use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Filter used when `RUST_LOG` is unset or invalid.
///
/// The gateway's request and response records are WARN events under the `braspag` target,
/// so they stay visible while the rest of the crate logs at INFO. Silence them with
/// `RUST_LOG=info,braspag=off`.
pub const DEFAULT_FILTER: &str = "info,braspag=warn";

/// Environment variable selecting the log format.
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for interactive use.
    Pretty,
    /// One JSON object per line for log aggregation.
    Json,
}

impl LogFormat {
    /// Reads the format from `LOG_FORMAT`, defaulting to [`LogFormat::Pretty`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(&std::env::var(LOG_FORMAT_VAR).unwrap_or_default())
    }

    /// Maps `json` (any case) to [`LogFormat::Json`] and everything else to
    /// [`LogFormat::Pretty`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") { Self::Json } else { Self::Pretty }
    }
}

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` and falls back to [`DEFAULT_FILTER`]. Output goes to
/// stderr as pretty text or JSON lines depending on `format`.
pub fn init_observability(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let output = match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry().with(output).with(filter).init();
}
