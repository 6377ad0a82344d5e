//! Structured logging for the clusto client and CLI
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the caller. The `clusto` binary calls [`init`].
//!
//! # Log Format Conventions
//!
//! - `operation`: what the proxy was doing ("show", "attrs", "contents", ...)
//! - `entity`: entity path (e.g. "/server/web1")
//! - `status`: where the answer came from ("cached", "fetched")
//! - `entry_count`: number of related entities resolved
//!
//! ```rust,ignore
//! debug!(
//!     operation = operations::SHOW,
//!     entity = %path,
//!     status = status::CACHED,
//!     "descriptor served from cache"
//! );
//! ```

use std::str::FromStr;
use std::{fmt as std_fmt, io};
use chrono::SecondsFormat;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{
    fmt::{self, format::Writer},
    prelude::*,
    EnvFilter,
};

/// Environment variable selecting the log format
pub const LOG_FORMAT_ENV: &str = "CLUSTO_LOG_FORMAT";

/// One line per event: `[timestamp] LEVEL clusto: message fields`
///
/// Interactive output is coloured and skips the timestamp; CI output is plain
/// and stamped in UTC.
struct ClustoFormatter {
    ansi: bool,
    timestamps: bool,
}

impl ClustoFormatter {
    fn for_format(format: LogFormat) -> Self {
        let interactive = format == LogFormat::Pretty;
        Self {
            ansi: interactive,
            timestamps: !interactive,
        }
    }
}

fn level_colour(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[35m",
    }
}

impl<S, N> FormatEvent<S, N> for ClustoFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std_fmt::Result {
        if self.timestamps {
            let now = chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            write!(writer, "{} ", now)?;
        }

        let level = event.metadata().level();
        if self.ansi {
            write!(writer, "{}{:5}\x1b[0m clusto: ", level_colour(level), level)?;
        } else {
            write!(writer, "{:5} clusto: ", level)?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, coloured
    Pretty,
    /// No colour, UTC timestamps (CI)
    Compact,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown log format '{}': expected pretty, compact or json",
                other
            )),
        }
    }
}

impl LogFormat {
    /// Resolve the format from `CLUSTO_LOG_FORMAT`, then `configured`, then `CI`
    pub fn resolve(configured: Option<&str>) -> Self {
        Self::resolve_with(configured, |key| std::env::var(key).ok())
    }

    pub fn resolve_with<F>(configured: Option<&str>, env_lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        env_lookup(LOG_FORMAT_ENV)
            .and_then(|v| v.parse().ok())
            .or_else(|| configured.and_then(|v| v.parse().ok()))
            .unwrap_or_else(|| {
                if env_lookup("CI").is_some() {
                    Self::Compact
                } else {
                    Self::Pretty
                }
            })
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `default_level`. Logs go to stderr so command output
/// on stdout stays machine-readable.
///
/// ```bash
/// RUST_LOG=debug clusto show web1
/// CLUSTO_LOG_FORMAT=json clusto attrs web1 --key ip
/// ```
pub fn init(default_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = match format {
        LogFormat::Pretty | LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .event_format(ClustoFormatter::for_format(format))
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_ansi(false)
                    .with_writer(io::stderr)
                    .json(),
            )
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("logging already initialised: {}", e);
    }
}

/// Operation names for consistent logging
pub mod operations {
    pub const SHOW: &str = "show";
    pub const ATTRS: &str = "attrs";
    pub const SIBLINGS: &str = "siblings";
}

/// Status values for consistent logging
pub mod status {
    pub const CACHED: &str = "cached";
    pub const FETCHED: &str = "fetched";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::{self, MakeWriter};
    use tracing_subscriber::prelude::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn render(format: LogFormat) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .event_format(ClustoFormatter::for_format(format))
                .with_writer(captured.clone()),
        );
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("Server error 500: boom");
        });
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_pretty_line_is_coloured_without_timestamp() {
        let line = render(LogFormat::Pretty);
        assert!(line.starts_with("\x1b[33mWARN "), "{line:?}");
        assert!(line.ends_with("clusto: Server error 500: boom\n"), "{line:?}");
    }

    #[test]
    fn test_compact_line_is_plain_with_utc_timestamp() {
        let line = render(LogFormat::Compact);
        let (stamp, rest) = line.split_once(' ').unwrap();
        assert!(stamp.ends_with('Z'), "{line:?}");
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
        assert_eq!(rest, "WARN  clusto: Server error 500: boom\n");
        assert!(!line.contains('\x1b'));
    }

    fn lookup<'a>(env: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| env.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("compact".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_env_overrides_config() {
        let env = HashMap::from([(LOG_FORMAT_ENV, "json")]);
        assert_eq!(
            LogFormat::resolve_with(Some("compact"), lookup(&env)),
            LogFormat::Json
        );
    }

    #[test]
    fn test_config_used_without_env() {
        let env = HashMap::new();
        assert_eq!(
            LogFormat::resolve_with(Some("compact"), lookup(&env)),
            LogFormat::Compact
        );
    }

    #[test]
    fn test_ci_defaults_to_compact() {
        let env = HashMap::from([("CI", "true")]);
        assert_eq!(LogFormat::resolve_with(None, lookup(&env)), LogFormat::Compact);

        let env = HashMap::new();
        assert_eq!(LogFormat::resolve_with(None, lookup(&env)), LogFormat::Pretty);
    }
}
