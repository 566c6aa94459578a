//! Logger initialization for the server

use jiff::{Zoned, tz::TimeZone};
use logforth::{append::Stderr, filter::EnvFilter, layout::Layout};
use std::{fmt::Write, io::IsTerminal, str::FromStr, sync::Once};

static INIT: Once = Once::new();

/// Gateway log line: UTC timestamp with microseconds, padded level and message.
///
/// Levels are colored unless stderr is redirected.
#[derive(Debug)]
struct UtcLayout {
    colored: bool,
}

impl Layout for UtcLayout {
    fn format(
        &self,
        record: &log::Record<'_>,
        _diagnostics: &[Box<dyn logforth::diagnostic::Diagnostic>],
    ) -> anyhow::Result<Vec<u8>> {
        let mut output = String::new();

        let now = Zoned::now().with_time_zone(TimeZone::UTC);
        write!(output, "{} ", now.strftime("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        if self.colored {
            write!(output, "\x1b[{}m{:>5}\x1b[0m  ", ansi_color(record.level()), record.level())?;
        } else {
            write!(output, "{:>5}  ", record.level())?;
        }

        write!(output, "{}", record.args())?;

        Ok(output.into_bytes())
    }
}

fn ansi_color(level: log::Level) -> u8 {
    match level {
        log::Level::Error => 31,
        log::Level::Warn => 33,
        log::Level::Info => 32,
        log::Level::Debug => 34,
        log::Level::Trace => 35,
    }
}

/// Initialize the stderr logger. Only the first call has an effect.
///
/// The log_filter should be a string like "info" or "server=debug,config=debug".
/// An invalid filter falls back to "info".
pub fn init(log_filter: &str) {
    let log_filter = log_filter.to_owned();
    INIT.call_once(move || apply_logger(log_filter));
}

fn apply_logger(log_filter: String) {
    logforth::builder()
        .dispatch(move |d| {
            let filter = EnvFilter::from_str(&log_filter)
                .unwrap_or_else(|_| EnvFilter::from_str("info").expect("default filter should be valid"));

            let layout = UtcLayout {
                colored: std::io::stderr().is_terminal(),
            };

            d.filter(filter).append(Stderr::default().with_layout(layout))
        })
        .apply();
}
