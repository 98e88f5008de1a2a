//! The process-wide sink to which statistics are written as `{prefix} {name}={value}` lines.

use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::io::stdout;
use std::io::Write;
use std::sync::Mutex;
use std::sync::OnceLock;

use convert_case::Case;
use convert_case::Casing;

/// Where and how statistics are written.
pub struct StatisticOptions {
    prefix: &'static str,
    /// Written once all statistics have been logged.
    postfix: Option<&'static str>,
    casing: Option<Case>,
    writer: Box<dyn Write + Send + Sync>,
}

impl Debug for StatisticOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticOptions")
            .field("prefix", &self.prefix)
            .field("postfix", &self.postfix)
            .field("casing", &self.casing)
            .finish_non_exhaustive()
    }
}

impl StatisticOptions {
    fn write_statistic(&mut self, name: impl Display, value: impl Display) {
        let name = match self.casing {
            Some(casing) => name.to_string().to_case(casing),
            None => name.to_string(),
        };
        let _ = writeln!(self.writer, "{} {name}={value}", self.prefix);
    }
}

static STATISTIC_OPTIONS: OnceLock<Mutex<StatisticOptions>> = OnceLock::new();

fn with_options(action: impl FnOnce(&mut StatisticOptions)) {
    let Some(options) = STATISTIC_OPTIONS.get() else {
        return;
    };
    if let Ok(mut options) = options.lock() {
        action(&mut options);
    }
}

/// Enables the logging of statistics; before this is called, statistics are discarded.
///
/// Every statistic is written on its own line, starting with `prefix`. The names are converted to
/// `casing` if it is given, and the `postfix` is written by [`log_statistic_postfix`]. Without a
/// `writer` the statistics go to stdout. Only the first call has an effect.
pub fn configure_statistic_logging(
    prefix: &'static str,
    postfix: Option<&'static str>,
    casing: Option<Case>,
    writer: Option<Box<dyn Write + Send + Sync>>,
) {
    let _ = STATISTIC_OPTIONS.get_or_init(|| {
        Mutex::new(StatisticOptions {
            prefix,
            postfix,
            casing,
            writer: writer.unwrap_or_else(|| Box::new(stdout())),
        })
    });
}

/// Writes the statistic `name` with the given value, if statistic logging is enabled.
pub fn log_statistic(name: impl Display, value: impl Display) {
    with_options(|options| options.write_statistic(name, value));
}

/// Writes the configured postfix, if any.
pub fn log_statistic_postfix() {
    with_options(|options| {
        if let Some(postfix) = options.postfix {
            let _ = writeln!(options.writer, "{postfix}");
        }
    });
}

pub fn should_log_statistics() -> bool {
    STATISTIC_OPTIONS.get().is_some()
}
