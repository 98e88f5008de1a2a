use std::fmt::Display;

use itertools::Itertools;

use super::statistic_logging::log_statistic;

/// Logs statistics under a common name, such as `BinPacking_number_0_num_calls` for the
/// statistics of a propagator.
#[derive(Debug, Default, Clone)]
pub struct StatisticLogger {
    name: String,
}

impl StatisticLogger {
    /// Joins the given parts with underscores to form the name.
    pub fn new<Part: Display>(parts: impl IntoIterator<Item = Part>) -> Self {
        Self {
            name: parts.into_iter().join("_"),
        }
    }

    /// A logger whose name is extended with `suffix`.
    pub fn attach_to_prefix(&self, suffix: impl Display) -> Self {
        Self {
            name: format!("{}_{suffix}", self.name),
        }
    }

    pub fn log_statistic(&self, value: impl Display) {
        log_statistic(&self.name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_joined_with_underscores() {
        let logger =
            StatisticLogger::new(["BinPacking", "number", "3"]).attach_to_prefix("num_calls");
        assert_eq!("BinPacking_number_3_num_calls", logger.name);
    }
}
