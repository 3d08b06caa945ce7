use crate::export::DuplicateStrategy;
use crate::filter::{Comparison, TimeMode};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Duplicate handling as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Keep every entry, number colliding names
    All,
    /// Keep only the most recent entry per path
    Latest,
    /// Keep only the earliest entry per path
    Oldest,
}

impl From<StrategyArg> for DuplicateStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::All => DuplicateStrategy::KeepAll,
            StrategyArg::Latest => DuplicateStrategy::KeepLatest,
            StrategyArg::Oldest => DuplicateStrategy::KeepOldest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ComparisonArg {
    #[value(alias = "gte")]
    AtLeast,
    #[value(alias = "lte")]
    AtMost,
}

impl From<ComparisonArg> for Comparison {
    fn from(arg: ComparisonArg) -> Self {
        match arg {
            ComparisonArg::AtLeast => Comparison::AtLeast,
            ComparisonArg::AtMost => Comparison::AtMost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeModeArg {
    /// Time of day, HH:MM or HH:MM:SS
    Clock,
    /// Seconds since the first loaded entry
    Seconds,
}

impl From<TimeModeArg> for TimeMode {
    fn from(arg: TimeModeArg) -> Self {
        match arg {
            TimeModeArg::Clock => TimeMode::Clock,
            TimeModeArg::Seconds => TimeMode::RelativeSeconds,
        }
    }
}
