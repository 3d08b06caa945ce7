mod modes;

use crate::filter::{
    Comparison, Criteria, FilterParseError, Threshold, TimeMode, TimeWindow, from_query_string,
    parse_status_class,
};
use crate::filter::query::{DEFAULT_SIZE_MODE, DEFAULT_SPEED_MODE, parse_number};
use clap::{ArgAction, Args, Parser, Subcommand};
pub use modes::{ColorMode, ComparisonArg, OutputFormat, StrategyArg, TimeModeArg};
use std::path::PathBuf;

/// Load HAR captures, filter their entries and export response bodies
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "HARPIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// When to color the output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    /// Output format for listings and summaries
    #[arg(short = 'F', long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the entries that pass the filter
    List {
        /// HAR files to load
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Show at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Summarize loaded sources: counts, statuses, MIME types, time range
    Info {
        /// HAR files to load
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the query string (or share link) for a set of filter flags
    Query {
        #[command(flatten)]
        filter: FilterArgs,

        /// Prefix the query with this URL
        #[arg(long)]
        base: Option<String>,
    },
    /// Export response bodies of the selected entries
    Export {
        /// HAR files to load
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        export: ExportArgs,
    },
}

/// Filter flags shared by `list`, `query` and `export`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Start from a saved query string, e.g. "status=200&mime=image"
    #[arg(long = "query")]
    pub query: Option<String>,

    /// Comma-separated status codes, e.g. "200,304"
    #[arg(short, long)]
    pub status: Option<String>,

    /// Status class digits to include, e.g. "2,4" for 2xx and 4xx
    #[arg(long)]
    pub status_class: Option<String>,

    /// Whitespace-separated URL keywords; any keyword may match
    #[arg(short, long)]
    pub url: Option<String>,

    /// Case-insensitive MIME type substring
    #[arg(short, long)]
    pub mime: Option<String>,

    /// Coordinate system for --start and --end
    #[arg(long, value_enum)]
    pub time_mode: Option<TimeModeArg>,

    /// Window start (HH:MM[:SS] or seconds)
    #[arg(long)]
    pub start: Option<String>,

    /// Window end (HH:MM[:SS] or seconds)
    #[arg(long)]
    pub end: Option<String>,

    /// Size threshold in KB
    #[arg(long)]
    pub size: Option<f64>,

    #[arg(long, value_enum)]
    pub size_mode: Option<ComparisonArg>,

    /// Throughput threshold in KB/s
    #[arg(long)]
    pub speed: Option<f64>,

    #[arg(long, value_enum)]
    pub speed_mode: Option<ComparisonArg>,
}

impl FilterArgs {
    /// Builds criteria: `--query` first, explicit flags on top.
    ///
    /// `available` lists the status codes a class digit expands to.
    pub fn to_criteria(&self, available: &[u16]) -> Result<Criteria, FilterParseError> {
        let mut criteria = match self.query.as_deref() {
            Some(query) => from_query_string(query)?,
            None => Criteria::new(),
        };

        if self.status.is_some() || self.status_class.is_some() {
            criteria = criteria.clear_statuses();
        }
        if let Some(status) = self.status.as_deref() {
            criteria = criteria.with_statuses(parse_status_list(status)?);
        }
        if let Some(classes) = self.status_class.as_deref() {
            for class in classes.split(',').filter(|c| !c.trim().is_empty()) {
                criteria = criteria.with_status_class(parse_status_class(class)?, available);
            }
        }

        if let Some(url) = &self.url {
            criteria = criteria.with_url(url.clone());
        }
        if let Some(mime) = &self.mime {
            criteria = criteria.with_mime(mime.clone());
        }

        if self.time_mode.is_some() || self.start.is_some() || self.end.is_some() {
            let mode = self
                .time_mode
                .map(TimeMode::from)
                .unwrap_or_else(|| criteria.time_window().mode());
            let window = match mode {
                TimeMode::Clock => TimeWindow::clock(self.start.as_deref(), self.end.as_deref())?,
                TimeMode::RelativeSeconds => TimeWindow::relative(
                    parse_number("start", self.start.as_deref())?,
                    parse_number("end", self.end.as_deref())?,
                ),
            };
            criteria = criteria.with_time_window(window);
        }

        let size = merge_threshold(criteria.size(), self.size, self.size_mode, DEFAULT_SIZE_MODE);
        let speed = merge_threshold(
            criteria.speed(),
            self.speed,
            self.speed_mode,
            DEFAULT_SPEED_MODE,
        );
        Ok(criteria.with_size(size).with_speed(speed))
    }
}

fn parse_status_list(raw: &str) -> Result<Vec<u16>, FilterParseError> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| {
            code.parse::<u16>()
                .map_err(|_| FilterParseError::InvalidStatus(code.to_string()))
        })
        .collect()
}

/// Flag values win; a lone mode flag re-targets an existing threshold
fn merge_threshold(
    existing: Option<Threshold>,
    value: Option<f64>,
    mode: Option<ComparisonArg>,
    default_mode: Comparison,
) -> Option<Threshold> {
    let comparison = mode
        .map(Comparison::from)
        .or(existing.map(|t| t.comparison))
        .unwrap_or(default_mode);
    match (value, existing) {
        (Some(value), _) => Threshold::new(value, comparison),
        (None, Some(existing)) => Threshold::new(existing.value, comparison),
        (None, None) => None,
    }
}

/// Selection and packaging flags for `export`
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Export every loaded entry, ignoring the filter
    #[arg(long, conflicts_with = "id")]
    pub all: bool,

    /// Export only these entry ids (see `list`); repeat or comma-separate
    #[arg(long = "id", action = ArgAction::Append, value_delimiter = ',')]
    pub id: Vec<String>,

    /// Directory to write into
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Keep host and directory structure inside archives
    #[arg(long)]
    pub hierarchy: bool,

    /// What to do with entries that map to the same path
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Digits in collision suffixes
    #[arg(long)]
    pub padding: Option<usize>,
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
