//! CLI argument definitions for all tmplminer subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover a parameterized meta-template for one or more segment-name
    /// patterns across a fleet of device configurations.
    Mine(MineArgs),

    /// List the segment names a flavor finds across a fleet, without
    /// templating them — useful for picking a pattern to mine.
    Info(InfoArgs),
}

#[derive(Args, Debug)]
pub struct MineArgs {
    /// Directory of per-device JSON configuration files (one `<device>.json`
    /// file per device, Batfish-model shaped).
    pub input: PathBuf,

    /// Segment-name pattern (regex, matched as a prefix) to template.
    /// Repeatable to mine several patterns in one run.
    #[arg(short, long = "pattern", required = true)]
    pub patterns: Vec<String>,

    /// Segment flavor to mine.
    #[arg(short, long, value_enum)]
    pub flavor: Flavor,

    /// Directory to write per-pattern reports into (`<pattern>.txt` +
    /// `<pattern>.json`). Reports print to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML config overriding the outlier-detection thresholds.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Suppress the progress bar.
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Directory of per-device JSON configuration files.
    pub input: PathBuf,

    /// Segment flavor to list.
    #[arg(short, long, value_enum)]
    pub flavor: Flavor,
}

/// Which segment kind to mine or list.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Flavor {
    Acl,
    PrefixList,
}
