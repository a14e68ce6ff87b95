//! CLI argument definitions using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "soil")]
#[command(author, version, about = "Soil laboratory test calculator")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Lab settings file (JSON); built-in assumptions when omitted
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Feedback store file
    #[arg(long, global = true, env = "SOIL_FEEDBACK_STORE", default_value = "feedback.json")]
    pub store: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON (for programming)
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one calculator from name=value fields
    ///
    /// Example: soil calc plasticity liquid_limit=45 plastic_limit=20
    Calc(CalcArgs),

    /// Run a JSON-encoded test ({"type": "Plasticity", ...})
    Run(RunArgs),

    /// Submit, list, summarise and export feedback
    #[command(subcommand)]
    Feedback(FeedbackCommands),
}

#[derive(Args, Debug)]
pub struct CalcArgs {
    /// plasticity, hydrometer, compaction, grain-size, permeability,
    /// consolidation, shear-strength or specific-gravity
    pub test: String,

    /// Field assignments (name=value)
    pub fields: Vec<String>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON file holding one test, or `-` for stdin
    pub file: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum FeedbackCommands {
    /// Submit feedback
    Submit(SubmitArgs),

    /// Record an exit answer
    Exit(ExitArgs),

    /// List feedback, newest first
    List(FilterArgs),

    /// Show dashboard statistics
    Stats,

    /// Export feedback as CSV
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub email: String,

    /// 1-5 stars, 0 for none
    #[arg(long, default_value_t = 0)]
    pub rating: u8,

    /// Feedback text
    #[arg(long)]
    pub text: String,
}

#[derive(Args, Debug)]
pub struct ExitArgs {
    /// Did you like Soil Lab?
    #[arg(value_enum)]
    pub answer: ExitAnswer,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitAnswer {
    Liked,
    Disliked,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Search text and names (case-insensitive)
    #[arg(long, default_value = "")]
    pub search: String,

    /// all, regular or exit
    #[arg(long = "type", default_value = "all")]
    pub feedback_type: String,

    /// all, no-rating or 1-5
    #[arg(long, default_value = "all")]
    pub rating: String,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output directory
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Write to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
