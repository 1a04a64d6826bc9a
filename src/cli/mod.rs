use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "polyglotsync")]
#[command(author, version, about = "Bilingual book generator: sentence segmentation and batched machine translation", long_about = None)]
pub struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate text into one or more languages and write a bilingual book
    Generate(GenerateArgs),

    /// Show how text is split into sentences and packed into batches (offline)
    Segment(SegmentArgs),

    /// List supported language codes
    Languages,

    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., translation.target_languages)
        key: String,
        /// Value to set
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show config file path
    Path,

    /// Edit config file with default editor
    Edit,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Epub,
    Html,
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Epub => "epub",
            Self::Html => "html",
            Self::Text => "txt",
        }
    }
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Input text file, directory of .txt files, or - for stdin
    #[arg(required = true)]
    pub input: PathBuf,

    /// Source language code, or "auto" to detect it
    #[arg(short, long)]
    pub source: Option<String>,

    /// Target language code (repeatable, e.g. -t fr -t ja)
    #[arg(short = 't', long = "target")]
    pub targets: Vec<String>,

    /// Output file, or directory when the input is a directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Epub)]
    pub format: OutputFormat,

    /// Book title
    #[arg(long)]
    pub title: Option<String>,

    /// Book author
    #[arg(long)]
    pub author: Option<String>,

    /// Interface language for messages and book labels (stored as preference)
    #[arg(long)]
    pub ui_lang: Option<String>,

    /// Maximum packed characters per request
    #[arg(long)]
    pub batch_chars: Option<usize>,

    /// Maximum concurrent requests
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    /// Process subdirectories recursively
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,
}

#[derive(Parser, Debug)]
pub struct SegmentArgs {
    /// Input text file, or - for stdin
    #[arg(required = true)]
    pub input: PathBuf,

    /// Maximum packed characters per batch
    #[arg(long)]
    pub batch_chars: Option<usize>,

    /// Fragments shorter than this merge into the previous sentence
    #[arg(long)]
    pub merge_min: Option<usize>,

    /// Print batches as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
