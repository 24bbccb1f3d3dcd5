use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Static documentation extractor for monitoring check templates
#[derive(Parser, Debug)]
#[command(
    name = "checkdoc",
    about = "Static documentation extractor for monitoring check templates",
    version,
    author,
    long_about = "checkdoc partially renders monitoring check templates against their \
                  declared configuration defaults and extracts the configurable \
                  variables and alarm criteria of every check, without contacting \
                  any monitored system."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Increase verbosity")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Extract check documentation from a playbook checkout",
        long_about = "Loads the configuration defaults, partially renders every check \
                      template, and prints one documentation record per check.\n\n\
                      Examples:\n  \
                      checkdoc extract\n  \
                      checkdoc extract /path/to/checkout\n  \
                      checkdoc extract --format json\n  \
                      checkdoc extract --output checks.yaml --format yaml"
    )]
    Extract(ExtractArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the playbook checkout (defaults to current directory)"
    )]
    pub root: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        long,
        value_name = "DIR",
        help = "Templates directory relative to the root (overrides CHECKDOC_TEMPLATES_DIR)"
    )]
    pub templates_dir: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Variable files directory relative to the root (overrides CHECKDOC_VARS_DIR)"
    )]
    pub vars_dir: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
