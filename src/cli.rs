use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::inference::external::{DEFAULT_SCORER_PROGRAM, DEFAULT_SCORER_SCRIPT, DEFAULT_TIMEOUT};

#[derive(Debug, Parser)]
#[command(
    name = "kira-ctgqc",
    version,
    about = "CTG spreadsheet cleaning and batch risk scoring"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Run(RunArgs),
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, help = "Input workbook (.xlsx/.xls/.ods) or .csv/.tsv[.gz] file")]
    pub input: PathBuf,

    #[arg(long, help = "Output directory for --json/--tsv artifacts")]
    pub out: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub tsv: bool,

    #[arg(
        long,
        env = "KIRA_CTGQC_SCORER",
        default_value = DEFAULT_SCORER_PROGRAM,
        help = "Model scorer program"
    )]
    pub scorer: String,

    #[arg(
        long = "scorer-arg",
        allow_hyphen_values = true,
        help = "Argument passed to the scorer as-is (repeatable)"
    )]
    pub scorer_args: Vec<String>,

    #[arg(
        long = "scorer-args",
        env = "KIRA_CTGQC_SCORER_ARGS",
        allow_hyphen_values = true,
        help = "Whitespace-separated scorer arguments"
    )]
    pub scorer_args_line: Option<String>,

    #[arg(
        long,
        env = "KIRA_CTGQC_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        help = "Seconds before the scorer is killed"
    )]
    pub timeout_secs: u64,

    #[arg(
        long,
        default_value_t = false,
        help = "Skip the model and use the rule-based scorer"
    )]
    pub no_model: bool,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "Input workbook or delimited file")]
    pub input: PathBuf,
}

impl RunArgs {
    /// Repeated `--scorer-arg` values win, then the whitespace-split
    /// `--scorer-args` line, then the bundled script.
    pub fn scorer_argv(&self) -> Vec<String> {
        if !self.scorer_args.is_empty() {
            return self.scorer_args.clone();
        }
        match &self.scorer_args_line {
            Some(line) => line.split_whitespace().map(str::to_string).collect(),
            None => vec![DEFAULT_SCORER_SCRIPT.to_string()],
        }
    }
}
