use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use kira_ctgqc::cli::{Cli, Commands, RunArgs, ValidateArgs};
use kira_ctgqc::error::UploadError;
use kira_ctgqc::inference::{ExternalProcessScorer, ScorerConfig};
use kira_ctgqc::io;
use kira_ctgqc::service::{UploadOptions, UploadService};
use kira_ctgqc::store::PatientStore;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args)?,
        Commands::Validate(args) => validate(args)?,
    }

    Ok(())
}

fn run(args: RunArgs) -> Result<()> {
    if (args.json || args.tsv) && args.out.is_none() {
        anyhow::bail!("--json/--tsv require --out");
    }
    let scorer_args = args.scorer_argv();
    let options = UploadOptions {
        out_dir: args.out,
        write_json: args.json,
        write_tsv: args.tsv,
        threads: args.threads,
    };
    let store = Arc::new(PatientStore::new());
    let service = if args.no_model {
        UploadService::without_model(store, options)
    } else {
        let config = ScorerConfig {
            program: args.scorer,
            args: scorer_args,
            timeout: Duration::from_secs(args.timeout_secs),
        };
        UploadService::new(store, Arc::new(ExternalProcessScorer::new(config)), options)
    };

    match service.upload(&args.input) {
        Ok(summary) => {
            print!("{}", io::summary::format_summary(&summary));
            if let Some(reason) = &summary.fallback_reason {
                println!("warnings:");
                println!("- model scoring failed: {}", reason);
            }
            Ok(())
        }
        Err(err) => Err(rejected(err)),
    }
}

fn validate(args: ValidateArgs) -> Result<()> {
    let service = UploadService::without_model(
        Arc::new(PatientStore::new()),
        UploadOptions::default(),
    );
    match service.inspect(&args.input) {
        Ok(stats) => {
            println!("kira-ctgqc validate ok");
            print!("{}", io::summary::format_cleaning(&stats));
            Ok(())
        }
        Err(err) => Err(rejected(err)),
    }
}

fn rejected(err: UploadError) -> anyhow::Error {
    if let Some(stats) = err.stats() {
        eprintln!("upload rejected; partial cleaning stats:");
        eprint!("{}", io::summary::format_cleaning(stats));
    }
    err.into()
}
