use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::commands;
use std::path::PathBuf;
use std::process::ExitCode;
use tag_genie_core::config;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let (code, message) = commands::failure(&err);
            eprintln!("{}", message);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Process {
            input,
            output,
            column,
            tags,
            json,
        } => commands::process(&cfg, &input, &output, &column, tags, json).await,
        Commands::Audit { input, json } => commands::audit(&cfg, &input, json),
        Commands::Clean {
            input,
            output,
            json,
        } => commands::clean(&cfg, &input, &output, json),
    }
}

#[derive(Parser)]
#[command(name = "tag-genie")]
#[command(about = "Classify, audit and clean business directory categories", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify raw text from a CSV file using an AI model
    Process {
        /// Path to the source CSV file
        input: PathBuf,
        /// Path to save the processed CSV file
        output: PathBuf,
        /// Name of the column containing the text to classify
        column: String,
        /// Candidate tags (comma-separated); defaults to the taxonomy labels
        #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = Vec::<String>::new())]
        tags: Vec<String>,
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Analyze a processed CSV for agreement rates and high-risk mismatches
    Audit {
        /// Path to the processed CSV file (output of `process`)
        input: PathBuf,
        /// Output JSON report
        #[arg(long)]
        json: bool,
    },
    /// Apply the compliance policy to produce a final, clean dataset
    Clean {
        /// Path to the audited CSV file
        input: PathBuf,
        /// Path to save the final clean CSV file
        output: PathBuf,
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
}
