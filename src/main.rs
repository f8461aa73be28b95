use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod aggregate;
mod config;
mod error;
mod input;
mod models;
mod predict;
mod report;
mod validate;

use crate::config::Config;
use crate::models::{Mark, PredictMark, PredictionStatus};

#[derive(Parser)]
#[command(name = "sgpa-planner")]
#[command(about = "Weighted SGPA calculator and required-score predictor", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, default_value = "sgpa.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the SGPA of fully marked subjects
    Calculate {
        /// Subjects as a .json or .csv file
        #[arg(long)]
        input: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Write a markdown report instead of printing
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Work out the score needed on pending components to reach a target SGPA
    Predict {
        #[arg(long)]
        input: PathBuf,
        /// Desired SGPA between 0 and 10
        #[arg(long)]
        target: Option<f64>,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a sample input file to start from
    Template {
        /// Generate predictor input with pending marks
        #[arg(long)]
        predict: bool,
        #[arg(long, default_value = "subjects.json")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sgpa_planner=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config);

    match cli.command {
        Commands::Calculate { input, json, out } => {
            let subjects = input::load_subjects::<Mark>(&input)?;
            let result = aggregate::compute_sgpa(&subjects)?;
            tracing::info!(
                sgpa = result.sgpa,
                total_credits = result.total_credits,
                "SGPA computed"
            );

            if let Some(out) = out {
                let report = report::build_sgpa_report(&config.report, today(), &result);
                write_report(&out, &report)?;
            } else if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let decimals = config.report.decimals;
                println!(
                    "SGPA {:.*} over {} credits",
                    decimals, result.sgpa, result.total_credits
                );
                for subject in result.subject_results.iter() {
                    println!(
                        "- {} ({} credits): {:.*}% -> grade point {:.*}",
                        subject.name,
                        subject.credit,
                        decimals,
                        subject.final_percentage,
                        decimals,
                        subject.grade_point
                    );
                }
            }
        }
        Commands::Predict {
            input,
            target,
            json,
            out,
        } => {
            let target = target
                .or(config.predict.target)
                .context("no target SGPA; pass --target or set predict.target in the config")?;
            let subjects = input::load_subjects::<PredictMark>(&input)?;
            let result = predict::predict_required_marks(&subjects, target)?;
            tracing::info!(status = %result.status, target, "prediction computed");

            if let Some(out) = out {
                let report =
                    report::build_prediction_report(&config.report, today(), target, &result);
                write_report(&out, &report)?;
            } else if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let decimals = config.report.decimals;
                println!("{}", result.message);
                if result.status == PredictionStatus::Success {
                    if let Some(percentage) = result.required_percentage {
                        println!(
                            "Required score on every pending component: {:.*}%",
                            decimals, percentage
                        );
                    }
                    for required in result.required_marks.iter() {
                        println!(
                            "- {} / {}: {:.*} of {}",
                            required.subject_name,
                            required.component_name,
                            decimals,
                            required.marks_needed,
                            required.total_marks
                        );
                    }
                }
            }
        }
        Commands::Template { predict, out } => {
            if predict {
                input::write_template(&out, &input::sample_predict_subjects())?;
            } else {
                input::write_template(&out, &input::sample_subjects())?;
            }
            println!("Template written to {}.", out.display());
        }
    }

    Ok(())
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

fn write_report(out: &Path, report: &str) -> anyhow::Result<()> {
    std::fs::write(out, report)
        .with_context(|| format!("failed to write {}", out.display()))?;
    tracing::info!("Report written to {}", out.display());
    println!("Report written to {}.", out.display());
    Ok(())
}
