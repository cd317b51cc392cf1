use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use symptom_triage::config::TriageConfig;
use symptom_triage::feedback::{FeedbackEntry, FeedbackSink};

#[derive(Parser)]
#[command(name = "symptom-triage", version, about = "Symptom-to-disease inference assistant")]
struct Cli {
    /// Directory holding vocabulary.json and disease_model.json
    #[arg(long, global = true, env = "SYMPTOM_TRIAGE_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Directory holding the description/precaution CSV files
    #[arg(long, global = true, env = "SYMPTOM_TRIAGE_DATASET_DIR")]
    dataset_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict diseases from comma-separated symptoms and print the assessment as JSON
    Predict {
        /// Symptom text, e.g. "high temperature, bad cough"
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// List the recognized symptom labels
    Symptoms,
    /// Record a correction of a wrong prediction
    Feedback {
        #[arg(long)]
        symptoms: String,
        #[arg(long)]
        predicted: String,
        #[arg(long)]
        correct: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    symptom_triage::init_tracing();

    let mut cfg = TriageConfig::from_env().context("invalid configuration")?;
    if let Some(dir) = cli.model_dir {
        cfg.model_dir = dir;
    }
    if let Some(dir) = cli.dataset_dir {
        cfg.dataset_dir = dir;
    }

    match cli.command {
        Command::Predict { text } => {
            let assistant =
                symptom_triage::build_assistant(&cfg).context("cannot create symptom matcher")?;
            match assistant.assess(&text.join(", ")) {
                Ok(assessment) => {
                    println!("{}", serde_json::to_string_pretty(&assessment)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    let body = serde_json::json!({
                        "error": e.kind(),
                        "message": e.user_message(),
                    });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Symptoms => {
            let assistant =
                symptom_triage::build_assistant(&cfg).context("cannot create symptom matcher")?;
            if !assistant.pipeline().is_ready() {
                anyhow::bail!("prediction model unavailable; see log for details");
            }
            for label in assistant.symptom_options() {
                println!("{label}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Feedback {
            symptoms,
            predicted,
            correct,
        } => {
            let sink = FeedbackSink::open(&cfg.feedback_path)
                .with_context(|| format!("cannot open {}", cfg.feedback_path.display()))?;
            let written = sink.record(&FeedbackEntry {
                user_symptoms: symptoms,
                predicted_disease: predicted,
                correct_disease: correct,
            })?;
            if written {
                println!("Feedback recorded in {}", sink.path().display());
            } else {
                println!("Correction matches the prediction; nothing recorded");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
