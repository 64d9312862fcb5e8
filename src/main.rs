//! contact-form - submit a form definition through the pipeline
//!
//! Usage: `contact-form <form.json> [--config <config.json>]`
//!
//! Loads the form, validates it, and posts it to the configured endpoint
//! with the same retry and spam rules a browser would apply.

use anyhow::{bail, Context, Result};
use clap::Parser;
use contact_form::form::{ContactForm, FormDefinition};
use contact_form::transport::HttpTransport;
use contact_form::{FormSubmissionPipeline, PipelineConfig, SubmitOutcome};
use std::io;
use std::path::PathBuf;
use tokio::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "contact-form", version, about = "Validate and submit a contact form")]
struct Args {
    /// Form definition (JSON)
    form: PathBuf,
    /// Pipeline config; defaults to the platform config directory
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contact_form=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let result = run().await;

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::load()?,
    };

    let content = std::fs::read_to_string(&args.form)
        .with_context(|| format!("Failed to read {}", args.form.display()))?;
    let definition: FormDefinition = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", args.form.display()))?;
    let form = ContactForm::from_definition(definition)?;

    let transport = HttpTransport::new()?;
    let pipeline = FormSubmissionPipeline::new(config, form, Box::new(transport));

    let outcome = pipeline.submit().await;

    {
        let form = pipeline.form();
        for field in form.input_fields() {
            if let Some(message) = field.error_message() {
                println!("{}: {}", field.name, message);
            }
        }
        if let Some(message) = form.visible_message(Instant::now()) {
            println!("{}", message.display_text());
        }
    }

    match outcome {
        SubmitOutcome::Succeeded(_) => Ok(()),
        SubmitOutcome::Invalid { first_invalid } => {
            bail!(
                "Form is invalid (first invalid field: {})",
                first_invalid.unwrap_or_default()
            )
        }
        SubmitOutcome::Rejected { message } => bail!("Submission rejected: {message}"),
        SubmitOutcome::Failed(e) => Err(e).context("Submission failed"),
        SubmitOutcome::SpamDropped | SubmitOutcome::Ignored => {
            bail!("Submission was not sent")
        }
    }
}
