//! Command-line entry point for decoding responses and validating answers

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dv_core::Record;
use dv_data::{Response, SchemaTypeDecoder};
use dv_views::{AnswerContext, ViewCapabilityValidator};

mod cli;
mod config;

use cli::{CliOpts, Command};
use config::AppConfig;

/// Decode every row of a response
fn decode_records(response: &Response, config: &AppConfig) -> Vec<Record> {
    SchemaTypeDecoder::new()
        .with_config(config.decode.clone())
        .decode_response(response)
}

/// Install decoded data from `response`, if given, then validate the answer
fn validate_answer(
    mut answer: AnswerContext,
    response: Option<&Response>,
    config: &AppConfig,
) -> Result<AnswerContext> {
    if let Some(response) = response {
        let records = decode_records(response, config);
        let schema = response.schema.clone().unwrap_or_default();
        answer = answer.with_data(records, schema);
    }

    let validator = ViewCapabilityValidator::new().with_config(config.validator.clone());
    validator.normalize_and_validate(answer).map_err(|e| {
        error!("Answer rejected: {}", e);
        e.into()
    })
}

fn load_response(path: &std::path::Path) -> Result<Response> {
    Response::from_path(path).with_context(|| format!("loading response {}", path.display()))
}

fn run(opts: CliOpts) -> Result<()> {
    let config = match &opts.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let output = match opts.command {
        Command::Decode { response } => {
            let response = load_response(&response)?;
            let records = decode_records(&response, &config);
            info!("Decoded {} records", records.len());
            serde_json::to_string_pretty(&records)?
        }
        Command::Validate { answer, response } => {
            let text = std::fs::read_to_string(&answer)
                .with_context(|| format!("reading answer {}", answer.display()))?;
            let parsed = AnswerContext::from_json(&text)?;
            let response = response.as_deref().map(load_response).transpose()?;
            let validated = validate_answer(parsed, response.as_ref(), &config)?;
            serde_json::to_string_pretty(&validated)?
        }
    };

    println!("{}", output);
    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(CliOpts::parse())
}
