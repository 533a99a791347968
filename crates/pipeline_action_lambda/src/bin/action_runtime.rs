use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use pipeline_action_lambda::adapters::aws::{CodePipelineJobStatus, S3StoreFactory};
use pipeline_action_lambda::diagnostics::Diagnostics;
use pipeline_action_lambda::error::ActionError;
use pipeline_action_lambda::job::{JobInputs, JobOutputs};
use pipeline_action_lambda::stages::ActionServices;
use pipeline_action_lambda::{ActionPipeline, ActionSuccessResponse, PipelineConfig};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RuntimeSettings {
    diagnostics: Diagnostics,
    num_artifacts: usize,
}

impl RuntimeSettings {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let num_inputs = parse_count(&lookup, "ACTION_NUM_INPUTS")?;
        let num_outputs = parse_count(&lookup, "ACTION_NUM_OUTPUTS")?;
        if num_inputs != num_outputs {
            return Err(Error::from(format!(
                "ACTION_NUM_INPUTS ({num_inputs}) must equal ACTION_NUM_OUTPUTS ({num_outputs}) for the pass-through action"
            )));
        }

        Ok(Self {
            diagnostics: Diagnostics::from_toggle(lookup("ACTION_DIAGNOSTICS").as_deref()),
            num_artifacts: num_inputs,
        })
    }
}

fn parse_count(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<usize, Error> {
    match lookup(key) {
        None => Ok(1),
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|error| Error::from(format!("{key} must be a non-negative integer: {error}"))),
    }
}

/// Copies input artifact `i` to output artifact `i` unchanged.
async fn pass_through(job_inputs: JobInputs) -> Result<JobOutputs, ActionError> {
    let JobInputs { job, inputs } = job_inputs;
    Ok(JobOutputs::new(job, inputs))
}

async fn handle_request(
    event: LambdaEvent<Value>,
    pipeline: &ActionPipeline,
) -> Result<ActionSuccessResponse, Error> {
    pipeline.invoke(event.payload).await.map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .without_time()
        .init();

    let settings = RuntimeSettings::from_lookup(|key| std::env::var(key).ok())?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let services = ActionServices {
        stores: Arc::new(S3StoreFactory::new(&aws_config)),
        job_status: Arc::new(CodePipelineJobStatus::new(aws_sdk_codepipeline::Client::new(
            &aws_config,
        ))),
        diagnostics: settings.diagnostics,
    };

    let config = PipelineConfig::from_handler(pass_through)
        .num_input_artifacts(settings.num_artifacts)
        .num_output_artifacts(settings.num_artifacts);
    let pipeline = ActionPipeline::new(config, services)?;

    lambda_runtime::run(service_fn(|event| handle_request(event, &pipeline))).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn defaults_to_one_artifact_with_diagnostics_off() {
        let settings = RuntimeSettings::from_lookup(lookup_from(&[])).expect("defaults");
        assert_eq!(settings.num_artifacts, 1);
        assert!(!settings.diagnostics.is_enabled());
    }

    #[test]
    fn reads_counts_and_diagnostics_toggle() {
        let settings = RuntimeSettings::from_lookup(lookup_from(&[
            ("ACTION_NUM_INPUTS", "3"),
            ("ACTION_NUM_OUTPUTS", "3"),
            ("ACTION_DIAGNOSTICS", "true"),
        ]))
        .expect("valid settings");

        assert_eq!(settings.num_artifacts, 3);
        assert!(settings.diagnostics.is_enabled());
    }

    #[test]
    fn rejects_unequal_counts() {
        let error = RuntimeSettings::from_lookup(lookup_from(&[
            ("ACTION_NUM_INPUTS", "2"),
            ("ACTION_NUM_OUTPUTS", "1"),
        ]))
        .expect_err("pass-through needs equal counts");
        assert!(error.to_string().contains("must equal"));
    }

    #[test]
    fn rejects_non_numeric_count() {
        let error = RuntimeSettings::from_lookup(lookup_from(&[("ACTION_NUM_INPUTS", "two")]))
            .expect_err("invalid count");
        assert!(error
            .to_string()
            .contains("ACTION_NUM_INPUTS must be a non-negative integer"));
    }
}
