//! `regver` — create a new version of a registry item and optionally merge
//! a metadata update into it.
//!
//! Runs unattended. Inputs come from `INPUT_*` environment variables (and an
//! optional config file); the new id is written to `$GITHUB_OUTPUT`.
//!
//! ```
//! INPUT_ITEM_ID=10378.1/1234 INPUT_VERSION_REASON="release" \
//! INPUT_ATTRIBUTE_UPDATES='{"description": "v2"}' ... regver
//! ```

mod inputs;
mod logging;
mod output;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use inputs::ActionInputs;
use output::Outputs;
use regver_client::RegistryClient;
use regver_core::run_workflow;

#[derive(Parser)]
#[command(author, version, about = "Version a registry item and update its metadata")]
struct Cli {
  /// Optional TOML config file; `INPUT_*` variables override its values.
  #[arg(short, long, default_value = "regver.toml")]
  config: PathBuf,

  /// File that receives `name=value` outputs.
  #[arg(long, env = "GITHUB_OUTPUT")]
  output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  // Inputs carry the log level, so they are read before tracing starts.
  let inputs = ActionInputs::load(&cli.config, None)?;
  logging::init(inputs.log_level);

  // Malformed update documents fail here, before any registry call.
  let request = inputs.workflow_request()?;
  let client = RegistryClient::new(inputs.client_config())
    .context("failed to build registry client")?;
  let outputs = Outputs::new(cli.output);

  tracing::info!(item_id = %request.item_id, update = request.update_document.is_some(), "starting versioning workflow");

  let outcome = run_workflow(&client, &request).await;
  output::report(outcome, request.update_document.is_some(), &outputs)
}
