//! Step outputs, written as `name=value` lines to the runner's output file.

use std::{
  fmt::Display,
  fs::OpenOptions,
  io::Write as _,
  path::PathBuf,
};

use anyhow::{Context, Result};
use regver_core::WorkflowError;

pub struct Outputs {
  path: Option<PathBuf>,
}

impl Outputs {
  pub fn new(path: Option<PathBuf>) -> Self {
    if path.is_none() {
      tracing::warn!("no output file configured; writing outputs to stdout");
    }
    Self { path }
  }

  pub fn set(&self, name: &str, value: impl Display) -> Result<()> {
    let line = format!("{name}={value}");
    let Some(path) = &self.path else {
      println!("{line}");
      return Ok(());
    };

    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .with_context(|| format!("opening output file {}", path.display()))?;
    writeln!(file, "{line}").with_context(|| format!("writing output {name}"))
  }
}

/// Emit the outputs for a finished workflow and turn it into the process
/// result.
///
/// When the new version exists but its update failed, `new_id` is still
/// written (with `update_applied=false`) and the workflow error is returned.
/// Failing to write those outputs is logged, never allowed to mask it.
pub fn report(
  outcome: Result<String, WorkflowError>,
  update_requested: bool,
  outputs: &Outputs,
) -> Result<()> {
  match outcome {
    Ok(new_id) => {
      tracing::info!(%new_id, "setting outputs");
      outputs.set("new_id", &new_id)?;
      outputs.set("update_applied", update_requested)?;
      tracing::info!("operations complete");
      Ok(())
    }
    Err(err) => {
      if let Some(new_id) = err.new_id() {
        tracing::error!(%new_id, step = %err.cause().step(), "new version exists but the update was not applied");
        let written = outputs
          .set("new_id", new_id)
          .and_then(|()| outputs.set("update_applied", false));
        if let Err(e) = written {
          tracing::error!(error = %format!("{e:#}"), "failed to write outputs for the partial failure");
        }
      }
      Err(err.into())
    }
  }
}
