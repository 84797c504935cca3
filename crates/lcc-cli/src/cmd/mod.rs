pub mod ask;
pub mod chat;
pub mod config;
pub mod init;
pub mod rules;
pub mod workflow;

use anyhow::Context;
use lcc_core::{
    config::{Config, WarnLevel},
    Responder,
};
use std::path::Path;

/// Build the responder the project is configured for. Falls back to the
/// built-in rules when the project has not been initialized.
pub fn load_responder(root: &Path) -> anyhow::Result<Responder> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    for warning in config.validate() {
        if warning.level == WarnLevel::Warning {
            tracing::warn!("config: {}", warning.message);
        }
    }
    let responder = Responder::from_config(&config.responder).context("invalid responder rule")?;
    tracing::debug!(
        rules = responder.rules().len(),
        custom = config.responder.rules.len(),
        "responder ready"
    );
    Ok(responder)
}
