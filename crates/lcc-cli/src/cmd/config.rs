use crate::output::{print_json, Table};
use anyhow::Context;
use clap::Subcommand;
use lcc_core::config::{Config, WarnLevel};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the responder configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    if json {
        print_json(&config)?;
        return Ok(());
    }

    let responder = &config.responder;
    println!("Version:        {}", config.version);
    println!("Default rules:  {}", if responder.use_default_rules { "on" } else { "off" });
    println!(
        "Fallback:       {}",
        responder.fallback.as_deref().unwrap_or("(built-in)")
    );
    if responder.rules.is_empty() {
        println!("Custom rules:   none");
    } else {
        println!("Custom rules:");
        let mut table = Table::new(&["ID", "PATTERN", "RESPONSE"]);
        for rule in &responder.rules {
            table.row([rule.id.as_str(), rule.pattern.as_str(), rule.response.as_str()]);
        }
        table.print();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
