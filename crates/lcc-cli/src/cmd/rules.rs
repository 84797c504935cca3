use super::load_responder;
use crate::output::{print_json, rules_table};
use lcc_core::responder::Reply;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct RuleRow<'a> {
    position: usize,
    id: &'a str,
    pattern: &'a str,
    computed: bool,
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let responder = load_responder(root)?;
    let rows: Vec<RuleRow> = responder
        .rules()
        .iter()
        .enumerate()
        .map(|(i, r)| RuleRow {
            position: i + 1,
            id: &r.id,
            pattern: r.pattern.as_str(),
            computed: matches!(r.reply, Reply::Computed(_)),
        })
        .collect();

    if json {
        print_json(&serde_json::json!({
            "rules": rows,
            "fallback": responder.fallback(),
        }))?;
        return Ok(());
    }

    if rows.is_empty() {
        println!("No rules configured; every question gets the fallback.");
    } else {
        rules_table(responder.rules()).print();
    }
    println!();
    println!("Fallback: {}", responder.fallback());
    Ok(())
}
