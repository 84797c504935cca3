use super::load_responder;
use crate::output::print_json;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct AskOutput<'a> {
    rule: Option<&'a str>,
    message: &'a lcc_core::Message,
}

pub fn run(root: &Path, text: &str, json: bool) -> anyhow::Result<()> {
    let responder = load_responder(root)?;
    let rule = responder.matched_rule(text).map(|r| r.id.as_str());
    tracing::debug!(rule = rule.unwrap_or("<fallback>"), "matched");

    let reply = responder.respond(&[], text);
    if json {
        print_json(&AskOutput {
            rule,
            message: &reply,
        })?;
    } else {
        println!("{}", reply.content);
    }
    Ok(())
}
