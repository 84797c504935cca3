use super::load_responder;
use crate::output::print_json;
use anyhow::Context;
use lcc_core::{Conversation, Role};
use std::io::BufRead;
use std::path::Path;

const QUIT: [&str; 2] = ["/quit", "/exit"];
const HISTORY: &str = "/history";

/// Interactive loop over stdin. The transcript lives only as long as the
/// session.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let responder = load_responder(root)?;
    let mut convo = Conversation::new();

    if !json {
        println!("Offline assistant. Type {} to leave.", QUIT[0]);
    }

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if QUIT.contains(&input) {
            break;
        }
        if input == HISTORY {
            if !json {
                print_transcript(&convo);
            }
            continue;
        }

        tracing::debug!(
            rule = responder
                .matched_rule(input)
                .map(|r| r.id.as_str())
                .unwrap_or("<fallback>"),
            "matched"
        );
        let reply = convo.ask(&responder, input);
        if !json {
            println!("assistant: {}", reply.content);
        }
    }

    if json {
        print_json(&convo)?;
    }
    Ok(())
}

fn print_transcript(convo: &Conversation) {
    if convo.is_empty() {
        println!("(no messages yet)");
        return;
    }
    for message in convo.messages() {
        let who = match message.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        println!("{who}: {}", message.content);
    }
}
