use lcc_core::responder::{Reply, Rule};
use lcc_core::workflow::{Step, Workflow};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Column-aligned text table. Widths count chars, so step labels and
/// replies with non-ASCII text still line up.
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(&pad_line(self.headers.iter().copied(), &widths));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&pad_line(row.iter().map(String::as_str), &widths));
            out.push('\n');
        }
        out
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell}{}", " ".repeat(w - cell.chars().count())))
        .collect();
    padded.join("  ").trim_end().to_string()
}

/// `"Low -> 3, High -> 2"` for a decision, empty for other steps.
pub fn option_targets(step: &Step) -> String {
    step.options()
        .iter()
        .map(|o| format!("{} -> {}", o.label, o.next_index))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The effective rule order as `lcc rules` prints it, numbered from 1.
pub fn rules_table(rules: &[Rule]) -> Table {
    let mut table = Table::new(&["#", "ID", "PATTERN", "REPLY"]);
    for (i, rule) in rules.iter().enumerate() {
        let reply = match rule.reply {
            Reply::Fixed(_) => "fixed",
            Reply::Computed(_) => "computed",
        };
        table.row([
            (i + 1).to_string(),
            rule.id.clone(),
            rule.pattern.as_str().to_string(),
            reply.to_string(),
        ]);
    }
    table
}

/// One row per step, indexed from 0 like `next_index`.
pub fn steps_table(workflow: &Workflow) -> Table {
    let mut table = Table::new(&["#", "TYPE", "TEXT", "OPTIONS"]);
    for (i, step) in workflow.steps.iter().enumerate() {
        table.row([
            i.to_string(),
            step.kind().to_string(),
            step.display_text().to_string(),
            option_targets(step),
        ]);
    }
    table
}
