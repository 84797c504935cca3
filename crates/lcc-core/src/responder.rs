use crate::config::{ResponderConfig, RuleSpec};
use crate::error::{LccError, Result};
use crate::message::Message;
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::sync::OnceLock;

/// Shown when no rule matches. Names the built-in triggers so the user has
/// somewhere to go next.
pub const DEFAULT_FALLBACK: &str = "I'm running offline and only know a few topics. \
Try asking about: checklist, SOP, workflow, risk, summary.";

// ---------------------------------------------------------------------------
// MatchContext
// ---------------------------------------------------------------------------

/// What a computed reply gets to look at. `history` is carried for future
/// context-aware rules; matching itself only ever reads `input`.
pub struct MatchContext<'a> {
    pub input: &'a str,
    pub history: &'a [Message],
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum Reply {
    Fixed(String),
    Computed(fn(&MatchContext) -> String),
}

impl Reply {
    pub fn render(&self, ctx: &MatchContext) -> String {
        match self {
            Reply::Fixed(text) => text.clone(),
            Reply::Computed(f) => f(ctx),
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Fixed(text) => f.debug_tuple("Fixed").field(text).finish(),
            Reply::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub pattern: Regex,
    pub reply: Reply,
}

impl Rule {
    /// Compile `pattern` case-insensitively.
    pub fn new(id: impl Into<String>, pattern: &str, reply: Reply) -> Result<Self> {
        let id = id.into();
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| LccError::InvalidPattern {
                rule: id.clone(),
                source,
            })?;
        Ok(Self { id, pattern, reply })
    }

    pub fn from_spec(spec: &RuleSpec) -> Result<Self> {
        Self::new(
            spec.id.clone(),
            &spec.pattern,
            Reply::Fixed(spec.response.clone()),
        )
    }

    pub fn matches(&self, input: &str) -> bool {
        self.pattern.is_match(input)
    }
}

// ---------------------------------------------------------------------------
// Responder
// ---------------------------------------------------------------------------

/// Ordered rule table. The first rule whose pattern matches the trimmed
/// input answers; later rules never see it.
#[derive(Debug, Clone)]
pub struct Responder {
    rules: Vec<Rule>,
    fallback: String,
}

impl Default for Responder {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Responder {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            fallback: DEFAULT_FALLBACK.to_string(),
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Configured rules first, then (optionally) the built-ins.
    pub fn from_config(config: &ResponderConfig) -> Result<Self> {
        let mut rules = config
            .rules
            .iter()
            .map(Rule::from_spec)
            .collect::<Result<Vec<_>>>()?;
        if config.use_default_rules {
            rules.extend(default_rules());
        }
        let responder = Self::new(rules);
        Ok(match &config.fallback {
            Some(text) => responder.with_fallback(text.clone()),
            None => responder,
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// The rule that would answer `input`, if any. Blank input never
    /// matches, even against a pattern that accepts the empty string.
    pub fn matched_rule(&self, input: &str) -> Option<&Rule> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        self.rules.iter().find(|rule| rule.matches(input))
    }

    pub fn respond(&self, history: &[Message], input: &str) -> Message {
        let input = input.trim();
        match self.matched_rule(input) {
            Some(rule) => Message::assistant(rule.reply.render(&MatchContext { input, history })),
            None => Message::assistant(self.fallback.clone()),
        }
    }
}

static DEFAULT_RESPONDER: OnceLock<Responder> = OnceLock::new();

/// Answer `input` with the built-in rule table.
pub fn respond(history: &[Message], input: &str) -> Message {
    DEFAULT_RESPONDER
        .get_or_init(Responder::default)
        .respond(history, input)
}

// ---------------------------------------------------------------------------
// Built-in rules
// ---------------------------------------------------------------------------

macro_rules! rule {
    (id: $id:expr, pattern: $pat:expr, reply: $text:expr) => {
        builtin($id, $pat, Reply::Fixed($text.to_string()))
    };
    (id: $id:expr, pattern: $pat:expr, compute: $f:expr) => {
        builtin($id, $pat, Reply::Computed($f))
    };
}

fn builtin(id: &str, pattern: &str, reply: Reply) -> Rule {
    Rule::new(id, pattern, reply).expect("built-in rule pattern must compile")
}

static SUMMARY_TOPIC_RE: OnceLock<Regex> = OnceLock::new();

fn summary_topic(input: &str) -> Option<&str> {
    let re = SUMMARY_TOPIC_RE.get_or_init(|| {
        Regex::new(r"(?i)\bsummar(?:y|ize|ise)\b(?:\s+(?:of|for|on))?\s*(.*)$").unwrap()
    });
    let topic = re
        .captures(input)?
        .get(1)?
        .as_str()
        .trim()
        .trim_end_matches(['?', '.', '!']);
    (!topic.is_empty()).then_some(topic)
}

fn summary_reply(ctx: &MatchContext) -> String {
    const SHAPE: &str = "state the goal in one sentence, list the decisions made, \
then the open items with an owner for each.";
    match summary_topic(ctx.input) {
        Some(topic) => format!("To summarize \"{topic}\": {SHAPE}"),
        None => format!("A good summary should {SHAPE}"),
    }
}

/// The built-in table, most specific first.
pub fn default_rules() -> Vec<Rule> {
    vec![
        rule! {
            id: "greeting",
            pattern: r"^(hi|hello|hey)\b",
            reply: "Hello! I answer offline from a fixed rule set. \
Ask me about checklists, SOPs, workflows, risks or summaries."
        },
        rule! {
            id: "checklist",
            pattern: r"check\s*list",
            reply: "Checklist template:\n\
- [ ] Objective written down\n\
- [ ] Owner assigned\n\
- [ ] Risks reviewed\n\
- [ ] Steps tested end to end\n\
- [ ] Sign-off recorded"
        },
        rule! {
            id: "sop",
            pattern: r"\bsops?\b|standard operating procedure",
            reply: "SOP outline: 1. Purpose 2. Scope 3. Roles 4. Procedure steps \
5. Records to keep 6. Review date."
        },
        rule! {
            id: "workflow",
            pattern: r"\bworkflows?\b|\bprocess(es)?\b",
            reply: "Workflows walk you through prompts and decisions one step at a time. \
Run `lcc workflow list` to see the ones available."
        },
        rule! {
            id: "risk",
            pattern: r"\brisk(s|y)?\b",
            reply: "For each risk, note its likelihood and impact (low/high), \
who owns it, and the mitigation. Escalate anything high/high."
        },
        rule! {
            id: "summary",
            pattern: r"\bsummar(y|ize|ise)\b",
            compute: summary_reply
        },
        rule! {
            id: "help",
            pattern: r"\bhelp\b|what can you do",
            reply: "I can draft a checklist, outline an SOP, explain workflows, \
walk through risk assessment, and shape a summary. I never go online."
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(id: &str, pattern: &str, text: &str) -> Rule {
        Rule::new(id, pattern, Reply::Fixed(text.to_string())).unwrap()
    }

    #[test]
    fn first_match_wins() {
        let responder = Responder::new(vec![
            fixed("r1", "foo", "first"),
            fixed("r2", "foo|bar", "second"),
        ]);
        assert_eq!(responder.respond(&[], "foo").content, "first");
        assert_eq!(responder.respond(&[], "bar").content, "second");
        assert_eq!(responder.matched_rule("foo").unwrap().id, "r1");
    }

    #[test]
    fn empty_and_unmatched_input_fall_back() {
        let responder = Responder::default();
        for input in ["", "   ", "zzz_no_match_zzz"] {
            let reply = responder.respond(&[], input);
            assert_eq!(reply.content, DEFAULT_FALLBACK, "input: {input:?}");
            assert_eq!(reply.role, crate::message::Role::Assistant);
        }
    }

    #[test]
    fn blank_input_skips_rules_that_accept_empty() {
        let responder = Responder::new(vec![fixed("anything", ".*", "matched")]);
        assert_eq!(responder.respond(&[], "").content, DEFAULT_FALLBACK);
        assert_eq!(responder.respond(&[], "x").content, "matched");
    }

    #[test]
    fn matching_ignores_case() {
        let responder = Responder::default();
        let lower = responder.matched_rule("checklist").unwrap().id.clone();
        let upper = responder.matched_rule("CHECKLIST").unwrap().id.clone();
        assert_eq!(lower, "checklist");
        assert_eq!(lower, upper);
        assert_eq!(
            responder.respond(&[], "CHECKLIST"),
            responder.respond(&[], "checklist")
        );
    }

    #[test]
    fn input_is_trimmed_before_matching() {
        let responder = Responder::new(vec![fixed("greet", "^hello$", "hi there")]);
        assert_eq!(responder.respond(&[], "  hello \n").content, "hi there");
    }

    #[test]
    fn respond_is_deterministic() {
        let history = vec![Message::user("hello"), Message::assistant("hi")];
        for input in ["checklist", "summarize the launch", "nothing here", ""] {
            let a = respond(&history, input);
            let b = respond(&history, input);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn history_does_not_change_the_answer() {
        let history = vec![Message::user("risk"), Message::assistant("...")];
        assert_eq!(respond(&[], "sop please"), respond(&history, "sop please"));
    }

    #[test]
    fn default_rules_compile_with_unique_ids() {
        let rules = default_rules();
        let mut ids: Vec<_> = rules.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn built_in_triggers_route_to_expected_rules() {
        let responder = Responder::default();
        let cases = [
            ("Hey there", "greeting"),
            ("make me a check list", "checklist"),
            ("Do we have an SOP for this?", "sop"),
            ("standard operating procedure", "sop"),
            ("which workflow should I use", "workflow"),
            ("what are the risks", "risk"),
            ("summarise the meeting", "summary"),
            ("help", "help"),
            ("what can you do?", "help"),
        ];
        for (input, expected) in cases {
            let id = responder.matched_rule(input).map(|r| r.id.as_str());
            assert_eq!(id, Some(expected), "input: {input:?}");
        }
    }

    #[test]
    fn summary_reply_quotes_topic() {
        let reply = respond(&[], "Summarize the Q3 launch plan?");
        assert!(reply.content.starts_with("To summarize \"the Q3 launch plan\""));

        let bare = respond(&[], "summary");
        assert!(bare.content.starts_with("A good summary should"));
    }

    #[test]
    fn from_config_puts_custom_rules_first() {
        let config = ResponderConfig {
            use_default_rules: true,
            fallback: None,
            rules: vec![RuleSpec {
                id: "release".to_string(),
                pattern: "release checklist".to_string(),
                response: "Use the release runbook.".to_string(),
            }],
        };
        let responder = Responder::from_config(&config).unwrap();
        assert_eq!(responder.rules().len(), default_rules().len() + 1);
        assert_eq!(
            responder.respond(&[], "Release checklist").content,
            "Use the release runbook."
        );
        assert_eq!(responder.matched_rule("checklist").unwrap().id, "checklist");
    }

    #[test]
    fn from_config_without_defaults_and_custom_fallback() {
        let config = ResponderConfig {
            use_default_rules: false,
            fallback: Some("Nothing matched.".to_string()),
            rules: Vec::new(),
        };
        let responder = Responder::from_config(&config).unwrap();
        assert!(responder.rules().is_empty());
        assert_eq!(responder.respond(&[], "checklist").content, "Nothing matched.");
    }

    #[test]
    fn from_config_rejects_bad_pattern() {
        let config = ResponderConfig {
            use_default_rules: true,
            fallback: None,
            rules: vec![RuleSpec {
                id: "broken".to_string(),
                pattern: "(unclosed".to_string(),
                response: "never".to_string(),
            }],
        };
        match Responder::from_config(&config) {
            Err(LccError::InvalidPattern { rule, .. }) => assert_eq!(rule, "broken"),
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }
}
