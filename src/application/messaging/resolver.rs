//! Command resolution against a registry snapshot, with closest-command suggestions

use std::sync::Arc;

use crate::domain::entities::InboundMessage;
use crate::domain::traits::CommandHandler;

/// Largest edit distance still treated as a typo
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Suggestions are only offered for short messages
const MAX_SUGGESTION_TEXT_LEN: usize = 20;

/// Outcome of resolving a command token
pub enum Resolution {
    /// Every handler whose aliases contain the command, in registry order
    Matched(Vec<Arc<dyn CommandHandler>>),
    NoMatch { suggestion: Option<String> },
}

pub struct CommandResolver {
    similarity: bool,
}

impl CommandResolver {
    pub fn new(similarity: bool) -> Self {
        Self { similarity }
    }

    pub fn resolve(&self, message: &InboundMessage, handlers: &[Arc<dyn CommandHandler>]) -> Resolution {
        let matched = matching(&message.command, handlers);
        if !matched.is_empty() {
            return Resolution::Matched(matched);
        }

        Resolution::NoMatch {
            suggestion: self.suggest(message, handlers),
        }
    }

    /// Closest alias for a missed command, subject to the false-positive guards
    pub fn suggest(&self, message: &InboundMessage, handlers: &[Arc<dyn CommandHandler>]) -> Option<String> {
        if !self.similarity {
            return None;
        }
        let candidate = closest_command(&message.command, handlers)?;
        let short = message.full_text.chars().count() < MAX_SUGGESTION_TEXT_LEN;
        if !message.command.is_empty() && short && message.is_prefixed() {
            Some(candidate)
        } else {
            None
        }
    }
}

/// Handlers whose alias set contains `command`; no short-circuit on the first hit
pub fn matching(command: &str, handlers: &[Arc<dyn CommandHandler>]) -> Vec<Arc<dyn CommandHandler>> {
    handlers
        .iter()
        .filter(|h| h.spec().matches(command))
        .cloned()
        .collect()
}

/// Nearest alias across all handlers; ties go to the earliest in registry order
pub fn closest_command(command: &str, handlers: &[Arc<dyn CommandHandler>]) -> Option<String> {
    let lower = command.to_lowercase();
    let mut best: Option<(&str, usize)> = None;

    for alias in handlers.iter().flat_map(|h| h.spec().aliases.iter()) {
        let dist = levenshtein(&lower, &alias.to_lowercase());
        if dist > MAX_SUGGESTION_DISTANCE {
            continue;
        }
        match best {
            Some((_, best_dist)) if best_dist <= dist => {}
            _ => best = Some((alias, dist)),
        }
    }

    best.map(|(alias, _)| alias.to_string())
}

/// Levenshtein distance over chars with a rolling row
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();

    let mut prev_row: Vec<usize> = (0..=n).collect();
    let mut curr_row = vec![0usize; n + 1];

    for (i, a_ch) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = if a_ch == b_ch { 0 } else { 1 };
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[n]
}
