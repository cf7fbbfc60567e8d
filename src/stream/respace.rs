//! Token re-spacing.
//!
//! Upstream tokens carry no word-boundary metadata: a sub-word fragment may or
//! may not start with a space. The re-spacer reconstructs boundaries from the
//! character classes on either side of the join so the accumulated text is
//! readable, never double-spaced, and rarely glued.
//!
//! Rule order in [`SPACING_RULES`] is significant; the first matching rule wins.
//!
//! Fragments whose boundaries are [`TokenBoundaries::Explicit`] (OpenAI-style
//! delta tokens, which carry their own leading spaces) skip the heuristic
//! rules: their own leading whitespace decides.

/// Characters that never take a space before them.
pub const NO_SPACE_BEFORE: &[char] = &[
    ',', '.', '!', '?', ':', ';', '%', ')', ']', '}', '\u{2019}', '\'',
];

/// Apostrophe and closing-quote characters.
const APOSTROPHES: &[char] = &['\'', '\u{2019}'];

/// How much the upstream fragment can be trusted about its own spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenBoundaries {
    /// Boundaries must be reconstructed from character classes
    #[default]
    Inferred,
    /// Fragment is an exact model token; its leading space is authoritative
    Explicit,
}

/// One row of the spacing rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpacingRule {
    /// Fragment starts with closing punctuation
    NoSpaceBeforePunctuation,
    /// Nothing has been emitted yet; keep the fragment's own leading space
    StartOfOutput,
    /// Output already ends in whitespace
    AfterWhitespace,
    /// Exact token: keep its own leading space, add nothing
    ExplicitToken,
    /// Output ends in an apostrophe (contractions, possessives)
    AfterApostrophe,
    /// Alphanumeric followed by a letter
    WordBoundary,
    /// Lowercase followed by lowercase
    LowercaseContinuation,
    /// Lowercase followed by uppercase
    CaseBoundary,
    /// Nothing else matched
    Fallthrough,
}

/// Evaluation order of the spacing rules.
pub const SPACING_RULES: &[SpacingRule] = &[
    SpacingRule::NoSpaceBeforePunctuation,
    SpacingRule::StartOfOutput,
    SpacingRule::AfterWhitespace,
    SpacingRule::ExplicitToken,
    SpacingRule::AfterApostrophe,
    SpacingRule::WordBoundary,
    SpacingRule::LowercaseContinuation,
    SpacingRule::CaseBoundary,
    SpacingRule::Fallthrough,
];

/// Inputs to a spacing decision.
#[derive(Debug, Clone, Copy)]
struct Join {
    prev: Option<char>,
    first: char,
    had_leading_space: bool,
    boundaries: TokenBoundaries,
}

impl SpacingRule {
    fn applies(self, join: &Join) -> bool {
        let first = join.first;
        match (self, join.prev) {
            (SpacingRule::NoSpaceBeforePunctuation, _) => NO_SPACE_BEFORE.contains(&first),
            (SpacingRule::StartOfOutput, prev) => prev.is_none(),
            (SpacingRule::Fallthrough, _) => true,
            (_, None) => false,
            (SpacingRule::AfterWhitespace, Some(prev)) => prev.is_whitespace(),
            (SpacingRule::ExplicitToken, Some(_)) => join.boundaries == TokenBoundaries::Explicit,
            (SpacingRule::AfterApostrophe, Some(prev)) => APOSTROPHES.contains(&prev),
            (SpacingRule::WordBoundary, Some(prev)) => {
                prev.is_ascii_alphanumeric() && first.is_ascii_alphabetic()
            }
            (SpacingRule::LowercaseContinuation, Some(prev)) => {
                prev.is_ascii_lowercase() && first.is_ascii_lowercase()
            }
            (SpacingRule::CaseBoundary, Some(prev)) => {
                prev.is_ascii_lowercase() && first.is_ascii_uppercase()
            }
        }
    }

    fn prefix(self, join: &Join) -> &'static str {
        match self {
            SpacingRule::StartOfOutput | SpacingRule::ExplicitToken if join.had_leading_space => {
                " "
            }
            SpacingRule::WordBoundary | SpacingRule::CaseBoundary => " ",
            _ => "",
        }
    }
}

/// Prefix to insert before a stripped fragment, and the rule that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpacingDecision {
    pub prefix: &'static str,
    pub rule: SpacingRule,
}

/// Run the rule table for one join.
///
/// `prev` is the last character already emitted (`None` at the start of
/// output) and `first` the first character of the stripped fragment.
pub fn decide_spacing(
    prev: Option<char>,
    first: char,
    had_leading_space: bool,
    boundaries: TokenBoundaries,
) -> SpacingDecision {
    let join = Join {
        prev,
        first,
        had_leading_space,
        boundaries,
    };
    let rule = SPACING_RULES
        .iter()
        .copied()
        .find(|rule| rule.applies(&join))
        .unwrap_or(SpacingRule::Fallthrough);

    SpacingDecision {
        prefix: rule.prefix(&join),
        rule,
    }
}

/// Fold line breaks to spaces and collapse every whitespace run to one space.
pub fn normalize_whitespace(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_space = false;
    for c in fragment.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Compute the text to append for `fragment` given everything emitted so far,
/// inferring word boundaries from character classes.
pub fn respace(fragment: &str, prior: &str) -> String {
    respace_with(fragment, prior, TokenBoundaries::Inferred)
}

/// Like [`respace`], with explicit control over boundary inference.
pub fn respace_with(fragment: &str, prior: &str, boundaries: TokenBoundaries) -> String {
    if fragment.is_empty() {
        return String::new();
    }

    let normalized = normalize_whitespace(fragment);
    let had_leading_space = normalized.starts_with(' ');
    let stripped = normalized.trim_start();
    let prev = prior.chars().next_back();

    let Some(first) = stripped.chars().next() else {
        // Whitespace-only fragment: at most one space, never doubled
        let already_spaced = prev.is_some_and(char::is_whitespace);
        return if had_leading_space && !already_spaced {
            " ".to_string()
        } else {
            String::new()
        };
    };

    let decision = decide_spacing(prev, first, had_leading_space, boundaries);
    let mut out = String::with_capacity(decision.prefix.len() + stripped.len());
    out.push_str(decision.prefix);
    out.push_str(stripped);
    out
}
