use std::fmt;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Characters whose presence turns a plain `files` entry into a regular expression.
const REGEX_METACHARACTERS: &[char] = &[
    '.', '^', '$', '*', '+', '?', '{', '}', '[', ']', '\\', '|', '(', ')',
];

/// A compiled asset-name selector.
///
/// Plain strings are classified once, when the configuration is loaded: any
/// string containing a regex metacharacter becomes [`Pattern::Regex`], the rest
/// are [`Pattern::Literal`]. A literal name that happens to contain a
/// metacharacter (`tool+extras.zip`) must be written as `{ literal: ... }` in
/// the configuration, and `{ regex: ... }` forces regex compilation.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "PatternSpec")]
pub enum Pattern {
    Literal(String),
    Regex(Regex),
}

impl Pattern {
    /// Classify `text` by scanning it for regex metacharacters.
    pub fn parse(text: &str) -> Result<Self> {
        if text.contains(REGEX_METACHARACTERS) {
            Self::regex(text)
        } else {
            Ok(Self::literal(text))
        }
    }

    pub fn literal(text: &str) -> Self {
        Pattern::Literal(text.to_owned())
    }

    pub fn regex(text: &str) -> Result<Self> {
        Regex::new(text)
            .map(Pattern::Regex)
            .map_err(|source| Error::InvalidPattern {
                pattern: text.to_owned(),
                source,
            })
    }

    /// Literals compare for exact, case-sensitive equality. Regexes must match
    /// starting at the first character of `name` but may stop before its end.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Literal(literal) => literal == name,
            // Leftmost-first search reports a match at offset 0 whenever one exists.
            Pattern::Regex(regex) => regex.find(name).is_some_and(|m| m.start() == 0),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Literal(literal) => literal,
            Pattern::Regex(regex) => regex.as_str(),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LiteralSpec {
    literal: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RegexSpec {
    regex: String,
}

/// Configuration forms accepted for a `files` entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum PatternSpec {
    Plain(String),
    Literal(LiteralSpec),
    Regex(RegexSpec),
}

impl TryFrom<PatternSpec> for Pattern {
    type Error = Error;

    fn try_from(spec: PatternSpec) -> Result<Self> {
        match spec {
            PatternSpec::Plain(text) => Pattern::parse(&text),
            PatternSpec::Literal(LiteralSpec { literal }) => Ok(Pattern::Literal(literal)),
            PatternSpec::Regex(RegexSpec { regex }) => Pattern::regex(&regex),
        }
    }
}
