//! Route pattern compilation.
//!
//! A pattern is one of:
//! - `*`: matches every path
//! - `/`: matches the root path only
//! - `@<regex>`: a raw, unanchored regular expression
//! - a literal path: compared by equality, no regex involved
//! - a path with `[type:name]` placeholders, optionally preceded by `/` or
//!   `.` and optionally suffixed with `?`, compiled to an anchored regex
//!
//! Placeholder types resolve through [`MatchTypes`]; an unknown type tag is
//! used as regex text verbatim, so `[\d{4}:year]` works inline.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{BatonError, BatonResult};
use crate::routing::params::Params;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(/|\.|)\[([^:\]]*)(?::([^:\]]*))?\](\?|)").expect("placeholder regex is valid")
});

/// Short type tag → regex fragment. Later registrations win.
#[derive(Debug, Clone)]
pub struct MatchTypes {
    types: HashMap<String, String>,
}

impl Default for MatchTypes {
    fn default() -> Self {
        let types = [
            ("i", "[0-9]+"),
            ("a", "[0-9A-Za-z]+"),
            ("h", "[0-9A-Fa-f]+"),
            ("*", ".+?"),
            ("**", ".+"),
            ("", r"[^/\.]+"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        MatchTypes { types }
    }
}

impl MatchTypes {
    pub fn insert(&mut self, tag: impl Into<String>, regex: impl Into<String>) {
        self.types.insert(tag.into(), regex.into());
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.types.get(tag).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for MatchTypes {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// The matcher a route pattern compiles to.
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    All,
    Root,
    Literal(String),
    /// Raw `@` expression; `None` when it failed to compile.
    Raw(Option<Regex>),
    /// Placeholder pattern. `prefix` is the literal text before the first
    /// placeholder; a path that does not start with it is rejected without
    /// running the regex.
    Placeholders { prefix: String, regex: Option<Regex> },
}

impl CompiledPattern {
    pub fn compile(pattern: &str, types: &MatchTypes) -> Self {
        if pattern == "*" {
            return CompiledPattern::All;
        }
        if pattern == "/" {
            return CompiledPattern::Root;
        }
        if let Some(raw) = pattern.strip_prefix('@') {
            return CompiledPattern::Raw(build_regex(pattern, raw));
        }
        let Some(bracket) = pattern.find('[') else {
            return CompiledPattern::Literal(pattern.to_string());
        };

        let prefix_end = PLACEHOLDER
            .find(pattern)
            .map(|m| m.start())
            .unwrap_or(bracket);
        let source = placeholder_regex(pattern, types);
        CompiledPattern::Placeholders {
            prefix: pattern[..prefix_end].to_string(),
            regex: build_regex(pattern, &source),
        }
    }

    /// Match a canonical path, returning the named parameters on success.
    pub fn matches(&self, path: &str) -> Option<Params> {
        match self {
            CompiledPattern::All => Some(Params::new()),
            CompiledPattern::Root => (path.is_empty() || path == "/").then(Params::new),
            CompiledPattern::Literal(literal) => (path == literal).then(Params::new),
            CompiledPattern::Raw(regex) => capture(regex.as_ref()?, path),
            CompiledPattern::Placeholders { prefix, regex } => {
                if !path.starts_with(prefix.as_str()) {
                    return None;
                }
                capture(regex.as_ref()?, path)
            }
        }
    }
}

/// Rewrite every placeholder block into `(?:pre(?P<name>type))` plus `?`
/// when optional, anchored at both ends.
fn placeholder_regex(pattern: &str, types: &MatchTypes) -> String {
    let mut out = String::with_capacity(pattern.len() + 32);
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(pattern) {
        let Some(block) = caps.get(0) else { continue };
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        let (pre, tag, name, optional) = (group(1), group(2), group(3), group(4));

        out.push_str(&pattern[last..block.start()]);
        out.push_str("(?:");
        out.push_str(if pre == "." { r"\." } else { pre });
        out.push('(');
        if !name.is_empty() {
            out.push_str("?P<");
            out.push_str(name);
            out.push('>');
        }
        out.push_str(types.get(tag).unwrap_or(tag));
        out.push_str("))");
        if !optional.is_empty() {
            out.push('?');
        }
        last = block.end();
    }
    out.push_str(&pattern[last..]);
    format!("^{out}$")
}

fn build_regex(pattern: &str, source: &str) -> Option<Regex> {
    match Regex::new(source) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "route pattern does not compile; it will never match");
            None
        }
    }
}

fn capture(regex: &Regex, path: &str) -> Option<Params> {
    let caps = regex.captures(path)?;
    let params = regex
        .capture_names()
        .flatten()
        .filter_map(|name| caps.name(name).map(|m| (name, m.as_str())))
        .collect();
    Some(params)
}

/// Build a path from a placeholder pattern (reverse routing).
///
/// Optional placeholders without a value are dropped; a missing required
/// value is an `InvalidRoute` error.
pub fn fill(pattern: &str, params: &Params) -> BatonResult<String> {
    if pattern == "*" || pattern.starts_with('@') {
        return Err(BatonError::InvalidRoute(format!(
            "pattern '{pattern}' cannot be reversed"
        )));
    }

    let mut out = String::with_capacity(pattern.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(pattern) {
        let Some(block) = caps.get(0) else { continue };
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        let (pre, name, optional) = (group(1), group(3), !group(4).is_empty());

        out.push_str(&pattern[last..block.start()]);
        match params.get(name).filter(|_| !name.is_empty()) {
            Some(value) => {
                out.push_str(pre);
                out.push_str(value);
            }
            None if optional => {}
            None => {
                return Err(BatonError::InvalidRoute(format!(
                    "missing parameter '{name}' for pattern '{pattern}'"
                )));
            }
        }
        last = block.end();
    }
    out.push_str(&pattern[last..]);
    Ok(out)
}
