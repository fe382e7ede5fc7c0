//! Domain routing rules.
//!
//! A rule pairs a domain matcher with a resolution target. Rules are built once
//! from configuration and evaluated in order; the first match wins.

mod parser;
mod wildcard;

use crate::config::ConfigError;
use regex::Regex;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;

pub use wildcard::wildcard_match;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Fqdn,
    Prefix,
    Suffix,
    Keyword,
    Wildcard,
    Regex,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fqdn => "fqdn",
            Self::Prefix => "prefix",
            Self::Suffix => "suffix",
            Self::Keyword => "keyword",
            Self::Wildcard => "wildcard",
            Self::Regex => "regex",
        }
    }
}

impl FromStr for RuleKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fqdn" => Ok(Self::Fqdn),
            "prefix" => Ok(Self::Prefix),
            "suffix" => Ok(Self::Suffix),
            "keyword" => Ok(Self::Keyword),
            "wildcard" => Ok(Self::Wildcard),
            "regex" => Ok(Self::Regex),
            other => Err(ConfigError::UnknownRuleKind(other.to_string())),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a matched query is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTarget {
    /// A named upstream, built-in or configured.
    Upstream(Arc<str>),
    /// Answer directly with a single A record.
    Static(Ipv4Addr),
}

#[derive(Debug, Clone)]
enum Matcher {
    /// Expression with one trailing dot stripped.
    Fqdn(String),
    /// Expression padded with a leading and trailing dot.
    Prefix(String),
    Suffix(String),
    Keyword(String),
    Wildcard(String),
    Regex(Regex),
}

/// A compiled routing rule.
#[derive(Debug, Clone)]
pub struct Rule {
    kind: RuleKind,
    expression: Arc<str>,
    matcher: Matcher,
    target: RuleTarget,
}

impl Rule {
    /// Builds a rule, normalizing the expression to lower case.
    ///
    /// Regular expressions are compiled from the pattern exactly as written;
    /// a pattern that fails to compile is a configuration error.
    pub fn new(kind: RuleKind, expression: &str, target: RuleTarget) -> Result<Self, ConfigError> {
        if expression.is_empty() {
            return Err(ConfigError::InvalidRule {
                rule: format!("{}:", kind),
                reason: "empty match expression".to_string(),
            });
        }

        let lowered = expression.to_lowercase();
        let matcher = match kind {
            RuleKind::Fqdn => Matcher::Fqdn(trim_trailing_dot(&lowered).to_string()),
            RuleKind::Prefix => Matcher::Prefix(fill_both_dots(&lowered)),
            RuleKind::Suffix => Matcher::Suffix(fill_both_dots(&lowered)),
            RuleKind::Keyword => Matcher::Keyword(lowered.clone()),
            RuleKind::Wildcard => Matcher::Wildcard(lowered.clone()),
            RuleKind::Regex => {
                let regex = Regex::new(expression).map_err(|e| ConfigError::InvalidRegex {
                    pattern: expression.to_string(),
                    reason: e.to_string(),
                })?;
                Matcher::Regex(regex)
            }
        };

        Ok(Self {
            kind,
            expression: lowered.into(),
            matcher,
            target,
        })
    }

    /// Tests a candidate domain. The candidate is lower-cased first.
    pub fn matches(&self, domain: &str) -> bool {
        let candidate = domain.to_lowercase();
        match &self.matcher {
            Matcher::Fqdn(expr) => trim_trailing_dot(&candidate) == expr,
            Matcher::Prefix(expr) => fill_both_dots(&candidate).starts_with(expr.as_str()),
            Matcher::Suffix(expr) => fill_both_dots(&candidate).ends_with(expr.as_str()),
            Matcher::Keyword(expr) => candidate.contains(expr.as_str()),
            Matcher::Wildcard(expr) => wildcard_match(expr, &candidate),
            Matcher::Regex(regex) => regex.is_match(&candidate),
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn target(&self) -> &RuleTarget {
        &self.target
    }

    pub fn upstream_name(&self) -> Option<&str> {
        match &self.target {
            RuleTarget::Upstream(name) => Some(name),
            RuleTarget::Static(_) => None,
        }
    }

    pub fn static_result(&self) -> Option<Ipv4Addr> {
        match &self.target {
            RuleTarget::Static(ip) => Some(*ip),
            RuleTarget::Upstream(_) => None,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ", self.kind, self.expression)?;
        match &self.target {
            RuleTarget::Upstream(name) => write!(f, "{}", name),
            RuleTarget::Static(ip) => write!(f, "{}", ip),
        }
    }
}

fn trim_trailing_dot(s: &str) -> &str {
    s.strip_suffix('.').unwrap_or(s)
}

fn fill_both_dots(s: &str) -> String {
    let mut padded = String::with_capacity(s.len() + 2);
    if !s.starts_with('.') {
        padded.push('.');
    }
    padded.push_str(s);
    if !s.ends_with('.') {
        padded.push('.');
    }
    padded
}
