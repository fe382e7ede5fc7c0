use super::{Rule, RuleKind, RuleTarget};
use crate::config::ConfigError;
use std::net::Ipv4Addr;

impl Rule {
    /// Parses a rule line of the form `<kind>:<expression> <target>`.
    ///
    /// `is_upstream` reports whether a name is a known upstream. Upstream names
    /// take precedence over the static IPv4 form; a target that is neither is an
    /// error.
    pub fn parse<F>(line: &str, is_upstream: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> bool,
    {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let &[condition, target] = fields.as_slice() else {
            return Err(ConfigError::InvalidRule {
                rule: line.to_string(),
                reason: format!("expected 2 fields, found {}", fields.len()),
            });
        };

        // First ':' only; a regex expression may contain more.
        let (kind, expression) = condition.split_once(':').ok_or_else(|| ConfigError::InvalidRule {
            rule: line.to_string(),
            reason: "condition must be <kind>:<expression>".to_string(),
        })?;

        let kind: RuleKind = kind.parse()?;

        let target = if is_upstream(target) {
            RuleTarget::Upstream(target.into())
        } else if let Ok(ip) = target.parse::<Ipv4Addr>() {
            RuleTarget::Static(ip)
        } else {
            return Err(ConfigError::UnknownUpstream(target.to_string()));
        };

        Rule::new(kind, expression, target).map_err(|e| match e {
            ConfigError::InvalidRule { reason, .. } => ConfigError::InvalidRule {
                rule: line.to_string(),
                reason,
            },
            other => other,
        })
    }
}
