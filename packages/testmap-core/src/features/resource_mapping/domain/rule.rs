//! Mapping rules and the rule-file parser

use super::pattern::Pattern;
use crate::errors::{MappingError, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

/// One `resource=class[,class...]` line, compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRule {
    resource: Pattern,
    class_patterns: Vec<Pattern>,
}

impl MappingRule {
    pub fn new(resource: Pattern, class_patterns: Vec<Pattern>) -> Self {
        Self {
            resource,
            class_patterns,
        }
    }

    /// Matcher applied to changed file paths
    pub fn resource_pattern(&self) -> &Pattern {
        &self.resource
    }

    /// Matchers applied to fully-qualified class names, in file order
    pub fn class_patterns(&self) -> &[Pattern] {
        &self.class_patterns
    }

    pub fn applies_to(&self, path: &str) -> bool {
        self.resource.matches(path)
    }
}

/// The complete, immutable collection of rules in force
///
/// At most one rule per resource-pattern text. Rules keep the order in which
/// their pattern first appeared, which only matters for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<MappingRule>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse rule-file text; see [`parse_rules`]
    pub fn parse(text: &str) -> Result<Self> {
        parse_rules(text)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MappingRule> {
        self.rules.iter()
    }

    /// Rule keyed by its resource-pattern text
    pub fn get(&self, resource_pattern: &str) -> Option<&MappingRule> {
        self.rules
            .iter()
            .find(|r| r.resource_pattern().as_str() == resource_pattern)
    }

    /// Rules whose resource pattern matches `path`
    pub fn matching<'s, 'p>(&'s self, path: &'p str) -> impl Iterator<Item = &'s MappingRule> + 'p
    where
        's: 'p,
    {
        self.rules.iter().filter(move |r| r.applies_to(path))
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a MappingRule;
    type IntoIter = std::slice::Iter<'a, MappingRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Parse a rule file into a [`RuleSet`]
///
/// Format, one rule per line:
/// - blank lines are skipped
/// - lines starting with `#` or `!` are skipped
/// - `<resource-pattern>=<class-pattern>[,<class-pattern>...]`, split at the
///   FIRST `=`; the class side is split on `,` and empty segments are dropped
///
/// Any other line, or any pattern that fails to compile, rejects the whole
/// text. A repeated resource pattern replaces the earlier rule.
pub fn parse_rules(text: &str) -> Result<RuleSet> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rules: Vec<MappingRule> = Vec::new();
    let mut by_resource: HashMap<String, usize> = HashMap::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        if is_skipped(line) {
            continue;
        }

        let rule = parse_line(line_no, line)?;
        let key = rule.resource_pattern().as_str().to_string();

        match by_resource.get(&key) {
            Some(&slot) => {
                warn!(
                    "Resource pattern '{}' redefined at line {}; earlier mapping dropped",
                    key, line_no
                );
                rules[slot] = rule;
            }
            None => {
                by_resource.insert(key, rules.len());
                rules.push(rule);
            }
        }
    }

    debug!("Parsed {} resource mapping rules", rules.len());
    Ok(RuleSet { rules })
}

fn is_skipped(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with('#') || line.starts_with('!')
}

fn parse_line(line_no: usize, line: &str) -> Result<MappingRule> {
    let split = match line.find('=') {
        Some(0) => {
            return Err(MappingError::malformed(
                line_no,
                line,
                "missing resource pattern before '='",
            ))
        }
        Some(split) => split,
        None => {
            return Err(MappingError::malformed(
                line_no,
                line,
                "expected <resource-pattern>=<class-pattern>[,<class-pattern>...]",
            ))
        }
    };

    let resource =
        Pattern::new(&line[..split]).map_err(|e| MappingError::malformed_pattern(line_no, line, e))?;

    let class_patterns = line[split + 1..]
        .split(',')
        .filter(|segment| !segment.is_empty())
        .map(Pattern::new)
        .collect::<Result<Vec<_>>>()
        .map_err(|e| MappingError::malformed_pattern(line_no, line, e))?;

    if class_patterns.is_empty() {
        debug!(
            "Resource pattern '{}' at line {} maps to no class patterns",
            resource, line_no
        );
    }

    Ok(MappingRule::new(resource, class_patterns))
}
