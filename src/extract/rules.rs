//! Selector rule compilation
//!
//! Extraction rules arrive from configuration as field/selector/attribute
//! strings. Compilation parses each CSS selector once, resolves the optional
//! `::attr(name)` accessor suffix, and appends the synthesized email rule
//! when requested.

use crate::config::{ExtractionConfig, RuleEntry};
use crate::ConfigError;
use scraper::Selector;

/// Field name used by the synthesized email rule
pub const EMAIL_FIELD: &str = "email";

/// A compiled extraction rule
#[derive(Debug, Clone)]
pub struct SelectorRule {
    /// Output field name
    pub field: String,

    /// Compiled CSS selector
    pub selector: Selector,

    /// Attribute to read instead of element text
    pub attribute: Option<String>,
}

impl SelectorRule {
    /// Compiles one configured rule entry
    ///
    /// A trailing `::attr(name)` on the selector string sets the attribute
    /// accessor; an explicit `attribute` key takes precedence over it.
    pub fn compile(entry: &RuleEntry) -> Result<Self, ConfigError> {
        let (css, suffix_attr) = split_attr_suffix(&entry.selector);

        let selector = Selector::parse(css)
            .map_err(|e| ConfigError::InvalidSelector(format!("rule '{}': {}", entry.field, e)))?;

        let attribute = entry
            .attribute
            .clone()
            .or_else(|| suffix_attr.map(str::to_string));

        Ok(Self {
            field: entry.field.clone(),
            selector,
            attribute,
        })
    }
}

/// Compiles the configured rule set for a run
///
/// When `extract_emails` is set and no rule is already named `email`, a
/// synthesized rule reading the href of mailto anchors is appended.
///
/// # Arguments
///
/// * `extraction` - The extraction section of the configuration
/// * `extract_emails` - Whether to append the synthesized email rule
///
/// # Returns
///
/// * `Ok(Vec<SelectorRule>)` - Compiled rules, in configured order
/// * `Err(ConfigError)` - A selector failed to parse
pub fn compile_rules(
    extraction: &ExtractionConfig,
    extract_emails: bool,
) -> Result<Vec<SelectorRule>, ConfigError> {
    let mut rules = Vec::with_capacity(extraction.rules.len() + 1);
    for entry in &extraction.rules {
        rules.push(SelectorRule::compile(entry)?);
    }

    if extract_emails && !rules.iter().any(|r| r.field == EMAIL_FIELD) {
        let entry = RuleEntry {
            field: EMAIL_FIELD.to_string(),
            selector: "a[href^='mailto:']".to_string(),
            attribute: Some("href".to_string()),
        };
        rules.push(SelectorRule::compile(&entry)?);
    }

    Ok(rules)
}

/// Splits a trailing `::attr(name)` accessor off a selector string
fn split_attr_suffix(selector: &str) -> (&str, Option<&str>) {
    if let Some(idx) = selector.rfind("::attr(") {
        let rest = &selector[idx + "::attr(".len()..];
        if let Some(name) = rest.strip_suffix(')') {
            if !name.is_empty() {
                return (&selector[..idx], Some(name));
            }
        }
    }
    (selector, None)
}
