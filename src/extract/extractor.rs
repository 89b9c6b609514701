//! Declarative field extraction over HTML documents
//!
//! The extractor applies a compiled rule set to one document and produces a
//! flat field map. It never fails: unmatched selectors, missing attributes,
//! and malformed markup all degrade to absent values.

use crate::extract::SelectorRule;
use scraper::Html;
use std::collections::HashMap;

/// Extracted field values, keyed by rule field name
pub type FieldMap = HashMap<String, Option<String>>;

/// Applies every rule to the document and returns one value per field
///
/// For each rule the first matching element wins. Text values are collapsed
/// to single-space-separated words; attribute values are taken verbatim.
/// Every rule's field name is present in the returned map, absent values
/// included.
///
/// # Example
///
/// ```
/// use prospect::config::RuleEntry;
/// use prospect::extract::{extract, SelectorRule};
///
/// let rule = SelectorRule::compile(&RuleEntry {
///     field: "name".to_string(),
///     selector: "h1".to_string(),
///     attribute: None,
/// })
/// .unwrap();
///
/// let fields = extract("<html><body><h1>Ada's Bakery</h1></body></html>", &[rule]);
/// assert_eq!(fields["name"].as_deref(), Some("Ada's Bakery"));
/// ```
pub fn extract(html: &str, rules: &[SelectorRule]) -> FieldMap {
    let document = Html::parse_document(html);
    let mut fields = FieldMap::with_capacity(rules.len());

    for rule in rules {
        fields.insert(rule.field.clone(), apply_rule(&document, rule));
    }

    fields
}

/// Applies a single rule to a parsed document
fn apply_rule(document: &Html, rule: &SelectorRule) -> Option<String> {
    let element = document.select(&rule.selector).next()?;

    match &rule.attribute {
        Some(attribute) => element.value().attr(attribute).map(str::to_string),
        None => Some(collapse_whitespace(&element.text().collect::<String>())),
    }
}

/// Collapses runs of whitespace to single spaces and trims the ends
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
