//! Phase-2 handler: collecting records from detail pages
//!
//! Each successfully fetched detail page runs through the extractor. A page
//! becomes a record only when the primary field came back non-empty;
//! everything else is dropped with a log line.

use crate::crawler::{DetailTarget, FetchedPage};
use crate::extract::{extract, FieldMap, SelectorRule, EMAIL_FIELD};

/// One structured result extracted from a detail page
#[derive(Debug, Clone)]
pub struct Record {
    /// URL of the page the record came from
    pub source_url: String,

    /// City of the seed that discovered the page
    pub city: String,

    /// Keyword of the seed that discovered the page
    pub keyword: String,

    /// Extracted values, one entry per rule field
    pub fields: FieldMap,
}

impl Record {
    /// Returns the extracted value for a field, if present
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }
}

/// Routes one fetched detail page into a record
///
/// Non-2xx pages and pages whose primary field came back empty yield None.
/// Collected email values keep only the address: a leading `mailto:` is
/// stripped.
pub fn handle_detail_page(
    page: &FetchedPage,
    target: &DetailTarget,
    rules: &[SelectorRule],
    primary_field: &str,
) -> Option<Record> {
    if !page.is_success() {
        tracing::warn!(
            "Detail page {} returned status {}, skipping",
            page.url,
            page.status_code
        );
        return None;
    }

    let mut fields = extract(&page.html, rules);

    let primary_present = fields
        .get(primary_field)
        .and_then(|v| v.as_deref())
        .map_or(false, |v| !v.is_empty());
    if !primary_present {
        tracing::debug!(
            "Dropping {}: primary field '{}' is empty",
            page.url,
            primary_field
        );
        return None;
    }

    if let Some(Some(value)) = fields.get_mut(EMAIL_FIELD) {
        if let Some(address) = value.strip_prefix("mailto:") {
            *value = address.to_string();
        }
    }

    Some(Record {
        source_url: page.url.clone(),
        city: target.city.clone(),
        keyword: target.keyword.clone(),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleEntry;

    fn rule(field: &str, selector: &str) -> SelectorRule {
        SelectorRule::compile(&RuleEntry {
            field: field.to_string(),
            selector: selector.to_string(),
            attribute: None,
        })
        .unwrap()
    }

    fn rules() -> Vec<SelectorRule> {
        vec![rule("name", "h1"), rule("phone", "span.phone")]
    }

    fn target() -> DetailTarget {
        DetailTarget {
            url: "https://maps.example.com/place/ada-bakery".to_string(),
            city: "Springfield".to_string(),
            keyword: "bakery".to_string(),
        }
    }

    fn detail_page(html: &str) -> FetchedPage {
        FetchedPage {
            url: "https://maps.example.com/place/ada-bakery".to_string(),
            status_code: 200,
            html: html.to_string(),
        }
    }

    #[test]
    fn test_collects_valid_record() {
        let html = r#"<html><body><h1>Ada's Bakery</h1><span class="phone">555-0100</span></body></html>"#;

        let record = handle_detail_page(&detail_page(html), &target(), &rules(), "name").unwrap();

        assert_eq!(record.source_url, "https://maps.example.com/place/ada-bakery");
        assert_eq!(record.city, "Springfield");
        assert_eq!(record.keyword, "bakery");
        assert_eq!(record.field("name"), Some("Ada's Bakery"));
        assert_eq!(record.field("phone"), Some("555-0100"));
    }

    #[test]
    fn test_drops_page_without_primary_field() {
        let html = r#"<html><body><span class="phone">555-0100</span></body></html>"#;

        let record = handle_detail_page(&detail_page(html), &target(), &rules(), "name");

        assert!(record.is_none());
    }

    #[test]
    fn test_drops_page_with_blank_primary_field() {
        let html = r#"<html><body><h1>   </h1></body></html>"#;

        let record = handle_detail_page(&detail_page(html), &target(), &rules(), "name");

        assert!(record.is_none());
    }

    #[test]
    fn test_drops_non_success_page() {
        let mut page = detail_page(r#"<html><body><h1>Ada's Bakery</h1></body></html>"#);
        page.status_code = 404;

        let record = handle_detail_page(&page, &target(), &rules(), "name");

        assert!(record.is_none());
    }

    #[test]
    fn test_absent_fields_stay_in_record() {
        let html = r#"<html><body><h1>Ada's Bakery</h1></body></html>"#;

        let record = handle_detail_page(&detail_page(html), &target(), &rules(), "name").unwrap();

        assert!(record.fields.contains_key("phone"));
        assert_eq!(record.field("phone"), None);
    }

    #[test]
    fn test_mailto_prefix_stripped() {
        let html = r#"<html><body><h1>Ada's Bakery</h1><a class="contact" href="mailto:ada@example.com">Mail</a></body></html>"#;
        let rules = vec![rule("name", "h1"), rule("email", "a.contact::attr(href)")];

        let record = handle_detail_page(&detail_page(html), &target(), &rules, "name").unwrap();

        assert_eq!(record.field("email"), Some("ada@example.com"));
    }

    #[test]
    fn test_email_without_mailto_prefix_is_kept() {
        let html = r#"<html><body><h1>Ada's Bakery</h1><span class="email">ada@example.com</span></body></html>"#;
        let rules = vec![rule("name", "h1"), rule("email", "span.email")];

        let record = handle_detail_page(&detail_page(html), &target(), &rules, "name").unwrap();

        assert_eq!(record.field("email"), Some("ada@example.com"));
    }
}
