//! Declarative HTML field extraction
//!
//! Rules map output field names to CSS selectors, optionally reading an
//! attribute instead of element text. Compilation happens once per run;
//! extraction itself is pure and infallible.

mod extractor;
mod rules;

pub use extractor::{extract, FieldMap};
pub use rules::{compile_rules, SelectorRule, EMAIL_FIELD};
