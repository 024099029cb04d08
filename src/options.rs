//! Normalization of backend option payloads
//!
//! The recommendation endpoint is loose about the shape of `content`: category,
//! size and color queries come back either as a sequence of objects or as a
//! keyed map, and product queries as a sequence of product objects. Everything
//! funnels through here so the rest of the widget only ever sees ordered
//! `CatalogOption` lists. A malformed payload degrades to an empty list rather
//! than an error; the flow surfaces that as "no options".

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A user-selectable choice at one flow step.
///
/// `id` is the backend-stable identifier composed into follow-up requests,
/// `name` the label shown to the user. Ids are unique within one option set,
/// names need not be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogOption {
    pub id: String,
    pub name: String,
}

impl CatalogOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A product recommendation, produced only at the final flow step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub recommendation: String,
    #[serde(default)]
    pub company: Option<String>,
}

impl Product {
    /// One-line transcript form: "name / recommendation", with the optional
    /// manufacturer attribution the backend sometimes includes.
    pub fn display_line(&self) -> String {
        match &self.company {
            Some(company) => format!("{} by {} / {}", self.name, company, self.recommendation),
            None => format!("{} / {}", self.name, self.recommendation),
        }
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Convert a raw options payload into an ordered list of catalog options.
///
/// - A sequence maps element-wise: objects carrying string `id`/`name` fields
///   keep them, anything else becomes an option whose id and name are both
///   the stringified element.
/// - A map yields one option per key in enumeration order: id = key,
///   name = stringified value.
/// - Any other shape yields no options.
pub fn normalize(raw: &Value) -> Vec<CatalogOption> {
    match raw {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let id = item.get("id").and_then(Value::as_str);
                let name = item.get("name").and_then(Value::as_str);
                match (id, name) {
                    (Some(id), Some(name)) => CatalogOption::new(id, name),
                    _ => {
                        let text = stringify(item);
                        CatalogOption::new(text.clone(), text)
                    }
                }
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| CatalogOption::new(key.clone(), stringify(value)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse a product query response. Lenient: elements that don't look like a
/// product are dropped, a non-sequence payload yields no products.
pub fn parse_products(raw: &Value) -> Vec<Product> {
    match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sequence_of_objects_keeps_ids_and_order() {
        let raw = json!([
            {"id": "c2", "name": "Shirts"},
            {"id": "c1", "name": "Trousers"},
            {"id": "c9", "name": "Shirts"}
        ]);
        let options = normalize(&raw);
        assert_eq!(
            options,
            vec![
                CatalogOption::new("c2", "Shirts"),
                CatalogOption::new("c1", "Trousers"),
                CatalogOption::new("c9", "Shirts"),
            ]
        );
    }

    #[test]
    fn sequence_of_strings_derives_ids() {
        let raw = json!(["Shirts", "Shoes"]);
        let options = normalize(&raw);
        assert_eq!(
            options,
            vec![
                CatalogOption::new("Shirts", "Shirts"),
                CatalogOption::new("Shoes", "Shoes"),
            ]
        );
    }

    #[test]
    fn sequence_of_numbers_stringifies() {
        let options = normalize(&json!([38, 40, 42]));
        assert_eq!(options[0], CatalogOption::new("38", "38"));
        assert_eq!(options.len(), 3);
    }

    #[test]
    fn keyed_map_uses_keys_as_ids_in_enumeration_order() {
        let raw: Value = serde_json::from_str(r#"{"s1": "Small", "s2": "Medium", "s3": 44}"#)
            .unwrap();
        let options = normalize(&raw);
        assert_eq!(
            options,
            vec![
                CatalogOption::new("s1", "Small"),
                CatalogOption::new("s2", "Medium"),
                CatalogOption::new("s3", "44"),
            ]
        );
    }

    #[test]
    fn object_element_missing_name_falls_back_to_stringified() {
        let raw = json!([{"id": "c1"}]);
        let options = normalize(&raw);
        assert_eq!(options[0].id, options[0].name);
        assert!(options[0].id.contains("c1"));
    }

    #[test]
    fn malformed_payloads_degrade_to_empty() {
        assert!(normalize(&json!(null)).is_empty());
        assert!(normalize(&json!("just text")).is_empty());
        assert!(normalize(&json!(17)).is_empty());
        assert!(normalize(&json!(true)).is_empty());
    }

    #[test]
    fn products_parse_leniently() {
        let raw = json!([
            {"name": "Blue Shirt", "recommendation": "Best seller"},
            {"unrelated": true},
            {"name": "Red Shirt", "recommendation": "New", "company": "Acme"}
        ]);
        let products = parse_products(&raw);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].display_line(), "Blue Shirt / Best seller");
        assert_eq!(products[1].display_line(), "Red Shirt by Acme / New");
    }

    #[test]
    fn non_sequence_product_payload_is_empty() {
        assert!(parse_products(&json!({"name": "x"})).is_empty());
        assert!(parse_products(&json!(null)).is_empty());
    }
}
