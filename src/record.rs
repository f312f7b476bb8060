//! Listing records
//!
//! Extractors produce typed records; everything downstream (normalizer,
//! exporter) works on the untyped, insertion-ordered [`Record`] map.

use serde::Serialize;
use serde_json::{Map, Value};

/// Flat, insertion-ordered mapping of field name to JSON value
pub type Record = Map<String, Value>;

/// Every extracted record carries this label
pub const POST_LABEL: &str = "post";

/// Lightweight item from a search/list page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Raw price text, never parsed to a number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<String>,
}

impl Default for ListItem {
    fn default() -> Self {
        Self {
            id: None,
            url: None,
            title: None,
            datetime: None,
            location: None,
            price: None,
            label: POST_LABEL,
            category: None,
            phone_numbers: Vec::new(),
        }
    }
}

/// Enriched record from a single post page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_accuracy: Option<String>,
    /// Body text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pics: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compensation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

impl Default for PostRecord {
    fn default() -> Self {
        Self {
            id: None,
            url: None,
            title: None,
            datetime: None,
            location: None,
            category: None,
            label: POST_LABEL,
            price: None,
            longitude: None,
            latitude: None,
            map_accuracy: None,
            post: None,
            phone_numbers: Vec::new(),
            pics: Vec::new(),
            amenities: Vec::new(),
            attributes: Vec::new(),
            manufacturer: None,
            model: None,
            condition: None,
            available_from: None,
            employment_type: None,
            compensation: None,
            job_title: None,
        }
    }
}

impl ListItem {
    /// Convert into an untyped record, empty fields omitted
    pub fn into_record(self) -> Record {
        to_record(&self)
    }
}

impl PostRecord {
    /// Convert into an untyped record, empty fields omitted
    pub fn into_record(self) -> Record {
        to_record(&self)
    }
}

fn to_record<T: Serialize>(value: &T) -> Record {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// `true` for null, empty arrays and empty objects
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_item_skips_empty_fields() {
        let item = ListItem {
            url: Some("https://example.org/nyc/apa/111.html".to_string()),
            title: Some("Sunny studio".to_string()),
            ..ListItem::default()
        };

        let record = item.into_record();
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["url", "title", "label"]);
        assert_eq!(record["label"], "post");
    }

    #[test]
    fn test_post_record_uses_camel_case_keys() {
        let post = PostRecord {
            map_accuracy: Some("5".to_string()),
            phone_numbers: vec!["646-744-6519".to_string()],
            job_title: Some("Floor Manager".to_string()),
            ..PostRecord::default()
        };

        let record = post.into_record();
        assert_eq!(record["mapAccuracy"], "5");
        assert_eq!(record["phoneNumbers"], json!(["646-744-6519"]));
        assert_eq!(record["jobTitle"], "Floor Manager");
        assert!(!record.contains_key("pics"));
    }

    #[test]
    fn test_is_empty_value() {
        assert!(is_empty_value(&Value::Null));
        assert!(is_empty_value(&json!([])));
        assert!(is_empty_value(&json!({})));
        assert!(!is_empty_value(&json!("")));
        assert!(!is_empty_value(&json!(0)));
    }
}
