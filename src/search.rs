//! Linear substring search over a stored record set.

use serde_json::Value;

use crate::models::Record;

/// Case-insensitive substring match against every field of every record.
/// A record matches if any field matches; original order is preserved.
/// An empty query matches everything.
pub fn search_records(records: &[Record], query: &str) -> Vec<Record> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| record_matches(record, &needle))
        .cloned()
        .collect()
}

fn record_matches(record: &Record, needle: &str) -> bool {
    record
        .values()
        .any(|value| value_text(value).to_lowercase().contains(needle))
}

/// Textual rendering used for matching. Nulls render empty so queries never
/// match a serialization artifact.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Record {
        let mut r = Record::new();
        for (k, v) in pairs {
            r.insert(k.to_string(), v.clone());
        }
        r
    }

    fn sample() -> Vec<Record> {
        vec![
            record(&[("name", json!("Food")), ("price", json!(3))]),
            record(&[("name", json!("Drink")), ("price", json!(2.5))]),
            record(&[("name", json!("Snack")), ("price", json!(25))]),
        ]
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let results = search_records(&sample(), "oo");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["name"], json!("Food"));

        let results = search_records(&sample(), "FOOD");
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn numbers_match_on_their_text() {
        let results = search_records(&sample(), "2.5");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["name"], json!("Drink"));

        let results = search_records(&sample(), "25");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["name"], json!("Snack"));
    }

    #[test]
    fn empty_query_matches_every_record() {
        assert_eq!(search_records(&sample(), "").len(), 3);
    }

    #[test]
    fn order_is_preserved() {
        let results = search_records(&sample(), "n");
        let names: Vec<_> = results.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![json!("Drink"), json!("Snack")]);
    }

    #[test]
    fn null_fields_do_not_match_null_text() {
        let records = vec![record(&[("note", Value::Null)])];
        assert!(search_records(&records, "null").is_empty());
        assert!(search_records(&records, "none").is_empty());
    }

    #[test]
    fn no_match_yields_empty() {
        assert!(search_records(&sample(), "zzz").is_empty());
    }
}
