/*
 * linked_data.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Linked-data (`ld`) emission.
//!
//! Each `ld` entry becomes a `<script type="application/ld+json">` element
//! placed at the end of the first `head`. Before serialization, date-like
//! values are normalized to RFC 3339 text so that dates stored as epoch
//! seconds or extended JSON come out in the form search engines expect.

use crate::node::{Element, Node};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::debug;

/// Configuration key holding linked data.
pub const LD_KEY: &str = "ld";

/// The `type` attribute of emitted scripts.
pub const LD_SCRIPT_TYPE: &str = "application/ld+json";

const EXTENDED_DATE: &str = "$date";
const EXTENDED_LONG: &str = "$numberLong";

/// Whether a key names a date (`dateModified`, `startDate`, ...).
pub fn is_date_key(key: &str) -> bool {
    key.starts_with("date") || key.ends_with("Date")
}

/// Convert every date-like value in `value` to RFC 3339 text.
///
/// Values under date-like keys and extended-JSON `{"$date": ...}` wrappers
/// anywhere in the tree are converted; anything unparseable is left as is.
pub fn normalize_dates(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                let converted = if is_date_key(key) || is_extended_date(entry) {
                    to_iso8601(entry)
                } else {
                    None
                };
                match converted {
                    Some(text) => *entry = Value::String(text),
                    None => normalize_dates(entry),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                if is_extended_date(item) {
                    if let Some(text) = to_iso8601(item) {
                        *item = Value::String(text);
                        continue;
                    }
                }
                normalize_dates(item);
            }
        }
        _ => {}
    }
}

fn is_extended_date(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.len() == 1 && map.contains_key(EXTENDED_DATE))
}

/// Interpret a value as a point in time and format it as RFC 3339 (UTC).
///
/// Accepts epoch seconds, `{"$date": millis}`,
/// `{"$date": {"$numberLong": "millis"}}`, `{"$date": "text"}` and text in
/// RFC 3339, `%Y-%m-%d %H:%M:%S` or `%Y-%m-%d` form.
pub fn to_iso8601(value: &Value) -> Option<String> {
    let instant = match value {
        Value::Number(n) => match n.as_i64() {
            Some(secs) => DateTime::from_timestamp(secs, 0),
            None => n
                .as_f64()
                .and_then(|secs| DateTime::from_timestamp_millis((secs * 1000.0) as i64)),
        },
        Value::String(text) => parse_date_text(text),
        Value::Object(map) => match map.get(EXTENDED_DATE)? {
            Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
            Value::Object(long) => {
                let millis = long.get(EXTENDED_LONG)?.as_str()?.parse().ok()?;
                DateTime::from_timestamp_millis(millis)
            }
            Value::String(text) => parse_date_text(text),
            _ => None,
        },
        _ => None,
    }?;
    Some(instant.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc());
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Build one script element per linked-data entry.
///
/// `ld` may be a single mapping or a sequence of mappings; other values
/// produce nothing.
///
/// The JSON is emitted verbatim: a `{%` inside a string is written as
/// `{\u0025`, so macro interpolation and unused-macro stripping leave the
/// data intact while JSON readers decode the same text.
pub fn script_nodes(ld: &Value) -> Vec<Node> {
    let entries: Vec<&Value> = match ld {
        Value::Object(_) => vec![ld],
        Value::Array(items) => items.iter().filter(|item| item.is_object()).collect(),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .map(|entry| {
            let mut entry = entry.clone();
            normalize_dates(&mut entry);
            // A literal "</" would end the script element early
            let json = entry
                .to_string()
                .replace("</", "<\\/")
                .replace("{%", "{\\u0025");
            Node::Element(
                Element::new("script")
                    .with_attribute("type", LD_SCRIPT_TYPE)
                    .with_child(Node::Text(json)),
            )
        })
        .collect()
}

/// Append linked-data scripts to the first `head`, or to the root when the
/// tree has no head. Returns the number of scripts added.
pub fn inject(nodes: &mut Vec<Node>, ld: &Value) -> usize {
    let scripts = script_nodes(ld);
    let count = scripts.len();
    if count == 0 {
        return 0;
    }
    match Node::find_element_mut(nodes, "head") {
        Some(head) => head.children.extend(scripts),
        None => {
            debug!("no head element; appending linked data to the root");
            nodes.extend(scripts);
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TagTreeRenderer;
    use crate::resolver::NullResolver;
    use ido_config::ConfigStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_date_keys() {
        assert!(is_date_key("datePublished"));
        assert!(is_date_key("startDate"));
        assert!(!is_date_key("update"));
        assert!(!is_date_key("Dated"));
    }

    #[test]
    fn test_to_iso8601_forms() {
        assert_eq!(
            to_iso8601(&json!(1_700_000_000)).as_deref(),
            Some("2023-11-14T22:13:20Z")
        );
        assert_eq!(
            to_iso8601(&json!({"$date": 1_700_000_000_500_i64})).as_deref(),
            Some("2023-11-14T22:13:20.500Z")
        );
        assert_eq!(
            to_iso8601(&json!({"$date": {"$numberLong": "1700000000000"}})).as_deref(),
            Some("2023-11-14T22:13:20Z")
        );
        assert_eq!(
            to_iso8601(&json!("2024-03-01T10:00:00+02:00")).as_deref(),
            Some("2024-03-01T08:00:00Z")
        );
        assert_eq!(
            to_iso8601(&json!("2024-03-01 10:30:00")).as_deref(),
            Some("2024-03-01T10:30:00Z")
        );
        assert_eq!(
            to_iso8601(&json!("2024-03-01")).as_deref(),
            Some("2024-03-01T00:00:00Z")
        );
        assert_eq!(to_iso8601(&json!("next tuesday")), None);
        assert_eq!(to_iso8601(&json!(true)), None);
    }

    #[test]
    fn test_normalize_dates() {
        let mut ld = json!({
            "@type": "Article",
            "headline": "2024-03-01",
            "datePublished": "2024-03-01",
            "dateModified": "soon",
            "author": {"birthDate": 0},
            "events": [{"$date": {"$numberLong": "0"}}]
        });
        normalize_dates(&mut ld);
        assert_eq!(
            ld,
            json!({
                "@type": "Article",
                "headline": "2024-03-01",
                "datePublished": "2024-03-01T00:00:00Z",
                "dateModified": "soon",
                "author": {"birthDate": "1970-01-01T00:00:00Z"},
                "events": ["1970-01-01T00:00:00Z"]
            })
        );
    }

    #[test]
    fn test_script_nodes() {
        let scripts = script_nodes(&json!([{"name": "</script>"}, "skip", {"a": 1}]));
        assert_eq!(scripts.len(), 2);
        let Node::Element(script) = &scripts[0] else {
            panic!("expected element");
        };
        assert_eq!(script.tag, "script");
        assert_eq!(script.attributes.get("type"), Some(&json!(LD_SCRIPT_TYPE)));
        assert_eq!(
            script.children,
            vec![Node::Text(r#"{"name":"<\/script>"}"#.to_string())]
        );
        assert!(script_nodes(&json!("text")).is_empty());
    }

    #[test]
    fn test_inject_into_head() {
        let mut nodes = Node::parse(&json!({"doctype": {"children": [
            {"html": {"children": [{"head": {}}, {"body": {}}]}}
        ]}}))
        .unwrap();
        let added = inject(&mut nodes, &json!({"@type": "WebSite", "dateCreated": 86400}));
        assert_eq!(added, 1);

        let config = ConfigStore::new();
        let html = TagTreeRenderer::new(&config, &NullResolver)
            .render_to_string(&nodes)
            .unwrap();
        assert_eq!(
            html,
            "<!DOCTYPE html><html><head><script type=\"application/ld+json\">\
             {\"@type\":\"WebSite\",\"dateCreated\":\"1970-01-02T00:00:00Z\"}\
             </script></head><body></body></html>"
        );
    }

    #[test]
    fn test_inject_without_head() {
        let mut nodes = Node::parse(&json!({"div": {}})).unwrap();
        assert_eq!(inject(&mut nodes, &json!({"a": 1})), 1);
        assert_eq!(nodes.len(), 2);
        assert_eq!(inject(&mut nodes, &json!(null)), 0);
    }

    #[test]
    fn test_macro_text_in_ld_survives_rendering() {
        let ld = json!({"@type": "WebPage", "name": "{%env.src%} and {%%}", "url": "/a"});
        let mut nodes = Node::parse(&json!({"head": {}})).unwrap();
        inject(&mut nodes, &ld);

        let mut config = ConfigStore::new();
        config.set("env.src", "/static").unwrap();
        let html = TagTreeRenderer::new(&config, &NullResolver)
            .render_to_string(&nodes)
            .unwrap();

        let body = html
            .strip_prefix("<head><script type=\"application/ld+json\">")
            .and_then(|rest| rest.strip_suffix("</script></head>"))
            .unwrap();
        assert!(!body.contains("{%"), "{body}");
        let decoded: Value = serde_json::from_str(body).unwrap();
        assert_eq!(decoded, ld);
    }
}
