//! Request payload encoding
//!
//! HTTP-call jobs send their (already substituted) payload either as JSON or
//! as an XML document. The XML layout wraps the object in a `<root>` element
//! and annotates every element with its JSON type:
//!
//! ```text
//! {"vlan": 42, "tags": ["a"]}
//! <?xml version="1.0" encoding="UTF-8" ?><root><vlan type="int">42</vlan><tags type="list"><item type="str">a</item></tags></root>
//! ```

use serde_json::Value as JsonValue;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>"#;

/// Encoded request body with its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub content_type: &'static str,
    pub body: String,
}

/// Encodes a payload as JSON, or as XML when `as_xml` is set
pub fn encode(payload: &JsonValue, as_xml: bool) -> anyhow::Result<EncodedPayload> {
    if as_xml {
        Ok(EncodedPayload {
            content_type: "application/xml",
            body: to_xml(payload),
        })
    } else {
        Ok(EncodedPayload {
            content_type: "application/json",
            body: serde_json::to_string(payload)?,
        })
    }
}

/// Renders a JSON value as a typed XML document
pub fn to_xml(value: &JsonValue) -> String {
    let mut out = String::from(XML_DECLARATION);
    out.push_str("<root>");
    match value {
        JsonValue::Object(map) => {
            for (key, child) in map {
                write_element(&mut out, key, child);
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                write_element(&mut out, "item", item);
            }
        }
        scalar => write_text(&mut out, scalar),
    }
    out.push_str("</root>");
    out
}

fn write_element(out: &mut String, key: &str, value: &JsonValue) {
    let (tag, name_attr) = match element_name(key) {
        Some(tag) => (tag, None),
        None => ("key".to_string(), Some(escape(key))),
    };

    out.push('<');
    out.push_str(&tag);
    if let Some(name) = &name_attr {
        out.push_str(&format!(r#" name="{}""#, name));
    }
    out.push_str(&format!(r#" type="{}">"#, type_name(value)));

    match value {
        JsonValue::Object(map) => {
            for (child_key, child) in map {
                write_element(out, child_key, child);
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                write_element(out, "item", item);
            }
        }
        scalar => write_text(out, scalar),
    }

    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

fn write_text(out: &mut String, value: &JsonValue) {
    match value {
        JsonValue::String(s) => out.push_str(&escape(s)),
        JsonValue::Null => {}
        other => out.push_str(&other.to_string()),
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::String(_) => "str",
        JsonValue::Number(n) if n.is_f64() => "float",
        JsonValue::Number(_) => "int",
        JsonValue::Bool(_) => "bool",
        JsonValue::Null => "null",
        JsonValue::Object(_) => "dict",
        JsonValue::Array(_) => "list",
    }
}

/// Turns an object key into an element name, if one can be made
///
/// Spaces become underscores and keys starting with a digit get an `n`
/// prefix. Keys that are still not valid names are emitted as
/// `<key name="...">` instead.
fn element_name(key: &str) -> Option<String> {
    let mut name = key.replace(' ', "_");
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, 'n');
    }

    is_valid_name(&name).then_some(name)
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if !(first.is_alphabetic() || first == '_') {
        return false;
    }

    if name.to_ascii_lowercase().starts_with("xml") {
        return false;
    }

    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(xml: &str) -> &str {
        xml.strip_prefix(XML_DECLARATION)
            .and_then(|rest| rest.strip_prefix("<root>"))
            .and_then(|rest| rest.strip_suffix("</root>"))
            .unwrap()
    }

    #[test]
    fn test_json_encoding() {
        let encoded = encode(&json!({ "hostname": "r1" }), false).unwrap();
        assert_eq!(encoded.content_type, "application/json");
        assert_eq!(encoded.body, r#"{"hostname":"r1"}"#);
    }

    #[test]
    fn test_xml_encoding_annotates_types() {
        let encoded = encode(
            &json!({ "name": "r1", "vlan": 42, "mtu": 1.5, "up": true, "note": null }),
            true,
        )
        .unwrap();
        assert_eq!(encoded.content_type, "application/xml");

        let xml = body(&encoded.body);
        assert!(xml.contains(r#"<name type="str">r1</name>"#));
        assert!(xml.contains(r#"<vlan type="int">42</vlan>"#));
        assert!(xml.contains(r#"<mtu type="float">1.5</mtu>"#));
        assert!(xml.contains(r#"<up type="bool">true</up>"#));
        assert!(xml.contains(r#"<note type="null"></note>"#));
    }

    #[test]
    fn test_xml_nested_values() {
        let xml = to_xml(&json!({ "iface": { "ports": [1, "eth0"] } }));
        assert_eq!(
            body(&xml),
            r#"<iface type="dict"><ports type="list"><item type="int">1</item><item type="str">eth0</item></ports></iface>"#
        );
    }

    #[test]
    fn test_xml_key_sanitizing() {
        let xml = to_xml(&json!({ "host name": "a", "1st": "b", "a/b": "c" }));
        let xml = body(&xml);
        assert!(xml.contains(r#"<host_name type="str">a</host_name>"#));
        assert!(xml.contains(r#"<n1st type="str">b</n1st>"#));
        assert!(xml.contains(r#"<key name="a/b" type="str">c</key>"#));
    }

    #[test]
    fn test_xml_escapes_text() {
        let xml = to_xml(&json!({ "cmd": "a < b & \"c\"" }));
        assert!(body(&xml).contains("a &lt; b &amp; &quot;c&quot;"));
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(body(&to_xml(&json!({}))), "");
        assert_eq!(encode(&json!({}), false).unwrap().body, "{}");
    }
}
