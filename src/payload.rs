//! Structural access to write payloads
//!
//! Write bodies are spliced into a translated document. PUT and PATCH bodies
//! carry the addressed resource as their outer node, which must be removed;
//! POST bodies carry the new child, which is kept. Both cases locate node
//! boundaries with a real parser (quick-xml, serde_json) rather than by
//! counting brackets, so nested content before the wrapper cannot confuse it.

use std::borrow::Cow;
use std::fmt;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde_json::Value;
use serde_json::value::RawValue;

use crate::error::{RestconfError, Result};
use crate::tokenize::split_qualified;

/// The resource a PUT/PATCH body carries, with its outer node removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource<'a> {
    /// Name of the outer node, qualified as it appeared in the payload
    pub name: String,
    /// Content of the outer node, ready to splice
    pub body: Cow<'a, str>,
    /// Direct children holding a scalar value, by local name
    leaves: Vec<(String, String)>,
}

impl Resource<'_> {
    /// Value of the direct scalar child `name`, if the payload carries one
    pub fn leaf(&self, name: &str) -> Option<&str> {
        self.leaves
            .iter()
            .find(|(leaf, _)| leaf == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Root element of an XML payload: byte offsets and scalar children
#[derive(Debug, Clone, PartialEq, Eq)]
struct XmlRoot {
    /// Local name of the root element
    name: String,
    /// Position of the root start tag's `<`
    outer_start: usize,
    /// Position just after the root start tag's `>`
    inner_start: usize,
    /// Position of the root end tag's `<`
    inner_end: usize,
    /// Position just after the root end tag's `>`
    outer_end: usize,
    leaves: Vec<(String, String)>,
}

fn local_name(element: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(element.local_name().as_ref())
        .map(str::to_owned)
        .map_err(|_| RestconfError::MalformedPayload("element name is not UTF-8".into()))
}

fn locate_xml_root(payload: &str) -> Result<XmlRoot> {
    let mut reader = Reader::from_str(payload);
    let mut depth = 0usize;
    let mut open: Option<(String, usize, usize)> = None;
    let mut leaves = Vec::new();
    // Child of the root being read, while it holds only text
    let mut leaf: Option<(String, String)> = None;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => {
                match depth {
                    0 => {
                        if open.is_some() {
                            return Err(RestconfError::MalformedPayload(
                                "more than one root element".into(),
                            ));
                        }
                        open = Some((local_name(&e)?, before, reader.buffer_position() as usize));
                    }
                    1 => leaf = Some((local_name(&e)?, String::new())),
                    _ => leaf = None,
                }
                depth += 1;
            }
            Event::Empty(e) => match depth {
                0 => {
                    let end = reader.buffer_position() as usize;
                    return Ok(XmlRoot {
                        name: local_name(&e)?,
                        outer_start: before,
                        inner_start: end,
                        inner_end: end,
                        outer_end: end,
                        leaves,
                    });
                }
                1 => leaves.push((local_name(&e)?, String::new())),
                _ => leaf = None,
            },
            Event::Text(t) if depth == 2 => {
                if let Some((_, text)) = leaf.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) if depth == 2 => {
                if let Some((_, text)) = leaf.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    RestconfError::MalformedPayload("unbalanced end tag".into())
                })?;
                match depth {
                    0 => {
                        if let Some((name, outer_start, inner_start)) = open.take() {
                            return Ok(XmlRoot {
                                name,
                                outer_start,
                                inner_start,
                                inner_end: before,
                                outer_end: reader.buffer_position() as usize,
                                leaves,
                            });
                        }
                    }
                    1 => leaves.extend(leaf.take()),
                    _ => {}
                }
            }
            Event::Eof => {
                return Err(RestconfError::MalformedPayload(if open.is_some() {
                    "unterminated root element".into()
                } else {
                    "no root element".into()
                }));
            }
            _ => {}
        }
    }
}

/// The resource an XML PUT/PATCH body carries.
///
/// `<album><year>2011</year></album>` yields a resource named `album` with
/// body `<year>2011</year>`.
pub fn xml_resource(payload: &str) -> Result<Resource<'_>> {
    let root = locate_xml_root(payload)?;
    Ok(Resource {
        name: root.name,
        body: Cow::Borrowed(&payload[root.inner_start..root.inner_end]),
        leaves: root.leaves,
    })
}

/// The root element of an XML payload, without any prolog or trailing misc
pub fn xml_element(payload: &str) -> Result<&str> {
    let root = locate_xml_root(payload)?;
    Ok(&payload[root.outer_start..root.outer_end])
}

/// Top-level members of a JSON object, in document order, values kept raw
struct Members(Vec<(String, Box<RawValue>)>);

impl<'de> Deserialize<'de> for Members {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct MembersVisitor;

        impl<'de> Visitor<'de> for MembersVisitor {
            type Value = Members;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Members, A::Error> {
                let mut members = Vec::new();
                while let Some((name, value)) = map.next_entry::<String, Box<RawValue>>()? {
                    members.push((name, value));
                }
                Ok(Members(members))
            }
        }

        deserializer.deserialize_map(MembersVisitor)
    }
}

fn object_body(raw: &RawValue) -> Result<&str> {
    raw.get()
        .trim()
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .map(str::trim)
        .ok_or_else(|| RestconfError::MalformedPayload("resource value is not an object".into()))
}

/// Text of a scalar JSON value; objects, arrays and null have none
fn scalar_text(value: &RawValue) -> Option<String> {
    match serde_json::from_str(value.get()).ok()? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_entry(name: &str, entry: &RawValue) -> Result<Resource<'static>> {
    let body = object_body(entry)?.to_owned();
    let Members(members) = serde_json::from_str(entry.get())?;
    let leaves = members
        .iter()
        .filter_map(|(member, value)| {
            scalar_text(value).map(|text| (split_qualified(member).1.to_owned(), text))
        })
        .collect();
    Ok(Resource {
        name: name.to_owned(),
        body: Cow::Owned(body),
        leaves,
    })
}

/// The resource a JSON PUT/PATCH body carries.
///
/// `{"example-jukebox:album": {"year": 2011}}` yields a resource named
/// `example-jukebox:album` with body `"year": 2011`. A list entry may also
/// be sent as a one-element array, as RFC 8040 allows.
pub fn json_resource(payload: &str) -> Result<Resource<'static>> {
    let Members(members) = serde_json::from_str(payload)?;
    let [(name, value)] = members.as_slice() else {
        return Err(RestconfError::MalformedPayload(format!(
            "expected exactly one top-level member, found {}",
            members.len()
        )));
    };

    if value.get().trim_start().starts_with('[') {
        let entries: Vec<Box<RawValue>> = serde_json::from_str(value.get())?;
        let [entry] = entries.as_slice() else {
            return Err(RestconfError::MalformedPayload(format!(
                "expected exactly one list entry, found {}",
                entries.len()
            )));
        };
        return json_entry(name, entry);
    }
    json_entry(name, value)
}

/// Members of a JSON POST body, ready to be nested under the target resource.
///
/// Member names qualified with `module` lose their prefix, since the parent
/// already belongs to that module; names from other modules stay qualified.
pub fn json_members(payload: &str, module: Option<&str>) -> Result<String> {
    let Members(members) = serde_json::from_str(payload)?;
    if members.is_empty() {
        return Err(RestconfError::MalformedPayload("empty object".into()));
    }

    let mut out = String::new();
    for (i, (name, value)) in members.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let name = match split_qualified(name) {
            (Some(prefix), local) if Some(prefix) == module => local,
            _ => name.as_str(),
        };
        out.push_str(&serde_json::to_string(name)?);
        out.push_str(": ");
        out.push_str(value.get());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_resource() {
        let payload = r#"<album xmlns="http://example.com/ns/example-jukebox"><name>Wasting Light</name><year>2011</year></album>"#;
        let resource = xml_resource(payload).unwrap();
        assert_eq!(resource.name, "album");
        assert_eq!(resource.body, "<name>Wasting Light</name><year>2011</year>");
        assert_eq!(resource.leaf("name"), Some("Wasting Light"));
        assert_eq!(resource.leaf("year"), Some("2011"));
        assert_eq!(resource.leaf("genre"), None);
    }

    #[test]
    fn test_xml_resource_skips_prolog_and_nested_same_name() {
        let payload = "<?xml version=\"1.0\"?>\n<!-- a < b -->\n<a><a>x</a><b/></a>\n";
        let resource = xml_resource(payload).unwrap();
        assert_eq!(resource.body, "<a>x</a><b/>");
        assert_eq!(resource.leaf("a"), Some("x"));
        assert_eq!(resource.leaf("b"), Some(""));
    }

    #[test]
    fn test_xml_resource_leaves_are_direct_scalar_children() {
        let payload = "<artist><name>A &amp; B</name><album><name>inner</name></album></artist>";
        let resource = xml_resource(payload).unwrap();
        assert_eq!(resource.leaf("name"), Some("A & B"));
        assert_eq!(resource.leaf("album"), None);
    }

    #[test]
    fn test_xml_resource_of_empty_root() {
        let resource = xml_resource("<p:library xmlns:p=\"urn:x\"/>").unwrap();
        assert_eq!(resource.name, "library");
        assert_eq!(resource.body, "");
    }

    #[test]
    fn test_xml_element_drops_prolog() {
        let payload = "<?xml version=\"1.0\"?><album><name>x</name></album>";
        assert_eq!(xml_element(payload).unwrap(), "<album><name>x</name></album>");
    }

    #[test]
    fn test_xml_rejects_unterminated_and_empty() {
        assert!(xml_resource("<album><year>2011</year>").is_err());
        assert!(xml_resource("   ").is_err());
    }

    #[test]
    fn test_json_resource() {
        let payload = r#"{"example-jukebox:album": {"name": "Wasting Light", "year": 2011}}"#;
        let resource = json_resource(payload).unwrap();
        assert_eq!(resource.name, "example-jukebox:album");
        assert_eq!(resource.body, r#""name": "Wasting Light", "year": 2011"#);
        assert_eq!(resource.leaf("name"), Some("Wasting Light"));
        assert_eq!(resource.leaf("year"), Some("2011"));
    }

    #[test]
    fn test_json_resource_with_nested_braces() {
        let payload = r#"{"album": {"meta": {"tags": {"x": 1}}, "year": 2011}}"#;
        let resource = json_resource(payload).unwrap();
        assert_eq!(resource.body, r#""meta": {"tags": {"x": 1}}, "year": 2011"#);
        assert_eq!(resource.leaf("meta"), None);
    }

    #[test]
    fn test_json_resource_list_entry_array() {
        let payload = r#"{"example-jukebox:album": [{"year": 2011}]}"#;
        assert_eq!(json_resource(payload).unwrap().body, r#""year": 2011"#);
    }

    #[test]
    fn test_json_resource_rejects_multiple_members() {
        assert!(matches!(
            json_resource(r#"{"a": {}, "b": {}}"#),
            Err(RestconfError::MalformedPayload(_))
        ));
        assert!(matches!(json_resource("[1]"), Err(RestconfError::Json(_))));
    }

    #[test]
    fn test_json_members_strips_own_module_prefix() {
        let payload = r#"{"example-jukebox:album": {"name": "Wasting Light"}, "other:x": 1}"#;
        assert_eq!(
            json_members(payload, Some("example-jukebox")).unwrap(),
            r#""album": {"name": "Wasting Light"}, "other:x": 1"#
        );
    }
}
