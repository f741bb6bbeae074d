//! Quota-bounded XML parsing into [`WireElement`] trees.
//!
//! The parser runs over raw `quick-xml` events and keeps its own namespace
//! scope stack; this gives the engine full control over prefix resolution for
//! both element names and `i:type` attribute values. All three reader quotas
//! are enforced here, while parsing, before any graph node is allocated -
//! a depth bomb or oversized token is rejected without constructing anything.

use std::str;

use quick_xml::{events::Event, Reader};

use crate::{
    contract::QName,
    wire::{WireElement, SERIALIZATION_NS, XSI_NS},
    Error, Result,
};

/// Hard limits on the cost of parsing attacker-controlled XML.
///
/// Exceeding any of these is a terminal [`Error::QuotaExceeded`] for the
/// current read call, not a retryable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderQuotas {
    /// Maximum element nesting depth
    pub max_depth: u32,
    /// Maximum length of one text or attribute token, in bytes
    pub max_string_length: usize,
    /// Maximum number of child elements under one element
    pub max_array_length: usize,
}

impl Default for ReaderQuotas {
    fn default() -> Self {
        ReaderQuotas {
            max_depth: 32,
            max_string_length: 8192,
            max_array_length: 16384,
        }
    }
}

/// One open element plus the namespace declarations it introduced.
struct Scope {
    elem: WireElement,
    text: String,
    default_ns: String,
    bindings: Vec<(String, String)>,
}

/// Parses an XML document into a wire tree under the given quotas.
///
/// Comments, processing instructions and the XML declaration are skipped;
/// CDATA is treated as text. Whitespace-only text between child elements is
/// insignificant and dropped.
///
/// # Errors
/// Returns [`Error::Malformed`] for unparseable input (including an empty
/// stream), [`Error::QuotaExceeded`] when a quota is hit.
pub fn parse(input: &[u8], quotas: &ReaderQuotas) -> Result<WireElement> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut stack: Vec<Scope> = Vec::new();
    let mut root: Option<WireElement> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let scope = open_element(e.name().as_ref(), e.attributes(), &stack, quotas)?;
                if root.is_some() && stack.is_empty() {
                    return Err(malformed_error!("multiple root elements in input"));
                }
                stack.push(scope);
            }
            Event::Empty(e) => {
                let scope = open_element(e.name().as_ref(), e.attributes(), &stack, quotas)?;
                if root.is_some() && stack.is_empty() {
                    return Err(malformed_error!("multiple root elements in input"));
                }
                close_element(scope, &mut stack, &mut root, quotas)?;
            }
            Event::End(_) => {
                // quick-xml already validated tag pairing
                let scope = stack
                    .pop()
                    .ok_or_else(|| malformed_error!("unbalanced end tag"))?;
                close_element(scope, &mut stack, &mut root, quotas)?;
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                append_text(&mut stack, &text, quotas)?;
            }
            Event::CData(t) => {
                let bytes = t.into_inner();
                let text = str::from_utf8(&bytes)
                    .map_err(|_| malformed_error!("CDATA section is not valid UTF-8"))?;
                append_text(&mut stack, text, quotas)?;
            }
            Event::Eof => break,
            // XML declaration, comments, processing instructions, doctype
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(malformed_error!("unexpected end of input inside element"));
    }
    root.ok_or_else(|| malformed_error!("input does not contain a root element"))
}

fn append_text(stack: &mut [Scope], text: &str, quotas: &ReaderQuotas) -> Result<()> {
    match stack.last_mut() {
        Some(scope) => {
            if scope.text.len() + text.len() > quotas.max_string_length {
                return Err(Error::QuotaExceeded {
                    quota: "max_string_length",
                    limit: quotas.max_string_length as u64,
                });
            }
            scope.text.push_str(text);
            Ok(())
        }
        None => {
            if text.trim().is_empty() {
                Ok(())
            } else {
                Err(malformed_error!("text content outside the root element"))
            }
        }
    }
}

/// Validates a completed scope and attaches it to its parent or the root slot.
fn close_element(
    mut scope: Scope,
    stack: &mut Vec<Scope>,
    root: &mut Option<WireElement>,
    quotas: &ReaderQuotas,
) -> Result<()> {
    if !scope.elem.children.is_empty() {
        // Mixed content: whitespace between child elements is insignificant
        if !scope.text.trim().is_empty() {
            return Err(malformed_error!(
                "element '{}' mixes text and child elements",
                scope.elem.name.name
            ));
        }
    } else if !scope.text.is_empty() {
        scope.elem.text = Some(std::mem::take(&mut scope.text));
    }
    scope.elem.validate_nil()?;

    match stack.last_mut() {
        Some(parent) => {
            if parent.elem.children.len() >= quotas.max_array_length {
                return Err(Error::QuotaExceeded {
                    quota: "max_array_length",
                    limit: quotas.max_array_length as u64,
                });
            }
            parent.elem.children.push(scope.elem);
        }
        None => {
            if root.is_some() {
                return Err(malformed_error!("multiple root elements in input"));
            }
            *root = Some(scope.elem);
        }
    }
    Ok(())
}

/// Parses a start tag into a new scope: namespace declarations first, then
/// the element name and the recognized wire attributes.
fn open_element(
    raw_name: &[u8],
    attributes: quick_xml::events::attributes::Attributes<'_>,
    stack: &[Scope],
    quotas: &ReaderQuotas,
) -> Result<Scope> {
    if stack.len() as u32 >= quotas.max_depth {
        return Err(Error::QuotaExceeded {
            quota: "max_depth",
            limit: u64::from(quotas.max_depth),
        });
    }

    let mut default_ns: Option<String> = None;
    let mut bindings: Vec<(String, String)> = Vec::new();
    let mut plain: Vec<(String, String)> = Vec::new();

    for attr in attributes {
        let attr = attr?;
        let key = str::from_utf8(attr.key.as_ref())
            .map_err(|_| malformed_error!("attribute name is not valid UTF-8"))?
            .to_string();
        let value = attr.unescape_value()?.into_owned();
        if value.len() > quotas.max_string_length {
            return Err(Error::QuotaExceeded {
                quota: "max_string_length",
                limit: quotas.max_string_length as u64,
            });
        }
        if key == "xmlns" {
            default_ns = Some(value);
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            bindings.push((prefix.to_string(), value));
        } else {
            plain.push((key, value));
        }
    }

    let default_ns =
        default_ns.unwrap_or_else(|| inherited_default(stack).to_string());

    let name = str::from_utf8(raw_name)
        .map_err(|_| malformed_error!("element name is not valid UTF-8"))?;
    let elem_name = match name.split_once(':') {
        Some((prefix, local)) => {
            let ns = resolve_prefix(stack, &bindings, prefix)
                .ok_or_else(|| malformed_error!("undeclared namespace prefix '{}'", prefix))?;
            QName::new(local, ns)
        }
        None => QName::new(name, default_ns.as_str()),
    };

    let mut elem = WireElement::new(elem_name);
    for (key, value) in plain {
        // Unprefixed attributes carry no namespace and are never wire attributes
        let Some((prefix, local)) = key.split_once(':') else {
            continue;
        };
        let Some(ns) = resolve_prefix(stack, &bindings, prefix) else {
            return Err(malformed_error!("undeclared namespace prefix '{}'", prefix));
        };
        match (ns, local) {
            (XSI_NS, "nil") => {
                elem.nil = match value.as_str() {
                    "true" | "1" => true,
                    "false" | "0" => false,
                    other => {
                        return Err(malformed_error!("invalid i:nil value '{}'", other));
                    }
                };
            }
            (XSI_NS, "type") => {
                elem.type_attr = Some(resolve_qname_value(
                    &value,
                    stack,
                    &bindings,
                    &default_ns,
                )?);
            }
            (SERIALIZATION_NS, "Id") => elem.id = Some(value),
            (SERIALIZATION_NS, "Ref") => elem.reference = Some(value),
            (SERIALIZATION_NS, "Size") => {
                let size: u64 = value
                    .parse()
                    .map_err(|_| malformed_error!("invalid z:Size value '{}'", value))?;
                elem.size = Some(size);
            }
            // Foreign attributes are tolerated and dropped
            _ => {}
        }
    }

    Ok(Scope {
        elem,
        text: String::new(),
        default_ns,
        bindings,
    })
}

/// Resolves a `prefix:Name` (or bare `Name`) attribute value to a qname.
fn resolve_qname_value(
    value: &str,
    stack: &[Scope],
    local_bindings: &[(String, String)],
    default_ns: &str,
) -> Result<QName> {
    match value.split_once(':') {
        Some((prefix, local)) => {
            let ns = resolve_prefix(stack, local_bindings, prefix)
                .ok_or_else(|| malformed_error!("undeclared namespace prefix '{}'", prefix))?;
            Ok(QName::new(local, ns))
        }
        None => Ok(QName::new(value, default_ns)),
    }
}

fn inherited_default(stack: &[Scope]) -> &str {
    stack.last().map_or("", |scope| scope.default_ns.as_str())
}

/// Looks up a prefix binding, innermost scope first.
fn resolve_prefix<'a>(
    stack: &'a [Scope],
    local_bindings: &'a [(String, String)],
    prefix: &str,
) -> Option<&'a str> {
    if let Some((_, ns)) = local_bindings.iter().rev().find(|(p, _)| p == prefix) {
        return Some(ns.as_str());
    }
    for scope in stack.iter().rev() {
        if let Some((_, ns)) = scope.bindings.iter().rev().find(|(p, _)| p == prefix) {
            return Some(ns.as_str());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(xml: &str) -> Result<WireElement> {
        parse(xml.as_bytes(), &ReaderQuotas::default())
    }

    #[test]
    fn test_parse_simple_document() {
        let root = parse_default(r#"<Person xmlns="urn:x"><Name>John</Name></Person>"#).unwrap();
        assert!(root.name.is("Person", "urn:x"));
        assert_eq!(root.children.len(), 1);
        assert!(root.children[0].name.is("Name", "urn:x"));
        assert_eq!(root.children[0].text.as_deref(), Some("John"));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(matches!(
            parse_default(""),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            parse_default("   "),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_parse_nil_attribute() {
        let root = parse_default(
            r#"<Person xmlns="urn:x" xmlns:i="http://www.w3.org/2001/XMLSchema-instance"><Name i:nil="true"/></Person>"#,
        )
        .unwrap();
        assert!(root.children[0].nil);
    }

    #[test]
    fn test_parse_nil_with_content_rejected() {
        let result = parse_default(
            r#"<Person xmlns:i="http://www.w3.org/2001/XMLSchema-instance" i:nil="true">x</Person>"#,
        );
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_parse_type_attribute_prefixed() {
        let root = parse_default(
            r#"<v xmlns="urn:x" xmlns:i="http://www.w3.org/2001/XMLSchema-instance" i:type="a:int" xmlns:a="http://www.w3.org/2001/XMLSchema">3</v>"#,
        )
        .unwrap();
        assert_eq!(
            root.type_attr,
            Some(QName::new("int", "http://www.w3.org/2001/XMLSchema"))
        );
        assert_eq!(root.text.as_deref(), Some("3"));
    }

    #[test]
    fn test_parse_type_attribute_default_ns() {
        let root = parse_default(
            r#"<v xmlns="urn:x" xmlns:i="http://www.w3.org/2001/XMLSchema-instance" i:type="Derived"/>"#,
        )
        .unwrap();
        assert_eq!(root.type_attr, Some(QName::new("Derived", "urn:x")));
    }

    #[test]
    fn test_parse_reference_attributes() {
        let root = parse_default(
            r#"<R xmlns:z="http://schemas.microsoft.com/2003/10/Serialization/"><A z:Id="i1"/><B z:Ref="i1"/></R>"#,
        )
        .unwrap();
        assert_eq!(root.children[0].id.as_deref(), Some("i1"));
        assert_eq!(root.children[1].reference.as_deref(), Some("i1"));
    }

    #[test]
    fn test_parse_size_attribute() {
        let root = parse_default(
            r#"<R xmlns:z="http://schemas.microsoft.com/2003/10/Serialization/" z:Size="2"><a/><b/></R>"#,
        )
        .unwrap();
        assert_eq!(root.size, Some(2));
    }

    #[test]
    fn test_parse_depth_quota() {
        let quotas = ReaderQuotas {
            max_depth: 4,
            ..ReaderQuotas::default()
        };
        let deep = "<a><a><a><a><a/></a></a></a></a>";
        assert!(matches!(
            parse(deep.as_bytes(), &quotas),
            Err(Error::QuotaExceeded {
                quota: "max_depth",
                ..
            })
        ));
        let ok = "<a><a><a><a/></a></a></a>";
        assert!(parse(ok.as_bytes(), &quotas).is_ok());
    }

    #[test]
    fn test_parse_string_quota() {
        let quotas = ReaderQuotas {
            max_string_length: 4,
            ..ReaderQuotas::default()
        };
        assert!(matches!(
            parse(b"<a>hello</a>", &quotas),
            Err(Error::QuotaExceeded {
                quota: "max_string_length",
                ..
            })
        ));
        assert!(parse(b"<a>hi</a>", &quotas).is_ok());
    }

    #[test]
    fn test_parse_array_quota() {
        let quotas = ReaderQuotas {
            max_array_length: 2,
            ..ReaderQuotas::default()
        };
        assert!(matches!(
            parse(b"<a><b/><b/><b/></a>", &quotas),
            Err(Error::QuotaExceeded {
                quota: "max_array_length",
                ..
            })
        ));
        assert!(parse(b"<a><b/><b/></a>", &quotas).is_ok());
    }

    #[test]
    fn test_parse_foreign_attributes_dropped() {
        let root = parse_default(
            r#"<a xmlns:f="urn:f" f:custom="1" plain="2"><b/></a>"#,
        )
        .unwrap();
        assert!(root.type_attr.is_none());
        assert!(root.id.is_none());
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_parse_whitespace_between_children_insignificant() {
        let root = parse_default("<a>\n  <b/>\n  <c/>\n</a>").unwrap();
        assert_eq!(root.children.len(), 2);
        assert!(root.text.is_none());
    }

    #[test]
    fn test_parse_preserves_text_whitespace() {
        let root = parse_default("<a>  padded  </a>").unwrap();
        assert_eq!(root.text.as_deref(), Some("  padded  "));
    }

    #[test]
    fn test_parse_cdata_as_text() {
        let root = parse_default("<a><![CDATA[x<y]]></a>").unwrap();
        assert_eq!(root.text.as_deref(), Some("x<y"));
    }
}
