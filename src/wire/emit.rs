//! Canonical XML emission for [`WireElement`] trees.
//!
//! Emission is single-pass over the tree with one pre-scan: `xmlns:i` and
//! `xmlns:z` are declared on the root element only when some node in the tree
//! actually needs `i:nil`/`i:type` or `z:Id`/`z:Ref`/`z:Size`. Default
//! namespaces are scoped - a child redeclares `xmlns` only when its namespace
//! differs from the inherited one. `i:type` values pointing into a foreign
//! namespace bind a local `a` prefix on the carrying element.

use std::io::Write;

use quick_xml::{
    events::{BytesEnd, BytesStart, BytesText, Event},
    Writer,
};

use crate::{
    wire::{WireElement, SERIALIZATION_NS, XSI_NS},
    Result,
};

/// Serializes a wire tree into XML bytes.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if a nil element violates the nil
/// exclusivity invariant, or an I/O error from the sink.
pub fn emit<W: Write>(root: &WireElement, sink: W) -> Result<()> {
    let mut writer = Writer::new(sink);
    let needs_xsi = needs_instance_ns(root);
    let needs_z = needs_serialization_ns(root);
    emit_element(&mut writer, root, "", needs_xsi, needs_z)
}

/// Serializes a wire tree into a UTF-8 string.
///
/// # Errors
/// Same failure modes as [`emit`].
pub(crate) fn emit_to_string(root: &WireElement) -> Result<String> {
    let mut buf = Vec::new();
    emit(root, &mut buf)?;
    // The writer only ever produces UTF-8
    String::from_utf8(buf).map_err(|_| malformed_error!("emitted document is not valid UTF-8"))
}

fn needs_instance_ns(elem: &WireElement) -> bool {
    elem.nil || elem.type_attr.is_some() || elem.children.iter().any(needs_instance_ns)
}

fn needs_serialization_ns(elem: &WireElement) -> bool {
    elem.id.is_some()
        || elem.reference.is_some()
        || elem.size.is_some()
        || elem.children.iter().any(needs_serialization_ns)
}

fn emit_element<W: Write>(
    writer: &mut Writer<W>,
    elem: &WireElement,
    inherited_default: &str,
    declare_xsi: bool,
    declare_z: bool,
) -> Result<()> {
    elem.validate_nil()?;

    let name = elem.name.name.as_str();
    let mut start = BytesStart::new(name);

    let default_ns = if elem.name.namespace == inherited_default {
        inherited_default
    } else {
        start.push_attribute(("xmlns", elem.name.namespace.as_str()));
        elem.name.namespace.as_str()
    };
    if declare_xsi {
        start.push_attribute(("xmlns:i", XSI_NS));
    }
    if declare_z {
        start.push_attribute(("xmlns:z", SERIALIZATION_NS));
    }

    if let Some(id) = &elem.id {
        start.push_attribute(("z:Id", id.as_str()));
    }
    if let Some(reference) = &elem.reference {
        start.push_attribute(("z:Ref", reference.as_str()));
    }
    if let Some(size) = elem.size {
        start.push_attribute(("z:Size", size.to_string().as_str()));
    }
    if let Some(type_name) = &elem.type_attr {
        if type_name.namespace == default_ns {
            start.push_attribute(("i:type", type_name.name.as_str()));
        } else {
            start.push_attribute(("i:type", format!("a:{}", type_name.name).as_str()));
            start.push_attribute(("xmlns:a", type_name.namespace.as_str()));
        }
    }
    if elem.nil {
        start.push_attribute(("i:nil", "true"));
    }

    let has_text = elem.text.as_deref().is_some_and(|t| !t.is_empty());
    if elem.children.is_empty() && !has_text {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = &elem.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &elem.children {
        emit_element(writer, child, default_ns, false, false)?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::QName;

    fn named(name: &str, ns: &str) -> WireElement {
        WireElement::new(QName::new(name, ns))
    }

    #[test]
    fn test_emit_empty_root() {
        let root = named("Person", "urn:x");
        assert_eq!(emit_to_string(&root).unwrap(), r#"<Person xmlns="urn:x"/>"#);
    }

    #[test]
    fn test_emit_text_child_inherits_namespace() {
        let mut root = named("Person", "urn:x");
        let mut child = named("Name", "urn:x");
        child.text = Some("John".to_string());
        root.children.push(child);
        assert_eq!(
            emit_to_string(&root).unwrap(),
            r#"<Person xmlns="urn:x"><Name>John</Name></Person>"#
        );
    }

    #[test]
    fn test_emit_nil_declares_instance_ns() {
        let mut root = named("Person", "urn:x");
        root.children.push(WireElement::nil(QName::new("Name", "urn:x")));
        assert_eq!(
            emit_to_string(&root).unwrap(),
            r#"<Person xmlns="urn:x" xmlns:i="http://www.w3.org/2001/XMLSchema-instance"><Name i:nil="true"/></Person>"#
        );
    }

    #[test]
    fn test_emit_type_attr_same_namespace() {
        let mut root = named("Base", "urn:x");
        root.type_attr = Some(QName::new("Derived", "urn:x"));
        assert_eq!(
            emit_to_string(&root).unwrap(),
            r#"<Base xmlns="urn:x" xmlns:i="http://www.w3.org/2001/XMLSchema-instance" i:type="Derived"/>"#
        );
    }

    #[test]
    fn test_emit_type_attr_foreign_namespace() {
        let mut root = named("value", "urn:x");
        root.type_attr = Some(QName::new("int", "http://www.w3.org/2001/XMLSchema"));
        root.text = Some("3".to_string());
        assert_eq!(
            emit_to_string(&root).unwrap(),
            r#"<value xmlns="urn:x" xmlns:i="http://www.w3.org/2001/XMLSchema-instance" i:type="a:int" xmlns:a="http://www.w3.org/2001/XMLSchema">3</value>"#
        );
    }

    #[test]
    fn test_emit_reference_attrs() {
        let mut root = named("Root", "urn:x");
        let mut full = named("First", "urn:x");
        full.id = Some("i1".to_string());
        let mut back = named("Second", "urn:x");
        back.reference = Some("i1".to_string());
        root.children.push(full);
        root.children.push(back);
        assert_eq!(
            emit_to_string(&root).unwrap(),
            r#"<Root xmlns="urn:x" xmlns:z="http://schemas.microsoft.com/2003/10/Serialization/"><First z:Id="i1"/><Second z:Ref="i1"/></Root>"#
        );
    }

    #[test]
    fn test_emit_escapes_text() {
        let mut root = named("S", "urn:x");
        root.text = Some("a<b&c".to_string());
        assert_eq!(
            emit_to_string(&root).unwrap(),
            r#"<S xmlns="urn:x">a&lt;b&amp;c</S>"#
        );
    }

    #[test]
    fn test_emit_nil_with_content_rejected() {
        let mut root = WireElement::nil(QName::new("S", "urn:x"));
        root.text = Some("x".to_string());
        assert!(emit_to_string(&root).is_err());
    }
}
