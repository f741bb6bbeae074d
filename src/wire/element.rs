use crate::{contract::QName, Result};

/// The transient XML projection of one graph node.
///
/// A `WireElement` is constructed while writing and parsed while reading; it
/// is never persisted as a first-class object. The only place a tree outlives
/// a call is the extension-data bag of a deserialized node, which keeps the
/// unknown subtrees verbatim for forward compatibility.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WireElement {
    /// Element name and namespace
    pub name: QName,
    /// `i:type` polymorphic override, if present
    pub type_attr: Option<QName>,
    /// `i:nil="true"`
    pub nil: bool,
    /// `z:Id` reference-tracking id
    pub id: Option<String>,
    /// `z:Ref` back-reference to a previously defined id
    pub reference: Option<String>,
    /// `z:Size` announced item count (preserve-references collections)
    pub size: Option<u64>,
    /// Ordered child elements
    pub children: Vec<WireElement>,
    /// Text content (primitive and enum payloads)
    pub text: Option<String>,
}

impl WireElement {
    /// Creates an empty element with the given qualified name
    #[must_use]
    pub fn new(name: QName) -> Self {
        WireElement {
            name,
            type_attr: None,
            nil: false,
            id: None,
            reference: None,
            size: None,
            children: Vec::new(),
            text: None,
        }
    }

    /// Creates an explicit-null element (`i:nil="true"`)
    #[must_use]
    pub fn nil(name: QName) -> Self {
        let mut elem = WireElement::new(name);
        elem.nil = true;
        elem
    }

    /// True if the element carries no attributes, children or text
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.nil
            && self.type_attr.is_none()
            && self.id.is_none()
            && self.reference.is_none()
            && self.size.is_none()
            && self.children.is_empty()
            && self.text.is_none()
    }

    /// Enforces the nil exclusivity invariant.
    ///
    /// `i:nil="true"` excludes every other attribute, child element and text
    /// payload on the same element.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the element is nil and carries
    /// anything else.
    pub fn validate_nil(&self) -> Result<()> {
        if self.nil
            && (self.type_attr.is_some()
                || self.id.is_some()
                || self.reference.is_some()
                || self.size.is_some()
                || !self.children.is_empty()
                || self.text.as_deref().is_some_and(|t| !t.is_empty()))
        {
            return Err(malformed_error!(
                "element '{}' is nil but carries other content",
                self.name.name
            ));
        }
        Ok(())
    }
}
