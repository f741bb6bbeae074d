//! Wire-level XML projection.
//!
//! This module owns everything that touches angle brackets: the transient
//! [`WireElement`] tree both pipelines operate on, the emitter that turns a
//! tree into canonical XML bytes, and the parser that builds a tree from
//! input bytes under reader quotas.
//!
//! # Key Components
//!
//! - [`WireElement`] - transient element projection (never persisted)
//! - [`emit`] - WireElement tree to XML bytes
//! - [`parse`] - XML bytes to WireElement tree, quota-bounded
//! - Namespace constants for the fixed wire vocabulary
//!
//! # Wire Attributes
//!
//! The engine recognizes exactly five attributes, by resolved namespace:
//! `i:nil` and `i:type` in the XML Schema instance namespace, and `z:Id`,
//! `z:Ref`, `z:Size` in the serialization namespace. `i:nil="true"` is
//! mutually exclusive with any other attribute or child.

mod element;
mod emit;
mod parse;

pub use element::WireElement;
pub use emit::emit;
pub use parse::{parse, ReaderQuotas};

/// XML Schema namespace - primitive wire type names
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance namespace - `i:nil` and `i:type`
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Serialization namespace - `z:Id`, `z:Ref`, `z:Size` and the non-XSD primitives
pub const SERIALIZATION_NS: &str = "http://schemas.microsoft.com/2003/10/Serialization/";

/// Collection wrapper namespace - `ArrayOf*` and `KeyValueOf*` elements
pub const ARRAYS_NS: &str = "http://schemas.microsoft.com/2003/10/Serialization/Arrays";

/// Base of the default contract namespace scheme
pub const CONTRACT_NS_BASE: &str = "http://schemas.datacontract.org/2004/07/";

/// Synthesizes the default contract namespace for a declared namespace segment
#[must_use]
pub fn default_contract_namespace(segment: &str) -> String {
    format!("{CONTRACT_NS_BASE}{segment}")
}
