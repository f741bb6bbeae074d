//! # dcxml Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! from the dcxml library. Import this module to get quick access to the
//! essential types for building contracts, graphs and serializing documents.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dcxml operations
pub use crate::Error;

/// The result type used throughout dcxml
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Configured write/read entry point
pub use crate::Serializer;

/// Serializer behavior switches
pub use crate::SerializerConfig;

// ================================================================================================
// Contract Model
// ================================================================================================

/// Contract construction and registration
pub use crate::contract::{ContractBuilder, ContractRegistry};

/// Contract descriptors and handles
pub use crate::contract::{
    CollectionShape, ContractKind, DataContract, DataMember, MemberFlags, QName, TypeHandle,
    XsdPrimitive,
};

/// Polymorphic resolution hooks
pub use crate::contract::{ContractResolver, KnownTypeSet};

// ================================================================================================
// Object Graph
// ================================================================================================

/// The arena-based graph model
pub use crate::graph::{Graph, Node, NodeBody, NodeId, Value};

/// Primitive values and their building blocks
pub use crate::graph::{DateTime, DateTimeKind, Decimal, Primitive};

// ================================================================================================
// Wire Level
// ================================================================================================

/// Parse-time input limits
pub use crate::wire::ReaderQuotas;

/// The fixed wire namespaces
pub use crate::wire::{ARRAYS_NS, CONTRACT_NS_BASE, SERIALIZATION_NS, XSD_NS, XSI_NS};
