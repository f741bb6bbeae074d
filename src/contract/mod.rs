//! Runtime data contract model.
//!
//! Contracts are runtime descriptors of serializable types: wire name,
//! classification, ordered members, collection shape and reference semantics.
//! They are built once through [`ContractBuilder`], cached in a process-wide
//! [`ContractRegistry`] and referred to everywhere else by lightweight
//! [`TypeHandle`] indices.
//!
//! # Key Components
//!
//! - [`DataContract`] / [`DataMember`] - the immutable per-type descriptors
//! - [`ContractBuilder`] - fluent construction with registration-time validation
//! - [`ContractRegistry`] - append-only concurrent contract cache
//! - [`ContractResolver`] / [`KnownTypeSet`] - polymorphic name resolution hooks
//! - [`XsdPrimitive`] - the fixed primitive vocabulary
//!
//! # Examples
//!
//! ```rust
//! use dcxml::contract::{ContractBuilder, ContractRegistry};
//!
//! let registry = ContractRegistry::new();
//! let address = registry.register(
//!     ContractBuilder::class("Address", "http://schemas.datacontract.org/2004/07/Test")
//!         .member("Street", registry.string())
//!         .member("Zip", registry.string()),
//! )?;
//! let person = registry.register(
//!     ContractBuilder::class("Person", "http://schemas.datacontract.org/2004/07/Test")
//!         .member("Name", registry.string())
//!         .member("Home", address),
//! )?;
//! assert_eq!(registry.contract_of(person)?.members.len(), 2);
//! # Ok::<(), dcxml::Error>(())
//! ```

mod builder;
mod descriptor;
mod primitives;
mod registry;
mod resolver;

pub use builder::ContractBuilder;
pub use descriptor::{
    CollectionShape, ContractKind, DataContract, DataMember, MemberFlags, QName, TypeHandle,
};
pub use primitives::{XsdPrimitive, ALL_PRIMITIVES};
pub use registry::ContractRegistry;
pub use resolver::{ContractResolver, KnownTypeSet};
