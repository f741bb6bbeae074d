// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dcxml
//!
//! A data-contract XML serialization engine in pure Rust: object graphs in,
//! canonical contract-shaped XML out, and tolerant reading back. The wire
//! format is the `DataContractSerializer` dialect - `i:nil`/`i:type`
//! annotations, `z:Id`/`z:Ref` object references, `ArrayOf*` collection
//! wrappers and the fixed XSD primitive vocabulary.
//!
//! ## Features
//!
//! - **Runtime contract model** - types are described by registered
//!   descriptors (wire name, ordered members, collection shape), not by
//!   compile-time derivation
//! - **Shared instances and cycles** - graphs are index-based arenas, and
//!   reference tracking round-trips aliasing through `z:Id`/`z:Ref`
//! - **Polymorphism** - `i:type` dispatch through a caller resolver,
//!   known-type sets and the registry
//! - **Tolerant reading** - unknown members are skipped or captured as
//!   extension data, member matching ignores namespaces
//! - **Bounded input handling** - depth, string and array quotas are
//!   enforced during parsing, before any graph allocation
//!
//! ## Quick Start
//!
//! Add `dcxml` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! dcxml = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use std::sync::Arc;
//! use dcxml::prelude::*;
//!
//! let registry = Arc::new(ContractRegistry::new());
//! let person = registry.register(
//!     ContractBuilder::class("Person", "http://schemas.datacontract.org/2004/07/Demo")
//!         .member("Name", registry.string())
//!         .member("Age", registry.int()),
//! )?;
//!
//! let mut graph = Graph::new();
//! let root = graph.add_object(
//!     person,
//!     vec![("Name", Value::string("Ada")), ("Age", Value::int(36))],
//! );
//!
//! let serializer = Serializer::new(registry);
//! let xml = serializer.write_to_string(&graph, &Value::Ref(root), person)?;
//! let (decoded, value) = serializer.read(xml.as_bytes(), person)?;
//! assert_eq!(
//!     decoded.node(value.as_node().unwrap()).member("Age"),
//!     Some(&Value::int(36))
//! );
//! # Ok::<(), dcxml::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `dcxml` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`contract`] - Runtime contract descriptors, builder, registry and
//!   polymorphic resolution hooks
//! - [`graph`] - The arena-based object graph and primitive value codecs
//! - [`wire`] - XML emission and quota-bounded parsing
//! - [`serializer`] - The write/read pipelines behind [`Serializer`]
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! ## Thread Safety
//!
//! The registry is lock-free and append-only; contracts are immutable once
//! registered. A [`Serializer`] holds no per-call state and may be shared
//! freely across threads.

#[macro_use]
mod error;

pub mod contract;
pub mod graph;
pub mod prelude;
pub mod serializer;
pub mod wire;

pub use error::{Error, Result};
pub use serializer::{Serializer, SerializerConfig};
