use thiserror::Error;

use crate::contract::TypeHandle;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all failure modes of contract registration, graph serialization and
/// deserialization. Every variant is terminal for the `write`/`read` call that raised it;
/// nothing is retried internally.
///
/// # Error Categories
///
/// ## Wire Format Errors
/// - [`Error::Malformed`] - Input XML cannot be parsed or violates the wire protocol
/// - [`Error::QuotaExceeded`] - A reader quota or the graph-size quota was hit
///
/// ## Contract Model Errors
/// - [`Error::InvalidContract`] - A type classified `Invalid` was asked to carry data
/// - [`Error::ContractViolation`] - A graph node does not match the shape of its contract
/// - [`Error::DuplicateContract`] - Two contracts claim the same wire name
/// - [`Error::DuplicateMember`] - A contract declares the same member twice
/// - [`Error::UnknownHandle`] - A type handle does not exist in the registry
/// - [`Error::EnumValueUnnamed`] - An enum value has bits with no named member
///
/// ## Resolution Errors
/// - [`Error::TypeNotResolvable`] - No resolver, known type or fallback produced a type
/// - [`Error::RequiredMemberMissing`] - A required member was absent from the input
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - Sink/source I/O errors
/// - [`Error::Xml`] - Low-level XML errors from the quick-xml crate
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be parsed.
    ///
    /// This covers unparseable XML (including an empty stream), wire-protocol
    /// violations such as `i:nil="true"` combined with children, a `z:Ref`
    /// pointing at an id that was never defined, and unparseable primitive
    /// text. The error includes the source location where the malformation
    /// was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A configured hard limit was exceeded.
    ///
    /// Raised when the graph-size quota (`max_items_in_graph`) or one of the
    /// reader quotas (maximum nesting depth, maximum string length, maximum
    /// array length) is hit. Reader quotas trigger during parsing, before any
    /// graph node is allocated. This is a terminal error for the call, not a
    /// retryable condition.
    #[error("Quota '{quota}' exceeded - limit is {limit}")]
    QuotaExceeded {
        /// Which quota was exceeded
        quota: &'static str,
        /// The configured limit that was hit
        limit: u64,
    },

    /// A type classified as `Invalid` was asked to serialize or deserialize a
    /// non-empty instance.
    ///
    /// Registering an `Invalid` contract is not an error by itself; an empty
    /// collection of such a type is explicitly tolerated and succeeds.
    #[error("Contract for '{type_name}' is invalid and cannot carry a non-empty instance")]
    InvalidContract {
        /// Wire name of the offending contract
        type_name: String,
    },

    /// No resolver, known type or contract-derived fallback produced a runtime
    /// type for an encountered wire type name.
    #[error("No runtime type resolvable for wire name '{name}' in namespace '{namespace}'")]
    TypeNotResolvable {
        /// The wire type name that could not be resolved
        name: String,
        /// The wire namespace of the unresolvable name
        namespace: String,
    },

    /// A member marked `IS_REQUIRED` was missing from the input document.
    #[error("Required member '{member}' of '{type_name}' missing from input")]
    RequiredMemberMissing {
        /// Name of the missing member
        member: String,
        /// Wire name of the contract declaring the member
        type_name: String,
    },

    /// A contract with the same wire name and namespace is already registered.
    #[error("A contract named '{name}' in namespace '{namespace}' is already registered")]
    DuplicateContract {
        /// Wire name of the conflicting contract
        name: String,
        /// Wire namespace of the conflicting contract
        namespace: String,
    },

    /// A contract declares two members with the same wire name.
    #[error("Contract declares duplicate member '{member}'")]
    DuplicateMember {
        /// The duplicated member name
        member: String,
    },

    /// The given type handle does not exist in the contract registry.
    #[error("Unknown type handle - {0}")]
    UnknownHandle(TypeHandle),

    /// An enum value carries bits for which the contract declares no member name.
    ///
    /// Enums travel as member names on the wire, so a value that cannot be
    /// expressed as (a space-separated combination of) named members has no
    /// wire representation.
    #[error("Enum value {value} of '{type_name}' has no named wire representation")]
    EnumValueUnnamed {
        /// The numeric value that could not be named
        value: i64,
        /// Wire name of the enum contract
        type_name: String,
    },

    /// A graph node does not match the shape its contract prescribes.
    ///
    /// For example a node whose contract is a dictionary but whose body holds
    /// class members, or a `Value::Enum` pointing at a class contract.
    #[error("{0}")]
    ContractViolation(String),

    /// Sink or source I/O error.
    ///
    /// Wraps standard I/O errors that can occur while writing the XML output
    /// stream or reading the input.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error from the quick-xml crate during low-level XML processing.
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    /// Attribute-level error from the quick-xml crate.
    #[error("{0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),
}

/// Result type alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;
