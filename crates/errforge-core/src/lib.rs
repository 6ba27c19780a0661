//! errforge-core — named, hierarchical error types built at runtime.
//!
//! This crate defines:
//! - [`ErrorType`] — a handle to an error kind; `create` derives child kinds
//! - [`CustomError`] — one instance of a kind, with message and cause chain
//! - [`MessageFormatter`] / [`PrintfFormatter`] — how arguments become messages
//! - [`GlobalRegistry`] — name → kind bindings with collision detection
//! - [`Catalog`] — kinds declared in JSON
//!
//! # Quick Start
//!
//! ```
//! use errforge_core::ErrorType;
//!
//! let network = ErrorType::root().create_with("NetworkError", ["connection failed"]);
//! let timeout = network.create("TimeoutError");
//!
//! let err = timeout
//!     .construct(["request to %s timed out", "api.example.com"])
//!     .unwrap()
//!     .caused_by("socket closed");
//!
//! assert_eq!(
//!     err.to_string(),
//!     "TimeoutError: request to api.example.com timed out << socket closed"
//! );
//! assert!(err.is(&network));
//! ```

#[macro_use]
pub mod format;

pub mod catalog;
pub mod config;
pub mod error;
pub mod global;
pub mod instance;
pub mod variant;

pub use catalog::{Catalog, CatalogError, TypeDefinition};
pub use config::FactoryConfig;
pub use error::FactoryError;
pub use format::{format_message, FormatArg, MessageFormatter, PrintfFormatter};
pub use global::{register_global, Binding, GlobalRegistry};
pub use instance::{Cause, CustomError, ErrorCause, Message};
pub use variant::{ErrorType, VariantBuilder, VariantDescriptor};
