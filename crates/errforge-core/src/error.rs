//! Errors raised by the factory itself.

use thiserror::Error;

/// Programmer-misuse errors surfaced by type construction and registration.
///
/// Every other edge case (empty cause messages, missing format arguments)
/// degrades to a defined fallback instead of raising.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    /// A root error type was instantiated directly.
    #[error("new called on {name}, create a custom error type instead")]
    IllegalConstruction { name: String },

    /// A global binding already exists under the requested name.
    #[error("can not create global error type \"{name}\"; there is already such global")]
    NameCollision { name: String },

    /// A global binding was requested under the empty name.
    #[error("error type names must not be empty")]
    EmptyName,
}
