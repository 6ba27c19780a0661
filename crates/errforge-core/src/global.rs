//! Name-keyed registration of error types.
//!
//! A [`GlobalRegistry`] binds names to error types created from its root.
//! Reserved names from [`FactoryConfig::reserved_names`] start out bound, so
//! they can never be taken. The process-wide instance behind
//! [`register_global`] and [`lookup`] is created on first use.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::config::FactoryConfig;
use crate::error::FactoryError;
use crate::format::FormatArg;
use crate::variant::ErrorType;

/// What a registry name is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A reserved name with no error type behind it.
    BuiltIn,
    ErrorType(ErrorType),
}

/// Thread-safe name → error type registry.
pub struct GlobalRegistry {
    root: ErrorType,
    bindings: RwLock<HashMap<String, Binding>>,
}

impl GlobalRegistry {
    /// Registry on the default root with the default reserved names.
    pub fn new() -> Self {
        Self::with_root(ErrorType::root(), FactoryConfig::default().reserved_names)
    }

    /// Registry on a fresh root built from `config`.
    pub fn with_config(config: &FactoryConfig) -> Self {
        Self::with_root(ErrorType::root_with(config), config.reserved_names.clone())
    }

    pub fn with_root<I>(root: ErrorType, reserved: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let bindings = reserved
            .into_iter()
            .map(|name| (name.into(), Binding::BuiltIn))
            .collect();
        Self {
            root,
            bindings: RwLock::new(bindings),
        }
    }

    pub fn root(&self) -> &ErrorType {
        &self.root
    }

    /// Create a type named `name` from the root and bind it under `name`.
    ///
    /// Fails with [`FactoryError::NameCollision`] if anything is already bound
    /// there; the existing binding is left as it was. An empty `name` fails
    /// with [`FactoryError::EmptyName`].
    pub fn register<I>(&self, name: &str, default_args: I) -> Result<ErrorType, FactoryError>
    where
        I: IntoIterator,
        I::Item: Into<FormatArg>,
    {
        if name.is_empty() {
            tracing::warn!("refusing to register an error type without a name");
            return Err(FactoryError::EmptyName);
        }
        let mut bindings = self
            .bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if bindings.contains_key(name) {
            tracing::warn!(name, "global error type name already bound");
            return Err(FactoryError::NameCollision {
                name: name.to_string(),
            });
        }
        let ty = self.root.create_with(name, default_args);
        bindings.insert(name.to_string(), Binding::ErrorType(ty.clone()));
        tracing::debug!(name, "registered global error type");
        Ok(ty)
    }

    /// The error type bound under `name`; `None` for reserved or unbound names.
    pub fn get(&self, name: &str) -> Option<ErrorType> {
        match self.binding(name)? {
            Binding::ErrorType(ty) => Some(ty),
            Binding::BuiltIn => None,
        }
    }

    pub fn binding(&self, name: &str) -> Option<Binding> {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// `true` if anything, reserved or registered, is bound under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Number of bindings, reserved names included.
    pub fn len(&self) -> usize {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GlobalRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Process-wide registry ────────────────────────────────────────────────────

/// The process-wide registry, built on [`ErrorType::root`].
pub fn global_registry() -> &'static GlobalRegistry {
    static GLOBAL: OnceLock<GlobalRegistry> = OnceLock::new();
    GLOBAL.get_or_init(GlobalRegistry::new)
}

/// Register `name` in the process-wide registry.
pub fn register_global<I>(name: &str, default_args: I) -> Result<ErrorType, FactoryError>
where
    I: IntoIterator,
    I::Item: Into<FormatArg>,
{
    global_registry().register(name, default_args)
}

/// Look up `name` in the process-wide registry.
pub fn lookup(name: &str) -> Option<ErrorType> {
    global_registry().get(name)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
