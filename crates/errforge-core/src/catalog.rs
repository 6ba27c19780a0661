//! Error type catalogs loaded from JSON.
//!
//! A catalog is an ordered JSON array of type definitions:
//!
//! ```json
//! [
//!   { "name": "AppError" },
//!   { "name": "NetworkError", "parent": "AppError", "default": ["%s unreachable", "host"] },
//!   { "name": "TimeoutError", "parent": "NetworkError", "glue": "after" }
//! ]
//! ```
//!
//! A definition without `parent`, or whose parent is the root's name, extends
//! the catalog root. Any other parent must be defined earlier in the array.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::FormatArg;
use crate::variant::ErrorType;

/// Errors that can occur while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("error type \"{name}\" extends unknown parent \"{parent}\"")]
    UnknownParent { name: String, parent: String },

    #[error("error type \"{name}\" is defined more than once")]
    Duplicate { name: String },

    #[error("error type names must not be empty")]
    EmptyName,
}

/// One entry of a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Default message arguments, formatted like constructor arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glue: Option<String>,
}

/// A named set of error types sharing one root.
pub struct Catalog {
    root: ErrorType,
    types: Vec<ErrorType>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// An empty catalog on `root`.
    pub fn new(root: ErrorType) -> Self {
        Self {
            root,
            types: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Build a catalog on [`ErrorType::root`] from a JSON array.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(ErrorType::root());
        catalog.load_json(json)?;
        Ok(catalog)
    }

    /// Build a catalog on [`ErrorType::root`] from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Add every definition in a JSON array; returns how many were added.
    ///
    /// Stops at the first invalid definition, keeping those before it.
    pub fn load_json(&mut self, json: &str) -> Result<usize, CatalogError> {
        let defs: Vec<TypeDefinition> = serde_json::from_str(json)?;
        let count = defs.len();
        for def in defs {
            self.define(def)?;
        }
        Ok(count)
    }

    /// Add a single definition.
    pub fn define(&mut self, def: TypeDefinition) -> Result<ErrorType, CatalogError> {
        if def.name.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if self.by_name.contains_key(&def.name) || def.name == self.root.name() {
            return Err(CatalogError::Duplicate { name: def.name });
        }

        let parent = match def.parent.as_deref() {
            None => self.root.clone(),
            Some(p) if p == self.root.name() => self.root.clone(),
            Some(p) => self
                .get(p)
                .ok_or_else(|| CatalogError::UnknownParent {
                    name: def.name.clone(),
                    parent: p.to_string(),
                })?,
        };

        let mut builder = parent
            .extend(def.name.clone())
            .default_message(def.default.into_iter().map(FormatArg::from));
        if let Some(glue) = def.glue {
            builder = builder.glue(glue);
        }
        let ty = builder.build();

        self.by_name.insert(def.name, self.types.len());
        self.types.push(ty.clone());
        Ok(ty)
    }

    pub fn root(&self) -> &ErrorType {
        &self.root
    }

    pub fn get(&self, name: &str) -> Option<ErrorType> {
        self.by_name.get(name).map(|&i| self.types[i].clone())
    }

    /// Types in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &ErrorType> {
        self.types.iter()
    }

    /// Direct children of `parent`, in definition order.
    pub fn children_of<'a>(&'a self, parent: &'a ErrorType) -> impl Iterator<Item = &'a ErrorType> {
        self.types
            .iter()
            .filter(move |ty| ty.parent() == Some(parent))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
