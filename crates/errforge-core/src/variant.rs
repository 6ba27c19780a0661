//! Error type descriptors and the `create` operation.
//!
//! An [`ErrorType`] is a cheap, clonable handle to an immutable
//! [`VariantDescriptor`]. Every descriptor except a root points at the type it
//! was created from, so the set of types forms a tree. Inherited fields
//! (default message, glue, formatter) are resolved once when a type is built.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::config::FactoryConfig;
use crate::error::FactoryError;
use crate::format::{FormatArg, MessageFormatter, PrintfFormatter};
use crate::instance::CustomError;

/// The data behind one named error kind.
pub struct VariantDescriptor {
    name: String,
    default_message: String,
    glue: String,
    formatter: Arc<dyn MessageFormatter>,
    parent: Option<ErrorType>,
}

impl fmt::Debug for VariantDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantDescriptor")
            .field("name", &self.name)
            .field("default_message", &self.default_message)
            .field("glue", &self.glue)
            .field("parent", &self.parent.as_ref().map(ErrorType::name))
            .finish_non_exhaustive()
    }
}

impl Drop for VariantDescriptor {
    fn drop(&mut self) {
        // Unlink uniquely owned ancestors one at a time.
        let mut next = self.parent.take();
        while let Some(ErrorType(parent)) = next {
            next = match Arc::try_unwrap(parent) {
                Ok(mut descriptor) => descriptor.parent.take(),
                Err(_) => None,
            };
        }
    }
}

/// Handle to an error type. Equality is identity, not name equality.
#[derive(Clone)]
pub struct ErrorType(Arc<VariantDescriptor>);

impl ErrorType {
    /// The process-wide default root, named `CustomError`.
    pub fn root() -> Self {
        static ROOT: OnceLock<ErrorType> = OnceLock::new();
        ROOT.get_or_init(|| Self::root_with(&FactoryConfig::default()))
            .clone()
    }

    /// A fresh root built from `config`, unrelated to every other root.
    pub fn root_with(config: &FactoryConfig) -> Self {
        Self(Arc::new(VariantDescriptor {
            name: config.root_name.clone(),
            default_message: String::new(),
            glue: config.glue.clone(),
            formatter: Arc::new(PrintfFormatter),
            parent: None,
        }))
    }

    /// Create a child type that inherits this type's default message.
    ///
    /// `name` must not be empty; this is only asserted in debug builds.
    /// [`GlobalRegistry::register`](crate::GlobalRegistry::register) and
    /// [`Catalog::define`](crate::Catalog::define) reject empty names outright.
    pub fn create(&self, name: impl Into<String>) -> ErrorType {
        self.extend(name).build()
    }

    /// Create a child type whose default message is `default_args` formatted.
    ///
    /// An empty `default_args` inherits the parent's default message.
    pub fn create_with<I>(&self, name: impl Into<String>, default_args: I) -> ErrorType
    where
        I: IntoIterator,
        I::Item: Into<FormatArg>,
    {
        self.extend(name).default_message(default_args).build()
    }

    /// Start building a child type with individual overrides.
    pub fn extend(&self, name: impl Into<String>) -> VariantBuilder<'_> {
        VariantBuilder {
            parent: self,
            name: name.into(),
            default_args: Vec::new(),
            glue: None,
            formatter: None,
        }
    }

    /// Instantiate an error of this type.
    ///
    /// With no arguments the message is the type's default message verbatim;
    /// otherwise it is the arguments run through the type's formatter.
    /// Fails with [`FactoryError::IllegalConstruction`] on a root.
    pub fn construct<I>(&self, args: I) -> Result<CustomError, FactoryError>
    where
        I: IntoIterator,
        I::Item: Into<FormatArg>,
    {
        if self.is_root() {
            return Err(FactoryError::IllegalConstruction {
                name: self.0.name.clone(),
            });
        }
        let args: Vec<FormatArg> = args.into_iter().map(Into::into).collect();
        let message = if args.is_empty() {
            self.0.default_message.clone()
        } else {
            self.0.formatter.format(&args)
        };
        Ok(CustomError::new(self.clone(), message))
    }

    /// Instantiate with the default message.
    pub fn construct_default(&self) -> Result<CustomError, FactoryError> {
        self.construct(Vec::<FormatArg>::new())
    }

    /// Run `args` through this type's formatter without instantiating.
    pub fn format_message(&self, args: &[FormatArg]) -> String {
        self.0.formatter.format(args)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn default_message(&self) -> &str {
        &self.0.default_message
    }

    pub fn glue(&self) -> &str {
        &self.0.glue
    }

    pub fn parent(&self) -> Option<&ErrorType> {
        self.0.parent.as_ref()
    }

    /// `true` for a type with no parent; roots can only be extended.
    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    /// Number of `parent` hops to the root.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// This type followed by each ancestor, ending at the root.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// `true` if `other` is this type or one of its ancestors.
    pub fn is_a(&self, other: &ErrorType) -> bool {
        self.ancestors().any(|ty| ty == other)
    }

    /// The root this type ultimately descends from.
    pub fn root_of(&self) -> &ErrorType {
        self.ancestors().last().unwrap_or(self)
    }
}

impl PartialEq for ErrorType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ErrorType {}

impl fmt::Debug for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorType").field(&self.0).finish()
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// Iterator returned by [`ErrorType::ancestors`].
pub struct Ancestors<'a> {
    next: Option<&'a ErrorType>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ErrorType;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

// ─── Builder ──────────────────────────────────────────────────────────────────

/// Builder returned by [`ErrorType::extend`].
#[must_use = "call `build` to obtain the new error type"]
pub struct VariantBuilder<'a> {
    parent: &'a ErrorType,
    name: String,
    default_args: Vec<FormatArg>,
    glue: Option<String>,
    formatter: Option<Arc<dyn MessageFormatter>>,
}

impl<'a> VariantBuilder<'a> {
    /// Arguments formatted into the new type's default message.
    pub fn default_message<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<FormatArg>,
    {
        self.default_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Separator used by `caused_by` for this type and its descendants.
    pub fn glue(mut self, glue: impl Into<String>) -> Self {
        self.glue = Some(glue.into());
        self
    }

    /// Replace the formatter for this type and its descendants.
    ///
    /// The override also formats this type's own default message.
    pub fn formatter(mut self, formatter: impl MessageFormatter + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn build(self) -> ErrorType {
        let parent = self.parent;
        debug_assert!(!self.name.is_empty(), "error type name must not be empty");

        let formatter = self
            .formatter
            .unwrap_or_else(|| Arc::clone(&parent.0.formatter));
        let default_message = if self.default_args.is_empty() {
            parent.0.default_message.clone()
        } else {
            formatter.format(&self.default_args)
        };
        let glue = self.glue.unwrap_or_else(|| parent.0.glue.clone());

        tracing::debug!(
            name = %self.name,
            parent = %parent.name(),
            default_message = %default_message,
            "created error type"
        );

        ErrorType(Arc::new(VariantDescriptor {
            name: self.name,
            default_message,
            glue,
            formatter,
            parent: Some(parent.clone()),
        }))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
