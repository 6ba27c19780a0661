//! Error instances and cause chaining.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt;

use crate::variant::ErrorType;

// ─── Cause ────────────────────────────────────────────────────────────────────

/// Anything that can be recorded as the cause of a [`CustomError`].
///
/// The only requirement is an optional message. Implementations that are also
/// Rust errors expose themselves through [`Cause::as_error`] so that
/// `Error::source` keeps working across the chain.
pub trait Cause: fmt::Debug + Send + Sync + 'static {
    fn message(&self) -> Option<&str>;

    fn as_error(&self) -> Option<&(dyn StdError + 'static)> {
        None
    }

    /// The next link when the cause carries a cause of its own.
    fn next_cause(&self) -> Option<&dyn Cause> {
        None
    }

    /// Detach the next link. Lets long chains be dropped one link at a time.
    fn take_cause(&mut self) -> Option<Box<dyn Cause>> {
        None
    }
}

/// A free-standing cause that is nothing but an optional message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message(Option<String>);

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self(Some(message.into()))
    }

    /// A cause without any message.
    pub fn none() -> Self {
        Self(None)
    }
}

impl Cause for Message {
    fn message(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl Cause for &'static str {
    fn message(&self) -> Option<&str> {
        Some(*self)
    }
}

impl Cause for String {
    fn message(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

/// Adapter recording any Rust error as a cause; its message is its `Display`.
#[derive(Debug)]
pub struct ErrorCause {
    message: String,
    source: Box<dyn StdError + Send + Sync>,
}

impl ErrorCause {
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            source: Box::new(err),
        }
    }
}

impl Cause for ErrorCause {
    fn message(&self) -> Option<&str> {
        Some(self.message.as_str())
    }

    fn as_error(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.source)
    }
}

// ─── CustomError ──────────────────────────────────────────────────────────────

/// One occurrence of an [`ErrorType`].
///
/// Created by [`ErrorType::construct`]. Only the message (appended to by
/// [`caused_by`](Self::caused_by)) and the cause change after construction.
pub struct CustomError {
    kind: ErrorType,
    message: String,
    cause: Option<Box<dyn Cause>>,
    backtrace: Backtrace,
}

impl CustomError {
    pub(crate) fn new(kind: ErrorType, message: String) -> Self {
        Self {
            kind,
            message,
            cause: None,
            backtrace: Backtrace::capture(),
        }
    }

    pub fn kind(&self) -> &ErrorType {
        &self.kind
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&dyn Cause> {
        self.cause.as_deref()
    }

    /// Backtrace captured at construction; empty unless `RUST_BACKTRACE` or
    /// `RUST_LIB_BACKTRACE` enables capture.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// `true` if this error's type is `ty` or descends from it.
    pub fn is(&self, ty: &ErrorType) -> bool {
        self.kind.is_a(ty)
    }

    /// Record `cause` and append its message, returning `self` for chaining.
    ///
    /// A non-empty cause message becomes the whole message when this error has
    /// none, otherwise it is appended after the type's glue token. An empty or
    /// absent cause message leaves the message untouched. The cause is always
    /// replaced.
    pub fn caused_by(mut self, cause: impl Cause) -> Self {
        self.attach_cause(cause);
        self
    }

    /// [`caused_by`](Self::caused_by) for any Rust error.
    pub fn caused_by_error<E>(self, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.caused_by(ErrorCause::new(err))
    }

    /// In-place form of [`caused_by`](Self::caused_by).
    pub fn attach_cause(&mut self, cause: impl Cause) -> &mut Self {
        match cause.message() {
            Some(cause_message) if !cause_message.is_empty() => {
                if self.message.is_empty() {
                    self.message = cause_message.to_string();
                } else {
                    self.message = format!(
                        "{} {} {}",
                        self.message,
                        self.kind.glue(),
                        cause_message
                    );
                }
            }
            _ => {}
        }
        tracing::trace!(name = %self.kind, cause = ?cause, "attached cause");
        self.cause = Some(Box::new(cause));
        self
    }

    /// Walk the cause chain, nearest cause first.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: self.cause() }
    }

    /// The last link of the cause chain.
    pub fn root_cause(&self) -> Option<&dyn Cause> {
        self.chain().last()
    }

    /// Debug rendering: the type name on the first line, then the captured
    /// backtrace if there is one.
    pub fn inspect(&self) -> String {
        let mut out = self.kind.name().to_string();
        if self.backtrace.status() == BacktraceStatus::Captured {
            out.push('\n');
            out.push_str(&self.backtrace.to_string());
        }
        out
    }
}

impl fmt::Display for CustomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(self.kind.name())
        } else {
            write!(f, "{}: {}", self.kind.name(), self.message)
        }
    }
}

impl fmt::Debug for CustomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomError")
            .field("name", &self.kind.name())
            .field("message", &self.message)
            .field("cause", &self.cause)
            .finish_non_exhaustive()
    }
}

impl StdError for CustomError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().and_then(Cause::as_error)
    }
}

impl Cause for CustomError {
    fn message(&self) -> Option<&str> {
        Some(self.message.as_str())
    }

    fn as_error(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self)
    }

    fn next_cause(&self) -> Option<&dyn Cause> {
        self.cause()
    }

    fn take_cause(&mut self) -> Option<Box<dyn Cause>> {
        self.cause.take()
    }
}

impl Drop for CustomError {
    fn drop(&mut self) {
        let mut next = self.cause.take();
        while let Some(mut link) = next {
            next = link.take_cause();
        }
    }
}

/// Iterator returned by [`CustomError::chain`].
pub struct Chain<'a> {
    next: Option<&'a dyn Cause>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a dyn Cause;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next_cause();
        Some(current)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn my_error() -> ErrorType {
        ErrorType::root().create("MyCustomError")
    }

    #[test]
    fn cause_message_replaces_empty_message() {
        let err = my_error().construct_default().unwrap().caused_by("culprit");
        assert_eq!(err.message(), "culprit");
    }

    #[test]
    fn cause_message_is_appended_with_glue() {
        let err = my_error().construct(["oops!"]).unwrap().caused_by("culprit");
        assert_eq!(err.message(), "oops! << culprit");
    }

    #[test]
    fn empty_cause_keeps_message() {
        let err = my_error().construct_default().unwrap().caused_by(Message::none());
        assert_eq!(err.message(), "");
        assert_eq!(err.cause().and_then(Cause::message), None);

        let err = my_error().construct(["oops"]).unwrap().caused_by(Message::new(""));
        assert_eq!(err.message(), "oops");
        assert_eq!(err.cause().and_then(Cause::message), Some(""));
    }

    #[test]
    fn repeated_causes_append_in_order_and_replace_cause() {
        let mut err = my_error().construct(["top"]).unwrap();
        err.attach_cause("first").attach_cause(Message::none()).attach_cause("second");
        assert_eq!(err.message(), "top << first << second");
        assert_eq!(err.cause().and_then(Cause::message), Some("second"));
    }

    #[test]
    fn custom_glue() {
        let ty = ErrorType::root().extend("Glued").glue("caused by").build();
        let err = ty.construct(["outer"]).unwrap().caused_by("inner");
        assert_eq!(err.message(), "outer caused by inner");
    }

    #[test]
    fn rust_errors_are_sources() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "config.toml missing");
        let err = my_error().construct(["load failed"]).unwrap().caused_by_error(io_err);

        assert_eq!(err.message(), "load failed << config.toml missing");
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "config.toml missing");
    }

    #[test]
    fn chain_walks_nested_custom_errors() {
        let db = ErrorType::root().create_with("DbError", ["connection reset"]);
        let repo = ErrorType::root().create("RepoError");
        let api = ErrorType::root().create("ApiError");

        let inner = db.construct_default().unwrap();
        let middle = repo.construct(["query failed"]).unwrap().caused_by(inner);
        let outer = api.construct(["request failed"]).unwrap().caused_by(middle);

        assert_eq!(
            outer.message(),
            "request failed << query failed << connection reset"
        );
        let messages: Vec<_> = outer.chain().filter_map(Cause::message).collect();
        assert_eq!(messages, ["query failed << connection reset", "connection reset"]);
        assert_eq!(outer.root_cause().and_then(Cause::message), Some("connection reset"));

        let source = outer.source().expect("source");
        assert_eq!(
            source.to_string(),
            "RepoError: query failed << connection reset"
        );
        assert!(source.source().is_some());
    }

    #[test]
    fn deep_chains_drop_without_recursion() {
        let ty = ErrorType::root().create("Link");
        let mut err = ty.construct_default().unwrap();
        for _ in 0..20_000 {
            err = ty.construct_default().unwrap().caused_by(err);
        }
        assert_eq!(err.chain().count(), 20_000);
        drop(err);
    }

    #[test]
    fn display() {
        let parent = ErrorType::root().create_with("ParentError", ["parent default"]);
        let child = parent.create_with("ChildError", ["child default"]);
        let bare = ErrorType::root().create("BareError");

        assert_eq!(parent.construct_default().unwrap().to_string(), "ParentError: parent default");
        assert_eq!(parent.construct(["parent custom"]).unwrap().to_string(), "ParentError: parent custom");
        assert_eq!(child.construct_default().unwrap().to_string(), "ChildError: child default");
        assert_eq!(child.construct(["child custom"]).unwrap().to_string(), "ChildError: child custom");
        assert_eq!(bare.construct_default().unwrap().to_string(), "BareError");
    }

    #[test]
    fn inspect_starts_with_name() {
        let err = my_error().construct(["oops"]).unwrap();
        let text = err.inspect();
        assert_eq!(text.lines().next(), Some("MyCustomError"));
    }

    #[test]
    fn instances_answer_is_queries() {
        let parent = ErrorType::root().create("P");
        let child = parent.create("C");
        let err = child.construct_default().unwrap();

        assert!(err.is(&child));
        assert!(err.is(&parent));
        assert!(err.is(&ErrorType::root()));
        assert!(!err.is(&ErrorType::root().create("C")));
    }
}
