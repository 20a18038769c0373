//! Error kinds: the type-level tag an expectation matches against.
//!
//! Every `E: Error + Send + Sync + 'static` is a kind and is matched by
//! downcasting the raised error. [`Raised`] is the "any error" kind: it
//! matches whatever was raised.

use std::error::Error;

use crate::raised::{short_type_name, Raised};

pub trait ErrorKind: Sized + 'static {
    /// Name used in failure reports.
    fn kind_name() -> String;

    /// Fully qualified name, used when two short names collide.
    fn full_kind_name() -> String {
        Self::kind_name()
    }

    /// Phrase describing what was expected, e.g. "an error of kind `FormatError`".
    fn expectation() -> String {
        format!("an error of kind `{}`", Self::kind_name())
    }

    /// Converts the raised error into this kind, or returns it untouched.
    fn extract(raised: Raised) -> Result<Self, Raised>;

    /// Message compared against an expected message.
    fn message(&self) -> Option<String>;
}

impl<E> ErrorKind for E
where
    E: Error + Send + Sync + 'static,
{
    fn kind_name() -> String {
        short_type_name(std::any::type_name::<E>())
    }

    fn full_kind_name() -> String {
        std::any::type_name::<E>().to_string()
    }

    fn extract(raised: Raised) -> Result<Self, Raised> {
        raised.downcast::<E>()
    }

    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ErrorKind for Raised {
    fn kind_name() -> String {
        "any error".to_string()
    }

    fn expectation() -> String {
        "an error".to_string()
    }

    fn extract(raised: Raised) -> Result<Self, Raised> {
        Ok(raised)
    }

    fn message(&self) -> Option<String> {
        Raised::message(self)
    }
}
