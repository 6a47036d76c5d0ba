//! Errors reported by the registry and the checked box accessors.

use thiserror::Error;

/// Error type of polybox.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoxingError {
    /// A function was registered twice for the same mapped type.
    #[error("function `{function}` is already registered for type `{mapped}`")]
    DuplicateRegistration {
        /// Name of the function.
        function: &'static str,
        /// Name of the mapped type.
        mapped: &'static str,
    },

    /// A default implementation was registered twice.
    #[error("a default implementation of function `{function}` is already registered")]
    DuplicateDefault {
        /// Name of the function.
        function: &'static str,
    },

    /// Neither the type nor the defaults provide an implementation.
    #[error("function `{function}` is not implemented for type `{mapped}`")]
    NotImplemented {
        /// Name of the function.
        function: &'static str,
        /// Name of the mapped type.
        mapped: &'static str,
    },

    /// A box was unboxed as a type it is not mapped to.
    #[error("cannot unbox `{actual}` as `{requested}`")]
    TypeMismatch {
        /// Mapped type of the requested type.
        requested: &'static str,
        /// Mapped type of the box.
        actual: &'static str,
    },

    /// An array accessor was used on a box that does not hold an array.
    #[error("type `{actual}` is not an array type")]
    NotAnArray {
        /// Mapped type of the box.
        actual: &'static str,
    },

    /// An element index was past the end of a boxed array.
    #[error("index {index} is out of bounds for boxed array of length {length}")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// Length of the boxed array.
        length: usize,
    },

    /// The global registry was already installed, or bootstrapped by an earlier use.
    #[error("the global registry is already installed")]
    AlreadyInstalled,
}
