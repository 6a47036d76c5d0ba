//! Functions that can be invoked on boxes.
//!
//! A function is a zero-sized type implementing [`Function`]. Its [`Signature`](Function::Signature)
//! is the function pointer type of its implementations, which take the receiving box as the first
//! argument. Implementations are registered per mapped type in a
//! [`RegistryBuilder`](crate::RegistryBuilder), together with an optional default used for types
//! without their own implementation.
//!
//! ```
//! use polybox::{Boxed, Function, RegistryBuilder};
//!
//! struct Describe;
//!
//! impl Function for Describe {
//!     type Signature = fn(&Boxed<'_>) -> String;
//!     const NAME: &'static str = "Describe";
//! }
//!
//! fn describe_integer(boxed: &Boxed<'_>) -> String {
//!     format!("the integer {}", boxed.unbox::<i64>())
//! }
//!
//! let mut builder = RegistryBuilder::new();
//! builder.register::<Describe, i64>(describe_integer).unwrap();
//! let registry = builder.build();
//!
//! let boxed = Boxed::new(7i64);
//! let text = registry.call::<Describe, String>(&boxed, |describe| describe(&boxed));
//! assert_eq!(text, "the integer 7");
//! ```

use std::fmt;

use crate::boxed::Boxed;

/// A function that can be registered for and invoked on boxes.
pub trait Function: 'static {
    /// The function pointer type of the implementations.
    type Signature: Copy + Send + Sync + 'static;

    /// The name used in diagnostics.
    const NAME: &'static str;
}

/// Where to look for the implementation of a function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reach {
    /// Only the implementation registered for the mapped type of the box.
    Local,
    /// The implementation of the mapped type, falling back to the default implementation.
    Global,
}

/// Compares two boxes for equality.
#[derive(Clone, Copy, Debug)]
pub struct Equals;

impl Function for Equals {
    type Signature = fn(&Boxed<'_>, &Boxed<'_>) -> bool;
    const NAME: &'static str = "Equals";
}

/// Tests whether the receiving box orders before the other box.
#[derive(Clone, Copy, Debug)]
pub struct IsLess;

impl Function for IsLess {
    type Signature = fn(&Boxed<'_>, &Boxed<'_>) -> bool;
    const NAME: &'static str = "IsLess";
}

/// Computes a hash code of the boxed value.
#[derive(Clone, Copy, Debug)]
pub struct Hashcode;

impl Function for Hashcode {
    type Signature = fn(&Boxed<'_>) -> u64;
    const NAME: &'static str = "Hashcode";
}

/// Interprets the boxed value as a boolean.
#[derive(Clone, Copy, Debug)]
pub struct IsTrue;

impl Function for IsTrue {
    type Signature = fn(&Boxed<'_>) -> bool;
    const NAME: &'static str = "IsTrue";
}

/// Tests whether the box holds something, as opposed to a null pointer, an empty array or the
/// void box.
#[derive(Clone, Copy, Debug)]
pub struct IsNotNull;

impl Function for IsNotNull {
    type Signature = fn(&Boxed<'_>) -> bool;
    const NAME: &'static str = "IsNotNull";
}

/// Appends a textual representation of the boxed value.
#[derive(Clone, Copy, Debug)]
pub struct Append;

impl Function for Append {
    type Signature = fn(&Boxed<'_>, &mut dyn fmt::Write) -> fmt::Result;
    const NAME: &'static str = "Append";
}
