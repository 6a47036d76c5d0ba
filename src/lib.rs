//! # polybox: Boxing Values of Any Type
//!
//! [`Boxed`] holds a value of almost any type in two inline words, together with a reference to
//! the descriptor of its type. A box can later tell which type it holds, give the value back and
//! run functions that were registered for that type, without allocating and without the boxed
//! types sharing a common trait object.
//!
//! ## Core Concept
//!
//! Boxing maps every *source* type to a *mapped* type. Many source types may share one mapped
//! type: all signed integers are boxed as [`Integer`] (`i64`), and `&str`, `&String` are both
//! boxed as `str`. Code that consumes boxes only has to deal with the mapped types.
//!
//! Values are stored in one of three ways, decided by the mapped type:
//!
//! - small values are copied into the box,
//! - references to types implementing [`BoxByReference`] are stored as pointers,
//! - strings, slices, arrays and vectors are stored as a pointer and a length.
//!
//! Enums implementing [`Enumeration`] are values as well, stored as their integral value, see
//! [`box_enum!`].
//!
//! ## Quick Start
//!
//! Add polybox to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! polybox = "0.1"
//! ```
//!
//! Basic usage:
//!
//! ```rust
//! use polybox::Boxed;
//!
//! // Integers of every width are boxed as signed or unsigned integrals
//! let number = Boxed::new(42i32);
//! assert!(number.is_signed_integral());
//! assert_eq!(number.unbox_signed_integral(), 42);
//!
//! // Strings are arrays of bytes
//! let text = Boxed::new("abc");
//! assert!(text.is_array());
//! assert_eq!(text.unbox_length(), 3);
//! assert_eq!(text.unbox::<&str>(), "abc");
//!
//! // Built-in functions work across types
//! assert_eq!(Boxed::new(3u8), Boxed::new(3.0));
//! assert_eq!(format!("{} and {}", number, text), "42 and abc");
//! ```
//!
//! ## Functions
//!
//! A [`Function`] is a type naming a function pointer signature. Implementations are registered
//! per mapped type in a [`Registry`], plus an optional default for all other types. The built-in
//! functions [`Equals`], [`IsLess`], [`Hashcode`], [`IsTrue`], [`IsNotNull`] and [`Append`] have
//! defaults and implementations for the built-in mapped types, and back the [`PartialEq`],
//! [`PartialOrd`], [`Hash`](std::hash::Hash) and [`Display`](std::fmt::Display) implementations
//! of [`Boxed`].
//!
//! ```rust
//! use polybox::{Boxed, Function, IsTrue, RegistryBuilder};
//!
//! struct Double;
//!
//! impl Function for Double {
//!     type Signature = fn(&Boxed<'_>) -> i64;
//!     const NAME: &'static str = "Double";
//! }
//!
//! fn double(boxed: &Boxed<'_>) -> i64 {
//!     boxed.unbox::<i64>() * 2
//! }
//!
//! let mut builder = RegistryBuilder::with_builtins();
//! builder.register::<Double, i64>(double).unwrap();
//! let registry = builder.build();
//!
//! let boxed = Boxed::new(21i64);
//! assert_eq!(registry.call::<Double, _>(&boxed, |f| f(&boxed)), 42);
//! assert!(registry.call::<IsTrue, _>(&boxed, |f| f(&boxed)));
//! ```
//!
//! The methods of [`Boxed`] use the global registry, which holds the built-in implementations
//! unless a different registry was installed with [`Registry::install`] before its first use.
//!
//! ## Argument Lists
//!
//! [`Boxes`] collects boxes of different types. The [`boxes!`] macro boxes each argument:
//!
//! ```rust
//! use polybox::boxes;
//!
//! let args = boxes![1, "two", 3.0];
//! assert_eq!(args.size(), 3);
//! assert!(args[1].is_type::<&str>());
//! ```
//!
//! ## Configuration
//!
//! ### Feature Flags
//!
//! - **`bijective-integrals`**
//!   - Every integer width is its own mapped type, so `Boxed::new(1u8).unbox::<u8>()` compiles
//!   - The default collapses them into [`Integer`] and [`UInteger`]
//!
//! - **`bijective-floats`**
//!   - `f32` is its own mapped type instead of being boxed as [`Float`]
//!
//! - **`strict-provenance`** (requires Rust 1.84)
//!   - Converts between integers and pointers with the strict provenance APIs
//!
//! ### Logging
//!
//! Registrations and missing functions are reported through [`tracing`] with the target
//! `polybox`. Install a subscriber to see them.

#![deny(missing_docs)]
#![deny(clippy::as_conversions)]

mod bootstrap;
mod boxed;
mod boxes;
pub mod debug;
mod descriptor;
mod error;
mod function;
mod placeholder;
mod registry;
mod sptr;
mod traits;

pub use crate::boxed::Boxed;
pub use crate::boxes::AddToBoxes;
pub use crate::boxes::Boxes;
pub use crate::descriptor::ElementInfo;
pub use crate::descriptor::MappedType;
pub use crate::descriptor::Mapping;
pub use crate::descriptor::TypeDescriptor;
pub use crate::error::BoxingError;
pub use crate::function::Append;
pub use crate::function::Equals;
pub use crate::function::Function;
pub use crate::function::Hashcode;
pub use crate::function::IsLess;
pub use crate::function::IsNotNull;
pub use crate::function::IsTrue;
pub use crate::function::Reach;
pub use crate::placeholder::Content;
pub use crate::placeholder::Placeholder;
pub use crate::placeholder::WORDS;
pub use crate::placeholder::WORD_SIZE;
pub use crate::registry::Registry;
pub use crate::registry::RegistryBuilder;
pub use crate::traits::ArrayElement;
pub use crate::traits::BoxByReference;
pub use crate::traits::Boxable;
pub use crate::traits::Enumeration;
pub use crate::traits::Float;
pub use crate::traits::Integer;
pub use crate::traits::UInteger;
pub use crate::traits::Unboxable;
