//! Boxing and unboxing of source types.
//!
//! A source type opts into boxing by implementing [`Boxable`], which names the mapped type and
//! writes the placeholder. Implementing [`Unboxable`] as well makes it possible to get the value
//! back out of a box. A type without a [`Boxable`] implementation cannot be boxed at all.
//!
//! The implementations in this module cover the primitive types, strings and slices:
//!
//! | Source type | Mapped type |
//! |---|---|
//! | `i8`, `i16`, `i32`, `i64`, `isize` | [`Integer`] (`i64`) |
//! | `u8`, `u16`, `u32`, `u64`, `usize` | [`UInteger`] (`u64`) |
//! | `f32`, `f64` | [`Float`] (`f64`) |
//! | `bool`, `char`, `()` | themselves |
//! | `&str`, `&String` | `str` |
//! | `&[E]`, `&[E; N]`, `&Vec<E>` | `[E]` |
//! | `&T` where `T: BoxByReference` | `*const T` |
//!
//! References to primitive types box like the value they point to. With the
//! `bijective-integrals` and `bijective-floats` features every integer width and `f32` map to
//! themselves instead.

use std::hash::{Hash, Hasher};
use std::slice;
use std::str;

use crate::descriptor::{MappedType, TypeDescriptor};
use crate::placeholder::Placeholder;

/// The mapped type of all signed integers.
pub type Integer = i64;

/// The mapped type of all unsigned integers.
pub type UInteger = u64;

/// The mapped type of all floating point numbers.
pub type Float = f64;

/// A type that can be boxed.
///
/// # Safety
///
/// `write` must produce the placeholder layout that the descriptor of `Mapped` announces, and
/// that every other source type mapped to `Mapped` produces. In particular an array mapping needs
/// a pointer to `length` valid elements of the element type, and the `str` mapping needs valid
/// UTF-8. Pointers written must stay valid for `'a`.
///
/// # Example
///
/// ```
/// use polybox::{Boxable, Boxed, MappedType, Placeholder, TypeDescriptor, Unboxable};
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// struct Meters(u32);
///
/// impl MappedType for Meters {
///     const DESCRIPTOR: TypeDescriptor = TypeDescriptor::value::<Meters>();
/// }
///
/// unsafe impl<'a> Boxable<'a> for Meters {
///     type Mapped = Meters;
///
///     fn write(&self, placeholder: &mut Placeholder) {
///         placeholder.write_u32(self.0);
///     }
/// }
///
/// impl<'a> Unboxable<'a> for Meters {
///     unsafe fn read(placeholder: &Placeholder) -> Self {
///         Meters(placeholder.read_u32())
///     }
/// }
///
/// let boxed = Boxed::new(Meters(12));
/// assert!(boxed.is_type::<Meters>());
/// assert_eq!(boxed.unbox::<Meters>(), Meters(12));
/// ```
///
/// Types without an implementation cannot be boxed:
///
/// ```compile_fail,E0277
/// use polybox::Boxed;
///
/// struct Opaque;
///
/// Boxed::new(Opaque);
/// ```
///
/// Owned containers are only boxed by reference, since the box could not own their buffer:
///
/// ```compile_fail,E0277
/// use polybox::Boxed;
///
/// Boxed::new(String::from("owned"));
/// ```
pub unsafe trait Boxable<'a> {
    /// The type a boxed value of this type is identified as.
    type Mapped: MappedType + ?Sized;

    /// Encodes `self` into the placeholder.
    fn write(&self, placeholder: &mut Placeholder);
}

/// A boxable type that can be decoded from a box.
///
/// Source types that share a mapped type only get the value back through a type that
/// implements this trait, usually the mapped type itself.
#[cfg_attr(
    not(feature = "bijective-integrals"),
    doc = r#"
Narrow integers are boxed as [`Integer`] and can only be unboxed as such:

```compile_fail,E0277
use polybox::Boxed;

let narrow: i32 = Boxed::new(1i32).unbox::<i32>();
```
"#
)]
#[cfg_attr(
    not(feature = "bijective-floats"),
    doc = r#"
The same holds for `f32` and [`Float`]:

```compile_fail,E0277
use polybox::Boxed;

let narrow: f32 = Boxed::new(1.5f32).unbox::<f32>();
```
"#
)]
pub trait Unboxable<'a>: Boxable<'a> + Sized {
    /// Decodes a value from the placeholder.
    ///
    /// # Safety
    ///
    /// `placeholder` must have been written by a [`Boxable<'a>`] implementation with the same
    /// mapped type as `Self`.
    unsafe fn read(placeholder: &Placeholder) -> Self;
}

/// A type that can be the element of a boxed array.
pub trait ArrayElement: PartialEq + 'static {
    /// Feeds the element into a hasher.
    fn hash_element(&self, state: &mut dyn Hasher);
}

/// Marker for types that are boxed by reference.
///
/// `&'a T` then boxes as the mapped type `*const T` and unboxes back to `&'a T`.
///
/// ```
/// use polybox::{BoxByReference, Boxed};
///
/// struct Config {
///     retries: u32,
/// }
///
/// impl BoxByReference for Config {}
///
/// let config = Config { retries: 3 };
/// let boxed = Boxed::new(&config);
/// assert!(boxed.is_pointer());
/// assert_eq!(boxed.unbox::<&Config>().retries, 3);
/// ```
pub trait BoxByReference: 'static {}

/// An enum whose elements are boxed as their integral value.
///
/// Implement it and invoke [`box_enum!`](crate::box_enum) to make the enum boxable and
/// unboxable. A boxed element reports [`Boxed::is_enum`](crate::Boxed::is_enum) and, without a
/// registered [`Append`](crate::Append), prints as `EnumType <name>(<integral>)`.
pub trait Enumeration: Copy + 'static {
    /// The integral value of `self`.
    fn to_integral(self) -> i64;

    /// The element with the integral value `value`.
    ///
    /// Only called with values returned by [`to_integral`](Self::to_integral).
    fn from_integral(value: i64) -> Self;
}

/// Makes enums implementing [`Enumeration`] boxable, each as its own mapped type.
///
/// ```
/// use polybox::{box_enum, Boxed, Enumeration};
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Level {
///     Info,
///     Error,
/// }
///
/// impl Enumeration for Level {
///     fn to_integral(self) -> i64 {
///         match self {
///             Level::Info => 0,
///             Level::Error => 1,
///         }
///     }
///
///     fn from_integral(value: i64) -> Self {
///         if value == 0 { Level::Info } else { Level::Error }
///     }
/// }
///
/// box_enum!(Level);
///
/// let boxed = Boxed::new(Level::Error);
/// assert!(boxed.is_enum());
/// assert_eq!(boxed.unbox::<Level>(), Level::Error);
/// assert_eq!(boxed.unbox_enum_integral(), 1);
/// ```
#[macro_export]
macro_rules! box_enum {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::MappedType for $ty {
                const DESCRIPTOR: $crate::TypeDescriptor =
                    $crate::TypeDescriptor::enumeration::<$ty>();
            }

            unsafe impl<'a> $crate::Boxable<'a> for $ty {
                type Mapped = $ty;

                fn write(&self, placeholder: &mut $crate::Placeholder) {
                    placeholder.write_i64($crate::Enumeration::to_integral(*self));
                }
            }

            impl<'a> $crate::Unboxable<'a> for $ty {
                unsafe fn read(placeholder: &$crate::Placeholder) -> Self {
                    <$ty as $crate::Enumeration>::from_integral(placeholder.read_i64())
                }
            }
        )+
    };
}

macro_rules! value_mapped {
    ($($ty:ty),* $(,)?) => {
        $(
            impl MappedType for $ty {
                const DESCRIPTOR: TypeDescriptor = TypeDescriptor::value::<$ty>();
            }
        )*
    };
}

// Canonical types map to themselves in every configuration.
macro_rules! canonical {
    ($($ty:ty: $write:ident, $read:ident;)*) => {
        $(
            value_mapped!($ty);

            unsafe impl<'a> Boxable<'a> for $ty {
                type Mapped = $ty;

                fn write(&self, placeholder: &mut Placeholder) {
                    placeholder.$write(*self);
                }
            }

            impl<'a> Unboxable<'a> for $ty {
                unsafe fn read(placeholder: &Placeholder) -> Self {
                    placeholder.$read()
                }
            }
        )*
    };
}

canonical! {
    i64: write_i64, read_i64;
    u64: write_u64, read_u64;
    f64: write_f64, read_f64;
    bool: write_bool, read_bool;
    char: write_char, read_char;
}

value_mapped!(());

unsafe impl<'a> Boxable<'a> for () {
    type Mapped = ();

    fn write(&self, _: &mut Placeholder) {}
}

impl<'a> Unboxable<'a> for () {
    unsafe fn read(_: &Placeholder) -> Self {}
}

// Narrower types widen into the slot of their canonical type in both configurations, so the
// numeric accessors of `Boxed` read every width the same way.
macro_rules! widened {
    ($feature:tt, $canonical:ty, $write:ident, $read:ident; $($ty:ty => $widen:expr),* $(,)?) => {
        $(
            #[cfg(not(feature = $feature))]
            unsafe impl<'a> Boxable<'a> for $ty {
                type Mapped = $canonical;

                fn write(&self, placeholder: &mut Placeholder) {
                    placeholder.$write(($widen)(*self));
                }
            }

            #[cfg(feature = $feature)]
            value_mapped!($ty);

            #[cfg(feature = $feature)]
            unsafe impl<'a> Boxable<'a> for $ty {
                type Mapped = $ty;

                fn write(&self, placeholder: &mut Placeholder) {
                    placeholder.$write(($widen)(*self));
                }
            }

            #[cfg(feature = $feature)]
            impl<'a> Unboxable<'a> for $ty {
                // Exact: the slot was widened from this type.
                #[allow(clippy::as_conversions)]
                unsafe fn read(placeholder: &Placeholder) -> Self {
                    placeholder.$read() as $ty
                }
            }
        )*
    };
}

widened! {
    "bijective-integrals", Integer, write_i64, read_i64;
    i8 => i64::from,
    i16 => i64::from,
    i32 => i64::from,
    isize => isize_to_i64,
}

widened! {
    "bijective-integrals", UInteger, write_u64, read_u64;
    u8 => u64::from,
    u16 => u64::from,
    u32 => u64::from,
    usize => usize_to_u64,
}

widened! {
    "bijective-floats", Float, write_f64, read_f64;
    f32 => f64::from,
}

// Pointers are at most 64 bits wide on every supported target.
#[allow(clippy::as_conversions)]
fn isize_to_i64(value: isize) -> i64 {
    value as i64
}

#[allow(clippy::as_conversions)]
fn usize_to_u64(value: usize) -> u64 {
    value as u64
}

macro_rules! by_reference {
    ($($ty:ty),* $(,)?) => {
        $(
            unsafe impl<'a, 'b> Boxable<'a> for &'b $ty {
                type Mapped = <$ty as Boxable<'a>>::Mapped;

                fn write(&self, placeholder: &mut Placeholder) {
                    (**self).write(placeholder);
                }
            }
        )*
    };
}

by_reference!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, char);

impl MappedType for str {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::array::<str, u8>();
}

unsafe impl<'a> Boxable<'a> for &'a str {
    type Mapped = str;

    fn write(&self, placeholder: &mut Placeholder) {
        placeholder.write_array(self.as_ptr(), self.len());
    }
}

impl<'a> Unboxable<'a> for &'a str {
    unsafe fn read(placeholder: &Placeholder) -> Self {
        unsafe {
            let bytes = slice::from_raw_parts(
                placeholder.array_pointer::<u8>(),
                placeholder.array_length(),
            );
            str::from_utf8_unchecked(bytes)
        }
    }
}

unsafe impl<'a> Boxable<'a> for &'a String {
    type Mapped = str;

    fn write(&self, placeholder: &mut Placeholder) {
        self.as_str().write(placeholder);
    }
}

impl<E: ArrayElement> MappedType for [E] {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::array::<[E], E>();
}

unsafe impl<'a, E: ArrayElement> Boxable<'a> for &'a [E] {
    type Mapped = [E];

    fn write(&self, placeholder: &mut Placeholder) {
        placeholder.write_array(self.as_ptr(), self.len());
    }
}

impl<'a, E: ArrayElement> Unboxable<'a> for &'a [E] {
    unsafe fn read(placeholder: &Placeholder) -> Self {
        unsafe {
            slice::from_raw_parts(
                placeholder.array_pointer::<E>(),
                placeholder.array_length(),
            )
        }
    }
}

unsafe impl<'a, E: ArrayElement, const N: usize> Boxable<'a> for &'a [E; N] {
    type Mapped = [E];

    fn write(&self, placeholder: &mut Placeholder) {
        self.as_slice().write(placeholder);
    }
}

unsafe impl<'a, E: ArrayElement> Boxable<'a> for &'a Vec<E> {
    type Mapped = [E];

    fn write(&self, placeholder: &mut Placeholder) {
        self.as_slice().write(placeholder);
    }
}

impl<T: BoxByReference> MappedType for *const T {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::pointer::<*const T>();
}

unsafe impl<'a, T: BoxByReference> Boxable<'a> for &'a T {
    type Mapped = *const T;

    fn write(&self, placeholder: &mut Placeholder) {
        placeholder.write_pointer::<T>(*self);
    }
}

impl<'a, T: BoxByReference> Unboxable<'a> for &'a T {
    unsafe fn read(placeholder: &Placeholder) -> Self {
        unsafe { &*placeholder.pointer::<T>() }
    }
}

macro_rules! array_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ArrayElement for $ty {
                fn hash_element(&self, mut state: &mut dyn Hasher) {
                    self.hash(&mut state);
                }
            }
        )*
    };
}

array_element!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    String,
    &'static str,
);

impl ArrayElement for f32 {
    fn hash_element(&self, mut state: &mut dyn Hasher) {
        self.to_bits().hash(&mut state);
    }
}

impl ArrayElement for f64 {
    fn hash_element(&self, mut state: &mut dyn Hasher) {
        self.to_bits().hash(&mut state);
    }
}
