use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use tracing::warn;

use crate::bootstrap;
use crate::descriptor::{MappedType, TypeDescriptor};
use crate::error::BoxingError;
use crate::function::{Append, Equals, Function, Hashcode, IsLess, IsNotNull, IsTrue, Reach};
use crate::placeholder::{Content, Placeholder};
use crate::registry::Registry;
use crate::traits::{ArrayElement, Boxable, Unboxable};

/// A value of any boxable type, stored in two words.
///
/// A box remembers the [`TypeDescriptor`] of the mapped type of the value it was created from.
/// Boxes of pointer and array types borrow the data they point to for `'a`. Copying a box never
/// copies that data.
///
/// # Example
///
/// ```
/// use polybox::Boxed;
///
/// let number = Boxed::new(42i64);
/// assert!(number.is_type::<i64>());
/// assert_eq!(number.unbox::<i64>(), 42);
///
/// let text = Boxed::new("abc");
/// assert!(text.is_array());
/// assert_eq!(text.unbox_length(), 3);
/// assert_eq!(*text.unbox_element::<u8>(0), b'a');
/// assert_eq!(text.to_string(), "abc");
/// ```
#[derive(Clone, Copy)]
pub struct Boxed<'a> {
    descriptor: &'static TypeDescriptor,
    placeholder: Placeholder,
    _phantom: PhantomData<&'a ()>,
}

impl<'a> Boxed<'a> {
    /// Boxes `value`.
    pub fn new<T: Boxable<'a>>(value: T) -> Self {
        let mut placeholder = Placeholder::new();
        value.write(&mut placeholder);
        Boxed {
            descriptor: descriptor_of::<T::Mapped>(),
            placeholder,
            _phantom: PhantomData,
        }
    }

    /// The descriptor of the mapped type.
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    /// The raw placeholder.
    pub fn data(&self) -> &Placeholder {
        &self.placeholder
    }

    /// The placeholder interpreted according to the mapped type.
    pub fn content(&self) -> Content {
        self.placeholder.content(self.descriptor.mapping())
    }

    /// The [`TypeId`] of the mapped type.
    pub fn type_id(&self) -> TypeId {
        self.descriptor.type_id()
    }

    /// The name of the mapped type.
    pub fn type_name(&self) -> &'static str {
        self.descriptor.type_name()
    }

    /// Whether values of type `U` are boxed as the mapped type of this box.
    ///
    /// With the default, surjective mapping of integers this is true for `i32` if the box holds
    /// an `i8`, since both map to `i64`.
    pub fn is_type<U: Boxable<'a>>(&self) -> bool {
        self.type_id() == descriptor_of::<U::Mapped>().type_id()
    }

    /// Whether both boxes have the same mapped type.
    pub fn is_same_type(&self, other: &Boxed<'_>) -> bool {
        self.type_id() == other.type_id()
    }

    /// Whether the box holds an array.
    pub fn is_array(&self) -> bool {
        self.descriptor.is_array()
    }

    /// Whether the box holds an array of `E`.
    pub fn is_array_of<E: ArrayElement>(&self) -> bool {
        self.descriptor
            .element()
            .is_some_and(|element| element.type_id() == TypeId::of::<E>())
    }

    /// Whether the box holds a pointer.
    pub fn is_pointer(&self) -> bool {
        self.descriptor.is_pointer()
    }

    /// Whether the box holds its value inline.
    pub fn is_value(&self) -> bool {
        self.descriptor.is_value()
    }

    /// Whether the box holds an element of an enumeration, see [`box_enum!`](crate::box_enum).
    pub fn is_enum(&self) -> bool {
        self.descriptor.is_enum()
    }

    /// The integral value of a boxed enum element.
    ///
    /// # Panics
    ///
    /// Panics if [`is_enum`](Self::is_enum) is false.
    pub fn unbox_enum_integral(&self) -> i64 {
        self.expect_kind(self.is_enum(), "enum");
        self.placeholder.read_i64()
    }

    /// Unboxes the value as `U`.
    ///
    /// # Panics
    ///
    /// Panics if `U` is not mapped to the mapped type of this box. Use
    /// [`try_unbox`](Self::try_unbox) to get an error instead.
    pub fn unbox<U: Unboxable<'a>>(&self) -> U {
        match self.try_unbox() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Unboxes the value as `U`, failing if `U` is not mapped to the mapped type of this box.
    pub fn try_unbox<U: Unboxable<'a>>(&self) -> Result<U, BoxingError> {
        if self.is_type::<U>() {
            Ok(unsafe { self.unbox_unchecked() })
        } else {
            Err(BoxingError::TypeMismatch {
                requested: descriptor_of::<U::Mapped>().type_name(),
                actual: self.type_name(),
            })
        }
    }

    /// Unboxes the value as `U` without checking the type.
    ///
    /// # Safety
    ///
    /// `U` must be mapped to the mapped type of this box, see [`is_type`](Self::is_type).
    pub unsafe fn unbox_unchecked<U: Unboxable<'a>>(&self) -> U {
        unsafe { U::read(&self.placeholder) }
    }

    /// The number of elements of a boxed array.
    ///
    /// # Panics
    ///
    /// Panics if the box does not hold an array.
    pub fn unbox_length(&self) -> usize {
        if !self.is_array() {
            panic!("{}", self.not_an_array());
        }
        self.placeholder.array_length()
    }

    /// The element at `index` of a boxed array of `E`.
    ///
    /// # Panics
    ///
    /// Panics if the box does not hold an array of `E`, or if `index` is out of bounds.
    pub fn unbox_element<E: ArrayElement>(&self, index: usize) -> &'a E {
        match self.try_unbox_element(index) {
            Ok(element) => element,
            Err(err) => panic!("{err}"),
        }
    }

    /// The element at `index` of a boxed array of `E`, failing on type mismatch or when `index`
    /// is out of bounds.
    pub fn try_unbox_element<E: ArrayElement>(&self, index: usize) -> Result<&'a E, BoxingError> {
        let elements = self.try_unbox_array::<E>()?;
        elements.get(index).ok_or(BoxingError::IndexOutOfBounds {
            index,
            length: elements.len(),
        })
    }

    /// The elements of a boxed array of `E`.
    ///
    /// # Panics
    ///
    /// Panics if the box does not hold an array of `E`.
    pub fn unbox_array<E: ArrayElement>(&self) -> &'a [E] {
        match self.try_unbox_array() {
            Ok(elements) => elements,
            Err(err) => panic!("{err}"),
        }
    }

    /// The elements of a boxed array of `E`, failing if the box holds something else.
    pub fn try_unbox_array<E: ArrayElement>(&self) -> Result<&'a [E], BoxingError> {
        let element = self.descriptor.element().ok_or_else(|| self.not_an_array())?;
        if element.type_id() != TypeId::of::<E>() {
            return Err(BoxingError::TypeMismatch {
                requested: std::any::type_name::<E>(),
                actual: element.type_name(),
            });
        }
        // Every array mapping stores a pointer to `length` elements valid for 'a.
        Ok(unsafe {
            std::slice::from_raw_parts(
                self.placeholder.array_pointer::<E>(),
                self.placeholder.array_length(),
            )
        })
    }

    fn not_an_array(&self) -> BoxingError {
        BoxingError::NotAnArray {
            actual: self.type_name(),
        }
    }

    /// Whether the box holds a signed integer of any width.
    pub fn is_signed_integral(&self) -> bool {
        #[cfg(not(feature = "bijective-integrals"))]
        {
            self.is_type::<i64>()
        }
        #[cfg(feature = "bijective-integrals")]
        {
            self.is_type::<i8>()
                || self.is_type::<i16>()
                || self.is_type::<i32>()
                || self.is_type::<i64>()
                || self.is_type::<isize>()
        }
    }

    /// Unboxes a signed integer of any width.
    ///
    /// # Panics
    ///
    /// Panics if [`is_signed_integral`](Self::is_signed_integral) is false.
    pub fn unbox_signed_integral(&self) -> i64 {
        self.expect_kind(self.is_signed_integral(), "signed integral");
        self.placeholder.read_i64()
    }

    /// Whether the box holds an unsigned integer of any width.
    pub fn is_unsigned_integral(&self) -> bool {
        #[cfg(not(feature = "bijective-integrals"))]
        {
            self.is_type::<u64>()
        }
        #[cfg(feature = "bijective-integrals")]
        {
            self.is_type::<u8>()
                || self.is_type::<u16>()
                || self.is_type::<u32>()
                || self.is_type::<u64>()
                || self.is_type::<usize>()
        }
    }

    /// Unboxes an unsigned integer of any width.
    ///
    /// # Panics
    ///
    /// Panics if [`is_unsigned_integral`](Self::is_unsigned_integral) is false.
    pub fn unbox_unsigned_integral(&self) -> u64 {
        self.expect_kind(self.is_unsigned_integral(), "unsigned integral");
        self.placeholder.read_u64()
    }

    /// Whether the box holds a floating point number of any width.
    pub fn is_floating_point(&self) -> bool {
        #[cfg(not(feature = "bijective-floats"))]
        {
            self.is_type::<f64>()
        }
        #[cfg(feature = "bijective-floats")]
        {
            self.is_type::<f32>() || self.is_type::<f64>()
        }
    }

    /// Unboxes a floating point number of any width.
    ///
    /// # Panics
    ///
    /// Panics if [`is_floating_point`](Self::is_floating_point) is false.
    pub fn unbox_floating_point(&self) -> f64 {
        self.expect_kind(self.is_floating_point(), "floating point");
        self.placeholder.read_f64()
    }

    /// Whether the box holds a character.
    pub fn is_character(&self) -> bool {
        self.is_type::<char>()
    }

    /// Unboxes a character.
    ///
    /// # Panics
    ///
    /// Panics if [`is_character`](Self::is_character) is false.
    pub fn unbox_character(&self) -> char {
        self.unbox::<char>()
    }

    fn expect_kind(&self, matches: bool, kind: &str) {
        if !matches {
            panic!("cannot unbox `{}` as {kind} value", self.type_name());
        }
    }

    /// Looks up the implementation of `F` for this box in the global registry.
    pub fn get_function<F: Function>(&self, reach: Reach) -> Option<F::Signature> {
        Registry::global().get_function::<F>(self.descriptor, reach)
    }

    /// Invokes `F` for this box through the global registry.
    ///
    /// See [`Registry::call`].
    ///
    /// ```
    /// use polybox::{Boxed, IsTrue};
    ///
    /// let boxed = Boxed::new(0u8);
    /// assert!(!boxed.call::<IsTrue, _>(|is_true| is_true(&boxed)));
    /// ```
    pub fn call<F: Function, R: Default>(&self, invoke: impl FnOnce(F::Signature) -> R) -> R {
        Registry::global().call::<F, R>(self, invoke)
    }

    /// Invokes `F` for this box through the global registry, failing if it is not implemented.
    pub fn try_call<F: Function, R>(
        &self,
        invoke: impl FnOnce(F::Signature) -> R,
    ) -> Result<R, BoxingError> {
        Registry::global().try_call::<F, R>(self, invoke)
    }

    /// Invokes [`Equals`].
    pub fn equals(&self, other: &Boxed<'_>) -> bool {
        self.call::<Equals, _>(|equals| equals(self, other))
    }

    /// Invokes [`IsLess`].
    pub fn is_less(&self, other: &Boxed<'_>) -> bool {
        self.call::<IsLess, _>(|is_less| is_less(self, other))
    }

    /// Invokes [`Hashcode`].
    pub fn hashcode(&self) -> u64 {
        self.call::<Hashcode, _>(|hashcode| hashcode(self))
    }

    /// Invokes [`IsTrue`].
    pub fn is_true(&self) -> bool {
        self.call::<IsTrue, _>(|is_true| is_true(self))
    }

    /// Invokes [`IsNotNull`].
    pub fn is_not_null(&self) -> bool {
        self.call::<IsNotNull, _>(|is_not_null| is_not_null(self))
    }

    /// Invokes [`Append`].
    ///
    /// Without any implementation of [`Append`], a warning is logged and the box is described
    /// by its mapped type.
    pub fn append_to(&self, target: &mut dyn fmt::Write) -> fmt::Result {
        match Registry::global().get_function::<Append>(self.descriptor, Reach::Global) {
            Some(append) => append(self, target),
            None => {
                warn!(
                    target: "polybox",
                    "{}",
                    BoxingError::NotImplemented {
                        function: Append::NAME,
                        mapped: self.type_name(),
                    }
                );
                bootstrap::describe(self, target)
            }
        }
    }
}

fn descriptor_of<M: MappedType + ?Sized>() -> &'static TypeDescriptor {
    &M::DESCRIPTOR
}

impl Default for Boxed<'_> {
    /// The void box, holding `()`.
    fn default() -> Self {
        Boxed::new(())
    }
}

impl<'a, T: Boxable<'a>> From<T> for Boxed<'a> {
    fn from(value: T) -> Self {
        Boxed::new(value)
    }
}

impl PartialEq<Boxed<'_>> for Boxed<'_> {
    fn eq(&self, other: &Boxed<'_>) -> bool {
        self.equals(other)
    }
}

impl PartialOrd<Boxed<'_>> for Boxed<'_> {
    fn partial_cmp(&self, other: &Boxed<'_>) -> Option<Ordering> {
        if self.equals(other) {
            Some(Ordering::Equal)
        } else if self.is_less(other) {
            Some(Ordering::Less)
        } else if other.is_less(self) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

impl Hash for Boxed<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hashcode());
    }
}

impl fmt::Display for Boxed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.append_to(f)
    }
}

impl fmt::Debug for Boxed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Boxed")
            .field("type", &self.type_name())
            .field("value", &format_args!("{self}"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size() {
        assert_eq!(
            std::mem::size_of::<Boxed<'_>>(),
            3 * std::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_default_is_void() {
        let void = Boxed::default();
        assert!(void.is_type::<()>());
        assert!(!void.is_not_null());
        assert!(!void.is_true());
    }

    #[test]
    fn test_try_unbox_mismatch() {
        let boxed = Boxed::new('x');
        assert_eq!(
            boxed.try_unbox::<bool>(),
            Err(BoxingError::TypeMismatch {
                requested: "bool",
                actual: "char"
            })
        );
    }

    #[test]
    #[should_panic(expected = "cannot unbox `char` as `bool`")]
    fn test_unbox_mismatch_panics() {
        Boxed::new('x').unbox::<bool>();
    }

    #[test]
    fn test_array_errors() {
        let boxed = Boxed::new(&[1u16, 2][..]);
        assert_eq!(
            boxed.try_unbox_element::<u16>(2),
            Err(BoxingError::IndexOutOfBounds {
                index: 2,
                length: 2
            })
        );
        assert!(matches!(
            boxed.try_unbox_array::<u32>(),
            Err(BoxingError::TypeMismatch { .. })
        ));
        assert_eq!(
            Boxed::new(true).try_unbox_array::<u8>(),
            Err(BoxingError::NotAnArray { actual: "bool" })
        );
    }

    #[test]
    #[should_panic(expected = "not an array type")]
    fn test_unbox_length_of_value_panics() {
        Boxed::new(1.5).unbox_length();
    }

    #[test]
    fn test_array_lifetime() {
        let data = vec![String::from("a"), String::from("b")];
        let elements: &[String] = {
            let boxed = Boxed::new(&data);
            boxed.unbox_array::<String>()
        };
        assert_eq!(elements, ["a", "b"]);
    }
}
