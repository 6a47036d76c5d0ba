//! Type descriptors.
//!
//! Every mapped type has exactly one [`TypeDescriptor`], built at compile time and stored as the
//! associated constant [`MappedType::DESCRIPTOR`]. A box holds a `&'static` reference to it.

use std::any::{self, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::slice;

use crate::placeholder::{WORDS, WORD_SIZE};
use crate::traits::ArrayElement;

/// A type that boxes can be mapped to.
///
/// Source types name their mapped type through [`Boxable::Mapped`](crate::Boxable::Mapped).
/// Several source types may share one mapped type, they are then indistinguishable once boxed.
///
/// # Example
///
/// ```
/// use polybox::{MappedType, TypeDescriptor};
///
/// struct Celsius(f32);
///
/// impl MappedType for Celsius {
///     const DESCRIPTOR: TypeDescriptor = TypeDescriptor::value::<Celsius>();
/// }
///
/// assert!(Celsius::DESCRIPTOR.is_value());
/// ```
pub trait MappedType: 'static {
    /// The descriptor of this mapped type.
    const DESCRIPTOR: TypeDescriptor;
}

/// How the placeholder of a box is laid out for a mapped type.
#[derive(Clone, Copy)]
pub enum Mapping {
    /// The value is stored inline.
    Value {
        /// Size of the mapped type in bytes.
        size: usize,
    },
    /// An enum element stored inline as its `i64` integral value.
    Enum,
    /// The placeholder holds a pointer to data outside the box.
    Pointer,
    /// The placeholder holds a pointer to the first element and the element count.
    Array(ElementInfo),
}

/// Identity and element-wise operations of an array element type.
#[derive(Clone, Copy)]
pub struct ElementInfo {
    type_id: fn() -> TypeId,
    type_name: fn() -> &'static str,
    size: usize,
    equals: unsafe fn(*const (), *const (), usize) -> bool,
    hash: unsafe fn(*const (), usize, &mut dyn Hasher),
}

/// Run-time information about a mapped type.
///
/// Two descriptors are equal when they describe the same mapped type.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    type_id: fn() -> TypeId,
    type_name: fn() -> &'static str,
    mapping: Mapping,
}

impl TypeDescriptor {
    /// Descriptor of a type stored inline.
    ///
    /// Evaluating the descriptor of a type larger than two words fails at compile time.
    pub const fn value<M: 'static>() -> Self {
        assert!(
            mem::size_of::<M>() <= WORDS * WORD_SIZE,
            "value-mapped types must fit into two words"
        );
        TypeDescriptor {
            type_id: TypeId::of::<M>,
            type_name: any::type_name::<M>,
            mapping: Mapping::Value {
                size: mem::size_of::<M>(),
            },
        }
    }

    /// Descriptor of an enumeration boxed as the integral value of its elements.
    ///
    /// Used by [`box_enum!`](crate::box_enum).
    pub const fn enumeration<M: 'static>() -> Self {
        TypeDescriptor {
            type_id: TypeId::of::<M>,
            type_name: any::type_name::<M>,
            mapping: Mapping::Enum,
        }
    }

    /// Descriptor of a type boxed as a pointer.
    pub const fn pointer<M: ?Sized + 'static>() -> Self {
        TypeDescriptor {
            type_id: TypeId::of::<M>,
            type_name: any::type_name::<M>,
            mapping: Mapping::Pointer,
        }
    }

    /// Descriptor of an array type `M` with elements of type `E`.
    pub const fn array<M: ?Sized + 'static, E: ArrayElement>() -> Self {
        TypeDescriptor {
            type_id: TypeId::of::<M>,
            type_name: any::type_name::<M>,
            mapping: Mapping::Array(ElementInfo {
                type_id: TypeId::of::<E>,
                type_name: any::type_name::<E>,
                size: mem::size_of::<E>(),
                equals: slices_equal::<E>,
                hash: hash_slice::<E>,
            }),
        }
    }

    /// The [`TypeId`] of the mapped type.
    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// The name of the mapped type.
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// The layout of boxes of this type.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Whether boxes of this type store their value inline. Enums are values as well.
    pub fn is_value(&self) -> bool {
        matches!(self.mapping, Mapping::Value { .. } | Mapping::Enum)
    }

    /// Whether this is an enumeration.
    pub fn is_enum(&self) -> bool {
        matches!(self.mapping, Mapping::Enum)
    }

    /// Whether boxes of this type store a pointer.
    pub fn is_pointer(&self) -> bool {
        matches!(self.mapping, Mapping::Pointer)
    }

    /// Whether boxes of this type store an array.
    pub fn is_array(&self) -> bool {
        matches!(self.mapping, Mapping::Array(_))
    }

    /// Element information of array types.
    pub fn element(&self) -> Option<&ElementInfo> {
        match &self.mapping {
            Mapping::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Number of placeholder bytes a value of this type occupies.
    pub fn placeholder_usage(&self) -> usize {
        match self.mapping {
            Mapping::Value { size } => size,
            Mapping::Enum => mem::size_of::<i64>(),
            Mapping::Pointer => WORD_SIZE,
            Mapping::Array(_) => WORDS * WORD_SIZE,
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_id() == other.type_id()
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id().hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name())
            .field("mapping", &self.mapping)
            .finish()
    }
}

impl ElementInfo {
    /// The [`TypeId`] of the element type.
    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// The name of the element type.
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Compares two arrays of this element type element by element.
    ///
    /// # Safety
    ///
    /// Both pointers must point to `length` valid, initialized elements of this element type.
    pub unsafe fn slices_equal(&self, lhs: *const (), rhs: *const (), length: usize) -> bool {
        unsafe { (self.equals)(lhs, rhs, length) }
    }

    /// Feeds an array of this element type into `state`.
    ///
    /// # Safety
    ///
    /// `data` must point to `length` valid, initialized elements of this element type.
    pub unsafe fn hash_slice(&self, data: *const (), length: usize, state: &mut dyn Hasher) {
        unsafe { (self.hash)(data, length, state) }
    }
}

impl fmt::Debug for ElementInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementInfo")
            .field("type_name", &self.type_name())
            .field("size", &self.size)
            .finish()
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapping::Value { size } => write!(f, "Value({size} bytes)"),
            Mapping::Enum => f.write_str("Enum"),
            Mapping::Pointer => f.write_str("Pointer"),
            Mapping::Array(element) => write!(f, "Array({})", element.type_name()),
        }
    }
}

unsafe fn slices_equal<E: ArrayElement>(lhs: *const (), rhs: *const (), length: usize) -> bool {
    let (lhs, rhs) = unsafe {
        (
            slice::from_raw_parts(lhs.cast::<E>(), length),
            slice::from_raw_parts(rhs.cast::<E>(), length),
        )
    };
    lhs == rhs
}

unsafe fn hash_slice<E: ArrayElement>(data: *const (), length: usize, state: &mut dyn Hasher) {
    let elements = unsafe { slice::from_raw_parts(data.cast::<E>(), length) };
    for element in elements {
        element.hash_element(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    struct Pair(u32, u32);

    impl MappedType for Pair {
        const DESCRIPTOR: TypeDescriptor = TypeDescriptor::value::<Pair>();
    }

    #[test]
    fn test_value_descriptor() {
        let descriptor = &Pair::DESCRIPTOR;
        assert!(descriptor.is_value());
        assert!(!descriptor.is_array());
        assert_eq!(descriptor.placeholder_usage(), 8);
        assert_eq!(descriptor.type_id(), TypeId::of::<Pair>());
        assert!(descriptor.type_name().ends_with("Pair"));
    }

    #[test]
    fn test_array_descriptor() {
        let descriptor = <str as MappedType>::DESCRIPTOR;
        let element = descriptor.element().unwrap();
        assert_eq!(element.type_id(), TypeId::of::<u8>());
        assert_eq!(element.size(), 1);

        let lhs = [1u8, 2, 3];
        let rhs = [1u8, 2, 3];
        assert!(unsafe {
            element.slices_equal(lhs.as_ptr().cast(), rhs.as_ptr().cast(), lhs.len())
        });
    }

    #[test]
    fn test_enum_descriptor() {
        #[allow(dead_code)]
        enum Switch {
            Off,
            On,
        }

        let descriptor = TypeDescriptor::enumeration::<Switch>();
        assert!(descriptor.is_enum());
        assert!(descriptor.is_value());
        assert!(descriptor.element().is_none());
        assert_eq!(descriptor.placeholder_usage(), 8);
        assert_eq!(format!("{:?}", descriptor.mapping()), "Enum");
    }

    #[test]
    fn test_equality() {
        assert_eq!(<i64 as MappedType>::DESCRIPTOR, <i64 as MappedType>::DESCRIPTOR);
        assert_ne!(<i64 as MappedType>::DESCRIPTOR, <u64 as MappedType>::DESCRIPTOR);
        assert_ne!(<str as MappedType>::DESCRIPTOR, <[u8] as MappedType>::DESCRIPTOR);
    }
}
