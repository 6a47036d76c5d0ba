//! The inline storage of a box.
//!
//! A [`Placeholder`] is two pointer-sized slots. It does not know what it holds: the
//! [`TypeDescriptor`](crate::TypeDescriptor) of the box decides whether the slots are a value,
//! a pointer or a pointer and a length. [`Placeholder::content`] turns that decision into an
//! explicit [`Content`] value.

use std::fmt;
use std::mem;
use std::ptr;

use crate::descriptor::Mapping;
use crate::sptr;

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("polybox needs a target with 32 or 64 bit pointers");

/// Number of slots in a [`Placeholder`].
pub const WORDS: usize = 2;

/// Size of one slot in bytes.
pub const WORD_SIZE: usize = mem::size_of::<usize>();

/// Two pointer-sized slots holding the encoded value of a box.
///
/// Integers written with the `write_*` methods are stored without pointer provenance, pointers
/// keep theirs. Unused slots are zero, so default implementations can compare and hash all
/// used words.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct Placeholder {
    slots: [*const (); WORDS],
}

const _: () = assert!(mem::size_of::<Placeholder>() == WORDS * WORD_SIZE);

/// The layout a [`Placeholder`] has for a given [`Mapping`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Content {
    /// A value stored in the first `used` words.
    Value {
        /// Both slots as integers.
        words: [usize; WORDS],
        /// The number of slots the mapped type occupies.
        used: usize,
    },
    /// A pointer to data outside the box.
    Pointer(*const ()),
    /// A pointer to the first element of an array and the number of elements.
    Array {
        /// Address of the first element.
        pointer: *const (),
        /// Number of elements.
        length: usize,
    },
}

impl Placeholder {
    /// Creates a placeholder with both slots zeroed.
    pub const fn new() -> Self {
        Placeholder {
            slots: [ptr::null(); WORDS],
        }
    }

    /// Reads slot `index` as an integer.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than [`WORDS`].
    pub fn word(&self, index: usize) -> usize {
        sptr::addr(self.slots[index])
    }

    /// Writes an integer to slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than [`WORDS`].
    pub fn set_word(&mut self, index: usize, value: usize) {
        self.slots[index] = sptr::without_provenance(value);
    }

    /// Reads both slots as integers.
    pub fn words(&self) -> [usize; WORDS] {
        [self.word(0), self.word(1)]
    }

    /// Stores a `u64`, using one slot on 64 bit targets and two slots otherwise.
    pub fn write_u64(&mut self, value: u64) {
        #[cfg(target_pointer_width = "64")]
        self.set_word(0, usize::from_ne_bytes(value.to_ne_bytes()));

        #[cfg(target_pointer_width = "32")]
        {
            let bytes = value.to_le_bytes();
            let low = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            let high = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
            self.set_word(0, usize::from_ne_bytes(low.to_ne_bytes()));
            self.set_word(1, usize::from_ne_bytes(high.to_ne_bytes()));
        }
    }

    /// Reads a value stored with [`write_u64`](Self::write_u64).
    pub fn read_u64(&self) -> u64 {
        #[cfg(target_pointer_width = "64")]
        {
            u64::from_ne_bytes(self.word(0).to_ne_bytes())
        }

        #[cfg(target_pointer_width = "32")]
        {
            let low = u32::from_ne_bytes(self.word(0).to_ne_bytes());
            let high = u32::from_ne_bytes(self.word(1).to_ne_bytes());
            u64::from(low) | (u64::from(high) << 32)
        }
    }

    /// Stores an `i64` as its two's complement bit pattern.
    pub fn write_i64(&mut self, value: i64) {
        self.write_u64(u64::from_ne_bytes(value.to_ne_bytes()));
    }

    /// Reads a value stored with [`write_i64`](Self::write_i64).
    pub fn read_i64(&self) -> i64 {
        i64::from_ne_bytes(self.read_u64().to_ne_bytes())
    }

    /// Stores an `f64` as its bit pattern.
    pub fn write_f64(&mut self, value: f64) {
        self.write_u64(value.to_bits());
    }

    /// Reads a value stored with [`write_f64`](Self::write_f64).
    pub fn read_f64(&self) -> f64 {
        f64::from_bits(self.read_u64())
    }

    /// Stores a `bool` as `0` or `1` in the first slot.
    pub fn write_bool(&mut self, value: bool) {
        self.set_word(0, usize::from(value));
    }

    /// Reads a value stored with [`write_bool`](Self::write_bool).
    pub fn read_bool(&self) -> bool {
        self.word(0) != 0
    }

    /// Stores a `u32` like a `u64`, zero-extended.
    pub fn write_u32(&mut self, value: u32) {
        self.write_u64(u64::from(value));
    }

    /// Reads a value stored with [`write_u32`](Self::write_u32).
    pub fn read_u32(&self) -> u32 {
        let bytes = self.read_u64().to_le_bytes();
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Stores a `char` as its scalar value, like [`write_u32`](Self::write_u32).
    pub fn write_char(&mut self, value: char) {
        self.write_u32(u32::from(value));
    }

    /// Reads a value stored with [`write_char`](Self::write_char).
    pub fn read_char(&self) -> char {
        char::from_u32(self.read_u32()).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    /// Stores a pointer in the first slot.
    pub fn write_pointer<T>(&mut self, pointer: *const T) {
        self.slots[0] = pointer.cast();
    }

    /// Reads a pointer stored with [`write_pointer`](Self::write_pointer).
    pub fn pointer<T>(&self) -> *const T {
        self.slots[0].cast()
    }

    /// Stores the pointer and length of an array.
    pub fn write_array<E>(&mut self, pointer: *const E, length: usize) {
        self.slots[0] = pointer.cast();
        self.set_word(1, length);
    }

    /// Pointer to the first element of an array stored with [`write_array`](Self::write_array).
    pub fn array_pointer<E>(&self) -> *const E {
        self.slots[0].cast()
    }

    /// Length of an array stored with [`write_array`](Self::write_array).
    pub fn array_length(&self) -> usize {
        self.word(1)
    }

    /// Interprets the slots according to `mapping`.
    pub fn content(&self, mapping: &Mapping) -> Content {
        match mapping {
            Mapping::Value { size } => Content::Value {
                words: self.words(),
                used: size.div_ceil(WORD_SIZE),
            },
            Mapping::Enum => Content::Value {
                words: self.words(),
                used: mem::size_of::<i64>().div_ceil(WORD_SIZE),
            },
            Mapping::Pointer => Content::Pointer(self.slots[0]),
            Mapping::Array(_) => Content::Array {
                pointer: self.slots[0],
                length: self.array_length(),
            },
        }
    }
}

impl Default for Placeholder {
    fn default() -> Self {
        Placeholder::new()
    }
}

impl fmt::Debug for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [first, second] = self.words();
        write!(f, "Placeholder({first:#x}, {second:#x})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size() {
        assert_eq!(mem::size_of::<Placeholder>(), 2 * mem::size_of::<usize>());
    }

    #[test]
    fn test_integrals() {
        let mut p = Placeholder::new();
        p.write_i64(-42);
        assert_eq!(p.read_i64(), -42);

        p.write_u64(u64::MAX - 1);
        assert_eq!(p.read_u64(), u64::MAX - 1);

        p.write_f64(3.25);
        assert_eq!(p.read_f64(), 3.25);
    }

    #[test]
    fn test_bool_and_char() {
        let mut p = Placeholder::new();
        p.write_bool(true);
        assert!(p.read_bool());
        assert_eq!(p.word(1), 0);

        let mut p = Placeholder::new();
        p.write_char('ß');
        assert_eq!(p.read_char(), 'ß');
    }

    #[test]
    #[should_panic]
    fn test_word_out_of_range() {
        Placeholder::new().word(WORDS);
    }

    #[test]
    fn test_u32_is_zero_extended() {
        let mut p = Placeholder::new();
        p.write_u64(u64::MAX);
        p.write_u32(7);
        assert_eq!(p.read_u64(), 7);
        assert_eq!(p.read_u32(), 7);
    }

    #[test]
    fn test_array() {
        let data = [1u16, 2, 3];
        let mut p = Placeholder::new();
        p.write_array(data.as_ptr(), data.len());
        assert_eq!(p.array_pointer::<u16>(), data.as_ptr());
        assert_eq!(p.array_length(), 3);
    }

    #[test]
    fn test_content() {
        let mut p = Placeholder::new();
        p.write_u64(7);
        match p.content(&Mapping::Value { size: 4 }) {
            Content::Value { words, used } => {
                assert_eq!(words[0], 7);
                assert_eq!(used, 1);
            }
            other => panic!("unexpected content {other:?}"),
        }

        let value = 5u8;
        p.write_pointer(&value);
        assert_eq!(
            p.content(&Mapping::Pointer),
            Content::Pointer(ptr::from_ref(&value).cast())
        );
    }
}
