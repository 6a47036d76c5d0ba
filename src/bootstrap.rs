//! Built-in implementations of the built-in functions.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::boxed::Boxed;
use crate::descriptor::MappedType;
use crate::function::{Append, Equals, Hashcode, IsLess, IsNotNull, IsTrue};
use crate::placeholder::Content;
use crate::registry::RegistryBuilder;

/// Floats closer than this are equal, twice `f32::EPSILON`.
const FLOAT_TOLERANCE: f64 = 2.384_185_791_015_625e-7;

/// 2^127, the magnitude at which floats stop fitting into `i128`.
const I128_BOUND: f64 = 1.701_411_834_604_692_3e38;

pub(crate) fn register_builtins(builder: &mut RegistryBuilder) {
    builder
        .provide_default::<Equals>(default_equals)
        .provide_default::<IsLess>(default_is_less)
        .provide_default::<Hashcode>(default_hashcode)
        .provide_default::<IsTrue>(default_is_true)
        .provide_default::<IsNotNull>(default_is_not_null)
        .provide_default::<Append>(default_append);

    builder
        .provide::<Equals, bool>(bool_equals)
        .provide::<Append, bool>(append_bool);

    builder
        .provide::<Equals, char>(char_equals)
        .provide::<IsLess, char>(char_is_less)
        .provide::<Append, char>(append_char);

    builder
        .provide::<Equals, str>(text_equals)
        .provide::<IsLess, str>(text_is_less)
        .provide::<Append, str>(append_text)
        .provide::<Equals, [char]>(text_equals)
        .provide::<IsLess, [char]>(text_is_less)
        .provide::<Append, [char]>(append_text);

    builder.provide::<IsNotNull, ()>(is_null);

    #[cfg(not(feature = "bijective-integrals"))]
    {
        register_number::<i64>(builder);
        register_number::<u64>(builder);
    }
    #[cfg(feature = "bijective-integrals")]
    {
        register_number::<i8>(builder);
        register_number::<i16>(builder);
        register_number::<i32>(builder);
        register_number::<i64>(builder);
        register_number::<isize>(builder);
        register_number::<u8>(builder);
        register_number::<u16>(builder);
        register_number::<u32>(builder);
        register_number::<u64>(builder);
        register_number::<usize>(builder);
    }

    #[cfg(feature = "bijective-floats")]
    register_number::<f32>(builder);
    register_number::<f64>(builder);
}

fn register_number<M: MappedType>(builder: &mut RegistryBuilder) {
    builder
        .provide::<Equals, M>(number_equals)
        .provide::<IsLess, M>(number_is_less)
        .provide::<Hashcode, M>(number_hashcode)
        .provide::<IsTrue, M>(number_is_true)
        .provide::<Append, M>(append_number);
}

/// Ordering of boxes that have nothing else in common.
fn type_order(lhs: &Boxed<'_>, rhs: &Boxed<'_>) -> bool {
    lhs.type_id() < rhs.type_id()
}

fn default_equals(lhs: &Boxed<'_>, rhs: &Boxed<'_>) -> bool {
    if !lhs.is_same_type(rhs) {
        return false;
    }
    match (lhs.content(), rhs.content()) {
        (Content::Value { words: a, used }, Content::Value { words: b, .. }) => {
            a[..used] == b[..used]
        }
        (Content::Pointer(a), Content::Pointer(b)) => a == b,
        (
            Content::Array {
                pointer: a,
                length,
            },
            Content::Array {
                pointer: b,
                length: other_length,
            },
        ) => {
            length == other_length
                && (a == b
                    || lhs.descriptor().element().is_some_and(|element| unsafe {
                        element.slices_equal(a, b, length)
                    }))
        }
        _ => false,
    }
}

fn default_is_less(lhs: &Boxed<'_>, rhs: &Boxed<'_>) -> bool {
    if lhs.is_same_type(rhs) && lhs.is_enum() {
        lhs.unbox_enum_integral() < rhs.unbox_enum_integral()
    } else if lhs.is_same_type(rhs) {
        lhs.data().words() < rhs.data().words()
    } else {
        type_order(lhs, rhs)
    }
}

fn default_hashcode(boxed: &Boxed<'_>) -> u64 {
    let mut hasher = DefaultHasher::new();
    boxed.type_id().hash(&mut hasher);
    match boxed.content() {
        Content::Value { words, used } => words[..used].hash(&mut hasher),
        Content::Pointer(pointer) => pointer.hash(&mut hasher),
        Content::Array { pointer, length } => {
            length.hash(&mut hasher);
            if let Some(element) = boxed.descriptor().element() {
                unsafe { element.hash_slice(pointer, length, &mut hasher) };
            }
        }
    }
    hasher.finish()
}

fn default_is_true(boxed: &Boxed<'_>) -> bool {
    match boxed.content() {
        Content::Value { words, used } => words[..used].iter().any(|word| *word != 0),
        Content::Pointer(pointer) => !pointer.is_null(),
        Content::Array { length, .. } => length != 0,
    }
}

fn default_is_not_null(boxed: &Boxed<'_>) -> bool {
    match boxed.content() {
        Content::Value { .. } => true,
        Content::Pointer(pointer) => !pointer.is_null(),
        Content::Array { length, .. } => length != 0,
    }
}

fn default_append(boxed: &Boxed<'_>, target: &mut dyn fmt::Write) -> fmt::Result {
    describe(boxed, target)
}

/// Describes the type of `boxed`, and its value where that is cheap to print.
pub(crate) fn describe(boxed: &Boxed<'_>, target: &mut dyn fmt::Write) -> fmt::Result {
    let descriptor = boxed.descriptor();
    if descriptor.is_enum() {
        return write!(
            target,
            "EnumType {}({})",
            descriptor.type_name(),
            boxed.unbox_enum_integral()
        );
    }
    match boxed.content() {
        Content::Pointer(pointer) => {
            write!(target, "PointerType {}({pointer:p})", descriptor.type_name())
        }
        Content::Array { length, .. } => {
            let element = descriptor
                .element()
                .map_or(descriptor.type_name(), |element| element.type_name());
            write!(target, "ArrayType {element}[{length}]")
        }
        Content::Value { .. } => write!(
            target,
            "ValueType {}(Size: {} bytes)",
            descriptor.type_name(),
            descriptor.placeholder_usage()
        ),
    }
}

fn is_null(_: &Boxed<'_>) -> bool {
    false
}

fn bool_equals(lhs: &Boxed<'_>, rhs: &Boxed<'_>) -> bool {
    rhs.is_type::<bool>() && lhs.unbox::<bool>() == rhs.unbox::<bool>()
}

fn append_bool(boxed: &Boxed<'_>, target: &mut dyn fmt::Write) -> fmt::Result {
    write!(target, "{}", boxed.unbox::<bool>())
}

fn char_equals(lhs: &Boxed<'_>, rhs: &Boxed<'_>) -> bool {
    rhs.is_character() && lhs.unbox_character() == rhs.unbox_character()
}

fn char_is_less(lhs: &Boxed<'_>, rhs: &Boxed<'_>) -> bool {
    if rhs.is_character() {
        lhs.unbox_character() < rhs.unbox_character()
    } else {
        type_order(lhs, rhs)
    }
}

fn append_char(boxed: &Boxed<'_>, target: &mut dyn fmt::Write) -> fmt::Result {
    target.write_char(boxed.unbox_character())
}

/// Strings and character arrays compare as text with each other.
#[derive(Clone, Copy)]
enum Text<'a> {
    Str(&'a str),
    Chars(&'a [char]),
}

impl<'a> Text<'a> {
    fn of(boxed: &Boxed<'a>) -> Option<Self> {
        if boxed.is_type::<&str>() {
            Some(Text::Str(boxed.unbox::<&str>()))
        } else if boxed.is_array_of::<char>() {
            Some(Text::Chars(boxed.unbox_array::<char>()))
        } else {
            None
        }
    }

    fn compare(self, other: Text<'_>) -> Ordering {
        match (self, other) {
            (Text::Str(a), Text::Str(b)) => a.cmp(b),
            (Text::Str(a), Text::Chars(b)) => a.chars().cmp(b.iter().copied()),
            (Text::Chars(a), Text::Str(b)) => a.iter().copied().cmp(b.chars()),
            (Text::Chars(a), Text::Chars(b)) => a.cmp(b),
        }
    }
}

fn text_equals(lhs: &Boxed<'_>, rhs: &Boxed<'_>) -> bool {
    match (Text::of(lhs), Text::of(rhs)) {
        (Some(a), Some(b)) => a.compare(b) == Ordering::Equal,
        _ => false,
    }
}

fn text_is_less(lhs: &Boxed<'_>, rhs: &Boxed<'_>) -> bool {
    match (Text::of(lhs), Text::of(rhs)) {
        (Some(a), Some(b)) => a.compare(b) == Ordering::Less,
        _ => type_order(lhs, rhs),
    }
}

fn append_text(boxed: &Boxed<'_>, target: &mut dyn fmt::Write) -> fmt::Result {
    match Text::of(boxed) {
        Some(Text::Str(text)) => target.write_str(text),
        Some(Text::Chars(chars)) => chars.iter().try_for_each(|c| target.write_char(*c)),
        None => default_append(boxed, target),
    }
}

/// A boxed number of any mapped numeric type.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Number {
    Integral(i128),
    Float(f64),
}

impl Number {
    fn of(boxed: &Boxed<'_>) -> Option<Self> {
        if boxed.is_signed_integral() {
            Some(Number::Integral(i128::from(boxed.unbox_signed_integral())))
        } else if boxed.is_unsigned_integral() {
            Some(Number::Integral(i128::from(boxed.unbox_unsigned_integral())))
        } else if boxed.is_floating_point() {
            Some(Number::Float(boxed.unbox_floating_point()))
        } else {
            None
        }
    }

    // Integers beyond 2^53 lose precision, like in any comparison with a float.
    #[allow(clippy::as_conversions)]
    fn as_float(self) -> f64 {
        match self {
            Number::Integral(value) => value as f64,
            Number::Float(value) => value,
        }
    }

    /// Floats with an integral value become integers, so that they hash like the integers they
    /// are equal to. All NaNs are one value.
    #[allow(clippy::as_conversions)]
    fn normalized(self) -> Self {
        match self {
            Number::Float(value) if value.fract() == 0.0 && value.abs() < I128_BOUND => {
                Number::Integral(value as i128)
            }
            Number::Float(value) if value.is_nan() => Number::Float(f64::NAN),
            number => number,
        }
    }

    fn equals(self, other: Number) -> bool {
        match (self, other) {
            (Number::Integral(a), Number::Integral(b)) => a == b,
            (Number::Float(a), Number::Float(b)) if a.is_nan() || b.is_nan() => {
                a.is_nan() && b.is_nan()
            }
            _ => (self.as_float() - other.as_float()).abs() <= FLOAT_TOLERANCE,
        }
    }

    fn is_less(self, other: Number) -> bool {
        match (self, other) {
            (Number::Integral(a), Number::Integral(b)) => a < b,
            _ => self.as_float() < other.as_float(),
        }
    }
}

fn number_equals(lhs: &Boxed<'_>, rhs: &Boxed<'_>) -> bool {
    match (Number::of(lhs), Number::of(rhs)) {
        (Some(a), Some(b)) => a.equals(b),
        _ => false,
    }
}

fn number_is_less(lhs: &Boxed<'_>, rhs: &Boxed<'_>) -> bool {
    match (Number::of(lhs), Number::of(rhs)) {
        (Some(a), Some(b)) => a.is_less(b),
        _ => type_order(lhs, rhs),
    }
}

fn number_hashcode(boxed: &Boxed<'_>) -> u64 {
    let mut hasher = DefaultHasher::new();
    match Number::of(boxed).map(Number::normalized) {
        Some(Number::Integral(value)) => value.hash(&mut hasher),
        Some(Number::Float(value)) => value.to_bits().hash(&mut hasher),
        None => return default_hashcode(boxed),
    }
    hasher.finish()
}

fn number_is_true(boxed: &Boxed<'_>) -> bool {
    match Number::of(boxed) {
        Some(Number::Integral(value)) => value != 0,
        Some(Number::Float(value)) => value != 0.0,
        None => default_is_true(boxed),
    }
}

fn append_number(boxed: &Boxed<'_>, target: &mut dyn fmt::Write) -> fmt::Result {
    match Number::of(boxed) {
        Some(Number::Integral(value)) => write!(target, "{value}"),
        Some(Number::Float(value)) => write!(target, "{value}"),
        None => default_append(boxed, target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_equality() {
        assert!(Number::Integral(5).equals(Number::Integral(5)));
        assert!(Number::Integral(5).equals(Number::Float(5.0)));
        assert!(Number::Float(0.1 + 0.2).equals(Number::Float(0.3)));
        assert!(!Number::Float(0.1).equals(Number::Float(0.2)));
    }

    #[test]
    fn test_nan_equals_itself() {
        assert!(Number::Float(f64::NAN).equals(Number::Float(f64::NAN)));
        assert!(!Number::Float(f64::NAN).equals(Number::Float(1.0)));
        assert!(!Number::Integral(0).equals(Number::Float(f64::NAN)));
    }

    #[test]
    fn test_normalized() {
        assert_eq!(Number::Float(3.0).normalized(), Number::Integral(3));
        assert_eq!(Number::Float(-0.0).normalized(), Number::Integral(0));
        assert_eq!(Number::Float(0.5).normalized(), Number::Float(0.5));
        assert_eq!(Number::Float(1e300).normalized(), Number::Float(1e300));
        assert!(matches!(
            Number::Float(-f64::NAN).normalized(),
            Number::Float(value) if value.to_bits() == f64::NAN.to_bits()
        ));
    }

    #[test]
    fn test_number_ordering() {
        assert!(Number::Integral(-1).is_less(Number::Integral(1)));
        assert!(Number::Integral(1).is_less(Number::Float(1.5)));
        assert!(!Number::Float(2.0).is_less(Number::Integral(2)));
    }

    #[test]
    fn test_default_append() {
        let mut text = String::new();
        default_append(&Boxed::new(7i64), &mut text).unwrap();
        assert_eq!(text, "ValueType i64(Size: 8 bytes)");

        let mut text = String::new();
        default_append(&Boxed::new(&[1u8, 2, 3]), &mut text).unwrap();
        assert_eq!(text, "ArrayType u8[3]");
    }

    #[test]
    fn test_default_equals_arrays() {
        let a = [1u32, 2, 3];
        let b = vec![1u32, 2, 3];
        let c = [1u32, 2];
        assert!(default_equals(&Boxed::new(&a), &Boxed::new(&b)));
        assert!(!default_equals(&Boxed::new(&a), &Boxed::new(&c)));
    }

    #[test]
    fn test_text_across_representations() {
        let chars = ['a', 'b', 'c'];
        assert!(text_equals(&Boxed::new("abc"), &Boxed::new(&chars)));
        assert!(text_is_less(&Boxed::new("abb"), &Boxed::new(&chars)));
        assert!(!text_equals(&Boxed::new("abc"), &Boxed::new(3)));
    }
}
