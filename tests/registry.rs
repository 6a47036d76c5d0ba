extern crate polybox;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use polybox::{
    Append, Boxed, BoxingError, Equals, Function, MappedType, Reach, Registry, RegistryBuilder,
};

struct Scale;

impl Function for Scale {
    type Signature = fn(&Boxed<'_>, f64) -> f64;
    const NAME: &'static str = "Scale";
}

static SCALE_CALLS: AtomicUsize = AtomicUsize::new(0);

fn scale_float(boxed: &Boxed<'_>, factor: f64) -> f64 {
    SCALE_CALLS.fetch_add(1, Ordering::SeqCst);
    boxed.unbox::<f64>() * factor
}

fn scale_nothing(_: &Boxed<'_>, _: f64) -> f64 {
    0.0
}

fn append_anything(_: &Boxed<'_>, target: &mut dyn fmt::Write) -> fmt::Result {
    target.write_str("<something>")
}

fn scale(registry: &Registry, boxed: &Boxed<'_>, factor: f64) -> f64 {
    registry.call::<Scale, _>(boxed, |scale| scale(boxed, factor))
}

#[test]
fn registered_function_is_called() {
    let mut builder = RegistryBuilder::new();
    builder.register::<Scale, f64>(scale_float).unwrap();
    let registry = builder.build();

    let boxed = Boxed::new(1.5);
    let before = SCALE_CALLS.load(Ordering::SeqCst);
    for _ in 0..3 {
        assert_eq!(scale(&registry, &boxed, 2.0), 3.0);
    }
    assert_eq!(SCALE_CALLS.load(Ordering::SeqCst) - before, 3);
}

#[test]
fn second_registration_is_rejected() {
    let mut builder = RegistryBuilder::new();
    builder.register::<Scale, f64>(scale_float).unwrap();
    let err = builder.register::<Scale, f64>(scale_nothing).unwrap_err();
    assert_eq!(
        err,
        BoxingError::DuplicateRegistration {
            function: "Scale",
            mapped: "f64"
        }
    );
    assert_eq!(
        err.to_string(),
        "function `Scale` is already registered for type `f64`"
    );

    let registry = builder.build();
    assert_eq!(scale(&registry, &Boxed::new(2.0), 4.0), 8.0);
}

#[test]
fn default_is_used_without_registration() {
    let mut builder = RegistryBuilder::new();
    builder.register_default::<Append>(append_anything).unwrap();
    let registry = builder.build();

    let boxed = Boxed::new(42u64);
    let mut text = String::new();
    registry
        .try_call::<Append, _>(&boxed, |append| append(&boxed, &mut text))
        .unwrap()
        .unwrap();
    assert_eq!(text, "<something>");

    assert!(registry
        .get_function::<Append>(boxed.descriptor(), Reach::Local)
        .is_none());
}

#[test]
fn builtin_default_describes_unknown_types() {
    let registry = Registry::bootstrap();
    let numbers = [1i8, 2, 3];
    let boxed = Boxed::new(&numbers);

    let mut text = String::new();
    registry
        .try_call::<Append, _>(&boxed, |append| append(&boxed, &mut text))
        .unwrap()
        .unwrap();
    assert_eq!(text, "ArrayType i8[3]");
}

#[test]
fn missing_function_reports_error() {
    let registry = Registry::bootstrap();
    let boxed = Boxed::new('c');

    assert_eq!(
        registry
            .try_call::<Scale, _>(&boxed, |scale| scale(&boxed, 1.0))
            .unwrap_err(),
        BoxingError::NotImplemented {
            function: "Scale",
            mapped: "char"
        }
    );
    assert_eq!(scale(&registry, &boxed, 1.0), 0.0);
    assert!(boxed.try_call::<Scale, _>(|scale| scale(&boxed, 1.0)).is_err());
}

#[test]
fn introspection() {
    let mut builder = RegistryBuilder::with_builtins();
    builder.register::<Scale, f64>(scale_float).unwrap();
    let registry = builder.build();

    let descriptors = registry.descriptors();
    let names: Vec<_> = descriptors.iter().map(|d| d.type_name()).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert!(names.contains(&"str"));
    assert!(names.contains(&"f64"));

    let functions = registry.functions_of(&<f64 as MappedType>::DESCRIPTOR);
    assert!(functions.contains(&"Scale"));
    assert!(functions.contains(&"Equals"));
    assert_eq!(registry.default_functions().len(), 6);

    let dump = polybox::debug::dump(&registry);
    assert!(dump.contains("Mapped type: f64\n  Mapping:   value, 8 bytes\n"));
}

#[test]
fn shared_between_threads() {
    let registry = Registry::bootstrap();
    thread::scope(|scope| {
        for value in 0..4i64 {
            let registry = &registry;
            scope.spawn(move || {
                let lhs = Boxed::new(value);
                let rhs = Boxed::new(value);
                assert!(registry.call::<Equals, _>(&lhs, |equals| equals(&lhs, &rhs)));
            });
        }
    });
}
