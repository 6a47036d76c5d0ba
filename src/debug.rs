//! Read-only reports about the contents of a [`Registry`].
//!
//! ```
//! use polybox::debug;
//! use polybox::{MappedType, Registry};
//!
//! let registry = Registry::bootstrap();
//! let info = debug::type_info(&registry, &<bool as MappedType>::DESCRIPTOR);
//! assert!(info.contains("Append"));
//! ```

use std::fmt;

use crate::descriptor::{Mapping, TypeDescriptor};
use crate::registry::Registry;

/// Describes the mapping and the registered functions of one mapped type.
pub fn type_info(registry: &Registry, descriptor: &TypeDescriptor) -> String {
    TypeInfo {
        registry,
        descriptor,
    }
    .to_string()
}

/// Describes the default functions and every type known to `registry`.
pub fn dump(registry: &Registry) -> String {
    Dump { registry }.to_string()
}

struct TypeInfo<'r> {
    registry: &'r Registry,
    descriptor: &'r TypeDescriptor,
}

impl fmt::Display for TypeInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mapped type: {}", self.descriptor.type_name())?;
        match self.descriptor.mapping() {
            Mapping::Value { size } => writeln!(f, "  Mapping:   value, {size} bytes")?,
            Mapping::Enum => writeln!(f, "  Mapping:   enum")?,
            Mapping::Pointer => writeln!(f, "  Mapping:   pointer")?,
            Mapping::Array(element) => writeln!(
                f,
                "  Mapping:   array of {} ({} bytes per element)",
                element.type_name(),
                element.size()
            )?,
        }
        writeln!(
            f,
            "  Functions: {}",
            list(&self.registry.functions_of(self.descriptor))
        )
    }
}

struct Dump<'r> {
    registry: &'r Registry,
}

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Default functions: {}",
            list(&self.registry.default_functions())
        )?;
        let descriptors = self.registry.descriptors();
        writeln!(f, "Mapped types: {}", descriptors.len())?;
        for descriptor in descriptors {
            let info = TypeInfo {
                registry: self.registry,
                descriptor,
            };
            write!(f, "\n{info}")?;
        }
        Ok(())
    }
}

fn list(names: &[&str]) -> String {
    if names.is_empty() {
        "none".to_owned()
    } else {
        names.join(", ")
    }
}
