//! The attributes the library itself understands.

use std::{any::TypeId, fmt, marker::PhantomData};

use super::{Attribute, usage};
use crate::typelist::{InstanceOf, Template, TypeList};

/// Marks a function as a field-like accessor. A property that borrows `self` and returns a value
/// is readable; one that borrows `self` mutably and takes one argument is writable. Readers and
/// writers with the same display name form a pair.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Property {
    pub friendly_name: Option<&'static str>,
}

impl Property {
    pub const fn new() -> Self {
        Property {
            friendly_name: None,
        }
    }

    /// A property shown under `friendly_name` instead of its normalized accessor name.
    pub const fn named(friendly_name: &'static str) -> Self {
        Property {
            friendly_name: Some(friendly_name),
        }
    }
}

impl Attribute for Property {
    type Usage = usage::Function;
}

/// Declares reflection bases for a type. The listed types are reported as bases by
/// [`TypeDescriptor::bases`](crate::descriptor::TypeDescriptor::bases), together with their own
/// bases, whether or not the Rust types are related in any way.
pub struct BaseTypes<L>(PhantomData<fn() -> L>);

impl<L: TypeList> BaseTypes<L> {
    pub const fn new() -> Self {
        BaseTypes(PhantomData)
    }

    pub fn type_names(&self) -> Vec<&'static str> {
        L::type_names()
    }
}

impl<L: TypeList> Default for BaseTypes<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: TypeList> fmt::Debug for BaseTypes<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BaseTypes").field(&L::type_names()).finish()
    }
}

/// The family of every `BaseTypes<_>`.
pub struct BaseTypesTemplate;

impl Template for BaseTypesTemplate {}
impl<L> InstanceOf<BaseTypesTemplate> for BaseTypes<L> {}

impl<L: TypeList> Attribute for BaseTypes<L> {
    type Usage = usage::Type;

    fn template() -> Option<TypeId> {
        Some(TypeId::of::<BaseTypesTemplate>())
    }
}

/// A custom formatter for values of type `V`, used by the debug printer in place of the default
/// member-by-member output.
pub struct DebugWith<V: 'static> {
    write: fn(&V, &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl<V: 'static> DebugWith<V> {
    pub const fn new(write: fn(&V, &mut fmt::Formatter<'_>) -> fmt::Result) -> Self {
        DebugWith { write }
    }

    pub fn write(&self, value: &V, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.write)(value, f)
    }

    /// `value`, displayed through this formatter.
    pub fn display<'a>(&'a self, value: &'a V) -> impl fmt::Display + 'a {
        struct Adapter<'a, V: 'static>(&'a DebugWith<V>, &'a V);

        impl<V: 'static> fmt::Display for Adapter<'_, V> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.write(self.1, f)
            }
        }

        Adapter(self, value)
    }
}

impl<V: 'static> Clone for DebugWith<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: 'static> Copy for DebugWith<V> {}

impl<V: 'static> fmt::Debug for DebugWith<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DebugWith<{}>", std::any::type_name::<V>())
    }
}

/// The family of every `DebugWith<_>`.
pub struct DebugWithTemplate;

impl Template for DebugWithTemplate {}
impl<V: 'static> InstanceOf<DebugWithTemplate> for DebugWith<V> {}

impl<V: 'static> Attribute for DebugWith<V> {
    type Usage = usage::Any;

    fn template() -> Option<TypeId> {
        Some(TypeId::of::<DebugWithTemplate>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{type_list, typelist::index_of_instance};

    #[test]
    fn property_names() {
        assert_eq!(Property::new().friendly_name, None);
        assert_eq!(Property::named("Size").friendly_name, Some("Size"));
    }

    #[test]
    fn base_types_lists_its_bases() {
        let bases = BaseTypes::<type_list![u8, String]>::new();
        assert_eq!(bases.type_names(), vec!["u8", std::any::type_name::<String>()]);
        assert_eq!(
            format!("{bases:?}"),
            format!(r#"BaseTypes(["u8", "{}"])"#, std::any::type_name::<String>())
        );
    }

    #[test]
    fn debug_with_formats_through_its_function() {
        let hex = DebugWith::<u32>::new(|value, f| write!(f, "{value:#x}"));
        assert_eq!(hex.display(&255).to_string(), "0xff");
        assert_eq!(format!("{hex:?}"), "DebugWith<u32>");
    }

    #[test]
    fn families_are_selectable_at_the_type_level() {
        type Attributes = type_list![Property, DebugWith<u8>, BaseTypes<type_list![u8]>];
        assert_eq!(index_of_instance::<DebugWithTemplate, Attributes, _>(), 1);
        assert_eq!(index_of_instance::<BaseTypesTemplate, Attributes, _>(), 2);
    }
}
