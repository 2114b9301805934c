/*!

# Attributes

An attribute is a plain value attached to a reflected type, field or function. Every attribute
type declares a *usage*, the set of sites it may be attached to, and attachment is checked by the
compiler: [`attach`] only accepts an attribute whose [`Attribute::Usage`] [`Permits`](usage::Permits) the site.

```compile_fail
use static_reflect::attr::{attach, usage, BaseTypes};
use static_reflect::type_list;

// `BaseTypes` may only be attached to a type.
let _ = attach::<usage::Field, _>(BaseTypes::<type_list![u8]>::new());
```

The registration macro calls [`attach`] for every attribute it is given, so the same check
applies to `reflect_type!` declarations.

Attached attributes are stored in an [`AttributeList`], in declaration order. They can be looked
up by exact type ([`AttributeList::get`]), by family ([`AttributeList::get_instance`]) or by
predicate ([`AttributeList::find`]). Absence is `None`. Duplicates are allowed; lookups return
the first match.

## User attributes

Any `Debug + Send + Sync + 'static` type can be an attribute:

```
use static_reflect::attr::{usage, Attribute};

#[derive(Debug)]
pub struct Units(pub &'static str);

impl Attribute for Units {
    type Usage = usage::Field;
}
```

*/

use std::{
    any::{Any, TypeId, type_name},
    fmt,
};

mod builtin;

pub use builtin::{BaseTypes, BaseTypesTemplate, DebugWith, DebugWithTemplate, Property};

use crate::typelist::Template;

pub mod usage {
    //! Attachment sites and the usages that permit them.

    mod sealed {
        pub trait Sealed {}
        impl Sealed for super::Type {}
        impl Sealed for super::Field {}
        impl Sealed for super::Function {}
        impl Sealed for super::Member {}
        impl Sealed for super::Any {}
    }

    /// Where an attribute can be attached: [`Type`], [`Field`] or [`Function`].
    pub trait Site: sealed::Sealed + 'static {
        const NAME: &'static str;
    }

    /// A set of sites.
    pub trait Usage: sealed::Sealed + 'static {}

    /// Implemented when the usage `Self` includes the site `S`.
    pub trait Permits<S: Site>: Usage {}

    #[derive(Copy, Clone, Debug)]
    pub enum Type {}
    #[derive(Copy, Clone, Debug)]
    pub enum Field {}
    #[derive(Copy, Clone, Debug)]
    pub enum Function {}
    /// Fields and functions.
    #[derive(Copy, Clone, Debug)]
    pub enum Member {}
    /// Every site.
    #[derive(Copy, Clone, Debug)]
    pub enum Any {}

    impl Site for Type {
        const NAME: &'static str = "type";
    }
    impl Site for Field {
        const NAME: &'static str = "field";
    }
    impl Site for Function {
        const NAME: &'static str = "function";
    }

    impl Usage for Type {}
    impl Usage for Field {}
    impl Usage for Function {}
    impl Usage for Member {}
    impl Usage for Any {}

    impl Permits<Type> for Type {}
    impl Permits<Field> for Field {}
    impl Permits<Function> for Function {}
    impl Permits<Field> for Member {}
    impl Permits<Function> for Member {}
    impl<S: Site> Permits<S> for Any {}
}

/// Metadata that can be attached to reflected items.
pub trait Attribute: Any + Send + Sync + fmt::Debug {
    /// The sites this attribute may be attached to.
    type Usage: usage::Usage;

    /// The [`Template`] this attribute is an instance of, for generic attribute families such as
    /// [`DebugWith`].
    fn template() -> Option<TypeId>
    where
        Self: Sized,
    {
        None
    }
}

/// Object-safe view of an [`Attribute`].
pub trait ErasedAttribute: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn template_id(&self) -> Option<TypeId>;

    fn type_name(&self) -> &'static str;
}

impl<A: Attribute> ErasedAttribute for A {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn template_id(&self) -> Option<TypeId> {
        A::template()
    }

    fn type_name(&self) -> &'static str {
        type_name::<A>()
    }
}

impl dyn ErasedAttribute {
    pub fn is<A: Attribute>(&self) -> bool {
        self.as_any().is::<A>()
    }

    pub fn downcast_ref<A: Attribute>(&self) -> Option<&A> {
        self.as_any().downcast_ref::<A>()
    }

    pub fn is_instance_of<F: Template>(&self) -> bool {
        self.template_id() == Some(TypeId::of::<F>())
    }
}

/// Attaches `attribute` to a site of kind `S`. This is where usage is validated: the call does not
/// compile unless the attribute's usage permits `S`.
pub fn attach<S, A>(attribute: A) -> Box<dyn ErasedAttribute>
where
    S: usage::Site,
    A: Attribute,
    A::Usage: usage::Permits<S>,
{
    Box::new(attribute)
}

/// The attributes attached to one type or member, in declaration order.
#[derive(Debug, Default)]
pub struct AttributeList {
    attributes: Vec<Box<dyn ErasedAttribute>>,
}

impl AttributeList {
    pub fn new(attributes: Vec<Box<dyn ErasedAttribute>>) -> Self {
        AttributeList { attributes }
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ErasedAttribute> {
        self.attributes.iter().map(|attribute| &**attribute)
    }

    /// The first attribute of type `A`.
    pub fn get<A: Attribute>(&self) -> Option<&A> {
        self.iter().find_map(|attribute| attribute.downcast_ref::<A>())
    }

    pub fn contains<A: Attribute>(&self) -> bool {
        self.get::<A>().is_some()
    }

    /// The first attribute that is an instance of the family `F`, such as any `DebugWith<_>`.
    pub fn get_instance<F: Template>(&self) -> Option<&dyn ErasedAttribute> {
        self.find(|attribute| attribute.is_instance_of::<F>())
    }

    pub fn contains_instance<F: Template>(&self) -> bool {
        self.get_instance::<F>().is_some()
    }

    pub fn find(
        &self,
        mut predicate: impl FnMut(&dyn ErasedAttribute) -> bool,
    ) -> Option<&dyn ErasedAttribute> {
        self.iter().find(|attribute| predicate(*attribute))
    }

    /// The type names of the attributes, in order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.iter().map(|attribute| attribute.type_name()).collect()
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a dyn ErasedAttribute;
    type IntoIter = Box<dyn Iterator<Item = &'a dyn ErasedAttribute> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
