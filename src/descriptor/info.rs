/*!

Type-erased descriptions of reflected types and members.

A [`TypeDescriptor<T>`](super::TypeDescriptor) needs `T` at compile time. When the type is only
known at runtime (a `TypeId` from the registry, an element of a
[`TokenList`](crate::typelist::TokenList)) the same information is reached through a
[`TypeInfo`], a static table of function pointers built once per type in read-only memory:

```rust,ignore
let info: &'static TypeInfo = info_for::<Point>();
assert_eq!(info.name(), Point::NAME);
```

The erased handle is a single pointer; the per-type table is an associated `const` of a holder
type, so taking a reference to it yields a `'static` without allocating.

*/

use std::{
    any::{TypeId, type_name},
    fmt,
    marker::PhantomData,
};

use super::{Reflect, ReflectList};
use crate::{
    attr::AttributeList,
    member::{FieldDescriptor, FunctionDescriptor, MemberDescriptor, MemberKind, MemberKindTag, ReceiverKind},
    typelist::TokenList,
};

/// Everything the crate knows about one reflected type, behind function pointers.
pub struct TypeInfo {
    name: fn() -> &'static str,
    type_id: fn() -> TypeId,
    attributes: fn() -> &'static AttributeList,
    declared_bases: fn() -> TokenList,
    bases: fn() -> TokenList,
    members: fn() -> &'static [MemberInfo],
    index: fn() -> usize,
}

impl TypeInfo {
    /// Builds the table for `T`. Evaluated at compile time by [`info_for`].
    pub const fn of<T: Reflect>() -> Self {
        TypeInfo {
            name: T::name,
            type_id: TypeId::of::<T>,
            attributes: T::attributes,
            declared_bases: <T::DeclaredBases as ReflectList>::reflected_tokens,
            bases: unique_bases::<T>,
            members: member_infos::<T>,
            index: T::registry_index,
        }
    }

    pub fn name(&self) -> &'static str {
        (self.name)()
    }

    /// The name without its module path.
    pub fn simple_name(&self) -> &'static str {
        simple_name(self.name())
    }

    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id() == TypeId::of::<T>()
    }

    pub fn attributes(&self) -> &'static AttributeList {
        (self.attributes)()
    }

    pub fn declared_bases(&self) -> TokenList {
        (self.declared_bases)()
    }

    /// All reflection bases, flattened and de-duplicated.
    pub fn bases(&self) -> TokenList {
        (self.bases)()
    }

    pub fn members(&self) -> &'static [MemberInfo] {
        (self.members)()
    }

    /// The first member named `name`, fields before functions.
    pub fn get_member(&self, name: &str) -> Option<&'static MemberInfo> {
        self.members().iter().find(|member| member.name() == name)
    }

    /// The registry index of the type. See [`registry`](crate::registry).
    pub fn index(&self) -> usize {
        (self.index)()
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name())
            .field("members", &self.members().len())
            .finish_non_exhaustive()
    }
}

fn unique_bases<T: Reflect>() -> TokenList {
    <T::Bases as ReflectList>::reflected_tokens().unique()
}

fn member_infos<T: Reflect>() -> &'static [MemberInfo] {
    T::member_table().infos()
}

/// Per-`T` holder of the `TypeInfo` constant.
struct InfoHolder<T>(PhantomData<T>);

impl<T: Reflect> InfoHolder<T> {
    const INFO: TypeInfo = TypeInfo::of::<T>();
}

/// The erased table for `T`, without touching the registry.
pub(crate) fn static_info<T: Reflect>() -> &'static TypeInfo {
    &InfoHolder::<T>::INFO
}

/// The erased table for `T`. This is also where a type the static constructors did not register
/// joins the registry.
pub fn info_for<T: Reflect>() -> &'static TypeInfo {
    crate::registry::add_to_registry::<T>();
    static_info::<T>()
}

pub(crate) fn simple_name(name: &'static str) -> &'static str {
    // Only the path outside any generic arguments counts.
    let path_end = name.find('<').unwrap_or(name.len());
    match name[..path_end].rfind("::") {
        Some(at) => &name[at + 2..],
        None => name,
    }
}

/// A plain-data description of one member, independent of its declaring type's generics.
#[derive(Copy, Clone, Debug)]
pub struct MemberInfo {
    kind: MemberKindTag,
    index: usize,
    name: &'static str,
    display_name: &'static str,
    declarer: &'static str,
    readable: bool,
    writable: bool,
    property: bool,
    /// The field's type, or the function's return type.
    value_type: &'static str,
    /// For functions, the receiver kind and the argument tuple.
    receiver: Option<&'static str>,
    args_type: Option<&'static str>,
    attributes: fn() -> &'static AttributeList,
}

impl MemberInfo {
    pub fn of_field<F: FieldDescriptor>() -> Self {
        MemberInfo {
            value_type: type_name::<F::Value>(),
            receiver: None,
            args_type: None,
            ..Self::common::<F>()
        }
    }

    pub fn of_function<F: FunctionDescriptor>() -> Self {
        MemberInfo {
            value_type: type_name::<F::Output>(),
            receiver: Some(<F::Receiver as ReceiverKind>::NAME),
            args_type: Some(type_name::<F::Args>()),
            ..Self::common::<F>()
        }
    }

    fn common<M: MemberDescriptor>() -> Self {
        MemberInfo {
            kind: <M::Kind as MemberKind>::TAG,
            index: M::INDEX,
            name: M::NAME,
            display_name: M::display_name(),
            declarer: <M::Declarer as Reflect>::name(),
            readable: M::READABLE,
            writable: M::WRITABLE,
            property: M::is_property(),
            value_type: "",
            receiver: None,
            args_type: None,
            attributes: M::attributes,
        }
    }

    pub fn kind(&self) -> MemberKindTag {
        self.kind
    }

    pub fn is_field(&self) -> bool {
        self.kind == MemberKindTag::Field
    }

    pub fn is_function(&self) -> bool {
        self.kind == MemberKindTag::Function
    }

    pub fn is_property(&self) -> bool {
        self.property
    }

    /// The ordinal among the declaring type's members of the same kind.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    pub fn debug_name(&self) -> String {
        format!("{}::{}", self.declarer, self.name)
    }

    /// The declaring type's name.
    pub fn declarer(&self) -> &'static str {
        self.declarer
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn value_type(&self) -> &'static str {
        self.value_type
    }

    pub fn receiver(&self) -> Option<&'static str> {
        self.receiver
    }

    pub fn args_type(&self) -> Option<&'static str> {
        self.args_type
    }

    pub fn attributes(&self) -> &'static AttributeList {
        (self.attributes)()
    }

    /// Same member of the same type.
    pub fn same_as(&self, other: &MemberInfo) -> bool {
        self.kind == other.kind && self.index == other.index && self.declarer == other.declarer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_names_drop_the_module_path() {
        assert_eq!(simple_name("crate::shapes::Point"), "Point");
        assert_eq!(simple_name("Point"), "Point");
        assert_eq!(simple_name("crate::Wrapper<crate::Inner>"), "Wrapper<crate::Inner>");
    }
}
