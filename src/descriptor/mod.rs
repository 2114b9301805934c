/*!

# Descriptors

A reflected type implements [`Reflect`], normally through
[`reflect_type!`](crate::reflect_type). Everything else in this module is a view onto that
implementation:

- [`TypeDescriptor<T>`], a zero-sized handle for a type known at compile time. Its member lists
  are type lists, so they can be filtered and mapped with the algebra in
  [`typelist`](crate::typelist), and each member is a type implementing
  [`FieldDescriptor`](crate::member::FieldDescriptor) or
  [`FunctionDescriptor`](crate::member::FunctionDescriptor).
- [`TypeInfo`] and [`MemberInfo`], the same information with the types erased, for code that
  only has a `TypeId` or a name.
- [`MemberTable`], the erased accessors behind name-based access in
  [`runtime`](crate::runtime).

Only reflected types have descriptors:

```compile_fail
use static_reflect::descriptor::TypeDescriptor;

let _ = TypeDescriptor::<String>::new();
```

## Bases

A type declares its reflection bases with the `base_types` attribute. [`Reflect::Bases`] is the
flattened list: each declared base followed by its own bases, depth first. A type reachable along
two paths appears twice in `Bases`; [`TypeDescriptor::bases`] removes the repeats. A cycle among
base declarations makes `Bases` infinitely deep and is rejected by the compiler.

*/

mod info;
mod table;

use std::{fmt, marker::PhantomData, ops::ControlFlow};

pub use info::{MemberInfo, TypeInfo, info_for};
pub(crate) use info::{simple_name, static_info};
pub use table::MemberTable;
pub(crate) use table::{FieldAccess, FunctionAccess};

use crate::{
    attr::{Attribute, AttributeList},
    member::{FieldDescriptor, FunctionDescriptor},
    queries::Mapper,
    typelist::{Cons, Nil, TokenList, TypeList, TypeToken},
};

/// A type whose members are known to the crate.
///
/// Implement it with [`reflect_type!`](crate::reflect_type); the associated items are tied
/// together in ways a hand-written impl is unlikely to keep consistent.
pub trait Reflect: Sized + 'static {
    /// The path of the type as registered. For a generic type this is the path of the generic
    /// declaration, without arguments.
    const NAME: &'static str;

    /// The full name of this type, generic arguments included.
    fn name() -> &'static str {
        Self::NAME
    }

    /// `Field<Self, 0>`, `Field<Self, 1>`, ... in declaration order.
    type Fields: MemberList<Self>;
    /// `Function<Self, 0>`, `Function<Self, 1>`, ... in declaration order.
    type Functions: MemberList<Self>;
    /// `Fields` followed by `Functions`.
    type Members: MemberList<Self>;
    /// The types named by the `base_types` attribute.
    type DeclaredBases: ReflectList;
    /// Every declared base followed by its own `Bases`, depth first.
    type Bases: ReflectList;

    /// The type-level attributes.
    fn attributes() -> &'static AttributeList;

    fn member_table() -> &'static MemberTable<Self>;

    /// The index assigned to the type by the [registry](crate::registry).
    fn registry_index() -> usize;
}

// Lists

/// A type list whose elements are all members of `T`.
pub trait MemberList<T: Reflect>: TypeList {
    /// Calls the visitor method for each member's kind, in list order, until one breaks.
    fn accept<V: MemberVisitor<T>>(visitor: &mut V) -> ControlFlow<()>;
}

impl<T: Reflect> MemberList<T> for Nil {
    fn accept<V: MemberVisitor<T>>(_visitor: &mut V) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<T, H, Tl> MemberList<T> for Cons<H, Tl>
where
    T: Reflect,
    H: crate::member::MemberDescriptor<Declarer = T>,
    Tl: MemberList<T>,
{
    fn accept<V: MemberVisitor<T>>(visitor: &mut V) -> ControlFlow<()> {
        H::accept(visitor)?;
        Tl::accept(visitor)
    }
}

/// Receives the members of `T`, each as a type.
pub trait MemberVisitor<T: Reflect> {
    fn visit_field<F: FieldDescriptor<Declarer = T>>(&mut self) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_function<F: FunctionDescriptor<Declarer = T>>(&mut self) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// A type list whose elements are all reflected.
pub trait ReflectList: TypeList {
    /// The erased info of each element, in order.
    fn infos() -> Vec<&'static TypeInfo> {
        let mut infos = Vec::with_capacity(Self::LEN);
        Self::push_infos(&mut infos);
        infos
    }

    /// Like [`TypeList::tokens`], with each token knowing its type's reflection bases.
    fn reflected_tokens() -> TokenList {
        let mut tokens = Vec::with_capacity(Self::LEN);
        Self::push_reflected_tokens(&mut tokens);
        tokens.into()
    }

    /// Is some element `B`, or declares `B` among its reflection bases?
    fn contains_base<B: ?Sized + 'static>() -> bool {
        Self::index_of_base::<B>().is_some()
    }

    /// The position of the first element that is `B` or has `B` as a reflection base.
    fn index_of_base<B: ?Sized + 'static>() -> Option<usize> {
        Self::reflected_tokens().index_of_base::<B>()
    }

    #[doc(hidden)]
    fn push_infos(infos: &mut Vec<&'static TypeInfo>);

    #[doc(hidden)]
    fn push_reflected_tokens(tokens: &mut Vec<TypeToken>);
}

impl ReflectList for Nil {
    fn push_infos(_infos: &mut Vec<&'static TypeInfo>) {}

    fn push_reflected_tokens(_tokens: &mut Vec<TypeToken>) {}
}

impl<H: Reflect, T: ReflectList> ReflectList for Cons<H, T> {
    fn push_infos(infos: &mut Vec<&'static TypeInfo>) {
        infos.push(info_for::<H>());
        T::push_infos(infos);
    }

    fn push_reflected_tokens(tokens: &mut Vec<TypeToken>) {
        tokens.push(TypeToken::of_reflected::<H>());
        T::push_reflected_tokens(tokens);
    }
}

/// Maps a base `B` to `B` followed by its own bases. Used to compute [`Reflect::Bases`].
pub struct BaseChain;

impl<B: Reflect> Mapper<B> for BaseChain {
    type Output = Cons<B, B::Bases>;
}

// TypeDescriptor

/// The compile-time view of a reflected type.
pub struct TypeDescriptor<T: Reflect>(PhantomData<fn() -> T>);

impl<T: Reflect> TypeDescriptor<T> {
    pub const fn new() -> Self {
        TypeDescriptor(PhantomData)
    }

    pub fn name(&self) -> &'static str {
        T::name()
    }

    /// The name without its module path.
    pub fn simple_name(&self) -> &'static str {
        simple_name(T::name())
    }

    pub fn fields(&self) -> T::Fields {
        T::Fields::default()
    }

    pub fn functions(&self) -> T::Functions {
        T::Functions::default()
    }

    /// Fields, then functions.
    pub fn members(&self) -> T::Members {
        T::Members::default()
    }

    pub fn declared_bases(&self) -> TokenList {
        <T::DeclaredBases as ReflectList>::reflected_tokens()
    }

    /// Every base, transitively, each listed once in first-seen order.
    pub fn bases(&self) -> TokenList {
        <T::Bases as ReflectList>::reflected_tokens().unique()
    }

    /// The erased info of each type in [`bases`](Self::bases).
    pub fn base_infos(&self) -> Vec<&'static TypeInfo> {
        let mut infos = <T::Bases as ReflectList>::infos();
        let mut seen = hashbrown::HashSet::new();
        infos.retain(|info| seen.insert(info.type_id()));
        infos
    }

    pub fn attributes(&self) -> &'static AttributeList {
        T::attributes()
    }

    pub fn has_attribute<A: Attribute>(&self) -> bool {
        T::attributes().contains::<A>()
    }

    pub fn get_attribute<A: Attribute>(&self) -> Option<&'static A> {
        T::attributes().get::<A>()
    }

    /// Erased descriptions of the members, fields first.
    pub fn member_infos(&self) -> &'static [MemberInfo] {
        T::member_table().infos()
    }

    pub fn field_infos(&self) -> &'static [MemberInfo] {
        T::member_table().field_infos()
    }

    pub fn function_infos(&self) -> &'static [MemberInfo] {
        T::member_table().function_infos()
    }

    /// Members tagged as properties.
    pub fn properties(&self) -> impl Iterator<Item = &'static MemberInfo> {
        self.function_infos().iter().filter(|info| info.is_property())
    }

    /// The first member named exactly `name`. Fields are searched before functions.
    pub fn get_member(&self, name: &str) -> Option<&'static MemberInfo> {
        self.member_infos().iter().find(|info| info.name() == name)
    }

    pub fn get_field(&self, name: &str) -> Option<&'static MemberInfo> {
        self.field_infos().iter().find(|info| info.name() == name)
    }

    pub fn get_function(&self, name: &str) -> Option<&'static MemberInfo> {
        self.function_infos().iter().find(|info| info.name() == name)
    }

    /// The type's own members, then the members of its bases that no earlier member already
    /// names.
    pub fn inherited_members(&self) -> Vec<&'static MemberInfo> {
        let mut members: Vec<&'static MemberInfo> = self.member_infos().iter().collect();
        for base in self.base_infos() {
            for member in base.members() {
                let shadowed = members
                    .iter()
                    .any(|seen| seen.kind() == member.kind() && seen.name() == member.name());
                if !shadowed {
                    members.push(member);
                }
            }
        }
        members
    }

    /// The member that writes what `reader` reads: the field itself, or the writable property
    /// with the same display name.
    pub fn writer_for(&self, reader: &MemberInfo) -> Option<&'static MemberInfo> {
        self.paired(reader, MemberInfo::is_writable)
    }

    /// The member that reads what `writer` writes.
    pub fn reader_for(&self, writer: &MemberInfo) -> Option<&'static MemberInfo> {
        self.paired(writer, MemberInfo::is_readable)
    }

    fn paired(&self, member: &MemberInfo, wanted: fn(&MemberInfo) -> bool) -> Option<&'static MemberInfo> {
        if member.is_field() {
            return self.member_infos().iter().find(|info| info.same_as(member));
        }
        if !member.is_property() {
            return None;
        }
        self.properties()
            .find(|info| wanted(info) && info.display_name() == member.display_name())
    }

    pub fn info(&self) -> &'static TypeInfo {
        info_for::<T>()
    }
}

impl<T: Reflect> Copy for TypeDescriptor<T> {}

impl<T: Reflect> Clone for TypeDescriptor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Reflect> Default for TypeDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Reflect> PartialEq for TypeDescriptor<T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T: Reflect> Eq for TypeDescriptor<T> {}

impl<T: Reflect> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor<{}>", T::name())
    }
}

/// The descriptor of `T`.
pub const fn reflect<T: Reflect>() -> TypeDescriptor<T> {
    TypeDescriptor::new()
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_type_eq_all;

    use super::*;
    use crate::{
        attr::{BaseTypes, Property},
        member::{Field, Function, MemberDescriptor},
        queries::{IsProperty, Negate},
        reflect_type, type_list,
        typelist::{Filtered, TypeList},
    };

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Point {
        x: i32,
        y: i32,
    }

    impl Point {
        fn manhattan(&self) -> i32 {
            self.x.abs() + self.y.abs()
        }

        fn get_norm(&self) -> f64 {
            f64::from(self.x * self.x + self.y * self.y).sqrt()
        }

        fn scale(&mut self, factor: i32) {
            self.x *= factor;
            self.y *= factor;
        }
    }

    reflect_type! {
        pub Point {
            fields {
                x: i32,
                y: i32,
            }
            functions {
                #[property]
                fn manhattan(&self) -> i32;
                #[property]
                fn get_norm(&self) -> f64;
                fn scale(&mut self, factor: i32);
            }
        }
    }

    #[test]
    fn point_members_in_declaration_order() {
        let point = reflect::<Point>();
        assert_eq!(<Point as Reflect>::Fields::LEN, 2);
        assert_eq!(point.fields().len(), 2);
        assert_eq!(<Point as Reflect>::Fields::type_names().len(), 2);

        let fields: Vec<_> = point.field_infos().iter().map(|info| info.name()).collect();
        assert_eq!(fields, ["x", "y"]);
        let members: Vec<_> = point.member_infos().iter().map(|info| info.name()).collect();
        assert_eq!(members, ["x", "y", "manhattan", "get_norm", "scale"]);
        assert_eq!(point.simple_name(), "Point");
    }

    #[test]
    fn filtering_functions_by_property() {
        type Properties = Filtered<<Point as Reflect>::Functions, IsProperty>;
        type Plain = Filtered<<Point as Reflect>::Functions, Negate<IsProperty>>;
        assert_type_eq_all!(Properties, type_list![Function<Point, 0>, Function<Point, 1>]);
        assert_type_eq_all!(Plain, type_list![Function<Point, 2>]);

        let names: Vec<_> = reflect::<Point>().properties().map(|info| info.display_name()).collect();
        assert_eq!(names, ["manhattan", "norm"]);
        assert!(<Function<Point, 0>>::has_attribute::<Property>());
    }

    #[test]
    fn lookup_by_name() {
        let point = reflect::<Point>();
        let x = point.get_member("x");
        assert!(x.is_some_and(|info| info.is_field() && info.index() == 0));
        assert!(point.get_member("scale").is_some_and(|info| info.is_function()));
        assert!(point.get_member("X").is_none());
        assert!(point.get_field("scale").is_none());
        assert_eq!(point.get_function("get_norm").map(|info| info.display_name()), Some("norm"));
        assert_eq!(<Field<Point, 1>>::info().map(|info| info.debug_name()), Some(format!("{}::y", Point::NAME)));
    }

    // Bases: C -> B -> A, and a diamond D -> {B, E}, E -> A.

    #[derive(Default)]
    pub struct A {
        a: u8,
    }

    #[derive(Default)]
    pub struct B {
        b: u8,
    }

    #[derive(Default)]
    pub struct C {
        c: u8,
    }

    #[derive(Default)]
    pub struct D {
        d: u8,
    }

    #[derive(Default)]
    pub struct E {
        a: u8,
        e: u8,
    }

    reflect_type! { pub A { fields { a: u8 } } }
    reflect_type! { #[base_types(A)] pub B { fields { b: u8 } } }
    reflect_type! { #[base_types(B)] pub C { fields { c: u8 } } }
    reflect_type! { #[base_types(A)] pub E { fields { a: u8, e: u8 } } }
    reflect_type! { #[base_types(B, E)] pub D { fields { d: u8 } } }

    #[test]
    fn bases_are_flattened() {
        assert_type_eq_all!(<C as Reflect>::DeclaredBases, type_list![B]);
        assert_type_eq_all!(<C as Reflect>::Bases, type_list![B, A]);
        assert_type_eq_all!(<A as Reflect>::Bases, type_list![]);

        let bases = reflect::<C>().bases();
        assert_eq!(bases.len(), 2);
        assert!(bases.contains_type::<B>() && bases.contains_type::<A>());
        assert!(reflect::<C>().has_attribute::<BaseTypes<type_list![B]>>());
    }

    #[test]
    fn diamond_bases_appear_once() {
        assert_type_eq_all!(<D as Reflect>::Bases, type_list![B, A, E, A]);
        let bases = reflect::<D>().bases();
        assert_eq!(bases.len(), 3);
        assert_eq!(bases.index_of_type::<B>(), Some(0));
        assert_eq!(bases.index_of_type::<A>(), Some(1));
        assert_eq!(bases.index_of_type::<E>(), Some(2));
        assert_eq!(reflect::<D>().base_infos().len(), 3);
    }

    #[test]
    fn base_queries_see_through_reflected_elements() {
        type Elements = type_list![Account, C];
        assert!(<Elements as ReflectList>::contains_base::<C>());
        assert_eq!(<Elements as ReflectList>::index_of_base::<B>(), Some(1));
        assert_eq!(<Elements as ReflectList>::index_of_base::<A>(), Some(1));
        assert!(!<Elements as ReflectList>::contains_base::<E>());
        assert!(!<type_list![] as ReflectList>::contains_base::<A>());

        // The bases of a base are searched too.
        assert!(reflect::<D>().bases().contains_base::<A>());
        assert_eq!(reflect::<D>().declared_bases().index_of_base::<A>(), Some(0));
    }

    #[test]
    fn inherited_members_skip_shadowed_names() {
        let names: Vec<_> = reflect::<D>()
            .inherited_members()
            .iter()
            .map(|info| info.debug_name())
            .collect();
        // `E::a` is shadowed by `A::a`, which comes first through `B`.
        assert_eq!(
            names,
            [
                format!("{}::d", D::NAME),
                format!("{}::b", B::NAME),
                format!("{}::a", A::NAME),
                format!("{}::e", E::NAME),
            ]
        );
    }

    #[derive(Default)]
    pub struct Account {
        cents: i64,
    }

    impl Account {
        fn get_balance(&self) -> i64 {
            self.cents
        }

        fn set_balance(&mut self, cents: i64) {
            self.cents = cents;
        }

        fn get_owner(&self) -> &'static str {
            "nobody"
        }
    }

    reflect_type! {
        pub Account {
            fields {
                cents: i64,
            }
            functions {
                #[property]
                fn get_balance(&self) -> i64;
                #[property]
                fn set_balance(&mut self, cents: i64);
                #[property("Owner")]
                fn get_owner(&self) -> &'static str;
            }
        }
    }

    #[test]
    fn readers_and_writers_pair_by_display_name() {
        let account = reflect::<Account>();
        let getter = account.get_member("get_balance").unwrap();
        let setter = account.get_member("set_balance").unwrap();
        let owner = account.get_member("get_owner").unwrap();
        let cents = account.get_member("cents").unwrap();

        assert_eq!(account.writer_for(getter).map(|info| info.name()), Some("set_balance"));
        assert_eq!(account.reader_for(setter).map(|info| info.name()), Some("get_balance"));
        assert!(account.writer_for(owner).is_none());
        assert_eq!(owner.display_name(), "Owner");
        assert_eq!(account.writer_for(cents).map(|info| info.name()), Some("cents"));
    }

    #[test]
    fn erased_info_matches_descriptor() {
        let info = reflect::<Point>().info();
        assert!(info.is::<Point>());
        assert_eq!(info.name(), Point::NAME);
        assert_eq!(info.members().len(), 5);
        assert_eq!(info.get_member("y").map(|member| member.index()), Some(1));
        assert!(info.bases().is_empty());
        assert_eq!(reflect::<C>().info().declared_bases().names(), [B::NAME]);
    }
}
