/*!

# Trait Queries

Compile-time predicates and type extractors over types and descriptors.

A query that must work in generic code is a *type-level* function: a [`Predicate`] whose `Output`
is [`True`] or [`False`]. Predicates compose ([`Both`], [`Either`], [`Negate`]) and plug straight
into [`Filtered`](crate::typelist::Filtered):

```rust,ignore
// all functions of `Point` tagged `#[property]`
type Properties = Filtered<<Point as Reflect>::Functions, IsProperty>;
```

Some questions have no type-level answer on stable Rust because the answer for "no" would need
negative reasoning ("`T` does *not* implement `Reflect`"). For concrete types these are answered
by the probe macros [`is_reflectable!`], [`is_container!`], [`is_proxy!`] and [`is_instance_of!`]
(with its list form [`contains_instance!`]),
which pick between two candidate methods by autoref-based method resolution. They only give the
right answer when the queried type is concrete at the call site; inside a generic function they
report the fallback.

*/

use std::{any::TypeId, marker::PhantomData};

use crate::{
    attr::BaseTypes,
    descriptor::{Reflect, TypeDescriptor},
    member::{Member, MemberDescriptor, MemberKind},
    typelist::{Cons, Nil, TypeList},
};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::True {}
    impl Sealed for super::False {}
}

// Booleans

/// A type-level boolean.
pub trait Bool: sealed::Sealed + Copy + Default + 'static {
    const VALUE: bool;

    /// `A` if `Self` is [`True`], `B` otherwise.
    type Select<A, B>;
    type And<B: Bool>: Bool;
    type Or<B: Bool>: Bool;
    type Not: Bool;
}

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct True;

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct False;

impl Bool for True {
    const VALUE: bool = true;

    type Select<A, B> = A;
    type And<B: Bool> = B;
    type Or<B: Bool> = True;
    type Not = False;
}

impl Bool for False {
    const VALUE: bool = false;

    type Select<A, B> = B;
    type And<B: Bool> = False;
    type Or<B: Bool> = B;
    type Not = True;
}

// Predicates and mappers

/// A compile-time boolean function over a single type.
pub trait Predicate<T> {
    type Output: Bool;
}

/// A compile-time function from a type to a type.
pub trait Mapper<T> {
    type Output;
}

/// Evaluates the predicate `P` for `T`.
pub const fn holds<P: Predicate<T>, T>() -> bool {
    <P::Output as Bool>::VALUE
}

/// Holds for every type.
pub struct Always;

impl<T> Predicate<T> for Always {
    type Output = True;
}

/// Holds for no type.
pub struct Never;

impl<T> Predicate<T> for Never {
    type Output = False;
}

/// Conjunction of two predicates.
pub struct Both<P, Q>(PhantomData<(P, Q)>);

impl<T, P: Predicate<T>, Q: Predicate<T>> Predicate<T> for Both<P, Q> {
    type Output = <P::Output as Bool>::And<Q::Output>;
}

/// Disjunction of two predicates.
pub struct Either<P, Q>(PhantomData<(P, Q)>);

impl<T, P: Predicate<T>, Q: Predicate<T>> Predicate<T> for Either<P, Q> {
    type Output = <P::Output as Bool>::Or<Q::Output>;
}

pub struct Negate<P>(PhantomData<P>);

impl<T, P: Predicate<T>> Predicate<T> for Negate<P> {
    type Output = <P::Output as Bool>::Not;
}

pub struct Identity;

impl<T> Mapper<T> for Identity {
    type Output = T;
}

/// Maps a reflectable type to its [`TypeDescriptor`].
pub struct ToDescriptor;

impl<T: Reflect> Mapper<T> for ToDescriptor {
    type Output = TypeDescriptor<T>;
}

// Descriptor predicates

/// Holds for field members.
pub struct IsField;

/// Holds for function members.
pub struct IsFunction;

/// Holds for every member, field or function.
pub struct IsMember;

/// Holds for function members tagged with [`Property`](crate::attr::Property).
pub struct IsProperty;

/// Holds for [`TypeDescriptor`]s.
pub struct IsType;

pub type IsDescriptor = IsType;

impl<K: MemberKind, T, const I: usize> Predicate<Member<K, T, I>> for IsField {
    type Output = K::IsField;
}

impl<K: MemberKind, T, const I: usize> Predicate<Member<K, T, I>> for IsFunction {
    type Output = K::IsFunction;
}

impl<K: MemberKind, T, const I: usize> Predicate<Member<K, T, I>> for IsMember {
    type Output = True;
}

impl<K, T, const I: usize> Predicate<Member<K, T, I>> for IsProperty
where
    Member<K, T, I>: MemberDescriptor,
{
    type Output = <Member<K, T, I> as MemberDescriptor>::IsProperty;
}

impl<K: MemberKind, T, const I: usize> Predicate<Member<K, T, I>> for IsType {
    type Output = False;
}

impl<T: Reflect> Predicate<TypeDescriptor<T>> for IsField {
    type Output = False;
}

impl<T: Reflect> Predicate<TypeDescriptor<T>> for IsFunction {
    type Output = False;
}

impl<T: Reflect> Predicate<TypeDescriptor<T>> for IsMember {
    type Output = False;
}

impl<T: Reflect> Predicate<TypeDescriptor<T>> for IsProperty {
    type Output = False;
}

impl<T: Reflect> Predicate<TypeDescriptor<T>> for IsType {
    type Output = True;
}

// Extractors

/// Strips references. Rust has no `const`/`volatile` qualifiers; a reference is the only wrapper
/// that changes a type without changing what is being described.
///
/// Blanket impls for every `T` would overlap with the reference impls, so plain types opt in: the
/// registration macro implements it for every reflected type, and the standard scalar and string
/// types are covered here.
pub trait RemoveQualifiers {
    type Output: ?Sized;
}

pub type Unqualified<T> = <T as RemoveQualifiers>::Output;

impl<T: ?Sized + RemoveQualifiers> RemoveQualifiers for &T {
    type Output = T::Output;
}

impl<T: ?Sized + RemoveQualifiers> RemoveQualifiers for &mut T {
    type Output = T::Output;
}

macro_rules! unqualified_as_is {
    ($($t:ty),* $(,)?) => {
        $(impl RemoveQualifiers for $t { type Output = $t; })*
    };
}

unqualified_as_is!(
    (), bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, str,
    String,
);

impl<T> RemoveQualifiers for Vec<T> {
    type Output = Vec<T>;
}

impl<T> RemoveQualifiers for Option<T> {
    type Output = Option<T>;
}

/// Normalizes a "variadic" type into a canonical type list: tuples become the list of their
/// elements, [`BaseTypes`] yields its bases, references are looked through, and lists are
/// returned unchanged.
pub trait AsTypeList {
    type Output: TypeList;
}

pub type TypeListOf<T> = <T as AsTypeList>::Output;

impl AsTypeList for Nil {
    type Output = Nil;
}

impl<H: 'static, T: TypeList> AsTypeList for Cons<H, T> {
    type Output = Cons<H, T>;
}

impl<T: ?Sized + AsTypeList> AsTypeList for &T {
    type Output = T::Output;
}

impl<L: TypeList> AsTypeList for BaseTypes<L> {
    type Output = L;
}

macro_rules! tuple_as_type_list {
    ($( ($($name:ident),*) )*) => {
        $(
            impl<$($name: 'static),*> AsTypeList for ($($name,)*) {
                type Output = $crate::type_list![$($name),*];
            }
        )*
    };
}

tuple_as_type_list! {
    ()
    (A)
    (A, B)
    (A, B, C)
    (A, B, C, D)
    (A, B, C, D, E)
    (A, B, C, D, E, F)
    (A, B, C, D, E, F, G)
    (A, B, C, D, E, F, G, H)
    (A, B, C, D, E, F, G, H, I)
    (A, B, C, D, E, F, G, H, I, J)
    (A, B, C, D, E, F, G, H, I, J, K)
    (A, B, C, D, E, F, G, H, I, J, K, L)
}

/// Are `A` and `B` the same type? Answered at runtime, so it also works in generic code.
pub fn same_type<A: ?Sized + 'static, B: ?Sized + 'static>() -> bool {
    TypeId::of::<A>() == TypeId::of::<B>()
}

// Probes

#[doc(hidden)]
pub mod probe {
    //! Autoref specialization. For a probe expression `(&Probe::<T>::new()).method()`, method
    //! resolution first tries impls on `Probe<T>` (taking `&self`), then impls on `&Probe<T>`.
    //! The "yes" answer is implemented on the former under the bound being tested, the "no"
    //! answer on the latter unconditionally.

    use std::marker::PhantomData;

    use crate::{
        descriptor::Reflect,
        proxy::Proxy,
        typelist::{InstanceOf, Template},
    };

    pub struct Probe<T: ?Sized>(PhantomData<fn() -> PhantomData<T>>);

    impl<T: ?Sized> Probe<T> {
        pub const fn new() -> Self {
            Probe(PhantomData)
        }
    }

    pub struct InstanceProbe<T, F>(PhantomData<fn() -> (T, F)>);

    impl<T, F> InstanceProbe<T, F> {
        pub const fn new() -> Self {
            InstanceProbe(PhantomData)
        }
    }

    pub trait ReflectableYes {
        fn is_reflectable(&self) -> bool {
            true
        }
    }
    impl<T: Reflect> ReflectableYes for Probe<T> {}

    pub trait ReflectableNo {
        fn is_reflectable(&self) -> bool {
            false
        }
    }
    impl<T: ?Sized> ReflectableNo for &Probe<T> {}

    pub trait ContainerYes {
        fn is_container(&self) -> bool {
            true
        }
    }
    impl<T: ?Sized> ContainerYes for Probe<T> where for<'a> &'a T: IntoIterator {}

    pub trait ContainerNo {
        fn is_container(&self) -> bool {
            false
        }
    }
    impl<T: ?Sized> ContainerNo for &Probe<T> {}

    pub trait ProxyYes {
        fn is_proxy(&self) -> bool {
            true
        }
    }
    impl<T: Proxy> ProxyYes for Probe<T> {}

    pub trait ProxyNo {
        fn is_proxy(&self) -> bool {
            false
        }
    }
    impl<T: ?Sized> ProxyNo for &Probe<T> {}

    pub trait InstanceYes {
        fn is_instance_of(&self) -> bool {
            true
        }
    }
    impl<F: Template, T: InstanceOf<F>> InstanceYes for InstanceProbe<T, F> {}

    pub trait InstanceNo {
        fn is_instance_of(&self) -> bool {
            false
        }
    }
    impl<T, F> InstanceNo for &InstanceProbe<T, F> {}
}

/// Does the concrete type implement [`Reflect`]?
///
/// ```
/// use static_reflect::{is_reflectable, reflect_type};
///
/// pub struct Point { x: i32 }
/// reflect_type! { Point { fields { x: i32 } } }
///
/// assert!(is_reflectable!(Point));
/// assert!(!is_reflectable!(String));
/// ```
#[macro_export]
macro_rules! is_reflectable {
    ($t:ty) => {{
        #[allow(unused_imports)]
        use $crate::queries::probe::{ReflectableNo as _, ReflectableYes as _};
        (&$crate::queries::probe::Probe::<$t>::new()).is_reflectable()
    }};
}

/// Can a shared reference to the concrete type be iterated?
#[macro_export]
macro_rules! is_container {
    ($t:ty) => {{
        #[allow(unused_imports)]
        use $crate::queries::probe::{ContainerNo as _, ContainerYes as _};
        (&$crate::queries::probe::Probe::<$t>::new()).is_container()
    }};
}

/// Does the concrete type implement [`Proxy`](crate::proxy::Proxy)?
#[macro_export]
macro_rules! is_proxy {
    ($t:ty) => {{
        #[allow(unused_imports)]
        use $crate::queries::probe::{ProxyNo as _, ProxyYes as _};
        (&$crate::queries::probe::Probe::<$t>::new()).is_proxy()
    }};
}

/// Is the concrete type an instance of the family `F`?
#[macro_export]
macro_rules! is_instance_of {
    ($t:ty, $family:ty) => {{
        #[allow(unused_imports)]
        use $crate::queries::probe::{InstanceNo as _, InstanceYes as _};
        (&$crate::queries::probe::InstanceProbe::<$t, $family>::new()).is_instance_of()
    }};
}

/// Is any of the listed concrete types an instance of the family `F`?
///
/// The list form of [`is_instance_of!`]. It answers `false` for an empty list and for lists whose
/// elements are not instances, which the type-level algebra cannot express.
///
/// ```
/// use static_reflect::{contains_instance, index_of_instance, type_list, typelist::TypeListTemplate};
///
/// assert!(contains_instance!(TypeListTemplate; u8, type_list![u16], String));
/// assert!(!contains_instance!(TypeListTemplate; u8, String));
/// assert!(!contains_instance!(TypeListTemplate;));
/// assert_eq!(index_of_instance!(TypeListTemplate; u8, type_list![u16]), Some(1));
/// ```
#[macro_export]
macro_rules! contains_instance {
    ($family:ty; $($t:ty),* $(,)?) => {
        $crate::index_of_instance!($family; $($t),*).is_some()
    };
}

/// The position of the first listed concrete type that is an instance of the family `F`.
#[macro_export]
macro_rules! index_of_instance {
    ($family:ty; $($t:ty),* $(,)?) => {{
        let matches: &[bool] = &[$($crate::is_instance_of!($t, $family)),*];
        matches.iter().position(|&is_instance| is_instance)
    }};
}
