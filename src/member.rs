/*!

# The Member Model

Every reflected field and function has an identity made of three parts: its kind, the type that
declares it, and its ordinal position among that type's members of the same kind. The identity is
the zero-sized type [`Member<Kind, Declarer, INDEX>`](Member), which implements
[`MemberDescriptor`] and either [`FieldDescriptor`] or [`FunctionDescriptor`] once the
registration macro has described the member.

Indices are assigned once, from declaration order, and never change. `Field<Point, 0>` is always
the first field declared for `Point`, and `Function<Point, 0>` is always its first function.

*/

use std::{fmt, marker::PhantomData, ops::ControlFlow};

use crate::{
    attr::{Attribute, AttributeList},
    descriptor::{MemberInfo, MemberVisitor, Reflect, TypeDescriptor},
    queries::{Bool, False, True},
    runtime::debug::DebugWriter,
};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::FieldKind {}
    impl Sealed for super::FunctionKind {}
    impl Sealed for super::ByRef {}
    impl Sealed for super::ByMut {}
    impl Sealed for super::Static {}
}

// Identities

/// The identity of one reflected member. Never instantiated with data; values are only used to let
/// inference carry the type.
pub struct Member<K, T, const I: usize>(PhantomData<fn() -> (K, T)>);

pub type Field<T, const I: usize> = Member<FieldKind, T, I>;
pub type Function<T, const I: usize> = Member<FunctionKind, T, I>;

impl<K, T, const I: usize> Member<K, T, I> {
    pub const fn new() -> Self {
        Member(PhantomData)
    }
}

impl<K, T, const I: usize> Copy for Member<K, T, I> {}

impl<K, T, const I: usize> Clone for Member<K, T, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, T, const I: usize> Default for Member<K, T, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T, const I: usize> PartialEq for Member<K, T, I> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<K, T, const I: usize> Eq for Member<K, T, I> {}

impl<K, T, const I: usize> fmt::Debug for Member<K, T, I>
where
    Self: MemberDescriptor,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            <<Self as MemberDescriptor>::Kind as MemberKind>::NAME,
            Self::debug_name()
        )
    }
}

impl<K, T, const I: usize> Member<K, T, I>
where
    Self: MemberDescriptor,
{
    /// The declared name, for when a member value is at hand rather than its type.
    pub fn name(&self) -> &'static str {
        <Self as MemberDescriptor>::NAME
    }
}

/// The kind of a member: [`FieldKind`] or [`FunctionKind`].
pub trait MemberKind: sealed::Sealed + 'static {
    const NAME: &'static str;
    const TAG: MemberKindTag;

    type IsField: Bool;
    type IsFunction: Bool;
}

pub enum FieldKind {}
pub enum FunctionKind {}

impl MemberKind for FieldKind {
    const NAME: &'static str = "field";
    const TAG: MemberKindTag = MemberKindTag::Field;

    type IsField = True;
    type IsFunction = False;
}

impl MemberKind for FunctionKind {
    const NAME: &'static str = "function";
    const TAG: MemberKindTag = MemberKindTag::Function;

    type IsField = False;
    type IsFunction = True;
}

/// The value-level counterpart of [`MemberKind`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberKindTag {
    Field,
    Function,
}

// Descriptors

/// What every member knows about itself.
pub trait MemberDescriptor: Copy + Default + Send + Sync + 'static {
    type Declarer: Reflect;
    type Kind: MemberKind;
    /// [`True`] for functions tagged with [`Property`](crate::attr::Property).
    type IsProperty: Bool;

    const INDEX: usize;
    const NAME: &'static str;
    /// Fields are readable. A property is readable when it borrows `self` immutably, takes no
    /// arguments and returns a value.
    const READABLE: bool;
    /// Fields are writable. A property is writable when it borrows `self` mutably and takes
    /// exactly one argument.
    const WRITABLE: bool;

    /// The name to show to people: a property's friendly name, or its accessor name without the
    /// `get`/`set` prefix. Other members use their declared name.
    fn display_name() -> &'static str;

    fn attributes() -> &'static AttributeList;

    /// `Declarer::member`, for diagnostics.
    fn debug_name() -> String {
        format!("{}::{}", <Self::Declarer as Reflect>::name(), Self::NAME)
    }

    fn declarer() -> TypeDescriptor<Self::Declarer> {
        TypeDescriptor::new()
    }

    fn is_property() -> bool {
        <Self::IsProperty as Bool>::VALUE
    }

    fn has_attribute<A: Attribute>() -> bool {
        Self::attributes().contains::<A>()
    }

    fn get_attribute<A: Attribute>() -> Option<&'static A> {
        Self::attributes().get::<A>()
    }

    /// The erased description of this member. `None` only for a hand-written descriptor that is
    /// missing from its declarer's `Members` list.
    fn info() -> Option<&'static MemberInfo> {
        let table = <Self::Declarer as Reflect>::member_table();
        table.info_of::<Self>()
    }

    /// Double dispatch into the visitor method for this member's kind.
    fn accept<V: MemberVisitor<Self::Declarer>>(visitor: &mut V) -> ControlFlow<()>;
}

pub trait FieldDescriptor: MemberDescriptor<Kind = FieldKind, IsProperty = False> {
    type Value: 'static;

    fn get(target: &Self::Declarer) -> &Self::Value;

    fn get_mut(target: &mut Self::Declarer) -> &mut Self::Value;

    fn set(target: &mut Self::Declarer, value: Self::Value) {
        *Self::get_mut(target) = value;
    }

    /// A copy of the value, if the field's type is `Clone`.
    fn clone_value(target: &Self::Declarer) -> Option<Self::Value>;

    fn fmt_value(value: &Self::Value, out: &mut DebugWriter<'_>) -> fmt::Result;
}

pub trait FunctionDescriptor: MemberDescriptor<Kind = FunctionKind> {
    type Receiver: ReceiverKind;
    /// The arguments after the receiver, as a tuple.
    type Args: 'static;
    type Output: 'static;

    fn call(
        receiver: <Self::Receiver as ReceiverKind>::Receiver<'_, Self::Declarer>,
        args: Self::Args,
    ) -> Self::Output;

    fn fmt_output(value: &Self::Output, out: &mut DebugWriter<'_>) -> fmt::Result;
}

// Per-index impls

// A crate using `reflect_type!` cannot implement `MemberDescriptor` for `Member<_, Point, 0>`:
// `Member` is ours, so the impl would be an orphan. The macro implements these traits for the
// declaring type instead, which is local to that crate, and the blanket impls below lift them onto
// the member identities.

#[doc(hidden)]
pub trait FieldAt<const I: usize>: Reflect {
    type Value: 'static;

    const FIELD_NAME: &'static str;

    fn field_attributes() -> &'static AttributeList;

    fn field_ref(target: &Self) -> &Self::Value;

    fn field_mut(target: &mut Self) -> &mut Self::Value;

    fn clone_field(target: &Self) -> Option<Self::Value>;

    fn fmt_field(value: &Self::Value, out: &mut DebugWriter<'_>) -> fmt::Result;
}

#[doc(hidden)]
pub trait FunctionAt<const I: usize>: Reflect {
    type IsProperty: Bool;
    type Receiver: ReceiverKind;
    type Args: 'static;
    type Output: 'static;

    const FUNCTION_NAME: &'static str;
    const FUNCTION_READABLE: bool;
    const FUNCTION_WRITABLE: bool;

    fn function_display_name() -> &'static str;

    fn function_attributes() -> &'static AttributeList;

    fn call_function(
        receiver: <Self::Receiver as ReceiverKind>::Receiver<'_, Self>,
        args: Self::Args,
    ) -> Self::Output;

    fn fmt_function_output(value: &Self::Output, out: &mut DebugWriter<'_>) -> fmt::Result;
}

impl<T: FieldAt<I>, const I: usize> MemberDescriptor for Member<FieldKind, T, I> {
    type Declarer = T;
    type Kind = FieldKind;
    type IsProperty = False;

    const INDEX: usize = I;
    const NAME: &'static str = T::FIELD_NAME;
    const READABLE: bool = true;
    const WRITABLE: bool = true;

    fn display_name() -> &'static str {
        T::FIELD_NAME
    }

    fn attributes() -> &'static AttributeList {
        T::field_attributes()
    }

    fn accept<V: MemberVisitor<T>>(visitor: &mut V) -> ControlFlow<()> {
        visitor.visit_field::<Self>()
    }
}

impl<T: FieldAt<I>, const I: usize> FieldDescriptor for Member<FieldKind, T, I> {
    type Value = T::Value;

    fn get(target: &T) -> &T::Value {
        T::field_ref(target)
    }

    fn get_mut(target: &mut T) -> &mut T::Value {
        T::field_mut(target)
    }

    fn clone_value(target: &T) -> Option<T::Value> {
        T::clone_field(target)
    }

    fn fmt_value(value: &T::Value, out: &mut DebugWriter<'_>) -> fmt::Result {
        T::fmt_field(value, out)
    }
}

impl<T: FunctionAt<I>, const I: usize> MemberDescriptor for Member<FunctionKind, T, I> {
    type Declarer = T;
    type Kind = FunctionKind;
    type IsProperty = <T as FunctionAt<I>>::IsProperty;

    const INDEX: usize = I;
    const NAME: &'static str = T::FUNCTION_NAME;
    const READABLE: bool = T::FUNCTION_READABLE;
    const WRITABLE: bool = T::FUNCTION_WRITABLE;

    fn display_name() -> &'static str {
        T::function_display_name()
    }

    fn attributes() -> &'static AttributeList {
        T::function_attributes()
    }

    fn accept<V: MemberVisitor<T>>(visitor: &mut V) -> ControlFlow<()> {
        visitor.visit_function::<Self>()
    }
}

impl<T: FunctionAt<I>, const I: usize> FunctionDescriptor for Member<FunctionKind, T, I> {
    type Receiver = <T as FunctionAt<I>>::Receiver;
    type Args = <T as FunctionAt<I>>::Args;
    type Output = <T as FunctionAt<I>>::Output;

    fn call(
        receiver: <Self::Receiver as ReceiverKind>::Receiver<'_, T>,
        args: Self::Args,
    ) -> Self::Output {
        T::call_function(receiver, args)
    }

    fn fmt_output(value: &Self::Output, out: &mut DebugWriter<'_>) -> fmt::Result {
        T::fmt_function_output(value, out)
    }
}

// Receivers

/// Access to an instance of `T` held by type-erased callers, which do not know in advance which
/// kind of receiver a function wants.
pub enum Instance<'a, T> {
    Ref(&'a T),
    Mut(&'a mut T),
}

impl<T> Instance<'_, T> {
    pub fn get(&self) -> &T {
        match self {
            Instance::Ref(target) => target,
            Instance::Mut(target) => target,
        }
    }

    /// `None` for a shared instance.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Instance::Ref(_) => None,
            Instance::Mut(target) => Some(&mut **target),
        }
    }
}

/// How a reflected function takes its receiver.
pub trait ReceiverKind: sealed::Sealed + 'static {
    const NAME: &'static str;

    type Receiver<'a, T: 'a>;

    /// Borrows the receiver this kind needs out of `instance`, or `None` if the instance cannot
    /// provide it (a `&mut self` method called through a shared reference).
    fn borrow_from<'b, T>(instance: &'b mut Instance<'_, T>) -> Option<Self::Receiver<'b, T>>;
}

/// `&self`
pub enum ByRef {}
/// `&mut self`
pub enum ByMut {}
/// No receiver.
pub enum Static {}

impl ReceiverKind for ByRef {
    const NAME: &'static str = "&self";

    type Receiver<'a, T: 'a> = &'a T;

    fn borrow_from<'b, T>(instance: &'b mut Instance<'_, T>) -> Option<&'b T> {
        Some(instance.get())
    }
}

impl ReceiverKind for ByMut {
    const NAME: &'static str = "&mut self";

    type Receiver<'a, T: 'a> = &'a mut T;

    fn borrow_from<'b, T>(instance: &'b mut Instance<'_, T>) -> Option<&'b mut T> {
        instance.get_mut()
    }
}

impl ReceiverKind for Static {
    const NAME: &'static str = "static";

    type Receiver<'a, T: 'a> = ();

    fn borrow_from<'b, T>(_instance: &'b mut Instance<'_, T>) -> Option<()> {
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_type_eq_all;

    use super::*;
    use crate::{reflect_type, type_list};

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Counter {
        count: u32,
        label: String,
    }

    impl Counter {
        fn get_count(&self) -> u32 {
            self.count
        }

        fn set_count(&mut self, count: u32) {
            self.count = count;
        }

        fn bump(&mut self) {
            self.count += 1;
        }

        fn zero() -> Counter {
            Counter::default()
        }
    }

    reflect_type! {
        pub Counter {
            fields {
                count: u32,
                label: String,
            }
            functions {
                #[property]
                fn get_count(&self) -> u32;
                #[property]
                fn set_count(&mut self, count: u32);
                fn bump(&mut self);
                fn zero() -> Counter;
            }
        }
    }

    #[test]
    fn indices_follow_declaration_order() {
        assert_eq!(<Field<Counter, 0>>::NAME, "count");
        assert_eq!(<Field<Counter, 1>>::NAME, "label");
        assert_eq!(<Function<Counter, 2>>::NAME, "bump");
        assert_eq!(<Function<Counter, 3> as MemberDescriptor>::INDEX, 3);
        assert_eq!(Field::<Counter, 1>::new().name(), "label");
    }

    #[test]
    fn fields_are_typed() {
        assert_type_eq_all!(<Field<Counter, 0> as FieldDescriptor>::Value, u32);
        assert_type_eq_all!(<Field<Counter, 1> as FieldDescriptor>::Value, String);

        let mut counter = Counter::default();
        <Field<Counter, 0>>::set(&mut counter, 4);
        *<Field<Counter, 1>>::get_mut(&mut counter) = "hits".to_string();
        assert_eq!(*<Field<Counter, 0>>::get(&counter), 4);
        assert_eq!(counter.label, "hits");
        assert_eq!(<Field<Counter, 1>>::clone_value(&counter).as_deref(), Some("hits"));
    }

    #[test]
    fn functions_are_called_through_their_receiver() {
        assert_type_eq_all!(<Function<Counter, 0> as FunctionDescriptor>::Receiver, ByRef);
        assert_type_eq_all!(<Function<Counter, 1> as FunctionDescriptor>::Args, (u32,));
        assert_type_eq_all!(<Function<Counter, 3> as FunctionDescriptor>::Receiver, Static);

        let mut counter = Counter::default();
        <Function<Counter, 1>>::call(&mut counter, (7,));
        <Function<Counter, 2>>::call(&mut counter, ());
        assert_eq!(<Function<Counter, 0>>::call(&counter, ()), 8);
        assert_eq!(<Function<Counter, 3>>::call((), ()), Counter::default());
    }

    #[test]
    fn readable_writable_and_display_names() {
        type Getter = Function<Counter, 0>;
        type Setter = Function<Counter, 1>;
        type Bump = Function<Counter, 2>;

        assert!(Getter::READABLE && !Getter::WRITABLE);
        assert!(Setter::WRITABLE && !Setter::READABLE);
        assert!(!Bump::READABLE && !Bump::WRITABLE);
        assert!(<Field<Counter, 0>>::READABLE && <Field<Counter, 0>>::WRITABLE);

        assert_eq!(Getter::display_name(), "count");
        assert_eq!(Setter::display_name(), "count");
        assert_eq!(Bump::display_name(), "bump");
        assert_eq!(Getter::debug_name(), format!("{}::get_count", Counter::NAME));
    }

    #[test]
    fn receivers_borrow_from_instances() {
        let mut value = 3u8;
        let mut shared = Instance::Ref(&value);
        assert_eq!(ByRef::borrow_from(&mut shared).copied(), Some(3));
        assert!(ByMut::borrow_from(&mut shared).is_none());
        assert!(Static::borrow_from(&mut shared).is_some());

        let mut unique = Instance::Mut(&mut value);
        if let Some(target) = ByMut::borrow_from(&mut unique) {
            *target = 9;
        }
        assert_eq!(value, 9);
    }

    #[test]
    fn kinds_are_type_level_booleans() {
        assert_type_eq_all!(<FieldKind as MemberKind>::IsField, True);
        assert_type_eq_all!(<FunctionKind as MemberKind>::IsField, False);
        assert_type_eq_all!(
            <Counter as Reflect>::Fields,
            type_list![Field<Counter, 0>, Field<Counter, 1>]
        );
    }
}
