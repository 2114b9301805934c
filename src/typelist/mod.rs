/*!

# Type-Level Lists

A type list is a sequence of types that exists only at compile time. It is spelled as a chain of
[`Cons`] cells terminated by [`Nil`]:

```rust,ignore
type Numbers = Cons<u8, Cons<u16, Cons<u32, Nil>>>;
// or, equivalently
type Numbers = type_list![u8, u16, u32];
```

Both [`Nil`] and [`Cons`] are zero-sized, so a list can be passed around as an ordinary value
(`Numbers::default()`) when it is convenient to let inference carry the type.

The operations of the algebra live in [`ops`] as traits with an associated `Output` type, each
paired with a type alias so that call sites read like function application:

| operation               | alias                         |
| ----------------------- | ----------------------------- |
| concatenation           | [`Concatenated<A, B>`]        |
| append / prepend        | [`Appended<L, T>`] / [`Prepended<L, T>`] |
| filter / map            | [`Filtered<L, P>`] / [`Mapped<L, M>`] |
| random access / drop    | [`At<L, N>`] / [`Skipped<L, N>`] |
| first / last / tail / init | [`FirstOf`] / [`LastOf`] / [`TailOf`] / [`InitOf`] |
| reversal                | [`Reversed<L>`]               |

An operation that has no answer (indexing past the end, taking the first element of an empty list)
simply has no implementation, so misuse is a compile error at the call site.

Stable Rust cannot decide whether two arbitrary types are equal at the type level. Membership
tests that need type equality therefore come in two forms:

- a *selector* form ([`index_of`], [`index_of_instance`]) that is resolved by trait selection and
  fails to compile when the type is absent, and
- a *token* form ([`TypeList::contains`], [`TokenList`]) that compares [`TypeId`]s. The comparison
  happens at runtime, but every input is a compile-time constant and the optimizer folds it away.

[`TypeId`]: std::any::TypeId

*/

use std::{fmt, marker::PhantomData};

pub mod nat;
pub mod ops;
pub mod tokens;

pub use nat::*;
pub use ops::*;
pub use tokens::{TokenList, TypeToken};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Nil {}
    impl<H, T: Sealed> Sealed for super::Cons<H, T> {}
}

/// The empty type list.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct Nil;

/// A non-empty type list: the head `H` followed by the list `T`.
///
/// The phantom is a function pointer so that `Cons` is `Send + Sync + Copy` no matter what `H` is.
pub struct Cons<H, T>(PhantomData<fn() -> (H, T)>);

impl<H, T> Cons<H, T> {
    pub const fn new() -> Self {
        Cons(PhantomData)
    }
}

impl<H, T> Copy for Cons<H, T> {}

impl<H, T> Clone for Cons<H, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H, T> Default for Cons<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, T> PartialEq for Cons<H, T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<H, T> Eq for Cons<H, T> {}

impl<H: 'static, T: TypeList> fmt::Debug for Cons<H, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(Self::tokens().iter().map(TypeToken::name))
            .finish()
    }
}

/// Something that visits the elements of a type list one type at a time.
///
/// Returning `false` from [`TypeVisitor::visit`] stops the walk.
pub trait TypeVisitor {
    fn visit<T: 'static>(&mut self, index: usize) -> bool;
}

/// Implemented by [`Nil`] and every [`Cons`] chain. The trait is sealed: no other type is a list.
pub trait TypeList: sealed::Sealed + Copy + Default + 'static {
    /// The number of elements.
    const LEN: usize;

    fn len(&self) -> usize {
        Self::LEN
    }

    fn is_empty(&self) -> bool {
        Self::LEN == 0
    }

    /// Walks the elements in order, stopping early if the visitor asks to. Returns `true` if the
    /// walk ran to completion.
    fn for_each<V: TypeVisitor>(visitor: &mut V) -> bool {
        Self::for_each_from(visitor, 0)
    }

    #[doc(hidden)]
    fn for_each_from<V: TypeVisitor>(visitor: &mut V, offset: usize) -> bool;

    /// The value-level mirror of this list.
    fn tokens() -> TokenList {
        struct Collect(Vec<TypeToken>);
        impl TypeVisitor for Collect {
            fn visit<T: 'static>(&mut self, _index: usize) -> bool {
                self.0.push(TypeToken::of::<T>());
                true
            }
        }

        let mut collect = Collect(Vec::with_capacity(Self::LEN));
        Self::for_each(&mut collect);
        TokenList::from(collect.0)
    }

    /// Is `T` one of the elements?
    fn contains<T: 'static>() -> bool {
        Self::position::<T>().is_some()
    }

    /// The position of the first element equal to `T`, if any. See [`index_of`] for the variant
    /// that fails to compile instead of returning `None`.
    fn position<T: 'static>() -> Option<usize> {
        struct Find {
            needle: TypeToken,
            found: Option<usize>,
        }
        impl TypeVisitor for Find {
            fn visit<U: 'static>(&mut self, index: usize) -> bool {
                if TypeToken::of::<U>() == self.needle {
                    self.found = Some(index);
                    return false;
                }
                true
            }
        }

        let mut find = Find {
            needle: TypeToken::of::<T>(),
            found: None,
        };
        Self::for_each(&mut find);
        find.found
    }

    /// The type names of the elements, in order. Convenient for debugging.
    fn type_names() -> Vec<&'static str> {
        Self::tokens().iter().map(TypeToken::name).collect()
    }
}

impl TypeList for Nil {
    const LEN: usize = 0;

    fn for_each_from<V: TypeVisitor>(_visitor: &mut V, _offset: usize) -> bool {
        true
    }
}

impl<H: 'static, T: TypeList> TypeList for Cons<H, T> {
    const LEN: usize = 1 + T::LEN;

    fn for_each_from<V: TypeVisitor>(visitor: &mut V, offset: usize) -> bool {
        visitor.visit::<H>(offset) && T::for_each_from(visitor, offset + 1)
    }
}

/// Spells a type list: `type_list![A, B, C]` is `Cons<A, Cons<B, Cons<C, Nil>>>`.
#[macro_export]
macro_rules! type_list {
    () => { $crate::typelist::Nil };
    ($head:ty $(, $tail:ty)* $(,)?) => {
        $crate::typelist::Cons<$head, $crate::type_list!($($tail),*)>
    };
}

/// Concatenates any number of type lists: `concat_lists![A, B, C]`.
#[macro_export]
macro_rules! concat_lists {
    () => { $crate::typelist::Nil };
    ($only:ty $(,)?) => { $only };
    ($head:ty, $($tail:ty),+ $(,)?) => {
        $crate::typelist::Concatenated<$head, $crate::concat_lists!($($tail),+)>
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_list;

    type Three = type_list![u8, u16, u32];

    #[test]
    fn length_counts_elements() {
        assert_eq!(<Nil as TypeList>::LEN, 0);
        assert_eq!(Three::LEN, 3);
        assert!(Nil.is_empty());
        assert_eq!(Three::default().len(), 3);
    }

    #[test]
    fn tokens_follow_declaration_order() {
        assert_eq!(Three::type_names(), vec!["u8", "u16", "u32"]);
    }

    #[test]
    fn contains_and_position_compare_type_ids() {
        assert!(Three::contains::<u16>());
        assert!(!Three::contains::<i16>());
        assert_eq!(Three::position::<u32>(), Some(2));
        assert_eq!(Nil::position::<u32>(), None);
    }

    #[test]
    fn for_each_stops_when_asked() {
        struct FirstTwo(Vec<usize>);
        impl TypeVisitor for FirstTwo {
            fn visit<T: 'static>(&mut self, index: usize) -> bool {
                self.0.push(index);
                index < 1
            }
        }

        let mut visitor = FirstTwo(vec![]);
        assert!(!Three::for_each(&mut visitor));
        assert_eq!(visitor.0, vec![0, 1]);
    }

    #[test]
    fn debug_lists_type_names() {
        assert_eq!(format!("{:?}", Three::default()), r#"["u8", "u16", "u32"]"#);
    }
}
