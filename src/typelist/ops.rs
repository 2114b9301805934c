/*!

# The Type-List Algebra

Every operation is a trait implemented by [`Nil`] and/or [`Cons`], with the result in an associated
`Output` type, plus a type alias that names the result directly. The aliases are what you normally
write; the traits are what you put in `where` clauses when writing generic code over lists.

Operations that have no answer for some input are *missing an impl* for that input. For example
[`Get`] has no implementation for [`Nil`], so `At<type_list![u8], N1>` is rejected by the compiler:

```compile_fail
use static_reflect::{type_list, typelist::{At, N1}};

type OutOfBounds = At<type_list![u8], N1>;
fn out_of_bounds() -> OutOfBounds { unimplemented!() }
```

*/

use super::{
    Cons, Nil, TypeList,
    nat::{Here, Position, S, There, Z},
};
use crate::queries::{Bool, Mapper, Predicate};

// Concatenation

/// Order-preserving concatenation with `R`.
pub trait Concat<R> {
    type Output;
}

impl<R> Concat<R> for Nil {
    type Output = R;
}

impl<H, T: Concat<R>, R> Concat<R> for Cons<H, T> {
    type Output = Cons<H, T::Output>;
}

pub type Concatenated<A, B> = <A as Concat<B>>::Output;

/// `L` followed by the single element `T`.
pub type Appended<L, T> = Concatenated<L, Cons<T, Nil>>;

/// The single element `T` followed by `L`.
pub type Prepended<L, T> = Cons<T, L>;

/// Concatenates a list of lists.
pub trait Flatten {
    type Output;
}

impl Flatten for Nil {
    type Output = Nil;
}

impl<H, T> Flatten for Cons<H, T>
where
    T: Flatten,
    H: Concat<T::Output>,
{
    type Output = Concatenated<H, T::Output>;
}

pub type Flattened<L> = <L as Flatten>::Output;

// Filter and map

/// Keeps the elements for which the predicate `P` holds, preserving their relative order.
pub trait Filter<P> {
    type Output;
}

impl<P> Filter<P> for Nil {
    type Output = Nil;
}

impl<P, H, T> Filter<P> for Cons<H, T>
where
    P: Predicate<H>,
    T: Filter<P>,
{
    type Output = <P::Output as Bool>::Select<Cons<H, T::Output>, T::Output>;
}

pub type Filtered<L, P> = <L as Filter<P>>::Output;

/// Replaces every element `E` with `<M as Mapper<E>>::Output`.
pub trait Map<M> {
    type Output;
}

impl<M> Map<M> for Nil {
    type Output = Nil;
}

impl<M, H, T> Map<M> for Cons<H, T>
where
    M: Mapper<H>,
    T: Map<M>,
{
    type Output = Cons<M::Output, T::Output>;
}

pub type Mapped<L, M> = <L as Map<M>>::Output;

// Access

/// Zero-based random access. There is no impl past the end of the list.
pub trait Get<N> {
    type Output;
}

impl<H, T> Get<Z> for Cons<H, T> {
    type Output = H;
}

impl<H, T: Get<N>, N> Get<S<N>> for Cons<H, T> {
    type Output = T::Output;
}

pub type At<L, N> = <L as Get<N>>::Output;

/// Drops the first `N` elements. Skipping exactly `LEN` elements yields [`Nil`]; skipping more does
/// not compile.
pub trait Skip<N> {
    type Output;
}

impl<L: TypeList> Skip<Z> for L {
    type Output = L;
}

impl<H, T: Skip<N>, N> Skip<S<N>> for Cons<H, T> {
    type Output = T::Output;
}

pub type Skipped<L, N> = <L as Skip<N>>::Output;

pub trait First {
    type Output;
}

impl<H, T> First for Cons<H, T> {
    type Output = H;
}

pub type FirstOf<L> = <L as First>::Output;

pub trait Last {
    type Output;
}

impl<H> Last for Cons<H, Nil> {
    type Output = H;
}

impl<H, H2, T> Last for Cons<H, Cons<H2, T>>
where
    Cons<H2, T>: Last,
{
    type Output = <Cons<H2, T> as Last>::Output;
}

pub type LastOf<L> = <L as Last>::Output;

/// Everything but the first element.
pub trait Tail {
    type Output;
}

impl<H, T> Tail for Cons<H, T> {
    type Output = T;
}

pub type TailOf<L> = <L as Tail>::Output;

/// Everything but the last element.
pub trait Init {
    type Output;
}

impl<H> Init for Cons<H, Nil> {
    type Output = Nil;
}

impl<H, H2, T> Init for Cons<H, Cons<H2, T>>
where
    Cons<H2, T>: Init,
{
    type Output = Cons<H, <Cons<H2, T> as Init>::Output>;
}

pub type InitOf<L> = <L as Init>::Output;

// Reversal

/// Reverses `Self` onto the front of `Acc`.
pub trait ReverseOnto<Acc> {
    type Output;
}

impl<Acc> ReverseOnto<Acc> for Nil {
    type Output = Acc;
}

impl<H, T, Acc> ReverseOnto<Acc> for Cons<H, T>
where
    T: ReverseOnto<Cons<H, Acc>>,
{
    type Output = T::Output;
}

pub type Reversed<L> = <L as ReverseOnto<Nil>>::Output;

// Selectors

/// Selects the element equal to `T`. The position witness `I` is left to inference, so a lookup
/// of an absent type fails to compile, and a lookup of a type present twice is ambiguous.
pub trait IndexOf<T, I> {}

impl<T, Tl> IndexOf<T, Here> for Cons<T, Tl> {}

impl<H, Tl, T, I> IndexOf<T, There<I>> for Cons<H, Tl> where Tl: IndexOf<T, I> {}

/// The position of `T` in `L`, computed by trait selection:
///
/// ```
/// use static_reflect::{type_list, typelist::index_of};
///
/// assert_eq!(index_of::<u16, type_list![u8, u16, u32], _>(), 1);
/// ```
///
/// ```compile_fail
/// use static_reflect::{type_list, typelist::index_of};
///
/// let _ = index_of::<i64, type_list![u8, u16, u32], _>();
/// ```
pub fn index_of<T, L, I>() -> usize
where
    L: IndexOf<T, I>,
    I: Position,
{
    I::VALUE
}

/// A family of generic types, named by a marker type. `Vec` would be one family, `Option` another.
/// Rust has no higher-kinded types, so membership is declared through [`InstanceOf`].
pub trait Template: 'static {}

/// Declares that `Self` is an instantiation of the family `F`.
pub trait InstanceOf<F: Template> {}

/// The family of type lists: every [`Nil`] and [`Cons`] is an instance of it.
pub struct TypeListTemplate;

impl Template for TypeListTemplate {}
impl InstanceOf<TypeListTemplate> for Nil {}
impl<H, T> InstanceOf<TypeListTemplate> for Cons<H, T> {}

/// Selects the element that is an instance of the family `F`. As with [`IndexOf`], the lookup is
/// ambiguous when more than one element qualifies.
pub trait IndexOfInstance<F, I> {}

impl<F: Template, H: InstanceOf<F>, Tl> IndexOfInstance<F, Here> for Cons<H, Tl> {}

impl<F, H, Tl, I> IndexOfInstance<F, There<I>> for Cons<H, Tl> where Tl: IndexOfInstance<F, I> {}

/// The position of the element of `L` that instantiates `F`. Fails to compile if there is none.
pub fn index_of_instance<F, L, I>() -> usize
where
    L: IndexOfInstance<F, I>,
    I: Position,
{
    I::VALUE
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_type_eq_all;

    use super::*;
    use crate::{
        concat_lists,
        queries::{Always, False, Never, True},
        type_list,
        typelist::nat::{N0, N1, N2, N3},
    };

    type L = type_list![u8, u16, u32];

    struct IsUnsigned;
    impl Predicate<u8> for IsUnsigned {
        type Output = True;
    }
    impl Predicate<u16> for IsUnsigned {
        type Output = True;
    }
    impl Predicate<i16> for IsUnsigned {
        type Output = False;
    }

    struct Boxed;
    impl<T> Mapper<T> for Boxed {
        type Output = Box<T>;
    }

    #[test]
    fn concatenation_with_nil_is_identity() {
        assert_type_eq_all!(Concatenated<L, Nil>, L);
        assert_type_eq_all!(Concatenated<Nil, L>, L);
        assert_type_eq_all!(Concatenated<Nil, Nil>, Nil);
    }

    #[test]
    fn concatenation_is_associative() {
        type A = type_list![u8];
        type B = type_list![u16, u32];
        type C = type_list![u64];
        assert_type_eq_all!(
            Concatenated<Concatenated<A, B>, C>,
            Concatenated<A, Concatenated<B, C>>,
            concat_lists![A, B, C],
            type_list![u8, u16, u32, u64]
        );
    }

    #[test]
    fn append_and_prepend_add_single_elements() {
        assert_type_eq_all!(Appended<L, u64>, type_list![u8, u16, u32, u64]);
        assert_type_eq_all!(Prepended<L, i8>, type_list![i8, u8, u16, u32]);
        assert_type_eq_all!(Appended<Nil, u8>, Prepended<Nil, u8>);
    }

    #[test]
    fn flatten_concatenates_nested_lists() {
        type Nested = type_list![type_list![u8], Nil, type_list![u16, u32]];
        assert_type_eq_all!(Flattened<Nested>, L);
    }

    #[test]
    fn filter_keeps_matching_elements_in_order() {
        assert_type_eq_all!(Filtered<L, Always>, L);
        assert_type_eq_all!(Filtered<L, Never>, Nil);
        assert_type_eq_all!(
            Filtered<type_list![u8, i16, u16], IsUnsigned>,
            type_list![u8, u16]
        );
    }

    #[test]
    fn map_preserves_length_and_order() {
        assert_type_eq_all!(Mapped<L, Boxed>, type_list![Box<u8>, Box<u16>, Box<u32>]);
        assert_type_eq_all!(Mapped<Nil, Boxed>, Nil);
    }

    #[test]
    fn get_returns_declared_element() {
        assert_type_eq_all!(At<L, N0>, u8);
        assert_type_eq_all!(At<L, N1>, u16);
        assert_type_eq_all!(At<L, N2>, u32);
    }

    #[test]
    fn skip_drops_a_prefix() {
        assert_type_eq_all!(Skipped<L, N0>, L);
        assert_type_eq_all!(Skipped<L, N2>, type_list![u32]);
        assert_type_eq_all!(Skipped<L, N3>, Nil);
    }

    #[test]
    fn ends_of_the_list() {
        assert_type_eq_all!(FirstOf<L>, u8);
        assert_type_eq_all!(LastOf<L>, u32);
        assert_type_eq_all!(TailOf<L>, type_list![u16, u32]);
        assert_type_eq_all!(InitOf<L>, type_list![u8, u16]);
        assert_type_eq_all!(InitOf<type_list![u8]>, Nil);
    }

    #[test]
    fn reverse_is_involutive() {
        assert_type_eq_all!(Reversed<L>, type_list![u32, u16, u8]);
        assert_type_eq_all!(Reversed<Reversed<L>>, L);
        assert_type_eq_all!(Reversed<Nil>, Nil);
    }

    #[test]
    fn selectors_find_positions() {
        assert_eq!(index_of::<u8, L, _>(), 0);
        assert_eq!(index_of::<u32, L, _>(), 2);
        type Mixed = type_list![u8, Nil, u16];
        assert_eq!(index_of_instance::<TypeListTemplate, Mixed, _>(), 1);
    }
}
