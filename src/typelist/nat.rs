//! Peano naturals for indexing type lists, and the position witnesses produced by selector traits.
//!
//! Const generics can name an index but cannot count down (`N - 1` in a generic position needs
//! `generic_const_exprs`), so indices into a type list are spelled in unary: `S<S<Z>>` is 2.
//! The aliases `N0` through `N15` cover the common cases.

use std::marker::PhantomData;

/// Zero.
#[derive(Copy, Clone, Default, Debug)]
pub struct Z;

/// The successor of `N`.
pub struct S<N>(PhantomData<N>);

pub trait Nat {
    const VALUE: usize;
}

impl Nat for Z {
    const VALUE: usize = 0;
}

impl<N: Nat> Nat for S<N> {
    const VALUE: usize = N::VALUE + 1;
}

pub type N0 = Z;
pub type N1 = S<N0>;
pub type N2 = S<N1>;
pub type N3 = S<N2>;
pub type N4 = S<N3>;
pub type N5 = S<N4>;
pub type N6 = S<N5>;
pub type N7 = S<N6>;
pub type N8 = S<N7>;
pub type N9 = S<N8>;
pub type N10 = S<N9>;
pub type N11 = S<N10>;
pub type N12 = S<N11>;
pub type N13 = S<N12>;
pub type N14 = S<N13>;
pub type N15 = S<N14>;

/// Witness that the element sought by a selector trait is the head of the list.
pub struct Here;

/// Witness that the element sought by a selector trait is somewhere in the tail, at position `I`.
pub struct There<I>(PhantomData<I>);

/// A position witness. Selector traits leave the witness to inference; reading its `VALUE` turns
/// it back into a number.
pub trait Position {
    const VALUE: usize;
}

impl Position for Here {
    const VALUE: usize = 0;
}

impl<I: Position> Position for There<I> {
    const VALUE: usize = I::VALUE + 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naturals_count_successors() {
        assert_eq!(N0::VALUE, 0);
        assert_eq!(N3::VALUE, 3);
        assert_eq!(N15::VALUE, 15);
    }

    #[test]
    fn positions_count_steps_into_the_tail() {
        assert_eq!(<Here as Position>::VALUE, 0);
        assert_eq!(<There<There<Here>> as Position>::VALUE, 2);
    }
}
