/*!

# Type Tokens

A [`TypeToken`] is the runtime shadow of a type: its [`TypeId`] plus its name. A [`TokenList`] is an
immutable sequence of tokens and supports the parts of the algebra that need type equality, which
stable Rust cannot express at the type level: [`TokenList::unique`], [`TokenList::contains`],
[`TokenList::contains_base`], and friends.

A token can carry more than identity. One made by [`TypeToken::of_reflected`] knows the reflection
bases of its type, and one made by [`TypeToken::of_instance`] knows the [`Template`] family its
type belongs to. The base and family queries only see what the tokens carry, so their answers do
not depend on which types happen to be registered.

Like the type-level lists, a `TokenList` is never mutated; every operation returns a new list.

*/

use std::{
    any::{TypeId, type_name},
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    sync::Arc,
};

use hashbrown::HashSet;

use super::{InstanceOf, Template, TypeList};
use crate::descriptor::Reflect;

/// A type's identity and name.
#[derive(Copy, Clone)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
    /// The flattened reflection bases, for tokens of reflected types.
    bases: Option<fn() -> TokenList>,
    /// The family the type instantiates.
    family: Option<TypeId>,
}

impl TypeToken {
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeToken {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            bases: None,
            family: None,
        }
    }

    /// A token for a reflected type that also knows the type's reflection bases.
    pub fn of_reflected<T: Reflect>() -> Self {
        TypeToken {
            bases: Some(<T::Bases as TypeList>::tokens),
            ..Self::of::<T>()
        }
    }

    /// A token that also records that `T` instantiates the family `F`.
    pub fn of_instance<T: InstanceOf<F> + 'static, F: Template>() -> Self {
        TypeToken {
            family: Some(TypeId::of::<F>()),
            ..Self::of::<T>()
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Does this token stand for `T`?
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Is this token's type `T`, or does it declare `T` among its reflection bases?
    pub fn is_or_derives<T: ?Sized + 'static>(&self) -> bool {
        let wanted = TypeId::of::<T>();
        self.id == wanted || self.bases.is_some_and(|bases| bases().contains(wanted))
    }

    /// Was this token made by [`of_instance`](Self::of_instance) for the family `F`?
    pub fn is_instance_of<F: Template>(&self) -> bool {
        self.family == Some(TypeId::of::<F>())
    }
}

// Equality and hashing are by identity only; the name is informational.
impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl Hash for TypeToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An immutable, cheaply cloneable sequence of [`TypeToken`]s.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct TokenList(Arc<[TypeToken]>);

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[TypeToken] {
        &self.0
    }

    pub fn concat(&self, other: &TokenList) -> TokenList {
        self.iter().chain(other.iter()).copied().collect()
    }

    pub fn append(&self, token: TypeToken) -> TokenList {
        self.iter().copied().chain(Some(token)).collect()
    }

    pub fn prepend(&self, token: TypeToken) -> TokenList {
        Some(token).into_iter().chain(self.iter().copied()).collect()
    }

    pub fn filter(&self, mut predicate: impl FnMut(&TypeToken) -> bool) -> TokenList {
        self.iter().copied().filter(|token| predicate(token)).collect()
    }

    pub fn reverse(&self) -> TokenList {
        self.iter().rev().copied().collect()
    }

    /// Removes duplicates, keeping each token at the position of its first occurrence.
    pub fn unique(&self) -> TokenList {
        let mut seen = HashSet::with_capacity(self.len());
        self.iter().copied().filter(|token| seen.insert(token.id)).collect()
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn contains_type<T: ?Sized + 'static>(&self) -> bool {
        self.contains(TypeId::of::<T>())
    }

    pub fn index_of(&self, id: TypeId) -> Option<usize> {
        self.iter().position(|token| token.id == id)
    }

    pub fn index_of_type<T: ?Sized + 'static>(&self) -> Option<usize> {
        self.index_of(TypeId::of::<T>())
    }

    /// Is there an element that is `T` itself or declares `T` among its reflection bases?
    ///
    /// Only tokens made by [`TypeToken::of_reflected`] know their bases; any other element matches
    /// by identity alone.
    pub fn contains_base<T: ?Sized + 'static>(&self) -> bool {
        self.index_of_base::<T>().is_some()
    }

    /// The position of the first element that is `T` or has `T` as a reflection base.
    pub fn index_of_base<T: ?Sized + 'static>(&self) -> Option<usize> {
        self.iter().position(TypeToken::is_or_derives::<T>)
    }

    /// Is there an element whose token records it as an instance of the family `F`?
    pub fn contains_instance<F: Template>(&self) -> bool {
        self.index_of_instance::<F>().is_some()
    }

    /// The position of the first element recorded as an instance of `F`.
    pub fn index_of_instance<F: Template>(&self) -> Option<usize> {
        self.iter().position(TypeToken::is_instance_of::<F>)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(TypeToken::name).collect()
    }
}

impl Deref for TokenList {
    type Target = [TypeToken];

    fn deref(&self) -> &[TypeToken] {
        &self.0
    }
}

impl From<Vec<TypeToken>> for TokenList {
    fn from(tokens: Vec<TypeToken>) -> Self {
        TokenList(tokens.into())
    }
}

impl FromIterator<TypeToken> for TokenList {
    fn from_iter<I: IntoIterator<Item = TypeToken>>(iter: I) -> Self {
        TokenList(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a TypeToken;
    type IntoIter = std::slice::Iter<'a, TypeToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Debug for TokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{reflect_type, type_list, typelist::TypeListTemplate};

    fn tokens<L: TypeList>() -> TokenList {
        L::tokens()
    }

    #[test]
    fn unique_keeps_first_occurrence() {
        let list = tokens::<type_list![u8, u16, u8, u32, u16]>();
        let unique = list.unique();
        assert_eq!(unique.names(), vec!["u8", "u16", "u32"]);
    }

    #[test]
    fn unique_is_idempotent() {
        let list = tokens::<type_list![u8, u8, i8, u8]>();
        assert_eq!(list.unique().unique(), list.unique());
    }

    #[test]
    fn operations_return_new_lists() {
        let list = tokens::<type_list![u8, u16]>();
        let longer = list.append(TypeToken::of::<u32>());
        assert_eq!(list.len(), 2);
        assert_eq!(longer.names(), vec!["u8", "u16", "u32"]);
        assert_eq!(longer.reverse().reverse(), longer);
        assert_eq!(list.prepend(TypeToken::of::<i8>()).names(), vec!["i8", "u8", "u16"]);
        assert_eq!(list.concat(&TokenList::new()), list);
        assert_eq!(TokenList::new().concat(&list), list);
    }

    #[test]
    fn filter_and_membership() {
        let list = tokens::<type_list![u8, String, u16]>();
        let numbers = list.filter(|token| !token.is::<String>());
        assert_eq!(numbers.names(), vec!["u8", "u16"]);
        assert!(list.contains_type::<String>());
        assert!(!numbers.contains_type::<String>());
        assert_eq!(list.index_of_type::<u16>(), Some(2));
        assert_eq!(list.index_of_type::<i64>(), None);
    }

    #[test]
    fn contains_base_matches_identity_for_plain_tokens() {
        let list = tokens::<type_list![u8, u16]>();
        assert!(list.contains_base::<u16>());
        assert_eq!(list.index_of_base::<u16>(), Some(1));
        assert!(!list.contains_base::<u32>());
    }

    #[derive(Default)]
    pub struct Root;

    #[derive(Default)]
    pub struct Stem;

    #[derive(Default)]
    pub struct Leaf;

    reflect_type! { pub Root {} }
    reflect_type! { #[base_types(Root)] pub Stem {} }
    reflect_type! { #[base_types(Stem)] pub Leaf {} }

    #[test]
    fn reflected_tokens_match_their_bases() {
        let list: TokenList = vec![TypeToken::of::<u8>(), TypeToken::of_reflected::<Leaf>()].into();
        assert_eq!(list.index_of_base::<Leaf>(), Some(1));
        assert_eq!(list.index_of_base::<Stem>(), Some(1));
        assert_eq!(list.index_of_base::<Root>(), Some(1));
        assert!(!list.contains_base::<u16>());

        // The same types without base information only match by identity.
        let plain: TokenList = vec![TypeToken::of::<u8>(), TypeToken::of::<Leaf>()].into();
        assert!(!plain.contains_base::<Root>());
        assert!(plain.contains_base::<Leaf>());
    }

    #[test]
    fn instance_tokens_match_their_family() {
        let list: TokenList = vec![
            TypeToken::of::<u8>(),
            TypeToken::of_instance::<type_list![u16], TypeListTemplate>(),
        ]
        .into();
        assert!(list.contains_instance::<TypeListTemplate>());
        assert_eq!(list.index_of_instance::<TypeListTemplate>(), Some(1));
        assert!(!tokens::<type_list![u8, u16]>().contains_instance::<TypeListTemplate>());
        assert!(!TokenList::new().contains_instance::<TypeListTemplate>());
    }
}
