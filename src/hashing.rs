/*!

# Name Hashing

Member tables index members by name. The hash function and the table type used for that are
chosen here and nowhere else, so the rest of the crate only ever names [`NameHasher`],
[`hash_name`] and [`NameIndex`].

Names are short identifiers known at compile time, hashed once when a table is built and once
per lookup. XXH3 is fast on short inputs; the 128-bit digest is folded to the 64 bits
`hashbrown` wants.

*/

use std::hash::Hasher;

use hashbrown::HashTable;
use twox_hash::XxHash3_128;

/// A streaming XXH3 hasher.
pub struct NameHasher(XxHash3_128);

impl Default for NameHasher {
    fn default() -> Self {
        Self(XxHash3_128::new())
    }
}

impl Hasher for NameHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0.write(bytes);
    }

    fn finish(&self) -> u64 {
        let digest = self.0.finish_128();
        (digest as u64) ^ ((digest >> 64) as u64)
    }
}

/// The hash of a member name.
pub fn hash_name(name: &str) -> u64 {
    let mut hasher = NameHasher::default();
    hasher.write(name.as_bytes());
    hasher.finish()
}

/// Positions into a member slice, keyed by [`hash_name`] of the member's name.
pub type NameIndex = HashTable<usize>;

/// Adds `position` under `name` unless an earlier entry already has that name. Returns whether it
/// was added.
pub fn index_name<'a>(
    index: &mut NameIndex,
    name: &'a str,
    position: usize,
    name_at: impl Fn(usize) -> &'a str,
) -> bool {
    let hash = hash_name(name);
    if index.find(hash, |&existing| name_at(existing) == name).is_some() {
        return false;
    }
    index.insert_unique(hash, position, |&existing| hash_name(name_at(existing)));
    true
}

/// The position stored under `name`.
pub fn find_name<'a>(index: &NameIndex, name: &str, name_at: impl Fn(usize) -> &'a str) -> Option<usize> {
    index.find(hash_name(name), |&existing| name_at(existing) == name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_names() {
        assert_eq!(hash_name("x"), hash_name("x"));
        assert_ne!(hash_name("x"), hash_name("y"));
        assert_ne!(hash_name("get_x"), hash_name("set_x"));
    }

    #[test]
    fn first_name_wins() {
        let names = ["x", "y", "x"];
        let mut index = NameIndex::new();
        for (position, name) in names.iter().enumerate() {
            index_name(&mut index, name, position, |at| names[at]);
        }
        assert_eq!(index.len(), 2);
        assert_eq!(find_name(&index, "x", |at| names[at]), Some(0));
        assert_eq!(find_name(&index, "y", |at| names[at]), Some(1));
        assert_eq!(find_name(&index, "z", |at| names[at]), None);
    }
}
