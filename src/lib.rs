#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

/*!

# Layout

The crate is layered; each module only depends on the ones above it.

1. [`typelist`]: heterogeneous compile-time lists of types and their algebra.
2. [`queries`]: type-level booleans, predicates and mappers over those lists, plus the
   `is_*!` probes for concrete types.
3. [`member`]: the identity of a reflected member and the descriptor traits.
4. [`descriptor`] and [`attr`]: [`Reflect`], [`TypeDescriptor`], erased [`TypeInfo`], and
   usage-checked attributes.
5. [`proxy`]: types that stand in for a reflected type member by member.
6. [`runtime`]: access by name, iteration over members, and a generic debug printer.

[`registry`], [`hashing`], [`const_string`] and [`error`] support the layers. Everything a
reflected type needs is generated by [`reflect_type!`].

## Correctness via macro

Rust's orphan rules stop this crate from writing impls on behalf of client types, and nothing can
require client code to write them correctly. [`reflect_type!`] closes the gap by generating every
impl in the client crate, so a reflected type is exactly as correct as the macro.

*/

pub mod attr;
pub mod const_string;
pub mod descriptor;
pub mod error;
pub mod hashing;
pub mod macros;
pub mod member;
pub mod proxy;
pub mod queries;
pub mod registry;
pub mod runtime;
pub mod typelist;

pub use descriptor::{Reflect, TypeDescriptor, TypeInfo, reflect};
pub use error::{ReflectError, Result};
pub use member::{Field, Function};

// Re-exported for use in exported macros
pub use ctor;
pub use paste;
