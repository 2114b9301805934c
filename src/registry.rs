/*!

# The Type Registry

Every reflected type is recorded in a process-wide registry, so that code holding only a
[`TypeId`] or a type name can still reach the type's [`TypeInfo`].

Each registered type is given an *index*, assigned once at runtime, in registration order, and
never changed. The index lives in an `AtomicUsize` owned by the type (see
[`Reflect::registry_index`]); `usize::MAX` marks it unassigned, and [`initialize_type_index`]
hands out the next number under a global lock so that two threads racing to register the same
type agree on one index.

## When types are registered

With the `registry` feature (on by default) `reflect_type!` emits a `#[ctor]` function per
non-generic type that calls [`add_to_registry`] before `main()` runs. The usual caveats of "run
before main" apply: order is unspecified, and some linker configurations drop the constructors.

Everything else joins the registry the first time its [`TypeInfo`] is asked for through
[`info_for`]: each instantiation of a generic type, and without the feature every type.

## Per-type statics

A generic item cannot declare a `static` that mentions its parameters, yet each instantiation of a
generic reflected type needs its own member table, attribute lists and index. [`type_static`]
keeps them in one global map keyed by `TypeId`, and the code `reflect_type!` generates goes
through it for generic and non-generic types alike.

[`Reflect::registry_index`]: crate::descriptor::Reflect::registry_index
[`info_for`]: crate::descriptor::info_for

*/

use std::{
    any::{Any, TypeId},
    sync::{
        LazyLock, Mutex, PoisonError, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use hashbrown::HashMap;
use log::debug;

use crate::{
    descriptor::{Reflect, TypeInfo, static_info},
    error::{ReflectError, Result},
};

/// The index the next type to ask for one will get. Equivalently, the number of types with an
/// index.
static NEXT_TYPE_INDEX: Mutex<usize> = Mutex::new(0);

static REGISTERED_TYPES: LazyLock<RwLock<HashMap<TypeId, &'static TypeInfo>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

type StaticStore = HashMap<(TypeId, TypeId), &'static (dyn Any + Send + Sync)>;

/// Values created by [`type_static`], keyed by the key type and the value type.
static TYPE_STATICS: LazyLock<RwLock<StaticStore>> = LazyLock::new(|| RwLock::new(HashMap::new()));

/// The `V` belonging to the type `K`, created by `init` the first time it is asked for and never
/// dropped.
///
/// `init` runs with the store unlocked, so it may ask for other entries. When two threads race to
/// create the same entry, both run `init`, the first to finish wins and the other value is dropped.
pub fn type_static<K: ?Sized + 'static, V: Send + Sync + 'static>(init: impl FnOnce() -> V) -> &'static V {
    let key = (TypeId::of::<K>(), TypeId::of::<V>());

    let found = TYPE_STATICS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .copied();
    if let Some(value) = found {
        return downcast_static(value);
    }

    let value = init();
    let mut statics = TYPE_STATICS.write().unwrap_or_else(PoisonError::into_inner);
    let stored = *statics
        .entry(key)
        .or_insert_with(|| Box::leak(Box::new(value)) as &'static (dyn Any + Send + Sync));
    downcast_static(stored)
}

fn downcast_static<V: 'static>(value: &'static (dyn Any + Send + Sync)) -> &'static V {
    match value.downcast_ref::<V>() {
        Some(value) => value,
        // Entries are keyed by the `TypeId` of their own type.
        None => unreachable!("type static stored under the wrong key"),
    }
}

/// Claims the next free index for the type owning `type_index`, unless another thread got there
/// first, in which case that thread's index is returned.
pub fn initialize_type_index(type_index: &AtomicUsize) -> usize {
    let mut next = NEXT_TYPE_INDEX.lock().unwrap_or_else(PoisonError::into_inner);
    let candidate = *next;

    match type_index.compare_exchange(usize::MAX, candidate, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => {
            *next += 1;
            candidate
        }
        Err(existing) => existing,
    }
}

/// Records `T` and returns its index. Registering a type again has no effect.
pub fn add_to_registry<T: Reflect>() -> usize {
    let index = T::registry_index();
    let type_id = TypeId::of::<T>();

    let known = REGISTERED_TYPES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(&type_id);
    if !known {
        let mut types = REGISTERED_TYPES.write().unwrap_or_else(PoisonError::into_inner);
        if types.insert(type_id, static_info::<T>()).is_none() {
            debug!("registered reflected type {} with index {index}", T::name());
        }
    }
    index
}

pub fn is_registered<T: 'static>() -> bool {
    lookup(TypeId::of::<T>()).is_some()
}

pub fn lookup(type_id: TypeId) -> Option<&'static TypeInfo> {
    REGISTERED_TYPES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&type_id)
        .copied()
}

/// The registered type whose full or simple name is `name`. A full name is preferred; among
/// types sharing a simple name, the one with the lowest index is returned.
pub fn lookup_by_name(name: &str) -> Result<&'static TypeInfo> {
    let types = registered_types();
    types
        .iter()
        .find(|info| info.name() == name)
        .or_else(|| types.iter().find(|info| info.simple_name() == name))
        .copied()
        .ok_or_else(|| ReflectError::NotRegistered(name.to_string()))
}

/// Every registered type, in index order.
pub fn registered_types() -> Vec<&'static TypeInfo> {
    let mut types: Vec<_> = REGISTERED_TYPES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .values()
        .copied()
        .collect();
    types.sort_by_key(|info| info.index());
    types
}

pub fn registered_count() -> usize {
    REGISTERED_TYPES.read().unwrap_or_else(PoisonError::into_inner).len()
}

/// Registers a reflected type before `main()`. A generic type has no single type to register;
/// its instantiations join the registry through [`info_for`](crate::descriptor::info_for).
#[cfg(feature = "registry")]
#[doc(hidden)]
#[macro_export]
macro_rules! __register_type {
    ($name:ident []) => {
        $crate::paste::paste! {
            $crate::ctor::declarative::ctor! {
                #[ctor]
                unsafe fn [<_register_reflected_ $name:snake>]() {
                    $crate::registry::add_to_registry::<$name>();
                }
            }
        }
    };
    ($name:ident [$($generic:ident)+]) => {};
}

#[cfg(not(feature = "registry"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __register_type {
    ($name:ident [$($generic:ident)*]) => {};
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::{descriptor::info_for, reflect_type};

    #[derive(Default)]
    pub struct Registered {
        id: u32,
    }

    reflect_type! { pub Registered { fields { id: u32 } } }

    #[derive(Default)]
    pub struct Twice {
        id: u32,
    }

    reflect_type! { pub Twice { fields { id: u32 } } }

    #[test]
    fn registration_is_idempotent() {
        let first = add_to_registry::<Twice>();
        assert_eq!(add_to_registry::<Twice>(), first);
        assert_eq!(registered_types().iter().filter(|info| info.is::<Twice>()).count(), 1);
        assert_eq!(Twice::registry_index(), first);
    }

    #[test]
    fn lookups_by_id_and_name() {
        add_to_registry::<Registered>();
        assert!(is_registered::<Registered>());
        assert!(!is_registered::<String>());

        let info = lookup(TypeId::of::<Registered>()).unwrap();
        assert!(std::ptr::eq(info, info_for::<Registered>()));
        assert!(lookup_by_name(Registered::NAME).is_ok_and(|found| found.is::<Registered>()));
        assert!(lookup_by_name("Registered").is_ok_and(|found| found.is::<Registered>()));
        assert_eq!(
            lookup_by_name("NoSuchType").err(),
            Some(ReflectError::NotRegistered("NoSuchType".to_string()))
        );
    }

    #[test]
    fn registered_types_are_in_index_order() {
        add_to_registry::<Registered>();
        add_to_registry::<Twice>();
        let indices: Vec<_> = registered_types().iter().map(|info| info.index()).collect();
        assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn racing_threads_agree_on_one_index() {
        static INDEX: AtomicUsize = AtomicUsize::new(usize::MAX);
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| initialize_type_index(&INDEX)))
            .collect();
        let indices: Vec<usize> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
        assert!(indices.iter().all(|&index| index == indices[0]));
        assert_eq!(INDEX.load(Ordering::Acquire), indices[0]);
    }

    #[test]
    fn type_statics_are_created_once_per_key() {
        struct Key;
        struct OtherKey;

        let first = type_static::<Key, AtomicUsize>(|| AtomicUsize::new(1));
        let again = type_static::<Key, AtomicUsize>(|| AtomicUsize::new(2));
        assert!(std::ptr::eq(first, again));
        assert_eq!(again.load(Ordering::Acquire), 1);

        assert_eq!(type_static::<OtherKey, AtomicUsize>(|| AtomicUsize::new(3)).load(Ordering::Acquire), 3);
        assert_eq!(*type_static::<Key, String>(|| "by value type".to_string()), "by value type");
    }

    #[test]
    fn type_static_initializers_may_nest() {
        struct Outer;
        struct Inner;

        let outer = type_static::<Outer, usize>(|| *type_static::<Inner, usize>(|| 7) + 1);
        assert_eq!(*outer, 8);
    }
}
