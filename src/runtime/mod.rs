/*!

# Access By Name

Everything in [`descriptor`](crate::descriptor) is resolved by the compiler. The functions here
take the member name as a runtime string instead and go through the erased
[`MemberTable`](crate::descriptor::MemberTable) of the type. Lookups hash the name once; a name
that matches nothing, or matches a member of the wrong shape, is a [`ReflectError`].

```rust,ignore
let mut point = Point { x: 3, y: -4 };
let distance: i32 = invoke(&mut point, "manhattan", ())?;
set_by_name(&mut point, "x", 10)?;
let x: &i32 = get_by_name(&point, "x")?;
```

Types are checked against what the member declares: the argument tuple, the return type and the
field type must match exactly.

*/

pub mod debug;

use std::{
    any::{Any, type_name},
    fmt,
};

use log::debug;
use polonius_the_crab::{polonius, polonius_return};

pub use self::debug::{DebugConfig, DebugWriter, ReflectDebug, debug, debug_all, debug_str};
use crate::{
    descriptor::{FieldAccess, MemberInfo, Reflect},
    error::{ReflectError, Result},
    member::Instance,
};

// Invocation

/// Calls the function `name` on `target` with `args`, a tuple of the arguments after the
/// receiver.
///
/// When `T` has no function of that name but has a field, `()` reads a clone of the field and
/// `(value,)` writes it.
pub fn invoke<R: 'static, T: Reflect, A: 'static>(target: &mut T, name: &str, args: A) -> Result<R> {
    dispatch(Instance::Mut(target), name, args).inspect_err(|error| log_failure::<T>(name, error))
}

/// [`invoke`] through a shared reference. Functions taking `&mut self` and field writes fail with
/// [`ReflectError::ReceiverMismatch`].
pub fn invoke_ref<R: 'static, T: Reflect, A: 'static>(target: &T, name: &str, args: A) -> Result<R> {
    dispatch(Instance::Ref(target), name, args).inspect_err(|error| log_failure::<T>(name, error))
}

fn dispatch<R: 'static, T: Reflect, A: 'static>(
    mut instance: Instance<'_, T>,
    name: &str,
    args: A,
) -> Result<R> {
    let table = T::member_table();
    if let Some(position) = table.function_position(name) {
        if let Some(function) = table.function_at(position) {
            return function.invoke(table.info_at(position), &mut instance, args);
        }
    }
    if let Some(position) = table.field_position(name) {
        if let Some(field) = table.field_at(position) {
            return field_call(table.info_at(position), field, instance, args);
        }
    }
    Err(not_found::<T>(name))
}

/// `()` reads, `(value,)` writes.
fn field_call<R: 'static, T: Reflect, A: 'static>(
    info: &MemberInfo,
    field: &FieldAccess<T>,
    mut instance: Instance<'_, T>,
    args: A,
) -> Result<R> {
    let args: Box<dyn Any> = Box::new(args);
    if args.is::<()>() {
        return clone_field(info, field, instance.get());
    }

    let Some(target) = instance.get_mut() else {
        return Err(ReflectError::ReceiverMismatch {
            member: info.debug_name(),
            receiver: "&mut self",
        });
    };
    let unit: Box<dyn Any> = Box::new(());
    if !unit.is::<R>() {
        return Err(ReflectError::ReturnTypeMismatch {
            member: info.debug_name(),
            expected: type_name::<()>(),
            found: type_name::<R>(),
        });
    }
    field
        .set_from_args(target, args)
        .map_err(|_| field_mismatch::<A>(info))?;
    unit.downcast::<R>().map(|unit| *unit).map_err(|_| field_mismatch::<R>(info))
}

// Fields

/// A shared reference to the field `name`.
pub fn get_by_name<'a, V: 'static, T: Reflect>(target: &'a T, name: &str) -> Result<&'a V> {
    let (info, field) = find_field::<T>(name)?;
    field
        .get(target)
        .downcast_ref::<V>()
        .ok_or_else(|| field_mismatch::<V>(info))
        .inspect_err(|error| log_failure::<T>(name, error))
}

/// A mutable reference to the field `name`.
pub fn get_mut_by_name<'a, V: 'static, T: Reflect>(target: &'a mut T, name: &str) -> Result<&'a mut V> {
    let (info, field) = find_field::<T>(name)?;
    field
        .get_mut(target)
        .downcast_mut::<V>()
        .ok_or_else(|| field_mismatch::<V>(info))
        .inspect_err(|error| log_failure::<T>(name, error))
}

/// A mutable reference to the first field in `names` that exists and has type `V`, for fields
/// known under several names.
pub fn get_mut_by_any_name<'a, 'n, V: 'static, T: Reflect>(
    target: &'a mut T,
    names: impl IntoIterator<Item = &'n str>,
) -> Option<&'a mut V> {
    let mut target = target;
    for name in names {
        polonius!(|target| -> Option<&'polonius mut V> {
            if let Ok(value) = get_mut_by_name::<V, T>(target, name) {
                polonius_return!(Some(value));
            }
        });
    }
    None
}

/// Writes `value` to the field `name`, or else calls the writable property whose name or display
/// name is `name`.
pub fn set_by_name<V: 'static, T: Reflect>(target: &mut T, name: &str, value: V) -> Result<()> {
    let table = T::member_table();
    if let Some(position) = table.field_position(name) {
        if let Some(field) = table.field_at(position) {
            let info = table.info_at(position);
            return field
                .set(target, Box::new(value))
                .map_err(|_| field_mismatch::<V>(info))
                .inspect_err(|error| log_failure::<T>(name, error));
        }
    }
    match writable_property::<T>(name) {
        Some(setter) => invoke::<(), T, (V,)>(target, setter.name(), (value,)),
        None => Err(not_found::<T>(name)).inspect_err(|error| log_failure::<T>(name, error)),
    }
}

/// A clone of the field `name`, or else the value of the readable property whose name or display
/// name is `name`.
pub fn read_by_name<V: 'static, T: Reflect>(target: &T, name: &str) -> Result<V> {
    if let Ok((info, field)) = find_field::<T>(name) {
        return clone_field(info, field, target).inspect_err(|error| log_failure::<T>(name, error));
    }
    let getter = T::member_table()
        .function_infos()
        .iter()
        .find(|info| info.is_readable() && (info.name() == name || info.display_name() == name));
    match getter {
        Some(getter) => invoke_ref(target, getter.name(), ()),
        None => Err(not_found::<T>(name)).inspect_err(|error| log_failure::<T>(name, error)),
    }
}

fn writable_property<T: Reflect>(name: &str) -> Option<&'static MemberInfo> {
    T::member_table()
        .function_infos()
        .iter()
        .find(|info| info.is_writable() && (info.name() == name || info.display_name() == name))
}

fn clone_field<V: 'static, T: 'static>(info: &MemberInfo, field: &FieldAccess<T>, target: &T) -> Result<V> {
    if !field.is::<V>() {
        return Err(field_mismatch::<V>(info));
    }
    let value = field.clone_value(target).ok_or_else(|| ReflectError::NotCloneable {
        member: info.debug_name(),
        value_type: info.value_type(),
    })?;
    value.downcast::<V>().map(|value| *value).map_err(|_| field_mismatch::<V>(info))
}

fn find_field<T: Reflect>(name: &str) -> Result<(&'static MemberInfo, &'static FieldAccess<T>)> {
    let table = T::member_table();
    table
        .field_position(name)
        .and_then(|position| Some((table.info_at(position), table.field_at(position)?)))
        .ok_or_else(|| not_found::<T>(name))
}

// Iteration

/// One field of a value, seen through the erased table.
pub struct FieldValue<'a, T: 'static> {
    target: &'a T,
    info: &'static MemberInfo,
    access: &'static FieldAccess<T>,
}

impl<'a, T: 'static> FieldValue<'a, T> {
    pub fn info(&self) -> &'static MemberInfo {
        self.info
    }

    pub fn as_any(&self) -> &'a dyn Any {
        self.access.get(self.target)
    }

    pub fn downcast_ref<V: 'static>(&self) -> Option<&'a V> {
        self.access.get(self.target).downcast_ref::<V>()
    }

    pub fn is<V: 'static>(&self) -> bool {
        self.access.is::<V>()
    }
}

impl<T: 'static> fmt::Debug for FieldValue<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.access.fmt(self.target, &mut DebugWriter::new(f, DebugConfig::default().compact(true)))
    }
}

/// Calls `f` with the name, value and index of each field of `target`, in declaration order.
pub fn for_each_field<T: Reflect>(target: &T, mut f: impl FnMut(&'static str, FieldValue<'_, T>, usize)) {
    let table = T::member_table();
    for (index, info) in table.field_infos().iter().enumerate() {
        if let Some(access) = table.field_at(index) {
            f(info.name(), FieldValue { target, info, access }, index);
        }
    }
}

/// Calls `f` with each function of `T` and its index, in declaration order.
pub fn for_each_function<T: Reflect>(mut f: impl FnMut(&'static MemberInfo, usize)) {
    for (index, info) in T::member_table().function_infos().iter().enumerate() {
        f(info, index);
    }
}

/// Calls `f` with the display name, info and function index of each property of `T`.
pub fn for_each_property<T: Reflect>(mut f: impl FnMut(&'static str, &'static MemberInfo, usize)) {
    for_each_function::<T>(|info, index| {
        if info.is_property() {
            f(info.display_name(), info, index);
        }
    });
}

fn not_found<T: Reflect>(name: &str) -> ReflectError {
    ReflectError::MemberNotFound {
        type_name: T::name(),
        name: name.to_string(),
    }
}

fn field_mismatch<V>(info: &MemberInfo) -> ReflectError {
    ReflectError::FieldTypeMismatch {
        member: info.debug_name(),
        expected: info.value_type(),
        found: type_name::<V>(),
    }
}

fn log_failure<T: Reflect>(name: &str, error: &ReflectError) {
    debug!("access to `{name}` on {} failed: {error}", T::name());
}

#[doc(hidden)]
pub mod probe {
    //! `Some(value.clone())` when the value's concrete type is `Clone`, else `None`. Used by
    //! `reflect_type!` through [`__clone_value!`].

    pub struct CloneProbe<'a, T>(pub &'a T);

    pub trait ViaClone<T> {
        fn clone_probe(&self) -> Option<T>;
    }

    pub trait NotClone<T> {
        fn clone_probe(&self) -> Option<T>;
    }

    impl<T: Clone> ViaClone<T> for CloneProbe<'_, T> {
        fn clone_probe(&self) -> Option<T> {
            Some(self.0.clone())
        }
    }

    impl<T> NotClone<T> for &CloneProbe<'_, T> {
        fn clone_probe(&self) -> Option<T> {
            None
        }
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __clone_value {
    ($value:expr) => {{
        #[allow(unused_imports)]
        use $crate::runtime::probe::{NotClone as _, ViaClone as _};
        (&$crate::runtime::probe::CloneProbe($value)).clone_probe()
    }};
}
