/*!

The per-type member table: one [`MemberInfo`] per member plus the erased accessors needed to reach
the member when it is named by a runtime string.

A table is built once per reflected type, the first time it is needed, by visiting
`T::Members`. Each entry stores monomorphized function pointers, so using a table never allocates
except to box the values that cross the erased boundary.

*/

use std::{
    any::{Any, TypeId, type_name},
    fmt::{self, Write as _},
    ops::ControlFlow,
};

use log::trace;

use super::{MemberInfo, MemberList, MemberVisitor, Reflect};
use crate::{
    attr::DebugWith,
    error::{ReflectError, Result},
    hashing::{NameIndex, find_name, index_name},
    member::{FieldDescriptor, FunctionDescriptor, Instance, MemberDescriptor, MemberKind, MemberKindTag, ReceiverKind},
    runtime::debug::DebugWriter,
};

/// Erased access to one field of `T`.
pub(crate) struct FieldAccess<T> {
    value_type: fn() -> TypeId,
    get: fn(&T) -> &(dyn Any + 'static),
    get_mut: fn(&mut T) -> &mut (dyn Any + 'static),
    set: fn(&mut T, Box<dyn Any>) -> std::result::Result<(), Box<dyn Any>>,
    set_from_args: fn(&mut T, Box<dyn Any>) -> std::result::Result<(), Box<dyn Any>>,
    clone: fn(&T) -> Option<Box<dyn Any>>,
    fmt: fn(&T, &mut DebugWriter<'_>) -> fmt::Result,
}

/// Erased access to one function of `T`.
pub(crate) struct FunctionAccess<T> {
    args_type: fn() -> TypeId,
    output_type: fn() -> TypeId,
    invoke: fn(&mut Instance<'_, T>, Box<dyn Any>) -> std::result::Result<Box<dyn Any>, Refused>,
    /// Present for readable properties.
    read_fmt: Option<fn(&T, &mut DebugWriter<'_>) -> fmt::Result>,
}

/// Why an erased call did not happen.
pub(crate) enum Refused {
    Arguments,
    Receiver,
}

pub(crate) enum Access<T> {
    Field(FieldAccess<T>),
    Function(FunctionAccess<T>),
}

pub struct MemberTable<T: 'static> {
    infos: Vec<MemberInfo>,
    accesses: Vec<Access<T>>,
    field_count: usize,
    fields_by_name: NameIndex,
    functions_by_name: NameIndex,
}

impl<T: Reflect> MemberTable<T> {
    /// Visits every member of `T`, fields first.
    pub fn build() -> Self {
        struct Builder<T: 'static>(MemberTable<T>);

        impl<T: Reflect> MemberVisitor<T> for Builder<T> {
            fn visit_field<F: FieldDescriptor<Declarer = T>>(&mut self) -> ControlFlow<()> {
                self.0.push(MemberInfo::of_field::<F>(), Access::Field(FieldAccess::of::<F>()));
                ControlFlow::Continue(())
            }

            fn visit_function<F: FunctionDescriptor<Declarer = T>>(&mut self) -> ControlFlow<()> {
                self.0.push(
                    MemberInfo::of_function::<F>(),
                    Access::Function(FunctionAccess::of::<F>()),
                );
                ControlFlow::Continue(())
            }
        }

        let mut builder = Builder(MemberTable {
            infos: Vec::new(),
            accesses: Vec::new(),
            field_count: 0,
            fields_by_name: NameIndex::new(),
            functions_by_name: NameIndex::new(),
        });
        let _ = <T::Members as MemberList<T>>::accept(&mut builder);
        let table = builder.0;
        trace!(
            "built member table for {}: {} fields, {} functions",
            T::name(),
            table.field_count,
            table.infos.len() - table.field_count
        );
        table
    }

    fn push(&mut self, info: MemberInfo, access: Access<T>) {
        let position = self.infos.len();
        let infos = &self.infos;
        let name_at = |at: usize| if at == position { info.name() } else { infos[at].name() };
        match info.kind() {
            MemberKindTag::Field => {
                index_name(&mut self.fields_by_name, info.name(), position, name_at);
                self.field_count += 1;
            }
            MemberKindTag::Function => {
                index_name(&mut self.functions_by_name, info.name(), position, name_at);
            }
        }
        self.infos.push(info);
        self.accesses.push(access);
    }
}

impl<T: 'static> MemberTable<T> {
    /// Fields then functions, in declaration order.
    pub fn infos(&self) -> &[MemberInfo] {
        &self.infos
    }

    pub fn field_infos(&self) -> &[MemberInfo] {
        &self.infos[..self.field_count]
    }

    pub fn function_infos(&self) -> &[MemberInfo] {
        &self.infos[self.field_count..]
    }

    pub fn info_of<M: MemberDescriptor<Declarer = T>>(&self) -> Option<&MemberInfo>
    where
        T: Reflect,
    {
        let position = match <M::Kind as MemberKind>::TAG {
            MemberKindTag::Field => M::INDEX,
            MemberKindTag::Function => self.field_count + M::INDEX,
        };
        self.infos
            .get(position)
            .filter(|info| info.kind() == <M::Kind as MemberKind>::TAG && info.name() == M::NAME)
    }

    /// The position of the field named `name`.
    pub(crate) fn field_position(&self, name: &str) -> Option<usize> {
        find_name(&self.fields_by_name, name, |at| self.infos[at].name())
    }

    /// The position of the function named `name`.
    pub(crate) fn function_position(&self, name: &str) -> Option<usize> {
        find_name(&self.functions_by_name, name, |at| self.infos[at].name())
    }

    pub(crate) fn info_at(&self, position: usize) -> &MemberInfo {
        &self.infos[position]
    }

    pub(crate) fn field_at(&self, position: usize) -> Option<&FieldAccess<T>> {
        match self.accesses.get(position) {
            Some(Access::Field(access)) => Some(access),
            _ => None,
        }
    }

    pub(crate) fn function_at(&self, position: usize) -> Option<&FunctionAccess<T>> {
        match self.accesses.get(position) {
            Some(Access::Function(access)) => Some(access),
            _ => None,
        }
    }
}

impl<T: 'static> fmt::Debug for MemberTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.infos.iter().map(|info| info.debug_name()))
            .finish()
    }
}

// Field thunks

impl<T: Reflect> FieldAccess<T> {
    fn of<F: FieldDescriptor<Declarer = T>>() -> Self {
        FieldAccess {
            value_type: TypeId::of::<F::Value>,
            get: field_get::<F>,
            get_mut: field_get_mut::<F>,
            set: field_set::<F>,
            set_from_args: field_set_from_args::<F>,
            clone: field_clone::<F>,
            fmt: field_fmt::<F>,
        }
    }
}

impl<T: 'static> FieldAccess<T> {
    pub(crate) fn is<V: 'static>(&self) -> bool {
        (self.value_type)() == TypeId::of::<V>()
    }

    pub(crate) fn get<'a>(&self, target: &'a T) -> &'a (dyn Any + 'static) {
        (self.get)(target)
    }

    pub(crate) fn get_mut<'a>(&self, target: &'a mut T) -> &'a mut (dyn Any + 'static) {
        (self.get_mut)(target)
    }

    /// Hands the value back if its type is wrong.
    pub(crate) fn set(&self, target: &mut T, value: Box<dyn Any>) -> std::result::Result<(), Box<dyn Any>> {
        (self.set)(target, value)
    }

    /// [`set`](Self::set) with the value wrapped in a one-element tuple.
    pub(crate) fn set_from_args(
        &self,
        target: &mut T,
        args: Box<dyn Any>,
    ) -> std::result::Result<(), Box<dyn Any>> {
        (self.set_from_args)(target, args)
    }

    pub(crate) fn clone_value(&self, target: &T) -> Option<Box<dyn Any>> {
        (self.clone)(target)
    }

    pub(crate) fn fmt(&self, target: &T, out: &mut DebugWriter<'_>) -> fmt::Result {
        (self.fmt)(target, out)
    }
}

fn field_get<F: FieldDescriptor>(target: &F::Declarer) -> &(dyn Any + 'static) {
    F::get(target)
}

fn field_get_mut<F: FieldDescriptor>(target: &mut F::Declarer) -> &mut (dyn Any + 'static) {
    F::get_mut(target)
}

fn field_set<F: FieldDescriptor>(
    target: &mut F::Declarer,
    value: Box<dyn Any>,
) -> std::result::Result<(), Box<dyn Any>> {
    let value = value.downcast::<F::Value>()?;
    F::set(target, *value);
    Ok(())
}

fn field_set_from_args<F: FieldDescriptor>(
    target: &mut F::Declarer,
    args: Box<dyn Any>,
) -> std::result::Result<(), Box<dyn Any>> {
    let (value,) = *args.downcast::<(F::Value,)>()?;
    F::set(target, value);
    Ok(())
}

fn field_clone<F: FieldDescriptor>(target: &F::Declarer) -> Option<Box<dyn Any>> {
    F::clone_value(target).map(|value| Box::new(value) as Box<dyn Any>)
}

fn field_fmt<F: FieldDescriptor>(target: &F::Declarer, out: &mut DebugWriter<'_>) -> fmt::Result {
    let value = F::get(target);
    match F::attributes().get::<DebugWith<F::Value>>() {
        Some(custom) => write!(out, "{}", custom.display(value)),
        None => F::fmt_value(value, out),
    }
}

// Function thunks

impl<T: Reflect> FunctionAccess<T> {
    fn of<F: FunctionDescriptor<Declarer = T>>() -> Self {
        FunctionAccess {
            args_type: TypeId::of::<F::Args>,
            output_type: TypeId::of::<F::Output>,
            invoke: function_invoke::<F>,
            read_fmt: if F::READABLE { Some(function_read_fmt::<F>) } else { None },
        }
    }
}

impl<T: 'static> FunctionAccess<T> {
    pub(crate) fn takes<A: 'static>(&self) -> bool {
        (self.args_type)() == TypeId::of::<A>()
    }

    pub(crate) fn returns<R: 'static>(&self) -> bool {
        (self.output_type)() == TypeId::of::<R>()
    }

    pub(crate) fn read_fmt(&self, target: &T, out: &mut DebugWriter<'_>) -> Option<fmt::Result> {
        self.read_fmt.map(|read_fmt| read_fmt(target, out))
    }

    /// Calls the function with `args`, checking the argument, return and receiver types against
    /// what the function declares.
    pub(crate) fn invoke<A: 'static, R: 'static>(
        &self,
        info: &MemberInfo,
        instance: &mut Instance<'_, T>,
        args: A,
    ) -> Result<R> {
        if !self.takes::<A>() {
            return Err(ReflectError::ArgumentMismatch {
                member: info.debug_name(),
                expected: info.args_type().unwrap_or("()"),
                found: type_name::<A>(),
            });
        }
        if !self.returns::<R>() {
            return Err(ReflectError::ReturnTypeMismatch {
                member: info.debug_name(),
                expected: info.value_type(),
                found: type_name::<R>(),
            });
        }
        let output = (self.invoke)(instance, Box::new(args)).map_err(|refused| match refused {
            Refused::Receiver => ReflectError::ReceiverMismatch {
                member: info.debug_name(),
                receiver: info.receiver().unwrap_or(""),
            },
            Refused::Arguments => ReflectError::ArgumentMismatch {
                member: info.debug_name(),
                expected: info.args_type().unwrap_or("()"),
                found: type_name::<A>(),
            },
        })?;
        output
            .downcast::<R>()
            .map(|output| *output)
            .map_err(|_| ReflectError::ReturnTypeMismatch {
                member: info.debug_name(),
                expected: info.value_type(),
                found: type_name::<R>(),
            })
    }
}

fn function_invoke<F: FunctionDescriptor>(
    instance: &mut Instance<'_, F::Declarer>,
    args: Box<dyn Any>,
) -> std::result::Result<Box<dyn Any>, Refused> {
    let args = args.downcast::<F::Args>().map_err(|_| Refused::Arguments)?;
    let receiver = <F::Receiver as ReceiverKind>::borrow_from(instance).ok_or(Refused::Receiver)?;
    Ok(Box::new(F::call(receiver, *args)))
}

fn function_read_fmt<F: FunctionDescriptor>(target: &F::Declarer, out: &mut DebugWriter<'_>) -> fmt::Result {
    let mut instance = Instance::Ref(target);
    let output = function_invoke::<F>(&mut instance, Box::new(()));
    match output.ok().and_then(|output| output.downcast::<F::Output>().ok()) {
        Some(value) => match F::attributes().get::<DebugWith<F::Output>>() {
            Some(custom) => write!(out, "{}", custom.display(&value)),
            None => F::fmt_output(&value, out),
        },
        None => out.write_str("<unreadable>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect_type;

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Gauge {
        level: f64,
        label: String,
    }

    impl Gauge {
        fn level(&self) -> f64 {
            self.level
        }

        fn fill(&mut self, amount: f64) {
            self.level += amount;
        }
    }

    reflect_type! {
        pub Gauge {
            fields {
                level: f64,
                label: String,
            }
            functions {
                fn level(&self) -> f64;
                fn fill(&mut self, amount: f64);
            }
        }
    }

    #[test]
    fn fields_come_before_functions() {
        let table = Gauge::member_table();
        let names: Vec<_> = table.infos().iter().map(|info| info.name()).collect();
        assert_eq!(names, ["level", "label", "level", "fill"]);
        assert_eq!(table.field_infos().len(), 2);
        assert_eq!(table.function_infos().len(), 2);
    }

    #[test]
    fn names_are_indexed_per_kind() {
        let table = Gauge::member_table();
        assert_eq!(table.field_position("level"), Some(0));
        assert_eq!(table.function_position("level"), Some(2));
        assert_eq!(table.function_position("fill"), Some(3));
        assert_eq!(table.field_position("fill"), None);
    }

    #[test]
    fn info_of_finds_the_member() {
        use crate::member::{Field, Function};
        let table = Gauge::member_table();
        assert_eq!(table.info_of::<Field<Gauge, 1>>().map(|info| info.name()), Some("label"));
        assert_eq!(table.info_of::<Function<Gauge, 1>>().map(|info| info.name()), Some("fill"));
    }

    #[test]
    fn erased_invocation_checks_types() {
        let table = Gauge::member_table();
        let position = table.function_position("fill").unwrap();
        let (info, fill) = (table.info_at(position), table.function_at(position).unwrap());

        let mut gauge = Gauge::default();
        let mut instance = Instance::Mut(&mut gauge);
        assert_eq!(fill.invoke::<(f64,), ()>(info, &mut instance, (2.5,)), Ok(()));
        assert!(matches!(
            fill.invoke::<(i32,), ()>(info, &mut instance, (1,)),
            Err(ReflectError::ArgumentMismatch { .. })
        ));
        assert_eq!(gauge.level, 2.5);

        let shared = gauge.clone();
        let mut instance = Instance::Ref(&shared);
        assert!(matches!(
            fill.invoke::<(f64,), ()>(info, &mut instance, (1.0,)),
            Err(ReflectError::ReceiverMismatch { .. })
        ));
    }

    #[test]
    fn erased_field_access() {
        let table = Gauge::member_table();
        let label = table.field_at(table.field_position("label").unwrap()).unwrap();
        let mut gauge = Gauge::default();
        assert!(label.is::<String>());
        assert!(label.set(&mut gauge, Box::new("tank".to_string())).is_ok());
        assert!(label.set(&mut gauge, Box::new(3u8)).is_err());
        assert_eq!(label.get(&gauge).downcast_ref::<String>().map(String::as_str), Some("tank"));
        let copy = label.clone_value(&gauge).and_then(|value| value.downcast::<String>().ok());
        assert_eq!(copy.as_deref().map(String::as_str), Some("tank"));
    }
}
