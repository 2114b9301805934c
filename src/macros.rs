/*!

# Registration

[`reflect_type!`](crate::reflect_type) is the only supported way to make a type reflectable. It
realizes, in the client crate, every impl the rest of the library relies on:

- `Reflect` for the type, with its member lists, bases, attributes, member table and registry
  index;
- the per-index descriptor impls behind `Field<T, I>` and `Function<T, I>`;
- `RemoveQualifiers` and `ReflectDebug`;
- the proxy traits `<Type>Proxy`, `<Type>FieldProxy` and `<Type>FieldProxyMut`;
- with the `registry` feature, a static constructor that adds a non-generic type to the registry.

Hand-writing these is possible but the associated items are tied together in ways that are easy
to get subtly wrong. Keeping them behind one macro means a reflected type is correct whenever the
macro is.

The `const fn`s in this module are used by the generated code to turn member names into indices
at compile time.

*/

use crate::const_string::str_eq;

/// The position of `name` in `names`. Compilation fails if `name` is absent.
#[doc(hidden)]
pub const fn position(names: &[&str], name: &str) -> usize {
    let mut at = 0;
    while at < names.len() {
        if str_eq(names[at], name) {
            return at;
        }
        at += 1;
    }
    panic!("name is not among the declared members")
}

/// Whether no name appears twice.
#[doc(hidden)]
pub const fn all_distinct(names: &[&str]) -> bool {
    let mut i = 0;
    while i < names.len() {
        let mut j = i + 1;
        while j < names.len() {
            if str_eq(names[i], names[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

#[doc(hidden)]
pub const fn count(names: &[&str]) -> usize {
    names.len()
}

/// Registers a type for reflection.
///
/// ```
/// use static_reflect::{reflect, reflect_type, runtime};
///
/// #[derive(Default)]
/// pub struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Point {
///     fn manhattan(&self) -> i32 {
///         self.x.abs() + self.y.abs()
///     }
///
///     fn shift(&mut self, dx: i32, dy: i32) {
///         self.x += dx;
///         self.y += dy;
///     }
/// }
///
/// reflect_type! {
///     /// Doc comments are allowed anywhere an attribute is.
///     pub Point {
///         fields {
///             x: i32,
///             y: i32,
///         }
///         functions {
///             #[property]
///             fn manhattan(&self) -> i32;
///             fn shift(&mut self, dx: i32, dy: i32);
///         }
///     }
/// }
///
/// let mut point = Point { x: 1, y: -2 };
/// runtime::invoke::<(), _, _>(&mut point, "shift", (1, 1)).unwrap();
/// assert_eq!(runtime::invoke::<i32, _, _>(&mut point, "manhattan", ()), Ok(3));
/// assert_eq!(reflect::<Point>().member_infos().len(), 4);
/// ```
///
/// Each block is optional. Functions take `&self`, `&mut self` or no receiver, followed by named
/// arguments, and are declared with a trailing `;`. Arguments and return values must be
/// `'static`.
///
/// ## Generic types
///
/// Type parameters follow the name, and bounds go in a `where` clause with one bound per
/// predicate. Every parameter is implicitly `'static`. Each instantiation is a reflected type of
/// its own, with its own member table and registry index:
///
/// ```
/// use static_reflect::{reflect, reflect_type, runtime::ReflectDebug};
///
/// pub struct Labeled<T> {
///     label: String,
///     value: T,
/// }
///
/// impl<T: Clone> Labeled<T> {
///     fn get_value(&self) -> T {
///         self.value.clone()
///     }
/// }
///
/// reflect_type! {
///     pub Labeled<T> where T: Clone, T: ReflectDebug {
///         fields {
///             label: String,
///             value: T,
///         }
///         functions {
///             #[property]
///             fn get_value(&self) -> T;
///         }
///     }
/// }
///
/// assert_eq!(reflect::<Labeled<u8>>().simple_name(), "Labeled<u8>");
/// assert_eq!(
///     reflect::<Labeled<bool>>().get_field("value").map(|field| field.value_type()),
///     Some("bool")
/// );
/// ```
///
/// With the `registry` feature a generic type's instantiations are not registered before
/// `main()`; each one joins the registry when its [`TypeInfo`](crate::TypeInfo) is first used.
///
/// ## Attributes
///
/// | attribute              | sites     | attaches                                   |
/// |------------------------|-----------|--------------------------------------------|
/// | `#[property]`          | functions | [`Property`](crate::attr::Property)        |
/// | `#[property("Name")]`  | functions | a `Property` with a friendly name          |
/// | `#[base_types(A, B)]`  | type      | [`BaseTypes`](crate::attr::BaseTypes)      |
/// | `#[debug(path)]`       | any       | [`DebugWith`](crate::attr::DebugWith)      |
/// | `#[attr(expr)]`        | any       | the value of `expr`, a user attribute      |
///
/// Every attribute goes through [`attach`](crate::attr::attach), so one placed on a site its usage
/// does not permit is a compile error:
///
/// ```compile_fail
/// use static_reflect::reflect_type;
///
/// pub struct Base;
/// pub struct Point { x: i32 }
///
/// reflect_type! { pub Base {} }
/// reflect_type! {
///     pub Point {
///         fields {
///             #[base_types(Base)]
///             x: i32,
///         }
///     }
/// }
/// ```
///
/// Member names must be unique within their kind:
///
/// ```compile_fail
/// use static_reflect::reflect_type;
///
/// pub struct Point { x: i32 }
///
/// reflect_type! { pub Point { fields { x: i32, x: i32 } } }
/// ```
///
/// The argument tuple of a call is checked against the declaration:
///
/// ```compile_fail
/// use static_reflect::{member::{Function, FunctionDescriptor}, reflect_type};
///
/// pub struct Point { x: i32 }
///
/// impl Point {
///     fn shift(&mut self, dx: i32) { self.x += dx; }
/// }
///
/// reflect_type! { pub Point { fields { x: i32 } functions { fn shift(&mut self, dx: i32); } } }
///
/// let mut point = Point { x: 0 };
/// <Function<Point, 0>>::call(&mut point, ("one",));
/// ```
#[macro_export]
macro_rules! reflect_type {
    (
        $(#[$($tattr:tt)*])*
        $vis:vis $name:ident $(< $($generic:ident),+ $(,)? >)?
            $(where $($bound_ty:ty : $bound:path),+ $(,)?)?
        {
            $(fields {
                $( $(#[$($fattr:tt)*])* $field:ident : $fty:ty ),* $(,)?
            })?
            $(functions {
                $( $(#[$($gattr:tt)*])* fn $func:ident ( $($params:tt)* ) $(-> $ret:ty)? ; )*
            })?
        }
    ) => {
        $crate::__reflect_impl! {
            vis [$vis]
            name $name
            generics [$($($generic),+)?]
            bounds [$($($bound_ty : $bound),+)?]
            generics_tt [$($($generic),+)?]
            bounds_tt [$($($bound_ty : $bound),+)?]
            tattrs [$([$($tattr)*])*]
            field_names [$($(stringify!($field)),*)?]
            function_names [$($(stringify!($func)),*)?]
            fields [$($( { [$([$($fattr)*])*] $field : $fty } )*)?]
            functions [$($( { [$([$($gattr)*])*] $func ($($params)*) [$($ret)?] } )*)?]
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_impl {
    (
        vis [$vis:vis]
        name $name:ident
        generics [$($generic:ident),*]
        bounds [$($bound_ty:ty : $bound:path),*]
        generics_tt $generics_tt:tt
        bounds_tt $bounds_tt:tt
        tattrs [$($tattr:tt)*]
        field_names $field_names:tt
        function_names $function_names:tt
        fields [$( { [$($fattr:tt)*] $field:ident : $fty:ty } )*]
        functions [$( { [$($gattr:tt)*] $func:ident ($($params:tt)*) [$($ret:ty)?] } )*]
    ) => {
        const _: () = {
            assert!(
                $crate::macros::all_distinct(&$field_names),
                concat!("`", stringify!($name), "` declares two fields with the same name"),
            );
            assert!(
                $crate::macros::all_distinct(&$function_names),
                concat!("`", stringify!($name), "` declares two functions with the same name"),
            );
        };

        impl<$($generic: 'static),*> $crate::descriptor::Reflect for $name<$($generic),*>
        where
            $($bound_ty: $bound),*
        {
            const NAME: &'static str = concat!(module_path!(), "::", stringify!($name));

            $crate::__generic_name!($($generic)*);

            type Fields = $crate::type_list![
                $( $crate::member::Field<Self, { $crate::macros::position(&$field_names, stringify!($field)) }>, )*
            ];
            type Functions = $crate::type_list![
                $( $crate::member::Function<Self, { $crate::macros::position(&$function_names, stringify!($func)) }>, )*
            ];
            type Members = $crate::type_list![
                $( $crate::member::Field<Self, { $crate::macros::position(&$field_names, stringify!($field)) }>, )*
                $( $crate::member::Function<Self, { $crate::macros::position(&$function_names, stringify!($func)) }>, )*
            ];
            type DeclaredBases = $crate::__declared_bases!([] $($tattr)*);
            type Bases = $crate::typelist::Flattened<
                $crate::typelist::Mapped<
                    $crate::__declared_bases!([] $($tattr)*),
                    $crate::descriptor::BaseChain,
                >,
            >;

            fn attributes() -> &'static $crate::attr::AttributeList {
                $crate::__attribute_list!(Self, Type, Self, $($tattr)*)
            }

            fn member_table() -> &'static $crate::descriptor::MemberTable<Self> {
                $crate::registry::type_static::<Self, $crate::descriptor::MemberTable<Self>>(
                    $crate::descriptor::MemberTable::build,
                )
            }

            fn registry_index() -> usize {
                // `usize::MAX` until the registry hands out an index.
                let slot = $crate::registry::type_static::<Self, ::std::sync::atomic::AtomicUsize>(|| {
                    ::std::sync::atomic::AtomicUsize::new(usize::MAX)
                });

                let index = slot.load(::std::sync::atomic::Ordering::Acquire);
                if index != usize::MAX {
                    return index;
                }
                $crate::registry::initialize_type_index(slot)
            }
        }

        $(
            $crate::__generic_impl! {
                $generics_tt $bounds_tt
                [$crate::member::FieldAt<{ $crate::macros::position(&$field_names, stringify!($field)) }>]
                $name
            {
                type Value = $fty;

                const FIELD_NAME: &'static str = stringify!($field);

                fn field_attributes() -> &'static $crate::attr::AttributeList {
                    $crate::__attribute_list!(
                        $crate::member::Field<Self, { $crate::macros::position(&$field_names, stringify!($field)) }>,
                        Field,
                        $fty,
                        $($fattr)*
                    )
                }

                fn field_ref(target: &Self) -> &$fty {
                    &target.$field
                }

                fn field_mut(target: &mut Self) -> &mut $fty {
                    &mut target.$field
                }

                fn clone_field(target: &Self) -> ::std::option::Option<$fty> {
                    $crate::__clone_value!(&target.$field)
                }

                fn fmt_field(
                    value: &$fty,
                    out: &mut $crate::runtime::debug::DebugWriter<'_>,
                ) -> ::std::fmt::Result {
                    $crate::__debug_value!(value, out)
                }
            }
            }
        )*

        $(
            $crate::__reflect_function!(
                $name $generics_tt $bounds_tt,
                { $crate::macros::position(&$function_names, stringify!($func)) },
                [$($gattr)*],
                $func,
                ($($params)*),
                [$($ret)?]
            );
        )*

        impl<$($generic: 'static),*> $crate::queries::RemoveQualifiers for $name<$($generic),*>
        where
            $($bound_ty: $bound),*
        {
            type Output = Self;
        }

        impl<$($generic: 'static),*> $crate::runtime::debug::ReflectDebug for $name<$($generic),*>
        where
            $($bound_ty: $bound),*
        {
            fn write_debug(&self, out: &mut $crate::runtime::debug::DebugWriter<'_>) -> ::std::fmt::Result {
                out.write_reflected(self)
            }
        }

        $crate::paste::paste! {
            #[allow(dead_code)]
            $vis trait [<$name Proxy>]<$($generic: 'static),*>:
                $crate::proxy::Proxy<Target = $name<$($generic),*>>
            where
                $($bound_ty: $bound),*
            {
                $(
                    $crate::__proxy_method!(
                        $crate::__generic_ty!($name $generics_tt),
                        { $crate::macros::position(&$function_names, stringify!($func)) },
                        $func,
                        ($($params)*),
                        [$($ret)?]
                    );
                )*
            }

            #[allow(dead_code)]
            $vis trait [<$name FieldProxy>]<$($generic: 'static),*>:
                $crate::proxy::Proxy<Target = $name<$($generic),*>>
            where
                $($bound_ty: $bound),*
            {
                $(
                    fn $field(&self) -> &$fty {
                        self.read_field::<
                            $crate::member::Field<
                                $crate::__generic_ty!($name $generics_tt),
                                { $crate::macros::position(&$field_names, stringify!($field)) },
                            >
                        >()
                    }
                )*
            }

            #[allow(dead_code)]
            $vis trait [<$name FieldProxyMut>]<$($generic: 'static),*>:
                $crate::proxy::Proxy<Target = $name<$($generic),*>>
            where
                $($bound_ty: $bound),*
            {
                $(
                    fn [<set_ $field>](&mut self, value: $fty) {
                        self.write_field::<
                            $crate::member::Field<
                                $crate::__generic_ty!($name $generics_tt),
                                { $crate::macros::position(&$field_names, stringify!($field)) },
                            >
                        >(value)
                    }
                )*
            }
        }

        $crate::__register_type!($name [$($generic)*]);
    };
}

/// An impl of `$trait` for `$name` over the given type parameters and predicates. Lets the
/// per-member repetitions use the type's generics without nesting them.
#[doc(hidden)]
#[macro_export]
macro_rules! __generic_impl {
    (
        [$($generic:ident),*] [$($bound_ty:ty : $bound:path),*]
        [$($trait:tt)*]
        $name:ident
        { $($body:tt)* }
    ) => {
        impl<$($generic: 'static),*> $($trait)* for $name<$($generic),*>
        where
            $($bound_ty: $bound),*
        {
            $($body)*
        }
    };
}

/// The type `$name<..>` applied to its type parameters.
#[doc(hidden)]
#[macro_export]
macro_rules! __generic_ty {
    ($name:ident [$($generic:ident),*]) => {
        $name<$($generic),*>
    };
}

/// `Reflect::name` for a generic type: the registered path plus the type arguments.
#[doc(hidden)]
#[macro_export]
macro_rules! __generic_name {
    () => {};
    ($($generic:ident)+) => {
        fn name() -> &'static str {
            ::std::any::type_name::<Self>()
        }
    };
}

/// The `FunctionAt` impl for one declared function, by receiver.
#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_function {
    ($name:ident $generics:tt $bounds:tt, $index:expr, [$($attr:tt)*], $func:ident, (&self $(, $arg:ident : $aty:ty)* $(,)?), [$($ret:ty)?]) => {
        $crate::__reflect_function!(@impl
            $name $generics $bounds, $index, [$($attr)*], $func, [$($arg : $aty),*], [$($ret)?],
            receiver = ByRef(receiver),
            readable = <$crate::__is_property!($($attr)*) as $crate::queries::Bool>::VALUE
                && $crate::macros::count(&[$(stringify!($arg)),*]) == 0
                && $crate::__has_ret!($($ret)?),
            writable = false,
            call = <Self>::$func(receiver, $($arg),*)
        );
    };
    ($name:ident $generics:tt $bounds:tt, $index:expr, [$($attr:tt)*], $func:ident, (&mut self $(, $arg:ident : $aty:ty)* $(,)?), [$($ret:ty)?]) => {
        $crate::__reflect_function!(@impl
            $name $generics $bounds, $index, [$($attr)*], $func, [$($arg : $aty),*], [$($ret)?],
            receiver = ByMut(receiver),
            readable = false,
            writable = <$crate::__is_property!($($attr)*) as $crate::queries::Bool>::VALUE
                && $crate::macros::count(&[$(stringify!($arg)),*]) == 1,
            call = <Self>::$func(receiver, $($arg),*)
        );
    };
    ($name:ident $generics:tt $bounds:tt, $index:expr, [$($attr:tt)*], $func:ident, ($($arg:ident : $aty:ty),* $(,)?), [$($ret:ty)?]) => {
        $crate::__reflect_function!(@impl
            $name $generics $bounds, $index, [$($attr)*], $func, [$($arg : $aty),*], [$($ret)?],
            receiver = Static(_receiver),
            readable = false,
            writable = false,
            call = <Self>::$func($($arg),*)
        );
    };
    (@impl
        $name:ident [$($generic:ident),*] [$($bound_ty:ty : $bound:path),*],
        $index:expr, [$($attr:tt)*], $func:ident, [$($arg:ident : $aty:ty),*], [$($ret:ty)?],
        receiver = $receiver:ident($recv:ident),
        readable = $readable:expr,
        writable = $writable:expr,
        call = $call:expr
    ) => {
        impl<$($generic: 'static),*> $crate::member::FunctionAt<{ $index }> for $name<$($generic),*>
        where
            $($bound_ty: $bound),*
        {
            type IsProperty = $crate::__is_property!($($attr)*);
            type Receiver = $crate::member::$receiver;
            type Args = ($($aty,)*);
            type Output = $crate::__ret_ty!($($ret)?);

            const FUNCTION_NAME: &'static str = stringify!($func);
            const FUNCTION_READABLE: bool = $readable;
            const FUNCTION_WRITABLE: bool = $writable;

            fn function_display_name() -> &'static str {
                const FRIENDLY: ::std::option::Option<&str> = $crate::__property_name!($($attr)*);
                const IS_PROPERTY: bool =
                    <$crate::__is_property!($($attr)*) as $crate::queries::Bool>::VALUE;
                const READABLE: bool = $readable;
                const WRITABLE: bool = $writable;
                const LEN: usize = $crate::const_string::display_name_len(
                    stringify!($func),
                    FRIENDLY,
                    IS_PROPERTY,
                    READABLE,
                    WRITABLE,
                );
                static NAME: $crate::const_string::ConstString<LEN> =
                    $crate::const_string::ConstString::display_name(
                        stringify!($func),
                        FRIENDLY,
                        IS_PROPERTY,
                        READABLE,
                        WRITABLE,
                    );
                NAME.as_str()
            }

            fn function_attributes() -> &'static $crate::attr::AttributeList {
                $crate::__attribute_list!(
                    $crate::member::Function<Self, { $index }>,
                    Function,
                    $crate::__ret_ty!($($ret)?),
                    $($attr)*
                )
            }

            fn call_function(
                $recv: <$crate::member::$receiver as $crate::member::ReceiverKind>::Receiver<'_, Self>,
                args: ($($aty,)*),
            ) -> $crate::__ret_ty!($($ret)?) {
                let ($($arg,)*) = args;
                $call
            }

            fn fmt_function_output(
                value: &$crate::__ret_ty!($($ret)?),
                out: &mut $crate::runtime::debug::DebugWriter<'_>,
            ) -> ::std::fmt::Result {
                $crate::__debug_value!(value, out)
            }
        }
    };
}

/// One method of the generated `<Type>Proxy` trait.
#[doc(hidden)]
#[macro_export]
macro_rules! __proxy_method {
    ($target:ty, $index:expr, $func:ident, (&self $(, $arg:ident : $aty:ty)* $(,)?), [$($ret:ty)?]) => {
        fn $func(&self $(, $arg: $aty)*) -> $crate::__ret_ty!($($ret)?) {
            self.call_ref::<$crate::member::Function<$target, { $index }>>(($($arg,)*))
        }
    };
    ($target:ty, $index:expr, $func:ident, (&mut self $(, $arg:ident : $aty:ty)* $(,)?), [$($ret:ty)?]) => {
        fn $func(&mut self $(, $arg: $aty)*) -> $crate::__ret_ty!($($ret)?) {
            self.call_mut::<$crate::member::Function<$target, { $index }>>(($($arg,)*))
        }
    };
    ($target:ty, $index:expr, $func:ident, ($($arg:ident : $aty:ty),* $(,)?), [$($ret:ty)?]) => {
        fn $func(&self $(, $arg: $aty)*) -> $crate::__ret_ty!($($ret)?) {
            self.call_static::<$crate::member::Function<$target, { $index }>>(($($arg,)*))
        }
    };
}

/// A `&'static AttributeList` for one site, built on first use and stored under the key type
/// `$key`.
#[doc(hidden)]
#[macro_export]
macro_rules! __attribute_list {
    ($key:ty, $site:ident, $site_ty:ty, $($attr:tt)*) => {
        $crate::registry::type_static::<$key, $crate::attr::AttributeList>(|| {
            #[allow(unused_mut)]
            let mut attributes = ::std::vec::Vec::new();
            $( $crate::__attribute!(attributes, $site, $site_ty, $attr); )*
            $crate::attr::AttributeList::new(attributes)
        })
    };
}

/// Pushes the attribute spelled by one `#[...]` onto `$list`.
#[doc(hidden)]
#[macro_export]
macro_rules! __attribute {
    ($list:ident, $site:ident, $site_ty:ty, [doc $($doc:tt)*]) => {};
    ($list:ident, $site:ident, $site_ty:ty, [property]) => {
        $list.push($crate::attr::attach::<$crate::attr::usage::$site, _>(
            $crate::attr::Property::new(),
        ));
    };
    ($list:ident, $site:ident, $site_ty:ty, [property($friendly:literal)]) => {
        $list.push($crate::attr::attach::<$crate::attr::usage::$site, _>(
            $crate::attr::Property::named($friendly),
        ));
    };
    ($list:ident, $site:ident, $site_ty:ty, [base_types($($base:ty),* $(,)?)]) => {
        $list.push($crate::attr::attach::<$crate::attr::usage::$site, _>(
            $crate::attr::BaseTypes::<$crate::type_list![$($base),*]>::new(),
        ));
    };
    ($list:ident, $site:ident, $site_ty:ty, [debug($write:expr)]) => {
        $list.push($crate::attr::attach::<$crate::attr::usage::$site, _>(
            $crate::attr::DebugWith::<$site_ty>::new($write),
        ));
    };
    ($list:ident, $site:ident, $site_ty:ty, [attr($value:expr)]) => {
        $list.push($crate::attr::attach::<$crate::attr::usage::$site, _>($value));
    };
    ($list:ident, $site:ident, $site_ty:ty, [$($other:tt)*]) => {
        compile_error!(concat!("unknown reflection attribute `#[", stringify!($($other)*), "]`"));
    };
}

/// The types named by every `#[base_types(..)]` among the attributes, as one list.
#[doc(hidden)]
#[macro_export]
macro_rules! __declared_bases {
    ([$($acc:ty,)*]) => {
        $crate::type_list![$($acc),*]
    };
    ([$($acc:ty,)*] [base_types($($base:ty),* $(,)?)] $($rest:tt)*) => {
        $crate::__declared_bases!([$($acc,)* $($base,)*] $($rest)*)
    };
    ([$($acc:ty,)*] [$($other:tt)*] $($rest:tt)*) => {
        $crate::__declared_bases!([$($acc,)*] $($rest)*)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __is_property {
    () => {
        $crate::queries::False
    };
    ([property $($friendly:tt)*] $($rest:tt)*) => {
        $crate::queries::True
    };
    ([$($other:tt)*] $($rest:tt)*) => {
        $crate::__is_property!($($rest)*)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __property_name {
    () => {
        ::std::option::Option::None
    };
    ([property($friendly:literal)] $($rest:tt)*) => {
        ::std::option::Option::Some($friendly)
    };
    ([$($other:tt)*] $($rest:tt)*) => {
        $crate::__property_name!($($rest)*)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __has_ret {
    () => {
        false
    };
    ($ret:ty) => {
        true
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __ret_ty {
    () => {
        ()
    };
    ($ret:ty) => {
        $ret
    };
}
