/*!

# Debug Printing From Metadata

[`debug`] writes any [`ReflectDebug`] value. Reflected types print their readable members (every
field, then every readable property under its display name); everything else prints the way its
own impl says:

```rust,ignore
debug_str(&point, DebugConfig::default().compact(true)) == "Point { x = 1, y = 2 }"
```

A `debug` attribute on the type, or on an individual field or property, replaces the default
output for that value. Members print compactly inside their parent whatever the configuration.

Member values whose type is not [`ReflectDebug`] fall back to its `Debug` impl, and to
`<opaque TypeName>` when it has neither.

*/

use std::{
    collections::VecDeque,
    fmt::{self, Write},
};

use crate::{
    attr::DebugWith,
    descriptor::{Reflect, simple_name},
};

/// Layout of [`debug`] output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DebugConfig {
    compact: bool,
    indent: usize,
}

impl Default for DebugConfig {
    fn default() -> Self {
        DebugConfig {
            compact: false,
            indent: 2,
        }
    }
}

impl DebugConfig {
    /// Everything on one line.
    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Spaces before each member in the multi-line layout.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    pub fn indent_width(&self) -> usize {
        self.indent
    }
}

/// A sink for debug output that carries the layout along.
pub struct DebugWriter<'a> {
    out: &'a mut dyn Write,
    config: DebugConfig,
}

impl<'a> DebugWriter<'a> {
    pub fn new(out: &'a mut dyn Write, config: DebugConfig) -> Self {
        DebugWriter { out, config }
    }

    pub fn config(&self) -> DebugConfig {
        self.config
    }

    /// A writer for a value nested inside the current one.
    pub fn nested(&mut self) -> DebugWriter<'_> {
        DebugWriter {
            out: &mut *self.out,
            config: self.config.compact(true),
        }
    }

    pub fn write_value<V: ReflectDebug + ?Sized>(&mut self, value: &V) -> fmt::Result {
        value.write_debug(&mut self.nested())
    }

    /// `[a, b, c]`
    pub fn write_seq<'v, V, I>(&mut self, items: I) -> fmt::Result
    where
        V: ReflectDebug + ?Sized + 'v,
        I: IntoIterator<Item = &'v V>,
    {
        self.write_char('[')?;
        for (index, item) in items.into_iter().enumerate() {
            if index > 0 {
                self.write_str(", ")?;
            }
            self.write_value(item)?;
        }
        self.write_char(']')
    }

    /// The default output for a reflected type, or its `debug` attribute's output if it has one.
    pub fn write_reflected<T: Reflect>(&mut self, value: &T) -> fmt::Result {
        if let Some(custom) = T::attributes().get::<DebugWith<T>>() {
            return write!(self, "{}", custom.display(value));
        }

        let table = T::member_table();
        let DebugConfig { compact, indent } = self.config;
        write!(self, "{} {{", simple_name(T::name()))?;

        let mut written = 0;
        for (position, info) in table.infos().iter().enumerate() {
            if !info.is_readable() {
                continue;
            }
            let separator = match (written, compact) {
                (0, true) => " ",
                (0, false) => "\n",
                (_, true) => ", ",
                (_, false) => ",\n",
            };
            self.write_str(separator)?;
            if !compact {
                write!(self, "{:indent$}", "")?;
            }
            write!(self, "{} = ", info.display_name())?;

            let mut nested = self.nested();
            if let Some(field) = table.field_at(position) {
                field.fmt(value, &mut nested)?;
            } else if let Some(function) = table.function_at(position) {
                function.read_fmt(value, &mut nested).unwrap_or(Ok(()))?;
            }
            written += 1;
        }

        match (written, compact) {
            (0, _) => self.write_char('}'),
            (_, true) => self.write_str(" }"),
            (_, false) => self.write_str("\n}"),
        }
    }
}

impl Write for DebugWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.write_str(s)
    }
}

/// Values the debug printer knows how to write.
pub trait ReflectDebug {
    fn write_debug(&self, out: &mut DebugWriter<'_>) -> fmt::Result;
}

macro_rules! reflect_debug_via_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ReflectDebug for $ty {
                fn write_debug(&self, out: &mut DebugWriter<'_>) -> fmt::Result {
                    write!(out, "{self}")
                }
            }
        )*
    };
}

reflect_debug_via_display!(
    bool, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
);

macro_rules! reflect_debug_via_debug {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ReflectDebug for $ty {
                fn write_debug(&self, out: &mut DebugWriter<'_>) -> fmt::Result {
                    write!(out, "{self:?}")
                }
            }
        )*
    };
}

reflect_debug_via_debug!((), char, str, String);

impl<T: ReflectDebug + ?Sized> ReflectDebug for &T {
    fn write_debug(&self, out: &mut DebugWriter<'_>) -> fmt::Result {
        (**self).write_debug(out)
    }
}

impl<T: ReflectDebug + ?Sized> ReflectDebug for Box<T> {
    fn write_debug(&self, out: &mut DebugWriter<'_>) -> fmt::Result {
        (**self).write_debug(out)
    }
}

impl<T: ReflectDebug> ReflectDebug for Option<T> {
    fn write_debug(&self, out: &mut DebugWriter<'_>) -> fmt::Result {
        match self {
            Some(value) => {
                out.write_str("Some(")?;
                out.write_value(value)?;
                out.write_char(')')
            }
            None => out.write_str("None"),
        }
    }
}

impl<T: ReflectDebug> ReflectDebug for [T] {
    fn write_debug(&self, out: &mut DebugWriter<'_>) -> fmt::Result {
        out.write_seq(self)
    }
}

impl<T: ReflectDebug, const N: usize> ReflectDebug for [T; N] {
    fn write_debug(&self, out: &mut DebugWriter<'_>) -> fmt::Result {
        out.write_seq(self)
    }
}

impl<T: ReflectDebug> ReflectDebug for Vec<T> {
    fn write_debug(&self, out: &mut DebugWriter<'_>) -> fmt::Result {
        out.write_seq(self)
    }
}

impl<T: ReflectDebug> ReflectDebug for VecDeque<T> {
    fn write_debug(&self, out: &mut DebugWriter<'_>) -> fmt::Result {
        out.write_seq(self)
    }
}

macro_rules! reflect_debug_tuple {
    ($($name:ident),+) => {
        impl<$($name: ReflectDebug),+> ReflectDebug for ($($name,)+) {
            #[allow(non_snake_case)]
            fn write_debug(&self, out: &mut DebugWriter<'_>) -> fmt::Result {
                let ($($name,)+) = self;
                out.write_char('(')?;
                let mut first = true;
                $(
                    if !first {
                        out.write_str(", ")?;
                    }
                    first = false;
                    out.write_value($name)?;
                )+
                let _ = first;
                out.write_char(')')
            }
        }
    };
}

reflect_debug_tuple!(A);
reflect_debug_tuple!(A, B);
reflect_debug_tuple!(A, B, C);
reflect_debug_tuple!(A, B, C, D);

/// Writes `value` to `out`.
pub fn debug<V: ReflectDebug + ?Sized>(out: &mut dyn Write, value: &V, config: DebugConfig) -> fmt::Result {
    value.write_debug(&mut DebugWriter::new(out, config))
}

/// [`debug`] into a new string.
pub fn debug_str<V: ReflectDebug + ?Sized>(value: &V, config: DebugConfig) -> String {
    let mut buffer = String::new();
    // Writing to a `String` cannot fail; a failing `DebugWith` leaves partial output.
    let _ = debug(&mut buffer, value, config);
    buffer
}

/// Writes each value, separated by `, `.
pub fn debug_all(out: &mut dyn Write, values: &[&dyn ReflectDebug], config: DebugConfig) -> fmt::Result {
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            out.write_str(", ")?;
        }
        value.write_debug(&mut DebugWriter::new(&mut *out, config))?;
    }
    Ok(())
}

#[doc(hidden)]
pub mod probe {
    //! Picks the best available way to print a member value: its [`ReflectDebug`] impl, its
    //! `Debug` impl, or its type name. Used by `reflect_type!` through [`__debug_value!`].

    use std::{any::type_name, fmt};

    use super::{DebugWriter, ReflectDebug};

    pub struct DebugProbe<'a, T: ?Sized>(pub &'a T);

    pub trait ViaReflect {
        fn write_probe(&self, out: &mut DebugWriter<'_>) -> fmt::Result;
    }

    pub trait ViaDebug {
        fn write_probe(&self, out: &mut DebugWriter<'_>) -> fmt::Result;
    }

    pub trait ViaOpaque {
        fn write_probe(&self, out: &mut DebugWriter<'_>) -> fmt::Result;
    }

    impl<T: ReflectDebug + ?Sized> ViaReflect for &&DebugProbe<'_, T> {
        fn write_probe(&self, out: &mut DebugWriter<'_>) -> fmt::Result {
            self.0.write_debug(out)
        }
    }

    impl<T: fmt::Debug + ?Sized> ViaDebug for &DebugProbe<'_, T> {
        fn write_probe(&self, out: &mut DebugWriter<'_>) -> fmt::Result {
            fmt::Write::write_fmt(out, format_args!("{:?}", self.0))
        }
    }

    impl<T: ?Sized> ViaOpaque for DebugProbe<'_, T> {
        fn write_probe(&self, out: &mut DebugWriter<'_>) -> fmt::Result {
            fmt::Write::write_fmt(out, format_args!("<opaque {}>", type_name::<T>()))
        }
    }
}

/// Writes `$value` (a reference) to the [`DebugWriter`] `$out` with the best impl the value's
/// concrete type has.
#[doc(hidden)]
#[macro_export]
macro_rules! __debug_value {
    ($value:expr, $out:expr) => {{
        #[allow(unused_imports)]
        use $crate::runtime::debug::probe::{ViaDebug as _, ViaOpaque as _, ViaReflect as _};
        (&&&$crate::runtime::debug::probe::DebugProbe($value)).write_probe($out)
    }};
}

#[cfg(test)]
mod tests {
    use std::any::type_name;

    use super::*;

    #[test]
    fn primitives_and_containers() {
        let compact = DebugConfig::default().compact(true);
        assert_eq!(debug_str(&7u8, compact), "7");
        assert_eq!(debug_str(&true, compact), "true");
        assert_eq!(debug_str("hi", compact), r#""hi""#);
        assert_eq!(debug_str(&vec![1, 2, 3], compact), "[1, 2, 3]");
        assert_eq!(debug_str(&Some('x'), compact), "Some('x')");
        assert_eq!(debug_str(&(1, "a"), compact), r#"(1, "a")"#);
        assert_eq!(debug_str(&Vec::<u8>::new(), compact), "[]");
    }

    #[test]
    fn debug_output_falls_back_through_debug_to_opaque() {
        #[derive(Debug)]
        struct OnlyDebug;
        struct Nothing;

        let mut buffer = String::new();
        let mut out = DebugWriter::new(&mut buffer, DebugConfig::default());
        crate::__debug_value!(&5u32, &mut out).unwrap();
        out.write_str(" ").unwrap();
        crate::__debug_value!(&OnlyDebug, &mut out).unwrap();
        out.write_str(" ").unwrap();
        crate::__debug_value!(&Nothing, &mut out).unwrap();
        assert_eq!(buffer, format!("5 OnlyDebug <opaque {}>", type_name::<Nothing>()));
    }

    #[test]
    fn debug_all_separates_values() {
        let mut buffer = String::new();
        debug_all(&mut buffer, &[&1u8, &"two", &[3u8]], DebugConfig::default()).unwrap();
        assert_eq!(buffer, r#"1, "two", [3]"#);
    }

    #[test]
    fn config_builders() {
        let config = DebugConfig::default().compact(true).indent(4);
        assert!(config.is_compact());
        assert_eq!(config.indent_width(), 4);
        assert!(!DebugConfig::default().is_compact());
    }
}
