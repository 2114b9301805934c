/*!

# Fixed-Capacity Compile-Time Strings

[`ConstString<N>`] holds exactly `N` bytes of UTF-8 and can be built, compared, sliced and
concatenated in `const` context. The registration macro uses it to compute member display names
while compiling, storing the result in a `static`:

```
use static_reflect::{const_string, const_string::ConstString};

const GREETING: ConstString<5> = const_string!("hello");
const LOUD: ConstString<6> = GREETING.concat(&const_string!("!"));
assert_eq!(LOUD.as_str(), "hello!");
```

Sizes are part of the type, so a size mismatch is reported by the compiler when the constant is
evaluated:

```compile_fail
use static_reflect::const_string::ConstString;

const WRONG: ConstString<3> = ConstString::from_str("four");
```

*/

use std::{fmt, ops::Deref};

#[derive(Copy, Clone, Eq, Hash)]
pub struct ConstString<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> ConstString<N> {
    /// Copies `s`, which must be exactly `N` bytes long.
    pub const fn from_str(s: &str) -> Self {
        assert!(s.len() == N, "ConstString capacity does not match the string length");
        Self::from_range(s, 0)
    }

    /// Copies the `N` bytes of `s` starting at `start`. Both ends must fall on character boundaries.
    const fn from_range(s: &str, start: usize) -> Self {
        let source = s.as_bytes();
        assert!(start + N <= source.len(), "range out of bounds");
        let mut bytes = [0u8; N];
        let mut i = 0;
        while i < N {
            bytes[i] = source[start + i];
            i += 1;
        }
        ConstString { bytes }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub const fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    pub const fn as_str(&self) -> &str {
        match std::str::from_utf8(&self.bytes) {
            Ok(s) => s,
            Err(_) => panic!("ConstString holds invalid UTF-8"),
        }
    }

    /// Concatenation. `R` must be `N + M`.
    pub const fn concat<const M: usize, const R: usize>(
        &self,
        other: &ConstString<M>,
    ) -> ConstString<R> {
        assert!(R == N + M, "concatenation capacity must be the sum of both lengths");
        let mut bytes = [0u8; R];
        let mut i = 0;
        while i < N {
            bytes[i] = self.bytes[i];
            i += 1;
        }
        while i < R {
            bytes[i] = other.bytes[i - N];
            i += 1;
        }
        ConstString { bytes }
    }

    /// The `LEN` bytes starting at `START`.
    pub const fn substr<const START: usize, const LEN: usize>(&self) -> ConstString<LEN> {
        ConstString::<LEN>::from_range(self.as_str(), START)
    }

    /// Position of the first occurrence of `byte`.
    pub const fn find(&self, byte: u8) -> Option<usize> {
        let mut i = 0;
        while i < N {
            if self.bytes[i] == byte {
                return Some(i);
            }
            i += 1;
        }
        None
    }

    /// Position of the last occurrence of `byte`.
    pub const fn rfind(&self, byte: u8) -> Option<usize> {
        let mut i = N;
        while i > 0 {
            i -= 1;
            if self.bytes[i] == byte {
                return Some(i);
            }
        }
        None
    }

    pub const fn eq_str(&self, other: &str) -> bool {
        str_eq(self.as_str(), other)
    }

    /// The display name of an accessor; see [`display_name_len`].
    pub const fn display_name(
        name: &str,
        friendly_name: Option<&str>,
        is_property: bool,
        readable: bool,
        writable: bool,
    ) -> Self {
        if let Some(friendly) = friendly_name {
            if is_property {
                return Self::from_str(friendly);
            }
        }
        if !is_property {
            return Self::from_str(name);
        }

        let (start, case) = accessor_split(name, readable, writable);
        let mut normalized = Self::from_range(name, start);
        if N > 0 {
            normalized.bytes[0] = match case {
                Case::Keep => normalized.bytes[0],
                Case::Lower => normalized.bytes[0].to_ascii_lowercase(),
                Case::Upper => normalized.bytes[0].to_ascii_uppercase(),
            };
        }
        normalized
    }
}

impl<const N: usize, const M: usize> PartialEq<ConstString<M>> for ConstString<N> {
    fn eq(&self, other: &ConstString<M>) -> bool {
        self.as_bytes()[..] == other.as_bytes()[..]
    }
}

impl<const N: usize> PartialEq<str> for ConstString<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<const N: usize> PartialEq<&str> for ConstString<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<const N: usize> Deref for ConstString<N> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl<const N: usize> fmt::Debug for ConstString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for ConstString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `const` string equality.
pub const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

#[derive(Copy, Clone)]
enum Case {
    Keep,
    Lower,
    Upper,
}

/// Where a normalized accessor name starts in `name`, and what happens to its first letter.
///
/// Prefixes are only stripped from accessors that can actually read (`get`, `Get`) or write
/// (`set`, `Set`). A lowercase prefix must be followed by `_` and a non-uppercase letter
/// (`get_foo`) or by an uppercase letter (`getFoo`); a capitalized prefix must be followed by an
/// uppercase letter (`GetFoo`).
const fn accessor_split(name: &str, readable: bool, writable: bool) -> (usize, Case) {
    let bytes = name.as_bytes();
    if bytes.len() <= 3 {
        return (0, Case::Keep);
    }

    let prefix = [bytes[0], bytes[1], bytes[2]];
    let continues_pascal = bytes[3].is_ascii_uppercase();
    let continues_snake_or_camel = (bytes.len() > 4
        && bytes[3] == b'_'
        && !bytes[4].is_ascii_uppercase())
        || continues_pascal;

    let getter = readable
        && ((prefix_is(prefix, b"Get") && continues_pascal)
            || (prefix_is(prefix, b"get") && continues_snake_or_camel));
    let setter = writable
        && ((prefix_is(prefix, b"Set") && continues_pascal)
            || (prefix_is(prefix, b"set") && continues_snake_or_camel));
    if !(getter || setter) {
        return (0, Case::Keep);
    }

    let prefer_upper = prefix[0].is_ascii_uppercase();
    if bytes[3] == b'_' {
        (4, Case::Keep)
    } else if prefer_upper {
        (3, Case::Upper)
    } else {
        (3, Case::Lower)
    }
}

const fn prefix_is(prefix: [u8; 3], wanted: &[u8; 3]) -> bool {
    prefix[0] == wanted[0] && prefix[1] == wanted[1] && prefix[2] == wanted[2]
}

/// The length of the display name of a member: the property's friendly name if it has one, the
/// accessor name with its `get`/`set` prefix removed if it is a property, and the plain name
/// otherwise.
pub const fn display_name_len(
    name: &str,
    friendly_name: Option<&str>,
    is_property: bool,
    readable: bool,
    writable: bool,
) -> usize {
    if !is_property {
        return name.len();
    }
    if let Some(friendly) = friendly_name {
        return friendly.len();
    }
    name.len() - accessor_split(name, readable, writable).0
}

/// Builds a [`ConstString`] from a string literal or `const` `&str`, sized automatically.
#[macro_export]
macro_rules! const_string {
    ($s:expr) => {
        $crate::const_string::ConstString::<{ $s.len() }>::from_str($s)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! accessor_display_name {
        ($name:literal, readable = $readable:expr, writable = $writable:expr) => {{
            const LEN: usize = display_name_len($name, None, true, $readable, $writable);
            const NAME: ConstString<LEN> =
                ConstString::display_name($name, None, true, $readable, $writable);
            NAME
        }};
    }

    #[test]
    fn equality_is_by_length_and_contents() {
        const A: ConstString<3> = const_string!("abc");
        const B: ConstString<3> = const_string!("abc");
        const C: ConstString<2> = const_string!("ab");
        assert_eq!(A, B);
        assert_ne!(A, C);
        assert_eq!(A, "abc");
        assert!(A.eq_str("abc"));
    }

    #[test]
    fn concat_substr_and_search() {
        const HELLO: ConstString<5> = const_string!("hello");
        const WORLD: ConstString<6> = const_string!(" world");
        const BOTH: ConstString<11> = HELLO.concat(&WORLD);
        const TAIL: ConstString<5> = BOTH.substr::<6, 5>();
        assert_eq!(BOTH.as_str(), "hello world");
        assert_eq!(TAIL.as_str(), "world");
        assert_eq!(BOTH.find(b'o'), Some(4));
        assert_eq!(BOTH.rfind(b'o'), Some(7));
        assert_eq!(BOTH.find(b'z'), None);
    }

    #[test]
    fn accessor_prefixes_are_normalized() {
        assert_eq!(accessor_display_name!("get_foo", readable = true, writable = false), "foo");
        assert_eq!(accessor_display_name!("getFoo", readable = true, writable = false), "foo");
        assert_eq!(accessor_display_name!("GetFoo", readable = true, writable = false), "Foo");
        assert_eq!(accessor_display_name!("set_foo", readable = false, writable = true), "foo");
        assert_eq!(accessor_display_name!("SetFoo", readable = false, writable = true), "Foo");
    }

    #[test]
    fn irregular_accessors_keep_their_names() {
        assert_eq!(accessor_display_name!("getfoo", readable = true, writable = false), "getfoo");
        assert_eq!(accessor_display_name!("Getfoo", readable = true, writable = false), "Getfoo");
        assert_eq!(accessor_display_name!("Get_foo", readable = true, writable = false), "Get_foo");
        assert_eq!(accessor_display_name!("get_Foo", readable = true, writable = false), "get_Foo");
        assert_eq!(accessor_display_name!("get", readable = true, writable = false), "get");
        // a getter name on a member that cannot read
        assert_eq!(accessor_display_name!("get_foo", readable = false, writable = true), "get_foo");
    }

    #[test]
    fn friendly_names_and_plain_members() {
        const FRIENDLY: ConstString<5> =
            ConstString::display_name("get_value", Some("Value"), true, true, false);
        const PLAIN: ConstString<9> =
            ConstString::display_name("get_value", None, false, true, false);
        assert_eq!(FRIENDLY, "Value");
        assert_eq!(PLAIN, "get_value");
        assert_eq!(display_name_len("get_value", Some("Value"), false, true, false), 9);
    }
}
