/*!

# Proxies

A proxy is a type that stands in for a reflected `Target` and may replace the behavior of some of
its members. It implements [`Proxy`], saying where its target lives, and then the traits
`reflect_type!` generates for the target:

- `<Target>Proxy`, one method per reflected function with the function's receiver and
  signature (a function without a receiver takes `&self` here);
- `<Target>FieldProxy`, per field a getter `name(&self) -> &V`;
- `<Target>FieldProxyMut`, per field a setter `set_name(&mut self, V)`. Setters live in a trait of
  their own so that fields named `foo` and `set_foo` can both be reflected.

Every generated method has a default body that forwards to a generic hook on [`Proxy`]
([`read_field`](Proxy::read_field), [`call_ref`](Proxy::call_ref), ...), and every hook defaults
to the target's real member. A proxy overrides single members by name in its impl of the
generated trait, or every member of one shape at once by overriding a hook:

```rust
use static_reflect::{proxy::Proxy, reflect_type};

#[derive(Default)]
pub struct Point { x: i32, y: i32 }

reflect_type! { pub Point { fields { x: i32, y: i32 } } }

struct Mirrored(Point, i32);

impl Proxy for Mirrored {
    type Target = Point;
    fn target(&self) -> &Point { &self.0 }
    fn target_mut(&mut self) -> &mut Point { &mut self.0 }
}

impl PointFieldProxy for Mirrored {
    fn x(&self) -> &i32 { &self.1 }
}

let proxy = Mirrored(Point { x: 1, y: 2 }, -1);
assert_eq!(*proxy.x(), -1);
assert_eq!(*proxy.y(), 2);
```

Resolution is ordinary trait method resolution: an override in the impl wins over the default.

*/

use crate::{
    descriptor::Reflect,
    member::{ByMut, ByRef, FieldDescriptor, FunctionDescriptor, Static},
};

pub trait Proxy {
    type Target: Reflect;

    fn target(&self) -> &Self::Target;

    fn target_mut(&mut self) -> &mut Self::Target;

    /// Every generated field getter goes through here.
    fn read_field<F>(&self) -> &F::Value
    where
        F: FieldDescriptor<Declarer = Self::Target>,
    {
        F::get(self.target())
    }

    /// Every generated field setter goes through here.
    fn write_field<F>(&mut self, value: F::Value)
    where
        F: FieldDescriptor<Declarer = Self::Target>,
    {
        F::set(self.target_mut(), value)
    }

    fn call_ref<F>(&self, args: F::Args) -> F::Output
    where
        F: FunctionDescriptor<Declarer = Self::Target, Receiver = ByRef>,
    {
        F::call(self.target(), args)
    }

    fn call_mut<F>(&mut self, args: F::Args) -> F::Output
    where
        F: FunctionDescriptor<Declarer = Self::Target, Receiver = ByMut>,
    {
        F::call(self.target_mut(), args)
    }

    fn call_static<F>(&self, args: F::Args) -> F::Output
    where
        F: FunctionDescriptor<Declarer = Self::Target, Receiver = Static>,
    {
        F::call((), args)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{is_proxy, reflect_type};

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Point {
        x: i32,
        y: i32,
    }

    impl Point {
        fn manhattan(&self) -> i32 {
            self.x.abs() + self.y.abs()
        }

        fn shift(&mut self, dx: i32) {
            self.x += dx;
        }

        fn unit() -> Point {
            Point { x: 1, y: 1 }
        }
    }

    reflect_type! {
        pub Point {
            fields {
                x: i32,
                y: i32,
            }
            functions {
                fn manhattan(&self) -> i32;
                fn shift(&mut self, dx: i32);
                fn unit() -> Point;
            }
        }
    }

    /// Overrides `x` only.
    struct FixedX {
        point: Point,
        x: i32,
    }

    impl Proxy for FixedX {
        type Target = Point;

        fn target(&self) -> &Point {
            &self.point
        }

        fn target_mut(&mut self) -> &mut Point {
            &mut self.point
        }
    }

    impl PointFieldProxy for FixedX {
        fn x(&self) -> &i32 {
            &self.x
        }
    }

    impl PointFieldProxyMut for FixedX {}

    impl PointProxy for FixedX {}

    #[test]
    fn overrides_take_precedence_over_defaults() {
        let mut proxy = FixedX {
            point: Point { x: 3, y: 4 },
            x: 100,
        };
        assert_eq!(*proxy.x(), 100);
        assert_eq!(*proxy.y(), 4);

        proxy.set_y(5);
        proxy.set_x(6);
        assert_eq!(proxy.point, Point { x: 6, y: 5 });
        assert_eq!(*proxy.x(), 100);
    }

    #[test]
    fn functions_forward_to_the_target() {
        let mut proxy = FixedX {
            point: Point { x: -2, y: 4 },
            x: 0,
        };
        assert_eq!(PointProxy::manhattan(&proxy), 6);
        PointProxy::shift(&mut proxy, 5);
        assert_eq!(proxy.point.x, 3);
        assert_eq!(PointProxy::unit(&proxy), Point { x: 1, y: 1 });
    }

    /// Intercepts every `&self` call through the hook.
    struct Counting {
        point: Point,
        calls: Cell<usize>,
    }

    impl Proxy for Counting {
        type Target = Point;

        fn target(&self) -> &Point {
            &self.point
        }

        fn target_mut(&mut self) -> &mut Point {
            &mut self.point
        }

        fn call_ref<F>(&self, args: F::Args) -> F::Output
        where
            F: FunctionDescriptor<Declarer = Point, Receiver = ByRef>,
        {
            self.calls.set(self.calls.get() + 1);
            assert_eq!(F::NAME, "manhattan");
            F::call(self.target(), args)
        }
    }

    impl PointProxy for Counting {}

    #[test]
    fn hooks_intercept_every_member_of_a_shape() {
        let proxy = Counting {
            point: Point { x: 1, y: 1 },
            calls: Cell::new(0),
        };
        assert_eq!(proxy.manhattan(), 2);
        assert_eq!(proxy.manhattan(), 2);
        assert_eq!(proxy.calls.get(), 2);
    }

    #[test]
    fn proxies_are_detected() {
        assert!(is_proxy!(FixedX));
        assert!(is_proxy!(Counting));
        assert!(!is_proxy!(Point));
    }

    /// Fields whose names differ only by a `set_` prefix.
    #[derive(Default)]
    pub struct Switch {
        on: bool,
        set_on: bool,
    }

    reflect_type! {
        pub Switch {
            fields {
                on: bool,
                set_on: bool,
            }
        }
    }

    struct SwitchPanel(Switch);

    impl Proxy for SwitchPanel {
        type Target = Switch;

        fn target(&self) -> &Switch {
            &self.0
        }

        fn target_mut(&mut self) -> &mut Switch {
            &mut self.0
        }
    }

    impl SwitchFieldProxy for SwitchPanel {}
    impl SwitchFieldProxyMut for SwitchPanel {}

    #[test]
    fn getters_and_setters_do_not_collide() {
        let mut panel = SwitchPanel(Switch::default());
        SwitchFieldProxyMut::set_on(&mut panel, true);
        assert!(*panel.on());
        assert!(!*SwitchFieldProxy::set_on(&panel));
        SwitchFieldProxyMut::set_set_on(&mut panel, true);
        assert!(panel.0.set_on);
    }
}
