//! The trait a payload must satisfy before it can be type-erased.
//!
//! This module provides the [`Callable`] trait, which describes invocation
//! with a fixed argument tuple and output type. Stable Rust has no variadic
//! generics, so a call signature `R(A1, A2, ...)` is encoded as the tuple
//! type `(A1, A2, ...)` together with the output type `R`. Blanket
//! implementations cover every `FnMut` closure, function item, and function
//! pointer of arity 0 through 12.

/// A value that can be invoked with the argument tuple `Args`.
///
/// This is the capability the erasure machinery dispatches through: a
/// payload stored behind a [`RawCall`](crate::RawCall) is called via the
/// vtable, which forwards to this trait's [`call`](Callable::call) method on
/// the concrete payload type.
///
/// Invocation takes `&mut self` so that stateful payloads (closures that
/// mutate their captures, functors with internal counters) work without
/// interior mutability. Plain `Fn` closures and function pointers satisfy
/// this automatically, since every `Fn` is also `FnMut`.
///
/// # Implementations
///
/// `Callable<(A1, ..., An)>` is implemented for every
/// `F: FnMut(A1, ..., An) -> R` up to twelve arguments. You normally never
/// implement this trait by hand; to wrap a value whose callable surface is
/// something other than an `Fn` implementation (for example a method that
/// produces a function pointer), adapt it with a closure or extract the
/// function pointer first.
///
/// # Examples
///
/// ```
/// use funbox_internals::callable::Callable;
///
/// fn add(a: i32, b: i32) -> i32 {
///     a + b
/// }
///
/// let mut f = add;
/// assert_eq!(Callable::call(&mut f, (2, 3)), 5);
///
/// let mut count = 0u32;
/// let mut counter = move || {
///     count += 1;
///     count
/// };
/// assert_eq!(Callable::call(&mut counter, ()), 1);
/// assert_eq!(Callable::call(&mut counter, ()), 2);
/// ```
pub trait Callable<Args>: 'static {
    /// The type returned by invoking the payload.
    type Output;

    /// Invokes the payload with the given argument tuple.
    fn call(&mut self, args: Args) -> Self::Output;
}

/// Implements [`Callable`] for `FnMut` values of a fixed arity.
///
/// The same identifiers serve as type parameters and as the binders of the
/// destructured argument tuple, which is why the generated impls allow
/// `non_snake_case`.
macro_rules! impl_callable_for_fn {
    ($(
        ($($param:ident),*)
    ),* $(,)?) => {
        $(
            #[allow(non_snake_case)]
            impl<Func, Out, $($param),*> Callable<($($param,)*)> for Func
            where
                Func: FnMut($($param),*) -> Out + 'static,
            {
                type Output = Out;

                #[inline]
                fn call(&mut self, ($($param,)*): ($($param,)*)) -> Out {
                    self($($param),*)
                }
            }
        )*
    };
}

impl_callable_for_fn!(
    (),
    (A1),
    (A1, A2),
    (A1, A2, A3),
    (A1, A2, A3, A4),
    (A1, A2, A3, A4, A5),
    (A1, A2, A3, A4, A5, A6),
    (A1, A2, A3, A4, A5, A6, A7),
    (A1, A2, A3, A4, A5, A6, A7, A8),
    (A1, A2, A3, A4, A5, A6, A7, A8, A9),
    (A1, A2, A3, A4, A5, A6, A7, A8, A9, A10),
    (A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11),
    (A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12),
);

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};

    use super::*;

    #[test]
    fn test_free_function() {
        fn double(x: i32) -> i32 {
            x * 2
        }

        let mut f = double;
        assert_eq!(Callable::call(&mut f, (21,)), 42);
    }

    #[test]
    fn test_function_pointer() {
        fn greet(name: String) -> String {
            let mut out = "hello, ".to_string();
            out.push_str(&name);
            out
        }

        let mut f: fn(String) -> String = greet;
        assert_eq!(Callable::call(&mut f, ("world".to_string(),)), "hello, world");
    }

    #[test]
    fn test_stateful_closure() {
        let mut total = 0i64;
        let mut accumulate = move |x: i64| {
            total += x;
            total
        };

        assert_eq!(Callable::call(&mut accumulate, (5,)), 5);
        assert_eq!(Callable::call(&mut accumulate, (7,)), 12);
    }

    #[test]
    fn test_zero_and_high_arity() {
        let mut nullary = || 1u8;
        assert_eq!(Callable::call(&mut nullary, ()), 1);

        let mut sum12 = |a: u32, b: u32, c: u32, d: u32, e: u32, f: u32, g: u32, h: u32, i: u32,
                         j: u32,
                         k: u32,
                         l: u32| a + b + c + d + e + f + g + h + i + j + k + l;
        assert_eq!(
            Callable::call(&mut sum12, (1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12)),
            78
        );
    }
}
