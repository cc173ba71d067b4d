use core::{any::TypeId, fmt};

use funbox_internals::{Callable, RawCall};

use crate::{
    fun::{mut_::FunMut, ref_::FunRef},
    markers::{self, Local, SendSync},
};

/// FIXME: Once rust-lang/rust#132922 gets resolved, we can make the `raw`
/// field an unsafe field and remove this module.
mod limit_field_access {
    use core::marker::PhantomData;

    use funbox_internals::{RawCall, RawCallMut, RawCallRef};

    use crate::markers::SendSync;

    /// A value-semantic wrapper around an arbitrary callable payload.
    ///
    /// A [`Fun`] can hold any payload that is callable with the signature
    /// `Args -> R`, is [`Clone`], and satisfies the thread-safety marker.
    /// The payload's concrete type is erased: wrappers holding a function
    /// pointer and a closure with the same signature have the same type and
    /// are interchangeable at the call site.
    ///
    /// # Type Parameters
    /// - `Args`: The arguments of the call signature, spelled as a tuple
    ///   type such as `()`, `(i32,)`, or `(String, usize)`.
    /// - `Output`: The type returned by an invocation.
    /// - `ThreadSafety`: The thread safety marker for the wrapper. This can
    ///   either be [`SendSync`] or [`Local`].
    ///
    /// [`SendSync`]: crate::markers::SendSync
    /// [`Local`]: crate::markers::Local
    #[repr(transparent)]
    pub struct Fun<Args: 'static, Output: 'static = (), ThreadSafety: 'static = SendSync> {
        /// # Safety
        ///
        /// The following safety invariants are guaranteed to be upheld as
        /// long as this struct exists:
        ///
        /// 1. `T` must either be `SendSync` or `Local`.
        /// 2. If `T = SendSync`: The payload embedded in the [`RawCall`]
        ///    must be `Send + Sync`.
        raw: RawCall<Args, Output>,
        _thread_safety: PhantomData<ThreadSafety>,
    }

    impl<Args, R, T> Fun<Args, R, T> {
        /// Creates a new [`Fun`] from a raw call handle.
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. `T` must either be `SendSync` or `Local`.
        /// 2. If `T = SendSync`: The payload embedded in the [`RawCall`]
        ///    must be `Send + Sync`.
        #[must_use]
        pub(crate) unsafe fn from_raw(raw: RawCall<Args, R>) -> Self {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Guaranteed by caller
            // 2. Guaranteed by caller
            Fun {
                raw,
                _thread_safety: PhantomData,
            }
        }

        /// Consumes the [`Fun`] and returns the inner [`RawCall`].
        #[must_use]
        pub(crate) fn into_raw(self) -> RawCall<Args, R> {
            // SAFETY: We are destroying `self`, so we no longer need to
            // uphold any safety invariants.
            self.raw
        }

        /// Creates a lifetime-bound [`RawCallRef`] from the inner
        /// [`RawCall`].
        #[must_use]
        pub(crate) fn as_raw_ref(&self) -> RawCallRef<'_, Args, R> {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Upheld as the type parameters do not change.
            // 2. No mutation is possible through the `RawCallRef`.
            let raw = &self.raw;

            raw.as_ref()
        }

        /// Creates a lifetime-bound [`RawCallMut`] from the inner
        /// [`RawCall`].
        #[must_use]
        pub(crate) fn as_raw_mut(&mut self) -> RawCallMut<'_, Args, R> {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Upheld as the type parameters do not change.
            // 2. The `RawCallMut` can mutate the payload, but not change its
            //    type, so the payload stays `Send + Sync` if it was.
            let raw = &mut self.raw;

            raw.as_mut()
        }

        /// Replaces the inner [`RawCall`], dropping the previous one.
        ///
        /// The replacement is already fully constructed when this method is
        /// entered, so the old payload is only destroyed once its successor
        /// exists.
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. If `T = SendSync`: The payload embedded in the new [`RawCall`]
        ///    must be `Send + Sync`.
        pub(crate) unsafe fn replace_raw(&mut self, raw: RawCall<Args, R>) {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Upheld as the type parameters do not change.
            // 2. Guaranteed by caller
            self.raw = raw;
        }

        /// Exchanges the inner [`RawCall`]s of two wrappers.
        ///
        /// This is a pointer swap: no payload is dropped, cloned, moved, or
        /// even touched, so this can never panic or allocate.
        pub fn swap(&mut self, other: &mut Self) {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Upheld as the type parameters do not change.
            // 2. Both wrappers have the same `T`, so both payloads already
            //    satisfy the invariant, in either slot.
            core::mem::swap(&mut self.raw, &mut other.raw);
        }
    }
}
pub use limit_field_access::Fun;

impl<Args, R, T> Fun<Args, R, T> {
    /// Allocates a new [`Fun`] embedding the given payload.
    ///
    /// The payload can be anything callable with the signature `Args -> R`:
    /// a function item, a function pointer, a capturing closure, or a
    /// stateful `FnMut` closure. It must be [`Clone`] (which is what funds
    /// [`Fun`]'s own [`Clone`] implementation) and must satisfy the
    /// thread-safety marker `T`.
    ///
    /// This performs exactly one heap allocation, regardless of the payload
    /// type. The payload is moved into the allocation.
    ///
    /// Note that a [`Fun`] is not itself [`Callable`], so wrapping a wrapper
    /// requires going through a closure. This is almost always a mistake
    /// rather than a goal, and the extra closure makes it a visible one.
    ///
    /// # Examples
    /// ```
    /// use funbox::Fun;
    ///
    /// let mut calls = 0u32;
    /// let mut f: Fun<(i32,), f64> = Fun::new(move |i: i32| {
    ///     calls += 10;
    ///     i as f64
    /// });
    /// assert_eq!(f.call((1,)), 1.0);
    /// ```
    #[must_use]
    pub fn new<F>(payload: F) -> Self
    where
        F: Callable<Args, Output = R> + Clone + markers::PayloadFor<T>,
    {
        let raw = RawCall::new(payload);

        // SAFETY:
        // 1. `F` is bounded by `markers::PayloadFor<T>` and this can only be
        //    implemented for `T=Local` and `T=SendSync`, so this is upheld.
        // 2. If `T=Local`, then this is trivially true. If `T=SendSync`,
        //    then the bound `F: PayloadFor<SendSync>` guarantees that the
        //    payload is `Send+Sync`.
        unsafe { Fun::from_raw(raw) }
    }

    /// Invokes the payload with the given argument tuple, forwarding
    /// whatever it returns.
    ///
    /// Taking `&mut self` allows the payload to mutate its captured state;
    /// it also means two invocations of the same wrapper can never overlap.
    /// Any panic raised by the payload propagates unchanged.
    ///
    /// # Examples
    /// ```
    /// use funbox::Fun;
    ///
    /// let mut f: Fun<(i32, i32), i32> = Fun::new(|a: i32, b: i32| a + b);
    /// assert_eq!(f.call((2, 2)), 4);
    /// ```
    pub fn call(&mut self, args: Args) -> R {
        self.as_raw_mut().call(args)
    }

    /// Replaces the payload with a new one, dropping the old payload.
    ///
    /// The new payload is boxed before the old one is dropped, so if
    /// constructing the replacement panics, the wrapper still holds the old
    /// payload untouched.
    ///
    /// # Examples
    /// ```
    /// use funbox::Fun;
    ///
    /// let mut f: Fun<(i32,), i32> = Fun::new(|x: i32| x * 2);
    /// assert_eq!(f.call((5,)), 10);
    ///
    /// f.set(|x: i32| x * 3);
    /// assert_eq!(f.call((5,)), 15);
    /// ```
    pub fn set<F>(&mut self, payload: F)
    where
        F: Callable<Args, Output = R> + Clone + markers::PayloadFor<T>,
    {
        let raw = RawCall::new(payload);

        // SAFETY:
        // 1. If `T=Local`, then this is trivially true. If `T=SendSync`,
        //    then the bound `F: PayloadFor<SendSync>` guarantees that the
        //    payload is `Send+Sync`.
        unsafe { self.replace_raw(raw) }
    }

    /// Changes the thread safety mode of the [`Fun`] to [`Local`].
    ///
    /// This method does not actually modify the wrapper in any way. It only
    /// has the effect of "forgetting" that the payload might actually be
    /// [`Send`] and [`Sync`].
    ///
    /// There is no inverse operation: once the payload's type is erased, its
    /// thread-safety can no longer be proven.
    #[must_use]
    pub fn into_local(self) -> Fun<Args, R, Local> {
        let raw = self.into_raw();

        // SAFETY:
        // 1. `T=Local`, so this is trivially true.
        // 2. `T=Local`, so this is trivially true.
        unsafe { Fun::from_raw(raw) }
    }

    /// Returns the [`TypeId`] of the payload.
    ///
    /// # Examples
    /// ```
    /// use std::any::TypeId;
    ///
    /// use funbox::Fun;
    ///
    /// fn double(x: i32) -> i32 {
    ///     x * 2
    /// }
    ///
    /// let f: Fun<(i32,), i32> = Fun::new(double as fn(i32) -> i32);
    /// assert_eq!(f.payload_type_id(), TypeId::of::<fn(i32) -> i32>());
    /// ```
    #[must_use]
    pub fn payload_type_id(&self) -> TypeId {
        self.as_raw_ref().payload_type_id()
    }

    /// Returns the [`core::any::type_name`] of the payload.
    ///
    /// As with [`core::any::type_name`] itself, the returned string is only
    /// meant for diagnostics. It is not unique and its exact contents must
    /// not be relied upon.
    #[must_use]
    pub fn payload_type_name(&self) -> &'static str {
        self.as_raw_ref().payload_type_name()
    }

    /// Returns a reference to the payload, if the payload is of type `F`.
    ///
    /// # Examples
    /// ```
    /// use funbox::Fun;
    ///
    /// fn double(x: i32) -> i32 {
    ///     x * 2
    /// }
    ///
    /// let f: Fun<(i32,), i32> = Fun::new(double as fn(i32) -> i32);
    ///
    /// let inner: &fn(i32) -> i32 = f.downcast_ref().unwrap();
    /// assert_eq!(inner(4), 8);
    /// assert!(f.downcast_ref::<fn()>().is_none());
    /// ```
    #[must_use]
    pub fn downcast_ref<F: 'static>(&self) -> Option<&F> {
        self.as_raw_ref().payload_downcast()
    }

    /// Returns a mutable reference to the payload, if the payload is of
    /// type `F`.
    ///
    /// This allows mutating the payload's state directly, without going
    /// through an invocation.
    ///
    /// # Examples
    /// ```
    /// use funbox::Fun;
    ///
    /// fn double(x: i32) -> i32 {
    ///     x * 2
    /// }
    /// fn triple(x: i32) -> i32 {
    ///     x * 3
    /// }
    ///
    /// let mut f: Fun<(i32,), i32> = Fun::new(double as fn(i32) -> i32);
    ///
    /// *f.downcast_mut::<fn(i32) -> i32>().unwrap() = triple;
    /// assert_eq!(f.call((5,)), 15);
    /// ```
    #[must_use]
    pub fn downcast_mut<F: 'static>(&mut self) -> Option<&mut F> {
        self.as_raw_mut().payload_downcast_mut()
    }

    /// Returns a reference to the payload without checking its type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The payload is actually of type `F` (can be verified by calling
    ///    [`payload_type_id()`] first)
    ///
    /// [`payload_type_id()`]: Fun::payload_type_id
    #[must_use]
    pub unsafe fn downcast_ref_unchecked<F: 'static>(&self) -> &F {
        let raw = self.as_raw_ref();

        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { raw.payload_downcast_unchecked() }
    }

    /// Returns a shared reference to the wrapper's payload.
    #[must_use]
    pub fn as_ref(&self) -> FunRef<'_, Args, R> {
        FunRef::from_raw(self.as_raw_ref())
    }

    /// Returns a mutable reference to the wrapper's payload.
    ///
    /// The returned [`FunMut`] can invoke the payload, so this is the way to
    /// hand out invocation rights without handing over the wrapper itself.
    #[must_use]
    pub fn as_mut(&mut self) -> FunMut<'_, Args, R> {
        FunMut::from_raw(self.as_raw_mut())
    }
}

impl<Args, R, T> Clone for Fun<Args, R, T> {
    /// Allocates an independent deep copy of the wrapper.
    ///
    /// The payload is cloned through its own [`Clone`] implementation, so
    /// the copy captures the payload's state at this moment and evolves
    /// independently from here on. Wrappers never share state.
    fn clone(&self) -> Self {
        let raw = self.as_raw_ref().clone_call();

        // SAFETY:
        // 1. Guaranteed by the invariants of this type.
        // 2. The cloned payload has the same type as the original, which is
        //    `Send + Sync` by the invariants of this type.
        unsafe { Fun::from_raw(raw) }
    }

    /// Replaces `self` with a deep copy of `source`.
    ///
    /// The copy is fully constructed before the old payload is dropped, so
    /// a panic inside the payload's [`Clone`] implementation leaves `self`
    /// untouched. Note that unlike most `clone_from` implementations this
    /// one cannot reuse `self`'s allocation, as the two payload types may
    /// differ.
    fn clone_from(&mut self, source: &Self) {
        let raw = source.as_raw_ref().clone_call();

        // SAFETY:
        // 1. The cloned payload has the same type as `source`'s, which is
        //    `Send + Sync` by the invariants of `source`'s type.
        unsafe { self.replace_raw(raw) }
    }
}

impl<Args, R, T> fmt::Debug for Fun<Args, R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fun")
            .field("payload", &self.payload_type_name())
            .finish()
    }
}

impl<Args, R> From<Fun<Args, R, SendSync>> for Fun<Args, R, Local> {
    fn from(fun: Fun<Args, R, SendSync>) -> Self {
        fun.into_local()
    }
}

// SAFETY: The `SendSync` marker indicates that the payload is `Send`+`Sync`.
// Therefore it is safe to implement `Send`+`Sync` for the wrapper itself.
unsafe impl<Args, R> Send for Fun<Args, R, SendSync> {}

// SAFETY: The `SendSync` marker indicates that the payload is `Send`+`Sync`.
// Therefore it is safe to implement `Send`+`Sync` for the wrapper itself.
unsafe impl<Args, R> Sync for Fun<Args, R, SendSync> {}

impl<Args, R, T> Unpin for Fun<Args, R, T> {}

#[cfg(test)]
mod tests {
    use alloc::{
        format,
        rc::Rc,
        string::{String, ToString},
        vec::Vec,
    };
    use core::cell::{Cell, RefCell};

    use super::*;

    #[allow(dead_code)]
    struct NonSend(*const ());
    static_assertions::assert_not_impl_any!(NonSend: Send, Sync);

    #[test]
    fn test_fun_send_sync() {
        static_assertions::assert_impl_all!(Fun<(), (), SendSync>: Send, Sync);
        static_assertions::assert_impl_all!(Fun<(String,), usize, SendSync>: Send, Sync);

        static_assertions::assert_not_impl_any!(Fun<(), (), Local>: Send, Sync);
        static_assertions::assert_not_impl_any!(Fun<(String,), usize, Local>: Send, Sync);
    }

    #[test]
    fn test_fun_unpin() {
        static_assertions::assert_impl_all!(Fun<(), (), SendSync>: Unpin);
        static_assertions::assert_impl_all!(Fun<(), (), Local>: Unpin);
    }

    #[test]
    fn test_fun_is_not_callable() {
        // A wrapper is deliberately not a payload: wrapping a wrapper must
        // go through an explicit closure.
        static_assertions::assert_not_impl_any!(Fun<(), ()>: Callable<()>);
        static_assertions::assert_not_impl_any!(Fun<(i32,), i32>: Callable<(i32,)>);
    }

    #[test]
    fn test_fun_is_pointer_sized() {
        assert_eq!(
            core::mem::size_of::<Fun<(), ()>>(),
            core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<Option<Fun<(String, u64), String>>>(),
            core::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_stateful_payload_keeps_state_across_calls() {
        let mut calls = 0i32;
        let mut f: Fun<(i32,), f64> = Fun::new(move |i: i32| {
            calls += 10;
            i as f64
        });

        assert_eq!(f.call((1,)), 1.0);
        assert_eq!(f.call((2,)), 2.0);
    }

    #[test]
    fn test_capturing_closure_payload() {
        let prefix = "in lambda: ".to_string();
        let mut f: Fun<(String,), String> = Fun::new(move |s: String| format!("{prefix}{s}"));

        assert_eq!(f.call(("hello!".to_string(),)), "in lambda: hello!");
    }

    #[test]
    fn test_same_wrapper_type_holds_any_payload_kind() {
        fn free_function(x: i32) -> i32 {
            x + 1
        }

        let offset = 5;
        let mut funs: Vec<Fun<(i32,), i32>> = Vec::new();
        funs.push(Fun::new(free_function));
        funs.push(Fun::new(free_function as fn(i32) -> i32));
        funs.push(Fun::new(move |x: i32| x + offset));

        let results: Vec<i32> = funs.iter_mut().map(|f| f.call((10,))).collect();
        assert_eq!(results, [11, 11, 15]);
    }

    #[test]
    fn test_payload_obtained_by_pointer_conversion() {
        use core::any::TypeId;

        // An object that is not itself callable, but converts to a function
        // pointer. Extracting the pointer first is what makes it wrappable.
        struct Answer;

        impl From<Answer> for fn(i32) -> i32 {
            fn from(_: Answer) -> Self {
                |x| x + 42
            }
        }

        let ptr: fn(i32) -> i32 = Answer.into();
        let mut f: Fun<(i32,), i32> = Fun::new(ptr);

        assert_eq!(f.call((0,)), 42);
        assert_eq!(f.payload_type_id(), TypeId::of::<fn(i32) -> i32>());
    }

    #[test]
    fn test_local_payload_with_shared_counter() {
        let hits = Rc::new(Cell::new(0u32));
        let observer = hits.clone();
        let mut f: Fun<(), (), Local> = Fun::new(move || {
            observer.set(observer.get() + 1);
        });

        f.call(());
        f.call(());
        assert_eq!(hits.get(), 2);

        // Cloning the wrapper clones the Rc, so the clone observes the same
        // counter.
        let mut g = f.clone();
        g.call(());
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn test_clone_is_a_deep_copy() {
        let mut total = 0u64;
        let mut original: Fun<(u64,), u64> = Fun::new(move |x: u64| {
            total += x;
            total
        });

        assert_eq!(original.call((5,)), 5);

        let mut cloned = original.clone();
        assert_eq!(cloned.call((1,)), 6);
        assert_eq!(cloned.call((1,)), 7);
        assert_eq!(original.call((100,)), 105);
    }

    #[test]
    fn test_clone_from_replaces_payload() {
        let mut target: Fun<(i32,), i32> = Fun::new(|x: i32| x);
        let source: Fun<(i32,), i32> = Fun::new((|x: i32| x * 2) as fn(i32) -> i32);

        target.clone_from(&source);

        assert_eq!(target.call((21,)), 42);
        assert_eq!(target.payload_type_id(), source.payload_type_id());
    }

    #[test]
    fn test_swap_exchanges_payloads() {
        let mut doubler: Fun<(i32,), i32> = Fun::new(|x: i32| x * 2);
        let mut tripler: Fun<(i32,), i32> = Fun::new(|x: i32| x * 3);

        doubler.swap(&mut tripler);

        assert_eq!(doubler.call((5,)), 15);
        assert_eq!(tripler.call((5,)), 10);
    }

    #[test]
    fn test_swap_twice_restores_payloads() {
        let mut counter = 0u32;
        let mut f: Fun<(), u32> = Fun::new(move || {
            counter += 1;
            counter
        });
        let mut g: Fun<(), u32> = Fun::new(|| 0u32);

        assert_eq!(f.call(()), 1);

        f.swap(&mut g);
        g.swap(&mut f);

        // The stateful payload ends up back in `f`, state intact.
        assert_eq!(f.call(()), 2);
        assert_eq!(g.call(()), 0);
    }

    #[test]
    fn test_set_replaces_payload() {
        let mut f: Fun<(i32,), i32> = Fun::new(|x: i32| x * 2);
        assert_eq!(f.call((5,)), 10);

        let factor = 4;
        f.set(move |x: i32| x * factor);
        assert_eq!(f.call((5,)), 20);
    }

    #[test]
    fn test_set_drops_old_payload() {
        #[derive(Clone)]
        struct DropTracker(Rc<Cell<u32>>);

        impl Drop for DropTracker {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0u32));
        let tracker = DropTracker(drops.clone());

        let mut f: Fun<(), u32, Local> = Fun::new(move || tracker.0.get());
        assert_eq!(drops.get(), 0);

        f.set(|| 7u32);
        assert_eq!(drops.get(), 1);
        assert_eq!(f.call(()), 7);
    }

    #[test]
    fn test_into_local_preserves_payload() {
        let f: Fun<(i32,), i32> = Fun::new(|x: i32| x - 1);
        let type_id = f.payload_type_id();

        let mut local: Fun<(i32,), i32, Local> = f.into_local();
        assert_eq!(local.payload_type_id(), type_id);
        assert_eq!(local.call((1,)), 0);

        let mut via_from: Fun<(i32,), i32, Local> = Fun::<(i32,), i32>::new(|x: i32| x - 1).into();
        assert_eq!(via_from.call((1,)), 0);
    }

    #[test]
    fn test_downcast_roundtrip() {
        fn double(x: i32) -> i32 {
            x * 2
        }
        fn triple(x: i32) -> i32 {
            x * 3
        }

        let mut f: Fun<(i32,), i32> = Fun::new(double as fn(i32) -> i32);

        assert!(f.downcast_ref::<fn()>().is_none());
        let inner: &fn(i32) -> i32 = f.downcast_ref().unwrap();
        assert_eq!(inner(4), 8);

        *f.downcast_mut::<fn(i32) -> i32>().unwrap() = triple;
        assert_eq!(f.call((5,)), 15);
    }

    #[test]
    fn test_unchecked_downcast() {
        fn double(x: i32) -> i32 {
            x * 2
        }

        let f: Fun<(i32,), i32> = Fun::new(double as fn(i32) -> i32);

        // SAFETY: The payload type is exactly `fn(i32) -> i32`.
        let inner: &fn(i32) -> i32 = unsafe { f.downcast_ref_unchecked() };
        assert_eq!(inner(3), 6);
    }

    #[test]
    fn test_debug_names_the_payload_type() {
        let f: Fun<(), ()> = Fun::new(|| {});
        let rendered = format!("{f:?}");

        assert!(rendered.starts_with("Fun"));
        assert!(rendered.contains("test_debug_names_the_payload_type"));
    }

    #[test]
    fn test_drop_behavior() {
        struct DropTracker {
            log: Rc<RefCell<Vec<&'static str>>>,
            tag: &'static str,
        }

        impl Clone for DropTracker {
            fn clone(&self) -> Self {
                DropTracker {
                    log: self.log.clone(),
                    tag: "clone",
                }
            }
        }

        impl Drop for DropTracker {
            fn drop(&mut self) {
                self.log.borrow_mut().push(self.tag);
            }
        }

        let log = Rc::new(RefCell::new(Vec::new()));

        {
            let tracker = DropTracker {
                log: log.clone(),
                tag: "original",
            };
            let f: Fun<(), bool, Local> = Fun::new(move || !tracker.tag.is_empty());
            let g = f.clone();

            assert!(log.borrow().is_empty());
            drop(f);
            assert_eq!(*log.borrow(), ["original"]);
            drop(g);
        }

        assert_eq!(*log.borrow(), ["original", "clone"]);
    }
}
