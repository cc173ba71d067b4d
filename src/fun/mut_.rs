use core::{any::TypeId, fmt};

use funbox_internals::RawCallMut;

use crate::fun::ref_::FunRef;

/// A mutable reference to the payload of a [`Fun`].
///
/// [`FunMut`] provides everything short of ownership: it can invoke the
/// payload, mutate it through a checked downcast, and inspect it. It is the
/// way to hand out invocation rights without handing over the wrapper
/// itself.
///
/// # Key Characteristics
///
/// - **Not `Copy` or `Clone`**: Ensures exclusive mutable access
/// - **Lifetime-bound**: Tied to the borrow of the underlying wrapper
/// - **Consuming invocation**: [`call`](FunMut::call) takes `self`; use
///   [`reborrow`](FunMut::reborrow) to invoke repeatedly
///
/// # Examples
/// ```
/// use funbox::{Fun, FunMut};
///
/// let mut total = 0u32;
/// let mut f: Fun<(u32,), u32> = Fun::new(move |x: u32| {
///     total += x;
///     total
/// });
///
/// let mut m: FunMut<'_, (u32,), u32> = f.as_mut();
/// assert_eq!(m.reborrow().call((2,)), 2);
/// assert_eq!(m.call((3,)), 5);
/// ```
///
/// [`Fun`]: crate::Fun
#[repr(transparent)]
pub struct FunMut<'a, Args: 'static, Output: 'static = ()> {
    raw: RawCallMut<'a, Args, Output>,
}

impl<'a, Args, R> FunMut<'a, Args, R> {
    /// Creates a new [`FunMut`] from a raw mutable call reference.
    pub(crate) fn from_raw(raw: RawCallMut<'a, Args, R>) -> Self {
        FunMut { raw }
    }

    pub(crate) fn into_raw(self) -> RawCallMut<'a, Args, R> {
        self.raw
    }

    /// Reborrows this [`FunMut`] as a shared [`FunRef`].
    #[must_use]
    pub fn as_ref(&self) -> FunRef<'_, Args, R> {
        FunRef::from_raw(self.raw.as_ref())
    }

    /// Reborrows this [`FunMut`] for a shorter lifetime.
    ///
    /// This allows calling consuming methods like [`FunMut::call`] without
    /// giving up the original borrow.
    #[must_use]
    pub fn reborrow(&mut self) -> FunMut<'_, Args, R> {
        FunMut {
            raw: self.raw.reborrow(),
        }
    }

    /// Invokes the payload with the given argument tuple, forwarding
    /// whatever it returns.
    ///
    /// This consumes the reference, as the invocation may mutate the
    /// payload's state for the full borrow. To invoke more than once, go
    /// through [`reborrow`](FunMut::reborrow).
    pub fn call(self, args: Args) -> R {
        self.into_raw().call(args)
    }

    /// Returns the [`TypeId`] of the payload.
    #[must_use]
    pub fn payload_type_id(&self) -> TypeId {
        self.as_ref().payload_type_id()
    }

    /// Returns the [`core::any::type_name`] of the payload.
    #[must_use]
    pub fn payload_type_name(&self) -> &'static str {
        self.as_ref().payload_type_name()
    }

    /// Returns a mutable reference to the payload, if the payload is of
    /// type `F`.
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
    /// let m = f.as_mut();
    /// *m.downcast_mut::<fn(i32) -> i32>().unwrap() = triple;
    /// assert_eq!(f.call((5,)), 15);
    /// ```
    #[must_use]
    pub fn downcast_mut<F: 'static>(self) -> Option<&'a mut F> {
        self.into_raw().payload_downcast_mut()
    }
}

impl<Args, R> fmt::Debug for FunMut<'_, Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunMut")
            .field("payload", &self.payload_type_name())
            .finish()
    }
}
