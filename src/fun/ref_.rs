use core::{any::TypeId, fmt};

use funbox_internals::RawCallRef;

/// A shared reference to the payload of a [`Fun`].
///
/// A [`FunRef`] can inspect the payload (its [`TypeId`], its type name, and
/// its value through a checked downcast) but cannot invoke it, since
/// invocation may mutate the payload's state. Use [`FunMut`] for invocation.
///
/// [`FunRef`] is [`Copy`], so it can be passed around freely.
///
/// # Examples
/// ```
/// use funbox::{Fun, FunRef};
///
/// fn double(x: i32) -> i32 {
///     x * 2
/// }
///
/// let f: Fun<(i32,), i32> = Fun::new(double as fn(i32) -> i32);
/// let r: FunRef<'_, (i32,), i32> = f.as_ref();
///
/// let inner: &fn(i32) -> i32 = r.downcast_ref().unwrap();
/// assert_eq!(inner(4), 8);
/// ```
///
/// [`Fun`]: crate::Fun
/// [`FunMut`]: crate::FunMut
#[repr(transparent)]
pub struct FunRef<'a, Args: 'static, Output: 'static = ()> {
    raw: RawCallRef<'a, Args, Output>,
}

impl<Args, R> Copy for FunRef<'_, Args, R> {}
impl<Args, R> Clone for FunRef<'_, Args, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, Args, R> FunRef<'a, Args, R> {
    /// Creates a new [`FunRef`] from a raw call reference.
    pub(crate) fn from_raw(raw: RawCallRef<'a, Args, R>) -> Self {
        FunRef { raw }
    }

    pub(crate) fn as_raw_ref(self) -> RawCallRef<'a, Args, R> {
        self.raw
    }

    /// Returns the [`TypeId`] of the payload.
    #[must_use]
    pub fn payload_type_id(self) -> TypeId {
        self.as_raw_ref().payload_type_id()
    }

    /// Returns the [`core::any::type_name`] of the payload.
    ///
    /// As with [`core::any::type_name`] itself, the returned string is only
    /// meant for diagnostics. It is not unique and its exact contents must
    /// not be relied upon.
    #[must_use]
    pub fn payload_type_name(self) -> &'static str {
        self.as_raw_ref().payload_type_name()
    }

    /// Returns a reference to the payload, if the payload is of type `F`.
    ///
    /// # Examples
    /// ```
    /// use funbox::Fun;
    ///
    /// let prefix = "in lambda: ".to_string();
    /// let f: Fun<(String,), String> = Fun::new(move |s: String| format!("{prefix}{s}"));
    /// let r = f.as_ref();
    ///
    /// // The closure's type cannot be named, so only mismatches can be
    /// // demonstrated here.
    /// assert!(r.downcast_ref::<fn(String) -> String>().is_none());
    /// ```
    #[must_use]
    pub fn downcast_ref<F: 'static>(self) -> Option<&'a F> {
        self.as_raw_ref().payload_downcast()
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
    /// [`payload_type_id()`]: FunRef::payload_type_id
    #[must_use]
    pub unsafe fn downcast_ref_unchecked<F: 'static>(self) -> &'a F {
        let raw = self.as_raw_ref();

        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { raw.payload_downcast_unchecked() }
    }
}

impl<Args, R> fmt::Debug for FunRef<'_, Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunRef")
            .field("payload", &self.payload_type_name())
            .finish()
    }
}
