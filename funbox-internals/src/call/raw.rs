//! Type-erased payload pointer types.
//!
//! This module encapsulates the `ptr` field of [`RawCall`], [`RawCallRef`],
//! and [`RawCallMut`], ensuring it is only visible within this module. This
//! visibility restriction guarantees the safety invariant: **the pointer
//! always comes from `Box<CallData<Args, R, F>>`**.
//!
//! # Safety Invariant
//!
//! Since the `ptr` field can only be set via [`RawCall::new`] (which creates
//! it from `Box::into_raw`), and cannot be modified afterward (no `pub` or
//! `pub(crate)` fields), the pointer provenance remains valid throughout the
//! value's lifetime.
//!
//! The [`RawCall::drop`] implementation relies on this invariant to safely
//! reconstruct the `Box` and deallocate the memory.
//!
//! # Type Erasure
//!
//! The concrete payload type parameter `F` is erased by casting to
//! `CallData<Args, R, Erased>`. The call signature `(Args, R)` is *not*
//! erased: it stays in the handle's type, which is what makes handles of
//! different signatures unrelated types. The vtable stored within the
//! `CallData` provides the runtime type information needed to safely invoke,
//! clone, and downcast the payload.

use alloc::boxed::Box;
use core::{any::TypeId, ptr::NonNull};

use crate::{call::data::CallData, callable::Callable, util::Erased};

/// A pointer to a [`CallData`] that is guaranteed to point to an initialized
/// instance of a [`CallData<Args, R, F>`] for some specific `F`, though we
/// do not know which actual `F` it is.
///
/// However, the pointer is allowed to transition into a non-initialized
/// state inside the [`RawCall::drop`] method.
///
/// The pointer is guaranteed to have been created using [`Box::into_raw`].
///
/// We cannot use a [`Box<CallData<Args, R, F>>`] directly, because that does
/// not allow us to type-erase the `F`.
///
/// [`CallData`]: super::data::CallData
/// [`CallData<Args, R, F>`]: super::data::CallData
#[repr(transparent)]
pub struct RawCall<Args: 'static, R: 'static> {
    /// Pointer to the inner payload data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long
    /// as this struct exists:
    ///
    /// 1. The pointer must have been created from a
    ///    `Box<CallData<Args, R, F>>` for some `F` using `Box::into_raw`,
    ///    where `F` implements `Callable<Args, Output = R> + Clone`.
    /// 2. The pointer will point to the same `CallData<Args, R, F>` for the
    ///    entire lifetime of this object.
    /// 3. The pointee is properly initialized for the entire lifetime of
    ///    this object, except during the execution of the `Drop`
    ///    implementation.
    ptr: NonNull<CallData<Args, R, Erased>>,
}

impl<Args: 'static, R: 'static> RawCall<Args, R> {
    /// Allocates a new [`RawCall`] embedding the specified payload.
    ///
    /// This performs exactly one heap allocation. The payload is moved into
    /// the allocation, so constructing from a temporary never copies it.
    ///
    /// [`RawCall`] has no empty state: every instance owns a live payload
    /// from construction until drop.
    #[inline]
    pub fn new<F>(payload: F) -> Self
    where
        F: Callable<Args, Output = R> + Clone,
    {
        let ptr = Box::new(CallData::new(payload));
        let ptr: *mut CallData<Args, R, F> = Box::into_raw(ptr);
        let ptr: *mut CallData<Args, R, Erased> = ptr.cast::<CallData<Args, R, Erased>>();

        // SAFETY: `Box::into_raw` returns a non-null pointer
        let ptr: NonNull<CallData<Args, R, Erased>> = unsafe { NonNull::new_unchecked(ptr) };

        Self { ptr }
    }

    /// Returns a lifetime-bound shared reference to the [`CallData`]
    /// instance.
    ///
    /// [`CallData`]: super::data::CallData
    #[inline]
    pub fn as_ref(&self) -> RawCallRef<'_, Args, R> {
        RawCallRef {
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }

    /// Returns a lifetime-bound mutable reference to the [`CallData`]
    /// instance.
    ///
    /// [`CallData`]: super::data::CallData
    #[inline]
    pub fn as_mut(&mut self) -> RawCallMut<'_, Args, R> {
        RawCallMut {
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }
}

impl<Args: 'static, R: 'static> core::ops::Drop for RawCall<Args, R> {
    #[inline]
    fn drop(&mut self) {
        let vtable = self.as_ref().vtable();

        // SAFETY:
        // 1. The pointer comes from `Box::into_raw` (guaranteed by
        //    `RawCall::new`)
        // 2. The vtable returned by `self.as_ref().vtable()` is guaranteed
        //    to match the data in the `CallData`.
        // 3. The pointer is initialized and has not previously been freed as
        //    guaranteed by the invariants on this type. We are correctly
        //    transferring ownership here and the pointer is not used
        //    afterwards, as we are in the drop function.
        unsafe {
            vtable.drop(self.ptr);
        }
    }
}

/// A lifetime-bound pointer to a [`CallData`] that is guaranteed to point to
/// an initialized instance of a [`CallData<Args, R, F>`] for some specific
/// `F`, though we do not know which actual `F` it is.
///
/// We cannot use a `&'a CallData<Args, R, F>` directly, because that would
/// require us to know the actual type of the payload, which we do not.
///
/// [`CallData`]: super::data::CallData
/// [`CallData<Args, R, F>`]: super::data::CallData
#[repr(transparent)]
pub struct RawCallRef<'a, Args: 'static, R: 'static> {
    /// Pointer to the inner payload data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long
    /// as this struct exists:
    ///
    /// 1. The pointer must have been created from a
    ///    `Box<CallData<Args, R, F>>` for some `F` using `Box::into_raw`.
    /// 2. The pointer will point to the same `CallData<Args, R, F>` for the
    ///    entire lifetime of this object.
    ptr: NonNull<CallData<Args, R, Erased>>,

    /// Marker to tell the compiler that we should behave the same as a
    /// `&'a CallData<Args, R, Erased>`
    _marker: core::marker::PhantomData<&'a CallData<Args, R, Erased>>,
}

impl<Args: 'static, R: 'static> Clone for RawCallRef<'_, Args, R> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<Args: 'static, R: 'static> Copy for RawCallRef<'_, Args, R> {}

impl<'a, Args: 'static, R: 'static> RawCallRef<'a, Args, R> {
    /// Returns a raw pointer to the [`CallData`] instance.
    ///
    /// [`CallData`]: super::data::CallData
    #[inline]
    pub(super) fn as_ptr(self) -> *const CallData<Args, R, Erased> {
        self.ptr.as_ptr()
    }

    /// Returns a [`NonNull`] pointer to the [`CallData`] instance.
    ///
    /// [`CallData`]: super::data::CallData
    #[inline]
    pub(super) fn as_non_null(self) -> NonNull<CallData<Args, R, Erased>> {
        self.ptr
    }

    /// Returns the [`TypeId`] of the payload.
    #[inline]
    pub fn payload_type_id(self) -> TypeId {
        self.vtable().type_id()
    }

    /// Returns the [`core::any::type_name`] of the payload.
    #[inline]
    pub fn payload_type_name(self) -> &'static str {
        self.vtable().type_name()
    }

    /// Allocates an independent deep copy of the payload by calling
    /// [`Clone::clone`] on the concrete payload type.
    ///
    /// The returned [`RawCall`] shares no state with this one: mutating the
    /// payload behind either handle afterwards never affects the other.
    #[inline]
    pub fn clone_call(self) -> RawCall<Args, R> {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The vtable returned by `self.vtable()` is guaranteed to match
        //    the data in the `CallData`.
        unsafe { vtable.clone(self) }
    }

    /// Accesses the inner payload as a reference to the specified type, if
    /// the payload is of that type.
    #[inline]
    pub fn payload_downcast<F: 'static>(self) -> Option<&'a F> {
        if self.payload_type_id() == TypeId::of::<F>() {
            // SAFETY: We just verified that `F` matches the actual payload
            // type stored in the `CallData`.
            Some(unsafe { self.payload_downcast_unchecked::<F>() })
        } else {
            None
        }
    }
}

/// A lifetime-bound mutable pointer to a [`CallData`] that is guaranteed to
/// point to an initialized instance of a [`CallData<Args, R, F>`] for some
/// specific `F`, though we do not know which actual `F` it is.
///
/// For the duration of the lifetime `'a` this is the only live handle into
/// the pointee, which is what makes invoking a mutably-stateful payload
/// sound.
///
/// [`CallData`]: super::data::CallData
/// [`CallData<Args, R, F>`]: super::data::CallData
#[repr(transparent)]
pub struct RawCallMut<'a, Args: 'static, R: 'static> {
    /// Pointer to the inner payload data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long
    /// as this struct exists:
    ///
    /// 1. The pointer must have been created from a
    ///    `Box<CallData<Args, R, F>>` for some `F` using `Box::into_raw`.
    /// 2. The pointer will point to the same `CallData<Args, R, F>` for the
    ///    entire lifetime of this object.
    /// 3. This is the only live pointer into the pointee for the lifetime
    ///    `'a`.
    ptr: NonNull<CallData<Args, R, Erased>>,

    /// Marker to tell the compiler that we should behave the same as a
    /// `&'a mut CallData<Args, R, Erased>`
    _marker: core::marker::PhantomData<&'a mut CallData<Args, R, Erased>>,
}

impl<'a, Args: 'static, R: 'static> RawCallMut<'a, Args, R> {
    /// Returns a [`NonNull`] pointer to the [`CallData`] instance.
    ///
    /// [`CallData`]: super::data::CallData
    #[inline]
    pub(super) fn as_non_null(&self) -> NonNull<CallData<Args, R, Erased>> {
        self.ptr
    }

    /// Reborrows this [`RawCallMut`] as a shared [`RawCallRef`].
    #[inline]
    pub fn as_ref(&self) -> RawCallRef<'_, Args, R> {
        RawCallRef {
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }

    /// Reborrows this [`RawCallMut`] for a shorter lifetime.
    ///
    /// This allows calling consuming methods like [`RawCallMut::call`]
    /// without giving up the original borrow.
    #[inline]
    pub fn reborrow(&mut self) -> RawCallMut<'_, Args, R> {
        RawCallMut {
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }

    /// Invokes the payload with the given argument tuple, forwarding
    /// whatever it returns.
    ///
    /// Any panic raised by the payload propagates unchanged; the erasure
    /// layer performs no catching or translation.
    #[inline]
    pub fn call(self, args: Args) -> R {
        let vtable = self.as_ref().vtable();
        // SAFETY:
        // 1. The vtable returned by `self.as_ref().vtable()` is guaranteed
        //    to match the data in the `CallData`.
        unsafe { vtable.call(self, args) }
    }

    /// Accesses the inner payload as a mutable reference to the specified
    /// type, if the payload is of that type.
    #[inline]
    pub fn payload_downcast_mut<F: 'static>(self) -> Option<&'a mut F> {
        if self.as_ref().payload_type_id() == TypeId::of::<F>() {
            // SAFETY: We just verified that `F` matches the actual payload
            // type stored in the `CallData`.
            Some(unsafe { self.payload_downcast_mut_unchecked::<F>() })
        } else {
            None
        }
    }
}
