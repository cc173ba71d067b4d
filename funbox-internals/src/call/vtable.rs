//! Vtable for type-erased callable operations.
//!
//! This module contains the [`CallVtable`] which enables invoking, cloning,
//! and dropping a payload when its concrete type `F` has been erased. The
//! vtable stores function pointers that dispatch to the correct typed
//! implementations.
//!
//! This module encapsulates the fields of [`CallVtable`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's payload type parameter must match the actual
//! payload stored in the [`CallData`]**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`CallVtable::new`], which pairs the function pointers
//! with a specific payload type `F` at compile time.

use alloc::boxed::Box;
use core::{any::TypeId, ptr::NonNull};

use crate::{
    call::{
        data::CallData,
        raw::{RawCall, RawCallMut, RawCallRef},
    },
    callable::Callable,
    util::Erased,
};

/// Vtable for type-erased callable operations.
///
/// Contains function pointers for performing operations on a payload without
/// knowing its concrete type at compile time. The signature `(Args, R)` is
/// part of the vtable type, so a vtable can never be paired with storage of
/// a different call signature.
///
/// # Safety Invariant
///
/// The fields `drop`, `clone`, and `call` are guaranteed to point to the
/// functions defined below instantiated with the payload type `F` that was
/// used to create this [`CallVtable`].
pub(crate) struct CallVtable<Args: 'static, R: 'static> {
    /// Gets the [`TypeId`] of the payload type that was used to create this
    /// [`CallVtable`].
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the payload type that was used
    /// to create this [`CallVtable`].
    type_name: fn() -> &'static str,
    /// Drops the [`Box<CallData<Args, R, F>>`] instance pointed to by this
    /// pointer.
    drop: unsafe fn(NonNull<CallData<Args, R, Erased>>),
    /// Allocates an independent deep copy of the payload behind the pointer.
    clone: unsafe fn(RawCallRef<'_, Args, R>) -> RawCall<Args, R>,
    /// Invokes the payload behind the pointer with the given argument tuple.
    call: unsafe fn(RawCallMut<'_, Args, R>, Args) -> R,
}

impl<Args: 'static, R: 'static> CallVtable<Args, R> {
    /// Creates a new [`CallVtable`] for the payload type `F`.
    pub(super) const fn new<F>() -> &'static Self
    where
        F: Callable<Args, Output = R> + Clone,
    {
        const {
            &Self {
                type_id: TypeId::of::<F>,
                type_name: core::any::type_name::<F>,
                drop: drop::<Args, R, F>,
                clone: clone::<Args, R, F>,
                call: call::<Args, R, F>,
            }
        }
    }

    /// Gets the [`TypeId`] of the payload type that was used to create this
    /// [`CallVtable`].
    #[inline]
    pub(super) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the [`core::any::type_name`] of the payload type that was used
    /// to create this [`CallVtable`].
    #[inline]
    pub(super) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Drops the `Box<CallData<Args, R, F>>` instance pointed to by this
    /// pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from [`Box<CallData<Args, R, F>>`] via
    ///    [`Box::into_raw`]
    /// 2. This [`CallVtable`] must be a vtable for the payload type stored
    ///    in the [`CallData`].
    /// 3. This method drops the [`Box<CallData<Args, R, F>>`], so the caller
    ///    must ensure that the pointer has not previously been dropped, that
    ///    it is able to transfer ownership of the pointer, and that it will
    ///    not use the pointer after calling this method.
    #[inline]
    pub(super) unsafe fn drop(&self, ptr: NonNull<CallData<Args, R, Erased>>) {
        // SAFETY: We know that `self.drop` points to the function
        // `drop::<Args, R, F>` below. That function's safety requirements
        // are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        // 3. Guaranteed by the caller
        unsafe {
            (self.drop)(ptr);
        }
    }

    /// Allocates an independent deep copy of the payload behind the pointer
    /// by calling [`Clone::clone`] on the concrete payload type used to
    /// create this [`CallVtable`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`CallVtable`] must be a vtable for the payload type stored
    ///    in the [`RawCallRef`].
    #[inline]
    pub(super) unsafe fn clone(&self, ptr: RawCallRef<'_, Args, R>) -> RawCall<Args, R> {
        // SAFETY: We know that the `self.clone` field points to the function
        // `clone::<Args, R, F>` below. That function's safety requirements
        // are upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.clone)(ptr) }
    }

    /// Invokes the payload behind the pointer using the
    /// [`Callable::call`] implementation of the concrete payload type used
    /// to create this [`CallVtable`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`CallVtable`] must be a vtable for the payload type stored
    ///    in the [`RawCallMut`].
    #[inline]
    pub(super) unsafe fn call(&self, ptr: RawCallMut<'_, Args, R>, args: Args) -> R {
        // SAFETY: We know that the `self.call` field points to the function
        // `call::<Args, R, F>` below. That function's safety requirements
        // are upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.call)(ptr, args) }
    }
}

/// Drops the [`Box<CallData<Args, R, F>>`] instance pointed to by this
/// pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from [`Box<CallData<Args, R, F>>`] via
///    [`Box::into_raw`]
/// 2. The payload type `F` matches the actual payload type stored in the
///    [`CallData`]
/// 3. This method drops the [`Box<CallData<Args, R, F>>`], so the caller
///    must ensure that the pointer has not previously been dropped, that it
///    is able to transfer ownership of the pointer, and that it will not use
///    the pointer after calling this method.
unsafe fn drop<Args: 'static, R: 'static, F: 'static>(ptr: NonNull<CallData<Args, R, Erased>>) {
    let ptr: NonNull<CallData<Args, R, F>> = ptr.cast();
    let ptr = ptr.as_ptr();
    // SAFETY: Our pointer has the correct type as guaranteed by the caller,
    // and it came from a call to `Box::into_raw` as also guaranteed by our
    // caller.
    let boxed = unsafe { Box::from_raw(ptr) };
    core::mem::drop(boxed);
}

/// Allocates an independent deep copy of the payload behind the pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `F` matches the actual payload type stored in the
///    [`CallData`]
unsafe fn clone<Args, R, F>(ptr: RawCallRef<'_, Args, R>) -> RawCall<Args, R>
where
    Args: 'static,
    R: 'static,
    F: Callable<Args, Output = R> + Clone,
{
    // SAFETY:
    // 1. Guaranteed by the caller
    let payload: &F = unsafe { ptr.payload_downcast_unchecked::<F>() };
    RawCall::new(payload.clone())
}

/// Invokes the payload behind the pointer with the given argument tuple.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `F` matches the actual payload type stored in the
///    [`CallData`]
unsafe fn call<Args, R, F>(ptr: RawCallMut<'_, Args, R>, args: Args) -> R
where
    Args: 'static,
    R: 'static,
    F: Callable<Args, Output = R>,
{
    // SAFETY:
    // 1. Guaranteed by the caller
    let payload: &mut F = unsafe { ptr.payload_downcast_mut_unchecked::<F>() };
    payload.call(args)
}
