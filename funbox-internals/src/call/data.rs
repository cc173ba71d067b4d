//! This module encapsulates the fields of the [`CallData`]. Since this is
//! the only place they are visible, this means that the type of the
//! [`CallVtable`] is guaranteed to always be in sync with the type of the
//! actual payload. This follows from the fact that they are in sync when
//! created and that the API offers no way to change the [`CallVtable`] or
//! payload type after creation.

use core::any::TypeId;

use crate::{
    call::{
        raw::{RawCallMut, RawCallRef},
        vtable::CallVtable,
    },
    callable::Callable,
};

/// Type-erased payload data structure with vtable-based dispatch.
///
/// This struct uses `#[repr(C)]` to enable safe field access in type-erased
/// contexts, allowing access to the vtable field even when the concrete
/// payload type `F` is unknown.
#[repr(C)]
pub(super) struct CallData<Args: 'static, R: 'static, F: 'static> {
    /// The vtable of this payload
    vtable: &'static CallVtable<Args, R>,
    /// The actual payload
    payload: F,
}

impl<Args: 'static, R: 'static, F: 'static> CallData<Args, R, F> {
    /// Creates a new [`CallData`] with the specified payload.
    ///
    /// This method creates the vtable for type-erased dispatch and pairs it
    /// with the payload.
    #[inline]
    pub(super) fn new(payload: F) -> Self
    where
        F: Callable<Args, Output = R> + Clone,
    {
        Self {
            vtable: CallVtable::new::<F>(),
            payload,
        }
    }
}

impl<'a, Args: 'static, R: 'static> RawCallRef<'a, Args, R> {
    /// Returns a reference to the [`CallVtable`] of the [`CallData`]
    /// instance.
    #[inline]
    pub(super) fn vtable(self) -> &'static CallVtable<Args, R> {
        let ptr = self.as_ptr();
        // SAFETY: We don't know the actual inner payload type, but we do
        // know that it points to an instance of `CallData<Args, R, F>` for
        // some specific `F`. Since `CallData` is `#[repr(C)]`, that means
        // that it's safe to create pointers to the fields before the actual
        // payload.
        //
        // We need to take care to avoid creating an actual reference to the
        // `CallData` itself though, as that would still be undefined
        // behavior since we don't have the right type.
        let vtable_ptr: *const &'static CallVtable<Args, R> = unsafe { &raw const (*ptr).vtable };

        // SAFETY: Dereferencing the pointer and getting out the `&'static
        // CallVtable` is valid for the same reasons
        unsafe { *vtable_ptr }
    }

    /// Accesses the inner payload of the [`CallData`] instance as a
    /// reference to the specified type.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the type `F` matches the actual payload
    /// type stored in the [`CallData`].
    #[inline]
    pub unsafe fn payload_downcast_unchecked<F: 'static>(self) -> &'a F {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.vtable().type_id(), TypeId::of::<F>());

        let this = self.as_non_null().cast::<CallData<Args, R, F>>();
        // SAFETY: Converting the NonNull pointer to a reference is sound
        // because:
        // - The pointer is non-null, properly aligned, and dereferenceable
        //   (guaranteed by RawCallRef's type invariants)
        // - The pointee is properly initialized (RawCallRef's invariants
        //   guarantee it points to an initialized CallData<Args, R, F> for
        //   some F)
        // - The type `F` matches the actual payload type (guaranteed by
        //   caller)
        // - Shared access is allowed
        // - The reference lifetime 'a is valid (tied to RawCallRef<'a>'s
        //   lifetime)
        let this = unsafe { this.as_ref() };
        &this.payload
    }
}

impl<'a, Args: 'static, R: 'static> RawCallMut<'a, Args, R> {
    /// Accesses the inner payload of the [`CallData`] instance as a mutable
    /// reference to the specified type.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the type `F` matches the actual payload
    /// type stored in the [`CallData`].
    #[inline]
    pub unsafe fn payload_downcast_mut_unchecked<F: 'static>(self) -> &'a mut F {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.as_ref().vtable().type_id(), TypeId::of::<F>());

        let mut this = self.as_non_null().cast::<CallData<Args, R, F>>();
        // SAFETY: Converting the NonNull pointer to a mutable reference is
        // sound because:
        // - The pointer is non-null, properly aligned, and dereferenceable
        //   (guaranteed by RawCallMut's type invariants)
        // - The pointee is properly initialized (RawCallMut's invariants
        //   guarantee it points to an initialized CallData<Args, R, F> for
        //   some F)
        // - The type `F` matches the actual payload type (guaranteed by
        //   caller)
        // - The RawCallMut is consumed, and it was created from a mutable
        //   borrow of the owning RawCall, so this is the only live reference
        //   into the pointee for the lifetime 'a
        let this = unsafe { this.as_mut() };
        &mut this.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_data_field_offsets() {
        use core::mem::{offset_of, size_of};

        #[repr(align(32))]
        #[derive(Clone)]
        struct LargeAlignment {
            _value: u8,
        }

        assert_eq!(offset_of!(CallData<(), (), fn()>, vtable), 0);
        assert_eq!(offset_of!(CallData<(i32,), i32, fn(i32) -> i32>, vtable), 0);
        assert_eq!(offset_of!(CallData<(), (), [u64; 4]>, vtable), 0);
        assert_eq!(offset_of!(CallData<(), (), LargeAlignment>, vtable), 0);

        assert!(
            offset_of!(CallData<(), (), fn()>, payload)
                >= size_of::<&'static CallVtable<(), ()>>()
        );
        assert!(
            offset_of!(CallData<(), (), LargeAlignment>, payload)
                >= size_of::<&'static CallVtable<(), ()>>()
        );
    }
}
