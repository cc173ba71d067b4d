//! Marker types and traits for defining thread-safety semantics.
//!
//! This module provides the type-level markers that control whether a wrapper
//! can cross thread boundaries. The marker appears as the third type
//! parameter in [`Fun<Args, R, T>`](crate::Fun) and encodes a compile-time
//! guarantee about the payload inside.
//!
//! # Design Philosophy
//!
//! The constraints encoded by these markers are enforced at construction
//! time. It is impossible to construct a [`Fun`](crate::Fun) that violates
//! the invariant associated with its marker: a `Fun<_, _, SendSync>` can only
//! ever have been built from a `Send + Sync` payload, so you can trust that
//! it truly is `Send + Sync` even though the payload type has been erased.
//!
//! # Thread Safety Markers
//!
//! - [`SendSync`]: The payload is `Send + Sync`, so the wrapper can be sent
//!   to and shared between threads.
//! - [`Local`]: The payload may contain non-thread-safe data (like `Rc` or
//!   raw pointers) and the wrapper cannot leave its thread.
//!
//! # Examples
//!
//! ```
//! use funbox::{Fun, markers};
//!
//! // String is Send + Sync, so the wrapper can use the default marker
//! let prefix = "in lambda: ".to_string();
//! let mut f: Fun<(String,), String, markers::SendSync> =
//!     Fun::new(move |s: String| format!("{prefix}{s}"));
//!
//! std::thread::spawn(move || {
//!     assert_eq!(f.call(("hello!".to_string(),)), "in lambda: hello!");
//! })
//! .join()
//! .unwrap();
//! ```
//!
//! ```
//! use std::{cell::Cell, rc::Rc};
//!
//! use funbox::{Fun, markers};
//!
//! // Rc is not Send or Sync, so the wrapper must be Local
//! let count = Rc::new(Cell::new(0));
//! let counter = count.clone();
//! let mut f: Fun<(), (), markers::Local> = Fun::new(move || {
//!     counter.set(counter.get() + 1);
//! });
//! f.call(());
//! // f cannot be sent to another thread - won't compile
//! ```

/// Marker type indicating that a wrapper and its payload are `Send + Sync`.
///
/// This is the default thread-safety marker. A `Fun<_, _, SendSync>` can only
/// be constructed from a payload that is `Send + Sync`, and in exchange the
/// wrapper itself is `Send + Sync`.
///
/// # When to Use
///
/// Most closures are `Send + Sync`, because most captured types are:
/// primitives, `String`, `Vec`, `Arc`, and nearly everything else in the
/// standard library. Use `SendSync` (the default) unless the payload needs
/// to capture thread-local data.
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// use funbox::Fun;
///
/// let mut f: Fun<(i32,), i32> = Fun::new(|x: i32| x * 2);
///
/// // Can send to another thread
/// thread::spawn(move || {
///     assert_eq!(f.call((21,)), 42);
/// })
/// .join()
/// .unwrap();
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct SendSync;

/// Marker type indicating that a wrapper is not `Send` or `Sync`.
///
/// This marker is used when the payload captures thread-local data that
/// cannot be safely sent between threads. Common examples include `Rc`, raw
/// pointers, or types that explicitly opt out of `Send`/`Sync`.
///
/// # When to Use
///
/// Use `Local` when the payload captures:
/// - `Rc<T>` or `Weak<T>` (use `Arc<T>` for a thread-safe alternative)
/// - Raw pointers (`*const T`, `*mut T`)
/// - `Cell` or `RefCell` shared through `Rc`
/// - Any other type that is `!Send` or `!Sync`
///
/// # Converting to Local
///
/// A thread-safe wrapper can always be downgraded using
/// [`into_local`](crate::Fun::into_local). The reverse conversion does not
/// exist: after erasure the payload's thread-safety can no longer be proven.
///
/// # Examples
///
/// ```
/// use std::{cell::Cell, rc::Rc};
///
/// use funbox::{Fun, markers};
///
/// let total = Rc::new(Cell::new(0u32));
/// let sink = total.clone();
/// let mut f: Fun<(u32,), (), markers::Local> = Fun::new(move |x: u32| {
///     sink.set(sink.get() + x);
/// });
///
/// f.call((3,));
/// f.call((4,));
/// assert_eq!(total.get(), 7);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Local;

mod sealed_thread_safety_marker {
    use super::*;

    pub trait Sealed: 'static {}

    impl Sealed for SendSync {}
    impl Sealed for Local {}
}

/// Marker trait for the thread-safety modes of a wrapper.
///
/// This trait is implemented for [`SendSync`] and [`Local`], the two markers
/// that can be used as the third type parameter of [`Fun`](crate::Fun).
///
/// This trait is sealed and cannot be implemented outside of this crate.
pub trait ThreadSafetyMarker: sealed_thread_safety_marker::Sealed {}

impl ThreadSafetyMarker for SendSync {}
impl ThreadSafetyMarker for Local {}

/// Marker trait combining payload and thread-safety requirements.
///
/// This trait enforces the thread-safety constraint on the payload at
/// construction time. A wrapper can only be constructed when its payload
/// satisfies the requirement of the chosen marker.
///
/// # Implementations
///
/// - For `T = Local`: Implemented for all `Sized + 'static` types,
///   regardless of their `Send`/`Sync` status. This allows capturing types
///   like `Rc` in local wrappers.
///
/// - For `T = SendSync`: Implemented only for `Sized + 'static` types that
///   are also `Send + Sync`. This ensures thread-safe wrappers can only be
///   constructed from thread-safe payloads.
///
/// # Enforcement at Construction
///
/// This trait is a bound on [`Fun::new`](crate::Fun::new). You cannot create
/// a `Fun<_, _, SendSync>` unless the payload is `Send + Sync`, which makes
/// it impossible to accidentally smuggle thread-local data across a thread
/// boundary:
///
/// ```compile_fail
/// use std::rc::Rc;
///
/// use funbox::{Fun, markers};
///
/// // This won't compile because Rc is not Send + Sync
/// let data: Rc<String> = Rc::new("captured".to_string());
/// let f: Fun<(), usize, markers::SendSync> = Fun::new(move || data.len());
/// ```
///
/// Use [`Local`] instead for non-thread-safe payloads:
///
/// ```
/// use std::rc::Rc;
///
/// use funbox::{Fun, markers};
///
/// let data: Rc<String> = Rc::new("captured".to_string());
/// let mut f: Fun<(), usize, markers::Local> = Fun::new(move || data.len());
/// assert_eq!(f.call(()), 8);
/// ```
pub trait PayloadFor<T>: Sized + 'static {}

impl<F: Sized + 'static> PayloadFor<Local> for F {}

impl<F: Sized + 'static> PayloadFor<SendSync> for F where F: Send + Sync {}
