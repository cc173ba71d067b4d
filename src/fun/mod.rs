//! Type-erased callable wrappers.
//!
//! This module provides the types for creating and working with type-erased
//! callables. A wrapper holds any payload matching a fixed call signature
//! and invokes it through a single uniform handle.
//!
//! # Core Types
//!
//! - [`Fun`]: An owned wrapper with value semantics
//! - [`FunRef`]: A shared reference to a wrapper's payload, for inspection
//! - [`FunMut`]: A mutable reference to a wrapper's payload, for invocation
//!
//! # Creating Wrappers
//!
//! Wrappers are created with [`Fun::new`] from anything callable with the
//! chosen signature:
//!
//! ```
//! use funbox::Fun;
//!
//! fn double(x: i32) -> i32 {
//!     x * 2
//! }
//!
//! // From a function item
//! let mut f: Fun<(i32,), i32> = Fun::new(double);
//! assert_eq!(f.call((21,)), 42);
//!
//! // From a capturing closure
//! let prefix = "in lambda: ".to_string();
//! let mut g: Fun<(String,), String> = Fun::new(move |s: String| format!("{prefix}{s}"));
//! assert_eq!(g.call(("hello!".to_string(),)), "in lambda: hello!");
//! ```
//!
//! # Type Parameters
//!
//! All three types share the signature parameters:
//!
//! - **Argument tuple**: The arguments of the call signature, spelled as a
//!   tuple type such as `()`, `(i32,)`, or `(String, usize)`
//! - **Output**: The type returned by an invocation (defaults to `()`)
//!
//! [`Fun`] additionally carries a thread-safety marker: [`SendSync`]
//! (default) for wrappers that can cross threads, or [`Local`] for payloads
//! capturing non-thread-safe data.
//!
//! # Inspection and Downcasting
//!
//! The payload's concrete type is erased, but not lost. Every wrapper can
//! report the payload's [`TypeId`](core::any::TypeId) and type name, and the
//! payload can be recovered by downcasting:
//!
//! ```
//! use std::any::TypeId;
//!
//! use funbox::Fun;
//!
//! fn double(x: i32) -> i32 {
//!     x * 2
//! }
//!
//! let f: Fun<(i32,), i32> = Fun::new(double as fn(i32) -> i32);
//! assert_eq!(f.payload_type_id(), TypeId::of::<fn(i32) -> i32>());
//!
//! let inner: &fn(i32) -> i32 = f.downcast_ref().unwrap();
//! assert_eq!(inner(4), 8);
//! ```
//!
//! [`Fun`]: crate::Fun
//! [`Fun::new`]: crate::Fun::new
//! [`FunRef`]: crate::FunRef
//! [`FunMut`]: crate::FunMut
//! [`SendSync`]: crate::markers::SendSync
//! [`Local`]: crate::markers::Local

pub(crate) mod mut_;
pub(crate) mod owned;
pub(crate) mod ref_;
