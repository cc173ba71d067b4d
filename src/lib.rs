#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A value-semantic, clonable, type-erased callable wrapper.
//!
//! ## Overview
//!
//! This crate provides [`Fun`], a container that can hold *any* callable
//! value matching a fixed call signature (a free function, a function
//! pointer, a capturing closure, or a stateful `FnMut` closure) and invoke
//! it uniformly through one non-generic handle. Unlike `Box<dyn FnMut(...)>`,
//! a [`Fun`] has full value semantics: cloning it produces an independent
//! deep copy of the held payload, and swapping two wrappers is a
//! constant-time pointer exchange that can never fail or allocate.
//!
//! ## Quick Example
//!
//! ```
//! use funbox::Fun;
//!
//! let mut counter = 0u32;
//! let mut f: Fun<(u32,), u32> = Fun::new(move |x: u32| {
//!     counter += x;
//!     counter
//! });
//!
//! assert_eq!(f.call((5,)), 5);
//! assert_eq!(f.call((5,)), 10);
//!
//! // Cloning copies the captured state; the clone evolves on its own.
//! let mut g = f.clone();
//! assert_eq!(g.call((1,)), 11);
//! assert_eq!(f.call((5,)), 15);
//! ```
//!
//! ## Core Concepts
//!
//! Stable Rust has no variadic generics, so a call signature `R(A1, A2)` is
//! spelled as the pair of an argument tuple type and an output type:
//! `Fun<(A1, A2), R>`. Invocation passes the arguments as one tuple:
//! `f.call((a1, a2))`. Wrappers of different signatures are unrelated types.
//!
//! A payload must satisfy three things to be wrapped:
//!
//! - [`Callable`] for the chosen signature. This is automatic for every
//!   `FnMut` closure, function item, and function pointer of up to twelve
//!   arguments.
//! - [`Clone`], which is what funds the wrapper's deep-copy semantics. A
//!   closure is `Clone` whenever everything it captures is.
//! - The thread-safety bound of the chosen marker (see below).
//!
//! Invocation takes `&mut self`: the payload is allowed to mutate its
//! captured state, and the borrow checker, rather than documentation, rules
//! out overlapping invocations of a single wrapper.
//!
//! Because Rust moves are destructive, there is no observable "moved-from"
//! wrapper: a [`Fun`] always holds exactly one live payload, and using a
//! moved-from binding is a compile error.
//!
//! ## Thread Safety
//!
//! The third type parameter of [`Fun`] is a thread-safety marker:
//!
//! - [`SendSync`](markers::SendSync) (default): the payload was proven
//!   `Send + Sync` at construction, so the wrapper is `Send + Sync` too.
//! - [`Local`](markers::Local): the payload may capture `!Send` data such as
//!   `Rc` or raw pointers; the wrapper stays on its thread.
//!
//! ```
//! use std::{cell::Cell, rc::Rc};
//!
//! use funbox::{Fun, markers};
//!
//! let hits = Rc::new(Cell::new(0));
//! let observer = hits.clone();
//! let mut f: Fun<(), (), markers::Local> = Fun::new(move || {
//!     observer.set(observer.get() + 1);
//! });
//!
//! f.call(());
//! assert_eq!(hits.get(), 1);
//! ```
//!
//! A `SendSync` wrapper can always be downgraded with
//! [`Fun::into_local`]; the reverse direction does not exist, since the
//! payload's thread-safety can no longer be proven after erasure.
//!
//! ## Project Goals
//!
//! - **Value semantics**: clone is a deep copy, move is a transfer, swap is
//!   constant-time, regardless of the payload type.
//! - **One fixed interface**: the call site never learns the payload's
//!   concrete type; dispatch goes through an internal vtable.
//! - **No hidden sharing**: ownership is strictly tree-shaped. No reference
//!   counting, no interior mutability, no aliasing between clones.
//! - **Lightweight**: a [`Fun`] is pointer-sized; construction and cloning
//!   pay exactly one allocation each, invocation is a single indirect call.
//! - **Inspectable**: the payload's [`TypeId`](core::any::TypeId) and type
//!   name stay available, and checked downcasts recover the concrete value.
//!
//! For implementation details, see the [`funbox-internals`] crate.
//!
//! [`funbox-internals`]: funbox_internals

extern crate alloc;

pub mod markers;

mod fun;

pub use funbox_internals::Callable;

pub use self::fun::{mut_::FunMut, owned::Fun, ref_::FunRef};
