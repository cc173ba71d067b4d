#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`funbox`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased data structures and unsafe
//! operations that power the [`funbox`] callable-wrapper library. It provides
//! the foundation for zero-cost type erasure through vtable-based dispatch.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`funbox`] crate, not
//! this one.
//!
//! # Architecture
//!
//! The crate is organized around a single type-erased storage hierarchy for
//! callable payloads:
//!
//! - **[`call`]**: Type-erased payload storage
//!   - [`RawCall`]: Owned payload with [`Box`]-based allocation
//!   - [`RawCallRef`]/[`RawCallMut`]: Borrowed references (shared/mutable)
//!   - [`CallData`]: `#[repr(C)]` wrapper enabling field access on erased
//!     types
//!   - [`CallVtable`]: Function pointers for type-erased dispatch, including
//!     the deep-clone entry that gives the wrapper its value semantics
//!
//! - **[`callable`]**: The trait a payload must satisfy before it can be
//!   erased
//!   - [`Callable`]: Defines invocation with an argument tuple, implemented
//!     for every `FnMut` closure, function, and function pointer up to
//!     twelve arguments
//!
//! # Safety Strategy
//!
//! Type erasure requires careful handling to maintain Rust's type safety
//! guarantees. When we erase a type like `CallData<Args, R, MyClosure>` to
//! `CallData<Args, R, Erased>`, we must ensure that the vtable function
//! pointers still match the actual concrete type stored in memory.
//!
//! This crate maintains safety through:
//!
//! - **Module-based encapsulation**: Safety-critical types keep fields
//!   module-private, making invariants locally verifiable within a single
//!   file
//! - **`#[repr(C)]` layout**: Enables safe field projection on type-erased
//!   pointers without constructing invalid references
//! - **Documented vtable contracts**: Each vtable method specifies exactly
//!   when it can be safely called
//!
//! See the [`call`] module documentation for detailed explanations of how
//! these patterns are applied.
//!
//! [`funbox`]: https://docs.rs/funbox/latest/funbox/
//! [`CallData`]: call::data::CallData
//! [`CallVtable`]: call::vtable::CallVtable
//! [`Callable`]: callable::Callable
//! [`Box`]: alloc::boxed::Box

extern crate alloc;

mod call;
pub mod callable;
mod util;

pub use call::{RawCall, RawCallMut, RawCallRef};
pub use callable::Callable;
