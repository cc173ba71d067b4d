//! Integration tests for the funbox-internals crate.
//!
//! These tests exercise the full type-erased dispatch pipeline from the
//! outside: allocation, invocation, deep cloning, downcasting, and drop
//! behavior, across every kind of payload the crate is expected to erase
//! (function items, function pointers, capturing closures, and stateful
//! `FnMut` closures).

use std::{
    any::TypeId,
    cell::RefCell,
    panic,
    rc::Rc,
};

use funbox_internals::{Callable, RawCall};

fn double(x: i32) -> i32 {
    x * 2
}

#[test]
fn test_creation_and_invocation_function_item() {
    let mut call = RawCall::<(i32,), i32>::new(double);

    assert_eq!(call.as_mut().call((21,)), 42);
    assert_eq!(call.as_mut().call((-3,)), -6);
}

#[test]
fn test_creation_and_invocation_function_pointer() {
    let ptr: fn(i32) -> i32 = double;
    let mut call = RawCall::<(i32,), i32>::new(ptr);

    assert_eq!(call.as_mut().call((5,)), 10);
    assert_eq!(call.as_ref().payload_type_id(), TypeId::of::<fn(i32) -> i32>());
}

#[test]
fn test_creation_and_invocation_capturing_closure() {
    let prefix = "in lambda: ".to_string();
    let mut call = RawCall::<(String,), String>::new(move |s: String| format!("{prefix}{s}"));

    assert_eq!(call.as_mut().call(("hello!".to_string(),)), "in lambda: hello!");
}

#[test]
fn test_creation_and_invocation_stateful_closure() {
    let mut counter = 0i32;
    let mut call = RawCall::<(i32,), f64>::new(move |i: i32| {
        counter += 10;
        i as f64
    });

    assert_eq!(call.as_mut().call((1,)), 1.0);
    assert_eq!(call.as_mut().call((7,)), 7.0);
}

#[test]
fn test_type_id_and_type_name() {
    let call = RawCall::<(), ()>::new(|| {});
    let call_ref = call.as_ref();

    // TypeId should be consistent across calls
    assert_eq!(call_ref.payload_type_id(), call_ref.payload_type_id());

    // The type name of a closure mentions the enclosing function
    assert!(call_ref.payload_type_name().contains("test_type_id_and_type_name"));
}

#[test]
fn test_distinct_payloads_distinct_vtables() {
    let a = RawCall::<(), ()>::new(|| {});
    let b = RawCall::<(), ()>::new(|| {});

    // Two distinct closure types, even with identical bodies
    assert_ne!(a.as_ref().payload_type_id(), b.as_ref().payload_type_id());
}

#[test]
fn test_checked_downcast() {
    let ptr: fn(i32) -> i32 = double;
    let mut call = RawCall::<(i32,), i32>::new(ptr);

    // Correct type succeeds
    let payload: &fn(i32) -> i32 = call.as_ref().payload_downcast().unwrap();
    assert_eq!(payload(4), 8);

    // Wrong type fails
    assert!(call.as_ref().payload_downcast::<fn()>().is_none());
    assert!(call.as_mut().payload_downcast_mut::<String>().is_none());

    // Mutable downcast can replace the stored function pointer
    fn triple(x: i32) -> i32 {
        x * 3
    }
    *call.as_mut().payload_downcast_mut::<fn(i32) -> i32>().unwrap() = triple;
    assert_eq!(call.as_mut().call((5,)), 15);
}

#[test]
fn test_unchecked_downcast() {
    fn life(_: i32) -> i32 {
        42
    }

    let call = RawCall::<(i32,), i32>::new(life as fn(i32) -> i32);

    // SAFETY: The payload type is exactly `fn(i32) -> i32`.
    let payload: &fn(i32) -> i32 = unsafe { call.as_ref().payload_downcast_unchecked() };
    assert_eq!(payload(1), 42);
}

#[test]
fn test_clone_call_deep_copy() {
    let mut total = 0u64;
    let mut original = RawCall::<(u64,), u64>::new(move |x: u64| {
        total += x;
        total
    });

    assert_eq!(original.as_mut().call((5,)), 5);

    let mut cloned = original.as_ref().clone_call();

    // The clone captured the state at clone time and evolves independently
    assert_eq!(cloned.as_mut().call((1,)), 6);
    assert_eq!(cloned.as_mut().call((1,)), 7);
    assert_eq!(original.as_mut().call((100,)), 105);
    assert_eq!(cloned.as_mut().call((1,)), 8);
}

#[test]
fn test_reborrow_allows_repeated_calls() {
    let mut call = RawCall::<(), u32>::new({
        let mut n = 0u32;
        move || {
            n += 1;
            n
        }
    });

    let mut call_mut = call.as_mut();
    assert_eq!(call_mut.reborrow().call(()), 1);
    assert_eq!(call_mut.reborrow().call(()), 2);
    assert_eq!(call_mut.call(()), 3);
}

#[test]
fn test_payload_panic_propagates() {
    let mut call = RawCall::<(), ()>::new(|| panic!("payload failure"));

    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        call.as_mut().call(());
    }));

    let err = result.unwrap_err();
    let message = err.downcast_ref::<&str>().copied().unwrap_or_default();
    assert_eq!(message, "payload failure");
}

#[test]
fn test_drop_behavior() {
    #[derive(Clone)]
    struct DropTracker {
        log: Rc<RefCell<Vec<&'static str>>>,
        tag: &'static str,
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
        let call = RawCall::<(), bool>::new(move || !tracker.tag.is_empty());

        // Cloning the call clones the capture; retag is not possible, so
        // both drops report the same tag.
        let cloned = call.as_ref().clone_call();

        assert!(log.borrow().is_empty());
        drop(call);
        assert_eq!(log.borrow().len(), 1);
        drop(cloned);
    }

    // Each boxed payload dropped exactly once
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn test_signatures_are_distinct_types() {
    // Different signatures instantiate entirely unrelated handle types;
    // this is a compile-time property, exercised here by holding several
    // side by side.
    let mut unit = RawCall::<(), ()>::new(|| {});
    let mut unary = RawCall::<(String,), usize>::new(|s: String| s.len());
    let mut binary = RawCall::<(i32, i32), i32>::new(|a: i32, b: i32| a + b);

    unit.as_mut().call(());
    assert_eq!(unary.as_mut().call(("four".to_string(),)), 4);
    assert_eq!(binary.as_mut().call((2, 2)), 4);
}

#[test]
fn test_callable_trait_direct_use() {
    // The Callable trait is usable without erasure as well
    let mut f = |a: u8, b: u8| (a as u16) + (b as u16);
    assert_eq!(Callable::call(&mut f, (200, 100)), 300);
}
