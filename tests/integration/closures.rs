//! Closure capture and higher-order behavior.
//!
//! Component: closure machinery (definition-time capture, call-time
//! frame seeding).

use crate::common::*;
use brawl::BrawlError;

#[test]
fn returned_closure_outlives_its_frame() {
    let outcome = run("let make_adder = fn (n) => {
            fn (m) => n + m
        };
        let add5 = make_adder(5);
        let add7 = make_adder(7);
        add5(10) + add7(10)");

    assert_int(&outcome, 32);
}

#[test]
fn capture_is_a_snapshot() {
    // The closure sees the value at definition time, not the later
    // reassignment.
    let outcome = run("let x = 1;
        let f = fn () => x + 0;
        x = 2;
        f()");

    assert_int(&outcome, 1);
}

#[test]
fn closures_are_first_class_arguments() {
    let outcome = run("let apply = fn (f, v) => { f(v) };
        let double = fn (n) => n * 2;
        apply(double, 21)");

    assert_int(&outcome, 42);
}

#[test]
fn closure_without_call_evaluates_to_itself() {
    let outcome = run("let f = fn (x) => x; let g = f; g(9)");

    assert_int(&outcome, 9);
}

#[test]
fn captured_closures_nest() {
    let outcome = run("let outer = fn () => {
            let base = 100;
            let mid = fn (a) => {
                let inner = fn (b) => base + a + b;
                inner
            };
            mid
        };
        let mid = outer();
        let inner = mid(20);
        inner(3)");

    assert_int(&outcome, 123);
}

#[test]
fn parameters_shadow_captured_globals() {
    let outcome = run("let n = 1000;
        let f = fn (n) => n + 1;
        f(5) + n");

    assert_int(&outcome, 1006);
}

#[test]
fn wrong_arity_is_an_error() {
    let err = run_err("let f = fn (x) => x; f(1, 2)");
    assert!(matches!(
        err,
        BrawlError::ArityMismatch {
            expected: 1,
            got: 2,
            ..
        }
    ));
}
