//! Memoization behavior observable from the language.
//!
//! Component: per-function call cache and its eligibility rules.
//!
//! A cache hit is only observable through output side effects, and
//! any output permanently demotes the functions on the call chain,
//! so these tests pin down both directions: pure functions stay
//! correct under repetition, and impure functions keep re-executing.

use crate::common::*;

#[test]
fn repeated_pure_calls_are_identical() {
    let outcome = run("let f = fn (n) => { n * n + 1 };
        f(12) == f(12) && f(0 - 3) == f(0 - 3)");

    assert_bool(&outcome, true);
}

#[test]
fn memoized_fibonacci_is_correct() {
    // Without memoization this would take ~2^30 steps.
    let outcome = run("let fib = fn (n) => {
            if (n < 2) { n } else { fib(n - 1) + fib(n - 2) }
        };
        fib(30)");

    assert_int(&outcome, 832040);
}

#[test]
fn printing_functions_re_execute_every_call() {
    // `print` in the body makes the function statically ineligible;
    // both calls must produce output.
    let outcome = run("let shout = fn (n) => { print(n); n };
        shout(7);
        shout(7);");

    assert_output(&outcome, &["7", "7"]);
}

#[test]
fn output_below_a_call_chain_demotes_it() {
    // `noisy` is handed in as an argument, so the static inspection
    // of `wrap` cannot see the print; the runtime demotion must.
    let outcome = run("let noisy = fn (n) => { print(n); n };
        let wrap = fn (f, n) => { f(n) };
        wrap(noisy, 4);
        wrap(noisy, 4);");

    assert_output(&outcome, &["4", "4"]);
}

#[test]
fn string_arguments_still_compute_correctly() {
    let outcome = run("let greet = fn (name) => { \"hi \" + name };
        greet(\"ada\") + \", \" + greet(\"ada\")");

    assert_str(&outcome, "hi ada, hi ada");
}

#[test]
fn zero_parameter_functions_are_never_cached_wrongly() {
    let outcome = run("let tick = fn () => { print(\"tick\"); 1 };
        tick() + tick()");

    assert_output(&outcome, &["tick", "tick"]);
    assert_int(&outcome, 2);
}

#[test]
fn three_argument_functions_memoize() {
    let outcome = run("let mix = fn (a, b, c) => { a * 100 + b * 10 + c };
        mix(1, 2, 3) == mix(1, 2, 3)");

    assert_bool(&outcome, true);
}

#[test]
fn recursion_through_two_functions() {
    let outcome = run("let is_even = fn (n) => {
            if (n == 0) { true } else { is_odd(n - 1) }
        };
        let is_odd = fn (n) => {
            if (n == 0) { false } else { is_even(n - 1) }
        };
        is_even(10) && is_odd(7)");

    assert_bool(&outcome, true);
}
