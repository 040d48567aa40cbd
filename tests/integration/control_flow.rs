//! `if`, blocks, and short-circuit evaluation.
//!
//! Component: evaluator control flow, including the cached branch
//! jumps exercised by repeated executions of the same `if` token.

use crate::common::*;

#[test]
fn if_takes_the_then_branch() {
    let outcome = run("if (1 < 2) { \"yes\" } else { \"no\" }");
    assert_str(&outcome, "yes");
}

#[test]
fn if_takes_the_else_branch() {
    let outcome = run("if (1 > 2) { \"yes\" } else { \"no\" }");
    assert_str(&outcome, "no");
}

#[test]
fn else_less_if_with_false_condition() {
    let outcome = run("if (false) { print(\"skipped\") }");
    assert_output(&outcome, &[]);
    assert_bool(&outcome, false);
}

#[test]
fn skipped_branch_has_no_effects() {
    let outcome = run("if (true) { 1 } else { print(\"never\") }");
    assert_output(&outcome, &[]);
    assert_int(&outcome, 1);
}

#[test]
fn nested_if_blocks() {
    let outcome = run("let classify = fn (n) => {
            if (n < 10) {
                if (n < 5) { \"low\" } else { \"mid\" }
            } else {
                \"high\"
            }
        };
        classify(2) + classify(7) + classify(70)");

    assert_str(&outcome, "lowmidhigh");
}

#[test]
fn branch_jumps_stay_correct_across_executions() {
    // The same `if` tokens execute five times, filling and then
    // reusing both cached branch ends.
    let outcome = run("let step = fn (n) => {
            if (n % 2 == 0) { n / 2 } else { n * 3 + 1 }
        };
        step(step(step(step(step(7)))))");

    // 7 -> 22 -> 11 -> 34 -> 17 -> 52
    assert_int(&outcome, 52);
}

#[test]
fn and_short_circuits() {
    let outcome = run("let probe = fn () => { print(\"called\"); true };
        false && probe()");

    assert_output(&outcome, &[]);
    assert_bool(&outcome, false);
}

#[test]
fn or_short_circuits() {
    let outcome = run("let probe = fn () => { print(\"called\"); false };
        true || probe()");

    assert_output(&outcome, &[]);
    assert_bool(&outcome, true);
}

#[test]
fn evaluated_logical_operands_run_normally() {
    let outcome = run("let probe = fn () => { print(\"called\"); true };
        false || probe()");

    assert_output(&outcome, &["called"]);
    assert_bool(&outcome, true);
}

#[test]
fn logical_results_are_canonical_booleans() {
    let outcome = run("(true && true) == true && (false || false) == false");
    assert_bool(&outcome, true);
}

#[test]
fn block_statement_yields_its_last_expression() {
    let outcome = run("{ let a = 1; let b = 2; a + b }");
    assert_int(&outcome, 3);
}

#[test]
fn evaluation_is_left_to_right() {
    let outcome = run("print(1) + print(2) + print(3)");
    assert_output(&outcome, &["1", "2", "3"]);
    assert_int(&outcome, 6);
}
