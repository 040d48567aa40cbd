//! Complete programs with known outputs.
//!
//! Component: end-to-end pipeline (lexer → evaluator → sink).
//!
//! Each test runs a whole script and asserts on the captured output
//! and the last evaluated value.

use crate::common::*;

#[test]
fn hello_world() {
    // Arrange & Act
    let outcome = run("print(\"Hello, World!\");");

    // Assert
    assert_output(&outcome, &["Hello, World!"]);
    assert_str(&outcome, "Hello, World!");
}

#[test]
fn naive_fibonacci() {
    let outcome = run("let fib = fn (n) => {
            if (n < 2) {
                n
            } else {
                fib(n - 1) + fib(n - 2)
            }
        };
        print(fib(20));");

    assert_output(&outcome, &["6765"]);
    assert_int(&outcome, 6765);
}

#[test]
fn sum_of_sums() {
    let outcome = run("let sum = fn (a, b) => { a + b }\nprint(sum(3, 2) + sum( 1, 2 ));");

    assert_output(&outcome, &["8"]);
    assert_int(&outcome, 8);
}

#[test]
fn nested_sums() {
    let outcome = run("let sum0 = fn ( arg1, arg2) =>
            { arg1 + arg2 };
        let sum1 = fn (var1, var2) => { sum0( var1, var2 ) + sum0( var1, var2 ) };
        print(sum1(3, 2) + sum1(6, 8));");

    assert_output(&outcome, &["38"]);
    assert_int(&outcome, 38);
}

#[test]
fn mixed_calls_and_arithmetic() {
    let outcome = run("let sum = fn (n) => {
            n + 1;
        };
        let a = 2;
        let b = 5;
        let c = fn (v1, v2) => { v1-v2 };
        print(c(8, 9));
        print (sum(58)+c(a,b));");

    assert_output(&outcome, &["-1", "56"]);
    assert_int(&outcome, 56);
}

#[test]
fn arithmetic_without_semicolons() {
    // Statements separated only by newlines.
    let outcome = run("let a = 9\nlet b = (a + 2) * 3 / 2\nprint(b * 6);");

    assert_output(&outcome, &["96"]);
    assert_int(&outcome, 96);
}

#[test]
fn concatenation_with_delimiters_inside_string() {
    let outcome = run("let a = \"'/{} string test\"\nlet b = 3 + a\nprint(b)");

    assert_output(&outcome, &["3'/{} string test"]);
    assert_str(&outcome, "3'/{} string test");
}

#[test]
fn chained_assignment() {
    let outcome = run("let a = 5;
        let b = 33;
        let c = a = b = 567;
        print(\"c = [\"+c+\"]\");");

    assert_output(&outcome, &["c = [567]"]);
    assert_str(&outcome, "c = [567]");
}

#[test]
fn conditional_with_or_chain() {
    let outcome = run("let teste = fn (arg1, arg2) => {
            if ( arg1 > arg2 || 6 > 5 || 7 > 8 || 2 > 1  ) {
                print(\"COND1\");
            } else {
                print(\"COND2\");
            }
        };
        teste(0, 3);");

    assert_output(&outcome, &["COND1"]);
    assert_str(&outcome, "COND1");
}

#[test]
fn closure_over_local() {
    let outcome = run("let z = fn () => {
            let x = 2;
            let f = fn (y) => x + y;
            f
        };
        let f = z();
        print(f(1))");

    assert_output(&outcome, &["3"]);
    assert_int(&outcome, 3);
}

#[test]
fn tuple_soup() {
    let outcome = run("let t = ((3*5),\"test\");
        let a = 88;
        let b = 99;
        let t2 = first((second((96, a)), b));
        print(second((first((55, 60)), first((second((100, 200)), 90)))))");

    assert_output(&outcome, &["200"]);
    assert_int(&outcome, 200);
}

#[test]
fn tuple_rendering() {
    let outcome = run("print((1, (true, \"x\")))");

    assert_output(&outcome, &["(1, (true, x))"]);
}

#[test]
fn print_returns_its_argument() {
    let outcome = run("let a = print(5) + 1; a");

    assert_output(&outcome, &["5"]);
    assert_int(&outcome, 6);
}

#[test]
fn print_of_function_literal() {
    let outcome = run("print(fn (x) => x)");

    assert_output(&outcome, &["<#closure>"]);
}

#[test]
fn cowsay_emits_a_cow() {
    let outcome = run("cowsay(\"moo\")");

    assert_eq!(outcome.output.len(), 1);
    assert!(outcome.output[0].contains("< moo >"));
    assert!(outcome.output[0].contains("(oo)"));
    assert_str(&outcome, "moo");
}
