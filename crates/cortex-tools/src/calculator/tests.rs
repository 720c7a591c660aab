//! Tests for the expression evaluator

use super::*;
use tokio_test::assert_err;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_factorial() {
    assert_eq!(evaluate("factorial(5)").unwrap(), 120.0);
    assert_eq!(format_number(evaluate("factorial(5)").unwrap()), "120");
    assert_eq!(evaluate("factorial(0)").unwrap(), 1.0);
    assert_err!(evaluate("factorial(-1)"));
    assert_err!(evaluate("factorial(2.5)"));
}

#[test]
fn test_precedence_follows_python() {
    assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
    assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
    assert_eq!(evaluate("-2 ** 2").unwrap(), -4.0);
    assert_eq!(evaluate("2 ** 3 ** 2").unwrap(), 512.0);
    assert_eq!(evaluate("2 ** -1").unwrap(), 0.5);
    assert_eq!(evaluate("7 // 2").unwrap(), 3.0);
    assert_eq!(evaluate("-7 // 2").unwrap(), -4.0);
    assert_eq!(evaluate("-7 % 3").unwrap(), 2.0);
}

#[test]
fn test_functions_and_constants() {
    assert!(approx(evaluate("sqrt(16) + pi - pi").unwrap(), 4.0));
    assert!(approx(evaluate("sin(0) + cos(0)").unwrap(), 1.0));
    assert!(approx(evaluate("log(e)").unwrap(), 1.0));
    assert!(approx(evaluate("log(8, 2)").unwrap(), 3.0));
    assert!(approx(evaluate("log10(1000)").unwrap(), 3.0));
    assert_eq!(evaluate("max(1, 7, 3)").unwrap(), 7.0);
    assert_eq!(evaluate("min(4, -2)").unwrap(), -2.0);
    assert_eq!(evaluate("sum(1, 2, 3)").unwrap(), 6.0);
    assert_eq!(evaluate("pow(2, 10)").unwrap(), 1024.0);
    assert_eq!(evaluate("abs(-3) + ceil(1.2) + floor(1.8)").unwrap(), 6.0);
    assert_eq!(evaluate("round(2.5)").unwrap(), 2.0);
    assert!(approx(evaluate("round(3.14159, 2)").unwrap(), 3.14));
    assert!(approx(evaluate("round(1234.5, -2)").unwrap(), 1200.0));
    // digit counts past f64 precision
    assert_eq!(evaluate("round(1.5, 400)").unwrap(), 1.5);
    assert_eq!(evaluate("round(1.5, 10 ** 12)").unwrap(), 1.5);
    assert_eq!(evaluate("round(1234.5, -400)").unwrap(), 0.0);
}

#[test]
fn test_dunder_denied_before_parsing() {
    let err = evaluate("__import__('os')").unwrap_err();
    assert!(matches!(err, Error::Denied(_)), "{err:?}");
}

#[test]
fn test_unknown_names_fail_closed() {
    assert!(matches!(evaluate("os"), Err(Error::Denied(_))));
    assert!(matches!(evaluate("system(1)"), Err(Error::Denied(_))));
    assert!(matches!(evaluate("x + 1"), Err(Error::Denied(_))));
}

#[test]
fn test_malformed_input() {
    assert!(matches!(evaluate(""), Err(Error::InvalidInput(_))));
    assert!(matches!(evaluate("1 +"), Err(Error::InvalidInput(_))));
    assert!(matches!(evaluate("(1 + 2"), Err(Error::InvalidInput(_))));
    assert!(matches!(evaluate("1 2"), Err(Error::InvalidInput(_))));
    assert!(matches!(evaluate("'abc'"), Err(Error::InvalidInput(_))));
    assert!(matches!(evaluate("pow(1)"), Err(Error::InvalidInput(_))));
}

#[test]
fn test_runtime_errors() {
    assert!(matches!(evaluate("1 / 0"), Err(Error::Execution(_))));
    assert!(matches!(evaluate("5 % 0"), Err(Error::Execution(_))));
    assert!(matches!(evaluate("sqrt(-1)"), Err(Error::Execution(_))));
    assert!(matches!(evaluate("10 ** 400"), Err(Error::Execution(_))));
}

#[test]
fn test_number_literals() {
    assert_eq!(evaluate("1_000 + .5").unwrap(), 1000.5);
    assert_eq!(evaluate("2.5e2").unwrap(), 250.0);
    assert_eq!(format_number(0.25), "0.25");
    assert_eq!(format_number(-3.0), "-3");
}
