//! Three ways to compute `1 + 2 + ... + n`.

use crate::errors::{AppError, Result};
use std::time::{Duration, Instant};

/// Deepest recursion `sum_to_n_recursive` will attempt.
pub const MAX_RECURSION_DEPTH: i64 = 10_000;

fn check_input(n: i64) -> Result<()> {
    if n < 0 {
        return Err(AppError::validation("Input must be a non-negative integer"));
    }
    Ok(())
}

fn overflow() -> AppError {
    AppError::validation("Sum does not fit in a 64-bit integer")
}

/// O(n) time, O(1) space.
pub fn sum_to_n_iterative(n: i64) -> Result<i64> {
    check_input(n)?;
    let mut sum: i64 = 0;
    for i in 1..=n {
        sum = sum.checked_add(i).ok_or_else(overflow)?;
    }
    Ok(sum)
}

/// Gauss: `n * (n + 1) / 2`. O(1) time and space.
pub fn sum_to_n_formula(n: i64) -> Result<i64> {
    check_input(n)?;
    let n = i128::from(n);
    i64::try_from(n * (n + 1) / 2).map_err(|_| overflow())
}

/// O(n) time and O(n) stack.
pub fn sum_to_n_recursive(n: i64) -> Result<i64> {
    check_input(n)?;
    if n > MAX_RECURSION_DEPTH {
        return Err(AppError::validation(format!(
            "Recursive sum is limited to n <= {MAX_RECURSION_DEPTH}"
        )));
    }
    Ok(recurse(n))
}

fn recurse(n: i64) -> i64 {
    if n == 0 { 0 } else { n + recurse(n - 1) }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub name: &'static str,
    pub complexity: &'static str,
    pub value: Result<i64>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub n: i64,
    pub measurements: Vec<Measurement>,
    /// Every implementation succeeded and produced the same value.
    pub all_equal: bool,
    pub expected: Result<i64>,
}

type SumFn = fn(i64) -> Result<i64>;

const IMPLEMENTATIONS: [(&str, &str, SumFn); 3] = [
    ("iterative", "O(n) time, O(1) space", sum_to_n_iterative),
    ("formula", "O(1) time, O(1) space", sum_to_n_formula),
    ("recursive", "O(n) time, O(n) space", sum_to_n_recursive),
];

/// Run and time each implementation for `n`.
pub fn compare_implementations(n: i64) -> Comparison {
    let measurements: Vec<Measurement> = IMPLEMENTATIONS
        .iter()
        .map(|&(name, complexity, f)| {
            let started = Instant::now();
            let value = f(n);
            Measurement {
                name,
                complexity,
                value,
                elapsed: started.elapsed(),
            }
        })
        .collect();

    let first = measurements.first().map(|m| m.value.clone());
    let all_equal = measurements
        .iter()
        .all(|m| m.value.is_ok() && Some(&m.value) == first.as_ref());

    Comparison {
        n,
        measurements,
        all_equal,
        expected: sum_to_n_formula(n),
    }
}
