//! Small self-contained exercises shipped alongside the swap desk and
//! exposed through the `sum` and `review` commands.

pub mod review;
pub mod summation;
