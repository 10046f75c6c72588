//! Swap execution: the form the user edits, the order it turns into, and the
//! flow that gets it signed and settled.

pub mod execute;
pub mod flow;
pub mod form;
pub mod order;

pub use flow::{SwapFlow, SwapOutcome, SwapPhase};
pub use form::{Selection, Side, SwapForm};
pub use order::{Order, create_order};
