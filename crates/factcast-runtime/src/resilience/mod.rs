//! Token budget for the generative capability.
//!
//! The budget is the one piece of mutable state shared by concurrent claims.
//! It only decides whether a summary is generated or templated; it never
//! changes a claim's sources or verdict.

mod budget;

pub use budget::{BudgetReservation, BudgetTracker, LlmUsage, TokenBudget};
