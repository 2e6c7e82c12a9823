//! # Execution Gate & Plan Binding
//!
//! The pure decision function that, given a Definition-of-Done and a
//! Decision Lock, decides whether a session may proceed — plus the plan-hash
//! binding that ties an `ExecutionPlan` to its lock once one exists.

mod gate;
mod plan_binding;

pub use gate::{evaluate_execution_gate, GateCheck, GateResult};
pub use plan_binding::{compute_plan_hash, validate_plan_contains_goal, validate_plan_hash_binding};
