//! Solver building and execution.

pub mod execution;
pub mod process;
pub mod toolchain;

pub use execution::{execute_solver, execute_solver_with, passed_count, ExecOptions, ExecutionResult, Solver};
pub use toolchain::{language_of, prepare, Language, Prepared};
