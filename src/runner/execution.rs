//! Runs a solver over every case and classifies the outcome.

use crate::errors::TkError;
use crate::runner::process::run_command;
use crate::runner::toolchain::prepare;
use crate::symbols::Symbols;
use crate::unit::Unit;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionResult {
    Untested,
    Success,
    WrongOutput,
    CompilationError,
    ExecutionError,
}

impl ExecutionResult {
    pub fn name(&self) -> &'static str {
        match self {
            ExecutionResult::Untested => "UNTESTED",
            ExecutionResult::Success => "SUCCESS",
            ExecutionResult::WrongOutput => "WRONG_OUTPUT",
            ExecutionResult::CompilationError => "COMPILATION_ERROR",
            ExecutionResult::ExecutionError => "EXECUTION_ERROR",
        }
    }

    pub fn mark(&self, symbols: &Symbols) -> &'static str {
        match self {
            ExecutionResult::Untested => symbols.neutral,
            ExecutionResult::Success => symbols.success,
            ExecutionResult::WrongOutput => symbols.wrong,
            ExecutionResult::CompilationError => symbols.compilation,
            ExecutionResult::ExecutionError => symbols.execution,
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A program under test and the outcome of its last run.
#[derive(Debug, Clone)]
pub struct Solver {
    pub path: String,
    pub filename: String,
    pub result: ExecutionResult,
    /// One entry per case; `None` until the case produced output.
    pub user_outputs: Vec<Option<String>>,
    pub error_message: String,
}

impl Solver {
    /// Multi-file solvers are given as `main.cpp,lib.cpp`; the first entry
    /// is the one dispatched, its siblings are picked up by the build.
    pub fn new(path: &str) -> Self {
        let main = path.split(',').find(|part| !part.is_empty()).unwrap_or(path);
        let filename = if main.contains(' ') {
            main.to_string()
        } else {
            Path::new(main)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| main.to_string())
        };
        Solver {
            path: main.to_string(),
            filename,
            result: ExecutionResult::Untested,
            user_outputs: Vec::new(),
            error_message: String::new(),
        }
    }

    pub fn mark(&self, symbols: &Symbols) -> &'static str {
        self.result.mark(symbols)
    }

    fn reset(&mut self, cases: usize) {
        self.result = ExecutionResult::Untested;
        self.user_outputs = vec![None; cases];
        self.error_message.clear();
    }

    fn fail(&mut self, result: ExecutionResult, message: String) -> ExecutionResult {
        self.result = result;
        self.error_message = message;
        result
    }
}

#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Per-case wall-clock limit; `None` waits forever.
    pub timeout: Option<Duration>,
    /// Leave the temporary build folder on disk.
    pub keep_build_dir: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        ExecOptions {
            timeout: Some(Duration::from_secs(10)),
            keep_build_dir: false,
        }
    }
}

/// Builds `solver` and feeds it every case in order.
///
/// A build failure leaves every output empty. The first case that exits
/// with an error, cannot start, or runs out of time stops the run; earlier
/// cases keep their outputs. Otherwise outputs are compared exactly.
pub fn execute_solver(solver: &mut Solver, units: &[Unit], options: &ExecOptions) -> ExecutionResult {
    execute_solver_with(solver, units, options, |_, _| {})
}

/// Like [`execute_solver`], calling `on_case(index, passed)` as soon as each
/// case produced its output.
///
/// Only a failing compiler is a compilation error. A solver that cannot be
/// copied into its build folder is an execution error.
pub fn execute_solver_with<F>(solver: &mut Solver, units: &[Unit], options: &ExecOptions, mut on_case: F) -> ExecutionResult
where
    F: FnMut(usize, bool),
{
    solver.reset(units.len());

    let prepared = match prepare(&solver.path, options.keep_build_dir) {
        Ok(prepared) => prepared,
        Err(TkError::Compilation { output }) => {
            return solver.fail(ExecutionResult::CompilationError, output)
        }
        Err(e) => return solver.fail(ExecutionResult::ExecutionError, format!("{e}\n")),
    };

    for (i, unit) in units.iter().enumerate() {
        let out = match run_command(&prepared.command, &unit.input, options.timeout) {
            Ok(out) => out,
            Err(e) => {
                let message = format!("{}: {e}\n", prepared.command.join(" "));
                return solver.fail(ExecutionResult::ExecutionError, message);
            }
        };
        if out.timed_out {
            let limit = options.timeout.map_or(0, |t| t.as_millis());
            let message = format!("timeout: case {i} exceeded {limit} ms\n");
            return solver.fail(ExecutionResult::ExecutionError, message);
        }
        if !out.success {
            return solver.fail(ExecutionResult::ExecutionError, out.combined());
        }
        let passed = out.stdout == unit.output;
        tracing::debug!(solver = %solver.filename, case = i, passed, "case done");
        solver.user_outputs[i] = Some(out.stdout);
        on_case(i, passed);
    }

    let all_equal = units
        .iter()
        .zip(&solver.user_outputs)
        .all(|(unit, user)| user.as_deref() == Some(unit.output.as_str()));
    solver.result = if all_equal {
        ExecutionResult::Success
    } else {
        ExecutionResult::WrongOutput
    };
    solver.result
}

/// Number of cases whose captured output equals the expected output.
pub fn passed_count(units: &[Unit], user_outputs: &[Option<String>]) -> usize {
    units
        .iter()
        .zip(user_outputs)
        .filter(|(unit, user)| user.as_deref() == Some(unit.output.as_str()))
        .count()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    fn cases() -> Vec<Unit> {
        vec![
            Unit::new("a", "1\n2\n", "3\n", None, "t"),
            Unit::new("b", "5\n5\n", "10\n", None, "t"),
        ]
    }

    fn write_solver(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path.display().to_string()
    }

    #[test]
    fn success_when_all_outputs_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_solver(dir.path(), "solver.sh", "read a; read b; echo $((a+b))\n");
        let mut solver = Solver::new(&path);
        let result = execute_solver(&mut solver, &cases(), &ExecOptions::default());
        assert_eq!(result, ExecutionResult::Success);
        assert_eq!(solver.user_outputs, vec![Some("3\n".into()), Some("10\n".into())]);
        assert_eq!(passed_count(&cases(), &solver.user_outputs), 2);
    }

    #[test]
    fn wrong_output_keeps_all_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_solver(dir.path(), "solver.sh", "read a; read b; echo $((a*b))\n");
        let mut solver = Solver::new(&path);
        let result = execute_solver(&mut solver, &cases(), &ExecOptions::default());
        assert_eq!(result, ExecutionResult::WrongOutput);
        assert_eq!(solver.user_outputs, vec![Some("2\n".into()), Some("25\n".into())]);
        assert_eq!(passed_count(&cases(), &solver.user_outputs), 0);
        assert!(solver.error_message.is_empty());
    }

    #[test]
    fn failing_case_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let body = "read a; read b; if [ $a -eq 5 ]; then echo boom >&2; exit 1; fi; echo $((a+b))\n";
        let path = write_solver(dir.path(), "solver.sh", body);
        let mut solver = Solver::new(&path);
        let result = execute_solver(&mut solver, &cases(), &ExecOptions::default());
        assert_eq!(result, ExecutionResult::ExecutionError);
        assert_eq!(solver.user_outputs, vec![Some("3\n".into()), None]);
        assert_eq!(solver.error_message, "boom\n");
    }

    #[test]
    fn timeout_is_an_execution_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_solver(dir.path(), "solver.sh", "sleep 5\n");
        let mut solver = Solver::new(&path);
        let options = ExecOptions {
            timeout: Some(Duration::from_millis(100)),
            keep_build_dir: false,
        };
        let result = execute_solver(&mut solver, &cases(), &options);
        assert_eq!(result, ExecutionResult::ExecutionError);
        assert_eq!(solver.error_message, "timeout: case 0 exceeded 100 ms\n");
    }

    #[test]
    fn compilation_error_leaves_outputs_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_solver(dir.path(), "solver.c", "int main( {\n");
        let mut solver = Solver::new(&path);
        let result = execute_solver(&mut solver, &cases(), &ExecOptions::default());
        assert_eq!(result, ExecutionResult::CompilationError);
        assert_eq!(solver.user_outputs, vec![None, None]);
        assert_eq!(passed_count(&cases(), &solver.user_outputs), 0);
    }

    #[test]
    fn missing_solver_folder_is_an_execution_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone").join("solver.sh").display().to_string();
        let mut solver = Solver::new(&path);
        let result = execute_solver(&mut solver, &cases(), &ExecOptions::default());
        assert_eq!(result, ExecutionResult::ExecutionError);
        assert!(solver.error_message.starts_with("I/O error on "));
        assert_eq!(solver.user_outputs, vec![None, None]);
    }

    #[test]
    fn each_case_is_announced_as_it_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_solver(dir.path(), "solver.sh", "read a; read b; echo $((a*b))\n");
        let units = vec![
            Unit::new("a", "1\n2\n", "3\n", None, "t"),
            Unit::new("b", "2\n2\n", "4\n", None, "t"),
        ];
        let mut seen = Vec::new();
        let mut solver = Solver::new(&path);
        execute_solver_with(&mut solver, &units, &ExecOptions::default(), |i, passed| seen.push((i, passed)));
        assert_eq!(seen, vec![(0, false), (1, true)]);
    }

    #[test]
    fn stopped_run_announces_only_finished_cases() {
        let dir = tempfile::tempdir().unwrap();
        let body = "read a; read b; if [ $a -eq 5 ]; then exit 1; fi; echo $((a+b))\n";
        let path = write_solver(dir.path(), "solver.sh", body);
        let mut seen = Vec::new();
        let mut solver = Solver::new(&path);
        execute_solver_with(&mut solver, &cases(), &ExecOptions::default(), |i, passed| seen.push((i, passed)));
        assert_eq!(seen, vec![(0, true)]);
    }

    #[test]
    fn rerun_overwrites_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_solver(dir.path(), "solver.sh", "read a; read b; echo $((a+b))\n");
        let mut solver = Solver::new(&path);
        solver.error_message = "stale".into();
        execute_solver(&mut solver, &cases(), &ExecOptions::default());
        assert!(solver.error_message.is_empty());
        assert_eq!(solver.mark(&Symbols::unicode()), "✓");
    }

    #[test]
    fn multi_file_entry_uses_first_file() {
        let solver = Solver::new("src/main.cpp,src/lib.cpp");
        assert_eq!(solver.path, "src/main.cpp");
        assert_eq!(solver.filename, "main.cpp");
    }
}
