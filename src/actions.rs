//! The operations behind each subcommand. Every action receives the
//! session explicitly and writes its report through the session logger.

use crate::config::{DiffMode, Manip, RunParams, Session};
use crate::errors::{TkError, TkResult};
use crate::loader;
use crate::report::{calc_filler, max_just};
use crate::runner::process::run_interactive;
use crate::runner::{execute_solver, execute_solver_with, passed_count, prepare, ExecOptions, ExecutionResult, Solver};
use crate::unit::Unit;
use crate::wdir::{self, calc_grade, resolve_working_sets, select_failures, WorkingSet};
use crate::writer;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// What one solver achieved on one working set.
#[derive(Debug, Clone, Serialize)]
pub struct SolverOutcome {
    pub filename: String,
    pub result: ExecutionResult,
    pub passed: usize,
    pub grade: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkingSetOutcome {
    pub folder: String,
    pub units: usize,
    pub solvers: Vec<SolverOutcome>,
}

/// True when every working set had at least one solver and all of them
/// passed every case.
pub fn all_succeeded(outcomes: &[WorkingSetOutcome]) -> bool {
    !outcomes.is_empty()
        && outcomes.iter().all(|outcome| {
            !outcome.solvers.is_empty()
                && outcome
                    .solvers
                    .iter()
                    .all(|solver| solver.result == ExecutionResult::Success)
        })
}

// ============================================================================
// BUILDING BLOCKS
// ============================================================================

/// Loads one source, numbered and graded as if it were a working set alone.
pub fn load_source(path: &str, session: &Session) -> TkResult<Vec<Unit>> {
    let pattern = session.pattern()?;
    let mut units = loader::parse_source(path, &pattern, &session.log)?;
    wdir::number_and_mark_duplicates(&mut units);
    wdir::resolve_grades(&mut units);
    Ok(units)
}

/// Runs `solver` over `units` with the session limits, optionally keeping
/// the build folder.
pub fn run_solver<'a>(solver: &'a mut Solver, units: &[Unit], keep: bool, session: &Session) -> &'a Solver {
    let options = ExecOptions {
        keep_build_dir: keep || session.config.exec.keep_build_dir,
        ..session.config.exec.clone()
    };
    execute_solver(solver, units, &options);
    solver
}

/// Renders `units` with the captured outputs, if any.
pub fn render(units: &[Unit], user_outputs: Option<&[Option<String>]>, params: &RunParams, session: &Session) -> String {
    session
        .report
        .show_unit_list(units, user_outputs, params.raw, params.vertical)
}

// ============================================================================
// LIST
// ============================================================================

/// Prints a summary of every working set with its case headers, and the
/// full cases when `display` is set.
pub fn list(targets: &[String], folders: &[String], params: &RunParams, session: &Session) -> Vec<(String, usize)> {
    let wdirs = resolve_working_sets(targets, folders, params.index, session);
    let resumes: Vec<[String; 4]> = wdirs.iter().map(|w| w.resume(session)).collect();
    let sizes = max_just(&resumes);
    let all_units: Vec<Unit> = wdirs.iter().flat_map(|w| w.units.iter().cloned()).collect();
    let fill = calc_filler(&all_units);

    for (resume, wdir) in resumes.iter().zip(&wdirs) {
        session.log.write(&resume_begin(resume, &sizes, session));
        session.log.write(&solvers_column(wdir, sizes[3], session));
        if !wdir.units.is_empty() {
            let headers = session.report.format_header_list(&wdir.units, None, fill);
            session.log.write_at(&format!("{headers}\n"), 1);
        }
        if params.display {
            session.log.write(&render(&wdir.units, None, params, session));
        }
    }
    wdirs.iter().map(|w| (w.folder.clone(), w.units.len())).collect()
}

// ============================================================================
// EXECUTE
// ============================================================================

/// Runs every solver of every working set, reports failures and diffs, and
/// prints the final grade of each solver.
pub fn execute(targets: &[String], folders: &[String], params: &RunParams, session: &Session) -> Vec<WorkingSetOutcome> {
    let mut wdirs = resolve_working_sets(targets, folders, params.index, session);
    let resumes: Vec<[String; 4]> = wdirs.iter().map(|w| w.resume(session)).collect();
    let sizes = max_just(&resumes);

    let mut outcomes = Vec::with_capacity(wdirs.len());
    for (resume, wdir) in resumes.iter().zip(wdirs.iter_mut()) {
        session.log.write(&resume_begin(resume, &sizes, session));
        run_with_progress(wdir, sizes[3], session);

        let mut solvers = Vec::with_capacity(wdir.solvers.len());
        for solver in &wdir.solvers {
            let failure = report_failure(solver, &wdir.units, session);
            if !failure.is_empty() {
                session.log.write_at(&failure, 1);
            }
            session.log.write(&report_diffs(solver, &wdir.units, params, session));
            let grade = calc_grade(&wdir.units, &solver.user_outputs);
            session
                .log
                .line(&session.report.centralize(&format!("FINAL GRADE: {grade}"), " "));
            solvers.push(SolverOutcome {
                filename: solver.filename.clone(),
                result: solver.result,
                passed: passed_count(&wdir.units, &solver.user_outputs),
                grade,
            });
        }
        outcomes.push(WorkingSetOutcome {
            folder: wdir.folder.clone(),
            units: wdir.units.len(),
            solvers,
        });
    }
    outcomes
}

fn resume_begin(resume: &[String; 4], sizes: &[usize; 4], session: &Session) -> String {
    let mut head = resume.clone();
    head[3].clear();
    session.report.format_resume(&head, sizes)
}

/// ` [solver mark, ...]` closing the summary line, or the failure glyph
/// when the working set has no solver.
fn solvers_column(wdir: &WorkingSet, size: usize, session: &Session) -> String {
    let symbols = session.symbols();
    if wdir.solvers.is_empty() {
        return no_solver_column(size, session);
    }
    let entries = wdir
        .solvers
        .iter()
        .map(|solver| format!("{} {}", solver.filename, solver.mark(symbols)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(" [ {entries}]\n")
}

fn no_solver_column(size: usize, session: &Session) -> String {
    let symbols = session.symbols();
    let empty = crate::report::center(symbols.failure, size, symbols.cfill);
    format!(" [{empty}] {}\n", symbols.failure)
}

/// Runs every solver of `wdir` while closing its summary line: one pass or
/// fail mark per case as it finishes, then ` solver mark` for each solver,
/// as in ` [✓✗✓ solver.py ω]`.
fn run_with_progress(wdir: &mut WorkingSet, size: usize, session: &Session) {
    if wdir.solvers.is_empty() {
        session.log.write(&no_solver_column(size, session));
        return;
    }
    let symbols = session.symbols();
    session.log.write(" [");
    for (i, solver) in wdir.solvers.iter_mut().enumerate() {
        if i > 0 {
            session.log.write(", ");
        }
        tracing::info!(solver = %solver.path, cases = wdir.units.len(), "running solver");
        execute_solver_with(solver, &wdir.units, &session.config.exec, |_, passed| {
            session
                .log
                .write(if passed { symbols.success } else { symbols.failure });
        });
        session
            .log
            .write(&format!(" {} {}", solver.filename, solver.mark(symbols)));
    }
    session.log.write("]\n");
}

/// `(mark)=>path RESULT` followed by the case headers on a wrong answer or
/// the error text otherwise. Empty on success.
fn report_failure(solver: &Solver, units: &[Unit], session: &Session) -> String {
    if solver.result == ExecutionResult::Success {
        return String::new();
    }
    let symbols = session.symbols();
    let title = format!(
        "({}){}{} {}\n",
        solver.mark(symbols),
        symbols.opening,
        solver.path,
        solver.result
    );
    let body = if solver.result == ExecutionResult::WrongOutput {
        let headers = session
            .report
            .format_header_list(units, Some(&solver.user_outputs), calc_filler(units));
        format!("{headers}\n")
    } else {
        format!("{}\n", solver.error_message.trim_end_matches('\n'))
    };
    format!("{title}{}", crate::output::indent(&body, 1))
}

fn report_diffs(solver: &Solver, units: &[Unit], params: &RunParams, session: &Session) -> String {
    if solver.result != ExecutionResult::WrongOutput || params.diff_mode == DiffMode::None {
        return String::new();
    }
    let caption = match params.diff_mode {
        DiffMode::First => "MODE: FIRST FAILURE ONLY",
        _ => "MODE: ALL FAILURES",
    };
    let (failed, outputs) = select_failures(units, &solver.user_outputs, params.diff_mode);
    format!(
        "{}\n{}",
        session.report.centralize(caption, " "),
        render(&failed, Some(&outputs), params, session)
    )
}

// ============================================================================
// BUILD / UPDATE
// ============================================================================

/// Collects the cases of `sources` into `dest`. Returns false when a source
/// is missing or the destination was left untouched.
pub fn build(dest: &str, sources: &[String], manip: Manip, force: bool, session: &Session) -> TkResult<bool> {
    session.log.inc_level();
    let result = match build_inner(dest, sources, manip, force, session) {
        Err(e @ (TkError::NotFound { .. } | TkError::NoSourceFound)) => {
            session.log.line(&e.to_string());
            Ok(false)
        }
        other => other,
    };
    session.log.dec_level();
    result
}

fn build_inner(dest: &str, sources: &[String], manip: Manip, force: bool, session: &Session) -> TkResult<bool> {
    let mut wdir = WorkingSet::new(".")
        .with_sources(sources.to_vec())
        .parse_sources(session)?;
    wdir.manipulate(manip);
    writer::save_target(dest, &wdir.units, &session.pattern()?, force, &session.log)
}

/// Rewrites each target in place, optionally regenerating the expected
/// outputs with `reference`. Markdown documents keep their prose; only
/// their test blocks change.
pub fn update(targets: &[String], manip: Manip, reference: Option<&str>, session: &Session) -> TkResult<bool> {
    let pattern = session.pattern()?;
    for target in targets {
        let mut wdir = WorkingSet::new(".")
            .with_sources(vec![target.clone()])
            .parse_sources(session)?;
        wdir.manipulate(manip);
        if let Some(reference) = reference {
            wdir.replace_outputs(reference, session)?;
        }
        if target.ends_with(".md") {
            let text = loader::read_text(Path::new(target))?;
            let tests: Vec<String> = wdir.units.iter().map(writer::to_tio).collect();
            fs::write(target, writer::insert_tests(&text, &tests)).map_err(|e| TkError::io(target, e))?;
        } else {
            writer::save_target(target, &wdir.units, &pattern, true, &session.log)?;
        }
    }
    Ok(true)
}

// ============================================================================
// FREE RUN
// ============================================================================

/// Builds a solver, or the first solver of a folder, and runs it attached
/// to the terminal.
pub fn free_run(target: &str, session: &Session) -> TkResult<()> {
    let solver = if Path::new(target).is_dir() {
        WorkingSet::new(target)
            .load_solvers()?
            .solvers
            .into_iter()
            .next()
            .ok_or_else(|| TkError::NotFound {
                path: format!("{target}/solver*"),
            })?
    } else {
        Solver::new(target)
    };
    let prepared = prepare(&solver.path, session.config.exec.keep_build_dir)?;
    let hbar = session.symbols().hbar;
    session
        .log
        .line(&session.report.centralize(" Free Running Mode ", hbar));
    let status = run_interactive(&prepared.command).map_err(|e| TkError::Execution {
        output: format!("{}: {e}", prepared.command.join(" ")),
    })?;
    tracing::debug!(?status, "free run finished");
    Ok(())
}
