//! Working sets: a folder's test sources and solvers, loaded and graded
//! together.

use crate::config::{DiffMode, Manip, Session};
use crate::errors::{TkError, TkResult};
use crate::loader::{self, list_files, SourceFormat};
use crate::runner::{execute_solver, ExecutionResult, Solver};
use crate::unit::{LabelFactory, Unit};
use std::path::Path;

/// Separator joining the files of a multi-file solver on the command line.
pub const MULTI_FILE_SEPARATOR: &str = ",";

#[derive(Debug, Clone)]
pub struct WorkingSet {
    pub folder: String,
    pub sources: Vec<String>,
    pub solvers: Vec<Solver>,
    /// Loaded sources and how many cases each contributed.
    pub packs: Vec<(String, usize)>,
    pub units: Vec<Unit>,
}

impl WorkingSet {
    pub fn new(folder: &str) -> Self {
        WorkingSet {
            folder: folder.to_string(),
            sources: Vec::new(),
            solvers: Vec::new(),
            packs: Vec::new(),
            units: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_solvers(mut self, solvers: &[String]) -> Self {
        self.solvers = solvers.iter().map(|path| Solver::new(path)).collect();
        self
    }

    /// Every non-hidden `.tio` and `.vpl` file of the folder, or its readme
    /// when there are none.
    pub fn load_sources(mut self) -> TkResult<Self> {
        let files = list_files(Path::new(&self.folder))?;
        let mut found: Vec<&String> = files
            .iter()
            .filter(|name| !name.starts_with('.'))
            .filter(|name| name.ends_with(".tio") || name.ends_with(".vpl"))
            .collect();
        if found.is_empty() {
            found = files
                .iter()
                .filter(|name| name.as_str() == "Readme.md" || name.as_str() == "README.md")
                .take(1)
                .collect();
        }
        self.sources = found.into_iter().map(|name| self.join(name)).collect();
        Ok(self)
    }

    /// Every file of the folder whose name starts with `solver`, any case.
    pub fn load_solvers(mut self) -> TkResult<Self> {
        let files = list_files(Path::new(&self.folder))?;
        self.solvers = files
            .iter()
            .filter(|name| name.to_lowercase().starts_with("solver"))
            .map(|name| Solver::new(&self.join(name)))
            .collect();
        Ok(self)
    }

    /// Loads every source, then numbers the cases, marks duplicates and
    /// resolves grade reductions. Missing sources are reported and skipped
    /// unless all of them are missing.
    pub fn parse_sources(mut self, session: &Session) -> TkResult<Self> {
        let pattern = session.pattern()?;
        let mut failures = 0;
        let mut units = Vec::new();
        for source in &self.sources {
            match loader::parse_source(source, &pattern, &session.log) {
                Ok(pack) => {
                    self.packs.push((source.clone(), pack.len()));
                    units.extend(pack);
                }
                Err(e @ TkError::NotFound { .. }) => {
                    session.log.line(&e.to_string());
                    failures += 1;
                }
                Err(e) => return Err(e),
            }
        }
        if failures > 0 && failures == self.sources.len() {
            return Err(TkError::NoSourceFound);
        }
        tracing::debug!(folder = %self.folder, cases = units.len(), "sources loaded");
        number_and_mark_duplicates(&mut units);
        resolve_grades(&mut units);
        self.units = units;
        Ok(self)
    }

    /// Keeps only the case at `index`, when given.
    pub fn filter(mut self, index: Option<usize>) -> TkResult<Self> {
        if let Some(index) = index {
            if index >= self.units.len() {
                return Err(TkError::IndexOutOfBounds {
                    index,
                    len: self.units.len(),
                });
            }
            self.units = vec![self.units[index].clone()];
        }
        Ok(self)
    }

    /// Drops duplicates, then applies the requested rewrites.
    pub fn manipulate(&mut self, manip: Manip) {
        self.units.retain(|unit| !unit.is_duplicated());
        if manip.sort {
            self.units.sort_by_key(|unit| unit.input.len());
        }
        if manip.unlabel {
            self.units.iter_mut().for_each(|unit| unit.case.clear());
        }
        if manip.number {
            for (i, unit) in self.units.iter_mut().enumerate() {
                unit.case = LabelFactory::new().label(&unit.case).index(i).generate();
            }
        }
    }

    /// Replaces every expected output with what `reference` prints. Nothing
    /// changes when the reference fails to build or run.
    pub fn replace_outputs(&mut self, reference: &str, session: &Session) -> TkResult<()> {
        let mut solver = Solver::new(reference);
        let result = execute_solver(&mut solver, &self.units, &session.config.exec);
        if matches!(
            result,
            ExecutionResult::CompilationError | ExecutionResult::ExecutionError
        ) {
            return Err(TkError::ReferenceSolver {
                mark: solver.mark(session.symbols()).to_string(),
                path: solver.path.clone(),
                message: solver.error_message.clone(),
            });
        }
        for (unit, output) in self.units.iter_mut().zip(solver.user_outputs) {
            if let Some(output) = output {
                unit.output = output;
            }
        }
        Ok(())
    }

    pub fn unique_count(&self) -> usize {
        self.units.iter().filter(|unit| !unit.is_duplicated()).count()
    }

    /// Summary columns: folder, unique count, sources with their case
    /// counts, and solvers with their marks.
    pub fn resume(&self, session: &Session) -> [String; 4] {
        let symbols = session.symbols();
        let sources = if self.packs.is_empty() {
            symbols.failure.to_string()
        } else {
            self.packs
                .iter()
                .map(|(source, count)| format!("{}({count:02})", file_name(source)))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let solvers = self
            .solvers
            .iter()
            .map(|solver| format!("({}){}", solver.mark(symbols), solver.filename))
            .collect::<Vec<_>>()
            .join(", ");
        [
            self.folder.clone(),
            format!("{:02}", self.unique_count()),
            sources,
            solvers,
        ]
    }

    fn join(&self, name: &str) -> String {
        Path::new(&self.folder).join(name).display().to_string()
    }
}

/// Numbers cases in order and points each repeated input at its first
/// occurrence.
pub fn number_and_mark_duplicates(units: &mut [Unit]) {
    for i in 0..units.len() {
        units[i].index = i;
        units[i].duplicated_of = (0..i).find(|&j| units[j].input == units[i].input);
    }
}

/// Explicit grades are kept; the rest share 100 evenly over unique cases.
/// Duplicates never deduct.
pub fn resolve_grades(units: &mut [Unit]) {
    let unique = units.iter().filter(|unit| !unit.is_duplicated()).count();
    for unit in units.iter_mut() {
        unit.grade_reduction = if unit.is_duplicated() {
            0
        } else {
            match unit.grade {
                Some(grade) => grade,
                None => 100 / unique as u32,
            }
        };
    }
}

/// `100` minus the deductions of every failed unique case, never negative.
pub fn calc_grade(units: &[Unit], user_outputs: &[Option<String>]) -> u32 {
    let lost: u32 = units
        .iter()
        .enumerate()
        .filter(|(_, unit)| !unit.is_duplicated())
        .filter(|(i, unit)| {
            user_outputs.get(*i).and_then(|u| u.as_deref()) != Some(unit.output.as_str())
        })
        .map(|(_, unit)| unit.grade_reduction)
        .sum();
    100u32.saturating_sub(lost)
}

/// The failing cases to show for `mode`, with their captured outputs.
pub fn select_failures(
    units: &[Unit],
    user_outputs: &[Option<String>],
    mode: DiffMode,
) -> (Vec<Unit>, Vec<Option<String>>) {
    let failing = units.iter().enumerate().filter(|(i, unit)| {
        user_outputs.get(*i).and_then(|u| u.as_deref()) != Some(unit.output.as_str())
    });
    let take = match mode {
        DiffMode::None => 0,
        DiffMode::First => 1,
        DiffMode::All => usize::MAX,
    };
    failing
        .take(take)
        .map(|(i, unit)| (unit.clone(), user_outputs.get(i).cloned().flatten()))
        .unzip()
}

// ============================================================================
// TARGET RESOLUTION
// ============================================================================

/// Rejoins multi-file solvers split by the shell: `["lib.cpp,", "main.cpp"]`
/// and `["lib.cpp", ",", "main.cpp"]` both become `["lib.cpp,main.cpp"]`.
pub fn join_multi_file_solvers(targets: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for entry in targets {
        match out.last_mut() {
            Some(last) if entry == MULTI_FILE_SEPARATOR || last.ends_with(MULTI_FILE_SEPARATOR) => {
                last.push_str(entry)
            }
            _ => out.push(entry.clone()),
        }
    }
    out
}

/// Folders and test files are sources, and so is a folder followed by its
/// own pattern; anything else is a solver.
pub fn is_source(target: &str) -> bool {
    if SourceFormat::of(Path::new(target)) != SourceFormat::Unsupported {
        return true;
    }
    matches!(target.split_once(' '), Some((folder, _)) if Path::new(folder).is_dir())
}

/// Splits targets into (solvers, sources).
pub fn split_targets(targets: &[String]) -> (Vec<String>, Vec<String>) {
    join_multi_file_solvers(targets)
        .into_iter()
        .partition(|target| !is_source(target))
}

/// Resolves targets and folders into loaded working sets.
///
/// Explicit targets form one working set rooted at `.`; every folder forms
/// its own. With neither, the current folder is used. A working set that
/// fails to load is reported and skipped.
pub fn resolve_working_sets(
    targets: &[String],
    folders: &[String],
    index: Option<usize>,
    session: &Session,
) -> Vec<WorkingSet> {
    let (solvers, sources) = split_targets(targets);
    let mut folders = folders.to_vec();
    if targets.is_empty() && folders.is_empty() {
        folders.push(".".to_string());
    }

    let mut pending: Vec<TkResult<WorkingSet>> = Vec::new();
    if !solvers.is_empty() || !sources.is_empty() {
        pending.push(Ok(WorkingSet::new(".")
            .with_sources(sources)
            .with_solvers(&solvers)));
    }
    for folder in &folders {
        pending.push(
            WorkingSet::new(folder)
                .load_solvers()
                .and_then(WorkingSet::load_sources),
        );
    }

    pending
        .into_iter()
        .filter_map(|wdir| {
            match wdir.and_then(|w| w.parse_sources(session)).and_then(|w| w.filter(index)) {
                Ok(wdir) => Some(wdir),
                Err(e) => {
                    session.log.line(&e.to_string());
                    None
                }
            }
        })
        .collect()
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(input: &str, output: &str, grade: Option<u32>) -> Unit {
        Unit::new("", input, output, grade, "t.tio")
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn duplicates_point_at_first_occurrence() {
        let mut units = vec![unit("1\n", "1\n", None), unit("2\n", "2\n", None), unit("1\n", "1\n", None), unit("1\n", "x\n", None)];
        number_and_mark_duplicates(&mut units);
        let refs: Vec<_> = units.iter().map(|u| u.duplicated_of).collect();
        assert_eq!(refs, vec![None, None, Some(0), Some(0)]);
        assert_eq!(units[3].index, 3);
    }

    #[test]
    fn proportional_grades_skip_duplicates() {
        let mut units = vec![
            unit("1\n", "1\n", None),
            unit("2\n", "2\n", None),
            unit("3\n", "3\n", Some(50)),
            unit("1\n", "1\n", None),
        ];
        number_and_mark_duplicates(&mut units);
        resolve_grades(&mut units);
        let reductions: Vec<_> = units.iter().map(|u| u.grade_reduction).collect();
        assert_eq!(reductions, vec![33, 33, 50, 0]);
    }

    #[test]
    fn grade_counts_failed_unique_cases() {
        let mut units = vec![unit("1\n", "1\n", None), unit("2\n", "2\n", None), unit("3\n", "3\n", None)];
        number_and_mark_duplicates(&mut units);
        resolve_grades(&mut units);
        let all_right = vec![Some("1\n".into()), Some("2\n".into()), Some("3\n".into())];
        assert_eq!(calc_grade(&units, &all_right), 100);
        let one_wrong = vec![Some("1\n".into()), Some("x\n".into()), Some("3\n".into())];
        assert_eq!(calc_grade(&units, &one_wrong), 67);
        assert_eq!(calc_grade(&units, &[None, None, None]), 1);
    }

    #[test]
    fn grade_never_negative() {
        let mut units = vec![unit("1\n", "1\n", Some(80)), unit("2\n", "2\n", Some(80))];
        number_and_mark_duplicates(&mut units);
        resolve_grades(&mut units);
        assert_eq!(calc_grade(&units, &[None, None]), 0);
    }

    #[test]
    fn failure_selection_modes() {
        let units = vec![unit("1\n", "1\n", None), unit("2\n", "2\n", None), unit("3\n", "3\n", None)];
        let outputs = vec![Some("1\n".into()), Some("x\n".into()), Some("y\n".into())];
        let (first, first_out) = select_failures(&units, &outputs, DiffMode::First);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].input, "2\n");
        assert_eq!(first_out, vec![Some("x\n".to_string())]);
        let (all, _) = select_failures(&units, &outputs, DiffMode::All);
        assert_eq!(all.len(), 2);
        let (none, _) = select_failures(&units, &outputs, DiffMode::None);
        assert!(none.is_empty());
    }

    #[test]
    fn single_middle_failure_is_shown_alone_in_both_modes() {
        let units = vec![unit("1\n", "1\n", None), unit("2\n", "2\n", None), unit("3\n", "3\n", None)];
        let outputs = vec![Some("1\n".into()), Some("x\n".into()), Some("3\n".into())];
        for mode in [DiffMode::First, DiffMode::All] {
            let (failed, failed_out) = select_failures(&units, &outputs, mode);
            assert_eq!(failed.len(), 1, "{mode:?}");
            assert_eq!(failed[0].input, "2\n");
            assert_eq!(failed_out, vec![Some("x\n".to_string())]);
        }
    }

    #[test]
    fn manipulate_drops_duplicates_and_renumbers() {
        let mut wdir = WorkingSet::new(".");
        wdir.units = vec![
            Unit::new("03 longo", "1 2 3\n", "6\n", None, "t"),
            Unit::new("curto", "1\n", "1\n", None, "t"),
            Unit::new("dup", "1\n", "1\n", None, "t"),
        ];
        number_and_mark_duplicates(&mut wdir.units);
        wdir.manipulate(Manip {
            unlabel: false,
            sort: true,
            number: true,
        });
        let cases: Vec<_> = wdir.units.iter().map(|u| u.case.as_str()).collect();
        assert_eq!(cases, vec!["00 curto", "01 longo"]);
    }

    #[test]
    fn filter_checks_bounds() {
        let mut wdir = WorkingSet::new(".");
        wdir.units = vec![unit("1\n", "1\n", None), unit("2\n", "2\n", None)];
        number_and_mark_duplicates(&mut wdir.units);
        let kept = wdir.clone().filter(Some(1)).unwrap();
        assert_eq!(kept.units.len(), 1);
        assert_eq!(kept.units[0].index, 1);
        let err = wdir.filter(Some(5)).unwrap_err();
        assert_eq!(err.to_string(), "Index Number out of bounds: 5");
    }

    #[test]
    fn multi_file_solvers_are_joined() {
        assert_eq!(
            join_multi_file_solvers(&strings(&["lib.cpp,", "main.cpp", "t.tio"])),
            strings(&["lib.cpp,main.cpp", "t.tio"])
        );
        assert_eq!(
            join_multi_file_solvers(&strings(&["lib.cpp", ",", "main.cpp"])),
            strings(&["lib.cpp,main.cpp"])
        );
    }

    #[test]
    fn targets_split_by_kind() {
        let (solvers, sources) = split_targets(&strings(&["solver.c", "t.tio", "x.vpl", "Readme.md"]));
        assert_eq!(solvers, strings(&["solver.c"]));
        assert_eq!(sources, strings(&["t.tio", "x.vpl", "Readme.md"]));
    }
}
