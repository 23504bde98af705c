//! Solver preparation: copy into an isolated build folder, compile when the
//! language needs it, and produce the command line that runs one case.

use crate::errors::{TkError, TkResult};
use crate::runner::process::run_command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    JavaScript,
    Shell,
    TypeScript,
    Java,
    C,
    Cpp,
}

#[derive(Debug)]
enum Strategy {
    /// `<interpreter> <file>`
    Interpreted(&'static str),
    /// Compile every sibling into `.a.out`, then run it.
    Native {
        compiler: &'static str,
        flags: &'static [&'static str],
        libs: &'static [&'static str],
    },
    /// `javac` every sibling, then `java -cp <dir> <class>`.
    Jvm,
    /// `esbuild` every sibling to CommonJS, then `node <file>.js`.
    Transpiled,
}

#[derive(Debug)]
struct Toolchain {
    extension: &'static str,
    language: Language,
    strategy: Strategy,
}

static TOOLCHAINS: &[Toolchain] = &[
    Toolchain {
        extension: "py",
        language: Language::Python,
        strategy: Strategy::Interpreted("python3"),
    },
    Toolchain {
        extension: "js",
        language: Language::JavaScript,
        strategy: Strategy::Interpreted("node"),
    },
    Toolchain {
        extension: "sh",
        language: Language::Shell,
        strategy: Strategy::Interpreted("sh"),
    },
    Toolchain {
        extension: "ts",
        language: Language::TypeScript,
        strategy: Strategy::Transpiled,
    },
    Toolchain {
        extension: "java",
        language: Language::Java,
        strategy: Strategy::Jvm,
    },
    Toolchain {
        extension: "c",
        language: Language::C,
        strategy: Strategy::Native {
            compiler: "gcc",
            flags: &["-Wall"],
            libs: &["-lm", "-lutil"],
        },
    },
    Toolchain {
        extension: "cpp",
        language: Language::Cpp,
        strategy: Strategy::Native {
            compiler: "g++",
            flags: &["-std=c++20", "-Wall", "-Wextra"],
            libs: &[],
        },
    },
];

const ARTIFACT: &str = ".a.out";

pub fn language_of(path: &Path) -> Option<Language> {
    toolchain_of(path).map(|tc| tc.language)
}

fn toolchain_of(path: &Path) -> Option<&'static Toolchain> {
    let ext = path.extension()?.to_str()?;
    TOOLCHAINS.iter().find(|tc| tc.extension == ext)
}

enum BuildDir {
    Scoped(TempDir),
    Kept(PathBuf),
}

/// A runnable solver. Dropping it removes the build folder unless it was
/// prepared with `keep`.
pub struct Prepared {
    pub command: Vec<String>,
    build_dir: Option<BuildDir>,
}

impl Prepared {
    pub fn build_dir(&self) -> Option<&Path> {
        match &self.build_dir {
            Some(BuildDir::Scoped(dir)) => Some(dir.path()),
            Some(BuildDir::Kept(path)) => Some(path),
            None => None,
        }
    }
}

/// Prepares `solver` for execution.
///
/// A path containing a space is taken as a complete command line. Otherwise
/// the regular files next to the solver are copied into a fresh temporary
/// folder where the language toolchain builds it; unknown extensions run the
/// copied file directly.
pub fn prepare(solver: &str, keep: bool) -> TkResult<Prepared> {
    if solver.contains(' ') {
        return Ok(Prepared {
            command: solver.split_whitespace().map(String::from).collect(),
            build_dir: None,
        });
    }

    let path = Path::new(solver);
    let source_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let filename = path
        .file_name()
        .ok_or_else(|| TkError::NotFound {
            path: solver.to_string(),
        })?
        .to_owned();

    let temp = tempfile::Builder::new()
        .prefix("tk-")
        .tempdir()
        .map_err(|e| TkError::io("temporary build folder", e))?;
    copy_files(&source_dir, temp.path())?;
    tracing::debug!(solver, dir = %temp.path().display(), "copied solver folder");

    let copy = temp.path().join(&filename);
    let command = match toolchain_of(path) {
        None => vec![display(&copy)],
        Some(tc) => build(tc, &copy, temp.path())?,
    };

    let build_dir = if keep {
        #[allow(deprecated)]
        let kept = temp.into_path();
        tracing::info!(dir = %kept.display(), "keeping build folder");
        BuildDir::Kept(kept)
    } else {
        BuildDir::Scoped(temp)
    };
    Ok(Prepared {
        command,
        build_dir: Some(build_dir),
    })
}

fn build(tc: &Toolchain, copy: &Path, dir: &Path) -> TkResult<Vec<String>> {
    let stem = copy
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match &tc.strategy {
        Strategy::Interpreted(interpreter) => Ok(vec![interpreter.to_string(), display(copy)]),
        Strategy::Native {
            compiler,
            flags,
            libs,
        } => {
            let artifact = dir.join(ARTIFACT);
            let mut cmd = vec![compiler.to_string()];
            cmd.extend(flags.iter().map(|f| f.to_string()));
            cmd.extend(siblings(dir, tc.extension)?);
            cmd.extend(["-o".to_string(), display(&artifact)]);
            cmd.extend(libs.iter().map(|l| l.to_string()));
            compile(&cmd)?;
            Ok(vec![display(&artifact)])
        }
        Strategy::Jvm => {
            let mut cmd = vec!["javac".to_string()];
            cmd.extend(siblings(dir, tc.extension)?);
            cmd.extend(["-d".to_string(), display(dir)]);
            compile(&cmd)?;
            Ok(vec!["java".into(), "-cp".into(), display(dir), stem])
        }
        Strategy::Transpiled => {
            let mut cmd = vec!["esbuild".to_string()];
            cmd.extend(siblings(dir, tc.extension)?);
            cmd.push(format!("--outdir={}", dir.display()));
            cmd.push("--format=cjs".to_string());
            cmd.push("--log-level=error".to_string());
            compile(&cmd)?;
            Ok(vec!["node".into(), display(&dir.join(format!("{stem}.js")))])
        }
    }
}

fn compile(cmd: &[String]) -> TkResult<()> {
    tracing::debug!(command = %cmd.join(" "), "building solver");
    match run_command(cmd, "", None) {
        Ok(out) if out.success => Ok(()),
        Ok(out) => Err(TkError::Compilation {
            output: out.combined(),
        }),
        Err(e) => Err(TkError::Compilation {
            output: format!("{}: {e}\n", cmd[0]),
        }),
    }
}

/// Files in `dir` with `extension`, skipping names starting with `_`.
fn siblings(dir: &Path, extension: &str) -> TkResult<Vec<String>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| TkError::io(dir.display().to_string(), e.into()))?;
        let name = entry.file_name().to_string_lossy();
        let matches = entry.path().extension().and_then(|e| e.to_str()) == Some(extension);
        if entry.file_type().is_file() && matches && !name.starts_with('_') {
            found.push(display(entry.path()));
        }
    }
    found.sort();
    Ok(found)
}

fn copy_files(from: &Path, to: &Path) -> TkResult<()> {
    for entry in WalkDir::new(from).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| TkError::io(from.display().to_string(), e.into()))?;
        if entry.file_type().is_file() {
            fs::copy(entry.path(), to.join(entry.file_name()))
                .map_err(|e| TkError::io(entry.path().display().to_string(), e))?;
        }
    }
    Ok(())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
