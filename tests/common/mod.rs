//! Shared fixtures: scratch folders with test files and `sh` solvers.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tk::config::{HarnessConfig, Session};
use tk::output::Capture;

pub const SUM_TIO: &str = "\
>>>>>>>> one plus two
1
2
========
3
<<<<<<<<

>>>>>>>> five plus five
5
5
========
10
<<<<<<<<

>>>>>>>> zeros
0
0
========
0
<<<<<<<<
";

pub const SUM_SOLVER: &str = "read a; read b; echo $((a+b))\n";
pub const PRODUCT_SOLVER: &str = "read a; read b; echo $((a*b))\n";

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes `content` under the fixture and returns its path as a string.
    pub fn write(&self, name: &str, content: &str) -> String {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap()
    }

    pub fn root(&self) -> String {
        self.dir.path().display().to_string()
    }
}

pub fn session(width: usize) -> (Session, Capture) {
    Session::capture(HarnessConfig {
        width: Some(width),
        ..Default::default()
    })
}

