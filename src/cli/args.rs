//! Command-line arguments and subcommands for the tk CLI.

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "tk",
    version,
    about = "Run solver programs against stored test cases and grade the results."
)]
pub struct TkArgs {
    /// Without a subcommand, runs the solvers of the current folder.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options shared by the commands that load and show cases.
#[derive(Debug, Clone, Args)]
pub struct BasicArgs {
    /// Terminal width used by the reports.
    #[arg(long, short = 'w')]
    pub width: Option<usize>,
    /// Raw mode, disables whitespace rendering.
    #[arg(long, short = 'r')]
    pub raw: bool,
    /// Use only the case at this index.
    #[arg(long, short = 'i', value_name = "I")]
    pub index: Option<usize>,
    /// Pattern used to load a folder of input/output files.
    #[arg(long, short = 'p', value_name = "P", default_value = "@.in @.sol")]
    pub pattern: String,
    /// Use plain ASCII marks.
    #[arg(long)]
    pub ascii: bool,
    /// Per-case time limit in milliseconds, 0 disables it.
    #[arg(long, short = 't', value_name = "MS", default_value_t = 10_000)]
    pub timeout: u64,
    /// Keep the temporary build folder of each solver.
    #[arg(long)]
    pub keep: bool,
}

/// Options shared by the commands that rewrite test files.
#[derive(Debug, Clone, Args)]
pub struct ManipArgs {
    /// Terminal width used by the reports.
    #[arg(long, short = 'w')]
    pub width: Option<usize>,
    /// Remove all labels.
    #[arg(long, short = 'u')]
    pub unlabel: bool,
    /// Number labels.
    #[arg(long, short = 'n')]
    pub number: bool,
    /// Sort test cases by input size.
    #[arg(long, short = 's')]
    pub sort: bool,
    /// Pattern used to load or save a folder of input/output files.
    #[arg(long, short = 'p', value_name = "@.in @.out", default_value = "@.in @.sol")]
    pub pattern: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show case packs or folders.
    List {
        /// Solvers, test files or folders.
        #[arg(value_name = "T")]
        targets: Vec<String>,
        /// Folders, each loaded as its own working set.
        #[arg(long, short = 'f', value_name = "T", num_args = 1..)]
        folders: Vec<String>,
        /// Display the full test description.
        #[arg(long, short = 'd')]
        display: bool,
        #[command(flatten)]
        basic: BasicArgs,
    },
    /// Run your solver against the cases.
    Run {
        /// Solvers, test files or folders.
        #[arg(value_name = "T")]
        targets: Vec<String>,
        /// Folders, each loaded as its own working set.
        #[arg(long, short = 'f', value_name = "T", num_args = 1..)]
        folders: Vec<String>,
        /// Use vertical mode.
        #[arg(long, short = 'v')]
        vertical: bool,
        /// Show all failures.
        #[arg(long, short = 'a', conflicts_with = "none")]
        all: bool,
        /// Show no failures.
        #[arg(long, short = 'n')]
        none: bool,
        /// Print the outcome of each working set as JSON.
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        basic: BasicArgs,
    },
    /// Just run the solver without any test.
    Exec {
        /// Solver file or folder.
        #[arg(value_name = "T")]
        target: String,
        #[command(flatten)]
        basic: BasicArgs,
    },
    /// Build a test target from other test targets.
    Build {
        /// Target to be built.
        #[arg(value_name = "T_OUT")]
        target: String,
        /// Input test targets.
        #[arg(value_name = "T", required = true)]
        targets: Vec<String>,
        /// Enable overwrite.
        #[arg(long, short = 'f')]
        force: bool,
        #[command(flatten)]
        manip: ManipArgs,
    },
    /// Rewrite test targets in place.
    Update {
        /// Input test targets.
        #[arg(value_name = "T", required = true)]
        targets: Vec<String>,
        /// Solver file or command used to regenerate the outputs.
        #[arg(long, short = 'c')]
        cmd: Option<String>,
        #[command(flatten)]
        manip: ManipArgs,
    },
}
