//! The tk command-line interface.
//!
//! Each subcommand maps its flags onto a `Session` and a set of parameters,
//! then hands over to the matching function in `actions`.

use crate::actions;
use crate::cli::args::{BasicArgs, Command, ManipArgs, TkArgs};
use crate::config::{DiffMode, HarnessConfig, Manip, RunParams, Session};
use crate::errors::TkResult;
use crate::output::Logger;
use crate::runner::ExecOptions;
use clap::Parser;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub mod args;

/// The main entry point for the CLI.
pub fn run() {
    let args = TkArgs::parse();
    install_subscriber();

    let result = match args.command {
        Some(command) => dispatch(command),
        None => {
            let session = Session::new(HarnessConfig::default());
            let outcomes = actions::execute(&[], &[], &RunParams::new(), &session);
            Ok(actions::all_succeeded(&outcomes))
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            process::exit(1);
        }
    }
}

/// Diagnostics go to stderr, filtered by `RUST_LOG`, quiet by default.
fn install_subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn dispatch(command: Command) -> TkResult<bool> {
    match command {
        Command::List {
            targets,
            folders,
            display,
            basic,
        } => {
            let session = Session::new(basic_config(&basic));
            let params = RunParams::new()
                .index(basic.index)
                .raw(basic.raw)
                .display(display);
            actions::list(&targets, &folders, &params, &session);
            Ok(true)
        }
        Command::Run {
            targets,
            folders,
            vertical,
            all,
            none,
            json,
            basic,
        } => {
            let config = basic_config(&basic);
            let session = if json {
                Session::with_logger(config, Logger::null())
            } else {
                Session::new(config)
            };
            let mode = if all {
                DiffMode::All
            } else if none {
                DiffMode::None
            } else {
                DiffMode::First
            };
            let params = RunParams::new()
                .index(basic.index)
                .raw(basic.raw)
                .vertical(vertical)
                .diff_mode(mode);
            let outcomes = actions::execute(&targets, &folders, &params, &session);
            if json {
                let text = serde_json::to_string_pretty(&outcomes)
                    .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"));
                println!("{text}");
            }
            Ok(actions::all_succeeded(&outcomes))
        }
        Command::Exec { target, basic } => {
            let session = Session::new(basic_config(&basic));
            actions::free_run(&target, &session)?;
            Ok(true)
        }
        Command::Build {
            target,
            targets,
            force,
            manip,
        } => {
            let session = Session::new(manip_config(&manip));
            actions::build(&target, &targets, manip_of(&manip), force, &session)
        }
        Command::Update {
            targets,
            cmd,
            manip,
        } => {
            let session = Session::new(manip_config(&manip));
            actions::update(&targets, manip_of(&manip), cmd.as_deref(), &session)
        }
    }
}

fn basic_config(basic: &BasicArgs) -> HarnessConfig {
    HarnessConfig {
        pattern: basic.pattern.clone(),
        exec: ExecOptions {
            timeout: (basic.timeout > 0).then(|| Duration::from_millis(basic.timeout)),
            keep_build_dir: basic.keep,
        },
        width: basic.width,
        ascii: basic.ascii,
    }
}

fn manip_config(manip: &ManipArgs) -> HarnessConfig {
    HarnessConfig {
        pattern: manip.pattern.clone(),
        width: manip.width,
        ..Default::default()
    }
}

fn manip_of(manip: &ManipArgs) -> Manip {
    Manip {
        unlabel: manip.unlabel,
        sort: manip.sort,
        number: manip.number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_flags_map_onto_config() {
        let args = TkArgs::parse_from(["tk", "run", "solver.py", "t.tio", "-a", "-w", "60", "-t", "0", "--ascii"]);
        let Some(Command::Run { targets, all, basic, .. }) = args.command else {
            panic!("expected run");
        };
        assert_eq!(targets, vec!["solver.py", "t.tio"]);
        assert!(all);
        let config = basic_config(&basic);
        assert_eq!(config.width, Some(60));
        assert!(config.exec.timeout.is_none());
        assert!(config.ascii);
        assert_eq!(config.pattern, "@.in @.sol");
    }

    #[test]
    fn all_and_none_conflict() {
        assert!(TkArgs::try_parse_from(["tk", "run", "-a", "-n"]).is_err());
    }

    #[test]
    fn manip_flags() {
        let args = TkArgs::try_parse_from(["tk", "build", "out.tio", "a.tio", "b.vpl", "-f", "-s", "-n"]).unwrap();
        let Some(Command::Build { target, targets, force, manip }) = args.command else {
            panic!("expected build");
        };
        assert_eq!(target, "out.tio");
        assert_eq!(targets, vec!["a.tio", "b.vpl"]);
        assert!(force);
        assert_eq!(
            manip_of(&manip),
            Manip {
                unlabel: false,
                sort: true,
                number: true
            }
        );
    }

    #[test]
    fn no_subcommand_is_accepted() {
        assert!(TkArgs::try_parse_from(["tk"]).unwrap().command.is_none());
    }
}
