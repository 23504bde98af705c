// Loading every source format through the collaborator surface, and
// resolving targets into working sets.

mod common;

use common::{session, Fixture, SUM_TIO};
use tk::actions::load_source;
use tk::config::{HarnessConfig, Session};
use tk::wdir::resolve_working_sets;
use tk::TkError;

#[test]
fn tio_file_loads_in_order() {
    let fx = Fixture::new();
    let path = fx.write("t.tio", SUM_TIO);
    let (session, _) = session(41);
    let units = load_source(&path, &session).unwrap();
    assert_eq!(units.len(), 3);
    assert_eq!(units[0].case, "one plus two");
    assert_eq!(units[0].input, "1\n2\n");
    assert_eq!(units[1].output, "10\n");
    assert_eq!(units[2].index, 2);
    assert!(units.iter().all(|u| u.grade_reduction == 33));
}

#[test]
fn vpl_file_with_grades() {
    let fx = Fixture::new();
    let text = "case=soma\ninput=1 2\noutput=\"3\"\ngrade reduction=40%\n\ncase=dobro\ninput=4\noutput=\"8\"\n";
    let path = fx.write("t.vpl", text);
    let (session, _) = session(41);
    let units = load_source(&path, &session).unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].grade, Some(40));
    assert_eq!(units[0].grade_reduction, 40);
    assert_eq!(units[1].grade, None);
    assert_eq!(units[1].output, "8\n");
}

#[test]
fn markdown_mixes_blocks_and_transcripts() {
    let fx = Fixture::new();
    let text = "# Problem\n\nSome prose.\n\n```\n>>>>>>>>\n1\n========\n1\n<<<<<<<<\n```\n\n#__case talk\n$hi\nhello\n$end\n";
    let path = fx.write("Readme.md", text);
    let (session, _) = session(41);
    let units = load_source(&path, &session).unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].input, "1\n");
    assert_eq!(units[1].case, "talk");
    assert_eq!(units[1].input, "hi\nend\n");
}

#[test]
fn folder_pairs_follow_the_pattern() {
    let fx = Fixture::new();
    fx.write("cases/00.in", "1\n");
    fx.write("cases/00.sol", "2\n");
    fx.write("cases/01.in", "5\n");
    fx.write("cases/01.sol", "10\n");
    fx.write("cases/02.in", "7\n");
    let (session, capture) = session(41);
    let units = load_source(&fx.path("cases").display().to_string(), &session).unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[1].output, "10\n");
    assert!(capture.contents().contains("02.sol"));
}

#[test]
fn folder_with_inline_pattern() {
    let fx = Fixture::new();
    fx.write("cases/in.a", "1\n");
    fx.write("cases/out.a", "1\n");
    let (session, _) = session(41);
    let target = format!("{} in.@ out.@", fx.path("cases").display());
    let units = load_source(&target, &session).unwrap();
    assert_eq!(units.len(), 1);
}

#[test]
fn missing_source_is_not_found() {
    let (session, _) = session(41);
    let err = load_source("/no/such/file.tio", &session).unwrap_err();
    assert!(matches!(err, TkError::NotFound { .. }));
}

#[test]
fn invalid_pattern_is_rejected() {
    let fx = Fixture::new();
    fx.write("cases/00.in", "1\n");
    let (session, _) = Session::capture(HarnessConfig {
        pattern: "@.in@ @.out".into(),
        ..Default::default()
    });
    let err = load_source(&fx.path("cases").display().to_string(), &session).unwrap_err();
    assert!(matches!(err, TkError::Pattern { .. }));
}

#[test]
fn duplicates_across_sources_are_marked() {
    let fx = Fixture::new();
    let a = fx.write("a.tio", ">>>>>>>>\n1\n========\n1\n<<<<<<<<\n");
    let b = fx.write("b.tio", ">>>>>>>>\n1\n========\n1\n<<<<<<<<\n>>>>>>>>\n2\n========\n2\n<<<<<<<<\n");
    let (session, _) = session(41);
    let sets = resolve_working_sets(&[a, b], &[], None, &session);
    assert_eq!(sets.len(), 1);
    let units = &sets[0].units;
    assert_eq!(units.len(), 3);
    assert_eq!(units[1].duplicated_of, Some(0));
    assert_eq!(units[1].grade_reduction, 0);
    assert_eq!(units[0].grade_reduction, 50);
    assert_eq!(sets[0].unique_count(), 2);
}

#[test]
fn one_missing_source_is_tolerated() {
    let fx = Fixture::new();
    let good = fx.write("a.tio", SUM_TIO);
    let (session, capture) = session(41);
    let sets = resolve_working_sets(&[good, fx.path("gone.tio").display().to_string()], &[], None, &session);
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].units.len(), 3);
    assert!(capture.contents().contains("warning: unable to find:"));
}

#[test]
fn all_missing_sources_skip_the_set() {
    let fx = Fixture::new();
    let (session, capture) = session(41);
    let sets = resolve_working_sets(&[fx.path("gone.tio").display().to_string()], &[], None, &session);
    assert!(sets.is_empty());
    assert!(capture.contents().contains("failure: none source found"));
}

#[test]
fn folder_working_set_finds_sources_and_solvers() {
    let fx = Fixture::new();
    fx.write("p1/t.tio", SUM_TIO);
    fx.write("p1/.hidden.tio", SUM_TIO);
    fx.write("p1/solver.sh", common::SUM_SOLVER);
    fx.write("p1/Solver_alt.sh", common::SUM_SOLVER);
    fx.write("p1/notes.txt", "");
    let (session, _) = session(41);
    let sets = resolve_working_sets(&[], &[fx.path("p1").display().to_string()], Some(1), &session);
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].sources.len(), 1);
    let names: Vec<_> = sets[0].solvers.iter().map(|s| s.filename.as_str()).collect();
    assert_eq!(names, vec!["Solver_alt.sh", "solver.sh"]);
    assert_eq!(sets[0].units.len(), 1);
    assert_eq!(sets[0].units[0].input, "5\n5\n");
}

#[test]
fn folder_falls_back_to_readme() {
    let fx = Fixture::new();
    fx.write("p2/Readme.md", "text\n>>>>>>>>\n1\n========\n1\n<<<<<<<<\n");
    let (session, _) = session(41);
    let sets = resolve_working_sets(&[], &[fx.path("p2").display().to_string()], None, &session);
    assert_eq!(sets[0].units.len(), 1);
    assert!(sets[0].sources[0].ends_with("Readme.md"));
}

#[test]
fn index_out_of_bounds_is_reported() {
    let fx = Fixture::new();
    let path = fx.write("t.tio", SUM_TIO);
    let (session, capture) = session(41);
    let sets = resolve_working_sets(&[path], &[], Some(9), &session);
    assert!(sets.is_empty());
    assert!(capture.contents().contains("Index Number out of bounds: 9"));
}

#[test]
fn crlf_tio_loads_like_lf() {
    let fx = Fixture::new();
    let path = fx.write("t.tio", ">>>>>>>> a\r\n1\r\n2\r\n========\r\n3\r\n<<<<<<<<\r\n");
    let (session, _) = session(41);
    let units = load_source(&path, &session).unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].case, "a");
    assert_eq!(units[0].input, "1\n2\n");
    assert_eq!(units[0].output, "3\n");
}

#[test]
fn crlf_vpl_loads_like_lf() {
    let fx = Fixture::new();
    let text = "case=soma\r\ninput=1 2\r\noutput=\"3\"\r\ngrade reduction=40%\r\n\r\ncase=dobro\r\ninput=4\r\noutput=\"8\"\r\n";
    let path = fx.write("t.vpl", text);
    let (session, _) = session(41);
    let units = load_source(&path, &session).unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].case, "soma");
    assert_eq!(units[0].grade, Some(40));
    assert_eq!(units[1].input, "4\n");
    assert_eq!(units[1].output, "8\n");
}

#[test]
fn crlf_markdown_loads_like_lf() {
    let fx = Fixture::new();
    let text = "# Problem\r\n\r\n```\r\n>>>>>>>>\r\n1\r\n========\r\n1\r\n<<<<<<<<\r\n```\r\n\r\n#__case talk\r\n$hi\r\nhello\r\n$end\r\n";
    let path = fx.write("Readme.md", text);
    let (session, _) = session(41);
    let units = load_source(&path, &session).unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].input, "1\n");
    assert_eq!(units[0].output, "1\n");
    assert_eq!(units[1].case, "talk");
    assert_eq!(units[1].input, "hi\nend\n");
    assert_eq!(units[1].output, "$hi\nhello\n$end\n");
}
