//! Tests for CLI argument parsing and error exit codes

use std::io;
use std::path::PathBuf;

use clap::Parser;
use rstest::rstest;

use dynsky::application::ApplicationError;
use dynsky::cli::{Cli, CliError, Commands};
use dynsky::exitcode;
use dynsky::infrastructure::InfraError;

// ============================================================
// Argument parsing
// ============================================================

#[test]
fn given_run_with_overrides_when_parsing_then_fields_are_set() {
    let cli = Cli::try_parse_from([
        "dynsky",
        "-dd",
        "run",
        "c.txt",
        "t.txt",
        "--dimension",
        "3",
        "--lenient",
        "-o",
        "out.txt",
    ])
    .unwrap();

    assert_eq!(cli.debug, 2);
    match cli.command {
        Some(Commands::Run {
            input,
            output,
            stdout,
        }) => {
            assert_eq!(input.coords, PathBuf::from("c.txt"));
            assert_eq!(input.times, PathBuf::from("t.txt"));
            assert_eq!(input.records.dimension, Some(3));
            assert!(input.records.lenient);
            assert_eq!(output, Some(PathBuf::from("out.txt")));
            assert!(!stdout);
        }
        other => panic!("expected Run, got {:?}", other),
    }
}

#[test]
fn given_output_and_stdout_when_parsing_then_conflict_is_rejected() {
    let result = Cli::try_parse_from(["dynsky", "run", "c", "t", "-o", "x", "--stdout"]);

    assert!(result.is_err());
}

#[test]
fn given_negative_tick_when_parsing_tree_then_accepted() {
    let cli = Cli::try_parse_from(["dynsky", "tree", "c", "t", "--at", "-3"]).unwrap();

    assert!(matches!(cli.command, Some(Commands::Tree { at: Some(-3), .. })));
}

// ============================================================
// Exit codes
// ============================================================

fn app(e: ApplicationError) -> CliError {
    CliError::from(e)
}

#[rstest]
#[case(CliError::InvalidArgs("x".into()), exitcode::USAGE)]
#[case(
    CliError::Infra(InfraError::io("write", io::Error::other("boom"))),
    exitcode::IOERR
)]
#[case(
    app(ApplicationError::MissingResource {
        path: PathBuf::from("c.txt"),
        source: io::Error::from(io::ErrorKind::NotFound),
    }),
    exitcode::NOINPUT
)]
#[case(app(ApplicationError::Config { message: "bad".into() }), exitcode::CONFIG)]
#[case(
    app(ApplicationError::MalformedRecord {
        path: PathBuf::from("c.txt"),
        line: 2,
        reason: "bad".into(),
    }),
    exitcode::DATAERR
)]
#[case(
    app(ApplicationError::OperationFailed {
        context: "create output".into(),
        source: Box::new(io::Error::other("denied")),
    }),
    exitcode::CANTCREAT
)]
#[case(
    app(ApplicationError::WriteFailed {
        context: "write snapshots".into(),
        source: io::Error::from(io::ErrorKind::BrokenPipe),
    }),
    exitcode::IOERR
)]
fn given_error_then_maps_to_exit_code(#[case] err: CliError, #[case] code: i32) {
    assert_eq!(err.exit_code(), code);
}
