use atelier::cli::{Cli, Commands};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_readiness_flags() {
    let cli = Cli::try_parse_from([
        "atelier",
        "readiness",
        "--fields",
        "6",
        "--components",
        "4",
        "--relationships",
        "--schema",
        "--threshold",
        "60",
    ])
    .unwrap();

    match cli.command {
        Commands::Readiness(args) => {
            assert_eq!(args.state.fields, 6);
            assert_eq!(args.state.components, 4);
            assert_eq!(args.state.workflows, 0);
            assert!(args.state.relationships);
            assert!(args.state.schema);
            assert!(!args.state.layout);
            assert_eq!(args.threshold, Some(60));
        }
        other => panic!("expected readiness, got {other:?}"),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "atelier",
        "plan",
        "add an approval workflow",
        "--schema",
        "--layout",
        "--json",
        "--config",
        "team.yaml",
    ])
    .unwrap();

    assert!(cli.json);
    assert_eq!(cli.config, Some(PathBuf::from("team.yaml")));
    match cli.command {
        Commands::Plan(args) => {
            assert_eq!(args.message, "add an approval workflow");
            assert!(args.state.schema && args.state.layout);
        }
        other => panic!("expected plan, got {other:?}"),
    }
}

#[test]
fn test_classify_message_is_optional() {
    let cli = Cli::try_parse_from(["atelier", "classify"]).unwrap();
    assert!(matches!(cli.command, Commands::Classify(ref args) if args.message.is_none()));
}

#[test]
fn test_design_defaults() {
    let cli = Cli::try_parse_from(["atelier", "design", "a quiz app"]).unwrap();
    match cli.command {
        Commands::Design(args) => {
            assert_eq!(args.request, "a quiz app");
            assert!((args.confidence - 0.75).abs() < f64::EPSILON);
            assert_eq!(args.max_turns, None);
        }
        other => panic!("expected design, got {other:?}"),
    }
}

#[test]
fn test_plan_requires_message() {
    assert!(Cli::try_parse_from(["atelier", "plan"]).is_err());
}
