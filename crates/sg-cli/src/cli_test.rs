use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_parse_validate() {
    let cli = Cli::try_parse_from([
        "sg",
        "validate",
        "stg_inspections",
        "--input",
        "out.parquet",
        "--input-rows",
        "100",
        "--raw",
        "a.csv",
        "--raw",
        "b.csv",
        "--publish",
        "-v",
    ])
    .unwrap();

    assert!(cli.global.verbose);
    let Commands::Validate(args) = cli.command else {
        panic!("expected validate");
    };
    assert_eq!(args.stage, "stg_inspections");
    assert_eq!(args.input_rows, Some(100));
    assert_eq!(args.raw_inputs.len(), 2);
    assert!(args.publish);
    assert_eq!(args.output, OutputFormat::Text);
}

#[test]
fn test_input_rows_conflicts_with_input_of() {
    let result = Cli::try_parse_from([
        "sg",
        "validate",
        "stg",
        "--input",
        "out.csv",
        "--input-rows",
        "3",
        "--input-of",
        "in.csv",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_geo_defaults() {
    let cli = Cli::try_parse_from([
        "sg",
        "geo",
        "--subjects",
        "facilities.csv",
        "--references",
        "zips.csv",
    ])
    .unwrap();
    let Commands::Geo(args) = cli.command else {
        panic!("expected geo");
    };
    assert_eq!(args.stage, "geo_near_me");
    assert_eq!(args.lat, "latitude");
    assert!(!args.publish);
}
