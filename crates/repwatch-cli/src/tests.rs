use super::*;

#[test]
fn parses_db_ping_command() {
    let cli =
        Cli::try_parse_from(["repwatch-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_seed_command() {
    let cli =
        Cli::try_parse_from(["repwatch-cli", "db", "seed"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Seed
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["repwatch-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn analyze_defaults_to_french() {
    let cli = Cli::try_parse_from(["repwatch-cli", "analyze", "batterie nulle"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Analyze { ref text, ref language })
            if text == "batterie nulle" && language == "fr"
    ));
}

#[test]
fn analyze_accepts_language() {
    let cli =
        Cli::try_parse_from(["repwatch-cli", "analyze", "great", "--language", "en"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Analyze { ref language, .. }) if language == "en"
    ));
}

#[test]
fn import_requires_entity() {
    assert!(Cli::try_parse_from(["repwatch-cli", "import", "reviews.jsonl"]).is_err());

    let cli = Cli::try_parse_from([
        "repwatch-cli",
        "import",
        "reviews.jsonl",
        "--entity",
        "Nova X",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Import { ref file, ref entity })
            if file.as_os_str() == "reviews.jsonl" && entity == "Nova X"
    ));
}

#[test]
fn report_entity_is_optional() {
    let cli = Cli::try_parse_from(["repwatch-cli", "report"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Report { entity: None })
    ));
}

#[test]
fn alerts_list_defaults_to_unresolved() {
    let cli = Cli::try_parse_from(["repwatch-cli", "alerts", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Alerts {
            command: AlertCommands::List { all: false }
        })
    ));
}

#[test]
fn alerts_resolve_takes_numeric_id() {
    let cli = Cli::try_parse_from(["repwatch-cli", "alerts", "resolve", "42"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Alerts {
            command: AlertCommands::Resolve { id: 42 }
        })
    ));
    assert!(Cli::try_parse_from(["repwatch-cli", "alerts", "resolve", "abc"]).is_err());
}

#[test]
fn collect_with_entity_and_force() {
    let cli =
        Cli::try_parse_from(["repwatch-cli", "collect", "--entity", "3", "--force"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Collect {
            entity: Some(3),
            force: true
        })
    ));
}
