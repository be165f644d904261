use super::*;

#[test]
fn parses_db_ping_command() {
    let cli =
        Cli::try_parse_from(["gapintel-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["gapintel-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["gapintel-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn report_list_defaults() {
    let cli = Cli::try_parse_from(["gapintel-cli", "report", "list", "--user", "u1"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Report {
            command: ReportCommands::List {
                ref user,
                folder: None,
                limit: 20
            }
        }) if user == "u1"
    ));
}

#[test]
fn report_list_requires_user() {
    assert!(Cli::try_parse_from(["gapintel-cli", "report", "list"]).is_err());
}

#[test]
fn report_status_rejects_malformed_id() {
    let result = Cli::try_parse_from([
        "gapintel-cli",
        "report",
        "status",
        "--user",
        "u1",
        "--id",
        "not-a-uuid",
    ]);
    assert!(result.is_err());
}

#[test]
fn report_watch_takes_interval_override() {
    let id = "6f1c2d1e-0000-4000-8000-000000000001";
    let cli = Cli::try_parse_from([
        "gapintel-cli",
        "report",
        "watch",
        "--user",
        "u1",
        "--id",
        id,
        "--interval-secs",
        "2",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Report {
            command: ReportCommands::Watch {
                interval_secs: Some(2),
                ..
            }
        })
    ));
}

#[test]
fn report_watch_rejects_zero_interval() {
    let result = Cli::try_parse_from([
        "gapintel-cli",
        "report",
        "watch",
        "--user",
        "u1",
        "--id",
        "6f1c2d1e-0000-4000-8000-000000000001",
        "--interval-secs",
        "0",
    ]);
    assert!(result.is_err());
}

#[test]
fn report_metrics_with_premium() {
    let cli = Cli::try_parse_from([
        "gapintel-cli",
        "report",
        "metrics",
        "--file",
        "report.json",
        "--premium",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Report {
            command: ReportCommands::Metrics { premium: true, ref file }
        }) if file.as_os_str() == "report.json"
    ));
}

#[test]
fn channel_lookup_takes_positional_input() {
    let cli = Cli::try_parse_from(["gapintel-cli", "channel", "lookup", "@bakingwithben"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Channel {
            command: ChannelCommands::Lookup { ref input }
        }) if input == "@bakingwithben"
    ));
}

#[test]
fn worker_ping_command() {
    let cli = Cli::try_parse_from(["gapintel-cli", "worker", "ping"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Worker {
            command: WorkerCommands::Ping
        })
    ));
}
