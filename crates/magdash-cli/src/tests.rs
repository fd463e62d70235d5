use super::*;
use magdash_core::TimeRange;

#[test]
fn parses_filters_range_with_default() {
    let cli = Cli::try_parse_from(["magdash", "filters", "range"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Filters {
            command: FilterCommands::Range {
                range: TimeRange::Year
            }
        })
    ));
}

#[test]
fn parses_filters_range_value() {
    let cli =
        Cli::try_parse_from(["magdash", "filters", "range", "7d"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Filters {
            command: FilterCommands::Range {
                range: TimeRange::Week
            }
        })
    ));
}

#[test]
fn rejects_unknown_range() {
    assert!(Cli::try_parse_from(["magdash", "filters", "range", "2w"]).is_err());
}

#[test]
fn parses_filters_month_with_date() {
    let cli = Cli::try_parse_from(["magdash", "filters", "month", "--date", "2024-06-15"])
        .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Filters {
            command: FilterCommands::Month { date, store_ids },
        }) => {
            assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2024, 6, 15));
            assert!(store_ids.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_sync_trigger_changes_only() {
    let cli = Cli::try_parse_from(["magdash", "sync", "trigger", "s1", "--changes-only"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Sync {
            command: SyncCommands::Trigger {
                changes_only: true,
                ..
            }
        })
    ));
}

#[test]
fn parses_sync_watch_interval() {
    let cli = Cli::try_parse_from(["magdash", "sync", "watch", "s1", "--interval", "10"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Sync {
            command: SyncCommands::Watch { interval: 10, .. }
        })
    ));
}

#[test]
fn parses_stores_list() {
    let cli =
        Cli::try_parse_from(["magdash", "stores", "list", "u1"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Stores {
            command: StoreCommands::List { .. }
        })
    ));
}

#[test]
fn parses_sales_defaults() {
    let cli = Cli::try_parse_from(["magdash", "sales"]).expect("expected valid cli args");

    match cli.command {
        Some(Commands::Sales {
            from, to, currency, ..
        }) => {
            assert!(from.is_none() && to.is_none());
            assert_eq!(currency, "DKK");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_diagnose_command() {
    let cli = Cli::try_parse_from(["magdash", "diagnose"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Diagnose)));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["magdash"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}
