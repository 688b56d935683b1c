//! Command-line definition

use clap::{value_parser, Arg, ArgAction, Command};
use harris_graphml::GroupingMode;
use std::path::PathBuf;

fn fixture_arg() -> Arg {
    Arg::new("fixture")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Site fixture (.json, .yaml or .yml)")
}

fn site_arg() -> Arg {
    Arg::new("site")
        .long("site")
        .short('s')
        .required(true)
        .help("Site identifier")
}

fn export_option_args() -> [Arg; 4] {
    [
        Arg::new("extended-labels")
            .long("extended-labels")
            .action(ArgAction::SetTrue)
            .help("Label nodes with kind, number, definition and period"),
        Arg::new("no-periods")
            .long("no-periods")
            .action(ArgAction::SetTrue)
            .help("Do not wrap nodes in a swimlane table"),
        Arg::new("reverse-epochs")
            .long("reverse-epochs")
            .action(ArgAction::SetTrue)
            .help("Latest period row first"),
        Arg::new("grouping")
            .long("grouping")
            .value_parser(value_parser!(GroupingMode))
            .help("Swimlane grouping: period_area, period, area, none"),
    ]
}

/// The `harris` command
pub(crate) fn command() -> Command {
    Command::new("harris")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Harris Matrix builder: stratigraphic validation and yEd GraphML export")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging (RUST_LOG overrides)"),
        )
        .subcommand(
            Command::new("export")
                .about("Export one site as GraphML")
                .arg(fixture_arg())
                .arg(site_arg())
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("GraphML destination (stdout when absent)"),
                )
                .arg(
                    Arg::new("dot")
                        .long("dot")
                        .value_parser(value_parser!(PathBuf))
                        .help("Also write a DOT preview"),
                )
                .args(export_option_args()),
        )
        .subcommand(
            Command::new("export-all")
                .about("Export every site of a fixture, in parallel")
                .arg(fixture_arg())
                .arg(
                    Arg::new("out-dir")
                        .long("out-dir")
                        .short('d')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Destination directory"),
                )
                .args(export_option_args()),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate one site and print its summary")
                .arg(fixture_arg())
                .arg(site_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("legend")
                .about("Write the relation legend as GraphML")
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Destination (stdout when absent)"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Summarise a GraphML file")
                .arg(
                    Arg::new("graphml")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("GraphML file"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}
