use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("tercet")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("tercet")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress spinners and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Log debug output to stderr (overridden by RUST_LOG)").required(false))
        .arg(
            arg!(--"db" <PATH>)
                .required(false)
                .global(true)
                .help("Location of the catalog database")
                .default_value(tercet::handlers::DEFAULT_DB_PATH),
        )
        .subcommand_required(true)
        .subcommand(
            command!("init")
                .about("Creates the catalog database, optionally seeding it")
                .arg(
                    arg!(-s --"seed-file" <PATH>)
                        .required(false)
                        .help("Newline-delimited list of reference ids to seed the catalog with")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Deletes any existing catalog at the location first")
                        .required(false),
                ),
        )
        .subcommand(
            command!("add")
                .about("Adds references to the catalog")
                .arg(
                    arg!([ID] ...)
                        .required(false)
                        .help("Reference ids to add")
                        .conflicts_with("file"),
                )
                .arg(
                    arg!(-F --"file" <PATH>)
                        .required(false)
                        .help("Newline-delimited file of reference ids")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("next")
                .about("Fetches and shows the next unvisited reference")
                .arg(
                    arg!(--"base-url" <URL>)
                        .required(false)
                        .help("Base URL the reference id is appended to")
                        .value_parser(clap::value_parser!(Url))
                        .default_value(tercet_fetch::fetcher::DEFAULT_BASE_URL),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Connect and read timeout in seconds")
                        .value_parser(clap::value_parser!(u64).range(1..=3600))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"user-agent" <AGENT>)
                        .required(false)
                        .help("User-Agent header sent with the request"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(command!("list").about("Lists catalog references and their visited flags"))
        .subcommand(command!("reset").about("Clears every visited flag"))
        .subcommand(
            command!("example")
                .about("Shows the built-in example record")
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
}
