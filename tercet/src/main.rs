use tercet::handlers::{
    handle_add, handle_example, handle_init, handle_list, handle_next, handle_reset,
    init_tracing, resolve_db_path,
};

mod commands;

use commands::command_argument_builder;

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();
    let quiet = matches.get_flag("quiet");
    init_tracing(matches.get_flag("verbose"));

    let db_path = resolve_db_path(
        matches
            .get_one::<String>("db")
            .map(String::as_str)
            .unwrap_or_default(),
    );

    let result = match matches.subcommand() {
        Some(("init", sub_matches)) => handle_init(&db_path, sub_matches),
        Some(("add", sub_matches)) => handle_add(&db_path, sub_matches),
        Some(("next", sub_matches)) => handle_next(&db_path, sub_matches, quiet).await,
        Some(("list", _)) => handle_list(&db_path),
        Some(("reset", _)) => handle_reset(&db_path),
        Some(("example", sub_matches)) => handle_example(sub_matches),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
