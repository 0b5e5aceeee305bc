use clap::{ArgAction, arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("backscout")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("backscout")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner, spinner and non-essential output")
                .required(false)
                .conflicts_with("verbose"),
        )
        .arg(arg!(-v --"verbose" "Enable debug logging").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl outward from a set of seed sites and report every page that links to \
                the target domain.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("A seed URL to start from (repeatable; bare hostnames get https://)")
                        .action(ArgAction::Append)
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of seed URLs")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-T --"target" <DOMAIN>)
                        .required(false)
                        .help("Domain whose backlinks are collected"),
                )
                .arg(
                    arg!(-d --"max-depth" <N>)
                        .required(false)
                        .help("Pages at this many hops from a seed are not fetched")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("Maximum number of pages fetched and analyzed at once")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-k --"keyword" <WORD>)
                        .required(false)
                        .help("Relevance keyword (repeatable; replaces the default list)")
                        .action(ArgAction::Append),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("JSON config file; flags override its values")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv, markdown")
                        .value_parser(["text", "json", "csv", "markdown", "md"])
                        .default_value("text"),
                ),
        )
}
