use crate::CLAP_STYLING;
use clap::{arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("altscan")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("altscan")
        .about("Crawl a website and report images with missing alt text")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Log crawl progress (overridden by RUST_LOG)")
                .required(false)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(report_args(
            command!("crawl")
                .about(
                    "Crawl a site breadth-first from a starting page, following links and \
                auditing every image found.",
                )
                .arg(
                    arg!(<URL>)
                        .required(true)
                        .help("The page to start from (http:// is assumed when no scheme is given)"),
                )
                .arg(
                    arg!(-d --"max-depth" <DEPTH>)
                        .required(false)
                        .help("Maximum link depth from the starting page")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("3"),
                )
                .arg(
                    arg!(--"allow-offsite")
                        .required(false)
                        .help("Follow links to other hosts (default: stay on the starting host)")
                        .action(clap::ArgAction::SetTrue),
                ),
        ))
        .subcommand(report_args(
            command!("sitemap")
                .about(
                    "Audit every page listed in a sitemap or sitemap index. Links on those pages \
                are not followed.",
                )
                .arg(
                    arg!(<URL>)
                        .required(true)
                        .help("The sitemap.xml (or sitemap index) to read"),
                ),
        ))
}

/// Options shared by every subcommand that produces a report.
fn report_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-m --"max-pages" <NUM_PAGES>)
            .required(false)
            .help("Maximum number of pages to analyze")
            .value_parser(clap::value_parser!(usize))
            .default_value("50"),
    )
    .arg(
        arg!(-b --"batch-size" <NUM_PAGES>)
            .required(false)
            .help("Pages fetched concurrently per batch")
            .value_parser(clap::value_parser!(usize))
            .default_value("5"),
    )
    .arg(
        arg!(--"include-external-images")
            .required(false)
            .help("Also audit images served from other hosts")
            .action(clap::ArgAction::SetTrue),
    )
    .arg(
        arg!(--"domain" <HOST>)
            .required(false)
            .help("Host treated as on-site (default: host of the given URL)"),
    )
    .arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("30"),
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
            .help("Report format: text, json, csv")
            .value_parser(["text", "json", "csv"])
            .default_value("text"),
    )
    .arg(
        arg!(--"missing-only")
            .required(false)
            .help("Only list images that are missing alt text")
            .action(clap::ArgAction::SetTrue),
    )
}
