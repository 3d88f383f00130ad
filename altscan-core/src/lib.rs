use colored::Colorize;

pub mod crawl;
pub mod report;

pub fn print_banner() {
    let banner = r#"
        _ _
   __ _| | |_ ___  ___ __ _ _ __
  / _` | | __/ __|/ __/ _` | '_ \
 | (_| | | |_\__ \ (_| (_| | | | |
  \__,_|_|\__|___/\___\__,_|_| |_|
"#;
    eprintln!("{}", banner.bright_cyan().bold());
    eprintln!(
        "  {} {}\n",
        "image alt text auditor".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
