pub mod crawl;
pub mod report;

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
    __                __
   / /_  ____ ______/ /__________  ____  __  __/ /_
  / __ \/ __ `/ ___/ //_/ ___/ ___/ __ \/ / / / __/
 / /_/ / /_/ / /__/ ,< (__  ) /__/ /_/ / /_/ / /_
/_.___/\__,_/\___/_/|_/____/\___/\____/\__,_/\__/
"#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "backlink crawler".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
