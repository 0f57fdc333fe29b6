use clap::{App, Arg};
use quire::build::{build_site, Error};
use quire::config::Config;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("QUIRE_LOG", "info"))
        .init();

    let matches = App::new("quire")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders a Markdown blog and refreshes its index pages")
        .arg(
            Arg::with_name("PROJECT_DIR")
                .help("The project directory (defaults to the current directory)")
                .index(1),
        )
        .get_matches();

    let project_directory = Path::new(matches.value_of("PROJECT_DIR").unwrap_or("."));
    if let Err(err) = run(project_directory) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(project_directory: &Path) -> Result<(), Error> {
    let config = Config::from_directory(project_directory)?;
    let report = build_site(&config)?;
    match report.skipped.len() {
        0 => println!("Generated {} posts", report.entries.len()),
        skipped => println!(
            "Generated {} posts ({} files skipped)",
            report.entries.len(),
            skipped
        ),
    }
    Ok(())
}
