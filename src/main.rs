use clap::{crate_authors, crate_name, crate_version, App, AppSettings};
use simple_logger::init_with_level;

use squirls::cli;

fn main() {
    if let Err(err) = init_with_level(log::Level::Info) {
        eprintln!("Failed to initialize logging: {}", err);
    }

    let matches = App::new(crate_name!())
        .author(crate_authors!("\n"))
        .version(crate_version!())
        .about("Precalculate splicing pathogenicity scores for every synthetic variant in genomic regions")
        .max_term_width(120)
        .setting(AppSettings::DeriveDisplayOrder)
        .args(cli::args::all())
        .get_matches();

    if let Err(err) = cli::run(&matches) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}
