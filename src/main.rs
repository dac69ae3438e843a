use clap::{App, Arg, ArgMatches};
use microblog::build::{build_site, Cancel};
use microblog::config::{
    Config, DEFAULT_INPUT_DIRECTORY, DEFAULT_OUTPUT_DIRECTORY, DEFAULT_TEMPLATE_DIRECTORY,
};
use std::error::Error;
use std::path::{Path, PathBuf};

const EXIT_FAIL: i32 = 1;

fn main() {
    env_logger::init();

    let matches = App::new("microblog")
        .version(env!("CARGO_PKG_VERSION"))
        .about("micro blogging static generator: renders a tree of markdown files into HTML")
        .arg(
            Arg::with_name("in")
                .short("i")
                .long("in")
                .value_name("DIR")
                .takes_value(true)
                .default_value(DEFAULT_INPUT_DIRECTORY)
                .help("input markdown directory"),
        )
        .arg(
            Arg::with_name("out")
                .short("o")
                .long("out")
                .value_name("DIR")
                .takes_value(true)
                .default_value(DEFAULT_OUTPUT_DIRECTORY)
                .help("output html directory"),
        )
        .arg(
            Arg::with_name("templates")
                .short("t")
                .long("templates")
                .value_name("DIR")
                .takes_value(true)
                .default_value(DEFAULT_TEMPLATE_DIRECTORY)
                .help("directory of index.tmpl, post.tmpl, page.tmpl and custom templates"),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .takes_value(true)
                .help("YAML project file; explicit flags override its values"),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("{}", e);
        std::process::exit(EXIT_FAIL);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let config = config(matches)?;
    build_site(&config, &Cancel::default())?;
    Ok(())
}

/// Builds the [`Config`] from the project file (if any) and the flags. A
/// flag's default only applies when there is no project file.
fn config(matches: &ArgMatches) -> Result<Config, Box<dyn Error>> {
    let mut config = match matches.value_of("config") {
        Some(path) => Config::from_project_file(Path::new(path))?,
        None => Config::default(),
    };

    let flag = |name: &str| -> Option<PathBuf> {
        match matches.occurrences_of(name) {
            0 => None,
            _ => matches.value_of(name).map(PathBuf::from),
        }
    };
    if let Some(dir) = flag("in") {
        config.input_directory = dir;
    }
    if let Some(dir) = flag("out") {
        config.output_directory = dir;
    }
    if let Some(dir) = flag("templates") {
        config.template_directory = dir;
    }
    Ok(config)
}
