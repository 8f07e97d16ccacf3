use clap::{Parser as ClapParser, error::ErrorKind};
use lrep::cli::{self, CliError, FilterOptions};
use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
    process,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Wrong number of arguments, or any other usage error
const EXIT_USAGE: i32 = -1;
/// The query does not parse
const EXIT_INVALID_QUERY: i32 = -2;
/// Records could not be read, or matches written
const EXIT_IO: i32 = 1;

#[derive(ClapParser)]
#[command(name = "lrep")]
#[command(about = "lrep - print the logfmt records of stdin that match a query")]
#[command(version)]
#[command(after_help = cli::QUERY_HELP)]
struct Cli {
    /// The query records must match, e.g. '.user ~ /john.*/ and .age < 40'
    query: String,

    /// Print diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Read records from FILE instead of stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Write matching records as JSON objects
    #[arg(long)]
    json: bool,

    /// Only parse the query and print its canonical form
    #[arg(long)]
    check: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("lrep=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprint!("{}", e.render());
            process::exit(EXIT_USAGE);
        }
    };

    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        if e.is_broken_pipe() {
            return;
        }
        eprintln!("{}", e);
        let code = match e {
            CliError::Parse { .. } => EXIT_INVALID_QUERY,
            CliError::Io(_) | CliError::Json(_) => EXIT_IO,
        };
        process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let query = cli::check_query(&cli.query)?;
    debug!(query = %query, "parsed query");

    let stdout = io::stdout();
    let mut output = stdout.lock();

    if cli.check {
        return cli::write_query(&query, &mut output);
    }

    let options = FilterOptions { json: cli.json };

    let stats = match &cli.input {
        Some(path) => {
            let file = File::open(path)?;
            cli::run_filter(&query, BufReader::new(file), &mut output, &options)?
        }
        None => cli::run_filter(&query, io::stdin().lock(), &mut output, &options)?,
    };
    debug!(matched = stats.matched, "done");
    Ok(())
}
