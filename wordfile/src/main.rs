mod cli;
mod error;
mod report;
mod session;
mod shell;

use std::io::{self, Write};
use std::path::Path;

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;
use wordfile_format::{AccessMode, TextFileBackend};

use cli::{CliOpts, Commands};
use session::Session;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Opens `path` read-only, runs `f` against it and closes it again, even if
/// `f` failed.
fn one_shot<F>(session: &mut Session<TextFileBackend>, path: &Path, f: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut Session<TextFileBackend>, &mut io::StdoutLock<'_>) -> error::Result<()>,
{
    session.open(path, AccessMode::ReadOnly)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = f(session, &mut out);
    let closed = session.close();

    result?;
    closed?;
    out.flush()?;
    Ok(())
}

fn run(opts: CliOpts) -> anyhow::Result<()> {
    let mut session = Session::new(TextFileBackend, opts.store_options());

    match opts.cmd {
        Commands::Count { path } => one_shot(&mut session, &path, |s, out| s.count(out)),
        Commands::List { path, args } => one_shot(&mut session, &path, |s, out| s.list(&args, out)),
        Commands::Unique { path, args } => {
            one_shot(&mut session, &path, |s, out| s.unique(&args, out))
        }
        Commands::Sort { path, args } => one_shot(&mut session, &path, |s, out| s.sort(&args, out)),
        Commands::Shell => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut out = stdout.lock();
            shell::run(&mut session, stdin.lock(), &mut out)?;
            Ok(())
        }
    }
}

fn main() {
    let opts = CliOpts::from_iter(wild::args_os());
    init_tracing(opts.verbose);

    if let Err(e) = run(opts) {
        tracing::debug!("{:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
