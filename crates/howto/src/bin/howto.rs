#![allow(missing_docs)]

//! howto - binary entry point.
//!
//! The thin shell around the library: argument parsing, logging setup,
//! pager invocation, and the error-kind to exit-code mapping.

use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::{Command as Pager, Stdio};

use clap::{Parser, Subcommand};
use log::{debug, error, info, warn};

use howto::{Config, Corpus, Guide, HowtoError, Outcome, lister, matcher};

#[derive(Parser, Debug)]
#[command(
    name = "howto",
    version,
    about = "View user guides for your environment",
    arg_required_else_help = true
)]
struct Cli {
    /// Guides directory (overrides HOWTO_DIR).
    #[arg(long, value_name = "DIR", global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available user guides.
    #[command(alias = "ls")]
    List {
        /// Display additional information.
        #[arg(long)]
        verbose: bool,
    },

    /// Search and display a user guide.
    Show {
        /// Guide name words, or a single numeric index.
        #[arg(value_name = "NAME", required = true)]
        name: Vec<String>,

        /// Require the full name to match instead of searching.
        #[arg(long)]
        exact: bool,

        /// Do not open in a pager.
        #[arg(long)]
        no_pager: bool,

        /// Display as raw markdown.
        #[arg(long)]
        no_pretty: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.dir {
        config.howto_dir = dir;
    }

    info!("running: {:?}", cli.command);
    if let Err(err) = run(cli.command, &config) {
        let code = err.exit_code();
        error!("({err}) exited: {code}");
        eprintln!("howto: {err}");
        std::process::exit(code);
    }
    debug!("exited: 0");
}

fn run(command: Command, config: &Config) -> Result<(), HowtoError> {
    match command {
        Command::List { verbose } => cmd_list(config, verbose),
        Command::Show {
            name,
            exact,
            no_pager,
            no_pretty,
        } => cmd_show(config, &name, exact, no_pager, no_pretty),
    }
}

fn cmd_list(config: &Config, verbose: bool) -> Result<(), HowtoError> {
    let corpus = Corpus::load(config)?;
    if corpus.is_empty() {
        eprintln!("No guides found!");
        return Ok(());
    }
    let guides: Vec<&Guide> = corpus.iter().collect();
    let color = io::stdout().is_terminal() && term_supports_color();
    println!(
        "{}",
        lister::table(&guides, verbose, color, &config.howto_dir)?
    );
    Ok(())
}

fn cmd_show(
    config: &Config,
    args: &[String],
    exact: bool,
    no_pager: bool,
    no_pretty: bool,
) -> Result<(), HowtoError> {
    let corpus = Corpus::load(config)?;
    let guide = resolve_guide(&corpus, args, exact, &config.howto_dir)?;
    debug!("resolved guide: {}", guide.path().display());

    let text = if no_pretty {
        guide.body()?.to_owned()
    } else {
        guide.render(config.width)?
    };

    if no_pager || !io::stdout().is_terminal() {
        emit(&text);
    } else if let Err(err) = page(&text) {
        warn!("pager failed ({err}), printing directly");
        emit(&text);
    }
    Ok(())
}

fn resolve_guide<'a>(
    corpus: &'a Corpus,
    args: &[String],
    exact: bool,
    dir: &Path,
) -> Result<&'a Guide, HowtoError> {
    if args.iter().all(|arg| arg.trim().is_empty()) {
        return Err(HowtoError::Input("a guide name or index is required".into()));
    }

    // A lone numeric argument is an index lookup first.
    if let [only] = args {
        if !only.is_empty() && only.bytes().all(|b| b.is_ascii_digit()) {
            if let Some(guide) = corpus.find_by_index(only) {
                return Ok(guide);
            }
        }
    }

    let query = args.join(" ");
    let outcome = if exact {
        matcher::resolve_exact(corpus, &query)
    } else {
        matcher::resolve(corpus, &query)
    };
    match outcome {
        Outcome::Unique(guide) => Ok(guide),
        Outcome::Ambiguous(candidates) => {
            let table = lister::table(&candidates, false, false, dir)?;
            Err(HowtoError::Missing(format!(
                "Could not uniquely identify a guide. Did you mean one of the following?\n{table}"
            )))
        }
        Outcome::NotFound => Err(HowtoError::Missing(format!(
            "Could not locate: {}",
            args.join(" ")
        ))),
    }
}

fn emit(text: &str) {
    print!("{text}");
    if !text.ends_with('\n') {
        println!();
    }
}

/// Pipe rendered text through `$PAGER` (default `less`), requesting raw
/// ANSI passthrough.
fn page(text: &str) -> io::Result<()> {
    let pager = env::var("PAGER").unwrap_or_else(|_| String::from("less"));
    let mut words = pager.split_whitespace();
    let Some(program) = words.next() else {
        return Err(io::Error::other("empty PAGER"));
    };

    let mut command = Pager::new(program);
    command.args(words).env("LESS", "-R").stdin(Stdio::piped());
    let mut child = command.spawn()?;
    if let Some(stdin) = child.stdin.as_mut() {
        stdin.write_all(text.as_bytes())?;
    }
    child.wait()?;
    Ok(())
}

/// Colors are used only when TERM names a terminal known to handle them.
fn term_supports_color() -> bool {
    env::var("TERM").is_ok_and(|term| {
        term.starts_with("xterm") || term.contains("rxvt") || term.contains("256color")
    })
}
