//! Homophone CLI binary.

use std::io::{stdin, stdout, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use env_logger::Builder;
use log::LevelFilter;

use homophone_core::{EngineConfig, HomophoneEngine, HomophoneError, Result};

const REPL_VARIANTS: usize = 5;

/// Swap Chinese characters for their homophones
#[derive(Parser, Debug)]
#[command(name = "homophone")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Verbosity level (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,

    /// JSON config file
    #[arg(short, long, env = "HOMOPHONE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Character dictionary (repeatable)
    #[arg(long = "char-dict", value_name = "FILE")]
    char_dicts: Vec<PathBuf>,

    /// Word dictionary (repeatable)
    #[arg(long = "word-dict", value_name = "FILE")]
    word_dicts: Vec<PathBuf>,

    /// Compiled table to load instead of parsing dictionaries
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Only substitute CJK Unified Ideographs
    #[arg(long)]
    han_only: bool,

    /// Refuse enumerations larger than this
    #[arg(long)]
    max_combinations: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one substitution
    Once {
        text: String,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print several distinct substitutions
    Many {
        text: String,
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print every possible substitution
    All {
        text: String,
        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Show table statistics
    Stats,
    /// Build the table and write it as a snapshot
    Compile {
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
    /// Convert lines interactively
    Repl,
}

impl Cli {
    fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n + 1,
            }
        }
    }

    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };
        config.char_dictionaries.extend(self.char_dicts.iter().cloned());
        config.word_dictionaries.extend(self.word_dicts.iter().cloned());
        if self.snapshot.is_some() {
            config.snapshot = self.snapshot.clone();
        }
        if self.han_only {
            config.han_only = true;
        }
        if let Some(limit) = self.max_combinations {
            config.max_combinations = limit;
        }
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbosity() {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.engine_config()?;
    let engine = HomophoneEngine::from_config(config)?;

    match cli.command {
        Command::Once { text, seed } => {
            println!("{}", engine.convert_once(&text, seed.unwrap_or_else(rand::random)));
        }
        Command::Many { text, count, seed } => {
            for variant in engine.convert_many(&text, count, seed.unwrap_or_else(rand::random)) {
                println!("{variant}");
            }
        }
        Command::All { text, json } => {
            let all = engine.enumerate_all(&text)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&all)?);
            } else {
                for variant in all {
                    println!("{variant}");
                }
            }
        }
        Command::Stats => print_stats(&engine),
        Command::Compile { output } => {
            engine.save_snapshot_to(&output)?;
            println!("Wrote {} keys to '{}'", engine.table_size(), output.display());
        }
        Command::Repl => repl(&engine)?,
    }
    Ok(())
}

fn print_stats(engine: &HomophoneEngine) {
    println!("keys: {}", engine.table_size());
    println!("longest alternate list: {}", engine.table().max_alternates());
    for source in engine.sources() {
        println!(
            "  {:?} {}: {} groups, {} skipped of {} lines",
            source.kind, source.name, source.groups, source.skipped, source.lines
        );
    }
}

fn repl(engine: &HomophoneEngine) -> Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    println!("{}", "Homophone converter".bold());
    println!("---------------------------------------------------------------");
    println!("Type a line to convert it. ':all <text>' lists every combination.");
    println!("'exit' quits.\n");

    let mut seed: u64 = rand::random();
    let input = stdin();
    loop {
        print!("{} ", ">".cyan());
        out.flush()?;

        let mut line = String::new();
        if input.lock().read_line(&mut line)? == 0 {
            break;
        }
        let cmd = line.trim_end_matches(&['\r', '\n'][..]);

        match cmd {
            "exit" => break,
            "" => continue,
            s if s.starts_with(":all ") => match engine.enumerate_all(&s[5..]) {
                Ok(all) => {
                    for (i, variant) in all.iter().enumerate() {
                        println!("  {:>4}: {}", i + 1, variant);
                    }
                }
                Err(e @ HomophoneError::TooManyCombinations { .. }) => {
                    println!("{}", e.to_string().yellow());
                }
                Err(e) => return Err(e),
            },
            s => {
                let variants = engine.convert_many(s, REPL_VARIANTS, seed);
                seed = seed.wrapping_add(1);
                if variants.is_empty() {
                    println!("{}", "No homophones found.".dark_grey());
                }
                for (i, variant) in variants.iter().enumerate() {
                    println!("  :{}: {}", i + 1, variant.as_str().green());
                }
            }
        }
    }
    Ok(())
}
