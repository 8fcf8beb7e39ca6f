// Line-oriented JSON front end: one request per stdin line, one response per stdout line.
// Logs go to stderr so stdout carries only protocol traffic.
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use env_logger::Env;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use homophone_core::core::types::{ConversionRequest, SourceStats};
use homophone_core::{EngineConfig, HomophoneEngine, HomophoneError};

#[derive(Parser, Debug)]
#[command(name = "homophone-pipe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct PipeArgs {
    #[arg(short, long, env = "HOMOPHONE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long = "char-dict", value_name = "FILE")]
    char_dicts: Vec<PathBuf>,

    #[arg(long = "word-dict", value_name = "FILE")]
    word_dicts: Vec<PathBuf>,

    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum PipeCommand {
    Convert(ConversionRequest),
    Health,
    Exit,
}

#[derive(Debug, Serialize)]
struct Health<'a> {
    status: &'static str,
    keys: usize,
    sources: &'a [SourceStats],
}

#[derive(Debug, Serialize)]
struct ErrorReply {
    error: String,
    kind: &'static str,
}

impl From<&HomophoneError> for ErrorReply {
    fn from(e: &HomophoneError) -> Self {
        Self {
            error: e.to_string(),
            kind: e.kind(),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = PipeArgs::parse();
    let engine = match load_engine(&args) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    info!("pipe ready with {} keys", engine.table_size());

    if let Err(e) = serve(&engine, io::stdin().lock(), io::stdout().lock()) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn load_engine(args: &PipeArgs) -> homophone_core::Result<HomophoneEngine> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    config.char_dictionaries.extend(args.char_dicts.iter().cloned());
    config.word_dictionaries.extend(args.word_dicts.iter().cloned());
    if args.snapshot.is_some() {
        config.snapshot = args.snapshot.clone();
    }
    HomophoneEngine::from_config(config)
}

fn serve<R: BufRead, W: Write>(engine: &HomophoneEngine, input: R, mut output: W) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        debug!("<- {line}");

        let reply = match serde_json::from_str::<PipeCommand>(&line) {
            Ok(PipeCommand::Exit) => break,
            Ok(PipeCommand::Health) => serde_json::to_string(&Health {
                status: "ok",
                keys: engine.table_size(),
                sources: engine.sources(),
            }),
            Ok(PipeCommand::Convert(request)) => match engine.handle(&request, rand::random()) {
                Ok(result) => serde_json::to_string(&result),
                Err(e) => {
                    warn!("request failed: {e}");
                    serde_json::to_string(&ErrorReply::from(&e))
                }
            },
            Err(e) => serde_json::to_string(&ErrorReply::from(&HomophoneError::from(e))),
        }
        .map_err(io::Error::other)?;

        debug!("-> {reply}");
        writeln!(output, "{reply}")?;
        output.flush()?;
    }
    Ok(())
}
