// CLI entry for map_adjacency
use anyhow::{bail, Result};
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use map_adjacency_rust::{default_config, process, process_paths, Config, Params};
use std::io::{self, BufWriter};

#[derive(Parser, Debug)]
#[command(name = "map_adjacency", version, about = "Region adjacency from color-coded map images")]
struct Cli {
    /// Print progress messages
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the list of bordering region pairs
    Edges {
        /// Color table field separator
        #[arg(short = 'd', long = "delimiter", default_value = ",")]
        delimiter: String,
        /// Number of scanning threads
        #[arg(long = "threads")]
        threads: Option<usize>,

        /// Color table (id,red,green,blue,name,flag)
        #[arg(value_hint = ValueHint::FilePath)]
        table: String,
        /// Region map image
        #[arg(value_hint = ValueHint::FilePath)]
        image: String,
        /// Output edge list
        #[arg(value_hint = ValueHint::FilePath)]
        output: String,
    },
    /// Print shortest paths between every pair of regions in an edge list
    Paths {
        #[arg(value_hint = ValueHint::FilePath)]
        edges: String,
    },
}

fn build_config(verbose: bool, delimiter: &str, threads: Option<usize>) -> Result<Config> {
    let mut cfg = default_config();
    let [d] = delimiter.as_bytes() else { bail!("delimiter must be a single byte, got {:?}", delimiter) };
    cfg.delimiter = *d;
    if let Some(v) = threads { cfg.num_threads = v.max(1); }
    cfg.verbose = verbose;
    Ok(cfg)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Command::Edges { delimiter, threads, table, image, output } => {
            let config = build_config(cli.verbose, &delimiter, threads)?;
            let params = Params { table_path: table, image_path: image, output_path: output, config };
            process(params)?;
        }
        Command::Paths { edges } => {
            let stdout = io::stdout();
            process_paths(edges, BufWriter::new(stdout.lock()))?;
        }
    }
    Ok(())
}
