use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use netblock::{table::AllocationTable, Prefix, PrefixTrie};

#[derive(Parser)]
#[command(name = "nb")]
#[command(about = "Aggregate and search IPv4 allocation tables.", version)]
struct CommandLine {
    /// Log what the tool is doing (repeat for more detail). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read an allocation table and summarize its aggregates and holes
    #[command(alias = "s")]
    Summarize { table: PathBuf },
    /// Aggregate an allocation table into the largest possible network blocks
    #[command(alias = "a")]
    Aggregate { table: PathBuf },
    /// List the unallocated blocks of an allocation table
    #[command(alias = "h")]
    Holes { table: PathBuf },
    /// Find the next available prefixes of the given mask length
    #[command(alias = "n")]
    Next {
        table: PathBuf,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=32))]
        length: u8,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_trie(path: &Path) -> anyhow::Result<PrefixTrie> {
    let table = AllocationTable::from_path(path)?;
    info!(root = %table.root, subnets = table.subnets.len(), "loaded allocation table");
    table
        .into_trie()
        .with_context(|| format!("cannot build the trie of {}", path.display()))
}

fn print_blocks(blocks: &[Prefix]) {
    for block in blocks {
        println!(" - {block}");
    }
}

fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse();
    init_logging(commands.verbose);

    match commands.command {
        Commands::Summarize { table } => {
            let trie = load_trie(&table)?;
            let aggregates = trie.aggregate();
            let mut holes = trie.holes();
            holes.sort_by_key(Prefix::prefix_len);

            println!("Found {} continuous netblocks:", aggregates.len());
            print_blocks(&aggregates);
            println!("---\n");
            println!("Found {} unallocated netblocks:", holes.len());
            print_blocks(&holes);
        }
        Commands::Aggregate { table } => {
            let aggregates = load_trie(&table)?.aggregate();
            println!("Found {} continuous netblocks:", aggregates.len());
            for block in aggregates {
                println!("---\n{block}");
            }
        }
        Commands::Holes { table } => {
            let mut holes = load_trie(&table)?.holes();
            holes.sort();
            println!("Found {} unallocated netblocks:", holes.len());
            print_blocks(&holes);
        }
        Commands::Next { table, length } => {
            let suitable = load_trie(&table)?.next(length)?;
            println!("Found {} possible addresses:", suitable.len());
            print_blocks(&suitable);
        }
    }
    Ok(())
}
