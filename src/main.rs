//! Phyloread CLI: reads a tree file and summarizes or converts it.
//!
//! Usage:
//!   phyloread <FILE> --schema nexus [--collection-offset N] [--tree-offset N]
//!             [--set key=value]... [--output summary|newick|nexus|json] [-v]

use clap::{Parser, ValueEnum};
use phyloread::json::write_json;
use phyloread::newick::{NewickStyle, write_newick};
use phyloread::nexus::NexusWriter;
use phyloread::read::Schema;
use phyloread::{ReadError, ReadOptions, TreeList};
use std::io;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "phyloread",
    version,
    about = "Read Newick, Nexus and JSON phylogenetic trees"
)]
struct Cli {
    /// Tree file to read
    file: PathBuf,

    /// Schema of the file
    #[arg(long, short)]
    schema: Schema,

    /// Collection (e.g. Nexus TREES block) to read; negative counts from the end
    #[arg(long, allow_hyphen_values = true)]
    collection_offset: Option<isize>,

    /// First tree of the collection to read; negative counts from the end
    #[arg(long, allow_hyphen_values = true)]
    tree_offset: Option<isize>,

    /// Further read options as key=value (e.g. extract_comment_metadata=true)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    options: Vec<(String, String)>,

    /// What to print
    #[arg(long, short, value_enum, default_value_t = Output::Summary)]
    output: Output,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Output {
    Summary,
    Newick,
    Nexus,
    Json,
}

fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, found '{arg}'"))
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let trees = match read(&cli) {
        Ok(trees) => trees,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = print(&trees, cli.output) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn read(cli: &Cli) -> Result<TreeList, ReadError> {
    let mut options = ReadOptions::from_pairs(cli.options.iter().map(|(k, v)| (k, v)))?;
    if cli.collection_offset.is_some() {
        options.collection_offset = cli.collection_offset;
    }
    if cli.tree_offset.is_some() {
        options.tree_offset = cli.tree_offset;
    }
    TreeList::get_from_path(&cli.file, cli.schema.id(), options)
}

fn print(trees: &TreeList, output: Output) -> io::Result<()> {
    match output {
        Output::Summary => {
            let namespace = trees.taxon_namespace().borrow();
            println!("{} trees, {} taxa", trees.len(), namespace.len());
            for (i, tree) in trees.iter().enumerate() {
                let rooting = match tree.is_rooted() {
                    Some(true) => "rooted",
                    Some(false) => "unrooted",
                    None => "rooting unspecified",
                };
                println!(
                    "{:>4}  {}  {} leaves, {} nodes, {}",
                    i,
                    tree.label().unwrap_or("-"),
                    tree.num_leaves(),
                    tree.num_nodes(),
                    rooting
                );
            }
            Ok(())
        }
        Output::Newick => write_newick(io::stdout().lock(), trees.iter(), &NewickStyle::default()),
        Output::Nexus => NexusWriter::new(io::stdout().lock()).write_nexus(trees),
        Output::Json => write_json(io::stdout().lock(), trees).map_err(io::Error::from),
    }
}
