//! merkle-tree - build Merkle tree documents and membership proofs.
//!
//! Usage:
//!   merkle-tree build --records accounts.json --encoding address --out tree.json
//!   merkle-tree prove --tree tree.json --targets accounts.json --out proofs.json
//!   merkle-tree verify --proofs proofs.json --encoding address
//!   merkle-tree render --tree tree.json
//!
//! Records and targets are JSON arrays of tuples, e.g.
//! `[["0x344ef496b004663a04d70B427a78E33cC3E9f619"], ...]`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use standard_merkle_tree::{
    Keccak256Hasher, LeafEncoding, MerkleTreeDocument, ProofBundle, Record, StandardMerkleTree,
    TreeOptions,
};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// merkle-tree - Merkle commitments and membership proofs for record lists
#[derive(Parser, Debug)]
#[command(name = "merkle-tree")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "MERKLE_TREE_LOG", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a tree from a records file and write its document
    Build {
        /// JSON array of records
        #[arg(long)]
        records: PathBuf,

        /// Comma-separated field types, e.g. `address,uint256`
        #[arg(long, value_delimiter = ',', default_value = "address")]
        encoding: Vec<String>,

        /// Where to write the tree document
        #[arg(long, default_value = "tree.json")]
        out: PathBuf,

        /// Keep leaves in input order instead of sorting them by hash
        #[arg(long)]
        unsorted: bool,
    },

    /// Generate proofs for target records from a tree document
    Prove {
        /// Tree document written by `build`
        #[arg(long)]
        tree: PathBuf,

        /// JSON array of records to prove
        #[arg(long)]
        targets: PathBuf,

        /// Where to write the proof bundle
        #[arg(long, default_value = "proofs.json")]
        out: PathBuf,
    },

    /// Check every proof of a bundle against its root
    Verify {
        /// Proof bundle written by `prove`
        #[arg(long)]
        proofs: PathBuf,

        /// Comma-separated field types the tree was built with
        #[arg(long, value_delimiter = ',', default_value = "address")]
        encoding: Vec<String>,
    },

    /// Print a tree document as an ASCII tree
    Render {
        /// Tree document written by `build`
        #[arg(long)]
        tree: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Build {
            records,
            encoding,
            out,
            unsorted,
        } => build(&records, &encoding, &out, unsorted),
        Commands::Prove { tree, targets, out } => prove(&tree, &targets, &out),
        Commands::Verify { proofs, encoding } => verify(&proofs, &encoding),
        Commands::Render { tree } => render(&tree),
    }
}

fn build(records: &Path, encoding: &[String], out: &Path, unsorted: bool) -> Result<()> {
    let encoding = LeafEncoding::parse(encoding).context("invalid --encoding")?;
    let values = read_records(records, &encoding)?;
    info!(records = values.len(), encoding = ?encoding.type_names(), "building tree");

    let options = TreeOptions {
        sort_leaves: !unsorted,
    };
    let tree = StandardMerkleTree::build(Keccak256Hasher, values, encoding, options)
        .context("failed to build tree")?;

    println!("Merkle Root: {}", tree.root());

    let json = tree.dump().to_json_pretty()?;
    fs::write(out, json).with_context(|| format!("failed to write {}", out.display()))?;
    info!(path = %out.display(), "wrote tree document");
    Ok(())
}

fn prove(tree_path: &Path, targets: &Path, out: &Path) -> Result<()> {
    let tree = load_tree(tree_path)?;
    let targets = read_records(targets, tree.leaf_encoding())?;

    let bundle = tree
        .proof_bundle(&targets)
        .context("failed to generate proofs")?;

    println!("Root: {}", bundle.root);

    let json = serde_json::to_string_pretty(&bundle)?;
    fs::write(out, json).with_context(|| format!("failed to write {}", out.display()))?;
    info!(proofs = bundle.proofs.len(), path = %out.display(), "wrote proof bundle");
    Ok(())
}

fn verify(proofs: &Path, encoding: &[String]) -> Result<()> {
    let encoding = LeafEncoding::parse(encoding).context("invalid --encoding")?;
    let raw = fs::read_to_string(proofs)
        .with_context(|| format!("failed to read {}", proofs.display()))?;
    let bundle: ProofBundle = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", proofs.display()))?;

    println!("Root: {}", bundle.root);

    let failures = bundle.failures(&Keccak256Hasher, &encoding);
    if !failures.is_empty() {
        bail!(
            "{} of {} proofs failed (positions {:?})",
            failures.len(),
            bundle.proofs.len(),
            failures
        );
    }
    info!(proofs = bundle.proofs.len(), "all proofs verified");
    Ok(())
}

fn render(tree_path: &Path) -> Result<()> {
    let tree = load_tree(tree_path)?;
    println!("{}", tree.render());
    Ok(())
}

fn load_tree(path: &Path) -> Result<StandardMerkleTree> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document = MerkleTreeDocument::from_json(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    StandardMerkleTree::load(&document).with_context(|| format!("failed to load {}", path.display()))
}

fn read_records(path: &Path, encoding: &LeafEncoding) -> Result<Vec<Record>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let rows: Vec<Vec<JsonValue>> = serde_json::from_str(&raw)
        .with_context(|| format!("{} must be a JSON array of records", path.display()))?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            encoding
                .coerce(row)
                .with_context(|| format!("record {i} in {}", path.display()))
        })
        .collect()
}
