use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use arbor_io::{FeatureReader, Prediction, ResultWriter, RunName, TreeReader};
use arbor_tree::{
    DEFAULT_MAX_DEPTH, DecisionTree, ExecutionMode, FeatureVector, Forest, Node, ParserConfig,
    VoteTally,
};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Classify feature vectors with indented decision-tree dumps")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Classify every row of a feature CSV with one tree or a majority-vote ensemble
    Classify {
        /// Tree dump files; more than one forms an ensemble
        #[arg(long = "tree", required = true, num_args = 1..)]
        trees: Vec<PathBuf>,

        /// Feature CSV: sample_id,<feature>,... (empty or `?` = missing)
        #[arg(long)]
        features: PathBuf,

        /// Columns to read as category labels even when numeric
        #[arg(long, value_delimiter = ',')]
        categorical: Vec<String>,

        /// Evaluate ensemble members concurrently
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Deepest indentation level accepted in a dump
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Run name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long, default_value = "arbor")]
        run: RunName,

        /// Directory for `{run}_predictions.json`; nothing is written without it
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Print structural statistics of a tree dump
    Inspect {
        /// Tree dump file
        #[arg(long)]
        tree: PathBuf,

        /// Deepest indentation level accepted in the dump
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
}

// --- stdout summaries ---

#[derive(Serialize)]
struct ClassifyOutput {
    run: String,
    n_trees: usize,
    n_samples: usize,
    label_counts: BTreeMap<String, usize>,
    predictions_path: Option<PathBuf>,
}

#[derive(Serialize)]
struct InspectOutput {
    path: PathBuf,
    root: &'static str,
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
    attributes: Vec<String>,
}

/// One tree classifies by leaf weight; several vote by majority.
enum Model {
    Single(DecisionTree),
    Ensemble(Forest),
}

impl Model {
    fn new(mut trees: Vec<DecisionTree>, execution: ExecutionMode) -> Result<Self> {
        if trees.len() == 1
            && let Some(tree) = trees.pop()
        {
            return Ok(Model::Single(tree));
        }
        let forest = Forest::new(trees).context("no trees to classify with")?;
        Ok(Model::Ensemble(forest.with_execution(execution)))
    }

    fn n_trees(&self) -> usize {
        match self {
            Model::Single(_) => 1,
            Model::Ensemble(forest) => forest.n_trees(),
        }
    }

    /// Tally the votes for one sample and read the label off the tally.
    fn classify(&self, features: &FeatureVector) -> Result<(String, VoteTally)> {
        let votes = match self {
            Model::Single(tree) => tree.votes(features)?,
            Model::Ensemble(forest) => forest.votes(features)?,
        };
        let label = votes.winner().map(str::to_string).context("no votes cast")?;
        Ok((label, votes))
    }
}

fn parser_config(max_depth: usize) -> ParserConfig {
    ParserConfig::new().with_max_depth(max_depth)
}

fn load_tree(path: &Path, config: &ParserConfig) -> Result<DecisionTree> {
    TreeReader::new(path)
        .with_config(config.clone())
        .read()
        .with_context(|| format!("failed to load tree {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Classify {
            trees,
            features,
            categorical,
            parallel,
            max_depth,
            run,
            output_dir,
        } => {
            let config = parser_config(max_depth);

            // 1. Load trees in command-line order
            let loaded = trees
                .iter()
                .map(|path| load_tree(path, &config))
                .collect::<Result<Vec<_>>>()?;
            let execution = if parallel {
                ExecutionMode::Parallel
            } else {
                ExecutionMode::Sequential
            };
            let model = Model::new(loaded, execution)?;
            info!(n_trees = model.n_trees(), ?execution, "model ready");

            // 2. Read features
            let dataset = FeatureReader::new(&features)
                .with_categorical_columns(categorical)
                .read()
                .context("failed to read features CSV")?;

            // 3. Classify
            let predictions = dataset
                .sample_ids()
                .par_iter()
                .zip(dataset.samples())
                .map(|(id, sample)| {
                    let (label, votes) = model
                        .classify(sample)
                        .with_context(|| format!("failed to classify sample {id}"))?;
                    Ok(Prediction {
                        sample_id: id.clone(),
                        label,
                        votes: votes
                            .iter()
                            .map(|(class, weight)| (class.to_string(), weight))
                            .collect(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let mut label_counts = BTreeMap::new();
            for p in &predictions {
                *label_counts.entry(p.label.clone()).or_insert(0) += 1;
            }
            info!(n_samples = predictions.len(), n_labels = label_counts.len(), "classified");

            // 4. Write predictions JSON
            let predictions_path = match output_dir {
                Some(dir) => {
                    let writer = ResultWriter::new(&dir, run.clone())?;
                    Some(writer.write_predictions(model.n_trees(), &predictions)?)
                }
                None => None,
            };

            // 5. Print summary
            let output = ClassifyOutput {
                run: run.to_string(),
                n_trees: model.n_trees(),
                n_samples: predictions.len(),
                label_counts,
                predictions_path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Inspect { tree, max_depth } => {
            let parsed = load_tree(&tree, &parser_config(max_depth))?;
            let root = match parsed.root() {
                Node::Leaf(_) => "leaf",
                Node::Split(split) => split.kind().value_kind(),
            };
            let output = InspectOutput {
                root,
                n_nodes: parsed.n_nodes(),
                n_leaves: parsed.n_leaves(),
                depth: parsed.depth(),
                attributes: parsed.attributes().into_iter().map(str::to_string).collect(),
                path: tree,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
