use annbench::{resolve_config, run, BenchParams, ConfigOverrides};
use annbench_core::config;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "annbench",
    about = "Build an HNSW index over a dataset and write the top-k neighbor ids of one query"
)]
struct Args {
    /// Base vectors to index (.fvecs or flat .bin)
    #[arg(long)]
    train: PathBuf,

    /// Query vectors (.fvecs or flat .bin)
    #[arg(long)]
    queries: PathBuf,

    /// Row of the query file to search with
    #[arg(long, default_value_t = 0)]
    query_index: usize,

    /// Number of neighbors to return
    #[arg(short, long, default_value_t = config::DEFAULT_K)]
    k: usize,

    /// JSON file with HNSW parameters; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Max neighbors per node per layer (2*M at layer 0) [default: 16]
    #[arg(long)]
    m: Option<usize>,

    /// Beam width while building [default: 200]
    #[arg(long)]
    ef_construction: Option<usize>,

    /// Beam width while searching [default: 200]
    #[arg(long)]
    ef_search: Option<usize>,

    /// Seed for layer assignment (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Ground-truth neighbors (.ivecs or flat .bin) to report recall@k
    #[arg(long)]
    ground_truth: Option<PathBuf>,

    /// Where to write the result ids, one per line
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("annbench=info,annbench_core=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.json);

    let overrides = ConfigOverrides {
        m: args.m,
        ef_construction: args.ef_construction,
        ef_search: args.ef_search,
        seed: args.seed,
    };
    let hnsw = resolve_config(args.config.as_deref(), &overrides)?;

    let params = BenchParams {
        train: args.train,
        queries: args.queries,
        query_index: args.query_index,
        k: args.k,
        config: hnsw,
        ground_truth: args.ground_truth,
        output: args.output,
    };

    let report = run(&params).map_err(|e| {
        tracing::error!("benchmark failed: {}", e);
        e
    })?;
    println!(
        "Wrote top-{} neighbor IDs for query {} to: {}",
        report.hits.len(),
        params.query_index,
        params.output.display()
    );
    if let Some(recall) = report.recall {
        println!("Recall@{}: {recall:.4}", params.k);
    }
    Ok(())
}
