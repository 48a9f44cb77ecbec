//! ANN Benchmark: synthetic uniform vectors, squared euclidean
//! Measures build rate, Recall@10 and QPS against brute-force ground truth.
//!
//! Usage: cargo bench --bench ann_synthetic

use annbench_core::ground_truth::{brute_force_knn, recall_at_k};
use annbench_core::{DistanceMetric, HnswConfig, HnswIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

const NUM_VECTORS: usize = 50_000;
const NUM_QUERIES: usize = 500;
const DIM: usize = 32;
const K: usize = 10;

fn random_flat(n: usize, dim: usize, seed: u64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n * dim).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn main() {
    println!("=== ANN Benchmark: synthetic {DIM}d, squared euclidean ===");
    println!();

    let train = random_flat(NUM_VECTORS, DIM, 42);
    let queries = random_flat(NUM_QUERIES, DIM, 43);

    print!("Computing ground truth...");
    let t0 = Instant::now();
    let ground_truth: Vec<Vec<u32>> = queries
        .chunks_exact(DIM)
        .map(|q| {
            brute_force_knn(&train, DIM, q, K, DistanceMetric::Euclidean)
                .iter()
                .map(|h| h.id)
                .collect()
        })
        .collect();
    println!(" {:.2}s", t0.elapsed().as_secs_f64());

    let configs = [
        (
            "M=16, ef_c=200",
            HnswConfig {
                m: 16,
                ef_construction: 200,
                seed: Some(42),
                ..HnswConfig::default()
            },
        ),
        (
            "M=8, ef_c=100",
            HnswConfig {
                m: 8,
                ef_construction: 100,
                seed: Some(42),
                ..HnswConfig::default()
            },
        ),
    ];

    for (label, config) in configs {
        println!();
        println!("Config: {label}");

        let mut index = HnswIndex::new(DIM, config).expect("valid config");
        let t0 = Instant::now();
        for (i, v) in train.chunks_exact(DIM).enumerate() {
            index.insert(v).expect("insert");
            if (i + 1) % 10_000 == 0 {
                let rate = (i + 1) as f64 / t0.elapsed().as_secs_f64();
                println!("  inserted {}/{NUM_VECTORS} ({rate:.0} vec/s)", i + 1);
            }
        }
        let build_time = t0.elapsed();
        println!(
            "  Build time: {:.2}s ({:.0} inserts/s), max layer {}",
            build_time.as_secs_f64(),
            NUM_VECTORS as f64 / build_time.as_secs_f64(),
            index.max_layer()
        );

        println!();
        println!("  ef_search | Recall@10 |    QPS    | Avg latency");
        println!("  ----------+-----------+-----------+------------");

        for ef in [10, 20, 40, 80, 120, 200, 400] {
            // Warm up
            for q in queries.chunks_exact(DIM).take(10) {
                let _ = index.search_with_ef(q, K, ef);
            }

            let t0 = Instant::now();
            let mut total_recall = 0.0f64;
            for (qi, q) in queries.chunks_exact(DIM).enumerate() {
                let predicted: Vec<u32> = index
                    .search_with_ef(q, K, ef)
                    .expect("search")
                    .iter()
                    .map(|h| h.id)
                    .collect();
                total_recall += recall_at_k(&predicted, &ground_truth[qi], K);
            }
            let elapsed = t0.elapsed();

            println!(
                "  {:>9} | {:.4}    | {:>9.1} | {:.0} us",
                ef,
                total_recall / NUM_QUERIES as f64,
                NUM_QUERIES as f64 / elapsed.as_secs_f64(),
                elapsed.as_micros() as f64 / NUM_QUERIES as f64
            );
        }
    }

    println!();
    println!("=== Benchmark complete ===");
}
