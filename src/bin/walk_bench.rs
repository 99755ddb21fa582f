use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use treeops::{Entry, TreeOps, WalkOptions};

#[derive(Debug)]
struct BenchResult {
    eager: Vec<Duration>,
    lazy: Vec<Duration>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let root = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: cargo run --bin walk_bench -- <root_path> [runs]");
            std::process::exit(2);
        }
    };

    let runs: usize = args.next().and_then(|v| v.parse().ok()).unwrap_or(5);
    let ops = TreeOps::new();
    let options = WalkOptions::new().include_dirs(true);

    println!("Benchmarking walk on {}\nRuns: {}", root.display(), runs);

    // Warm up both paths once to reduce first-run noise.
    let eager = ops.list(&root, &options)?;
    let lazy = ops
        .iterate(&root, &options)
        .iter()
        .collect::<treeops::Result<Vec<_>>>()?;
    assert_parity(&eager, &lazy)?;
    println!("{} entries", eager.len());

    let mut result = BenchResult {
        eager: Vec::with_capacity(runs),
        lazy: Vec::with_capacity(runs),
    };

    for i in 0..runs {
        let eager_start = Instant::now();
        let eager = ops.list(&root, &options)?;
        let eager_elapsed = eager_start.elapsed();

        let lazy_start = Instant::now();
        let lazy = ops
            .iterate(&root, &options)
            .iter()
            .collect::<treeops::Result<Vec<_>>>()?;
        let lazy_elapsed = lazy_start.elapsed();

        assert_parity(&eager, &lazy)?;

        result.eager.push(eager_elapsed);
        result.lazy.push(lazy_elapsed);

        println!(
            "run {:>2}: eager={:>8.3} ms  lazy={:>8.3} ms",
            i + 1,
            eager_elapsed.as_secs_f64() * 1000.0,
            lazy_elapsed.as_secs_f64() * 1000.0
        );
    }

    let eager_avg = average_ms(&result.eager);
    let lazy_avg = average_ms(&result.lazy);

    println!("\nSummary");
    println!("  eager avg: {:>8.3} ms", eager_avg);
    println!("  lazy  avg: {:>8.3} ms", lazy_avg);

    Ok(())
}

fn average_ms(values: &[Duration]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum_ms: f64 = values.iter().map(|d| d.as_secs_f64() * 1000.0).sum();
    sum_ms / values.len() as f64
}

/// Both drivers run on one step core; any divergence is a bug.
fn assert_parity(eager: &[Entry], lazy: &[Entry]) -> Result<(), String> {
    if eager.len() != lazy.len() {
        return Err(format!(
            "Entry count mismatch: eager={} lazy={}",
            eager.len(),
            lazy.len()
        ));
    }
    if let Some((a, b)) = eager.iter().zip(lazy).find(|(a, b)| a.path != b.path) {
        return Err(format!(
            "Order mismatch: eager={} lazy={}",
            a.path.display(),
            b.path.display()
        ));
    }
    Ok(())
}
