use std::time::Instant;

use shoal_sat::{
    config::{parallel::SplitMode, Config},
    parallel::ParallelSolve,
    shared::SharedContext,
    structures::literal::CLiteral,
};

/// Places `holes + 1` pigeons in `holes` holes, with a portfolio of one thread for each available core.
///
/// Usage: `cargo run --release --example portfolio [holes] [split|compete]`
fn main() {
    let args: Vec<String> = std::env::args().collect();
    let holes = args.get(1).and_then(|arg| arg.parse().ok()).unwrap_or(8);
    let mode = match args.get(2).map(|arg| arg.as_str()) {
        Some("compete") => SplitMode::Compete,
        _ => SplitMode::Split,
    };

    let mut config = Config::default();
    config.parallel.threads.value = std::thread::available_parallelism().map_or(2, |n| n.get());
    config.parallel.mode.value = mode;

    let mut ctx = SharedContext::from_config(config);

    let pigeons: Vec<Vec<CLiteral>> = (0..=holes)
        .map(|_| ctx.fresh_or_max_literals(holes))
        .collect();
    for pigeon in &pigeons {
        let _ = ctx.add_clause(pigeon.clone());
    }
    for hole in 0..holes {
        for (index, a) in pigeons.iter().enumerate() {
            for b in &pigeons[index + 1..] {
                let _ = ctx.add_clause(vec![-a[hole], -b[hole]]);
            }
        }
    }

    let start = Instant::now();
    match ParallelSolve::new(&mut ctx).solve() {
        Ok(report) => {
            println!(
                "{} in {:.2?}, by thread {:?} with {} splits",
                report.report,
                start.elapsed(),
                report.winner,
                report.splits
            );
            for error in report.errors {
                println!("c {error:?}");
            }
        }
        Err(e) => println!("c Error: {e:?}"),
    }
}
