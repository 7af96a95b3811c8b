//! Three factorials computed concurrently; total time is that of the longest.

use reactor::{Runtime, RuntimeError, gather, sleep};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

async fn factorial(name: &'static str, n: u64) -> u64 {
    let mut f = 1;
    for i in 2..=n {
        println!("Task {name}: Compute factorial({n}), currently i={i}...");
        sleep(Duration::from_secs(1)).await;
        f *= i;
    }
    println!("Task {name}: factorial({n}) = {f}");
    f
}

fn main() -> Result<(), RuntimeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rt = Runtime::new();
    let start = Instant::now();

    let results = rt.run(async {
        gather([("A", 2), ("B", 3), ("C", 4)].map(|(name, n)| factorial(name, n))).await
    })?;

    println!("{results:?} in {:.1?}", start.elapsed());
    Ok(())
}
