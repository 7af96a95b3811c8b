//! Ten tasks greet after increasing delays; the primary task returns at once
//! and the run waits for all of them.
//!
//! Run with `RUST_LOG=reactor=trace` to watch the scheduler.

use reactor::{RuntimeError, create_task, sleep};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

async fn delayed_hello(delay: u64) {
    sleep(Duration::from_secs(delay)).await;
    println!("Hello! delay={delay}");
}

fn main() -> Result<(), RuntimeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let val = reactor::run(
        async {
            for i in 0..10 {
                create_task(delayed_hello(i));
            }
            9000
        },
        true,
    )?;

    println!("End of script: return value = {val}");
    Ok(())
}
