use loka_rates::{AvgDurationCounter, AvgRateCounter, RateCounter};
use std::time::Duration;
use tokio::time::Instant;

#[tokio::main]
async fn main() -> loka_rates::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loka_rates=debug".into()),
        )
        .init();

    println!("=== Windowed Rates Example ===\n");

    // Averaged over the last 5 seconds, sampled every 500ms
    let shares = AvgRateCounter::new(Duration::from_millis(500), Duration::from_secs(5), "shares")?;
    let requests = RateCounter::per_second("requests");
    let validation = AvgDurationCounter::new(
        Duration::from_secs(5),
        Duration::from_millis(1),
        "share validation",
    );

    for round in 1..=12u64 {
        let started = Instant::now();

        // Bursty submissions: quiet rounds followed by spikes
        let submitted = if round % 4 == 0 { 25 } else { round % 4 * 3 };
        shares.add(submitted);
        requests.add(submitted);

        tokio::time::sleep(Duration::from_millis(50 + round * 5)).await;
        validation.add_elapsed(started);

        tokio::time::sleep(Duration::from_millis(450)).await;

        println!("  Round {:>2}: submitted {:>2}", round, submitted);
        println!("    {}", shares);
        println!("    {}", requests);
        println!("    {}", validation);
    }

    // Force a final sample so the totals line up
    if let Some(total) = shares.sync_now().await {
        println!("\nFinal sample read {} shares", total);
    }

    shares.stop();

    println!("\n=== Summary ===");
    println!("Average rate: {} shares/500ms", shares.rate_string());
    println!("Counted: {}", shares.count());

    Ok(())
}
