use loka_rates::{AvgRate, RateConfig, Recorder, RegistrySource};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let recorder = Recorder::init().map_err(|_| "metrics recorder already installed")?;

    println!("=== Registry Rate Example ===\n");

    // The rate of a labelled counter, published back as a gauge
    let config = RateConfig::new(Duration::from_millis(200), Duration::from_secs(2), "blocks")
        .with_gauge("blocks_rate");
    let blocks = AvgRate::from_config(&config, RegistrySource::new(recorder, "blocks_processed"))?;

    for step in 0..20u64 {
        let chain = if step % 3 == 0 { "side" } else { "main" };
        metrics::counter!("blocks_processed", "chain" => chain).increment(step % 5 + 1);

        tokio::time::sleep(Duration::from_millis(100)).await;

        if step % 4 == 3 {
            println!("  Step {:>2}: {}", step + 1, blocks);
        }
    }

    blocks.sync_now().await;
    blocks.stop();

    println!("\n=== Final Metrics Summary ===");
    println!("Counters: {:#?}", recorder.counters());
    println!("Gauges: {:#?}", recorder.gauges());

    Ok(())
}
