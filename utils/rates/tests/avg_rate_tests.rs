use loka_rates::{AvgRate, AvgRateCounter, RateConfig, RateError, Recorder, RegistrySource};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

const WINDOW: Duration = Duration::from_secs(1);

/// Source replaying `values` one read at a time, repeating the last one.
fn scripted(values: &'static [u64]) -> impl Fn() -> u64 + Send + Sync + 'static {
    let next = AtomicUsize::new(0);
    move || {
        let index = next.fetch_add(1, Ordering::SeqCst);
        values[index.min(values.len() - 1)]
    }
}

/// Source returning 1, 2, 3... on successive reads.
fn incrementing() -> impl Fn() -> u64 + Send + Sync + 'static {
    let reads = AtomicU64::new(0);
    move || reads.fetch_add(1, Ordering::SeqCst) + 1
}

/// Lets `count` sampling ticks elapse, waking halfway between two ticks.
async fn ticks(count: u32) {
    tokio::time::sleep(WINDOW * count + WINDOW / 2).await;
}

async fn wait_finished(rate: &AvgRate) {
    for _ in 0..100 {
        if rate.is_finished() {
            return;
        }
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_rate_over_full_window() {
    let rate = AvgRate::new(scripted(&[10, 13, 13, 20]), WINDOW, WINDOW * 3, "blocks").unwrap();
    assert_eq!(rate.bucket_count(), 4);

    ticks(4).await;

    let value = rate.try_rate().unwrap();
    assert!((value - 10.0 / 3.0).abs() < 1e-9, "rate was {}", value);
    assert_eq!(rate.total(), 20);
    assert_eq!(rate.sample_count(), 4);
    assert_eq!(rate.to_string(), "3.333 blocks/s (20 total)");
}

#[tokio::test(start_paused = true)]
async fn test_no_rate_before_two_samples() {
    let rate = AvgRate::new(scripted(&[10, 13]), WINDOW, WINDOW * 3, "blocks").unwrap();
    assert_eq!(rate.try_rate(), None);
    assert_eq!(rate.total(), 0);

    ticks(1).await;

    assert_eq!(rate.try_rate(), None);
    assert_eq!(rate.rate(), 0.0);
    assert_eq!(rate.total(), 10);
    assert_eq!(rate.to_string(), "0.000 blocks/s (10 total)");
}

#[tokio::test(start_paused = true)]
async fn test_ramp_up_only_counts_real_samples() {
    let counter = AvgRateCounter::new(WINDOW, WINDOW * 10, "blocks").unwrap();

    counter.add(5);
    ticks(1).await;
    counter.add(3);
    tokio::time::sleep(WINDOW).await;

    // A zero baseline would have contributed a delta of 5.
    assert_eq!(counter.try_rate(), Some(3.0));
    assert_eq!(counter.total(), 8);
}

#[tokio::test(start_paused = true)]
async fn test_window_slides_once_full() {
    let rate = AvgRate::new(scripted(&[10, 13, 13, 20, 25]), WINDOW, WINDOW * 3, "blocks").unwrap();

    ticks(4).await;
    tokio::time::sleep(WINDOW).await;

    // Deltas 3, 0, 7 slid to 0, 7, 5.
    assert_eq!(rate.try_rate(), Some(4.0));
    assert_eq!(rate.total(), 25);
}

#[tokio::test(start_paused = true)]
async fn test_sync_now_returns_fresh_total() {
    let rate = AvgRate::new(incrementing(), WINDOW, WINDOW * 5, "reads").unwrap();

    assert_eq!(rate.sync_now().await, Some(1));
    assert_eq!(rate.total(), 1);

    ticks(1).await;
    assert_eq!(rate.total(), 2);

    assert_eq!(rate.sync_now().await, Some(3));
    assert_eq!(rate.total(), 3);
    assert_eq!(rate.sample_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_stop_is_idempotent() {
    let rate = Arc::new(AvgRate::new(incrementing(), WINDOW, WINDOW * 2, "reads").unwrap());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let rate = Arc::clone(&rate);
            tokio::spawn(async move { rate.stop() })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }
    rate.stop();

    assert!(rate.is_stopped());
    assert_eq!(rate.sync_now().await, None);

    wait_finished(&rate).await;
    assert!(rate.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_sync_now_racing_stop_does_not_deadlock() {
    let rate = Arc::new(AvgRate::new(incrementing(), WINDOW, WINDOW * 2, "reads").unwrap());

    let syncing = {
        let rate = Arc::clone(&rate);
        tokio::spawn(async move { rate.sync_now().await })
    };
    let stopping = {
        let rate = Arc::clone(&rate);
        tokio::spawn(async move { rate.stop() })
    };

    let synced = tokio::time::timeout(WINDOW * 10, syncing)
        .await
        .expect("sync_now blocked after stop")
        .unwrap();
    stopping.await.unwrap();

    if let Some(total) = synced {
        assert_eq!(total, rate.total());
    }
    assert_eq!(rate.sync_now().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_stopped_rate_keeps_last_state() {
    let rate = AvgRate::new(scripted(&[1, 4, 9, 16]), WINDOW, WINDOW * 3, "blocks").unwrap();

    ticks(2).await;
    rate.stop();
    ticks(5).await;

    assert_eq!(rate.sample_count(), 2);
    assert_eq!(rate.total(), 4);
    assert_eq!(rate.try_rate(), Some(3.0));
}

#[tokio::test(start_paused = true)]
async fn test_drop_releases_sampler_and_source() {
    let token = Arc::new(());
    let probe = Arc::clone(&token);
    let rate = AvgRate::new(
        move || {
            let _ = &probe;
            7
        },
        WINDOW,
        WINDOW * 2,
        "reads",
    )
    .unwrap();

    ticks(1).await;
    assert_eq!(rate.total(), 7);
    assert_eq!(Arc::strong_count(&token), 2);

    drop(rate);
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert_eq!(Arc::strong_count(&token), 1);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_windows_are_rejected() {
    let err = AvgRate::new(incrementing(), Duration::ZERO, WINDOW, "reads").unwrap_err();
    assert_eq!(err, RateError::InvalidWindow);

    let err = AvgRate::new(incrementing(), WINDOW * 2, WINDOW, "reads").unwrap_err();
    assert!(matches!(err, RateError::WindowExceedsPeriod { .. }));

    let err = AvgRate::new(incrementing(), WINDOW * 2, WINDOW * 5, "reads").unwrap_err();
    assert!(matches!(err, RateError::NonDivisiblePeriod { .. }));

    let config = RateConfig::new(WINDOW, WINDOW * 5, "");
    let err = AvgRateCounter::from_config(&config).unwrap_err();
    assert!(matches!(err, RateError::MissingField { .. }));
}

#[test]
fn test_requires_runtime() {
    let err = AvgRate::new(incrementing(), WINDOW, WINDOW * 2, "reads").unwrap_err();
    assert_eq!(err, RateError::NoRuntime);
}

#[tokio::test(start_paused = true)]
async fn test_rate_is_published_to_gauge() {
    let recorder = Recorder::new();
    let config = RateConfig::new(WINDOW, WINDOW * 2, "blocks").with_gauge("blocks_rate");

    let counter =
        metrics::with_local_recorder(&recorder, || AvgRateCounter::from_config(&config)).unwrap();
    let key = metrics::Key::from_name("blocks_rate");

    counter.add(4);
    ticks(1).await;
    assert_eq!(recorder.gauge(&key), Some(0.0));

    counter.add(6);
    tokio::time::sleep(WINDOW).await;
    assert_eq!(recorder.gauge(&key), Some(6.0));
}

#[tokio::test(start_paused = true)]
async fn test_registry_counter_as_source() {
    let recorder = Arc::new(Recorder::new());
    let increment = |chain: &'static str, value: u64| {
        metrics::with_local_recorder(recorder.as_ref(), || {
            metrics::counter!("blocks_processed", "chain" => chain).increment(value);
        });
    };

    let rate = AvgRate::new(
        RegistrySource::new(Arc::clone(&recorder), "blocks_processed"),
        WINDOW,
        WINDOW * 4,
        "blocks",
    )
    .unwrap();

    increment("main", 3);
    increment("side", 2);
    assert_eq!(rate.sync_now().await, Some(5));

    increment("main", 10);
    assert_eq!(rate.sync_now().await, Some(15));
    assert_eq!(rate.try_rate(), Some(10.0));
}
