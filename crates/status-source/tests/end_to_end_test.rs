// End-to-end polling against a live status source
// Run with: cargo test -p jobpoll-source --test end_to_end_test

use std::sync::Arc;
use std::time::Duration;

use jobpoll::{HttpTransport, PollConfig, Poller, StatusResult, StatusTrace};
use jobpoll_source::{server, Resolution, StatusSource};

fn fast_config() -> PollConfig {
    PollConfig::new()
        .with_max_attempts(20)
        .with_max_wait_time(Duration::from_secs(10))
        .with_initial_wait_time(Duration::from_millis(50))
        .with_backoff_factor(1.5)
        .with_jitter(Duration::from_millis(20))
}

#[test_log::test(tokio::test)]
async fn test_poll_until_completed() {
    let source = Arc::new(
        StatusSource::with_delay(Duration::from_millis(200)).with_resolution(Resolution::Completed),
    );
    let (addr, _handle) = server::spawn("127.0.0.1:0", source.clone()).await.unwrap();

    let poller = Poller::new(fast_config(), HttpTransport::new(&format!("http://{}", addr))).unwrap();
    let trace = StatusTrace::new();

    let result = poller.run(Some(&trace)).await;

    assert_eq!(result, StatusResult::Completed);
    let statuses = trace.statuses();
    assert_eq!(statuses.first().map(String::as_str), Some("pending"));
    assert_eq!(statuses.last().map(String::as_str), Some("completed"));
    assert!(source.is_resolved());
}

#[tokio::test]
async fn test_remote_error_is_relayed() {
    let source = Arc::new(
        StatusSource::with_delay(Duration::from_millis(100)).with_resolution(Resolution::Error),
    );
    let (addr, _handle) = server::spawn("127.0.0.1:0", source).await.unwrap();

    let poller = Poller::new(fast_config(), HttpTransport::new(&format!("http://{}", addr))).unwrap();

    assert_eq!(poller.run(None).await, StatusResult::Error);
}

#[tokio::test]
async fn test_random_resolution_is_terminal() {
    let source = Arc::new(StatusSource::with_delay(Duration::ZERO));
    let (addr, _handle) = server::spawn("127.0.0.1:0", source).await.unwrap();

    let poller = Poller::new(fast_config(), HttpTransport::new(&format!("http://{}", addr))).unwrap();
    let trace = StatusTrace::new();

    let result = poller.run(Some(&trace)).await;

    assert!(result.is_remote_terminal(), "{result:?}");
    assert_eq!(trace.statuses(), vec![result.as_str()]);
}

#[tokio::test]
async fn test_slow_job_times_out() {
    let source = Arc::new(StatusSource::with_delay(Duration::from_secs(3600)));
    let (addr, _handle) = server::spawn("127.0.0.1:0", source.clone()).await.unwrap();

    let config = PollConfig::new()
        .with_max_attempts(3)
        .with_initial_wait_time(Duration::from_millis(10))
        .with_jitter(Duration::ZERO);
    let poller = Poller::new(config, HttpTransport::new(&format!("http://{}", addr))).unwrap();
    let trace = StatusTrace::new();

    let result = poller.run(Some(&trace)).await;

    assert_eq!(result, StatusResult::Timeout);
    assert_eq!(trace.statuses(), vec!["pending", "pending", "pending"]);
    assert!(!source.is_resolved());
}
