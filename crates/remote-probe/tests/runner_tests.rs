//! Integration tests for the execution drivers, run against the scripted
//! mock channel so no network is involved.

#![cfg(feature = "mock")]

use std::time::Duration;

use remote_probe::mock::MockScript;
use remote_probe::{ProbeError, collect_output, poll_output};

/// Opt into runner tracing with `RUST_LOG=remote_probe=trace cargo test`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[tokio::test(start_paused = true)]
async fn echo_round_trip() {
    init_tracing();
    let mut channel = MockScript::new().stdout("hello\n").exit(0).channel();

    let result = collect_output(&mut channel, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(result.stdout, "hello");
    assert_eq!(result.stderr, "");
    assert_eq!(result.exit_status, Some(0));
    assert!(result.success());
}

#[tokio::test(start_paused = true)]
async fn multiline_output_is_trimmed_per_line() {
    let mut channel = MockScript::new()
        .stdout("osd.0  up   \nosd.1  up\t\nosd.2  down  \n")
        .exit(0)
        .channel();

    let result = collect_output(&mut channel, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(result.stdout, "osd.0  up\nosd.1  up\nosd.2  down");
}

#[tokio::test(start_paused = true)]
async fn no_output_is_valid() {
    let mut channel = MockScript::new().exit(0).eof().channel();

    let result = collect_output(&mut channel, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(result.stdout, "");
    assert_eq!(result.stderr, "");
}

#[tokio::test(start_paused = true)]
async fn streams_stay_separate() {
    let mut channel = MockScript::new()
        .stdout("progress line\n")
        .stderr("deprecation warning\n")
        .stdout("done\n")
        .exit(0)
        .channel();

    let result = collect_output(&mut channel, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(result.stdout, "progress line\ndone");
    assert_eq!(result.stderr, "deprecation warning");
}

#[tokio::test(start_paused = true)]
async fn polled_command_output_is_collected_exactly_once() {
    init_tracing();
    // Output dribbles out over several poll intervals; the accumulated
    // result must contain each chunk once despite many partial drains.
    let mut channel = MockScript::new()
        .stdout("phase 1 complete\n")
        .delay(Duration::from_secs(3))
        .stdout("phase 2 complete\n")
        .delay(Duration::from_secs(3))
        .stderr("retrying osd.4\n")
        .stdout("phase 3 complete\n")
        .exit(0)
        .channel();

    let result = poll_output(&mut channel, Duration::from_secs(1), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(
        result.stdout,
        "phase 1 complete\nphase 2 complete\nphase 3 complete"
    );
    assert_eq!(result.stderr, "retrying osd.4");
    assert_eq!(result.exit_status, Some(0));
}

#[tokio::test(start_paused = true)]
async fn polled_command_exceeding_timeout_fails() {
    let mut channel = MockScript::new()
        .stdout("still going\n")
        .delay(Duration::from_secs(3600))
        .exit(0)
        .channel();

    let err = poll_output(&mut channel, Duration::from_secs(5), Duration::from_secs(30))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test(start_paused = true)]
async fn polled_command_finishing_on_final_tick_succeeds() {
    let mut channel = MockScript::new()
        .delay(Duration::from_secs(9))
        .stdout("made it\n")
        .exit(0)
        .channel();

    let result = poll_output(&mut channel, Duration::from_secs(2), Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(result.stdout, "made it");
}

#[tokio::test(start_paused = true)]
async fn stderr_after_exit_is_drained() {
    let mut channel = MockScript::new()
        .stdout("partial\n")
        .exit(2)
        .stderr("pool 'rbd' does not exist\n")
        .channel();

    let result = poll_output(&mut channel, Duration::from_secs(1), Duration::from_secs(30))
        .await
        .unwrap();
    assert_eq!(result.exit_status, Some(2));
    assert_eq!(result.stderr, "pool 'rbd' does not exist");
    assert!(!result.success());
}

#[tokio::test(start_paused = true)]
async fn transport_failure_mid_command() {
    let mut channel = MockScript::new()
        .stdout("half an answer\n")
        .error("connection reset by peer")
        .channel();

    let err = collect_output(&mut channel, Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::Execution { .. }));
}

#[tokio::test(start_paused = true)]
async fn failed_command_surfaces_via_ensure_success() {
    let mut channel = MockScript::new()
        .stderr("Error EPERM: insufficient caps\n")
        .exit(13)
        .channel();

    let err = collect_output(&mut channel, Duration::from_secs(5))
        .await
        .unwrap()
        .ensure_success()
        .unwrap_err();
    match err {
        ProbeError::CommandFailed { status, stderr } => {
            assert_eq!(status, 13);
            assert_eq!(stderr, "Error EPERM: insufficient caps");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn json_output_decodes() {
    let mut channel = MockScript::new()
        .stdout(r#"{"epoch": 42, "num_osds": 8}"#)
        .exit(0)
        .channel();

    let result = collect_output(&mut channel, Duration::from_secs(5))
        .await
        .unwrap();
    let value = result.json().unwrap();
    assert_eq!(value["num_osds"], 8);
}
