// Timed query executor tests.

use super::*;
use crate::dns::test_helpers::{FlakyResolver, HangingResolver, StaticResolver};
use crate::dns::DnsAnswer;
use std::time::Instant;

fn policy(timeout_ms: u64, max_attempts: u32, base_delay_ms: u64) -> RetryPolicy {
    RetryPolicy {
        timeout: Duration::from_millis(timeout_ms),
        max_attempts,
        base_delay: Duration::from_millis(base_delay_ms),
    }
}

fn a_response() -> DnsResponse {
    DnsResponse::new(vec![DnsAnswer::A("203.0.113.7".to_string())])
}

#[test]
fn test_backoff_delay_doubles() {
    let policy = policy(1000, 5, 100);
    assert_eq!(policy.backoff_delay(1), Duration::from_millis(100));
    assert_eq!(policy.backoff_delay(2), Duration::from_millis(200));
    assert_eq!(policy.backoff_delay(3), Duration::from_millis(400));
}

#[test]
fn test_backoff_delay_zero_base() {
    let policy = policy(1000, 5, 0);
    assert_eq!(policy.backoff_delay(4), Duration::ZERO);
}

#[test]
fn test_backoff_delay_saturates() {
    let policy = policy(1000, 5, u64::MAX / 2);
    // Must not panic on overflow
    let _ = policy.backoff_delay(40);
}

#[test]
fn test_into_parts_exactly_one_side() {
    let (response, error) = QueryOutcome::Answered(DnsResponse::empty()).into_parts();
    assert!(response.is_some() && error.is_none());

    let (response, error) = QueryOutcome::Failed(QueryFailure {
        kind: ErrorType::DnsQueryTimeout,
        message: "A example.com: timed out after 5ms".to_string(),
    })
    .into_parts();
    assert!(response.is_none() && error.is_some());
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let resolver = StaticResolver::new().with_a("example.com", &["203.0.113.7"]);
    let cancel = CancellationToken::new();
    let outcome = execute_query(
        &resolver,
        "example.com",
        RecordKind::A,
        "A example.com",
        &policy(500, 3, 1),
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(outcome, QueryOutcome::Answered(a_response()));
    assert_eq!(resolver.calls(), 1);
}

#[tokio::test]
async fn test_empty_answer_is_a_response() {
    let resolver = StaticResolver::new();
    let cancel = CancellationToken::new();
    let outcome = execute_query(
        &resolver,
        "nothing.example",
        RecordKind::Mx,
        "MX nothing.example",
        &policy(500, 3, 1),
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(outcome, QueryOutcome::Answered(DnsResponse::empty()));
    assert_eq!(resolver.calls(), 1, "empty answers must not be retried");
}

#[tokio::test]
async fn test_succeeds_on_third_attempt() {
    let resolver = FlakyResolver::new(2, a_response());
    let cancel = CancellationToken::new();
    let outcome = execute_query(
        &resolver,
        "example.com",
        RecordKind::A,
        "A example.com",
        &policy(500, 3, 1),
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(outcome, QueryOutcome::Answered(a_response()));
    assert_eq!(resolver.calls(), 3);
}

#[tokio::test]
async fn test_exhausted_retries_report_last_failure() {
    let resolver = FlakyResolver::new(10, a_response());
    let cancel = CancellationToken::new();
    let outcome = execute_query(
        &resolver,
        "example.com",
        RecordKind::A,
        "A example.com",
        &policy(500, 3, 0),
        &cancel,
    )
    .await
    .unwrap();

    match outcome {
        QueryOutcome::Failed(failure) => {
            assert_eq!(failure.kind, ErrorType::DnsTransportError);
            assert!(failure.message.starts_with("A example.com:"));
            assert!(failure.message.contains("connection reset"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(resolver.calls(), 3);
}

#[tokio::test]
async fn test_timeout_on_final_attempt_is_tagged_with_label() {
    let cancel = CancellationToken::new();
    let outcome = execute_query(
        &HangingResolver,
        "slow.example",
        RecordKind::Ns,
        "NS slow.example",
        &policy(10, 2, 0),
        &cancel,
    )
    .await
    .unwrap();

    match outcome {
        QueryOutcome::Failed(failure) => {
            assert_eq!(failure.kind, ErrorType::DnsQueryTimeout);
            assert_eq!(failure.message, "NS slow.example: timed out after 10ms");
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fatal_error_is_not_retried() {
    let resolver = StaticResolver::new().with_error(
        "example.com",
        RecordKind::Ns,
        ResolverError::Fatal("no connections available".to_string()),
    );
    let cancel = CancellationToken::new();
    let result = execute_query(
        &resolver,
        "example.com",
        RecordKind::Ns,
        "NS example.com",
        &policy(500, 3, 1),
        &cancel,
    )
    .await;

    assert!(matches!(result, Err(ProbeError::Fatal(_))));
    assert_eq!(resolver.calls(), 1);
}

#[tokio::test]
async fn test_cancellation_during_query() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = execute_query(
        &HangingResolver,
        "example.com",
        RecordKind::A,
        "A example.com",
        &policy(60_000, 3, 0),
        &cancel,
    )
    .await;

    assert_eq!(result, Err(ProbeError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_cancellation_interrupts_backoff() {
    let resolver = FlakyResolver::new(10, a_response());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = execute_query(
        &resolver,
        "example.com",
        RecordKind::A,
        "A example.com",
        &policy(500, 3, 60_000),
        &cancel,
    )
    .await;

    assert_eq!(result, Err(ProbeError::Cancelled));
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "backoff delay should be interrupted by cancellation"
    );
    assert_eq!(resolver.calls(), 1);
}

#[tokio::test]
async fn test_zero_attempts_treated_as_one() {
    let resolver = FlakyResolver::new(10, a_response());
    let cancel = CancellationToken::new();
    let outcome = execute_query(
        &resolver,
        "example.com",
        RecordKind::A,
        "A example.com",
        &policy(500, 0, 0),
        &cancel,
    )
    .await
    .unwrap();

    assert!(matches!(outcome, QueryOutcome::Failed(_)));
    assert_eq!(resolver.calls(), 1);
}

#[tokio::test]
async fn test_server_failure_is_retried_then_reported() {
    let resolver = StaticResolver::new().with_error(
        "example.com",
        RecordKind::Ns,
        ResolverError::Internal("server answered Server Failure".to_string()),
    );
    let cancel = CancellationToken::new();
    let outcome = execute_query(
        &resolver,
        "example.com",
        RecordKind::Ns,
        "NS example.com",
        &policy(500, 3, 0),
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        QueryOutcome::Failed(QueryFailure {
            kind: ErrorType::DnsResolverError,
            message: "NS example.com: resolver error: server answered Server Failure".to_string(),
        })
    );
    assert_eq!(resolver.calls(), 3);
}
