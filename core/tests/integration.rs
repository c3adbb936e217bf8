//! Every client operation against the fake Gen-API server over real HTTP.
//!
//! # Design
//! Each test starts the mock server on a random port in a background
//! thread, then drives the blocking clients from the test thread exactly as
//! an embedding gateway would.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use genapi_core::{
    CallContext, ClientConfig, CreateLogLineClient, ErrorKind, FixtureTable, GenApi, PingClient,
    ValidateLogLineClient,
};
use mock_server::{Behavior, StatusCode};

/// Start the mock server on a random port and return its address.
fn spawn_server(behavior: Behavior) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, behavior).await
        })
        .unwrap();
    });

    addr
}

/// An endpoint nothing listens on.
fn dead_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Cancel `ctx` from another thread once `delay` has passed.
fn cancel_after(ctx: &CallContext, delay: Duration) {
    let canceller = ctx.clone();
    std::thread::spawn(move || {
        std::thread::sleep(delay);
        canceller.cancel();
    });
}

fn fixtures() -> Arc<FixtureTable> {
    Arc::new(FixtureTable::embedded().unwrap())
}

#[test]
fn full_round_trip_through_gen_api() {
    let addr = spawn_server(Behavior::default());
    let api = GenApi::new(&ClientConfig::new(&format!("http://{addr}")), fixtures());
    let ctx = CallContext::with_timeout(Duration::from_secs(10));

    // Step 1: the service is alive.
    assert_eq!(api.ping().call(&ctx).unwrap(), 200);

    // Step 2: generate a line, then a remix of it.
    let first = api
        .create_log_line()
        .call(&ctx, "a lighthouse keeper", &[])
        .unwrap();
    assert_eq!(first.status, 200);
    assert_eq!(first.log_line, "a lighthouse keeper");

    let remix = vec![first.log_line.clone()];
    let second = api
        .create_log_line()
        .call(&ctx, "a lighthouse keeper", &remix)
        .unwrap();
    assert_eq!(second.log_line, "a lighthouse keeper (remix #1)");

    // Step 3: the generated line validates.
    assert_eq!(api.validate_log_line().call(&ctx, &second.log_line).unwrap(), 204);

    // Step 4: a blank line is the expected domain error.
    let err = api.validate_log_line().call(&ctx, "   ").unwrap_err();
    assert!(err.is_invalid_log_line());
    assert_eq!(err.status(), 422);
}

#[test]
fn degraded_service_fails_liveness_with_its_status() {
    let addr = spawn_server(Behavior {
        ping_status: StatusCode::SERVICE_UNAVAILABLE,
        ..Behavior::default()
    });
    let client = PingClient::new(&format!("http://{addr}"));

    let err = client.call(&CallContext::background()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
    assert_eq!(err.status(), 503);
}

#[test]
fn creation_failure_carries_server_message() {
    let addr = spawn_server(Behavior::default());
    let client = CreateLogLineClient::new(&format!("http://{addr}"), fixtures());

    let err = client
        .call(&CallContext::background(), mock_server::FAIL_INSTRUCTION, &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
    assert_eq!(err.status(), 500);
    assert_eq!(err.response_error().unwrap().message, "generation failed");

    let err = client.call(&CallContext::background(), "", &[]).unwrap_err();
    assert_eq!(err.status(), 400);
    assert_eq!(err.response_error().unwrap().message, "instruction is required");
}

#[test]
fn validation_crash_is_not_invalid_log_line() {
    let addr = spawn_server(Behavior::default());
    let client = ValidateLogLineClient::new(&format!("http://{addr}"), fixtures());

    let err = client
        .call(&CallContext::background(), "this will crash")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
    assert!(!err.is_invalid_log_line());
    assert_eq!(err.status(), 500);
    assert_eq!(err.response_error().unwrap().message, "validator crashed");
}

#[test]
fn connection_refused_yields_status_zero_everywhere() {
    let endpoint = dead_endpoint();
    let ctx = CallContext::with_timeout(Duration::from_secs(5));

    let err = PingClient::new(&endpoint).call(&ctx).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(err.status(), 0);

    let err = CreateLogLineClient::new(&endpoint, fixtures())
        .call(&ctx, "anything", &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), 0);

    let err = ValidateLogLineClient::new(&endpoint, fixtures())
        .call(&ctx, "anything")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), 0);
}

#[test]
fn deadline_aborts_in_flight_call() {
    let addr = spawn_server(Behavior {
        slow_delay: Duration::from_secs(5),
        ..Behavior::default()
    });
    let client = CreateLogLineClient::new(&format!("http://{addr}"), fixtures());
    let ctx = CallContext::with_timeout(Duration::from_millis(300));

    let started = std::time::Instant::now();
    let err = client
        .call(&ctx, mock_server::SLOW_INSTRUCTION, &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
    assert_eq!(err.status(), 0);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn configured_timeout_bounds_requests_without_a_deadline() {
    let addr = spawn_server(Behavior {
        slow_delay: Duration::from_secs(5),
        ..Behavior::default()
    });
    let config = ClientConfig {
        endpoint: format!("http://{addr}"),
        timeout_ms: Some(300),
    };
    let api = GenApi::new(&config, fixtures());

    let err = api
        .create_log_line()
        .call(&CallContext::background(), mock_server::SLOW_INSTRUCTION, &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), 0);
}

#[test]
fn cancelled_context_sends_nothing() {
    let addr = spawn_server(Behavior::default());
    let api = GenApi::new(&ClientConfig::new(&format!("http://{addr}")), fixtures());
    let ctx = CallContext::background();
    ctx.cancel();

    assert_eq!(api.ping().call(&ctx).unwrap_err().kind(), ErrorKind::Cancelled);
    assert_eq!(
        api.create_log_line().call(&ctx, "x", &[]).unwrap_err().kind(),
        ErrorKind::Cancelled
    );
    assert_eq!(
        api.validate_log_line().call(&ctx, "x").unwrap_err().kind(),
        ErrorKind::Cancelled
    );
}

#[test]
fn cancel_aborts_in_flight_calls() {
    let slow = Duration::from_secs(3);
    let addr = spawn_server(Behavior {
        ping_delay: slow,
        slow_delay: slow,
        ..Behavior::default()
    });
    let api = GenApi::new(&ClientConfig::new(&format!("http://{addr}")), fixtures());

    let ctx = CallContext::background();
    cancel_after(&ctx, Duration::from_millis(200));
    let started = std::time::Instant::now();
    let err = api
        .create_log_line()
        .call(&ctx, mock_server::SLOW_INSTRUCTION, &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(err.status(), 0);
    assert!(started.elapsed() < Duration::from_secs(2));

    let ctx = CallContext::background();
    cancel_after(&ctx, Duration::from_millis(200));
    let started = std::time::Instant::now();
    let err = api.ping().call(&ctx).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(err.status(), 0);
    assert!(started.elapsed() < Duration::from_secs(2));

    let ctx = CallContext::background();
    cancel_after(&ctx, Duration::from_millis(200));
    let started = std::time::Instant::now();
    let err = api
        .validate_log_line()
        .call(&ctx, mock_server::SLOW_INSTRUCTION)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(err.status(), 0);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn shared_transport_serves_calls_after_an_abandoned_one() {
    let addr = spawn_server(Behavior {
        slow_delay: Duration::from_secs(3),
        ..Behavior::default()
    });
    let api = GenApi::new(&ClientConfig::new(&format!("http://{addr}")), fixtures());

    let ctx = CallContext::background();
    cancel_after(&ctx, Duration::from_millis(100));
    let err = api
        .create_log_line()
        .call(&ctx, mock_server::SLOW_INSTRUCTION, &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);

    let ctx = CallContext::with_timeout(Duration::from_secs(5));
    assert_eq!(api.ping().call(&ctx).unwrap(), 200);
    let line = api.create_log_line().call(&ctx, "after", &[]).unwrap();
    assert_eq!(line.log_line, "after");
}

#[test]
fn mock_and_call_share_result_shapes() {
    let addr = spawn_server(Behavior::default());
    let api = GenApi::new(&ClientConfig::new(&format!("http://{addr}")), fixtures());
    let ctx = CallContext::background();

    let live = api.validate_log_line().call(&ctx, "").unwrap_err();
    let mocked = api.validate_log_line().mock(&ctx, "invalid").unwrap_err();
    assert_eq!(live.kind(), mocked.kind());
    assert_eq!(live.status(), mocked.status());

    let live = api.validate_log_line().call(&ctx, "fine").unwrap();
    let mocked = api.validate_log_line().mock(&ctx, "").unwrap();
    assert_eq!(live, mocked);
}
