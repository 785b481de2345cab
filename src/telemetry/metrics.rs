//! Metric definitions for Graph traffic

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

pub const GRAPH_REQUESTS_TOTAL: &str = "msgraph_requests_total";
pub const GRAPH_REQUEST_DURATION_SECONDS: &str = "msgraph_request_duration_seconds";
pub const TOKEN_REQUESTS_TOTAL: &str = "msgraph_token_requests_total";

/// Register metric descriptions with whatever recorder is installed.
pub fn describe_metrics() {
    describe_counter!(GRAPH_REQUESTS_TOTAL, "Total number of Microsoft Graph requests");
    describe_histogram!(
        GRAPH_REQUEST_DURATION_SECONDS,
        "Microsoft Graph request duration in seconds"
    );
    describe_counter!(
        TOKEN_REQUESTS_TOTAL,
        "Total number of access token requests to the identity platform"
    );
}

/// Record one Graph round trip. `status` is the HTTP status or `error` when
/// no response arrived.
pub fn record_graph_request(operation: &'static str, status: &str, duration: Duration) {
    counter!(GRAPH_REQUESTS_TOTAL, "operation" => operation, "status" => status.to_string())
        .increment(1);
    histogram!(GRAPH_REQUEST_DURATION_SECONDS, "operation" => operation)
        .record(duration.as_secs_f64());
}

/// Record a token acquisition attempt: `success`, `rejected` or `error`.
pub fn record_token_request(outcome: &'static str) {
    counter!(TOKEN_REQUESTS_TOTAL, "outcome" => outcome).increment(1);
}
