//! Metrics collection.
//!
//! # Metrics
//! - `bridge_transactions_submitted_total` (counter): accepted submissions by payload kind
//! - `bridge_confirmations_total` (counter): one outcome per wait: completed
//!   (executed), failed (aborted on-chain), or timeout
//! - `bridge_faucet_requests_total` (counter): funding requests by outcome
//! - `bridge_operations_total` (counter): composite bridge operations by direction, outcome
//!
//! Recorded through the `metrics` facade. Nothing is exported unless the
//! embedding process installs a recorder.

use metrics::counter;

pub fn record_transaction_submitted(payload_kind: &'static str) {
    counter!("bridge_transactions_submitted_total", "payload" => payload_kind).increment(1);
}

pub fn record_confirmation(outcome: &'static str) {
    counter!("bridge_confirmations_total", "outcome" => outcome).increment(1);
}

pub fn record_faucet_request(success: bool) {
    let outcome = if success { "accepted" } else { "rejected" };
    counter!("bridge_faucet_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_bridge_operation(direction: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("bridge_operations_total", "direction" => direction, "outcome" => outcome)
        .increment(1);
}
