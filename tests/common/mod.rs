//! Shared utilities for integration testing: an in-process mock full node and
//! faucet.
//!
//! The mock checks what a real node would reject (bad signatures, stale
//! sequence numbers, expired requests) and emulates the TestCoin and bridge
//! module semantics closely enough to drive the deploy flow.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use serde_json::{json, Value};
use sha3::{Digest, Sha3_256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use apt_eth_bridge::account::AccountAddress;
use apt_eth_bridge::config::DeployConfig;
use apt_eth_bridge::ledger::{SignatureBlock, TransactionRequest};

pub const TEST_COIN_BALANCE: &str = "0x1::TestCoin::Balance";

/// How an injected failure surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Submission answered with 400.
    Reject,
    /// Accepted, then committed with `success: false`.
    Abort,
}

#[derive(Debug, Default)]
struct MockAccount {
    sequence_number: u64,
    resources: BTreeMap<String, Value>,
}

#[derive(Debug)]
struct MockTxn {
    polls: u32,
    not_found_polls: u32,
    pending_polls: u32,
    success: bool,
    vm_status: String,
}

#[derive(Debug)]
pub struct NodeState {
    accounts: HashMap<String, MockAccount>,
    transactions: HashMap<String, MockTxn>,
    published: HashSet<String>,
    initialized: HashSet<String>,
    failures: HashMap<String, Failure>,
    status_overrides: HashMap<String, u16>,
    next_hash: u64,
    /// Status queries answered 404 before a transaction is indexed.
    pub not_found_polls: u32,
    /// Status queries answered pending once indexed.
    pub pending_polls: u32,
    /// Transactions created per faucet request.
    pub faucet_txns: usize,
    /// Faucet answers 500 when set.
    pub faucet_down: bool,
    /// Signing message endpoint answers 503 when set.
    pub signing_down: bool,
    /// Signing message endpoint answers with a message that is not hex.
    pub garbage_signing_message: bool,
    /// Every accepted signed request, in order.
    pub submitted: Vec<Value>,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            accounts: HashMap::new(),
            transactions: HashMap::new(),
            published: HashSet::new(),
            initialized: HashSet::new(),
            failures: HashMap::new(),
            status_overrides: HashMap::new(),
            next_hash: 1,
            not_found_polls: 1,
            pending_polls: 1,
            faucet_txns: 1,
            faucet_down: false,
            signing_down: false,
            garbage_signing_message: false,
            submitted: Vec::new(),
        }
    }
}

type Shared = Arc<Mutex<NodeState>>;
type Reply = (StatusCode, Json<Value>);

/// Handle to a running mock node.
pub struct MockNode {
    pub url: String,
    pub state: Shared,
}

impl MockNode {
    /// Configuration pointing node and faucet at this mock, with fast polling.
    pub fn config(&self) -> DeployConfig {
        let mut config = DeployConfig::default();
        config.node.url = self.url.clone();
        config.node.request_timeout_secs = 5;
        config.faucet.url = self.url.clone();
        config.polling.interval_ms = 10;
        config.polling.max_attempts = 10;
        config
    }

    pub fn fail(&self, function: &str, failure: Failure) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(function.to_string(), failure);
    }

    pub fn set_indexing(&self, not_found_polls: u32, pending_polls: u32) {
        let mut state = self.state.lock().unwrap();
        state.not_found_polls = not_found_polls;
        state.pending_polls = pending_polls;
    }

    /// Answer every status query for `hash` with `status`.
    pub fn override_status(&self, hash: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .status_overrides
            .insert(hash.to_string(), status);
    }

    /// Create an account with a TestCoin balance, bypassing the faucet.
    pub fn create_account(&self, address: AccountAddress, test_coins: u64) {
        let mut state = self.state.lock().unwrap();
        let account = state.accounts.entry(address.to_hex()).or_default();
        credit(account, TEST_COIN_BALANCE, test_coins);
    }

    pub fn sequence_number(&self, address: AccountAddress) -> Option<u64> {
        let state = self.state.lock().unwrap();
        state
            .accounts
            .get(&address.to_hex())
            .map(|a| a.sequence_number)
    }

    pub fn balance(&self, address: AccountAddress, type_tag: &str) -> Option<u64> {
        let state = self.state.lock().unwrap();
        state
            .accounts
            .get(&address.to_hex())
            .and_then(|a| a.resources.get(type_tag))
            .map(coin_value)
    }

    pub fn has_resource(&self, address: AccountAddress, type_tag: &str) -> bool {
        let state = self.state.lock().unwrap();
        state
            .accounts
            .get(&address.to_hex())
            .is_some_and(|a| a.resources.contains_key(type_tag))
    }

    /// Status queries seen for a hash.
    pub fn polls(&self, hash: &str) -> u32 {
        let state = self.state.lock().unwrap();
        state.transactions.get(hash).map(|t| t.polls).unwrap_or(0)
    }

    pub fn submitted(&self) -> Vec<Value> {
        self.state.lock().unwrap().submitted.clone()
    }

    /// Register a transaction directly, e.g. to test polling in isolation.
    pub fn insert_transaction(&self, success: bool) -> String {
        let mut state = self.state.lock().unwrap();
        let vm_status = if success { "Executed successfully" } else { "Move abort" };
        insert_txn(&mut state, success, vm_status.to_string())
    }
}

/// Records the name and labels of every counter update.
///
/// Install with `metrics::with_local_recorder`. Counter handles are no-ops, so
/// each entry is one `counter!` invocation.
#[derive(Clone, Default)]
pub struct CaptureRecorder {
    counters: Arc<Mutex<Vec<String>>>,
}

impl CaptureRecorder {
    /// Entries rendered as `name{key=value,...}`.
    pub fn counters(&self) -> Vec<String> {
        self.counters.lock().unwrap().clone()
    }
}

impl Recorder for CaptureRecorder {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
        let labels: Vec<String> = key
            .labels()
            .map(|l| format!("{}={}", l.key(), l.value()))
            .collect();
        self.counters
            .lock()
            .unwrap()
            .push(format!("{}{{{}}}", key.name(), labels.join(",")));
        Counter::noop()
    }

    fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

/// Start a mock node and faucet on an ephemeral local port.
pub async fn start_mock_node() -> MockNode {
    let state: Shared = Arc::new(Mutex::new(NodeState::default()));

    let app = Router::new()
        .route("/accounts/{address}", get(get_account))
        .route("/accounts/{address}/resources", get(get_resources))
        .route("/transactions/signing_message", post(signing_message_handler))
        .route("/transactions", post(submit_transaction))
        .route("/transactions/{hash}", get(get_transaction))
        .route("/mint", post(faucet_mint))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockNode {
        url: format!("http://{}", addr),
        state,
    }
}

/// The bytes the mock asks clients to sign for an unsigned request body.
pub fn signing_message(unsigned: &Value) -> Vec<u8> {
    let bytes = serde_json::to_vec(unsigned).unwrap();
    Sha3_256::digest(&bytes).to_vec()
}

fn key(address: &str) -> String {
    let digits = address.trim_start_matches("0x").to_ascii_lowercase();
    format!("{:0>64}", digits)
}

fn error(status: StatusCode, code: &str) -> Reply {
    (status, Json(json!({ "code": status.as_u16(), "message": code })))
}

fn coin_value(resource: &Value) -> u64 {
    resource["coin"]["value"]
        .as_str()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn credit(account: &mut MockAccount, type_tag: &str, amount: u64) {
    let current = account.resources.get(type_tag).map(coin_value).unwrap_or(0);
    account.resources.insert(
        type_tag.to_string(),
        json!({ "coin": { "value": (current + amount).to_string() } }),
    );
}

fn insert_txn(state: &mut NodeState, success: bool, vm_status: String) -> String {
    let hash = format!("0x{:064x}", state.next_hash);
    state.next_hash += 1;
    let txn = MockTxn {
        polls: 0,
        not_found_polls: state.not_found_polls,
        pending_polls: state.pending_polls,
        success,
        vm_status,
    };
    state.transactions.insert(hash.clone(), txn);
    hash
}

async fn get_account(State(state): State<Shared>, Path(address): Path<String>) -> Reply {
    let state = state.lock().unwrap();
    let k = key(&address);
    match state.accounts.get(&k) {
        Some(account) => (
            StatusCode::OK,
            Json(json!({
                "sequence_number": account.sequence_number.to_string(),
                "authentication_key": format!("0x{}", k),
            })),
        ),
        None => error(StatusCode::NOT_FOUND, "Account not found"),
    }
}

async fn get_resources(State(state): State<Shared>, Path(address): Path<String>) -> Reply {
    let state = state.lock().unwrap();
    match state.accounts.get(&key(&address)) {
        Some(account) => {
            let resources: Vec<Value> = account
                .resources
                .iter()
                .map(|(tag, data)| json!({ "type": tag, "data": data }))
                .collect();
            (StatusCode::OK, Json(Value::Array(resources)))
        }
        None => error(StatusCode::NOT_FOUND, "Account not found"),
    }
}

async fn signing_message_handler(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let (down, garbage) = {
        let state = state.lock().unwrap();
        (state.signing_down, state.garbage_signing_message)
    };
    if down {
        return error(StatusCode::SERVICE_UNAVAILABLE, "Signing service unavailable");
    }
    if body.get("signature").is_some() {
        return error(StatusCode::BAD_REQUEST, "Request is already signed");
    }
    if serde_json::from_value::<TransactionRequest>(body.clone()).is_err() {
        return error(StatusCode::BAD_REQUEST, "Malformed transaction request");
    }
    let message = if garbage {
        "0xnot-hex".to_string()
    } else {
        format!("0x{}", hex::encode(signing_message(&body)))
    };
    (StatusCode::OK, Json(json!({ "message": message })))
}

async fn submit_transaction(State(state): State<Shared>, Json(mut body): Json<Value>) -> Reply {
    let Some(signature) = body.as_object_mut().and_then(|o| o.remove("signature")) else {
        return error(StatusCode::BAD_REQUEST, "Missing signature");
    };
    let Ok(signature) = serde_json::from_value::<SignatureBlock>(signature) else {
        return error(StatusCode::BAD_REQUEST, "Malformed signature");
    };
    if signature.verify(&signing_message(&body)).is_err() {
        return error(StatusCode::BAD_REQUEST, "INVALID_SIGNATURE");
    }
    let Ok(request) = serde_json::from_value::<TransactionRequest>(body.clone()) else {
        return error(StatusCode::BAD_REQUEST, "Malformed transaction request");
    };

    let public_key: [u8; 32] = hex::decode(signature.public_key.trim_start_matches("0x"))
        .ok()
        .and_then(|b| b.try_into().ok())
        .unwrap_or([0; 32]);
    if AccountAddress::from_ed25519_public_key(&public_key) != request.sender {
        return error(StatusCode::BAD_REQUEST, "INVALID_AUTH_KEY");
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    if request.expiration_timestamp_secs <= now {
        return error(StatusCode::BAD_REQUEST, "TRANSACTION_EXPIRED");
    }

    let mut state = state.lock().unwrap();
    let sender = request.sender.to_hex();
    let Some(expected) = state.accounts.get(&sender).map(|a| a.sequence_number) else {
        return error(StatusCode::BAD_REQUEST, "SENDING_ACCOUNT_DOES_NOT_EXIST");
    };
    if request.sequence_number < expected {
        return error(StatusCode::BAD_REQUEST, "SEQUENCE_NUMBER_TOO_OLD");
    }
    if request.sequence_number > expected {
        return error(StatusCode::BAD_REQUEST, "SEQUENCE_NUMBER_TOO_NEW");
    }

    let (success, vm_status) = match execute(&mut state, &sender, &body["payload"]) {
        Ok(()) => (true, "Executed successfully".to_string()),
        Err((Failure::Abort, reason)) => (false, reason),
        Err((Failure::Reject, reason)) => return error(StatusCode::BAD_REQUEST, &reason),
    };

    if let Some(account) = state.accounts.get_mut(&sender) {
        account.sequence_number += 1;
    }
    state.submitted.push(body);
    let hash = insert_txn(&mut state, success, vm_status);
    (StatusCode::ACCEPTED, Json(json!({ "hash": hash })))
}

type Outcome = Result<(), (Failure, String)>;

fn execute(state: &mut NodeState, sender: &str, payload: &Value) -> Outcome {
    match payload["type"].as_str() {
        Some("module_bundle_payload") => {
            state.published.insert(sender.to_string());
            Ok(())
        }
        Some("script_function_payload") => {
            let function = payload["function"].as_str().unwrap_or_default();
            let args: Vec<String> = payload["arguments"]
                .as_array()
                .map(|a| {
                    a.iter()
                        .map(|v| v.as_str().unwrap_or_default().to_string())
                        .collect()
                })
                .unwrap_or_default();
            call(state, sender, function, &args)
        }
        _ => Err((Failure::Reject, "Unknown payload type".to_string())),
    }
}

fn call(state: &mut NodeState, sender: &str, function: &str, args: &[String]) -> Outcome {
    let parts: Vec<&str> = function.split("::").collect();
    let [module_address, module_name, name] = parts[..] else {
        return Err((Failure::Reject, format!("Bad function id {}", function)));
    };
    let amount = |i: usize| -> Result<u64, (Failure, String)> {
        args.get(i)
            .and_then(|a| a.parse().ok())
            .ok_or((Failure::Reject, "Bad amount argument".to_string()))
    };
    let address = |i: usize| -> Result<String, (Failure, String)> {
        args.get(i)
            .filter(|a| a.starts_with("0x"))
            .map(|a| key(a))
            .ok_or((Failure::Reject, "Bad address argument".to_string()))
    };

    if let Some(failure) = state.failures.get(name).copied() {
        return Err((failure, format!("Injected failure in {}", name)));
    }

    let owner = key(module_address);
    let balance_tag = format!("{}::{}::Balance", module_address, module_name);

    if owner == key("0x1") && module_name == "TestCoin" && name == "transfer" {
        let (to, amount) = (address(0)?, amount(1)?);
        return move_coins(state, sender, &to, &balance_tag, amount);
    }

    if !state.published.contains(&owner) {
        return Err((Failure::Reject, "MODULE_NOT_PUBLISHED".to_string()));
    }
    let module = format!("{}::{}", owner, module_name);

    if name == "initialize" {
        if sender != owner {
            return Err((Failure::Abort, "ENOT_OWNER".to_string()));
        }
        let scaling_factor = amount(0)?;
        state.initialized.insert(module);
        if let Some(account) = state.accounts.get_mut(sender) {
            account.resources.insert(
                format!("{}::{}::Info", module_address, module_name),
                json!({ "scaling_factor": scaling_factor.to_string() }),
            );
        }
        return Ok(());
    }

    if !state.initialized.contains(&module) {
        return Err((Failure::Reject, "EMODULE_NOT_INITIALIZED".to_string()));
    }

    match name {
        "register" => {
            let registered = address(0)?;
            let account = state.accounts.entry(registered).or_default();
            credit(account, &balance_tag, 0);
            Ok(())
        }
        "mint" => {
            if sender != owner {
                return Err((Failure::Abort, "ENOT_OWNER".to_string()));
            }
            let (to, amount) = (address(0)?, amount(1)?);
            match state.accounts.get_mut(&to) {
                Some(account) if account.resources.contains_key(&balance_tag) => {
                    credit(account, &balance_tag, amount);
                    Ok(())
                }
                _ => Err((Failure::Abort, "ENOT_REGISTERED".to_string())),
            }
        }
        "transfer" => {
            let (to, amount) = (address(0)?, amount(1)?);
            move_coins(state, sender, &to, &balance_tag, amount)
        }
        "burn" => {
            let amount = amount(0)?;
            let account = state.accounts.entry(sender.to_string()).or_default();
            let current = account.resources.get(&balance_tag).map(coin_value).unwrap_or(0);
            if current < amount {
                return Err((Failure::Abort, "EINSUFFICIENT_BALANCE".to_string()));
            }
            account.resources.insert(
                balance_tag,
                json!({ "coin": { "value": (current - amount).to_string() } }),
            );
            Ok(())
        }
        _ => Err((Failure::Reject, format!("Unknown function {}", function))),
    }
}

fn move_coins(state: &mut NodeState, from: &str, to: &str, tag: &str, amount: u64) -> Outcome {
    let available = state
        .accounts
        .get(from)
        .and_then(|a| a.resources.get(tag))
        .map(coin_value)
        .unwrap_or(0);
    if available < amount {
        return Err((Failure::Abort, "EINSUFFICIENT_BALANCE".to_string()));
    }
    if let Some(account) = state.accounts.get_mut(from) {
        account.resources.insert(
            tag.to_string(),
            json!({ "coin": { "value": (available - amount).to_string() } }),
        );
    }
    let recipient = state.accounts.entry(to.to_string()).or_default();
    credit(recipient, tag, amount);
    Ok(())
}

async fn get_transaction(State(state): State<Shared>, Path(hash): Path<String>) -> Reply {
    let mut state = state.lock().unwrap();
    let Some(txn) = state.transactions.get_mut(&hash) else {
        return error(StatusCode::NOT_FOUND, "Transaction not found");
    };
    txn.polls += 1;
    let overridden = state.status_overrides.get(&hash).copied();
    if let Some(status) = overridden {
        let status = StatusCode::from_u16(status).unwrap();
        return error(status, "Injected status");
    }
    let Some(txn) = state.transactions.get(&hash) else {
        return error(StatusCode::NOT_FOUND, "Transaction not found");
    };

    if txn.polls <= txn.not_found_polls {
        return error(StatusCode::NOT_FOUND, "Transaction not found");
    }
    if txn.polls <= txn.not_found_polls.saturating_add(txn.pending_polls) {
        return (
            StatusCode::OK,
            Json(json!({ "type": "pending_transaction", "hash": hash })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "type": "user_transaction",
            "hash": hash,
            "success": txn.success,
            "vm_status": txn.vm_status,
        })),
    )
}

async fn faucet_mint(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let mut state = state.lock().unwrap();
    if state.faucet_down {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Faucet unavailable");
    }
    let (Some(address), Some(amount)) = (
        params.get("address"),
        params.get("amount").and_then(|a| a.parse::<u64>().ok()),
    ) else {
        return error(StatusCode::BAD_REQUEST, "address and amount are required");
    };

    let account = state.accounts.entry(key(address)).or_default();
    credit(account, TEST_COIN_BALANCE, amount);

    let hashes: Vec<Value> = (0..state.faucet_txns)
        .map(|_| Value::String(insert_txn(&mut state, true, "Executed successfully".to_string())))
        .collect();
    (StatusCode::OK, Json(Value::Array(hashes)))
}
