use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Client;
use tracing::trace;

use crate::engine::controller::RunState;
use crate::engine::devices::DeviceIdentity;

/// Fixed descriptive parameters sent with every call. These describe a
/// plausible client build; the upstream does not validate them against the
/// identity fields.
const DEVICE_TYPE: &str = "SM-G973N";
const DEVICE_BRAND: &str = "samsung";
const DEVICE_PLATFORM: &str = "android";
const OS_VERSION: &str = "9";
const APP_NAME: &str = "musically_go";
const HOST_ABI: &str = "armeabi-v7a";
const CHANNEL: &str = "googleplay";
const VERSION_CODE: &str = "160904";
const APP_ID: &str = "1340";

/// Placeholder signature: a fixed opaque value, independent of the request.
/// The upstream contract it pretends to satisfy is not modeled here.
const SIGNATURE_VALUE: &str = "0404b0d300000000000000000000000000000000";
const SESSION_COOKIE: &str = "sessionid=90c38a59d8076ea0fbc01c8643efbe47";
const USER_AGENT: &str = "okhttp/3.10.0.1";

/// Classification of one settled call. Exactly one variant applies; every
/// variant increments the run's total exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// Response parsed and carried the nested success marker.
    Success,
    /// Response received but unparseable or missing the marker.
    FailedParse,
    /// Connect or transport error before a response arrived.
    FailedNetwork,
    /// The per-call timeout expired; the in-flight call was dropped.
    FailedTimeout,
}

fn build_query(identity: &DeviceIdentity) -> String {
    format!(
        "device_id={}&iid={}&device_type={}&app_name={}&host_abi={}&channel={}&device_platform={}&version_code={}&device_brand={}&os_version={}&aid={}",
        identity.device_id,
        identity.install_id,
        DEVICE_TYPE,
        APP_NAME,
        HOST_ABI,
        CHANNEL,
        DEVICE_PLATFORM,
        VERSION_CODE,
        DEVICE_BRAND,
        OS_VERSION,
        APP_ID,
    )
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Issue one view request for `identity` and settle it into `state`.
///
/// Never fails past this boundary: network errors, timeouts and bad bodies
/// are absorbed into the failure counter. No retries; a failed call is
/// counted and abandoned.
pub async fn execute(
    client: &Client,
    endpoint: &str,
    identity: &DeviceIdentity,
    subject_id: &str,
    state: &RunState,
) -> CallOutcome {
    let url = format!("{}?{}", endpoint, build_query(identity));
    let payload = format!("item_id={}&play_delta=1", subject_id);

    let result = client
        .post(&url)
        .header("cookie", SESSION_COOKIE)
        .header("x-gorgon", SIGNATURE_VALUE)
        .header("x-khronos", unix_seconds().to_string())
        .header("user-agent", USER_AGENT)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(payload)
        .send()
        .await;

    let outcome = match result {
        Ok(response) => match response.json::<serde_json::Value>().await {
            // The upstream reports a delivered view through a nested
            // impression id; anything else is a rejection.
            Ok(body) if body.pointer("/log_pb/impr_id").is_some() => CallOutcome::Success,
            Ok(_) => CallOutcome::FailedParse,
            Err(e) if e.is_timeout() => CallOutcome::FailedTimeout,
            Err(_) => CallOutcome::FailedParse,
        },
        Err(e) if e.is_timeout() => CallOutcome::FailedTimeout,
        Err(_) => CallOutcome::FailedNetwork,
    };

    trace!(device_id = %identity.device_id, ?outcome, "Call settled");
    state.record(outcome);
    outcome
}
