//! Alibaba Cloud RPC request signing (signature version 1.0, HMAC-SHA1)
//!
//! Reference: <https://www.alibabacloud.com/help/en/sdk/product-overview/rpc-mechanism>
//!
//! 1. Add the protocol parameters (format, version, key id, method,
//!    timestamp, signature version, nonce)
//! 2. Sort all keys byte-wise and join `encode(key)=encode(value)` with `&`
//! 3. String to sign: `GET&%2F&` + encode(canonicalized query)
//! 4. Signature: base64(HMAC-SHA1(string to sign, secret + "&"))
//!
//! Only step 2 needs sorted order. The emitted query string keeps the
//! order in which parameters were added.

use std::sync::atomic::{AtomicI64, Ordering};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use ddns_core::Credentials;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// DNS API version
pub const API_VERSION: &str = "2015-01-09";

/// Response format requested from the API
pub const RESPONSE_FORMAT: &str = "json";

/// Signature algorithm
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// Signature protocol version
pub const SIGNATURE_VERSION: &str = "1.0";

/// Name of the signature parameter
pub const SIGNATURE_PARAM: &str = "Signature";

const SEPARATOR: &str = "&";

/// Last nonce handed out in this process
static LAST_NONCE: AtomicI64 = AtomicI64::new(0);

/// Request signer for one credential pair
pub struct Signer<'a> {
    credentials: &'a Credentials,
}

impl<'a> Signer<'a> {
    /// Create a signer for `credentials`
    pub fn new(credentials: &'a Credentials) -> Self {
        Self { credentials }
    }

    /// Sign `params` with the current time and a fresh nonce
    ///
    /// Returns the complete query string (without leading `?`).
    pub fn sign(&self, params: Vec<(String, String)>) -> String {
        self.sign_at(params, Utc::now(), &next_nonce())
    }

    /// Sign `params` with an explicit timestamp and nonce
    pub fn sign_at(
        &self,
        mut params: Vec<(String, String)>,
        timestamp: DateTime<Utc>,
        nonce: &str,
    ) -> String {
        set_param(&mut params, "Format", RESPONSE_FORMAT);
        set_param(&mut params, "Version", API_VERSION);
        set_param(&mut params, "AccessKeyId", &self.credentials.access_key_id);
        set_param(&mut params, "SignatureMethod", SIGNATURE_METHOD);
        set_param(&mut params, "Timestamp", &format_timestamp(timestamp));
        set_param(&mut params, "SignatureVersion", SIGNATURE_VERSION);
        set_param(&mut params, "SignatureNonce", nonce);

        let signature = compute_signature(&params, &self.credentials.access_key_secret);
        set_param(&mut params, SIGNATURE_PARAM, &signature);

        params
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }
}

/// Percent-encode per RFC 3986
///
/// Unreserved characters (`A-Z a-z 0-9 - _ . ~`) are kept, every other byte
/// of the UTF-8 encoding becomes `%XX` with uppercase hex. In particular
/// space is `%20`, `*` is `%2A`, `=` is `%3D` and `~` stays literal.
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Sorted, encoded `key=value` pairs used as signing input
///
/// Empty keys and any existing `Signature` parameter are left out.
pub fn canonicalized_query(params: &[(String, String)]) -> String {
    let mut pairs: Vec<&(String, String)> = params
        .iter()
        .filter(|(key, _)| !key.is_empty() && key != SIGNATURE_PARAM)
        .collect();
    pairs.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// `GET&%2F&` followed by the encoded canonicalized query
pub fn string_to_sign(params: &[(String, String)]) -> String {
    format!(
        "GET{sep}{root}{sep}{query}",
        sep = SEPARATOR,
        root = percent_encode("/"),
        query = percent_encode(&canonicalized_query(params))
    )
}

/// base64(HMAC-SHA1(string to sign, secret + "&"))
pub fn compute_signature(params: &[(String, String)], access_key_secret: &str) -> String {
    let key = format!("{}{}", access_key_secret, SEPARATOR);
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(string_to_sign(params).as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// ISO-8601 UTC timestamp with second precision
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Nanosecond UTC timestamp, strictly increasing within the process
fn next_nonce() -> String {
    let now = Utc::now();
    let now_nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1000));

    let mut last = LAST_NONCE.load(Ordering::Relaxed);
    loop {
        let next = now_nanos.max(last.saturating_add(1));
        match LAST_NONCE.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return next.to_string(),
            Err(actual) => last = actual,
        }
    }
}

/// Insert or replace `key`, keeping the position of an existing entry
fn set_param(params: &mut Vec<(String, String)>, key: &str, value: &str) {
    match params.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value.to_string(),
        None => params.push((key.to_string(), value.to_string())),
    }
}
