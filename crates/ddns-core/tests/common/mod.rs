//! Test doubles and common utilities for contract tests
//!
//! Clones of each double share their state, so a test can hand one clone to
//! the reconciler and keep another to inspect call counts.

#![allow(dead_code)]

use ddns_core::config::{Credentials, DdnsConfig};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    ConfigSource, DnsProvider, DnsRecord, IpSource, MutationOutcome, RecordChange, RecordPage,
};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource that returns a scripted sequence of results
///
/// The last scripted result repeats once the script is exhausted.
#[derive(Clone)]
pub struct ScriptedIpSource {
    script: Arc<Mutex<VecDeque<std::result::Result<Ipv4Addr, String>>>>,
    last: Arc<Mutex<Option<std::result::Result<Ipv4Addr, String>>>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new(ips: &[Ipv4Addr]) -> Self {
        Self::from_results(ips.iter().map(|ip| Ok(*ip)).collect())
    }

    pub fn from_results(results: Vec<std::result::Result<Ipv4Addr, String>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(results.into_iter().collect())),
            last: Arc::new(Mutex::new(None)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        let result = match next {
            Some(result) => {
                *self.last.lock().unwrap() = Some(result.clone());
                result
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err("no scripted IP".to_string())),
        };

        result.map_err(Error::resolution)
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

#[derive(Default)]
struct ProviderState {
    records: Vec<DnsRecord>,
    next_id: u64,
    fail_on_page: Option<u32>,
    fail_mutations: bool,
    reject_code: Option<String>,
    requested_pages: Vec<u32>,
    mutations: Vec<Mutation>,
}

/// A mutation call observed by [`MockDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Add(RecordChange),
    Update { record_id: String, change: RecordChange },
}

/// An in-memory DnsProvider that tracks calls
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    state: Arc<Mutex<ProviderState>>,
    describe_call_count: Arc<AtomicUsize>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record into the provider
    pub fn with_record(self, rr: &str, record_type: &str, domain: &str, value: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let record_id = format!("{}", 1000 + state.next_id);
            state.records.push(DnsRecord {
                rr: rr.to_string(),
                value: value.to_string(),
                record_id,
                record_type: record_type.to_string(),
                domain_name: domain.to_string(),
            });
        }
        self
    }

    /// Seed `count` unrelated records
    pub fn with_filler_records(self, count: usize, domain: &str) -> Self {
        let mut provider = self;
        for i in 0..count {
            provider = provider.with_record(&format!("host{}", i), "A", domain, "10.0.0.1");
        }
        provider
    }

    /// Make the listing request for `page` fail
    pub fn failing_on_page(self, page: u32) -> Self {
        self.state.lock().unwrap().fail_on_page = Some(page);
        self
    }

    /// Make create/update requests fail at the transport level
    pub fn failing_mutations(self) -> Self {
        self.state.lock().unwrap().fail_mutations = true;
        self
    }

    /// Make create/update requests return a non-empty outcome code
    pub fn rejecting_mutations(self, code: &str) -> Self {
        self.state.lock().unwrap().reject_code = Some(code.to_string());
        self
    }

    /// Stop failing create/update requests
    pub fn accept_mutations(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_mutations = false;
        state.reject_code = None;
    }

    /// Get the number of times describe_records() was called
    pub fn describe_call_count(&self) -> usize {
        self.describe_call_count.load(Ordering::SeqCst)
    }

    /// Pages requested so far, in order
    pub fn requested_pages(&self) -> Vec<u32> {
        self.state.lock().unwrap().requested_pages.clone()
    }

    /// Mutations issued so far, in order
    pub fn mutations(&self) -> Vec<Mutation> {
        self.state.lock().unwrap().mutations.clone()
    }

    /// Number of create/update calls issued
    pub fn mutation_count(&self) -> usize {
        self.state.lock().unwrap().mutations.len()
    }

    /// Current records held by the provider
    pub fn records(&self) -> Vec<DnsRecord> {
        self.state.lock().unwrap().records.clone()
    }

    fn outcome(state: &ProviderState, record_id: Option<String>) -> MutationOutcome {
        match &state.reject_code {
            Some(code) => MutationOutcome {
                code: code.clone(),
                message: "rejected by mock".to_string(),
                record_id: None,
            },
            None => MutationOutcome::success(record_id),
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn describe_records(
        &self,
        _credentials: &Credentials,
        domain: &str,
        page_number: u32,
        page_size: u32,
    ) -> Result<RecordPage> {
        self.describe_call_count.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().unwrap();
        state.requested_pages.push(page_number);

        if state.fail_on_page == Some(page_number) {
            return Err(Error::http("connection reset"));
        }

        let matching: Vec<DnsRecord> = state
            .records
            .iter()
            .filter(|r| r.domain_name == domain)
            .cloned()
            .collect();

        let start = (page_number.saturating_sub(1) as usize) * page_size as usize;
        let records = matching
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();

        Ok(RecordPage {
            total_count: matching.len() as u64,
            page_number,
            page_size,
            records,
        })
    }

    async fn add_record(
        &self,
        _credentials: &Credentials,
        change: &RecordChange,
    ) -> Result<MutationOutcome> {
        let mut state = self.state.lock().unwrap();
        state.mutations.push(Mutation::Add(change.clone()));

        if state.fail_mutations {
            return Err(Error::http("timed out"));
        }
        if state.reject_code.is_some() {
            return Ok(Self::outcome(&state, None));
        }

        state.next_id += 1;
        let record_id = format!("{}", 1000 + state.next_id);
        state.records.push(DnsRecord {
            rr: change.rr.clone(),
            value: change.value.clone(),
            record_id: record_id.clone(),
            record_type: change.record_type.clone(),
            domain_name: change.domain.clone(),
        });

        Ok(Self::outcome(&state, Some(record_id)))
    }

    async fn update_record(
        &self,
        _credentials: &Credentials,
        record_id: &str,
        change: &RecordChange,
    ) -> Result<MutationOutcome> {
        let mut state = self.state.lock().unwrap();
        state.mutations.push(Mutation::Update {
            record_id: record_id.to_string(),
            change: change.clone(),
        });

        if state.fail_mutations {
            return Err(Error::http("timed out"));
        }
        if state.reject_code.is_some() {
            return Ok(Self::outcome(&state, None));
        }

        if let Some(record) = state.records.iter_mut().find(|r| r.record_id == record_id) {
            record.value = change.value.clone();
        }

        Ok(Self::outcome(&state, Some(record_id.to_string())))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A ConfigSource whose configuration can be swapped between passes
#[derive(Clone)]
pub struct SwappableConfigSource {
    config: Arc<Mutex<std::result::Result<DdnsConfig, String>>>,
}

impl SwappableConfigSource {
    pub fn new(config: DdnsConfig) -> Self {
        Self {
            config: Arc::new(Mutex::new(Ok(config))),
        }
    }

    pub fn set(&self, config: DdnsConfig) {
        *self.config.lock().unwrap() = Ok(config);
    }

    pub fn set_unreadable(&self, reason: &str) {
        *self.config.lock().unwrap() = Err(reason.to_string());
    }
}

#[async_trait::async_trait]
impl ConfigSource for SwappableConfigSource {
    async fn load(&self) -> Result<DdnsConfig> {
        self.config.lock().unwrap().clone().map_err(Error::config)
    }

    fn describe(&self) -> String {
        "swappable test configuration".to_string()
    }
}

/// Helper to create a valid configuration for testing
pub fn minimal_config() -> DdnsConfig {
    DdnsConfig {
        access_key_id: "test-id".to_string(),
        access_key_secret: "test-secret".to_string(),
        domain: "example.com".to_string(),
        sub_domain: "home".to_string(),
        ttl: 600,
        interval: 300,
    }
}

pub fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
    Ipv4Addr::new(a, b, c, d)
}
