//! Test doubles and common utilities for controller contract tests
//!
//! The doubles are scripted: each call pops the next scripted step and
//! falls back to a fixed default once the script runs out. All counters
//! live behind `Arc`s so a clone handed to the controller and the copy
//! kept by the test observe the same calls.

#![allow(dead_code)]

use ddns_core::config::{DdnsConfig, EngineConfig, ProviderConfig, RecordConfig};
use ddns_core::error::{Error, Result};
use ddns_core::record::{DnsRecord, RecordData, RecordLookup};
use ddns_core::traits::{DnsProvider, HealthNotifier, IpResolver};
use ddns_core::ControllerEvent;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// One scripted answer from the resolver
#[derive(Debug, Clone)]
pub enum IpStep {
    Ip(&'static str),
    NetworkDown,
    Garbage(&'static str),
}

/// An IpResolver that replays a script
#[derive(Clone)]
pub struct ScriptedResolver {
    script: Arc<Mutex<VecDeque<IpStep>>>,
    fallback: IpStep,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    spans: Arc<Mutex<Vec<(Instant, Instant)>>>,
}

impl ScriptedResolver {
    /// A resolver that always returns `ip`
    pub fn fixed(ip: &'static str) -> Self {
        Self::scripted(Vec::new(), IpStep::Ip(ip))
    }

    /// A resolver that replays `steps`, then keeps answering `fallback`
    pub fn scripted(steps: Vec<IpStep>, fallback: IpStep) -> Self {
        Self {
            script: Arc::new(Mutex::new(steps.into())),
            fallback,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            spans: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every lookup take `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent `resolve` calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// (start, end) of every completed `resolve` call
    pub fn spans(&self) -> Vec<(Instant, Instant)> {
        self.spans.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IpResolver for ScriptedResolver {
    async fn resolve(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        let started = Instant::now();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.spans.lock().unwrap().push((started, Instant::now()));

        match step {
            IpStep::Ip(ip) => Ok(ip.to_string()),
            IpStep::NetworkDown => Err(Error::network("connection refused")),
            IpStep::Garbage(body) => Err(Error::invalid_response(body)),
        }
    }

    fn resolver_name(&self) -> &'static str {
        "scripted"
    }
}

/// One scripted answer from `find_first`
#[derive(Debug, Clone)]
pub enum LookupStep {
    Found(DnsRecord),
    NotFound,
    Reject(u16),
    NetworkDown,
}

/// A DnsProvider that replays scripts and records every call
#[derive(Clone)]
pub struct MockDnsProvider {
    lookups: Arc<Mutex<VecDeque<LookupStep>>>,
    lookup_fallback: LookupStep,
    create_results: Arc<Mutex<VecDeque<bool>>>,
    update_results: Arc<Mutex<VecDeque<bool>>>,
    update_delay: Option<Duration>,
    find_calls: Arc<AtomicUsize>,
    created: Arc<Mutex<Vec<RecordData>>>,
    update_attempts: Arc<Mutex<Vec<(String, RecordData)>>>,
    completed_updates: Arc<AtomicUsize>,
}

impl MockDnsProvider {
    /// A provider whose lookups always return `record`
    pub fn with_record(record: DnsRecord) -> Self {
        Self::with_lookups(Vec::new(), LookupStep::Found(record))
    }

    /// A provider that replays `steps` for lookups, then answers `fallback`
    pub fn with_lookups(steps: Vec<LookupStep>, fallback: LookupStep) -> Self {
        Self {
            lookups: Arc::new(Mutex::new(steps.into())),
            lookup_fallback: fallback,
            create_results: Arc::new(Mutex::new(VecDeque::new())),
            update_results: Arc::new(Mutex::new(VecDeque::new())),
            update_delay: None,
            find_calls: Arc::new(AtomicUsize::new(0)),
            created: Arc::new(Mutex::new(Vec::new())),
            update_attempts: Arc::new(Mutex::new(Vec::new())),
            completed_updates: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Outcomes for successive `create` calls (`true` = success); default success
    pub fn with_create_results(self, results: Vec<bool>) -> Self {
        *self.create_results.lock().unwrap() = results.into();
        self
    }

    /// Outcomes for successive `update` calls (`true` = success); default success
    pub fn with_update_results(self, results: Vec<bool>) -> Self {
        *self.update_results.lock().unwrap() = results.into();
        self
    }

    /// Make every update take `delay`
    pub fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay = Some(delay);
        self
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn created(&self) -> Vec<RecordData> {
        self.created.lock().unwrap().clone()
    }

    pub fn update_calls(&self) -> usize {
        self.update_attempts.lock().unwrap().len()
    }

    pub fn updates(&self) -> Vec<(String, RecordData)> {
        self.update_attempts.lock().unwrap().clone()
    }

    /// Updates that ran to completion (not dropped mid-flight)
    pub fn completed_updates(&self) -> usize {
        self.completed_updates.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn find_first(&self) -> Result<RecordLookup> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .lookups
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.lookup_fallback.clone());

        match step {
            LookupStep::Found(record) => Ok(RecordLookup::Found(record)),
            LookupStep::NotFound => Ok(RecordLookup::NotFound),
            LookupStep::Reject(status) => {
                Err(Error::provider_rejection("mock", status, "Invalid API key"))
            }
            LookupStep::NetworkDown => Err(Error::network("connection reset")),
        }
    }

    async fn create(&self, record: &RecordData) -> Result<()> {
        self.created.lock().unwrap().push(record.clone());
        let ok = self.create_results.lock().unwrap().pop_front().unwrap_or(true);
        if ok {
            Ok(())
        } else {
            Err(Error::provider_rejection("mock", 500, "create failed"))
        }
    }

    async fn update(&self, id: &str, record: &RecordData) -> Result<()> {
        self.update_attempts
            .lock()
            .unwrap()
            .push((id.to_string(), record.clone()));

        if let Some(delay) = self.update_delay {
            tokio::time::sleep(delay).await;
        }

        let ok = self.update_results.lock().unwrap().pop_front().unwrap_or(true);
        if ok {
            self.completed_updates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        } else {
            Err(Error::provider_rejection("mock", 503, "service unavailable"))
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A HealthNotifier that counts pings
#[derive(Clone, Default)]
pub struct CountingNotifier {
    calls: Arc<AtomicUsize>,
}

impl CountingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl HealthNotifier for CountingNotifier {
    async fn notify(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Interval used by loop tests
pub const INTERVAL_SECS: u64 = 10;

/// A record as the provider would return it
pub fn existing_record(content: &str) -> DnsRecord {
    DnsRecord::new("rec-1", RecordData::a("dns", content, 300))
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config() -> DdnsConfig {
    DdnsConfig::new(
        RecordConfig::new("example.com", "dns"),
        ProviderConfig::porkbun("pk1_test", "sk1_test"),
    )
    .with_engine(EngineConfig {
        interval_secs: INTERVAL_SECS,
        max_init_attempts: 5,
        init_retry_delay_secs: 1,
        event_channel_capacity: 1000,
    })
}

/// Drain every event currently buffered in the channel
pub fn drain_events(rx: &mut mpsc::Receiver<ControllerEvent>) -> Vec<ControllerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Sleep long enough for `ticks` polling ticks to fire (paused-clock tests)
pub async fn run_for_ticks(ticks: u64) {
    tokio::time::sleep(Duration::from_secs(INTERVAL_SECS * ticks + INTERVAL_SECS / 2)).await;
}
