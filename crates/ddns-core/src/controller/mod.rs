//! Reconciliation controller
//!
//! The DdnsController is responsible for:
//! - Establishing the one authoritative DNS record (find, or create then find)
//! - Periodically comparing the public IP with the record content
//! - Pushing an update when they differ
//! - Pinging the health notifier after each successful cycle
//!
//! ## Architecture
//!
//! ```text
//!                ┌────────────────┐
//!                │ DdnsController │── ControllerEvent ──▶ (event sink)
//!                └────────────────┘
//!                        │
//!      ┌─────────────────┼──────────────────┐
//!      ▼                 ▼                  ▼
//! ┌────────────┐   ┌─────────────┐   ┌────────────────┐
//! │ IpResolver │   │ DnsProvider │   │ HealthNotifier │
//! │ (resolve)  │   │ (find/      │   │ (notify)       │
//! │            │   │  create/    │   │                │
//! │            │   │  update)    │   │                │
//! └────────────┘   └─────────────┘   └────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized → Discovering → {Found, Creating} → Ready → Polling → Stopped
//! ```
//!
//! [`DdnsController::start`] runs initialization in the caller's task and,
//! once a record is known, moves the controller into a spawned polling task.
//! The tracked record lives only inside that task. The returned
//! [`ControllerHandle`] resolves after the task has signalled completion.

use crate::config::{DdnsConfig, EngineConfig, RecordConfig};
use crate::error::{Error, Result};
use crate::record::{DnsRecord, RecordData, RecordLookup};
use crate::traits::{DnsProvider, HealthNotifier, IpResolver};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Events emitted by the DdnsController
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// An initialization attempt started
    DiscoveryStarted {
        attempt: usize,
    },

    /// The provider returned an existing record
    RecordFound {
        record_id: String,
        content: String,
    },

    /// A missing record was created
    RecordCreated {
        name: String,
        content: String,
    },

    /// An initialization attempt failed and will be retried if budget remains
    DiscoveryFailed {
        attempt: usize,
        error: String,
    },

    /// Initialization finished; polling is about to start
    Ready {
        record_id: String,
        content: String,
    },

    /// A polling tick started
    TickStarted,

    /// A polling tick finished (or was abandoned on cancellation)
    TickFinished,

    /// The IP lookup failed; nothing else happened this tick
    TickSkipped {
        reason: String,
    },

    /// The record already carries the current IP
    IpUnchanged {
        ip: String,
    },

    /// The record was updated to a new IP
    RecordUpdated {
        record_id: String,
        previous_ip: String,
        new_ip: String,
    },

    /// The provider refused or failed the update
    UpdateFailed {
        record_id: String,
        new_ip: String,
        error: String,
    },

    /// The health notifier was invoked
    HealthNotified,

    /// The polling task stopped
    Stopped {
        reason: String,
    },
}

/// Result of a single polling tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Current IP matches the tracked record; no provider call was made
    Unchanged,
    /// The provider accepted the update; this record replaces the tracked one
    Updated(DnsRecord),
    /// The IP lookup failed; the tick was skipped
    Skipped,
    /// The update was rejected or failed; the tracked record stays as it was
    UpdateFailed,
}

/// Core reconciliation controller
///
/// Keeps one A record's content equal to the machine's public IP.
///
/// ## Threading
///
/// After [`start`](Self::start) the controller is owned by a single spawned
/// task. Ticks never overlap: the next tick is scheduled one full interval
/// after the previous one completes.
pub struct DdnsController {
    /// Public IP lookup
    resolver: Box<dyn IpResolver>,

    /// DNS provider for the managed record
    provider: Box<dyn DnsProvider>,

    /// Health-check ping
    notifier: Box<dyn HealthNotifier>,

    /// The managed record
    record: RecordConfig,

    /// Polling and retry settings
    engine: EngineConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<ControllerEvent>,
}

impl DdnsController {
    /// Create a new controller
    ///
    /// # Returns
    ///
    /// A tuple of (controller, event_receiver) where event_receiver yields controller events
    pub fn new(
        resolver: Box<dyn IpResolver>,
        provider: Box<dyn DnsProvider>,
        notifier: Box<dyn HealthNotifier>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<ControllerEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let controller = Self {
            resolver,
            provider,
            notifier,
            record: config.record,
            engine: config.engine,
            event_tx: tx,
        };

        Ok((controller, rx))
    }

    /// Initialize, then spawn the polling task
    ///
    /// # Returns
    ///
    /// - `Ok(ControllerHandle)`: polling has started
    /// - `Err(Error)`: initialization failed; nothing was spawned
    pub async fn start(self, cancel: CancellationToken) -> Result<ControllerHandle> {
        let record = self.initialize(&cancel).await?;

        self.emit_event(ControllerEvent::Ready {
            record_id: record.id.clone(),
            content: record.content.clone(),
        });

        let (done_tx, done_rx) = oneshot::channel();
        let task = tokio::spawn(self.run_loop(record, cancel, done_tx));

        Ok(ControllerHandle {
            done: done_rx,
            task,
        })
    }

    /// Establish the authoritative record
    ///
    /// Runs at most `max_init_attempts` discover-or-create attempts:
    ///
    /// 1. Look the record up. Found → done.
    /// 2. Not found → resolve the public IP and create the record. A
    ///    successful create uses up the attempt and the next attempt
    ///    re-queries to learn the provider-assigned id. A failed IP lookup
    ///    or create counts as a failure and is retried after
    ///    `init_retry_delay_secs`.
    /// 3. Any lookup error other than "not found" aborts immediately and is
    ///    returned unchanged.
    ///
    /// Returns `Error::Cancelled` if the token fires first.
    pub async fn initialize(&self, cancel: &CancellationToken) -> Result<DnsRecord> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Cancellation requested during initialization");
                Err(Error::Cancelled)
            }
            result = self.discover_or_create() => result,
        }
    }

    async fn discover_or_create(&self) -> Result<DnsRecord> {
        let max_attempts = self.engine.max_init_attempts;
        let fqdn = self.record.fqdn();
        let mut failures = 0;
        let mut last_error: Option<String> = None;

        for attempt in 1..=max_attempts {
            info!(attempt, max_attempts, record = %fqdn, "Looking up DNS record");
            self.emit_event(ControllerEvent::DiscoveryStarted { attempt });

            let lookup = self.provider.find_first().await.inspect_err(|e| {
                error!(record = %fqdn, error = %e, "Record lookup failed, aborting initialization");
            })?;

            if let RecordLookup::Found(record) = lookup {
                info!(record_id = %record.id, content = %record.content, "Record found");
                self.emit_event(ControllerEvent::RecordFound {
                    record_id: record.id.clone(),
                    content: record.content.clone(),
                });
                return Ok(record);
            }

            info!(record = %fqdn, "No record found, creating one");

            let failure = match self.resolver.resolve().await {
                Ok(ip) => {
                    let data = RecordData::a(self.record.subdomain.clone(), ip, self.record.ttl);
                    match self.provider.create(&data).await {
                        Ok(()) => {
                            info!(record = %fqdn, content = %data.content, "Record created");
                            self.emit_event(ControllerEvent::RecordCreated {
                                name: data.name,
                                content: data.content,
                            });
                            continue;
                        }
                        Err(e) => {
                            warn!(attempt, error = %e, "Failed to create record, retrying");
                            e
                        }
                    }
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Failed to get public IP");
                    e
                }
            };

            failures += 1;
            self.emit_event(ControllerEvent::DiscoveryFailed {
                attempt,
                error: failure.to_string(),
            });
            last_error = Some(failure.to_string());

            if attempt < max_attempts && self.engine.init_retry_delay_secs > 0 {
                tokio::time::sleep(self.engine.init_retry_delay()).await;
            }
        }

        let last_error =
            last_error.unwrap_or_else(|| "record still missing after create".to_string());
        error!(
            attempts = max_attempts,
            failures,
            error = %last_error,
            "Failed to initialize DNS record"
        );

        Err(Error::InitializationFailed {
            attempts: max_attempts,
            failures,
            last_error,
        })
    }

    /// Run one polling tick against the tracked record
    ///
    /// Never fails: every error is logged, reported as an event and folded
    /// into the returned [`TickOutcome`]. The caller replaces its tracked
    /// record only on [`TickOutcome::Updated`].
    pub async fn reconcile(&self, tracked: &DnsRecord) -> TickOutcome {
        let ip = match self.resolver.resolve().await {
            Ok(ip) => ip,
            Err(e) => {
                warn!(
                    resolver = self.resolver.resolver_name(),
                    error = %e,
                    "Failed to get public IP, skipping tick"
                );
                self.emit_event(ControllerEvent::TickSkipped {
                    reason: e.to_string(),
                });
                return TickOutcome::Skipped;
            }
        };

        info!(ip = %ip, "IP address retrieved");

        if ip == tracked.content {
            debug!(ip = %ip, "IP address has not changed");
            self.emit_event(ControllerEvent::IpUnchanged { ip });
            self.notify_health().await;
            return TickOutcome::Unchanged;
        }

        debug!(previous = %tracked.content, current = %ip, "IP address has changed");

        let updated = tracked.with_content(ip);
        match self.provider.update(&updated.id, &updated.data()).await {
            Ok(()) => {
                info!(
                    provider = self.provider.provider_name(),
                    record_id = %updated.id,
                    previous = %tracked.content,
                    current = %updated.content,
                    "DNS record updated"
                );
                self.emit_event(ControllerEvent::RecordUpdated {
                    record_id: updated.id.clone(),
                    previous_ip: tracked.content.clone(),
                    new_ip: updated.content.clone(),
                });
                self.notify_health().await;
                TickOutcome::Updated(updated)
            }
            Err(e) => {
                error!(
                    provider = self.provider.provider_name(),
                    record_id = %updated.id,
                    error = %e,
                    "Failed to update DNS record"
                );
                self.emit_event(ControllerEvent::UpdateFailed {
                    record_id: updated.id,
                    new_ip: updated.content,
                    error: e.to_string(),
                });
                TickOutcome::UpdateFailed
            }
        }
    }

    /// Polling task body
    ///
    /// Waits one interval, runs a tick, repeats. Cancellation is observed
    /// both while waiting and while a tick is in flight; an in-flight tick
    /// is abandoned and the tracked record keeps its last confirmed value.
    async fn run_loop(
        self,
        mut tracked: DnsRecord,
        cancel: CancellationToken,
        done: oneshot::Sender<()>,
    ) {
        let interval = self.engine.interval();
        info!(
            interval_secs = self.engine.interval_secs,
            record_id = %tracked.id,
            "Starting reconciliation loop"
        );

        let reason = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break "Cancellation requested",
                _ = tokio::time::sleep(interval) => {}
            }

            debug!("tick");
            self.emit_event(ControllerEvent::TickStarted);

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                outcome = self.reconcile(&tracked) => Some(outcome),
            };

            self.emit_event(ControllerEvent::TickFinished);

            match outcome {
                None => break "Cancellation requested during tick",
                Some(TickOutcome::Updated(record)) => tracked = record,
                Some(_) => {}
            }
        };

        info!(reason, "Stopping reconciliation loop");
        self.emit_event(ControllerEvent::Stopped {
            reason: reason.to_string(),
        });

        if done.send(()).is_err() {
            debug!("Completion handle dropped before shutdown finished");
        }
    }

    async fn notify_health(&self) {
        self.notifier.notify().await;
        self.emit_event(ControllerEvent::HealthNotified);
    }

    /// Emit a controller event
    fn emit_event(&self, event: ControllerEvent) {
        // Never block a tick on a slow consumer
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

/// Completion handle for a started controller
///
/// Resolves once the polling task has stopped. The task signals completion
/// exactly once, after its last provider call has returned or been dropped.
#[derive(Debug)]
pub struct ControllerHandle {
    done: oneshot::Receiver<()>,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    /// Wait for the polling task to stop
    ///
    /// Returns an error only if the task died without signalling completion
    /// (for example, a panic inside a collaborator).
    pub async fn wait(self) -> Result<()> {
        match self.done.await {
            Ok(()) => {
                // The task exits right after signalling; reap it.
                let _ = self.task.await;
                Ok(())
            }
            Err(_) => match self.task.await {
                Err(e) => Err(Error::Other(format!("Controller task failed: {}", e))),
                Ok(()) => Err(Error::Other(
                    "Controller task exited without signalling completion".to_string(),
                )),
            },
        }
    }

    /// Whether the polling task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_compare_by_value() {
        let event = ControllerEvent::RecordUpdated {
            record_id: "42".to_string(),
            previous_ip: "1.2.3.4".to_string(),
            new_ip: "5.6.7.8".to_string(),
        };
        assert_eq!(event.clone(), event);
        assert_ne!(event, ControllerEvent::TickStarted);
    }

    #[test]
    fn only_updated_outcome_carries_record() {
        let record = DnsRecord::new("1", RecordData::a("dns", "5.6.7.8", 300));
        match TickOutcome::Updated(record.clone()) {
            TickOutcome::Updated(r) => assert_eq!(r, record),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
