// # ddns-core
//
// Core library for the DDNS reconciliation agent.
//
// ## Architecture Overview
//
// This library keeps one DNS A record pointed at the machine's public IP:
// - **IpResolver**: Trait for looking up the current public IP
// - **DnsProvider**: Trait for finding, creating and updating the record
// - **HealthNotifier**: Trait for the best-effort ping after each cycle
// - **DdnsController**: Initialization protocol and the polling loop
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Controller logic is separate from HTTP plumbing
// 2. **Single Owner**: The tracked record lives inside one polling task
// 3. **Bounded Startup**: Initialization retries a fixed number of times, then fails
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Idempotency**: No provider call is made when the IP has not changed

pub mod traits;
pub mod controller;
pub mod config;
pub mod error;
pub mod record;

// Re-export core types for convenience
pub use traits::{IpResolver, DnsProvider, HealthNotifier, NoopHealthNotifier};
pub use controller::{ControllerEvent, ControllerHandle, DdnsController, TickOutcome};
pub use config::{DdnsConfig, EngineConfig, ProviderConfig, RecordConfig};
pub use error::{Error, Result};
pub use record::{DnsRecord, RecordData, RecordLookup, RecordType};

// Cancellation token type accepted by `DdnsController::start`
pub use tokio_util::sync::CancellationToken;
