//! DNS record model
//!
//! [`DnsRecord`] is a record as it exists at the provider (it has an id).
//! [`RecordData`] is the payload sent to create or edit a record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default TTL applied to managed records (seconds)
pub const DEFAULT_TTL: u32 = 300;

/// DNS record type
///
/// Only address records are managed; the enum exists so the type travels
/// through the API explicitly instead of as a bare string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    A,
}

impl RecordType {
    /// Wire representation of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record fields without a provider-assigned id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordData {
    /// Subdomain label being managed
    pub name: String,
    /// Published IP address
    pub content: String,
    /// Record type (always A)
    pub record_type: RecordType,
    /// Time-to-live in seconds
    pub ttl: u32,
}

impl RecordData {
    /// Create an A record payload
    pub fn a(name: impl Into<String>, content: impl Into<String>, ttl: u32) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            record_type: RecordType::A,
            ttl,
        }
    }
}

/// A record known to exist at the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Provider-assigned identifier
    pub id: String,
    /// Subdomain label being managed
    pub name: String,
    /// Published IP address
    pub content: String,
    /// Record type (always A)
    pub record_type: RecordType,
    /// Time-to-live in seconds
    pub ttl: u32,
}

impl DnsRecord {
    /// Attach a provider id to record data
    pub fn new(id: impl Into<String>, data: RecordData) -> Self {
        Self {
            id: id.into(),
            name: data.name,
            content: data.content,
            record_type: data.record_type,
            ttl: data.ttl,
        }
    }

    /// The record fields without the id
    pub fn data(&self) -> RecordData {
        RecordData {
            name: self.name.clone(),
            content: self.content.clone(),
            record_type: self.record_type,
            ttl: self.ttl,
        }
    }

    /// Copy of this record with new content; id, name, type and ttl are kept
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }
}

/// Outcome of looking up the managed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLookup {
    /// The first matching record
    Found(DnsRecord),
    /// The provider has no matching record yet
    NotFound,
}

impl RecordLookup {
    /// The found record, if any
    pub fn into_record(self) -> Option<DnsRecord> {
        match self {
            RecordLookup::Found(record) => Some(record),
            RecordLookup::NotFound => None,
        }
    }
}
