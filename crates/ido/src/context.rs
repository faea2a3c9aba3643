/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Per-request state.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use uuid::Uuid;

/// A timestamp made unique within a request by a sequence number.
///
/// Two stamps taken within the same clock tick still order correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp {
    pub at: DateTime<Utc>,
    pub seq: u64,
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}",
            self.at.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.seq
        )
    }
}

/// Identity and timing of one request.
///
/// Owned by the request; nothing here is shared between requests.
#[derive(Debug, Clone)]
pub struct RequestContext {
    id: Uuid,
    started_at: DateTime<Utc>,
    sequence: u64,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            started_at: Utc::now(),
            sequence: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Number of stamps issued so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Take the next stamp.
    pub fn stamp(&mut self) -> Stamp {
        self.sequence += 1;
        Stamp {
            at: Utc::now(),
            seq: self.sequence,
        }
    }

    /// Milliseconds since the request started.
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}
