//! Typed, read-only views over the raw key-value data of each upstream
//! integration. A relation attaching does not guarantee its data has
//! propagated yet, so every view distinguishes "attached" from "configured".

pub mod azure;
pub mod logging;
pub mod pushgateway;
pub mod s3;

use std::collections::BTreeMap;

/// Raw databag of a single relation, snapshotted at event-delivery time.
pub type RelationData = BTreeMap<String, String>;

/// Lifecycle of an object-storage integration as seen by one reconciliation
/// pass. Only [`BackendState::Configured`] contributes keys to the desired
/// configuration; [`BackendState::Invalid`] contributes nothing but forces a
/// blocked status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendState {
    /// No relation attached.
    Absent,
    /// Relation attached but required fields not yet populated.
    Incomplete,
    /// All required fields present (and, for S3, credentials verified).
    Configured,
    /// Required fields present but credential verification failed.
    Invalid,
}
