//! JSON payloads returned by the endpoints.

use serde::{Deserialize, Serialize};

use crate::fs::EntryKind;

/// One element of the `/list` response.
///
/// Serializes as `{"type":"file","name":"css/style.css"}`; field order is
/// part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// File or directory.
    #[serde(rename = "type")]
    pub kind: EntryKind,

    /// Path relative to the listed directory, without a leading `/`.
    pub name: String,
}

/// Live device readings returned by `/all`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Free heap in bytes.
    pub heap: u32,

    /// Raw analog input reading.
    pub analog: u32,

    /// GPIO input/output levels as a bitmask.
    pub gpio: u32,
}
