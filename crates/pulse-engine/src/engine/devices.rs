use std::fs;
use std::io;
use std::path::Path;

/// One outbound call is parameterized by a single device identity: four opaque
/// string fields parsed from one `did:iid:cdid:openudid` line of the pool file.
/// Field contents are never validated; garbage-in is passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub install_id: String,
    pub client_device_id: String,
    pub open_udid: String,
}

impl DeviceIdentity {
    /// Parse one pool line. A line with fewer than four colon-separated fields
    /// is kept with the missing trailing fields empty rather than rejected.
    pub fn parse_line(line: &str) -> Self {
        let mut fields = line.split(':');
        Self {
            device_id: fields.next().unwrap_or_default().to_string(),
            install_id: fields.next().unwrap_or_default().to_string(),
            client_device_id: fields.next().unwrap_or_default().to_string(),
            open_udid: fields.next().unwrap_or_default().to_string(),
        }
    }
}

/// Load the device pool from `path`. Blank and whitespace-only lines are
/// discarded; everything else becomes an identity. The caller decides what an
/// unreadable file means (the dispatch loop treats it as an empty pool).
pub fn load_devices(path: &Path) -> io::Result<Vec<DeviceIdentity>> {
    let raw = fs::read_to_string(path)?;
    Ok(raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(DeviceIdentity::parse_line)
        .collect())
}
