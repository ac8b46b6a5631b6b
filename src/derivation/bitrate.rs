//! Bit rate unit conversion and rendering.

const KBPS: u64 = 1_000;
const MBPS: u64 = 1_000_000;
const GBPS: u64 = 1_000_000_000;

/// Normalize a (value, unit) pair from a raw document to bits per second.
///
/// Unknown units are treated as already being bps.
pub fn to_bps(value: u64, unit: &str) -> u64 {
    match unit.to_ascii_lowercase().as_str() {
        "kbps" => value.saturating_mul(KBPS),
        "mbps" => value.saturating_mul(MBPS),
        "gbps" => value.saturating_mul(GBPS),
        _ => value,
    }
}

/// Render a bps value as a human-readable rate string.
///
/// The value is truncated (integer division), never rounded: 2,500,000 bps
/// renders as "2 Mbps".
pub fn format_bitrate(bps: u64) -> String {
    if bps >= GBPS {
        format!("{} Gbps", bps / GBPS)
    } else if bps >= MBPS {
        format!("{} Mbps", bps / MBPS)
    } else if bps >= KBPS {
        format!("{} Kbps", bps / KBPS)
    } else {
        format!("{} bps", bps)
    }
}
