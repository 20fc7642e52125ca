//! Bit-exact wire renderings of switch-native values.

use crate::switch::{AdminState, AlarmSeverity, PortState};

/// Formats a MAC address held in the low 48 bits of `mac` as six lowercase
/// hex byte pairs separated by `:`.
pub(crate) fn mac_to_string(mac: u64) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        (mac >> 40) & 0xff,
        (mac >> 32) & 0xff,
        (mac >> 24) & 0xff,
        (mac >> 16) & 0xff,
        (mac >> 8) & 0xff,
        mac & 0xff,
    )
}

/// Renders a port speed in bits per second as its YANG identity string.
pub(crate) fn speed_bps_to_string(speed_bps: u64) -> &'static str {
    match speed_bps {
        10_000_000 => "SPEED_10MB",
        100_000_000 => "SPEED_100MB",
        1_000_000_000 => "SPEED_1GB",
        2_500_000_000 => "SPEED_2500MB",
        5_000_000_000 => "SPEED_5GB",
        10_000_000_000 => "SPEED_10GB",
        25_000_000_000 => "SPEED_25GB",
        40_000_000_000 => "SPEED_40GB",
        50_000_000_000 => "SPEED_50GB",
        100_000_000_000 => "SPEED_100GB",
        _ => "SPEED_UNKNOWN",
    }
}

pub(crate) fn port_state_to_string(state: PortState) -> &'static str {
    match state {
        PortState::Up => "UP",
        PortState::Down => "DOWN",
        PortState::Failed => "LOWER_LAYER_DOWN",
        PortState::Unknown => "UNKNOWN",
    }
}

pub(crate) fn admin_state_to_string(state: AdminState) -> &'static str {
    match state {
        AdminState::Enabled => "UP",
        AdminState::Disabled => "DOWN",
        AdminState::Diag => "TESTING",
        AdminState::Unknown => "UNKNOWN",
    }
}

pub(crate) fn severity_to_string(severity: AlarmSeverity) -> &'static str {
    match severity {
        AlarmSeverity::Minor => "MINOR",
        AlarmSeverity::Warning => "WARNING",
        AlarmSeverity::Major => "MAJOR",
        AlarmSeverity::Critical => "CRITICAL",
        AlarmSeverity::Unknown => "UNKNOWN",
    }
}
