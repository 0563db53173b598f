use std::fmt;
use std::ops::Sub;

use crate::models::RecordKind;

/// Number of objects created on the target during a copy run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub devices: u64,
    pub external_ids: u64,
    pub measurements: u64,
    pub events: u64,
    pub alarms: u64,
}

impl CopyStats {
    /// Count one more record of `kind` and return the new total
    pub fn add_record(&mut self, kind: RecordKind) -> u64 {
        let counter = match kind {
            RecordKind::Measurement => &mut self.measurements,
            RecordKind::Event => &mut self.events,
            RecordKind::Alarm => &mut self.alarms,
        };
        *counter += 1;
        *counter
    }
}

impl Sub for CopyStats {
    type Output = CopyStats;

    fn sub(self, other: CopyStats) -> CopyStats {
        CopyStats {
            devices: self.devices.saturating_sub(other.devices),
            external_ids: self.external_ids.saturating_sub(other.external_ids),
            measurements: self.measurements.saturating_sub(other.measurements),
            events: self.events.saturating_sub(other.events),
            alarms: self.alarms.saturating_sub(other.alarms),
        }
    }
}

impl fmt::Display for CopyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Created {} devices, {} measurements, {} events, {} alarms",
            self.devices, self.measurements, self.events, self.alarms
        )
    }
}
