//! Raw receiver measurements
use bitflags::bitflags;

use crate::{prelude::SV, time::ReceiverClock};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    /// Receiver tracking state, reported per measurement.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct MeasurementState: u32 {
        const CODE_LOCK = 0x01;
        const BIT_SYNC = 0x02;
        const SUBFRAME_SYNC = 0x04;
        const TOW_DECODED = 0x08;
        const MSEC_AMBIGUOUS = 0x10;
        const SYMBOL_SYNC = 0x20;
        const GLO_STRING_SYNC = 0x40;
        const GLO_TOD_DECODED = 0x80;
        const BDS_D2_BIT_SYNC = 0x100;
        const BDS_D2_SUBFRAME_SYNC = 0x200;
        const GAL_E1BC_CODE_LOCK = 0x400;
        const GAL_E1C_2ND_CODE_LOCK = 0x800;
        const GAL_E1B_PAGE_SYNC = 0x1000;
        const SBAS_SYNC = 0x2000;
        const TOW_KNOWN = 0x4000;
        const GLO_TOD_KNOWN = 0x8000;
        const SECOND_CODE_LOCK = 0x10000;
    }
}

impl MeasurementState {
    /// Time of week is either decoded or known
    pub fn tow_resolved(&self) -> bool {
        self.intersects(Self::TOW_DECODED | Self::TOW_KNOWN)
    }
}

/// Raw [Measurement] for a single [SV], immutable per epoch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    /// [SV] (satellite id and constellation)
    pub sv: SV,
    /// Carrier frequency (Hz), when reported
    pub carrier_frequency_hz: Option<f64>,
    /// Carrier to noise density ratio (dB.Hz)
    pub cn0_dbhz: f64,
    /// Tracking [MeasurementState]
    pub state: MeasurementState,
    /// Received satellite time (ns), within the week
    /// or the code period depending on [MeasurementState]
    pub received_sv_time_nanos: i64,
    /// Measurement time offset with respect to the clock time (ns)
    pub time_offset_nanos: f64,
}

/// [MeasurementEvent] gathers all [Measurement]s sampled at the same receiver clock time.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeasurementEvent {
    /// [ReceiverClock] block
    pub clock: ReceiverClock,
    /// Per [SV] [Measurement]s
    pub measurements: Vec<Measurement>,
}
