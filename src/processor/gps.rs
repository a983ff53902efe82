use crate::{
    constants::{MAX_PSEUDO_RANGE_M, SPEED_OF_LIGHT_M_S},
    measurement::{Measurement, MeasurementState},
    time::ReceptionTime,
};

/// GPS L1 C/A pseudo range (m), from raw receiver time of week.
/// Requires code lock and a resolved time of week.
pub(crate) fn pseudo_range(rx: &ReceptionTime, meas: &Measurement) -> Option<f64> {
    if !meas.state.contains(MeasurementState::CODE_LOCK) || !meas.state.tow_resolved() {
        return None;
    }

    let dt_nanos = (rx.tow_nanos - meas.received_sv_time_nanos) as f64 + rx.fract_nanos;
    let pr = dt_nanos * 1.0E-9 * SPEED_OF_LIGHT_M_S;

    if pr < MAX_PSEUDO_RANGE_M {
        Some(pr)
    } else {
        None
    }
}
