use crate::{
    constants::{NANOS_PER_100_MILLIS, NANOS_PER_WEEK, SPEED_OF_LIGHT_M_S},
    measurement::{Measurement, MeasurementState},
    time::ReceptionTime,
};

/// Galileo E1 pseudo range (m).
/// When the time of week is resolved, the full weekly reception time is used.
/// Otherwise, the E1C secondary code lock gives an unambiguous 100ms time base.
pub(crate) fn pseudo_range(rx: &ReceptionTime, meas: &Measurement) -> Option<f64> {
    let gst_nanos = rx.gps_nanos();

    let dt_nanos = if meas.state.tow_resolved() {
        let tow_nanos = gst_nanos.rem_euclid(NANOS_PER_WEEK);
        (tow_nanos - meas.received_sv_time_nanos) as f64 + rx.fract_nanos
    } else if meas.state.contains(MeasurementState::GAL_E1C_2ND_CODE_LOCK) {
        // sub nanosecond part is folded too, to remain within [0, 100ms[
        let dt_nanos = (gst_nanos - meas.received_sv_time_nanos) as f64 + rx.fract_nanos;
        dt_nanos.rem_euclid(NANOS_PER_100_MILLIS as f64)
    } else {
        return None;
    };

    Some(dt_nanos * 1.0E-9 * SPEED_OF_LIGHT_M_S)
}
