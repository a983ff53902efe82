/// Earth angular velocity, in WGS84 frame rad/s
pub const EARTH_ANGULAR_VEL_RAD: f64 = 7.2921151467E-5;

/// Earth gravitational constant (m^3 s-2), WGS84 value used by GPS and Galileo ICDs
pub const EARTH_GRAVITATION_MU_M3_S2: f64 = 3.986004418E14;

/// GPS ICD value of the Earth gravitational constant (m^3 s-2)
pub const GPS_GRAVITATION_MU_M3_S2: f64 = 3.986005E14;

/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Pseudo ranges above this value cannot come from a GNSS satellite (m)
pub const MAX_PSEUDO_RANGE_M: f64 = 1.0E9;

/// Number of nanoseconds in one week
pub const NANOS_PER_WEEK: i64 = 604_800_000_000_000;

/// Number of nanoseconds in 100 milliseconds (Galileo E1C secondary code period)
pub const NANOS_PER_100_MILLIS: i64 = 100_000_000;

/// Number of seconds in one week
pub const SECONDS_PER_WEEK: f64 = 604_800.0;

/// GPS L1 / Galileo E1 carrier frequency (Hz)
pub const L1_FREQUENCY_HZ: f64 = 1575.42E6;

/// Standard atmosphere pressure at sea level (mBar)
pub const STANDARD_PRESSURE_MBAR: f64 = 1013.25;

/// Standard atmosphere temperature at sea level (K)
pub const STANDARD_TEMPERATURE_K: f64 = 291.15;
