use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use hifitime::Unit;
use log::debug;

use crate::{
    bias::{IonosphereModel, KbModel},
    prelude::{Constellation, Duration, Epoch, SV},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub(crate) mod kepler;

/// Broadcast [Ephemeris] frame: Keplerian elements, harmonic perturbations
/// and clock correction terms, valid around its reference time.
/// Immutable once loaded.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ephemeris {
    /// [SV]
    pub sv: SV,

    /// Time of Ephemeris, that must be expressed in correct timescale
    pub toe: Epoch,

    /// Time of Clock, that must be expressed in correct timescale
    pub toc: Epoch,

    /// Week counter
    pub week: u32,

    /// Square root of the semi-major axis (in m^1/2)
    pub sqrt_a: f64,

    /// Eccentricity
    pub eccentricity: f64,

    /// Mean anomaly at reference time (in radians)
    pub m0_rad: f64,

    /// Mean motion difference (in radians/s)
    pub dn_rad: f64,

    /// Inclination at reference time (in radians)
    pub i0_rad: f64,

    /// Inclination rate (in radians/s)
    pub idot_rad_s: f64,

    /// Longitude of ascending node at weekly epoch (in radians)
    pub omega0_rad: f64,

    /// Argument of perigee (in radians)
    pub omega_rad: f64,

    /// Rate of right ascension (in radians/s)
    pub omega_dot_rad_s: f64,

    /// Sine / Cosine argument of latitude correction (in radians)
    pub cus_cuc_rad: (f64, f64),

    /// Sine / Cosine inclination correction (in radians)
    pub cis_cic_rad: (f64, f64),

    /// Sine / Cosine orbit radius correction (in meters)
    pub crs_crc_m: (f64, f64),

    /// Clock correction polynomial: bias (s), drift (s.s⁻¹), drift rate (s.s⁻²)
    pub clock_polynomials: (f64, f64, f64),

    /// Total group delay (in seconds)
    pub tgd_s: f64,

    /// Health flag, 0 means healthy
    pub health: u32,

    /// Fit interval (in hours), 0 when not specified
    pub fit_interval_h: f64,

    /// Issue of data, ephemeris
    pub iode: u32,

    /// Issue of data, clock
    pub iodc: u32,
}

impl Ephemeris {
    /// Returns semi-major axis (in meters)
    pub fn semi_major_axis_m(&self) -> f64 {
        self.sqrt_a.powi(2)
    }

    /// Returns true if this frame is flagged as healthy
    pub fn is_healthy(&self) -> bool {
        self.health == 0
    }

    /// Returns the maximal time offset to [Self::toe] for this frame to be used.
    /// Half the fit interval, when specified, or the [Constellation] default otherwise.
    pub fn max_dtoe(&self) -> Duration {
        if self.fit_interval_h > 0.0 {
            self.fit_interval_h / 2.0 * Unit::Hour
        } else {
            default_max_dtoe(self.sv.constellation)
        }
    }

    /// Returns True if this [Ephemeris] frame is still valid
    pub fn is_valid(&self, now: Epoch) -> bool {
        (now - self.toe).abs() <= self.max_dtoe()
    }
}

/// Default validity window, when the fit interval is not specified
fn default_max_dtoe(constellation: Constellation) -> Duration {
    match constellation {
        Constellation::Glonass => 950.0 * Unit::Second,
        Constellation::QZSS => 1.0 * Unit::Hour,
        _ => 2.0 * Unit::Hour,
    }
}

/// [EphemerisLookup] result. Unhealthy is a valid answer and is not to
/// be confused with missing data.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EphemerisLookup {
    /// Closest valid [Ephemeris] frame
    Found(Ephemeris),
    /// Closest frame is flagged unhealthy
    Unhealthy,
    /// No frame, or closest frame has expired
    NotFound,
}

/// [EphemerisStore] gathers [Ephemeris] frames, indexed by [SV],
/// and the possible broadcast ionosphere model. It is populated by the
/// navigation message retrieval process, then only read by the solver.
#[derive(Debug, Clone, Default)]
pub struct EphemerisStore {
    frames: HashMap<SV, Vec<Ephemeris>>,
    ionosphere: IonosphereModel,
}

impl EphemerisStore {
    /// Builds a new empty [EphemerisStore]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies and returns [EphemerisStore] with attached Klobuchar model
    pub fn with_klobuchar(&self, kb: KbModel) -> Self {
        let mut s = self.clone();
        s.ionosphere = IonosphereModel::Klobuchar(kb);
        s
    }

    /// Insert a new [Ephemeris] frame. Insertion order is preserved.
    pub fn insert(&mut self, eph: Ephemeris) {
        self.frames.entry(eph.sv).or_default().push(eph);
    }

    /// Total number of frames
    pub fn len(&self) -> usize {
        self.frames.values().map(|frames| frames.len()).sum()
    }

    /// Returns true if this store does not hold any frame
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the broadcast [IonosphereModel]
    pub fn ionosphere(&self) -> IonosphereModel {
        self.ionosphere
    }

    /// Returns the [Ephemeris] frame that is the closest to this [Epoch], for this [SV].
    /// First encountered frame wins in case of equal distance.
    /// Time offset between the query and the [SV] timescale is accounted for.
    pub fn find(&self, t: Epoch, sv: SV) -> EphemerisLookup {
        let mut closest: Option<(&Ephemeris, Duration)> = None;

        for eph in self.frames.get(&sv).into_iter().flatten() {
            let dt = (eph.toe - t).abs();
            match closest {
                Some((_, dt_min)) if dt >= dt_min => {},
                _ => closest = Some((eph, dt)),
            }
        }

        let Some((eph, dt)) = closest else {
            debug!("{}({}) - no ephemeris", t, sv);
            return EphemerisLookup::NotFound;
        };

        if !eph.is_healthy() {
            debug!("{}({}) - unhealthy (health={})", t, sv, eph.health);
            return EphemerisLookup::Unhealthy;
        }

        if dt > eph.max_dtoe() {
            debug!("{}({}) - closest ephemeris has expired (dt={})", t, sv, dt);
            return EphemerisLookup::NotFound;
        }

        EphemerisLookup::Found(*eph)
    }
}

impl Extend<Ephemeris> for EphemerisStore {
    fn extend<I: IntoIterator<Item = Ephemeris>>(&mut self, iter: I) {
        for eph in iter {
            self.insert(eph);
        }
    }
}

impl FromIterator<Ephemeris> for EphemerisStore {
    fn from_iter<I: IntoIterator<Item = Ephemeris>>(iter: I) -> Self {
        let mut s = Self::new();
        s.extend(iter);
        s
    }
}

/// [SharedEphemeris] allows the navigation message retrieval process
/// to reload the [EphemerisStore] while epochs are being processed.
/// Readers work on a snapshot: they observe either the previous or the new
/// [EphemerisStore], never a partial update.
#[derive(Debug, Clone, Default)]
pub struct SharedEphemeris {
    inner: Arc<RwLock<Arc<EphemerisStore>>>,
}

impl SharedEphemeris {
    /// Wraps this [EphemerisStore]
    pub fn new(store: EphemerisStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(store))),
        }
    }

    /// Returns current [EphemerisStore] snapshot
    pub fn snapshot(&self) -> Arc<EphemerisStore> {
        match self.inner.read() {
            Ok(store) => Arc::clone(&store),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replaces the [EphemerisStore] atomically
    pub fn replace(&self, store: EphemerisStore) {
        let store = Arc::new(store);
        match self.inner.write() {
            Ok(mut inner) => *inner = store,
            Err(poisoned) => *poisoned.into_inner() = store,
        }
    }
}
