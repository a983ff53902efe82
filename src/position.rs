//! 3D Position coordinates
use map_3d::{ecef2geodetic, geodetic2ecef, rad2deg, Ellipsoid};

use crate::prelude::Vector3;

/// Position is used both as solver state and as apriori knowledge
/// (typically from a coarse location sensor), in either ECEF or Geodetic
/// representation.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct Position {
    /// ECEF coordinates in meters
    pub(crate) ecef: Vector3<f64>,
    /// Geodetic coordinates in radians
    pub(crate) geodetic: Vector3<f64>,
}

impl Position {
    /// Builds new [Position] from ECEF coordinates expressed in meter.
    pub fn from_ecef(ecef: Vector3<f64>) -> Self {
        let (x, y, z) = (ecef[0], ecef[1], ecef[2]);
        let (lat, lon, h) = ecef2geodetic(x, y, z, Ellipsoid::WGS84);
        Self {
            ecef,
            geodetic: Vector3::new(lat, lon, h),
        }
    }
    /// Builds new [Position] from Geodetic coordinates
    /// - latitude [rad]
    /// - longitude [rad]
    /// - altitude above sea level [m]
    pub fn from_geo(geodetic: Vector3<f64>) -> Self {
        let (lat, lon, alt) = (geodetic[0], geodetic[1], geodetic[2]);
        let (x, y, z) = geodetic2ecef(lat, lon, alt, Ellipsoid::WGS84);
        Self {
            geodetic,
            ecef: Vector3::new(x, y, z),
        }
    }
    /// Builds new [Position] from latitude and longitude in decimal degrees,
    /// and altitude above sea level in meters.
    pub fn from_geo_ddeg(lat_ddeg: f64, lon_ddeg: f64, alt_m: f64) -> Self {
        Self::from_geo(Vector3::new(
            lat_ddeg.to_radians(),
            lon_ddeg.to_radians(),
            alt_m,
        ))
    }
    /// Returns ECEF coordinates.
    pub fn ecef(&self) -> Vector3<f64> {
        self.ecef
    }
    /// Returns Geodetic coordinates
    /// - latitude [rad]
    /// - longitude [rad]
    /// - altitude above sea levl [m]
    pub fn geodetic(&self) -> Vector3<f64> {
        self.geodetic
    }
    /// Returns (latitude [ddeg], longitude [ddeg], altitude [m])
    pub fn geodetic_ddeg(&self) -> (f64, f64, f64) {
        (
            rad2deg(self.geodetic[0]),
            rad2deg(self.geodetic[1]),
            self.geodetic[2],
        )
    }
    /// Returns altitude above sea level [m]
    pub fn altitude(&self) -> f64 {
        self.geodetic[2]
    }
    /// Returns local East North Up vector of this ECEF target, seen from [Self].
    pub fn enu(&self, target: &Vector3<f64>) -> Vector3<f64> {
        let d = target - self.ecef;
        let (sin_lat, cos_lat) = self.geodetic[0].sin_cos();
        let (sin_lon, cos_lon) = self.geodetic[1].sin_cos();
        let e = -sin_lon * d[0] + cos_lon * d[1];
        let n = -sin_lat * cos_lon * d[0] - sin_lat * sin_lon * d[1] + cos_lat * d[2];
        let u = cos_lat * cos_lon * d[0] + cos_lat * sin_lon * d[1] + sin_lat * d[2];
        Vector3::new(e, n, u)
    }
    /// Returns (elevation, azimuth) angles in degrees of this ECEF target,
    /// seen from [Self]. Azimuth is expressed in [0, 360[.
    pub fn elevation_azimuth(&self, target: &Vector3<f64>) -> (f64, f64) {
        let enu = self.enu(target);
        let horizontal = (enu[0].powi(2) + enu[1].powi(2)).sqrt();
        let elevation = rad2deg(enu[2].atan2(horizontal));
        let mut azimuth = rad2deg(enu[0].atan2(enu[1]));
        if azimuth < 0.0 {
            azimuth += 360.0;
        }
        (elevation, azimuth)
    }
}

#[cfg(test)]
mod test {
    use super::Position;
    use crate::prelude::Vector3;

    #[test]
    fn ecef_geodetic_roundtrip() {
        let ecef = Vector3::new(4510731.0, 482872.0, 4473531.5);
        let pos = Position::from_ecef(ecef);
        let back = Position::from_geo(pos.geodetic());
        let err = (back.ecef() - ecef).norm();
        assert!(err < 5.0E-3, "roundtrip error {} m", err);
    }

    #[test]
    fn zenith_target() {
        let pos = Position::from_geo_ddeg(45.0, 5.0, 100.0);
        let up = Position::from_geo_ddeg(45.0, 5.0, 20_000_000.0);
        let (elev, _) = pos.elevation_azimuth(&up.ecef());
        assert!((elev - 90.0).abs() < 1.0E-6);
    }

    #[test]
    fn northern_target() {
        let pos = Position::from_geo_ddeg(0.0, 0.0, 0.0);
        let target = Position::from_geo_ddeg(1.0, 0.0, 0.0);
        let (_, azim) = pos.elevation_azimuth(&target.ecef());
        assert!(azim < 1.0E-6 || (360.0 - azim) < 1.0E-6, "azimuth {}", azim);
    }
}
