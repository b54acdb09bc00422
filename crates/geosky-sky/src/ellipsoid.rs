//! Reference ellipsoid: geodetic to ECEF conversion and local up vectors.

use glam::DVec3;

/// An oblate ellipsoid of revolution, radii in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    equatorial_radius: f64,
    polar_radius: f64,
    eccentricity_sq: f64,
}

impl Ellipsoid {
    /// WGS-84 equatorial radius.
    pub const WGS84_EQUATORIAL: f64 = 6_378_137.0;
    /// WGS-84 polar radius.
    pub const WGS84_POLAR: f64 = 6_356_752.314_245;

    pub fn new(equatorial_radius: f64, polar_radius: f64) -> Self {
        let flattening = (equatorial_radius - polar_radius) / equatorial_radius;
        Self {
            equatorial_radius,
            polar_radius,
            eccentricity_sq: 2.0 * flattening - flattening * flattening,
        }
    }

    pub fn wgs84() -> Self {
        Self::new(Self::WGS84_EQUATORIAL, Self::WGS84_POLAR)
    }

    /// The moon's own, slightly oblate, figure.
    pub fn moon() -> Self {
        Self::new(1_738_140.0, 1_735_970.0)
    }

    pub fn equatorial_radius(&self) -> f64 {
        self.equatorial_radius
    }

    pub fn polar_radius(&self) -> f64 {
        self.polar_radius
    }

    /// Convert geodetic latitude/longitude (radians) and height above the
    /// ellipsoid (meters) to an ECEF position.
    pub fn geodetic_to_ecef(&self, latitude: f64, longitude: f64, height: f64) -> DVec3 {
        let sin_lat = latitude.sin();
        let cos_lat = latitude.cos();
        let n = self.equatorial_radius / (1.0 - self.eccentricity_sq * sin_lat * sin_lat).sqrt();
        DVec3::new(
            (n + height) * cos_lat * longitude.cos(),
            (n + height) * cos_lat * longitude.sin(),
            (n * (1.0 - self.eccentricity_sq) + height) * sin_lat,
        )
    }

    /// The geodetic surface normal at an ECEF position.
    pub fn local_up(&self, ecef: DVec3) -> DVec3 {
        let latitude = self.geodetic_latitude(ecef);
        let longitude = ecef.y.atan2(ecef.x);
        DVec3::new(
            latitude.cos() * longitude.cos(),
            latitude.cos() * longitude.sin(),
            latitude.sin(),
        )
    }

    /// Geodetic latitude of an ECEF position (Bowring's single iteration).
    fn geodetic_latitude(&self, ecef: DVec3) -> f64 {
        let a = self.equatorial_radius;
        let b = self.polar_radius;
        let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
        if p < 1e-9 {
            return if ecef.z >= 0.0 {
                std::f64::consts::FRAC_PI_2
            } else {
                -std::f64::consts::FRAC_PI_2
            };
        }
        let ep_sq = (a * a - b * b) / (b * b);
        let theta = (ecef.z * a).atan2(p * b);
        let (sin_t, cos_t) = theta.sin_cos();
        (ecef.z + ep_sq * b * sin_t.powi(3)).atan2(p - self.eccentricity_sq * a * cos_t.powi(3))
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl From<&geosky_config::EllipsoidConfig> for Ellipsoid {
    fn from(config: &geosky_config::EllipsoidConfig) -> Self {
        Self::new(config.equatorial_radius_m, config.polar_radius_m)
    }
}
