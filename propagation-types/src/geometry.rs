//! Spherical-earth coordinates and the small 2D grid container shared by
//! every per-ray quantity in the wavefront.

use std::f64::consts::{PI, TAU};

/// Mean earth radius, meters. All `rho` values are measured from the
/// center of the earth, so a point at sea level has `rho == EARTH_RADIUS_METERS`.
pub const EARTH_RADIUS_METERS: f64 = 6_378_101.030_201_4;

/// A point in spherical-earth coordinates: radial distance from the
/// earth's center (`rho`, meters), colatitude (`theta`, radians, 0 at the
/// north pole), and longitude (`phi`, radians, east positive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WPosition {
    pub rho: f64,
    pub theta: f64,
    pub phi: f64,
}

impl WPosition {
    pub fn new(rho: f64, theta: f64, phi: f64) -> Self {
        Self { rho, theta, phi }
    }

    /// Build from latitude/longitude (degrees) and depth (meters, positive down).
    pub fn from_lat_lon_depth(lat_deg: f64, lon_deg: f64, depth_m: f64) -> Self {
        Self {
            rho: EARTH_RADIUS_METERS - depth_m,
            theta: (90.0 - lat_deg).to_radians(),
            phi: lon_deg.to_radians(),
        }
    }

    pub fn latitude_deg(&self) -> f64 {
        90.0 - self.theta.to_degrees()
    }

    pub fn longitude_deg(&self) -> f64 {
        self.phi.to_degrees()
    }

    /// Altitude above sea level, meters (negative below surface).
    pub fn altitude(&self) -> f64 {
        self.rho - EARTH_RADIUS_METERS
    }

    /// Straight-line (chord) distance in meters between two points,
    /// accounting for both angular separation and any difference in `rho`.
    /// Used for per-step path length, not great-circle range.
    pub fn straight_line_distance(&self, other: &WPosition) -> f64 {
        let (x1, y1, z1) = self.cartesian();
        let (x2, y2, z2) = other.cartesian();
        ((x1 - x2).powi(2) + (y1 - y2).powi(2) + (z1 - z2).powi(2)).sqrt()
    }

    fn cartesian(&self) -> (f64, f64, f64) {
        let sin_theta = self.theta.sin();
        (
            self.rho * sin_theta * self.phi.cos(),
            self.rho * sin_theta * self.phi.sin(),
            self.rho * self.theta.cos(),
        )
    }

    /// Great-circle range (meters) and bearing (radians, clockwise from
    /// north) from `self` to `other`, using the haversine formula.
    pub fn gc_range(&self, other: &WPosition) -> (f64, f64) {
        let lat1 = PI / 2.0 - self.theta;
        let lat2 = PI / 2.0 - other.theta;
        let dlat = lat2 - lat1;
        let dlon = other.phi - self.phi;

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        let range = self.rho * c;

        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        let mut bearing = y.atan2(x);
        if bearing < 0.0 {
            bearing += TAU;
        }
        (range, bearing)
    }
}

/// Normalized slowness vector: the propagation direction divided by the
/// local sound speed. Components are expressed in the same (rho, theta,
/// phi) basis as `WPosition`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Slowness {
    pub rho: f64,
    pub theta: f64,
    pub phi: f64,
}

impl Slowness {
    pub fn new(rho: f64, theta: f64, phi: f64) -> Self {
        Self { rho, theta, phi }
    }

    /// Build a unit (east, north, up) direction from depression/elevation
    /// and azimuth angles (degrees), not yet normalized by sound speed.
    pub fn from_de_az_deg(de_deg: f64, az_deg: f64) -> Self {
        let de = de_deg.to_radians();
        let az = az_deg.to_radians();
        let (sin_de, cos_de) = de.sin_cos();
        let (sin_az, cos_az) = az.sin_cos();
        Self {
            rho: sin_de,
            theta: -cos_de * cos_az,
            phi: cos_de * sin_az,
        }
    }

    pub fn scale(&self, s: f64) -> Self {
        Self {
            rho: self.rho * s,
            theta: self.theta * s,
            phi: self.phi * s,
        }
    }

    pub fn norm(&self) -> f64 {
        (self.rho * self.rho + self.theta * self.theta + self.phi * self.phi).sqrt()
    }
}

/// Gradient of a scalar field (sound speed, boundary height, ...) expressed
/// in the (rho, theta, phi) basis. Shares `Slowness`'s shape but is kept as
/// a distinct type since the two are never interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gradient3 {
    pub rho: f64,
    pub theta: f64,
    pub phi: f64,
}

impl Gradient3 {
    pub fn new(rho: f64, theta: f64, phi: f64) -> Self {
        Self { rho, theta, phi }
    }
}

/// Time derivative of a position or slowness vector, in the (rho, theta,
/// phi) basis. Distinct type from `Slowness`/`Gradient3` purely to keep
/// call sites self-documenting about what's being differentiated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rate3 {
    pub rho: f64,
    pub theta: f64,
    pub phi: f64,
}

impl Rate3 {
    pub fn new(rho: f64, theta: f64, phi: f64) -> Self {
        Self { rho, theta, phi }
    }
}

/// A fixed-size 2D grid indexed `[de_index][az_index]`, used for every
/// per-ray quantity a `WaveState` carries. Kept as a thin wrapper over
/// nested `Vec`s rather than a matrix crate so indexing stays
/// self-documenting at call sites.
#[derive(Debug, Clone)]
pub struct Grid2D<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid2D<T> {
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }
}

impl<T: Default + Clone> Grid2D<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::default())
    }
}

impl<T> Grid2D<T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[i * self.cols + j]
    }

    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        &mut self.data[i * self.cols + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self.data[i * self.cols + j] = value;
    }

    pub fn iter_indices(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        (0..self.rows).flat_map(move |i| (0..cols).map(move |j| (i, j)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn altitude_round_trips_depth() {
        let p = WPosition::from_lat_lon_depth(10.0, -20.0, 1000.0);
        assert!((p.altitude() + 1000.0).abs() < 1e-6);
    }

    #[test]
    fn straight_line_distance_same_point_is_zero() {
        let p = WPosition::from_lat_lon_depth(10.0, 20.0, 500.0);
        assert!(p.straight_line_distance(&p).abs() < 1e-9);
    }

    #[test]
    fn gc_range_same_point_is_zero() {
        let p = WPosition::from_lat_lon_depth(45.0, 45.0, 0.0);
        let (range, _) = p.gc_range(&p);
        assert!(range.abs() < 1e-6);
    }

    #[test]
    fn gc_range_one_degree_latitude_matches_earth_radius() {
        let a = WPosition::from_lat_lon_depth(0.0, 0.0, 0.0);
        let b = WPosition::from_lat_lon_depth(1.0, 0.0, 0.0);
        let (range, bearing) = a.gc_range(&b);
        let expected = EARTH_RADIUS_METERS * 1.0_f64.to_radians();
        assert!((range - expected).abs() < 1.0);
        assert!(bearing.abs() < 1e-6);
    }

    #[test]
    fn grid2d_indexes_row_major() {
        let mut g: Grid2D<f64> = Grid2D::new(3, 4);
        g.set(2, 3, 9.0);
        assert_eq!(*g.get(2, 3), 9.0);
        assert_eq!(g.iter_indices().count(), 12);
    }
}
