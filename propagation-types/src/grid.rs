/// The fan of launch angles a wavefront is initialized with: depression/
/// elevation angles (degrees, positive up) crossed with azimuth angles
/// (degrees, clockwise from true north). The cross product defines an
/// `num_de() x num_az()` grid of rays.
#[derive(Debug, Clone, PartialEq)]
pub struct RayGrid {
    de_deg: Vec<f64>,
    az_deg: Vec<f64>,
}

impl RayGrid {
    /// Fails if either axis is empty.
    pub fn new(de_deg: Vec<f64>, az_deg: Vec<f64>) -> Result<Self, String> {
        if de_deg.is_empty() {
            return Err("DE fan must not be empty".to_string());
        }
        if az_deg.is_empty() {
            return Err("AZ fan must not be empty".to_string());
        }
        Ok(Self { de_deg, az_deg })
    }

    pub fn num_de(&self) -> usize {
        self.de_deg.len()
    }

    pub fn num_az(&self) -> usize {
        self.az_deg.len()
    }

    pub fn de_deg(&self, i: usize) -> f64 {
        self.de_deg[i]
    }

    pub fn az_deg(&self, j: usize) -> f64 {
        self.az_deg[j]
    }
}
