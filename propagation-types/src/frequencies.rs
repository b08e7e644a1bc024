/// Ordered list of source frequencies (Hz) shared by every per-frequency
/// quantity a propagation run produces. Fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Frequencies(Vec<f64>);

impl Frequencies {
    /// Fails if `values` is empty or contains a non-positive entry.
    pub fn new(values: Vec<f64>) -> Result<Self, String> {
        if values.is_empty() {
            return Err("frequencies must not be empty".to_string());
        }
        if values.iter().any(|&f| f <= 0.0) {
            return Err("frequencies must be positive".to_string());
        }
        Ok(Self(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl std::ops::Index<usize> for Frequencies {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}
