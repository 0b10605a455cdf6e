use serde::Serialize;

/// Energy split by interaction type. `total` is always the sum of the three parts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EnergyBreakdown {
    pub heisenberg: f64,
    pub dmi: f64,
    pub anisotropy: f64,
}

impl EnergyBreakdown {
    pub fn new(heisenberg: f64, dmi: f64, anisotropy: f64) -> Self {
        Self {
            heisenberg,
            dmi,
            anisotropy,
        }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.heisenberg + self.dmi + self.anisotropy
    }

    pub fn is_finite(&self) -> bool {
        self.heisenberg.is_finite() && self.dmi.is_finite() && self.anisotropy.is_finite()
    }
}
