use crate::Error;

use super::PairPotential;

/// Lennard-Jones potential
///
/// $$ V(r) = 4 \epsilon \left[ \left(\frac{\sigma}{r}\right)^{12} - \left(\frac{\sigma}{r}\right)^6 \right] $$
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LennardJones {
    /// Depth of the potential well
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Distance at which the potential is zero
    #[serde(default = "default_sigma")]
    pub sigma: f64,
}

fn default_epsilon() -> f64 { 0.25 }
fn default_sigma() -> f64 { 1.0 }

impl Default for LennardJones {
    fn default() -> LennardJones {
        LennardJones::new(default_epsilon(), default_sigma())
    }
}

impl LennardJones {
    /// Create a new Lennard-Jones potential with the given parameters
    pub fn new(epsilon: f64, sigma: f64) -> LennardJones {
        LennardJones {
            epsilon: epsilon,
            sigma: sigma,
        }
    }

    /// Check that both parameters are positive and finite
    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [("epsilon", self.epsilon), ("sigma", self.sigma)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(Error::InvalidParameter(format!(
                    "Lennard-Jones {} must be a positive finite number, got {}", name, value
                )));
            }
        }
        return Ok(());
    }

    /// Get the distance at which the energy is minimal (and the force is
    /// zero), `2^(1/6) sigma`
    pub fn equilibrium_distance(&self) -> f64 {
        f64::powf(2.0, 1.0 / 6.0) * self.sigma
    }
}

impl PairPotential for LennardJones {
    #[inline]
    fn energy(&self, r2: f64) -> f64 {
        debug_assert!(r2 > 0.0, "Lennard-Jones energy is not defined at r = 0");
        let rm2 = self.sigma * self.sigma / r2;
        let rm6 = rm2 * rm2 * rm2;
        4.0 * self.epsilon * (rm6 - 1.0) * rm6
    }

    #[inline]
    fn force_factor(&self, r2: f64) -> f64 {
        debug_assert!(r2 > 0.0, "Lennard-Jones force is not defined at r = 0");
        let sigma2 = self.sigma * self.sigma;
        let rm2 = sigma2 / r2;
        let rm6 = rm2 * rm2 * rm2;
        24.0 * self.epsilon / sigma2 * rm6 * rm2 * (1.0 - 2.0 * rm6)
    }
}
