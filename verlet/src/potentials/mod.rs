//! Pair potentials, giving the interaction energy and force between two
//! particles as a function of their squared distance.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::Error;

mod lennard_jones;
pub use self::lennard_jones::LennardJones;

/// A `PairPotential` is an interaction law between two particles, depending
/// only on the distance between them.
///
/// All functions take the squared distance `r2` between the particles, which
/// must be strictly positive.
pub trait PairPotential: Send + Sync {
    /// Get the interaction energy of two particles at squared distance `r2`
    fn energy(&self, r2: f64) -> f64;

    /// Get the force factor for two particles at squared distance `r2`. The
    /// force on particle `i` from particle `j` is
    /// `force_factor(r2) * (r_j - r_i)`.
    fn force_factor(&self, r2: f64) -> f64;

    /// Get the force on particle `i` from particle `j`, where `rij` is the
    /// vector from `i` to `j`
    fn force(&self, rij: [f64; 3]) -> [f64; 3] {
        let factor = self.force_factor(rij[0] * rij[0] + rij[1] * rij[1] + rij[2] * rij[2]);
        return [factor * rij[0], factor * rij[1], factor * rij[2]];
    }
}

/// A pair potential selected by name, see [`Potential::new`]
pub struct Potential {
    implementation: Box<dyn PairPotential>,
    name: &'static str,
    parameters: String,
}

impl std::fmt::Debug for Potential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Potential")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl Potential {
    /// Create the potential with the given `name` and `parameters`, formatted
    /// as JSON. The only available potential is `"lennard_jones"`.
    ///
    /// # Errors
    ///
    /// This function returns an error if there is no potential with the given
    /// `name`, or if the parameters are invalid for this potential.
    pub fn new(name: &str, parameters: &str) -> Result<Potential, Error> {
        let (&name, creator) = match REGISTERED_POTENTIALS.get_key_value(name) {
            Some(entry) => entry,
            None => {
                return Err(Error::InvalidParameter(
                    format!("unknown pair potential '{}'", name)
                ));
            }
        };

        let (implementation, parameters) = creator(parameters)?;
        return Ok(Potential {
            implementation: implementation,
            name: name,
            parameters: parameters,
        });
    }

    /// Get the name of this potential
    pub fn name(&self) -> &str {
        self.name
    }

    /// Get the parameters used to create this potential, formatted as JSON
    pub fn parameters(&self) -> &str {
        &self.parameters
    }
}

impl PairPotential for Potential {
    #[inline]
    fn energy(&self, r2: f64) -> f64 {
        self.implementation.energy(r2)
    }

    #[inline]
    fn force_factor(&self, r2: f64) -> f64 {
        self.implementation.force_factor(r2)
    }
}

type PotentialCreator = fn(&str) -> Result<(Box<dyn PairPotential>, String), Error>;

macro_rules! add_potential {
    ($map :expr, $name :literal, $type :ty) => (
        $map.insert($name, (|json| {
            let value = serde_json::from_str::<$type>(json)?;
            value.validate()?;
            let parameters = serde_json::to_string(&value)?;
            Ok((Box::new(value) as Box<dyn PairPotential>, parameters))
        }) as PotentialCreator);
    );
}

static REGISTERED_POTENTIALS: Lazy<BTreeMap<&'static str, PotentialCreator>> = Lazy::new(|| {
    let mut map = BTreeMap::new();
    add_potential!(map, "lennard_jones", LennardJones);
    return map;
});

#[cfg(test)]
mod tests {
    use approx::assert_ulps_eq;

    use super::*;

    #[test]
    fn create_by_name() {
        let potential = Potential::new("lennard_jones", r#"{"epsilon": 0.5, "sigma": 2.0}"#).unwrap();
        assert_eq!(potential.name(), "lennard_jones");
        assert_eq!(potential.parameters(), r#"{"epsilon":0.5,"sigma":2.0}"#);

        let reference = LennardJones::new(0.5, 2.0);
        assert_ulps_eq!(potential.energy(3.1), reference.energy(3.1));
        assert_ulps_eq!(potential.force_factor(3.1), reference.force_factor(3.1));

        // default parameters
        let potential = Potential::new("lennard_jones", "{}").unwrap();
        assert_eq!(potential.parameters(), r#"{"epsilon":0.25,"sigma":1.0}"#);
    }

    #[test]
    fn configuration_errors() {
        let error = Potential::new("morse", "{}").unwrap_err();
        assert_eq!(error.to_string(), "invalid parameter: unknown pair potential 'morse'");

        let error = Potential::new("lennard_jones", r#"{"epsilon": -1.0}"#).unwrap_err();
        assert!(matches!(error, Error::InvalidParameter(_)));

        let error = Potential::new("lennard_jones", r#"{"epsilon": "big"}"#).unwrap_err();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn force_vector() {
        let potential = LennardJones::new(1.0, 1.0);
        let rij = [0.3, -1.1, 0.4];
        let factor = potential.force_factor(rij[0] * rij[0] + rij[1] * rij[1] + rij[2] * rij[2]);

        let force = potential.force(rij);
        assert_ulps_eq!(force[0], factor * 0.3);
        assert_ulps_eq!(force[1], factor * -1.1);
        assert_ulps_eq!(force[2], factor * 0.4);
    }
}
