//! Evaluation of pair interactions over a half neighbor list.
//!
//! Each pair `(i, j)` in a [`LinearList`] is visited exactly once, and its
//! contribution is applied to both particles with opposite signs.

use log::warn;
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut2};

use crate::{Error, LinearList, PairPotential};
use crate::errors::check_positions;
use crate::neighbors::squared_norm;

/// Pairs with a squared distance below this value are reported with a warning
const VERY_CLOSE_SQUARED_DISTANCE: f64 = 1e-6;

/// Masses of the particles used to convert forces to accelerations
#[derive(Debug, Clone, Copy)]
pub enum Masses<'a> {
    /// All particles have the same mass
    Uniform(f64),
    /// One mass per particle
    PerParticle(ArrayView1<'a, f64>),
}

impl From<f64> for Masses<'_> {
    fn from(mass: f64) -> Self {
        Masses::Uniform(mass)
    }
}

impl<'a> From<ArrayView1<'a, f64>> for Masses<'a> {
    /// A single-element array is interpreted as a uniform mass
    fn from(masses: ArrayView1<'a, f64>) -> Self {
        if masses.len() == 1 {
            return Masses::Uniform(masses[0]);
        }
        return Masses::PerParticle(masses);
    }
}

impl Masses<'_> {
    fn validate(&self, n_particles: usize) -> Result<(), Error> {
        match self {
            Masses::Uniform(mass) => {
                if !(*mass > 0.0 && mass.is_finite()) {
                    return Err(Error::InvalidParameter(format!(
                        "mass must be a positive finite number, got {}", mass
                    )));
                }
            }
            Masses::PerParticle(masses) => {
                if masses.len() != n_particles {
                    return Err(Error::InvalidParameter(format!(
                        "expected {} masses, got {}", n_particles, masses.len()
                    )));
                }

                if let Some((particle, mass)) = masses.iter().enumerate().find(|&(_, &m)| !(m > 0.0 && m.is_finite())) {
                    return Err(Error::InvalidParameter(format!(
                        "mass of particle {} must be a positive finite number, got {}", particle, mass
                    )));
                }
            }
        }
        return Ok(());
    }

    #[inline]
    fn get(&self, particle: usize) -> f64 {
        match self {
            Masses::Uniform(mass) => *mass,
            Masses::PerParticle(masses) => masses[particle],
        }
    }
}

/// Check that the list was built for the same number of particles
fn check_list(positions: &ArrayView2<'_, f64>, list: &LinearList) -> Result<(), Error> {
    if list.n_particles() != positions.nrows() {
        return Err(Error::InvalidParameter(format!(
            "the neighbor list contains {} particles, but {} positions were given",
            list.n_particles(), positions.nrows()
        )));
    }
    return Ok(());
}

/// Get the vector from `i` to `j` and its squared norm, checking that the
/// pair can be evaluated.
#[inline]
fn pair_vector(positions: &ArrayView2<'_, f64>, i: usize, j: usize) -> ([f64; 3], f64) {
    let rij = [
        positions[[j, 0]] - positions[[i, 0]],
        positions[[j, 1]] - positions[[i, 1]],
        positions[[j, 2]] - positions[[i, 2]],
    ];
    let r2 = squared_norm(rij[0], rij[1], rij[2]);

    assert!(r2 > 0.0, "particles {} and {} are at the same position", i, j);
    if r2 < VERY_CLOSE_SQUARED_DISTANCE {
        warn!(
            "particles {} and {} are very close to one another ({})",
            i, j, r2.sqrt()
        );
    }

    return (rij, r2);
}

/// Accumulate the accelerations created by the pair `potential` acting on
/// all pairs in the neighbor `list`.
///
/// For every pair `(i, j)`, the force `f = potential.force_factor(r²) * rij`
/// (with `rij = r_j - r_i`) is added to row `i` of `accelerations` and
/// subtracted from row `j`. Every row is then divided by the mass of the
/// corresponding particle.
///
/// `accelerations` is not set to zero before the accumulation: it should
/// either contain zeros, or forces from other sources which will also be
/// divided by the masses.
///
/// # Panics
///
/// If two particles in the list are at exactly the same position.
#[time_graph::instrument(name = "compute_forces")]
pub fn compute_forces<P: PairPotential + ?Sized>(
    positions: ArrayView2<'_, f64>,
    mut accelerations: ArrayViewMut2<'_, f64>,
    masses: Masses<'_>,
    list: &LinearList,
    potential: &P,
) -> Result<(), Error> {
    check_positions(&positions)?;
    check_list(&positions, list)?;
    if accelerations.shape() != positions.shape() {
        return Err(Error::InvalidParameter(format!(
            "accelerations must have the same shape as positions ({:?}), got {:?}",
            positions.shape(), accelerations.shape()
        )));
    }
    masses.validate(positions.nrows())?;

    for (i, j) in list.pairs() {
        let (rij, r2) = pair_vector(&positions, i, j);
        let factor = potential.force_factor(r2);

        for xyz in 0..3 {
            let force = factor * rij[xyz];
            accelerations[[i, xyz]] += force;
            accelerations[[j, xyz]] -= force;
        }
    }

    for (particle, mut acceleration) in accelerations.rows_mut().into_iter().enumerate() {
        acceleration /= masses.get(particle);
    }

    return Ok(());
}

/// Compute the total interaction energy of all pairs in the neighbor `list`
///
/// # Panics
///
/// If two particles in the list are at exactly the same position.
#[time_graph::instrument(name = "compute_interaction_energy")]
pub fn compute_interaction_energy<P: PairPotential + ?Sized>(
    positions: ArrayView2<'_, f64>,
    list: &LinearList,
    potential: &P,
) -> Result<f64, Error> {
    check_positions(&positions)?;
    check_list(&positions, list)?;

    let mut energy = 0.0;
    for (i, j) in list.pairs() {
        let (_, r2) = pair_vector(&positions, i, j);
        energy += potential.energy(r2);
    }

    return Ok(energy);
}
