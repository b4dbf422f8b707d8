use ndarray::Array2;

use crate::cubic_lattice;

/// Five particles at 0, 1, 2, 3 and 4 along the given `axis`
pub fn collinear(axis: usize) -> Array2<f64> {
    let mut positions = Array2::zeros((5, 3));
    for i in 0..5 {
        positions[[i, axis]] = i as f64;
    }
    return positions;
}

/// A cubic lattice where every particle is displaced by up to `jitter` along
/// each axis. The displacements are deterministic, so tests are reproducible.
pub fn disordered(shape: [usize; 3], spacing: f64, jitter: f64) -> Array2<f64> {
    // fractional parts of multiples of these are well spread in [0, 1)
    let alpha = [0.7548776662466927, 0.5698402909980532, 0.6180339887498949];

    let mut positions = cubic_lattice(shape, spacing);
    for (particle, mut position) in positions.rows_mut().into_iter().enumerate() {
        for xyz in 0..3 {
            let u = f64::fract((particle + 1) as f64 * alpha[xyz]);
            position[xyz] += jitter * (2.0 * u - 1.0);
        }
    }
    return positions;
}
