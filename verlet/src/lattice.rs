use ndarray::Array2;

/// Get the positions of particles on a simple cubic lattice with the given
/// `spacing`, with `upper_corner[0] x upper_corner[1] x upper_corner[2]`
/// particles starting at the origin.
///
/// Particles are ordered with the x index varying slowest and the z index
/// varying fastest.
pub fn cubic_lattice(upper_corner: [usize; 3], spacing: f64) -> Array2<f64> {
    let [nx, ny, nz] = upper_corner;
    let mut positions = Array2::zeros((nx * ny * nz, 3));

    let mut particle = 0;
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                positions[[particle, 0]] = i as f64 * spacing;
                positions[[particle, 1]] = j as f64 * spacing;
                positions[[particle, 2]] = k as f64 * spacing;
                particle += 1;
            }
        }
    }

    return positions;
}
