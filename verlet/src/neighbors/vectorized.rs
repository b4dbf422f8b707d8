use ndarray::{ArrayView2, Axis, s};
use rayon::prelude::*;

use crate::Error;
use crate::errors::check_positions;

use super::{NeighborSearch, GrowableList, squared_norm};
use super::storage::push_neighbor;

/// Brute-force neighbor search, computing the distances between a particle
/// and all particles after it in a single array operation.
///
/// This finds exactly the same pairs, in the same order, as
/// [`SimpleSearch`](super::SimpleSearch). All pairs found for particle `i`
/// are stored under `i`, so the rows of different particles can be computed
/// in parallel without changing the result.
#[derive(Debug, Clone)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct VectorizedSearch {
    /// Spherical cutoff to use to determine if two particles are neighbors
    pub cutoff: f64,
    /// Should the distances for different particles be computed in
    /// parallel?
    #[serde(default)]
    pub parallel: bool,
}

/// Compute the distances between particle `i` and all the particles after it,
/// and push the ones within the cutoff in `neighbors`
fn search_row(
    positions: &ArrayView2<'_, f64>,
    i: usize,
    cutoff2: f64,
    neighbors: &mut Vec<usize>,
    initial_capacity: usize,
) {
    let vectors = &positions.slice(s![i + 1.., ..]) - &positions.row(i);
    let distances2 = vectors.map_axis(Axis(1), |rij| squared_norm(rij[0], rij[1], rij[2]));

    for (delta, &distance2) in distances2.iter().enumerate() {
        if distance2 <= cutoff2 {
            push_neighbor(neighbors, i + 1 + delta, initial_capacity);
        }
    }
}

impl NeighborSearch for VectorizedSearch {
    fn name(&self) -> String {
        "vectorized".into()
    }

    fn parameters(&self) -> String {
        serde_json::to_string(self).expect("failed to serialize to JSON")
    }

    fn cutoff(&self) -> f64 {
        self.cutoff
    }

    #[time_graph::instrument(name = "VectorizedSearch::build")]
    fn build(&self, positions: ArrayView2<'_, f64>, list: &mut GrowableList) -> Result<(), Error> {
        check_positions(&positions)?;
        list.reset(positions.nrows());

        let cutoff2 = self.cutoff * self.cutoff;
        let (buffers, initial_capacity) = list.buffers_mut();
        if self.parallel {
            buffers.par_iter_mut().enumerate().for_each(|(i, neighbors)| {
                search_row(&positions, i, cutoff2, neighbors, initial_capacity);
            });
        } else {
            for (i, neighbors) in buffers.iter_mut().enumerate() {
                search_row(&positions, i, cutoff2, neighbors, initial_capacity);
            }
        }

        return Ok(());
    }
}
