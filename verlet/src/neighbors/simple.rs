use ndarray::ArrayView2;

use crate::Error;
use crate::errors::check_positions;

use super::{NeighborSearch, GrowableList, squared_norm};

/// Brute-force neighbor search, comparing all pairs of particles one by one.
///
/// This is `O(N^2)` and used as the reference implementation for the other
/// backends.
#[derive(Debug, Clone)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SimpleSearch {
    /// Spherical cutoff to use to determine if two particles are neighbors
    pub cutoff: f64,
}

impl NeighborSearch for SimpleSearch {
    fn name(&self) -> String {
        "simple".into()
    }

    fn parameters(&self) -> String {
        serde_json::to_string(self).expect("failed to serialize to JSON")
    }

    fn cutoff(&self) -> f64 {
        self.cutoff
    }

    #[time_graph::instrument(name = "SimpleSearch::build")]
    fn build(&self, positions: ArrayView2<'_, f64>, list: &mut GrowableList) -> Result<(), Error> {
        check_positions(&positions)?;

        let n_particles = positions.nrows();
        list.reset(n_particles);

        let cutoff2 = self.cutoff * self.cutoff;
        for i in 0..n_particles {
            let ri = positions.row(i);
            for j in (i + 1)..n_particles {
                let rj = positions.row(j);
                let distance2 = squared_norm(rj[0] - ri[0], rj[1] - ri[1], rj[2] - ri[2]);
                if distance2 <= cutoff2 {
                    list.add_unchecked(i, j);
                }
            }
        }

        return Ok(());
    }
}
