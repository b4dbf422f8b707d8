use ndarray::ArrayView2;

use crate::{Error, Grid};
use crate::errors::check_positions;

use super::{NeighborSearch, GrowableList, squared_norm, check_cutoff};

/// Displacements (in cells) to the 13 neighboring cells visited from each
/// cell: one ahead along x; three ahead along y; nine ahead along z. Together
/// with the pairs inside each cell, this visits every pair of neighboring
/// cells exactly once.
const HALF_STENCIL: [[isize; 3]; 13] = [
    [1, 0, 0],
    [-1, 1, 0], [0, 1, 0], [1, 1, 0],
    [-1, -1, 1], [0, -1, 1], [1, -1, 1],
    [-1, 0, 1], [0, 0, 1], [1, 0, 1],
    [-1, 1, 1], [0, 1, 1], [1, 1, 1],
];

/// Neighbor search using a [`Grid`] of cells, only comparing particles in the
/// same cell or in neighboring cells.
///
/// This is `O(N)` for systems with a roughly uniform density.
#[derive(Debug, Clone)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GridSearch {
    /// Spherical cutoff to use to determine if two particles are neighbors
    pub cutoff: f64,
    /// Size of the grid cells, this must be larger than or equal to the
    /// cutoff. Defaults to the cutoff.
    #[serde(default)]
    pub cell_size: Option<f64>,
}

impl GridSearch {
    /// Get the requested size of the grid cells
    pub fn cell_size(&self) -> f64 {
        self.cell_size.unwrap_or(self.cutoff)
    }

    /// Find all pairs within the cutoff, using an already built `grid`.
    ///
    /// The grid cells must be at least as large as the cutoff, and the grid
    /// must have been created from the same `positions`. Using a grid created
    /// for a different number of particles is an error.
    #[time_graph::instrument(name = "GridSearch::build_with_grid")]
    pub fn build_with_grid(
        &self,
        positions: ArrayView2<'_, f64>,
        grid: &Grid,
        list: &mut GrowableList,
    ) -> Result<(), Error> {
        check_positions(&positions)?;
        if grid.n_particles() != positions.nrows() {
            return Err(Error::Precondition(format!(
                "the grid was created for {} particles, but {} positions were given",
                grid.n_particles(), positions.nrows()
            )));
        }
        debug_assert!(grid.edges().iter().all(|&edge| edge >= self.cutoff));

        list.reset(positions.nrows());
        let cutoff2 = self.cutoff * self.cutoff;
        let mut add_if_neighbors = |i: usize, j: usize| {
            let ri = positions.row(i);
            let rj = positions.row(j);
            let distance2 = squared_norm(rj[0] - ri[0], rj[1] - ri[1], rj[2] - ri[2]);
            if distance2 <= cutoff2 {
                list.add_unchecked(i, j);
            }
        };

        for ([k, l, m], cell) in grid.cells() {
            // pairs inside the current cell
            for (a, &i) in cell.iter().enumerate() {
                for &j in &cell[a + 1..] {
                    add_if_neighbors(i, j);
                }
            }

            // pairs with the neighboring cells
            for [dk, dl, dm] in HALF_STENCIL {
                let other = match grid.cell(k as isize + dk, l as isize + dl, m as isize + dm) {
                    Some(other) => other,
                    // this cell is at the edge of the grid
                    None => continue,
                };

                for &i in cell {
                    for &j in other {
                        add_if_neighbors(i, j);
                    }
                }
            }
        }

        return Ok(());
    }
}

impl NeighborSearch for GridSearch {
    fn name(&self) -> String {
        "grid".into()
    }

    fn parameters(&self) -> String {
        serde_json::to_string(self).expect("failed to serialize to JSON")
    }

    fn cutoff(&self) -> f64 {
        self.cutoff
    }

    fn validate(&self) -> Result<(), Error> {
        check_cutoff(self.cutoff)?;
        let cell_size = self.cell_size();
        if !(cell_size >= self.cutoff && cell_size.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "grid cell size ({}) must be finite and larger than or equal to the cutoff ({})",
                cell_size, self.cutoff
            )));
        }
        return Ok(());
    }

    #[time_graph::instrument(name = "GridSearch::build")]
    fn build(&self, positions: ArrayView2<'_, f64>, list: &mut GrowableList) -> Result<(), Error> {
        let grid = Grid::new(positions, self.cell_size())?;
        return self.build_with_grid(positions, &grid, list);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use ndarray::array;

    use crate::neighbors::SimpleSearch;
    use crate::test_utils::{collinear, disordered};
    use super::*;

    #[test]
    fn stencil_is_half_of_the_neighborhood() {
        let stencil = HALF_STENCIL.iter().copied().collect::<BTreeSet<_>>();
        assert_eq!(stencil.len(), 13);

        for [dk, dl, dm] in HALF_STENCIL {
            assert_ne!([dk, dl, dm], [0, 0, 0]);
            assert!(!stencil.contains(&[-dk, -dl, -dm]));
        }
    }

    #[test]
    fn collinear_particles() {
        for axis in 0..3 {
            let search = GridSearch { cutoff: 2.0, cell_size: None };
            let mut list = GrowableList::default();
            search.build(collinear(axis).view(), &mut list).unwrap();

            let linear = list.linearise();
            assert_eq!(linear.sizes(), [2, 2, 2, 1, 0]);
            assert_eq!(linear.list(), [1, 2, 2, 3, 3, 4, 4]);
        }
    }

    #[test]
    fn same_as_simple() {
        let positions = disordered([6, 5, 7], 1.0, 0.45);
        for cutoff in [0.5, 1.0, 1.3, 2.0, 3.7, 20.0] {
            let mut reference = GrowableList::default();
            SimpleSearch { cutoff: cutoff }.build(positions.view(), &mut reference).unwrap();
            let reference = reference.into_linear();

            for cell_size in [None, Some(1.5 * cutoff)] {
                let mut list = GrowableList::default();
                GridSearch { cutoff: cutoff, cell_size: cell_size }.build(positions.view(), &mut list).unwrap();
                let linear = list.into_linear();

                assert_eq!(linear.n_pairs(), reference.n_pairs());
                assert_eq!(linear.pair_set(), reference.pair_set());
                for (i, j) in linear.pairs() {
                    assert!(i < j);
                }
            }
        }
    }

    #[test]
    fn uses_full_distance() {
        // these particles are close in the xy plane, but not along z
        let positions = array![[0.0, 0.0, 0.0], [0.5, 0.5, 3.0], [0.2, 0.1, 0.9]];
        let mut list = GrowableList::default();
        GridSearch { cutoff: 1.0, cell_size: None }.build(positions.view(), &mut list).unwrap();

        let linear = list.into_linear();
        assert_eq!(linear.pair_set(), BTreeSet::from([(0, 2)]));
    }

    #[test]
    fn lower_index_in_neighbor_cell() {
        // two cells along x: particle 0 is in the second cell, and its
        // neighbor (particle 2) in the first one
        let positions = array![
            [1.3, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [1.1, 0.0, 0.0],
            [2.6, 0.0, 0.0],
        ];
        let mut list = GrowableList::default();
        GridSearch { cutoff: 1.0, cell_size: None }.build(positions.view(), &mut list).unwrap();

        let grid = Grid::new(positions.view(), 1.0).unwrap();
        assert_eq!(grid.cell(0, 0, 0).unwrap(), [1, 2]);
        assert_eq!(grid.cell(1, 0, 0).unwrap(), [0, 3]);

        let linear = list.into_linear();
        assert_eq!(linear.pair_set(), BTreeSet::from([(0, 2)]));
        assert_eq!(linear.neighbors(0).unwrap(), [2]);
        assert!(linear.neighbors(2).unwrap().is_empty());
    }

    #[test]
    fn grid_from_other_positions() {
        let search = GridSearch { cutoff: 2.0, cell_size: None };
        let positions = array![
            [0.0, 0.0, 0.0],
            [0.5, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.5, 0.0, 0.0],
        ];
        let mut list = GrowableList::default();

        // grid with fewer particles than the positions
        let grid = Grid::new(positions.slice(ndarray::s![..2, ..]), search.cell_size()).unwrap();
        let error = search.build_with_grid(positions.view(), &grid, &mut list).unwrap_err();
        assert_eq!(
            error.to_string(),
            "precondition violated: the grid was created for 2 particles, but 4 positions were given"
        );

        // grid with more particles than the positions
        let grid = Grid::new(positions.view(), search.cell_size()).unwrap();
        let error = search.build_with_grid(positions.slice(ndarray::s![..3, ..]), &grid, &mut list).unwrap_err();
        assert!(matches!(error, Error::Precondition(_)));

        // grid from the same positions
        search.build_with_grid(positions.view(), &grid, &mut list).unwrap();
        assert_eq!(list.n_pairs(), 6);
    }

    #[test]
    fn invalid_cell_size() {
        assert!(GridSearch { cutoff: 1.0, cell_size: None }.validate().is_ok());
        assert!(GridSearch { cutoff: 1.0, cell_size: Some(1.0) }.validate().is_ok());
        assert!(GridSearch { cutoff: 1.0, cell_size: Some(0.9) }.validate().is_err());
        assert!(GridSearch { cutoff: 1.0, cell_size: Some(f64::NAN) }.validate().is_err());
        assert!(GridSearch { cutoff: 0.0, cell_size: None }.validate().is_err());
    }
}
