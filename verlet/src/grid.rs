use log::debug;
use ndarray::{Array3, ArrayView2};

use crate::Error;
use crate::errors::check_positions;

/// Maximal number of cells, we need to use this to prevent having too many
/// cells with a few sparse particles and a small cell size
const MAX_NUMBER_OF_CELLS: f64 = 1e6;

/// A regular 3D grid of cells covering the bounding box of a set of
/// particles, each cell containing the indexes of the particles inside it.
///
/// All cells have an edge of at least the `cell_size` given to
/// [`Grid::new`]: the number of cells along each axis is the number of full
/// `cell_size` intervals fitting in the bounding box (and at least one). The
/// grid is always created from the positions, there is no such thing as an
/// empty or un-built grid.
#[derive(Debug, Clone)]
pub struct Grid {
    /// lower corner of the bounding box
    origin: [f64; 3],
    /// actual size of the cells along each axis
    edges: [f64; 3],
    /// the cells themselves
    cells: Array3<Vec<usize>>,
    /// number of particles sorted in the cells
    n_particles: usize,
}

impl Grid {
    /// Sort the particles at the given `positions` into cells with an edge of
    /// at least `cell_size`.
    #[time_graph::instrument(name = "Grid::new")]
    pub fn new(positions: ArrayView2<'_, f64>, cell_size: f64) -> Result<Grid, Error> {
        check_positions(&positions)?;
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "grid cell size must be a positive finite number, got {}", cell_size
            )));
        }

        let mut lower = [0.0; 3];
        let mut upper = [0.0; 3];
        if positions.nrows() != 0 {
            lower = [f64::INFINITY; 3];
            upper = [f64::NEG_INFINITY; 3];
        }

        for position in positions.rows() {
            for xyz in 0..3 {
                lower[xyz] = f64::min(lower[xyz], position[xyz]);
                upper[xyz] = f64::max(upper[xyz], position[xyz]);
            }
        }

        let extent = [upper[0] - lower[0], upper[1] - lower[1], upper[2] - lower[2]];
        let mut n_cells = [
            f64::clamp(f64::trunc(extent[0] / cell_size), 1.0, f64::INFINITY),
            f64::clamp(f64::trunc(extent[1] / cell_size), 1.0, f64::INFINITY),
            f64::clamp(f64::trunc(extent[2] / cell_size), 1.0, f64::INFINITY),
        ];

        // limit memory consumption by using larger cells when there would be
        // too many of them. Larger cells are always fine for neighbor search.
        let n_cells_total = n_cells[0] * n_cells[1] * n_cells[2];
        if n_cells_total > MAX_NUMBER_OF_CELLS {
            let factor = f64::cbrt(n_cells_total / MAX_NUMBER_OF_CELLS);
            for n in &mut n_cells {
                *n = f64::clamp(f64::trunc(*n / factor), 1.0, f64::INFINITY);
            }
            debug!(
                "too many cells in the grid ({}), using {}x{}x{} cells instead",
                n_cells_total, n_cells[0], n_cells[1], n_cells[2]
            );
        }

        let edges = [
            f64::max(extent[0] / n_cells[0], cell_size),
            f64::max(extent[1] / n_cells[1], cell_size),
            f64::max(extent[2] / n_cells[2], cell_size),
        ];

        let shape = [n_cells[0] as usize, n_cells[1] as usize, n_cells[2] as usize];
        let mut grid = Grid {
            origin: lower,
            edges: edges,
            cells: Array3::from_elem(shape, Vec::new()),
            n_particles: positions.nrows(),
        };

        for (particle, position) in positions.rows().into_iter().enumerate() {
            let cell = grid.cell_index([position[0], position[1], position[2]]);
            grid.cells[cell].push(particle);
        }

        return Ok(grid);
    }

    /// Get the number of cells along each axis
    pub fn shape(&self) -> [usize; 3] {
        let shape = self.cells.shape();
        return [shape[0], shape[1], shape[2]];
    }

    /// Get the number of particles used to create this grid
    pub fn n_particles(&self) -> usize {
        self.n_particles
    }

    /// Get the total number of cells in this grid
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Get the lower corner of the grid
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Get the size of the cells along each axis
    pub fn edges(&self) -> [f64; 3] {
        self.edges
    }

    /// Get the index of the cell containing the given `position`. Positions
    /// outside of the grid are attributed to the closest cell.
    pub fn cell_index(&self, position: [f64; 3]) -> [usize; 3] {
        let shape = self.shape();
        let mut index = [0; 3];
        for xyz in 0..3 {
            let i = f64::floor((position[xyz] - self.origin[xyz]) / self.edges[xyz]);
            // particles on the upper boundary go in the last cell
            index[xyz] = f64::clamp(i, 0.0, (shape[xyz] - 1) as f64) as usize;
        }
        return index;
    }

    /// Get the particles inside the cell `(k, l, m)`, or `None` if this cell
    /// is outside of the grid.
    ///
    /// `None` is different from an empty cell: cells at the edges and corners
    /// of the grid have fewer neighboring cells, and `None` is used to skip
    /// the missing ones.
    pub fn cell(&self, k: isize, l: isize, m: isize) -> Option<&[usize]> {
        let k = usize::try_from(k).ok()?;
        let l = usize::try_from(l).ok()?;
        let m = usize::try_from(m).ok()?;
        return self.cells.get([k, l, m]).map(|cell| &**cell);
    }

    /// Iterate over all cells, together with their `(k, l, m)` coordinates
    pub fn cells(&self) -> impl Iterator<Item = ([usize; 3], &[usize])> + '_ {
        self.cells.indexed_iter().map(|((k, l, m), cell)| ([k, l, m], &**cell))
    }
}
