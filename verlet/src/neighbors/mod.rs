//! Half neighbor lists ("Verlet lists") for a spherical cutoff.
//!
//! Pairs are searched by one of the [`NeighborSearch`] backends, selected by
//! name when creating a [`NeighborList`]:
//!
//! - `"simple"`: compares all pairs of particles one by one;
//! - `"vectorized"`: compares all pairs of particles, computing all the
//!   distances from a given particle at once;
//! - `"grid"`: sorts the particles in a [`Grid`](crate::Grid) of cells at
//!   least as large as the cutoff, and only compares particles in the same or
//!   in neighboring cells.
//!
//! All backends produce exactly the same set of pairs: all pairs `i < j` with
//! a squared distance smaller than or equal to the squared cutoff.

use std::collections::BTreeMap;

use log::debug;
use ndarray::ArrayView2;
use once_cell::sync::Lazy;

use crate::Error;

mod storage;
pub use self::storage::{GrowableList, LinearList, INITIAL_NEIGHBORS_CAPACITY};

mod simple;
pub use self::simple::SimpleSearch;

mod vectorized;
pub use self::vectorized::VectorizedSearch;

mod grid_search;
pub use self::grid_search::GridSearch;

/// Squared norm of the `(dx, dy, dz)` vector. All backends go through this
/// function to make sure they compare exactly the same floating point values
/// against the squared cutoff.
#[inline]
pub(crate) fn squared_norm(dx: f64, dy: f64, dz: f64) -> f64 {
    dx * dx + dy * dy + dz * dz
}

/// Check that the cutoff is usable for a neighbor search
pub(crate) fn check_cutoff(cutoff: f64) -> Result<(), Error> {
    if cutoff > 0.0 && cutoff.is_finite() {
        return Ok(());
    }
    return Err(Error::InvalidParameter(format!(
        "cutoff must be a positive finite number, got {}", cutoff
    )));
}

/// A `NeighborSearch` implements one algorithm to find all pairs of particles
/// closer than a cutoff.
pub trait NeighborSearch: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> String;

    /// Get the parameters used to create this backend as a JSON string
    fn parameters(&self) -> String;

    /// Get the cutoff used by this backend
    fn cutoff(&self) -> f64;

    /// Check that the parameters of this backend are valid. This is called
    /// when creating backends from JSON parameters.
    fn validate(&self) -> Result<(), Error> {
        check_cutoff(self.cutoff())
    }

    /// Find all pairs of particles at the given `positions` (an array of
    /// shape `(n_particles, 3)`) with a distance smaller than or equal to the
    /// cutoff, and store them in `list`.
    ///
    /// The list is reset to contain `n_particles` particles before the search
    /// starts, re-using the memory already allocated in the list.
    fn build(&self, positions: ArrayView2<'_, f64>, list: &mut GrowableList) -> Result<(), Error>;
}

/// Half neighbor list for a set of particles, using a configurable
/// [`NeighborSearch`] backend to find the pairs.
///
/// The growable storage used during the search is kept between calls to
/// [`NeighborList::build`], so that re-building the list after the particles
/// moved re-uses the same memory.
pub struct NeighborList {
    implementation: Box<dyn NeighborSearch>,
    parameters: String,
    growable: GrowableList,
    linear: Option<LinearList>,
}

impl std::fmt::Debug for NeighborList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeighborList")
            .field("backend", &self.implementation.name())
            .field("parameters", &self.parameters)
            .field("linear", &self.linear)
            .finish_non_exhaustive()
    }
}

impl From<Box<dyn NeighborSearch>> for NeighborList {
    fn from(implementation: Box<dyn NeighborSearch>) -> NeighborList {
        let parameters = implementation.parameters();
        NeighborList {
            implementation: implementation,
            parameters: parameters,
            growable: GrowableList::default(),
            linear: None,
        }
    }
}

impl NeighborList {
    /// Create a new neighbor list using the backend with the given `name` and
    /// `parameters`.
    ///
    /// The available backends are `"simple"`, `"vectorized"` and `"grid"`,
    /// and the `parameters` should be formatted as JSON.
    ///
    /// # Errors
    ///
    /// This function returns an error if there is no backend with the given
    /// `name`, or if the parameters are invalid for this backend.
    pub fn new(name: &str, parameters: &str) -> Result<NeighborList, Error> {
        let creator = match REGISTERED_BACKENDS.get(name) {
            Some(creator) => creator,
            None => {
                return Err(Error::InvalidParameter(format!(
                    "unknown neighbor list backend '{}', expected one of {}",
                    name,
                    REGISTERED_BACKENDS.keys().map(|k| format!("'{}'", k)).collect::<Vec<_>>().join(", ")
                )));
            }
        };

        return Ok(NeighborList::from(creator(parameters)?));
    }

    /// Get the name of the backend used by this neighbor list
    pub fn name(&self) -> String {
        self.implementation.name()
    }

    /// Get the parameters used to create this neighbor list, formatted as
    /// JSON.
    pub fn parameters(&self) -> &str {
        &self.parameters
    }

    /// Get the cutoff of this neighbor list
    pub fn cutoff(&self) -> f64 {
        self.implementation.cutoff()
    }

    /// Find all pairs of particles within the cutoff for the given
    /// `positions`, and return the corresponding linear list.
    #[time_graph::instrument(name = "NeighborList::build")]
    pub fn build(&mut self, positions: ArrayView2<'_, f64>) -> Result<&LinearList, Error> {
        // invalidate the previous list, even if the search fails
        self.linear = None;
        self.implementation.build(positions, &mut self.growable)?;

        let linear = self.growable.linearise();
        debug!(
            "found {} pairs between {} particles with the '{}' backend",
            linear.n_pairs(), linear.n_particles(), self.implementation.name()
        );

        return Ok(self.linear.insert(linear));
    }

    /// Get the growable form of the list, as it was filled by the last call
    /// to [`NeighborList::build`]
    pub fn growable(&self) -> &GrowableList {
        &self.growable
    }

    /// Get the linear form of the list computed by the last call to
    /// [`NeighborList::build`]
    pub fn linear(&self) -> Result<&LinearList, Error> {
        self.linear.as_ref().ok_or_else(|| Error::Precondition(
            "the neighbor list must be built before it can be used".into()
        ))
    }

    /// Check if `j` is in the neighbors of `i`, see [`LinearList::has`]
    pub fn has(&self, i: usize, j: usize) -> Result<bool, Error> {
        self.linear()?.has(i, j)
    }

    /// Get the neighbors of particle `i`, see [`LinearList::neighbors`]
    pub fn neighbors(&self, i: usize) -> Result<&[usize], Error> {
        self.linear()?.neighbors(i)
    }

    /// Release the linear list, returning it to the caller
    pub fn take_linear(&mut self) -> Option<LinearList> {
        self.linear.take()
    }
}

type BackendCreator = fn(&str) -> Result<Box<dyn NeighborSearch>, Error>;

macro_rules! add_backend {
    ($map :expr, $name :literal, $type :ty) => (
        $map.insert($name, (|json| {
            let value = serde_json::from_str::<$type>(json)?;
            value.validate()?;
            Ok(Box::new(value))
        }) as BackendCreator);
    );
}

static REGISTERED_BACKENDS: Lazy<BTreeMap<&'static str, BackendCreator>> = Lazy::new(|| {
    let mut map = BTreeMap::new();
    add_backend!(map, "simple", SimpleSearch);
    add_backend!(map, "vectorized", VectorizedSearch);
    add_backend!(map, "grid", GridSearch);
    return map;
});
