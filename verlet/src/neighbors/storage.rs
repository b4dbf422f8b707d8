use std::collections::BTreeSet;

use crate::Error;
use crate::errors::check_index;

/// Initial size of the per-particle neighbor buffers. Buffers double their
/// capacity every time they are full.
pub const INITIAL_NEIGHBORS_CAPACITY: usize = 20;

/// Push `neighbor` in `buffer`, doubling the capacity of the buffer if it is
/// already full. Empty buffers start with `initial` elements of capacity.
#[inline]
pub(crate) fn push_neighbor(buffer: &mut Vec<usize>, neighbor: usize, initial: usize) {
    if buffer.len() == buffer.capacity() {
        let additional = if buffer.capacity() == 0 {
            initial
        } else {
            buffer.capacity()
        };
        buffer.reserve_exact(additional);
    }
    buffer.push(neighbor);
}

/// Mutable "growable" form of a half neighbor list, used while searching for
/// pairs.
///
/// Each particle owns a buffer with the indexes of its neighbors. Pairs are
/// always stored under the lower index of the pair, so for a pair `i < j`
/// only the buffer of `i` grows.
///
/// The buffers are kept alive across calls to [`GrowableList::reset`], so
/// re-building the list for the same system does not allocate again once the
/// buffers reached their final size.
#[derive(Debug, Clone, Default)]
pub struct GrowableList {
    neighbors: Vec<Vec<usize>>,
    initial_capacity: usize,
}

impl GrowableList {
    /// Create an empty list with room for `n_particles` particles
    pub fn new(n_particles: usize) -> GrowableList {
        let mut list = GrowableList::default();
        list.reset(n_particles);
        return list;
    }

    /// Prepare this list for a new search over `n_particles` particles.
    ///
    /// All neighbor counts are set back to zero, but the memory of existing
    /// buffers is kept for re-use.
    pub fn reset(&mut self, n_particles: usize) {
        // a particle can not have more than `n_particles - 1` neighbors
        self.initial_capacity = usize::min(
            INITIAL_NEIGHBORS_CAPACITY,
            usize::max(n_particles.saturating_sub(1), 1),
        );

        self.neighbors.truncate(n_particles);
        for buffer in &mut self.neighbors {
            buffer.clear();
        }
        self.neighbors.resize_with(n_particles, Vec::new);
    }

    /// Get the number of particles in this list
    pub fn n_particles(&self) -> usize {
        self.neighbors.len()
    }

    /// Get the total number of pairs in this list
    pub fn n_pairs(&self) -> usize {
        self.neighbors.iter().map(|buffer| buffer.len()).sum()
    }

    /// Add the pair `(i, j)` to this list. The pair is stored under
    /// `min(i, j)`.
    pub fn add(&mut self, i: usize, j: usize) -> Result<(), Error> {
        check_index(i, self.n_particles())?;
        check_index(j, self.n_particles())?;
        if i == j {
            return Err(Error::InvalidParameter(format!(
                "can not add a pair between particle {} and itself", i
            )));
        }

        self.add_unchecked(i, j);
        return Ok(());
    }

    /// Same as [`GrowableList::add`], for indexes that are already known to
    /// be valid and different.
    #[inline]
    pub(crate) fn add_unchecked(&mut self, i: usize, j: usize) {
        debug_assert!(i != j && i < self.neighbors.len() && j < self.neighbors.len());
        let (first, second) = if i < j { (i, j) } else { (j, i) };
        push_neighbor(&mut self.neighbors[first], second, self.initial_capacity);
    }

    /// Get the neighbors currently stored under particle `i`
    pub fn neighbors(&self, i: usize) -> Result<&[usize], Error> {
        check_index(i, self.n_particles())?;
        return Ok(&self.neighbors[i]);
    }

    /// Get the capacity of the buffer of particle `i`
    pub fn capacity(&self, i: usize) -> Result<usize, Error> {
        check_index(i, self.n_particles())?;
        return Ok(self.neighbors[i].capacity());
    }

    /// Check if `j` is stored in the neighbors of `i`. This is not symmetric,
    /// see [`LinearList::has`].
    pub fn has(&self, i: usize, j: usize) -> Result<bool, Error> {
        check_index(j, self.n_particles())?;
        return Ok(self.neighbors(i)?.contains(&j));
    }

    /// Direct access to the per-particle buffers, together with the initial
    /// capacity to use in [`push_neighbor`]. This is used to fill the buffers
    /// of different particles in parallel.
    pub(crate) fn buffers_mut(&mut self) -> (&mut [Vec<usize>], usize) {
        (&mut self.neighbors, self.initial_capacity)
    }

    /// Create the linear form of this list, keeping the growable form around
    /// (e.g. for re-use in the next search)
    #[time_graph::instrument(name = "GrowableList::linearise")]
    pub fn linearise(&self) -> LinearList {
        let n_particles = self.n_particles();

        let mut sizes = Vec::with_capacity(n_particles);
        let mut offsets = Vec::with_capacity(n_particles);
        let mut offset = 0;
        for buffer in &self.neighbors {
            sizes.push(buffer.len());
            offsets.push(offset);
            offset += buffer.len();
        }

        let mut list = Vec::with_capacity(offset);
        for buffer in &self.neighbors {
            list.extend_from_slice(buffer);
        }

        return LinearList {
            offsets: offsets,
            sizes: sizes,
            list: list,
        };
    }

    /// Create the linear form of this list, discarding the growable form
    pub fn into_linear(self) -> LinearList {
        self.linearise()
    }
}

/// Immutable, linear form of a half neighbor list.
///
/// The neighbors of all particles are stored one after the other in a single
/// array (`list`), with `offsets[i]` the start of the neighbors of particle
/// `i` in this array and `sizes[i]` their count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearList {
    offsets: Vec<usize>,
    sizes: Vec<usize>,
    list: Vec<usize>,
}

impl LinearList {
    /// Get the number of particles in this list
    pub fn n_particles(&self) -> usize {
        self.sizes.len()
    }

    /// Get the total number of pairs in this list
    pub fn n_pairs(&self) -> usize {
        self.list.len()
    }

    /// Start of each particle's neighbors in [`LinearList::list`]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Number of neighbors stored for each particle
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// The neighbors of all particles, concatenated in particle order
    pub fn list(&self) -> &[usize] {
        &self.list
    }

    /// Get the number of neighbors stored for particle `i`
    pub fn size(&self, i: usize) -> Result<usize, Error> {
        check_index(i, self.n_particles())?;
        return Ok(self.sizes[i]);
    }

    /// Get the neighbors stored for particle `i`. Since this is a half list,
    /// these only contain particles with an index larger than `i`.
    pub fn neighbors(&self, i: usize) -> Result<&[usize], Error> {
        check_index(i, self.n_particles())?;
        return Ok(self.neighbors_unchecked(i));
    }

    #[inline]
    fn neighbors_unchecked(&self, i: usize) -> &[usize] {
        let start = self.offsets[i];
        return &self.list[start..start + self.sizes[i]];
    }

    /// Check if `j` is in the neighbors of `i`.
    ///
    /// Pairs are stored under their lower index, so `has(i, j)` with `i > j`
    /// is always `false`. Use [`LinearList::contains_pair`] for a symmetric
    /// check.
    pub fn has(&self, i: usize, j: usize) -> Result<bool, Error> {
        check_index(j, self.n_particles())?;
        return Ok(self.neighbors(i)?.contains(&j));
    }

    /// Check if the pair `(i, j)` is in this list, in any order
    pub fn contains_pair(&self, i: usize, j: usize) -> Result<bool, Error> {
        return self.has(usize::min(i, j), usize::max(i, j));
    }

    /// Iterate over all pairs `(i, j)` in this list, in the storage order
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.n_particles()).flat_map(move |i| {
            self.neighbors_unchecked(i).iter().map(move |&j| (i, j))
        })
    }

    /// Get all pairs in this list as a set of `(min, max)` tuples
    pub fn pair_set(&self) -> BTreeSet<(usize, usize)> {
        self.pairs()
            .map(|(i, j)| (usize::min(i, j), usize::max(i, j)))
            .collect()
    }
}

impl std::fmt::Display for LinearList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "verlet lists:")?;
        let mut max_neighbors = 0;
        for i in 0..self.n_particles() {
            let neighbors = self.neighbors_unchecked(i);
            max_neighbors = usize::max(max_neighbors, neighbors.len());
            writeln!(f, "({}): {:?}", i, neighbors)?;
        }
        write!(f, "max elements: {}", max_neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_linearise() {
        let mut list = GrowableList::new(10);
        for i in 0..9 {
            for j in (i + 1)..10 {
                list.add(i, j).unwrap();
                assert!(list.has(i, j).unwrap());
            }
        }
        assert_eq!(list.n_pairs(), 45);

        let linear = list.linearise();
        assert_eq!(linear.n_particles(), 10);
        assert_eq!(linear.n_pairs(), 45);
        for i in 0..9 {
            for j in (i + 1)..10 {
                assert!(linear.has(i, j).unwrap());
                assert!(!linear.has(j, i).unwrap());
                assert!(linear.contains_pair(j, i).unwrap());
            }
        }

        assert_eq!(linear.sizes(), [9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
        assert_eq!(linear.offsets(), [0, 9, 17, 24, 30, 35, 39, 42, 44, 45]);
        assert_eq!(linear.neighbors(7).unwrap(), [8, 9]);
        assert!(linear.neighbors(9).unwrap().is_empty());
    }

    #[test]
    fn pairs_go_under_lower_index() {
        let mut list = GrowableList::new(4);
        list.add(3, 1).unwrap();
        assert_eq!(list.neighbors(1).unwrap(), [3]);
        assert!(list.neighbors(3).unwrap().is_empty());

        let linear = list.into_linear();
        assert!(linear.has(1, 3).unwrap());
        assert!(!linear.has(3, 1).unwrap());
    }

    #[test]
    fn invalid_indexes() {
        let mut list = GrowableList::new(10);
        assert!(matches!(
            list.add(11, 9),
            Err(Error::IndexOutOfRange { index: 11, size: 10 })
        ));
        assert!(matches!(
            list.add(2, 10),
            Err(Error::IndexOutOfRange { index: 10, size: 10 })
        ));
        assert!(matches!(list.add(4, 4), Err(Error::InvalidParameter(_))));
        assert_eq!(list.n_pairs(), 0);

        let linear = list.linearise();
        assert!(matches!(
            linear.has(11, 9),
            Err(Error::IndexOutOfRange { index: 11, size: 10 })
        ));
        assert!(matches!(linear.has(8, 12), Err(Error::IndexOutOfRange { .. })));
        assert!(!linear.has(8, 9).unwrap());
        assert!(linear.neighbors(10).is_err());
        assert!(linear.size(10).is_err());
    }

    #[test]
    fn growth() {
        let mut list = GrowableList::new(100);
        for j in 1..100 {
            list.add(0, j).unwrap();
        }

        let neighbors = list.neighbors(0).unwrap();
        assert_eq!(neighbors.len(), 99);
        assert!(neighbors.iter().copied().eq(1..100));
        assert!(list.capacity(0).unwrap() >= 99);
        // particles without neighbors never allocate
        assert_eq!(list.capacity(1).unwrap(), 0);

        let mut list = GrowableList::new(100);
        list.add(0, 1).unwrap();
        assert!(list.capacity(0).unwrap() >= INITIAL_NEIGHBORS_CAPACITY);

        // small systems do not reserve more than they can use
        let mut list = GrowableList::new(3);
        list.add(0, 1).unwrap();
        assert!(list.capacity(0).unwrap() >= 2);
    }

    #[test]
    fn reset_reuses_buffers() {
        let mut list = GrowableList::new(5);
        for j in 1..5 {
            list.add(0, j).unwrap();
        }
        let capacity = list.capacity(0).unwrap();

        list.reset(3);
        assert_eq!(list.n_particles(), 3);
        assert_eq!(list.n_pairs(), 0);
        assert_eq!(list.capacity(0).unwrap(), capacity);

        list.reset(8);
        assert_eq!(list.n_particles(), 8);
        assert_eq!(list.n_pairs(), 0);
        assert_eq!(list.capacity(0).unwrap(), capacity);
    }

    #[test]
    fn empty_lists() {
        let linear = GrowableList::new(0).into_linear();
        assert_eq!(linear.n_particles(), 0);
        assert_eq!(linear.pairs().count(), 0);

        let linear = GrowableList::new(1).into_linear();
        assert_eq!(linear.sizes(), [0]);
        assert_eq!(linear.offsets(), [0]);
        assert!(linear.list().is_empty());
    }

    #[test]
    fn display() {
        let mut list = GrowableList::new(3);
        list.add(0, 1).unwrap();
        list.add(0, 2).unwrap();
        list.add(1, 2).unwrap();

        let expected = "verlet lists:\n(0): [1, 2]\n(1): [2]\n(2): []\nmax elements: 2";
        assert_eq!(list.linearise().to_string(), expected);
    }
}
