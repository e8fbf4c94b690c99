//! Factory distance graph.
//!
//! Built once per game from the link list and never modified afterwards.
//! Shortest travel times between every pair are precomputed with
//! Floyd-Warshall; factory counts are small (at most a few dozen), so the
//! cubic build is negligible next to the per-turn budget.
//!
//! On the wire a distance of `0` means "no link". Here that case is `None`,
//! which also covers a factory's distance to itself.

use thiserror::Error;

use super::entity::FactoryId;

/// An undirected link between two factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub a: FactoryId,
    pub b: FactoryId,
    pub distance: u32,
}

impl Link {
    pub fn new(a: FactoryId, b: FactoryId, distance: u32) -> Self {
        Link { a, b, distance }
    }
}

/// Errors that can occur while building the graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("link references factory {id}, but only {count} factories exist")]
    FactoryOutOfRange { id: FactoryId, count: usize },

    #[error("factory {0} is linked to itself")]
    SelfLink(FactoryId),

    #[error("link {a}-{b} has zero distance")]
    ZeroDistance { a: FactoryId, b: FactoryId },
}

/// Pairwise shortest travel times between factories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceGraph {
    count: usize,
    /// Raw link weights, row-major `count x count`.
    direct: Vec<Option<u32>>,
    /// Shortest-path distances, row-major `count x count`.
    shortest: Vec<Option<u32>>,
}

impl DistanceGraph {
    /// Builds the graph and precomputes all shortest distances.
    ///
    /// Duplicate links keep the shorter weight.
    pub fn new(factory_count: usize, links: &[Link]) -> Result<Self, GraphError> {
        let mut direct = vec![None; factory_count * factory_count];

        for link in links {
            for id in [link.a, link.b] {
                if id >= factory_count {
                    return Err(GraphError::FactoryOutOfRange { id, count: factory_count });
                }
            }
            if link.a == link.b {
                return Err(GraphError::SelfLink(link.a));
            }
            if link.distance == 0 {
                return Err(GraphError::ZeroDistance { a: link.a, b: link.b });
            }
            for (from, to) in [(link.a, link.b), (link.b, link.a)] {
                let cell = &mut direct[from * factory_count + to];
                *cell = Some(cell.map_or(link.distance, |d: u32| d.min(link.distance)));
            }
        }

        let shortest = floyd_warshall(factory_count, &direct);
        Ok(DistanceGraph {
            count: factory_count,
            direct,
            shortest,
        })
    }

    /// Number of factories in the graph.
    pub fn factory_count(&self) -> usize {
        self.count
    }

    /// Shortest travel time from `a` to `b`.
    ///
    /// Returns `None` when `a == b` or when no path exists.
    ///
    /// # Panics
    ///
    /// Panics if either id is out of range.
    pub fn distance(&self, a: FactoryId, b: FactoryId) -> Option<u32> {
        self.shortest[self.index(a, b)]
    }

    /// Weight of the direct link between `a` and `b`, if one exists.
    pub fn direct(&self, a: FactoryId, b: FactoryId) -> Option<u32> {
        self.direct[self.index(a, b)]
    }

    /// Returns true if a troop sent from `a` can reach `b`.
    pub fn is_reachable(&self, a: FactoryId, b: FactoryId) -> bool {
        self.distance(a, b).is_some()
    }

    /// Every factory reachable from `a`, with its distance, in id order.
    pub fn neighbors(&self, a: FactoryId) -> impl Iterator<Item = (FactoryId, u32)> + '_ {
        let row = self.index(a, 0);
        self.shortest[row..row + self.count]
            .iter()
            .enumerate()
            .filter_map(|(b, d)| d.map(|d| (b, d)))
    }

    fn index(&self, a: FactoryId, b: FactoryId) -> usize {
        assert!(
            a < self.count && b < self.count,
            "factory id out of range: ({a}, {b}) with {} factories",
            self.count
        );
        a * self.count + b
    }
}

/// All-pairs shortest paths. The diagonal stays `None`.
fn floyd_warshall(n: usize, direct: &[Option<u32>]) -> Vec<Option<u32>> {
    let mut dist = direct.to_vec();
    for k in 0..n {
        for i in 0..n {
            if i == k {
                continue;
            }
            let Some(ik) = dist[i * n + k] else { continue };
            for j in 0..n {
                if j == i || j == k {
                    continue;
                }
                let Some(kj) = dist[k * n + j] else { continue };
                let via = ik.saturating_add(kj);
                let cell = &mut dist[i * n + j];
                if cell.map_or(true, |d| via < d) {
                    *cell = Some(via);
                }
            }
        }
    }
    dist
}
