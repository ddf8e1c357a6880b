use anyhow::{Context, Result};
use std::collections::btree_set::{self, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::registry::RegionId;

/// Undirected border between two distinct regions, stored smaller id first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    a: RegionId,
    b: RegionId,
}

impl Edge {
    /// `None` when both ends are the same region.
    pub fn new(u: RegionId, v: RegionId) -> Option<Self> {
        match u.cmp(&v) {
            std::cmp::Ordering::Less => Some(Self { a: u, b: v }),
            std::cmp::Ordering::Greater => Some(Self { a: v, b: u }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> RegionId { self.a }

    pub fn high(&self) -> RegionId { self.b }

    pub fn pair(&self) -> (RegionId, RegionId) { (self.a, self.b) }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSet {
    edges: BTreeSet<Edge>,
}

impl EdgeSet {
    pub fn new() -> Self { Self::default() }

    /// Returns true if the edge was not already present.
    pub fn insert(&mut self, edge: Edge) -> bool { self.edges.insert(edge) }

    /// Set union; used to combine partial scans.
    pub fn merge(&mut self, mut other: EdgeSet) {
        if self.edges.len() < other.edges.len() {
            other.edges.append(&mut self.edges);
            *self = other;
        } else {
            self.edges.extend(other.edges);
        }
    }

    pub fn contains(&self, u: RegionId, v: RegionId) -> bool {
        Edge::new(u, v).is_some_and(|e| self.edges.contains(&e))
    }

    pub fn len(&self) -> usize { self.edges.len() }

    pub fn is_empty(&self) -> bool { self.edges.is_empty() }

    pub fn iter(&self) -> btree_set::Iter<'_, Edge> { self.edges.iter() }

    pub fn pairs(&self) -> Vec<(RegionId, RegionId)> {
        self.edges.iter().map(Edge::pair).collect()
    }

    /// One `<low> <high>` line per edge.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<()> {
        for e in &self.edges {
            writeln!(w, "{} {}", e.a, e.b)?;
        }
        w.flush()?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        self.write_to(BufWriter::new(f))
            .with_context(|| format!("writing edges to {}", path.display()))
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = &'a Edge;
    type IntoIter = btree_set::Iter<'a, Edge>;
    fn into_iter(self) -> Self::IntoIter { self.edges.iter() }
}

impl Extend<Edge> for EdgeSet {
    fn extend<T: IntoIterator<Item = Edge>>(&mut self, iter: T) { self.edges.extend(iter) }
}

impl FromIterator<Edge> for EdgeSet {
    fn from_iter<T: IntoIterator<Item = Edge>>(iter: T) -> Self {
        Self { edges: iter.into_iter().collect() }
    }
}
