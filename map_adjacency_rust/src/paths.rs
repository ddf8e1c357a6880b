use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::edges::EdgeSet;

const INF: u32 = u32::MAX;
const NO_PRED: u32 = u32::MAX;

/// Largest node count accepted; the two `n * n` matrices take 8 bytes per cell.
pub const MAX_NODES: usize = 1 << 13;

/// Read whitespace separated `u v` pairs. Reading stops at the first token
/// that is not a non-negative integer, or at a dangling odd token.
pub fn read_edge_list<R: Read>(mut reader: R) -> Result<Vec<(usize, usize)>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let mut tokens = text.split_whitespace().map(|t| t.parse::<usize>());
    let mut out = Vec::new();
    while let (Some(Ok(u)), Some(Ok(v))) = (tokens.next(), tokens.next()) {
        out.push((u, v));
    }
    Ok(out)
}

pub fn read_edge_file<P: AsRef<Path>>(path: P) -> Result<Vec<(usize, usize)>> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading edge list {}", path.display()))?;
    read_edge_list(bytes.as_slice())
}

/// All-pairs shortest hop paths (Floyd-Warshall) over an undirected,
/// unit-weight graph whose nodes are `0..=max id`.
#[derive(Debug, Clone)]
pub struct PathFinder {
    n: usize,
    dist: Vec<u32>,
    pred: Vec<u32>,
}

impl PathFinder {
    /// Fails when an id is `MAX_NODES` or larger.
    pub fn new(edges: &[(usize, usize)]) -> Result<Self> {
        let n = match edges.iter().map(|&(u, v)| u.max(v)).max() {
            None => 0,
            Some(max_id) if max_id < MAX_NODES => max_id + 1,
            Some(max_id) => bail!("node id {} exceeds the limit of {} nodes", max_id, MAX_NODES),
        };
        let mut dist = vec![INF; n * n];
        let mut pred = vec![NO_PRED; n * n];
        for i in 0..n {
            dist[i * n + i] = 0;
            pred[i * n + i] = i as u32;
        }
        for &(u, v) in edges {
            if u == v { continue; }
            dist[u * n + v] = 1; pred[u * n + v] = u as u32;
            dist[v * n + u] = 1; pred[v * n + u] = v as u32;
        }
        let mut pf = Self { n, dist, pred };
        pf.relax();
        Ok(pf)
    }

    pub fn from_edge_set(edges: &EdgeSet) -> Result<Self> {
        let list: Vec<(usize, usize)> = edges.iter().map(|e| (e.low() as usize, e.high() as usize)).collect();
        Self::new(&list)
    }

    fn relax(&mut self) {
        let n = self.n;
        for k in 0..n {
            for i in 0..n {
                let ik = self.dist[i * n + k];
                if ik == INF { continue; }
                for j in 0..n {
                    let kj = self.dist[k * n + j];
                    if kj == INF { continue; }
                    let through = ik + kj;
                    if through < self.dist[i * n + j] {
                        self.dist[i * n + j] = through;
                        self.pred[i * n + j] = self.pred[k * n + j];
                    }
                }
            }
        }
    }

    pub fn node_count(&self) -> usize { self.n }

    pub fn distance(&self, i: usize, j: usize) -> Option<u32> {
        if i >= self.n || j >= self.n { return None; }
        match self.dist[i * self.n + j] {
            INF => None,
            d => Some(d),
        }
    }

    /// Node sequence from `i` to `j`, both ends included.
    pub fn path(&self, i: usize, j: usize) -> Option<Vec<usize>> {
        self.distance(i, j)?;
        let mut out = vec![j];
        let mut cur = j;
        while cur != i {
            cur = self.pred[i * self.n + cur] as usize;
            out.push(cur);
        }
        out.reverse();
        Some(out)
    }

    /// `(i, j): i ... j` for every `j >= i`, or `(i, j): No path`.
    pub fn write_all_paths<W: Write>(&self, mut w: W) -> Result<()> {
        for i in 0..self.n {
            for j in i..self.n {
                write!(w, "({}, {}):", i, j)?;
                match self.path(i, j) {
                    Some(p) => for node in p { write!(w, " {}", node)?; },
                    None => write!(w, " No path")?,
                }
                writeln!(w)?;
            }
        }
        w.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::Edge;

    #[test]
    fn edge_list_stops_at_garbage() {
        let list = read_edge_list("0 1\n1 2\nx 5\n3 4".as_bytes()).unwrap();
        assert_eq!(list, vec![(0, 1), (1, 2)]);
        let odd = read_edge_list("0 1 2".as_bytes()).unwrap();
        assert_eq!(odd, vec![(0, 1)]);
    }

    #[test]
    fn chain_paths() {
        let pf = PathFinder::new(&[(0, 1), (1, 2), (2, 3)]).unwrap();
        assert_eq!(pf.node_count(), 4);
        assert_eq!(pf.path(0, 3), Some(vec![0, 1, 2, 3]));
        assert_eq!(pf.path(3, 0), Some(vec![3, 2, 1, 0]));
        assert_eq!(pf.path(2, 2), Some(vec![2]));
        assert_eq!(pf.distance(0, 3), Some(3));
    }

    #[test]
    fn unlisted_pairs_are_unreachable() {
        // node 2 never appears in an edge
        let pf = PathFinder::new(&[(0, 1), (3, 4)]).unwrap();
        assert_eq!(pf.path(0, 1), Some(vec![0, 1]));
        assert_eq!(pf.path(0, 3), None);
        assert_eq!(pf.path(1, 2), None);
        assert_eq!(pf.distance(9, 0), None);
    }

    #[test]
    fn shortcut_wins() {
        let pf = PathFinder::new(&[(0, 1), (1, 2), (2, 3), (0, 3)]).unwrap();
        assert_eq!(pf.distance(0, 3), Some(1));
        assert_eq!(pf.distance(1, 3), Some(2));
    }

    #[test]
    fn listing_format() {
        let set: EdgeSet = [Edge::new(1, 0).unwrap()].into_iter().collect();
        let pf = PathFinder::from_edge_set(&set).unwrap();
        let mut out = Vec::new();
        pf.write_all_paths(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(0, 0): 0\n(0, 1): 0 1\n(1, 1): 1\n");

        let pf = PathFinder::new(&[(0, 2)]).unwrap();
        let mut out = Vec::new();
        pf.write_all_paths(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("(0, 1): No path\n"));
    }

    #[test]
    fn empty_graph() {
        let pf = PathFinder::new(&[]).unwrap();
        assert_eq!(pf.node_count(), 0);
        let mut out = Vec::new();
        pf.write_all_paths(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn oversized_ids_are_rejected() {
        let list = read_edge_list("0 18446744073709551615".as_bytes()).unwrap();
        assert!(PathFinder::new(&list).is_err());
        let err = PathFinder::new(&[(0, 100_000)]).unwrap_err();
        assert!(err.to_string().contains("100000"), "{err}");
        assert!(PathFinder::new(&[(0, MAX_NODES)]).is_err());
    }
}
