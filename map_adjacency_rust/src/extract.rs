use parking_lot::Mutex;
use std::ops::Range;
use std::thread;

use crate::edges::{Edge, EdgeSet};
use crate::grid::Grid;
use crate::registry::ColorRegistry;

// up, down, left, right
const DX: [isize; 4] = [0, 0, -1, 1];
const DY: [isize; 4] = [-1, 1, 0, 0];

/// Finds region borders by comparing every interior pixel with its four
/// axis-aligned neighbors.
///
/// The outermost ring of pixels is never used as a scan center, so a border
/// that only touches along the image frame is not reported. Colors missing
/// from the registry (sea, wasteland) are skipped silently.
#[derive(Clone, Copy)]
pub struct AdjacencyExtractor<'a> {
    registry: &'a ColorRegistry,
}

impl<'a> AdjacencyExtractor<'a> {
    pub fn new(registry: &'a ColorRegistry) -> Self { Self { registry } }

    pub fn scan(&self, grid: &Grid) -> EdgeSet {
        self.scan_rows(grid, grid.interior_rows())
    }

    /// Scan only the center rows in `rows`, clamped to the interior.
    pub fn scan_rows(&self, grid: &Grid, rows: Range<usize>) -> EdgeSet {
        let interior = grid.interior_rows();
        let start = rows.start.max(interior.start);
        let end = rows.end.min(interior.end);
        let mut edges = EdgeSet::new();
        for y in start..end {
            self.scan_row(grid, y, &mut edges);
        }
        edges
    }

    /// Same result as [`scan`](Self::scan), with rows handed out to
    /// `num_threads` workers and the partial sets unioned afterwards.
    pub fn scan_parallel(&self, grid: &Grid, num_threads: usize) -> EdgeSet {
        let rows = grid.interior_rows();
        if num_threads <= 1 || rows.len() <= 1 {
            return self.scan(grid);
        }
        let queue = RowQueue::new(rows);
        let merged = Mutex::new(EdgeSet::new());
        thread::scope(|s| {
            for _ in 0..num_threads.min(queue.len()) {
                s.spawn(|| {
                    let mut local = EdgeSet::new();
                    while let Some(y) = queue.next() {
                        self.scan_row(grid, y, &mut local);
                    }
                    merged.lock().merge(local);
                });
            }
        });
        merged.into_inner()
    }

    fn scan_row(&self, grid: &Grid, y: usize, edges: &mut EdgeSet) {
        for x in grid.interior_cols() {
            let k = grid.get(x, y);
            for i in 0..4 {
                // interior centers keep every offset in bounds
                let nx = (x as isize + DX[i]) as usize;
                let ny = (y as isize + DY[i]) as usize;
                let n = grid.get(nx, ny);
                if n == k { continue; }
                let Some(a) = self.registry.get(&k) else { continue };
                let Some(b) = self.registry.get(&n) else { continue };
                if let Some(edge) = Edge::new(a, b) {
                    edges.insert(edge);
                }
            }
        }
    }
}

struct RowQueue { next: Mutex<usize>, end: usize }

impl RowQueue {
    fn new(rows: Range<usize>) -> Self { Self { next: Mutex::new(rows.start), end: rows.end } }
    fn len(&self) -> usize { self.end.saturating_sub(*self.next.lock()) }
    fn next(&self) -> Option<usize> {
        let mut guard = self.next.lock();
        if *guard >= self.end { return None; }
        let y = *guard; *guard += 1;
        Some(y)
    }
}
