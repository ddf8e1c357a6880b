use anyhow::{Context, Result};
use image::{io::Reader as ImageReader, DynamicImage};
use log::{debug, info};
use std::path::Path;
use std::time::Instant;

pub mod edges;
pub mod extract;
pub mod grid;
pub mod paths;
pub mod registry;

pub use edges::{Edge, EdgeSet};
pub use extract::AdjacencyExtractor;
pub use grid::Grid;
pub use paths::{read_edge_file, read_edge_list, PathFinder};
pub use registry::{Color, ColorRegistry, RegionId};

#[derive(Debug, Clone)]
pub struct Config {
    /// Field separator of the color table.
    pub delimiter: u8,
    pub num_threads: usize,
    /// Emit progress lines through `log`.
    pub verbose: bool,
}

pub fn default_config() -> Config {
    Config { delimiter: b',', num_threads: num_cpus::get().max(1), verbose: false }
}

#[derive(Debug, Clone)]
pub struct Params {
    pub table_path: String,
    pub image_path: String,
    pub output_path: String,
    pub config: Config,
}

macro_rules! progress {
    ($cfg:expr, $($arg:tt)+) => {
        if $cfg.verbose { info!($($arg)+); }
    };
}

pub fn load_grid<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let path = path.as_ref();
    let dyn_img = ImageReader::open(path)
        .with_context(|| format!("opening image {}", path.display()))?
        .decode()
        .with_context(|| format!("decoding image {}", path.display()))?;
    Ok(Grid::from_rgb_image(&dyn_img.to_rgb8()))
}

fn scan(grid: &Grid, registry: &ColorRegistry, config: &Config) -> EdgeSet {
    let extractor = AdjacencyExtractor::new(registry);
    if config.num_threads > 1 {
        extractor.scan_parallel(grid, config.num_threads)
    } else {
        extractor.scan(grid)
    }
}

/// Edge extraction on an image already in memory.
pub fn process_dynamic(dyn_img: &DynamicImage, registry: &ColorRegistry, config: &Config) -> Result<EdgeSet> {
    let grid = Grid::from_rgb_image(&dyn_img.to_rgb8());
    progress!(config, "Finding neighboring regions in {}x{} image...", grid.width(), grid.height());
    Ok(scan(&grid, registry, config))
}

/// Table + image on disk to edge file on disk. The output file is only
/// created once the full edge set is known. Returns the number of edges.
pub fn process(params: Params) -> Result<usize> {
    let Params { table_path, image_path, output_path, config } = params;
    let start = Instant::now();

    progress!(config, "Generating RGB lookup from {}...", table_path);
    let registry = ColorRegistry::from_file(&table_path, config.delimiter)?;
    progress!(config, "Registered {} regions", registry.len());

    progress!(config, "Opening image {}...", image_path);
    let grid = load_grid(&image_path)?;

    progress!(config, "Finding neighboring regions in {}x{} image ({} threads)...", grid.width(), grid.height(), config.num_threads);
    let edges = scan(&grid, &registry, &config);
    drop(grid);

    progress!(config, "Writing {} edges to {}...", edges.len(), output_path);
    edges.save(&output_path)?;
    debug!("process finished in {} ms", start.elapsed().as_millis());
    Ok(edges.len())
}

/// Print every pairwise path of the edge list at `path` to `out`.
pub fn process_paths<P: AsRef<Path>, W: std::io::Write>(path: P, out: W) -> Result<()> {
    let list = read_edge_file(path)?;
    let finder = PathFinder::new(&list)?;
    debug!("path finder built over {} nodes", finder.node_count());
    finder.write_all_paths(out)
}
