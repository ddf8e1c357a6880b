// Python bindings live in their own crate so `cargo test` on the core does not link libpython.
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use ::map_adjacency_rust::{default_config, process, process_dynamic, ColorRegistry, Config, Params};

fn build_config_from_kwargs(delimiter: &str, threads: Option<usize>, verbose: bool) -> PyResult<Config> {
    let mut cfg = default_config();
    let [d] = delimiter.as_bytes() else {
        return Err(PyValueError::new_err("delimiter must be a single character"));
    };
    cfg.delimiter = *d;
    if let Some(v) = threads { cfg.num_threads = v.max(1); }
    cfg.verbose = verbose;
    Ok(cfg)
}

fn runtime_err(e: anyhow::Error) -> PyErr {
    PyRuntimeError::new_err(format!("{e:#}"))
}

/// Bordering region pairs of a PIL image, as a sorted list of `(low, high)` tuples.
#[pyfunction]
#[pyo3(signature = (image, table_path, *, delimiter = ",", threads = None))]
pub fn find_edges(
    image: &PyAny,
    table_path: &str,
    delimiter: &str,
    threads: Option<usize>,
) -> PyResult<Vec<(u32, u32)>> {
    let cfg = build_config_from_kwargs(delimiter, threads, false)?;

    // Ensure RGB and pull pixel data
    let img_rgb = image.call_method1("convert", ("RGB",))?;
    let (w, h): (u32, u32) = img_rgb.getattr("size")?.extract()?;
    let data: Vec<u8> = img_rgb.call_method0("tobytes")?.extract()?;
    let buf = image::ImageBuffer::<image::Rgb<u8>, Vec<u8>>::from_raw(w, h, data)
        .ok_or_else(|| PyValueError::new_err("Invalid image buffer size"))?;
    let dyn_img = image::DynamicImage::ImageRgb8(buf);

    let registry = ColorRegistry::from_file(table_path, cfg.delimiter).map_err(runtime_err)?;
    let edges = image.py().allow_threads(|| process_dynamic(&dyn_img, &registry, &cfg)).map_err(runtime_err)?;
    Ok(edges.pairs())
}

/// File-to-file conversion; returns the number of edges written.
/// With `verbose`, progress lines go to Python `logging` under the
/// `map_adjacency_rust` logger at INFO level.
#[pyfunction]
#[pyo3(signature = (table_path, image_path, output_path, *, delimiter = ",", threads = None, verbose = false))]
pub fn find_edges_file(
    py: Python<'_>,
    table_path: &str,
    image_path: &str,
    output_path: &str,
    delimiter: &str,
    threads: Option<usize>,
    verbose: bool,
) -> PyResult<usize> {
    let config = build_config_from_kwargs(delimiter, threads, verbose)?;
    let params = Params {
        table_path: table_path.to_string(),
        image_path: image_path.to_string(),
        output_path: output_path.to_string(),
        config,
    };
    py.allow_threads(|| process(params)).map_err(runtime_err)
}

#[pymodule]
fn map_adjacency(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    // Route `log` records into Python `logging`; a logger may already be set on re-import.
    let _ = pyo3_log::try_init();
    m.add_function(wrap_pyfunction!(find_edges, m)?)?;
    m.add_function(wrap_pyfunction!(find_edges_file, m)?)?;
    Ok(())
}
