//! Single-run vector addition demo: enumerate devices, stage two index-filled
//! vectors, build `add_vectors` from its source file, dispatch once and print
//! the summed result.

use std::process;

use vecadd_cl::{format_result, load_kernel_source, ClError, LaunchConfig, Pipeline, Selection};

#[cfg(feature = "trace")]
use vecadd_cl::{flush_csv, span, Phase};

const KERNEL_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/kernels/add_vectors.cl");

fn main() {
    // Single catch boundary for the whole workflow. A caught error is
    // reported once and mapped to a failing exit status.
    if let Err(err) = run() {
        eprintln!("{err} ERROR CODE ({})", err.code());
        process::exit(1);
    }
}

fn run() -> Result<(), ClError> {
    let cfg = LaunchConfig::default();

    // 1) Host data: both inputs carry the index pattern, so out[i] == 2*i.
    let in_a: Vec<f32> = (0..cfg.vector_size).map(|i| i as f32).collect();
    let in_b = in_a.clone();

    // 2) Discovery & capability report
    let selection = Selection::discover()?;
    print!("{}", selection.report()?);

    // 3) Context & queue on the primary device
    let pipeline = Pipeline::create(&selection)?;

    // 4) Host -> device staging (blocking writes, A then B)
    #[cfg(feature = "trace")]
    let tok_h2d = span(Phase::HostToDevice, 2 * cfg.byte_size());
    let staged = pipeline.stage_inputs(&cfg, &in_a, &in_b)?;
    #[cfg(feature = "trace")]
    tok_h2d.finish();

    // 5) Program build from file
    let source = load_kernel_source(KERNEL_PATH)?;
    println!("Source code: {source}");
    let kernel = pipeline.build_kernel(&source)?;

    // 6) Dispatch; no explicit wait, the readback below is the barrier
    #[cfg(feature = "trace")]
    let tok_kernel = span(Phase::Kernel, 0);
    pipeline.dispatch(&kernel, &staged, &cfg)?;
    #[cfg(feature = "trace")]
    tok_kernel.finish();

    // 7) Blocking readback & report
    #[cfg(feature = "trace")]
    let tok_d2h = span(Phase::DeviceToHost, cfg.byte_size());
    let out = pipeline.read_result(&staged, &cfg)?;
    #[cfg(feature = "trace")]
    tok_d2h.finish();

    assert!(out.iter().enumerate().all(|(i, &v)| v == (2 * i) as f32));
    println!("{}", format_result(&out));

    #[cfg(feature = "trace")]
    flush_csv();

    Ok(())
}
