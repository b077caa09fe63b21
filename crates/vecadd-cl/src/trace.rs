#![cfg(feature = "trace")]
//! Coarse host-side timing of transfer and kernel phases, flushed as CSV at
//! program end. Opt-in via the `trace` feature; zero cost otherwise.

use once_cell::sync::Lazy;
use std::{fs::File, io::Write, sync::Mutex, time::Instant};

#[derive(Clone, Copy)]
pub enum Phase {
    HostToDevice,
    DeviceToHost,
    Kernel,
}

impl Phase {
    fn label(self) -> &'static str {
        match self {
            Phase::HostToDevice => "H2D",
            Phase::DeviceToHost => "D2H",
            Phase::Kernel => "Kernel",
        }
    }
}

/// Zero point, fixed by the first span.
static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

struct Record {
    start_us: u128,
    end_us: u128,
    bytes: usize,
    label: &'static str,
}

static LOG: Lazy<Mutex<Vec<Record>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Open span; finished spans land in the log.
pub struct Span {
    start: Instant,
    bytes: usize,
    phase: Phase,
}

pub fn span(phase: Phase, bytes: usize) -> Span {
    Lazy::force(&EPOCH);
    Span { start: Instant::now(), bytes, phase }
}

impl Span {
    pub fn finish(self) {
        let t0 = *EPOCH;
        let record = Record {
            start_us: self.start.duration_since(t0).as_micros(),
            end_us: t0.elapsed().as_micros(),
            bytes: self.bytes,
            label: self.phase.label(),
        };
        LOG.lock().unwrap().push(record);
    }
}

/// Writes `trace.csv` into the working directory. Call once at program end.
pub fn flush_csv() {
    let mut f = File::create("trace.csv").expect("create trace.csv");
    writeln!(f, "t_start_us,t_end_us,bytes,phase").unwrap();
    for r in LOG.lock().unwrap().iter() {
        writeln!(f, "{},{},{},{}", r.start_us, r.end_us, r.bytes, r.label).unwrap();
    }
}
