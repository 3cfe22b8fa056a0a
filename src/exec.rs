//! Execution-mode dispatch (spec.md §9 "Execution-mode templates").
//!
//! The source selects sequential/OpenMP/CUDA/HIP at template instantiation
//! time. Here that collapses to one descriptor, [`ExecMode`], chosen at
//! `init()` from the mesh's memory residency, plus one dispatch primitive,
//! [`for_all`], so the same per-pair/per-plane body is usable under any
//! mode. Device execution is out of this core's scope (spec.md §1); the
//! variant exists so the coupling-scheme state machine has somewhere to
//! route it without a later breaking change.

/// Where a mesh's buffers live, and therefore how `for_all` should run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecMode {
    Sequential,
    HostParallel,
    DeviceParallel,
}

impl ExecMode {
    /// Select a mode for host-resident mesh data. `prefer_parallel` mirrors
    /// a host-level toggle (e.g. "run with multiple threads") independent
    /// of mesh residency.
    pub fn for_host(prefer_parallel: bool) -> Self {
        if prefer_parallel {
            ExecMode::HostParallel
        } else {
            ExecMode::Sequential
        }
    }
}

/// Run `body(i)` for `i in 0..n`, collecting the results, under `mode`.
///
/// `DeviceParallel` is not implemented by this core (no GPU backend is in
/// scope); callers must not select it for execution and should treat it
/// as reserved for a future device-resident mesh view.
pub fn for_all<T, F>(mode: ExecMode, n: usize, body: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    match mode {
        ExecMode::Sequential => (0..n).map(body).collect(),
        ExecMode::HostParallel => {
            use rayon::prelude::*;
            (0..n).into_par_iter().map(body).collect()
        }
        ExecMode::DeviceParallel => {
            panic!("DeviceParallel execution has no implementation in this core");
        }
    }
}
