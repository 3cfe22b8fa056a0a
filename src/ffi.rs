//! C-compatible host API (spec.md §6).
//!
//! The source's singleton mesh/coupling-scheme registries (spec.md §5:
//! "constructed at `initialize()`, torn down at `finalize()`; concurrent
//! registration of meshes is not permitted") are reframed here as a single
//! `Mutex`-guarded registry behind a `OnceLock`, following the same
//! lazily-built, process-wide cache shape the pack uses for its own
//! query-world cache. Every entry point is `extern "C"` and returns a
//! status code rather than a `Result`, since this boundary has no Rust
//! caller on the other side.
//!
//! # Safety
//! Every function taking a raw pointer assumes the host supplied a pointer
//! to at least the documented number of elements, or null. Passing a
//! shorter buffer is undefined behavior; this layer cannot check it.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::config::{
    Binning, ContactCase, ContactMode, CouplingConfig, Enforcement, LagrangeOptions, LogLevel, Method, Model,
    PenaltyOptions, Tolerances,
};
use crate::coupling::{CouplingScheme, CycleReport};
use crate::exec::ExecMode;
use crate::mesh::MeshView;
use crate::sparse::{assemble_csr, CsrMatrix, Triplet};

pub const STATUS_OK: i32 = 0;
pub const STATUS_UNKNOWN_MESH: i32 = 1;
pub const STATUS_UNKNOWN_SCHEME: i32 = 2;
pub const STATUS_NULL_POINTER: i32 = 3;
pub const STATUS_CONFIG_ERROR: i32 = 4;
pub const STATUS_NOT_INITIALIZED: i32 = 5;

struct Registry {
    dim: usize,
    meshes: HashMap<u32, MeshView>,
    schemes: HashMap<u32, (CouplingScheme, u32, u32)>,
    last_csr: HashMap<u32, CsrMatrix>,
}

static REGISTRY: OnceLock<Mutex<Option<Registry>>> = OnceLock::new();

fn registry() -> &'static Mutex<Option<Registry>> {
    REGISTRY.get_or_init(|| Mutex::new(None))
}

/// `initialize(dim, communicator)`. `communicator` is accepted and stored
/// only as an opaque handle passed back unexamined: managing MPI topology
/// beyond the supplied communicator is out of scope (spec.md §1).
#[no_mangle]
pub extern "C" fn initialize(dim: usize, communicator: i64) {
    log::info!("initializing contact_mechanics core: dim={dim}, communicator={communicator}");
    let mut guard = registry().lock().expect("registry mutex poisoned");
    *guard = Some(Registry {
        dim,
        meshes: HashMap::new(),
        schemes: HashMap::new(),
        last_csr: HashMap::new(),
    });
}

/// Tear down all process-wide state (spec.md §5).
#[no_mangle]
pub extern "C" fn finalize() {
    let mut guard = registry().lock().expect("registry mutex poisoned");
    *guard = None;
}

/// Register a surface mesh (spec.md §6 `register_mesh`).
///
/// `element_type` is the vertex count per face (2, 3, or 4). Coordinates
/// are supplied as three parallel arrays of length `num_nodes`; `coords_z`
/// may be null when `dim < 3`.
///
/// # Safety
/// `connectivity` must point to `num_faces * element_type` valid `u32`s.
/// `coords_x`/`coords_y` must point to `num_nodes` valid `f64`s; `coords_z`
/// likewise unless `dim < 3`, in which case it may be null.
#[no_mangle]
pub unsafe extern "C" fn register_mesh(
    id: u32,
    num_nodes: usize,
    num_faces: usize,
    connectivity: *const u32,
    element_type: usize,
    coords_x: *const f64,
    coords_y: *const f64,
    coords_z: *const f64,
) -> i32 {
    let mut guard = registry().lock().expect("registry mutex poisoned");
    let Some(reg) = guard.as_mut() else {
        return STATUS_NOT_INITIALIZED;
    };

    if connectivity.is_null() || coords_x.is_null() || (reg.dim >= 2 && coords_y.is_null()) {
        log::warn!("register_mesh({id}): null required pointer");
        return STATUS_NULL_POINTER;
    }

    let connectivity = std::slice::from_raw_parts(connectivity, num_faces * element_type).to_vec();
    let xs = std::slice::from_raw_parts(coords_x, num_nodes);
    let ys = if reg.dim >= 2 {
        std::slice::from_raw_parts(coords_y, num_nodes)
    } else {
        &[]
    };
    let zs = if reg.dim >= 3 && !coords_z.is_null() {
        std::slice::from_raw_parts(coords_z, num_nodes)
    } else {
        &[]
    };

    let mut coords = Vec::with_capacity(num_nodes * reg.dim);
    for i in 0..num_nodes {
        coords.push(xs[i]);
        if reg.dim >= 2 {
            coords.push(ys[i]);
        }
        if reg.dim >= 3 {
            coords.push(zs.get(i).copied().unwrap_or(0.0));
        }
    }

    match MeshView::new(id, reg.dim, element_type, num_nodes, connectivity, coords) {
        Ok(mesh) => {
            reg.meshes.insert(id, mesh);
            STATUS_OK
        }
        Err(e) => {
            log::warn!("register_mesh({id}) rejected: {e}");
            STATUS_NULL_POINTER
        }
    }
}

/// # Safety
/// `vx`/`vy`/`vz` must point to `num_nodes` valid `f64`s (per the mesh's
/// registered `dim`); `vz` may be null when `dim < 3`.
#[no_mangle]
pub unsafe extern "C" fn register_nodal_velocities(mesh_id: u32, vx: *const f64, vy: *const f64, vz: *const f64) -> i32 {
    let Some((dim, num_nodes)) = mesh_shape(mesh_id) else {
        return STATUS_UNKNOWN_MESH;
    };
    let interleaved = interleave(dim, num_nodes, vx, vy, vz);
    with_mesh_mut(mesh_id, |mesh| match mesh.register_velocities(interleaved) {
        Ok(()) => STATUS_OK,
        Err(e) => {
            log::warn!("register_nodal_velocities({mesh_id}) rejected: {e}");
            STATUS_NULL_POINTER
        }
    })
}

/// `register_nodal_displacements`: overwrite the mesh's current position
/// buffer (spec.md §6). This core tracks only current, not reference,
/// configuration.
///
/// # Safety
/// Same pointer contract as [`register_nodal_velocities`].
#[no_mangle]
pub unsafe extern "C" fn register_nodal_displacements(mesh_id: u32, dx: *const f64, dy: *const f64, dz: *const f64) -> i32 {
    let Some((dim, num_nodes)) = mesh_shape(mesh_id) else {
        return STATUS_UNKNOWN_MESH;
    };
    let interleaved = interleave(dim, num_nodes, dx, dy, dz);
    with_mesh_mut(mesh_id, |mesh| match mesh.update_coords(interleaved) {
        Ok(()) => STATUS_OK,
        Err(e) => {
            log::warn!("register_nodal_displacements({mesh_id}) rejected: {e}");
            STATUS_NULL_POINTER
        }
    })
}

fn mesh_shape(mesh_id: u32) -> Option<(usize, usize)> {
    let guard = registry().lock().expect("registry mutex poisoned");
    let reg = guard.as_ref()?;
    let mesh = reg.meshes.get(&mesh_id)?;
    Some((mesh.dim, mesh.num_nodes()))
}

/// `register_nodal_response`: mark that the host intends to read force
/// accumulation back for `mesh_id` (required by penalty enforcement).
#[no_mangle]
pub extern "C" fn register_nodal_response(mesh_id: u32) -> i32 {
    with_mesh_mut(mesh_id, |mesh| {
        mesh.register_response_sink();
        STATUS_OK
    })
}

unsafe fn interleave(dim: usize, num_nodes: usize, x: *const f64, y: *const f64, z: *const f64) -> Vec<f64> {
    let xs = std::slice::from_raw_parts(x, num_nodes);
    let ys = if dim >= 2 && !y.is_null() {
        std::slice::from_raw_parts(y, num_nodes)
    } else {
        &[]
    };
    let zs = if dim >= 3 && !z.is_null() {
        std::slice::from_raw_parts(z, num_nodes)
    } else {
        &[]
    };
    let mut out = Vec::with_capacity(num_nodes * dim);
    for i in 0..num_nodes {
        out.push(xs[i]);
        if dim >= 2 {
            out.push(ys.get(i).copied().unwrap_or(0.0));
        }
        if dim >= 3 {
            out.push(zs.get(i).copied().unwrap_or(0.0));
        }
    }
    out
}

fn with_mesh_mut(mesh_id: u32, f: impl FnOnce(&mut MeshView) -> i32) -> i32 {
    let mut guard = registry().lock().expect("registry mutex poisoned");
    let Some(reg) = guard.as_mut() else {
        return STATUS_NOT_INITIALIZED;
    };
    match reg.meshes.get_mut(&mesh_id) {
        Some(mesh) => f(mesh),
        None => {
            log::warn!("unknown mesh id {mesh_id}");
            STATUS_UNKNOWN_MESH
        }
    }
}

/// `create_coupling_scheme(id, mesh_id_1, mesh_id_2, mode, case, method, model, enforcement, binning)`.
/// The enum values are the `#[repr(u32)]` discriminants from [`crate::config`].
/// Options (`set_penalty_options`/`set_lagrange_options`) must be set before
/// the first `update()`; `init()` runs implicitly on first `update()`.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn create_coupling_scheme(
    id: u32,
    mesh_id_1: u32,
    mesh_id_2: u32,
    mode: u32,
    case: u32,
    method: u32,
    model: u32,
    enforcement: u32,
    binning: u32,
) -> i32 {
    let Some(mode) = decode_mode(mode) else { return STATUS_CONFIG_ERROR };
    let Some(case) = decode_case(case) else { return STATUS_CONFIG_ERROR };
    let Some(method) = decode_method(method) else { return STATUS_CONFIG_ERROR };
    let Some(model) = decode_model(model) else { return STATUS_CONFIG_ERROR };
    let Some(enforcement) = decode_enforcement(enforcement) else { return STATUS_CONFIG_ERROR };
    let Some(binning) = decode_binning(binning) else { return STATUS_CONFIG_ERROR };

    let config = CouplingConfig {
        mode,
        case,
        method,
        model,
        enforcement,
        binning,
        penalty: None,
        lagrange: None,
        tolerances: Tolerances::default(),
        log_level: LogLevel::Info,
    };

    let mut guard = registry().lock().expect("registry mutex poisoned");
    let Some(reg) = guard.as_mut() else {
        return STATUS_NOT_INITIALIZED;
    };
    if !reg.meshes.contains_key(&mesh_id_1) || !reg.meshes.contains_key(&mesh_id_2) {
        return STATUS_UNKNOWN_MESH;
    }

    let scheme = CouplingScheme::new(config, ExecMode::for_host(true));
    reg.schemes.insert(id, (scheme, mesh_id_1, mesh_id_2));
    STATUS_OK
}

#[no_mangle]
pub extern "C" fn set_penalty_options(scheme_id: u32, constant_stiffness: i32, k_constant: f64, k_host: f64) -> i32 {
    with_scheme_mut(scheme_id, |scheme, _, _| {
        *scheme.penalty_options_mut() = Some(PenaltyOptions {
            constant_stiffness: constant_stiffness != 0,
            k_constant,
            k_host,
        });
        STATUS_OK
    })
}

#[no_mangle]
pub extern "C" fn set_lagrange_options(scheme_id: u32, gauss_points_per_dim: usize) -> i32 {
    with_scheme_mut(scheme_id, |scheme, _, _| {
        *scheme.lagrange_options_mut() = Some(LagrangeOptions { gauss_points_per_dim });
        STATUS_OK
    })
}

fn with_scheme_mut(scheme_id: u32, f: impl FnOnce(&mut CouplingScheme, u32, u32) -> i32) -> i32 {
    let mut guard = registry().lock().expect("registry mutex poisoned");
    let Some(reg) = guard.as_mut() else {
        return STATUS_NOT_INITIALIZED;
    };
    match reg.schemes.get_mut(&scheme_id) {
        Some((scheme, m1, m2)) => f(scheme, *m1, *m2),
        None => STATUS_UNKNOWN_SCHEME,
    }
}

/// `update(cycle, time, dt_inout) -> status` (spec.md §6). Drives one full
/// cycle: binning, contact-plane construction, physics, timestep vote.
/// `dt_inout` is read as the proposed timestep and overwritten with the
/// recommended one.
///
/// # Safety
/// `dt_inout` must point to one valid, writable `f64`.
#[no_mangle]
pub unsafe extern "C" fn update(scheme_id: u32, cycle: u64, _time: f64, dt_inout: *mut f64) -> i32 {
    if dt_inout.is_null() {
        return STATUS_NULL_POINTER;
    }
    let proposed_dt = *dt_inout;

    let mut guard = registry().lock().expect("registry mutex poisoned");
    let Some(reg) = guard.as_mut() else {
        return STATUS_NOT_INITIALIZED;
    };
    let Some((scheme, mesh_id_1, mesh_id_2)) = reg.schemes.get_mut(&scheme_id) else {
        return STATUS_UNKNOWN_SCHEME;
    };
    let mesh_id_1 = *mesh_id_1;
    let mesh_id_2 = *mesh_id_2;

    let Some(mut mesh1) = reg.meshes.remove(&mesh_id_1) else {
        return STATUS_UNKNOWN_MESH;
    };
    let Some(mut mesh2) = reg.meshes.remove(&mesh_id_2) else {
        reg.meshes.insert(mesh_id_1, mesh1);
        return STATUS_UNKNOWN_MESH;
    };

    if cycle == 0 {
        if let Err(errors) = scheme.init(&mesh1, &mesh2) {
            for e in &errors {
                log::warn!("coupling scheme {scheme_id} init() rejected: {e}");
            }
            reg.meshes.insert(mesh_id_1, mesh1);
            reg.meshes.insert(mesh_id_2, mesh2);
            return STATUS_CONFIG_ERROR;
        }
    }

    scheme.perform_binning(&mut mesh1, &mut mesh2);
    let report: CycleReport = scheme.apply(cycle, &mut mesh1, &mut mesh2, proposed_dt);
    *dt_inout = report.recommended_dt;

    log::info!(
        "cycle {cycle}: {} candidates, {} active planes, {} rejected, dt -> {}",
        report.candidate_pairs,
        report.active_planes,
        report.rejected_pairs(),
        report.recommended_dt
    );

    let csr = build_jacobian_csr(scheme, &mesh1, &mesh2);
    reg.last_csr.insert(scheme_id, csr);

    reg.meshes.insert(mesh_id_1, mesh1);
    reg.meshes.insert(mesh_id_2, mesh2);
    STATUS_OK
}

/// Assemble the nonmortar-mortar coupling block as CSR triplets (spec.md §6
/// "off-diagonal blocks ... CSR form; row indices reference nodes of the
/// nonmortar mesh; column indices ... dim · node_id + d"). Solving the full
/// 4-block system and distinguishing primal-primal/dual-dual is explicitly
/// out of scope (spec.md §1); only the populated off-diagonal block is
/// returned. Empty for non-Lagrange-multiplier enforcement.
fn build_jacobian_csr(scheme: &CouplingScheme, mesh1: &MeshView, mesh2: &MeshView) -> CsrMatrix {
    use crate::physics::build_surface_contact_elem;

    if !matches!(scheme.config().enforcement, Enforcement::LagrangeMultiplier) {
        return assemble_csr(mesh1.num_nodes() as u32, Vec::new());
    }
    let aligned = matches!(scheme.config().method, Method::AlignedMortar);

    let mut triplets = Vec::new();
    for plane in scheme.active_planes() {
        let elem = build_surface_contact_elem(plane, aligned);
        let nodes1 = mesh1.face_nodes(plane.f1);
        let nodes2 = mesh2.face_nodes(plane.f2);
        for (i, &n1) in nodes1.iter().enumerate() {
            for (j, &n2) in nodes2.iter().enumerate() {
                let w = elem.weights_ab[i * elem.v2 + j];
                if w == 0.0 {
                    continue;
                }
                for d in 0..mesh2.dim as u32 {
                    triplets.push(Triplet {
                        row: n1,
                        col: mesh2.dim as u32 * n2 + d,
                        value: w,
                    });
                }
            }
        }
    }
    assemble_csr(mesh1.num_nodes() as u32, triplets)
}

/// Number of currently active contact planes (precedes `get_gap_array` /
/// `get_pressure_array` so the host can size its output buffers).
#[no_mangle]
pub extern "C" fn get_active_plane_count(scheme_id: u32) -> i64 {
    with_scheme(scheme_id, |scheme, _, _| scheme.active_planes().len() as i64).unwrap_or(-1)
}

/// `get_gap_array(scheme_id, out, len)`: writes one gap value per active
/// plane.
///
/// # Safety
/// `out` must point to at least `len` writable `f64`s; `len` should equal
/// [`get_active_plane_count`]'s result.
#[no_mangle]
pub unsafe extern "C" fn get_gap_array(scheme_id: u32, out: *mut f64, len: usize) -> i32 {
    if out.is_null() {
        return STATUS_NULL_POINTER;
    }
    with_scheme(scheme_id, |scheme, _, _| {
        let planes = scheme.active_planes();
        let n = planes.len().min(len);
        let slice = unsafe { std::slice::from_raw_parts_mut(out, n) };
        for (i, plane) in planes.iter().take(n).enumerate() {
            slice[i] = plane.gap;
        }
        STATUS_OK
    })
    .unwrap_or(STATUS_UNKNOWN_SCHEME)
}

/// `get_pressure_array(scheme_id, out, len)`: writes one average contact
/// pressure per active plane (penalty enforcement only; zero for mortar).
///
/// # Safety
/// Same pointer contract as [`get_gap_array`].
#[no_mangle]
pub unsafe extern "C" fn get_pressure_array(scheme_id: u32, out: *mut f64, len: usize) -> i32 {
    if out.is_null() {
        return STATUS_NULL_POINTER;
    }
    with_scheme(scheme_id, |scheme, _, _| {
        let pressures = scheme.last_pressures();
        let n = pressures.len().min(len);
        let slice = unsafe { std::slice::from_raw_parts_mut(out, n) };
        slice.copy_from_slice(&pressures[..n]);
        STATUS_OK
    })
    .unwrap_or(STATUS_UNKNOWN_SCHEME)
}

/// `get_jacobian_CSR(scheme_id, I, J, values, n_rows, n_nnz)`: writes the
/// row-pointer, column-index, and value arrays of the last `update()`'s
/// assembled nonmortar-mortar coupling block.
///
/// # Safety
/// `row_ptr_out` must point to at least `n_rows + 1` writable `u32`s;
/// `col_idx_out`/`values_out` must point to at least the matrix's `nnz`
/// writable `u32`s/`f64`s respectively. Call with null output pointers
/// first to read back sizes via `n_rows_out`/`n_nnz_out`.
#[no_mangle]
pub unsafe extern "C" fn get_jacobian_csr(
    scheme_id: u32,
    row_ptr_out: *mut u32,
    col_idx_out: *mut u32,
    values_out: *mut f64,
    n_rows_out: *mut u32,
    n_nnz_out: *mut u32,
) -> i32 {
    let guard = registry().lock().expect("registry mutex poisoned");
    let Some(reg) = guard.as_ref() else {
        return STATUS_NOT_INITIALIZED;
    };
    let Some(csr) = reg.last_csr.get(&scheme_id) else {
        return STATUS_UNKNOWN_SCHEME;
    };

    if !n_rows_out.is_null() {
        *n_rows_out = csr.num_rows;
    }
    if !n_nnz_out.is_null() {
        *n_nnz_out = csr.nnz() as u32;
    }
    if !row_ptr_out.is_null() {
        std::slice::from_raw_parts_mut(row_ptr_out, csr.row_ptr.len()).copy_from_slice(&csr.row_ptr);
    }
    if !col_idx_out.is_null() {
        std::slice::from_raw_parts_mut(col_idx_out, csr.col_idx.len()).copy_from_slice(&csr.col_idx);
    }
    if !values_out.is_null() {
        std::slice::from_raw_parts_mut(values_out, csr.values.len()).copy_from_slice(&csr.values);
    }
    STATUS_OK
}

fn with_scheme<T>(scheme_id: u32, f: impl FnOnce(&CouplingScheme, u32, u32) -> T) -> Option<T> {
    let guard = registry().lock().expect("registry mutex poisoned");
    let reg = guard.as_ref()?;
    let (scheme, m1, m2) = reg.schemes.get(&scheme_id)?;
    Some(f(scheme, *m1, *m2))
}

fn decode_mode(v: u32) -> Option<ContactMode> {
    match v {
        0 => Some(ContactMode::SurfaceToSurface),
        1 => Some(ContactMode::SurfaceToSurfaceConforming),
        _ => None,
    }
}

fn decode_case(v: u32) -> Option<ContactCase> {
    match v {
        0 => Some(ContactCase::NoCase),
        1 => Some(ContactCase::NoSliding),
        2 => Some(ContactCase::Auto),
        3 => Some(ContactCase::TiedNormal),
        _ => None,
    }
}

fn decode_method(v: u32) -> Option<Method> {
    match v {
        0 => Some(Method::CommonPlane),
        1 => Some(Method::SingleMortar),
        2 => Some(Method::AlignedMortar),
        3 => Some(Method::MortarWeights),
        _ => None,
    }
}

fn decode_model(v: u32) -> Option<Model> {
    match v {
        0 => Some(Model::Frictionless),
        1 => Some(Model::Tied),
        2 => Some(Model::Coulomb),
        3 => Some(Model::NullModel),
        _ => None,
    }
}

fn decode_enforcement(v: u32) -> Option<Enforcement> {
    match v {
        0 => Some(Enforcement::Penalty),
        1 => Some(Enforcement::LagrangeMultiplier),
        2 => Some(Enforcement::NullEnforcement),
        _ => None,
    }
}

fn decode_binning(v: u32) -> Option<Binning> {
    match v {
        0 => Some(Binning::CartesianProduct),
        1 => Some(Binning::Grid),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_quad(z: f64) -> ([f64; 4], [f64; 4], [f64; 4]) {
        ([0.0, 1.0, 1.0, 0.0], [0.0, 0.0, 1.0, 1.0], [z, z, z, z])
    }

    #[test]
    fn lifecycle_runs_one_cycle_and_reports_contact() {
        initialize(3, 0);

        let conn = [0u32, 1, 2, 3];
        let (x1, y1, z1) = flat_quad(0.0);
        unsafe {
            assert_eq!(
                register_mesh(1, 4, 1, conn.as_ptr(), 4, x1.as_ptr(), y1.as_ptr(), z1.as_ptr()),
                STATUS_OK
            );
        }
        let x2 = [0.0, 1.0, 1.0, 0.0];
        let y2 = [1.0, 1.0, 0.0, 0.0];
        let z2 = [-0.05, -0.05, -0.05, -0.05];
        unsafe {
            assert_eq!(
                register_mesh(2, 4, 1, conn.as_ptr(), 4, x2.as_ptr(), y2.as_ptr(), z2.as_ptr()),
                STATUS_OK
            );
        }
        assert_eq!(register_nodal_response(1), STATUS_OK);
        assert_eq!(register_nodal_response(2), STATUS_OK);

        assert_eq!(
            create_coupling_scheme(10, 1, 2, 0, 0, 0, 0, 0, 0),
            STATUS_OK
        );
        assert_eq!(set_penalty_options(10, 1, 50.0, 0.0), STATUS_OK);

        let mut dt = 1.0;
        let status = unsafe { update(10, 0, 0.0, &mut dt as *mut f64) };
        assert_eq!(status, STATUS_OK);
        assert_eq!(get_active_plane_count(10), 1);

        let mut gaps = [0.0f64; 1];
        unsafe {
            assert_eq!(get_gap_array(10, gaps.as_mut_ptr(), 1), STATUS_OK);
        }
        assert!(gaps[0] < 0.0);

        finalize();
    }
}
