//! Coupling scheme: the per-cycle orchestrator (spec.md §4.6, §5
//! "Coupling-scheme state machine").
//!
//! `CouplingScheme` owns the configuration and the two mesh views it was
//! constructed against, and drives them through `init -> {binned -> applied}*
//! -> finalize`. Binning and contact-plane construction happen once per
//! cycle; `apply` consumes the resulting active planes.

use crate::binning::{find_candidates, CandidatePair};
use crate::config::{CouplingConfig, Enforcement, Method, Model};
use crate::contact_plane::{check_interface_pair, ContactPlane, PairOutcome};
use crate::error::{ConfigError, ContactError, GeometryError};
use crate::exec::ExecMode;
use crate::mesh::MeshView;
use crate::physics::{apply_common_plane_penalty, build_surface_contact_elem};
use crate::timestep::compute_timestep;

/// State machine phase (spec.md §5). Transitions are one-directional;
/// `apply` is the only phase that repeats across cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Constructed,
    Initialized,
    Binned,
    Finalized,
}

/// Per-cycle diagnostics (SPEC_FULL §11). Tallies every [`GeometryError`] by
/// category rather than surfacing only the first, mirroring
/// [`CouplingConfig::validate`]'s accumulate-all behavior.
#[derive(Clone, Debug, Default)]
pub struct CycleReport {
    pub cycle: u64,
    pub candidate_pairs: usize,
    pub active_planes: usize,
    pub invalid_face_input: usize,
    pub face_orientation: usize,
    pub degenerate_overlap: usize,
    pub vertex_index_exceeded: usize,
    pub no_face_geometry: usize,
    pub recommended_dt: f64,
}

impl CycleReport {
    fn tally(&mut self, err: GeometryError) {
        match err {
            GeometryError::InvalidFaceInput => self.invalid_face_input += 1,
            GeometryError::FaceOrientation => self.face_orientation += 1,
            GeometryError::DegenerateOverlap => self.degenerate_overlap += 1,
            GeometryError::FaceVertexIndexExceedsOverlapVertices => self.vertex_index_exceeded += 1,
            GeometryError::NoFaceGeomError => self.no_face_geometry += 1,
        }
    }

    pub fn rejected_pairs(&self) -> usize {
        self.invalid_face_input
            + self.face_orientation
            + self.degenerate_overlap
            + self.vertex_index_exceeded
            + self.no_face_geometry
    }
}

/// Owns one mesh-pair's contact coupling across the lifetime of a run.
pub struct CouplingScheme {
    config: CouplingConfig,
    exec_mode: ExecMode,
    phase: Phase,
    candidates: Vec<CandidatePair>,
    active_planes: Vec<ContactPlane>,
    /// Per-active-plane average contact pressure (`F_n / overlap_area` for
    /// penalty enforcement), parallel to `active_planes`. Left at 0.0 for
    /// mortar/Lagrange-multiplier enforcement, whose dual unknowns are
    /// solved by the host (spec.md §1 Non-goal).
    last_pressures: Vec<f64>,
    /// Set once the first `perform_binning()` has run under a policy where
    /// topology cannot evolve (Cartesian-product binning, or `NO_SLIDING`);
    /// subsequent cycles reuse the existing candidate list (spec.md §4.6).
    binning_pinned: bool,
}

impl CouplingScheme {
    /// Construct in the `Constructed` phase; `init` must run before binning.
    pub fn new(config: CouplingConfig, exec_mode: ExecMode) -> Self {
        Self {
            config,
            exec_mode,
            phase: Phase::Constructed,
            candidates: Vec::new(),
            active_planes: Vec::new(),
            last_pressures: Vec::new(),
            binning_pinned: false,
        }
    }

    /// Validate configuration and mesh compatibility (spec.md §4.6 step 1,
    /// S6 "tet/hex hybrid mesh rejected"). Accumulates every applicable
    /// error before returning.
    pub fn init(&mut self, mesh1: &MeshView, mesh2: &MeshView) -> Result<(), Vec<ContactError>> {
        let mut errors: Vec<ContactError> = self.config.validate().into_iter().map(ContactError::from).collect();

        if mesh1.verts_per_face != mesh2.verts_per_face {
            errors.push(
                ConfigError::DifferentFaceTypes {
                    v1: mesh1.verts_per_face,
                    v2: mesh2.verts_per_face,
                }
                .into(),
            );
        }
        if mesh1.dim != mesh2.dim {
            errors.push(
                ConfigError::DifferentDimensions {
                    d1: mesh1.dim,
                    d2: mesh2.dim,
                }
                .into(),
            );
        }

        // Mortar node-id spaces must be disjoint so dual-variable rows in
        // the block Jacobian can't collide (SPEC_FULL §12 Q3). Unimplemented
        // here: MeshView addresses nodes only by a local 0..num_nodes index,
        // never a host-assigned global id, so there is nothing in this data
        // model to compare for overlap. `ConfigError::OverlappingNodeIdSpace`
        // is reserved for this but not currently raised anywhere.

        if matches!(self.config.enforcement, Enforcement::Penalty)
            && (!mesh1.has_response_sink() || !mesh2.has_response_sink())
        {
            errors.push(
                ConfigError::MissingResponseSink {
                    method: self.config.method,
                }
                .into(),
            );
        }
        if matches!(self.config.case, crate::config::ContactCase::Auto)
            && (!mesh1.has_element_thickness() || !mesh2.has_element_thickness())
        {
            errors.push(ConfigError::MissingElementThickness.into());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        self.phase = Phase::Initialized;
        Ok(())
    }

    /// Run binning against the current mesh state (spec.md §4.3). Must be
    /// called once per cycle before `apply`; refreshes each mesh's face
    /// cache first since coordinates may have moved since the last cycle.
    pub fn perform_binning(&mut self, mesh1: &mut MeshView, mesh2: &mut MeshView) {
        mesh1.update_face_cache();
        mesh2.update_face_cache();
        if self.binning_pinned {
            self.phase = Phase::Binned;
            return;
        }
        self.candidates = find_candidates(mesh1, mesh2, self.config.binning);
        if matches!(self.config.binning, crate::config::Binning::CartesianProduct)
            || matches!(self.config.case, crate::config::ContactCase::NoSliding)
        {
            self.binning_pinned = true;
        }
        self.phase = Phase::Binned;
    }

    /// Build contact planes for the current candidate set and apply the
    /// configured physics model (spec.md §4.4-§4.6). Returns a [`CycleReport`]
    /// with per-category geometry-error tallies and the recommended next
    /// timestep; never aborts the cycle on a per-pair geometry error.
    pub fn apply(&mut self, cycle: u64, mesh1: &mut MeshView, mesh2: &mut MeshView, dt: f64) -> CycleReport {
        debug_assert_eq!(self.phase, Phase::Binned, "apply() called before perform_binning()");

        let mut report = CycleReport {
            cycle,
            candidate_pairs: self.candidates.len(),
            ..Default::default()
        };

        let candidates = &self.candidates;
        let case = self.config.case;
        let model = self.config.model;
        let tolerances = self.config.tolerances;
        let m1: &MeshView = mesh1;
        let m2: &MeshView = mesh2;

        let outcomes: Vec<Result<PairOutcome, GeometryError>> =
            crate::exec::for_all(self.exec_mode, candidates.len(), |i| {
                let pair = candidates[i];
                check_interface_pair(m1, m2, pair.f1, pair.f2, case, model, &tolerances)
            });

        self.active_planes.clear();
        for outcome in outcomes {
            match outcome {
                Ok(PairOutcome::Active(plane)) => self.active_planes.push(*plane),
                Ok(PairOutcome::Inactive) => {}
                Err(e) => {
                    log::debug!("candidate pair rejected: {e}");
                    report.tally(e);
                }
            }
        }
        report.active_planes = self.active_planes.len();
        self.last_pressures.clear();

        match (self.config.method, self.config.enforcement) {
            (Method::CommonPlane, Enforcement::Penalty) => {
                let options = self
                    .config
                    .penalty
                    .expect("init() guarantees penalty options are present for Penalty enforcement");
                for plane in &self.active_planes {
                    let contribution = apply_common_plane_penalty(mesh1, mesh2, plane, self.config.model, &options);
                    let pressure = if plane.overlap_area > 0.0 {
                        contribution.normal_force_magnitude / plane.overlap_area
                    } else {
                        0.0
                    };
                    self.last_pressures.push(pressure);
                }
            }
            (Method::SingleMortar, Enforcement::LagrangeMultiplier)
            | (Method::AlignedMortar, Enforcement::LagrangeMultiplier) => {
                let aligned = matches!(self.config.method, Method::AlignedMortar);
                for plane in &self.active_planes {
                    let _elem = build_surface_contact_elem(plane, aligned);
                    // Folding mortar weights/Jacobian blocks into a global
                    // assembly is a host responsibility (spec.md §1
                    // Non-goal: "owning the global stiffness matrix");
                    // `get_jacobian_CSR` (ffi.rs) reconstructs the triplet
                    // stream from these per-pair elements on demand.
                    self.last_pressures.push(0.0);
                }
            }
            (Method::MortarWeights, Enforcement::NullEnforcement) => {
                for plane in &self.active_planes {
                    let _elem = build_surface_contact_elem(plane, false);
                    self.last_pressures.push(0.0);
                }
            }
            _ => unreachable!("init() rejects any other method/enforcement combination"),
        }

        report.recommended_dt = compute_timestep(mesh1, mesh2, &self.active_planes, dt);
        report
    }

    /// Currently active contact planes, for host readback (`get_gap_array`,
    /// `get_pressure_array`, mortar Jacobian assembly).
    pub fn active_planes(&self) -> &[ContactPlane] {
        &self.active_planes
    }

    /// Average contact pressure per active plane, parallel to
    /// [`Self::active_planes`] (spec.md §6 `get_pressure_array`).
    pub fn last_pressures(&self) -> &[f64] {
        &self.last_pressures
    }

    pub fn config(&self) -> &CouplingConfig {
        &self.config
    }

    pub fn method(&self) -> Method {
        self.config.method
    }

    pub fn penalty_options_mut(&mut self) -> &mut Option<crate::config::PenaltyOptions> {
        &mut self.config.penalty
    }

    pub fn lagrange_options_mut(&mut self) -> &mut Option<crate::config::LagrangeOptions> {
        &mut self.config.lagrange
    }

    /// Release per-cycle state. The configuration and last cycle's report
    /// remain inspectable; only the transient plane/candidate buffers are
    /// dropped (spec.md §9: "Destruction is bulk").
    pub fn finalize(&mut self) {
        self.candidates.clear();
        self.active_planes.clear();
        self.last_pressures.clear();
        self.phase = Phase::Finalized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Binning, ContactCase, ContactMode, LogLevel, PenaltyOptions, Tolerances};

    fn quad_mesh(id: u32, z: f64, winding: [(f64, f64); 4]) -> MeshView {
        let mut coords = Vec::new();
        for (x, y) in winding {
            coords.push(x);
            coords.push(y);
            coords.push(z);
        }
        MeshView::new(id, 3, 4, 4, vec![0, 1, 2, 3], coords).unwrap()
    }

    fn penalty_config() -> CouplingConfig {
        CouplingConfig {
            mode: ContactMode::SurfaceToSurface,
            case: ContactCase::NoCase,
            method: Method::CommonPlane,
            model: Model::Frictionless,
            enforcement: Enforcement::Penalty,
            binning: Binning::CartesianProduct,
            penalty: Some(PenaltyOptions::default()),
            lagrange: None,
            tolerances: Tolerances::default(),
            log_level: LogLevel::Info,
        }
    }

    #[test]
    fn full_cycle_produces_contact_and_shrinks_dt() {
        let mut mesh1 = quad_mesh(1, 0.0, [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let mut mesh2 = quad_mesh(2, -0.05, [(0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        mesh1.register_velocities(vec![0.0, 0.0, 5.0].repeat(4)).unwrap();
        mesh2.register_velocities(vec![0.0, 0.0, -5.0].repeat(4)).unwrap();
        mesh1.register_response_sink();
        mesh2.register_response_sink();

        let mut scheme = CouplingScheme::new(penalty_config(), ExecMode::Sequential);
        scheme.init(&mesh1, &mesh2).unwrap();
        scheme.perform_binning(&mut mesh1, &mut mesh2);
        let report = scheme.apply(0, &mut mesh1, &mut mesh2, 1.0);

        assert_eq!(report.active_planes, 1);
        assert_eq!(report.candidate_pairs, 1);
        assert!(report.recommended_dt < 1.0);
        assert!(mesh1.total_response().norm() > 0.0);

        scheme.finalize();
        assert!(scheme.active_planes().is_empty());
    }

    #[test]
    fn mismatched_face_types_rejected_at_init() {
        let mesh1 = quad_mesh(1, 0.0, [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let mut coords = Vec::new();
        for (x, y, z) in [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)] {
            coords.push(x);
            coords.push(y);
            coords.push(z);
        }
        let mesh2 = MeshView::new(2, 3, 3, 3, vec![0, 1, 2], coords).unwrap();

        let mut scheme = CouplingScheme::new(penalty_config(), ExecMode::Sequential);
        let err = scheme.init(&mesh1, &mesh2).unwrap_err();
        assert!(err
            .iter()
            .any(|e| matches!(e, ContactError::Config(ConfigError::DifferentFaceTypes { .. }))));
    }

    #[test]
    fn non_overlapping_faces_yield_no_active_planes() {
        let mut mesh1 = quad_mesh(1, 0.0, [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let mut mesh2 = quad_mesh(2, 10.0, [(0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        mesh1.register_response_sink();
        mesh2.register_response_sink();

        let mut scheme = CouplingScheme::new(penalty_config(), ExecMode::Sequential);
        scheme.init(&mesh1, &mesh2).unwrap();
        scheme.perform_binning(&mut mesh1, &mut mesh2);
        let report = scheme.apply(0, &mut mesh1, &mut mesh2, 1.0);

        assert_eq!(report.active_planes, 0);
        assert!((report.recommended_dt - 1.0).abs() < 1e-15);
    }
}
