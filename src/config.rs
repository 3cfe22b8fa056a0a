//! Contact-model enumerations and coupling-scheme configuration
//! (spec.md §6: "must be preserved bit-exactly for host compatibility").

use crate::error::ConfigError;

/// Contact mode: how the two meshes' surfaces relate geometrically.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContactMode {
    SurfaceToSurface = 0,
    SurfaceToSurfaceConforming = 1,
}

/// Contact case: governs binning pinning and interpenetration policy.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContactCase {
    NoCase = 0,
    NoSliding = 1,
    Auto = 2,
    TiedNormal = 3,
}

/// Method: how the active contact planes are turned into forces/constraints.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    CommonPlane = 0,
    SingleMortar = 1,
    AlignedMortar = 2,
    MortarWeights = 3,
}

/// Model: the constitutive behavior of the contact interaction.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Model {
    Frictionless = 0,
    Tied = 1,
    /// Reserved: Coulomb friction is not implemented by this core
    /// (spec.md enumerations must be preserved bit-exactly regardless).
    Coulomb = 2,
    NullModel = 3,
}

/// Enforcement: how the non-penetration condition is enforced.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Enforcement {
    Penalty = 0,
    LagrangeMultiplier = 1,
    NullEnforcement = 2,
}

/// Binning policy selector (spec.md §4.3).
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Binning {
    CartesianProduct = 0,
    Grid = 1,
}

/// Logging level for per-cycle diagnostics (spec.md §6).
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
    Undefined = 4,
}

/// Penalty-enforcement options (spec.md §4.5.1).
#[derive(Clone, Copy, Debug)]
pub struct PenaltyOptions {
    /// `true` ⇒ constant stiffness `k_constant`; `false` ⇒ element-wise
    /// stiffness derived from `k_host` and the harmonic thickness mean.
    pub constant_stiffness: bool,
    pub k_constant: f64,
    /// Per-element bulk modulus, used only when `constant_stiffness` is
    /// false. The host supplies this per face pair via [`crate::mesh::MeshView`]
    /// element data in a full integration; this core accepts it as a
    /// scalar default applied uniformly (see DESIGN.md).
    pub k_host: f64,
}

impl Default for PenaltyOptions {
    fn default() -> Self {
        Self {
            constant_stiffness: true,
            k_constant: 1.0e6,
            k_host: 1.0e6,
        }
    }
}

/// Lagrange-multiplier (mortar) enforcement options (spec.md §4.5.2).
#[derive(Clone, Copy, Debug)]
pub struct LagrangeOptions {
    /// Number of Gauss points per parametric coordinate (2 is the default
    /// rule in spec.md §4.5.2).
    pub gauss_points_per_dim: usize,
}

impl Default for LagrangeOptions {
    fn default() -> Self {
        Self {
            gauss_points_per_dim: 2,
        }
    }
}

/// Tolerances driving the geometric predicates (spec.md §4.1, §4.4).
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    /// Positional tolerance, typically a small fraction of the smaller
    /// face radius (scaled per pair, not a single global constant).
    pub pos_tol: f64,
    /// Minimum retained edge length in the overlap polygon.
    pub len_tol: f64,
    /// Orientation-filter margin: normals must oppose by at least this
    /// much more than exactly antiparallel (`dot < -margin`).
    pub orientation_margin: f64,
    /// Ratio applied to `max(r1, r2)` to form the penetration gap
    /// tolerance for non-TIED models (spec.md §4.4 step 6).
    pub gap_tol_ratio: f64,
    /// Ratio applied to `max(r1, r2)` to form the separation tolerance
    /// for the TIED model.
    pub gap_tied_tol: f64,
    /// Fraction of the effective thickness beyond which the `AUTO` case
    /// rejects a pair as pass-through geometry (SPEC_FULL §12 Q2).
    pub auto_penetration_fraction: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            pos_tol: 1.0e-6,
            len_tol: 1.0e-6,
            orientation_margin: 1.0e-3,
            gap_tol_ratio: 1.0e-2,
            gap_tied_tol: 1.0e-1,
            auto_penetration_fraction: 0.9,
        }
    }
}

/// Top-level coupling-scheme configuration (spec.md §3 "Coupling scheme").
#[derive(Clone, Debug)]
pub struct CouplingConfig {
    pub mode: ContactMode,
    pub case: ContactCase,
    pub method: Method,
    pub model: Model,
    pub enforcement: Enforcement,
    pub binning: Binning,
    pub penalty: Option<PenaltyOptions>,
    pub lagrange: Option<LagrangeOptions>,
    pub tolerances: Tolerances,
    pub log_level: LogLevel,
}

impl CouplingConfig {
    /// Validate the method/model/enforcement/case combination against the
    /// allow-list (spec.md §4.6). Accumulates every applicable error
    /// rather than stopping at the first (SPEC_FULL §11).
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let combination_ok = match (self.method, self.model, self.enforcement) {
            (Method::CommonPlane, Model::Frictionless, Enforcement::Penalty) => true,
            (Method::CommonPlane, Model::Tied, Enforcement::Penalty) => true,
            (Method::SingleMortar, _, Enforcement::LagrangeMultiplier) => true,
            (Method::AlignedMortar, _, Enforcement::LagrangeMultiplier) => true,
            (Method::MortarWeights, _, Enforcement::NullEnforcement) => true,
            _ => false,
        };
        if !combination_ok {
            errors.push(ConfigError::InvalidCombination {
                case: self.case,
                method: self.method,
                model: self.model,
                enforcement: self.enforcement,
            });
        }

        if matches!(self.model, Model::Tied) && !matches!(self.case, ContactCase::TiedNormal) {
            log::warn!(
                "model=Tied normally pairs with case=TiedNormal; proceeding with case={:?}",
                self.case
            );
        }

        match self.enforcement {
            Enforcement::Penalty if self.penalty.is_none() => {
                errors.push(ConfigError::MissingPenaltyOptions)
            }
            Enforcement::LagrangeMultiplier if self.lagrange.is_none() => {
                errors.push(ConfigError::MissingLagrangeOptions)
            }
            _ => {}
        }

        errors
    }
}
