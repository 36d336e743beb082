use nalgebra::*;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::basic::error::{PfError, PfResult};
use crate::basic::gausspf::{
    DEFAULT_MAX_ITER, DEFAULT_TOLERANCE, PowerFlowResult, gauss_seidel_pf, validate_inputs,
};

/// Power flow configuration options: maximum sweeps and convergence tolerance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerFlowConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_it: Option<usize>, // Maximum number of sweeps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tol: Option<f64>, // Tolerance for convergence
}

impl PowerFlowConfig {
    pub fn max_it_or_default(&self) -> usize {
        self.max_it.unwrap_or(DEFAULT_MAX_ITER)
    }

    pub fn tol_or_default(&self) -> f64 {
        self.tol.unwrap_or(DEFAULT_TOLERANCE)
    }
}

/// A small radial network: admittance matrix, bus loads and the initial voltage guess.
///
/// Bus 0 is the slack bus. The fields are validated on construction so a
/// `PFNetwork` always satisfies the structural preconditions of the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNetwork")]
pub struct PFNetwork {
    /// Bus admittance matrix.
    pub(crate) y_bus: DMatrix<Complex64>,
    /// Real power per bus (kW).
    pub(crate) p_load: DVector<f64>,
    /// Reactive power per bus (kVAR).
    pub(crate) q_load: DVector<f64>,
    /// Initial voltage guess (p.u.).
    pub(crate) v_init: DVector<Complex64>,
}

/// Unvalidated field layout of [`PFNetwork`], checked by `PFNetwork::new` on deserialization.
#[derive(Deserialize)]
struct RawNetwork {
    y_bus: DMatrix<Complex64>,
    p_load: DVector<f64>,
    q_load: DVector<f64>,
    v_init: DVector<Complex64>,
}

impl TryFrom<RawNetwork> for PFNetwork {
    type Error = PfError;

    fn try_from(raw: RawNetwork) -> PfResult<Self> {
        PFNetwork::new(raw.y_bus, raw.p_load, raw.q_load, raw.v_init)
    }
}

impl PFNetwork {
    #[allow(non_snake_case)]
    pub fn new(
        Ybus: DMatrix<Complex64>,
        p_load: DVector<f64>,
        q_load: DVector<f64>,
        v_init: DVector<Complex64>,
    ) -> PfResult<Self> {
        validate_inputs(&Ybus, &p_load, &q_load, &v_init, DEFAULT_TOLERANCE, 1)?;
        Ok(Self {
            y_bus: Ybus,
            p_load,
            q_load,
            v_init,
        })
    }

    /// Number of buses, slack included.
    pub fn n_bus(&self) -> usize {
        self.v_init.len()
    }

    pub fn y_bus(&self) -> &DMatrix<Complex64> {
        &self.y_bus
    }

    pub fn p_load(&self) -> &DVector<f64> {
        &self.p_load
    }

    pub fn q_load(&self) -> &DVector<f64> {
        &self.q_load
    }

    pub fn v_init(&self) -> &DVector<Complex64> {
        &self.v_init
    }
}

/// A trait for running power flow analysis.
pub trait RunPF {
    /// Creates the specified complex power vector `P + jQ` of the network.
    fn create_s_bus(&self) -> DVector<Complex64>;

    /// Runs the power flow analysis.
    ///
    /// # Arguments
    ///
    /// * `max_it` - The maximum number of sweeps (optional).
    /// * `tol` - The convergence tolerance (optional).
    fn run_pf(&self, max_it: Option<usize>, tol: Option<f64>) -> PfResult<PowerFlowResult>;

    /// Runs the power flow with the options of a [`PowerFlowConfig`].
    fn run_pf_with(&self, config: &PowerFlowConfig) -> PfResult<PowerFlowResult> {
        self.run_pf(config.max_it, config.tol)
    }
}

impl RunPF for PFNetwork {
    fn create_s_bus(&self) -> DVector<Complex64> {
        self.p_load.zip_map(&self.q_load, Complex64::new)
    }

    fn run_pf(&self, max_it: Option<usize>, tol: Option<f64>) -> PfResult<PowerFlowResult> {
        gauss_seidel_pf(
            &self.y_bus,
            &self.p_load,
            &self.q_load,
            &self.v_init,
            tol,
            max_it,
        )
    }
}

/// Calculated complex power injection `V ∘ conj(Ybus · V)` at every bus.
#[allow(non_snake_case)]
pub fn bus_power(Ybus: &DMatrix<Complex64>, v: &DVector<Complex64>) -> DVector<Complex64> {
    v.component_mul(&(Ybus * v).conjugate())
}
