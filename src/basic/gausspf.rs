use nalgebra::*;
use num_complex::Complex64;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::error::{PfError, PfResult};

/// Default absolute tolerance on the per-sweep voltage change (p.u.).
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
/// Default bound on the number of Gauss-Seidel sweeps.
pub const DEFAULT_MAX_ITER: usize = 1000;

/// Outcome of a Gauss-Seidel run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    /// Tolerance met after the given (1-based) number of sweeps.
    Converged(usize),
    /// The sweep budget ran out before the tolerance was met.
    IterationsExhausted,
}

/// Final voltages of a power flow run together with its convergence status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerFlowResult {
    pub v: DVector<Complex64>, // Final voltage vector (p.u.)
    pub iterations: usize,     // Number of sweeps performed
    pub status: ConvergenceStatus,
}

impl PowerFlowResult {
    pub fn converged(&self) -> bool {
        matches!(self.status, ConvergenceStatus::Converged(_))
    }
}

/// Solves the bus voltages of a radial network with Gauss-Seidel iteration.
///
/// Bus 0 is the slack bus and keeps its initial voltage. Every other bus is a
/// load bus whose voltage is updated in ascending order, each update reading
/// the values already produced earlier in the same sweep.
///
/// # Arguments
///
/// * `Ybus` - Square bus admittance matrix, non-zero diagonal.
/// * `p_load` - Real power per bus (kW). The slack entry is ignored.
/// * `q_load` - Reactive power per bus (kVAR). The slack entry is ignored.
/// * `v_init` - Initial voltage guess (p.u.).
/// * `tolerance` - Absolute tolerance on the real and imaginary voltage change, default `1e-6`.
/// * `max_iter` - Maximum number of sweeps, default `1000`.
///
/// # Returns
///
/// The last voltage snapshot and whether it converged. Exhausting `max_iter`
/// is reported through [`ConvergenceStatus::IterationsExhausted`], not as an error.
#[allow(non_snake_case)]
pub fn gauss_seidel_pf(
    Ybus: &DMatrix<Complex64>,
    p_load: &DVector<f64>,
    q_load: &DVector<f64>,
    v_init: &DVector<Complex64>,
    tolerance: Option<f64>,
    max_iter: Option<usize>,
) -> PfResult<PowerFlowResult> {
    let tol = tolerance.unwrap_or(DEFAULT_TOLERANCE);
    let max_iter = max_iter.unwrap_or(DEFAULT_MAX_ITER);
    validate_inputs(Ybus, p_load, q_load, v_init, tol, max_iter)?;

    debug!(buses = v_init.len(), tol, max_iter, "starting Gauss-Seidel power flow");

    let mut v = v_init.clone();
    for sweep in 1..=max_iter {
        let v_new = gauss_seidel_sweep(Ybus, p_load, q_load, &v, sweep)?;
        let max_delta = max_component_delta(&v, &v_new);
        trace!(sweep, max_delta, "sweep finished");

        if max_delta <= tol {
            info!(iterations = sweep, "power flow converged");
            return Ok(PowerFlowResult {
                v: v_new,
                iterations: sweep,
                status: ConvergenceStatus::Converged(sweep),
            });
        }
        v = v_new;
    }

    warn!(max_iter, "power flow did not converge within the iteration budget");
    Ok(PowerFlowResult {
        v,
        iterations: max_iter,
        status: ConvergenceStatus::IterationsExhausted,
    })
}

/// Runs one sweep over the load buses and returns the new voltage snapshot.
#[allow(non_snake_case)]
#[inline(always)]
fn gauss_seidel_sweep(
    Ybus: &DMatrix<Complex64>,
    p_load: &DVector<f64>,
    q_load: &DVector<f64>,
    v_prev: &DVector<Complex64>,
    sweep: usize,
) -> PfResult<DVector<Complex64>> {
    let n = v_prev.len();
    let mut v = v_prev.clone();
    for i in 1..n {
        let coupling: Complex64 = (0..n)
            .filter(|&j| j != i)
            .map(|j| Ybus[(i, j)] * v[j])
            .sum();
        let injection = Complex64::new(p_load[i], -q_load[i]) / v_prev[i].conj();
        let vi = (injection - coupling) / Ybus[(i, i)];
        if !vi.is_finite() {
            return Err(PfError::NumericalBreakdown { bus: i, sweep });
        }
        v[i] = vi;
    }
    Ok(v)
}

/// Largest absolute change of any real or imaginary part between two snapshots.
#[inline(always)]
fn max_component_delta(a: &DVector<Complex64>, b: &DVector<Complex64>) -> f64 {
    a.iter().zip(b.iter()).fold(0.0_f64, |acc, (x, y)| {
        let d = x - y;
        acc.max(d.re.abs()).max(d.im.abs())
    })
}

#[allow(non_snake_case)]
pub(crate) fn validate_inputs(
    Ybus: &DMatrix<Complex64>,
    p_load: &DVector<f64>,
    q_load: &DVector<f64>,
    v_init: &DVector<Complex64>,
    tol: f64,
    max_iter: usize,
) -> PfResult<()> {
    let n = Ybus.nrows();
    if n == 0 {
        return Err(PfError::invalid("network must contain at least the slack bus"));
    }
    if Ybus.ncols() != n {
        return Err(PfError::invalid(format!(
            "Ybus must be square, got {}x{}",
            n,
            Ybus.ncols()
        )));
    }
    for (name, len) in [
        ("p_load", p_load.len()),
        ("q_load", q_load.len()),
        ("v_init", v_init.len()),
    ] {
        if len != n {
            return Err(PfError::invalid(format!(
                "{name} has length {len}, expected {n}"
            )));
        }
    }
    if let Some(i) = (0..n).find(|&i| Ybus[(i, i)].is_zero()) {
        return Err(PfError::invalid(format!("Ybus[{i},{i}] is zero")));
    }
    if Ybus.iter().any(|y| !y.is_finite()) {
        return Err(PfError::invalid("Ybus contains non-finite entries"));
    }
    if p_load.iter().chain(q_load.iter()).any(|x| !x.is_finite()) {
        return Err(PfError::invalid("loads contain non-finite entries"));
    }
    if v_init.iter().any(|x| !x.is_finite()) {
        return Err(PfError::invalid("v_init contains non-finite entries"));
    }
    if let Some(i) = (1..n).find(|&i| v_init[i].is_zero()) {
        return Err(PfError::invalid(format!(
            "initial voltage of load bus {i} is zero"
        )));
    }
    if !(tol.is_finite() && tol > 0.0) {
        return Err(PfError::invalid(format!("tolerance must be positive, got {tol}")));
    }
    if max_iter == 0 {
        return Err(PfError::invalid("max_iter must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(non_snake_case)]
    fn two_bus_case() -> (
        DMatrix<Complex64>,
        DVector<f64>,
        DVector<f64>,
        DVector<Complex64>,
    ) {
        let Ybus = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(12.0, -6.0),
                Complex64::new(-6.0, 3.0),
                Complex64::new(-6.0, 3.0),
                Complex64::new(10.0, -4.0),
            ],
        );
        let p = DVector::from_vec(vec![0.0, 250.0]);
        let q = DVector::from_vec(vec![0.0, 120.0]);
        let v = DVector::from_vec(vec![Complex64::new(1.0, 0.0), Complex64::new(0.98, 0.02)]);
        (Ybus, p, q, v)
    }

    #[test]
    #[allow(non_snake_case)]
    fn test_two_bus_converges() {
        let (Ybus, p, q, v_init) = two_bus_case();
        let res = gauss_seidel_pf(&Ybus, &p, &q, &v_init, Some(1e-6), Some(1000)).unwrap();

        assert!(res.converged());
        assert!(res.iterations < 1000);
        assert_eq!(res.status, ConvergenceStatus::Converged(res.iterations));
        assert_eq!(res.v[0], Complex64::new(1.0, 0.0));
        assert_eq!(res.v[0].norm(), 1.0);

        let expected = Complex64::new(4.322960994812436, -3.1380244968344893);
        assert!(
            (res.v[1] - expected).norm() < 1e-4,
            "bus 1 voltage {} differs from {}",
            res.v[1],
            expected
        );
    }

    #[test]
    #[allow(non_snake_case)]
    fn test_fixed_point_balances_load() {
        let (Ybus, p, q, v_init) = two_bus_case();
        let res = gauss_seidel_pf(&Ybus, &p, &q, &v_init, None, None).unwrap();
        let v = &res.v;
        let s = v.component_mul(&(&Ybus * v).conjugate());
        assert!((s[1] - Complex64::new(250.0, 120.0)).norm() < 1e-3, "s[1]={}", s[1]);
    }

    #[test]
    #[allow(non_snake_case)]
    fn test_slack_bus_untouched() {
        let Ybus = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(5.0, 0.0),
                Complex64::new(-5.0, 0.0),
                Complex64::new(-5.0, 0.0),
                Complex64::new(5.0, 0.0),
            ],
        );
        let p = DVector::from_vec(vec![0.0, 0.5]);
        let q = DVector::from_vec(vec![0.0, 0.0]);
        let slack = Complex64::new(1.02, 0.0);
        let v_init = DVector::from_vec(vec![slack, Complex64::new(1.0, 0.0)]);
        for budget in [1, 2, 5, 50] {
            let res = gauss_seidel_pf(&Ybus, &p, &q, &v_init, None, Some(budget)).unwrap();
            assert_eq!(res.v[0], slack);
            assert!(res.iterations <= budget);
        }
    }

    #[test]
    #[allow(non_snake_case)]
    fn test_identical_inputs_identical_outputs() {
        let (Ybus, p, q, v_init) = two_bus_case();
        let a = gauss_seidel_pf(&Ybus, &p, &q, &v_init, None, None).unwrap();
        let b = gauss_seidel_pf(&Ybus, &p, &q, &v_init, None, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    #[allow(non_snake_case)]
    fn test_iterations_exhausted() {
        let (Ybus, p, q, v_init) = two_bus_case();
        let res = gauss_seidel_pf(&Ybus, &p, &q, &v_init, Some(1e-6), Some(5)).unwrap();
        assert_eq!(res.status, ConvergenceStatus::IterationsExhausted);
        assert!(!res.converged());
        assert_eq!(res.iterations, 5);
        assert_eq!(res.v[0], v_init[0]);
        let expected = Complex64::new(12.258058004645768, -3.104425238585495);
        assert!((res.v[1] - expected).norm() < 1e-9, "v[1]={}", res.v[1]);
    }

    #[test]
    #[allow(non_snake_case)]
    fn test_single_sweep_matches_hand_calculation() {
        let (Ybus, p, q, v_init) = two_bus_case();
        let res = gauss_seidel_pf(&Ybus, &p, &q, &v_init, None, Some(1)).unwrap();
        let injection = Complex64::new(250.0, -120.0) / v_init[1].conj();
        let expected = (injection - Ybus[(1, 0)] * v_init[0]) / Ybus[(1, 1)];
        assert!((res.v[1] - expected).norm() < 1e-12);
    }

    #[test]
    #[allow(non_snake_case)]
    fn test_later_buses_see_earlier_updates() {
        // Three buses in a chain: bus 2 must use the bus-1 value of the same sweep.
        let y = |re: f64, im: f64| Complex64::new(re, im);
        let Ybus = DMatrix::from_row_slice(
            3,
            3,
            &[
                y(10.0, -20.0),
                y(-10.0, 20.0),
                y(0.0, 0.0),
                y(-10.0, 20.0),
                y(20.0, -40.0),
                y(-10.0, 20.0),
                y(0.0, 0.0),
                y(-10.0, 20.0),
                y(10.0, -20.0),
            ],
        );
        let p = DVector::from_vec(vec![0.0, 0.3, 0.2]);
        let q = DVector::from_vec(vec![0.0, 0.1, 0.05]);
        let v_init = DVector::from_element(3, y(1.0, 0.0));
        let res = gauss_seidel_pf(&Ybus, &p, &q, &v_init, None, Some(1)).unwrap();

        let v1 = (Complex64::new(0.3, -0.1) / v_init[1].conj()
            - Ybus[(1, 0)] * v_init[0]
            - Ybus[(1, 2)] * v_init[2])
            / Ybus[(1, 1)];
        let v2 = (Complex64::new(0.2, -0.05) / v_init[2].conj() - Ybus[(2, 1)] * v1)
            / Ybus[(2, 2)];
        assert!((res.v[1] - v1).norm() < 1e-12);
        assert!((res.v[2] - v2).norm() < 1e-12);

        let res = gauss_seidel_pf(&Ybus, &p, &q, &v_init, None, None).unwrap();
        assert!(res.converged());
        assert_eq!(res.status, ConvergenceStatus::Converged(15));
        assert!((res.v[1] - Complex64::new(1.015392336844602, 0.016999207915667114)).norm() < 1e-5);
        assert!((res.v[2] - Complex64::new(1.021104132104987, 0.023988716609421274)).norm() < 1e-5);
    }

    #[test]
    fn test_slack_only_network() {
        let Ybus = DMatrix::from_element(1, 1, Complex64::new(1.0, -1.0));
        let p = DVector::from_element(1, 0.0);
        let q = DVector::from_element(1, 0.0);
        let v_init = DVector::from_element(1, Complex64::new(1.0, 0.0));
        let res = gauss_seidel_pf(&Ybus, &p, &q, &v_init, None, None).unwrap();
        assert_eq!(res.status, ConvergenceStatus::Converged(1));
        assert_eq!(res.v, v_init);
    }

    #[test]
    #[allow(non_snake_case)]
    fn test_invalid_inputs() {
        let (Ybus, p, q, v_init) = two_bus_case();
        let is_invalid = |r: PfResult<PowerFlowResult>| matches!(r, Err(PfError::InvalidInput(_)));

        let non_square = DMatrix::from_element(2, 3, Complex64::new(1.0, 0.0));
        assert!(is_invalid(gauss_seidel_pf(&non_square, &p, &q, &v_init, None, None)));

        let short = DVector::from_vec(vec![0.0]);
        assert!(is_invalid(gauss_seidel_pf(&Ybus, &short, &q, &v_init, None, None)));
        assert!(is_invalid(gauss_seidel_pf(&Ybus, &p, &short, &v_init, None, None)));

        let mut zero_diag = Ybus.clone();
        zero_diag[(1, 1)] = Complex64::zero();
        assert!(is_invalid(gauss_seidel_pf(&zero_diag, &p, &q, &v_init, None, None)));

        assert!(is_invalid(gauss_seidel_pf(&Ybus, &p, &q, &v_init, Some(0.0), None)));
        assert!(is_invalid(gauss_seidel_pf(&Ybus, &p, &q, &v_init, Some(-1e-3), None)));
        assert!(is_invalid(gauss_seidel_pf(&Ybus, &p, &q, &v_init, None, Some(0))));

        let mut zero_v = v_init.clone();
        zero_v[1] = Complex64::zero();
        assert!(is_invalid(gauss_seidel_pf(&Ybus, &p, &q, &zero_v, None, None)));

        let empty = DMatrix::<Complex64>::zeros(0, 0);
        let none = DVector::<f64>::zeros(0);
        let no_v = DVector::<Complex64>::zeros(0);
        assert!(is_invalid(gauss_seidel_pf(&empty, &none, &none, &no_v, None, None)));
    }

    #[test]
    #[allow(non_snake_case)]
    fn test_collapsed_voltage_is_breakdown() {
        // Sweep 1 drives V1 to zero, sweep 2 then divides by conj(0).
        let Ybus = DMatrix::<Complex64>::identity(2, 2);
        let zeros = DVector::<f64>::zeros(2);
        let v_init = DVector::from_vec(vec![Complex64::new(1.0, 0.0), Complex64::new(0.5, 0.0)]);
        let res = gauss_seidel_pf(&Ybus, &zeros, &zeros, &v_init, None, None);
        assert!(
            matches!(res, Err(PfError::NumericalBreakdown { bus: 1, sweep: 2 })),
            "unexpected result: {res:?}"
        );
    }
}
