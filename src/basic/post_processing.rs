use nalgebra::ComplexField;
use serde::{Deserialize, Serialize};
use tabled::{Table, settings::Style};

mod res_display;
use res_display::*;

use super::gausspf::PowerFlowResult;
use super::system::{PFNetwork, bus_power};
use crate::losses::{LossComparison, LossSeries};

/// Per-bus result of a power flow run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusResult {
    pub bus: usize,
    pub vm_pu: f64,     // Voltage magnitude (p.u.)
    pub va_degree: f64, // Voltage angle (degrees)
    pub p_kw: f64,      // Calculated real power injection (kW)
    pub q_kvar: f64,    // Calculated reactive power injection (kVAR)
}

/// Extracts bus results after power flow calculation.
pub fn extract_res_bus(net: &PFNetwork, res: &PowerFlowResult) -> Vec<BusResult> {
    let s = bus_power(net.y_bus(), &res.v);
    res.v
        .iter()
        .zip(s.iter())
        .enumerate()
        .map(|(bus, (v, s))| BusResult {
            bus,
            vm_pu: v.modulus(),
            va_degree: v.argument().to_degrees(),
            p_kw: s.re,
            q_kvar: s.im,
        })
        .collect()
}

/// Renders bus results as a markdown table.
pub fn format_res_bus(rows: &[BusResult]) -> String {
    let table = rows.iter().map(|r| BusResTable {
        Bus: r.bus,
        Vm_pu: FloatWrapper::new(r.vm_pu, 5),
        Va_degree: FloatWrapper::new(r.va_degree, 5),
        P_kw: FloatWrapper::new(r.p_kw, 3),
        Q_kvar: FloatWrapper::new(r.q_kvar, 3),
    });
    Table::new(table).with(Style::markdown()).to_string()
}

/// Renders a loss projection as a markdown table.
pub fn format_loss_series(series: &LossSeries) -> String {
    let table = series.iter().map(|p| LossResTable {
        label: p.label.clone(),
        loss: FloatWrapper::new(p.loss, 2),
        percentage: FloatWrapper::new(p.percentage, 2),
    });
    Table::new(table).with(Style::markdown()).to_string()
}

/// Renders the baseline / before / after comparison as a markdown table.
pub fn format_loss_comparison(cmp: &LossComparison) -> String {
    let rows = [
        ComparisonResTable {
            stage: "Baseline",
            loss: FloatWrapper::new(cmp.baseline, 2),
            percentage: FloatWrapper::new(100.0, 2),
        },
        ComparisonResTable {
            stage: "Before optimisation",
            loss: FloatWrapper::new(cmp.before, 2),
            percentage: FloatWrapper::new(cmp.before_percentage(), 2),
        },
        ComparisonResTable {
            stage: "After optimisation",
            loss: FloatWrapper::new(cmp.after, 2),
            percentage: FloatWrapper::new(cmp.after_percentage(), 2),
        },
    ];
    Table::new(rows).with(Style::markdown()).to_string()
}

/// Trait for post-processing after a power flow simulation.
pub trait PostProcessing {
    /// Collects per-bus results.
    fn res_bus(&self) -> Vec<BusResult>;

    /// Processes and prints the bus results.
    fn print_res_bus(&self) {
        println!("{}", format_res_bus(&self.res_bus()));
    }
}

impl PostProcessing for (&PFNetwork, &PowerFlowResult) {
    fn res_bus(&self) -> Vec<BusResult> {
        extract_res_bus(self.0, self.1)
    }
}

impl PostProcessing for (PFNetwork, PowerFlowResult) {
    fn res_bus(&self) -> Vec<BusResult> {
        extract_res_bus(&self.0, &self.1)
    }
}
