use std::fmt;
use tabled::Tabled;
/// A wrapper around a float that limits the number of decimal places when printed.
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub(crate) struct FloatWrapper {
    pub(crate) value: f64,
    pub(crate) precision: usize, // Number of decimal places to display
}

impl FloatWrapper {
    pub fn new(value: f64, precision: usize) -> Self {
        FloatWrapper { value, precision }
    }
}

impl fmt::Display for FloatWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1$}", self.value, self.precision)
    }
}

impl fmt::Debug for FloatWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1$}", self.value, self.precision)
    }
}

/// Table row for display Bus results.
#[derive(Debug, Tabled)]
#[allow(non_snake_case)]
pub(crate) struct BusResTable {
    pub(crate) Bus: usize,
    pub(crate) Vm_pu: FloatWrapper,
    pub(crate) Va_degree: FloatWrapper,
    pub(crate) P_kw: FloatWrapper,
    pub(crate) Q_kvar: FloatWrapper,
}

/// Table row for one period of a loss projection.
#[derive(Debug, Tabled)]
pub(crate) struct LossResTable {
    #[tabled(rename = "Period")]
    pub(crate) label: String,
    #[tabled(rename = "Losses (kWh)")]
    pub(crate) loss: FloatWrapper,
    #[tabled(rename = "Losses (%)")]
    pub(crate) percentage: FloatWrapper,
}

/// Table row for the before/after loss comparison.
#[derive(Debug, Tabled)]
pub(crate) struct ComparisonResTable {
    #[tabled(rename = "Stage")]
    pub(crate) stage: &'static str,
    #[tabled(rename = "Losses (kWh)")]
    pub(crate) loss: FloatWrapper,
    #[tabled(rename = "Losses (%)")]
    pub(crate) percentage: FloatWrapper,
}
