use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::basic::system::{PFNetwork, PowerFlowConfig};
use crate::basic::{PfError, PfResult};
use crate::losses::{LossComparison, LossProjector, LossSeries, PeriodLabels, ProjectionMode};

//Region datasets: each feeder is described by its network and loss figures.

const BUILTIN_REGIONS: &str = include_str!("regions/builtin_regions.json");

/// Network parameters of one feeder. Complex values are `[re, im]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkData {
    pub y_bus: Vec<Vec<Complex64>>,
    pub p_load_kw: Vec<f64>,
    pub q_load_kvar: Vec<f64>,
    pub v_init: Vec<Complex64>,
}

/// Loss figures and projection settings of one feeder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossData {
    pub baseline_kwh: f64,
    pub current_kwh: f64,
    pub target_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement_factor: Option<f64>,
    #[serde(default)]
    pub mode: ProjectionMode,
    pub periods: PeriodLabels,
}

/// Everything needed to run the feeder study of one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCase {
    pub network: NetworkData,
    pub losses: LossData,
    #[serde(default)]
    pub solver: PowerFlowConfig,
}

/// Region datasets keyed by region name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionTable(pub BTreeMap<String, RegionCase>);

impl TryFrom<&NetworkData> for PFNetwork {
    type Error = PfError;

    fn try_from(data: &NetworkData) -> PfResult<Self> {
        let n = data.y_bus.len();
        if let Some((i, row)) = data.y_bus.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(PfError::invalid(format!(
                "Ybus row {i} has {} entries, expected {n}",
                row.len()
            )));
        }
        let flat: Vec<Complex64> = data.y_bus.iter().flatten().copied().collect();
        let y_bus = DMatrix::from_row_slice(n, n, &flat);
        PFNetwork::new(
            y_bus,
            DVector::from_column_slice(&data.p_load_kw),
            DVector::from_column_slice(&data.q_load_kvar),
            DVector::from_column_slice(&data.v_init),
        )
    }
}

impl LossData {
    pub fn projector(&self) -> LossProjector {
        LossProjector::new(self.target_percentage).with_mode(self.mode)
    }

    /// Projects the losses over the configured periods.
    pub fn projection(&self) -> PfResult<LossSeries> {
        let labels = self.periods.labels()?;
        self.projector()
            .project_labeled(self.baseline_kwh, self.current_kwh, &labels)
    }

    /// Before/after comparison, if an improvement factor is configured.
    pub fn comparison(&self) -> PfResult<Option<LossComparison>> {
        self.improvement_factor
            .map(|f| LossComparison::new(self.baseline_kwh, self.current_kwh, f))
            .transpose()
    }
}

impl RegionCase {
    pub fn network(&self) -> PfResult<PFNetwork> {
        PFNetwork::try_from(&self.network)
    }
}

impl RegionTable {
    /// The datasets shipped with the crate.
    pub fn builtin() -> PfResult<Self> {
        Self::from_json_str(BUILTIN_REGIONS)
    }

    pub fn from_json_str(s: &str) -> PfResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> PfResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn get(&self, name: &str) -> PfResult<&RegionCase> {
        self.0
            .get(name)
            .ok_or_else(|| PfError::UnknownRegion(name.to_owned()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
