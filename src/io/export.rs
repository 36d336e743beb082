use csv::WriterBuilder;
use std::io::Write;

use crate::basic::PfResult;
use crate::basic::post_processing::BusResult;
use crate::losses::LossSeries;

/// Writes a loss series as CSV with a `period,label,loss,percentage` header.
pub fn write_loss_series_csv<W: Write>(series: &LossSeries, writer: W) -> PfResult<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for point in series {
        wtr.serialize(point)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes bus results as CSV.
pub fn write_res_bus_csv<W: Write>(rows: &[BusResult], writer: W) -> PfResult<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
