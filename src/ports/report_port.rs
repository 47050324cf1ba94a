//! Report output port trait.

use crate::domain::error::TradesimError;
use crate::domain::report::BacktestOutcome;
use std::path::Path;

pub trait ReportPort {
    /// Write `outcome` to `output_path`, or to stdout when `None`.
    fn write(&self, outcome: &BacktestOutcome, output_path: Option<&Path>)
    -> Result<(), TradesimError>;
}
