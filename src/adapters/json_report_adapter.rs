//! JSON report adapter implementing ReportPort.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::domain::error::TradesimError;
use crate::domain::report::BacktestOutcome;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportAdapter {
    pub compact: bool,
}

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self, outcome: &BacktestOutcome) -> Result<String, TradesimError> {
        let rendered = if self.compact {
            serde_json::to_string(outcome)
        } else {
            serde_json::to_string_pretty(outcome)
        };
        rendered.map_err(|e| TradesimError::Io(std::io::Error::other(e)))
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        outcome: &BacktestOutcome,
        output_path: Option<&Path>,
    ) -> Result<(), TradesimError> {
        let json = self.render(outcome)?;

        match output_path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, json + "\n")?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{json}")?;
            }
        }
        Ok(())
    }
}
