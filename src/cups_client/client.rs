use std::{path::Path, sync::OnceLock, time::Duration};

use log::debug;
use regex::Regex;
use snafu::{ResultExt, Snafu};

use crate::{config::models::Settings, process::{self, ProcessError}};

use super::models::{JobId, PrinterName};

const DEFAULT_DESTINATION_PREFIX: &str = "system default destination:";

/// The parts of the CUPS spooler this tool talks to.
pub trait Spooler {
    /// The system default destination, or `None` when it cannot be determined.
    fn default_destination(&self) -> Option<PrinterName>;

    /// Queue `file` on `printer` and return the job id the spooler reports.
    fn submit(&self, printer: &PrinterName, file: &Path) -> Result<JobId, SubmitError>;
}

/// [`Spooler`] backed by the `lpstat` and `lp` command line tools.
pub struct LpSpooler {
    lpstat: String,
    lp: String,
    media: String,
    timeout: Duration,
}

impl LpSpooler {
    pub fn new(settings: &Settings) -> Self {
        Self {
            lpstat: settings.tools.lpstat.clone(),
            lp: settings.tools.lp.clone(),
            media: settings.cups.media.clone(),
            timeout: settings.tools.timeout,
        }
    }

    fn submit_args(&self, printer: &PrinterName, file: &Path) -> Vec<String> {
        vec![
            "-d".to_string(),
            printer.to_string(),
            "-o".to_string(),
            format!("media={}", self.media),
            file.display().to_string(),
        ]
    }
}

impl Spooler for LpSpooler {
    fn default_destination(&self) -> Option<PrinterName> {
        match process::run(&self.lpstat, &["-d".to_string()], self.timeout) {
            Ok(output) if output.success() => parse_default_destination(&output.stdout),
            Ok(output) => {
                debug!("'{} -d' exited with {}: {}", self.lpstat, output.status, output.stderr.trim());
                None
            }
            Err(e) => {
                debug!("No default destination from '{}': {}", self.lpstat, e);
                None
            }
        }
    }

    fn submit(&self, printer: &PrinterName, file: &Path) -> Result<JobId, SubmitError> {
        let output = process::run(&self.lp, &self.submit_args(printer, file), self.timeout).context(ProcessSnafu)?;
        if !output.success() {
            return RejectedSnafu {
                printer: printer.to_string(),
                stderr: output.stderr.trim().to_string(),
            }.fail();
        }

        Ok(parse_job_id(&output.stdout))
    }
}

/// Extract the destination name from `lpstat -d` output.
///
/// # Arguments
///
/// * `stdout`: Output of `lpstat -d`, e.g. `system default destination: DeskJet_3630`
///
/// returns: Option<PrinterName>
pub fn parse_default_destination(stdout: &str) -> Option<PrinterName> {
    let (_, name) = stdout.trim().split_once(DEFAULT_DESTINATION_PREFIX)?;
    PrinterName::new(name.trim())
}

/// Extract the job id from `lp` output, falling back to [`JobId::unknown`].
///
/// # Examples
///
/// ```text
/// request id is DeskJet_3630-42 (1 file(s))  ->  DeskJet_3630-42
/// ```
pub fn parse_job_id(stdout: &str) -> JobId {
    static REQUEST_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = REQUEST_ID_REGEX.get_or_init(|| Regex::new(r"request id is ([\w-]+)").expect("valid regex"));

    regex.captures(stdout)
        .and_then(|captures| captures.get(1))
        .map(|id| JobId::new(id.as_str()))
        .unwrap_or_else(JobId::unknown)
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum SubmitError {
    #[snafu(display("Could not run the print submission command"))]
    Process { source: ProcessError },

    #[snafu(display("Printer '{printer}' rejected the job: {stderr}"))]
    Rejected { printer: String, stderr: String },
}
