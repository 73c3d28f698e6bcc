use std::{fmt, path::PathBuf};

use chrono::{DateTime, FixedOffset, Local, Utc};
use log::info;
use snafu::{ResultExt, Snafu};

use crate::{
    config::models::Settings,
    cups_client::{client::{Spooler, SubmitError}, models::{JobId, PrinterName}},
    page_log::scanner::{self, ScanError},
    test_page::{layout::TestPage, renderer::{PageRenderer, RenderError}},
};

use super::{resolver::{PrinterResolver, ResolveError}, submitter};

/// What the operator asked for on the command line.
#[derive(Debug, Default)]
pub struct Request<'a> {
    pub force: bool,
    pub printer: Option<&'a str>,
    pub threshold_days: u32,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Forced,
    NoHistory,
    Overdue { last: DateTime<FixedOffset>, days: i64 },
    Recent { last: DateTime<FixedOffset>, days: i64 },
}

impl Decision {
    pub fn is_due(&self) -> bool {
        !matches!(self, Decision::Recent { .. })
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Decision::Forced => "forced",
            Decision::NoHistory => "no print history",
            Decision::Overdue { .. } => "overdue",
            Decision::Recent { .. } => "used recently",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Forced => write!(f, "Force mode enabled."),
            Decision::NoHistory => write!(f, "No print history found."),
            Decision::Overdue { last, days } => write!(f, "Last print was on {last}, printer not used for {days} days."),
            Decision::Recent { last, days } => write!(f, "Last print was on {last} ({days} days ago), printer used recently."),
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    NotDue(Decision),
    DryRun(Decision),
    Printed { decision: Decision, job: JobId },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NotDue(decision) => write!(f, "{decision} No maintenance needed."),
            Outcome::DryRun(decision) => write!(f, "{decision} Dry run, no test page sent."),
            Outcome::Printed { decision, job } => write!(f, "Test page sent successfully (Job ID: {job}, reason: {}).", decision.reason()),
        }
    }
}

/// Whole days between `last` and `now`, measured in the timezone of `last`.
pub fn elapsed_days(last: &DateTime<FixedOffset>, now: &DateTime<Utc>) -> i64 {
    (now.with_timezone(&last.timezone()) - *last).num_days()
}

pub fn decide(last: Option<DateTime<FixedOffset>>, now: &DateTime<Utc>, threshold_days: u32) -> Decision {
    match last {
        None => Decision::NoHistory,
        Some(last) => {
            let days = elapsed_days(&last, now);
            if days >= i64::from(threshold_days) {
                Decision::Overdue { last, days }
            } else {
                Decision::Recent { last, days }
            }
        }
    }
}

pub struct Controller<'a> {
    spooler: &'a dyn Spooler,
    renderer: &'a dyn PageRenderer,
    settings: &'a Settings,
    work_dir: PathBuf,
}

impl<'a> Controller<'a> {
    pub fn new(spooler: &'a dyn Spooler, renderer: &'a dyn PageRenderer, settings: &'a Settings, work_dir: PathBuf) -> Self {
        Self { spooler, renderer, settings, work_dir }
    }

    pub fn run(&self, request: &Request, now: DateTime<Utc>) -> Result<Outcome, MaintenanceError> {
        let printer = PrinterResolver::standard(request.printer, self.spooler, &self.settings.cups.fallback_printer)
            .resolve()
            .context(NoPrinterSnafu)?;
        info!("Checking printer activity for: {}", printer);

        let decision = if request.force {
            Decision::Forced
        } else {
            let last = scanner::last_print_time(&printer, &self.settings.cups.log_file, self.settings.maintenance.history_order)
                .context(ScanSnafu)?;
            decide(last, &now, request.threshold_days)
        };

        if !decision.is_due() {
            return Ok(Outcome::NotDue(decision));
        }
        if request.dry_run {
            return Ok(Outcome::DryRun(decision));
        }

        info!("{} Initiating maintenance print.", decision);
        let job = self.print_test_page(&printer, &now)?;
        Ok(Outcome::Printed { decision, job })
    }

    fn print_test_page(&self, printer: &PrinterName, now: &DateTime<Utc>) -> Result<JobId, MaintenanceError> {
        info!("Generating dynamic test page...");
        let page = TestPage::random(&mut rand::thread_rng(), &now.with_timezone(&Local));
        let file = submitter::create_page_file(&self.work_dir).context(TempFileSnafu { dir: &self.work_dir })?;

        // Dropping `file` on a render failure removes it.
        self.renderer.render(&page, &file).context(RenderSnafu)?;

        info!("Printing test page: {}", file.display());
        submitter::submit_page(self.spooler, printer, file).context(SubmitSnafu)
    }
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum MaintenanceError {
    #[snafu(display("No printer to look after"))]
    NoPrinter { source: ResolveError },

    #[snafu(display("Could not check the print history"))]
    Scan { source: ScanError },

    #[snafu(display("Could not create a test page in {}", dir.display()))]
    TempFile { dir: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to generate test page. Aborting."))]
    Render { source: RenderError },

    #[snafu(display("Failed to print"))]
    Submit { source: SubmitError },
}

impl MaintenanceError {
    /// Fatal setup problems exit with 1, failed maintenance actions with 2.
    pub fn exit_code(&self) -> u8 {
        match self {
            MaintenanceError::NoPrinter { .. } | MaintenanceError::Scan { .. } => 1,
            MaintenanceError::TempFile { .. } | MaintenanceError::Render { .. } | MaintenanceError::Submit { .. } => 2,
        }
    }
}
