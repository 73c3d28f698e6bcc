use std::{io, path::Path};

use log::{debug, warn};
use tempfile::TempPath;

use crate::cups_client::{client::{Spooler, SubmitError}, models::{JobId, PrinterName}};

/// Reserve a uniquely named PNG in `dir` for one submission attempt.
///
/// The file is removed when the returned path is dropped.
pub fn create_page_file(dir: &Path) -> io::Result<TempPath> {
    Ok(tempfile::Builder::new()
        .prefix("maintenance-page-")
        .suffix(".png")
        .tempfile_in(dir)?
        .into_temp_path())
}

/// Submit `page` to `printer`, then delete it whatever the outcome.
pub fn submit_page(spooler: &dyn Spooler, printer: &PrinterName, page: TempPath) -> Result<JobId, SubmitError> {
    let result = spooler.submit(printer, &page);
    discard(page);
    result
}

/// Delete a temporary page, tolerating it already being gone.
pub fn discard(page: TempPath) {
    let path = page.to_path_buf();
    match page.close() {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove {}: {}", path.display(), e),
    }
}
