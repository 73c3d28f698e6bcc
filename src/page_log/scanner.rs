//! Finds the last time a printer appeared in the CUPS `page_log`.
//!
//! Each page_log line starts with the queue name and carries a bracketed
//! timestamp, e.g. `DeskJet_3630 alice 17 [10/Oct/2023:14:03:21 -0700] 1 1 - localhost`.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use chrono::{DateTime, FixedOffset};
use log::debug;
use regex::Regex;
use serde_derive::Deserialize;
use snafu::{ResultExt, Snafu};

use crate::cups_client::models::PrinterName;

pub const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// How matching entries are reduced to a single timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryOrder {
    /// The last matching line in file order wins.
    #[default]
    Positional,
    /// The largest timestamp wins, regardless of where it appears.
    Newest,
}

/// Scan `log_file` for the last print on `printer`.
///
/// A missing log is not an error, it just means there is no history.
pub fn last_print_time(printer: &PrinterName, log_file: &Path, order: HistoryOrder) -> Result<Option<DateTime<FixedOffset>>, ScanError> {
    let file = match File::open(log_file) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Page log {} does not exist", log_file.display());
            return Ok(None);
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return Err(e).context(AccessDeniedSnafu { path: log_file });
        }
        Err(e) => return Err(e).context(ReadSnafu { path: log_file }),
    };

    scan(printer, BufReader::new(file), order).context(ReadSnafu { path: log_file })
}

/// Stream `reader` line by line and reduce matching entries according to `order`.
pub fn scan<R: BufRead>(printer: &PrinterName, reader: R, order: HistoryOrder) -> io::Result<Option<DateTime<FixedOffset>>> {
    let mut last = None;
    for line in reader.split(b'\n') {
        let line = line?;
        let Some(timestamp) = parse_entry(printer, &String::from_utf8_lossy(&line)) else {
            continue;
        };

        last = match (order, last) {
            (HistoryOrder::Newest, Some(previous)) if previous >= timestamp => Some(previous),
            _ => Some(timestamp),
        };
    }

    Ok(last)
}

/// Timestamp of a single log line, if the line belongs to `printer` and carries a valid one.
pub fn parse_entry(printer: &PrinterName, line: &str) -> Option<DateTime<FixedOffset>> {
    static TIMESTAMP_REGEX: OnceLock<Regex> = OnceLock::new();

    if line.split_whitespace().next()? != printer.as_str() {
        return None;
    }

    let regex = TIMESTAMP_REGEX.get_or_init(|| Regex::new(r"\[(.*?)]").expect("valid regex"));
    let bracketed = regex.captures(line)?.get(1)?.as_str();

    match DateTime::parse_from_str(bracketed, TIMESTAMP_FORMAT) {
        Ok(timestamp) => Some(timestamp),
        Err(e) => {
            debug!("Skipping page log entry with timestamp '{}': {}", bracketed, e);
            None
        }
    }
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum ScanError {
    #[snafu(display("Permission denied reading {}. Run as root or as a user with read access to the log.", path.display()))]
    AccessDenied { path: PathBuf, source: io::Error },

    #[snafu(display("Could not read {}", path.display()))]
    Read { path: PathBuf, source: io::Error },
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Cursor};

    use chrono::TimeZone;

    use super::*;

    const LOG: &str = "\
DeskJet_3630 alice 11 [01/Jan/2024:10:00:00 +0000] 1 1 - localhost
LaserJet bob 12 [03/Jan/2024:09:00:00 +0000] 1 1 - localhost

DeskJet_3630 alice 13 [02/Jan/2024:11:30:00 +0100] 1 1 - localhost
DeskJet_3630 alice 14 [garbage] 1 1 - localhost
DeskJet_3630 alice 15 no timestamp here
LaserJet bob 16 [04/Jan/2024:09:00:00 +0000] 1 1 - localhost
";

    fn printer(name: &str) -> PrinterName {
        PrinterName::new(name).unwrap()
    }

    fn at(offset_hours: i32, y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_hours * 3600).unwrap().with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn scan_str(name: &str, log: &str, order: HistoryOrder) -> Option<DateTime<FixedOffset>> {
        scan(&printer(name), Cursor::new(log.as_bytes()), order).unwrap()
    }

    #[test]
    fn parses_cups_timestamps() {
        let entry = parse_entry(&printer("DeskJet_3630"), "DeskJet_3630 a 1 [10/Oct/2023:14:03:21 -0700] 1 1");

        assert_eq!(entry, Some(at(-7, 2023, 10, 10, 14, 3, 21)));
    }

    #[test]
    fn returns_last_matching_entry_and_skips_malformed_lines() {
        assert_eq!(scan_str("DeskJet_3630", LOG, HistoryOrder::Positional), Some(at(1, 2024, 1, 2, 11, 30, 0)));
        assert_eq!(scan_str("LaserJet", LOG, HistoryOrder::Positional), Some(at(0, 2024, 1, 4, 9, 0, 0)));
    }

    #[test]
    fn no_matching_lines_yields_none() {
        assert_eq!(scan_str("OfficeJet", LOG, HistoryOrder::Positional), None);
        assert_eq!(scan_str("OfficeJet", "", HistoryOrder::Newest), None);
    }

    #[test]
    fn printer_name_must_match_the_first_token_exactly() {
        let log = "DeskJet_3630x a 1 [01/Jan/2024:10:00:00 +0000]\nfoo DeskJet_3630 [01/Jan/2024:10:00:00 +0000]\n";

        assert_eq!(scan_str("DeskJet_3630", log, HistoryOrder::Positional), None);
    }

    #[test]
    fn out_of_order_log_keeps_positional_last_entry() {
        let log = "\
DeskJet_3630 a 1 [09/Jan/2024:10:00:00 +0000] 1 1
DeskJet_3630 a 2 [01/Jan/2024:10:00:00 +0000] 1 1
";

        assert_eq!(scan_str("DeskJet_3630", log, HistoryOrder::Positional), Some(at(0, 2024, 1, 1, 10, 0, 0)));
    }

    #[test]
    fn out_of_order_log_with_newest_order_keeps_largest_timestamp() {
        let log = "\
DeskJet_3630 a 1 [09/Jan/2024:10:00:00 +0000] 1 1
DeskJet_3630 a 2 [01/Jan/2024:10:00:00 +0000] 1 1
";

        assert_eq!(scan_str("DeskJet_3630", log, HistoryOrder::Newest), Some(at(0, 2024, 1, 9, 10, 0, 0)));
    }

    #[test]
    fn invalid_utf8_lines_do_not_abort_the_scan() {
        let mut log = b"DeskJet_3630 \xff\xfe 1 [01/Jan/2024:10:00:00 +0000] 1 1\n".to_vec();
        log.extend_from_slice(b"DeskJet_3630 a 2 [02/Jan/2024:10:00:00 +0000] 1 1");

        let last = scan(&printer("DeskJet_3630"), Cursor::new(log), HistoryOrder::Positional).unwrap();

        assert_eq!(last, Some(at(0, 2024, 1, 2, 10, 0, 0)));
    }

    #[test]
    fn missing_log_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();

        let last = last_print_time(&printer("DeskJet_3630"), &dir.path().join("page_log"), HistoryOrder::Positional).unwrap();

        assert_eq!(last, None);
    }

    #[test]
    fn reads_log_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page_log");
        fs::write(&path, LOG).unwrap();

        let last = last_print_time(&printer("DeskJet_3630"), &path, HistoryOrder::Positional).unwrap();

        assert_eq!(last, Some(at(1, 2024, 1, 2, 11, 30, 0)));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_log_file_is_an_access_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page_log");
        fs::write(&path, LOG).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores file modes, nothing to assert there.
        if File::open(&path).is_ok() {
            return;
        }

        let err = last_print_time(&printer("DeskJet_3630"), &path, HistoryOrder::Positional).unwrap_err();

        assert!(matches!(err, ScanError::AccessDenied { .. }));
        assert!(err.to_string().contains("Permission denied"));
    }
}
