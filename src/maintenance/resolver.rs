//! Picks the print queue to look after.
//!
//! Strategies are tried in order and the first one yielding a name wins:
//! an explicit `--printer`, the spooler's default destination, the configured fallback.

use log::debug;
use snafu::{OptionExt, Snafu};

use crate::cups_client::{client::Spooler, models::PrinterName};

pub enum Strategy<'a> {
    Explicit(Option<&'a str>),
    SystemDefault(&'a dyn Spooler),
    Fallback(&'a str),
}

impl Strategy<'_> {
    fn attempt(&self) -> Option<PrinterName> {
        match self {
            Strategy::Explicit(name) => name.and_then(PrinterName::new),
            Strategy::SystemDefault(spooler) => spooler.default_destination(),
            Strategy::Fallback(name) => PrinterName::new(name),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Strategy::Explicit(_) => "command line",
            Strategy::SystemDefault(_) => "system default destination",
            Strategy::Fallback(_) => "configured fallback",
        }
    }
}

pub struct PrinterResolver<'a> {
    strategies: Vec<Strategy<'a>>,
}

impl<'a> PrinterResolver<'a> {
    pub fn new(strategies: Vec<Strategy<'a>>) -> Self {
        Self { strategies }
    }

    /// The standard chain: explicit name, then the spooler default, then `fallback`.
    pub fn standard(explicit: Option<&'a str>, spooler: &'a dyn Spooler, fallback: &'a str) -> Self {
        Self::new(vec![
            Strategy::Explicit(explicit),
            Strategy::SystemDefault(spooler),
            Strategy::Fallback(fallback),
        ])
    }

    pub fn resolve(&self) -> Result<PrinterName, ResolveError> {
        self.strategies.iter()
            .find_map(|strategy| {
                let name = strategy.attempt();
                match &name {
                    Some(name) => debug!("Printer '{}' from {}", name, strategy.describe()),
                    None => debug!("No printer from {}", strategy.describe()),
                }
                name
            })
            .context(NoPrinterSnafu)
    }
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum ResolveError {
    #[snafu(display("Could not detect a default printer. Please specify one with --printer."))]
    NoPrinter,
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, path::Path};

    use crate::cups_client::{client::SubmitError, models::JobId};

    use super::*;

    struct DefaultOnly {
        name: Option<&'static str>,
        queried: Cell<bool>,
    }

    impl DefaultOnly {
        fn new(name: Option<&'static str>) -> Self {
            Self { name, queried: Cell::new(false) }
        }
    }

    impl Spooler for DefaultOnly {
        fn default_destination(&self) -> Option<PrinterName> {
            self.queried.set(true);
            self.name.and_then(PrinterName::new)
        }

        fn submit(&self, _printer: &PrinterName, _file: &Path) -> Result<JobId, SubmitError> {
            unreachable!("resolver never submits")
        }
    }

    #[test]
    fn explicit_name_wins_without_querying_the_spooler() {
        let spooler = DefaultOnly::new(Some("Office"));

        let name = PrinterResolver::standard(Some("Garage"), &spooler, "DeskJet_3630").resolve().unwrap();

        assert_eq!(name.as_str(), "Garage");
        assert!(!spooler.queried.get());
    }

    #[test]
    fn empty_explicit_name_falls_through_to_system_default() {
        let spooler = DefaultOnly::new(Some("Office"));

        let name = PrinterResolver::standard(Some(""), &spooler, "DeskJet_3630").resolve().unwrap();

        assert_eq!(name.as_str(), "Office");
    }

    #[test]
    fn explicit_name_is_used_exactly_as_given() {
        let spooler = DefaultOnly::new(Some("Office"));

        let name = PrinterResolver::standard(Some(" "), &spooler, "DeskJet_3630").resolve().unwrap();

        assert_eq!(name.as_str(), " ");
        assert!(!spooler.queried.get());
    }

    #[test]
    fn fallback_is_used_without_a_system_default() {
        let spooler = DefaultOnly::new(None);

        let name = PrinterResolver::standard(None, &spooler, "DeskJet_3630").resolve().unwrap();

        assert_eq!(name.as_str(), "DeskJet_3630");
        assert!(spooler.queried.get());
    }

    #[test]
    fn nothing_resolvable_is_a_configuration_error() {
        let spooler = DefaultOnly::new(None);

        let err = PrinterResolver::standard(None, &spooler, "").resolve().unwrap_err();

        assert!(err.to_string().contains("--printer"));
    }
}
