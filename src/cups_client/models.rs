use std::fmt;

/// Name of a CUPS print queue, resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterName(String);

impl PrinterName {
    /// Takes `name` as given; returns `None` only for an empty name.
    pub fn new(name: &str) -> Option<Self> {
        (!name.is_empty()).then(|| PrinterName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrinterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Spooler job identifier as reported by `lp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(String);

impl JobId {
    pub const UNKNOWN: &'static str = "Unknown";

    pub fn new(id: impl Into<String>) -> Self {
        JobId(id.into())
    }

    pub fn unknown() -> Self {
        JobId(Self::UNKNOWN.to_string())
    }

}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
