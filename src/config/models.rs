use std::{path::PathBuf, time::Duration};

use serde_derive::Deserialize;

use crate::page_log::scanner::HistoryOrder;

// When changing anything here, make sure to add
// #[serde(alias = "ihavenounderscores")]
// where needed, so it can be read from the ENV vars.

#[derive(Debug, Deserialize)]
pub struct Cups {
    #[serde(alias = "logfile")]
    pub log_file: PathBuf,
    #[serde(alias = "fallbackprinter")]
    pub fallback_printer: String,
    pub media: String,
}

#[derive(Debug, Deserialize)]
pub struct Maintenance {
    #[serde(alias = "thresholddays")]
    pub threshold_days: u32,
    #[serde(alias = "historyorder")]
    pub history_order: HistoryOrder,
}

#[derive(Debug, Deserialize)]
pub struct Tools {
    pub lpstat: String,
    pub lp: String,
    pub convert: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub cups: Cups,
    pub maintenance: Maintenance,
    pub tools: Tools,
}
