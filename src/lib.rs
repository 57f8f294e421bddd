//! Batch region OCR engine.
//!
//! A shared, ordered list of named rectangular regions is applied uniformly
//! across a catalog of uploaded images. Every (image, region) pair is cropped
//! and recognized as an independent job with per-job failure isolation, and
//! the resulting text grid is exported as CSV.
//!
//! The store ([`store::ProjectStore`]) owns all mutable state; the
//! orchestrator ([`batch::Orchestrator`]) runs jobs against it; recognition
//! itself is behind the [`ocr::OcrService`] seam.

pub mod batch;
pub mod config;
pub mod crop;
pub mod editor;
pub mod export;
pub mod ocr;
pub mod paths;
pub mod store;

use std::fs::OpenOptions;
use std::io::Write;

use chrono::Local;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_log_file();
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
