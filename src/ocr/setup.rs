//! Tesseract discovery.
//!
//! Locates the executable and tessdata directory: a locally managed
//! installation first, then PATH, then common install locations, then
//! `TESSDATA_PREFIX`. Nothing is downloaded; a missing install is reported
//! with instructions.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{anyhow, Result};

use crate::log;

#[cfg(windows)]
const EXE_NAME: &str = "tesseract.exe";
#[cfg(not(windows))]
const EXE_NAME: &str = "tesseract";

/// Returns the directory for a locally managed Tesseract installation.
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ocr-grid")
        .join("tesseract")
}

fn common_executable_paths() -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![
            PathBuf::from(r"C:\Program Files\Tesseract-OCR\tesseract.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/bin/tesseract"),
            PathBuf::from("/usr/local/bin/tesseract"),
            PathBuf::from("/opt/homebrew/bin/tesseract"),
        ]
    }
}

fn common_tessdata_paths() -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![
            PathBuf::from(r"C:\Program Files\Tesseract-OCR\tessdata"),
            PathBuf::from(r"C:\Program Files (x86)\Tesseract-OCR\tessdata"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/share/tesseract-ocr/5/tessdata"),
            PathBuf::from("/usr/share/tesseract-ocr/4.00/tessdata"),
            PathBuf::from("/usr/share/tessdata"),
            PathBuf::from("/usr/local/share/tessdata"),
            PathBuf::from("/opt/homebrew/share/tessdata"),
        ]
    }
}

/// Finds the Tesseract executable, checking the local dir first, then PATH,
/// then common install locations.
pub fn find_tesseract_executable() -> Result<PathBuf> {
    let local_exe = get_tesseract_dir().join(EXE_NAME);
    if local_exe.exists() {
        return Ok(local_exe);
    }

    // Check PATH
    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    for path in common_executable_paths() {
        if path.exists() {
            return Ok(path);
        }
    }

    Err(anyhow!(
        "Tesseract not found. Install Tesseract-OCR and make sure it is on \
         PATH, or set \"tesseract_path\" in config.json."
    ))
}

/// Finds a tessdata directory holding `eng.traineddata`.
pub fn find_tessdata_dir() -> Result<PathBuf> {
    let local_tessdata = get_tesseract_dir().join("tessdata");
    if local_tessdata.join("eng.traineddata").exists() {
        return Ok(local_tessdata);
    }

    for path in common_tessdata_paths() {
        if path.join("eng.traineddata").exists() {
            return Ok(path);
        }
    }

    // Check TESSDATA_PREFIX environment variable
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&prefix);
        if p.join("eng.traineddata").exists() {
            return Ok(p);
        }
        let p = p.join("tessdata");
        if p.join("eng.traineddata").exists() {
            return Ok(p);
        }
    }

    Err(anyhow!(
        "tessdata directory not found. Please ensure eng.traineddata is available."
    ))
}

/// Checks that Tesseract is usable and logs where it was found.
///
/// Called once at startup so a missing install is reported before any batch
/// starts.
pub fn ensure_tesseract() -> Result<()> {
    let executable = find_tesseract_executable()?;
    log(&format!("Tesseract found at: {}", executable.display()));
    match find_tessdata_dir() {
        Ok(tessdata) => log(&format!("tessdata: {}", tessdata.display())),
        Err(_) => log("tessdata not located; relying on the Tesseract installation default"),
    }
    Ok(())
}
