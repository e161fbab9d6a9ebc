//! # Printer Transport Layer
//!
//! Sends composed command blocks to the printer, falling back to a
//! recovery file when the device is unreachable.
//!
//! ## Available Transports
//!
//! - [`raw`]: write-only character device (USB line printer or serial)
//!
//! ## Recovery Files
//!
//! Losing a render because the printer was offline means re-entering
//! the record, so [`dispatch`] never discards output: when the device
//! cannot be opened or written, the blocks are saved to a timestamped
//! `.zpl` file with a commented header describing the request, ready
//! to be replayed against the device later.

pub mod raw;

pub use raw::RawTransport;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{info, warn};

use crate::error::EtiquetaError;
use crate::record::RenderRequest;

/// Where a dispatched render ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// All blocks reached the device.
    Printed { bytes: usize },
    /// The device was unreachable; blocks were saved for replay.
    SavedTo(PathBuf),
}

/// Send every block to `device`, saving to `recovery_dir` on failure.
///
/// Blocks are written in order, one transport write per block. Any
/// transport failure (open or write) downgrades the whole render to a
/// recovery file; partial sends are fine to replay because every block
/// is self-contained.
///
/// ## Errors
///
/// Only when the recovery file itself cannot be written — at that
/// point the output genuinely has nowhere to go.
pub fn dispatch(
    request: &RenderRequest,
    blocks: &[String],
    device: &Path,
    recovery_dir: &Path,
) -> Result<Dispatch, EtiquetaError> {
    match send(blocks, device) {
        Ok(bytes) => {
            info!("sent {} blocks ({} bytes) to {}", blocks.len(), bytes, device.display());
            Ok(Dispatch::Printed { bytes })
        }
        Err(e) => {
            warn!("printer unreachable ({}); saving recovery file", e);
            let path = save_recovery_file(request, blocks, recovery_dir)?;
            info!("saved recovery file {}", path.display());
            Ok(Dispatch::SavedTo(path))
        }
    }
}

fn send(blocks: &[String], device: &Path) -> Result<usize, EtiquetaError> {
    let mut transport = RawTransport::open(device)?;
    let mut bytes = 0;
    for block in blocks {
        transport.write_all(block.as_bytes())?;
        bytes += block.len();
    }
    Ok(bytes)
}

/// Write the blocks to a timestamped recovery file.
///
/// Header lines start with `#` so the file documents itself; a replay
/// tool (or a human with `grep -v '^#'`) strips them before sending.
pub fn save_recovery_file(
    request: &RenderRequest,
    blocks: &[String],
    recovery_dir: &Path,
) -> Result<PathBuf, EtiquetaError> {
    fs::create_dir_all(recovery_dir)?;

    let now = Local::now();
    let path = recovery_dir.join(format!("labels_{}.zpl", now.format("%Y%m%d_%H%M%S")));

    let record = &request.record;
    let mut contents = String::new();
    contents.push_str(&format!("# saved: {}\n", now.format("%Y-%m-%d %H:%M:%S")));
    contents.push_str(&format!("# reagent: {}\n", record.reagent_name));
    contents.push_str(&format!("# batch: {}\n", record.batch_number));
    contents.push_str(&format!("# copies: {}\n", request.copies));
    contents.push_str(&format!("# new batch: {}\n", request.new_batch));
    contents.push_str(&format!(
        "# replay: grep -v '^#' {} > {}\n",
        path.display(),
        raw::DEFAULT_DEVICE
    ));
    for (i, block) in blocks.iter().enumerate() {
        contents.push_str(&format!("# copy {} of {}\n", i + 1, blocks.len()));
        contents.push_str(block);
    }

    fs::write(&path, contents)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LabelRecord;
    use chrono::NaiveDate;

    fn request() -> RenderRequest {
        let record = LabelRecord {
            reagent_name: "AFP".to_string(),
            batch_number: "AFP001".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
            entry_date: NaiveDate::from_ymd_opt(2025, 8, 20)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            quantity: 1,
        };
        RenderRequest::new(record, 2, true).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("etiqueta-test-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_recovery_file_carries_header_and_blocks() {
        let dir = scratch_dir("recovery");
        let blocks = vec!["^XA\n^FDone^FS\n^XZ\n".to_string(), "^XA\n^FDtwo^FS\n^XZ\n".to_string()];
        let path = save_recovery_file(&request(), &blocks, &dir).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("# reagent: AFP"));
        assert!(contents.contains("# batch: AFP001"));
        assert!(contents.contains("# copies: 2"));
        assert!(contents.contains("# new batch: true"));
        assert!(contents.contains("^FDone^FS"));
        assert!(contents.contains("^FDtwo^FS"));
        // Each copy's block sits under its own separator comment.
        assert!(contents.contains("# copy 1 of 2\n^XA"));
        assert!(contents.contains("# copy 2 of 2\n^XA"));
        // Every non-header line is printable command text, so the
        // header and separators strip cleanly for replay.
        for line in contents.lines().filter(|l| !l.starts_with('#')) {
            assert!(line.starts_with('^') || line.starts_with('~'));
        }
        let replay: String = contents
            .lines()
            .filter(|l| !l.starts_with('#'))
            .map(|l| format!("{}\n", l))
            .collect();
        assert_eq!(replay, blocks.concat());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_dispatch_falls_back_to_recovery_file() {
        let dir = scratch_dir("dispatch");
        let blocks = vec!["^XA\n^XZ\n".to_string()];
        let result = dispatch(
            &request(),
            &blocks,
            Path::new("/nonexistent/printer-device"),
            &dir,
        )
        .unwrap();

        match result {
            Dispatch::SavedTo(path) => assert!(path.exists()),
            Dispatch::Printed { .. } => panic!("device should not exist"),
        }

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_recovery_filename_shape() {
        let dir = scratch_dir("name");
        let path = save_recovery_file(&request(), &["^XA\n^XZ\n".to_string()], &dir).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("labels_"));
        assert!(name.ends_with(".zpl"));

        let _ = fs::remove_dir_all(&dir);
    }
}
