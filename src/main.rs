//! # Etiqueta CLI
//!
//! Command-line interface for reagent label printing.
//!
//! ## Usage
//!
//! ```bash
//! # Print 5 new-batch labels to the default device
//! etiqueta print --name AFP --batch AFP001 --expiry 2025-08-31 \
//!     --entry 2025-08-20 --copies 5 --new-batch
//!
//! # Read the record from a JSON file instead of flags
//! etiqueta print --record entry.json --copies 3
//!
//! # Write the command blocks to a file instead of a device
//! etiqueta print --out labels.zpl
//!
//! # Render a PDF for driver-based printing
//! etiqueta pdf --name AFP --batch AFP001 --copies 2 --out labels.pdf
//!
//! # Rasterize a caption and save it as PNG
//! etiqueta preview "試劑名稱:" --out caption.png
//! ```

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use etiqueta::{
    EtiquetaError, LabelRecord, RenderRequest,
    font::{FontResolver, FontWeight},
    layout::LayoutComposer,
    pdf::VectorRenderer,
    render::{cache::CAPTION_FONT_PX, cache::FixedGraphics, preview, rasterize},
    transport::{self, Dispatch, raw},
};

/// Etiqueta - Reagent inventory label utility
#[derive(Parser, Debug)]
#[command(name = "etiqueta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// The label record, from a JSON file or individual flags. The flag
/// defaults describe a sample batch, handy for test prints.
#[derive(Args, Debug)]
struct RecordArgs {
    /// Read the record from a JSON file (overrides the field flags)
    #[arg(long, value_name = "FILE")]
    record: Option<PathBuf>,

    /// Reagent name
    #[arg(long, default_value = "AFP")]
    name: String,

    /// Batch number
    #[arg(long, default_value = "AFP001")]
    batch: String,

    /// Stability expiry date (YYYY-MM-DD)
    #[arg(long, default_value = "2025-08-31")]
    expiry: String,

    /// Entry date (YYYY-MM-DD, optionally with HH:MM:SS)
    #[arg(long, default_value = "2025-08-20")]
    entry: String,

    /// Quantity checked in (also the default copy count)
    #[arg(long, default_value = "1")]
    quantity: u32,
}

impl RecordArgs {
    fn load(&self) -> Result<LabelRecord, EtiquetaError> {
        if let Some(path) = &self.record {
            let data = fs::read(path)?;
            return serde_json::from_slice(&data).map_err(|e| {
                EtiquetaError::InvalidRequest(format!("bad record file {}: {}", path.display(), e))
            });
        }

        Ok(LabelRecord {
            reagent_name: self.name.clone(),
            batch_number: self.batch.clone(),
            expiry_date: parse_date(&self.expiry)?,
            entry_date: parse_date_time(&self.entry)?,
            quantity: self.quantity,
        })
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose label blocks and send them to the printer
    Print {
        #[command(flatten)]
        record: RecordArgs,

        /// Number of labels (defaults to the record's quantity)
        #[arg(long)]
        copies: Option<u32>,

        /// Mark this as a new batch (first copy gets the marker)
        #[arg(long)]
        new_batch: bool,

        /// Printer device path
        #[arg(long, default_value = raw::DEFAULT_DEVICE)]
        device: String,

        /// Write blocks to a file instead of the device
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Directory for recovery files when the device is unreachable
        #[arg(long, default_value = "recovery")]
        recovery_dir: PathBuf,
    },

    /// Render labels as a PDF document
    Pdf {
        #[command(flatten)]
        record: RecordArgs,

        /// Number of pages (defaults to the record's quantity)
        #[arg(long)]
        copies: Option<u32>,

        /// Mark this as a new batch (first page gets the marker)
        #[arg(long)]
        new_batch: bool,

        /// Output file
        #[arg(long, default_value = "labels.pdf")]
        out: PathBuf,
    },

    /// Rasterize a text string and save it as a PNG
    Preview {
        /// Text to rasterize
        text: String,

        /// Use the bold font
        #[arg(long)]
        bold: bool,

        /// Output file
        #[arg(long, default_value = "preview.png")]
        out: PathBuf,
    },
}

fn main() {
    pretty_env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), EtiquetaError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Print {
            record,
            copies,
            new_batch,
            device,
            out,
            recovery_dir,
        } => {
            let record = record.load()?;
            let copies = copies.unwrap_or(record.quantity);
            let request = RenderRequest::new(record, copies, new_batch)?;

            let resolver = FontResolver::new();
            let fixed = FixedGraphics::build(&resolver);
            let composer = LayoutComposer::new(&fixed, &resolver);
            let blocks = composer.compose(&request);

            if let Some(path) = out {
                fs::write(&path, blocks.concat())?;
                println!("Wrote {} blocks to {}", blocks.len(), path.display());
                return Ok(());
            }

            match transport::dispatch(&request, &blocks, device.as_ref(), &recovery_dir)? {
                Dispatch::Printed { bytes } => {
                    println!("Printed {} labels ({} bytes) on {}", blocks.len(), bytes, device);
                }
                Dispatch::SavedTo(path) => {
                    println!("Printer unreachable; saved labels to {}", path.display());
                }
            }
            Ok(())
        }

        Commands::Pdf {
            record,
            copies,
            new_batch,
            out,
        } => {
            let record = record.load()?;
            let copies = copies.unwrap_or(record.quantity);
            let request = RenderRequest::new(record, copies, new_batch)?;

            let resolver = FontResolver::new();
            let pdf = VectorRenderer::new(&resolver).render(&request);
            fs::write(&out, &pdf)?;
            println!("Wrote {} pages to {}", copies, out.display());
            Ok(())
        }

        Commands::Preview { text, bold, out } => {
            let resolver = FontResolver::new();
            let weight = if bold { FontWeight::Bold } else { FontWeight::Regular };
            let resolved = resolver.resolve(weight).ok_or(EtiquetaError::FontUnavailable)?;

            let bitmap = rasterize(&text, &resolved.font, CAPTION_FONT_PX)?;
            let png = preview::to_png(&bitmap)?;
            fs::write(&out, &png)?;
            println!("Wrote {}x{} preview to {}", bitmap.width, bitmap.height, out.display());
            Ok(())
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, EtiquetaError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| EtiquetaError::InvalidRequest(format!("bad date {:?}: {}", value, e)))
}

fn parse_date_time(value: &str) -> Result<NaiveDateTime, EtiquetaError> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    parse_date(value).map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
}
