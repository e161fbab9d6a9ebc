//! # Label Records
//!
//! Input data for a render call. A [`LabelRecord`] is owned by the
//! external record store; this crate only reads it. A [`RenderRequest`]
//! is created per print action and consumed once.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::EtiquetaError;

/// One reagent check-in record, as handed over by the record store.
///
/// ## Example JSON
///
/// ```json
/// {
///   "reagent_name": "AFP",
///   "batch_number": "AFP001",
///   "expiry_date": "2025-08-31",
///   "entry_date": "2025-08-20T00:00:00",
///   "quantity": 1
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRecord {
    /// Reagent name (may contain CJK characters)
    pub reagent_name: String,
    /// Manufacturer batch number
    pub batch_number: String,
    /// Stability expiry date
    pub expiry_date: NaiveDate,
    /// Check-in timestamp
    pub entry_date: NaiveDateTime,
    /// Check-in quantity (> 0); also the default copy count
    pub quantity: u32,
}

impl LabelRecord {
    /// Expiry date as printed on the label (`YYYY/MM/DD`).
    pub fn expiry_text(&self) -> String {
        self.expiry_date.format("%Y/%m/%d").to_string()
    }

    /// Entry date as printed on the label (`YYYY/MM/DD`).
    ///
    /// The time-of-day part of `entry_date` is deliberately dropped;
    /// labels only carry the calendar date.
    pub fn entry_text(&self) -> String {
        self.entry_date.format("%Y/%m/%d").to_string()
    }
}

/// One print action: a record, a copy count, and the new-batch flag.
///
/// Within one request, at most one label differs from the rest (the
/// first copy, and only when `new_batch` is set). See
/// [`crate::layout::LayoutComposer`].
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub record: LabelRecord,
    /// Number of labels to produce (>= 1)
    pub copies: u32,
    /// True when this reagent+batch combination was never seen before
    pub new_batch: bool,
}

impl RenderRequest {
    /// Build a request, validating the copy count.
    pub fn new(record: LabelRecord, copies: u32, new_batch: bool) -> Result<Self, EtiquetaError> {
        if copies == 0 {
            return Err(EtiquetaError::InvalidRequest(
                "copies must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            record,
            copies,
            new_batch,
        })
    }

    /// Whether copy `index` is the one label that carries the
    /// new-batch marking.
    #[inline]
    pub fn is_first_label(&self, index: u32) -> bool {
        self.new_batch && index == 0
    }
}
