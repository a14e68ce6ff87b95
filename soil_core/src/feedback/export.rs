//! CSV export of feedback records.
//!
//! ```text
//! Date,Name,Email,Type,Rating,Liked,Feedback
//! 2026-03-14,Asha,,regular,5,,"Clear, fast charts"
//! 2026-03-14,,,exit,,Yes,"User liked the experience"
//! ```

use std::io::Write;

use chrono::NaiveDate;

use super::FeedbackRecord;
use crate::errors::{CalcError, CalcResult};

pub const CSV_HEADER: [&str; 7] = ["Date", "Name", "Email", "Type", "Rating", "Liked", "Feedback"];

/// `feedback-export-2026-03-14.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("feedback-export-{}.csv", date.format("%Y-%m-%d"))
}

fn csv_error(e: impl std::fmt::Display) -> CalcError {
    CalcError::SerializationError {
        reason: format!("CSV export failed: {}", e),
    }
}

/// Encode one CSV row without its line terminator.
fn encode_row<I, T>(fields: I, style: csv::QuoteStyle) -> CalcResult<Vec<u8>>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut row = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(style)
        .from_writer(Vec::new());
    row.write_record(fields).map_err(csv_error)?;
    let mut bytes = row.into_inner().map_err(csv_error)?;
    bytes.pop();
    Ok(bytes)
}

/// Write the header and one row per record.
///
/// The feedback column is always quoted. Other fields are quoted only when
/// they contain commas, quotes or newlines. Inner quotes are doubled.
pub fn write_csv<W: Write>(records: &[FeedbackRecord], mut writer: W) -> CalcResult<()> {
    let mut out = encode_row(CSV_HEADER, csv::QuoteStyle::Necessary)?;
    out.push(b'\n');

    for record in records {
        let liked = match record.liked {
            Some(true) => "Yes",
            Some(false) => "No",
            None => "",
        };
        let leading = [
            record.created_at.format("%Y-%m-%d").to_string(),
            record.name.clone().unwrap_or_default(),
            record.email.clone().unwrap_or_default(),
            record.feedback_type.as_str().to_string(),
            record.rating.map(|r| r.to_string()).unwrap_or_default(),
            liked.to_string(),
        ];
        out.extend(encode_row(&leading, csv::QuoteStyle::Necessary)?);
        out.push(b',');
        out.extend(encode_row([&record.feedback_text], csv::QuoteStyle::Always)?);
        out.push(b'\n');
    }

    writer.write_all(&out).and_then(|_| writer.flush()).map_err(csv_error)
}

/// The export as a string.
pub fn export_csv(records: &[FeedbackRecord]) -> CalcResult<String> {
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    String::from_utf8(buffer).map_err(csv_error)
}
