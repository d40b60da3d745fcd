//! CSV export for generated frames.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::frame::{TimeFrame, TimePoint};

/// Exports a frame to a CSV file at the given path.
///
/// Writes a `timestamp` column followed by one column per frame column, in
/// column order. Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv<T: TimePoint>(frame: &TimeFrame<T>, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(frame, buf)
}

/// Writes a frame as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv<T: TimePoint>(frame: &TimeFrame<T>, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = vec!["timestamp".to_string()];
    header.extend(frame.column_names().iter().map(|n| (*n).to_string()));
    wtr.write_record(&header)?;

    let columns: Vec<&[f64]> = frame.columns().map(|(_, values)| values).collect();
    for (row, t) in frame.index().iter().enumerate() {
        let mut record = vec![t.to_string()];
        record.extend(columns.iter().map(|v| format!("{:.6}", v[row])));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

    fn sample_frame() -> TimeFrame<NaiveDateTime> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid literal date");
        let index: Vec<_> = (0..3).map(|h| start + TimeDelta::hours(h)).collect();
        let mut frame = TimeFrame::new(index).expect("increasing index");
        frame
            .insert("Q_ECS_COSTIC", vec![1.5, 0.0, 2.25])
            .expect("matching length");
        frame
    }

    #[test]
    fn header_and_row_count() {
        let frame = sample_frame();
        let mut buf = Vec::new();
        write_csv(&frame, &mut buf).expect("csv export should succeed");
        let csv = String::from_utf8(buf).expect("valid UTF-8");
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("timestamp,Q_ECS_COSTIC"));
        assert_eq!(lines.count(), 3);
    }

    #[test]
    fn deterministic_output() {
        let frame = sample_frame();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_csv(&frame, &mut buf1).expect("first export");
        write_csv(&frame, &mut buf2).expect("second export");
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn round_trip_parseable() {
        let frame = sample_frame();
        let mut buf = Vec::new();
        write_csv(&frame, &mut buf).expect("export");

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let mut rows = 0;
        for record in rdr.records() {
            let rec = record.expect("every row parses");
            assert_eq!(rec.len(), 2);
            let value: f64 = rec[1].parse().expect("numeric column");
            assert!(value.is_finite());
            rows += 1;
        }
        assert_eq!(rows, 3);
    }
}
