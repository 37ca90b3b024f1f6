//! CSV and JSON Lines export of history records.

use crate::record::HistoryRecord;
use crate::ResultsResult;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

const BASE_COLUMNS: [&str; 5] = [
    "time_s",
    "level_m",
    "inlet_flow",
    "valve_position",
    "outlet_flow",
];

/// Write a header plus one row per record.
///
/// The controller column count comes from the widest record; shorter rows
/// leave the trailing cells empty.
pub fn write_csv<W: Write>(mut out: W, records: &[HistoryRecord]) -> ResultsResult<()> {
    let controllers = records
        .iter()
        .map(|r| r.controllers.len())
        .max()
        .unwrap_or(0);

    let mut header: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    for i in 0..controllers {
        header.push(format!("setpoint_{i}"));
        header.push(format!("error_{i}"));
        header.push(format!("output_{i}"));
    }
    writeln!(out, "{}", header.join(","))?;

    for r in records {
        let mut row = vec![
            r.time_s.to_string(),
            r.level_m.to_string(),
            r.inlet_flow.to_string(),
            r.valve_position.to_string(),
            r.outlet_flow.to_string(),
        ];
        for i in 0..controllers {
            match r.controllers.get(i) {
                Some(c) => {
                    row.push(c.setpoint.to_string());
                    row.push(c.error.to_string());
                    row.push(c.output.to_string());
                }
                None => row.extend(std::iter::repeat_n(String::new(), 3)),
            }
        }
        writeln!(out, "{}", row.join(","))?;
    }
    out.flush()?;
    Ok(())
}

/// One JSON object per line.
pub fn write_jsonl<W: Write>(mut out: W, records: &[HistoryRecord]) -> ResultsResult<()> {
    for record in records {
        let line = serde_json::to_string(record)?;
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Parse JSON Lines, skipping blank lines.
pub fn read_jsonl<R: Read>(input: R) -> ResultsResult<Vec<HistoryRecord>> {
    let mut records = Vec::new();
    for line in BufReader::new(input).lines() {
        let line = line?;
        if !line.trim().is_empty() {
            records.push(serde_json::from_str(&line)?);
        }
    }
    Ok(records)
}

pub fn save_csv(path: &Path, records: &[HistoryRecord]) -> ResultsResult<()> {
    write_csv(BufWriter::new(fs::File::create(path)?), records)
}

pub fn save_jsonl(path: &Path, records: &[HistoryRecord]) -> ResultsResult<()> {
    write_jsonl(BufWriter::new(fs::File::create(path)?), records)
}

pub fn load_jsonl(path: &Path) -> ResultsResult<Vec<HistoryRecord>> {
    read_jsonl(fs::File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_sim::ControllerSnapshot;

    fn record(t: f64, controllers: usize) -> HistoryRecord {
        HistoryRecord {
            time_s: t,
            level_m: 2.5,
            inlet_flow: 1.0,
            valve_position: 0.5,
            outlet_flow: 1.0,
            controllers: (0..controllers)
                .map(|_| ControllerSnapshot {
                    setpoint: 2.5,
                    error: 0.0,
                    output: 0.5,
                })
                .collect(),
        }
    }

    #[test]
    fn csv_header_and_rows() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[record(0.0, 1), record(1.0, 1)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "time_s,level_m,inlet_flow,valve_position,outlet_flow,setpoint_0,error_0,output_0"
        );
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "1,2.5,1,0.5,1,2.5,0,0.5");
    }

    #[test]
    fn csv_pads_missing_controllers() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[record(0.0, 0), record(1.0, 2)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let first_row = text.lines().nth(1).unwrap();
        assert_eq!(first_row.split(',').count(), 11);
        assert!(first_row.ends_with(",,,,,,"));
    }

    #[test]
    fn csv_of_nothing_is_header_only() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "time_s,level_m,inlet_flow,valve_position,outlet_flow\n"
        );
    }

    #[test]
    fn jsonl_one_object_per_line() {
        let mut buf = Vec::new();
        write_jsonl(&mut buf, &[record(0.0, 1), record(1.0, 0)]).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(!text.lines().nth(1).unwrap().contains("controllers"));
        let back = read_jsonl(buf.as_slice()).unwrap();
        assert_eq!(back[0], record(0.0, 1));
    }
}
