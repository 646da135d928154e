//! Per-process series report rendering
//!
//! Default text report: one banner per process id, then one line per series
//! as `label,<mean>,<sample>,...`. CSV output exists for spreadsheet
//! analysis, and an extended summary adds percentiles per series.

use std::fmt::Write as _;

use crate::calculator::ProcessTable;

/// Render the classic per-pid text report
///
/// `skip_zero_mean` replaces the mean with one computed over non-zero
/// samples only, for checkpoint lists whose dropped intervals show up as
/// zeros upstream.
pub fn render_text(procs: &ProcessTable, skip_zero_mean: bool) -> String {
    let mut out = String::new();
    for (pid, series) in procs {
        let _ = writeln!(out, "========={}============", pid);
        for label in series.labels() {
            let mean = if skip_zero_mean {
                series.mean_nonzero(label)
            } else {
                series.mean(label)
            };
            let _ = write!(out, "{},{}", label, mean);
            if let Some(samples) = series.get(label) {
                for sample in samples {
                    let _ = write!(out, ",{}", sample);
                }
            }
            out.push('\n');
        }
    }
    out
}

/// Render the report as CSV (`pid,series,calls,mean,samples`)
pub fn render_csv(procs: &ProcessTable, skip_zero_mean: bool) -> String {
    let mut out = String::from("pid,series,calls,mean,samples\n");
    for (pid, series) in procs {
        for label in series.labels() {
            let samples = series.get(label).unwrap_or(&[]);
            let mean = if skip_zero_mean {
                series.mean_nonzero(label)
            } else {
                series.mean(label)
            };
            let joined = samples
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(";");
            let _ = writeln!(
                out,
                "{},{},{},{},{}",
                pid,
                escape_field(label),
                samples.len(),
                mean,
                escape_field(&joined)
            );
        }
    }
    out
}

/// Render extended statistics for every non-empty series
pub fn render_extended_summary(procs: &ProcessTable) -> String {
    let mut out = String::from("\n=== Extended Statistics (SIMD-accelerated via Trueno) ===\n");
    for (pid, series) in procs {
        let _ = writeln!(out, "\n--- pid {} ---", pid);
        let mut any = false;
        for label in series.labels() {
            let Some(summary) = series.summary(label) else {
                continue;
            };
            any = true;
            let calls = series.get(label).map_or(0, <[f64]>::len);
            let _ = writeln!(out, "{} ({} samples):", label, calls);
            let _ = writeln!(out, "  Mean:         {:.2}", summary.mean);
            let _ = writeln!(out, "  Std Dev:      {:.2}", summary.stddev);
            let _ = writeln!(out, "  Min:          {:.2}", summary.min);
            let _ = writeln!(out, "  Max:          {:.2}", summary.max);
            let _ = writeln!(out, "  Median (P50): {:.2}", summary.median);
            let _ = writeln!(out, "  P75:          {:.2}", summary.p75);
            let _ = writeln!(out, "  P90:          {:.2}", summary.p90);
            let _ = writeln!(out, "  P95:          {:.2}", summary.p95);
            let _ = writeln!(out, "  P99:          {:.2}", summary.p99);
        }
        if !any {
            let _ = writeln!(out, "(no samples)");
        }
    }
    out
}

/// Escape a CSV field (commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SeriesStore;

    fn table() -> ProcessTable {
        let mut series = SeriesStore::with_labels(&["a:x-a:y", "a:y-a:z"]);
        series.append_if_registered("a:x-a:y", 5.0);
        series.append_if_registered("a:x-a:y", 7.0);
        let mut procs = ProcessTable::new();
        procs.insert(1, series);
        procs
    }

    #[test]
    fn test_text_report_banner_and_rows() {
        let out = render_text(&table(), false);
        assert!(out.contains("=========1============"));
        assert!(out.contains("a:x-a:y,6,5,7"));
        // empty pre-registered series still listed, mean 0
        assert!(out.contains("a:y-a:z,0"));
    }

    #[test]
    fn test_text_report_zero_skipping_mean() {
        let mut procs = ProcessTable::new();
        let mut series = SeriesStore::new();
        series.append("lat", 0.0);
        series.append("lat", 8.0);
        procs.insert(3, series);

        let out = render_text(&procs, true);
        assert!(out.contains("lat,8,0,8"));
        let out = render_text(&procs, false);
        assert!(out.contains("lat,4,0,8"));
    }

    #[test]
    fn test_text_report_orders_pids() {
        let mut procs = table();
        procs.insert(0, SeriesStore::new());
        let out = render_text(&procs, false);
        let p0 = out.find("=========0============").unwrap();
        let p1 = out.find("=========1============").unwrap();
        assert!(p0 < p1);
    }

    #[test]
    fn test_csv_report() {
        let out = render_csv(&table(), false);
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("pid,series,calls,mean,samples"));
        assert_eq!(lines.next(), Some("1,a:x-a:y,2,6,5;7"));
        assert_eq!(lines.next(), Some("1,a:y-a:z,0,0,"));
    }

    #[test]
    fn test_csv_escapes_commas() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_extended_summary_lists_non_empty_series() {
        let out = render_extended_summary(&table());
        assert!(out.contains("--- pid 1 ---"));
        assert!(out.contains("a:x-a:y (2 samples):"));
        assert!(out.contains("Mean:         6.00"));
        assert!(!out.contains("a:y-a:z ("));
    }

    #[test]
    fn test_extended_summary_empty_process() {
        let mut procs = ProcessTable::new();
        procs.insert(4, SeriesStore::new());
        let out = render_extended_summary(&procs);
        assert!(out.contains("(no samples)"));
    }
}
