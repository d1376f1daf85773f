//! End-of-run summary formatting.
//!
//! Separate from the core pipeline so taglet can be used as a library
//! without pulling terminal output into the engine.

use std::io::{self, Write};

use colored::Colorize;

use crate::core::RunReport;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Print the run summary to stdout.
pub fn print_summary(report: &RunReport) {
    print_summary_to(report, &mut io::stdout().lock());
}

/// Print the run summary to a custom writer.
///
/// Useful for testing or redirecting output.
pub fn print_summary_to<W: Write>(report: &RunReport, writer: &mut W) {
    let files = plural(report.files_scanned, "file", "files");
    let tags = plural(report.tags_found, "tag", "tags");
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Scanned {} source {}, found {} {}",
            report.files_scanned, files, report.tags_found, tags
        )
        .green()
    );

    if report.tags_dropped > 0 {
        let _ = writeln!(
            writer,
            "  {}",
            format!(
                "{} {} dropped (see warnings above)",
                report.tags_dropped,
                plural(report.tags_dropped, "tag", "tags")
            )
            .yellow()
        );
    }

    if report.namespaces_written.is_empty() {
        let _ = writeln!(writer, "  collections already up to date");
    } else {
        for namespace in &report.namespaces_written {
            let _ = writeln!(writer, "  wrote collection \"{}\"", namespace);
        }
    }

    if report.files_regenerated > 0 {
        let _ = writeln!(
            writer,
            "  regenerated tag configuration in {} {}",
            report.files_regenerated,
            plural(report.files_regenerated, "file", "files")
        );
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

#[cfg(test)]
mod tests {
    use crate::core::RunReport;
    use crate::report::*;

    fn rendered(report: &RunReport) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        print_summary_to(report, &mut buffer);
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_summary_counts() {
        let output = rendered(&RunReport {
            files_scanned: 3,
            tags_found: 7,
            tags_dropped: 2,
            namespaces_written: vec!["common".to_string(), "shop".to_string()],
            files_regenerated: 1,
        });

        assert!(output.contains("Scanned 3 source files, found 7 tags"));
        assert!(output.contains("2 tags dropped"));
        assert!(output.contains("wrote collection \"common\""));
        assert!(output.contains("wrote collection \"shop\""));
        assert!(output.contains("regenerated tag configuration in 1 file"));
    }

    #[test]
    fn test_summary_up_to_date() {
        let output = rendered(&RunReport {
            files_scanned: 1,
            tags_found: 1,
            ..RunReport::default()
        });

        assert!(output.contains("Scanned 1 source file, found 1 tag"));
        assert!(output.contains("already up to date"));
        assert!(!output.contains("dropped"));
        assert!(!output.contains("regenerated"));
    }
}
