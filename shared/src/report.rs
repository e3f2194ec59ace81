use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    /// Remaining lines of the section joined with `'\n'`.
    pub body: String,
}

/// Splits a narrative report into titled sections.
///
/// Sections are separated by a blank line. Empty or whitespace-only sections
/// are dropped; the first line of each section is its title.
pub fn render_report(report: &str) -> Vec<ReportSection> {
    let normalized = report.replace("\r\n", "\n");

    normalized
        .split("\n\n")
        .map(|chunk| chunk.trim_matches('\n'))
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| {
            let mut lines = chunk.split('\n');
            let title = lines.next().unwrap_or_default().to_string();
            let body = lines.collect::<Vec<_>>().join("\n");
            ReportSection { title, body }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_titled_sections() {
        let sections = render_report("Findings\nClear lungs.\n\nImpression\nNormal.");
        assert_eq!(
            sections,
            vec![
                ReportSection {
                    title: "Findings".into(),
                    body: "Clear lungs.".into(),
                },
                ReportSection {
                    title: "Impression".into(),
                    body: "Normal.".into(),
                },
            ]
        );
    }

    #[test]
    fn body_keeps_line_breaks() {
        let sections = render_report("Bulgular:\n- Kardiyomegali\n- Ödem");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Bulgular:");
        assert_eq!(sections[0].body, "- Kardiyomegali\n- Ödem");
    }

    #[test]
    fn trailing_blank_section_is_dropped() {
        let sections = render_report("Findings\nClear.\n\n   \n\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Findings");
    }

    #[test]
    fn rendering_is_idempotent() {
        let report = "A\nx\n\nB\ny\nz\n\n\nC";
        assert_eq!(render_report(report), render_report(report));
        let titles: Vec<_> = render_report(report).into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn title_only_section_has_empty_body() {
        let sections = render_report("Impression");
        assert_eq!(sections[0].body, "");
    }

    #[test]
    fn crlf_reports_split_like_lf() {
        assert_eq!(
            render_report("A\r\nx\r\n\r\nB\r\ny"),
            render_report("A\nx\n\nB\ny")
        );
    }

    #[test]
    fn empty_report_has_no_sections() {
        assert!(render_report("").is_empty());
        assert!(render_report("\n\n\n").is_empty());
    }
}
