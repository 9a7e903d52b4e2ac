//! Split free-text report output into the four named report sections.
//!
//! The generated report has no guaranteed structure, so headers are detected
//! by keyword. Parsing is a line-oriented state machine: the state is the
//! section currently being filled (initially none), and every line is
//! classified before anything is appended.
//!
//! ```text
//!   line contains a trigger ──▶ header: switch section, drop the line
//!   blank line              ──▶ ignored
//!   any other line          ──▶ appended to the current section (if any)
//! ```
//!
//! Triggers are matched as case-insensitive substrings, checked in a fixed
//! priority order. Body text that merely mentions a trigger word (for
//! example "management" inside the ROI discussion) is therefore treated as a
//! header and switches sections. Downstream consumers rely on this exact
//! classification, so the matching rule stays as-is.

use crate::model::{ReportSections, Section};

/// Header triggers in priority order. The first match on a line wins.
pub const SECTION_TRIGGERS: [(&str, Section); 4] = [
    ("nature and state", Section::NatureAndState),
    ("market need", Section::MarketNeedAndSize),
    ("roi", Section::RoiElements),
    ("management", Section::ManagementTeamStrength),
];

/// Classification of a single report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Header(Section),
    Blank,
    Body(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let lower = line.to_lowercase();
    if let Some((_, section)) = SECTION_TRIGGERS
        .iter()
        .find(|(trigger, _)| lower.contains(*trigger))
    {
        return Line::Header(*section);
    }
    if line.trim().is_empty() {
        Line::Blank
    } else {
        Line::Body(line)
    }
}

/// Accumulates body lines into sections as headers are encountered.
#[derive(Debug, Default)]
struct SectionAccumulator {
    current: Option<Section>,
    sections: ReportSections,
}

impl SectionAccumulator {
    fn feed(&mut self, line: &str) {
        match classify(line) {
            Line::Header(section) => self.current = Some(section),
            Line::Blank => {}
            Line::Body(text) => {
                if let Some(section) = self.current {
                    let buf = self.sections.get_mut(section);
                    buf.push_str(text);
                    buf.push('\n');
                }
            }
        }
    }

    fn finish(mut self) -> ReportSections {
        for section in Section::ALL {
            let buf = self.sections.get_mut(section);
            *buf = buf.trim().to_string();
        }
        self.sections
    }
}

/// Parse a generated report into its four sections.
///
/// Text before the first header is discarded. If no header is ever found,
/// all four sections are empty; that is a valid result, not an error.
pub fn parse_report_sections(report_text: &str) -> ReportSections {
    let mut acc = SectionAccumulator::default();
    for line in report_text.split('\n') {
        acc.feed(line);
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_empty_sections() {
        let s = parse_report_sections("");
        assert!(s.is_empty());
    }

    #[test]
    fn text_without_headers_is_dropped() {
        let s = parse_report_sections("Just some prose.\nAnd more prose.");
        assert!(s.is_empty());
    }

    #[test]
    fn basic_two_sections() {
        let s = parse_report_sections("Nature and State\nGrowing fast\n\nROI\nHigh return\n");
        assert_eq!(s.nature_and_state, "Growing fast");
        assert_eq!(s.roi_elements, "High return");
        assert_eq!(s.market_need_and_size, "");
        assert_eq!(s.management_team_strength, "");
    }

    #[test]
    fn typical_generated_report() {
        let text = "\
# Investment Analysis: Acme

## 1. Nature and State of the Product
Acme builds a handheld diagnostic device.
It is in clinical testing.

## 2. Market Need and Size
Clinics lack point-of-care testing.

## 3. Elements of Potential ROI
Exit at $200M within 5 years.

## 4. Strength of the Management Team
The founders lack regulatory experience.
";
        let s = parse_report_sections(text);
        assert_eq!(
            s.nature_and_state,
            "Acme builds a handheld diagnostic device.\nIt is in clinical testing."
        );
        assert_eq!(s.market_need_and_size, "Clinics lack point-of-care testing.");
        assert_eq!(s.roi_elements, "Exit at $200M within 5 years.");
        assert_eq!(
            s.management_team_strength,
            "The founders lack regulatory experience."
        );
    }

    #[test]
    fn trigger_word_in_body_switches_section() {
        let text = "ROI\nHigh return\nWe need strong management going forward\nHiring a CFO";
        let s = parse_report_sections(text);
        assert_eq!(s.roi_elements, "High return");
        // The trigger line itself is consumed as a header.
        assert_eq!(s.management_team_strength, "Hiring a CFO");
    }

    #[test]
    fn multiple_triggers_use_priority_order() {
        // Contains both "market need" and "management": market need wins.
        let text = "Market need for management software\nBody text";
        let s = parse_report_sections(text);
        assert_eq!(s.market_need_and_size, "Body text");
        assert_eq!(s.management_team_strength, "");
    }

    #[test]
    fn trigger_matching_is_case_insensitive_substring() {
        // "roi" hides inside "heroic".
        let text = "NATURE AND STATE\nA heroic effort\nplain line";
        let s = parse_report_sections(text);
        assert_eq!(s.nature_and_state, "");
        assert_eq!(s.roi_elements, "plain line");
    }

    #[test]
    fn repeated_header_appends_to_same_section() {
        let text = "ROI\nfirst\nManagement\nteam\nROI again\nsecond";
        let s = parse_report_sections(text);
        assert_eq!(s.roi_elements, "first\nsecond");
        assert_eq!(s.management_team_strength, "team");
    }

    #[test]
    fn body_lines_keep_inner_indentation() {
        let text = "Market Need and Size\n  - bullet one\n  - bullet two  \n";
        let s = parse_report_sections(text);
        assert_eq!(s.market_need_and_size, "- bullet one\n  - bullet two");
    }
}
