//! Report rendering: Markdown and self-contained HTML.
//!
//! Both renderers consume the merged [`ExtractedInformation`] and the parsed
//! [`Report`] and never fail. Blank values display as "Not specified" and a
//! blank or sentinel company name as "Unknown Company".
//!
//! ## Summary table encoding
//!
//! The Markdown report ends with one table row per field. Cell text is
//! escaped so that [`parse_summary_table`] recovers the exact source value:
//!
//! | Source      | Cell      |
//! |-------------|-----------|
//! | `\`         | `\\`      |
//! | `\|`        | `\\\|`    |
//! | newline     | `<br>`    |
//! | `&`         | `&amp;`   |
//! | `<`         | `&lt;`    |
//! | CR          | `&#13;`   |

use crate::model::{is_informative, ExtractedInformation, Field, Report, Section};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fmt::Write;

const NOT_SPECIFIED: &str = "Not specified";
const UNKNOWN_COMPANY: &str = "Unknown Company";
const TABLE_HEADING: &str = "### Extracted Information Summary";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fields listed under "Quick Facts", with their display labels.
const QUICK_FACTS: [(Field, &str); 6] = [
    (Field::TechnologyType, "Technology Type"),
    (Field::ProductDevelopmentStage, "Development Stage"),
    (Field::MarketSize, "Market Size"),
    (Field::InvestmentNeeded, "Investment Needed"),
    (Field::YearsToExit, "Exit Timeline"),
    (Field::ExitValueRange, "Exit Value Range"),
];

/// Fields shown in the HTML info grid.
const INFO_GRID: [Field; 4] = [
    Field::TechnologyType,
    Field::ProductDevelopmentStage,
    Field::MarketSize,
    Field::InvestmentNeeded,
];

fn display_value(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_SPECIFIED
    } else {
        value
    }
}

/// Company name for headings and file names.
pub fn display_company(info: &ExtractedInformation) -> &str {
    let name = info.company_name();
    if is_informative(name.trim()) {
        name.trim()
    } else {
        UNKNOWN_COMPANY
    }
}

// ── Markdown ─────────────────────────────────────────────────────────────

/// Render the Markdown report.
pub fn render_markdown(
    report: &Report,
    info: &ExtractedInformation,
    generated_at: DateTime<Local>,
) -> String {
    let mut md = String::with_capacity(4096);
    let _ = writeln!(md, "# Investment Analysis Report\n");
    let _ = writeln!(md, "## Company: {}\n", display_company(info));
    let _ = writeln!(md, "**Generated:** {}\n", generated_at.format(TIMESTAMP_FORMAT));

    md.push_str("### Quick Facts\n");
    for (field, label) in QUICK_FACTS {
        let _ = writeln!(md, "- **{}:** {}", label, display_value(info.get(field)));
    }
    md.push_str("\n---\n\n");

    for section in Section::ALL {
        let _ = writeln!(md, "## {}\n", section.title());
        let _ = writeln!(md, "{}\n", report.sections.get(section));
    }
    md.push_str("---\n\n");

    let _ = writeln!(md, "{}\n", TABLE_HEADING);
    md.push_str("| Field | Value | Confidence |\n");
    md.push_str("|-------|-------|------------|\n");
    for (field, value) in info.fields.iter() {
        let _ = writeln!(
            md,
            "| {} | {} | {:.2} |",
            field.label(),
            escape_cell(display_value(value)),
            info.confidence(field)
        );
    }
    md
}

fn escape_cell(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            '\n' => out.push_str("<br>"),
            '\r' => out.push_str("&#13;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_cell(cell: &str) -> String {
    const ENTITIES: [(&str, char); 4] = [("<br>", '\n'), ("&#13;", '\r'), ("&amp;", '&'), ("&lt;", '<')];

    let mut out = String::with_capacity(cell.len());
    let mut rest = cell;
    'scan: while let Some(c) = rest.chars().next() {
        if c == '\\' {
            let mut chars = rest[1..].chars();
            match chars.next() {
                Some(escaped) => {
                    out.push(escaped);
                    rest = chars.as_str();
                }
                None => {
                    out.push('\\');
                    rest = "";
                }
            }
            continue;
        }
        for (entity, decoded) in ENTITIES {
            if let Some(tail) = rest.strip_prefix(entity) {
                out.push(decoded);
                rest = tail;
                continue 'scan;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Split a table row on unescaped pipes, without the outer empty cells.
fn split_row(line: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '|' => {
                cells.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    cells.push(&line[start..]);
    // A row starts and ends with a pipe: drop the empty edges.
    if cells.first().is_some_and(|c| c.trim().is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.trim().is_empty()) {
        cells.pop();
    }
    cells
}

/// Strip the single padding space the renderer puts on each side of a cell.
fn unpad(cell: &str) -> &str {
    let cell = cell.strip_prefix(' ').unwrap_or(cell);
    cell.strip_suffix(' ').unwrap_or(cell)
}

/// Read the field summary table back out of a rendered Markdown report.
///
/// Returns `(value, confidence)` per field, with the confidence exactly as
/// printed (two decimals). Rows with unknown labels are skipped.
pub fn parse_summary_table(markdown: &str) -> BTreeMap<Field, (String, String)> {
    let mut rows = BTreeMap::new();
    let Some(start) = markdown.find(TABLE_HEADING) else {
        return rows;
    };
    for line in markdown[start..].lines().filter(|l| l.starts_with('|')) {
        let cells = split_row(line);
        let [label, value, confidence] = cells.as_slice() else {
            continue;
        };
        if let Some(field) = Field::from_label(label.trim()) {
            rows.insert(
                field,
                (unescape_cell(unpad(value)), confidence.trim().to_string()),
            );
        }
    }
    rows
}

// ── HTML ─────────────────────────────────────────────────────────────────

const HTML_STYLE: &str = r#"        body {
            font-family: Arial, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            background-color: #f4f4f4;
        }
        .container {
            background-color: white;
            padding: 30px;
            border-radius: 10px;
            box-shadow: 0 0 10px rgba(0,0,0,0.1);
        }
        h1 {
            color: #333;
            border-bottom: 3px solid #007bff;
            padding-bottom: 10px;
        }
        h2 {
            color: #007bff;
            margin-top: 30px;
        }
        .metadata {
            background-color: #f8f9fa;
            padding: 15px;
            border-radius: 5px;
            margin-bottom: 30px;
        }
        .section {
            margin-bottom: 25px;
        }
        .info-grid {
            display: grid;
            grid-template-columns: repeat(2, 1fr);
            gap: 15px;
            margin-bottom: 30px;
        }
        .info-item {
            background-color: #f8f9fa;
            padding: 10px;
            border-radius: 5px;
        }
        .info-label {
            font-weight: bold;
            color: #666;
        }
        .timestamp {
            text-align: right;
            color: #666;
            font-size: 0.9em;
        }
"#;

/// Escape text for inclusion in HTML element content or attribute values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Escaped text with line breaks kept.
fn html_text(s: &str) -> String {
    html_escape(s).replace("\r\n", "<br>").replace('\n', "<br>")
}

/// Render the self-contained HTML report.
pub fn render_html(
    report: &Report,
    info: &ExtractedInformation,
    generated_at: DateTime<Local>,
) -> String {
    let company = html_escape(display_company(info));
    let mut html = String::with_capacity(8192);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "    <title>Company Analysis Report - {}</title>", company);
    let _ = write!(html, "    <style>\n{}    </style>\n</head>\n<body>\n", HTML_STYLE);
    html.push_str("    <div class=\"container\">\n");
    html.push_str("        <h1>Investment Analysis Report</h1>\n\n");

    html.push_str("        <div class=\"metadata\">\n");
    let _ = writeln!(html, "            <h3>{}</h3>", company);
    let _ = writeln!(
        html,
        "            <div class=\"timestamp\">Generated: {}</div>",
        generated_at.format(TIMESTAMP_FORMAT)
    );
    html.push_str("        </div>\n\n");

    html.push_str("        <div class=\"info-grid\">\n");
    for field in INFO_GRID {
        html.push_str("            <div class=\"info-item\">\n");
        let _ = writeln!(
            html,
            "                <div class=\"info-label\">{}</div>",
            field.label()
        );
        let _ = writeln!(
            html,
            "                <div>{}</div>",
            html_text(display_value(info.get(field)))
        );
        html.push_str("            </div>\n");
    }
    html.push_str("        </div>\n");

    for section in Section::ALL {
        html.push_str("\n        <div class=\"section\">\n");
        let _ = writeln!(html, "            <h2>{}</h2>", section.title());
        let _ = writeln!(
            html,
            "            <p>{}</p>",
            html_text(report.sections.get(section))
        );
        html.push_str("        </div>\n");
    }

    html.push_str("    </div>\n</body>\n</html>\n");
    html
}
