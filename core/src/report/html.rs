use html_escape::encode_text;

use super::layout::{CheckRow, NotesCell, ReportBlock, ReportDocument, RuleWeight, EMPTY_CELL, NOTES_SEE_BELOW};
use super::DocumentSink;

const STYLE: &str = r#"body { font-family: Helvetica, Arial, sans-serif; margin: 0.75in; color: #1a202c; }
h1 { color: #1a365d; text-align: center; font-size: 22pt; }
h2 { color: #2c5282; font-size: 16pt; margin-top: 20pt; }
h3 { color: #3182ce; font-size: 13pt; margin-top: 18pt; }
hr.heavy { border: 0; border-top: 4px solid #2c5282; }
hr.light { border: 0; border-top: 1px solid #cbd5e0; }
table { border-collapse: collapse; width: 100%; font-size: 10pt; }
td, th { border: 0.5px solid #e2e8f0; padding: 6px; vertical-align: top; text-align: left; }
table.fields td { background: #edf2f7; }
table.checks th { background: #2c5282; color: #fff; }
table.checks td.score { text-align: center; }
table.checks tr:nth-child(even) td { background: #f8fafc; }
p.notes-label { font-size: 9pt; font-weight: bold; font-style: italic; color: #4a5568; margin-left: 10px; }
p.notes-expanded { font-size: 9pt; margin-left: 20px; background: #f8fafc; padding: 5px; }
p.total-risk { font-weight: bold; color: #b91c1c; }
div.page-break { page-break-after: always; break-after: page; }
p.footer { text-align: center; font-size: 9pt; color: #718096; }"#;

pub struct HtmlSink;

impl DocumentSink for HtmlSink {
    fn file_extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, document: &ReportDocument) -> String {
        let title = document
            .blocks
            .iter()
            .find_map(|b| match b {
                ReportBlock::Title(t) => Some(t.as_str()),
                _ => None,
            })
            .unwrap_or_default();

        let mut out = Vec::new();
        out.push("<!DOCTYPE html>".to_string());
        out.push("<html>".to_string());
        out.push("<head>".to_string());
        out.push("<meta charset=\"utf-8\">".to_string());
        out.push(format!("<title>{}</title>", encode_text(title)));
        out.push(format!("<style>\n{}\n</style>", STYLE));
        out.push("</head>".to_string());
        out.push("<body>".to_string());
        out.extend(document.blocks.iter().map(render_block));
        out.push("</body>".to_string());
        out.push("</html>".to_string());
        out.push(String::new());
        out.join("\n")
    }
}

fn render_block(block: &ReportBlock) -> String {
    match block {
        ReportBlock::Title(title) => format!("<h1>{}</h1>", encode_text(title)),
        ReportBlock::Rule(RuleWeight::Heavy) => "<hr class=\"heavy\">".to_string(),
        ReportBlock::Rule(RuleWeight::Light) => "<hr class=\"light\">".to_string(),
        ReportBlock::SectionHeader(title) => format!("<h2>{}</h2>", encode_text(title)),
        ReportBlock::ItemHeader { index, name } => {
            format!("<h3>{}. {}</h3>", index, encode_text(name))
        }
        ReportBlock::FieldTable(rows) => {
            let mut lines = vec!["<table class=\"fields\">".to_string()];
            for (label, value) in rows {
                lines.push(format!(
                    "<tr><td><b>{}:</b></td><td>{}</td></tr>",
                    encode_text(label),
                    with_breaks(value)
                ));
            }
            lines.push("</table>".to_string());
            lines.join("\n")
        }
        ReportBlock::CheckTable(rows) => {
            let mut lines = vec![
                "<table class=\"checks\">".to_string(),
                "<tr><th>Check</th><th>Risk Score</th><th>Notes</th></tr>".to_string(),
            ];
            lines.extend(rows.iter().map(check_row));
            lines.push("</table>".to_string());
            lines.join("\n")
        }
        ReportBlock::ExpandedNotes { check, notes } => format!(
            "<p class=\"notes-label\">► {}:</p>\n<p class=\"notes-expanded\">{}</p>",
            encode_text(check),
            with_breaks(notes)
        ),
        ReportBlock::TotalRisk(total) => {
            format!("<p class=\"total-risk\">Total Risk Score: {}</p>", total)
        }
        ReportBlock::Paragraph(text) => format!("<p>{}</p>", with_breaks(text)),
        ReportBlock::PageBreak => "<div class=\"page-break\"></div>".to_string(),
        ReportBlock::Footer(text) => format!("<p class=\"footer\">{}</p>", encode_text(text)),
    }
}

fn check_row(row: &CheckRow) -> String {
    let score = match &row.score {
        Some(s) => format!("<b>{}</b>", encode_text(s)),
        None => EMPTY_CELL.to_string(),
    };
    let notes = match &row.notes {
        NotesCell::Inline(text) => with_breaks(text),
        NotesCell::Overflow => format!("<i>{}</i>", NOTES_SEE_BELOW),
        NotesCell::Empty => EMPTY_CELL.to_string(),
    };
    format!(
        "<tr><td>{}</td><td class=\"score\">{}</td><td>{}</td></tr>",
        encode_text(&row.check),
        score,
        notes
    )
}

fn with_breaks(text: &str) -> String {
    encode_text(&text.replace("\r\n", "\n"))
        .replace('\n', "<br/>")
}
