use super::layout::{CheckRow, NotesCell, ReportBlock, ReportDocument, RuleWeight, EMPTY_CELL, NOTES_SEE_BELOW};
use super::DocumentSink;

const PAGE_BREAK: &str = "<div style=\"page-break-after: always;\"></div>";

pub struct MarkdownSink;

impl DocumentSink for MarkdownSink {
    fn file_extension(&self) -> &'static str {
        "md"
    }

    fn render(&self, document: &ReportDocument) -> String {
        let mut out: Vec<String> = Vec::with_capacity(document.blocks.len());
        for block in &document.blocks {
            out.push(render_block(block));
        }
        let mut text = out.join("\n\n");
        text.push('\n');
        text
    }
}

fn render_block(block: &ReportBlock) -> String {
    match block {
        ReportBlock::Title(title) => format!("# {}", title),
        ReportBlock::Rule(RuleWeight::Heavy) => "***".to_string(),
        ReportBlock::Rule(RuleWeight::Light) => "---".to_string(),
        ReportBlock::SectionHeader(title) => format!("## {}", title),
        ReportBlock::ItemHeader { index, name } => format!("### {}. {}", index, inline_text(name)),
        ReportBlock::FieldTable(rows) => {
            let mut lines = vec!["| Field | Value |".to_string(), "|---|---|".to_string()];
            for (label, value) in rows {
                lines.push(format!("| **{}:** | {} |", label, table_cell(value)));
            }
            lines.join("\n")
        }
        ReportBlock::CheckTable(rows) => {
            let mut lines = vec![
                "| Check | Risk Score | Notes |".to_string(),
                "|---|:---:|---|".to_string(),
            ];
            lines.extend(rows.iter().map(check_row));
            lines.join("\n")
        }
        ReportBlock::ExpandedNotes { check, notes } => {
            let quoted: Vec<String> = normalize_newlines(notes)
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {}  ", line)
                    }
                })
                .collect();
            format!("***► {}:***\n\n{}", inline_text(check), quoted.join("\n"))
        }
        ReportBlock::TotalRisk(total) => format!("**Total Risk Score: {}**", total),
        ReportBlock::Paragraph(text) => hard_breaks(text),
        ReportBlock::PageBreak => PAGE_BREAK.to_string(),
        ReportBlock::Footer(text) => format!("<sub>{}</sub>", text),
    }
}

fn check_row(row: &CheckRow) -> String {
    let score = match &row.score {
        Some(s) => format!("**{}**", table_cell(s)),
        None => EMPTY_CELL.to_string(),
    };
    let notes = match &row.notes {
        NotesCell::Inline(text) => table_cell(text),
        NotesCell::Overflow => format!("*{}*", NOTES_SEE_BELOW),
        NotesCell::Empty => EMPTY_CELL.to_string(),
    };
    format!("| {} | {} | {} |", table_cell(&row.check), score, notes)
}

fn normalize_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Pipes would split the cell and raw newlines would end the row.
fn table_cell(text: &str) -> String {
    normalize_newlines(text)
        .replace('|', "\\|")
        .replace('\n', "<br>")
}

/// Names inside headers and labels: one line, with Markdown control characters escaped.
fn inline_text(text: &str) -> String {
    let flat = normalize_newlines(text)
        .split('\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let mut out = String::with_capacity(flat.len());
    for ch in flat.chars() {
        if matches!(ch, '\\' | '*' | '_' | '`' | '#' | '[' | ']' | '<' | '>' | '|') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn hard_breaks(text: &str) -> String {
    normalize_newlines(text).replace('\n', "  \n")
}
