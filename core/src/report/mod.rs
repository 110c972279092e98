pub mod html;
pub mod layout;
pub mod markdown;
pub mod scores_csv;

use crate::config::ReportFormat;
use crate::error::CoreResult;
use crate::review::model::ReviewRecord;
use std::fs;
use std::path::{Path, PathBuf};

use layout::{build_report, ReportDocument, ReportOptions};

/// Serialises laid-out report blocks into a concrete document format.
pub trait DocumentSink {
    fn file_extension(&self) -> &'static str;
    fn render(&self, document: &ReportDocument) -> String;
}

pub fn sink_for(format: ReportFormat) -> Box<dyn DocumentSink> {
    match format {
        ReportFormat::Markdown => Box::new(markdown::MarkdownSink),
        ReportFormat::Html => Box::new(html::HtmlSink),
    }
}

/// Same basename as the input, with the sink's extension.
pub fn default_output_path(input: &Path, sink: &dyn DocumentSink) -> PathBuf {
    input.with_extension(sink.file_extension())
}

pub fn write_report(
    record: &ReviewRecord,
    options: &ReportOptions,
    sink: &dyn DocumentSink,
    output: &Path,
) -> CoreResult<PathBuf> {
    let document = build_report(record, options)?;
    let rendered = sink.render(&document);
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output, rendered)?;
    tracing::info!(path = %output.display(), blocks = document.blocks.len(), "report written");
    Ok(output.to_path_buf())
}
