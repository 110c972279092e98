use crate::error::CoreResult;
use crate::review::checklist::ArtifactCategory;
use crate::review::model::ReviewRecord;

/// One row per (category, artifact, check) in record order.
pub fn render_scores_csv(record: &ReviewRecord) -> CoreResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);
    wtr.write_record([
        "category",
        "artifact_index",
        "artifact_name",
        "check",
        "score",
        "notes",
    ])?;
    for category in ArtifactCategory::ALL {
        for (idx, artifact) in record.artifacts(category).iter().enumerate() {
            let position = (idx + 1).to_string();
            for (check, result) in artifact.checks.iter() {
                let score = result.score.as_ref().map(|s| s.display()).unwrap_or_default();
                wtr.write_record([
                    category.key(),
                    position.as_str(),
                    artifact.display_name(),
                    check,
                    score.as_str(),
                    result.notes.as_str(),
                ])?;
            }
        }
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
