use aimcr_core::config::SessionConfig;
use aimcr_core::drafts::store::DraftStore;
use aimcr_core::review::checklist::{ArtifactCategory, RiskScore};
use aimcr_core::review::model::MetadataField;
use aimcr_core::session::ReviewSession;
use time::macros::datetime;
use time::Duration;

#[test]
fn autosave_fires_only_after_interval_with_pending_edits() {
    let dir = tempfile::tempdir().unwrap();
    let store = DraftStore::open(dir.path()).unwrap();
    let start = datetime!(2025-12-14 09:00:00 UTC);
    let mut session = ReviewSession::new(&SessionConfig::default(), start);

    // Untouched session: nothing to save no matter how long it idles.
    assert!(session
        .autosave_if_due(&store, start + Duration::minutes(10))
        .unwrap()
        .is_none());

    session.set_metadata(MetadataField::ProjectId, "P9");
    session.add_artifact(ArtifactCategory::SourceCode);
    assert!(session
        .autosave_if_due(&store, start + Duration::seconds(30))
        .unwrap()
        .is_none());

    let saved = session
        .autosave_if_due(&store, start + Duration::minutes(11))
        .unwrap()
        .expect("autosave due");
    assert_eq!(saved.name, "P9_20251214_091100.json");
    assert!(!session.is_dirty());

    session
        .set_score(ArtifactCategory::SourceCode, 0, "Secrets scanning", RiskScore::Medium)
        .unwrap();
    assert!(session
        .autosave_if_due(&store, start + Duration::minutes(11) + Duration::seconds(20))
        .unwrap()
        .is_none());
    assert!(session
        .autosave_if_due(&store, start + Duration::minutes(12))
        .unwrap()
        .is_some());
    assert_eq!(store.list().unwrap().len(), 2);
}

#[test]
fn resumed_draft_can_be_edited_and_submitted() {
    let dir = tempfile::tempdir().unwrap();
    let store = DraftStore::open(dir.path().join("drafts")).unwrap();
    let now = datetime!(2025-12-14 09:00:00 UTC);

    let mut session = ReviewSession::new(&SessionConfig::default(), now);
    session.set_metadata(MetadataField::ProjectId, "PROJ001");
    session.add_artifact(ArtifactCategory::Models);
    session
        .rename_artifact(ArtifactCategory::Models, 0, "mistral-7b")
        .unwrap();
    session
        .set_notes(
            ArtifactCategory::Models,
            0,
            "Model card completeness",
            "card lists training data",
        )
        .unwrap();
    let draft = session.save_draft(&store, now).unwrap();

    let loaded = store.load(&draft.name).unwrap();
    let mut resumed = ReviewSession::from_record(loaded, &SessionConfig::default(), now);
    assert_eq!(resumed.record().models[0].name, "mistral-7b");
    resumed.set_recommendation("Approve");
    resumed.set_observations("Clean.");

    let receipt = resumed
        .submit(&store, dir.path(), true, datetime!(2025-12-15 08:00:00 UTC))
        .unwrap();
    assert!(receipt.folder.ends_with("AIMCR-PROJ001-2025-12-15"));
    assert_eq!(resumed.record().artifact_count(), 0);
    assert_eq!(
        resumed.record().metadata.aimcr_date.as_deref(),
        Some("2025-12-15")
    );
}
