use aimcr_core::drafts::store::{read_record_file, DraftStore, SUBMISSION_DATA_FILE};
use aimcr_core::drafts::sync::{DraftSync, SyncError};
use aimcr_core::error::CoreError;
use aimcr_core::review::checklist::{ArtifactCategory, RiskScore};
use aimcr_core::review::interchange::parse_review_record;
use aimcr_core::review::model::{Artifact, MetadataField, ReviewRecord};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::fs::File;
use std::rc::Rc;
use std::time::{Duration, SystemTime};
use time::macros::datetime;

fn sample_record() -> ReviewRecord {
    let mut record = ReviewRecord::default();
    record.metadata.set(MetadataField::ProjectId, "PROJ 001");
    record.metadata.set(MetadataField::ReviewerName, "Zoë Ångström");
    record.metadata.set(MetadataField::ReviewDate, "2025-12-14");
    let mut artifact = Artifact::new_default(ArtifactCategory::DatasetsUserFiles, 1);
    artifact.name = "imagenet-subset".to_string();
    let check = artifact.checks.get_mut("PII / sensitive data leakage").unwrap();
    check.score = Some(RiskScore::High.into());
    check.notes = "faces present\nconsent unclear".to_string();
    record.datasets_user_files.push(artifact);
    record.observations = "Needs follow-up — PII".to_string();
    record
}

#[derive(Clone, Default)]
struct FailingSync {
    calls: Rc<RefCell<Vec<String>>>,
}

impl DraftSync for FailingSync {
    fn pull(&self) -> Result<(), SyncError> {
        self.calls.borrow_mut().push("pull".to_string());
        Err(SyncError("remote unreachable".to_string()))
    }

    fn publish(&self, message: &str) -> Result<(), SyncError> {
        self.calls.borrow_mut().push(message.to_string());
        Err(SyncError("push rejected".to_string()))
    }
}

#[test]
fn day_first_dates_survive_save_and_load_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = DraftStore::open(dir.path()).unwrap();
    let mut record = sample_record();
    record.metadata.set(MetadataField::ProposalDate, "03-02-2025");
    record.metadata.set(MetadataField::ReviewDate, "14-12-2025");
    assert_eq!(record.metadata.proposal_date.as_deref(), Some("2025-02-03"));

    let entry = store.save(&record, datetime!(2025-12-14 10:00:00 UTC)).unwrap();
    assert_eq!(store.load(&entry.name).unwrap(), record);
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = DraftStore::open(dir.path()).unwrap();
    let record = sample_record();

    let entry = store.save(&record, datetime!(2025-12-14 09:30:05 UTC)).unwrap();
    assert_eq!(entry.name, "PROJ_001_20251214_093005.json");

    let raw = std::fs::read_to_string(&entry.path).unwrap();
    assert!(raw.contains("Zoë Ångström"));
    assert!(raw.contains("\n    \"metadata\": {"));

    let loaded = store.load(&entry.name).unwrap();
    assert_eq!(loaded, record);
    assert_eq!(parse_review_record(&raw).unwrap(), loaded);
}

#[test]
fn list_is_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = DraftStore::open(dir.path()).unwrap();
    let mut record = sample_record();
    let older = store.save(&record, datetime!(2025-12-14 09:00:00 UTC)).unwrap();
    record.metadata.set(MetadataField::ProjectId, "OTHER");
    let newer = store.save(&record, datetime!(2025-12-14 08:00:00 UTC)).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a draft").unwrap();

    let base = SystemTime::now() - Duration::from_secs(3600);
    File::options()
        .write(true)
        .open(&older.path)
        .unwrap()
        .set_modified(base)
        .unwrap();
    File::options()
        .write(true)
        .open(&newer.path)
        .unwrap()
        .set_modified(base + Duration::from_secs(60))
        .unwrap();

    let names: Vec<String> = store.list().unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec![newer.name, older.name]);
}

#[test]
fn load_rejects_paths_and_missing_drafts() {
    let dir = tempfile::tempdir().unwrap();
    let store = DraftStore::open(dir.path().join("drafts")).unwrap();
    assert!(matches!(
        store.load("../secret.json"),
        Err(CoreError::InvalidInput(_))
    ));
    assert!(matches!(
        store.load("missing.json"),
        Err(CoreError::DraftNotFound(_))
    ));

    std::fs::write(store.dir().join("broken.json"), "{\"models\": [").unwrap();
    assert!(matches!(store.load("broken.json"), Err(CoreError::Json(_))));
}

#[test]
fn sync_failures_never_fail_local_writes() {
    let dir = tempfile::tempdir().unwrap();
    let sync = FailingSync::default();
    let calls = sync.calls.clone();
    let store = DraftStore::open(dir.path().join("drafts"))
        .unwrap()
        .with_sync(Box::new(sync));

    store.refresh();
    let entry = store
        .save(&sample_record(), datetime!(2025-12-14 09:30:00 UTC))
        .unwrap();
    assert!(entry.path.is_file());

    let receipt = store
        .submit(&sample_record(), dir.path(), datetime!(2025-12-14 11:00:00 UTC))
        .unwrap();
    assert!(receipt.folder.join(SUBMISSION_DATA_FILE).is_file());

    assert_eq!(
        *calls.borrow(),
        vec![
            "pull".to_string(),
            "draft: PROJ_001".to_string(),
            "FINAL AIMCR PROJ_001".to_string(),
        ]
    );
}

#[test]
fn submission_folder_holds_data_and_scores() {
    let dir = tempfile::tempdir().unwrap();
    let store = DraftStore::open(dir.path().join("drafts")).unwrap();
    let record = sample_record();

    let receipt = store
        .submit(&record, dir.path(), datetime!(2025-12-14 11:00:00 UTC))
        .unwrap();
    assert_eq!(receipt.folder, dir.path().join("AIMCR-PROJ_001-2025-12-14"));

    let data_path = receipt.folder.join("data.json");
    let bytes = std::fs::read(&data_path).unwrap();
    assert_eq!(
        receipt.data_sha256,
        aimcr_core::drafts::store::sha256_hex(&bytes)
    );
    assert_eq!(read_record_file(&data_path).unwrap(), record);

    let scores = std::fs::read_to_string(receipt.folder.join("scores.csv")).unwrap();
    assert!(scores.contains(
        "datasets_user_files,1,imagenet-subset,PII / sensitive data leakage,4,\"faces present\nconsent unclear\""
    ));
}
