use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::IndexError;
use crate::models::{GeoTag, ImageRecord};

/// The authoritative table of every image known to Darkroom.
///
/// A flat, insertion-ordered list of records keyed by filename. Every
/// query is a linear scan; collections stay in the low thousands, so no
/// secondary index is kept. The table persists as a single JSON snapshot
/// that is rewritten in full on every `persist`.
#[derive(Debug)]
pub struct Index {
    rows: Vec<ImageRecord>,
    path: PathBuf,
}

impl Index {
    /// Create an empty index persisting to `path` and write the initial
    /// snapshot immediately.
    pub fn create(path: &Path) -> Result<Self, IndexError> {
        let index = Self {
            rows: Vec::new(),
            path: path.to_path_buf(),
        };
        index.persist()?;
        info!(path = %path.display(), "created empty index");
        Ok(index)
    }

    /// Load the snapshot at `path`.
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        let raw = fs::read_to_string(path)?;
        let rows: Vec<ImageRecord> =
            serde_json::from_str(&raw).map_err(|err| IndexError::CorruptIndex {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;

        // A snapshot with two rows under one key has no well-defined
        // owner for that filename; refuse to load it.
        for (i, row) in rows.iter().enumerate() {
            if rows[..i].iter().any(|r| r.filename == row.filename) {
                return Err(IndexError::CorruptIndex {
                    path: path.to_path_buf(),
                    reason: format!("duplicate filename: {}", row.filename),
                });
            }
        }

        debug!(rows = rows.len(), path = %path.display(), "index loaded");
        Ok(Self {
            rows,
            path: path.to_path_buf(),
        })
    }

    /// Serialize the whole table to the snapshot file, replacing the
    /// previous contents.
    pub fn persist(&self) -> Result<(), IndexError> {
        let json = serde_json::to_string_pretty(&self.rows)?;
        fs::write(&self.path, json)?;
        debug!(rows = self.rows.len(), "index persisted");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.rows.iter().any(|r| r.filename == filename)
    }

    /// All rows, in insertion order.
    pub fn records(&self) -> &[ImageRecord] {
        &self.rows
    }

    /// Distinct event names, sorted.
    pub fn events(&self) -> Vec<String> {
        let mut events: Vec<String> = self.rows.iter().map(|r| r.event.clone()).collect();
        events.sort();
        events.dedup();
        events
    }

    pub fn insert(&mut self, record: ImageRecord) -> Result<(), IndexError> {
        if self.contains(&record.filename) {
            return Err(IndexError::DuplicateKey(record.filename));
        }
        info!(filename = %record.filename, event = %record.event, "record inserted");
        self.rows.push(record);
        Ok(())
    }

    pub fn lookup(&self, filename: &str) -> Result<&ImageRecord, IndexError> {
        self.rows
            .iter()
            .find(|r| r.filename == filename)
            .ok_or_else(|| IndexError::NotFound(filename.to_string()))
    }

    /// Records belonging to `event`, in insertion order.
    pub fn query_by_event(&self, event: &str) -> Vec<&ImageRecord> {
        self.rows.iter().filter(|r| r.event == event).collect()
    }

    /// Attach the geo triple to a single record.
    pub fn set_image_location(&mut self, filename: &str, geo: GeoTag) -> Result<(), IndexError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.filename == filename)
            .ok_or_else(|| IndexError::NotFound(filename.to_string()))?;
        row.geo = Some(geo);
        Ok(())
    }

    /// Attach the geo triple to every record of `event`. Returns the
    /// number of records updated; zero matches is an error here because
    /// the caller asked for a specific event.
    pub fn set_event_location(&mut self, event: &str, geo: GeoTag) -> Result<usize, IndexError> {
        let mut updated = 0;
        for row in self.rows.iter_mut().filter(|r| r.event == event) {
            row.geo = Some(geo.clone());
            updated += 1;
        }
        if updated == 0 {
            return Err(IndexError::NotFound(event.to_string()));
        }
        Ok(updated)
    }

    /// Re-key a record. All other fields are preserved. The caller is
    /// responsible for the matching filesystem rename.
    pub fn rename_image(&mut self, old: &str, new: &str) -> Result<(), IndexError> {
        if old != new && self.contains(new) {
            return Err(IndexError::DuplicateKey(new.to_string()));
        }
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.filename == old)
            .ok_or_else(|| IndexError::NotFound(old.to_string()))?;
        row.filename = new.to_string();
        info!(old, new, "record renamed");
        Ok(())
    }

    /// Bulk-update the event field for all members of `old`. Returns the
    /// number of records updated. The caller is responsible for the
    /// matching directory rename.
    pub fn rename_event(&mut self, old: &str, new: &str) -> usize {
        let mut updated = 0;
        for row in self.rows.iter_mut().filter(|r| r.event == old) {
            row.event = new.to_string();
            updated += 1;
        }
        if updated > 0 {
            info!(old, new, updated, "event renamed");
        }
        updated
    }

    /// Mark a record's pixel content as overwritten by an edit.
    pub fn set_edited(&mut self, filename: &str) -> Result<(), IndexError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.filename == filename)
            .ok_or_else(|| IndexError::NotFound(filename.to_string()))?;
        row.edited = true;
        Ok(())
    }

    /// Remove a record, returning it.
    pub fn delete_image(&mut self, filename: &str) -> Result<ImageRecord, IndexError> {
        let pos = self
            .rows
            .iter()
            .position(|r| r.filename == filename)
            .ok_or_else(|| IndexError::NotFound(filename.to_string()))?;
        let removed = self.rows.remove(pos);
        info!(filename, "record deleted");
        Ok(removed)
    }

    /// Remove every record of `event` and return how many were removed.
    /// Deleting an unknown or empty event is not an error at this level.
    pub fn delete_event(&mut self, event: &str) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| r.event != event);
        let removed = before - self.rows.len();
        if removed > 0 {
            info!(event, removed, "event deleted");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record(filename: &str, event: &str) -> ImageRecord {
        ImageRecord {
            filename: filename.to_string(),
            event: event.to_string(),
            format: "JPEG".to_string(),
            width: 4000,
            height: 3000,
            megapixels: 12.0,
            channels: 3,
            mode: "RGB".to_string(),
            timestamp: 1_700_000_000.0,
            creation: "2023-11-14 22:13:20".to_string(),
            date_time: None,
            date: None,
            edited: false,
            geo: None,
        }
    }

    fn scratch_index() -> (tempfile::TempDir, Index) {
        let dir = tempfile::tempdir().unwrap();
        let index = Index::create(&dir.path().join("index.json")).unwrap();
        (dir, index)
    }

    #[test]
    fn insert_then_lookup_returns_given_fields() {
        let (_dir, mut index) = scratch_index();
        index.insert(test_record("a.jpg", "Paris")).unwrap();

        let record = index.lookup("a.jpg").unwrap();
        assert_eq!(record.event, "Paris");
        assert_eq!(record.width, 4000);
        assert_eq!(record.height, 3000);
        assert_eq!(record.megapixels, 12.0);
        assert!(!record.edited, "edited must default to false");
        assert!(record.geo.is_none(), "geo must default to absent");
    }

    #[test]
    fn duplicate_insert_fails_and_preserves_original() {
        let (_dir, mut index) = scratch_index();
        index.insert(test_record("a.jpg", "Paris")).unwrap();

        let mut other = test_record("a.jpg", "Tokyo");
        other.width = 1;
        let err = index.insert(other).unwrap_err();
        assert!(matches!(err, IndexError::DuplicateKey(ref name) if name == "a.jpg"));

        let record = index.lookup("a.jpg").unwrap();
        assert_eq!(record.event, "Paris");
        assert_eq!(record.width, 4000);
    }

    #[test]
    fn lookup_missing_is_not_found() {
        let (_dir, index) = scratch_index();
        let err = index.lookup("ghost.jpg").unwrap_err();
        assert!(matches!(err, IndexError::NotFound(_)));
    }

    #[test]
    fn query_by_event_preserves_insertion_order() {
        let (_dir, mut index) = scratch_index();
        index.insert(test_record("c.jpg", "Paris")).unwrap();
        index.insert(test_record("a.jpg", "Tokyo")).unwrap();
        index.insert(test_record("b.jpg", "Paris")).unwrap();

        let names: Vec<&str> = index
            .query_by_event("Paris")
            .iter()
            .map(|r| r.filename.as_str())
            .collect();
        assert_eq!(names, ["c.jpg", "b.jpg"]);
        assert!(index.query_by_event("Berlin").is_empty());
    }

    #[test]
    fn events_are_distinct_and_sorted() {
        let (_dir, mut index) = scratch_index();
        index.insert(test_record("a.jpg", "Tokyo")).unwrap();
        index.insert(test_record("b.jpg", "Paris")).unwrap();
        index.insert(test_record("c.jpg", "Tokyo")).unwrap();
        assert_eq!(index.events(), ["Paris", "Tokyo"]);
    }

    #[test]
    fn set_image_location_sets_whole_triple() {
        let (_dir, mut index) = scratch_index();
        index.insert(test_record("a.jpg", "Paris")).unwrap();

        let geo = GeoTag {
            latitude: 48.8566,
            longitude: 2.3522,
            place: "Paris".to_string(),
        };
        index.set_image_location("a.jpg", geo.clone()).unwrap();

        let stored = index.lookup("a.jpg").unwrap().geo.as_ref().unwrap();
        assert_eq!(stored, &geo);
    }

    #[test]
    fn set_image_location_missing_is_not_found() {
        let (_dir, mut index) = scratch_index();
        let geo = GeoTag {
            latitude: 0.0,
            longitude: 0.0,
            place: "Null Island".to_string(),
        };
        assert!(matches!(
            index.set_image_location("ghost.jpg", geo),
            Err(IndexError::NotFound(_))
        ));
    }

    #[test]
    fn set_event_location_updates_all_members() {
        let (_dir, mut index) = scratch_index();
        index.insert(test_record("a.jpg", "Japan")).unwrap();
        index.insert(test_record("b.jpg", "Japan")).unwrap();
        index.insert(test_record("c.jpg", "Paris")).unwrap();

        let geo = GeoTag {
            latitude: 36.5748,
            longitude: 139.2394,
            place: "Japan".to_string(),
        };
        let updated = index.set_event_location("Japan", geo.clone()).unwrap();
        assert_eq!(updated, 2);
        assert_eq!(index.lookup("a.jpg").unwrap().geo.as_ref().unwrap(), &geo);
        assert_eq!(index.lookup("b.jpg").unwrap().geo.as_ref().unwrap(), &geo);
        assert!(index.lookup("c.jpg").unwrap().geo.is_none());
    }

    #[test]
    fn set_event_location_no_match_is_not_found() {
        let (_dir, mut index) = scratch_index();
        let geo = GeoTag {
            latitude: 0.0,
            longitude: 0.0,
            place: "Nowhere".to_string(),
        };
        assert!(matches!(
            index.set_event_location("Nowhere", geo),
            Err(IndexError::NotFound(_))
        ));
    }

    #[test]
    fn rename_image_rekeys_and_preserves_fields() {
        let (_dir, mut index) = scratch_index();
        let mut record = test_record("old.jpg", "Paris");
        record.geo = Some(GeoTag {
            latitude: 48.8566,
            longitude: 2.3522,
            place: "Paris".to_string(),
        });
        index.insert(record).unwrap();

        index.rename_image("old.jpg", "new.jpg").unwrap();

        let renamed = index.lookup("new.jpg").unwrap();
        assert_eq!(renamed.event, "Paris");
        assert_eq!(renamed.megapixels, 12.0);
        assert!(renamed.geo.is_some());
        assert!(matches!(
            index.lookup("old.jpg"),
            Err(IndexError::NotFound(_))
        ));
    }

    #[test]
    fn rename_image_to_existing_key_fails() {
        let (_dir, mut index) = scratch_index();
        index.insert(test_record("a.jpg", "Paris")).unwrap();
        index.insert(test_record("b.jpg", "Paris")).unwrap();
        assert!(matches!(
            index.rename_image("a.jpg", "b.jpg"),
            Err(IndexError::DuplicateKey(_))
        ));
        // Both originals untouched.
        assert!(index.contains("a.jpg"));
        assert!(index.contains("b.jpg"));
    }

    #[test]
    fn rename_event_updates_every_member() {
        let (_dir, mut index) = scratch_index();
        index.insert(test_record("a.jpg", "Japan")).unwrap();
        index.insert(test_record("b.jpg", "Japan")).unwrap();
        index.insert(test_record("c.jpg", "Paris")).unwrap();

        assert_eq!(index.rename_event("Japan", "Tokyo"), 2);
        assert_eq!(index.query_by_event("Tokyo").len(), 2);
        assert!(index.query_by_event("Japan").is_empty());
        assert_eq!(index.rename_event("Ghost", "Anything"), 0);
    }

    #[test]
    fn delete_event_removes_exactly_its_members() {
        let (_dir, mut index) = scratch_index();
        index.insert(test_record("a.jpg", "Japan")).unwrap();
        index.insert(test_record("b.jpg", "Paris")).unwrap();
        index.insert(test_record("c.jpg", "Japan")).unwrap();

        assert_eq!(index.delete_event("Japan"), 2);
        assert!(index.query_by_event("Japan").is_empty());
        assert!(index.contains("b.jpg"));
        // Unknown event removes nothing and is not an error.
        assert_eq!(index.delete_event("Japan"), 0);
    }

    #[test]
    fn set_edited_marks_record() {
        let (_dir, mut index) = scratch_index();
        index.insert(test_record("a.jpg", "Paris")).unwrap();
        index.set_edited("a.jpg").unwrap();
        assert!(index.lookup("a.jpg").unwrap().edited);
    }

    #[test]
    fn persist_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let mut index = Index::create(&path).unwrap();
        let mut record = test_record("a.jpg", "Paris");
        record.date_time = Some("2023:06:01 09:15:00".to_string());
        record.date = Some(chrono::NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        record.geo = Some(GeoTag {
            latitude: 48.8566,
            longitude: 2.3522,
            place: "Paris".to_string(),
        });
        index.insert(record).unwrap();
        index.insert(test_record("b.png", "Tokyo")).unwrap();
        index.persist().unwrap();

        let reloaded = Index::open(&path).unwrap();
        assert_eq!(reloaded.records(), index.records());
    }

    #[test]
    fn open_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(&path, "not json at all").unwrap();
        assert!(matches!(
            Index::open(&path),
            Err(IndexError::CorruptIndex { .. })
        ));
    }

    #[test]
    fn open_rejects_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(&path, r#"[{"filename": "a.jpg"}]"#).unwrap();
        assert!(matches!(
            Index::open(&path),
            Err(IndexError::CorruptIndex { .. })
        ));
    }

    #[test]
    fn open_rejects_duplicate_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let mut index = Index::create(&path).unwrap();
        index.insert(test_record("a.jpg", "Paris")).unwrap();
        index.persist().unwrap();

        // Duplicate the only row by hand.
        let raw = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        let doubled = vec![rows[0].clone(), rows[0].clone()];
        std::fs::write(&path, serde_json::to_string(&doubled).unwrap()).unwrap();

        assert!(matches!(
            Index::open(&path),
            Err(IndexError::CorruptIndex { .. })
        ));
    }

    #[test]
    fn insert_geotag_delete_scenario() {
        let (_dir, mut index) = scratch_index();
        index.insert(test_record("a.jpg", "Paris")).unwrap();
        assert_eq!(index.lookup("a.jpg").unwrap().megapixels, 12.0);

        index
            .set_image_location(
                "a.jpg",
                GeoTag {
                    latitude: 48.8566,
                    longitude: 2.3522,
                    place: "Paris".to_string(),
                },
            )
            .unwrap();
        let geo = index.lookup("a.jpg").unwrap().geo.clone().unwrap();
        assert_eq!(geo.latitude, 48.8566);
        assert_eq!(geo.longitude, 2.3522);
        assert_eq!(geo.place, "Paris");

        let removed = index.delete_image("a.jpg").unwrap();
        assert_eq!(removed.filename, "a.jpg");
        assert!(matches!(index.lookup("a.jpg"), Err(IndexError::NotFound(_))));
    }
}
