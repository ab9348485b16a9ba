use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use super::model::{
    Category, EquipmentRecord, RawRecord, RecordDetails, RecordStore, ScaleDetails,
    WeighbridgeDetails,
};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one category's records from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `[{ "縣市": ..., "latitude": ..., "longitude": ..., ... }, ...]`
/// * `.csv`  – header row with the same column names
pub fn load_records(path: &Path, category: Category) -> Result<Vec<EquipmentRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "json" => read_json_rows(path)?,
        "csv" => read_csv_rows(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let records = match category {
        Category::Scale => rows_to_records::<ScaleDetails>(rows, path),
        Category::Weighbridge => rows_to_records::<WeighbridgeDetails>(rows, path),
    };

    let unplaced = records.iter().filter(|r| r.position.is_none()).count();
    if unplaced > 0 {
        log::warn!(
            "{}: {unplaced} records have no usable coordinates and will not be shown",
            path.display()
        );
    }
    log::info!("Loaded {} {category} from {}", records.len(), path.display());
    Ok(records)
}

/// Both datasets plus the messages of any source that failed.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub store: RecordStore,
    pub errors: Vec<String>,
}

/// Load both datasets concurrently and join on both.
///
/// A failing source is logged and contributes no records; the other
/// category is still returned.
pub fn load_store(scale_path: &Path, weighbridge_path: &Path) -> LoadOutcome {
    let (scales, weighbridges) = thread::scope(|s| {
        let scales = s.spawn(|| load_records(scale_path, Category::Scale));
        let weighbridges = s.spawn(|| load_records(weighbridge_path, Category::Weighbridge));
        (join_load(scales), join_load(weighbridges))
    });

    let mut errors = Vec::new();
    let mut take = |result: Result<Vec<EquipmentRecord>>, category: Category, path: &Path| {
        result.unwrap_or_else(|e| {
            log::error!("Error loading {category} from {}: {e:#}", path.display());
            errors.push(format!("{category}: {e:#}"));
            Vec::new()
        })
    };
    let scales = take(scales, Category::Scale, scale_path);
    let weighbridges = take(weighbridges, Category::Weighbridge, weighbridge_path);

    LoadOutcome {
        store: RecordStore::new(scales, weighbridges),
        errors,
    }
}

/// Run [`load_store`] on a background thread.
pub fn spawn_load(scale_path: PathBuf, weighbridge_path: PathBuf) -> Receiver<LoadOutcome> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let outcome = load_store(&scale_path, &weighbridge_path);
        // The receiver is gone only if the viewer already closed.
        let _ = tx.send(outcome);
    });
    rx
}

fn join_load(
    handle: thread::ScopedJoinHandle<'_, Result<Vec<EquipmentRecord>>>,
) -> Result<Vec<EquipmentRecord>> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => bail!("loader thread panicked"),
    }
}

// ---------------------------------------------------------------------------
// Row conversion
// ---------------------------------------------------------------------------

fn rows_to_records<D>(rows: Vec<JsonValue>, path: &Path) -> Vec<EquipmentRecord>
where
    D: DeserializeOwned + Into<RecordDetails>,
{
    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord<D>>(row) {
            Ok(raw) => match raw.into_record() {
                Some(rec) => records.push(rec),
                None => log::warn!("{}: row {i} has no region, skipped", path.display()),
            },
            Err(e) => log::warn!("{}: row {i} skipped: {e}", path.display()),
        }
    }
    records
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn read_json_rows(path: &Path) -> Result<Vec<JsonValue>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    match root {
        JsonValue::Array(rows) => Ok(rows),
        _ => bail!("Expected top-level JSON array"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Every cell is read as text so serial and certificate numbers keep
/// their leading zeros.
fn read_csv_rows(path: &Path) -> Result<Vec<JsonValue>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("{}: CSV row {row_no} skipped: {e}", path.display());
                continue;
            }
        };
        let obj: Map<String, JsonValue> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), JsonValue::String(v.to_string())))
            .collect();
        rows.push(JsonValue::Object(obj));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ComplianceState, Coordinates};
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_json_scale_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "scale-data.json",
            r#"[
                {"縣市": "臺北市", "latitude": 25.04, "longitude": 121.51, "檢查合格與否": "N", "店名": "一號攤"},
                {"縣市": "臺北市", "latitude": null, "longitude": 121.51, "檢查合格與否": "Y"},
                {"latitude": 25.0, "longitude": 121.0},
                "not an object"
            ]"#,
        );

        let records = load_records(&path, Category::Scale).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].compliance(), ComplianceState::Failing);
        assert_eq!(records[0].details.headline(), Some("一號攤"));
        assert_eq!(records[1].position, None);
    }

    #[test]
    fn loads_csv_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "weighbridge.csv",
            "\u{feff}縣市,latitude,longitude,檢查合格與否,所有人,器號\n\
             桃園市,24.99,121.30, n ,大園砂石,007\n\
             桃園市,,,Y,,\n",
        );

        let records = load_records(&path, Category::Weighbridge).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category(), Category::Weighbridge);
        assert_eq!(records[0].position, Coordinates::new(24.99, 121.30));
        assert_eq!(records[0].compliance(), ComplianceState::Failing);
        let RecordDetails::Weighbridge(d) = &records[0].details else {
            panic!("expected weighbridge details");
        };
        assert_eq!(d.serial.as_deref(), Some("007"));
        assert_eq!(records[1].position, None);
        assert_eq!(records[1].details.headline(), None);
    }

    #[test]
    fn short_csv_row_does_not_drop_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "weighbridge.csv",
            "縣市,latitude,longitude,檢查合格與否\n\
             臺北市,25.0,121.5,Y\n\
             臺北市,25.1\n\
             高雄市,22.6,120.3,N\n",
        );

        let records = load_records(&path, Category::Weighbridge).unwrap();
        let placed: Vec<&str> = records
            .iter()
            .filter(|r| r.position.is_some())
            .map(|r| r.region.as_str())
            .collect();
        assert_eq!(placed, vec!["臺北市", "高雄市"]);
        assert_eq!(records[0].compliance(), ComplianceState::Passing);
        assert_eq!(records.last().unwrap().compliance(), ComplianceState::Failing);

        let scales = write_file(&dir, "scale.json", "[]");
        let outcome = load_store(&scales, &path);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.store.records(Category::Weighbridge).len(), records.len());
    }

    #[test]
    fn rejects_non_array_json_and_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let obj = write_file(&dir, "data.json", r#"{"縣市": "臺北市"}"#);
        assert!(load_records(&obj, Category::Scale).is_err());

        let txt = write_file(&dir, "data.txt", "");
        assert!(load_records(&txt, Category::Scale).is_err());
    }

    #[test]
    fn failed_source_becomes_empty_category() {
        let dir = tempfile::tempdir().unwrap();
        let scales = write_file(
            &dir,
            "scale-data.json",
            r#"[{"縣市": "臺中市", "latitude": 24.1, "longitude": 120.6}]"#,
        );
        let missing = dir.path().join("weighbridge-data.json");

        let outcome = load_store(&scales, &missing);
        assert_eq!(outcome.store.records(Category::Scale).len(), 1);
        assert!(outcome.store.records(Category::Weighbridge).is_empty());
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn background_load_delivers_both_datasets() {
        let dir = tempfile::tempdir().unwrap();
        let scales = write_file(
            &dir,
            "s.json",
            r#"[{"縣市": "臺中市", "latitude": 24.1, "longitude": 120.6}]"#,
        );
        let bridges = write_file(
            &dir,
            "w.json",
            r#"[{"縣市": "臺南市", "latitude": 23.0, "longitude": 120.2}]"#,
        );

        let outcome = spawn_load(scales, bridges).recv().unwrap();
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.store.len(), 2);
        assert_eq!(outcome.store.regions().len(), 2);
    }
}
