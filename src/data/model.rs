use std::collections::BTreeSet;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Category – which dataset a record came from
// ---------------------------------------------------------------------------

/// Equipment category. Fixed when a record is loaded, never reclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Market scale (磅秤).
    Scale,
    /// Fixed large-capacity weighbridge (地磅).
    Weighbridge,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Scale, Category::Weighbridge];

    /// Title shown on top of a record's description panel.
    pub fn title(self) -> &'static str {
        match self {
            Category::Scale => "Market scale",
            Category::Weighbridge => "Fixed weighbridge",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Scale => write!(f, "Market scales"),
            Category::Weighbridge => write!(f, "Weighbridges"),
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Returns `None` for non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Coordinates {
            latitude,
            longitude,
        })
    }
}

// ---------------------------------------------------------------------------
// Compliance classification
// ---------------------------------------------------------------------------

/// Canonical failing value of the inspection result field.
pub const FAILING_FLAG: &str = "N";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplianceState {
    Passing,
    Failing,
}

impl ComplianceState {
    /// Classify a raw compliance flag.
    ///
    /// The flag is trimmed and upper-cased before comparing against
    /// [`FAILING_FLAG`]. Anything else, including a missing flag or an
    /// unrecognised value, counts as passing.
    pub fn classify(raw: Option<&str>) -> Self {
        match raw {
            Some(flag) if normalize_flag(flag) == FAILING_FLAG => ComplianceState::Failing,
            _ => ComplianceState::Passing,
        }
    }
}

pub fn normalize_flag(raw: &str) -> String {
    raw.trim().to_uppercase()
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

/// Upstream files mix strings, numbers and nulls for the same column.
/// Everything is kept as text; empty text means "absent".
struct TextVisitor;

impl<'de> Visitor<'de> for TextVisitor {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(v.to_string()))
        }
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        if v.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(v))
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(TextVisitor)
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    d.deserialize_any(TextVisitor)
}

/// Coordinates come as numbers or numeric strings; anything unparsable is absent.
fn lenient_coordinate<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let text = d.deserialize_any(TextVisitor)?;
    Ok(text.and_then(|t| t.trim().parse::<f64>().ok()))
}

// ---------------------------------------------------------------------------
// Variant-specific descriptive attributes
// ---------------------------------------------------------------------------

/// Descriptive attributes of a market scale record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScaleDetails {
    #[serde(rename = "店名", default, deserialize_with = "lenient_text")]
    pub shop_name: Option<String>,
    #[serde(rename = "廠牌", default, deserialize_with = "lenient_text")]
    pub brand: Option<String>,
    #[serde(rename = "型式", default, deserialize_with = "lenient_text")]
    pub model: Option<String>,
    #[serde(rename = "器號", default, deserialize_with = "lenient_text")]
    pub serial: Option<String>,
    #[serde(rename = "Max_kg", default, deserialize_with = "lenient_text")]
    pub max_kg: Option<String>,
    #[serde(rename = "e_g", default, deserialize_with = "lenient_text")]
    pub e_g: Option<String>,
    #[serde(rename = "檢定日期", default, deserialize_with = "lenient_text")]
    pub calibration_date: Option<String>,
    #[serde(rename = "檢定合格單號", default, deserialize_with = "lenient_text")]
    pub calibration_cert: Option<String>,
    #[serde(rename = "檢查日期", default, deserialize_with = "lenient_text")]
    pub inspection_date: Option<String>,
    #[serde(rename = "檢查合格單號", default, deserialize_with = "lenient_text")]
    pub inspection_cert: Option<String>,
}

/// Descriptive attributes of a fixed weighbridge record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WeighbridgeDetails {
    #[serde(rename = "所有人", default, deserialize_with = "lenient_text")]
    pub owner: Option<String>,
    #[serde(rename = "地址", default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(rename = "廠牌", default, deserialize_with = "lenient_text")]
    pub brand: Option<String>,
    #[serde(rename = "型號", default, deserialize_with = "lenient_text")]
    pub model: Option<String>,
    #[serde(rename = "器號", default, deserialize_with = "lenient_text")]
    pub serial: Option<String>,
    #[serde(rename = "Max_t", default, deserialize_with = "lenient_text")]
    pub max_t: Option<String>,
    #[serde(rename = "e_kg", default, deserialize_with = "lenient_text")]
    pub e_kg: Option<String>,
    #[serde(rename = "檢定合格期限", default, deserialize_with = "lenient_text")]
    pub calibration_expiry: Option<String>,
    #[serde(rename = "檢定合格單號", default, deserialize_with = "lenient_text")]
    pub calibration_cert: Option<String>,
    #[serde(rename = "檢查日期", default, deserialize_with = "lenient_text")]
    pub inspection_date: Option<String>,
    #[serde(rename = "檢查合格單號", default, deserialize_with = "lenient_text")]
    pub inspection_cert: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordDetails {
    Scale(ScaleDetails),
    Weighbridge(WeighbridgeDetails),
}

impl From<ScaleDetails> for RecordDetails {
    fn from(d: ScaleDetails) -> Self {
        RecordDetails::Scale(d)
    }
}

impl From<WeighbridgeDetails> for RecordDetails {
    fn from(d: WeighbridgeDetails) -> Self {
        RecordDetails::Weighbridge(d)
    }
}

impl RecordDetails {
    pub fn category(&self) -> Category {
        match self {
            RecordDetails::Scale(_) => Category::Scale,
            RecordDetails::Weighbridge(_) => Category::Weighbridge,
        }
    }

    /// Shop name for scales, owner for weighbridges.
    pub fn headline(&self) -> Option<&str> {
        match self {
            RecordDetails::Scale(d) => d.shop_name.as_deref(),
            RecordDetails::Weighbridge(d) => d.owner.as_deref(),
        }
    }

    /// Labelled attribute rows in display order, headline excluded.
    pub fn fields(&self) -> Vec<(&'static str, Option<&str>)> {
        match self {
            RecordDetails::Scale(d) => vec![
                ("Brand", d.brand.as_deref()),
                ("Model", d.model.as_deref()),
                ("Serial no.", d.serial.as_deref()),
                ("Max (kg)", d.max_kg.as_deref()),
                ("e (g)", d.e_g.as_deref()),
                ("Calibration date", d.calibration_date.as_deref()),
                ("Calibration cert. no.", d.calibration_cert.as_deref()),
                ("Inspection date", d.inspection_date.as_deref()),
                ("Inspection cert. no.", d.inspection_cert.as_deref()),
            ],
            RecordDetails::Weighbridge(d) => vec![
                ("Address", d.address.as_deref()),
                ("Brand", d.brand.as_deref()),
                ("Model", d.model.as_deref()),
                ("Serial no.", d.serial.as_deref()),
                ("Max (t)", d.max_t.as_deref()),
                ("e (kg)", d.e_kg.as_deref()),
                ("Calibration valid until", d.calibration_expiry.as_deref()),
                ("Calibration cert. no.", d.calibration_cert.as_deref()),
                ("Inspection date", d.inspection_date.as_deref()),
                ("Inspection cert. no.", d.inspection_cert.as_deref()),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// EquipmentRecord – one row of either dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentRecord {
    /// Administrative region, matched exactly against the region filter.
    pub region: String,
    /// `None` when the source row had missing or invalid coordinates.
    pub position: Option<Coordinates>,
    /// Raw inspection result, un-normalised.
    pub compliance_flag: Option<String>,
    pub details: RecordDetails,
}

impl EquipmentRecord {
    pub fn category(&self) -> Category {
        self.details.category()
    }

    pub fn compliance(&self) -> ComplianceState {
        ComplianceState::classify(self.compliance_flag.as_deref())
    }

    /// Description panel rows with `placeholder` substituted for absent values.
    pub fn describe(&self, placeholder: &str) -> Vec<(&'static str, String)> {
        let mut rows: Vec<(&'static str, String)> = self
            .details
            .fields()
            .into_iter()
            .map(|(label, value)| (label, value.unwrap_or(placeholder).to_string()))
            .collect();
        rows.push((
            "Inspection passed",
            self.compliance_flag
                .as_deref()
                .unwrap_or(placeholder)
                .to_string(),
        ));
        rows
    }

    pub fn headline_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.details.headline().unwrap_or(placeholder)
    }
}

/// One source row as it appears in the published files. The shared columns
/// are read here, the rest goes to the category-specific details.
#[derive(Debug, Deserialize)]
pub(crate) struct RawRecord<D> {
    #[serde(rename = "縣市", default, deserialize_with = "lenient_text")]
    region: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    longitude: Option<f64>,
    #[serde(rename = "檢查合格與否", default, deserialize_with = "lenient_text")]
    compliance_flag: Option<String>,
    #[serde(flatten)]
    details: D,
}

impl<D: Into<RecordDetails>> RawRecord<D> {
    /// Rows without a region cannot be filtered and are dropped.
    pub(crate) fn into_record(self) -> Option<EquipmentRecord> {
        let region = self.region?.trim().to_string();
        let position = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon),
            _ => None,
        };
        Some(EquipmentRecord {
            region,
            position,
            compliance_flag: self.compliance_flag,
            details: self.details.into(),
        })
    }
}

// ---------------------------------------------------------------------------
// RecordStore – both loaded datasets
// ---------------------------------------------------------------------------

/// Both datasets, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    scales: Vec<EquipmentRecord>,
    weighbridges: Vec<EquipmentRecord>,
    /// Every region present across both datasets, sorted.
    regions: BTreeSet<String>,
}

impl RecordStore {
    pub fn new(scales: Vec<EquipmentRecord>, weighbridges: Vec<EquipmentRecord>) -> Self {
        let regions = scales
            .iter()
            .chain(weighbridges.iter())
            .map(|r| r.region.clone())
            .collect();
        RecordStore {
            scales,
            weighbridges,
            regions,
        }
    }

    pub fn records(&self, category: Category) -> &[EquipmentRecord] {
        match category {
            Category::Scale => &self.scales,
            Category::Weighbridge => &self.weighbridges,
        }
    }

    pub fn regions(&self) -> &BTreeSet<String> {
        &self.regions
    }

    /// Replace one category's records, keeping the other.
    pub fn with_records(&self, category: Category, records: Vec<EquipmentRecord>) -> Self {
        match category {
            Category::Scale => RecordStore::new(records, self.weighbridges.clone()),
            Category::Weighbridge => RecordStore::new(self.scales.clone(), records),
        }
    }

    /// Total number of records across both datasets.
    pub fn len(&self) -> usize {
        self.scales.len() + self.weighbridges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scale_row(value: serde_json::Value) -> Option<EquipmentRecord> {
        serde_json::from_value::<RawRecord<ScaleDetails>>(value)
            .unwrap()
            .into_record()
    }

    #[test]
    fn flag_is_normalized_before_comparison() {
        assert_eq!(ComplianceState::classify(Some("N")), ComplianceState::Failing);
        assert_eq!(ComplianceState::classify(Some(" n ")), ComplianceState::Failing);
        assert_eq!(ComplianceState::classify(Some("Y")), ComplianceState::Passing);
        assert_eq!(ComplianceState::classify(Some("no")), ComplianceState::Passing);
        assert_eq!(ComplianceState::classify(None), ComplianceState::Passing);
    }

    #[test]
    fn coordinates_reject_out_of_range() {
        assert!(Coordinates::new(25.03, 121.5).is_some());
        assert!(Coordinates::new(91.0, 121.5).is_none());
        assert!(Coordinates::new(25.0, f64::NAN).is_none());
    }

    #[test]
    fn parses_mixed_value_types() {
        let rec = scale_row(json!({
            "縣市": "臺北市",
            "latitude": "25.0478",
            "longitude": 121.517,
            "檢查合格與否": "Y",
            "店名": "阿明雜貨",
            "Max_kg": 30,
            "e_g": 5.5,
            "型式": null,
            "廠牌": "  "
        }))
        .unwrap();

        assert_eq!(rec.region, "臺北市");
        assert_eq!(rec.category(), Category::Scale);
        assert_eq!(
            rec.position,
            Some(Coordinates {
                latitude: 25.0478,
                longitude: 121.517
            })
        );
        let RecordDetails::Scale(d) = &rec.details else {
            panic!("expected scale details");
        };
        assert_eq!(d.max_kg.as_deref(), Some("30"));
        assert_eq!(d.e_g.as_deref(), Some("5.5"));
        assert_eq!(d.model, None);
        assert_eq!(d.brand, None);
    }

    #[test]
    fn invalid_coordinates_leave_position_empty() {
        let rec = scale_row(json!({"縣市": "臺北市", "latitude": "n/a", "longitude": 121.5})).unwrap();
        assert_eq!(rec.position, None);

        let rec = scale_row(json!({"縣市": "臺北市", "longitude": 121.5})).unwrap();
        assert_eq!(rec.position, None);
    }

    #[test]
    fn row_without_region_is_dropped() {
        assert!(scale_row(json!({"latitude": 25.0, "longitude": 121.5})).is_none());
    }

    #[test]
    fn describe_uses_placeholder_for_absent_fields() {
        let rec = EquipmentRecord {
            region: "新竹市".into(),
            position: None,
            compliance_flag: None,
            details: WeighbridgeDetails {
                owner: Some("大同砂石".into()),
                max_t: Some("60".into()),
                ..Default::default()
            }
            .into(),
        };

        let rows = rec.describe("無");
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[0], ("Address", "無".to_string()));
        assert!(rows.contains(&("Max (t)", "60".to_string())));
        assert_eq!(rows.last().unwrap(), &("Inspection passed", "無".to_string()));
        assert_eq!(rec.headline_or("無"), "大同砂石");
    }

    #[test]
    fn store_collects_regions_across_categories() {
        let rec = |region: &str, details: RecordDetails| EquipmentRecord {
            region: region.into(),
            position: None,
            compliance_flag: None,
            details,
        };
        let store = RecordStore::new(
            vec![rec("臺北市", ScaleDetails::default().into())],
            vec![
                rec("桃園市", WeighbridgeDetails::default().into()),
                rec("臺北市", WeighbridgeDetails::default().into()),
            ],
        );
        let regions: Vec<&str> = store.regions().iter().map(String::as_str).collect();
        assert_eq!(regions, vec!["桃園市", "臺北市"]);
        assert_eq!(store.len(), 3);
    }
}
