use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{Category, ComplianceState, Coordinates, RecordDetails, RecordStore};

// ---------------------------------------------------------------------------
// Filter inputs
// ---------------------------------------------------------------------------

/// Which categories the user wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySelection {
    #[default]
    All,
    ScaleOnly,
    WeighbridgeOnly,
}

impl CategorySelection {
    pub const ALL: [CategorySelection; 3] = [
        CategorySelection::All,
        CategorySelection::ScaleOnly,
        CategorySelection::WeighbridgeOnly,
    ];

    pub fn includes(self, category: Category) -> bool {
        match self {
            CategorySelection::All => true,
            CategorySelection::ScaleOnly => category == Category::Scale,
            CategorySelection::WeighbridgeOnly => category == Category::Weighbridge,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategorySelection::All => "All",
            CategorySelection::ScaleOnly => "Market scales",
            CategorySelection::WeighbridgeOnly => "Weighbridges",
        }
    }
}

/// What an empty region selection means.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", content = "regions", rename_all = "snake_case")]
pub enum DefaultRegionPolicy {
    /// Every region present across both datasets.
    #[default]
    AllRegions,
    /// A preset list of regions.
    FixedList(Vec<String>),
}

/// User selection as sampled from the filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub regions: BTreeSet<String>,
    pub category: CategorySelection,
}

/// Region set a filter pass actually matches against.
///
/// User-supplied names are trimmed, as record regions are at load.
pub fn resolve_regions<'a>(
    store: &'a RecordStore,
    selected: &'a BTreeSet<String>,
    policy: &'a DefaultRegionPolicy,
) -> BTreeSet<&'a str> {
    if !selected.is_empty() {
        return selected.iter().map(|r| r.trim()).collect();
    }
    match policy {
        DefaultRegionPolicy::AllRegions => store.regions().iter().map(String::as_str).collect(),
        DefaultRegionPolicy::FixedList(names) => names.iter().map(|r| r.trim()).collect(),
    }
}

// ---------------------------------------------------------------------------
// Filter outputs
// ---------------------------------------------------------------------------

/// Visual class of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkerClass {
    Fail,
    ScalePass,
    WeighbridgePass,
}

impl MarkerClass {
    pub fn for_record(category: Category, compliance: ComplianceState) -> Self {
        match (compliance, category) {
            (ComplianceState::Failing, _) => MarkerClass::Fail,
            (ComplianceState::Passing, Category::Scale) => MarkerClass::ScalePass,
            (ComplianceState::Passing, Category::Weighbridge) => MarkerClass::WeighbridgePass,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibleMarker {
    pub position: Coordinates,
    pub category: Category,
    pub compliance: ComplianceState,
    pub marker: MarkerClass,
    /// Index of the source record within its category's dataset.
    pub index: usize,
    pub details: RecordDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewCounts {
    pub scale_count: usize,
    pub weighbridge_count: usize,
}

impl ViewCounts {
    pub fn total(&self) -> usize {
        self.scale_count + self.weighbridge_count
    }

    /// Two-line summary for the count display.
    pub fn summary_lines(&self) -> [String; 2] {
        [
            format!("Market scales: {}", self.scale_count),
            format!("Weighbridges: {}", self.weighbridge_count),
        ]
    }
}

/// Result of one filter pass. Discarded wholesale on the next pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewResult {
    /// Scale markers first, then weighbridges, each in dataset order.
    pub visible_markers: Vec<VisibleMarker>,
    pub counts: ViewCounts,
    /// In-scope records left out because they have no usable position.
    pub skipped_without_position: usize,
}

impl ViewResult {
    pub fn failing_count(&self, category: Category) -> usize {
        self.visible_markers
            .iter()
            .filter(|m| m.category == category && m.compliance == ComplianceState::Failing)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Filter pass
// ---------------------------------------------------------------------------

/// Compute the visible, classified and counted subset of both datasets.
///
/// Pure: the result depends only on the arguments, and counts are derived
/// from the emitted markers of this pass alone.
pub fn compute_view(
    store: &RecordStore,
    filter: &FilterState,
    policy: &DefaultRegionPolicy,
) -> ViewResult {
    let regions = resolve_regions(store, &filter.regions, policy);
    let mut view = ViewResult::default();

    for category in Category::ALL {
        if !filter.category.includes(category) {
            continue;
        }
        for (index, record) in store.records(category).iter().enumerate() {
            if !regions.contains(record.region.as_str()) {
                continue;
            }
            let Some(position) = record.position else {
                view.skipped_without_position += 1;
                continue;
            };
            let compliance = record.compliance();
            view.visible_markers.push(VisibleMarker {
                position,
                category,
                compliance,
                marker: MarkerClass::for_record(category, compliance),
                index,
                details: record.details.clone(),
            });
        }
    }

    for m in &view.visible_markers {
        match m.category {
            Category::Scale => view.counts.scale_count += 1,
            Category::Weighbridge => view.counts.weighbridge_count += 1,
        }
    }
    view
}
