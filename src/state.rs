use std::path::Path;
use std::sync::mpsc::Receiver;

use crate::config::Config;
use crate::data::filter::{CategorySelection, DefaultRegionPolicy, FilterState, ViewResult, compute_view};
use crate::data::loader::{self, LoadOutcome};
use crate::data::model::{Category, EquipmentRecord, RecordStore};

// ---------------------------------------------------------------------------
// Layer visibility
// ---------------------------------------------------------------------------

/// Overlay toggles. Hiding a layer does not change the counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerVisibility {
    pub scales: bool,
    pub weighbridges: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            scales: true,
            weighbridges: true,
        }
    }
}

impl LayerVisibility {
    pub fn shows(&self, category: Category) -> bool {
        match category {
            Category::Scale => self.scales,
            Category::Weighbridge => self.weighbridges,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded datasets (None until both loads have finished).
    pub store: Option<RecordStore>,

    /// Selection being edited in the filter controls.
    pub pending: FilterState,

    /// Selection the current view was computed from.
    pub applied: FilterState,

    pub policy: DefaultRegionPolicy,

    /// Result of the last filter pass.
    pub view: ViewResult,

    pub layers: LayerVisibility,

    /// Index into `view.visible_markers` of the marker whose description is open.
    pub selected_marker: Option<usize>,

    /// Text shown for absent record attributes.
    pub placeholder: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Pending background load of both datasets.
    pub loading: Option<Receiver<LoadOutcome>>,

    /// Set when the map should re-fit to the markers on the next frame.
    pub fit_pending: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            store: None,
            pending: FilterState::default(),
            applied: FilterState::default(),
            policy: DefaultRegionPolicy::default(),
            view: ViewResult::default(),
            layers: LayerVisibility::default(),
            selected_marker: None,
            placeholder: String::new(),
            status_message: None,
            loading: None,
            fit_pending: false,
        }
    }
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: config.default_region_policy.clone(),
            placeholder: config.placeholder.clone(),
            ..Self::default()
        }
    }

    /// Start loading both datasets in the background.
    pub fn start_loading(&mut self, scale_path: &Path, weighbridge_path: &Path) {
        self.loading = Some(loader::spawn_load(
            scale_path.to_path_buf(),
            weighbridge_path.to_path_buf(),
        ));
    }

    /// Check whether the background load finished. Returns `true` once it has.
    pub fn poll_loading(&mut self) -> bool {
        let Some(rx) = &self.loading else {
            return false;
        };
        match rx.try_recv() {
            Ok(outcome) => {
                self.loading = None;
                self.status_message = if outcome.errors.is_empty() {
                    None
                } else {
                    Some(format!("Error: {}", outcome.errors.join("; ")))
                };
                self.set_store(outcome.store);
                true
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => false,
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                log::error!("Dataset loader stopped without a result");
                self.loading = None;
                self.status_message = Some("Error: dataset loader stopped".to_string());
                self.set_store(RecordStore::default());
                true
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// Ingest newly loaded datasets and compute the initial view.
    pub fn set_store(&mut self, store: RecordStore) {
        // Drop selected regions that no longer exist.
        self.pending.regions.retain(|r| store.regions().contains(r));
        log::info!(
            "{} records across {} regions",
            store.len(),
            store.regions().len()
        );
        self.store = Some(store);
        self.apply_filter();
    }

    /// Replace one category's dataset after the user opened a new file.
    pub fn replace_records(&mut self, category: Category, records: Vec<EquipmentRecord>) {
        let store = match &self.store {
            Some(store) => store.with_records(category, records),
            None => RecordStore::default().with_records(category, records),
        };
        self.set_store(store);
    }

    /// Sample the pending selection and recompute the view from scratch.
    pub fn apply_filter(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        self.applied = self.pending.clone();
        self.view = compute_view(store, &self.applied, &self.policy);
        self.selected_marker = None;
        self.fit_pending = true;

        if self.view.skipped_without_position > 0 {
            log::debug!(
                "{} matching records skipped for missing coordinates",
                self.view.skipped_without_position
            );
        }
        log::debug!(
            "filter applied: {} scales, {} weighbridges",
            self.view.counts.scale_count,
            self.view.counts.weighbridge_count
        );
    }

    /// Toggle a region in the pending selection.
    pub fn toggle_region(&mut self, region: &str) {
        if !self.pending.regions.remove(region) {
            self.pending.regions.insert(region.to_string());
        }
    }

    /// Select every known region.
    pub fn select_all_regions(&mut self) {
        if let Some(store) = &self.store {
            self.pending.regions = store.regions().clone();
        }
    }

    /// Clear the region selection, falling back to the default policy.
    pub fn clear_regions(&mut self) {
        self.pending.regions.clear();
    }

    pub fn set_category(&mut self, category: CategorySelection) {
        self.pending.category = category;
    }

    /// Source record of a visible marker.
    pub fn marker_record(&self, marker: usize) -> Option<&EquipmentRecord> {
        let m = self.view.visible_markers.get(marker)?;
        self.store.as_ref()?.records(m.category).get(m.index)
    }
}
