use std::sync::Arc;

use formats::ManifestIndex;
use runtime::{ActivateTarget, EventBus, ViewerEvent};
use tracing::debug;

use crate::comparison::{ComparisonColumn, ComparisonGrid, render_column};
use crate::selection::SelectionState;
use crate::single_view::{SingleView, render_single_view};
use crate::zoom::ZoomPanViewer;

/// What the modal viewer should show.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerView {
    pub image_ref: Option<String>,
    pub transform_css: Option<String>,
    pub dragging: bool,
}

/// Everything a display surface needs, derived from session state alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub run: String,
    pub conversion: String,
    pub variable: String,
    pub elevation: Option<String>,
    pub elevation_options: Vec<String>,
    /// 1-based slider position.
    pub time_step: usize,
    /// Upper slider bound, at least 1.
    pub max_time_steps: usize,
    pub time_label: String,
    pub single: SingleView,
    pub column_runs: Vec<String>,
    pub columns: Vec<ComparisonColumn>,
    pub viewer: ViewerView,
}

/// One browsing session: the selection, the comparison grid and the modal
/// viewer over a shared read-only manifest index.
///
/// All mutation goes through [`Session::dispatch`], one event at a time.
#[derive(Debug, Clone)]
pub struct Session {
    index: Arc<ManifestIndex>,
    selection: SelectionState,
    grid: ComparisonGrid,
    viewer: ZoomPanViewer,
}

impl Session {
    pub fn new(index: Arc<ManifestIndex>) -> Self {
        Self::with_grid_size(index, 1)
    }

    pub fn with_grid_size(index: Arc<ManifestIndex>, columns: usize) -> Self {
        let selection = SelectionState::initial(&index);
        let grid = ComparisonGrid::new(&index, columns);
        Self {
            index,
            selection,
            grid,
            viewer: ZoomPanViewer::new(),
        }
    }

    pub fn index(&self) -> &ManifestIndex {
        &self.index
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn grid(&self) -> &ComparisonGrid {
        &self.grid
    }

    pub fn viewer(&self) -> &ZoomPanViewer {
        &self.viewer
    }

    pub fn dispatch(&mut self, event: &ViewerEvent) {
        debug!(kind = event.kind(), "session event");
        let index = &*self.index;

        match event {
            ViewerEvent::RunChanged(run) => self.selection.set_run(index, run.as_str()),
            ViewerEvent::ConversionChanged(conversion) => {
                self.selection.set_conversion(index, conversion.as_str())
            }
            ViewerEvent::VariableChanged(variable) => {
                self.selection.set_variable(index, variable.as_str())
            }
            ViewerEvent::ElevationChanged(elevation) => {
                self.selection.set_elevation(elevation.as_str())
            }
            ViewerEvent::TimeChanged(time_index) => self.selection.set_time_index(*time_index),
            ViewerEvent::GridSizeChanged(columns) => self.grid.resize(index, *columns),
            ViewerEvent::ColumnRunChanged { column, run } => {
                if !self.grid.set_column_run(*column, run.as_str()) {
                    debug!(column, "ignoring run change for missing column");
                }
            }
            ViewerEvent::PointerDown { x, y } => self.viewer.on_pointer_down([*x, *y]),
            ViewerEvent::PointerMove { x, y } => self.viewer.on_pointer_move([*x, *y]),
            ViewerEvent::PointerUp | ViewerEvent::PointerLeave => self.viewer.on_pointer_up(),
            ViewerEvent::Wheel { delta_y } => self.viewer.on_wheel(*delta_y),
            ViewerEvent::Activate(target) => self.activate(*target),
            ViewerEvent::BackdropClicked => self.viewer.on_backdrop_click(),
            ViewerEvent::CloseRequested => self.viewer.close(),
        }
    }

    /// Applies every queued event in order. Returns how many were applied.
    pub fn apply_all(&mut self, bus: &mut EventBus) -> usize {
        let events = bus.drain();
        for queued in &events {
            self.dispatch(&queued.event);
        }
        events.len()
    }

    /// Opens the viewer on a displayed image; unresolved images do nothing.
    fn activate(&mut self, target: ActivateTarget) {
        let image_ref = match target {
            ActivateTarget::SingleView => {
                render_single_view(&self.index, &self.selection).image_ref
            }
            ActivateTarget::Column(column) => self
                .grid
                .run_id(column)
                .and_then(|run| render_column(&self.index, run, &self.selection).image_ref),
        };
        match image_ref {
            Some(image_ref) => self.viewer.open(image_ref),
            None => debug!(?target, "activate ignored: no image"),
        }
    }

    pub fn view_model(&self) -> ViewModel {
        let selection = &self.selection;
        let transform = self.viewer.transform();
        ViewModel {
            run: selection.run.clone(),
            conversion: selection.conversion.clone(),
            variable: selection.variable.clone(),
            elevation: selection.elevation.clone(),
            elevation_options: selection.valid_elevations().to_vec(),
            time_step: selection.time_index.ui_step(),
            max_time_steps: self.index.max_time_steps().max(1),
            time_label: selection.time_label(),
            single: render_single_view(&self.index, selection),
            column_runs: self.grid.run_ids().to_vec(),
            columns: self.grid.render_all(&self.index, selection),
            viewer: ViewerView {
                image_ref: self.viewer.image_ref().map(str::to_string),
                transform_css: transform.map(|t| t.css()),
                dragging: self.viewer.is_dragging(),
            },
        }
    }
}
