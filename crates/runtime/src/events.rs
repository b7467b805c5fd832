use foundation::time::TimeIndex;

/// Which displayed image an `Activate` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateTarget {
    SingleView,
    /// 0-based comparison column.
    Column(usize),
}

/// Named input events consumed by the viewer session.
///
/// Any UI toolkit can produce these; the session never sees raw toolkit
/// events.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    RunChanged(String),
    ConversionChanged(String),
    VariableChanged(String),
    ElevationChanged(String),
    TimeChanged(TimeIndex),
    /// Requested number of comparison columns. Values below 1 mean 1.
    GridSizeChanged(usize),
    ColumnRunChanged {
        column: usize,
        run: String,
    },
    /// Pointer position in surface pixels.
    PointerDown {
        x: f64,
        y: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp,
    PointerLeave,
    /// Vertical wheel delta; only its sign is used.
    Wheel {
        delta_y: f64,
    },
    Activate(ActivateTarget),
    BackdropClicked,
    CloseRequested,
}

impl ViewerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ViewerEvent::RunChanged(_) => "run_changed",
            ViewerEvent::ConversionChanged(_) => "conversion_changed",
            ViewerEvent::VariableChanged(_) => "variable_changed",
            ViewerEvent::ElevationChanged(_) => "elevation_changed",
            ViewerEvent::TimeChanged(_) => "time_changed",
            ViewerEvent::GridSizeChanged(_) => "grid_size_changed",
            ViewerEvent::ColumnRunChanged { .. } => "column_run_changed",
            ViewerEvent::PointerDown { .. } => "pointer_down",
            ViewerEvent::PointerMove { .. } => "pointer_move",
            ViewerEvent::PointerUp => "pointer_up",
            ViewerEvent::PointerLeave => "pointer_leave",
            ViewerEvent::Wheel { .. } => "wheel",
            ViewerEvent::Activate(_) => "activate",
            ViewerEvent::BackdropClicked => "backdrop_clicked",
            ViewerEvent::CloseRequested => "close_requested",
        }
    }

    /// True for events that only touch the zoom/pan viewer.
    pub fn is_viewer_input(&self) -> bool {
        matches!(
            self,
            ViewerEvent::PointerDown { .. }
                | ViewerEvent::PointerMove { .. }
                | ViewerEvent::PointerUp
                | ViewerEvent::PointerLeave
                | ViewerEvent::Wheel { .. }
                | ViewerEvent::BackdropClicked
                | ViewerEvent::CloseRequested
        )
    }
}
