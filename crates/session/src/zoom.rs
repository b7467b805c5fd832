//! Modal zoom/pan viewer.
//!
//! A two-state machine (`Closed`, `Open`) owning a 2D transform:
//! - wheel ticks change scale by a fixed ±0.1, clamped to [0.2, 5.0]
//! - pointer drag translates the origin
//! - every `open` resets to identity
//!
//! The rendered transform is composed in a fixed order: center the image on
//! its own box, translate by the origin, then scale. Reordering moves the
//! pivot point.

use foundation::bounds::Bounds1;

pub const MIN_SCALE: f64 = 0.2;
pub const MAX_SCALE: f64 = 5.0;
pub const SCALE_BOUNDS: Bounds1 = Bounds1::new(MIN_SCALE, MAX_SCALE);

/// Scale change per wheel tick, independent of the wheel delta magnitude.
pub const WHEEL_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f64,
    /// Translation in surface pixels.
    pub origin: [f64; 2],
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale: 1.0,
        origin: [0.0, 0.0],
    };

    /// CSS `transform` value.
    pub fn css(&self) -> String {
        format!(
            "translate(-50%, -50%) translate({}px, {}px) scale({})",
            self.origin[0], self.origin[1], self.scale
        )
    }
}

/// Drag anchor only exists while a drag is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Pointer position minus origin at pointer-down.
    Dragging { anchor: [f64; 2] },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewerState {
    #[default]
    Closed,
    Open {
        image_ref: String,
        transform: ViewTransform,
        drag: DragState,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ZoomPanViewer {
    state: ViewerState,
}

impl ZoomPanViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ViewerState::Open { .. })
    }

    pub fn image_ref(&self) -> Option<&str> {
        match &self.state {
            ViewerState::Open { image_ref, .. } => Some(image_ref),
            ViewerState::Closed => None,
        }
    }

    pub fn transform(&self) -> Option<ViewTransform> {
        match &self.state {
            ViewerState::Open { transform, .. } => Some(*transform),
            ViewerState::Closed => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(
            self.state,
            ViewerState::Open {
                drag: DragState::Dragging { .. },
                ..
            }
        )
    }

    /// Opens (or re-opens) on `image_ref` with an identity transform.
    pub fn open(&mut self, image_ref: impl Into<String>) {
        self.state = ViewerState::Open {
            image_ref: image_ref.into(),
            transform: ViewTransform::IDENTITY,
            drag: DragState::Idle,
        };
    }

    pub fn close(&mut self) {
        self.state = ViewerState::Closed;
    }

    /// Click outside the image.
    pub fn on_backdrop_click(&mut self) {
        self.close();
    }

    /// One wheel tick. Only the sign of `delta_y` matters; zero (or NaN)
    /// changes nothing.
    pub fn on_wheel(&mut self, delta_y: f64) {
        let ViewerState::Open { transform, .. } = &mut self.state else {
            return;
        };
        let direction = if delta_y < 0.0 {
            1.0
        } else if delta_y > 0.0 {
            -1.0
        } else {
            return;
        };
        transform.scale = SCALE_BOUNDS.clamp(transform.scale + direction * WHEEL_STEP);
    }

    pub fn on_pointer_down(&mut self, pos_px: [f64; 2]) {
        let ViewerState::Open {
            transform, drag, ..
        } = &mut self.state
        else {
            return;
        };
        *drag = DragState::Dragging {
            anchor: [
                pos_px[0] - transform.origin[0],
                pos_px[1] - transform.origin[1],
            ],
        };
    }

    pub fn on_pointer_move(&mut self, pos_px: [f64; 2]) {
        let ViewerState::Open {
            transform,
            drag: DragState::Dragging { anchor },
            ..
        } = &mut self.state
        else {
            return;
        };
        transform.origin = [pos_px[0] - anchor[0], pos_px[1] - anchor[1]];
    }

    /// Ends any drag. Also used for pointer-leave.
    pub fn on_pointer_up(&mut self) {
        if let ViewerState::Open { drag, .. } = &mut self.state {
            *drag = DragState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_viewer() -> ZoomPanViewer {
        let mut v = ZoomPanViewer::new();
        v.open("a.png");
        v
    }

    fn scale(v: &ZoomPanViewer) -> f64 {
        v.transform().expect("open").scale
    }

    #[test]
    fn wheel_ticks_are_fixed_steps() {
        let mut v = open_viewer();
        v.on_wheel(-120.0);
        assert!((scale(&v) - 1.1).abs() < 1e-9);
        v.on_wheel(-0.01);
        assert!((scale(&v) - 1.2).abs() < 1e-9);
        v.on_wheel(500.0);
        assert!((scale(&v) - 1.1).abs() < 1e-9);
        v.on_wheel(0.0);
        assert!((scale(&v) - 1.1).abs() < 1e-9);
    }

    #[test]
    fn scale_stays_clamped_for_any_wheel_sequence() {
        let mut v = open_viewer();
        let deltas = [-1.0, -3.0, 2.0, -100.0, 7.0, 0.5, -0.5];
        for i in 0..400 {
            let before = scale(&v);
            let d = match i {
                0..100 => -1.0,
                100..250 => 1.0,
                _ => deltas[i % deltas.len()],
            };
            v.on_wheel(d);
            let after = scale(&v);
            assert!(SCALE_BOUNDS.contains(after), "scale {after} escaped bounds");
            let expected = SCALE_BOUNDS.clamp(before - d.signum() * WHEEL_STEP);
            assert!((after - expected).abs() < 1e-9);
        }
        for _ in 0..100 {
            v.on_wheel(-1.0);
        }
        assert_eq!(scale(&v), MAX_SCALE);
        for _ in 0..100 {
            v.on_wheel(1.0);
        }
        assert_eq!(scale(&v), MIN_SCALE);
    }

    #[test]
    fn drag_moves_origin_by_pointer_delta() {
        let mut v = open_viewer();
        v.on_pointer_down([100.0, 50.0]);
        assert!(v.is_dragging());
        v.on_pointer_move([130.0, 40.0]);
        assert_eq!(v.transform().expect("open").origin, [30.0, -10.0]);
        v.on_pointer_up();
        assert!(!v.is_dragging());

        // Moves without a drag are ignored.
        v.on_pointer_move([500.0, 500.0]);
        assert_eq!(v.transform().expect("open").origin, [30.0, -10.0]);

        // A second drag continues from the current origin.
        v.on_pointer_down([0.0, 0.0]);
        v.on_pointer_move([5.0, 5.0]);
        assert_eq!(v.transform().expect("open").origin, [35.0, -5.0]);
    }

    #[test]
    fn open_always_resets_transform() {
        let mut v = open_viewer();
        v.on_wheel(-1.0);
        v.on_pointer_down([10.0, 10.0]);
        v.on_pointer_move([60.0, 90.0]);

        v.open("b.png");
        assert_eq!(v.image_ref(), Some("b.png"));
        assert_eq!(v.transform(), Some(ViewTransform::IDENTITY));
        assert!(!v.is_dragging());

        v.close();
        v.open("c.png");
        assert_eq!(v.transform(), Some(ViewTransform::IDENTITY));
    }

    #[test]
    fn closed_viewer_ignores_input() {
        let mut v = ZoomPanViewer::new();
        v.on_wheel(-1.0);
        v.on_pointer_down([1.0, 1.0]);
        v.on_pointer_move([2.0, 2.0]);
        assert_eq!(v.state(), &ViewerState::Closed);

        let mut v = open_viewer();
        v.on_backdrop_click();
        assert!(!v.is_open());
        assert_eq!(v.image_ref(), None);
    }

    #[test]
    fn css_lists_transforms_in_fixed_order() {
        let t = ViewTransform {
            scale: 1.5,
            origin: [12.0, -4.0],
        };
        assert_eq!(
            t.css(),
            "translate(-50%, -50%) translate(12px, -4px) scale(1.5)"
        );
        assert_eq!(
            ViewTransform::IDENTITY.css(),
            "translate(-50%, -50%) translate(0px, 0px) scale(1)"
        );
    }
}
