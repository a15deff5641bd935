//! Gesture/pointer state machine
//!
//! Interprets pointer events into viewport changes or annotation drafts,
//! dispatching on the active tool. Exactly one draft lives at a time and
//! is owned by the single active gesture; a second concurrent pointer
//! forcibly transitions out of any single-pointer draft into pinch mode
//! instead of merging gesture streams. Only the page the pointer most
//! recently entered is the drawing target, so multi-page documents need no
//! global pointer capture.

use redline_core::{
    anchor_point, Annotation, AnnotationId, AnnotationStore, ArrowLine, CanvasSize, LabelBox,
    NormPoint, NormRect, PixelPoint, Session, Tool,
};

/// Pixel distance a pen stroke must travel before another point is kept
const STROKE_MIN_STEP_PX: f32 = 1.5;

/// Pointer button relevant to gesture dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// One pointer event as delivered by the host
#[derive(Debug, Clone, Copy)]
pub struct PointerInput {
    pub pointer_id: u64,
    /// 1-based page under the pointer
    pub page: u16,
    /// Position in the page canvas's pixel space
    pub position: PixelPoint,
    pub button: PointerButton,
    /// Whether the pointer sits on the scroll background rather than page
    /// content; a primary drag there pans instead of drawing
    pub on_background: bool,
}

/// Gesture machine states; drafting states carry the in-progress shape
#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    /// Pen tool accumulating stroke points
    Drawing { page: u16, points: Vec<NormPoint>, last_px: PixelPoint },
    /// Text/rectangle tool two-corner drag
    DraftingBox { page: u16, tool: Tool, start: NormPoint, current: NormPoint },
    /// Arrow tool: head fixed at pointer-down, tail follows the pointer
    DraftingArrow { page: u16, head: NormPoint, tail: NormPoint },
    Panning { last: PixelPoint },
    Pinching,
}

/// What the host should do in response to a pointer event
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEffect {
    None,
    /// The draft changed; redraw the active page
    Redraw,
    /// Pointer pan delta; apply via `ViewportController::pan_by`
    Pan { dx: f32, dy: f32 },
    /// Two pointers down; feed `ViewportController::begin_pinch`
    PinchBegan { distance: f32 },
    /// Pinch finger distance changed; feed `ViewportController::pinch_zoom`
    PinchMoved { distance: f32 },
    /// A pinch pointer lifted; feed `ViewportController::end_pinch`
    PinchEnded,
    /// A draft was committed into the store
    Committed { page: u16, id: Option<AnnotationId> },
}

/// Per-viewer gesture dispatcher
#[derive(Debug)]
pub struct GestureMachine {
    state: GestureState,
    session: Session,
    active_page: Option<u16>,
    pointers: Vec<(u64, PixelPoint)>,
}

impl GestureMachine {
    pub fn new(session: Session) -> Self {
        Self { state: GestureState::Idle, session, active_page: None, pointers: Vec::new() }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// The page currently targeted for drawing
    pub fn active_page(&self) -> Option<u16> {
        self.active_page
    }

    /// The pointer entered a page; it becomes the drawing target
    pub fn pointer_entered(&mut self, page: u16) {
        self.active_page = Some(page);
    }

    /// Switch tools; any in-progress draft is discarded
    pub fn set_tool(&mut self, tool: Tool) {
        if !matches!(self.state, GestureState::Idle | GestureState::Panning { .. }) {
            self.state = GestureState::Idle;
        }
        self.session.tool = tool;
    }

    /// Handle pointer-down; `zoom` gates the secondary-button pan trigger
    pub fn pointer_down(
        &mut self,
        input: PointerInput,
        canvas: CanvasSize,
        zoom: f32,
    ) -> GestureEffect {
        if self.pointers.len() >= 2 {
            // Third and later pointers are ignored outright.
            return GestureEffect::None;
        }
        self.pointers.push((input.pointer_id, input.position));

        if self.pointers.len() == 2 {
            // A second finger always wins over any single-pointer draft.
            if !matches!(self.state, GestureState::Idle) {
                log::debug!("second pointer down, discarding {:?} for pinch", self.state);
            }
            self.state = GestureState::Pinching;
            return GestureEffect::PinchBegan { distance: self.pointer_distance() };
        }

        self.active_page = Some(input.page);

        let pans = (input.button == PointerButton::Secondary && zoom > 1.0)
            || (input.button == PointerButton::Primary && input.on_background);
        if pans {
            self.state = GestureState::Panning { last: input.position };
            return GestureEffect::None;
        }

        let point = canvas.to_normalized(input.position);
        self.state = match self.session.tool {
            Tool::Pen => GestureState::Drawing {
                page: input.page,
                points: vec![point],
                last_px: input.position,
            },
            Tool::Text | Tool::Pointer => GestureState::DraftingBox {
                page: input.page,
                tool: self.session.tool,
                start: point,
                current: point,
            },
            Tool::Arrow => {
                GestureState::DraftingArrow { page: input.page, head: point, tail: point }
            }
        };
        GestureEffect::Redraw
    }

    /// Handle pointer-move
    pub fn pointer_move(&mut self, input: PointerInput, canvas: CanvasSize) -> GestureEffect {
        if let Some(tracked) = self.pointers.iter_mut().find(|(id, _)| *id == input.pointer_id) {
            tracked.1 = input.position;
        }

        match &mut self.state {
            GestureState::Pinching => {
                if self.pointers.len() == 2 {
                    GestureEffect::PinchMoved { distance: self.pointer_distance() }
                } else {
                    GestureEffect::None
                }
            }
            GestureState::Panning { last } => {
                let dx = input.position.x - last.x;
                let dy = input.position.y - last.y;
                *last = input.position;
                GestureEffect::Pan { dx, dy }
            }
            GestureState::Drawing { points, last_px, .. } => {
                if input.position.distance_to(last_px) > STROKE_MIN_STEP_PX {
                    points.push(canvas.to_normalized(input.position));
                    *last_px = input.position;
                    GestureEffect::Redraw
                } else {
                    GestureEffect::None
                }
            }
            GestureState::DraftingBox { current, .. } => {
                *current = canvas.to_normalized(input.position);
                GestureEffect::Redraw
            }
            GestureState::DraftingArrow { tail, .. } => {
                *tail = canvas.to_normalized(input.position);
                GestureEffect::Redraw
            }
            GestureState::Idle => GestureEffect::None,
        }
    }

    /// Handle pointer-up: commit the draft into the store and return to Idle
    pub fn pointer_up(
        &mut self,
        store: &mut AnnotationStore,
        input: PointerInput,
        canvas: CanvasSize,
    ) -> GestureEffect {
        let was_tracked = self.pointers.iter().any(|(id, _)| *id == input.pointer_id);
        self.pointers.retain(|(id, _)| *id != input.pointer_id);
        if !was_tracked && matches!(self.state, GestureState::Pinching) {
            // Release of a previously ignored third pointer.
            return GestureEffect::None;
        }

        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        match state {
            GestureState::Pinching => GestureEffect::PinchEnded,
            GestureState::Panning { .. } | GestureState::Idle => GestureEffect::None,
            GestureState::Drawing { page, points, .. } => {
                if points.is_empty() {
                    return GestureEffect::None;
                }
                store.commit(
                    page,
                    Annotation::Stroke {
                        points,
                        color: self.session.stroke_color,
                        width: self.session.stroke_width,
                    },
                );
                GestureEffect::Committed { page, id: None }
            }
            GestureState::DraftingBox { page, tool, start, current } => {
                let end = if canvas.is_valid() { canvas.to_normalized(input.position) } else { current };
                let bounds = NormRect::from_corners(start, end)
                    .with_min_size(self.session.config.min_box_size);
                let id = AnnotationId::new_v4();

                let annotation = match tool {
                    Tool::Text => Annotation::Text {
                        id,
                        bounds,
                        html: String::new(),
                        text: String::new(),
                        color: self.session.text_color,
                        font_size: self.session.font_size,
                        pointer_id: None,
                    },
                    _ => Annotation::Rectangle {
                        id,
                        bounds,
                        color: self.session.box_color,
                        width: self.session.stroke_width,
                        title: String::new(),
                        description: None,
                        snapshot_data_url: None,
                        insight_id: None,
                    },
                };
                store.commit(page, annotation);
                GestureEffect::Committed { page, id: Some(id) }
            }
            GestureState::DraftingArrow { page, head, .. } => {
                let tail = canvas.to_normalized(input.position);
                let (label_w, label_h) = self.session.config.arrow_label_size;
                let bounds = NormRect::centered_at(tail, label_w, label_h);
                let id = AnnotationId::new_v4();

                store.commit(
                    page,
                    Annotation::Arrow {
                        id,
                        line: ArrowLine { start: anchor_point(&bounds, head), end: head },
                        label: LabelBox {
                            bounds,
                            html: String::new(),
                            text: String::new(),
                            color: self.session.text_color,
                            font_size: self.session.font_size,
                        },
                    },
                );
                GestureEffect::Committed { page, id: Some(id) }
            }
        }
    }

    /// Handle pointer-cancel: discard any draft without committing
    pub fn pointer_cancel(&mut self, pointer_id: u64) -> GestureEffect {
        let was_tracked = self.pointers.iter().any(|(id, _)| *id == pointer_id);
        self.pointers.retain(|(id, _)| *id != pointer_id);
        if !was_tracked && matches!(self.state, GestureState::Pinching) {
            return GestureEffect::None;
        }
        let was_pinching = matches!(self.state, GestureState::Pinching);
        self.state = GestureState::Idle;
        if was_pinching {
            GestureEffect::PinchEnded
        } else {
            GestureEffect::Redraw
        }
    }

    fn pointer_distance(&self) -> f32 {
        match self.pointers.as_slice() {
            [(_, a), (_, b)] => a.distance_to(b),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> GestureMachine {
        GestureMachine::new(Session::default())
    }

    fn canvas() -> CanvasSize {
        CanvasSize::new(1000.0, 800.0)
    }

    fn primary(pointer_id: u64, page: u16, x: f32, y: f32) -> PointerInput {
        PointerInput {
            pointer_id,
            page,
            position: PixelPoint::new(x, y),
            button: PointerButton::Primary,
            on_background: false,
        }
    }

    #[test]
    fn pen_drag_commits_a_stroke() {
        let mut gestures = machine();
        let mut store = AnnotationStore::default();

        gestures.pointer_down(primary(1, 1, 100.0, 100.0), canvas(), 1.0);
        gestures.pointer_move(primary(1, 1, 150.0, 120.0), canvas());
        gestures.pointer_move(primary(1, 1, 200.0, 160.0), canvas());
        let effect = gestures.pointer_up(&mut store, primary(1, 1, 200.0, 160.0), canvas());

        assert_eq!(effect, GestureEffect::Committed { page: 1, id: None });
        assert_eq!(*gestures.state(), GestureState::Idle);
        match &store.annotations(1)[0] {
            Annotation::Stroke { points, .. } => assert_eq!(points.len(), 3),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn pen_ignores_sub_pixel_jitter() {
        let mut gestures = machine();
        gestures.pointer_down(primary(1, 1, 100.0, 100.0), canvas(), 1.0);
        let effect = gestures.pointer_move(primary(1, 1, 100.5, 100.5), canvas());

        assert_eq!(effect, GestureEffect::None);
        match gestures.state() {
            GestureState::Drawing { points, .. } => assert_eq!(points.len(), 1),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn zero_drag_click_commits_minimum_size_box() {
        let mut gestures = machine();
        let mut store = AnnotationStore::default();
        gestures.session_mut().tool = Tool::Pointer;

        gestures.pointer_down(primary(1, 1, 400.0, 300.0), canvas(), 1.0);
        let effect = gestures.pointer_up(&mut store, primary(1, 1, 400.0, 300.0), canvas());

        assert!(matches!(effect, GestureEffect::Committed { page: 1, id: Some(_) }));
        match &store.annotations(1)[0] {
            Annotation::Rectangle { bounds, .. } => {
                let min = gestures.session().config.min_box_size;
                assert!(bounds.w >= min);
                assert!(bounds.h >= min);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn text_tool_commits_a_text_box() {
        let mut gestures = machine();
        let mut store = AnnotationStore::default();
        gestures.session_mut().tool = Tool::Text;

        gestures.pointer_down(primary(1, 1, 100.0, 100.0), canvas(), 1.0);
        gestures.pointer_move(primary(1, 1, 300.0, 200.0), canvas());
        gestures.pointer_up(&mut store, primary(1, 1, 300.0, 200.0), canvas());

        match &store.annotations(1)[0] {
            Annotation::Text { bounds, html, .. } => {
                assert!(html.is_empty());
                assert!((bounds.x - 0.1).abs() < 1e-6);
                assert!((bounds.w - 0.2).abs() < 1e-6);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn arrow_head_fixes_at_pointer_down_and_label_centers_on_tail() {
        let mut gestures = machine();
        let mut store = AnnotationStore::default();
        gestures.session_mut().tool = Tool::Arrow;

        // Head at the right, drag left so the label ends left of the head.
        gestures.pointer_down(primary(1, 1, 800.0, 400.0), canvas(), 1.0);
        gestures.pointer_move(primary(1, 1, 300.0, 400.0), canvas());
        gestures.pointer_up(&mut store, primary(1, 1, 300.0, 400.0), canvas());

        match &store.annotations(1)[0] {
            Annotation::Arrow { line, label, .. } => {
                assert!((line.end.x - 0.8).abs() < 1e-6);
                assert!((line.end.y - 0.5).abs() < 1e-6);
                let center = label.bounds.center();
                assert!((center.x - 0.3).abs() < 1e-3);
                // Head is right of the label, so the line starts on the
                // label's right edge.
                assert!((line.start.x - (label.bounds.x + label.bounds.w)).abs() < 1e-6);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn second_pointer_overrides_draft_with_pinch() {
        let mut gestures = machine();
        gestures.pointer_down(primary(1, 1, 100.0, 100.0), canvas(), 1.0);
        assert!(matches!(gestures.state(), GestureState::Drawing { .. }));

        let effect = gestures.pointer_down(primary(2, 1, 400.0, 100.0), canvas(), 1.0);
        assert_eq!(effect, GestureEffect::PinchBegan { distance: 300.0 });
        assert_eq!(*gestures.state(), GestureState::Pinching);
    }

    #[test]
    fn third_pointer_is_ignored() {
        let mut gestures = machine();
        gestures.pointer_down(primary(1, 1, 100.0, 100.0), canvas(), 1.0);
        gestures.pointer_down(primary(2, 1, 400.0, 100.0), canvas(), 1.0);

        let effect = gestures.pointer_down(primary(3, 1, 200.0, 200.0), canvas(), 1.0);
        assert_eq!(effect, GestureEffect::None);
        assert_eq!(*gestures.state(), GestureState::Pinching);
    }

    #[test]
    fn pinch_move_reports_current_distance() {
        let mut gestures = machine();
        gestures.pointer_down(primary(1, 1, 100.0, 100.0), canvas(), 1.0);
        gestures.pointer_down(primary(2, 1, 400.0, 100.0), canvas(), 1.0);

        let effect = gestures.pointer_move(primary(2, 1, 500.0, 100.0), canvas());
        assert_eq!(effect, GestureEffect::PinchMoved { distance: 400.0 });
    }

    #[test]
    fn lifting_a_pinch_finger_ends_the_gesture_without_commit() {
        let mut gestures = machine();
        let mut store = AnnotationStore::default();
        gestures.pointer_down(primary(1, 1, 100.0, 100.0), canvas(), 1.0);
        gestures.pointer_down(primary(2, 1, 400.0, 100.0), canvas(), 1.0);

        let effect = gestures.pointer_up(&mut store, primary(1, 1, 100.0, 100.0), canvas());
        assert_eq!(effect, GestureEffect::PinchEnded);
        assert_eq!(*gestures.state(), GestureState::Idle);
        assert!(store.annotations(1).is_empty());
    }

    #[test]
    fn secondary_button_pans_only_when_zoomed_in() {
        let mut gestures = machine();
        let input = PointerInput {
            pointer_id: 1,
            page: 1,
            position: PixelPoint::new(100.0, 100.0),
            button: PointerButton::Secondary,
            on_background: false,
        };

        gestures.pointer_down(input, canvas(), 2.0);
        assert!(matches!(gestures.state(), GestureState::Panning { .. }));

        let mut store = AnnotationStore::default();
        gestures.pointer_up(&mut store, input, canvas());

        // At base zoom the same press starts a draft instead.
        gestures.pointer_down(input, canvas(), 1.0);
        assert!(matches!(gestures.state(), GestureState::Drawing { .. }));
    }

    #[test]
    fn primary_drag_on_background_pans() {
        let mut gestures = machine();
        let mut input = primary(1, 1, 100.0, 100.0);
        input.on_background = true;

        gestures.pointer_down(input, canvas(), 1.0);
        let effect = gestures.pointer_move(primary(1, 1, 140.0, 90.0), canvas());
        assert_eq!(effect, GestureEffect::Pan { dx: 40.0, dy: -10.0 });
    }

    #[test]
    fn cancel_discards_the_draft() {
        let mut gestures = machine();
        let mut store = AnnotationStore::default();

        gestures.pointer_down(primary(1, 1, 100.0, 100.0), canvas(), 1.0);
        gestures.pointer_cancel(1);

        assert_eq!(*gestures.state(), GestureState::Idle);
        assert!(store.annotations(1).is_empty());

        // A fresh gesture works normally afterwards.
        gestures.pointer_down(primary(1, 1, 100.0, 100.0), canvas(), 1.0);
        gestures.pointer_up(&mut store, primary(1, 1, 100.0, 100.0), canvas());
        assert_eq!(store.annotations(1).len(), 1);
    }

    #[test]
    fn switching_tools_cancels_the_draft() {
        let mut gestures = machine();
        gestures.pointer_down(primary(1, 1, 100.0, 100.0), canvas(), 1.0);
        gestures.set_tool(Tool::Arrow);
        assert_eq!(*gestures.state(), GestureState::Idle);
        assert_eq!(gestures.session().tool, Tool::Arrow);
    }

    #[test]
    fn most_recently_entered_page_is_the_target() {
        let mut gestures = machine();
        gestures.pointer_entered(3);
        assert_eq!(gestures.active_page(), Some(3));
        gestures.pointer_entered(4);
        assert_eq!(gestures.active_page(), Some(4));

        // Pointer-down on a page retargets it too.
        gestures.pointer_down(primary(1, 2, 10.0, 10.0), canvas(), 1.0);
        assert_eq!(gestures.active_page(), Some(2));
    }
}
