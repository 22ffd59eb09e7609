//! Shared widget state machine.

use super::{WidgetId, WidgetState, WidgetStyle};
use crate::context::UiContext;
use crate::focus::FocusHandle;
use crate::input::InputEvent;
use crate::palette::Rgba;
use crate::signal::{EventKind, EventPayload, Signal};
use kurbo::{Point, Rect, Size, Vec2};
use std::cell::Cell;
use std::rc::Rc;

/// Geometry, colors, interaction flags and signal of one widget.
///
/// The flag cell is shared with the [`FocusManager`](crate::focus::FocusManager)
/// so it can reset a widget when focus moves elsewhere.
#[derive(Debug)]
pub struct WidgetBase {
    id: WidgetId,
    rect: Rect,
    style: WidgetStyle,
    state: Rc<Cell<WidgetState>>,
    signal: Signal,
    last_pointer: Point,
}

impl WidgetBase {
    pub fn new(rect: Rect, style: WidgetStyle) -> Self {
        Self {
            id: WidgetId::new(),
            rect,
            style,
            state: Rc::new(Cell::new(WidgetState::default())),
            signal: Signal::new(),
            last_pointer: Point::ZERO,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn style(&self) -> &WidgetStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: WidgetStyle) {
        self.style = style;
    }

    /// Snapshot of the interaction flags.
    pub fn state(&self) -> WidgetState {
        self.state.get()
    }

    /// Color for the current flags.
    pub fn color(&self) -> Rgba {
        self.style.resolve(&self.state.get())
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    pub fn signal_mut(&mut self) -> &mut Signal {
        &mut self.signal
    }

    /// A handle the focus manager can use to reset this widget.
    pub fn focus_handle(&self) -> FocusHandle {
        FocusHandle::new(self.id, &self.state)
    }

    fn modify(&self, f: impl FnOnce(&mut WidgetState)) {
        let mut flags = self.state.get();
        f(&mut flags);
        self.state.set(flags);
    }

    fn emit(&mut self, kind: EventKind, delta: Vec2) {
        let payload = EventPayload::new(self.id, self.last_pointer).with_delta(delta);
        self.signal.emit(kind, &payload);
    }

    /// Refresh the hover flag, emitting `Hovered` when the pointer enters.
    fn track_hover(&mut self, pointer: Point) {
        self.last_pointer = pointer;
        let flags = self.state.get();
        let hovered = flags.enabled && self.rect.contains(pointer);
        if hovered == flags.hovered {
            return;
        }
        self.modify(|s| s.hovered = hovered);
        if hovered {
            self.emit(EventKind::Hovered, Vec2::ZERO);
        }
    }

    fn enforce_active_requires_focus(&self) {
        let flags = self.state.get();
        if flags.active && !flags.focused {
            self.modify(|s| s.active = false);
        }
    }

    /// Per-frame refresh against the pointer position.
    pub fn update(&mut self, pointer: Point) {
        if !self.state.get().enabled {
            self.modify(|s| s.hovered = false);
            return;
        }
        self.track_hover(pointer);
        self.enforce_active_requires_focus();
    }

    /// Run the hover/click/focus transitions for one event.
    ///
    /// Positionless events use the context's pointer.
    pub fn process(&mut self, event: &InputEvent, ctx: &mut UiContext) {
        let pointer = event.position().unwrap_or_else(|| ctx.pointer());

        if !self.state.get().enabled {
            if ctx.focus().is_focused(self.id) {
                log::debug!("Disabled widget {} releases focus", self.id);
                ctx.focus_mut().clear_focus();
            }
            return;
        }

        self.track_hover(pointer);

        match event {
            InputEvent::ButtonDown { .. } if event.is_primary_down() => {
                let flags = self.state.get();
                if flags.hovered {
                    ctx.focus_mut().set_focus(self.focus_handle());
                    self.modify(|s| s.active = true);
                    self.emit(EventKind::Clicked, Vec2::ZERO);
                } else if flags.focused {
                    ctx.focus_mut().clear_focus();
                }
            }
            InputEvent::ButtonUp { .. } if event.is_primary_up() => {
                let flags = self.state.get();
                if flags.active {
                    self.modify(|s| s.active = false);
                    if flags.hovered {
                        self.emit(EventKind::ClickedRelease, Vec2::ZERO);
                    }
                }
            }
            InputEvent::PointerMoved { .. } if self.state.get().active => {
                let delta = ctx.input().drag_delta().unwrap_or(Vec2::ZERO);
                self.emit(EventKind::Dragged, delta);
            }
            InputEvent::Scroll { delta, .. } if self.state.get().hovered => {
                self.emit(EventKind::Scrolled, *delta);
            }
            _ => {}
        }

        self.enforce_active_requires_focus();
    }

    /// Enable or disable the widget.
    ///
    /// Disabling drops the active and hover flags and emits `Disabled` once per
    /// transition. Focus is released on the next processed event.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.state.get().enabled == enabled {
            return;
        }
        self.modify(|s| {
            s.enabled = enabled;
            if !enabled {
                s.active = false;
                s.hovered = false;
            }
        });
        if !enabled {
            log::warn!("Widget {} is disabled", self.id);
            self.emit(EventKind::Disabled, Vec2::ZERO);
        }
    }

    /// Replace the rectangle. Returns `false` if it was rejected.
    pub fn set_rect(&mut self, rect: Rect) -> bool {
        let finite = [rect.x0, rect.y0, rect.x1, rect.y1]
            .iter()
            .all(|v| v.is_finite());
        if !finite || rect.width() < 0.0 || rect.height() < 0.0 {
            log::error!("Invalid rectangle for widget {}: {:?}", self.id, rect);
            return false;
        }
        self.rect = rect;
        true
    }

    pub fn set_position(&mut self, position: Point) -> bool {
        if !position.is_finite() {
            log::error!("Invalid position for widget {}: {:?}", self.id, position);
            return false;
        }
        self.rect = Rect::from_origin_size(position, self.rect.size());
        true
    }

    pub fn center_on(&mut self, center: Point) -> bool {
        if !center.is_finite() {
            log::error!("Invalid center for widget {}: {:?}", self.id, center);
            return false;
        }
        self.rect = Rect::from_center_size(center, self.rect.size());
        true
    }

    pub fn center_x(&mut self, x: f64) -> bool {
        if !x.is_finite() {
            log::error!("Invalid center x for widget {}: {}", self.id, x);
            return false;
        }
        let center = Point::new(x, self.rect.center().y);
        self.rect = Rect::from_center_size(center, self.rect.size());
        true
    }

    pub fn center_y(&mut self, y: f64) -> bool {
        if !y.is_finite() {
            log::error!("Invalid center y for widget {}: {}", self.id, y);
            return false;
        }
        let center = Point::new(self.rect.center().x, y);
        self.rect = Rect::from_center_size(center, self.rect.size());
        true
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) -> bool {
        if !dx.is_finite() || !dy.is_finite() {
            log::error!("Invalid offset for widget {}: ({}, {})", self.id, dx, dy);
            return false;
        }
        self.rect = self.rect + Vec2::new(dx, dy);
        true
    }

    pub fn resize(&mut self, size: Size) -> bool {
        if !size.is_finite() || size.width < 0.0 || size.height < 0.0 {
            log::error!("Invalid size for widget {}: {:?}", self.id, size);
            return false;
        }
        self.rect = Rect::from_origin_size(self.rect.origin(), size);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;
    use crate::palette;
    use proptest::prelude::*;
    use std::cell::RefCell;

    fn base_at(rect: Rect) -> WidgetBase {
        WidgetBase::new(rect, WidgetStyle::new(palette::PRIMARY))
    }

    fn counter(base: &mut WidgetBase, kind: EventKind) -> Rc<RefCell<usize>> {
        let hits = Rc::new(RefCell::new(0));
        let c = hits.clone();
        base.signal_mut().connect(kind, move |_| {
            *c.borrow_mut() += 1;
            Ok(())
        });
        hits
    }

    fn send(base: &mut WidgetBase, ctx: &mut UiContext, event: InputEvent) {
        ctx.handle_event(&event);
        base.process(&event, ctx);
    }

    fn down(x: f64, y: f64) -> InputEvent {
        InputEvent::ButtonDown {
            button: MouseButton::Left,
            position: Point::new(x, y),
        }
    }

    fn up(x: f64, y: f64) -> InputEvent {
        InputEvent::ButtonUp {
            button: MouseButton::Left,
            position: Point::new(x, y),
        }
    }

    #[test]
    fn test_click_and_release_over_button() {
        let mut ctx = UiContext::new();
        let mut button = base_at(Rect::new(620.0, 20.0, 770.0, 70.0));
        let clicked = counter(&mut button, EventKind::Clicked);
        let released = counter(&mut button, EventKind::ClickedRelease);

        button.update(Point::new(650.0, 30.0));
        send(&mut button, &mut ctx, down(650.0, 30.0));
        assert_eq!(*clicked.borrow(), 1);
        assert!(button.state().active);
        assert!(button.state().focused);
        assert_eq!(button.color(), button.style().active);

        send(&mut button, &mut ctx, down(650.0, 30.0));
        send(&mut button, &mut ctx, up(650.0, 30.0));
        assert_eq!(*released.borrow(), 1);
        assert!(!button.state().active);
        assert!(button.state().focused);
    }

    #[test]
    fn test_release_outside_does_not_emit() {
        let mut ctx = UiContext::new();
        let mut button = base_at(Rect::new(0.0, 0.0, 100.0, 100.0));
        let released = counter(&mut button, EventKind::ClickedRelease);

        send(&mut button, &mut ctx, down(50.0, 50.0));
        send(&mut button, &mut ctx, up(200.0, 200.0));

        assert_eq!(*released.borrow(), 0);
        assert!(!button.state().active);
    }

    #[test]
    fn test_hovered_emitted_on_entry_only() {
        let mut button = base_at(Rect::new(0.0, 0.0, 100.0, 100.0));
        let hovered = counter(&mut button, EventKind::Hovered);

        button.update(Point::new(10.0, 10.0));
        button.update(Point::new(20.0, 20.0));
        button.update(Point::new(200.0, 20.0));
        button.update(Point::new(20.0, 20.0));

        assert_eq!(*hovered.borrow(), 2);
        assert_eq!(button.color(), button.style().hover);
    }

    #[test]
    fn test_click_elsewhere_clears_focus() {
        let mut ctx = UiContext::new();
        let mut button = base_at(Rect::new(0.0, 0.0, 100.0, 100.0));

        send(&mut button, &mut ctx, down(50.0, 50.0));
        send(&mut button, &mut ctx, up(50.0, 50.0));
        assert!(ctx.focus().is_focused(button.id()));

        send(&mut button, &mut ctx, down(300.0, 300.0));
        assert_eq!(ctx.focus().focused(), None);
        assert!(!button.state().focused);
    }

    #[test]
    fn test_focus_moves_between_widgets() {
        let mut ctx = UiContext::new();
        let mut a = base_at(Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut b = base_at(Rect::new(200.0, 0.0, 300.0, 100.0));

        send(&mut a, &mut ctx, down(50.0, 50.0));
        let event = down(250.0, 50.0);
        ctx.handle_event(&event);
        b.process(&event, &mut ctx);

        assert!(b.state().focused);
        assert!(!a.state().focused);
        assert!(!a.state().active);
    }

    #[test]
    fn test_disable_while_active() {
        let mut ctx = UiContext::new();
        let mut button = base_at(Rect::new(0.0, 0.0, 100.0, 100.0));
        let disabled = counter(&mut button, EventKind::Disabled);

        send(&mut button, &mut ctx, down(50.0, 50.0));
        button.set_enabled(false);
        button.set_enabled(false);

        assert!(!button.state().active);
        assert!(!button.state().hovered);
        assert_eq!(button.color(), button.style().disabled);
        assert_eq!(*disabled.borrow(), 1);

        // Focus is dropped on the next event.
        send(&mut button, &mut ctx, InputEvent::PointerMoved { position: Point::new(1.0, 1.0) });
        assert_eq!(ctx.focus().focused(), None);
        assert!(!button.state().focused);

        button.set_enabled(true);
        button.update(Point::new(500.0, 500.0));
        assert_eq!(button.color(), button.style().base);
    }

    #[test]
    fn test_disabled_widget_ignores_clicks() {
        let mut ctx = UiContext::new();
        let mut button = base_at(Rect::new(0.0, 0.0, 100.0, 100.0));
        let clicked = counter(&mut button, EventKind::Clicked);
        button.set_enabled(false);

        send(&mut button, &mut ctx, down(50.0, 50.0));
        assert_eq!(*clicked.borrow(), 0);
        assert!(!button.state().focused);
    }

    #[test]
    fn test_drag_and_scroll_events() {
        let mut ctx = UiContext::new();
        let mut widget = base_at(Rect::new(0.0, 0.0, 100.0, 100.0));
        let deltas = Rc::new(RefCell::new(Vec::new()));
        let sink = deltas.clone();
        widget.signal_mut().connect(EventKind::Dragged, move |payload| {
            sink.borrow_mut().push(payload.delta);
            Ok(())
        });
        let scrolled = counter(&mut widget, EventKind::Scrolled);

        send(&mut widget, &mut ctx, down(10.0, 10.0));
        send(&mut widget, &mut ctx, InputEvent::PointerMoved { position: Point::new(30.0, 15.0) });
        send(&mut widget, &mut ctx, up(30.0, 15.0));
        send(&mut widget, &mut ctx, InputEvent::PointerMoved { position: Point::new(40.0, 15.0) });
        send(
            &mut widget,
            &mut ctx,
            InputEvent::Scroll {
                position: Point::new(40.0, 15.0),
                delta: Vec2::new(0.0, -3.0),
            },
        );

        assert_eq!(*deltas.borrow(), vec![Vec2::new(20.0, 5.0)]);
        assert_eq!(*scrolled.borrow(), 1);
    }

    #[test]
    fn test_geometry_validation() {
        let mut widget = base_at(Rect::new(0.0, 0.0, 40.0, 20.0));

        assert!(widget.center_on(Point::new(100.0, 100.0)));
        assert_eq!(widget.rect(), Rect::new(80.0, 90.0, 120.0, 110.0));

        assert!(!widget.set_position(Point::new(f64::NAN, 0.0)));
        assert!(!widget.move_by(f64::INFINITY, 0.0));
        assert!(!widget.resize(Size::new(-1.0, 5.0)));
        assert_eq!(widget.rect(), Rect::new(80.0, 90.0, 120.0, 110.0));

        assert!(widget.center_x(20.0));
        assert!(widget.center_y(10.0));
        assert_eq!(widget.rect(), Rect::new(0.0, 0.0, 40.0, 20.0));

        assert!(widget.move_by(5.0, 5.0));
        assert!(widget.resize(Size::new(10.0, 10.0)));
        assert_eq!(widget.rect(), Rect::new(5.0, 5.0, 15.0, 15.0));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Move(f64, f64),
        Down(MouseButton, f64, f64),
        Up(f64, f64),
        Toggle(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        let coord = 0.0..400.0f64;
        prop_oneof![
            (coord.clone(), coord.clone()).prop_map(|(x, y)| Op::Move(x, y)),
            (
                prop_oneof![Just(MouseButton::Left), Just(MouseButton::Right)],
                coord.clone(),
                coord.clone()
            )
                .prop_map(|(b, x, y)| Op::Down(b, x, y)),
            (coord.clone(), coord).prop_map(|(x, y)| Op::Up(x, y)),
            (0usize..3).prop_map(Op::Toggle),
        ]
    }

    proptest! {
        #[test]
        fn prop_single_focus_and_active_implies_focused(ops in prop::collection::vec(op(), 1..60)) {
            let mut ctx = UiContext::new();
            let mut widgets = vec![
                base_at(Rect::new(0.0, 0.0, 150.0, 150.0)),
                base_at(Rect::new(100.0, 100.0, 250.0, 250.0)),
                base_at(Rect::new(260.0, 0.0, 400.0, 400.0)),
            ];

            for op in ops {
                let event = match op {
                    Op::Toggle(i) => {
                        let enabled = widgets[i].state().enabled;
                        widgets[i].set_enabled(!enabled);
                        None
                    }
                    Op::Move(x, y) => Some(InputEvent::PointerMoved { position: Point::new(x, y) }),
                    Op::Down(button, x, y) => Some(InputEvent::ButtonDown { button, position: Point::new(x, y) }),
                    Op::Up(x, y) => Some(up(x, y)),
                };
                if let Some(event) = event {
                    ctx.handle_event(&event);
                    for widget in &mut widgets {
                        widget.process(&event, &mut ctx);
                    }
                }

                let focused: Vec<_> = widgets.iter().filter(|w| w.state().focused).collect();
                prop_assert!(focused.len() <= 1);
                if let Some(holder) = focused.first() {
                    prop_assert_eq!(ctx.focus().focused(), Some(holder.id()));
                }
                for widget in &widgets {
                    let s = widget.state();
                    prop_assert!(!s.active || s.focused);
                }
            }
        }
    }
}
