//! Headless application shell: builds the widgets, wires their callbacks and
//! drives the per-frame event/update/draw cycle.
//!
//! The shell knows nothing about windows or GPUs. The winit front end feeds it
//! [`InputEvent`]s and hands it a [`Surface`] to draw on.

use crate::config::AppConfig;
use clusterpad_core::palette;
use clusterpad_core::{
    Button, CallbackError, CallbackResult, Canvas, EventKind, EventPayload, InputEvent, Label,
    MouseButton, Rgba, Surface, UiContext, Widget,
};
use kurbo::{Point, Rect};
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

const PANEL_MARGIN: f64 = 20.0;
const BUTTON_WIDTH: f64 = 150.0;
const BUTTON_HEIGHT: f64 = 50.0;
const STEP_BUTTON_SIZE: f64 = 40.0;
const CAPTION_SIZE: f64 = 20.0;
const STEP_CAPTION_SIZE: f64 = 30.0;
const K_LABEL_SIZE: f64 = 24.0;
const INFO_SIZE: f64 = 20.0;
const INFO_LINE_HEIGHT: f64 = 24.0;

/// The side-panel buttons.
#[derive(Debug)]
struct Controls {
    run: Button,
    boundary: Button,
    remove_last: Button,
    clear: Button,
    k_down: Button,
    k_up: Button,
}

impl Controls {
    fn new(x: f64) -> Self {
        let wide = |y: f64, color: Rgba, caption: &str| {
            Button::new(Rect::new(x, y, x + BUTTON_WIDTH, y + BUTTON_HEIGHT), color)
                .with_label(caption, CAPTION_SIZE, palette::BLACK)
        };
        let step = |x: f64, color: Rgba, caption: &str| {
            Button::new(
                Rect::new(x, 275.0, x + STEP_BUTTON_SIZE, 275.0 + STEP_BUTTON_SIZE),
                color,
            )
            .with_label(caption, STEP_CAPTION_SIZE, palette::BLACK)
        };

        Self {
            run: wide(20.0, palette::PRIMARY, "Run"),
            boundary: wide(80.0, palette::STEEL_BLUE, "Draw Boundary"),
            remove_last: wide(150.0, palette::WARNING, "Remove Last Point"),
            clear: wide(210.0, palette::SECONDARY, "Clear Canvas"),
            k_down: step(x, palette::WARNING, "-"),
            k_up: step(x + BUTTON_WIDTH - STEP_BUTTON_SIZE, palette::ADD, "+"),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &Button> {
        [
            &self.run,
            &self.boundary,
            &self.remove_last,
            &self.clear,
            &self.k_down,
            &self.k_up,
        ]
        .into_iter()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Button> {
        [
            &mut self.run,
            &mut self.boundary,
            &mut self.remove_last,
            &mut self.clear,
            &mut self.k_down,
            &mut self.k_up,
        ]
        .into_iter()
    }
}

fn with_canvas<R>(canvas: &RefCell<Canvas>, f: impl FnOnce(&mut Canvas) -> R) -> Result<R, CallbackError> {
    let mut canvas = canvas
        .try_borrow_mut()
        .map_err(|_| CallbackError::new("canvas is busy"))?;
    Ok(f(&mut canvas))
}

fn k_caption(k: usize) -> String {
    format!("k = {}", k)
}

/// Application state for one ClusterPad session.
#[derive(Debug)]
pub struct Shell {
    config: AppConfig,
    ctx: UiContext,
    canvas: Rc<RefCell<Canvas>>,
    k: Rc<Cell<usize>>,
    /// Set whenever the info labels need rebuilding.
    info_dirty: Rc<Cell<bool>>,
    controls: Controls,
    k_label: Rc<RefCell<Label>>,
    points_label: Label,
    cluster_labels: Vec<Label>,
    running: bool,
}

impl Shell {
    pub fn new(config: AppConfig) -> Self {
        let panel_x = config.canvas_width + PANEL_MARGIN;

        let mut canvas = Canvas::new(
            Rect::new(0.0, 0.0, config.canvas_width, config.canvas_height),
            config.canvas_color,
        );
        canvas.set_show_boundaries(config.show_boundaries);

        let k_label = Label::new(
            k_caption(config.initial_k),
            K_LABEL_SIZE,
            Point::new(panel_x + 50.0, 280.0),
        );
        let points_label = Label::new("Points: 0", INFO_SIZE, Point::new(panel_x, 340.0));

        let mut shell = Self {
            k: Rc::new(Cell::new(config.initial_k)),
            ctx: UiContext::new(),
            canvas: Rc::new(RefCell::new(canvas)),
            info_dirty: Rc::new(Cell::new(false)),
            controls: Controls::new(panel_x),
            k_label: Rc::new(RefCell::new(k_label)),
            points_label,
            cluster_labels: Vec::new(),
            running: true,
            config,
        };
        shell.connect_controls();
        shell
    }

    fn connect_controls(&mut self) {
        let canvas = Rc::clone(&self.canvas);
        let k = Rc::clone(&self.k);
        let dirty = Rc::clone(&self.info_dirty);
        self.controls.run.connect(EventKind::Clicked, move |_| {
            with_canvas(&canvas, |c| c.run_clustering(k.get()))?;
            dirty.set(true);
            Ok(())
        });

        let canvas = Rc::clone(&self.canvas);
        self.controls.boundary.connect(EventKind::Clicked, move |_| {
            let shown = with_canvas(&canvas, Canvas::toggle_boundaries)?;
            log::info!("Cluster boundaries {}", if shown { "shown" } else { "hidden" });
            Ok(())
        });

        let canvas = Rc::clone(&self.canvas);
        let dirty = Rc::clone(&self.info_dirty);
        self.controls.remove_last.connect(EventKind::Clicked, move |_| {
            if with_canvas(&canvas, Canvas::remove_last_point)?.is_some() {
                dirty.set(true);
            }
            Ok(())
        });

        let canvas = Rc::clone(&self.canvas);
        let dirty = Rc::clone(&self.info_dirty);
        self.controls.clear.connect(EventKind::Clicked, move |_| {
            with_canvas(&canvas, Canvas::clear)?;
            dirty.set(true);
            Ok(())
        });

        let (min_k, max_k) = (self.config.min_k, self.config.max_k);
        let down = self.k_stepper(move |k| k.checked_sub(1).filter(|&k| k >= min_k));
        self.controls.k_down.connect(EventKind::Clicked, down);
        let up = self.k_stepper(move |k| Some(k + 1).filter(|&k| k <= max_k));
        self.controls.k_up.connect(EventKind::Clicked, up);
    }

    /// Callback moving k to `next(k)` when that yields a value.
    fn k_stepper(
        &self,
        next: impl Fn(usize) -> Option<usize> + 'static,
    ) -> impl FnMut(&EventPayload) -> CallbackResult + 'static {
        let k = Rc::clone(&self.k);
        let label = Rc::clone(&self.k_label);
        move |_| {
            let Some(value) = next(k.get()) else {
                return Ok(());
            };
            label
                .try_borrow_mut()
                .map_err(|_| CallbackError::new("k label is busy"))?
                .set_text(k_caption(value));
            k.set(value);
            Ok(())
        }
    }

    /// Feed one input event to the buttons and the canvas, then apply the
    /// canvas actions. Labels are passive and never see input.
    pub fn handle_event(&mut self, event: &InputEvent) {
        if matches!(event, InputEvent::Quit) {
            log::info!("Quit requested");
            self.running = false;
            return;
        }

        self.ctx.handle_event(event);
        for button in self.controls.iter_mut() {
            button.execute(event, &mut self.ctx);
        }
        self.canvas.borrow_mut().execute(event, &mut self.ctx);

        match *event {
            InputEvent::ButtonDown { position, .. } if event.is_primary_down() => {
                let color = self.config.point_color;
                if self.canvas.borrow_mut().add_point(position, color) {
                    self.info_dirty.set(true);
                }
            }
            InputEvent::ButtonDown {
                button: MouseButton::Right,
                position,
            } => {
                let radius = self.config.removal_radius;
                if self.canvas.borrow_mut().remove_point_near(position, radius) > 0 {
                    self.info_dirty.set(true);
                }
            }
            _ => {}
        }

        if self.info_dirty.replace(false) {
            self.refresh_info();
        }
    }

    fn refresh_info(&mut self) {
        let canvas = self.canvas.borrow();
        let x = self.points_label.rect().x0;
        self.points_label.set_text(format!("Points: {}", canvas.len()));
        self.cluster_labels = canvas
            .cluster_summaries()
            .into_iter()
            .map(|summary| {
                let y = 360.0 + INFO_LINE_HEIGHT * summary.index as f64;
                Label::with_color(summary.to_string(), INFO_SIZE, Point::new(x, y), summary.color)
            })
            .collect();
    }

    /// Start a new frame and refresh the interactive widgets against the pointer.
    pub fn update(&mut self, delta: Duration) {
        self.ctx.begin_frame(delta);
        let ctx = &self.ctx;
        for button in self.controls.iter_mut() {
            button.update(ctx);
        }
        self.canvas.borrow_mut().update(ctx);
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        let window = Rect::new(0.0, 0.0, self.config.width as f64, self.config.height as f64);
        surface.fill_rect(window, self.config.background_color);

        for button in self.controls.iter() {
            button.draw(surface);
        }
        self.k_label.borrow().draw(surface);
        self.points_label.draw(surface);
        for label in &self.cluster_labels {
            label.draw(surface);
        }
        self.canvas.borrow().draw(surface);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn k(&self) -> usize {
        self.k.get()
    }

    pub fn canvas(&self) -> Ref<'_, Canvas> {
        self.canvas.borrow()
    }

    pub fn k_text(&self) -> String {
        self.k_label.borrow().text().to_string()
    }

    pub fn points_text(&self) -> &str {
        self.points_label.text()
    }

    pub fn cluster_texts(&self) -> Vec<&str> {
        self.cluster_labels.iter().map(Label::text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterpad_core::{DrawCommand, RecordingSurface};

    const RUN: Point = Point::new(650.0, 40.0);
    const BOUNDARY: Point = Point::new(650.0, 100.0);
    const REMOVE_LAST: Point = Point::new(650.0, 170.0);
    const CLEAR: Point = Point::new(650.0, 230.0);
    const K_DOWN: Point = Point::new(640.0, 295.0);
    const K_UP: Point = Point::new(750.0, 295.0);

    fn click(shell: &mut Shell, position: Point) {
        shell.handle_event(&InputEvent::PointerMoved { position });
        shell.handle_event(&InputEvent::ButtonDown {
            button: MouseButton::Left,
            position,
        });
        shell.handle_event(&InputEvent::ButtonUp {
            button: MouseButton::Left,
            position,
        });
    }

    fn shell_with_points(points: &[(f64, f64)]) -> Shell {
        let mut shell = Shell::new(AppConfig::default());
        for &(x, y) in points {
            click(&mut shell, Point::new(x, y));
        }
        shell
    }

    #[test]
    fn test_initial_layout() {
        let shell = Shell::new(AppConfig::default());
        assert!(shell.is_running());
        assert_eq!(shell.k(), 3);
        assert_eq!(shell.k_text(), "k = 3");
        assert_eq!(shell.points_text(), "Points: 0");
        assert!(shell.cluster_texts().is_empty());
        assert!(!shell.canvas().show_boundaries());
    }

    #[test]
    fn test_clicks_add_points_inside_canvas_only() {
        let mut shell = Shell::new(AppConfig::default());
        click(&mut shell, Point::new(100.0, 100.0));
        click(&mut shell, Point::new(600.0, 600.0));
        click(&mut shell, Point::new(700.0, 500.0));

        assert_eq!(shell.canvas().len(), 2);
        assert_eq!(shell.points_text(), "Points: 2");
    }

    #[test]
    fn test_run_clusters_and_lists_summaries() {
        let mut shell = shell_with_points(&[
            (10.0, 10.0),
            (12.0, 12.0),
            (300.0, 300.0),
            (302.0, 302.0),
            (550.0, 550.0),
            (552.0, 552.0),
        ]);
        click(&mut shell, RUN);

        assert_eq!(shell.canvas().len(), 6);
        assert!(shell.canvas().cluster_result().is_some());
        let texts = shell.cluster_texts();
        assert_eq!(texts.len(), 3);
        assert!(texts[0].starts_with("C1: 2 point(s) - Centroid: ("));
        assert!(texts.iter().all(|t| t.contains("2 point(s)")));
    }

    #[test]
    fn test_run_with_too_few_points_changes_nothing() {
        let mut shell = shell_with_points(&[(10.0, 10.0), (20.0, 20.0)]);
        click(&mut shell, RUN);
        assert!(shell.canvas().cluster_result().is_none());
        assert!(shell.cluster_texts().is_empty());
    }

    #[test]
    fn test_adding_a_point_drops_cluster_info() {
        let mut shell = shell_with_points(&[(10.0, 10.0), (20.0, 20.0), (400.0, 400.0)]);
        click(&mut shell, RUN);
        assert_eq!(shell.cluster_texts().len(), 3);

        click(&mut shell, Point::new(200.0, 200.0));
        assert!(shell.cluster_texts().is_empty());
        assert_eq!(shell.points_text(), "Points: 4");
    }

    #[test]
    fn test_k_stays_in_range() {
        let mut shell = Shell::new(AppConfig::default());
        for _ in 0..12 {
            click(&mut shell, K_UP);
        }
        assert_eq!(shell.k(), 10);
        assert_eq!(shell.k_text(), "k = 10");

        for _ in 0..15 {
            click(&mut shell, K_DOWN);
        }
        assert_eq!(shell.k(), 1);
        assert_eq!(shell.k_text(), "k = 1");
    }

    #[test]
    fn test_remove_last_and_clear() {
        let mut shell = shell_with_points(&[(10.0, 10.0), (20.0, 20.0), (30.0, 30.0)]);
        click(&mut shell, REMOVE_LAST);
        assert_eq!(shell.canvas().len(), 2);
        assert_eq!(shell.canvas().points()[1].position(), Point::new(20.0, 20.0));
        assert_eq!(shell.points_text(), "Points: 2");

        click(&mut shell, CLEAR);
        assert!(shell.canvas().is_empty());
        assert_eq!(shell.points_text(), "Points: 0");

        click(&mut shell, REMOVE_LAST);
        assert_eq!(shell.points_text(), "Points: 0");
    }

    #[test]
    fn test_right_click_removes_nearby_points() {
        let mut shell = shell_with_points(&[(100.0, 100.0), (105.0, 100.0), (300.0, 300.0)]);
        shell.handle_event(&InputEvent::ButtonDown {
            button: MouseButton::Right,
            position: Point::new(102.0, 100.0),
        });
        assert_eq!(shell.canvas().len(), 1);
        assert_eq!(shell.points_text(), "Points: 1");
    }

    #[test]
    fn test_boundary_button_toggles_overlay() {
        let mut shell = Shell::new(AppConfig::default());
        click(&mut shell, BOUNDARY);
        assert!(shell.canvas().show_boundaries());
        click(&mut shell, BOUNDARY);
        assert!(!shell.canvas().show_boundaries());
    }

    #[test]
    fn test_config_is_applied() {
        let config = AppConfig {
            initial_k: 5,
            show_boundaries: true,
            ..AppConfig::default()
        };
        let shell = Shell::new(config);
        assert_eq!(shell.k(), 5);
        assert_eq!(shell.k_text(), "k = 5");
        assert!(shell.canvas().show_boundaries());
    }

    #[test]
    fn test_quit_stops_the_session() {
        let mut shell = Shell::new(AppConfig::default());
        shell.handle_event(&InputEvent::Quit);
        assert!(!shell.is_running());
    }

    #[test]
    fn test_draw_renders_panel_and_canvas() {
        let mut shell = shell_with_points(&[(10.0, 10.0), (20.0, 20.0), (400.0, 400.0)]);
        click(&mut shell, RUN);
        shell.update(Duration::from_millis(16));

        let mut surface = RecordingSurface::default();
        shell.draw(&mut surface);
        let texts = surface.texts();
        for expected in ["Run", "Draw Boundary", "Remove Last Point", "Clear Canvas", "+", "-"] {
            assert!(texts.contains(&expected), "missing {expected}");
        }
        assert!(texts.contains(&"k = 3"));
        assert!(texts.contains(&"Points: 3"));
        assert_eq!(texts.iter().filter(|t| t.starts_with('C')).count(), 4);
    }

    fn cluster_text_colors(shell: &Shell) -> Vec<(String, Rgba)> {
        let mut surface = RecordingSurface::default();
        shell.draw(&mut surface);
        surface
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, color, .. } if text.starts_with("C1:") => {
                    Some((text.clone(), *color))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_info_labels_keep_cluster_color_under_pointer() {
        let mut shell = shell_with_points(&[(10.0, 10.0), (20.0, 20.0), (400.0, 400.0)]);
        click(&mut shell, RUN);
        let before = cluster_text_colors(&shell);
        assert_eq!(before.len(), 1);
        assert_ne!(before[0].1, palette::DEEP_SKY_BLUE);

        let on_label = Point::new(625.0, 365.0);
        shell.handle_event(&InputEvent::PointerMoved { position: on_label });
        shell.update(Duration::from_millis(16));
        assert_eq!(cluster_text_colors(&shell), before);

        shell.handle_event(&InputEvent::ButtonDown {
            button: MouseButton::Left,
            position: on_label,
        });
        shell.update(Duration::from_millis(16));
        assert_eq!(cluster_text_colors(&shell), before);
        assert_eq!(shell.canvas().len(), 3);
    }
}
