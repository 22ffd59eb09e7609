//! Point canvas with a lazily invalidated clustering cache.

use crate::cluster::{ClusterResult, ClusterRoutine, KMeans};
use crate::context::UiContext;
use crate::hull::convex_hull;
use crate::palette::{self, CLUSTER_PALETTE, Rgba, cluster_color};
use crate::render::Surface;
use crate::widget::{Widget, WidgetBase, WidgetStyle};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance within which the pointer picks up a point.
pub const HOVER_RADIUS: f64 = 10.0;
pub const POINT_RADIUS: f64 = 5.0;
const CENTROID_RADIUS: f64 = 10.0;
const CENTROID_WIDTH: f64 = 2.0;
const BOUNDARY_WIDTH: f64 = 2.0;
const TOOLTIP_SIZE: f64 = 16.0;
const TOOLTIP_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

/// A placed point. The position is fixed once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPoint {
    position: Point,
    pub color: Rgba,
}

impl CanvasPoint {
    pub fn new(position: Point, color: Rgba) -> Self {
        Self { position, color }
    }

    pub fn position(&self) -> Point {
        self.position
    }
}

/// Per-cluster figures shown next to the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterSummary {
    pub index: usize,
    pub count: usize,
    pub centroid: Point,
    /// Color of the first point carrying this label, black if there is none.
    pub color: Rgba,
}

impl fmt::Display for ClusterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "C{}: {} point(s) - Centroid: ({}, {})",
            self.index + 1,
            self.count,
            self.centroid.x as i64,
            self.centroid.y as i64
        )
    }
}

/// Drawing area holding points in insertion order.
///
/// Any change to the point store drops the cached [`ClusterResult`]; recoloring
/// by clustering does not count as a change.
#[derive(Debug)]
pub struct Canvas {
    base: WidgetBase,
    points: Vec<CanvasPoint>,
    clusters: Option<ClusterResult>,
    hovered_point: Option<usize>,
    palette: Vec<Rgba>,
    routine: Box<dyn ClusterRoutine>,
    show_boundaries: bool,
}

impl Canvas {
    pub fn new(rect: Rect, background: Rgba) -> Self {
        let style = WidgetStyle::new(background)
            .with_hover(palette::LIGHT_GRAY)
            .with_active(palette::LIGHT_GRAY);
        Self {
            base: WidgetBase::new(rect, style),
            points: Vec::new(),
            clusters: None,
            hovered_point: None,
            palette: CLUSTER_PALETTE.to_vec(),
            routine: Box::new(KMeans::default()),
            show_boundaries: false,
        }
    }

    /// Colors used to recolor points by cluster label.
    pub fn with_palette(mut self, palette: Vec<Rgba>) -> Self {
        if palette.is_empty() {
            log::warn!("Empty cluster palette, keeping the default");
        } else {
            self.palette = palette;
        }
        self
    }

    pub fn with_routine(mut self, routine: impl ClusterRoutine + 'static) -> Self {
        self.routine = Box::new(routine);
        self
    }

    pub fn points(&self) -> &[CanvasPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether `position` lies inside the canvas, edges included.
    pub fn accepts(&self, position: Point) -> bool {
        let r = self.base.rect();
        position.x >= r.x0 && position.x <= r.x1 && position.y >= r.y0 && position.y <= r.y1
    }

    fn invalidate(&mut self) {
        self.clusters = None;
        self.hovered_point = None;
    }

    /// Append a point if it lies within the canvas bounds.
    pub fn add_point(&mut self, position: Point, color: Rgba) -> bool {
        if !self.accepts(position) {
            return false;
        }
        self.points.push(CanvasPoint::new(position, color));
        self.invalidate();
        true
    }

    pub fn remove_last_point(&mut self) -> Option<CanvasPoint> {
        let removed = self.points.pop()?;
        self.invalidate();
        Some(removed)
    }

    /// Remove every point within `radius` of `position`, edge included.
    ///
    /// Returns the number of points removed.
    pub fn remove_point_near(&mut self, position: Point, radius: f64) -> usize {
        let before = self.points.len();
        let r2 = radius * radius;
        self.points
            .retain(|p| (p.position - position).hypot2() > r2);
        let removed = before - self.points.len();
        if removed > 0 {
            self.invalidate();
        }
        removed
    }

    /// Remove all points and any clustering.
    pub fn clear(&mut self) {
        self.points.clear();
        self.invalidate();
    }

    /// Index of the first point strictly within `radius` of `position`.
    ///
    /// This is the earliest inserted match, not the closest one.
    pub fn nearest_point_index(&self, position: Point, radius: f64) -> Option<usize> {
        let r2 = radius * radius;
        self.points
            .iter()
            .position(|p| (p.position - position).hypot2() < r2)
    }

    pub fn hovered_point(&self) -> Option<usize> {
        self.hovered_point
    }

    /// Cluster the points into `k` groups and recolor them by label.
    ///
    /// With fewer than `k` points nothing changes. Returns whether a new
    /// clustering was stored.
    pub fn run_clustering(&mut self, k: usize) -> bool {
        if self.points.len() < k {
            log::debug!("Skipping clustering: {} points for k={}", self.points.len(), k);
            return false;
        }

        let positions: Vec<Point> = self.points.iter().map(CanvasPoint::position).collect();
        let result = self
            .routine
            .cluster(&positions, k)
            .and_then(|clustering| ClusterResult::from_clustering(clustering, positions.len(), k));

        match result {
            Ok(result) => {
                for (point, &label) in self.points.iter_mut().zip(result.labels()) {
                    point.color = cluster_color(&self.palette, label);
                }
                log::info!("Clustered {} points into {} groups", positions.len(), k);
                self.clusters = Some(result);
                true
            }
            Err(e) => {
                log::error!("Clustering failed: {}", e);
                false
            }
        }
    }

    pub fn cluster_result(&self) -> Option<&ClusterResult> {
        self.clusters.as_ref()
    }

    pub fn cluster_summaries(&self) -> Vec<ClusterSummary> {
        let Some(result) = &self.clusters else {
            return Vec::new();
        };
        let counts = result.counts();
        result
            .centroids()
            .iter()
            .enumerate()
            .map(|(index, &centroid)| {
                let color = result
                    .labels()
                    .iter()
                    .position(|&label| label == index)
                    .map_or(palette::BLACK, |i| self.points[i].color);
                ClusterSummary {
                    index,
                    count: counts[index],
                    centroid,
                    color,
                }
            })
            .collect()
    }

    /// Convex hull per cluster, for clusters with a non-degenerate hull.
    pub fn cluster_boundaries(&self) -> Vec<(usize, Vec<Point>)> {
        let Some(result) = &self.clusters else {
            return Vec::new();
        };
        (0..result.k())
            .filter_map(|label| {
                let members: Vec<Point> = result
                    .members(label)
                    .into_iter()
                    .map(|i| self.points[i].position)
                    .collect();
                if members.len() < 3 {
                    return None;
                }
                let hull = convex_hull(&members);
                (!hull.is_empty()).then_some((label, hull))
            })
            .collect()
    }

    pub fn show_boundaries(&self) -> bool {
        self.show_boundaries
    }

    pub fn set_show_boundaries(&mut self, show: bool) {
        self.show_boundaries = show;
    }

    /// Flip the boundary overlay, returning the new setting.
    pub fn toggle_boundaries(&mut self) -> bool {
        self.show_boundaries = !self.show_boundaries;
        self.show_boundaries
    }
}

impl Widget for Canvas {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn update(&mut self, ctx: &UiContext) {
        self.base.update(ctx.pointer());
        self.hovered_point = self.nearest_point_index(ctx.pointer(), HOVER_RADIUS);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.fill_rect(self.base.rect(), self.color());

        for (i, point) in self.points.iter().enumerate() {
            let color = if self.hovered_point == Some(i) {
                palette::BLACK
            } else {
                point.color
            };
            surface.fill_circle(point.position, POINT_RADIUS, color);
        }

        if let Some(result) = &self.clusters {
            for &centroid in result.centroids() {
                surface.stroke_circle(centroid, CENTROID_RADIUS, palette::BLACK, CENTROID_WIDTH);
            }
        }

        if self.show_boundaries {
            for (_, hull) in self.cluster_boundaries() {
                surface.stroke_polygon(&hull, palette::BLACK, BOUNDARY_WIDTH);
            }
        }

        if let Some(point) = self.hovered_point.and_then(|i| self.points.get(i)) {
            let p = point.position;
            surface.draw_text(
                &format!("({:.0}, {:.0})", p.x, p.y),
                p + TOOLTIP_OFFSET,
                TOOLTIP_SIZE,
                palette::BLACK,
            );
        }
    }
}
