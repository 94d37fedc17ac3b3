//! Screen-space geometry for routing edges between anchors.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::RoutingConfig;
use crate::view::AnchorId;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Midpoint of the given side.
    pub fn side(&self, side: Side) -> Point {
        let c = self.center();
        match side {
            Side::Left => Point::new(self.left, c.y),
            Side::Right => Point::new(self.right(), c.y),
            Side::Top => Point::new(c.x, self.top),
            Side::Bottom => Point::new(c.x, self.bottom()),
        }
    }

    /// Move by an offset.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.left += dx;
        self.top += dy;
    }
}

/// Side of an anchor an edge leaves from or arrives at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Unit direction pointing away from the rectangle on this side.
    fn outward(self) -> (f32, f32) {
        match self {
            Side::Left => (-1.0, 0.0),
            Side::Right => (1.0, 0.0),
            Side::Top => (0.0, -1.0),
            Side::Bottom => (0.0, 1.0),
        }
    }
}

/// A cubic Bézier from source to target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArrowPath {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl ArrowPath {
    /// SVG path data for this curve.
    pub fn to_svg(&self) -> String {
        format!(
            "M{} {} C{} {}, {} {}, {} {}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y,
        )
    }
}

/// Source of anchor positions. Implemented by whatever lays the views out.
pub trait Layout {
    /// Current rectangle of an anchor, or `None` if it is not visible.
    fn anchor_rect(&self, anchor: AnchorId) -> Option<Rect>;
}

/// A layout backed by a plain map, for headless use and tests.
#[derive(Debug, Clone, Default)]
pub struct FixedLayout {
    rects: HashMap<AnchorId, Rect>,
}

impl FixedLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place (or move) an anchor.
    pub fn place(&mut self, anchor: AnchorId, rect: Rect) {
        self.rects.insert(anchor, rect);
    }

    /// Hide an anchor, e.g. when its panel collapses.
    pub fn hide(&mut self, anchor: AnchorId) {
        self.rects.remove(&anchor);
    }

    /// Drag an anchor by an offset. Returns false if it is not placed.
    pub fn drag(&mut self, anchor: AnchorId, dx: f32, dy: f32) -> bool {
        match self.rects.get_mut(&anchor) {
            Some(rect) => {
                rect.translate(dx, dy);
                true
            }
            None => false,
        }
    }
}

impl Layout for FixedLayout {
    fn anchor_rect(&self, anchor: AnchorId) -> Option<Rect> {
        self.rects.get(&anchor).copied()
    }
}

/// Compute the curve between two anchor rectangles.
///
/// Unset sides face each other horizontally: the source leaves toward the
/// target and the target is entered from the side nearer the source.
pub fn route(
    source: Rect,
    target: Rect,
    start: Option<Side>,
    end: Option<Side>,
    config: &RoutingConfig,
) -> ArrowPath {
    let target_is_right = target.center().x >= source.center().x;
    let start_side = start.unwrap_or(if target_is_right { Side::Right } else { Side::Left });
    let end_side = end.unwrap_or(if target_is_right { Side::Left } else { Side::Right });

    let from = source.side(start_side);
    let to = target.side(end_side);
    let bend = ((to.x - from.x).abs() * config.bend_ratio).max(config.min_bend);

    let (sx, sy) = start_side.outward();
    let (ex, ey) = end_side.outward();

    ArrowPath {
        start: from,
        control1: Point::new(from.x + sx * bend, from.y + sy * bend),
        control2: Point::new(to.x + ex * bend, to.y + ey * bend),
        end: to,
    }
}
