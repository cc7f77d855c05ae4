//! Edge path geometry.
//!
//! Edges are drawn as cubic bezier curves between two anchor points. The
//! control points push out of the anchor side by an amount that depends on
//! the path type's curvature, the same routing the browser canvas uses, so a
//! label placed here lines up with the drawn path.

use super::node::{NodeBounds, anchor_side};
use crate::models::{Edge, Node, PathType, Side};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Computed shape of an edge plus label placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeGeometry {
    /// SVG path data (`M .. C ..`).
    pub path: String,
    pub source: Point,
    pub source_control: Point,
    pub target_control: Point,
    pub target: Point,
    /// Midpoint of the curve; labels and the property editor anchor here.
    pub label_x: f64,
    pub label_y: f64,
    /// Label rotation in degrees, always within [-90, 90].
    pub label_angle: f64,
}

fn control_offset(distance: f64, curvature: f64) -> f64 {
    if distance >= 0.0 {
        0.5 * distance
    } else {
        curvature * 25.0 * (-distance).sqrt()
    }
}

fn control_point(side: Side, from: Point, to: Point, curvature: f64) -> Point {
    match side {
        Side::Left => Point::new(from.x - control_offset(from.x - to.x, curvature), from.y),
        Side::Right => Point::new(from.x + control_offset(to.x - from.x, curvature), from.y),
        Side::Top => Point::new(from.x, from.y - control_offset(from.y - to.y, curvature)),
        Side::Bottom => Point::new(from.x, from.y + control_offset(to.y - from.y, curvature)),
    }
}

/// Keep a tangent angle readable: anything outside (-90, 90) is turned round.
pub fn upright_angle(raw_degrees: f64) -> f64 {
    if raw_degrees > 90.0 {
        raw_degrees - 180.0
    } else if raw_degrees < -90.0 {
        raw_degrees + 180.0
    } else {
        raw_degrees
    }
}

/// Bezier geometry between two anchor points.
pub fn bezier_geometry(
    source: Point,
    source_side: Side,
    target: Point,
    target_side: Side,
    path_type: PathType,
) -> EdgeGeometry {
    let curvature = path_type.curvature();
    let sc = control_point(source_side, source, target, curvature);
    let tc = control_point(target_side, target, source, curvature);

    // Point and derivative of the cubic at t = 0.5.
    let label_x = source.x * 0.125 + sc.x * 0.375 + tc.x * 0.375 + target.x * 0.125;
    let label_y = source.y * 0.125 + sc.y * 0.375 + tc.y * 0.375 + target.y * 0.125;
    let dx = 0.75 * (sc.x - source.x) + 1.5 * (tc.x - sc.x) + 0.75 * (target.x - tc.x);
    let dy = 0.75 * (sc.y - source.y) + 1.5 * (tc.y - sc.y) + 0.75 * (target.y - tc.y);
    let raw_angle = if dx == 0.0 && dy == 0.0 {
        0.0
    } else {
        dy.atan2(dx).to_degrees()
    };

    EdgeGeometry {
        path: format!(
            "M{},{} C{},{} {},{} {},{}",
            source.x, source.y, sc.x, sc.y, tc.x, tc.y, target.x, target.y
        ),
        source,
        source_control: sc,
        target_control: tc,
        target,
        label_x,
        label_y,
        label_angle: upright_angle(raw_angle),
    }
}

/// Geometry of `edge` between its endpoint nodes.
///
/// Anchors come from the edge handles; without a handle the edge leaves the
/// bottom of the source and enters the top of the target.
pub fn edge_geometry(edge: &Edge, source: &Node, target: &Node) -> EdgeGeometry {
    let source_side = edge
        .source_handle
        .as_deref()
        .and_then(anchor_side)
        .unwrap_or(Side::Bottom);
    let target_side = edge
        .target_handle
        .as_deref()
        .and_then(anchor_side)
        .unwrap_or(Side::Top);

    let (sx, sy) = NodeBounds::of(source).anchor_point(source_side);
    let (tx, ty) = NodeBounds::of(target).anchor_point(target_side);

    bezier_geometry(
        Point::new(sx, sy),
        source_side,
        Point::new(tx, ty),
        target_side,
        edge.data.path_type,
    )
}

impl EdgeGeometry {
    /// Sample the curve into `segments` straight pieces.
    pub fn polyline(&self, segments: usize) -> Vec<Point> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| {
                let t = i as f64 / segments as f64;
                let mt = 1.0 - t;
                let a = mt * mt * mt;
                let b = 3.0 * mt * mt * t;
                let c = 3.0 * mt * t * t;
                let d = t * t * t;
                Point::new(
                    a * self.source.x
                        + b * self.source_control.x
                        + c * self.target_control.x
                        + d * self.target.x,
                    a * self.source.y
                        + b * self.source_control.y
                        + c * self.target_control.y
                        + d * self.target.y,
                )
            })
            .collect()
    }
}
