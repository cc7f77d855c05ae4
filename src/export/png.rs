//! PNG exporter for rasterising diagrams.
//!
//! Draws node boxes and edge curves on a white background. Labels are not
//! rendered (no font is bundled); the image is a layout snapshot.

use super::ExportError;
use crate::models::{DiagramDocument, LineStyle, NodeKind};
use crate::render::{EdgeGeometry, NodeBounds, Point, edge_geometry};
use image::{ImageBuffer, ImageEncoder, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut,
};
use imageproc::rect::Rect;

const PADDING: f64 = 40.0;
const MAX_DIMENSION: u32 = 8192;
const CURVE_SEGMENTS: usize = 32;
const ARROW_SIZE: f64 = 10.0;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BORDER: Rgb<u8> = Rgb([30, 30, 30]);
const EDGE: Rgb<u8> = Rgb([85, 85, 85]);
const TEXT_OUTLINE: Rgb<u8> = Rgb([200, 200, 200]);

fn fill_for(kind: NodeKind) -> Rgb<u8> {
    match kind {
        NodeKind::Process => Rgb([219, 234, 254]),
        NodeKind::Database => Rgb([220, 252, 231]),
        NodeKind::Application => Rgb([243, 232, 255]),
        NodeKind::Schema => Rgb([255, 237, 213]),
        NodeKind::Text => WHITE,
    }
}

/// Exporter for PNG image format.
pub struct PngExporter;

impl PngExporter {
    /// Rasterise `document` into PNG bytes.
    ///
    /// The canvas is sized to the bounding box of all nodes plus padding.
    pub fn export(document: &DiagramDocument) -> Result<Vec<u8>, ExportError> {
        let bounds: Vec<(NodeKind, NodeBounds)> = document
            .nodes
            .iter()
            .map(|n| (n.kind(), NodeBounds::of(n)))
            .collect();

        let (min_x, min_y, max_x, max_y) = bounds.iter().fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(x0, y0, x1, y1), (_, b)| {
                (
                    x0.min(b.x),
                    y0.min(b.y),
                    x1.max(b.x + b.width),
                    y1.max(b.y + b.height),
                )
            },
        );
        let (origin_x, origin_y, width, height) = if bounds.is_empty() {
            (0.0, 0.0, 200, 100)
        } else {
            (
                min_x - PADDING,
                min_y - PADDING,
                (max_x - min_x + 2.0 * PADDING).ceil() as u32,
                (max_y - min_y + 2.0 * PADDING).ceil() as u32,
            )
        };
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ExportError::TooLarge { width, height });
        }

        let mut img: RgbImage = ImageBuffer::from_pixel(width, height, WHITE);
        let to_canvas = |p: Point| ((p.x - origin_x) as f32, (p.y - origin_y) as f32);

        for edge in &document.edges {
            let (Some(source), Some(target)) =
                (document.node(&edge.source), document.node(&edge.target))
            else {
                continue;
            };
            let geometry = edge_geometry(edge, source, target);
            draw_curve(&mut img, &geometry, edge.line_style(), &to_canvas);
            if edge.arrow_direction().has_end() {
                draw_arrow_head(&mut img, geometry.target_control, geometry.target, &to_canvas);
            }
            if edge.arrow_direction().has_start() {
                draw_arrow_head(&mut img, geometry.source_control, geometry.source, &to_canvas);
            }
        }

        for (kind, b) in &bounds {
            let rect = Rect::at((b.x - origin_x) as i32, (b.y - origin_y) as i32)
                .of_size(b.width.max(1.0) as u32, b.height.max(1.0) as u32);
            draw_filled_rect_mut(&mut img, rect, fill_for(*kind));
            let outline = if *kind == NodeKind::Text {
                TEXT_OUTLINE
            } else {
                BORDER
            };
            draw_hollow_rect_mut(&mut img, rect, outline);
        }

        let mut buffer = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buffer)
            .write_image(img.as_raw(), width, height, image::ColorType::Rgb8)
            .map_err(|e| ExportError::Png(e.to_string()))?;

        Ok(buffer)
    }
}

fn draw_curve<F>(img: &mut RgbImage, geometry: &EdgeGeometry, style: LineStyle, to_canvas: &F)
where
    F: Fn(Point) -> (f32, f32),
{
    let points = geometry.polyline(CURVE_SEGMENTS);
    for (i, pair) in points.windows(2).enumerate() {
        // Dashed lines skip every other segment.
        if style == LineStyle::Dashed && i % 2 == 1 {
            continue;
        }
        draw_line_segment_mut(img, to_canvas(pair[0]), to_canvas(pair[1]), EDGE);
    }
}

fn draw_arrow_head<F>(img: &mut RgbImage, from: Point, tip: Point, to_canvas: &F)
where
    F: Fn(Point) -> (f32, f32),
{
    let (dx, dy) = (tip.x - from.x, tip.y - from.y);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return;
    }
    let (ux, uy) = (dx / len, dy / len);
    let base = Point::new(tip.x - ux * ARROW_SIZE, tip.y - uy * ARROW_SIZE);
    let half = ARROW_SIZE / 2.0;
    let corners = [
        tip,
        Point::new(base.x - uy * half, base.y + ux * half),
        Point::new(base.x + uy * half, base.y - ux * half),
    ];
    let polygon: Vec<imageproc::point::Point<i32>> = corners
        .iter()
        .map(|p| {
            let (x, y) = to_canvas(*p);
            imageproc::point::Point::new(x.round() as i32, y.round() as i32)
        })
        .collect();
    // draw_polygon_mut panics when the first and last points coincide.
    if polygon[0] != polygon[polygon.len() - 1] {
        draw_polygon_mut(img, &polygon, EDGE);
    }
}
