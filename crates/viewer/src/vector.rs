//! 2D vector renderer (DXF)
//!
//! Parses the restricted entity set `LINE`, `CIRCLE`, `ARC` from the
//! ENTITIES section and draws them into canvas space:
//!
//! 1. bounding box over every supported entity (`CIRCLE`/`ARC` extremes
//!    are center ± radius)
//! 2. `scale = min(canvas_w/width, canvas_h/height) * 0.8`
//! 3. offsets chosen so the box is centered in the canvas
//! 4. each point maps to `(x*scale + ox, canvas_h - (y*scale + oy))` —
//!    CAD space is Y-up, canvas space is Y-down
//!
//! Entities outside the supported set are silently skipped.

use std::collections::HashMap;

use serde::Serialize;

use crate::{Canvas, RenderError};

/// Fit margin: 0.8 leaves a 10% margin on all sides.
const FIT_MARGIN: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A supported CAD entity in drawing (Y-up) coordinates.
/// Arc angles are degrees, counter-clockwise from the positive X axis.
#[derive(Debug, Clone, PartialEq)]
pub enum DxfEntity {
    Line {
        start: Point,
        end: Point,
    },
    Circle {
        center: Point,
        radius: f64,
    },
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
}

/// Drawing-space bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    fn of(entities: &[DxfEntity]) -> Option<Self> {
        if entities.is_empty() {
            return None;
        }

        let mut b = Bounds {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        };

        for entity in entities {
            match entity {
                DxfEntity::Line { start, end } => {
                    b.include(start.x, start.y);
                    b.include(end.x, end.y);
                }
                DxfEntity::Circle { center, radius }
                | DxfEntity::Arc { center, radius, .. } => {
                    b.include(center.x - radius, center.y - radius);
                    b.include(center.x + radius, center.y + radius);
                }
            }
        }

        Some(b)
    }

    fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Drawing → canvas mapping: uniform scale, centering offsets, Y flip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    canvas_height: f64,
}

impl FitTransform {
    fn new(bounds: &Bounds, canvas: Canvas) -> Self {
        let width = bounds.width();
        let height = bounds.height();

        // Degenerate extents divide to infinity; min() discards them unless
        // the drawing is a single point, in which case scale falls back to 1.
        let mut scale = (canvas.width / width).min(canvas.height / height) * FIT_MARGIN;
        if !scale.is_finite() {
            scale = 1.0;
        }

        FitTransform {
            scale,
            offset_x: (canvas.width - width * scale) / 2.0 - bounds.min_x * scale,
            offset_y: (canvas.height - height * scale) / 2.0 - bounds.min_y * scale,
            canvas_height: canvas.height,
        }
    }

    fn identity(canvas: Canvas) -> Self {
        FitTransform {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            canvas_height: canvas.height,
        }
    }

    /// Map a drawing-space point into canvas space.
    pub fn apply(&self, p: Point) -> Point {
        Point {
            x: p.x * self.scale + self.offset_x,
            y: self.canvas_height - (p.y * self.scale + self.offset_y),
        }
    }
}

/// A canvas-space stroke. Arc angles are radians in canvas orientation
/// (already negated for the Y flip).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Stroke {
    Segment {
        from: Point,
        to: Point,
    },
    Circle {
        center: Point,
        radius: f64,
    },
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    },
}

/// A displayable 2D scene: fitted strokes in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorScene {
    pub canvas: Canvas,
    pub transform: FitTransform,
    pub strokes: Vec<Stroke>,
}

impl VectorScene {
    /// Parse DXF text and fit the supported entities into the canvas.
    pub fn from_text(text: &str, canvas: Canvas) -> Result<Self, RenderError> {
        let entities = parse_dxf(text)?;
        Ok(Self::from_entities(&entities, canvas))
    }

    pub fn from_entities(entities: &[DxfEntity], canvas: Canvas) -> Self {
        let transform = match Bounds::of(entities) {
            Some(bounds) => FitTransform::new(&bounds, canvas),
            None => FitTransform::identity(canvas),
        };

        let strokes = entities
            .iter()
            .map(|entity| match entity {
                DxfEntity::Line { start, end } => Stroke::Segment {
                    from: transform.apply(*start),
                    to: transform.apply(*end),
                },
                DxfEntity::Circle { center, radius } => Stroke::Circle {
                    center: transform.apply(*center),
                    radius: radius * transform.scale,
                },
                DxfEntity::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => Stroke::Arc {
                    center: transform.apply(*center),
                    radius: radius * transform.scale,
                    // The Y flip mirrors angles, so the canvas arc runs from
                    // -end to -start, anticlockwise.
                    start_angle: -end_angle.to_radians(),
                    end_angle: -start_angle.to_radians(),
                    anticlockwise: true,
                },
            })
            .collect();

        VectorScene {
            canvas,
            transform,
            strokes,
        }
    }
}

/// Group codes carrying coordinates for the supported entities.
const NUMERIC_CODES: [i32; 7] = [10, 20, 11, 21, 40, 50, 51];

/// Parse the ENTITIES section of a DXF document into supported entities.
///
/// The format is a flat sequence of (group code, value) line pairs. A pair
/// with code 0 starts a new entity (or ends the section); field pairs are
/// attached to the entity most recently started.
pub fn parse_dxf(text: &str) -> Result<Vec<DxfEntity>, RenderError> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() % 2 != 0 {
        // Tolerate a single trailing blank line, nothing else
        if !lines.last().map(|l| l.trim().is_empty()).unwrap_or(true) {
            return Err(RenderError::MalformedDrawing(
                "dangling group code at end of file".to_string(),
            ));
        }
    }

    let mut entities = Vec::new();
    let mut in_entities = false;
    let mut pending: Option<(String, HashMap<i32, f64>)> = None;

    for pair in lines.chunks_exact(2) {
        let code: i32 = pair[0].trim().parse().map_err(|_| {
            RenderError::MalformedDrawing(format!("invalid group code: {}", pair[0].trim()))
        })?;
        let value = pair[1].trim();

        if !in_entities {
            if code == 2 && value == "ENTITIES" {
                in_entities = true;
            }
            continue;
        }

        match code {
            0 => {
                if let Some((name, fields)) = pending.take() {
                    if let Some(entity) = finalize_entity(&name, &fields)? {
                        entities.push(entity);
                    }
                }
                if value == "ENDSEC" {
                    in_entities = false;
                } else {
                    pending = Some((value.to_string(), HashMap::new()));
                }
            }
            code if NUMERIC_CODES.contains(&code) => {
                if let Some((_, fields)) = pending.as_mut() {
                    let parsed: f64 = value.parse().map_err(|_| {
                        RenderError::MalformedDrawing(format!(
                            "invalid numeric value for code {}: {}",
                            code, value
                        ))
                    })?;
                    fields.insert(code, parsed);
                }
            }
            // Every other group code (layer, color, handle, …) is irrelevant here
            _ => {}
        }
    }

    // Files that end without ENDSEC still yield their parsed entities
    if let Some((name, fields)) = pending.take() {
        if let Some(entity) = finalize_entity(&name, &fields)? {
            entities.push(entity);
        }
    }

    Ok(entities)
}

/// Build a supported entity from collected fields; unsupported entity types
/// return `None` and are skipped.
fn finalize_entity(
    name: &str,
    fields: &HashMap<i32, f64>,
) -> Result<Option<DxfEntity>, RenderError> {
    let field = |code: i32| -> Result<f64, RenderError> {
        fields.get(&code).copied().ok_or_else(|| {
            RenderError::MalformedDrawing(format!("{} entity missing group code {}", name, code))
        })
    };

    match name {
        "LINE" => Ok(Some(DxfEntity::Line {
            start: Point {
                x: field(10)?,
                y: field(20)?,
            },
            end: Point {
                x: field(11)?,
                y: field(21)?,
            },
        })),
        "CIRCLE" => Ok(Some(DxfEntity::Circle {
            center: Point {
                x: field(10)?,
                y: field(20)?,
            },
            radius: field(40)?,
        })),
        "ARC" => Ok(Some(DxfEntity::Arc {
            center: Point {
                x: field(10)?,
                y: field(20)?,
            },
            radius: field(40)?,
            start_angle: field(50)?,
            end_angle: field(51)?,
        })),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dxf(entities_body: &str) -> String {
        format!(
            "  0\nSECTION\n  2\nENTITIES\n{}  0\nENDSEC\n  0\nEOF\n",
            entities_body
        )
    }

    const LINE_0_0_100_50: &str =
        "  0\nLINE\n 10\n0.0\n 20\n0.0\n 11\n100.0\n 21\n50.0\n";

    #[test]
    fn test_parse_line() {
        let entities = parse_dxf(&dxf(LINE_0_0_100_50)).unwrap();
        assert_eq!(
            entities,
            vec![DxfEntity::Line {
                start: Point { x: 0.0, y: 0.0 },
                end: Point { x: 100.0, y: 50.0 },
            }]
        );
    }

    #[test]
    fn test_parse_circle_and_arc() {
        let body = "  0\nCIRCLE\n 10\n5.0\n 20\n-3.0\n 40\n2.5\n\
                      0\nARC\n 10\n0.0\n 20\n0.0\n 40\n4.0\n 50\n0.0\n 51\n90.0\n";
        let entities = parse_dxf(&dxf(body)).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(
            entities[0],
            DxfEntity::Circle {
                center: Point { x: 5.0, y: -3.0 },
                radius: 2.5,
            }
        );
        assert_eq!(
            entities[1],
            DxfEntity::Arc {
                center: Point { x: 0.0, y: 0.0 },
                radius: 4.0,
                start_angle: 0.0,
                end_angle: 90.0,
            }
        );
    }

    #[test]
    fn test_unsupported_entities_silently_skipped() {
        let body = format!(
            "  0\nLWPOLYLINE\n 90\n4\n 10\n0.0\n 20\n0.0\n{}",
            LINE_0_0_100_50
        );
        let entities = parse_dxf(&dxf(&body)).unwrap();
        // Only the LINE survives; the polyline is dropped without error
        assert_eq!(entities.len(), 1);
        assert!(matches!(entities[0], DxfEntity::Line { .. }));
    }

    #[test]
    fn test_entities_outside_section_ignored() {
        let text = "  0\nSECTION\n  2\nHEADER\n  0\nLINE\n 10\n0.0\n 20\n0.0\n 11\n1.0\n 21\n1.0\n  0\nENDSEC\n  0\nEOF\n";
        let entities = parse_dxf(text).unwrap();
        assert!(entities.is_empty());
    }

    #[test]
    fn test_line_missing_endpoint_rejected() {
        let body = "  0\nLINE\n 10\n0.0\n 20\n0.0\n";
        let result = parse_dxf(&dxf(body));
        assert!(matches!(result, Err(RenderError::MalformedDrawing(_))));
    }

    #[test]
    fn test_non_numeric_coordinate_rejected() {
        let body = "  0\nLINE\n 10\nabc\n 20\n0.0\n 11\n1.0\n 21\n1.0\n";
        let result = parse_dxf(&dxf(body));
        assert!(matches!(result, Err(RenderError::MalformedDrawing(_))));
    }

    #[test]
    fn test_invalid_group_code_rejected() {
        let text = "  0\nSECTION\n  2\nENTITIES\nnot-a-code\nLINE\n";
        let result = parse_dxf(text);
        assert!(matches!(result, Err(RenderError::MalformedDrawing(_))));
    }

    #[test]
    fn test_bounds_include_circle_radius() {
        let entities = vec![DxfEntity::Circle {
            center: Point { x: 10.0, y: 20.0 },
            radius: 5.0,
        }];
        let b = Bounds::of(&entities).unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (5.0, 15.0, 15.0, 25.0));
    }

    #[test]
    fn test_bounds_include_arc_radius() {
        // Arc extremes use center ± radius regardless of sweep
        let entities = vec![DxfEntity::Arc {
            center: Point { x: 0.0, y: 0.0 },
            radius: 4.0,
            start_angle: 0.0,
            end_angle: 90.0,
        }];
        let b = Bounds::of(&entities).unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (-4.0, -4.0, 4.0, 4.0));
    }

    /// A LINE from (0,0) to (100,50) into an 800×600 canvas:
    /// scale = min(800/100, 600/50) * 0.8 = min(8, 12) * 0.8 = 6.4,
    /// drawn x-extent 100 * 6.4 = 640, centered with margin on both axes.
    #[test]
    fn test_line_fit_into_canvas() {
        let scene = VectorScene::from_text(&dxf(LINE_0_0_100_50), Canvas::default()).unwrap();

        assert!((scene.transform.scale - 6.4).abs() < 1e-9);
        assert_eq!(scene.strokes.len(), 1);

        let Stroke::Segment { from, to } = &scene.strokes[0] else {
            panic!("expected a segment");
        };

        // Drawn x-extent is 640 canvas units
        assert!(((to.x - from.x).abs() - 640.0).abs() < 1e-9);
        // Centered horizontally: 80 units of margin each side
        assert!((from.x - 80.0).abs() < 1e-9);
        assert!((to.x - 720.0).abs() < 1e-9);
        // Centered vertically with the Y axis flipped:
        // (0,0) lands low on the canvas, (100,50) lands high
        assert!((from.y - 460.0).abs() < 1e-9);
        assert!((to.y - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_circle_stroke_scaled_radius() {
        let body = "  0\nCIRCLE\n 10\n0.0\n 20\n0.0\n 40\n10.0\n";
        let scene = VectorScene::from_text(&dxf(body), Canvas::default()).unwrap();

        // Bounds are 20×20, so scale = min(800/20, 600/20)*0.8 = 24
        assert!((scene.transform.scale - 24.0).abs() < 1e-9);
        let Stroke::Circle { center, radius } = &scene.strokes[0] else {
            panic!("expected a circle");
        };
        assert!((radius - 240.0).abs() < 1e-9);
        // Circle centered in the canvas
        assert!((center.x - 400.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_angles_negated_for_y_flip() {
        let body = "  0\nARC\n 10\n0.0\n 20\n0.0\n 40\n4.0\n 50\n0.0\n 51\n90.0\n";
        let scene = VectorScene::from_text(&dxf(body), Canvas::default()).unwrap();

        let Stroke::Arc {
            start_angle,
            end_angle,
            anticlockwise,
            ..
        } = &scene.strokes[0]
        else {
            panic!("expected an arc");
        };

        assert!((start_angle + std::f64::consts::FRAC_PI_2).abs() < 1e-9);
        assert!(end_angle.abs() < 1e-9);
        assert!(*anticlockwise);
    }

    #[test]
    fn test_empty_entities_render_empty_scene() {
        let scene = VectorScene::from_text(&dxf(""), Canvas::default()).unwrap();
        assert!(scene.strokes.is_empty());
        assert_eq!(scene.transform.scale, 1.0);
    }

    #[test]
    fn test_degenerate_single_point_does_not_explode() {
        // Zero-extent line: both fit divisions are infinite
        let body = "  0\nLINE\n 10\n5.0\n 20\n5.0\n 11\n5.0\n 21\n5.0\n";
        let scene = VectorScene::from_text(&dxf(body), Canvas::default()).unwrap();
        assert!(scene.transform.scale.is_finite());
    }

    #[test]
    fn test_vertical_line_uses_horizontal_fit() {
        // width = 0 → canvas_w/width = inf, min() picks the height ratio
        let body = "  0\nLINE\n 10\n0.0\n 20\n0.0\n 11\n0.0\n 21\n100.0\n";
        let scene = VectorScene::from_text(&dxf(body), Canvas::default()).unwrap();
        assert!((scene.transform.scale - 4.8).abs() < 1e-9); // 600/100 * 0.8
    }
}
