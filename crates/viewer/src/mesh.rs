//! Triangle-mesh renderer (STL)
//!
//! Accepts both encodings of the format:
//! - binary: 80-byte header, little-endian `u32` triangle count, then
//!   50-byte records (normal, three vertices, attribute word)
//! - ASCII: `solid` / `facet normal …` / `vertex …` blocks
//!
//! The parsed triangle soup is framed into a scene with an orbit/zoom
//! camera, a fixed-size ground reference grid, and one directional light.
//! No mesh repair or validation is performed beyond structural parsing.

use serde::Serialize;

use crate::RenderError;

const BINARY_HEADER_LEN: usize = 80;
const BINARY_RECORD_LEN: usize = 50;

/// Grid extents match the original workspace viewer's floor.
const GRID_LENGTH: f32 = 200.0;
const GRID_WIDTH: f32 = 200.0;

/// One facet of the surface: a unit-ish normal and three vertices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triangle {
    pub normal: [f32; 3],
    pub vertices: [[f32; 3]; 3],
}

/// Axis-aligned bounding box of the triangle soup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    fn from_triangles(triangles: &[Triangle]) -> Self {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];

        for triangle in triangles {
            for vertex in &triangle.vertices {
                for axis in 0..3 {
                    min[axis] = min[axis].min(vertex[axis]);
                    max[axis] = max[axis].max(vertex[axis]);
                }
            }
        }

        if triangles.is_empty() {
            return Aabb {
                min: [0.0; 3],
                max: [0.0; 3],
            };
        }

        Aabb { min, max }
    }

    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }

    /// Half the diagonal — the radius of the bounding sphere.
    pub fn radius(&self) -> f32 {
        let dx = self.max[0] - self.min[0];
        let dy = self.max[1] - self.min[1];
        let dz = self.max[2] - self.min[2];
        (dx * dx + dy * dy + dz * dz).sqrt() / 2.0
    }
}

/// Interactive camera orbiting a fixed target point (Y-up).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitCamera {
    pub target: [f32; 3],
    pub distance: f32,
    /// Azimuth around the Y axis, radians
    pub yaw: f32,
    /// Elevation from the horizontal plane, radians
    pub pitch: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitCamera {
    /// Frame the camera so the whole bounding sphere is comfortably in view.
    fn framing(bounds: &Aabb) -> Self {
        let radius = bounds.radius().max(1.0);
        OrbitCamera {
            target: bounds.center(),
            distance: radius * 2.5,
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: std::f32::consts::FRAC_PI_6,
            min_distance: radius * 0.25,
            max_distance: radius * 20.0,
        }
    }

    /// Rotate around the target. Pitch is clamped short of the poles so the
    /// view never flips.
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Scale the viewing distance. Factors ≤ 0 or non-finite are ignored.
    pub fn zoom(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Camera position derived from the spherical orbit parameters.
    pub fn eye(&self) -> [f32; 3] {
        let horizontal = self.distance * self.pitch.cos();
        [
            self.target[0] + horizontal * self.yaw.cos(),
            self.target[1] + self.distance * self.pitch.sin(),
            self.target[2] + horizontal * self.yaw.sin(),
        ]
    }
}

/// Fixed-size ground reference grid under the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundGrid {
    pub length: f32,
    pub width: f32,
}

impl GroundGrid {
    fn reference() -> Self {
        GroundGrid {
            length: GRID_LENGTH,
            width: GRID_WIDTH,
        }
    }
}

/// Single directional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DirectionalLight {
    pub direction: [f32; 3],
    pub intensity: f32,
}

impl DirectionalLight {
    fn overhead() -> Self {
        // Normalized (0.5, -1.0, 0.75)
        let len = (0.5f32 * 0.5 + 1.0 + 0.75 * 0.75).sqrt();
        DirectionalLight {
            direction: [0.5 / len, -1.0 / len, 0.75 / len],
            intensity: 1.0,
        }
    }
}

/// A displayable 3D scene: the triangle soup plus viewing apparatus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshScene {
    pub triangles: Vec<Triangle>,
    pub bounds: Aabb,
    pub camera: OrbitCamera,
    pub grid: GroundGrid,
    pub light: DirectionalLight,
}

impl MeshScene {
    /// Parse mesh bytes (either encoding) and frame a scene around them.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RenderError> {
        let triangles = parse_stl(bytes)?;
        Ok(Self::new(triangles))
    }

    pub fn new(triangles: Vec<Triangle>) -> Self {
        let bounds = Aabb::from_triangles(&triangles);
        MeshScene {
            camera: OrbitCamera::framing(&bounds),
            grid: GroundGrid::reference(),
            light: DirectionalLight::overhead(),
            bounds,
            triangles,
        }
    }
}

/// Parse STL bytes, auto-detecting the encoding.
pub fn parse_stl(bytes: &[u8]) -> Result<Vec<Triangle>, RenderError> {
    if is_ascii_stl(bytes) {
        parse_ascii(bytes)
    } else {
        parse_binary(bytes)
    }
}

/// Binary files may also begin with "solid", so the ASCII check requires a
/// facet keyword (or an immediate endsolid for an empty solid) in the body.
fn is_ascii_stl(bytes: &[u8]) -> bool {
    let trimmed = trim_ascii_start(bytes);
    trimmed.starts_with(b"solid")
        && (contains_subslice(bytes, b"facet") || contains_subslice(bytes, b"endsolid"))
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn parse_binary(bytes: &[u8]) -> Result<Vec<Triangle>, RenderError> {
    if bytes.len() < BINARY_HEADER_LEN + 4 {
        return Err(RenderError::MalformedMesh(
            "binary mesh shorter than its header".to_string(),
        ));
    }

    let count = u32::from_le_bytes([
        bytes[BINARY_HEADER_LEN],
        bytes[BINARY_HEADER_LEN + 1],
        bytes[BINARY_HEADER_LEN + 2],
        bytes[BINARY_HEADER_LEN + 3],
    ]) as usize;

    let expected = BINARY_HEADER_LEN + 4 + count * BINARY_RECORD_LEN;
    if bytes.len() < expected {
        return Err(RenderError::MalformedMesh(format!(
            "binary mesh truncated: {} triangles declared, {} bytes present",
            count,
            bytes.len()
        )));
    }

    let mut triangles = Vec::with_capacity(count);
    let mut offset = BINARY_HEADER_LEN + 4;
    for _ in 0..count {
        let normal = read_vec3(bytes, offset);
        let vertices = [
            read_vec3(bytes, offset + 12),
            read_vec3(bytes, offset + 24),
            read_vec3(bytes, offset + 36),
        ];
        // 2-byte attribute word at the end of each record is ignored
        triangles.push(Triangle { normal, vertices });
        offset += BINARY_RECORD_LEN;
    }

    Ok(triangles)
}

fn read_vec3(bytes: &[u8], offset: usize) -> [f32; 3] {
    [
        read_f32(bytes, offset),
        read_f32(bytes, offset + 4),
        read_f32(bytes, offset + 8),
    ]
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn parse_ascii(bytes: &[u8]) -> Result<Vec<Triangle>, RenderError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| RenderError::MalformedMesh("ASCII mesh is not UTF-8".to_string()))?;

    let mut triangles = Vec::new();
    let mut normal: Option<[f32; 3]> = None;
    let mut vertices: Vec<[f32; 3]> = Vec::with_capacity(3);

    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword {
            "solid" | "endsolid" | "outer" | "endloop" => {}
            "facet" => {
                if normal.is_some() {
                    return Err(RenderError::MalformedMesh(
                        "facet opened before previous facet ended".to_string(),
                    ));
                }
                match tokens.next() {
                    Some("normal") => {}
                    _ => {
                        return Err(RenderError::MalformedMesh(
                            "facet without normal".to_string(),
                        ))
                    }
                }
                normal = Some(parse_triplet(&mut tokens)?);
            }
            "vertex" => {
                if normal.is_none() {
                    return Err(RenderError::MalformedMesh(
                        "vertex outside a facet".to_string(),
                    ));
                }
                vertices.push(parse_triplet(&mut tokens)?);
            }
            "endfacet" => {
                let facet_normal = normal.take().ok_or_else(|| {
                    RenderError::MalformedMesh("endfacet without facet".to_string())
                })?;
                if vertices.len() != 3 {
                    return Err(RenderError::MalformedMesh(format!(
                        "facet has {} vertices, expected 3",
                        vertices.len()
                    )));
                }
                triangles.push(Triangle {
                    normal: facet_normal,
                    vertices: [vertices[0], vertices[1], vertices[2]],
                });
                vertices.clear();
            }
            other => {
                return Err(RenderError::MalformedMesh(format!(
                    "unexpected token: {}",
                    other
                )));
            }
        }
    }

    if normal.is_some() {
        return Err(RenderError::MalformedMesh(
            "unterminated facet at end of file".to_string(),
        ));
    }

    Ok(triangles)
}

fn parse_triplet<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
) -> Result<[f32; 3], RenderError> {
    let mut out = [0.0f32; 3];
    for slot in &mut out {
        let token = tokens
            .next()
            .ok_or_else(|| RenderError::MalformedMesh("missing coordinate".to_string()))?;
        *slot = token
            .parse()
            .map_err(|_| RenderError::MalformedMesh(format!("bad coordinate: {}", token)))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a binary STL with the given triangles.
    fn binary_stl(triangles: &[Triangle]) -> Vec<u8> {
        let mut bytes = vec![0u8; BINARY_HEADER_LEN];
        bytes.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for t in triangles {
            for c in t.normal {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
            for v in t.vertices {
                for c in v {
                    bytes.extend_from_slice(&c.to_le_bytes());
                }
            }
            bytes.extend_from_slice(&0u16.to_le_bytes());
        }
        bytes
    }

    fn unit_triangle() -> Triangle {
        Triangle {
            normal: [0.0, 0.0, 1.0],
            vertices: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        }
    }

    const ASCII_SAMPLE: &str = "\
solid part
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid part
";

    #[test]
    fn test_parse_binary_roundtrip() {
        let expected = vec![unit_triangle()];
        let bytes = binary_stl(&expected);
        let parsed = parse_stl(&bytes).unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_ascii_sample() {
        let parsed = parse_stl(ASCII_SAMPLE.as_bytes()).unwrap();
        assert_eq!(parsed, vec![unit_triangle()]);
    }

    #[test]
    fn test_binary_truncated_rejected() {
        let mut bytes = binary_stl(&[unit_triangle()]);
        bytes.truncate(bytes.len() - 10);
        let result = parse_stl(&bytes);
        assert!(matches!(result, Err(RenderError::MalformedMesh(_))));
    }

    #[test]
    fn test_binary_too_short_rejected() {
        let result = parse_stl(&[0u8; 40]);
        assert!(matches!(result, Err(RenderError::MalformedMesh(_))));
    }

    #[test]
    fn test_binary_zero_triangles() {
        let bytes = binary_stl(&[]);
        let parsed = parse_stl(&bytes).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_ascii_empty_solid() {
        let parsed = parse_stl(b"solid empty\nendsolid empty\n").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_ascii_wrong_vertex_count_rejected() {
        let text = "\
solid bad
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
    endloop
  endfacet
endsolid bad
";
        let result = parse_stl(text.as_bytes());
        assert!(matches!(result, Err(RenderError::MalformedMesh(_))));
    }

    #[test]
    fn test_ascii_bad_coordinate_rejected() {
        let text = "solid bad\nfacet normal 0 0 x\nendfacet\nendsolid bad\n";
        let result = parse_stl(text.as_bytes());
        assert!(matches!(result, Err(RenderError::MalformedMesh(_))));
    }

    #[test]
    fn test_ascii_unterminated_facet_rejected() {
        let text = "solid bad\nfacet normal 0 0 1\nvertex 0 0 0\n";
        let result = parse_stl(text.as_bytes());
        assert!(matches!(result, Err(RenderError::MalformedMesh(_))));
    }

    #[test]
    fn test_binary_starting_with_solid_is_not_ascii() {
        // A binary file whose header happens to start with "solid" but has
        // no facet keyword anywhere must take the binary path.
        let mut bytes = binary_stl(&[unit_triangle()]);
        bytes[..5].copy_from_slice(b"solid");
        let parsed = parse_stl(&bytes).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_scene_framing() {
        let scene = MeshScene::new(vec![unit_triangle()]);

        assert_eq!(scene.bounds.min, [0.0, 0.0, 0.0]);
        assert_eq!(scene.bounds.max, [1.0, 1.0, 0.0]);
        assert_eq!(scene.camera.target, scene.bounds.center());
        assert!(scene.camera.distance > 0.0);
        assert_eq!(scene.grid.length, 200.0);
        assert_eq!(scene.grid.width, 200.0);
    }

    #[test]
    fn test_empty_scene_has_degenerate_bounds() {
        let scene = MeshScene::new(Vec::new());
        assert_eq!(scene.bounds.min, [0.0; 3]);
        assert_eq!(scene.bounds.max, [0.0; 3]);
        // Camera still gets a usable distance
        assert!(scene.camera.distance > 0.0);
    }

    #[test]
    fn test_camera_orbit_wraps_yaw_and_clamps_pitch() {
        let mut camera = OrbitCamera::framing(&Aabb {
            min: [0.0; 3],
            max: [2.0; 3],
        });

        camera.orbit(std::f32::consts::TAU * 3.0, 0.0);
        assert!(camera.yaw >= 0.0 && camera.yaw < std::f32::consts::TAU);

        camera.orbit(0.0, 10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);

        camera.orbit(0.0, -20.0);
        assert!(camera.pitch > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_camera_zoom_clamped() {
        let mut camera = OrbitCamera::framing(&Aabb {
            min: [0.0; 3],
            max: [2.0; 3],
        });

        camera.zoom(0.0001);
        assert_eq!(camera.distance, camera.min_distance);

        camera.zoom(1.0e9);
        assert_eq!(camera.distance, camera.max_distance);

        // Non-positive and non-finite factors are ignored
        let before = camera.distance;
        camera.zoom(-1.0);
        camera.zoom(f32::NAN);
        assert_eq!(camera.distance, before);
    }

    #[test]
    fn test_camera_eye_distance_matches() {
        let camera = OrbitCamera::framing(&Aabb {
            min: [-1.0; 3],
            max: [1.0; 3],
        });
        let eye = camera.eye();
        let dx = eye[0] - camera.target[0];
        let dy = eye[1] - camera.target[1];
        let dz = eye[2] - camera.target[2];
        let measured = (dx * dx + dy * dy + dz * dz).sqrt();
        assert!((measured - camera.distance).abs() < 1e-3);
    }

    #[test]
    fn test_light_direction_normalized() {
        let light = DirectionalLight::overhead();
        let [x, y, z] = light.direction;
        let len = (x * x + y * y + z * z).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
    }
}
