//! Tube meshes and text anchors along circular arcs
//!
//! Output is flat vertex/index buffers in the same layout the spatial
//! index consumes, so generated meshes can be ray-picked directly.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;

/// Shape of one arc tube
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ArcTubeParams {
    /// Radius of the arc the tube follows
    pub radius: f32,
    /// Radius of the tube cross-section
    pub tube_radius: f32,
    /// Arc start, radians in the xz plane
    pub start_angle: f32,
    /// Arc end, radians
    pub end_angle: f32,
    /// Subdivisions along the arc
    pub arc_segments: u32,
    /// Subdivisions around the cross-section
    pub tube_segments: u32,
}

impl Default for ArcTubeParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            tube_radius: 0.1,
            start_angle: 0.0,
            end_angle: PI,
            arc_segments: 32,
            tube_segments: 8,
        }
    }
}

impl ArcTubeParams {
    pub fn validate(&self) -> Result<()> {
        if self.arc_segments == 0 || self.tube_segments == 0 {
            return Err(Error::Config(format!(
                "arc tube needs at least one segment per axis, got {}x{}",
                self.arc_segments, self.tube_segments
            )));
        }
        Ok(())
    }
}

/// One generated mesh: xyz positions and normals, uv pairs, and a u32
/// triangle list
#[derive(Clone, Debug, Default)]
pub struct TubeGeometry {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl TubeGeometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Mesh builder with reusable scratch buffers
///
/// One builder can emit many meshes; its buffers keep their capacity
/// between calls.
pub struct CurveBuilder {
    positions: Vec<f32>,
    normals: Vec<f32>,
    uvs: Vec<f32>,
    indices: Vec<u32>,
}

impl CurveBuilder {
    /// `max_vertices` is a capacity hint, not a limit
    pub fn new(max_vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(max_vertices * 3),
            normals: Vec::with_capacity(max_vertices * 3),
            uvs: Vec::with_capacity(max_vertices * 2),
            indices: Vec::with_capacity(max_vertices * 6),
        }
    }

    /// Sweep a circular cross-section along an arc in the xz plane.
    ///
    /// Rings sit at `arc_segments + 1` stations, each with
    /// `tube_segments + 1` vertices (the seam vertex is duplicated so uvs
    /// can wrap cleanly). Winding faces outward.
    pub fn arc_tube(&mut self, params: &ArcTubeParams) -> Result<TubeGeometry> {
        params.validate()?;

        self.positions.clear();
        self.normals.clear();
        self.uvs.clear();
        self.indices.clear();

        let angle_span = params.end_angle - params.start_angle;

        for i in 0..=params.arc_segments {
            let u = i as f32 / params.arc_segments as f32;
            let angle = params.start_angle + u * angle_span;

            // Ring center and arc tangent at this station.
            let cx = params.radius * angle.cos();
            let cz = params.radius * angle.sin();
            let tx = -angle.sin();
            let tz = angle.cos();

            for j in 0..=params.tube_segments {
                let v = j as f32 / params.tube_segments as f32;
                let tube_angle = v * 2.0 * PI;
                let nx = tube_angle.cos();
                let ny = tube_angle.sin();

                // Cross-section basis: radial (tz, 0, -tx) and world up.
                let normal = [nx * tz, ny, -nx * tx];
                self.positions.extend_from_slice(&[
                    cx + params.tube_radius * normal[0],
                    params.tube_radius * normal[1],
                    cz + params.tube_radius * normal[2],
                ]);
                self.normals.extend_from_slice(&normal);
                self.uvs.extend_from_slice(&[u, v]);
            }
        }

        for i in 0..params.arc_segments {
            for j in 0..params.tube_segments {
                let a = i * (params.tube_segments + 1) + j;
                let b = a + params.tube_segments + 1;
                let c = a + 1;
                let d = b + 1;
                self.indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        Ok(TubeGeometry {
            positions: self.positions.clone(),
            normals: self.normals.clone(),
            uvs: self.uvs.clone(),
            indices: self.indices.clone(),
        })
    }

    /// Anchor transforms for laying text glyphs along an arc.
    ///
    /// Emits 7 floats per character: position xyz, euler rotation xyz, and
    /// a uniform scale. Rotation faces each glyph outward from the arc
    /// center. `letter_spacing` is a fraction of a glyph step and should
    /// be non-negative.
    pub fn text_anchors(
        &self,
        text: &str,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        letter_spacing: f32,
    ) -> Vec<f32> {
        let char_count = text.chars().count();
        let mut anchors = Vec::with_capacity(char_count * 7);

        let angle_span = end_angle - start_angle;
        let step =
            angle_span / (char_count as f32 + (char_count as f32 - 1.0) * letter_spacing);

        for i in 0..char_count {
            let t = i as f32 * (1.0 + letter_spacing);
            let angle = start_angle + t * step;

            let x = radius * angle.cos();
            let z = radius * angle.sin();
            let ry = -angle + PI / 2.0;

            anchors.extend_from_slice(&[x, 0.0, z, 0.0, ry, 0.0, 1.0]);
        }

        anchors
    }
}
