/// ASCII rasterizer drawing both eye images side by side
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use ftvr_core::EyeFrame;
use nalgebra::{Matrix4, Point3, Vector3};
use std::io::Write;

use crate::scene::{Mesh, Triangle};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

const POINTER_STEPS: usize = 48;
const POINTER_SHAFT: char = '*';
const POINTER_TIP: char = 'o';

/// Column range of the character grid one eye renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: usize,
    pub width: usize,
    pub height: usize,
}

/// Renders eye frames into a shared character grid
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    overlay: Vec<Option<char>>,
    light_dir: Vector3<f32>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            overlay: vec![None; size],
            // Over the viewer's right shoulder, towards the screen
            light_dir: Vector3::new(-0.3, -0.5, 1.0).normalize(),
        }
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.overlay.fill(None);
    }

    /// Left and right halves of the grid, with one separator column between
    pub fn eye_viewports(&self) -> [Viewport; 2] {
        let half = self.width.saturating_sub(1) / 2;
        [
            Viewport {
                x: 0,
                width: half,
                height: self.height,
            },
            Viewport {
                x: half + 1,
                width: half,
                height: self.height,
            },
        ]
    }

    pub fn render_mesh(&mut self, viewport: Viewport, mesh: &Mesh, model: &Matrix4<f32>, frame: &EyeFrame) {
        let clip_from_model = frame.view_projection() * model;
        for triangle in &mesh.triangles {
            self.render_triangle(viewport, triangle, model, &clip_from_model);
        }
    }

    fn render_triangle(
        &mut self,
        viewport: Viewport,
        triangle: &Triangle,
        model: &Matrix4<f32>,
        clip_from_model: &Matrix4<f32>,
    ) {
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match project(clip_from_model, &vertex.position, viewport) {
                Some(coords) => *slot = coords,
                None => return, // Behind the eye
            }
        }

        // Shade against the light; light_dir points from the light into the scene
        let normal = model.transform_vector(&triangle.vertices[0].normal).normalize();
        let brightness = (-normal.dot(&self.light_dir)).max(0.0);

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let character = LUMINOSITY_RAMP[char_index.clamp(1, LUMINOSITY_RAMP.len() - 1)];

        self.rasterize_triangle(viewport, &screen_coords, character);
    }

    fn rasterize_triangle(&mut self, viewport: Viewport, coords: &[(f32, f32, f32); 3], character: char) {
        let [v0, v1, v2] = *coords;

        // Bounding box clipped to the viewport
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i64).max(viewport.x as i64);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i64).min((viewport.x + viewport.width) as i64 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i64).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i64).min(viewport.height as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), p) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                }
            }
        }
    }

    /// Draw the stylus as a line from its tip along its direction.
    ///
    /// The pointer is already in the eye's camera space, so only the
    /// projection is applied.
    pub fn render_pointer(&mut self, viewport: Viewport, frame: &EyeFrame, length: f32) {
        let pointer = frame.pointer;
        for step in (0..=POINTER_STEPS).rev() {
            let t = length * step as f32 / POINTER_STEPS as f32;
            let point = pointer.position + pointer.direction * t;
            let Some((x, y, _)) = project(&frame.projection, &point, viewport) else {
                continue;
            };

            let (x, y) = (x.floor() as i64, y.floor() as i64);
            let inside = x >= viewport.x as i64
                && x < (viewport.x + viewport.width) as i64
                && y >= 0
                && y < viewport.height as i64;
            if inside {
                let idx = y as usize * self.width + x as usize;
                self.overlay[idx] = Some(if step == 0 { POINTER_TIP } else { POINTER_SHAFT });
            }
        }
    }

    /// Character visible at a cell, overlay first
    pub fn cell(&self, x: usize, y: usize) -> char {
        let idx = y * self.width + x;
        self.overlay[idx].unwrap_or(self.char_buffer[idx])
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let separator = self.eye_viewports()[1].x.checked_sub(1);
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;

                let (c, color) = if Some(x) == separator {
                    ('|', Color::DarkGrey)
                } else if let Some(c) = self.overlay[idx] {
                    (c, Color::Yellow)
                } else {
                    let c = self.char_buffer[idx];
                    // Color based on character intensity
                    let color = match c {
                        ' ' | '.' | ':' => Color::DarkGrey,
                        '-' | '=' => Color::Grey,
                        '+' | '*' => Color::White,
                        '#' | '%' | '@' => Color::Cyan,
                        _ => Color::White,
                    };
                    (c, color)
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Clip-space projection into viewport cell coordinates, `None` behind the eye
fn project(clip_from_local: &Matrix4<f32>, point: &Point3<f32>, viewport: Viewport) -> Option<(f32, f32, f32)> {
    let clip = clip_from_local * point.to_homogeneous();
    if clip.w <= 1e-6 {
        return None;
    }
    let ndc = clip.xyz() / clip.w;

    let x = viewport.x as f32 + (ndc.x + 1.0) * 0.5 * viewport.width as f32;
    let y = (1.0 - ndc.y) * 0.5 * viewport.height as f32;
    Some((x, y, ndc.z))
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
