/// Drawable surfaces and the in-memory frame buffer
use std::io;

use crate::geometry::Rgb;

/// An integer pixel position; may lie outside the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A 2D pixel area the renderer draws into.
///
/// Implementors only need pixel access; lines and triangles have default
/// implementations that clip to the surface, so callers may pass points far
/// outside it. Drawing outside the surface is a silent no-op.
pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    fn clear(&mut self, colour: Rgb);

    /// Sets one pixel, ignoring positions outside the surface
    fn set_pixel(&mut self, x: i32, y: i32, colour: Rgb);

    fn draw_line(&mut self, a: ScreenPoint, b: ScreenPoint, colour: Rgb) {
        let Some((a, b)) = clip_line(a, b, self.width(), self.height()) else {
            return;
        };
        bresenham(a, b, |x, y| self.set_pixel(x, y, colour));
    }

    fn draw_polygon_outline(&mut self, points: &[ScreenPoint; 3], colour: Rgb) {
        self.draw_line(points[0], points[1], colour);
        self.draw_line(points[1], points[2], colour);
        self.draw_line(points[2], points[0], colour);
    }

    fn fill_polygon(&mut self, points: &[ScreenPoint; 3], colour: Rgb) {
        let (width, height) = (self.width(), self.height());
        fill_triangle(points, width, height, |x, y| self.set_pixel(x, y, colour));
    }

    /// Hands the finished frame to the output device
    fn present(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An RGB pixel buffer in row-major order
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; width * height],
        }
    }

    /// Changes the dimensions, clearing the contents
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![Rgb::BLACK; width * height];
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }
}

impl Surface for FrameBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn clear(&mut self, colour: Rgb) {
        self.pixels.fill(colour);
    }

    fn set_pixel(&mut self, x: i32, y: i32, colour: Rgb) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.pixels[y as usize * self.width + x as usize] = colour;
    }
}

/// Clips the segment `a`-`b` to the surface rectangle (Liang-Barsky)
fn clip_line(
    a: ScreenPoint,
    b: ScreenPoint,
    width: usize,
    height: usize,
) -> Option<(ScreenPoint, ScreenPoint)> {
    if width == 0 || height == 0 {
        return None;
    }
    let (x0, y0) = (a.x as f64, a.y as f64);
    let (dx, dy) = (b.x as f64 - x0, b.y as f64 - y0);
    let (max_x, max_y) = ((width - 1) as f64, (height - 1) as f64);

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, x0), (dx, max_x - x0), (-dy, y0), (dy, max_y - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
    }

    let at = |t: f64| ScreenPoint::new((x0 + t * dx).round() as i32, (y0 + t * dy).round() as i32);
    Some((at(t0), at(t1)))
}

fn bresenham(a: ScreenPoint, b: ScreenPoint, mut plot: impl FnMut(i32, i32)) {
    let (mut x, mut y) = (a.x, a.y);
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        plot(x, y);
        if x == b.x && y == b.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Visits every pixel whose centre lies inside the triangle, within the
/// surface bounds. Works for either winding.
fn fill_triangle(points: &[ScreenPoint; 3], width: usize, height: usize, mut plot: impl FnMut(i32, i32)) {
    if width == 0 || height == 0 {
        return;
    }
    let [v0, v1, v2] = points.map(|p| (p.x as f32, p.y as f32));

    // Bounding box
    let min_x = v0.0.min(v1.0).min(v2.0).floor().max(0.0) as i32;
    let max_x = v0.0.max(v1.0).max(v2.0).ceil().min((width - 1) as f32) as i32;
    let min_y = v0.1.min(v1.1).min(v2.1).floor().max(0.0) as i32;
    let max_y = v0.1.max(v1.1).max(v2.1).ceil().min((height - 1) as f32) as i32;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = (x as f32 + 0.5, y as f32 + 0.5);
            if let Some((w0, w1, w2)) = barycentric(v0, v1, v2, p) {
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    plot(x, y);
                }
            }
        }
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: (f32, f32), v1: (f32, f32), v2: (f32, f32), p: (f32, f32)) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
