use ola_core::color::{Rgba, blend_over};
use ola_core::error::CoreError;
use ola_core::frame::FrameBuffer;
use ola_core::path::FillPath;
use ola_core::traits::Surface;
use rayon::prelude::*;

/// Vertical sub-scanlines per device row (anti-aliasing).
const SUBSAMPLES: usize = 4;

/// One non-horizontal polygon edge in device coordinates.
#[derive(Clone, Copy, Debug)]
struct Edge {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    /// +1 downward, -1 upward.
    winding: i32,
}

impl Edge {
    #[inline(always)]
    fn crossing(&self, sy: f64) -> Option<(f64, i32)> {
        let (lo, hi) = if self.y0 < self.y1 {
            (self.y0, self.y1)
        } else {
            (self.y1, self.y0)
        };
        if sy < lo || sy >= hi {
            return None;
        }
        let x = self.x0 + (sy - self.y0) * (self.x1 - self.x0) / (self.y1 - self.y0);
        Some((x, self.winding))
    }
}

/// Canvas 2D logiciel : backing store RGBA + transformation d'échelle.
///
/// Remplissage de polygones par scanlines (règle nonzero), 4 sous-lignes par
/// pixel, lignes traitées en parallèle avec rayon.
///
/// # Example
/// ```
/// use ola_core::color::Rgba;
/// use ola_core::path::FillPath;
/// use ola_core::traits::Surface;
/// use ola_render::canvas::Canvas;
///
/// let mut canvas = Canvas::new();
/// canvas.resize_backing(4, 4).unwrap();
/// let mut path = FillPath::new();
/// path.move_to(0.0, 0.0);
/// path.line_to(4.0, 0.0);
/// path.line_to(4.0, 4.0);
/// path.line_to(0.0, 4.0);
/// path.close();
/// canvas.fill_path(&path, Rgba::opaque(255, 0, 0));
/// assert_eq!(canvas.frame().pixel(2, 2), (255, 0, 0, 255));
/// ```
#[derive(Debug)]
pub struct Canvas {
    buffer: FrameBuffer,
    display: (f64, f64),
    scale: f64,
    /// Edge scratch, reused across fills.
    edges: Vec<Edge>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Empty 0×0 canvas with identity transform.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: FrameBuffer::new(0, 0),
            display: (0.0, 0.0),
            scale: 1.0,
            edges: Vec::new(),
        }
    }

    /// Backing-store pixels.
    #[must_use]
    pub fn frame(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Copy of the backing store composited over an opaque page colour.
    ///
    /// # Example
    /// ```
    /// use ola_core::color::Rgba;
    /// use ola_core::traits::Surface;
    /// use ola_render::canvas::Canvas;
    /// let mut canvas = Canvas::new();
    /// canvas.resize_backing(2, 1).unwrap();
    /// let flat = canvas.flatten(Rgba::opaque(10, 10, 10));
    /// assert_eq!(flat.pixel(1, 0), (10, 10, 10, 255));
    /// ```
    #[must_use]
    pub fn flatten(&self, background: Rgba) -> FrameBuffer {
        let mut out = FrameBuffer::new(self.buffer.width, self.buffer.height);
        out.fill(background);
        out.data
            .par_chunks_exact_mut(4)
            .zip(self.buffer.data.par_chunks_exact(4))
            .for_each(|(dst, src)| {
                let color = Rgba::new(src[0], src[1], src[2], f32::from(src[3]) / 255.0);
                let px = blend_over([dst[0], dst[1], dst[2], dst[3]], color, 1.0);
                dst.copy_from_slice(&px);
            });
        out
    }

    fn collect_edges(&mut self, path: &FillPath) {
        self.edges.clear();
        let s = self.scale;
        for sub in path.subpaths() {
            if sub.len() < 3 {
                continue;
            }
            let closing = sub.last().copied().zip(sub.first().copied());
            let pairs = sub.windows(2).map(|w| (w[0], w[1])).chain(closing);
            for ((ax, ay), (bx, by)) in pairs {
                let (x0, y0, x1, y1) = (ax * s, ay * s, bx * s, by * s);
                if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
                    continue;
                }
                if (y1 - y0).abs() < f64::EPSILON {
                    continue;
                }
                self.edges.push(Edge {
                    x0,
                    y0,
                    x1,
                    y1,
                    winding: if y1 > y0 { 1 } else { -1 },
                });
            }
        }
    }
}

/// Add a horizontal span `[xa, xb)` with weight `w` to a coverage row.
#[inline(always)]
fn accumulate_span(coverage: &mut [f32], xa: f64, xb: f64, w: f32) {
    let width = coverage.len() as f64;
    let xa = xa.clamp(0.0, width);
    let xb = xb.clamp(0.0, width);
    if xb <= xa {
        return;
    }
    let ia = xa.floor() as usize;
    let ib = xb.floor() as usize;
    if ia == ib {
        coverage[ia] += (xb - xa) as f32 * w;
        return;
    }
    coverage[ia] += ((ia + 1) as f64 - xa) as f32 * w;
    for c in &mut coverage[ia + 1..ib] {
        *c += w;
    }
    if ib < coverage.len() {
        coverage[ib] += (xb - ib as f64) as f32 * w;
    }
}

impl Surface for Canvas {
    fn resize_backing(&mut self, width: u32, height: u32) -> Result<(), CoreError> {
        self.buffer = FrameBuffer::try_new(width, height)?;
        Ok(())
    }

    fn backing_size(&self) -> (u32, u32) {
        (self.buffer.width, self.buffer.height)
    }

    fn set_display_size(&mut self, width: f64, height: f64) {
        self.display = (width, height);
    }

    fn display_size(&self) -> (f64, f64) {
        self.display
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn fill_path(&mut self, path: &FillPath, color: Rgba) {
        if self.buffer.is_empty() || color.a <= 0.0 || path.is_degenerate() {
            return;
        }
        self.collect_edges(path);
        if self.edges.is_empty() {
            return;
        }

        let (min_y, max_y) = self
            .edges
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
                (lo.min(e.y0).min(e.y1), hi.max(e.y0).max(e.y1))
            });
        let height = self.buffer.height as usize;
        let row_start = (min_y.floor().max(0.0) as usize).min(height);
        let row_end = (max_y.ceil().max(0.0) as usize).min(height);
        if row_start >= row_end {
            return;
        }

        let width = self.buffer.width as usize;
        let stride = width * 4;
        let edges = &self.edges;
        let weight = 1.0 / SUBSAMPLES as f32;

        self.buffer.data[row_start * stride..row_end * stride]
            .par_chunks_exact_mut(stride)
            .enumerate()
            .for_each_init(
                || (vec![0f32; width], Vec::<(f64, i32)>::new()),
                |(coverage, crossings), (i, row)| {
                    let y = (row_start + i) as f64;
                    coverage.fill(0.0);
                    for k in 0..SUBSAMPLES {
                        let sy = y + (k as f64 + 0.5) / SUBSAMPLES as f64;
                        crossings.clear();
                        crossings.extend(edges.iter().filter_map(|e| e.crossing(sy)));
                        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

                        let mut winding = 0;
                        for pair in crossings.windows(2) {
                            winding += pair[0].1;
                            if winding != 0 {
                                accumulate_span(coverage, pair[0].0, pair[1].0, weight);
                            }
                        }
                    }
                    for (x, &c) in coverage.iter().enumerate() {
                        if c <= 0.0 {
                            continue;
                        }
                        let idx = x * 4;
                        let dst = [row[idx], row[idx + 1], row[idx + 2], row[idx + 3]];
                        row[idx..idx + 4].copy_from_slice(&blend_over(dst, color, c.min(1.0)));
                    }
                },
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> FillPath {
        let mut p = FillPath::new();
        p.move_to(x0, y0);
        p.line_to(x1, y0);
        p.line_to(x1, y1);
        p.line_to(x0, y1);
        p.close();
        p
    }

    #[test]
    fn fill_respects_scale() {
        let mut canvas = Canvas::new();
        canvas.resize_backing(8, 8).unwrap();
        canvas.set_scale(2.0);
        canvas.fill_path(&rect(0.0, 0.0, 2.0, 2.0), Rgba::opaque(0, 255, 0));
        assert_eq!(canvas.frame().pixel(3, 3), (0, 255, 0, 255));
        assert_eq!(canvas.frame().pixel(4, 4), (0, 0, 0, 0));
    }

    #[test]
    fn half_covered_pixel_gets_partial_alpha() {
        let mut canvas = Canvas::new();
        canvas.resize_backing(4, 1).unwrap();
        canvas.fill_path(&rect(0.0, 0.0, 1.5, 1.0), Rgba::opaque(255, 255, 255));
        let (_, _, _, a) = canvas.frame().pixel(1, 0);
        assert!((i16::from(a) - 128).abs() <= 1, "alpha {a}");
        assert_eq!(canvas.frame().pixel(2, 0).3, 0);
    }

    #[test]
    fn overlapping_translucent_fills_composite() {
        let mut canvas = Canvas::new();
        canvas.resize_backing(4, 4).unwrap();
        let c = Rgba::new(255, 255, 255, 0.5);
        canvas.fill_path(&rect(0.0, 0.0, 4.0, 4.0), c);
        let single = canvas.frame().pixel(1, 1).3;
        canvas.fill_path(&rect(0.0, 0.0, 4.0, 4.0), c);
        let double = canvas.frame().pixel(1, 1).3;
        assert_eq!(single, 128);
        // 0.5 + 0.5 × (1 − 0.5) = 0.75
        assert!((190..=192).contains(&double), "alpha {double}");
    }

    #[test]
    fn shapes_outside_backing_are_clipped() {
        let mut canvas = Canvas::new();
        canvas.resize_backing(4, 4).unwrap();
        canvas.fill_path(&rect(-10.0, -10.0, 20.0, 20.0), Rgba::opaque(1, 2, 3));
        assert!(canvas.frame().data.chunks_exact(4).all(|p| p == [1, 2, 3, 255]));
        canvas.clear();
        canvas.fill_path(&rect(10.0, 10.0, 20.0, 20.0), Rgba::opaque(1, 2, 3));
        assert!(canvas.frame().data.iter().all(|&b| b == 0));
    }

    #[test]
    fn open_line_fills_nothing() {
        let mut canvas = Canvas::new();
        canvas.resize_backing(4, 4).unwrap();
        let mut p = FillPath::new();
        p.move_to(0.0, 0.0);
        p.line_to(4.0, 4.0);
        canvas.fill_path(&p, Rgba::opaque(9, 9, 9));
        assert!(canvas.frame().data.iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_sized_canvas_ignores_fills() {
        let mut canvas = Canvas::new();
        canvas.fill_path(&rect(0.0, 0.0, 5.0, 5.0), Rgba::opaque(9, 9, 9));
        assert_eq!(canvas.backing_size(), (0, 0));
    }

    #[test]
    fn oversized_backing_keeps_previous_store() {
        let mut canvas = Canvas::new();
        canvas.resize_backing(3, 3).unwrap();
        assert!(canvas.resize_backing(100_000, 3).is_err());
        assert_eq!(canvas.backing_size(), (3, 3));
    }

    #[test]
    fn triangle_fill_leaves_outside_untouched() {
        let mut canvas = Canvas::new();
        canvas.resize_backing(10, 10).unwrap();
        let mut p = FillPath::new();
        p.move_to(0.0, 10.0);
        p.line_to(10.0, 0.0);
        p.line_to(10.0, 10.0);
        p.close();
        canvas.fill_path(&p, Rgba::opaque(200, 0, 0));
        assert_eq!(canvas.frame().pixel(8, 8), (200, 0, 0, 255));
        assert_eq!(canvas.frame().pixel(1, 1), (0, 0, 0, 0));
    }
}
