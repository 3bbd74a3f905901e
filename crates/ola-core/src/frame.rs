use crate::color::{Rgba, blend_over};
use crate::error::CoreError;

/// Largest backing-store side accepted, in device pixels.
pub const MAX_BACKING_SIDE: u32 = 16_384;

/// Buffer de pixels réutilisable (backing store du canvas).
///
/// Stocke les pixels en RGBA row-major, 4 bytes par pixel, alpha non prémultiplié.
///
/// # Example
/// ```
/// use ola_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameBuffer {
    /// Pixels RGBA, row-major, 4 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Crée un buffer transparent aux dimensions données.
    ///
    /// # Example
    /// ```
    /// use ola_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(100, 50);
    /// assert_eq!(fb.width, 100);
    /// assert_eq!(fb.height, 50);
    /// assert_eq!(fb.data.len(), 100 * 50 * 4);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Like [`FrameBuffer::new`] but refuses sides above [`MAX_BACKING_SIDE`].
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] for oversized requests.
    pub fn try_new(width: u32, height: u32) -> Result<Self, CoreError> {
        if width > MAX_BACKING_SIDE || height > MAX_BACKING_SIDE {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        Ok(Self::new(width, height))
    }

    /// `true` when the buffer holds no pixel at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Accès au pixel (x, y) → (r, g, b, a). Hors limites → transparent.
    ///
    /// # Example
    /// ```
    /// use ola_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(10, 10);
    /// assert_eq!(fb.pixel(0, 0), (0, 0, 0, 0));
    /// assert_eq!(fb.pixel(99, 0), (0, 0, 0, 0));
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        if x >= self.width || y >= self.height {
            return (0, 0, 0, 0);
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        (
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }

    /// Composite `color` over pixel (x, y) with partial `coverage`.
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba, coverage: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let dst = [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ];
        self.data[idx..idx + 4].copy_from_slice(&blend_over(dst, color, coverage));
    }

    /// Remplit tout le buffer avec une couleur (sans blending).
    ///
    /// # Example
    /// ```
    /// use ola_core::color::Rgba;
    /// use ola_core::frame::FrameBuffer;
    /// let mut fb = FrameBuffer::new(2, 2);
    /// fb.fill(Rgba::opaque(10, 20, 30));
    /// assert_eq!(fb.pixel(1, 1), (10, 20, 30, 255));
    /// fb.clear();
    /// assert_eq!(fb.pixel(1, 1), (0, 0, 0, 0));
    /// ```
    pub fn fill(&mut self, color: Rgba) {
        let px = [color.r, color.g, color.b, color.alpha_u8()];
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Efface tout en transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_backing_is_refused() {
        assert!(FrameBuffer::try_new(MAX_BACKING_SIDE, 1).is_ok());
        assert_eq!(
            FrameBuffer::try_new(MAX_BACKING_SIDE + 1, 4),
            Err(CoreError::InvalidDimensions {
                width: MAX_BACKING_SIDE + 1,
                height: 4
            })
        );
    }

    #[test]
    fn zero_area_buffer_is_empty_and_safe() {
        let mut fb = FrameBuffer::new(0, 120);
        assert!(fb.is_empty());
        assert!(fb.data.is_empty());
        fb.blend_pixel(0, 0, Rgba::opaque(255, 0, 0), 1.0);
        fb.clear();
        assert_eq!(fb.pixel(0, 0), (0, 0, 0, 0));
    }

    #[test]
    fn translucent_layers_accumulate() {
        let mut fb = FrameBuffer::new(1, 1);
        let c = Rgba::new(0, 180, 216, 0.15);
        fb.blend_pixel(0, 0, c, 1.0);
        let (_, _, _, a1) = fb.pixel(0, 0);
        fb.blend_pixel(0, 0, c, 1.0);
        let (_, _, _, a2) = fb.pixel(0, 0);
        assert!(a2 > a1);
    }
}
