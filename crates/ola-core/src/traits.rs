use crate::color::Rgba;
use crate::error::CoreError;
use crate::path::FillPath;

/// Surface de dessin 2D pilotée par le renderer.
///
/// Implémenté par : `Canvas` (rasterizer logiciel RGBA).
///
/// Les coordonnées passées à [`Surface::fill_path`] sont logiques ; la surface
/// applique le facteur d'échelle courant pour atteindre le backing store.
///
/// # Example
/// ```
/// use ola_core::color::Rgba;
/// use ola_core::error::CoreError;
/// use ola_core::path::FillPath;
/// use ola_core::traits::Surface;
///
/// #[derive(Default)]
/// struct NullSurface { backing: (u32, u32), display: (f64, f64), scale: f64 }
/// impl Surface for NullSurface {
///     fn resize_backing(&mut self, w: u32, h: u32) -> Result<(), CoreError> { self.backing = (w, h); Ok(()) }
///     fn backing_size(&self) -> (u32, u32) { self.backing }
///     fn set_display_size(&mut self, w: f64, h: f64) { self.display = (w, h); }
///     fn display_size(&self) -> (f64, f64) { self.display }
///     fn set_scale(&mut self, s: f64) { self.scale = s; }
///     fn scale(&self) -> f64 { self.scale }
///     fn clear(&mut self) {}
///     fn fill_path(&mut self, _path: &FillPath, _color: Rgba) {}
/// }
/// ```
pub trait Surface {
    /// Reallocate the backing store in device pixels. Contents are discarded.
    ///
    /// # Errors
    /// Returns an error when the backing store cannot be allocated at that size.
    fn resize_backing(&mut self, width: u32, height: u32) -> Result<(), CoreError>;

    /// Backing-store size in device pixels.
    fn backing_size(&self) -> (u32, u32);

    /// Displayed (layout) size in logical pixels.
    fn set_display_size(&mut self, width: f64, height: f64);

    /// Displayed (layout) size in logical pixels.
    fn display_size(&self) -> (f64, f64);

    /// Réinitialise la transformation à une mise à l'échelle pure.
    ///
    /// Remplace la transformation précédente au lieu de la composer.
    fn set_scale(&mut self, scale: f64);

    /// Current logical → device scale factor.
    fn scale(&self) -> f64;

    /// Efface toute la surface en transparent.
    fn clear(&mut self);

    /// Fill the closed subpaths of `path` with `color` (source-over, nonzero winding).
    fn fill_path(&mut self, path: &FillPath, color: Rgba);
}

/// Identifiant d'une demande de frame en attente.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Capacité « demander le prochain tick » fournie par l'hôte.
///
/// L'hôte livre chaque demande au plus une fois, en rappelant le renderer avec
/// le handle retourné par [`FrameScheduler::request_frame`].
///
/// # Example
/// ```
/// use ola_core::traits::{FrameHandle, FrameScheduler};
///
/// #[derive(Default)]
/// struct Counter { next: u64, pending: Option<FrameHandle> }
/// impl FrameScheduler for Counter {
///     fn request_frame(&mut self) -> FrameHandle {
///         self.next += 1;
///         let h = FrameHandle(self.next);
///         self.pending = Some(h);
///         h
///     }
///     fn cancel_frame(&mut self, handle: FrameHandle) {
///         if self.pending == Some(handle) { self.pending = None; }
///     }
/// }
///
/// let mut s = Counter::default();
/// let h = s.request_frame();
/// s.cancel_frame(h);
/// assert!(s.pending.is_none());
/// ```
pub trait FrameScheduler {
    /// Schedule one frame callback.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a scheduled callback. Unknown or already delivered handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}
