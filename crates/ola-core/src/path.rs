/// Chemin 2D en coordonnées logiques, sous-chemins fermés implicitement au remplissage.
///
/// Mirrors the canvas `beginPath / moveTo / lineTo / closePath` sequence.
///
/// # Example
/// ```
/// use ola_core::path::FillPath;
/// let mut path = FillPath::new();
/// path.move_to(0.0, 10.0);
/// path.line_to(10.0, 0.0);
/// path.line_to(10.0, 10.0);
/// path.close();
/// assert_eq!(path.subpaths().len(), 1);
/// assert_eq!(path.subpaths()[0].len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FillPath {
    subpaths: Vec<Vec<(f64, f64)>>,
    /// Whether the last subpath still accepts `line_to`.
    open: bool,
}

impl FillPath {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all subpaths (equivalent of `beginPath`).
    pub fn reset(&mut self) {
        self.subpaths.clear();
        self.open = false;
    }

    /// Start a new subpath at (x, y).
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.subpaths.push(vec![(x, y)]);
        self.open = true;
    }

    /// Extend the current subpath. Without one, acts as `move_to`.
    pub fn line_to(&mut self, x: f64, y: f64) {
        match self.subpaths.last_mut() {
            Some(sub) if self.open => sub.push((x, y)),
            _ => self.move_to(x, y),
        }
    }

    /// Close the current subpath; the next `line_to` starts a fresh one.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Closed polygons making up the path.
    #[must_use]
    pub fn subpaths(&self) -> &[Vec<(f64, f64)>] {
        &self.subpaths
    }

    /// `true` when no subpath has at least three vertices.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.subpaths.iter().all(|s| s.len() < 3)
    }
}
