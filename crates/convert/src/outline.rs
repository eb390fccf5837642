//! Format-neutral glyph outline model.
//!
//! One [`Outline`] per glyph: absolute drawing commands plus an integer
//! bounding box in font units. TrueType extraction produces quadratic
//! curves, CFF extraction cubic ones; the converters elevate or reduce as
//! needed before handing outlines to a table builder.

use kurbo::{Affine, BezPath, Point, Shape};

/// Absolute drawing command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Quadratic Bézier: control, end.
    QuadTo(Point, Point),
    /// Cubic Bézier: control 1, control 2, end.
    CurveTo(Point, Point, Point),
    Close,
}

/// Glyph bounding box in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bbox {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

impl Bbox {
    pub const ZERO: Bbox = Bbox { x_min: 0, y_min: 0, x_max: 0, y_max: 0 };

    /// Smallest box covering `points`, rounded outward. `None` if empty.
    pub fn around(points: impl IntoIterator<Item = Point>) -> Option<Bbox> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut x_min, mut y_min, mut x_max, mut y_max) = (first.x, first.y, first.x, first.y);
        for p in iter {
            x_min = x_min.min(p.x);
            y_min = y_min.min(p.y);
            x_max = x_max.max(p.x);
            y_max = y_max.max(p.y);
        }
        Some(Bbox {
            x_min: x_min.floor() as i16,
            y_min: y_min.floor() as i16,
            x_max: x_max.ceil() as i16,
            y_max: y_max.ceil() as i16,
        })
    }

    pub fn union(self, other: Bbox) -> Bbox {
        Bbox {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

/// One glyph's outline. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub glyph_id: u16,
    pub commands: Vec<PathCommand>,
    pub bbox: Bbox,
}

impl Outline {
    /// The empty (space) glyph: no commands, all-zero bbox.
    pub fn empty(glyph_id: u16) -> Self {
        Self { glyph_id, commands: Vec::new(), bbox: Bbox::ZERO }
    }

    /// Construct, deriving the bbox from the commands.
    ///
    /// The bbox is the tight curve extent, not the control-point hull:
    /// curve conversion moves control points but never the curve, so tight
    /// extents are the only ones stable across outline formats.
    pub fn from_commands(glyph_id: u16, commands: Vec<PathCommand>) -> Self {
        let mut outline = Self { glyph_id, commands, bbox: Bbox::ZERO };
        if !outline.is_empty() {
            let rect = outline.to_bezpath().bounding_box();
            outline.bbox = Bbox {
                x_min: rect.x0.floor() as i16,
                y_min: rect.y0.floor() as i16,
                x_max: rect.x1.ceil() as i16,
                y_max: rect.y1.ceil() as i16,
            };
        }
        outline
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of drawing commands, `Close` excluded.
    pub fn drawing_command_count(&self) -> usize {
        self.commands.iter().filter(|c| !matches!(c, PathCommand::Close)).count()
    }

    /// Elevate quadratic segments to exact cubics. Every `QuadTo` becomes
    /// one `CurveTo` with control points at the 1/3 and 2/3 marks; other
    /// commands pass through untouched.
    pub fn to_cubic(&self) -> Outline {
        let mut cur = Point::ZERO;
        let mut start = Point::ZERO;
        let commands = self
            .commands
            .iter()
            .map(|cmd| match *cmd {
                PathCommand::MoveTo(p) => {
                    cur = p;
                    start = p;
                    PathCommand::MoveTo(p)
                }
                PathCommand::LineTo(p) => {
                    cur = p;
                    PathCommand::LineTo(p)
                }
                PathCommand::QuadTo(q, p) => {
                    let c1 = cur + (q - cur) * (2.0 / 3.0);
                    let c2 = p + (q - p) * (2.0 / 3.0);
                    cur = p;
                    PathCommand::CurveTo(c1, c2, p)
                }
                PathCommand::CurveTo(c1, c2, p) => {
                    cur = p;
                    PathCommand::CurveTo(c1, c2, p)
                }
                PathCommand::Close => {
                    cur = start;
                    PathCommand::Close
                }
            })
            .collect();
        Outline { glyph_id: self.glyph_id, commands, bbox: self.bbox }
    }

    /// Apply an affine transform, returning the transformed command list.
    pub fn transformed_commands(&self, transform: Affine) -> Vec<PathCommand> {
        self.commands
            .iter()
            .map(|cmd| match *cmd {
                PathCommand::MoveTo(p) => PathCommand::MoveTo(transform * p),
                PathCommand::LineTo(p) => PathCommand::LineTo(transform * p),
                PathCommand::QuadTo(q, p) => PathCommand::QuadTo(transform * q, transform * p),
                PathCommand::CurveTo(c1, c2, p) => {
                    PathCommand::CurveTo(transform * c1, transform * c2, transform * p)
                }
                PathCommand::Close => PathCommand::Close,
            })
            .collect()
    }

    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) => path.move_to(p),
                PathCommand::LineTo(p) => path.line_to(p),
                PathCommand::QuadTo(q, p) => path.quad_to(q, p),
                PathCommand::CurveTo(c1, c2, p) => path.curve_to(c1, c2, p),
                PathCommand::Close => path.close_path(),
            }
        }
        path
    }
}
