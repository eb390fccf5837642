//! glyf/loca assembly from outlines.
//!
//! Cubic outlines are reduced to quadratic splines first (TrueType cannot
//! carry cubics), then laid out as TrueType point lists: one on-curve point
//! per line/move endpoint, an off-curve point per quadratic control.
//! `GlyfLocaBuilder` handles per-glyph padding, the trailing loca entry,
//! and the short/long loca format decision, which the caller must mirror
//! into `head.indexToLocFormat`.

use kurbo::{BezPath, CubicBez, PathEl, Point, cubics_to_quadratic_splines};
use read_fonts::tables::glyf::CurvePoint;
use write_fonts::{
    dump_table,
    tables::glyf::{Bbox as GlyfBbox, Contour, GlyfLocaBuilder, Glyph, SimpleGlyph},
    tables::loca::LocaFormat,
};

use crate::{
    error::{Error, Result},
    outline::{Bbox, Outline},
};

/// Maximum deviation, in font units, allowed by cubic-to-quadratic
/// approximation.
const CONVERSION_ACCURACY: f64 = 1.0;

/// Finished glyf/loca pair plus the numbers `maxp` and `head` need.
#[derive(Debug)]
pub struct BuiltGlyf {
    pub glyf: Vec<u8>,
    pub loca: Vec<u8>,
    pub format: LocaFormat,
    pub max_points: u16,
    pub max_contours: u16,
    /// Union of the glyph records' point extents (off-curve included),
    /// matching what TrueType stores per glyph.
    pub bbox: Bbox,
}

/// Serialize `outlines` (one per glyph, in glyph order) into glyf/loca.
pub fn build(outlines: &[Outline]) -> Result<BuiltGlyf> {
    let mut builder = GlyfLocaBuilder::new();
    let mut max_points = 0u16;
    let mut max_contours = 0u16;
    let mut bbox: Option<Bbox> = None;

    for outline in outlines {
        let glyph = if outline.is_empty() {
            Glyph::Empty
        } else {
            let simple = simple_glyph(outline)?;
            let num_points: usize = simple.contours.iter().map(|c| c.len()).sum();
            max_points = max_points.max(num_points as u16);
            max_contours = max_contours.max(simple.contours.len() as u16);
            let record = Bbox {
                x_min: simple.bbox.x_min,
                y_min: simple.bbox.y_min,
                x_max: simple.bbox.x_max,
                y_max: simple.bbox.y_max,
            };
            bbox = Some(bbox.map_or(record, |b| b.union(record)));
            Glyph::Simple(simple)
        };
        builder.add_glyph(&glyph).map_err(|e| Error::GlyphPath {
            glyph: outline.glyph_id,
            reason: format!("{e:?}"),
        })?;
    }

    let (glyf, loca, format) = builder.build();
    Ok(BuiltGlyf {
        glyf: dump_table(&glyf)?,
        loca: dump_table(&loca)?,
        format,
        max_points,
        max_contours,
        bbox: bbox.unwrap_or(Bbox::ZERO),
    })
}

fn ot_round(v: f64) -> i16 {
    (v + 0.5).floor() as i16
}

/// Lay an outline out as a TrueType simple glyph.
fn simple_glyph(outline: &Outline) -> Result<SimpleGlyph> {
    let path = quadratic_path(outline)?;

    let mut contours: Vec<Vec<CurvePoint>> = Vec::new();
    let mut current: Vec<CurvePoint> = Vec::new();
    for element in path.elements() {
        match *element {
            PathEl::MoveTo(p) => {
                if !current.is_empty() {
                    contours.push(std::mem::take(&mut current));
                }
                current.push(CurvePoint { x: ot_round(p.x), y: ot_round(p.y), on_curve: true });
            }
            PathEl::LineTo(p) => {
                current.push(CurvePoint { x: ot_round(p.x), y: ot_round(p.y), on_curve: true });
            }
            PathEl::QuadTo(c, p) => {
                current.push(CurvePoint { x: ot_round(c.x), y: ot_round(c.y), on_curve: false });
                current.push(CurvePoint { x: ot_round(p.x), y: ot_round(p.y), on_curve: true });
            }
            PathEl::CurveTo(..) => {
                return Err(Error::QuadConversion(outline.glyph_id));
            }
            PathEl::ClosePath => {
                // TrueType contours close implicitly; a final on-curve
                // point duplicating the start carries no information.
                if current.len() > 1
                    && current.last() == current.first()
                    && current.last().is_some_and(|p| p.on_curve)
                {
                    current.pop();
                }
                if !current.is_empty() {
                    contours.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        contours.push(current);
    }

    let mut points = contours.iter().flatten();
    let first = points.next().ok_or(Error::GlyphPath {
        glyph: outline.glyph_id,
        reason: "no points after quadratic conversion".to_string(),
    })?;
    let mut bbox =
        GlyfBbox { x_min: first.x, y_min: first.y, x_max: first.x, y_max: first.y };
    for p in points {
        bbox.x_min = bbox.x_min.min(p.x);
        bbox.y_min = bbox.y_min.min(p.y);
        bbox.x_max = bbox.x_max.max(p.x);
        bbox.y_max = bbox.y_max.max(p.y);
    }

    Ok(SimpleGlyph {
        bbox,
        contours: contours.into_iter().map(Contour::from).collect(),
        instructions: Vec::new(),
    })
}

/// Replace every cubic segment with an approximating quadratic spline.
/// Lines and existing quadratics pass through untouched.
fn quadratic_path(outline: &Outline) -> Result<BezPath> {
    let source = outline.to_bezpath();
    let mut out = BezPath::new();
    let mut current = Point::ZERO;
    let mut start = Point::ZERO;

    for element in source.elements() {
        match *element {
            PathEl::MoveTo(p) => {
                out.move_to(p);
                current = p;
                start = p;
            }
            PathEl::LineTo(p) => {
                out.line_to(p);
                current = p;
            }
            PathEl::QuadTo(c, p) => {
                out.quad_to(c, p);
                current = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                let cubic = CubicBez { p0: current, p1: c1, p2: c2, p3: p };
                let splines = cubics_to_quadratic_splines(&[cubic], CONVERSION_ACCURACY)
                    .ok_or(Error::QuadConversion(outline.glyph_id))?;
                for spline in &splines {
                    for quad in spline.to_quads() {
                        out.quad_to(quad.p1, quad.p2);
                    }
                }
                current = p;
            }
            PathEl::ClosePath => {
                out.close_path();
                current = start;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::PathCommand;
    use kurbo::Point;

    fn square(gid: u16) -> Outline {
        Outline::from_commands(
            gid,
            vec![
                PathCommand::MoveTo(Point::new(50.0, 0.0)),
                PathCommand::LineTo(Point::new(450.0, 0.0)),
                PathCommand::LineTo(Point::new(450.0, 400.0)),
                PathCommand::LineTo(Point::new(50.0, 400.0)),
                PathCommand::Close,
            ],
        )
    }

    #[test]
    fn small_font_uses_short_loca() {
        let outlines = vec![Outline::empty(0), square(1)];
        let built = build(&outlines).unwrap();
        assert_eq!(built.format, LocaFormat::Short);
        // One trailing entry; short entries are u16.
        assert_eq!(built.loca.len(), (outlines.len() + 1) * 2);
        assert_eq!(built.max_contours, 1);
        assert_eq!(built.max_points, 4);
        assert_eq!(built.bbox, Bbox { x_min: 50, y_min: 0, x_max: 450, y_max: 400 });
    }

    #[test]
    fn empty_glyphs_share_offsets() {
        let built = build(&[Outline::empty(0), Outline::empty(1)]).unwrap();
        // Empty glyphs contribute no glyf bytes: all loca entries equal.
        assert!(built.glyf.is_empty());
        assert_eq!(built.loca, vec![0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn quad_control_becomes_off_curve_point() {
        let outline = Outline::from_commands(
            0,
            vec![
                PathCommand::MoveTo(Point::new(0.0, 0.0)),
                PathCommand::QuadTo(Point::new(200.0, 300.0), Point::new(400.0, 0.0)),
                PathCommand::Close,
            ],
        );
        let simple = simple_glyph(&outline).unwrap();
        assert_eq!(simple.contours.len(), 1);
        let points: Vec<_> = simple.contours[0].iter().collect();
        assert_eq!(points.len(), 3);
        assert!(points[0].on_curve);
        assert!(!points[1].on_curve);
        assert_eq!((points[1].x, points[1].y), (200, 300));
        // Record bbox covers the off-curve control point.
        assert_eq!(simple.bbox.y_max, 300);
    }

    #[test]
    fn closing_line_back_to_start_is_dropped() {
        let outline = Outline::from_commands(
            0,
            vec![
                PathCommand::MoveTo(Point::new(0.0, 0.0)),
                PathCommand::LineTo(Point::new(100.0, 0.0)),
                PathCommand::LineTo(Point::new(100.0, 100.0)),
                PathCommand::LineTo(Point::new(0.0, 0.0)),
                PathCommand::Close,
            ],
        );
        let simple = simple_glyph(&outline).unwrap();
        assert_eq!(simple.contours[0].iter().count(), 3);
    }

    #[test]
    fn cubic_outline_is_reduced() {
        let outline = Outline::from_commands(
            0,
            vec![
                PathCommand::MoveTo(Point::new(0.0, 0.0)),
                PathCommand::CurveTo(
                    Point::new(100.0, 200.0),
                    Point::new(300.0, 200.0),
                    Point::new(400.0, 0.0),
                ),
                PathCommand::Close,
            ],
        );
        let built = build(&[outline]).unwrap();
        assert!(!built.glyf.is_empty());
        assert!(built.max_points >= 3);
    }
}
