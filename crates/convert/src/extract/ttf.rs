//! TrueType outline extraction.
//!
//! Walks `loca`/`glyf`, turning simple glyphs into quadratic command lists
//! (with TrueType's implied on-curve midpoints made explicit) and
//! flattening composite glyphs through the compound resolver.

use kurbo::{Affine, Point};
use log::warn;
use read_fonts::{
    FontRef, TableProvider,
    tables::{
        glyf::{Anchor, CompositeGlyph, Glyf, Glyph as ReadGlyph, SimpleGlyph},
        loca::Loca,
    },
    types::GlyphId,
};

use crate::{
    error::{Error, Result},
    outline::{Outline, PathCommand},
};

/// Component nesting bound; deeper nesting is treated as a cycle.
const MAX_COMPONENT_DEPTH: u8 = 8;

/// Extract one outline per glyph, in glyph order.
pub fn extract_outlines(font: &FontRef) -> Result<Vec<Outline>> {
    let num_glyphs = font.maxp()?.num_glyphs();
    let loca = font.loca(None)?;
    let glyf = font.glyf()?;

    (0..num_glyphs).map(|gid| extract_glyph(gid, &loca, &glyf)).collect()
}

fn extract_glyph(gid: u16, loca: &Loca, glyf: &Glyf) -> Result<Outline> {
    match loca.get_glyf(GlyphId::new(gid as u32), glyf)? {
        None => Ok(Outline::empty(gid)),
        Some(ReadGlyph::Simple(simple)) => Ok(simple_outline(gid, &simple)),
        Some(ReadGlyph::Composite(composite)) => {
            let commands = resolve_components(gid, &composite, loca, glyf, 0)?;
            Ok(Outline::from_commands(gid, commands))
        }
    }
}

fn simple_outline(gid: u16, simple: &SimpleGlyph) -> Outline {
    let mut commands = Vec::new();
    let mut points = simple.points();
    let mut taken = 0usize;

    for end in simple.end_pts_of_contours() {
        let end = end.get() as usize;
        let mut contour = Vec::new();
        while taken <= end {
            if let Some(p) = points.next() {
                contour.push((Point::new(p.x as f64, p.y as f64), p.on_curve));
            }
            taken += 1;
        }
        contour_commands(&contour, &mut commands);
    }

    Outline::from_commands(gid, commands)
}

/// TrueType contour to explicit commands: consecutive off-curve points
/// imply an on-curve point at their midpoint, and a contour may have no
/// on-curve points at all, in which case it starts at an implied midpoint.
/// The closing segment back to the start is left implicit unless it curves.
fn contour_commands(points: &[(Point, bool)], out: &mut Vec<PathCommand>) {
    if points.is_empty() {
        return;
    }

    let first_on = points.iter().position(|(_, on)| *on);
    let (start, ordered): (Point, Vec<(Point, bool)>) = match first_on {
        Some(i) => {
            let mut rotated = points[i..].to_vec();
            rotated.extend_from_slice(&points[..i]);
            (rotated[0].0, rotated[1..].to_vec())
        }
        None => {
            // All off-curve: open at the midpoint of the closing pair.
            let last = points[points.len() - 1].0;
            (last.midpoint(points[0].0), points.to_vec())
        }
    };

    out.push(PathCommand::MoveTo(start));
    let mut pending: Option<Point> = None;
    for &(p, on) in &ordered {
        if on {
            match pending.take() {
                Some(q) => out.push(PathCommand::QuadTo(q, p)),
                None => out.push(PathCommand::LineTo(p)),
            }
        } else {
            if let Some(q) = pending {
                out.push(PathCommand::QuadTo(q, q.midpoint(p)));
            }
            pending = Some(p);
        }
    }
    if let Some(q) = pending {
        out.push(PathCommand::QuadTo(q, start));
    }
    out.push(PathCommand::Close);
}

/// Flatten a composite glyph: resolve every component recursively, apply
/// its transform, and concatenate the resulting contours.
fn resolve_components(
    gid: u16,
    composite: &CompositeGlyph,
    loca: &Loca,
    glyf: &Glyf,
    depth: u8,
) -> Result<Vec<PathCommand>> {
    if depth >= MAX_COMPONENT_DEPTH {
        return Err(Error::ComponentDepth(gid));
    }

    let mut commands = Vec::new();
    for component in composite.components() {
        let child_gid = component.glyph.to_u32() as u16;
        let child_commands = match loca.get_glyf(GlyphId::new(child_gid as u32), glyf)? {
            None => Vec::new(),
            Some(ReadGlyph::Simple(simple)) => simple_outline(child_gid, &simple).commands,
            Some(ReadGlyph::Composite(child)) => {
                resolve_components(child_gid, &child, loca, glyf, depth + 1)?
            }
        };

        let (dx, dy) = match component.anchor {
            Anchor::Offset { x, y } => (x as f64, y as f64),
            Anchor::Point { .. } => {
                // Point-anchored components need the resolved point streams
                // of both glyphs; nothing mainstream emits them anymore.
                warn!("glyph {gid}: point-anchored component {child_gid} placed at origin");
                (0.0, 0.0)
            }
        };
        let transform = Affine::new([
            component.transform.xx.to_f32() as f64,
            component.transform.yx.to_f32() as f64,
            component.transform.xy.to_f32() as f64,
            component.transform.yy.to_f32() as f64,
            dx,
            dy,
        ]);

        let child = Outline::from_commands(child_gid, child_commands);
        commands.extend(child.transformed_commands(transform));
    }
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn all_on_curve_square() {
        let points = [
            (pt(0.0, 0.0), true),
            (pt(100.0, 0.0), true),
            (pt(100.0, 100.0), true),
            (pt(0.0, 100.0), true),
        ];
        let mut out = Vec::new();
        contour_commands(&points, &mut out);
        assert_eq!(
            out,
            vec![
                PathCommand::MoveTo(pt(0.0, 0.0)),
                PathCommand::LineTo(pt(100.0, 0.0)),
                PathCommand::LineTo(pt(100.0, 100.0)),
                PathCommand::LineTo(pt(0.0, 100.0)),
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn off_curve_point_becomes_quad() {
        let points = [
            (pt(0.0, 0.0), true),
            (pt(50.0, 100.0), false),
            (pt(100.0, 0.0), true),
        ];
        let mut out = Vec::new();
        contour_commands(&points, &mut out);
        assert_eq!(
            out,
            vec![
                PathCommand::MoveTo(pt(0.0, 0.0)),
                PathCommand::QuadTo(pt(50.0, 100.0), pt(100.0, 0.0)),
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn consecutive_off_curve_points_imply_midpoint() {
        let points = [
            (pt(0.0, 0.0), true),
            (pt(40.0, 80.0), false),
            (pt(80.0, 80.0), false),
            (pt(120.0, 0.0), true),
        ];
        let mut out = Vec::new();
        contour_commands(&points, &mut out);
        assert_eq!(
            out,
            vec![
                PathCommand::MoveTo(pt(0.0, 0.0)),
                PathCommand::QuadTo(pt(40.0, 80.0), pt(60.0, 80.0)),
                PathCommand::QuadTo(pt(80.0, 80.0), pt(120.0, 0.0)),
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn contour_not_starting_on_curve_is_rotated() {
        let points = [
            (pt(50.0, 100.0), false),
            (pt(100.0, 0.0), true),
            (pt(0.0, 0.0), true),
        ];
        let mut out = Vec::new();
        contour_commands(&points, &mut out);
        assert_eq!(out[0], PathCommand::MoveTo(pt(100.0, 0.0)));
        // The off-curve point wraps around and curves back to the start.
        assert_eq!(out[2], PathCommand::QuadTo(pt(50.0, 100.0), pt(100.0, 0.0)));
    }

    #[test]
    fn all_off_curve_contour_opens_at_midpoint() {
        let points = [
            (pt(0.0, 0.0), false),
            (pt(100.0, 0.0), false),
            (pt(100.0, 100.0), false),
            (pt(0.0, 100.0), false),
        ];
        let mut out = Vec::new();
        contour_commands(&points, &mut out);
        assert_eq!(out[0], PathCommand::MoveTo(pt(0.0, 50.0)));
        assert_eq!(out.len(), 6); // move + 4 quads + close
        assert_eq!(out[5], PathCommand::Close);
    }
}
