//! CharString builder: absolute path geometry in, Type 2 bytecode out.
//!
//! Coordinates are rounded to integer font units before the relative deltas
//! are computed, so rounding error never accumulates along a contour.

use crate::charstring::{op, push_int};

/// Rounding used throughout OpenType: half-up in the positive direction.
fn ot_round(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}

/// Builds one glyph's CharString.
///
/// The optional `width` is the advance-width delta against the Private
/// DICT's nominalWidthX and is emitted as the leading operand; pass `None`
/// for glyphs whose advance equals defaultWidthX.
#[derive(Debug)]
pub struct Encoder {
    out: Vec<u8>,
    x: i32,
    y: i32,
}

impl Encoder {
    pub fn new(width: Option<i32>) -> Self {
        let mut out = Vec::new();
        if let Some(w) = width {
            push_int(&mut out, w);
        }
        Self { out, x: 0, y: 0 }
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        let (rx, ry) = (ot_round(x), ot_round(y));
        push_int(&mut self.out, rx - self.x);
        push_int(&mut self.out, ry - self.y);
        self.out.push(op::RMOVETO);
        self.x = rx;
        self.y = ry;
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        let (rx, ry) = (ot_round(x), ot_round(y));
        push_int(&mut self.out, rx - self.x);
        push_int(&mut self.out, ry - self.y);
        self.out.push(op::RLINETO);
        self.x = rx;
        self.y = ry;
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        let (rx1, ry1) = (ot_round(x1), ot_round(y1));
        let (rx2, ry2) = (ot_round(x2), ot_round(y2));
        let (rx, ry) = (ot_round(x), ot_round(y));
        for d in [rx1 - self.x, ry1 - self.y, rx2 - rx1, ry2 - ry1, rx - rx2, ry - ry2] {
            push_int(&mut self.out, d);
        }
        self.out.push(op::RRCURVETO);
        self.x = rx;
        self.y = ry;
    }

    /// Splice pre-encoded operator bytes (e.g. stem hints) verbatim.
    ///
    /// Hint operators must precede the first moveto; callers splice them
    /// right after construction, before any path commands.
    pub fn raw(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    /// Type 2 closes contours implicitly at the next moveto or endchar.
    pub fn close(&mut self) {}

    pub fn finish(mut self) -> Vec<u8> {
        self.out.push(op::ENDCHAR);
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::{self, PathSink};

    #[derive(Default)]
    struct Collect {
        cmds: Vec<(char, Vec<f64>)>,
    }

    impl PathSink for Collect {
        fn move_to(&mut self, x: f64, y: f64) {
            self.cmds.push(('M', vec![x, y]));
        }
        fn line_to(&mut self, x: f64, y: f64) {
            self.cmds.push(('L', vec![x, y]));
        }
        fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
            self.cmds.push(('C', vec![x1, y1, x2, y2, x, y]));
        }
        fn close(&mut self) {
            self.cmds.push(('Z', vec![]));
        }
    }

    #[test]
    fn empty_glyph_is_bare_endchar() {
        assert_eq!(Encoder::new(None).finish(), vec![op::ENDCHAR]);
    }

    #[test]
    fn width_is_leading_operand() {
        let bytes = Encoder::new(Some(120)).finish();
        assert_eq!(bytes, vec![247, 12, op::ENDCHAR]);
    }

    #[test]
    fn round_trips_through_interpreter() {
        let mut enc = Encoder::new(None);
        enc.move_to(100.0, 0.0);
        enc.line_to(400.0, 0.0);
        enc.curve_to(450.0, 0.0, 500.0, 50.0, 500.0, 100.0);
        enc.line_to(100.0, 100.0);
        enc.close();
        let bytes = enc.finish();

        let mut sink = Collect::default();
        interp::run(&bytes, &[], &[], &mut sink).unwrap();
        assert_eq!(
            sink.cmds,
            vec![
                ('M', vec![100.0, 0.0]),
                ('L', vec![400.0, 0.0]),
                ('C', vec![450.0, 0.0, 500.0, 50.0, 500.0, 100.0]),
                ('L', vec![100.0, 100.0]),
                ('Z', vec![]),
            ]
        );
    }

    #[test]
    fn rounding_does_not_drift() {
        let mut enc = Encoder::new(None);
        enc.move_to(0.0, 0.0);
        // Each step lands on x.4 / x.6; deltas must chain on rounded values.
        enc.line_to(10.4, 0.0);
        enc.line_to(20.8, 0.0);
        enc.line_to(31.2, 0.0);
        let bytes = enc.finish();

        let mut sink = Collect::default();
        interp::run(&bytes, &[], &[], &mut sink).unwrap();
        assert_eq!(
            sink.cmds,
            vec![
                ('M', vec![0.0, 0.0]),
                ('L', vec![10.0, 0.0]),
                ('L', vec![21.0, 0.0]),
                ('L', vec![31.0, 0.0]),
                ('Z', vec![]),
            ]
        );
    }
}
