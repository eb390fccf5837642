//! Subroutine body emission and call-site rewriting.
//!
//! Planning walks each CharString's recorded occurrence sites in selection
//! priority order, claiming non-overlapping spans; later patterns whose
//! spans collide with an existing claim are skipped for that CharString.
//! Application then splices `callsubr` operators over the claimed spans,
//! leaving every other byte untouched.

use crosstype_cff::charstring::{bias, op, push_int};

use crate::{optimizer::max_call_cost, patterns::Pattern};

/// One claimed rewrite: replace `start..end` with a call to `pattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replacement {
    pub start: usize,
    pub end: usize,
    /// Index into the selected pattern list (priority order, not yet the
    /// biased subroutine number).
    pub pattern: usize,
}

/// Claim rewrite spans for one glyph's CharString.
///
/// `glyph` selects the relevant occurrence sites; the call-cost bound is the
/// worst case for `count` subroutines so a claim can only get cheaper once
/// final indices are assigned.
pub fn plan(glyph: usize, patterns: &[Pattern], count: usize) -> Vec<Replacement> {
    let cost_bound = max_call_cost(count);
    let mut claims: Vec<Replacement> = Vec::new();

    for (pattern_idx, pattern) in patterns.iter().enumerate() {
        if pattern.len() <= cost_bound {
            continue;
        }
        for &(g, offset) in &pattern.occurrences {
            if g != glyph {
                continue;
            }
            let (start, end) = (offset, offset + pattern.len());
            let collides = claims.iter().any(|c| start < c.end && c.start < end);
            if !collides {
                claims.push(Replacement { start, end, pattern: pattern_idx });
            }
        }
    }

    claims.sort_by_key(|c| c.start);
    claims
}

/// Rewrite one CharString: splice `callsubr(biased index)` over each claim.
///
/// `subr_index[pattern]` maps a pattern to its final position in the subr
/// INDEX; `count` is the INDEX length, fixing the bias.
pub fn apply(
    charstring: &[u8],
    claims: &[Replacement],
    subr_index: &[usize],
    count: usize,
) -> Vec<u8> {
    let subr_bias = bias(count);
    let mut out = Vec::with_capacity(charstring.len());
    let mut pos = 0usize;

    for claim in claims {
        out.extend_from_slice(&charstring[pos..claim.start]);
        push_int(&mut out, subr_index[claim.pattern] as i32 - subr_bias);
        out.push(op::CALLSUBR);
        pos = claim.end;
    }
    out.extend_from_slice(&charstring[pos..]);
    out
}

/// Emit subroutine bodies in final index order.
///
/// Mined patterns never contain control-flow operators, so every body needs
/// the terminating `return` appended.
pub fn bodies(patterns_in_index_order: &[&Pattern]) -> Vec<Vec<u8>> {
    patterns_in_index_order
        .iter()
        .map(|p| {
            let mut body = p.bytes.clone();
            body.push(op::RETURN);
            body
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(bytes: Vec<u8>, occurrences: Vec<(usize, usize)>) -> Pattern {
        Pattern { bytes, occurrences, stack_delta: 0 }
    }

    #[test]
    fn plan_claims_first_match_and_skips_overlaps() {
        // Two patterns overlapping at bytes 10..30 and 20..45.
        let patterns = vec![
            pattern(vec![1; 20], vec![(0, 10)]),
            pattern(vec![2; 25], vec![(0, 20)]),
        ];
        let claims = plan(0, &patterns, 2);
        assert_eq!(claims, vec![Replacement { start: 10, end: 30, pattern: 0 }]);
    }

    #[test]
    fn plan_rejects_calls_no_shorter_than_span() {
        let patterns = vec![pattern(vec![1, 2], vec![(0, 0), (0, 2)])];
        assert!(plan(0, &patterns, 1).is_empty());
    }

    #[test]
    fn apply_splices_calls() {
        let charstring: Vec<u8> = (0..20).collect();
        let claims = vec![Replacement { start: 5, end: 15, pattern: 0 }];
        let rewritten = apply(&charstring, &claims, &[0], 1);
        // bias(1) = 107, index 0 encodes as -107 -> byte 32
        let mut expected: Vec<u8> = (0..5).collect();
        expected.push(32);
        expected.push(op::CALLSUBR);
        expected.extend(15..20);
        assert_eq!(rewritten, expected);
    }

    #[test]
    fn bodies_end_in_return() {
        let p = pattern(vec![139, 139, 5], vec![(0, 0), (1, 0)]);
        let built = bodies(&[&p]);
        assert_eq!(built, vec![vec![139, 139, 5, op::RETURN]]);
    }
}
