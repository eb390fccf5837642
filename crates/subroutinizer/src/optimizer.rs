//! Subroutine selection and ordering.
//!
//! Selection is greedy over estimated net savings, re-evaluated after every
//! acceptance because the bias tier (and with it the per-call encoding
//! cost) moves with the accepted count. Ordering then parks the most-called
//! subroutines at the biased indices with the cheapest operand encoding.

use crosstype_cff::charstring::{bias, int_len};

use crate::patterns::Pattern;

/// CFF's hard ceiling on entries in a subr INDEX.
pub const MAX_SUBRS: usize = 65_535;

/// Per-subroutine storage overhead besides the body: the appended `return`
/// plus the INDEX offset entry.
const SUBR_OVERHEAD: usize = 4;

/// Bytes a `callsubr` to the subroutine at `position` costs when `count`
/// subroutines exist: the biased operand plus the operator byte.
pub fn call_cost(position: usize, count: usize) -> usize {
    int_len(position as i32 - bias(count)) + 1
}

/// Worst-case call cost across all positions for `count` subroutines; used
/// while planning, before final positions are known.
pub fn max_call_cost(count: usize) -> usize {
    call_cost(count.saturating_sub(1), count)
}

/// Estimated net byte savings of extracting `pattern` as the subroutine at
/// `position` out of `count`.
fn savings(pattern: &Pattern, position: usize, count: usize) -> i64 {
    let occ = pattern.occurrence_count() as i64;
    let len = pattern.len() as i64;
    (occ - 1) * len - occ * call_cost(position, count) as i64 - SUBR_OVERHEAD as i64
}

/// Choose the subset of `candidates` worth extracting, bounded by
/// `max_subrs`. Candidates arrive sorted best-first from the analyzer; each
/// acceptance re-evaluates the remainder under the new count.
pub fn select(candidates: Vec<Pattern>, max_subrs: usize) -> Vec<Pattern> {
    let limit = max_subrs.min(MAX_SUBRS);
    let mut remaining = candidates;
    let mut selected: Vec<Pattern> = Vec::new();

    while selected.len() < limit {
        let position = selected.len();
        let count = selected.len() + 1;
        let best = remaining
            .iter()
            .enumerate()
            .map(|(i, p)| (savings(p, position, count), i))
            .max();
        match best {
            Some((gain, i)) if gain > 0 => selected.push(remaining.swap_remove(i)),
            _ => break,
        }
    }
    selected
}

/// Order `selected` so the most-called subroutines take the lowest (and
/// cheapest to encode) biased indices. Ties break on the body bytes so the
/// ordering is deterministic.
pub fn order(selected: &mut [Pattern]) {
    selected.sort_by(|a, b| {
        b.occurrence_count()
            .cmp(&a.occurrence_count())
            .then_with(|| a.bytes.cmp(&b.bytes))
    });
}
