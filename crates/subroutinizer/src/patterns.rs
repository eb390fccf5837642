//! Pattern mining over CharString bytecode.
//!
//! Candidates are byte-exact windows aligned to token boundaries, starting
//! at a command boundary (charstring start or just after an operator).
//! Control-flow operators never appear inside a window, and the window
//! length is capped so mining stays linear in total CharString bytes times
//! a constant, rather than quadratic on adversarial inputs.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::{
    error::{Error, Result},
    tokens::{self, TokenError, TokenKind},
};

/// Upper bound on a mined pattern's byte length.
pub const MAX_PATTERN_BYTES: usize = 64;

/// A repeated CharString fragment and where it occurs.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The fragment, byte-exact.
    pub bytes: Vec<u8>,
    /// (glyph index, byte offset) pairs, non-overlapping within each glyph,
    /// sorted by glyph then offset.
    pub occurrences: Vec<(usize, usize)>,
    /// Net operand-stack effect: 0 when the fragment ends on an operator,
    /// otherwise the number of trailing operands it leaves on the stack.
    pub stack_delta: i32,
}

impl Pattern {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn occurrence_count(&self) -> usize {
        self.occurrences.len()
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    bytes: &'a [u8],
    glyph: usize,
    offset: usize,
    stack_delta: i32,
}

/// Mine `charstrings` for repeated fragments of at least `min_len` bytes.
///
/// With `stack_aware` set, only fragments that end on an operator (net stack
/// delta zero) qualify, which keeps every extraction site safe regardless of
/// surrounding context. Without it, fragments may additionally end on
/// trailing operands; the delta is recorded on the pattern.
pub fn analyze(
    charstrings: &[Vec<u8>],
    min_len: usize,
    stack_aware: bool,
) -> Result<Vec<Pattern>> {
    let per_glyph: Vec<Vec<Candidate>> = charstrings
        .par_iter()
        .enumerate()
        .map(|(glyph, cs)| candidates(glyph, cs, min_len, stack_aware))
        .collect::<Result<_>>()?;

    let mut by_bytes: HashMap<&[u8], Vec<Candidate>> = HashMap::new();
    for candidate in per_glyph.iter().flatten() {
        by_bytes.entry(candidate.bytes).or_default().push(*candidate);
    }

    let mut patterns: Vec<Pattern> = by_bytes
        .into_iter()
        .filter_map(|(bytes, sites)| {
            let occurrences = non_overlapping(&sites);
            (occurrences.len() >= 2).then(|| Pattern {
                bytes: bytes.to_vec(),
                stack_delta: sites[0].stack_delta,
                occurrences,
            })
        })
        .collect();

    // Deterministic order: biggest estimated payoff first.
    patterns.sort_by(|a, b| {
        let score_a = (a.occurrence_count() - 1) * a.len();
        let score_b = (b.occurrence_count() - 1) * b.len();
        score_b.cmp(&score_a).then_with(|| a.bytes.cmp(&b.bytes))
    });
    Ok(drop_subsumed(patterns))
}

/// A pattern contained in a longer kept pattern with the same occurrence
/// count brings no sites of its own; mining windows produce these in bulk
/// and they only slow selection down.
fn drop_subsumed(patterns: Vec<Pattern>) -> Vec<Pattern> {
    let mut kept: Vec<Pattern> = Vec::new();
    for pattern in patterns {
        let subsumed = kept.iter().any(|longer| {
            longer.occurrence_count() == pattern.occurrence_count()
                && longer.len() > pattern.len()
                && longer.bytes.windows(pattern.len()).any(|w| w == pattern.bytes)
        });
        if !subsumed {
            kept.push(pattern);
        }
    }
    kept
}

fn candidates<'a>(
    glyph: usize,
    cs: &'a [u8],
    min_len: usize,
    stack_aware: bool,
) -> Result<Vec<Candidate<'a>>> {
    let tokens = tokens::tokenize(cs).map_err(|e| match e {
        TokenError::Invalid { offset, value } => Error::InvalidCharstring { glyph, offset, value },
        TokenError::Truncated { offset } => Error::TruncatedCharstring { glyph, offset },
    })?;

    let mut out = Vec::new();
    for i in 0..tokens.len() {
        let at_command_boundary = i == 0 || tokens[i - 1].is_operator();
        if !at_command_boundary {
            continue;
        }
        let start = tokens[i].start;
        let mut trailing_operands = 0i32;
        for token in &tokens[i..] {
            if token.is_control_flow() {
                break;
            }
            let len = token.end - start;
            if len > MAX_PATTERN_BYTES {
                break;
            }
            if token.is_operator() {
                trailing_operands = 0;
            } else {
                trailing_operands += 1;
            }
            if len < min_len {
                continue;
            }
            if stack_aware && !token.is_operator() {
                continue;
            }
            out.push(Candidate {
                bytes: &cs[start..token.end],
                glyph,
                offset: start,
                stack_delta: trailing_operands,
            });
        }
    }
    Ok(out)
}

/// Greedy first-match occurrence counting: within one glyph, a site only
/// counts if it starts at or after the end of the previous counted site.
fn non_overlapping(sites: &[Candidate]) -> Vec<(usize, usize)> {
    let mut sorted: Vec<_> = sites.iter().map(|c| (c.glyph, c.offset, c.bytes.len())).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut out = Vec::new();
    let mut last: Option<(usize, usize)> = None;
    for (glyph, offset, len) in sorted {
        let clear = match last {
            Some((g, end)) => g != glyph || offset >= end,
            None => true,
        };
        if clear {
            out.push((glyph, offset));
            last = Some((glyph, offset + len));
        }
    }
    out
}
