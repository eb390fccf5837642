//! # crosstype-subroutinizer
//!
//! Pattern-mining CFF subroutinization: find byte sequences repeated across
//! a font's CharStrings, extract the profitable ones into local
//! subroutines, and rewrite the CharStrings to call them.
//!
//! Optimization is best-effort by contract: callers treat any [`Error`]
//! as "use the unoptimized CharStrings", and a successful run is
//! guaranteed never to produce a larger encoding than its input. When the
//! rewritten total (CharStrings INDEX plus subr INDEX) would not shrink,
//! the input comes back untouched.
//!
//! ```no_run
//! use crosstype_subroutinizer::{Options, subroutinize};
//!
//! let charstrings: Vec<Vec<u8>> = vec![/* one per glyph */];
//! let result = subroutinize(&charstrings, &Options::default()).unwrap();
//! assert!(result.subroutines.len() <= 65_535);
//! ```

mod error;
pub mod optimizer;
pub mod patterns;
pub mod rewriter;
pub mod tokens;

use log::{debug, info};

pub use error::{Error, Result};
pub use patterns::{MAX_PATTERN_BYTES, Pattern, analyze};

use crosstype_cff::index;

/// Subroutinization knobs.
#[derive(Debug, Clone)]
pub struct Options {
    /// Minimum mined fragment length in bytes.
    pub min_pattern_length: usize,
    /// Upper bound on emitted subroutines (clamped to CFF's 65,535).
    pub max_subroutines: usize,
    /// Only extract fragments with a zero net operand-stack effect.
    pub stack_aware: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { min_pattern_length: 10, max_subroutines: optimizer::MAX_SUBRS, stack_aware: true }
    }
}

/// Rewritten CharStrings plus the local subr INDEX entries they call into.
#[derive(Debug, Clone)]
pub struct Subroutinized {
    pub charstrings: Vec<Vec<u8>>,
    pub subroutines: Vec<Vec<u8>>,
}

impl Subroutinized {
    fn unchanged(charstrings: &[Vec<u8>]) -> Self {
        Self { charstrings: charstrings.to_vec(), subroutines: Vec::new() }
    }
}

/// Run the full pipeline: mine, select, order, rewrite.
pub fn subroutinize(charstrings: &[Vec<u8>], options: &Options) -> Result<Subroutinized> {
    let candidates = analyze(charstrings, options.min_pattern_length, options.stack_aware)?;
    if candidates.is_empty() {
        debug!("no repeated charstring fragments found");
        return Ok(Subroutinized::unchanged(charstrings));
    }
    debug!("{} candidate patterns mined", candidates.len());

    let mut selected = optimizer::select(candidates, options.max_subroutines);

    // Claims can collide between patterns, so realized call counts may fall
    // short of the mined occurrence counts. Re-plan until every surviving
    // subroutine is actually called at least twice.
    loop {
        if selected.is_empty() {
            return Ok(Subroutinized::unchanged(charstrings));
        }
        let plans = (0..charstrings.len())
            .map(|glyph| rewriter::plan(glyph, &selected, selected.len()))
            .collect::<Vec<_>>();

        let mut realized = vec![0usize; selected.len()];
        for claim in plans.iter().flatten() {
            realized[claim.pattern] += 1;
        }
        if realized.iter().all(|&n| n >= 2) {
            // Most-called first: cheapest biased operands go to the hottest
            // subroutines.
            let mut index_order: Vec<usize> = (0..selected.len()).collect();
            index_order.sort_by(|&a, &b| {
                realized[b]
                    .cmp(&realized[a])
                    .then_with(|| selected[a].bytes.cmp(&selected[b].bytes))
            });
            let mut subr_index = vec![0usize; selected.len()];
            for (position, &pattern) in index_order.iter().enumerate() {
                subr_index[pattern] = position;
            }

            let in_index_order: Vec<&Pattern> = index_order.iter().map(|&i| &selected[i]).collect();
            let subroutines = rewriter::bodies(&in_index_order);
            let rewritten: Vec<Vec<u8>> = charstrings
                .iter()
                .zip(&plans)
                .map(|(cs, claims)| rewriter::apply(cs, claims, &subr_index, selected.len()))
                .collect();

            let old_size = index::size_of(charstrings);
            let new_size = index::size_of(&rewritten) + index::size_of(&subroutines);
            if new_size >= old_size {
                debug!("subroutinization would not shrink ({old_size} -> {new_size}); skipped");
                return Ok(Subroutinized::unchanged(charstrings));
            }
            info!(
                "subroutinized {} glyphs: {} subrs, {} -> {} bytes",
                charstrings.len(),
                subroutines.len(),
                old_size,
                new_size
            );
            return Ok(Subroutinized { charstrings: rewritten, subroutines });
        }

        let keep: Vec<bool> = realized.iter().map(|&n| n >= 2).collect();
        let mut i = 0;
        selected.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });
    }
}
