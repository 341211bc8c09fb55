//! Translation edit rate over whitespace-split words.
//!
//! The reference is greedily rearranged with block shifts towards the
//! candidate while a shift lowers the remaining word-level edit distance;
//! every accepted shift costs one edit. The total is normalized by the
//! candidate length. Lower is better.
//!
//! Work per pair stays bounded: the distance is computed in a band around
//! the diagonal, shifts are only tried for words that are misaligned on the
//! current edit path, and each round evaluates a capped number of shifts.

use crate::error::MetricError;

/// Longest block of words a single shift may move.
pub const MAX_SHIFT_SIZE: usize = 10;
/// Furthest a block may travel in one shift.
pub const MAX_SHIFT_DIST: usize = 50;
/// Shifts evaluated per greedy round, longest blocks first.
pub const MAX_SHIFT_CANDIDATES: usize = 64;
/// Half-width of the band of the distance matrix that is filled in.
pub const BEAM_WIDTH: usize = 25;

const INF: u32 = u32::MAX;

/// Columns of row `i` that are filled in, following the diagonal scaled to
/// the two lengths so the bottom-right cell is always reached.
fn band(i: usize, n: usize, m: usize) -> (usize, usize) {
    let prev_center = (i - 1) * m / n;
    let center = (i * m).div_ceil(n);
    (prev_center.saturating_sub(BEAM_WIDTH), (center + BEAM_WIDTH).min(m))
}

/// One DP row: `curr[lo..=hi]` from `prev`, where `word` is `hyp[i - 1]`.
fn fill_row(prev: &[u32], curr: &mut [u32], word: &str, target: &[&str], lo: usize, hi: usize) {
    for j in lo..=hi {
        let mut best = prev[j].saturating_add(1);
        if j > 0 {
            let left = curr[j - 1].saturating_add(1);
            let diag = prev[j - 1].saturating_add(u32::from(word != target[j - 1]));
            best = best.min(left).min(diag);
        }
        curr[j] = best;
    }
}

fn first_row(m: usize) -> Vec<u32> {
    let mut row = vec![INF; m + 1];
    for (j, cell) in row.iter_mut().take(m.min(BEAM_WIDTH) + 1).enumerate() {
        *cell = j as u32;
    }
    row
}

/// Banded word-level Levenshtein matrix, one row per hypothesis word plus
/// the empty prefix. Cells outside the band stay at `INF`.
fn distance_matrix(hyp: &[&str], target: &[&str]) -> Vec<Vec<u32>> {
    let (n, m) = (hyp.len(), target.len());
    let mut rows = Vec::with_capacity(n + 1);
    rows.push(first_row(m));
    for i in 1..=n {
        let (lo, hi) = band(i, n, m);
        let mut curr = vec![INF; m + 1];
        fill_row(&rows[i - 1], &mut curr, hyp[i - 1], target, lo, hi);
        rows.push(curr);
    }
    rows
}

/// Word-level Levenshtein distance with unit costs.
///
/// Exact while the lengths stay within [`BEAM_WIDTH`] of each other along
/// the path; beyond that an upper bound.
pub fn edit_distance(hyp: &[&str], target: &[&str]) -> usize {
    let (n, m) = (hyp.len(), target.len());
    if n == 0 || m == 0 {
        return n.max(m);
    }
    let mut prev = first_row(m);
    let mut curr = vec![INF; m + 1];
    for i in 1..=n {
        let (lo, hi) = band(i, n, m);
        curr.fill(INF);
        fill_row(&prev, &mut curr, hyp[i - 1], target, lo, hi);
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[m] as usize
}

/// Edit distance plus which words are not exact matches on the edit path.
struct Alignment {
    distance: usize,
    hyp_err: Vec<bool>,
    target_err: Vec<bool>,
}

fn align(hyp: &[&str], target: &[&str]) -> Alignment {
    let (n, m) = (hyp.len(), target.len());
    if n == 0 || m == 0 {
        return Alignment {
            distance: n.max(m),
            hyp_err: vec![true; n],
            target_err: vec![true; m],
        };
    }

    let d = distance_matrix(hyp, target);
    let mut hyp_err = vec![false; n];
    let mut target_err = vec![false; m];

    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        let here = d[i][j];
        if i > 0 && j > 0 {
            let diag = d[i - 1][j - 1];
            if hyp[i - 1] == target[j - 1] && diag == here {
                i -= 1;
                j -= 1;
                continue;
            }
            if diag != INF && diag + 1 == here {
                hyp_err[i - 1] = true;
                target_err[j - 1] = true;
                i -= 1;
                j -= 1;
                continue;
            }
        }
        if i > 0 {
            let up = d[i - 1][j];
            if up != INF && up + 1 == here {
                hyp_err[i - 1] = true;
                i -= 1;
                continue;
            }
        }
        target_err[j - 1] = true;
        j -= 1;
    }

    Alignment {
        distance: d[n][m] as usize,
        hyp_err,
        target_err,
    }
}

/// Candidate shifts: `(hyp_start, target_start, length)` for each run of
/// words shared with the target at a different position, where both runs
/// touch a misaligned word. Longest and shortest-travelling first, capped at
/// [`MAX_SHIFT_CANDIDATES`].
fn shift_candidates(
    hyp: &[&str],
    target: &[&str],
    alignment: &Alignment,
) -> Vec<(usize, usize, usize)> {
    let mut out = Vec::new();
    for i in 0..hyp.len() {
        for j in 0..target.len() {
            if i == j || i.abs_diff(j) > MAX_SHIFT_DIST || hyp[i] != target[j] {
                continue;
            }
            let mut len = 1;
            while len < MAX_SHIFT_SIZE
                && i + len < hyp.len()
                && j + len < target.len()
                && hyp[i + len] == target[j + len]
            {
                len += 1;
            }
            for l in 1..=len {
                let hyp_wrong = alignment.hyp_err[i..i + l].iter().any(|&e| e);
                let target_wrong = alignment.target_err[j..j + l].iter().any(|&e| e);
                if hyp_wrong && target_wrong {
                    out.push((i, j, l));
                }
            }
        }
    }
    out.sort_by_key(|&(i, j, l)| (std::cmp::Reverse(l), i.abs_diff(j), i, j));
    out.truncate(MAX_SHIFT_CANDIDATES);
    out
}

/// Move `hyp[start..start + len]` so that it begins at `dest` in the result.
fn apply_shift<'a>(hyp: &[&'a str], start: usize, dest: usize, len: usize) -> Vec<&'a str> {
    let block = &hyp[start..start + len];
    let mut rest: Vec<&str> = hyp[..start]
        .iter()
        .chain(&hyp[start + len..])
        .copied()
        .collect();
    let at = dest.min(rest.len());
    rest.splice(at..at, block.iter().copied());
    rest
}

/// Total edits turning `hyp` into `target`: accepted shifts plus the final
/// edit distance.
pub fn ter_edits(hyp: &[&str], target: &[&str]) -> usize {
    let mut current: Vec<&str> = hyp.to_vec();
    let mut alignment = align(&current, target);
    let mut shifts = 0usize;

    loop {
        let mut best: Option<(usize, Vec<&str>)> = None;
        for (start, dest, len) in shift_candidates(&current, target, &alignment) {
            let shifted = apply_shift(&current, start, dest, len);
            if shifted == current {
                continue;
            }
            let d = edit_distance(&shifted, target);
            if d < alignment.distance && best.as_ref().map_or(true, |(bd, _)| d < *bd) {
                best = Some((d, shifted));
            }
        }
        match best {
            Some((_, shifted)) => {
                shifts += 1;
                current = shifted;
                alignment = align(&current, target);
            }
            None => break,
        }
    }

    shifts + alignment.distance
}

/// TER of `candidate` against `reference`.
///
/// The reference is shifted and edited towards the candidate and the edit
/// count is divided by the candidate's word count. A candidate with no words
/// is an error; an empty reference against a non-empty candidate is `1.0`.
pub fn translation_edit_rate(candidate: &str, reference: &str) -> Result<f64, MetricError> {
    let cand: Vec<&str> = candidate.split_whitespace().collect();
    let refs: Vec<&str> = reference.split_whitespace().collect();
    if cand.is_empty() {
        return Err(MetricError::EmptyCandidate);
    }

    let rate = ter_edits(&refs, &cand) as f64 / cand.len() as f64;
    if !rate.is_finite() {
        return Err(MetricError::NonFinite { metric: "TER" });
    }
    Ok(rate)
}
