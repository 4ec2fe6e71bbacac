//! Run merging. A merge copies the smaller run into scratch and merges
//! toward the side that minimizes data movement: `merge_lo` walks
//! low-to-high when the left run is smaller, `merge_hi` walks high-to-low
//! when the right run is smaller. Ties always go to the left run, which is
//! the stability contract.
//!
//! Every exit — success or comparator failure — copies whatever remains in
//! scratch back into the gap, so the slice is a permutation of its input at
//! all times the caller can observe it.

use crate::{gallop_left, gallop_right, MergeState, Run, MIN_GALLOP};

/// Merges the adjacent runs at stack slots `i` and `i + 1`.
pub(crate) fn merge_at<T, E, F>(
    items: &mut [T],
    ms: &mut MergeState<T>,
    i: usize,
    is_less: &mut F,
) -> Result<(), E>
where
    T: Copy,
    F: FnMut(&T, &T) -> Result<bool, E>,
{
    let a = ms.pending[i];
    let b = ms.pending[i + 1];
    debug_assert!(a.len > 0 && b.len > 0);
    debug_assert_eq!(a.base + a.len, b.base);
    debug_assert!(i + 2 == ms.pending.len() || i + 3 == ms.pending.len());

    // Record the merged run now; the merge itself only permutes elements.
    ms.pending[i] = Run {
        base: a.base,
        len: a.len + b.len,
    };
    ms.pending.remove(i + 1);

    // Elements of A already in place before B's first element stay put.
    let k = gallop_right(&items[b.base], &items[a.base..a.base + a.len], 0, is_less)?;
    let base_a = a.base + k;
    let na = a.len - k;
    if na == 0 {
        return Ok(());
    }

    // Elements of B already in place after A's last element stay put.
    let nb = gallop_left(
        &items[base_a + na - 1],
        &items[b.base..b.base + b.len],
        b.len - 1,
        is_less,
    )?;
    if nb == 0 {
        return Ok(());
    }

    if na <= nb {
        merge_lo(items, ms, base_a, na, b.base, nb, is_less)
    } else {
        merge_hi(items, ms, base_a, na, b.base, nb, is_less)
    }
}

struct LoCursors {
    /// Next write slot.
    dest: usize,
    /// Next unread element of A (an index into scratch).
    ia: usize,
    /// Next unread element of B (an index into `items`).
    ib: usize,
    na: usize,
    nb: usize,
}

fn merge_lo<T, E, F>(
    items: &mut [T],
    ms: &mut MergeState<T>,
    base_a: usize,
    na: usize,
    base_b: usize,
    nb: usize,
    is_less: &mut F,
) -> Result<(), E>
where
    T: Copy,
    F: FnMut(&T, &T) -> Result<bool, E>,
{
    debug_assert!(na > 0 && nb > 0 && base_a + na == base_b);
    let mut scratch = std::mem::take(&mut ms.scratch);
    scratch.clear();
    scratch.extend_from_slice(&items[base_a..base_a + na]);

    let mut c = LoCursors {
        dest: base_a,
        ia: 0,
        ib: base_b,
        na,
        nb,
    };
    let result = merge_lo_run(items, &scratch, &mut ms.min_gallop, &mut c, is_less);

    // Shared exit: the unread part of A fills the gap exactly (the gap
    // between dest and the unread part of B is always c.na wide).
    if c.na > 0 {
        items[c.dest..c.dest + c.na].copy_from_slice(&scratch[c.ia..c.ia + c.na]);
    }
    ms.scratch = scratch;
    result
}

fn merge_lo_run<T, E, F>(
    items: &mut [T],
    scratch: &[T],
    min_gallop_state: &mut usize,
    c: &mut LoCursors,
    is_less: &mut F,
) -> Result<(), E>
where
    T: Copy,
    F: FnMut(&T, &T) -> Result<bool, E>,
{
    // B's first element always wins the opening move: merge_at trimmed A to
    // start strictly after it.
    let tmp = items[c.ib];
    items[c.dest] = tmp;
    c.dest += 1;
    c.ib += 1;
    c.nb -= 1;
    if c.nb == 0 {
        return Ok(());
    }
    if c.na == 1 {
        return copy_b_tail(items, scratch, c);
    }

    let mut min_gallop = *min_gallop_state;
    loop {
        let mut acount = 0usize;
        let mut bcount = 0usize;

        // One-at-a-time merging until a side starts winning consistently.
        loop {
            debug_assert!(c.na > 1 && c.nb > 0);
            if is_less(&items[c.ib], &scratch[c.ia])? {
                let tmp = items[c.ib];
                items[c.dest] = tmp;
                c.dest += 1;
                c.ib += 1;
                c.nb -= 1;
                bcount += 1;
                acount = 0;
                if c.nb == 0 {
                    return Ok(());
                }
                if bcount >= min_gallop {
                    break;
                }
            } else {
                items[c.dest] = scratch[c.ia];
                c.dest += 1;
                c.ia += 1;
                c.na -= 1;
                acount += 1;
                bcount = 0;
                if c.na == 1 {
                    return copy_b_tail(items, scratch, c);
                }
                if acount >= min_gallop {
                    break;
                }
            }
        }

        // Galloping: bulk-copy whole winning stretches. Staying in this mode
        // lowers the threshold, leaving it raises the threshold again.
        min_gallop += 1;
        loop {
            min_gallop -= (min_gallop > 1) as usize;
            *min_gallop_state = min_gallop;

            let k = gallop_right(&items[c.ib], &scratch[c.ia..c.ia + c.na], 0, is_less)?;
            acount = k;
            if k > 0 {
                items[c.dest..c.dest + k].copy_from_slice(&scratch[c.ia..c.ia + k]);
                c.dest += k;
                c.ia += k;
                c.na -= k;
                if c.na == 1 {
                    return copy_b_tail(items, scratch, c);
                }
                // na == 0 can only happen with an inconsistent comparator.
                if c.na == 0 {
                    return Ok(());
                }
            }
            let tmp = items[c.ib];
            items[c.dest] = tmp;
            c.dest += 1;
            c.ib += 1;
            c.nb -= 1;
            if c.nb == 0 {
                return Ok(());
            }

            let k = gallop_left(&scratch[c.ia], &items[c.ib..c.ib + c.nb], 0, is_less)?;
            bcount = k;
            if k > 0 {
                items.copy_within(c.ib..c.ib + k, c.dest);
                c.dest += k;
                c.ib += k;
                c.nb -= k;
                if c.nb == 0 {
                    return Ok(());
                }
            }
            items[c.dest] = scratch[c.ia];
            c.dest += 1;
            c.ia += 1;
            c.na -= 1;
            if c.na == 1 {
                return copy_b_tail(items, scratch, c);
            }
            if acount < MIN_GALLOP && bcount < MIN_GALLOP {
                break;
            }
        }
        min_gallop += 1; // penalty for leaving galloping mode
        *min_gallop_state = min_gallop;
    }
}

/// `merge_lo` endgame once A is down to one element: that element belongs at
/// the very end of the merge area, after all of B.
fn copy_b_tail<T, E>(items: &mut [T], scratch: &[T], c: &mut LoCursors) -> Result<(), E>
where
    T: Copy,
{
    debug_assert!(c.na == 1 && c.nb > 0);
    items.copy_within(c.ib..c.ib + c.nb, c.dest);
    items[c.dest + c.nb] = scratch[c.ia];
    c.dest += c.nb + 1;
    c.na = 0;
    c.nb = 0;
    Ok(())
}

struct HiCursors {
    /// First slot of the merge area; A's unread elements sit at
    /// `items[base_a..aend]`.
    base_a: usize,
    aend: usize,
    /// Exclusive end of the unwritten gap; writes go just below it.
    dend: usize,
    na: usize,
    /// B's unread elements sit at `scratch[..nb]`.
    nb: usize,
}

fn merge_hi<T, E, F>(
    items: &mut [T],
    ms: &mut MergeState<T>,
    base_a: usize,
    na: usize,
    base_b: usize,
    nb: usize,
    is_less: &mut F,
) -> Result<(), E>
where
    T: Copy,
    F: FnMut(&T, &T) -> Result<bool, E>,
{
    debug_assert!(na > 0 && nb > 0 && base_a + na == base_b);
    let mut scratch = std::mem::take(&mut ms.scratch);
    scratch.clear();
    scratch.extend_from_slice(&items[base_b..base_b + nb]);

    let mut c = HiCursors {
        base_a,
        aend: base_b,
        dend: base_b + nb,
        na,
        nb,
    };
    let result = merge_hi_run(items, &scratch, &mut ms.min_gallop, &mut c, is_less);

    // Shared exit: the unread part of B fills the gap exactly (the gap ends
    // at dend, right after A's unread prefix, and is always c.nb wide).
    if c.nb > 0 {
        items[c.dend - c.nb..c.dend].copy_from_slice(&scratch[..c.nb]);
    }
    ms.scratch = scratch;
    result
}

fn merge_hi_run<T, E, F>(
    items: &mut [T],
    scratch: &[T],
    min_gallop_state: &mut usize,
    c: &mut HiCursors,
    is_less: &mut F,
) -> Result<(), E>
where
    T: Copy,
    F: FnMut(&T, &T) -> Result<bool, E>,
{
    // A's last element always wins the opening move: merge_at trimmed B to
    // end strictly before it.
    let tmp = items[c.aend - 1];
    c.dend -= 1;
    items[c.dend] = tmp;
    c.aend -= 1;
    c.na -= 1;
    if c.na == 0 {
        return Ok(());
    }
    if c.nb == 1 {
        return copy_a_head(items, scratch, c);
    }

    let mut min_gallop = *min_gallop_state;
    loop {
        let mut acount = 0usize;
        let mut bcount = 0usize;

        loop {
            debug_assert!(c.na > 0 && c.nb > 1);
            if is_less(&scratch[c.nb - 1], &items[c.aend - 1])? {
                let tmp = items[c.aend - 1];
                c.dend -= 1;
                items[c.dend] = tmp;
                c.aend -= 1;
                c.na -= 1;
                acount += 1;
                bcount = 0;
                if c.na == 0 {
                    return Ok(());
                }
                if acount >= min_gallop {
                    break;
                }
            } else {
                c.dend -= 1;
                items[c.dend] = scratch[c.nb - 1];
                c.nb -= 1;
                bcount += 1;
                acount = 0;
                if c.nb == 1 {
                    return copy_a_head(items, scratch, c);
                }
                if bcount >= min_gallop {
                    break;
                }
            }
        }

        min_gallop += 1;
        loop {
            min_gallop -= (min_gallop > 1) as usize;
            *min_gallop_state = min_gallop;

            let k = gallop_right(
                &scratch[c.nb - 1],
                &items[c.base_a..c.aend],
                c.na - 1,
                is_less,
            )?;
            let moved = c.na - k;
            acount = moved;
            if moved > 0 {
                items.copy_within(c.aend - moved..c.aend, c.dend - moved);
                c.dend -= moved;
                c.aend -= moved;
                c.na -= moved;
                if c.na == 0 {
                    return Ok(());
                }
            }
            c.dend -= 1;
            items[c.dend] = scratch[c.nb - 1];
            c.nb -= 1;
            if c.nb == 1 {
                return copy_a_head(items, scratch, c);
            }

            let k = gallop_left(&items[c.aend - 1], &scratch[..c.nb], c.nb - 1, is_less)?;
            let moved = c.nb - k;
            bcount = moved;
            if moved > 0 {
                items[c.dend - moved..c.dend].copy_from_slice(&scratch[c.nb - moved..c.nb]);
                c.dend -= moved;
                c.nb -= moved;
                if c.nb == 1 {
                    return copy_a_head(items, scratch, c);
                }
                // nb == 0 can only happen with an inconsistent comparator.
                if c.nb == 0 {
                    return Ok(());
                }
            }
            let tmp = items[c.aend - 1];
            c.dend -= 1;
            items[c.dend] = tmp;
            c.aend -= 1;
            c.na -= 1;
            if c.na == 0 {
                return Ok(());
            }
            if acount < MIN_GALLOP && bcount < MIN_GALLOP {
                break;
            }
        }
        min_gallop += 1; // penalty for leaving galloping mode
        *min_gallop_state = min_gallop;
    }
}

/// `merge_hi` endgame once B is down to one element: that element belongs at
/// the very front of the merge area, before all of A.
fn copy_a_head<T, E>(items: &mut [T], scratch: &[T], c: &mut HiCursors) -> Result<(), E>
where
    T: Copy,
{
    debug_assert!(c.nb == 1 && c.na > 0);
    items.copy_within(c.base_a..c.aend, c.dend - c.na);
    c.dend -= c.na + 1;
    items[c.dend] = scratch[0];
    c.na = 0;
    c.nb = 0;
    Ok(())
}
