//! Exponential-probe-then-binary-search location routines used by the
//! galloping merge. The two variants differ only in how they break ties, and
//! that difference is what keeps the merge stable: searching a left-run key
//! into the right run must stop before equal elements, searching a right-run
//! key into the left run must stop after them.

/// Index `k` in `0..=a.len()` such that `a[k - 1] < key <= a[k]`: the
/// leftmost admissible slot for `key`. Probing starts at `hint` and doubles
/// outward before the final binary search.
pub(crate) fn gallop_left<T, E, F>(key: &T, a: &[T], hint: usize, is_less: &mut F) -> Result<usize, E>
where
    F: FnMut(&T, &T) -> Result<bool, E>,
{
    let n = a.len();
    debug_assert!(n > 0 && hint < n);

    let mut lo;
    let mut hi;
    if is_less(&a[hint], key)? {
        // a[hint] < key: gallop right until a[hint + last] < key <= a[hint + ofs].
        let maxofs = n - hint;
        let mut last = 0usize;
        let mut ofs = 1usize;
        while ofs < maxofs {
            if is_less(&a[hint + ofs], key)? {
                last = ofs;
                ofs = ofs * 2 + 1;
            } else {
                break;
            }
        }
        if ofs > maxofs {
            ofs = maxofs;
        }
        lo = hint + last + 1;
        hi = hint + ofs;
    } else {
        // key <= a[hint]: gallop left until a[hint - ofs] < key <= a[hint - last].
        let maxofs = hint + 1;
        let mut last = 0usize;
        let mut ofs = 1usize;
        while ofs < maxofs {
            if is_less(&a[hint - ofs], key)? {
                break;
            }
            last = ofs;
            ofs = ofs * 2 + 1;
        }
        if ofs > maxofs {
            ofs = maxofs;
        }
        lo = hint + 1 - ofs;
        hi = hint - last;
    }

    // a[lo - 1] < key <= a[hi] here; narrow to a single slot.
    while lo < hi {
        let m = lo + (hi - lo) / 2;
        if is_less(&a[m], key)? {
            lo = m + 1;
        } else {
            hi = m;
        }
    }
    Ok(lo)
}

/// Index `k` in `0..=a.len()` such that `a[k - 1] <= key < a[k]`: the slot
/// just past any elements equal to `key`.
pub(crate) fn gallop_right<T, E, F>(
    key: &T,
    a: &[T],
    hint: usize,
    is_less: &mut F,
) -> Result<usize, E>
where
    F: FnMut(&T, &T) -> Result<bool, E>,
{
    let n = a.len();
    debug_assert!(n > 0 && hint < n);

    let mut lo;
    let mut hi;
    if is_less(key, &a[hint])? {
        // key < a[hint]: gallop left until a[hint - ofs] <= key < a[hint - last].
        let maxofs = hint + 1;
        let mut last = 0usize;
        let mut ofs = 1usize;
        while ofs < maxofs {
            if is_less(key, &a[hint - ofs])? {
                last = ofs;
                ofs = ofs * 2 + 1;
            } else {
                break;
            }
        }
        if ofs > maxofs {
            ofs = maxofs;
        }
        lo = hint + 1 - ofs;
        hi = hint - last;
    } else {
        // a[hint] <= key: gallop right until a[hint + last] <= key < a[hint + ofs].
        let maxofs = n - hint;
        let mut last = 0usize;
        let mut ofs = 1usize;
        while ofs < maxofs {
            if is_less(key, &a[hint + ofs])? {
                break;
            }
            last = ofs;
            ofs = ofs * 2 + 1;
        }
        if ofs > maxofs {
            ofs = maxofs;
        }
        lo = hint + last + 1;
        hi = hint + ofs;
    }

    // a[lo - 1] <= key < a[hi] here; narrow to a single slot.
    while lo < hi {
        let m = lo + (hi - lo) / 2;
        if is_less(key, &a[m])? {
            hi = m;
        } else {
            lo = m + 1;
        }
    }
    Ok(lo)
}
