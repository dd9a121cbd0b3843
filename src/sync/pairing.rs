use rand::Rng;

/// Draws the merge order for a working list of `len` places, keeping `keep`
/// of them unmerged.
///
/// Each entry `(a, b)` addresses the working list as it stands when the pair
/// is consumed: slot `a` receives the merged place and slot `b` is
/// swap-removed, so the pool shrinks by one per pair. `a != b` always holds and
/// both lie in `0..len - i` for the `i`-th pair.
pub fn pairing_order<R>(len: usize, keep: usize, rng: &mut R) -> Vec<(usize, usize)>
where
    R: Rng + ?Sized,
{
    let keep = keep.max(1);
    let mut pairs = Vec::with_capacity(len.saturating_sub(keep));
    let Some(mut top) = len.checked_sub(1) else {
        return pairs;
    };
    while top >= keep {
        let first = rng.random_range(0..=top);
        let mut second = rng.random_range(0..top);
        if second >= first {
            second += 1;
        }
        pairs.push((first, second));
        top -= 1;
    }
    pairs
}
