/// Greedy first-fit grouping of sizes sorted in ascending order.
///
/// The first entry is always taken, even when it alone is over the threshold.
/// Every later entry is taken only if it keeps the running total strictly
/// below `soft_threshold`. Returns the indices of the taken entries.
pub fn greedy_pack(sorted_sizes: &[u64], soft_threshold: u64) -> Vec<usize> {
    let Some((&first, rest)) = sorted_sizes.split_first() else {
        return Vec::new();
    };

    let mut packed = vec![0];
    let mut total = first;

    for (offset, &size) in rest.iter().enumerate() {
        if total.saturating_add(size) < soft_threshold {
            packed.push(offset + 1);
            total += size;
        }
    }

    packed
}
