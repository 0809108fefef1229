/// Enumerates every subset of slip-group indices with size up to the
/// drop budget, smallest subsets first. The search is exhaustive over
/// subsets rather than a lowest-score heuristic, so the eventual
/// selection is optimal even when assignment weights are unequal.
pub(crate) fn drop_subsets(count: usize, budget: u32) -> Vec<Vec<usize>> {
    let budget = (budget as usize).min(count);
    let mut subsets = vec![Vec::new()];
    for size in 1..=budget {
        let mut current = Vec::with_capacity(size);
        choose(0, count, size, &mut current, &mut subsets);
    }
    subsets
}

fn choose(
    start: usize,
    count: usize,
    size: usize,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if current.len() == size {
        out.push(current.clone());
        return;
    }
    for index in start..count {
        current.push(index);
        choose(index + 1, count, size, current, out);
        current.pop();
    }
}
