/// Enumerates every way to spend slip days on the late slip groups of
/// one category: each group may receive up to its own count of late
/// days, and the total spent stays within the budget. The zero
/// allocation is always present.
pub(crate) fn slip_allocations(late_days: &[u32], budget: u32) -> Vec<Vec<u32>> {
    let mut allocations = Vec::new();
    let mut current = vec![0u32; late_days.len()];
    extend(late_days, budget, 0, &mut current, &mut allocations);
    allocations
}

fn extend(
    late_days: &[u32],
    remaining: u32,
    index: usize,
    current: &mut Vec<u32>,
    out: &mut Vec<Vec<u32>>,
) {
    if index == late_days.len() {
        out.push(current.clone());
        return;
    }
    let cap = late_days[index].min(remaining);
    for days in 0..=cap {
        current[index] = days;
        extend(late_days, remaining - days, index + 1, current, out);
    }
    current[index] = 0;
}
