use super::domain::{Category, LateMultiplierTable};
use super::{drops, slips};
use serde::Serialize;
use std::collections::BTreeMap;

const SCORE_EPSILON: f64 = 1e-9;

/// One scored submission inside a slip group. The score is already
/// normalized but carries no late penalty yet.
#[derive(Debug, Clone)]
pub(crate) struct GroupMember {
    pub(crate) assignment: String,
    pub(crate) weight: f64,
    pub(crate) score: f64,
}

/// A slip group as one student sees it in one category: the member
/// submissions plus the group's post-extension lateness in whole days.
#[derive(Debug, Clone)]
pub(crate) struct SlipGroup {
    pub(crate) key: String,
    pub(crate) days_late: u32,
    pub(crate) members: Vec<GroupMember>,
}

/// Category budgets after accommodations have been folded in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CategoryBudgets {
    pub(crate) drops: u32,
    pub(crate) slip_days: u32,
}

/// The winning joint resolution for one student in one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOutcome {
    pub category: String,
    pub score: f64,
    pub dropped: Vec<String>,
    pub slip_days_used: BTreeMap<String, u32>,
    pub assignment_scores: BTreeMap<String, f64>,
}

/// Jointly searches drop subsets and slip-day allocations for the
/// resolution with the highest weighted category score. Slip days are
/// never allocated to dropped groups, so the two enumerations compose
/// without wasteful candidates. Ties are settled by fewer slip days
/// spent, then fewer drops.
pub(crate) fn resolve_category(
    category: &Category,
    groups: &[SlipGroup],
    budgets: CategoryBudgets,
    table: &LateMultiplierTable,
) -> CategoryOutcome {
    let mut best: Option<Candidate> = None;

    for subset in drops::drop_subsets(groups.len(), budgets.drops) {
        let kept_late: Vec<usize> = (0..groups.len())
            .filter(|index| !subset.contains(index) && groups[*index].days_late > 0)
            .collect();
        let caps: Vec<u32> = kept_late.iter().map(|&index| groups[index].days_late).collect();

        for allocation in slips::slip_allocations(&caps, budgets.slip_days) {
            let candidate = evaluate(category, groups, table, &subset, &kept_late, &allocation);
            if candidate.beats(best.as_ref()) {
                best = Some(candidate);
            }
        }
    }

    let winner = best.unwrap_or_else(|| Candidate {
        score: 0.0,
        slip_total: 0,
        dropped: Vec::new(),
        slip_by_group: Vec::new(),
    });
    finish(category, groups, table, winner)
}

struct Candidate {
    score: f64,
    slip_total: u32,
    dropped: Vec<usize>,
    slip_by_group: Vec<(usize, u32)>,
}

impl Candidate {
    fn beats(&self, best: Option<&Candidate>) -> bool {
        let Some(best) = best else { return true };
        if self.score > best.score + SCORE_EPSILON {
            return true;
        }
        if self.score < best.score - SCORE_EPSILON {
            return false;
        }
        (self.slip_total, self.dropped.len()) < (best.slip_total, best.dropped.len())
    }
}

fn evaluate(
    category: &Category,
    groups: &[SlipGroup],
    table: &LateMultiplierTable,
    dropped: &[usize],
    kept_late: &[usize],
    allocation: &[u32],
) -> Candidate {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for (index, group) in groups.iter().enumerate() {
        if dropped.contains(&index) {
            continue;
        }
        let spent = kept_late
            .iter()
            .position(|&late| late == index)
            .map(|slot| allocation[slot])
            .unwrap_or(0);
        let residual = group.days_late.saturating_sub(spent);
        let multiplier = penalty(category, table, residual);
        for member in &group.members {
            weighted_sum += member.score * multiplier * member.weight;
            weight_total += member.weight;
        }
    }

    let score = if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        0.0
    };

    let slip_by_group: Vec<(usize, u32)> = kept_late
        .iter()
        .zip(allocation)
        .filter(|(_, &days)| days > 0)
        .map(|(&index, &days)| (index, days))
        .collect();

    Candidate {
        score,
        slip_total: allocation.iter().sum(),
        dropped: dropped.to_vec(),
        slip_by_group,
    }
}

fn penalty(category: &Category, table: &LateMultiplierTable, residual_days: u32) -> f64 {
    if residual_days == 0 {
        1.0
    } else if category.has_late_multiplier {
        table.multiplier(residual_days)
    } else {
        // Hard cutoff for categories without a late multiplier.
        0.0
    }
}

fn finish(
    category: &Category,
    groups: &[SlipGroup],
    table: &LateMultiplierTable,
    winner: Candidate,
) -> CategoryOutcome {
    let mut dropped = Vec::new();
    let mut slip_days_used = BTreeMap::new();
    let mut assignment_scores = BTreeMap::new();

    for (index, group) in groups.iter().enumerate() {
        let spent = winner
            .slip_by_group
            .iter()
            .find(|(group_index, _)| *group_index == index)
            .map(|(_, days)| *days)
            .unwrap_or(0);
        if spent > 0 {
            slip_days_used.insert(group.key.clone(), spent);
        }
        let is_dropped = winner.dropped.contains(&index);
        let residual = group.days_late.saturating_sub(spent);
        let multiplier = penalty(category, table, residual);
        for member in &group.members {
            if is_dropped {
                dropped.push(member.assignment.clone());
            }
            assignment_scores.insert(member.assignment.clone(), member.score * multiplier);
        }
    }
    dropped.sort();

    CategoryOutcome {
        category: category.name.clone(),
        score: winner.score,
        dropped,
        slip_days_used,
        assignment_scores,
    }
}
