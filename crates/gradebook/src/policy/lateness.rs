use chrono::Duration;

/// Subtracts an extension from a submission's lateness. Extensions are
/// whole days and never push lateness below zero.
pub(crate) fn effective_lateness(lateness: Duration, extension_days: i64) -> Duration {
    let adjusted = lateness - Duration::days(extension_days);
    if adjusted < Duration::zero() {
        Duration::zero()
    } else {
        adjusted
    }
}

/// Converts lateness into the whole-day count used for tier lookup.
/// Any partial day counts as a full late day.
pub(crate) fn days_late(lateness: Duration) -> u32 {
    if lateness <= Duration::zero() {
        return 0;
    }
    let whole = lateness.num_days();
    if lateness > Duration::days(whole) {
        whole as u32 + 1
    } else {
        whole as u32
    }
}
