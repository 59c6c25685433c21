use super::config::SectionConfig;
use super::{BodyEntry, ItemBreach, TeamEntry};

pub(crate) struct SectionTally {
    pub raw: i64,
    pub total: i64,
}

/// Body is capped unconditionally; the config validator guarantees `capped`.
pub(crate) fn tally_body(entries: &[BodyEntry], config: &SectionConfig) -> SectionTally {
    let raw = saturating_sum(entries.iter().map(|entry| entry.points));
    SectionTally {
        raw,
        total: cap(raw, config.maximum),
    }
}

pub(crate) fn tally_team(entries: &[TeamEntry], config: &SectionConfig) -> SectionTally {
    let raw = saturating_sum(
        entries
            .iter()
            .filter(|entry| entry.included)
            .map(|entry| entry.points),
    );
    let total = if config.capped {
        cap(raw, config.maximum)
    } else {
        raw
    };
    SectionTally { raw, total }
}

pub(crate) fn item_breaches(entries: &[BodyEntry]) -> Vec<ItemBreach> {
    entries
        .iter()
        .filter_map(|entry| {
            let minimum = entry.minimum?;
            (entry.points < minimum).then(|| ItemBreach {
                criterion: entry.criterion.clone(),
                minimum,
                points: entry.points,
            })
        })
        .collect()
}

/// Sums clamp at the `i64` bounds; a clamped raw total still caps to the section maximum.
pub(crate) fn saturating_sum<I: IntoIterator<Item = i64>>(points: I) -> i64 {
    points.into_iter().fold(0, i64::saturating_add)
}

fn cap(raw: i64, maximum: i64) -> i64 {
    raw.min(maximum)
}
