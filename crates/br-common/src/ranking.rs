//! Ranking builder: damage ledger → totally ordered standings.
//!
//! Standings are fully recomputed from the ledger every run; nothing here is
//! incremental. Ordering is total damage descending with rider id ascending
//! as the tie-break, so equal-damage riders rank deterministically across
//! reruns regardless of storage read order.

use std::collections::BTreeMap;

/// One rider's standing within a raid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedRider {
    pub rider_id: String,
    pub total_damage: i64,
    /// 1-based, contiguous.
    pub rank: i32,
}

/// Re-aggregate per-day ledger rows into one ranking.
///
/// Input rows are `(rider_id, total_damage)` pairs, one per ledger entry;
/// multiple days for the same rider sum together.
pub fn build_ranking(ledger_rows: &[(String, i64)]) -> Vec<RankedRider> {
    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for (rider_id, total_damage) in ledger_rows {
        *totals.entry(rider_id.as_str()).or_insert(0) += total_damage;
    }

    let mut entries: Vec<(&str, i64)> = totals.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    entries
        .into_iter()
        .zip(1..)
        .map(|((rider_id, total_damage), rank)| RankedRider {
            rider_id: rider_id.to_string(),
            total_damage,
            rank,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rider: &str, damage: i64) -> (String, i64) {
        (rider.to_string(), damage)
    }

    #[test]
    fn sums_multiple_days_per_rider() {
        let ranking = build_ranking(&[
            row("BC000001", 100),
            row("BC000002", 250),
            row("BC000001", 200),
        ]);

        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].rider_id, "BC000001");
        assert_eq!(ranking[0].total_damage, 300);
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[1].rider_id, "BC000002");
        assert_eq!(ranking[1].rank, 2);
    }

    #[test]
    fn ranks_are_contiguous_and_order_matches_damage() {
        let ranking = build_ranking(&[
            row("BC000003", 10),
            row("BC000001", 500),
            row("BC000002", 40),
            row("BC000004", 40),
        ]);

        for (index, entry) in ranking.iter().enumerate() {
            assert_eq!(entry.rank, index as i32 + 1);
        }
        for pair in ranking.windows(2) {
            assert!(pair[0].total_damage >= pair[1].total_damage);
        }
    }

    #[test]
    fn exact_ties_break_by_rider_id_ascending() {
        let ranking = build_ranking(&[
            row("BC000009", 70),
            row("BC000001", 70),
            row("BC000005", 70),
        ]);

        let order: Vec<&str> = ranking.iter().map(|e| e.rider_id.as_str()).collect();
        assert_eq!(order, ["BC000001", "BC000005", "BC000009"]);

        // Same rows in a different read order rank identically.
        let shuffled = build_ranking(&[
            row("BC000005", 70),
            row("BC000009", 70),
            row("BC000001", 70),
        ]);
        assert_eq!(ranking, shuffled);
    }

    #[test]
    fn empty_ledger_yields_empty_ranking() {
        assert!(build_ranking(&[]).is_empty());
    }
}
