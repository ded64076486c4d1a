//! Recommendation selection: strongest signal wins, blocklisted winner means
//! no recommendation at all.

use crate::blocklist::Blocklist;
use crate::types::ScanCandidate;

/// Pick the network to recommend from a scan.
///
/// The candidate with the strictly highest `rssi` is chosen; on ties the
/// first one seen is kept. If that candidate's SSID is blocklisted the result
/// is `None`. The runner-up is never considered.
pub fn recommend_network<'a>(
    candidates: &'a [ScanCandidate],
    blocklist: &Blocklist,
) -> Option<&'a ScanCandidate> {
    let mut best: Option<&ScanCandidate> = None;
    for candidate in candidates {
        if best.is_none_or(|b| candidate.rssi > b.rssi) {
            best = Some(candidate);
        }
    }

    best.filter(|c| !blocklist.contains(&c.ssid))
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(entries: &[(&str, i32)]) -> Vec<ScanCandidate> {
        entries
            .iter()
            .map(|(ssid, rssi)| ScanCandidate::new(*ssid, *rssi))
            .collect()
    }

    #[test]
    fn empty_scan_yields_none() {
        assert!(recommend_network(&[], &Blocklist::new()).is_none());
    }

    #[test]
    fn strongest_signal_wins() {
        let candidates = scan(&[("Net1", -60), ("Net2", -40), ("Net3", -75)]);
        let pick = recommend_network(&candidates, &Blocklist::new()).expect("pick");
        assert_eq!(pick.ssid, "Net2");
    }

    #[test]
    fn first_seen_wins_ties() {
        let candidates = scan(&[("A", -50), ("B", -50)]);
        let pick = recommend_network(&candidates, &Blocklist::new()).expect("pick");
        assert_eq!(pick.ssid, "A");
    }

    #[test]
    fn blocklisted_winner_yields_none_without_fallback() {
        let candidates = scan(&[("Net1", -60), ("Net2", -40)]);
        let blocklist: Blocklist = ["Net2"].into_iter().collect();
        assert!(recommend_network(&candidates, &blocklist).is_none());
    }

    #[test]
    fn blocklisted_runner_up_does_not_matter() {
        let candidates = scan(&[("Net1", -60), ("Net2", -40)]);
        let blocklist: Blocklist = ["Net1"].into_iter().collect();
        let pick = recommend_network(&candidates, &blocklist).expect("pick");
        assert_eq!(pick.ssid, "Net2");
    }

    #[test]
    fn very_weak_single_candidate_is_still_picked() {
        let candidates = scan(&[("Far", i32::MIN)]);
        let pick = recommend_network(&candidates, &Blocklist::new()).expect("pick");
        assert_eq!(pick.ssid, "Far");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_candidate() -> impl Strategy<Value = ScanCandidate> {
        ("[A-E]", -100i32..-20).prop_map(|(ssid, rssi)| ScanCandidate::new(ssid, rssi))
    }

    proptest! {
        /// Non-empty scan: result is the first maximal element, unless it is blocklisted.
        #[test]
        fn picks_first_maximum_or_nothing(
            candidates in proptest::collection::vec(arb_candidate(), 1..12),
            blocked in proptest::collection::btree_set("[A-E]", 0..3),
        ) {
            let blocklist: Blocklist = blocked.iter().cloned().collect();
            let max = candidates.iter().map(|c| c.rssi).max().unwrap_or(i32::MIN);
            let first_max = candidates.iter().find(|c| c.rssi == max).cloned();
            let first_max = first_max.expect("non-empty");

            let result = recommend_network(&candidates, &blocklist);
            if blocklist.contains(&first_max.ssid) {
                prop_assert!(result.is_none());
            } else {
                prop_assert_eq!(result, Some(&first_max));
            }
        }

        /// Same input, same output.
        #[test]
        fn deterministic(
            candidates in proptest::collection::vec(arb_candidate(), 0..12),
        ) {
            let blocklist = Blocklist::new();
            let a = recommend_network(&candidates, &blocklist).cloned();
            let b = recommend_network(&candidates, &blocklist).cloned();
            prop_assert_eq!(a, b);
        }
    }
}
