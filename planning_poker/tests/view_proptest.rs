/// Property-based tests for the room projections using proptest
///
/// These tests check the roster mapping, the vote tally and the consensus
/// check against randomly generated tables.
use planning_poker::{
    EstimateOption, Player, PlayerEstimate, PlayersById, count_estimates, map_room_players,
    should_celebrate,
};
use proptest::prelude::*;
use std::collections::HashSet;
use uuid::Uuid;

// Strategy for a stored estimate: a catalog card, a padded card, an unknown
// string, or nothing
fn estimate_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        3 => (0..EstimateOption::ALL.len())
            .prop_map(|i| Some(EstimateOption::ALL[i].as_str().to_string())),
        1 => (0..EstimateOption::ALL.len())
            .prop_map(|i| Some(format!(" {}", EstimateOption::ALL[i].as_str()))),
        1 => "[a-z]{1,3}".prop_map(Some),
        1 => Just(None),
    ]
}

fn players_strategy(max: usize) -> impl Strategy<Value = Vec<PlayerEstimate>> {
    prop::collection::vec(estimate_strategy(), 0..=max).prop_map(|estimates| {
        estimates
            .into_iter()
            .enumerate()
            .map(|(i, estimate)| PlayerEstimate {
                id: Uuid::new_v4(),
                name: format!("player{}", i),
                estimate,
            })
            .collect()
    })
}

// A roster of fresh ids plus a lookup holding a random subset of them
fn roster_strategy() -> impl Strategy<Value = (Vec<Uuid>, Vec<bool>)> {
    prop::collection::vec(any::<bool>(), 0..12).prop_map(|known| {
        let roster = known.iter().map(|_| Uuid::new_v4()).collect();
        (roster, known)
    })
}

proptest! {
    #[test]
    fn test_mapping_keeps_roster_order_and_drops_unknown((roster, known) in roster_strategy()) {
        let lookup: PlayersById = roster
            .iter()
            .zip(&known)
            .filter(|(_, keep)| **keep)
            .map(|(id, _)| (*id, Player::new(*id, id.to_string())))
            .collect();

        let mapped = map_room_players(&roster, &lookup);

        let expected: Vec<Uuid> = roster
            .iter()
            .zip(&known)
            .filter(|(_, keep)| **keep)
            .map(|(id, _)| *id)
            .collect();
        let actual: Vec<Uuid> = mapped.iter().map(|p| p.id).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn test_counts_sum_to_known_votes(players in players_strategy(20)) {
        let counts = count_estimates(&players, &EstimateOption::ALL);

        let known_votes = players
            .iter()
            .filter_map(|p| p.estimate.as_deref())
            .filter(|e| EstimateOption::ALL.iter().any(|o| o.as_str() == *e))
            .count();

        prop_assert_eq!(counts.len(), EstimateOption::ALL.len());
        prop_assert_eq!(counts.values().sum::<usize>(), known_votes);
    }

    #[test]
    fn test_celebrate_matches_definition(players in players_strategy(6), revealed in any::<bool>()) {
        let all_voted = players.iter().all(|p| p.estimate.is_some());
        let distinct: HashSet<_> = players.iter().map(|p| p.estimate.clone()).collect();
        let expected = revealed && players.len() >= 2 && all_voted && distinct.len() == 1;

        prop_assert_eq!(should_celebrate(&players, revealed), expected);
    }

    #[test]
    fn test_never_celebrate_when_hidden(players in players_strategy(6)) {
        prop_assert!(!should_celebrate(&players, false));
    }
}
