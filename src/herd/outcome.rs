use super::grouping::AnswerGroup;

/// Result of one grouping pass
#[derive(Debug, Clone, PartialEq)]
pub enum HerdOutcome {
    /// A single group strictly larger than every other, with at least two members
    Herd(AnswerGroup),
    /// Several groups share the top size, or nobody agreed with anybody
    Tie(Vec<AnswerGroup>),
    /// Nothing to group
    NoGroups,
}

impl HerdOutcome {
    pub fn herd(&self) -> Option<&AnswerGroup> {
        match self {
            HerdOutcome::Herd(group) => Some(group),
            _ => None,
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, HerdOutcome::Tie(_))
    }
}

/// Pick the winning group.
///
/// The largest group wins only if no other group has the same size and it
/// holds more than one player. Everything else is a tie carrying all groups.
pub fn select_herd(mut groups: Vec<AnswerGroup>) -> HerdOutcome {
    let Some(max_size) = groups.iter().map(AnswerGroup::size).max() else {
        return HerdOutcome::NoGroups;
    };

    let top: Vec<usize> = groups
        .iter()
        .enumerate()
        .filter(|(_, g)| g.size() == max_size)
        .map(|(i, _)| i)
        .collect();

    match top[..] {
        [winner] if max_size > 1 => HerdOutcome::Herd(groups.swap_remove(winner)),
        _ => HerdOutcome::Tie(groups),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(text: &str, players: &[&str]) -> AnswerGroup {
        AnswerGroup {
            representative: text.to_string(),
            players: players.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_strict_majority_wins() {
        let outcome = select_herd(vec![group("tacos", &["c"]), group("pizza", &["a", "b"])]);
        assert_eq!(outcome, HerdOutcome::Herd(group("pizza", &["a", "b"])));
    }

    #[test]
    fn test_two_way_tie() {
        let groups = vec![group("red", &["a", "b"]), group("blue", &["c", "d"])];
        let outcome = select_herd(groups.clone());
        assert_eq!(outcome, HerdOutcome::Tie(groups));
        assert!(outcome.herd().is_none());
    }

    #[test]
    fn test_everyone_disagrees_is_tie() {
        let groups = vec![group("red", &["a"]), group("blue", &["b"]), group("green", &["c"])];
        let outcome = select_herd(groups);
        match outcome {
            HerdOutcome::Tie(groups) => assert_eq!(groups.len(), 3),
            other => panic!("expected tie, got {other:?}"),
        }
    }

    #[test]
    fn test_single_group_of_one_is_tie() {
        assert!(select_herd(vec![group("solo", &["a"])]).is_tie());
    }

    #[test]
    fn test_no_groups() {
        assert_eq!(select_herd(Vec::new()), HerdOutcome::NoGroups);
    }

    #[test]
    fn test_winner_not_first_in_order() {
        let outcome = select_herd(vec![
            group("a", &["p1"]),
            group("b", &["p2", "p3", "p4"]),
            group("c", &["p5", "p6"]),
        ]);
        assert_eq!(outcome.herd().unwrap().representative, "b");
    }
}
