use indexmap::IndexMap;

/// Points awarded by number of hints revealed when the correct guess lands.
/// Any cursor past the last tier earns the last tier.
pub const SCORING_TABLE: [u32; 4] = [10, 6, 3, 1];

/// Points for a correct guess made after `hints_revealed` hints.
pub fn points_for(hints_revealed: usize) -> u32 {
    SCORING_TABLE[hints_revealed.min(SCORING_TABLE.len() - 1)]
}

/// Cumulative score per player display name.
///
/// Insertion order is kept so that equal scores rank by first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    scores: IndexMap<String, u32>,
}

/// One line of a ranked leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// 1-based rank.
    pub rank: usize,
    /// Player display name.
    pub player: String,
    /// Cumulative score.
    pub score: u32,
}

impl Leaderboard {
    /// Build a leaderboard from persisted scores, keeping their order.
    pub fn from_scores(scores: IndexMap<String, u32>) -> Self {
        Self { scores }
    }

    /// Borrow the raw scores in insertion order.
    pub fn scores(&self) -> &IndexMap<String, u32> {
        &self.scores
    }

    /// Add `points` to `player`, creating the entry when absent, and return the new total.
    pub fn award(&mut self, player: &str, points: u32) -> u32 {
        let total = self.scores.entry(player.to_string()).or_insert(0);
        *total = total.saturating_add(points);
        *total
    }

    /// Rank players by score descending; ties keep insertion order.
    pub fn standings(&self) -> Vec<Standing> {
        let mut entries: Vec<(&String, &u32)> = self.scores.iter().collect();
        // `sort_by` is stable, which is what keeps ties in first-seen order.
        entries.sort_by(|a, b| b.1.cmp(a.1));
        entries
            .into_iter()
            .enumerate()
            .map(|(index, (player, score))| Standing {
                rank: index + 1,
                player: player.clone(),
                score: *score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_table_is_clamped() {
        assert_eq!(points_for(0), 10);
        assert_eq!(points_for(1), 6);
        assert_eq!(points_for(2), 3);
        assert_eq!(points_for(3), 1);
        assert_eq!(points_for(4), 1);
        assert_eq!(points_for(usize::MAX), 1);
    }

    #[test]
    fn award_creates_then_accumulates() {
        let mut board = Leaderboard::default();
        assert_eq!(board.award("ana", 6), 6);
        assert_eq!(board.award("ana", 10), 16);
        assert_eq!(board.scores().get("ana"), Some(&16));
        assert!(!board.scores().contains_key("bruno"));
    }

    #[test]
    fn ties_rank_by_insertion_order() {
        let mut board = Leaderboard::default();
        board.award("A", 10);
        board.award("B", 10);
        board.award("C", 5);

        let order: Vec<_> = board
            .standings()
            .into_iter()
            .map(|standing| standing.player)
            .collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn higher_scores_rank_first() {
        let mut board = Leaderboard::default();
        board.award("low", 1);
        board.award("high", 10);
        board.award("mid", 6);

        let standings = board.standings();
        assert_eq!(standings[0].player, "high");
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[1].player, "mid");
        assert_eq!(standings[2].player, "low");
        assert_eq!(standings[2].rank, 3);
    }
}
