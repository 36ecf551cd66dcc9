//! Judgement tiers and accumulated hit statistics.

use crate::state::traits::ScoreSink;
use serde::{Deserialize, Serialize};

/// Judgement tiers from worst to best.
///
/// The discriminants are the tier numbers reported to the score sink, so the
/// derived ordering doubles as "better than".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Judgement {
    Miss = 0,
    Meh = 1,
    Great = 2,
    Perfect = 3,
}

impl Judgement {
    /// Integer tier (0 = miss .. 3 = perfect).
    pub fn tier(self) -> u8 {
        self as u8
    }

    pub fn from_tier(tier: u8) -> Option<Self> {
        match tier {
            0 => Some(Judgement::Miss),
            1 => Some(Judgement::Meh),
            2 => Some(Judgement::Great),
            3 => Some(Judgement::Perfect),
            _ => None,
        }
    }

    pub fn is_miss(self) -> bool {
        self == Judgement::Miss
    }

    /// Base score awarded for this tier.
    pub fn score(self) -> u32 {
        match self {
            Judgement::Perfect => 300,
            Judgement::Great => 200,
            Judgement::Meh => 100,
            Judgement::Miss => 0,
        }
    }
}

/// Accumulated hit statistics for a play session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HitStats {
    pub perfect: u32,
    pub great: u32,
    pub meh: u32,
    pub miss: u32,
}

impl HitStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, judgement: Judgement) {
        match judgement {
            Judgement::Perfect => self.perfect += 1,
            Judgement::Great => self.great += 1,
            Judgement::Meh => self.meh += 1,
            Judgement::Miss => self.miss += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.perfect + self.great + self.meh + self.miss
    }

    /// Calculates accuracy percentage (0-100).
    ///
    /// Weights: perfect 3, great 2, meh 1, miss 0.
    pub fn calculate_accuracy(&self) -> f64 {
        let total = self.total() as f64;
        if total == 0.0 {
            return 0.0;
        }

        let score = self.perfect as f64 * 3.0 + self.great as f64 * 2.0 + self.meh as f64;
        (score / (total * 3.0)) * 100.0
    }
}

/// Running score for a session, fed one judgement per resolved note.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub hit_stats: HitStats,
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, judgement: Judgement, rainbow: bool) {
        self.hit_stats.record(judgement);

        let multiplier = if rainbow { 2 } else { 1 };
        self.score += judgement.score() * multiplier;

        if judgement.is_miss() {
            self.combo = 0;
        } else {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        }
    }

    pub fn accuracy(&self) -> f64 {
        self.hit_stats.calculate_accuracy()
    }
}

impl ScoreSink for ScoreBoard {
    fn update_score(&mut self, judgement: Judgement, rainbow: bool) {
        self.apply(judgement, rainbow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_order_from_miss_to_perfect() {
        assert!(Judgement::Miss < Judgement::Meh);
        assert!(Judgement::Meh < Judgement::Great);
        assert!(Judgement::Great < Judgement::Perfect);
        assert_eq!(Judgement::from_tier(2), Some(Judgement::Great));
        assert_eq!(Judgement::from_tier(4), None);
    }

    #[test]
    fn accuracy_is_weighted() {
        let mut stats = HitStats::new();
        stats.record(Judgement::Perfect);
        stats.record(Judgement::Miss);
        assert_eq!(stats.total(), 2);
        assert!((stats.calculate_accuracy() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_stats_have_zero_accuracy() {
        assert_eq!(HitStats::new().calculate_accuracy(), 0.0);
    }

    #[test]
    fn board_tracks_combo_and_rainbow_bonus() {
        let mut board = ScoreBoard::new();
        board.update_score(Judgement::Perfect, false);
        board.update_score(Judgement::Great, true);
        board.update_score(Judgement::Miss, false);
        board.update_score(Judgement::Meh, false);

        assert_eq!(board.score, 300 + 400 + 100);
        assert_eq!(board.combo, 1);
        assert_eq!(board.max_combo, 2);
        assert_eq!(board.hit_stats.total(), 4);
        assert!((board.accuracy() - 50.0).abs() < 1e-9);
    }
}
