//! Hit window thresholds and the nested judgement classification.

use crate::models::stats::Judgement;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitWindow {
    pub perfect_s: f64,
    pub great_s: f64,
    pub meh_s: f64,
}

impl HitWindow {
    /// Manual defaults used when no settings file is present.
    pub fn new() -> Self {
        Self {
            perfect_s: 0.08,
            great_s: 0.18,
            meh_s: 0.3,
        }
    }

    pub fn from_custom(perfect: f64, great: f64, meh: f64) -> Self {
        Self {
            perfect_s: perfect,
            great_s: great,
            meh_s: meh,
        }
    }

    /// Classifies `delta = target_time - current_time`.
    ///
    /// Returns `None` when the target is not due yet (`delta >= meh`). Late
    /// presses are never rejected here: anything below the meh bound is at
    /// least a meh, and the miss sweep is what retires notes that ran out.
    pub fn judge(&self, delta: f64) -> Option<Judgement> {
        if delta >= self.meh_s {
            return None;
        }

        let mut judgement = Judgement::Meh;
        if delta.abs() < self.great_s {
            judgement = Judgement::Great;
            if delta.abs() < self.perfect_s {
                judgement = Judgement::Perfect;
            }
        }
        Some(judgement)
    }

    /// True once a note stamped at `target_time` can no longer be hit.
    pub fn is_expired(&self, target_time: f64, current_time: f64) -> bool {
        target_time + self.meh_s < current_time
    }

    /// Combines a hold's press judgement with its release judgement.
    ///
    /// The release can only downgrade, and never below meh: a hold whose head
    /// was hit is not turned into a miss by its tail. A release that is too
    /// early to classify counts as the lowest release tier.
    pub fn combine_release(&self, press: Judgement, release: Option<Judgement>) -> Judgement {
        let release = release.unwrap_or(Judgement::Miss);
        press.min(release).max(Judgement::Meh)
    }
}

impl Default for HitWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_thresholds_classify_presses() {
        let window = HitWindow::from_custom(0.08, 0.18, 0.3);
        assert_eq!(window.judge(0.05), Some(Judgement::Perfect));
        assert_eq!(window.judge(0.12), Some(Judgement::Great));
        assert_eq!(window.judge(0.25), Some(Judgement::Meh));
        assert_eq!(window.judge(0.4), None);
    }

    #[test]
    fn late_presses_use_absolute_delta() {
        let window = HitWindow::new();
        assert_eq!(window.judge(-0.05), Some(Judgement::Perfect));
        assert_eq!(window.judge(-0.12), Some(Judgement::Great));
        assert_eq!(window.judge(-0.25), Some(Judgement::Meh));
        assert_eq!(window.judge(-0.5), Some(Judgement::Meh));
    }

    #[test]
    fn meh_bound_is_exclusive() {
        let window = HitWindow::new();
        assert_eq!(window.judge(0.3), None);
        assert!(!window.is_expired(1.0, 1.3));
        assert!(window.is_expired(1.0, 1.31));
    }

    #[test]
    fn release_only_downgrades_and_floors_at_meh() {
        let window = HitWindow::new();
        assert_eq!(
            window.combine_release(Judgement::Perfect, Some(Judgement::Great)),
            Judgement::Great
        );
        assert_eq!(
            window.combine_release(Judgement::Great, Some(Judgement::Perfect)),
            Judgement::Great
        );
        assert_eq!(window.combine_release(Judgement::Perfect, None), Judgement::Meh);
        assert_eq!(
            window.combine_release(Judgement::Meh, Some(Judgement::Miss)),
            Judgement::Meh
        );
    }
}
