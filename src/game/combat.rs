use crate::config::{LANE_BAND, NEAR_HIT_DISTANCE, NEAR_HIT_SCORE, PERFECT_HIT_SCORE};
use crate::core::audio::Sound;
use crate::game::entity::{EnemyArena, EnemyId, Lane, TargetPoints};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgment {
    Perfect,
    Near,
    Miss,
}

impl Judgment {
    #[inline(always)]
    pub fn score(self) -> u32 {
        match self {
            Judgment::Perfect => PERFECT_HIT_SCORE,
            Judgment::Near => NEAR_HIT_SCORE,
            Judgment::Miss => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Hit,
    Miss,
}

impl Feedback {
    pub fn sound(self) -> Sound {
        match self {
            Feedback::Hit => Sound::Hit,
            Feedback::Miss => Sound::Miss,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Hit,
    Miss,
}

/// Everything one attack produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttackOutcome {
    pub score_delta: u32,
    pub killed: Vec<EnemyId>,
    /// One entry per enemy looked at (one miss for an empty field), in arena order.
    pub feedback: Vec<Feedback>,
}

impl AttackOutcome {
    pub fn outcome(&self) -> Outcome {
        if self.killed.is_empty() { Outcome::Miss } else { Outcome::Hit }
    }

    pub fn hits(&self) -> usize {
        self.feedback.iter().filter(|f| **f == Feedback::Hit).count()
    }

    pub fn misses(&self) -> usize {
        self.feedback.iter().filter(|f| **f == Feedback::Miss).count()
    }
}

/// Judges an attack on `lane` against every live enemy.
///
/// Each enemy is judged on its own, so a single attack can kill several.
/// Killed enemies are marked during the pass and compacted after it.
pub fn resolve_attack(lane: Lane, arena: &mut EnemyArena, targets: &TargetPoints) -> AttackOutcome {
    let mut result = AttackOutcome::default();
    if arena.is_empty() {
        result.feedback.push(Feedback::Miss);
        return result;
    }

    let target = *targets.for_lane(lane);
    let judged: Vec<(EnemyId, Judgment)> = arena
        .iter()
        .map(|enemy| {
            let judgment = if (enemy.rect.y - target.y).abs() >= LANE_BAND {
                Judgment::Miss
            } else if target.overlaps(&enemy.rect) {
                Judgment::Perfect
            } else if (enemy.rect.x - target.x).abs() < NEAR_HIT_DISTANCE {
                Judgment::Near
            } else {
                Judgment::Miss
            };
            (enemy.id, judgment)
        })
        .collect();

    for (id, judgment) in judged {
        if judgment == Judgment::Miss {
            result.feedback.push(Feedback::Miss);
        } else if arena.kill(id) {
            result.score_delta += judgment.score();
            result.killed.push(id);
            result.feedback.push(Feedback::Hit);
        }
    }
    arena.compact();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::Rect;

    fn targets() -> TargetPoints {
        TargetPoints::standard()
    }

    #[test]
    fn empty_field_is_a_single_miss() {
        for lane in [Lane::Upper, Lane::Lower] {
            let mut arena = EnemyArena::new();
            let result = resolve_attack(lane, &mut arena, &targets());
            assert_eq!(result.score_delta, 0);
            assert_eq!(result.outcome(), Outcome::Miss);
            assert_eq!(result.feedback, vec![Feedback::Miss]);
        }
    }

    #[test]
    fn exact_overlap_is_perfect() {
        let t = targets();
        let mut arena = EnemyArena::new();
        let id = arena.insert(1, Lane::Lower, 0, t.lower);
        let result = resolve_attack(Lane::Lower, &mut arena, &t);
        assert_eq!(result.score_delta, 100);
        assert_eq!(result.killed, vec![id]);
        assert_eq!(result.hits(), 1);
        assert_eq!(result.misses(), 0);
        assert!(arena.is_empty());
    }

    #[test]
    fn close_without_overlap_is_near() {
        let t = targets();
        let mut arena = EnemyArena::new();
        let rect = Rect::new(t.upper.x - 80, t.upper.y, 60, 100);
        assert!(!rect.overlaps(&t.upper));
        arena.insert(2, Lane::Upper, 0, rect);
        let result = resolve_attack(Lane::Upper, &mut arena, &t);
        assert_eq!(result.score_delta, 50);
        assert_eq!(result.outcome(), Outcome::Hit);
    }

    #[test]
    fn wrong_lane_band_is_a_miss() {
        let t = targets();
        let mut arena = EnemyArena::new();
        let rect = Rect::new(t.lower.x, t.lower.y - 60, 100, 100);
        let id = arena.insert(1, Lane::Upper, 0, rect);
        let result = resolve_attack(Lane::Lower, &mut arena, &t);
        assert_eq!(result.score_delta, 0);
        assert_eq!(result.outcome(), Outcome::Miss);
        assert_eq!(result.feedback, vec![Feedback::Miss]);
        assert!(arena.get(id).is_some());
    }

    #[test]
    fn far_enemy_in_lane_is_a_miss() {
        let t = targets();
        let mut arena = EnemyArena::new();
        arena.insert(1, Lane::Upper, 0, Rect::new(t.upper.x + 100, t.upper.y, 100, 100));
        let result = resolve_attack(Lane::Upper, &mut arena, &t);
        assert_eq!(result.score_delta, 0);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn one_attack_can_hit_several_and_miss_the_rest() {
        let t = targets();
        let mut arena = EnemyArena::new();
        arena.insert(1, Lane::Upper, 0, t.upper);
        arena.insert(3, Lane::Upper, 0, Rect::new(t.upper.x + 40, t.upper.y - 10, 120, 120));
        arena.insert(2, Lane::Lower, 0, t.lower);
        arena.insert(2, Lane::Lower, 0, Rect::new(900, t.lower.y, 120, 120));
        let result = resolve_attack(Lane::Upper, &mut arena, &t);
        assert_eq!(result.score_delta, 200);
        assert_eq!(result.killed.len(), 2);
        assert_eq!(result.feedback, vec![Feedback::Hit, Feedback::Hit, Feedback::Miss, Feedback::Miss]);
        assert_eq!(arena.len(), 2);
    }
}
