use crate::config::{
    ALPHA_MAX, ENEMY_LARGE_SIZE, ENEMY_SMALL_SIZE, ENEMY_TOUCH_OFFSET, HEIGHT, PLAYER_SIZE, TARGET_SIZE, WIDTH,
};
use crate::core::render::PlayerPose;
use crate::game::chart::EnemySpec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lane {
    Upper,
    Lower,
}

impl Lane {
    /// `'U'` is the upper lane, anything else the lower one.
    #[inline(always)]
    pub fn from_chart_char(c: char) -> Self {
        if c == 'U' { Lane::Upper } else { Lane::Lower }
    }
}

/// Integer screen rectangle with half-open edges: touching rects do not overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.w > 0
            && self.h > 0
            && other.w > 0
            && other.h > 0
            && self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// The two strike zones in front of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetPoints {
    pub upper: Rect,
    pub lower: Rect,
}

impl TargetPoints {
    pub fn standard() -> Self {
        let half = TARGET_SIZE / 2;
        let x = WIDTH / 8 + half + 100;
        Self {
            upper: Rect::new(x, HEIGHT / 4 + half, TARGET_SIZE, TARGET_SIZE),
            lower: Rect::new(x, HEIGHT / 2 + half + 40, TARGET_SIZE, TARGET_SIZE),
        }
    }

    #[inline(always)]
    pub fn for_lane(&self, lane: Lane) -> &Rect {
        match lane {
            Lane::Upper => &self.upper,
            Lane::Lower => &self.lower,
        }
    }
}

impl Default for TargetPoints {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub struct ActiveEnemy {
    pub id: EnemyId,
    pub kind: u8,
    pub lane: Lane,
    pub speed: i32,
    pub alpha: i32,
    pub rect: Rect,
    killed: bool,
}

impl ActiveEnemy {
    /// Spawn position just past the right screen edge, in its lane.
    pub fn spawn_rect(kind: u8, lane: Lane) -> Rect {
        let size = if kind == 1 { ENEMY_SMALL_SIZE } else { ENEMY_LARGE_SIZE };
        let y = match lane {
            Lane::Upper => HEIGHT / 4 - 30,
            Lane::Lower => HEIGHT / 2,
        };
        Rect::new(WIDTH + ENEMY_TOUCH_OFFSET, y + ENEMY_TOUCH_OFFSET, size, size)
    }

    #[inline(always)]
    pub fn is_killed(&self) -> bool {
        self.killed
    }
}

/// Entities of one session, addressed by stable ids.
///
/// Removal during a pass only marks; [`EnemyArena::compact`] drops marked entries afterwards.
#[derive(Debug, Default)]
pub struct EnemyArena {
    enemies: Vec<ActiveEnemy>,
    next_id: u32,
}

impl EnemyArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, spec: &EnemySpec) -> EnemyId {
        let rect = ActiveEnemy::spawn_rect(spec.kind, spec.lane);
        self.insert(spec.kind, spec.lane, spec.speed, rect)
    }

    /// Places an enemy with an explicit box and per-tick speed.
    pub fn insert(&mut self, kind: u8, lane: Lane, speed: i32, rect: Rect) -> EnemyId {
        let id = EnemyId(self.next_id);
        self.next_id += 1;
        self.enemies.push(ActiveEnemy { id, kind, lane, speed, alpha: ALPHA_MAX, rect, killed: false });
        id
    }

    pub fn len(&self) -> usize {
        self.enemies.iter().filter(|e| !e.killed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: EnemyId) -> Option<&ActiveEnemy> {
        self.enemies.iter().find(|e| e.id == id && !e.killed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEnemy> {
        self.enemies.iter().filter(|e| !e.killed)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActiveEnemy> {
        self.enemies.iter_mut().filter(|e| !e.killed)
    }

    /// Marks an enemy dead. Returns false if it already was.
    pub fn kill(&mut self, id: EnemyId) -> bool {
        match self.enemies.iter_mut().find(|e| e.id == id) {
            Some(enemy) if !enemy.killed => {
                enemy.killed = true;
                true
            }
            _ => false,
        }
    }

    pub fn compact(&mut self) {
        self.enemies.retain(|e| !e.killed);
    }

    /// One movement step: slide left, drop faded-out and off-screen enemies.
    pub fn advance(&mut self) {
        for enemy in self.enemies.iter_mut().filter(|e| !e.killed) {
            if enemy.alpha > 0 {
                enemy.rect.x -= enemy.speed;
                if enemy.rect.x > WIDTH * 2 || enemy.rect.x < -WIDTH {
                    enemy.killed = true;
                }
            } else {
                enemy.killed = true;
            }
        }
        self.compact();
    }
}

pub const PLAYER_X: i32 = WIDTH / 8 + PLAYER_SIZE / 2 - 75;
pub const PLAYER_LOWER_Y: i32 = HEIGHT / 2 + PLAYER_SIZE / 2 - 30;
pub const PLAYER_UPPER_Y: i32 = HEIGHT / 4 + 20;

/// Player lane position, attack pose and running score of one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerState {
    pub lane: Lane,
    pub attacked: bool,
    pub pose: PlayerPose,
    pub y: i32,
    pub score: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self { lane: Lane::Lower, attacked: false, pose: PlayerPose::Idle, y: PLAYER_LOWER_Y, score: 0 }
    }
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pose bookkeeping for an attack toward `lane`.
    ///
    /// Striking the other lane jumps there; striking the current lane toggles
    /// between the attack and idle poses.
    pub fn strike(&mut self, lane: Lane) {
        if self.lane != lane {
            self.lane = lane;
            self.attacked = true;
            self.pose = match lane {
                Lane::Upper => PlayerPose::AttackUp,
                Lane::Lower => PlayerPose::AttackDown,
            };
        } else if self.attacked {
            self.attacked = false;
            self.pose = PlayerPose::Idle;
        } else {
            self.attacked = true;
            self.pose = PlayerPose::Attack;
        }
        self.y = match lane {
            Lane::Upper => PLAYER_UPPER_Y,
            Lane::Lower => PLAYER_LOWER_Y,
        };
    }

    pub fn add_score(&mut self, delta: u32) {
        self.score = self.score.saturating_add(delta);
    }
}
