use std::time::Duration;

use rand::Rng;

use crate::objects::ObjectKind;

/// One step of a shrinking spawn interval: once more than `after` seconds
/// have elapsed the interval shrinks by `shrink_per_sec` for every second
/// past that point.
#[derive(Clone, Copy, Debug)]
pub struct RampStage {
    pub after: f32,
    pub shrink_per_sec: f32,
}

#[derive(Clone, Copy, Debug)]
pub enum SpawnSchedule {
    Constant(Duration),
    Ramp {
        initial: f32,
        floor: f32,
        /// Ordered by `after`, ascending.
        stages: &'static [RampStage],
    },
}

impl SpawnSchedule {
    pub fn interval(&self, elapsed: Duration) -> Duration {
        match *self {
            SpawnSchedule::Constant(interval) => interval,
            SpawnSchedule::Ramp {
                initial,
                floor,
                stages,
            } => {
                let t = elapsed.as_secs_f32();
                let secs = match stages.iter().rev().find(|s| t > s.after) {
                    Some(stage) => (initial - (t - stage.after) * stage.shrink_per_sec).max(floor),
                    None => initial,
                };
                Duration::from_secs_f32(secs)
            }
        }
    }
}

/// Timer gate in front of object creation.
pub struct Spawner {
    schedule: SpawnSchedule,
    last_spawn: Option<Duration>,
    immediate: bool,
}

impl Spawner {
    /// First spawn happens one interval after `now`.
    pub fn new(schedule: SpawnSchedule, now: Duration) -> Self {
        Self {
            schedule,
            last_spawn: Some(now),
            immediate: false,
        }
    }

    /// First spawn happens on the first poll.
    pub fn immediate(schedule: SpawnSchedule) -> Self {
        Self {
            schedule,
            last_spawn: None,
            immediate: true,
        }
    }

    pub fn reset(&mut self, now: Duration) {
        self.last_spawn = if self.immediate { None } else { Some(now) };
    }

    /// Returns true when a new object is due and restarts the timer.
    pub fn poll(&mut self, now: Duration, elapsed: Duration) -> bool {
        let due = match self.last_spawn {
            None => true,
            Some(last) => now.saturating_sub(last) > self.schedule.interval(elapsed),
        };
        if due {
            self.last_spawn = Some(now);
        }
        due
    }
}

/// Weighted coin flip between fruit and bomb.
pub fn coin_flip_kind<R: Rng>(rng: &mut R, bomb_probability: f64) -> ObjectKind {
    if rng.gen_bool(bomb_probability) {
        ObjectKind::Bomb
    } else {
        ObjectKind::Fruit
    }
}
