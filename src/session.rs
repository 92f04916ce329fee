//! Score, lives and the game-over state machine of one play session.

use std::time::Duration;

use crate::config::VariantConfig;

pub const BONUS_COST: u32 = 15;
pub const MAX_BONUS_LIVES: u32 = 3;
pub const POPUP_DURATION: Duration = Duration::from_secs(2);
pub const BONUS_MESSAGE: &str = "Bonus: points traded for 1 life!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    TimeUp,
    OutOfLives,
    AteBomb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    GameOver(Outcome),
}

#[derive(Clone, Debug)]
pub struct Popup {
    pub message: &'static str,
    pub shown_at: Duration,
}

/// Times are offsets from an arbitrary clock origin owned by the render loop.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub score: u32,
    pub lives: Option<u32>,
    pub phase: Phase,
    pub popup: Option<Popup>,
    initial_lives: Option<u32>,
    started_at: Duration,
    time_total: Duration,
}

impl SessionState {
    pub fn new(config: &VariantConfig, now: Duration) -> Self {
        Self {
            score: 0,
            lives: config.lives,
            phase: Phase::Playing,
            popup: None,
            initial_lives: config.lives,
            started_at: now,
            time_total: config.time_total,
        }
    }

    pub fn reset(&mut self, now: Duration) {
        self.score = 0;
        self.lives = self.initial_lives;
        self.phase = Phase::Playing;
        self.popup = None;
        self.started_at = now;
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Playing => None,
            Phase::GameOver(outcome) => Some(outcome),
        }
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }

    /// Whole seconds left, truncated.
    pub fn time_left(&self, now: Duration) -> u64 {
        self.time_total.saturating_sub(self.elapsed(now)).as_secs()
    }

    pub fn is_critical(&self) -> bool {
        matches!(self.lives, Some(l) if l <= 2)
    }

    fn end(&mut self, outcome: Outcome) {
        if self.is_playing() {
            log::info!("game over ({:?}) with score {}", outcome, self.score);
            self.phase = Phase::GameOver(outcome);
        }
    }

    pub fn fruit_consumed(&mut self) {
        if self.is_playing() {
            self.score += 1;
        }
    }

    /// Costs one life; running out ends the session.
    pub fn lose_life(&mut self) {
        if !self.is_playing() {
            return;
        }
        if let Some(lives) = self.lives.as_mut() {
            *lives = lives.saturating_sub(1);
            if *lives == 0 {
                self.end(Outcome::OutOfLives);
            }
        }
    }

    pub fn bomb_eaten(&mut self) {
        self.end(Outcome::AteBomb);
    }

    pub fn check_timer(&mut self, now: Duration) {
        if self.time_left(now) == 0 {
            self.end(Outcome::TimeUp);
        }
    }

    /// Trades points for a life when lives run low.
    pub fn try_life_bonus(&mut self, now: Duration) -> bool {
        if !self.is_playing() {
            return false;
        }
        let Some(lives) = self.lives else {
            return false;
        };
        if (lives == 1 || lives == 2) && lives < MAX_BONUS_LIVES && self.score >= BONUS_COST {
            self.score -= BONUS_COST;
            self.lives = Some(lives + 1);
            self.popup = Some(Popup {
                message: BONUS_MESSAGE,
                shown_at: now,
            });
            log::info!("life bonus: lives {} -> {}", lives, lives + 1);
            return true;
        }
        false
    }

    pub fn popup_message(&mut self, now: Duration) -> Option<&'static str> {
        let popup = self.popup.as_ref()?;
        if now.saturating_sub(popup.shown_at) < POPUP_DURATION {
            Some(popup.message)
        } else {
            self.popup = None;
            None
        }
    }
}
