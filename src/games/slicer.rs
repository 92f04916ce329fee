use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use image::RgbImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;

use super::{help_line, outlined, paint, pick_sheet, render_banner, render_hud, Cue, FrameInput, Game};
use crate::assets::SheetAssets;
use crate::canvas::Canvas;
use crate::config::{Variant, VariantConfig};
use crate::landmarks::LandmarkId;
use crate::objects::{NewObject, ObjectKind, ObjectList, ObjectState};
use crate::physics::{BodyId, Vec2, World};
use crate::session::{Outcome, SessionState};
use crate::spawner::{RampStage, SpawnSchedule, Spawner};

const RAMP: &[RampStage] = &[
    RampStage {
        after: 100.0,
        shrink_per_sec: 0.02,
    },
    RampStage {
        after: 120.0,
        shrink_per_sec: 0.035,
    },
];
const SCHEDULE: SpawnSchedule = SpawnSchedule::Ramp {
    initial: 1.0,
    floor: 0.3,
    stages: RAMP,
};

const HITBOX_SCALE: f32 = 0.7;
const BODY_RADIUS: f32 = 30.0;
const ELASTICITY: f32 = 0.6;
const LAUNCH_HEIGHT: f32 = 100.0;
const FALL_MARGIN: f32 = 100.0;
const NOSE_RADIUS: f32 = 20.0;

const CRITICAL_TINT: [u8; 3] = [255, 0, 0];
const CRITICAL_ALPHA: f32 = 0.3;
const CRITICAL_BORDER: u32 = 1;
const NOSE_COLOR: [u8; 3] = [255, 255, 0];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliceOutcome {
    Fruit,
    Bomb,
}

/// Swipe fruit with the tip of your nose. Sliced bombs cost a life.
pub struct Slicer {
    config: VariantConfig,
    assets: SheetAssets,
    world: World,
    objects: ObjectList,
    spawner: Spawner,
    session: SessionState,
    nose: Option<Vec2>,
    cues: Vec<Cue>,
    clock: Duration,
    quit: bool,
    rng: StdRng,
}

impl Slicer {
    pub fn new(assets: SheetAssets, now: Duration) -> Self {
        Self::with_rng(assets, now, StdRng::from_entropy())
    }

    pub fn with_rng(assets: SheetAssets, now: Duration, rng: StdRng) -> Self {
        let config = Variant::Slicer.config();
        Self {
            assets,
            world: World::new(Vec2::new(0.0, config.gravity)),
            objects: ObjectList::new(),
            spawner: Spawner::new(SCHEDULE, now),
            session: SessionState::new(&config, now),
            nose: None,
            cues: Vec::new(),
            clock: now,
            quit: false,
            rng,
            config,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    fn spawn(&mut self) -> BodyId {
        let pick = pick_sheet(&mut self.rng, &self.assets.sheets);
        let x = self.rng.gen_range(0.0..=self.config.width);
        let push = self.rng.gen_range(100.0f32..=300.0);
        let impulse_x = if x < self.config.width / 2.0 { push } else { -push };
        let impulse_y = -self.rng.gen_range(900.0f32..=1100.0);
        let body = self.objects.insert(
            &mut self.world,
            NewObject {
                position: Vec2::new(x, self.config.height - LAUNCH_HEIGHT),
                radius: BODY_RADIUS,
                elasticity: ELASTICITY,
                impulse: Vec2::new(impulse_x, impulse_y),
                kind: pick.kind,
                sprite: pick.sprite,
                width: pick.width,
                height: pick.height,
            },
        );
        log::debug!("tossed {:?} {:?} from x={x:.0}", pick.kind, body);
        body
    }

    /// Advances the slice animation of one object against the nose point.
    ///
    /// A first hit inside the shrunk hit box starts the animation, later
    /// calls step it along, and the call after the last frame removes the
    /// object and reports what was sliced. Returns `None` otherwise.
    pub fn check_slice(&mut self, body: BodyId, nose: Vec2) -> Option<SliceOutcome> {
        let pos = self.world.position(body)?;
        let obj = self.objects.get_mut(body)?;
        let last = self.assets.sheets[obj.sprite].last_frame();
        let state = obj.state;
        match state {
            ObjectState::Falling => {
                let half_w = obj.width * HITBOX_SCALE / 2.0;
                let half_h = obj.height * HITBOX_SCALE / 2.0;
                let inside = (nose.x - pos.x).abs() < half_w && (nose.y - pos.y).abs() < half_h;
                if !inside {
                    return None;
                }
                obj.state = ObjectState::Slicing { frame: 1.min(last) };
                self.cues.push(if obj.kind.is_bomb() { Cue::Explosion } else { Cue::Slice });
                None
            }
            ObjectState::Slicing { frame } if frame < last => {
                obj.state = ObjectState::Slicing { frame: frame + 1 };
                None
            }
            ObjectState::Slicing { .. } => {
                let obj = self.objects.consume(&mut self.world, body)?;
                Some(match obj.kind {
                    ObjectKind::Bomb => SliceOutcome::Bomb,
                    ObjectKind::Fruit => SliceOutcome::Fruit,
                })
            }
            ObjectState::Consumed => None,
        }
    }

    fn slice_all(&mut self, nose: Vec2) {
        for body in self.objects.bodies() {
            match self.check_slice(body, nose) {
                Some(SliceOutcome::Bomb) => self.session.lose_life(),
                Some(SliceOutcome::Fruit) => self.session.fruit_consumed(),
                None => {}
            }
        }
    }

    fn render_field(&self, area: Rect, background: &RgbImage) -> Canvas {
        let mut canvas = Canvas::new(area.width, area.height, self.config.width, self.config.height);
        if !self.session.is_playing() {
            canvas.draw_background(&self.assets.game_over);
            return canvas;
        }
        canvas.draw_background(background);
        if self.session.is_critical() {
            canvas.tint(CRITICAL_TINT, CRITICAL_ALPHA);
            canvas.border(CRITICAL_TINT, CRITICAL_BORDER);
        }
        for obj in self.objects.iter() {
            let Some(pos) = self.world.position(obj.body) else {
                continue;
            };
            let sheet = &self.assets.sheets[obj.sprite];
            if let Some(img) = sheet.frames.get(obj.frame()) {
                canvas.blit(img, pos, obj.width, obj.height);
            }
        }
        if let Some(nose) = self.nose {
            canvas.disc(nose, NOSE_RADIUS, NOSE_COLOR);
        }
        canvas
    }
}

impl Game for Slicer {
    fn update(&mut self, input: &FrameInput<'_>) {
        self.clock = input.now;
        self.nose = input
            .landmarks
            .and_then(|lm| lm.scaled(LandmarkId::Nose, self.config.width, self.config.height));
        if !self.session.is_playing() {
            return;
        }

        let elapsed = self.session.elapsed(input.now);
        if self.spawner.poll(input.now, elapsed) {
            self.spawn();
        }
        self.session.try_life_bonus(input.now);
        if let Some(nose) = self.nose {
            self.slice_all(nose);
        }
        self.objects
            .cull_below(&mut self.world, self.config.height + FALL_MARGIN);
        self.world.step(self.config.timestep());
        self.session.check_timer(input.now);
    }

    fn handle_input(&mut self, key: KeyEvent, now: Duration) {
        if self.session.is_playing() {
            return;
        }
        match key.code {
            KeyCode::Char('r') | KeyCode::Char('R') => self.reset(now),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit = true,
            _ => {}
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, background: &RgbImage) {
        let canvas = self.render_field(area, background);
        paint(frame, area, &canvas);

        if let Some(outcome) = self.session.outcome() {
            let verdict = if outcome == Outcome::TimeUp { "You Win!" } else { "You Lose!" };
            let text = Style::default().fg(Color::Rgb(0, 0, 0)).bg(Color::Rgb(255, 255, 255)).add_modifier(Modifier::BOLD);
            render_banner(
                frame,
                area,
                vec![
                    Line::from(Span::styled(verdict, text)),
                    Line::from(Span::styled("Your Score:", text)),
                    Line::from(Span::styled(self.session.score.to_string(), text)),
                    Line::from(""),
                    help_line("R restart  Q quit"),
                ],
                Color::Rgb(255, 255, 255),
            );
            return;
        }

        let white = Color::Rgb(255, 255, 255);
        let lives_color = if self.session.is_critical() { Color::Rgb(255, 0, 0) } else { white };
        render_hud(
            frame,
            area,
            vec![
                Line::from(outlined(format!("Score: {}", self.session.score), white)),
                Line::from(outlined(format!("Lives: {}", self.session.lives.unwrap_or(0)), lives_color)),
            ],
            Line::from(outlined(format!("Time: {}", self.session.time_left(self.clock)), white)),
        );
        if let Some(message) = self.session.popup_message(self.clock) {
            let popup = Rect::new(area.x, area.y + area.height / 3, area.width, 1.min(area.height));
            frame.render_widget(
                ratatui::widgets::Paragraph::new(Line::from(outlined(message, white))).alignment(Alignment::Center),
                popup,
            );
        }
    }

    fn reset(&mut self, now: Duration) {
        self.objects.clear(&mut self.world);
        self.session.reset(now);
        self.spawner.reset(now);
        self.cues.clear();
        self.nose = None;
        self.clock = now;
    }

    fn get_score(&self) -> u32 {
        self.session.score
    }

    fn is_game_over(&self) -> bool {
        !self.session.is_playing()
    }

    fn should_quit(&self) -> bool {
        self.quit
    }

    fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::test_support::{sheet, sheet_assets};
    use crate::landmarks::Landmarks;
    use crossterm::event::KeyModifiers;

    const FRAMES: usize = 14;

    fn game() -> Slicer {
        let assets = sheet_assets(vec![sheet(ObjectKind::Fruit, FRAMES, 100), sheet(ObjectKind::Bomb, FRAMES, 100)]);
        Slicer::with_rng(assets, Duration::ZERO, StdRng::seed_from_u64(5))
    }

    fn place(g: &mut Slicer, kind: ObjectKind, at: Vec2) -> BodyId {
        let sprite = if kind.is_bomb() { 1 } else { 0 };
        g.objects.insert(
            &mut g.world,
            NewObject {
                position: at,
                radius: BODY_RADIUS,
                elasticity: ELASTICITY,
                impulse: Vec2::ZERO,
                kind,
                sprite,
                width: 100.0,
                height: 100.0,
            },
        )
    }

    #[test]
    fn slice_runs_the_animation_then_scores_once() {
        let mut g = game();
        let body = place(&mut g, ObjectKind::Fruit, Vec2::new(500.0, 300.0));
        let nose = Vec2::new(530.0, 280.0);

        assert_eq!(g.check_slice(body, nose), None);
        assert_eq!(g.objects.get(body).unwrap().state, ObjectState::Slicing { frame: 1 });
        assert_eq!(g.drain_cues(), vec![Cue::Slice]);

        // The animation keeps going even after the nose moves away.
        let away = Vec2::new(0.0, 0.0);
        for expected in 2..FRAMES {
            assert_eq!(g.check_slice(body, away), None);
            assert_eq!(g.objects.get(body).unwrap().frame(), expected);
        }
        assert_eq!(g.check_slice(body, away), Some(SliceOutcome::Fruit));
        assert!(!g.world.contains(body));
        assert!(g.objects.get(body).is_none());
        assert_eq!(g.check_slice(body, away), None);
        assert!(g.drain_cues().is_empty());
    }

    #[test]
    fn hitbox_is_shrunk() {
        let mut g = game();
        let body = place(&mut g, ObjectKind::Fruit, Vec2::new(500.0, 300.0));
        // 40 units off centre is inside the sprite but outside 70% of it.
        assert_eq!(g.check_slice(body, Vec2::new(540.0, 300.0)), None);
        assert_eq!(g.objects.get(body).unwrap().state, ObjectState::Falling);
        // Exactly on the edge of the hit box is a miss.
        assert_eq!(g.check_slice(body, Vec2::new(535.0, 300.0)), None);
        assert_eq!(g.check_slice(body, Vec2::new(500.0, 335.0)), None);
        assert_eq!(g.objects.get(body).unwrap().state, ObjectState::Falling);
        g.check_slice(body, Vec2::new(534.0, 300.0));
        assert_eq!(g.objects.get(body).unwrap().frame(), 1);
    }

    #[test]
    fn bomb_slice_costs_a_life_and_removes_the_body() {
        let mut g = game();
        let body = place(&mut g, ObjectKind::Bomb, Vec2::new(500.0, 300.0));
        let nose = Vec2::new(500.0, 300.0);
        g.check_slice(body, nose);
        assert_eq!(g.drain_cues(), vec![Cue::Explosion]);
        let mut outcome = None;
        for _ in 0..FRAMES {
            if let Some(o) = g.check_slice(body, nose) {
                outcome = Some(o);
                break;
            }
        }
        assert_eq!(outcome, Some(SliceOutcome::Bomb));
        assert!(g.world.is_empty());
    }

    #[test]
    fn update_applies_outcomes_while_nose_visible() {
        let mut g = game();
        // Hold the object in place so it stays under the nose.
        g.world = World::new(Vec2::ZERO);
        let body = place(&mut g, ObjectKind::Bomb, Vec2::new(600.0, 343.0));
        let lm = Landmarks::new().with(LandmarkId::Nose, 0.5, 0.5);
        for i in 0..FRAMES as u64 {
            g.update(&FrameInput {
                now: Duration::from_millis(i * 10),
                landmarks: Some(&lm),
            });
        }
        assert_eq!(g.session().lives, Some(4));
        assert!(!g.world.contains(body));
        assert_eq!(g.objects.len(), g.world.len());
    }

    #[test]
    fn slice_started_near_the_bottom_still_counts() {
        let mut g = game();
        let body = place(&mut g, ObjectKind::Bomb, Vec2::new(600.0, 680.0));
        g.world.apply_impulse(body, Vec2::new(0.0, 600.0));
        let lm = Landmarks::new().with(LandmarkId::Nose, 0.5, 680.0 / 686.0);
        g.update(&FrameInput {
            now: Duration::ZERO,
            landmarks: Some(&lm),
        });
        assert_eq!(g.objects.get(body).unwrap().state, ObjectState::Slicing { frame: 1 });
        for i in 1..19u64 {
            g.update(&FrameInput {
                now: Duration::from_millis(i * 10),
                landmarks: Some(&lm),
            });
        }
        assert_eq!(g.session().lives, Some(4));
        assert!(!g.world.contains(body));
        assert!(g.objects.is_empty());
    }

    #[test]
    fn no_nose_no_progress() {
        let mut g = game();
        let body = place(&mut g, ObjectKind::Fruit, Vec2::new(600.0, 343.0));
        g.check_slice(body, Vec2::new(600.0, 343.0));
        g.update(&FrameInput {
            now: Duration::from_millis(10),
            landmarks: None,
        });
        assert_eq!(g.objects.get(body).unwrap().frame(), 1);
    }

    #[test]
    fn spawned_objects_are_tossed_toward_the_centre() {
        let mut g = game();
        for _ in 0..50 {
            let body = g.spawn();
            let b = g.world.body(body).unwrap();
            assert!((b.position.y - 586.0).abs() < 1e-3);
            assert!(b.velocity.y <= -900.0 && b.velocity.y >= -1100.0);
            if b.position.x < 600.0 {
                assert!(b.velocity.x >= 100.0);
            } else {
                assert!(b.velocity.x <= -100.0);
            }
            g.objects.consume(&mut g.world, body);
        }
    }

    #[test]
    fn objects_below_the_field_are_dropped_without_penalty() {
        let mut g = game();
        place(&mut g, ObjectKind::Fruit, Vec2::new(100.0, 900.0));
        g.update(&FrameInput {
            now: Duration::from_millis(10),
            landmarks: None,
        });
        assert!(g.objects.is_empty());
        assert_eq!(g.session().lives, Some(5));
    }

    #[test]
    fn life_bonus_shows_popup() {
        let mut g = game();
        g.session.score = 20;
        g.session.lives = Some(2);
        g.update(&FrameInput {
            now: Duration::from_millis(10),
            landmarks: None,
        });
        assert_eq!(g.session().lives, Some(3));
        assert_eq!(g.session().score, 5);
        assert!(g.session.popup_message(Duration::from_millis(500)).is_some());
    }

    #[test]
    fn restart_clears_world_and_session() {
        let mut g = game();
        for _ in 0..3 {
            g.spawn();
        }
        g.session.bomb_eaten();
        assert!(g.is_game_over());
        // Keys other than R and Q are ignored.
        g.handle_input(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE), Duration::from_secs(1));
        assert!(g.is_game_over());
        g.handle_input(KeyEvent::new(KeyCode::Char('R'), KeyModifiers::NONE), Duration::from_secs(2));
        assert!(!g.is_game_over());
        assert!(g.world.is_empty() && g.objects.is_empty());
        assert_eq!(g.session().lives, Some(5));
        assert_eq!(g.session().score, 0);
    }

    #[test]
    fn ramp_shortens_the_spawn_interval() {
        assert_eq!(SCHEDULE.interval(Duration::from_secs(50)), Duration::from_secs(1));
        let late = SCHEDULE.interval(Duration::from_secs(110)).as_secs_f32();
        assert!((late - 0.8).abs() < 1e-3);
        let floor = SCHEDULE.interval(Duration::from_secs(139)).as_secs_f32();
        assert!((floor - 0.335).abs() < 1e-3);
        let floor = SCHEDULE.interval(Duration::from_secs(500)).as_secs_f32();
        assert!((floor - 0.3).abs() < 1e-4);
    }
}
