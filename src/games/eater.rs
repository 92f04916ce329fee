use std::time::Duration;

use crossterm::event::KeyEvent;
use image::RgbImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;

use super::{outlined, paint, pick_sheet, render_banner, render_hud, Cue, FrameInput, Game};
use crate::assets::SheetAssets;
use crate::canvas::Canvas;
use crate::config::{Variant, VariantConfig};
use crate::landmarks::{LandmarkId, Landmarks};
use crate::objects::{NewObject, ObjectKind, ObjectList};
use crate::physics::{BodyId, Vec2, World};
use crate::session::SessionState;
use crate::spawner::{SpawnSchedule, Spawner};

const MOUTH_OPEN_THRESHOLD: f32 = 0.03;
const ATTRACTION_RADIUS: f32 = 100.0;
const ATTRACTION_SPEED: f32 = 300.0;
const MOUTH_SIZE: f32 = 40.0;
const SPAWN_INTERVAL: Duration = Duration::from_secs(1);
const SPAWN_MARGIN: f32 = 100.0;
const DROP_HEIGHT: f32 = 50.0;
const BODY_RADIUS: f32 = 30.0;
const ELASTICITY: f32 = 0.6;
const FALL_MARGIN: f32 = 100.0;
const MOUTH_MARKER: f32 = 10.0;

const HUD_COLOR: Color = Color::Rgb(255, 127, 0);

/// Where the mouth is and whether it is open. Without a face the mouth sits
/// closed in the middle of the field.
pub fn mouth_state(landmarks: Option<&Landmarks>, width: f32, height: f32) -> (Vec2, bool) {
    let centre = (Vec2::new(width / 2.0, height / 2.0), false);
    let Some(lm) = landmarks else {
        return centre;
    };
    let (Some(upper), Some(lower)) = (lm.get(LandmarkId::UpperLip), lm.get(LandmarkId::LowerLip)) else {
        return centre;
    };
    let open = (lower.y - upper.y).abs() > MOUTH_OPEN_THRESHOLD;
    let point = Vec2::new((upper.x + lower.x) / 2.0 * width, (upper.y + lower.y) / 2.0 * height);
    (point, open)
}

/// Strict overlap of two centred rectangles; touching edges do not count.
fn overlaps(a: Vec2, a_size: (f32, f32), b: Vec2, b_size: (f32, f32)) -> bool {
    (a.x - b.x).abs() * 2.0 < a_size.0 + b_size.0 && (a.y - b.y).abs() * 2.0 < a_size.1 + b_size.1
}

/// Open your mouth to eat the falling fruit. One bomb ends the meal.
pub struct Eater {
    config: VariantConfig,
    assets: SheetAssets,
    world: World,
    objects: ObjectList,
    spawner: Spawner,
    session: SessionState,
    mouth: Vec2,
    mouth_open: bool,
    face_seen: bool,
    cues: Vec<Cue>,
    clock: Duration,
    rng: StdRng,
}

impl Eater {
    pub fn new(assets: SheetAssets, now: Duration) -> Self {
        Self::with_rng(assets, now, StdRng::from_entropy())
    }

    pub fn with_rng(assets: SheetAssets, now: Duration, rng: StdRng) -> Self {
        let config = Variant::Eater.config();
        Self {
            assets,
            world: World::new(Vec2::new(0.0, config.gravity)),
            objects: ObjectList::new(),
            spawner: Spawner::new(SpawnSchedule::Constant(SPAWN_INTERVAL), now),
            session: SessionState::new(&config, now),
            mouth: Vec2::new(config.width / 2.0, config.height / 2.0),
            mouth_open: false,
            face_seen: false,
            cues: Vec::new(),
            clock: now,
            rng,
            config,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    fn spawn(&mut self) -> BodyId {
        let pick = pick_sheet(&mut self.rng, &self.assets.sheets);
        let x = self.rng.gen_range(SPAWN_MARGIN..=self.config.width - SPAWN_MARGIN);
        let impulse = Vec2::new(self.rng.gen_range(-200.0f32..=200.0), self.rng.gen_range(700.0f32..=1000.0));
        let body = self.objects.insert(
            &mut self.world,
            NewObject {
                position: Vec2::new(x, -DROP_HEIGHT),
                radius: BODY_RADIUS,
                elasticity: ELASTICITY,
                impulse,
                kind: pick.kind,
                sprite: pick.sprite,
                width: pick.width,
                height: pick.height,
            },
        );
        log::debug!("dropped {:?} {:?} at x={x:.0}", pick.kind, body);
        body
    }

    fn attract(&mut self) {
        if !self.mouth_open {
            return;
        }
        for body in self.objects.bodies() {
            let Some(pos) = self.world.position(body) else {
                continue;
            };
            let delta = self.mouth - pos;
            let distance = delta.length();
            if distance < ATTRACTION_RADIUS && distance > f32::EPSILON {
                self.world
                    .set_velocity(body, delta * (ATTRACTION_SPEED / distance));
            }
        }
    }

    fn eat(&mut self) {
        if !self.mouth_open {
            return;
        }
        let mouth = (MOUTH_SIZE, MOUTH_SIZE);
        for body in self.objects.bodies() {
            let (Some(pos), Some(obj)) = (self.world.position(body), self.objects.get(body)) else {
                continue;
            };
            if !overlaps(pos, (obj.width, obj.height), self.mouth, mouth) {
                continue;
            }
            let Some(obj) = self.objects.consume(&mut self.world, body) else {
                continue;
            };
            match obj.kind {
                ObjectKind::Fruit => {
                    self.session.fruit_consumed();
                    self.cues.push(Cue::Slice);
                }
                ObjectKind::Bomb => {
                    self.cues.push(Cue::Explosion);
                    self.session.bomb_eaten();
                }
            }
            log::debug!("ate {:?}", obj.kind);
        }
    }

    fn render_field(&self, area: Rect, background: &RgbImage) -> Canvas {
        let mut canvas = Canvas::new(area.width, area.height, self.config.width, self.config.height);
        if !self.session.is_playing() {
            canvas.draw_background(&self.assets.game_over);
            return canvas;
        }
        canvas.draw_background(background);
        for obj in self.objects.iter() {
            if let (Some(pos), Some(img)) = (self.world.position(obj.body), self.assets.sheets[obj.sprite].frames.first()) {
                canvas.blit(img, pos, obj.width, obj.height);
            }
        }
        if self.face_seen {
            canvas.disc(self.mouth, MOUTH_MARKER, [255, 255, 0]);
        }
        canvas
    }
}

impl Game for Eater {
    fn update(&mut self, input: &FrameInput<'_>) {
        self.clock = input.now;
        let (mouth, open) = mouth_state(input.landmarks, self.config.width, self.config.height);
        self.mouth = mouth;
        self.mouth_open = open;
        self.face_seen = input.landmarks.is_some();
        if !self.session.is_playing() {
            return;
        }

        let elapsed = self.session.elapsed(input.now);
        if self.spawner.poll(input.now, elapsed) {
            self.spawn();
        }
        self.attract();
        self.eat();
        self.objects
            .cull_below(&mut self.world, self.config.height + FALL_MARGIN);
        self.world.step(self.config.timestep());
        self.session.check_timer(input.now);
    }

    fn handle_input(&mut self, _key: KeyEvent, _now: Duration) {}

    fn render(&mut self, frame: &mut Frame, area: Rect, background: &RgbImage) {
        let canvas = self.render_field(area, background);
        paint(frame, area, &canvas);

        if self.session.is_playing() {
            render_hud(
                frame,
                area,
                vec![Line::from(outlined(format!("Score: {}", self.session.score), HUD_COLOR))],
                Line::from(outlined(format!("Time: {}", self.session.time_left(self.clock)), HUD_COLOR)),
            );
        } else {
            let text = Style::default().fg(Color::Rgb(0, 0, 0)).bg(Color::Rgb(255, 255, 255)).add_modifier(Modifier::BOLD);
            render_banner(
                frame,
                area,
                vec![
                    Line::from(Span::styled("Game Over!", text)),
                    Line::from(Span::styled(format!("Score: {}", self.session.score), text)),
                ],
                HUD_COLOR,
            );
        }
    }

    fn reset(&mut self, now: Duration) {
        self.objects.clear(&mut self.world);
        self.session.reset(now);
        self.spawner.reset(now);
        self.cues.clear();
        self.clock = now;
    }

    fn get_score(&self) -> u32 {
        self.session.score
    }

    fn is_game_over(&self) -> bool {
        !self.session.is_playing()
    }

    fn should_quit(&self) -> bool {
        false
    }

    fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }
}
