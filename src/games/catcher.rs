use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use image::RgbImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;

use super::{help_line, outlined, paint, render_banner, render_hud, Cue, FrameInput, Game};
use crate::assets::CatcherAssets;
use crate::canvas::Canvas;
use crate::config::{Variant, VariantConfig};
use crate::landmarks::{LandmarkId, Landmarks};
use crate::objects::{NewObject, ObjectKind, ObjectList};
use crate::physics::{BodyId, Vec2, World};
use crate::session::SessionState;
use crate::spawner::{coin_flip_kind, SpawnSchedule, Spawner};

const HANDS_TOGETHER: f32 = 100.0;
const CATCH_RADIUS: f32 = 120.0;
const BOMB_PROBABILITY: f64 = 0.2;
const SPAWN_INTERVAL: Duration = Duration::from_millis(1_500);
const SPAWN_MARGIN: f32 = 100.0;
const BODY_RADIUS: f32 = 75.0;
const ELASTICITY: f32 = 0.6;
const FRUIT_SIZE: f32 = 130.0;
const BOMB_SIZE: f32 = 120.0;
const BASKET_SIZE: (f32, f32) = (500.0, 400.0);
const FALL_MARGIN: f32 = 100.0;

const HUD_COLOR: Color = Color::Rgb(255, 102, 0);
const GAME_OVER_FILL: [u8; 3] = [0, 200, 100];

/// Midpoint of the wrists, but only while the hands are held together.
pub fn catcher_point(landmarks: Option<&Landmarks>, width: f32, height: f32) -> Option<Vec2> {
    let lm = landmarks?;
    let right = lm.scaled(LandmarkId::RightWrist, width, height)?;
    let left = lm.scaled(LandmarkId::LeftWrist, width, height)?;
    if right.distance(left) < HANDS_TOGETHER {
        Some(Vec2::new((right.x + left.x) / 2.0, (right.y + left.y) / 2.0))
    } else {
        None
    }
}

/// Hold both hands together to form a basket and catch the falling fruit.
/// Bombs and missed fruit each cost a life.
pub struct Catcher {
    config: VariantConfig,
    assets: CatcherAssets,
    fruit_sprites: Vec<usize>,
    bomb_sprites: Vec<usize>,
    world: World,
    objects: ObjectList,
    spawner: Spawner,
    session: SessionState,
    catcher: Option<Vec2>,
    clock: Duration,
    quit: bool,
    rng: StdRng,
}

impl Catcher {
    pub fn new(assets: CatcherAssets, now: Duration) -> Self {
        Self::with_rng(assets, now, StdRng::from_entropy())
    }

    pub fn with_rng(assets: CatcherAssets, now: Duration, rng: StdRng) -> Self {
        let config = Variant::Catcher.config();
        Self {
            fruit_sprites: assets.indices_of(ObjectKind::Fruit),
            bomb_sprites: assets.indices_of(ObjectKind::Bomb),
            assets,
            world: World::new(Vec2::new(0.0, config.gravity)),
            objects: ObjectList::new(),
            spawner: Spawner::immediate(SpawnSchedule::Constant(SPAWN_INTERVAL)),
            session: SessionState::new(&config, now),
            catcher: None,
            clock: now,
            quit: false,
            rng,
            config,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    fn place(&mut self, kind: ObjectKind, position: Vec2) -> BodyId {
        let (pool, size) = match kind {
            ObjectKind::Fruit => (&self.fruit_sprites, FRUIT_SIZE),
            ObjectKind::Bomb => (&self.bomb_sprites, BOMB_SIZE),
        };
        let sprite = pool[self.rng.gen_range(0..pool.len())];
        self.objects.insert(
            &mut self.world,
            NewObject {
                position,
                radius: BODY_RADIUS,
                elasticity: ELASTICITY,
                impulse: Vec2::ZERO,
                kind,
                sprite,
                width: size,
                height: size,
            },
        )
    }

    fn spawn(&mut self) {
        let kind = coin_flip_kind(&mut self.rng, BOMB_PROBABILITY);
        let x = self.rng.gen_range(SPAWN_MARGIN..=self.config.width - SPAWN_MARGIN);
        let body = self.place(kind, Vec2::new(x.round(), 0.0));
        log::debug!("spawned {:?} {:?} at x={x:.0}", kind, body);
    }

    fn catch(&mut self) {
        let Some(point) = self.catcher else {
            return;
        };
        for body in self.objects.bodies() {
            let Some(pos) = self.world.position(body) else {
                continue;
            };
            if pos.distance(point) >= CATCH_RADIUS {
                continue;
            }
            if let Some(obj) = self.objects.consume(&mut self.world, body) {
                match obj.kind {
                    ObjectKind::Bomb => self.session.lose_life(),
                    ObjectKind::Fruit => self.session.fruit_consumed(),
                }
                log::debug!("caught {:?}", obj.kind);
            }
        }
    }

    fn cull(&mut self) {
        let limit = self.config.height + FALL_MARGIN;
        for obj in self.objects.cull_below(&mut self.world, limit) {
            log::debug!("missed {:?}", obj.kind);
            self.session.lose_life();
        }
    }

    fn render_field(&self, area: Rect, background: &RgbImage) -> Canvas {
        let mut canvas = Canvas::new(area.width, area.height, self.config.width, self.config.height);
        if !self.session.is_playing() {
            match &self.assets.game_over {
                Some(img) => canvas.draw_background(img),
                None => canvas.fill(GAME_OVER_FILL),
            }
            return canvas;
        }
        canvas.draw_background(background);
        for obj in self.objects.iter() {
            if let Some(pos) = self.world.position(obj.body) {
                canvas.blit(&self.assets.sprites[obj.sprite].image, pos, obj.width, obj.height);
            }
        }
        if let Some(point) = self.catcher {
            canvas.blit(&self.assets.basket, point, BASKET_SIZE.0, BASKET_SIZE.1);
        }
        canvas
    }
}

impl Game for Catcher {
    fn update(&mut self, input: &FrameInput<'_>) {
        self.clock = input.now;
        self.catcher = catcher_point(input.landmarks, self.config.width, self.config.height);
        if !self.session.is_playing() {
            return;
        }

        let elapsed = self.session.elapsed(input.now);
        if self.spawner.poll(input.now, elapsed) {
            self.spawn();
        }
        self.catch();
        self.cull();
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

        if self.session.is_playing() {
            let lives = self.session.lives.unwrap_or(0);
            render_hud(
                frame,
                area,
                vec![
                    Line::from(outlined(format!("Score: {}", self.session.score), HUD_COLOR)),
                    Line::from(outlined(format!("Lives: {}", lives), HUD_COLOR)),
                ],
                Line::from(outlined(format!("Time: {}", self.session.time_left(self.clock)), HUD_COLOR)),
            );
        } else {
            let title = Style::default().fg(Color::Rgb(0, 0, 0)).bg(Color::Rgb(0, 200, 100)).add_modifier(Modifier::BOLD);
            render_banner(
                frame,
                area,
                vec![
                    Line::from(Span::styled("GAME OVER!!!", title)),
                    Line::from(Span::styled(format!("Score: {}", self.session.score), title)),
                    Line::from(""),
                    help_line("R restart  Q quit"),
                ],
                Color::Rgb(0, 200, 100),
            );
        }
    }

    fn reset(&mut self, now: Duration) {
        self.objects.clear(&mut self.world);
        self.session.reset(now);
        self.spawner.reset(now);
        self.catcher = None;
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
        Vec::new()
    }
}
