//! A small 2D rigid-body world for falling circles.
//!
//! Bodies are unit-mass discs integrated with semi-implicit Euler at a fixed
//! timestep. Overlapping discs are separated and bounce off each other with
//! the product of their elasticities. There are no walls: objects leave the
//! play area and are culled by their owner.

use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u64);

#[derive(Clone, Debug)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub elasticity: f32,
}

pub struct World {
    gravity: Vec2,
    // Kept sorted by id; ids only grow.
    bodies: Vec<(BodyId, Body)>,
    next_id: u64,
}

impl World {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: Vec::new(),
            next_id: 0,
        }
    }

    pub fn add_ball(&mut self, position: Vec2, radius: f32, elasticity: f32) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.push((
            id,
            Body {
                position,
                velocity: Vec2::ZERO,
                radius,
                mass: 1.0,
                elasticity,
            },
        ));
        id
    }

    fn slot(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, |(b, _)| *b).ok()
    }

    /// Takes the body out of the world. A second call for the same id
    /// returns `None`.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let idx = self.slot(id)?;
        Some(self.bodies.remove(idx).1)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.slot(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.slot(id).map(|idx| &self.bodies[idx].1)
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        let idx = self.slot(id)?;
        Some(&mut self.bodies[idx].1)
    }

    pub fn position(&self, id: BodyId) -> Option<Vec2> {
        self.body(id).map(|b| b.position)
    }

    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        if let Some(body) = self.body_mut(id) {
            body.velocity = velocity;
        }
    }

    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) {
        if let Some(body) = self.body_mut(id) {
            body.velocity += impulse * (1.0 / body.mass);
        }
    }

    pub fn step(&mut self, dt: f32) {
        let g = self.gravity;
        for (_, body) in &mut self.bodies {
            body.velocity += g * dt;
            body.position += body.velocity * dt;
        }
        self.resolve_contacts();
    }

    fn resolve_contacts(&mut self) {
        let n = self.bodies.len();
        for i in 0..n {
            let (head, tail) = self.bodies.split_at_mut(i + 1);
            let a = &mut head[i].1;
            for (_, b) in tail.iter_mut() {
                let delta = b.position - a.position;
                let dist = delta.length();
                let min_dist = a.radius + b.radius;
                if dist >= min_dist {
                    continue;
                }
                let normal = if dist > f32::EPSILON {
                    delta * (1.0 / dist)
                } else {
                    Vec2::new(0.0, 1.0)
                };

                let overlap = min_dist - dist;
                let inv_a = 1.0 / a.mass;
                let inv_b = 1.0 / b.mass;
                let share = overlap / (inv_a + inv_b);
                a.position = a.position - normal * (share * inv_a);
                b.position += normal * (share * inv_b);

                let closing = (b.velocity - a.velocity).dot(normal);
                if closing < 0.0 {
                    let e = a.elasticity * b.elasticity;
                    let j = -(1.0 + e) * closing / (inv_a + inv_b);
                    a.velocity = a.velocity - normal * (j * inv_a);
                    b.velocity += normal * (j * inv_b);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_accelerates_bodies() {
        let mut world = World::new(Vec2::new(0.0, 900.0));
        let id = world.add_ball(Vec2::new(100.0, 0.0), 10.0, 0.5);
        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }
        let body = world.body(id).unwrap();
        assert!((body.velocity.y - 900.0).abs() < 1e-2);
        assert!(body.position.y > 440.0 && body.position.y < 470.0);
        assert_eq!(body.position.x, 100.0);
    }

    #[test]
    fn impulse_changes_velocity_by_inverse_mass() {
        let mut world = World::new(Vec2::ZERO);
        let id = world.add_ball(Vec2::ZERO, 30.0, 0.0);
        world.apply_impulse(id, Vec2::new(200.0, -1000.0));
        assert_eq!(world.body(id).unwrap().velocity, Vec2::new(200.0, -1000.0));
    }

    #[test]
    fn removal_happens_once() {
        let mut world = World::new(Vec2::ZERO);
        let a = world.add_ball(Vec2::ZERO, 1.0, 0.0);
        let b = world.add_ball(Vec2::new(10.0, 0.0), 1.0, 0.0);
        assert!(world.remove(a).is_some());
        assert!(world.remove(a).is_none());
        assert!(!world.contains(a));
        assert!(world.contains(b));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn overlapping_discs_separate_and_bounce() {
        let mut world = World::new(Vec2::ZERO);
        let a = world.add_ball(Vec2::new(0.0, 0.0), 10.0, 1.0);
        let b = world.add_ball(Vec2::new(15.0, 0.0), 10.0, 1.0);
        world.set_velocity(a, Vec2::new(50.0, 0.0));
        world.step(0.01);
        let pa = world.position(a).unwrap();
        let pb = world.position(b).unwrap();
        assert!(pa.distance(pb) >= 20.0 - 1e-3);
        let va = world.body(a).unwrap().velocity;
        let vb = world.body(b).unwrap().velocity;
        // Equal masses with full elasticity swap velocities along the normal.
        assert!(va.x.abs() < 1e-3);
        assert!((vb.x - 50.0).abs() < 1e-3);
    }
}
