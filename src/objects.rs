use serde::Deserialize;

use crate::physics::{BodyId, Vec2, World};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Fruit,
    Bomb,
}

impl ObjectKind {
    pub fn is_bomb(&self) -> bool {
        matches!(self, ObjectKind::Bomb)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectState {
    Falling,
    /// Playing the slice animation; `frame` indexes the sprite sheet.
    Slicing { frame: usize },
    Consumed,
}

#[derive(Clone, Debug)]
pub struct FallingObject {
    pub body: BodyId,
    pub kind: ObjectKind,
    /// Index into the variant's sprite list.
    pub sprite: usize,
    /// Drawn size in world units.
    pub width: f32,
    pub height: f32,
    pub state: ObjectState,
}

impl FallingObject {
    pub fn frame(&self) -> usize {
        match self.state {
            ObjectState::Slicing { frame } => frame,
            _ => 0,
        }
    }
}

/// Everything the spawner decides about a new object.
#[derive(Clone, Debug)]
pub struct NewObject {
    pub position: Vec2,
    pub radius: f32,
    pub elasticity: f32,
    pub impulse: Vec2,
    pub kind: ObjectKind,
    pub sprite: usize,
    pub width: f32,
    pub height: f32,
}

/// Owns the live objects of a session. Bodies enter and leave the physics
/// world only through this list, so both stay in step.
#[derive(Default)]
pub struct ObjectList {
    objects: Vec<FallingObject>,
}

impl ObjectList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, world: &mut World, new: NewObject) -> BodyId {
        let body = world.add_ball(new.position, new.radius, new.elasticity);
        world.apply_impulse(body, new.impulse);
        self.objects.push(FallingObject {
            body,
            kind: new.kind,
            sprite: new.sprite,
            width: new.width,
            height: new.height,
            state: ObjectState::Falling,
        });
        body
    }

    /// Removes the object from the list and its body from the world in one
    /// step. Returns `None` if it was already gone.
    pub fn consume(&mut self, world: &mut World, body: BodyId) -> Option<FallingObject> {
        let idx = self.objects.iter().position(|o| o.body == body)?;
        let mut obj = self.objects.remove(idx);
        if world.remove(body).is_none() {
            log::warn!("object {:?} had no physics body", body);
        }
        obj.state = ObjectState::Consumed;
        Some(obj)
    }

    /// Removes every still falling object whose centre sits below `limit_y`.
    /// Objects mid-slice stay until their animation completes.
    pub fn cull_below(&mut self, world: &mut World, limit_y: f32) -> Vec<FallingObject> {
        let fallen: Vec<BodyId> = self
            .objects
            .iter()
            .filter(|o| o.state == ObjectState::Falling)
            .filter(|o| world.position(o.body).map_or(true, |p| p.y > limit_y))
            .map(|o| o.body)
            .collect();
        fallen
            .into_iter()
            .filter_map(|body| self.consume(world, body))
            .collect()
    }

    pub fn clear(&mut self, world: &mut World) {
        for obj in self.objects.drain(..) {
            world.remove(obj.body);
        }
    }

    pub fn get(&self, body: BodyId) -> Option<&FallingObject> {
        self.objects.iter().find(|o| o.body == body)
    }

    pub fn get_mut(&mut self, body: BodyId) -> Option<&mut FallingObject> {
        self.objects.iter_mut().find(|o| o.body == body)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FallingObject> {
        self.objects.iter()
    }

    pub fn bodies(&self) -> Vec<BodyId> {
        self.objects.iter().map(|o| o.body).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruit_at(x: f32, y: f32) -> NewObject {
        NewObject {
            position: Vec2::new(x, y),
            radius: 30.0,
            elasticity: 0.0,
            impulse: Vec2::ZERO,
            kind: ObjectKind::Fruit,
            sprite: 0,
            width: 60.0,
            height: 60.0,
        }
    }

    #[test]
    fn insert_adds_body_and_applies_impulse() {
        let mut world = World::new(Vec2::ZERO);
        let mut list = ObjectList::new();
        let mut new = fruit_at(10.0, 20.0);
        new.impulse = Vec2::new(0.0, -500.0);
        let body = list.insert(&mut world, new);
        assert_eq!(list.len(), 1);
        assert_eq!(world.len(), 1);
        assert_eq!(world.body(body).unwrap().velocity.y, -500.0);
        assert_eq!(list.get(body).unwrap().state, ObjectState::Falling);
    }

    #[test]
    fn consume_is_idempotent() {
        let mut world = World::new(Vec2::ZERO);
        let mut list = ObjectList::new();
        let body = list.insert(&mut world, fruit_at(0.0, 0.0));
        let obj = list.consume(&mut world, body).unwrap();
        assert_eq!(obj.state, ObjectState::Consumed);
        assert!(list.consume(&mut world, body).is_none());
        assert!(list.is_empty());
        assert!(world.is_empty());
    }

    #[test]
    fn cull_removes_only_objects_past_the_limit() {
        let mut world = World::new(Vec2::ZERO);
        let mut list = ObjectList::new();
        let low = list.insert(&mut world, fruit_at(0.0, 900.0));
        let high = list.insert(&mut world, fruit_at(200.0, 100.0));
        let culled = list.cull_below(&mut world, 820.0);
        assert_eq!(culled.len(), 1);
        assert_eq!(culled[0].body, low);
        assert!(list.get(high).is_some());
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn cull_keeps_objects_being_sliced() {
        let mut world = World::new(Vec2::ZERO);
        let mut list = ObjectList::new();
        let slicing = list.insert(&mut world, fruit_at(0.0, 900.0));
        list.get_mut(slicing).unwrap().state = ObjectState::Slicing { frame: 3 };
        let falling = list.insert(&mut world, fruit_at(100.0, 900.0));
        let culled = list.cull_below(&mut world, 820.0);
        assert_eq!(culled.len(), 1);
        assert_eq!(culled[0].body, falling);
        assert!(world.contains(slicing));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn clear_empties_world_too() {
        let mut world = World::new(Vec2::ZERO);
        let mut list = ObjectList::new();
        for i in 0..4 {
            list.insert(&mut world, fruit_at(i as f32 * 100.0, 0.0));
        }
        list.clear(&mut world);
        assert!(list.is_empty());
        assert!(world.is_empty());
    }
}
