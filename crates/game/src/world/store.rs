use std::collections::BTreeMap;

use glam::Vec3;

use crate::net::SessionId;

use super::object::GameObject;

#[derive(Debug)]
pub struct World {
    objects: BTreeMap<u32, GameObject>,
    next_object_id: u32,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_object_id: 1,
        }
    }

    pub fn spawn(&mut self, owner: SessionId, position: Vec3) -> u32 {
        let id = self.next_object_id;
        self.next_object_id += 1;
        self.objects.insert(id, GameObject::new(id, owner, position));
        id
    }

    pub fn get(&self, id: u32) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn set_position(&mut self, id: u32, position: Vec3) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) => {
                object.position = position;
                true
            }
            None => false,
        }
    }

    pub fn objects(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_allocates_fresh_ids() {
        let mut world = World::new();
        let a = world.spawn(SessionId(0), Vec3::ZERO);
        let b = world.spawn(SessionId(1), Vec3::ONE);

        assert_ne!(a, b);
        assert!(b > a);
        assert_eq!(world.object_count(), 2);
        assert_eq!(world.get(b).unwrap().owner, SessionId(1));
    }

    #[test]
    fn test_set_position_exact() {
        let mut world = World::new();
        let id = world.spawn(SessionId(0), Vec3::ZERO);

        assert!(world.set_position(id, Vec3::new(10.0, 20.0, 30.0)));
        let object = world.get(id).unwrap();
        assert_eq!((object.x(), object.y(), object.z()), (10.0, 20.0, 30.0));

        assert!(!world.set_position(id + 1, Vec3::ONE));
    }

    #[test]
    fn test_objects_ordered_by_id() {
        let mut world = World::new();
        for owner in 0..4 {
            world.spawn(SessionId(owner), Vec3::ZERO);
        }
        let ids: Vec<u32> = world.objects().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
