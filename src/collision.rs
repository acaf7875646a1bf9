use bevy::prelude::*;

pub struct CollisionPlugin;

impl Plugin for CollisionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CollisionWorld>().add_systems(
            PostUpdate,
            rebuild_collision_world.in_set(CollisionSystems),
        );
    }
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollisionSystems;

/// Static, axis-aligned solid (wall, floor, platform). The entity's translation is its centre.
#[derive(Component, Debug, Clone, Copy)]
pub struct StaticCollider {
    pub half_extents: Vec3,
}

impl StaticCollider {
    pub fn from_size(size: Vec3) -> Self {
        Self {
            half_extents: size * 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb3 {
    pub fn from_center_half(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn intersects(&self, other: &Aabb3) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Slab test. `dir` must be normalized; returns the distance to the entry point when it lies
    /// within `max_distance`. A ray starting inside the box hits at distance zero.
    pub fn ray_hit(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            if d.abs() < f32::EPSILON {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (self.min[axis] - o) * inv;
            let mut t1 = (self.max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

/// Outcome of one `resolve_motion` step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionContact {
    pub grounded: bool,
    /// A horizontal axis was stopped by geometry.
    pub wall: bool,
}

const SKIN: f32 = 0.001;

/// World-space boxes for every `StaticCollider`, rebuilt when colliders come and go.
#[derive(Resource, Default, Debug)]
pub struct CollisionWorld {
    boxes: Vec<Aabb3>,
}

impl CollisionWorld {
    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    pub fn insert(&mut self, aabb: Aabb3) {
        self.boxes.push(aabb);
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn overlaps(&self, aabb: &Aabb3) -> bool {
        self.boxes.iter().any(|solid| solid.intersects(aabb))
    }

    pub fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<f32> {
        let dir = dir.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }

        self.boxes
            .iter()
            .filter_map(|solid| solid.ray_hit(origin, dir, max_distance))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// True when static geometry lies on the segment between `from` and `to`.
    pub fn is_blocked(&self, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return false;
        }
        self.raycast(from, delta, distance).is_some()
    }

    /// Short downward probe under a body: a thin slab just below its feet.
    pub fn probe_ground(&self, center: Vec3, half: Vec3, margin: f32) -> bool {
        let feet = center.y - half.y;
        let probe = Aabb3 {
            min: Vec3::new(center.x - half.x * 0.9, feet - margin, center.z - half.z * 0.9),
            max: Vec3::new(center.x + half.x * 0.9, feet, center.z + half.z * 0.9),
        };
        self.overlaps(&probe)
    }

    /// Short horizontal probe ahead of a body along `dir`. The probe starts slightly above the
    /// feet so the floor it stands on does not count as an obstacle.
    pub fn probe_forward(&self, center: Vec3, half: Vec3, dir: Vec3, distance: f32) -> bool {
        let dir = Vec3::new(dir.x, 0.0, dir.z).normalize_or_zero();
        if dir == Vec3::ZERO {
            return false;
        }

        let probe_center = center + dir * distance + Vec3::Y * 0.05;
        let probe_half = Vec3::new(half.x, half.y - 0.1, half.z).max(Vec3::splat(0.01));
        self.overlaps(&Aabb3::from_center_half(probe_center, probe_half))
    }

    /// Moves a box-shaped body one axis at a time, snapping against geometry and zeroing the
    /// blocked component of its velocity.
    pub fn resolve_motion(
        &self,
        position: &mut Vec3,
        velocity: &mut Vec3,
        half: Vec3,
        dt: f32,
    ) -> MotionContact {
        let mut contact = MotionContact::default();

        for axis in [0usize, 2] {
            if self.sweep_axis(position, velocity, half, dt, axis) {
                contact.wall = true;
            }
        }

        let falling = velocity.y < 0.0;
        if self.sweep_axis(position, velocity, half, dt, 1) && falling {
            contact.grounded = true;
        }

        contact
    }

    fn sweep_axis(
        &self,
        position: &mut Vec3,
        velocity: &mut Vec3,
        half: Vec3,
        dt: f32,
        axis: usize,
    ) -> bool {
        let step = velocity[axis] * dt;
        if step.abs() < f32::EPSILON {
            return false;
        }

        let mut candidate = *position;
        candidate[axis] += step;
        let moved = Aabb3::from_center_half(candidate, half);

        let mut hit = false;
        let mut snapped = candidate[axis];
        for solid in self.boxes.iter().filter(|solid| solid.intersects(&moved)) {
            hit = true;
            snapped = if step > 0.0 {
                snapped.min(solid.min[axis] - half[axis] - SKIN)
            } else {
                snapped.max(solid.max[axis] + half[axis] + SKIN)
            };
        }

        if hit {
            position[axis] = snapped;
            velocity[axis] = 0.0;
        } else {
            position[axis] = candidate[axis];
        }
        hit
    }
}

fn rebuild_collision_world(
    added: Query<(), Added<StaticCollider>>,
    mut removed: RemovedComponents<StaticCollider>,
    colliders: Query<(&Transform, &StaticCollider)>,
    mut world: ResMut<CollisionWorld>,
) {
    let removed_any = removed.read().count() > 0;
    if added.is_empty() && !removed_any {
        return;
    }

    world.clear();
    for (transform, collider) in &colliders {
        world.insert(Aabb3::from_center_half(
            transform.translation,
            collider.half_extents,
        ));
    }

    if world.is_empty() {
        debug!("Collision world is empty after rebuild.");
    }
}
