//! Stepped platform course for the climbing level.

use bevy::prelude::*;
use rand::Rng;

pub const PLATFORM_SIZE: Vec3 = Vec3::new(3.0, 0.5, 3.0);
pub const START_SIZE: Vec3 = Vec3::new(8.0, 0.5, 8.0);
/// Horizontal radius around the goal marker that counts as arrival.
pub const TARGET_RADIUS: f32 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    /// Centre of the slab.
    pub center: Vec3,
    pub size: Vec3,
}

impl Platform {
    pub fn top(&self) -> f32 {
        self.center.y + self.size.y * 0.5
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlatformCourse {
    /// The starting pad first, the goal pad last.
    pub platforms: Vec<Platform>,
    /// Where the player stands at the start (feet on the starting pad).
    pub start: Vec3,
    /// Goal marker on top of the last pad.
    pub target: Vec3,
}

impl PlatformCourse {
    /// A chain of `count` platforms after the starting pad, each one a jumpable step further
    /// along -z and slightly higher than the last. Every gap, the first one off the starting pad
    /// included, is 1 to 2.5 units from edge to edge.
    pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let start_pad = Platform {
            center: Vec3::new(0.0, -START_SIZE.y * 0.5, 0.0),
            size: START_SIZE,
        };
        let mut platforms = vec![start_pad];

        // Pretend a regular platform ends flush with the pad's far edge.
        let mut cursor = Vec3::new(
            0.0,
            -PLATFORM_SIZE.y * 0.5,
            (PLATFORM_SIZE.z - START_SIZE.z) * 0.5,
        );
        for _ in 0..count.max(1) {
            cursor.z -= rng.gen_range(4.0..=5.5);
            cursor.x = (cursor.x + rng.gen_range(-2.0..=2.0)).clamp(-6.0, 6.0);
            cursor.y += rng.gen_range(0.5..=1.0);
            platforms.push(Platform {
                center: cursor,
                size: PLATFORM_SIZE,
            });
        }

        let start = Vec3::new(0.0, 0.0, 0.0);
        let last = platforms.last().map_or(Vec3::ZERO, |platform| {
            Vec3::new(platform.center.x, platform.top(), platform.center.z)
        });

        Self {
            platforms,
            start,
            target: last,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn course_climbs_in_jumpable_steps() {
        let mut rng = StdRng::seed_from_u64(21);
        let course = PlatformCourse::generate(8, &mut rng);
        assert_eq!(course.platforms.len(), 9);

        for pair in course.platforms.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            let rise = to.top() - from.top();
            let gap = (from.center.z - from.size.z * 0.5) - (to.center.z + to.size.z * 0.5);
            assert!((0.499..=1.001).contains(&rise), "rise {rise}");
            assert!((0.999..=2.501).contains(&gap), "edge gap {gap}");
        }

        let last = course.platforms.last().expect("goal pad");
        assert_eq!(course.target.y, last.top());
        assert_eq!((course.target.x, course.target.z), (last.center.x, last.center.z));
        assert!(course.start.distance(course.target) > TARGET_RADIUS);
    }
}
