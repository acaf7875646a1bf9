//! Grid layouts for maze and room levels.
//!
//! A layout is either written by hand (one string per row, `#` for wall) or carved with a
//! randomized depth-first walk. Either way it is pure data; the level builder turns wall cells
//! into colliders.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

pub const CELL_SIZE: f32 = 4.0;
pub const WALL_HEIGHT: f32 = 3.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeLayout {
    width: usize,
    depth: usize,
    walls: Vec<bool>,
}

impl MazeLayout {
    /// Builds a layout from rows of text. Short rows are padded with wall.
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let depth = rows.len();
        let mut walls = vec![true; width * depth];

        for (z, row) in rows.iter().enumerate() {
            for (x, cell) in row.chars().enumerate() {
                walls[z * width + x] = cell == '#';
            }
        }

        Self {
            width,
            depth,
            walls,
        }
    }

    /// Carves a perfect maze of `cells_x` by `cells_z` rooms. The grid is `2n + 1` cells on each
    /// side so walls and corridors share the same cell size; the outer ring stays solid.
    pub fn carve<R: Rng + ?Sized>(cells_x: usize, cells_z: usize, rng: &mut R) -> Self {
        let cells_x = cells_x.max(1);
        let cells_z = cells_z.max(1);
        let width = cells_x * 2 + 1;
        let depth = cells_z * 2 + 1;
        let mut layout = Self {
            width,
            depth,
            walls: vec![true; width * depth],
        };

        let mut visited = vec![false; cells_x * cells_z];
        let mut stack = vec![(0usize, 0usize)];
        visited[0] = true;
        layout.open(1, 1);

        while let Some(&(cx, cz)) = stack.last() {
            let mut neighbours = Vec::with_capacity(4);
            if cx > 0 && !visited[cz * cells_x + cx - 1] {
                neighbours.push((cx - 1, cz));
            }
            if cx + 1 < cells_x && !visited[cz * cells_x + cx + 1] {
                neighbours.push((cx + 1, cz));
            }
            if cz > 0 && !visited[(cz - 1) * cells_x + cx] {
                neighbours.push((cx, cz - 1));
            }
            if cz + 1 < cells_z && !visited[(cz + 1) * cells_x + cx] {
                neighbours.push((cx, cz + 1));
            }

            let Some(&(nx, nz)) = neighbours.choose(rng) else {
                stack.pop();
                continue;
            };

            visited[nz * cells_x + nx] = true;
            // Knock out the wall between the two rooms, then the room itself.
            layout.open(cx + nx + 1, cz + nz + 1);
            layout.open(nx * 2 + 1, nz * 2 + 1);
            stack.push((nx, nz));
        }

        layout
    }

    fn open(&mut self, x: usize, z: usize) {
        let index = z * self.width + x;
        self.walls[index] = false;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Cells outside the grid count as wall.
    pub fn is_wall(&self, x: usize, z: usize) -> bool {
        x >= self.width || z >= self.depth || self.walls[z * self.width + x]
    }

    pub fn is_open(&self, x: usize, z: usize) -> bool {
        !self.is_wall(x, z)
    }

    pub fn open_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.depth)
            .flat_map(move |z| (0..self.width).map(move |x| (x, z)))
            .filter(|&(x, z)| self.is_open(x, z))
    }

    pub fn wall_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.depth)
            .flat_map(move |z| (0..self.width).map(move |x| (x, z)))
            .filter(|&(x, z)| self.is_wall(x, z))
    }

    /// Floor-level centre of a cell; the layout is centred on the world origin.
    pub fn cell_center(&self, x: usize, z: usize) -> Vec3 {
        Vec3::new(
            (x as f32 + 0.5 - self.width as f32 * 0.5) * CELL_SIZE,
            0.0,
            (z as f32 + 0.5 - self.depth as f32 * 0.5) * CELL_SIZE,
        )
    }

    /// World-space extent of the whole grid on the ground plane.
    pub fn footprint(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.depth as f32) * CELL_SIZE
    }
}

/// Rejection-samples an open cell centre that `accept` agrees to. Gives up after
/// `max_attempts` draws and returns `None`.
pub fn sample_open_position<R, F>(
    layout: &MazeLayout,
    rng: &mut R,
    max_attempts: usize,
    mut accept: F,
) -> Option<Vec3>
where
    R: Rng + ?Sized,
    F: FnMut(Vec3) -> bool,
{
    if layout.width == 0 || layout.depth == 0 {
        return None;
    }

    for _ in 0..max_attempts {
        let x = rng.gen_range(0..layout.width);
        let z = rng.gen_range(0..layout.depth);
        if !layout.is_open(x, z) {
            continue;
        }

        let candidate = layout.cell_center(x, z);
        if accept(candidate) {
            return Some(candidate);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn reachable_from(layout: &MazeLayout, start: (usize, usize)) -> usize {
        let mut seen = vec![false; layout.width() * layout.depth()];
        let mut queue = VecDeque::from([start]);
        seen[start.1 * layout.width() + start.0] = true;
        let mut count = 0;

        while let Some((x, z)) = queue.pop_front() {
            count += 1;
            let candidates = [
                (x.wrapping_sub(1), z),
                (x + 1, z),
                (x, z.wrapping_sub(1)),
                (x, z + 1),
            ];
            for (nx, nz) in candidates {
                if layout.is_open(nx, nz) && !seen[nz * layout.width() + nx] {
                    seen[nz * layout.width() + nx] = true;
                    queue.push_back((nx, nz));
                }
            }
        }

        count
    }

    #[test]
    fn rows_map_hash_to_wall() {
        let layout = MazeLayout::from_rows(&["###", "#.", "###"]);
        assert_eq!(layout.width(), 3);
        assert!(layout.is_open(1, 1));
        assert!(layout.is_wall(2, 1), "short rows are padded with wall");
        assert!(layout.is_wall(7, 7));
        assert_eq!(layout.open_cells().count(), 1);
    }

    #[test]
    fn carved_maze_is_fully_connected_with_solid_border() {
        let mut rng = StdRng::seed_from_u64(42);
        let layout = MazeLayout::carve(6, 5, &mut rng);
        assert_eq!((layout.width(), layout.depth()), (13, 11));

        for x in 0..layout.width() {
            assert!(layout.is_wall(x, 0));
            assert!(layout.is_wall(x, layout.depth() - 1));
        }
        for z in 0..layout.depth() {
            assert!(layout.is_wall(0, z));
            assert!(layout.is_wall(layout.width() - 1, z));
        }

        // A perfect maze over n rooms opens n rooms plus n - 1 connecting cells.
        let rooms = 6 * 5;
        assert_eq!(layout.open_cells().count(), rooms * 2 - 1);
        assert_eq!(reachable_from(&layout, (1, 1)), rooms * 2 - 1);
    }

    #[test]
    fn cell_centres_are_one_cell_apart_and_centred() {
        let layout = MazeLayout::from_rows(&["###", "#.#", "###"]);
        assert_eq!(layout.cell_center(1, 1), Vec3::ZERO);
        let step = layout.cell_center(2, 1) - layout.cell_center(1, 1);
        assert_eq!(step, Vec3::new(CELL_SIZE, 0.0, 0.0));
        assert_eq!(layout.footprint(), Vec2::splat(3.0 * CELL_SIZE));
    }

    #[test]
    fn sampling_respects_predicate_and_gives_up() {
        let mut rng = StdRng::seed_from_u64(9);
        let layout = MazeLayout::carve(5, 5, &mut rng);

        let picked = sample_open_position(&layout, &mut rng, 1000, |p| p.x > 0.0)
            .expect("an open cell east of the origin exists");
        assert!(picked.x > 0.0);
        assert!(layout
            .open_cells()
            .any(|(x, z)| layout.cell_center(x, z) == picked));

        assert_eq!(sample_open_position(&layout, &mut rng, 50, |_| false), None);
    }
}
