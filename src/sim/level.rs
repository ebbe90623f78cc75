//! Level generation
//!
//! Each level index maps onto a fixed pattern library. A pattern is a
//! predicate over `(row, col)` deciding whether a cell holds a brick. Bricks
//! are either grid rectangles or, in irregular mode, quadrilaterals cut from a
//! jittered vertex grid whose outer ring stays put so the brick field keeps
//! its outline.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::shape::BrickShape;
use super::state::{Brick, BrickKind, Playfield};
use crate::consts::PATTERN_COUNT;
use crate::tuning::Tuning;

/// Pattern set a session cycles through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelTheme {
    /// Full grid, checkerboard, diamond, sparse
    #[default]
    Classic,
    /// Disc, glyph, starburst, circuit
    Neon,
}

impl LevelTheme {
    pub fn patterns(&self) -> [Pattern; PATTERN_COUNT as usize] {
        match self {
            LevelTheme::Classic => [
                Pattern::FullGrid,
                Pattern::Checkerboard,
                Pattern::Diamond,
                Pattern::Sparse,
            ],
            LevelTheme::Neon => [
                Pattern::Disc,
                Pattern::Glyph,
                Pattern::Starburst,
                Pattern::Circuit,
            ],
        }
    }
}

/// Brick presence masks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    FullGrid,
    Checkerboard,
    /// Manhattan-distance mask around the grid center
    Diamond,
    /// ~70% of cells, chosen at random
    Sparse,
    Disc,
    Glyph,
    Starburst,
    Circuit,
}

/// Smiley glyph, sampled onto whatever grid size is configured
const GLYPH: [&str; 6] = [
    "..######..",
    ".#......#.",
    "#..#..#..#",
    "#........#",
    "#.#....#.#",
    ".#.####.#.",
];

impl Pattern {
    /// Stable id handed to the renderer for decoration
    pub fn id(&self) -> u8 {
        match self {
            Pattern::FullGrid => 0,
            Pattern::Checkerboard => 1,
            Pattern::Diamond => 2,
            Pattern::Sparse => 3,
            Pattern::Disc => 4,
            Pattern::Glyph => 5,
            Pattern::Starburst => 6,
            Pattern::Circuit => 7,
        }
    }

    /// Does cell `(row, col)` of a `rows x cols` grid hold a brick?
    pub fn contains(&self, row: u32, col: u32, rows: u32, cols: u32, rng: &mut Pcg32) -> bool {
        let (r, c) = (row as i32, col as i32);
        match self {
            Pattern::FullGrid => true,
            Pattern::Checkerboard => (row + col) % 2 == 0,
            Pattern::Diamond => {
                let (cr, cc) = ((rows / 2) as i32, (cols / 2) as i32);
                let reach = ((rows / 2 + cols / 2) / 2) as i32;
                (r - cr).abs() + (c - cc).abs() <= reach
            }
            Pattern::Sparse => rng.random::<f32>() > 0.3,
            Pattern::Disc => {
                let u = (row as f32 + 0.5 - rows as f32 / 2.0) / (rows as f32 / 2.0);
                let v = (col as f32 + 0.5 - cols as f32 / 2.0) / (cols as f32 / 2.0);
                u * u + v * v <= 1.0
            }
            Pattern::Glyph => {
                let gr = (row as usize * GLYPH.len()) / rows as usize;
                let line = GLYPH[gr.min(GLYPH.len() - 1)].as_bytes();
                let gc = (col as usize * line.len()) / cols as usize;
                line[gc.min(line.len() - 1)] == b'#'
            }
            Pattern::Starburst => {
                let u = (row as f32 + 0.5 - rows as f32 / 2.0) / (rows as f32 / 2.0);
                let v = (col as f32 + 0.5 - cols as f32 / 2.0) / (cols as f32 / 2.0);
                u.abs() < 0.34 || v.abs() < 0.21 || (u.abs() - v.abs()).abs() < 0.2
            }
            Pattern::Circuit => {
                if row % 2 == 0 {
                    col != (row * 3) % cols
                } else {
                    col % 3 == 0
                }
            }
        }
    }
}

/// Pattern used for a 1-based level index
pub fn pattern_for_level(level: u32, theme: LevelTheme) -> Pattern {
    let slot = (level.max(1) - 1) % PATTERN_COUNT;
    theme.patterns()[slot as usize]
}

/// Chance that a present cell becomes a tough brick
pub fn tough_chance(level: u32, tuning: &Tuning) -> f32 {
    (level.saturating_sub(1) as f32 * tuning.tough_chance_per_level * tuning.tough_scale).min(1.0)
}

/// Jittered `(rows + 1) x (cols + 1)` vertex grid. Vertices on the outer ring
/// are never moved.
fn vertex_grid(
    rows: u32,
    cols: u32,
    cell: Vec2,
    top: f32,
    jitter: f32,
    rng: &mut Pcg32,
) -> Vec<Vec<Vec2>> {
    let mut grid = Vec::with_capacity(rows as usize + 1);
    for r in 0..=rows {
        let mut line = Vec::with_capacity(cols as usize + 1);
        for c in 0..=cols {
            let mut p = Vec2::new(c as f32 * cell.x, top + r as f32 * cell.y);
            let on_edge = r == 0 || r == rows || c == 0 || c == cols;
            if !on_edge && jitter > 0.0 {
                p.x += rng.random_range(-jitter..=jitter);
                p.y += rng.random_range(-jitter..=jitter);
            }
            line.push(p);
        }
        grid.push(line);
    }
    grid
}

/// Generate the brick layout for a 1-based level index.
///
/// Never fails; a pattern may legitimately produce no bricks, in which case
/// the next tick clears the level.
pub fn generate_level(
    level: u32,
    tuning: &Tuning,
    playfield: Playfield,
    rng: &mut Pcg32,
    first_id: u32,
) -> Vec<Brick> {
    let rows = tuning.brick_rows;
    let cols = tuning.brick_cols;
    let cell = Vec2::new(playfield.width / cols as f32, tuning.brick_height);
    let top = tuning.brick_top_offset;

    let pattern = pattern_for_level(level, tuning.theme);
    let tough_p = tough_chance(level, tuning);

    let grid = tuning.irregular_bricks.then(|| {
        let jitter = tuning.vertex_jitter * cell.x.min(cell.y);
        vertex_grid(rows, cols, cell, top, jitter, rng)
    });

    let mut bricks = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            if !pattern.contains(row, col, rows, cols, rng) {
                continue;
            }

            let tough = tough_p > 0.0 && rng.random::<f32>() < tough_p;
            let (kind, hp) = if tough {
                (BrickKind::Tough, 2)
            } else {
                (BrickKind::Standard, 1)
            };

            let shape = match &grid {
                Some(g) => {
                    let (r, c) = (row as usize, col as usize);
                    BrickShape::polygon([g[r][c], g[r][c + 1], g[r + 1][c + 1], g[r + 1][c]])
                }
                None => BrickShape::rect(
                    col as f32 * cell.x,
                    top + row as f32 * cell.y,
                    cell.x,
                    cell.y,
                ),
            };

            bricks.push(Brick {
                id: first_id + bricks.len() as u32,
                kind,
                hp,
                shape,
                pattern_id: pattern.id(),
            });
        }
    }

    log::info!(
        "Level {} ({:?}): {} bricks, tough chance {:.2}",
        level,
        pattern,
        bricks.len(),
        tough_p
    );
    bricks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::shape::Aabb;
    use rand::SeedableRng;

    fn field() -> Playfield {
        Playfield::new(600.0, 600.0)
    }

    fn generate(level: u32, tuning: &Tuning, seed: u64) -> Vec<Brick> {
        let mut rng = Pcg32::seed_from_u64(seed);
        generate_level(level, tuning, field(), &mut rng, 1)
    }

    #[test]
    fn test_level_one_is_full_standard_grid() {
        let bricks = generate(1, &Tuning::default(), 1);
        assert_eq!(bricks.len(), 60);
        assert!(bricks.iter().all(|b| b.hp == 1 && b.kind == BrickKind::Standard));
        // Ids are unique and sequential
        assert!(bricks.iter().enumerate().all(|(i, b)| b.id == i as u32 + 1));
    }

    #[test]
    fn test_checkerboard_and_diamond_counts() {
        let tuning = Tuning::default();
        assert_eq!(generate(2, &tuning, 1).len(), 30);

        let diamond = generate(3, &tuning, 1);
        let mut rng = Pcg32::seed_from_u64(0);
        let expected = (0..6)
            .flat_map(|r| (0..10).map(move |c| (r, c)))
            .filter(|&(r, c)| Pattern::Diamond.contains(r, c, 6, 10, &mut rng))
            .count();
        assert_eq!(diamond.len(), expected);
        assert!(diamond.len() < 60);
    }

    #[test]
    fn test_pattern_cycle_wraps() {
        assert_eq!(pattern_for_level(1, LevelTheme::Classic), Pattern::FullGrid);
        assert_eq!(pattern_for_level(4, LevelTheme::Classic), Pattern::Sparse);
        assert_eq!(pattern_for_level(5, LevelTheme::Classic), Pattern::FullGrid);
        assert_eq!(pattern_for_level(2, LevelTheme::Neon), Pattern::Glyph);
    }

    #[test]
    fn test_tough_chance_scales_with_level() {
        let tuning = Tuning::default();
        assert_eq!(tough_chance(1, &tuning), 0.0);
        assert!((tough_chance(3, &tuning) - 0.4).abs() < 1e-6);
        assert_eq!(tough_chance(20, &tuning), 1.0);

        let all_tough = Tuning {
            tough_scale: 5.0,
            ..Default::default()
        };
        let bricks = generate(2, &all_tough, 9);
        assert!(!bricks.is_empty());
        assert!(bricks.iter().all(|b| b.hp == 2 && b.is_tough()));
    }

    #[test]
    fn test_neon_patterns_differ_from_classic() {
        let classic = Tuning::default();
        let neon = Tuning {
            theme: LevelTheme::Neon,
            ..Default::default()
        };
        for level in 1..=4 {
            let a = generate(level, &classic, 5);
            let b = generate(level, &neon, 5);
            let ids_a: Vec<u8> = a.iter().map(|b| b.pattern_id).collect();
            let ids_b: Vec<u8> = b.iter().map(|b| b.pattern_id).collect();
            assert_ne!(ids_a.first(), ids_b.first());
            assert!(!b.is_empty());
        }
    }

    #[test]
    fn test_irregular_bricks_keep_outline() {
        let tuning = Tuning {
            irregular_bricks: true,
            vertex_jitter: 0.3,
            ..Default::default()
        };
        let bricks = generate(1, &tuning, 11);
        assert_eq!(bricks.len(), 60);

        let mut all = Aabb::new(Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY));
        for brick in &bricks {
            let BrickShape::Polygon {
                vertices,
                bounds,
                centroid,
            } = &brick.shape
            else {
                panic!("expected polygon brick");
            };
            assert!(bounds.overlaps_circle(*centroid, 0.1));
            for v in vertices {
                all.min = all.min.min(*v);
                all.max = all.max.max(*v);
            }
        }
        // Outer ring is unperturbed
        assert_eq!(all.min, Vec2::new(0.0, 50.0));
        assert!((all.max.x - 600.0).abs() < 1e-3);
        assert!((all.max.y - 170.0).abs() < 1e-3);
    }

    #[test]
    fn test_irregular_neighbors_share_vertices() {
        let tuning = Tuning {
            irregular_bricks: true,
            ..Default::default()
        };
        let bricks = generate(1, &tuning, 3);
        let (BrickShape::Polygon { vertices: left, .. }, BrickShape::Polygon { vertices: right, .. }) =
            (&bricks[11].shape, &bricks[12].shape)
        else {
            panic!("expected polygon bricks");
        };
        // Right edge of one brick is the left edge of the next
        assert_eq!(left[1], right[0]);
        assert_eq!(left[2], right[3]);
    }

    #[test]
    fn test_sparse_is_seeded() {
        let tuning = Tuning::default();
        let a = generate(4, &tuning, 77);
        let b = generate(4, &tuning, 77);
        assert_eq!(a.len(), b.len());
    }
}
