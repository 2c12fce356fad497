use super::{CellCoord, Material, Voxel, VoxelGrid, VoxelLayer, VoxelWorld};
use crate::noise::fractal_noise;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

impl VoxelGrid {
    /// Procedural world: bedrock floor, rock and soil columns shaped by value
    /// noise, ponds in the low areas, scattered tree crowns and resources on
    /// the surface.
    pub fn generate(width: u16, depth: u16, height: u16, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = Self::empty(width, depth, height);
        let h = grid.height;

        // Leave at least two air cells above the highest column.
        let max_ground = (h - 3).max(1);
        let water_level = (h / 4).max(1);

        for y in 0..grid.depth {
            for x in 0..grid.width {
                let elevation = fractal_noise(x as f64, y as f64, seed);
                let ground = (1 + (elevation * h as f64 * 0.6) as i32).min(max_ground);

                for z in 0..h {
                    let c = CellCoord::new(x, y, z);
                    let voxel = if z == 0 {
                        Voxel::new(Material::Bedrock, VoxelLayer::Underground)
                    } else if z < ground - 2 {
                        Voxel::new(Material::Rock, VoxelLayer::Underground)
                    } else if z < ground {
                        let material = if ground <= water_level + 1 {
                            Material::Sand
                        } else {
                            Material::Soil
                        };
                        Voxel::new(material, VoxelLayer::Underground)
                    } else if z < water_level {
                        Voxel::new(Material::Water, VoxelLayer::Aquatic)
                    } else if z == ground.max(water_level) {
                        Voxel::new(Material::Air, VoxelLayer::Surface)
                    } else {
                        Voxel::new(Material::Air, VoxelLayer::Aerial)
                    };
                    grid.set(c, voxel);
                }
            }
        }

        let area = width as usize * depth as usize;
        let tree_count = (area / 60).max(2);
        let resource_count = (area / 25).max(4);

        let mut placed = 0;
        let mut attempts = 0;
        while placed < tree_count && attempts < tree_count * 10 {
            attempts += 1;
            let x = rng.gen_range(0..grid.width);
            let y = rng.gen_range(0..grid.depth);
            let Some(top) = grid.surface_height(x, y) else {
                continue;
            };
            if top <= water_level || top + 3 >= h {
                continue;
            }
            // Crown floats one cell above the ground so walkers pass under it.
            for dz in 1..=2 {
                grid.set(
                    CellCoord::new(x, y, top + dz),
                    Voxel::new(Material::Foliage, VoxelLayer::Canopy),
                );
            }
            placed += 1;
        }

        placed = 0;
        attempts = 0;
        while placed < resource_count && attempts < resource_count * 10 {
            attempts += 1;
            let x = rng.gen_range(0..grid.width);
            let y = rng.gen_range(0..grid.depth);
            let Some(top) = grid.surface_height(x, y) else {
                continue;
            };
            let c = CellCoord::new(x, y, top);
            if grid.cell_at(c).map_or(true, |v| v.resource) {
                continue;
            }
            grid.set(
                c,
                Voxel::new(Material::Air, VoxelLayer::Surface).with_resource(),
            );
            placed += 1;
        }

        tracing::debug!(width, depth, height, seed, trees = tree_count, "Voxel world generated");
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let a = VoxelGrid::generate(16, 16, 12, 3);
        let b = VoxelGrid::generate(16, 16, 12, 3);
        for z in 0..12 {
            for y in 0..16 {
                for x in 0..16 {
                    let c = CellCoord::new(x, y, z);
                    assert_eq!(a.cell_at(c), b.cell_at(c));
                }
            }
        }
    }

    #[test]
    fn test_generated_world_has_floor_and_sky() {
        let grid = VoxelGrid::generate(12, 10, 10, 11);
        for y in 0..10 {
            for x in 0..12 {
                assert_eq!(
                    grid.cell_at(CellCoord::new(x, y, 0)).map(|v| v.material),
                    Some(Material::Bedrock)
                );
                assert_eq!(
                    grid.cell_at(CellCoord::new(x, y, 9)).map(|v| v.material),
                    Some(Material::Air)
                );
                assert!(grid.surface_height(x, y).is_some());
            }
        }
        assert!(!grid.resource_cells().is_empty());
    }
}
