use std::collections::HashSet;

use flow_gpgpu::gpgpu::grid::ParticleGrid;
use rand::{SeedableRng, rngs::SmallRng};

#[test]
fn should_use_a_single_texel_for_no_particles() {
    let grid = ParticleGrid::new(0);
    assert_eq!(grid.size(), 1);
    assert_eq!(grid.texel_count(), 1);
    assert_eq!(grid.draw_count(), 0);
}

#[test]
fn should_pick_the_smallest_square_side() {
    for (count, side) in [(1, 1), (2, 2), (4, 2), (5, 3), (9, 3), (10, 4), (561, 24), (10_000, 100), (10_001, 101)] {
        assert_eq!(ParticleGrid::new(count).size(), side, "count {}", count);
    }
}

#[test]
fn should_map_seventeen_particles_to_distinct_texel_centres() {
    let grid = ParticleGrid::new(17);
    assert_eq!(grid.size(), 5);

    let mut seen = HashSet::new();
    for i in 0..17 {
        let [u, v] = grid.uv(i);
        assert!(u > 0.0 && u < 1.0 && v > 0.0 && v < 1.0, "uv {:?} out of range", (u, v));
        // Texel centres sit at (k + 0.5) / size.
        let column = u * 5.0 - 0.5;
        let row = v * 5.0 - 0.5;
        assert!((column - column.round()).abs() < 1e-5);
        assert!((row - row.round()).abs() < 1e-5);
        assert_eq!(grid.texel(i), (column.round() as u32, row.round() as u32));
        assert!(seen.insert(grid.texel(i)), "texel of particle {} used twice", i);
    }
}

#[test]
fn should_fill_the_initial_state_with_positions_and_decay_seeds() {
    let positions: Vec<[f32; 3]> = (0..17).map(|i| [i as f32, -(i as f32), 0.5]).collect();
    let grid = ParticleGrid::new(positions.len());
    let mut rng = SmallRng::seed_from_u64(7);

    let state = grid.initial_state(&positions, &mut rng).unwrap();

    assert_eq!(state.len(), 25);
    for (texel, p) in state.iter().zip(&positions) {
        assert_eq!(&texel[..3], &p[..]);
        assert!((0.0..1.0).contains(&texel[3]));
    }
    assert!(state[17..].iter().all(|texel| *texel == [0.0; 4]));
}

#[test]
fn should_reject_a_position_count_mismatch() {
    let grid = ParticleGrid::new(4);
    let mut rng = SmallRng::seed_from_u64(1);
    assert!(grid.initial_state(&[[0.0; 3]; 3], &mut rng).is_err());
}

#[test]
fn should_be_reproducible_for_a_seed() {
    let grid = ParticleGrid::new(3);
    let positions = [[0.0; 3]; 3];
    let a = grid
        .initial_state(&positions, &mut SmallRng::seed_from_u64(42))
        .unwrap();
    let b = grid
        .initial_state(&positions, &mut SmallRng::seed_from_u64(42))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn should_build_one_white_vertex_per_particle_by_default() {
    let grid = ParticleGrid::new(6);
    let mut rng = SmallRng::seed_from_u64(3);
    let vertices = grid.particle_vertices(None, &mut rng);

    assert_eq!(vertices.len(), 6);
    for (i, vertex) in vertices.iter().enumerate() {
        assert_eq!(vertex.uv, grid.uv(i));
        assert_eq!(vertex.color, [1.0, 1.0, 1.0]);
        assert!((0.0..1.0).contains(&vertex.size));
    }
}

#[test]
fn should_keep_vertex_colours() {
    let grid = ParticleGrid::new(2);
    let colors = [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
    let vertices = grid.particle_vertices(Some(&colors), &mut SmallRng::seed_from_u64(3));
    assert_eq!(vertices[0].color, colors[0]);
    assert_eq!(vertices[1].color, colors[1]);
}
