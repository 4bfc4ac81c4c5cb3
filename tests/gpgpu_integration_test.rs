#![cfg(feature = "integration-tests")]

use cgmath::{Deg, Point3};
use flow_gpgpu::{
    camera::{Camera, CameraResources, Projection},
    gpgpu::{FlowField, grid::ParticleGrid, particles::GpgpuParticles},
    viewport::Viewport,
};
use rand::{SeedableRng, rngs::SmallRng};

async fn headless_device() -> (wgpu::Device, wgpu::Queue) {
    let mut descriptor = wgpu::InstanceDescriptor::new_without_display_handle();
    descriptor.backends = wgpu::Backends::PRIMARY;
    let instance = wgpu::Instance::new(descriptor);
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .expect("no GPU adapter available");
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await
        .expect("failed to create device")
}

/// Particles with the given state, no flow-field displacement.
fn particles(device: &wgpu::Device, queue: &wgpu::Queue, state: &[[f32; 4]]) -> GpgpuParticles {
    let camera = CameraResources::new(
        device,
        Camera::new(Point3::new(0.0, 0.0, 5.0), Point3::new(0.0, 0.0, 0.0)),
        Projection::new(64, 64, Deg(45.0), 0.1, 100.0),
    );
    let grid = ParticleGrid::new(state.len());
    let mut texels = state.to_vec();
    texels.resize(grid.texel_count(), [0.0; 4]);
    let vertices = grid.particle_vertices(None, &mut SmallRng::seed_from_u64(0));
    GpgpuParticles::new(
        device,
        queue,
        wgpu::TextureFormat::Rgba8UnormSrgb,
        &camera.bind_group_layout,
        grid,
        &texels,
        &vertices,
    )
    .unwrap()
}

fn step(device: &wgpu::Device, queue: &wgpu::Queue, particles: &mut GpgpuParticles, delta: f32) {
    let still = FlowField {
        influence: 0.5,
        strength: 0.0,
        frequency: 0.5,
    };
    particles.update(queue, 1.0, delta, still, 0.1, [64.0, 64.0]);
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    particles.compute(&mut encoder);
    queue.submit(std::iter::once(encoder.finish()));
}

#[tokio::test]
async fn should_keep_the_initial_state_until_the_first_step() {
    let (device, queue) = headless_device().await;
    let particles = particles(&device, &queue, &[[1.0, 2.0, 3.0, 0.25]]);

    let state = particles.read_state(&device, &queue).await.unwrap();

    assert_eq!(state[0], [1.0, 2.0, 3.0, 0.25]);
    assert_eq!(particles.generation(), 0);
}

#[tokio::test]
async fn should_age_living_particles() {
    let (device, queue) = headless_device().await;
    let mut particles = particles(&device, &queue, &[[1.0, 2.0, 3.0, 0.5]]);

    step(&device, &queue, &mut particles, 0.1);
    let state = particles.read_state(&device, &queue).await.unwrap();

    assert_eq!(&state[0][..3], &[1.0, 2.0, 3.0]);
    assert!((state[0][3] - 0.53).abs() < 1e-5, "decay {}", state[0][3]);
    assert_eq!(particles.generation(), 1);
}

#[tokio::test]
async fn should_respawn_dead_particles_at_their_base_position() {
    let (device, queue) = headless_device().await;
    let mut particles = particles(&device, &queue, &[[0.0, 1.0, 0.0, 0.95]]);

    // 0.95 -> 1.25 (dead) -> respawned with decay 0.25.
    step(&device, &queue, &mut particles, 1.0);
    step(&device, &queue, &mut particles, 1.0);
    let state = particles.read_state(&device, &queue).await.unwrap();

    assert_eq!(&state[0][..3], &[0.0, 1.0, 0.0]);
    assert!((state[0][3] - 0.25).abs() < 1e-5, "decay {}", state[0][3]);
}

#[tokio::test]
async fn should_step_every_texel_of_the_grid() {
    let (device, queue) = headless_device().await;
    let state: Vec<[f32; 4]> = (0..5).map(|i| [i as f32, 0.0, 0.0, 0.0]).collect();
    let mut particles = particles(&device, &queue, &state);
    assert_eq!(particles.grid().size(), 3);

    step(&device, &queue, &mut particles, 0.5);
    let read = particles.read_state(&device, &queue).await.unwrap();

    assert_eq!(read.len(), 9);
    for (i, texel) in read.iter().take(5).enumerate() {
        assert_eq!(texel[0], i as f32);
        assert!((texel[3] - 0.15).abs() < 1e-5);
    }
}

#[tokio::test]
async fn should_size_sprites_for_the_resized_drawing_buffer() {
    let (device, queue) = headless_device().await;
    let mut particles = particles(&device, &queue, &[[0.0, 0.0, 0.0, 0.5]]);
    let mut viewport = Viewport::new(800.0, 600.0, 1.0);
    viewport.resize(1024.0, 768.0, 2.0);

    let still = FlowField {
        influence: 0.5,
        strength: 0.0,
        frequency: 0.5,
    };
    particles.update(&queue, 0.0, 0.0, still, 0.07, viewport.resolution());

    assert_eq!(particles.points_uniforms().resolution, [2048.0, 1536.0]);
    assert_eq!(particles.points_uniforms().size, 0.07);
}
