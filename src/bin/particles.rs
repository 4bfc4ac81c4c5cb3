use flow_gpgpu::{
    demos::run_particles,
    gpgpu::{ParticleSource, ParticlesConfig},
};

/// `particles [model.glb]`: particles start on the vertices of the given
/// asset, or on a sphere when none is given.
fn main() -> anyhow::Result<()> {
    let mut config = ParticlesConfig::default();
    if let Some(model) = std::env::args().nth(1) {
        config.source = ParticleSource::Model(model);
    }
    run_particles(config)
}
