use flow_gpgpu::{
    demos::run_shader_gallery,
    gallery::{GalleryConfig, ShaderMode},
};

/// `shader-gallery [folder title]`, e.g. `shader-gallery Water`.
fn main() -> anyhow::Result<()> {
    let mut config = GalleryConfig::default();
    if let Some(title) = std::env::args().nth(1) {
        match ShaderMode::from_title(&title) {
            Some(mode) => config.initial_mode = mode,
            None => anyhow::bail!(
                "unknown shader {:?}, expected one of: {}",
                title,
                ShaderMode::ALL.map(|m| m.title()).join(", ")
            ),
        }
    }
    run_shader_gallery(config)
}
