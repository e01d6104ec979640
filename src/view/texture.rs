//! Block textures: asynchronous loading on the CPU side, and the per-kind
//! bind groups the block pipeline samples from.
//!
//! Every kind starts with a 1x1 placeholder in its flat colour. Loads are
//! fire-and-forget; finished images arrive over a channel and are swapped in
//! by [`BlockTextures::apply`] on the render thread.

use crossbeam_channel::{Receiver, Sender};
use image::RgbaImage;

use crate::error::{Result, SandboxError};
use crate::model::BlockKind;

/// A decoded texture waiting to be uploaded
pub struct LoadedTexture {
    pub kind: BlockKind,
    pub image: RgbaImage,
}

/// Where the texture of `kind` lives below `source` (URL prefix or directory)
pub fn texture_location(source: &str, kind: BlockKind) -> String {
    format!("{}/{}", source.trim_end_matches('/'), kind.texture_file())
}

pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

pub struct TextureLoader {
    tx: Sender<LoadedTexture>,
    rx: Receiver<LoadedTexture>,
}

impl TextureLoader {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    /// Start loading every block kind's texture from `source`
    pub fn load_all(&self, source: &str) {
        for kind in BlockKind::ALL {
            self.load(kind, texture_location(source, kind));
        }
    }

    /// Textures that finished loading since the last poll
    pub fn poll(&self) -> Vec<LoadedTexture> {
        self.rx.try_iter().collect()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load(&self, kind: BlockKind, location: String) {
        let tx = self.tx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = fetch_bytes(&location).await.and_then(|bytes| decode(&bytes));
            finish(&tx, kind, &location, result);
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(&self, kind: BlockKind, location: String) {
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let result = std::fs::read(&location)
                .map_err(SandboxError::from)
                .and_then(|bytes| decode(&bytes));
            finish(&tx, kind, &location, result);
        });
    }
}

/// Block kinds whose texture file is absent from the directory `dir`
#[cfg(not(target_arch = "wasm32"))]
pub fn missing_textures(dir: &str) -> Vec<BlockKind> {
    BlockKind::ALL
        .into_iter()
        .filter(|&kind| !std::path::Path::new(&texture_location(dir, kind)).is_file())
        .collect()
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn finish(tx: &Sender<LoadedTexture>, kind: BlockKind, location: &str, result: Result<RgbaImage>) {
    match result {
        Ok(image) => {
            tracing::info!("loaded {} texture {location} ({}x{})", kind.name(), image.width(), image.height());
            // the renderer may already be gone
            let _ = tx.send(LoadedTexture { kind, image });
        }
        Err(e) => tracing::warn!("keeping placeholder for {}: {e}", kind.name()),
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    let fetch_error = |reason: JsValue| SandboxError::TextureFetch {
        url: url.to_string(),
        reason: format!("{reason:?}"),
    };

    let window = web_sys::window().ok_or_else(|| fetch_error(JsValue::from_str("no global `window`")))?;
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(fetch_error)?
        .dyn_into()
        .map_err(fetch_error)?;

    if !response.ok() {
        return Err(SandboxError::TextureFetch {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(fetch_error)?)
        .await
        .map_err(fetch_error)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// GPU side: one texture bind group per block kind
pub struct BlockTextures {
    pub bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    bind_groups: Vec<wgpu::BindGroup>,
}

impl BlockTextures {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("block_texture_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("block_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_groups = BlockKind::ALL
            .iter()
            .map(|kind| {
                create_bind_group(
                    device,
                    queue,
                    &bind_group_layout,
                    &sampler,
                    kind.name(),
                    1,
                    1,
                    &kind.color_rgba8(),
                )
            })
            .collect();

        Self { bind_group_layout, sampler, bind_groups }
    }

    pub fn bind_group(&self, kind: BlockKind) -> &wgpu::BindGroup {
        &self.bind_groups[kind.index()]
    }

    /// Replace a kind's placeholder with its loaded image
    pub fn apply(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, loaded: LoadedTexture) {
        let max_dim = device.limits().max_texture_dimension_2d;
        let (width, height) = loaded.image.dimensions();
        let image = match fit_within(width, height, max_dim) {
            Some((w, h)) => {
                tracing::debug!("downscaling {} texture {width}x{height} to {w}x{h}", loaded.kind.name());
                image::imageops::thumbnail(&loaded.image, w, h)
            }
            None => loaded.image,
        };

        self.bind_groups[loaded.kind.index()] = create_bind_group(
            device,
            queue,
            &self.bind_group_layout,
            &self.sampler,
            loaded.kind.name(),
            image.width(),
            image.height(),
            image.as_raw(),
        );
    }
}

/// Size that fits `max_dim` on the longer side with the aspect ratio kept,
/// or `None` when the image already fits
pub fn fit_within(width: u32, height: u32, max_dim: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= max_dim {
        return None;
    }
    let scale = max_dim as f64 / longest as f64;
    let fit = |v: u32| ((v as f64 * scale).round() as u32).clamp(1, max_dim);
    Some((fit(width), fit(height)))
}

fn create_bind_group(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    label: &str,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> wgpu::BindGroup {
    let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&view) },
            wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(sampler) },
        ],
    })
}
