//! Frame capture for export collaborators.
//!
//! The viewer copies every presented frame into a persistent capture
//! texture, so a capture request never waits for the next repaint: it reads
//! back whatever the screen currently shows. Readback maps a staging buffer,
//! strips the row padding wgpu requires, and encodes the pixels as PNG.
//!
//! Captures are served on native targets only; the WebGL build has no
//! blocking readback path.

use crate::config::VehicleIdentity;

/// One captured frame, encoded and labelled for the requesting collaborator.
#[derive(Clone, Debug)]
pub struct CapturedFrame {
    pub identity: VehicleIdentity,
    pub width: u32,
    pub height: u32,
    /// PNG-encoded RGBA pixels.
    pub png: Vec<u8>,
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn capture_frame(
    ctx: &crate::context::Context,
    identity: &VehicleIdentity,
) -> anyhow::Result<CapturedFrame> {
    use anyhow::Context as _;

    let width = ctx.config.width;
    let height = ctx.config.height;
    let u32_size = std::mem::size_of::<u32>() as u32;
    // Buffer copies require rows padded to 256 bytes.
    let unpadded_bytes_per_row = u32_size * width;
    let padded_bytes_per_row =
        unpadded_bytes_per_row.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

    let output_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Capture Readback Buffer"),
        size: (padded_bytes_per_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Capture Encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &ctx.capture_texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    ctx.queue.submit(std::iter::once(encoder.finish()));

    // NOTE: We have to create the mapping THEN device.poll() before await
    // the future. Otherwise the application will freeze.
    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    let buffer_slice = output_buffer.slice(..);
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).unwrap();
    });
    ctx.device.poll(wgpu::PollType::Wait {
        submission_index: None,
        timeout: Some(instant::Duration::from_secs(3)),
    })?;
    rx.receive()
        .await
        .context("capture readback channel closed")?
        .context("mapping the capture readback buffer")?;

    let pixels = {
        let data = buffer_slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);
        for row in data.chunks_exact(padded_bytes_per_row as usize) {
            pixels.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
        }
        if is_bgra(ctx.config.format) {
            for pixel in pixels.chunks_exact_mut(4) {
                pixel.swap(0, 2);
            }
        }
        pixels
    };
    output_buffer.unmap();

    let image = image::RgbaImage::from_raw(width, height, pixels)
        .context("captured pixel data does not match the surface size")?;
    let mut png = Vec::new();
    image.write_to(
        &mut std::io::Cursor::new(&mut png),
        image::ImageFormat::Png,
    )?;

    Ok(CapturedFrame {
        identity: identity.clone(),
        width,
        height,
        png,
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn is_bgra(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    )
}
