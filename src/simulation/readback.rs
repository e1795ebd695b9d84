//! Blocking copy of a particle buffer back to the host.
//!
//! Used by tests and tooling. The renderer never reads back; it binds the
//! authoritative buffer directly as a vertex source.

use std::sync::mpsc;

use glam::Vec4;

use crate::error::{ClothError, Result};

/// Copies the first `count` vec4s of `source` into a staging buffer, waits
/// for the queue to drain and returns them.
pub fn read_vec4s(device: &wgpu::Device, queue: &wgpu::Queue, source: &wgpu::Buffer, count: usize) -> Result<Vec<Vec4>> {
    let byte_size = (count * std::mem::size_of::<[f32; 4]>()) as u64;
    if byte_size == 0 {
        return Ok(Vec::new());
    }

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Cloth Readback Staging"),
        size: byte_size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Cloth Readback Encoder"),
    });
    encoder.copy_buffer_to_buffer(source, 0, &staging, 0, byte_size);
    queue.submit(std::iter::once(encoder.finish()));

    let (tx, rx) = mpsc::channel();
    staging.slice(..).map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::PollType::Wait)?;

    match rx.recv() {
        Ok(result) => result?,
        Err(_) => {
            log::error!("Readback channel disconnected, device may be lost");
            return Err(ClothError::ChannelDisconnected);
        }
    }

    let values = {
        let data = staging.slice(..).get_mapped_range();
        let lanes: &[[f32; 4]] = bytemuck::cast_slice(&data);
        lanes.iter().map(|lane| Vec4::from_array(*lane)).collect()
    };
    staging.unmap();

    Ok(values)
}
