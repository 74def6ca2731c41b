//! Shared GPU types and utilities used by both pipelines.

use anyhow::Result;
use bytemuck::{Pod, Zeroable};

// ── validation ────────────────────────────────────────────────────────────

/// Runs `build` inside a wgpu validation error scope.
///
/// wgpu surfaces shader compile and pipeline link problems through error
/// scopes rather than return values. A captured diagnostic is logged at
/// error level and turned into a hard failure, so a broken pipeline is
/// never registered or used.
pub(super) fn validated<T>(
    device: &wgpu::Device,
    what: &str,
    build: impl FnOnce() -> T,
) -> Result<T> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build();
    if let Some(err) = pollster::block_on(scope.pop()) {
        log::error!("{what} failed validation: {err}");
        anyhow::bail!("{what} failed validation");
    }
    Ok(value)
}

// ── shape vertex ──────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct ShapeVertex {
    pub pos: [f32; 2], // NDC
}

impl ShapeVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShapeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── base geometry ─────────────────────────────────────────────────────────

/// Unit triangle, transformed per draw by the canvas pipeline's uniforms.
pub(super) const UNIT_TRIANGLE: [ShapeVertex; 3] = [
    ShapeVertex { pos: [0.0, 0.1] },
    ShapeVertex { pos: [0.1, -0.1] },
    ShapeVertex { pos: [-0.1, -0.1] },
];

/// Unit square as two triangles (6 vertices), same uniform path as above.
pub(super) const UNIT_SQUARE: [ShapeVertex; 6] = [
    ShapeVertex { pos: [-0.1, 0.1] },
    ShapeVertex { pos: [0.1, 0.1] },
    ShapeVertex { pos: [0.1, -0.1] },
    ShapeVertex { pos: [-0.1, 0.1] },
    ShapeVertex { pos: [-0.1, -0.1] },
    ShapeVertex { pos: [0.1, -0.1] },
];

// ── uniform slots ─────────────────────────────────────────────────────────

/// Rounds `size` up to a multiple of `align` (a power of two).
pub(super) fn align_up(size: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    size.div_ceil(align) * align
}

/// Byte stride between per-shape uniform slots for uniform type `T`.
///
/// Slots must start at multiples of the device's minimum uniform-buffer
/// offset alignment (typically 256) to be addressable via dynamic offsets.
pub(super) fn uniform_stride<T>(device: &wgpu::Device) -> u64 {
    let align = device.limits().min_uniform_buffer_offset_alignment as u64;
    align_up(std::mem::size_of::<T>() as u64, align)
}

/// Returns the `wgpu` minimum binding size for uniform type `T`.
///
/// Uniform structs are non-empty `repr(C)` types, so the size is always
/// non-zero. Centralising this avoids `.unwrap()` at each pipeline's
/// layout-creation site.
pub(super) fn min_binding_size<T>() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
        .expect("uniform types have non-zero size by construction")
}

/// Packs `values` into a stride-aligned byte stream, one slot per value.
///
/// The gap between a value's end and the next slot boundary is zeroed.
pub(super) fn pack_slots<T: Pod>(values: &[T], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; values.len() * stride];
    for (i, v) in values.iter().enumerate() {
        let src = bytemuck::bytes_of(v);
        bytes[i * stride..i * stride + src.len()].copy_from_slice(src);
    }
    bytes
}

/// One dynamically-offset uniform buffer with an aligned slot per shape.
///
/// The buffer grows on demand and is refilled each frame via a single
/// `write_buffer` call. Callers must rebuild their bind group whenever
/// [`ensure_capacity`](Self::ensure_capacity) reports recreation.
pub(super) struct SlotBuffer {
    label: &'static str,
    buffer: Option<wgpu::Buffer>,
    capacity: usize, // slots
}

impl SlotBuffer {
    pub(super) fn new(label: &'static str) -> Self {
        Self {
            label,
            buffer: None,
            capacity: 0,
        }
    }

    /// Grows the buffer to hold at least `slots` slots of `stride` bytes.
    ///
    /// Returns `true` when the underlying buffer was recreated.
    pub(super) fn ensure_capacity(
        &mut self,
        device: &wgpu::Device,
        stride: u64,
        slots: usize,
    ) -> bool {
        if slots <= self.capacity && self.buffer.is_some() {
            return false;
        }

        let new_cap = slots.next_power_of_two().max(16);
        self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.label),
            size: new_cap as u64 * stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.capacity = new_cap;
        true
    }

    /// Uploads one slot per value, starting at slot 0.
    pub(super) fn write<T: Pod>(&self, queue: &wgpu::Queue, stride: u64, values: &[T]) {
        let Some(buffer) = self.buffer.as_ref() else { return };
        queue.write_buffer(buffer, 0, &pack_slots(values, stride));
    }

    pub(super) fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── align_up ──────────────────────────────────────────────────────────

    #[test]
    fn align_up_already_aligned() {
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(512, 256), 512);
    }

    #[test]
    fn align_up_rounds_to_next_boundary() {
        assert_eq!(align_up(1, 256), 256);
        assert_eq!(align_up(32, 256), 256);
        assert_eq!(align_up(257, 256), 512);
    }

    #[test]
    fn align_up_zero_size() {
        assert_eq!(align_up(0, 256), 0);
    }

    // ── pack_slots ────────────────────────────────────────────────────────

    #[test]
    fn pack_slots_places_each_value_at_its_slot_boundary() {
        let values: [[f32; 4]; 2] = [[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]];
        let bytes = pack_slots(&values, 256);
        assert_eq!(bytes.len(), 512);

        assert_eq!(&bytes[0..16], bytemuck::bytes_of(&values[0]));
        assert_eq!(&bytes[256..272], bytemuck::bytes_of(&values[1]));
    }

    #[test]
    fn pack_slots_zeroes_padding() {
        let values: [[f32; 4]; 1] = [[1.0; 4]];
        let bytes = pack_slots(&values, 256);
        assert!(bytes[16..256].iter().all(|&b| b == 0));
    }

    #[test]
    fn pack_slots_empty_input() {
        let values: [[f32; 4]; 0] = [];
        assert!(pack_slots(&values, 256).is_empty());
    }

    // ── base geometry ─────────────────────────────────────────────────────

    #[test]
    fn unit_square_is_two_triangles_sharing_a_diagonal() {
        assert_eq!(UNIT_SQUARE.len(), 6);
        // Both triangles share the top-left / bottom-right diagonal.
        assert_eq!(UNIT_SQUARE[0], UNIT_SQUARE[3]);
        assert_eq!(UNIT_SQUARE[2], UNIT_SQUARE[5]);
    }

    #[test]
    fn unit_triangle_is_centered_on_the_y_axis() {
        assert_eq!(UNIT_TRIANGLE[0].pos[0], 0.0);
        assert_eq!(UNIT_TRIANGLE[1].pos[0], -UNIT_TRIANGLE[2].pos[0]);
    }
}
