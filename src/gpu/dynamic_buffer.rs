//! Growable GPU buffers.
//!
//! Per-draw object uniforms are packed into one buffer at aligned offsets
//! and bound with a dynamic offset; the buffer grows 2x when a frame needs
//! more slots than it holds. GPU buffers cannot be resized in place, so
//! growth replaces the buffer and callers must rebuild bind groups.

/// A GPU buffer that can grow dynamically.
pub struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    len: u64,
    usage: wgpu::BufferUsages,
    label: String,
}

/// Capacity after growing `current` to fit `needed` bytes.
fn grown_capacity(current: u64, needed: u64) -> u64 {
    (needed * 2).max(current + 1024)
}

/// Round `size` up to a multiple of `alignment` (a power of two).
#[must_use]
pub fn align_to(size: u64, alignment: u64) -> u64 {
    let mask = alignment.max(1) - 1;
    (size + mask) & !mask
}

impl DynamicBuffer {
    /// Buffer with the given initial byte capacity (at least 256 bytes).
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        initial_capacity: u64,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let capacity = initial_capacity.max(256);
        Self {
            buffer: Self::allocate(device, label, capacity, usage),
            capacity,
            len: 0,
            usage,
            label: label.to_owned(),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        label: &str,
        size: u64,
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Write raw bytes at offset 0, growing if necessary.
    ///
    /// Returns `true` if the buffer was reallocated (bind groups need
    /// recreation).
    pub fn write_bytes(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
    ) -> bool {
        let needed = data.len() as u64;
        let reallocated = needed > self.capacity;
        if reallocated {
            self.capacity = grown_capacity(self.capacity, needed);
            self.buffer =
                Self::allocate(device, &self.label, self.capacity, self.usage);
            log::debug!("{} grown to {} bytes", self.label, self.capacity);
        }
        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, data);
        }
        self.len = needed;
        reallocated
    }

    /// The underlying buffer.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Bytes written by the last [`write_bytes`](Self::write_bytes).
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the last write was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated size in bytes.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_doubles_the_request() {
        assert_eq!(grown_capacity(256, 4096), 8192);
        // small overflows still grow by at least 1 KiB
        assert_eq!(grown_capacity(4096, 4100), 8200);
        assert_eq!(grown_capacity(8192, 8193), 16386);
    }

    #[test]
    fn alignment_rounds_up() {
        assert_eq!(align_to(128, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
        assert_eq!(align_to(0, 256), 0);
    }
}
