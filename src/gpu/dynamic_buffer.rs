//! Growable GPU buffers for per-frame data.
//!
//! Capacity doubles when a write does not fit and never shrinks (GPU
//! buffers cannot be resized in place).

use std::marker::PhantomData;

/// Smallest allocation, in bytes.
const MIN_CAPACITY: u64 = 256;

/// Next capacity able to hold `needed` bytes.
fn grown_capacity(current: u64, needed: u64) -> u64 {
    needed.max(current.saturating_mul(2)).max(MIN_CAPACITY)
}

/// A typed GPU buffer that reallocates on overflow.
pub struct TypedBuffer<T> {
    buffer: wgpu::Buffer,
    capacity: u64,
    count: usize,
    usage: wgpu::BufferUsages,
    label: String,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> TypedBuffer<T> {
    /// Buffer with room for `capacity` items.
    pub fn with_capacity(
        device: &wgpu::Device,
        label: &str,
        capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let bytes = ((capacity * size_of::<T>()) as u64).max(MIN_CAPACITY);
        Self {
            buffer: Self::allocate(device, label, bytes, usage),
            capacity: bytes,
            count: 0,
            usage,
            label: label.to_owned(),
            _marker: PhantomData,
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

    /// Upload `data`, growing first if necessary.
    ///
    /// Returns `true` if the buffer was reallocated (bind groups that
    /// reference it need recreation).
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[T],
    ) -> bool {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let needed = bytes.len() as u64;

        let reallocated = needed > self.capacity;
        if reallocated {
            self.capacity = grown_capacity(self.capacity, needed);
            self.buffer = Self::allocate(
                device,
                &self.label,
                self.capacity,
                self.usage,
            );
            log::debug!(
                "{}: grew to {} bytes",
                self.label,
                self.capacity
            );
        }

        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
        self.count = data.len();
        reallocated
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Slice covering the items written by the last [`write`](Self::write).
    pub fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.buffer
            .slice(..(self.count * size_of::<T>()) as wgpu::BufferAddress)
    }

    /// Items written by the last [`write`](Self::write).
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the last write was empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Capacity in items.
    pub fn capacity(&self) -> usize {
        self.capacity as usize / size_of::<T>().max(1)
    }
}
