use std::collections::TryReserveError;

/// Required alignment for device allocations, in bytes.
pub const DEVICE_ALIGNMENT: usize = 64;

#[derive(Clone, Copy)]
#[repr(C, align(64))]
struct AlignedBlock([u8; DEVICE_ALIGNMENT]);

const ZERO_BLOCK: AlignedBlock = AlignedBlock([0; DEVICE_ALIGNMENT]);

/// Device-resident byte storage for read benchmarks, grown on demand.
///
/// The benchmark core only ever moves opaque bytes across the host boundary,
/// so the allocator stays external to this crate. This type owns a 64-byte
/// aligned allocation with explicit copies at the host boundary, which is the
/// seam where an accelerator allocator plugs in.
#[derive(Default)]
pub struct DeviceBuffer {
    blocks: Vec<AlignedBlock>,
    len: usize,
}

impl DeviceBuffer {
    /// Reserves a zero-length buffer; no memory is allocated until the first
    /// copy.
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Replaces the buffer contents with `bytes`, growing the allocation when
    /// needed. Allocation failure is reported to the caller rather than
    /// aborting the benchmark process.
    pub fn copy_from_host(&mut self, bytes: &[u8]) -> Result<(), TryReserveError> {
        let blocks_needed = bytes.len().div_ceil(DEVICE_ALIGNMENT);
        if blocks_needed > self.blocks.len() {
            self.blocks.try_reserve(blocks_needed - self.blocks.len())?;
            self.blocks.resize(blocks_needed, ZERO_BLOCK);
        }
        // SAFETY: `blocks` holds at least `blocks_needed * DEVICE_ALIGNMENT`
        // bytes, which covers `bytes.len()`; the regions cannot overlap since
        // `blocks` is owned by self.
        unsafe {
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                self.blocks.as_mut_ptr().cast::<u8>(),
                bytes.len(),
            );
        }
        self.len = bytes.len();
        Ok(())
    }

    /// The buffer contents, addressable from the host.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: the first `len` bytes of `blocks` are initialized, either by
        // `copy_from_host` or by the zeroed blocks they were grown with.
        unsafe { std::slice::from_raw_parts(self.blocks.as_ptr().cast::<u8>(), self.len) }
    }
}
