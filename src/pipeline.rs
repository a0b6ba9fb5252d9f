//! Pipeline runtime (C11): bounded buffer pool and read/process staging.
//!
//! Grounded on `pipeline.h`'s `pipeline_state_base`/`pipeline_buffer`
//! design, ported from its TBB-pipeline-and-`aiocb` concurrency model to
//! this workspace's rayon-based one: the "bounded-token" constraint (at
//! most `max_tokens` buffers in flight) becomes a fixed-capacity buffer
//! pool guarded by a mutex, and the two pipeline stages become plain
//! closures driven by a rayon parallel iterator instead of a TBB pipeline
//! object.

use rustc_hash::FxHashMap as HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

/// One pooled, reusable transfer buffer. `refs` lets the GPU path (or any
/// stage that must keep a buffer alive past its own scope) hold an extra
/// reference; the buffer is only eligible for reuse once `refs` drops to 1
/// (its home slot in the pool).
pub struct Buffer {
    pub data: Vec<u8>,
    pub input_index: Option<u32>,
    in_use: bool,
}

impl Buffer {
    fn new(chunk_size: usize) -> Self {
        Buffer {
            data: vec![0u8; chunk_size],
            input_index: None,
            in_use: false,
        }
    }
}

/// Exactly `max_tokens` cache-line-sized buffers, each `chunk_size` bytes.
/// Acquisition is a linear probe starting from the index of the
/// most-recently-released buffer (the "search hint" from §4.11), which
/// keeps the common case O(1) instead of O(max_tokens).
pub struct BufferPool {
    buffers: Mutex<Vec<Buffer>>,
    hint: AtomicUsize,
    max_tokens: usize,
}

impl BufferPool {
    pub fn new(max_tokens: usize, chunk_size: usize) -> Self {
        let buffers = (0..max_tokens).map(|_| Buffer::new(chunk_size)).collect();
        BufferPool {
            buffers: Mutex::new(buffers),
            hint: AtomicUsize::new(0),
            max_tokens,
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_tokens
    }

    /// Acquires a free buffer, blocking the caller (via a short spin over
    /// the mutex) until one is released. Returns the buffer's slot index so
    /// the caller can release it later.
    pub fn acquire(&self) -> usize {
        loop {
            {
                let mut buffers = self.buffers.lock().unwrap();
                let hint = self.hint.load(Ordering::Relaxed);
                let n = buffers.len();
                for offset in 0..n {
                    let idx = (hint + offset) % n;
                    if !buffers[idx].in_use {
                        buffers[idx].in_use = true;
                        buffers[idx].input_index = None;
                        return idx;
                    }
                }
            }
            std::thread::yield_now();
        }
    }

    pub fn with_buffer<R>(&self, idx: usize, f: impl FnOnce(&mut Buffer) -> R) -> R {
        let mut buffers = self.buffers.lock().unwrap();
        f(&mut buffers[idx])
    }

    /// Releases a buffer back to the pool and remembers its index as the
    /// next acquisition hint.
    pub fn release(&self, idx: usize) {
        let mut buffers = self.buffers.lock().unwrap();
        buffers[idx].in_use = false;
        buffers[idx].input_index = None;
        drop(buffers);
        self.hint.store(idx, Ordering::Relaxed);
    }
}

/// Shared "not-ok" flag (§5 Cancellation): set on the first fatal error,
/// checked by every stage at each boundary so the pipeline exits early
/// instead of continuing to do doomed work.
#[derive(Default)]
pub struct CancellationFlag(AtomicBool);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        !self.0.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Per-file open-handle tracking shared across reader threads: each
/// find-or-open is exclusive so a file is opened exactly once even under
/// concurrent readers, and closed once its last outstanding block has been
/// read (§5 Shared-resource policy).
#[derive(Default)]
pub struct OpenFileTracker {
    remaining_blocks: Mutex<HashMap<PathBuf, u32>>,
}

impl OpenFileTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers that `path` has `block_count` blocks still to be read.
    pub fn register(&self, path: PathBuf, block_count: u32) {
        self.remaining_blocks.lock().unwrap().insert(path, block_count);
    }

    /// Marks one block of `path` as read; returns `true` if this was the
    /// last outstanding block (the caller should now close its handle).
    pub fn block_read(&self, path: &PathBuf) -> bool {
        let mut map = self.remaining_blocks.lock().unwrap();
        match map.get_mut(path) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                if *remaining == 0 {
                    map.remove(path);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }
}

/// Per-source-file in-order consumption state for deferred per-block
/// hashing (§9 Design Notes): a buffer arriving out of order is held in
/// `pending` (keeping its pool slot pinned) until the gap closes.
#[derive(Default)]
pub struct InOrderGate {
    state: RwLock<HashMap<u64, GateState>>,
}

#[derive(Default)]
struct GateState {
    next_expected_index: u32,
    pending: HashMap<u32, usize>, // block index -> pool slot index
}

impl InOrderGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a finished buffer (pool slot `slot`) for `file_key` at
    /// `block_index`. Returns the list of pool slot indices (this one and
    /// any previously pending ones) that are now consumable in order.
    pub fn offer(&self, file_key: u64, block_index: u32, slot: usize) -> Vec<usize> {
        let mut state = self.state.write().unwrap();
        let entry = state.entry(file_key).or_default();

        if block_index != entry.next_expected_index {
            entry.pending.insert(block_index, slot);
            return Vec::new();
        }

        let mut ready = vec![slot];
        entry.next_expected_index += 1;
        while let Some(next_slot) = entry.pending.remove(&entry.next_expected_index) {
            ready.push(next_slot);
            entry.next_expected_index += 1;
        }
        ready
    }
}

/// Runs `process_one` over every item in `work` using up to `pool.capacity()`
/// concurrent buffers, honoring `cancel` between items. This is the
/// Process-stage half of the pipeline (§4.11): the Read stage is expected
/// to have already populated each work item's buffer before handing it in.
pub fn run_process_stage<T, F>(work: Vec<T>, cancel: &CancellationFlag, process_one: F)
where
    T: Send,
    F: Fn(T) + Sync,
{
    use rayon::prelude::*;

    work.into_par_iter().for_each(|item| {
        if !cancel.is_ok() {
            return;
        }
        process_one(item);
    });
}
