//! Configuration for verification operations

/// `-t+`/`-t0`/`-t-`: how aggressively scanning and repair application may
/// run concurrently (§6). `Full` and `ScanSerialApplyParallel` both end up
/// running the parallel code paths here since this crate doesn't split
/// "checksum" and "process" into independently-schedulable stages the way
/// the original's TBB pipeline does; `Serial` is the one mode that actually
/// changes behavior, forcing everything onto one thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyMode {
    /// `-t+`: use multiple cores throughout.
    Full,
    /// `-t0`: checksum serially, process concurrently.
    ScanSerialApplyParallel,
    /// `-t-`: single core throughout.
    Serial,
}

impl ConcurrencyMode {
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "+" => Some(Self::Full),
            "0" => Some(Self::ScanSerialApplyParallel),
            "-" => Some(Self::Serial),
            _ => None,
        }
    }
}

/// Configuration for file verification and repair operations
#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// Number of threads for computation (0 = auto-detect)
    pub threads: usize,
    /// Whether to use parallel verification (false = single-threaded everything)
    pub parallel: bool,
    /// `-t+`/`-t0`/`-t-` as given on the command line.
    pub concurrency_mode: ConcurrencyMode,
    /// `-m<n>`: cap, in bytes, on how much missing-slice data a repair pass
    /// reconstructs at once (§4.10). `None` means unbounded.
    pub memory_limit_bytes: Option<u64>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            threads: 0, // Auto-detect CPU cores
            parallel: true,
            concurrency_mode: ConcurrencyMode::Full,
            memory_limit_bytes: None,
        }
    }
}

impl VerificationConfig {
    pub fn new(threads: usize, parallel: bool) -> Self {
        Self {
            threads,
            parallel,
            ..Self::default()
        }
    }

    pub fn from_args(matches: &clap::ArgMatches) -> Self {
        let threads = matches
            .get_one::<String>("threads")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        let concurrency_mode = matches
            .get_one::<String>("concurrency_mode")
            .and_then(|s| ConcurrencyMode::from_flag(s))
            .unwrap_or(ConcurrencyMode::Full);
        let parallel = !matches.get_flag("no-parallel") && concurrency_mode != ConcurrencyMode::Serial;

        let memory_limit_bytes = matches
            .get_one::<String>("memory_limit")
            .and_then(|s| s.parse::<u64>().ok())
            .map(|mib| mib * 1024 * 1024);

        Self {
            threads,
            parallel,
            concurrency_mode,
            memory_limit_bytes,
        }
    }

    /// Get effective thread count (auto-detect if 0)
    pub fn effective_threads(&self) -> usize {
        match (self.parallel, self.threads) {
            (false, _) => 1, // Sequential mode always uses single thread
            (true, 0) => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4), // Auto-detect CPU cores
            (true, n) => n,  // Use specified thread count
        }
    }
}
