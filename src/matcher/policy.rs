/// Effort limits for one match search, derived from the compression level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchPolicy {
    /// Maximum chain links followed per position
    pub max_chain_depth: usize,
    /// Maximum candidates fully compared per position
    pub max_candidates: usize,
    /// Stop searching once a match this long is found
    pub nice_length: usize,
    /// One-step lazy lookahead before committing to a match
    pub lazy: bool,
}

impl SearchPolicy {
    const fn new(max_chain_depth: usize, max_candidates: usize, nice_length: usize, lazy: bool) -> Self {
        Self { max_chain_depth, max_candidates, nice_length, lazy }
    }

    /// Policy for level 1-9; out-of-range levels clamp to the nearest end
    pub fn for_level(level: u32) -> Self {
        match level {
            0 | 1 => Self::new(4, 2, 16, false),
            2 => Self::new(8, 4, 32, false),
            3 => Self::new(16, 8, 64, false),
            4 => Self::new(32, 16, 64, true),
            5 => Self::new(64, 32, 128, true),
            6 => Self::new(128, 64, 128, true),
            7 => Self::new(256, 128, 256, true),
            8 => Self::new(1024, 512, 1024, true),
            _ => Self::new(4096, 2048, 65536, true),
        }
    }
}
