use super::policy::SearchPolicy;
use crate::sequence::{Token, MIN_MATCH};
use crate::simd::Dispatcher;

/// Hash table size (log2) for blocks of 64 KiB and up
pub const HASH_LOG: u32 = 16;

/// Smallest hash table (log2), used for tiny blocks
const MIN_HASH_LOG: u32 = 8;

/// Chain terminator
const NIL: u32 = u32::MAX;

/// A back-reference candidate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub offset: u32,
    pub length: u32,
}

/// Counters from one parse, for trace logging
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub matches: u64,
    pub matched_bytes: u64,
    pub literals: u64,
    pub lazy_deferrals: u64,
}

/// Hash-chain match finder for a single block.
///
/// `head[hash]` holds the most recent position with that hash and
/// `prev[pos]` the previous one, so a chain is walked from the smallest
/// offset outward. Both are plain `u32` position arenas sized for the block;
/// nothing survives the block.
pub struct MatchFinder {
    policy: SearchPolicy,
    dispatcher: Dispatcher,
    hash_log: u32,
    head: Vec<u32>,
    prev: Vec<u32>,
    stats: MatchStats,
}

impl MatchFinder {
    pub fn new(policy: SearchPolicy, dispatcher: Dispatcher) -> Self {
        Self {
            policy,
            dispatcher,
            hash_log: MIN_HASH_LOG,
            head: Vec::new(),
            prev: Vec::new(),
            stats: MatchStats::default(),
        }
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    /// Size the index for a block of `len` bytes and clear it
    fn reset(&mut self, len: usize) {
        self.hash_log = (usize::BITS - len.leading_zeros()).clamp(MIN_HASH_LOG, HASH_LOG);
        self.head.clear();
        self.head.resize(1 << self.hash_log, NIL);
        self.prev.clear();
        self.prev.resize(len, NIL);
        self.stats = MatchStats::default();
    }

    /// Insert position `pos` into the hash chain
    #[inline]
    fn insert(&mut self, block: &[u8], pos: usize) {
        if pos + MIN_MATCH > block.len() {
            return;
        }
        let h = self.dispatcher.hash4(&block[pos..], self.hash_log) as usize;
        self.prev[pos] = self.head[h];
        self.head[h] = pos as u32;
    }

    /// Best match for `pos` among already-inserted positions.
    ///
    /// Longest wins; on equal length the first found (smallest offset) is kept.
    fn find(&self, block: &[u8], pos: usize) -> Option<Match> {
        if pos + MIN_MATCH > block.len() {
            return None;
        }

        let max_len = block.len() - pos;
        let nice = self.policy.nice_length.min(max_len);
        let h = self.dispatcher.hash4(&block[pos..], self.hash_log) as usize;

        let mut candidate = self.head[h];
        let mut best_len = MIN_MATCH - 1;
        let mut best_offset = 0usize;
        let mut depth = 0;
        let mut compared = 0;

        while candidate != NIL
            && depth < self.policy.max_chain_depth
            && compared < self.policy.max_candidates
        {
            depth += 1;
            let cand = candidate as usize;

            // Cheap reject: a longer match must agree at the current best length
            if block[cand + best_len] == block[pos + best_len] {
                compared += 1;
                let len = self.dispatcher.match_len(&block[cand..], &block[pos..], max_len);
                if len > best_len {
                    best_len = len;
                    best_offset = pos - cand;
                    if len >= nice {
                        break;
                    }
                }
            }

            candidate = self.prev[cand];
        }

        (best_len >= MIN_MATCH).then(|| Match { offset: best_offset as u32, length: best_len as u32 })
    }

    /// Parse `block` into tokens covering it exactly
    pub fn find_tokens(&mut self, block: &[u8]) -> Vec<Token> {
        let n = block.len();
        self.reset(n);

        let mut tokens = Vec::new();
        let mut literal_start = 0;
        let mut pos = 0;
        let mut pending: Option<Match> = None;

        while pos + MIN_MATCH <= n {
            let found = match pending.take() {
                Some(m) => Some(m),
                None => {
                    let m = self.find(block, pos);
                    self.insert(block, pos);
                    m
                }
            };

            let Some(m) = found else {
                pos += 1;
                continue;
            };

            // Positions up to `inserted` are already in the chains
            let mut inserted = pos;
            if self.policy.lazy && (m.length as usize) < self.policy.nice_length {
                let next = self.find(block, pos + 1);
                self.insert(block, pos + 1);
                inserted = pos + 1;

                if let Some(next) = next.filter(|next| next.length > m.length) {
                    self.stats.lazy_deferrals += 1;
                    pending = Some(next);
                    pos += 1;
                    continue;
                }
            }

            if pos > literal_start {
                tokens.push(Token::Literals { len: (pos - literal_start) as u32 });
            }
            tokens.push(Token::Match { offset: m.offset, length: m.length });
            self.stats.matches += 1;
            self.stats.matched_bytes += m.length as u64;

            let end = pos + m.length as usize;
            for p in inserted + 1..end {
                self.insert(block, p);
            }
            pos = end;
            literal_start = end;
        }

        if literal_start < n {
            tokens.push(Token::Literals { len: (n - literal_start) as u32 });
        }
        self.stats.literals = (n as u64) - self.stats.matched_bytes;

        log::trace!(
            "matcher: {} bytes, {} matches covering {} bytes, {} literals, {} lazy deferrals",
            n,
            self.stats.matches,
            self.stats.matched_bytes,
            self.stats.literals,
            self.stats.lazy_deferrals
        );

        tokens
    }
}
