/// Record mode byte: raw bytes follow
pub const MODE_STORED: u8 = 0;

/// Record mode byte: entropy-coded payload follows
pub const MODE_COMPRESSED: u8 = 1;

/// Stored record header: mode (1) + raw length (4)
pub const STORED_OVERHEAD: usize = 5;

/// Compressed record header: mode (1) + raw length (4) + payload length (4)
pub const COMPRESSED_OVERHEAD: usize = 9;
