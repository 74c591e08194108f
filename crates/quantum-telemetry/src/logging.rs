//! Structured logging helpers.
//!
//! Every event carries a consistent set of fields so logs from different
//! subsystems can be filtered the same way:
//! - `subsystem`: Subsystem identifier (thin-blocks, mempool, etc.)
//! - `block_hash`: Hex block hash for block-scoped events
//! - `peer_id`: Peer identifier for peer-scoped events
//! - Additional context fields

/// Helper to create structured log entries with consistent formatting.
#[macro_export]
macro_rules! log_event {
    ($level:ident, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        ::tracing::$level!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a block-related event with standard fields.
///
/// `$block_hash` must implement `Display`.
#[macro_export]
macro_rules! log_block_event {
    ($level:ident, $subsystem:expr, $msg:expr, $block_hash:expr $(, $($field:tt)*)?) => {
        ::tracing::$level!(
            subsystem = $subsystem,
            block_hash = %$block_hash,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a peer-related event with standard fields.
///
/// `$peer_id` must implement `Display`.
#[macro_export]
macro_rules! log_peer_event {
    ($level:ident, $subsystem:expr, $msg:expr, $peer_id:expr $(, $($field:tt)*)?) => {
        ::tracing::$level!(
            subsystem = $subsystem,
            peer_id = %$peer_id,
            $($($field)*,)?
            $msg
        )
    };
}
