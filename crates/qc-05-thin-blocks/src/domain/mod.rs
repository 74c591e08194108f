//! # Domain Layer for Thin Block Relay
//!
//! Pure logic with no I/O. Everything here is synchronous and can be unit
//! tested without a manager or a peer.
//!
//! ## Contents
//!
//! - **thin_tx**: Cross-encoding transaction identifier (`ThinTx`, `TxEquality`)
//! - **services**: Identifier derivation (`cheap_hash`, `short_id`, `short_id_salts`)
//! - **entities**: `PeerId`, `WorkerId`, `ThinBlockMode`, `ReconstructedBlock`
//! - **value_objects**: `ThinBlockConfig`
//! - **errors**: `ThinTxError`, `ThinBlockError`

mod entities;
mod errors;
mod services;
mod thin_tx;
mod value_objects;

pub use entities::*;
pub use errors::*;
pub use services::*;
pub use thin_tx::*;
pub use value_objects::*;
