//! Outbound ports (SPI) for the thin block relay.

use shared_types::{BlockHeader, Transaction};

use crate::domain::{PeerId, ThinTx};
use crate::events::OutboundMessage;

/// A parsed thin block stub, whatever its wire encoding.
pub trait StubData {
    /// Header of the announced block.
    fn header(&self) -> &BlockHeader;

    /// Identifiers of every transaction in the block, in block order.
    fn all_transactions(&self) -> Vec<ThinTx>;

    /// Transactions the sender included in full, if any.
    fn missing_provided(&self) -> Vec<Transaction>;
}

/// Lookup of locally known transactions (typically the mempool).
///
/// Absence is `None`, never an error: the transaction is simply downloaded.
pub trait TxFinder {
    fn find(&self, id: &ThinTx) -> Option<Transaction>;
}

impl<F> TxFinder for F
where
    F: Fn(&ThinTx) -> Option<Transaction>,
{
    fn find(&self, id: &ThinTx) -> Option<Transaction> {
        self(id)
    }
}

/// Connection to a single peer.
pub trait PeerConnection {
    fn peer_id(&self) -> PeerId;

    /// Queue a message for the peer. Delivery is the transport's problem.
    fn send(&mut self, message: OutboundMessage);
}
