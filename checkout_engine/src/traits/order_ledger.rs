use thiserror::Error;

use crate::db_types::{Order, OrderId, PaymentReference};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("An order with id {0} already exists")]
    DuplicateOrderId(OrderId),
    #[error("An order for payment reference {0} already exists")]
    DuplicateReference(PaymentReference),
    #[error("Ledger backend error: {0}")]
    Backend(String),
}

/// The ledger of paid orders.
///
/// Entries are immutable and there is no update or delete. Implementations must serialize mutations internally so
/// that concurrent callers can never corrupt the sequence, lose an entry, or record two orders for one reference.
#[allow(async_fn_in_trait)]
pub trait OrderLedger: Clone {
    /// Appends `order`. The caller supplies a unique id. Fails if the id, or the order's reference, is already in
    /// the ledger.
    async fn append(&self, order: Order) -> Result<Order, LedgerError>;

    /// Appends `order` unless an order with the same reference already exists, as a single atomic step.
    ///
    /// Returns the order that is in the ledger afterwards, and `true` if it was inserted by this call. Orders without
    /// a reference are always appended.
    async fn insert_if_absent(&self, order: Order) -> Result<(Order, bool), LedgerError>;

    /// All orders, in insertion order.
    async fn list(&self) -> Result<Vec<Order>, LedgerError>;

    async fn find_by_reference(&self, reference: &PaymentReference) -> Result<Option<Order>, LedgerError>;

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, LedgerError>;

    async fn count(&self) -> Result<usize, LedgerError>;
}
