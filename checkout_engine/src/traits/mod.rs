//! # Backend contracts
//!
//! The checkout engine does not care where orders are kept, where the menu lives, or which payment provider is on
//! the other end of the wire. Those collaborators are described by the traits in this module and injected into the
//! APIs in [`crate::checkout_api`].
//!
//! * [`OrderLedger`] is the append-only store of paid orders.
//! * [`MenuStore`] holds the single menu document shown by the storefront.
//! * [`PaymentGateway`] initializes and verifies card transactions with a remote provider.
mod menu_store;
mod order_ledger;
mod payment_gateway;

pub use menu_store::{MenuStore, MenuStoreError};
pub use order_ledger::{LedgerError, OrderLedger};
pub use payment_gateway::{
    GatewayError,
    GatewayStatus,
    GatewayVerification,
    InitializeTransaction,
    InitializedTransaction,
    PaymentGateway,
};
