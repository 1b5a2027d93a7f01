//! FlavourHub Checkout Engine
//!
//! The checkout engine reconciles storefront checkouts with card payments taken by a remote payment gateway, and keeps
//! the ledger of paid orders. It is provider-agnostic: the gateway, the ledger and the menu store are all described by
//! traits in [`mod@traits`] and handed to the public APIs at construction time.
//!
//! The library is divided into three main sections:
//! 1. Storage ([`mod@db`]). In-memory implementations of the ledger and menu store. The data types kept in storage are
//!    defined in [`mod@db_types`] and are public.
//! 2. The public API ([`mod@checkout_api`]). [`CheckoutFlowApi`] initializes and verifies payments and records orders;
//!    [`MenuApi`] validates and stores the menu.
//! 3. Helpers ([`mod@helpers`]), most importantly the [`helpers::ReferenceGenerator`] that issues payment references.
//!
//! The one rule the engine enforces above all others: an order only enters the ledger as
//! [`db_types::PaymentTrust::GatewayVerified`] after the gateway itself reports the payment as successful, and at most
//! one order is ever recorded per payment reference.
pub mod db;

pub mod checkout_api;
pub mod db_types;
pub mod helpers;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use checkout_api::{
    checkout_flow_api::CheckoutFlowApi,
    checkout_objects,
    errors::{CheckoutError, MenuError},
    menu_api::{MenuApi, MenuPayload},
};
pub use db::memory::{MemoryLedger, MemoryMenuStore};
