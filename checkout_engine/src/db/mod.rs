//! # Storage backends
//!
//! Only in-process storage is provided. Everything lives for as long as the server process does, which is all the
//! storefront needs. A persistent backend only has to implement [`crate::traits::OrderLedger`] and
//! [`crate::traits::MenuStore`].
pub mod memory;
