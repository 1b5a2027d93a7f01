//! # FlavourHub payment server
//! This crate hosts the HTTP backend for the FlavourHub storefront. It is responsible for:
//! * Starting Paystack checkouts on behalf of the storefront, which never sees the Paystack secret key.
//! * Verifying payments with Paystack and recording each paid order exactly once.
//! * Serving the menu, and letting the admin replace it.
//! * Issuing and checking admin session tokens.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! Every route is served under `/api` and, for older storefront builds, at the root as well.
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /payments/initialize` (or `/paystack/initialize`): start a checkout.
//! * `GET /payments/verify/{reference}` (or `/paystack/verify/{reference}`): verify a payment and record the order.
//! * `POST /orders`: submit an order with its payment reference.
//! * `GET /orders/admin`: all recorded orders. Admin only.
//! * `POST /admin/login`: exchange the admin password for a session token.
//! * `GET /menu`, `PUT /admin/menu`: read and replace the menu.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
