mod admin;

pub use admin::{bearer_token, AdminGuardFactory, AdminGuardService};
