use log::*;

use crate::{
    db_types::MinorUnits,
    traits::{GatewayStatus, GatewayVerification},
};

pub fn prepare_test_env() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
}

/// A gateway verification reporting a successful payment of `amount` GHS.
pub fn successful_verification(amount: i64) -> GatewayVerification {
    GatewayVerification::new(GatewayStatus::Success).with_amount(MinorUnits::from(amount), "GHS")
}
