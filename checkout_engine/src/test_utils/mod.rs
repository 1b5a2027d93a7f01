mod fake_gateway;
mod prepare_env;

pub use fake_gateway::FakeGateway;
pub use prepare_env::{prepare_test_env, successful_verification};
