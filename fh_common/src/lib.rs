mod helpers;
mod minor_units;
mod secret;

pub use helpers::parse_boolean_flag;
pub use minor_units::{is_currency_code, MinorUnits, MinorUnitsConversionError, DEFAULT_CURRENCY};
pub use secret::Secret;
