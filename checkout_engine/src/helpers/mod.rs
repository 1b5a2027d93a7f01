mod reference;

pub use reference::{os_entropy, GenerationError, ReferenceGenerator, DEFAULT_REFERENCE_PREFIX};
