pub mod verification_handlers;

pub use verification_handlers::*;
