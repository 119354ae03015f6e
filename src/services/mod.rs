//! Business logic services.

pub mod collection;
pub mod export;
pub mod fingerprint;
pub mod loader;
pub mod serializer;
pub mod templates;
pub mod validator;
