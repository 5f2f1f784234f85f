/// Error mapping from domain errors to HTTP responses
pub mod error_handling;
/// Gateway-authenticated principal extraction
pub mod identity;
