/// Panic alert endpoints
pub mod alerts;
/// Generation automation endpoints
pub mod automation;
/// Health check endpoints
pub mod health;
/// Weekly pattern management endpoints
pub mod patterns;
/// Shift and roster endpoints
pub mod shifts;
