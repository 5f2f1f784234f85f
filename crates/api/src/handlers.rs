/// Panic alert lifecycle handlers
pub mod alerts;
/// Generation automation handlers
pub mod automation;
/// Weekly pattern management handlers
pub mod patterns;
/// Shift and roster handlers
pub mod shifts;
