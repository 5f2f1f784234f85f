pub mod alerts;
pub mod patterns;
pub mod roster;
pub mod settings;
pub mod shifts;
pub mod users;
