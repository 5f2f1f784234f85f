pub mod alert;
pub mod roster;
pub mod user;
