//! Domain logic for the siaga emergency-response service: duty-roster
//! resolution, shift generation planning, the panic-alert state machine,
//! and the request/response types shared across crates.

pub mod alerts;
pub mod errors;
pub mod models;
pub mod roster;
