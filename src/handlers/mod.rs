//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers (carteirinhas, atletas, operaciones).

pub mod access_handler;
pub mod athlete_handler;
pub mod auth;
pub mod card_handler;
pub mod operation_handler;
