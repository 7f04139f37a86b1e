//! config/mod.rs
//! Configuración del servicio y layout de la carteirinha.

pub mod app_config;
pub mod card_layout;
