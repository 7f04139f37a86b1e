//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod athlete_model;
pub mod auth_model;
pub mod card_model;
pub mod operation_model;
