//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod access_control;
pub mod athlete_service;
pub mod card_service;
pub mod operation_service;
pub mod pdf_service;
pub mod storage_service;
