//! config/card_layout.rs
//! Posiciones de los campos en la carteirinha (86mm x 54mm) y la lógica
//! de validación / ajuste automático de coordenadas.
//!
//! Coordenadas en puntos (1 pt = 1/72 pulgada), origen arriba a la izquierda.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Margen de seguridad usado al ajustar coordenadas fuera de la página.
pub const DEFAULT_MARGIN: f64 = 20.0;

/// 86mm x 54mm en puntos
pub const CARD_WIDTH_PT: f64 = 243.78;
pub const CARD_HEIGHT_PT: f64 = 153.07;
pub const CARD_WIDTH_MM: f64 = 86.0;
pub const CARD_HEIGHT_MM: f64 = 54.0;

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("Invalid card layout configuration: {0}")]
    InvalidConfiguration(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// Campo de texto: solo se valida el punto de anclaje.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextField {
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub max_width: f64,
}

/// Foto 3x4: se valida el rectángulo completo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PhotoField {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CardFields {
    pub name: TextField,
    pub birth_date: TextField,
    pub team: TextField,
    pub validity_year: TextField,
    pub city: TextField,
    pub registration_number: TextField,
    pub photo: PhotoField,
}

impl CardFields {
    /// Los seis campos de texto con su nombre público (el mismo del JSON).
    pub fn text_fields(&self) -> [(&'static str, &TextField); 6] {
        [
            ("name", &self.name),
            ("birthDate", &self.birth_date),
            ("team", &self.team),
            ("validityYear", &self.validity_year),
            ("city", &self.city),
            ("registrationNumber", &self.registration_number),
        ]
    }

    fn map_text_fields(&self, f: impl Fn(&TextField) -> TextField) -> CardFields {
        CardFields {
            name: f(&self.name),
            birth_date: f(&self.birth_date),
            team: f(&self.team),
            validity_year: f(&self.validity_year),
            city: f(&self.city),
            registration_number: f(&self.registration_number),
            photo: self.photo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayoutConfiguration {
    pub fields: CardFields,
    pub page_size: PageSize,
}

const fn text(x: f64, y: f64, max_width: f64) -> TextField {
    TextField {
        x,
        y,
        font_size: 8.0,
        max_width,
    }
}

/// Configuración base de la carteirinha.
pub const BASE_LAYOUT: LayoutConfiguration = LayoutConfiguration {
    fields: CardFields {
        name: text(15.0, 80.0, 120.0),
        birth_date: text(20.0, 45.0, 100.0),
        team: text(15.0, 15.0, 120.0),
        validity_year: text(122.0, 15.0, 100.0),
        city: text(110.0, 45.0, 100.0),
        registration_number: text(160.0, 15.0, 100.0),
        photo: PhotoField {
            x: 176.0,
            y: 67.5,
            width: 53.0,
            height: 70.0,
        },
    },
    page_size: PageSize {
        width: CARD_WIDTH_PT,
        height: CARD_HEIGHT_PT,
    },
};

impl Default for LayoutConfiguration {
    fn default() -> Self {
        BASE_LAYOUT
    }
}

impl LayoutConfiguration {
    /// Parsea un layout desde JSON. Rechaza claves desconocidas, campos
    /// faltantes y números no finitos.
    pub fn from_json(raw: &str) -> Result<Self, LayoutError> {
        let config: LayoutConfiguration = serde_json::from_str(raw)
            .map_err(|e| LayoutError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let page = self.page_size;
        if !(page.width.is_finite() && page.height.is_finite()) {
            return Err(invalid("pageSize has non-finite dimensions"));
        }
        if page.width <= 0.0 || page.height <= 0.0 {
            return Err(invalid("pageSize must be positive"));
        }

        for (key, field) in self.fields.text_fields() {
            let values = [field.x, field.y, field.font_size, field.max_width];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(invalid(&format!("field '{}' has a non-finite value", key)));
            }
            if field.font_size <= 0.0 || field.max_width < 0.0 {
                return Err(invalid(&format!("field '{}' has an invalid size", key)));
            }
        }

        let photo = self.fields.photo;
        if [photo.x, photo.y, photo.width, photo.height]
            .iter()
            .any(|v| !v.is_finite())
        {
            return Err(invalid("field 'photo' has a non-finite value"));
        }
        if photo.width < 0.0 || photo.height < 0.0 {
            return Err(invalid("field 'photo' has a negative size"));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> LayoutError {
    LayoutError::InvalidConfiguration(msg.to_string())
}

fn point_in_page(x: f64, y: f64, page: &PageSize) -> bool {
    x >= 0.0 && x <= page.width && y >= 0.0 && y <= page.height
}

/// `true` si todos los anclajes (y la esquina opuesta de la foto) caen dentro de la página.
pub fn is_within_bounds(config: &LayoutConfiguration) -> bool {
    let page = &config.page_size;
    let photo = &config.fields.photo;

    config
        .fields
        .text_fields()
        .iter()
        .all(|(_, f)| point_in_page(f.x, f.y, page))
        && point_in_page(photo.x, photo.y, page)
        && point_in_page(photo.x + photo.width, photo.y + photo.height, page)
}

/// max(lower, min(value, upper)). Con intervalo invertido gana `lower`.
/// No usar `f64::clamp`: entra en pánico si lower > upper.
fn clamp_favor_lower(value: f64, lower: f64, upper: f64) -> f64 {
    value.min(upper).max(lower)
}

/// Devuelve una configuración nueva con cada campo dentro de la página menos `margin`.
pub fn adjust(config: &LayoutConfiguration, margin: f64) -> LayoutConfiguration {
    let page = config.page_size;
    let mut fields = config.fields.map_text_fields(|f| TextField {
        x: clamp_favor_lower(f.x, margin, page.width - margin),
        y: clamp_favor_lower(f.y, margin, page.height - margin),
        ..*f
    });

    let photo = config.fields.photo;
    fields.photo = PhotoField {
        x: clamp_favor_lower(photo.x, margin, page.width - photo.width - margin),
        y: clamp_favor_lower(photo.y, margin, page.height - photo.height - margin),
        ..photo
    };

    LayoutConfiguration {
        fields,
        page_size: page,
    }
}

/// Layout efectivo a partir de la configuración base.
pub fn effective_configuration() -> LayoutConfiguration {
    effective_configuration_for(&BASE_LAYOUT)
}

/// Valida `base` y, si algún campo se sale de la página, la ajusta con el margen por defecto.
pub fn effective_configuration_for(base: &LayoutConfiguration) -> LayoutConfiguration {
    if is_within_bounds(base) {
        return *base;
    }

    log::warn!(
        "Coordenadas de la carteirinha fuera de los límites ({}x{} pt), ajustando con margen {}",
        base.page_size.width,
        base.page_size.height,
        DEFAULT_MARGIN
    );
    adjust(base, DEFAULT_MARGIN)
}
