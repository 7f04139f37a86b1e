//! services/card_service.rs
//! Generación de carteirinhas: prepara los textos del atleta, arma el HTML con
//! el layout efectivo y lo convierte a PDF con wkhtmltopdf.

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use std::{fmt::Write as _, fs, path::PathBuf};

use crate::{
    config::card_layout::{
        self, LayoutConfiguration, TextField, CARD_HEIGHT_MM, CARD_WIDTH_MM,
    },
    models::{
        athlete_model::{Athlete, Team},
        auth_model::AuthUser,
        card_model::{BatchCardResponse, CardData, GeneratedCard, PhotoFormat, StoredCard},
        operation_model::{NewOperation, OP_GENERATE_CARD},
    },
    services::{
        athlete_service::{clean_cpf, AthleteService},
        operation_service::OperationService,
        pdf_service::{PageSpec, PdfService},
        storage_service::{detect_image_format, StorageService},
    },
};

const NO_TEAM: &str = "SEM EQUIPE";
const MAX_SLUG_CHARS: usize = 50;

pub const CARD_PAGE: PageSpec = PageSpec {
    width_mm: CARD_WIDTH_MM,
    height_mm: CARD_HEIGHT_MM,
};

// --------------------------------------------------------------------------------
// Preparación de datos
// --------------------------------------------------------------------------------

/// Matrícula propia del atleta o, si no tiene, 5 primeros dígitos del CPF + año.
pub fn registration_number(athlete: &Athlete, year: i32) -> String {
    if let Some(own) = athlete.registration_number.as_deref().filter(|m| !m.is_empty()) {
        return own.to_string();
    }
    let digits = clean_cpf(&athlete.cpf);
    if digits.is_empty() {
        return String::new();
    }
    format!("{}{}", digits.chars().take(5).collect::<String>(), year)
}

/// dd/mm/aaaa
pub fn format_birth_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Nombre apto para archivo: minúsculas, sin acentos ni símbolos, espacios -> '_'.
pub fn file_slug(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .map(fold_accent)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .take(MAX_SLUG_CHARS)
        .collect()
}

pub fn card_file_name(athlete_name: &str, millis: i64) -> String {
    format!("carteirinha_{}_{}.pdf", file_slug(athlete_name), millis)
}

/// Nombre del PDF guardado en lote; el id evita choques entre homónimos.
pub fn stored_card_name(athlete_id: &str, file_name: &str) -> String {
    format!("{}_{}", athlete_id, file_name)
}

/// PNG si empieza con 0x89 0x50, cualquier otra cosa se trata como JPEG.
pub fn photo_format(bytes: &[u8]) -> PhotoFormat {
    match bytes {
        [0x89, 0x50, ..] => PhotoFormat::Png,
        _ => PhotoFormat::Jpeg,
    }
}

pub fn build_card_data(athlete: &Athlete, team: Option<&Team>, year: i32) -> CardData {
    CardData {
        name: athlete.name.clone(),
        birth_date: format_birth_date(athlete.birth_date),
        team: team
            .map(|t| t.name.clone())
            .unwrap_or_else(|| NO_TEAM.to_string()),
        validity_year: year.to_string(),
        city: team.and_then(|t| t.city.clone()).unwrap_or_default(),
        registration_number: registration_number(athlete, year),
    }
}

// --------------------------------------------------------------------------------
// HTML
// --------------------------------------------------------------------------------

/// Imagen embebida como data URI
pub struct EmbeddedImage {
    pub format: PhotoFormat,
    pub bytes: Vec<u8>,
}

impl EmbeddedImage {
    fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            base64::encode(&self.bytes)
        )
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn write_text_field(html: &mut String, field: &TextField, value: &str, bold: bool) {
    let _ = writeln!(
        html,
        r#"<div class="field" style="left:{}pt;top:{}pt;font-size:{}pt;max-width:{}pt;font-weight:{}">{}</div>"#,
        field.x,
        field.y,
        field.font_size,
        field.max_width,
        if bold { "bold" } else { "normal" },
        escape_html(value)
    );
}

/// HTML de una carteirinha. Texto en blanco sobre el fondo oscuro del modelo.
pub fn render_card_html(
    layout: &LayoutConfiguration,
    data: &CardData,
    background: Option<&EmbeddedImage>,
    photo: Option<&EmbeddedImage>,
) -> String {
    let page = layout.page_size;
    let fields = &layout.fields;
    let mut html = String::new();

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
html, body {{ margin: 0; padding: 0; }}
.card {{ position: relative; width: {w}pt; height: {h}pt; overflow: hidden;
        font-family: Helvetica, Arial, sans-serif; color: #ffffff; }}
.background {{ position: absolute; left: 0; top: 0; width: {w}pt; height: {h}pt; }}
.field {{ position: absolute; white-space: nowrap; overflow: hidden; }}
.photo {{ position: absolute; }}
</style>
</head>
<body>
<div class="card">
"#,
        w = page.width,
        h = page.height
    );

    if let Some(bg) = background {
        let _ = writeln!(html, r#"<img class="background" src="{}">"#, bg.data_uri());
    }

    write_text_field(&mut html, &fields.name, &data.name, true);
    write_text_field(&mut html, &fields.birth_date, &data.birth_date, false);
    write_text_field(&mut html, &fields.team, &data.team, false);
    write_text_field(&mut html, &fields.validity_year, &data.validity_year, false);
    write_text_field(&mut html, &fields.city, &data.city, false);
    write_text_field(
        &mut html,
        &fields.registration_number,
        &data.registration_number,
        false,
    );

    if let Some(photo) = photo {
        let p = fields.photo;
        let _ = writeln!(
            html,
            r#"<img class="photo" src="{}" style="left:{}pt;top:{}pt;width:{}pt;height:{}pt">"#,
            photo.data_uri(),
            p.x,
            p.y,
            p.width,
            p.height
        );
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

// --------------------------------------------------------------------------------
// Servicio
// --------------------------------------------------------------------------------

#[derive(Clone)]
pub struct CardService {
    pdf_service: PdfService,
    storage: StorageService,
    athletes: AthleteService,
    operations: OperationService,
    base_layout: LayoutConfiguration,
    /// Directorio donde se buscan los modelos locales de respaldo
    template_base_dir: PathBuf,
}

impl CardService {
    pub fn new(
        pdf_service: PdfService,
        storage: StorageService,
        athletes: AthleteService,
        operations: OperationService,
        base_layout: LayoutConfiguration,
        template_base_dir: PathBuf,
    ) -> Self {
        Self {
            pdf_service,
            storage,
            athletes,
            operations,
            base_layout,
            template_base_dir,
        }
    }

    /// Layout efectivo, recalculado en cada llamada.
    pub fn layout(&self) -> LayoutConfiguration {
        card_layout::effective_configuration_for(&self.base_layout)
    }

    /// Modelo de fondo vigente (el mismo que se usa al renderizar).
    pub fn template_path(&self) -> Option<PathBuf> {
        self.storage.resolve_template(&self.template_base_dir)
    }

    fn load_background(&self) -> Result<Option<EmbeddedImage>> {
        let Some(path) = self.template_path() else {
            return Ok(None);
        };
        let bytes = fs::read(&path).with_context(|| format!("No se pudo leer modelo {:?}", path))?;
        let format = detect_image_format(&bytes)
            .ok_or_else(|| anyhow!("Modelo {:?} no es PNG ni JPEG", path))?;
        log::info!("Usando modelo de carteirinha {:?}", path);
        Ok(Some(EmbeddedImage { format, bytes }))
    }

    fn load_photo(&self, athlete_id: &str) -> Option<EmbeddedImage> {
        match self.storage.load_photo(athlete_id) {
            Ok(bytes) => Some(EmbeddedImage {
                format: photo_format(&bytes),
                bytes,
            }),
            Err(e) => {
                // Se sigue sin foto
                log::warn!("No se pudo insertar foto 3x4 del atleta {}: {:#}", athlete_id, e);
                None
            }
        }
    }

    /// HTML completo de la carteirinha del atleta.
    pub async fn card_html(&self, athlete: &Athlete) -> Result<String> {
        let team = match &athlete.team_id {
            Some(team_id) => self
                .athletes
                .get_team(team_id)
                .await
                .context("Fallo al buscar equipe")?,
            None => None,
        };

        let data = build_card_data(athlete, team.as_ref(), Utc::now().year());
        log::debug!("Datos de carteirinha: {:?}", data);

        let background = self.load_background()?;
        let photo = self.load_photo(&athlete.id);

        Ok(render_card_html(
            &self.layout(),
            &data,
            background.as_ref(),
            photo.as_ref(),
        ))
    }

    /// Genera la carteirinha y deja registro en operations.
    pub async fn generate(&self, athlete: &Athlete, user: &AuthUser) -> Result<GeneratedCard> {
        log::info!("Generando carteirinha para atleta {} ({})", athlete.name, athlete.id);

        let op_id = self
            .operations
            .record_operation(NewOperation {
                operation_type: OP_GENERATE_CARD.to_string(),
                status: "running".to_string(),
                user_name: Some(user.display_name().to_string()),
                user_role: Some(user.role.as_str().to_string()),
                details: Some(serde_json::json!({ "athlete_id": athlete.id }).to_string()),
            })
            .await?;

        let result = async {
            let html = self.card_html(athlete).await?;
            self.pdf_service.render(&html, CARD_PAGE).await
        }
        .await;

        match result {
            Ok(pdf) => {
                self.operations.update_status(&op_id, "done", None).await?;
                Ok(GeneratedCard {
                    athlete_id: athlete.id.clone(),
                    file_name: card_file_name(&athlete.name, Utc::now().timestamp_millis()),
                    pdf,
                })
            }
            Err(e) => {
                let msg = format!("{:#}", e);
                if let Err(log_err) = self
                    .operations
                    .update_status(&op_id, "failed", Some(&msg))
                    .await
                {
                    log::error!("No se pudo marcar operación {} como fallida: {:?}", op_id, log_err);
                }
                Err(e.context(format!("Error al generar carteirinha de {}", athlete.name)))
            }
        }
    }

    /// Genera varias carteirinhas; los fallos se loguean y se sigue con las demás.
    pub async fn generate_batch(&self, athletes: &[Athlete], user: &AuthUser) -> BatchCardResponse {
        log::info!("Generando {} carteirinhas en lote...", athletes.len());

        let mut generated = vec![];
        let mut failed = vec![];

        for (i, athlete) in athletes.iter().enumerate() {
            log::info!("Carteirinha {}/{}: {}", i + 1, athletes.len(), athlete.name);
            let stored = match self.generate(athlete, user).await {
                Ok(card) => {
                    let name = stored_card_name(&card.athlete_id, &card.file_name);
                    self.storage.store_card(&name, &card.pdf).map(|_| StoredCard {
                        athlete_id: card.athlete_id,
                        file_name: name,
                    })
                }
                Err(e) => Err(e),
            };
            match stored {
                Ok(card) => generated.push(card),
                Err(e) => {
                    log::error!("Error en carteirinha {} ({}): {:?}", i + 1, athlete.id, e);
                    failed.push(athlete.id.clone());
                }
            }
        }

        log::info!("{} carteirinhas generadas con éxito", generated.len());
        BatchCardResponse {
            success: failed.is_empty(),
            generated,
            failed,
        }
    }
}
