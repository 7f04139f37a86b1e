//! services/storage_service.rs
//! Almacenamiento local de documentos de atletas, modelo de carteirinha y
//! carteirinhas generadas en lote.
//!
//! Estructura bajo `STORAGE_DIR`:
//!   atletas/<id>/foto_3x4_<ts>.<ext>
//!   atletas/<id>/comprovante_residencia_<ts>.<ext>
//!   modelos/carteirinha_modelo.<png|jpg>
//!   carteirinhas/<archivo>.pdf

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::models::card_model::{CardCheckResponse, DocumentInfo, PhotoFormat};

/// Límite de upload (documentos y modelo)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const TEMPLATE_STEM: &str = "carteirinha_modelo";

/// Modelos locales que se prueban si no hay uno subido.
const LOCAL_TEMPLATE_CANDIDATES: &[&str] = &[
    "modelo-carteirinha.png",
    "modelo-carteirinha.jpg",
    "carteirinha_modelo.png",
    "carteirinha_modelo.jpg",
    "public/modelos/carteirinha_modelo.png",
    "public/modelos/carteirinha_modelo.jpg",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Photo3x4,
    ProofOfResidence,
}

impl DocumentKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "foto_3x4" => Some(DocumentKind::Photo3x4),
            "comprovante_residencia" => Some(DocumentKind::ProofOfResidence),
            _ => None,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Photo3x4 => "foto_3x4_",
            DocumentKind::ProofOfResidence => "comprovante_residencia_",
        }
    }
}

/// Formato por magic bytes. Solo PNG y JPEG.
pub fn detect_image_format(bytes: &[u8]) -> Option<PhotoFormat> {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => Some(PhotoFormat::Png),
        [0xFF, 0xD8, 0xFF, ..] => Some(PhotoFormat::Jpeg),
        _ => None,
    }
}

fn extension_for(format: PhotoFormat) -> &'static str {
    match format {
        PhotoFormat::Png => "png",
        PhotoFormat::Jpeg => "jpg",
    }
}

/// Los ids de atleta se usan como nombre de carpeta.
fn safe_segment(id: &str) -> Result<&str> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(id)
    } else {
        Err(anyhow!("Identificador inválido: {:?}", id))
    }
}

#[derive(Clone, Debug)]
pub struct StorageService {
    root: Arc<PathBuf>,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for sub in ["atletas", "modelos", "carteirinhas"] {
            let dir = root.join(sub);
            fs::create_dir_all(&dir)
                .with_context(|| format!("No se pudo crear directorio {:?}", dir))?;
        }
        Ok(Self {
            root: Arc::new(root),
        })
    }

    fn athlete_dir(&self, athlete_id: &str) -> Result<PathBuf> {
        Ok(self.root.join("atletas").join(safe_segment(athlete_id)?))
    }

    /// Guarda un documento y devuelve el nombre final del archivo.
    pub fn save_document(&self, athlete_id: &str, kind: DocumentKind, bytes: &[u8]) -> Result<String> {
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(anyhow!("Documento excede {} bytes", MAX_UPLOAD_BYTES));
        }

        let dir = self.athlete_dir(athlete_id)?;
        fs::create_dir_all(&dir).with_context(|| format!("No se pudo crear {:?}", dir))?;

        let ext = match detect_image_format(bytes) {
            Some(format) => extension_for(format),
            None if bytes.starts_with(b"%PDF") => "pdf",
            None => "bin",
        };
        let file_name = format!(
            "{}{}.{}",
            kind.prefix(),
            Utc::now().timestamp_millis(),
            ext
        );

        let path = dir.join(&file_name);
        fs::write(&path, bytes).with_context(|| format!("No se pudo guardar {:?}", path))?;
        log::info!("Documento guardado en {:?} ({} bytes)", path, bytes.len());

        Ok(file_name)
    }

    /// Documentos del atleta ordenados por nombre. Sin carpeta -> lista vacía.
    pub fn list_documents(&self, athlete_id: &str) -> Result<Vec<DocumentInfo>> {
        let dir = self.athlete_dir(athlete_id)?;
        if !dir.exists() {
            return Ok(vec![]);
        }

        let mut docs = vec![];
        for entry in fs::read_dir(&dir).with_context(|| format!("No se pudo leer {:?}", dir))? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            docs.push(DocumentInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: meta.len(),
                uploaded_at: meta.modified().ok().map(DateTime::<Utc>::from),
            });
        }
        docs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(docs)
    }

    /// Verifica si el atleta tiene foto 3x4 y comprobante de residencia.
    pub fn check_card_documents(&self, athlete_id: &str) -> Result<CardCheckResponse> {
        let documents = self.list_documents(athlete_id)?;
        let has = |kind: DocumentKind| documents.iter().any(|d| d.name.starts_with(kind.prefix()));

        let has_photo = has(DocumentKind::Photo3x4);
        let has_proof_of_residence = has(DocumentKind::ProofOfResidence);

        Ok(CardCheckResponse {
            can_generate: has_photo && has_proof_of_residence,
            has_photo,
            has_proof_of_residence,
            total_files: documents.len(),
            documents,
        })
    }

    /// Bytes de la foto 3x4 del atleta (la primera por nombre).
    pub fn load_photo(&self, athlete_id: &str) -> Result<Vec<u8>> {
        let photo = self
            .list_documents(athlete_id)?
            .into_iter()
            .find(|d| d.name.starts_with(DocumentKind::Photo3x4.prefix()))
            .ok_or_else(|| anyhow!("Foto 3x4 no encontrada para atleta {}", athlete_id))?;

        let path = self.athlete_dir(athlete_id)?.join(&photo.name);
        fs::read(&path).with_context(|| format!("No se pudo leer foto {:?}", path))
    }

    fn uploaded_template(&self) -> Option<PathBuf> {
        [PhotoFormat::Png, PhotoFormat::Jpeg]
            .iter()
            .map(|f| {
                self.root
                    .join("modelos")
                    .join(format!("{}.{}", TEMPLATE_STEM, extension_for(*f)))
            })
            .find(|p| p.is_file())
    }

    /// Reemplaza el modelo subido. Solo imágenes PNG/JPEG.
    pub fn save_template(&self, bytes: &[u8]) -> Result<PathBuf> {
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(anyhow!("Modelo excede {} bytes", MAX_UPLOAD_BYTES));
        }
        let format = detect_image_format(bytes)
            .ok_or_else(|| anyhow!("El modelo debe ser una imagen PNG o JPEG"))?;

        if let Some(previous) = self.uploaded_template() {
            fs::remove_file(&previous)
                .with_context(|| format!("No se pudo borrar modelo anterior {:?}", previous))?;
        }

        let path = self
            .root
            .join("modelos")
            .join(format!("{}.{}", TEMPLATE_STEM, extension_for(format)));
        fs::write(&path, bytes).with_context(|| format!("No se pudo guardar modelo {:?}", path))?;
        log::info!("Modelo de carteirinha actualizado en {:?}", path);
        Ok(path)
    }

    /// Modelo a usar: el subido, si no el primero de los locales (relativos a `base_dir`).
    pub fn resolve_template(&self, base_dir: &Path) -> Option<PathBuf> {
        if let Some(uploaded) = self.uploaded_template() {
            return Some(uploaded);
        }
        let local = LOCAL_TEMPLATE_CANDIDATES
            .iter()
            .map(|c| base_dir.join(c))
            .find(|p| p.is_file());
        if local.is_none() {
            log::warn!("No se encontró modelo de carteirinha, se genera sin fondo");
        }
        local
    }

    /// Guarda una carteirinha generada en lote. Nunca pisa un archivo existente.
    pub fn store_card(&self, file_name: &str, pdf: &[u8]) -> Result<PathBuf> {
        let path = self.root.join("carteirinhas").join(file_name);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("No se pudo crear PDF en {:?}", path))?;
        file.write_all(pdf)
            .with_context(|| format!("No se pudo guardar PDF en {:?}", path))?;
        log::info!("Carteirinha guardada en {:?} ({} bytes)", path, pdf.len());
        Ok(path)
    }
}
