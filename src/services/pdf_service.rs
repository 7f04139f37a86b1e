use anyhow::{anyhow, Context, Result};
use std::{
    fs,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{
    process::Command,
    sync::{Semaphore, SemaphorePermit},
    time::timeout,
};
use uuid::Uuid;

/// Cantidad máxima de wkhtmltopdf simultáneos
const MAX_CONCURRENT_PROCESSES: usize = 8;
/// Tiempo máximo para generar un PDF
const PDF_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);
/// Prefijo de carpeta temporal
const TEMP_DIR_PREFIX: &str = "carteirinha_pdf_";

/// Tamaño de página en milímetros, sin márgenes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub width_mm: f64,
    pub height_mm: f64,
}

#[derive(Clone)]
pub struct PdfService {
    semaphore: Arc<Semaphore>,
    temp_dir: Arc<PathBuf>,
    wkhtmltopdf_path: Arc<PathBuf>,
}

impl PdfService {
    /// Usa `binary` si viene, si no busca wkhtmltopdf en PATH.
    pub fn new(binary: Option<PathBuf>) -> Result<Self> {
        let wkhtmltopdf_path = match binary {
            Some(path) => path,
            None => which::which("wkhtmltopdf").context("No se encontró wkhtmltopdf en el sistema")?,
        };
        Self::with_binary(wkhtmltopdf_path)
    }

    pub fn with_binary(wkhtmltopdf_path: PathBuf) -> Result<Self> {
        // Subdirectorio temporal para HTML/PDF provisionales.
        let temp_dir = std::env::temp_dir().join(format!("{}{}", TEMP_DIR_PREFIX, Uuid::new_v4()));
        fs::create_dir_all(&temp_dir)
            .with_context(|| format!("No se pudo crear directorio temporal {:?}", temp_dir))?;

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_PROCESSES)),
            temp_dir: Arc::new(temp_dir),
            wkhtmltopdf_path: Arc::new(wkhtmltopdf_path),
        })
    }

    /// Convierte `html` a PDF en memoria.
    pub async fn render(&self, html: &str, page: PageSpec) -> Result<Vec<u8>> {
        let start = Instant::now();

        // Control de concurrencia
        let _guard = self.acquire_permit().await?;

        let temp_files = self.create_temp_files();
        let _cleanup = TempCleanup::new(temp_files.clone()); // al final se borran

        fs::write(&temp_files.html_path, html).with_context(|| {
            format!(
                "Error escribiendo HTML temporal en {:?}",
                temp_files.html_path
            )
        })?;

        let pdf_data = self.run_wkhtmltopdf(page, &temp_files).await?;

        log::info!(
            "PDF generado en {:.2}s ({} bytes)",
            start.elapsed().as_secs_f32(),
            pdf_data.len()
        );
        Ok(pdf_data)
    }

    async fn acquire_permit(&self) -> Result<SemaphorePermit> {
        timeout(Duration::from_secs(5), self.semaphore.acquire())
            .await
            .context("Timeout esperando permiso en PdfService")?
            .map_err(|_| anyhow!("No se pudo adquirir el semaphore"))
    }

    fn create_temp_files(&self) -> TempFiles {
        let id = Uuid::new_v4().to_string();
        TempFiles {
            html_path: self.temp_dir.join(format!("{}.html", id)),
            pdf_path: self.temp_dir.join(format!("{}.pdf", id)),
        }
    }

    async fn run_wkhtmltopdf(&self, page: PageSpec, paths: &TempFiles) -> Result<Vec<u8>> {
        let mut cmd = Command::new(&*self.wkhtmltopdf_path);

        cmd.args(wkhtmltopdf_args(page));
        cmd.arg(&paths.html_path);
        cmd.arg(&paths.pdf_path);

        cmd.stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        let output = timeout(PDF_GENERATION_TIMEOUT, cmd.output())
            .await
            .context("Timeout ejecutando wkhtmltopdf")?
            .context("No se pudo lanzar wkhtmltopdf")?;

        if !output.status.success() {
            let stderr_msg = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("wkhtmltopdf falló: {}", stderr_msg));
        }

        fs::read(&paths.pdf_path)
            .with_context(|| format!("Error leyendo PDF final en {:?}", paths.pdf_path))
    }
}

/// Argumentos de wkhtmltopdf para una página de tamaño fijo sin márgenes.
pub fn wkhtmltopdf_args(page: PageSpec) -> Vec<String> {
    let mut args = vec![
        "--page-width".to_string(),
        format!("{}mm", page.width_mm),
        "--page-height".to_string(),
        format!("{}mm", page.height_mm),
    ];
    for margin in ["--margin-top", "--margin-bottom", "--margin-left", "--margin-right"] {
        args.push(margin.to_string());
        args.push("0mm".to_string());
    }
    // Sin esto wkhtmltopdf reescala el contenido y las coordenadas en pt no coinciden.
    args.push("--disable-smart-shrinking".to_string());
    args.push("--dpi".to_string());
    args.push("300".to_string());
    args.push("--enable-local-file-access".to_string());
    args.push("--print-media-type".to_string());
    args.push("--quiet".to_string());
    args
}

// --------------------------------------------------------------------------------
// Estructuras auxiliares
// --------------------------------------------------------------------------------
#[derive(Clone)]
struct TempFiles {
    html_path: PathBuf,
    pdf_path: PathBuf,
}

struct TempCleanup {
    files: TempFiles,
}

impl TempCleanup {
    fn new(files: TempFiles) -> Self {
        Self { files }
    }
}

/// Borra los archivos temporales al salir de scope
impl Drop for TempCleanup {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.files.html_path);
        let _ = fs::remove_file(&self.files.pdf_path);
    }
}
