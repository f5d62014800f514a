//! OCR through external `tesseract` and `pdftoppm` processes.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::ExtractOptions;

/// Thin wrapper around the tesseract and pdftoppm command-line tools.
#[derive(Debug, Clone)]
pub struct OcrEngine {
    tesseract: PathBuf,
    pdftoppm: PathBuf,
    languages: String,
    dpi: u32,
}

impl OcrEngine {
    /// Create an engine from extraction options.
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            tesseract: options.tesseract_cmd.clone(),
            pdftoppm: options.pdftoppm_cmd.clone(),
            languages: options.languages.clone(),
            dpi: options.dpi,
        }
    }

    /// Languages passed to tesseract.
    pub fn languages(&self) -> &str {
        &self.languages
    }

    /// Check that both external programs can be found.
    pub fn is_available(&self) -> bool {
        resolve(&self.tesseract).is_ok() && resolve(&self.pdftoppm).is_ok()
    }

    /// Run OCR on a single image file.
    pub fn recognize_image(&self, image: &Path) -> Result<String> {
        let tesseract = resolve(&self.tesseract)?;
        log::debug!("OCR {} ({})", image.display(), self.languages);

        let output = Command::new(tesseract)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.languages)
            .output()?;
        check_status("tesseract", &output)?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Rasterize one page (1-based) of a PDF into `<prefix>.png`.
    pub fn render_page(&self, pdf: &Path, page: usize, prefix: &Path) -> Result<PathBuf> {
        let pdftoppm = resolve(&self.pdftoppm)?;

        let output = Command::new(pdftoppm)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg("-png")
            .arg("-singlefile")
            .arg(pdf)
            .arg(prefix)
            .output()?;
        check_status("pdftoppm", &output)?;

        let image = prefix.with_extension("png");
        if !image.exists() {
            return Err(Error::Ocr(format!(
                "pdftoppm produced no image for page {}",
                page
            )));
        }
        Ok(image)
    }

    /// Render every page of a PDF and OCR it, joining pages with newlines.
    pub fn recognize_pdf(&self, pdf: &Path) -> Result<String> {
        let page_count = lopdf::Document::load(pdf)?.get_pages().len();
        log::info!(
            "OCR of scanned PDF {} ({} pages at {} dpi)",
            pdf.display(),
            page_count,
            self.dpi
        );

        let workdir = tempfile::tempdir()?;
        let mut pages = Vec::with_capacity(page_count);
        for page in 1..=page_count {
            let prefix = workdir.path().join(format!("page-{}", page));
            let image = self.render_page(pdf, page, &prefix)?;
            pages.push(self.recognize_image(&image)?);
        }

        Ok(pages.join("\n"))
    }
}

impl Default for OcrEngine {
    fn default() -> Self {
        Self::new(&ExtractOptions::default())
    }
}

fn resolve(cmd: &Path) -> Result<PathBuf> {
    which::which(cmd).map_err(|_| Error::ToolNotFound(cmd.to_path_buf()))
}

fn check_status(tool: &str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(Error::Ocr(format!(
        "{} exited with {}: {}",
        tool,
        output.status,
        stderr.trim()
    )))
}
