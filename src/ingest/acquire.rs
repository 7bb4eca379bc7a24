use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{IngestError, OcrEngine, ProgressObserver};

/// 一次导入的输入来源：直接粘贴的文本，或一个上传的文件
#[derive(Debug, Clone)]
pub enum PaperSource {
    Pasted(String),
    File(PathBuf),
}

/// 文件来源按扩展名归类。PDF、PNG/JPG/JPEG、TXT之外的一律拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Pdf,
    Image,
    PlainText,
}

fn source_kind(path: &Path) -> Result<SourceKind, IngestError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => Ok(SourceKind::Pdf),
        "png" | "jpg" | "jpeg" => Ok(SourceKind::Image),
        "txt" => Ok(SourceKind::PlainText),
        other => Err(IngestError::UnsupportedFormat(if other.is_empty() {
            "无扩展名".to_string()
        } else {
            other.to_string()
        })),
    }
}

/// 文本获取阶段：把任一来源变成一个完整的UTF-8文本串。
/// PDF按页序逐页提取后拼接，图片走OCR，纯文本直接解码
pub struct TextAcquirer<'a> {
    ocr: &'a dyn OcrEngine,
}

impl<'a> TextAcquirer<'a> {
    pub fn new(ocr: &'a dyn OcrEngine) -> Self {
        Self { ocr }
    }

    pub async fn acquire(
        &self,
        source: &PaperSource,
        progress: &dyn ProgressObserver,
    ) -> Result<String, IngestError> {
        let text = match source {
            PaperSource::Pasted(text) => text.clone(),
            PaperSource::File(path) => {
                let kind = source_kind(path)?;
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| IngestError::ExtractionFailed(format!("读取文件失败: {}", e)))?;
                match kind {
                    SourceKind::Pdf => extract_pdf_text(&bytes, progress)?,
                    SourceKind::Image => self.extract_image_text(path, &bytes, progress)?,
                    // 按UTF-8直接解码，非法字节替换为占位符
                    SourceKind::PlainText => String::from_utf8_lossy(&bytes).to_string(),
                }
            }
        };

        if text.trim().is_empty() {
            return Err(IngestError::EmptyDocument);
        }
        Ok(text)
    }

    fn extract_image_text(
        &self,
        path: &Path,
        bytes: &[u8],
        progress: &dyn ProgressObserver,
    ) -> Result<String, IngestError> {
        // 扩展名说是图片，内容也得像图片
        if image::guess_format(bytes).is_err() {
            return Err(IngestError::UnsupportedFormat(
                "文件内容不是可识别的图片".to_string(),
            ));
        }

        // 识别语言固定为英文
        self.ocr
            .recognize(path, "eng", progress)
            .map_err(|e| IngestError::ExtractionFailed(e.to_string()))
    }
}

/// 逐页提取PDF文本，页与页之间用双换行拼接。
/// 严格按 1..N 页序处理，所有页都提取完才返回
fn extract_pdf_text(bytes: &[u8], progress: &dyn ProgressObserver) -> Result<String, IngestError> {
    progress.on_progress("正在加载PDF...");
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| IngestError::ExtractionFailed(format!("PDF加载失败: {}", e)))?;

    let pages = doc.get_pages();
    let total = pages.len();
    info!("PDF共 {} 页", total);

    let mut full_text = String::new();
    for (idx, (&page_no, _)) in pages.iter().enumerate() {
        progress.on_progress(&format!("正在提取第 {}/{} 页...", idx + 1, total));
        let page_text = doc
            .extract_text(&[page_no])
            .map_err(|e| IngestError::ExtractionFailed(format!("第{}页提取失败: {}", idx + 1, e)))?;
        full_text.push_str(&page_text);
        full_text.push_str("\n\n");
    }

    // 个别PDF逐页提不出内容时，退回整本提取再试一次
    if full_text.trim().is_empty() {
        warn!("逐页提取结果为空，尝试整本提取");
        full_text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| IngestError::ExtractionFailed(format!("PDF文本提取失败: {}", e)))?;
    }

    Ok(full_text)
}
