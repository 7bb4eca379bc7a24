pub mod acquire;
pub mod classify;
pub mod extract;
pub mod ocr;
pub mod segment;

pub use acquire::{PaperSource, TextAcquirer};
pub use ocr::{OcrEngine, TesseractOcr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::Taxonomy;
use classify::Classifier;
use extract::FieldExtractor;
use segment::Segmenter;

/// 导入流水线的错误类型。分段、字段提取与分类本身从不报错，
/// 所有歧义都落到文档化的默认值上，最终交由人工复核
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("不支持的文件格式: {0}")]
    UnsupportedFormat(String),

    #[error("文档内容为空，未提取到任何文本")]
    EmptyDocument,

    #[error("文本提取失败: {0}")]
    ExtractionFailed(String),

    #[error("未能从文本中识别出任何题目")]
    NoQuestionsFound,
}

/// 流水线进度回调。仅用于界面提示，不承载任何正确性契约
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, status: &str);
}

/// 默认实现：把进度写进日志
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&self, status: &str) {
        info!("{}", status);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// 由分值推导难度
    pub fn from_marks(marks: u32) -> Self {
        if marks == 1 {
            Difficulty::Easy
        } else if marks >= 3 {
            Difficulty::Hard
        } else {
            Difficulty::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    Numerical,
    Descriptive,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Numerical => "Numerical",
            QuestionType::Descriptive => "Descriptive",
        }
    }
}

/// 一道待复核的题目草稿。批量产生于一次导入，人工确认前不落库
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    /// 仅在本次导入会话内唯一
    pub temp_id: String,
    pub question_number: usize,
    pub question: String,
    /// 0个或恰好4个（不足4个时用空串补齐）
    pub options: Vec<String>,
    /// 默认指向第0项，属未验证的占位值，必须经人工复核
    pub correct_answer: usize,
    pub explanation: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    pub marks: u32,
    pub negative_marks: f64,
    pub year: Option<String>,
}

impl QuestionDraft {
    /// marks 为 1 时扣 0.33，否则 0.66
    pub fn negative_marks_for(marks: u32) -> f64 {
        if marks == 1 {
            0.33
        } else {
            0.66
        }
    }
}

/// 试卷导入流水线：文本获取 → 题目分段 → 字段提取与分类。
/// 严格顺序执行，各阶段对同一输入产出确定的结果
pub struct IngestPipeline<'a> {
    taxonomy: &'a Taxonomy,
    acquirer: TextAcquirer<'a>,
    default_subject: Option<String>,
    year: Option<String>,
}

impl<'a> IngestPipeline<'a> {
    pub fn new(taxonomy: &'a Taxonomy, ocr: &'a dyn OcrEngine) -> Self {
        Self {
            taxonomy,
            acquirer: TextAcquirer::new(ocr),
            default_subject: None,
            year: None,
        }
    }

    /// 关键词全不命中时回退到的科目
    pub fn with_default_subject(mut self, subject: Option<String>) -> Self {
        self.default_subject = subject;
        self
    }

    /// 真题年份标签
    pub fn with_year(mut self, year: Option<String>) -> Self {
        self.year = year;
        self
    }

    pub async fn run(
        &self,
        source: &PaperSource,
        progress: &dyn ProgressObserver,
    ) -> Result<Vec<QuestionDraft>, IngestError> {
        let text = self.acquirer.acquire(source, progress).await?;

        progress.on_progress("正在解析题目...");
        let candidates = Segmenter::new().segment(&text);
        if candidates.is_empty() {
            return Err(IngestError::NoQuestionsFound);
        }
        info!("分段完成，共 {} 个候选题块", candidates.len());

        progress.on_progress("正在分类题目...");
        let extractor = FieldExtractor::new();
        let classifier = Classifier::new(self.taxonomy, self.default_subject.as_deref());

        let drafts = candidates
            .into_iter()
            .enumerate()
            .map(|(idx, candidate)| {
                let fields = extractor.extract(&candidate.body);
                let (subject, topic) = classifier.classify(&fields.question);
                QuestionDraft {
                    temp_id: format!("temp-{}", idx + 1),
                    question_number: candidate.ordinal,
                    question: fields.question,
                    options: fields.options,
                    correct_answer: 0,
                    explanation: String::new(),
                    subject,
                    topic,
                    difficulty: Difficulty::from_marks(fields.marks),
                    question_type: fields.question_type,
                    marks: fields.marks,
                    negative_marks: QuestionDraft::negative_marks_for(fields.marks),
                    year: self.year.clone(),
                }
            })
            .collect::<Vec<_>>();

        info!("提取完成，共 {} 道题目", drafts.len());
        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct NoopOcr;

    impl OcrEngine for NoopOcr {
        fn recognize(
            &self,
            _image_path: &std::path::Path,
            _lang: &str,
            _progress: &dyn ProgressObserver,
        ) -> anyhow::Result<String> {
            anyhow::bail!("OCR不应被调用")
        }
    }

    struct CollectProgress(Mutex<Vec<String>>);

    impl ProgressObserver for CollectProgress {
        fn on_progress(&self, status: &str) {
            self.0.lock().unwrap().push(status.to_string());
        }
    }

    async fn run_pipeline(text: &str) -> Result<Vec<QuestionDraft>, IngestError> {
        let taxonomy = Taxonomy::default();
        let ocr = NoopOcr;
        let pipeline = IngestPipeline::new(&taxonomy, &ocr);
        let source = PaperSource::Pasted(text.to_string());
        pipeline.run(&source, &LogProgress).await
    }

    #[tokio::test]
    async fn mcq_paper_end_to_end() {
        let text = "Q.1 What is 2+2? [1 marks]\n(a) 3\n(b) 4\n(c) 5\n(d) 6";
        let drafts = run_pipeline(text).await.unwrap();
        assert_eq!(drafts.len(), 1);

        let q = &drafts[0];
        assert_eq!(q.temp_id, "temp-1");
        assert_eq!(q.question_number, 1);
        assert_eq!(q.question, "What is 2+2?");
        assert_eq!(q.marks, 1);
        assert_eq!(q.difficulty, Difficulty::Easy);
        assert_eq!(q.question_type, QuestionType::Mcq);
        assert_eq!(q.options, vec!["3", "4", "5", "6"]);
        assert_eq!(q.correct_answer, 0);
        assert_eq!(q.negative_marks, 0.33);
    }

    #[tokio::test]
    async fn unnumbered_paragraphs_become_descriptive_drafts() {
        // 两段无编号、无选项标记的文本（25与30字符）
        let text = "the quick brown fox leaps\n\na gentle breeze moves the leaf";
        let drafts = run_pipeline(text).await.unwrap();
        assert_eq!(drafts.len(), 2);
        for q in &drafts {
            assert_eq!(q.question_type, QuestionType::Descriptive);
            assert_eq!(q.options, vec!["", "", "", ""]);
        }
        assert_eq!(drafts[0].question_number, 1);
        assert_eq!(drafts[1].question_number, 2);
    }

    #[tokio::test]
    async fn empty_paste_fails_before_segmentation() {
        let err = run_pipeline("   \n\n  ").await.unwrap_err();
        assert!(matches!(err, IngestError::EmptyDocument));
    }

    #[tokio::test]
    async fn unrecognizable_text_reports_no_questions() {
        // 无任何编号标记，且段落都不超过20字符
        let err = run_pipeline("short\n\ntiny bit").await.unwrap_err();
        assert!(matches!(err, IngestError::NoQuestionsFound));
    }

    #[tokio::test]
    async fn year_and_default_subject_are_applied() {
        let taxonomy = Taxonomy::default();
        let ocr = NoopOcr;
        let pipeline = IngestPipeline::new(&taxonomy, &ocr)
            .with_default_subject(Some("dbms".to_string()))
            .with_year(Some("2023".to_string()));
        let source = PaperSource::Pasted("Q.1 zzzz qqqq wwww yyyy xxxx vvvv".to_string());
        let drafts = pipeline.run(&source, &LogProgress).await.unwrap();
        assert_eq!(drafts[0].year.as_deref(), Some("2023"));
        assert_eq!(drafts[0].subject, "dbms");
        assert_eq!(drafts[0].topic, "er-model");
    }

    #[tokio::test]
    async fn progress_is_reported() {
        let taxonomy = Taxonomy::default();
        let ocr = NoopOcr;
        let pipeline = IngestPipeline::new(&taxonomy, &ocr);
        let source = PaperSource::Pasted("Q.1 What is a deadlock in an operating system?".to_string());
        let progress = CollectProgress(Mutex::new(Vec::new()));
        pipeline.run(&source, &progress).await.unwrap();
        let seen = progress.0.lock().unwrap();
        assert!(seen.iter().any(|s| s.contains("解析")));
    }
}
