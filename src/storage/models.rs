use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ingest::QuestionDraft;

/// 题库中的一道题。options 列存JSON数组
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Option<i64>,
    pub question: String,
    pub options: String,
    pub correct_answer: i64,
    pub explanation: Option<String>,
    pub subject: String,
    pub topic: String,
    pub difficulty: String,
    pub question_type: String,
    pub marks: i64,
    pub negative_marks: f64,
    pub year: Option<String>,
    pub source: String,
    pub created_at: Option<String>,
}

impl Question {
    /// 复核通过的草稿转成入库记录。source 标记来源（文件名或 paste）
    pub fn from_draft(draft: &QuestionDraft, source: &str) -> Self {
        Self {
            id: None,
            question: draft.question.clone(),
            options: serde_json::to_string(&draft.options).unwrap_or_default(),
            correct_answer: draft.correct_answer as i64,
            explanation: if draft.explanation.is_empty() {
                None
            } else {
                Some(draft.explanation.clone())
            },
            subject: draft.subject.clone(),
            topic: draft.topic.clone(),
            difficulty: draft.difficulty.as_str().to_string(),
            question_type: draft.question_type.as_str().to_string(),
            marks: draft.marks as i64,
            negative_marks: draft.negative_marks,
            year: draft.year.clone(),
            source: source.to_string(),
            created_at: Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{Difficulty, QuestionType};

    #[test]
    fn draft_converts_to_row() {
        let draft = QuestionDraft {
            temp_id: "temp-1".to_string(),
            question_number: 4,
            question: "What does ACID stand for?".to_string(),
            options: vec!["a".into(), "b".into(), "".into(), "".into()],
            correct_answer: 1,
            explanation: String::new(),
            subject: "dbms".to_string(),
            topic: "transactions".to_string(),
            difficulty: Difficulty::Medium,
            question_type: QuestionType::Mcq,
            marks: 2,
            negative_marks: 0.66,
            year: Some("2021".to_string()),
            };
        let row = Question::from_draft(&draft, "paper.pdf");
        assert_eq!(row.options, r#"["a","b","",""]"#);
        assert_eq!(row.correct_answer, 1);
        assert_eq!(row.difficulty, "Medium");
        assert_eq!(row.question_type, "MCQ");
        assert_eq!(row.explanation, None);
        assert_eq!(row.source, "paper.pdf");
        assert_eq!(row.year.as_deref(), Some("2021"));
        assert!(row.created_at.is_some());
    }
}
