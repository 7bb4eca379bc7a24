use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use anyhow::Result;
use tracing::info;

use crate::storage::models::Question;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        // 确保使用create_if_missing选项
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(
                database_url
                    .parse::<sqlx::sqlite::SqliteConnectOptions>()?
                    .create_if_missing(true),
            )
            .await?;

        info!("数据库连接成功: {}", database_url);
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS questions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                options TEXT NOT NULL,
                correct_answer INTEGER NOT NULL DEFAULT 0,
                explanation TEXT,
                subject TEXT NOT NULL,
                topic TEXT NOT NULL,
                difficulty TEXT NOT NULL,
                question_type TEXT NOT NULL,
                marks INTEGER NOT NULL DEFAULT 1,
                negative_marks REAL NOT NULL DEFAULT 0.33,
                year TEXT,
                source TEXT NOT NULL,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("数据库表结构初始化完成");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 保存单道题，返回自增ID
    pub async fn save_question(&self, question: &Question) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO questions (question, options, correct_answer, explanation,
                subject, topic, difficulty, question_type, marks, negative_marks, year, source,
                created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, COALESCE(?, CURRENT_TIMESTAMP))
            "#,
        )
        .bind(&question.question)
        .bind(&question.options)
        .bind(question.correct_answer)
        .bind(&question.explanation)
        .bind(&question.subject)
        .bind(&question.topic)
        .bind(&question.difficulty)
        .bind(&question.question_type)
        .bind(question.marks)
        .bind(question.negative_marks)
        .bind(&question.year)
        .bind(&question.source)
        .bind(&question.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// 批量入库，返回成功条数
    pub async fn save_questions(&self, questions: &[Question]) -> Result<usize> {
        let mut count = 0;
        for question in questions {
            self.save_question(question).await?;
            count += 1;
        }
        Ok(count)
    }

    pub async fn total_questions(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn count_by_subject(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT subject, COUNT(*) FROM questions GROUP BY subject ORDER BY COUNT(*) DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_by_type(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT question_type, COUNT(*) FROM questions GROUP BY question_type ORDER BY COUNT(*) DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_by_difficulty(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT difficulty, COUNT(*) FROM questions GROUP BY difficulty ORDER BY COUNT(*) DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn clear_all_tables(&self) -> Result<()> {
        sqlx::query("DELETE FROM questions")
            .execute(&self.pool)
            .await?;
        info!("题库已清空");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{Difficulty, QuestionDraft, QuestionType};

    fn draft(question: &str, subject: &str, qtype: QuestionType) -> QuestionDraft {
        QuestionDraft {
            temp_id: "temp-1".to_string(),
            question_number: 1,
            question: question.to_string(),
            options: vec![String::new(); 4],
            correct_answer: 0,
            explanation: String::new(),
            subject: subject.to_string(),
            topic: "whatever".to_string(),
            difficulty: Difficulty::Easy,
            question_type: qtype,
            marks: 1,
            negative_marks: 0.33,
            year: None,
        }
    }

    #[tokio::test]
    async fn save_and_count_round_trip() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        db.init_schema().await.unwrap();

        let rows = vec![
            Question::from_draft(&draft("q one", "dbms", QuestionType::Mcq), "t"),
            Question::from_draft(&draft("q two", "dbms", QuestionType::Descriptive), "t"),
            Question::from_draft(&draft("q three", "toc", QuestionType::Mcq), "t"),
        ];
        let saved = db.save_questions(&rows).await.unwrap();
        assert_eq!(saved, 3);
        assert_eq!(db.total_questions().await.unwrap(), 3);

        let by_subject = db.count_by_subject().await.unwrap();
        assert_eq!(by_subject[0], ("dbms".to_string(), 2));

        let by_type = db.count_by_type().await.unwrap();
        assert_eq!(by_type[0], ("MCQ".to_string(), 2));

        db.clear_all_tables().await.unwrap();
        assert_eq!(db.total_questions().await.unwrap(), 0);
    }
}
