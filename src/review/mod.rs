use tracing::{debug, warn};

use crate::config::Taxonomy;
use crate::ingest::{Difficulty, QuestionDraft};

/// 一次导入的人工复核会话。草稿列表只在内存里改动，
/// 关闭即丢弃，确认后才交给存储层
pub struct ReviewSession<'a> {
    taxonomy: &'a Taxonomy,
    drafts: Vec<QuestionDraft>,
}

impl<'a> ReviewSession<'a> {
    pub fn new(taxonomy: &'a Taxonomy, drafts: Vec<QuestionDraft>) -> Self {
        Self { taxonomy, drafts }
    }

    /// 从外部编辑过的草稿（如导出的JSON）恢复会话。
    /// 主题不属于所填科目时重置为该科目的第一个主题，维持不变量
    pub fn from_unchecked(taxonomy: &'a Taxonomy, mut drafts: Vec<QuestionDraft>) -> Self {
        for draft in &mut drafts {
            if taxonomy.subject(&draft.subject).is_none() {
                warn!("草稿 {} 的科目 {} 不在分类表中，保留待人工处理", draft.temp_id, draft.subject);
                continue;
            }
            if !taxonomy.topic_belongs_to(&draft.subject, &draft.topic) {
                let first = taxonomy
                    .first_topic(&draft.subject)
                    .unwrap_or_default()
                    .to_string();
                debug!(
                    "草稿 {} 的主题 {} 不属于科目 {}，重置为 {}",
                    draft.temp_id, draft.topic, draft.subject, first
                );
                draft.topic = first;
            }
        }
        Self { taxonomy, drafts }
    }

    pub fn drafts(&self) -> &[QuestionDraft] {
        &self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    fn draft_mut(&mut self, temp_id: &str) -> Option<&mut QuestionDraft> {
        self.drafts.iter_mut().find(|d| d.temp_id == temp_id)
    }

    pub fn update_question(&mut self, temp_id: &str, text: &str) {
        if let Some(draft) = self.draft_mut(temp_id) {
            draft.question = text.to_string();
        }
    }

    pub fn update_option(&mut self, temp_id: &str, index: usize, value: &str) {
        if let Some(draft) = self.draft_mut(temp_id) {
            if let Some(option) = draft.options.get_mut(index) {
                *option = value.to_string();
            }
        }
    }

    pub fn set_correct_answer(&mut self, temp_id: &str, index: usize) {
        if let Some(draft) = self.draft_mut(temp_id) {
            if index < draft.options.len() {
                draft.correct_answer = index;
            }
        }
    }

    /// 换科目时主题同步重置为新科目的第一个主题，
    /// 保证主题始终属于当前科目
    pub fn set_subject(&mut self, temp_id: &str, subject_id: &str) {
        let first_topic = match self.taxonomy.first_topic(subject_id) {
            Some(t) => t.to_string(),
            None => {
                warn!("忽略未知科目: {}", subject_id);
                return;
            }
        };
        if let Some(draft) = self.draft_mut(temp_id) {
            draft.subject = subject_id.to_string();
            draft.topic = first_topic;
        }
    }

    /// 只接受属于当前科目的主题，其余静默忽略
    pub fn set_topic(&mut self, temp_id: &str, topic_id: &str) {
        let subject = match self.drafts.iter().find(|d| d.temp_id == temp_id) {
            Some(draft) => draft.subject.clone(),
            None => return,
        };
        if !self.taxonomy.topic_belongs_to(&subject, topic_id) {
            warn!("主题 {} 不属于科目 {}，忽略", topic_id, subject);
            return;
        }
        if let Some(draft) = self.draft_mut(temp_id) {
            draft.topic = topic_id.to_string();
        }
    }

    pub fn set_marks(&mut self, temp_id: &str, marks: u32) {
        if let Some(draft) = self.draft_mut(temp_id) {
            draft.marks = marks;
        }
    }

    pub fn set_difficulty(&mut self, temp_id: &str, difficulty: Difficulty) {
        if let Some(draft) = self.draft_mut(temp_id) {
            draft.difficulty = difficulty;
        }
    }

    pub fn set_explanation(&mut self, temp_id: &str, explanation: &str) {
        if let Some(draft) = self.draft_mut(temp_id) {
            draft.explanation = explanation.to_string();
        }
    }

    pub fn remove(&mut self, temp_id: &str) {
        self.drafts.retain(|d| d.temp_id != temp_id);
    }

    /// 结束复核：只放行题干非空且科目/主题都已填的草稿，
    /// 其余静默剔除（不是错误）
    pub fn commit(self) -> Vec<QuestionDraft> {
        self.drafts
            .into_iter()
            .filter(|d| {
                !d.question.trim().is_empty() && !d.subject.is_empty() && !d.topic.is_empty()
            })
            .collect()
    }
}
