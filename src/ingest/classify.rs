use crate::config::Taxonomy;

/// 关键词全不命中且调用方未指定默认科目时的兜底科目
const FALLBACK_SUBJECT: &str = "data-structures";

/// 关键词加权分类器。对同一文本与分类表，输出完全确定；
/// 永不失败，总能给出一对合法的 (科目, 主题)
pub struct Classifier<'a> {
    taxonomy: &'a Taxonomy,
    default_subject: &'a str,
}

impl<'a> Classifier<'a> {
    pub fn new(taxonomy: &'a Taxonomy, default_subject: Option<&'a str>) -> Self {
        Self {
            taxonomy,
            default_subject: default_subject.unwrap_or(FALLBACK_SUBJECT),
        }
    }

    /// 打分规则：科目级关键词命中记2分，主题级关键词命中给主题记3分、
    /// 同时给所属科目加1分。每个关键词按"是否出现"计一次，不按出现次数累计。
    /// 科目与主题的并列都保留先声明者（严格大于才更新）
    pub fn classify(&self, question_text: &str) -> (String, String) {
        let text = question_text.to_lowercase();

        let mut best_subject = self.default_subject.to_string();
        let mut best_topic = String::new();
        let mut max_score = 0u32;

        for subject in &self.taxonomy.subjects {
            let mut subject_score = 0u32;

            for keyword in &subject.keywords {
                if text.contains(&keyword.to_lowercase()) {
                    subject_score += 2;
                }
            }

            let mut best_topic_for_subject = "";
            let mut best_topic_score = 0u32;

            for topic in &subject.topics {
                let mut topic_score = 0u32;
                for keyword in &topic.keywords {
                    if text.contains(&keyword.to_lowercase()) {
                        topic_score += 3;
                        subject_score += 1;
                    }
                }
                if topic_score > best_topic_score {
                    best_topic_score = topic_score;
                    best_topic_for_subject = topic.id.as_str();
                }
            }

            if subject_score > max_score {
                max_score = subject_score;
                best_subject = subject.id.clone();
                best_topic = if best_topic_for_subject.is_empty() {
                    subject
                        .topics
                        .first()
                        .map(|t| t.id.clone())
                        .unwrap_or_default()
                } else {
                    best_topic_for_subject.to_string()
                };
            }
        }

        // 没有任何主题关键词命中时，取获胜科目声明顺序里的第一个主题
        if best_topic.is_empty() {
            best_topic = self
                .taxonomy
                .first_topic(&best_subject)
                .unwrap_or_default()
                .to_string();
        }

        (best_subject, best_topic)
    }
}
