use regex::Regex;

use super::QuestionType;

/// 从单个题块中解析出的结构化字段
#[derive(Debug, Clone)]
pub struct ExtractedFields {
    /// 去掉分值标注与选项后的题干
    pub question: String,
    pub marks: u32,
    pub options: Vec<String>,
    pub question_type: QuestionType,
}

/// 判定数值题的关键词（子串匹配，不区分大小写）
const NUMERICAL_KEYWORDS: [&str; 6] = [
    "calculate",
    "compute",
    "find the value",
    "determine",
    "how many",
    "what is the value",
];

/// 字段提取器。从不报错：缺失或畸形的字段一律落到默认值
pub struct FieldExtractor {
    marks_patterns: Vec<Regex>,
    option_shapes: Vec<Regex>,
    any_option_re: Regex,
    mcq_paren_re: Regex,
    mcq_bare_re: Regex,
}

impl FieldExtractor {
    pub fn new() -> Self {
        // 分值标注的三种写法，按顺序尝试，先中者胜
        let marks_patterns = vec![
            Regex::new(r"(?i)\[?\s*(\d+)\s*marks?\s*\]?").unwrap(),
            Regex::new(r"(?i)\(\s*(\d+)\s*marks?\s*\)").unwrap(),
            Regex::new(r"(?i)marks?\s*[:=]\s*(\d+)").unwrap(),
        ];
        // 选项标记的三种形态：(a) / a) / a. ，同样按顺序尝试
        let option_shapes = vec![
            Regex::new(r"(?i)\(([a-d])\)").unwrap(),
            Regex::new(r"(?i)\b([a-d])\)").unwrap(),
            Regex::new(r"(?i)\b([a-d])\.").unwrap(),
        ];
        Self {
            marks_patterns,
            option_shapes,
            any_option_re: Regex::new(r"(?i)\([a-d]\)|[a-d]\)|[a-d]\.").unwrap(),
            mcq_paren_re: Regex::new(r"\([a-d]\)").unwrap(),
            mcq_bare_re: Regex::new(r"[a-d]\)").unwrap(),
        }
    }

    pub fn extract(&self, block: &str) -> ExtractedFields {
        let mut question = block.trim().to_string();

        let marks = self.extract_marks(&mut question);
        let options = self.extract_options(&mut question);
        let question_type = self.detect_type(&question, &options);

        ExtractedFields {
            question,
            marks,
            options,
            question_type,
        }
    }

    /// 找到第一个分值标注，解析数值并从题干里删掉该标注。没有标注时默认1分
    fn extract_marks(&self, question: &mut String) -> u32 {
        for pattern in &self.marks_patterns {
            if let Some(cap) = pattern.captures(question) {
                let marks = cap[1].parse::<u32>().unwrap_or(1);
                let matched = cap.get(0).unwrap().as_str().to_string();
                *question = question.replacen(&matched, "", 1).trim().to_string();
                return marks;
            }
        }
        1
    }

    /// 按形态顺序找选项标记，第一个命中≥2处的形态获胜。
    /// 选项值取相邻标记之间的切片；获胜后题干截断到第一个标记处。
    /// 不足4个的补空串；一个形态都没赢时返回4个空串的占位列表
    fn extract_options(&self, question: &mut String) -> Vec<String> {
        for shape in &self.option_shapes {
            let markers: Vec<_> = shape.find_iter(question).collect();
            if markers.len() < 2 {
                continue;
            }

            let mut options = Vec::with_capacity(markers.len());
            for (idx, marker) in markers.iter().enumerate() {
                let value_end = markers
                    .get(idx + 1)
                    .map(|next| next.start())
                    .unwrap_or(question.len());
                options.push(question[marker.end()..value_end].trim().to_string());
            }

            // 题干截断到第一个选项标记。标记在0处时不截断
            let first_marker = self.any_option_re.find(question).map(|m| m.start());
            if let Some(pos) = first_marker {
                if pos > 0 {
                    question.truncate(pos);
                    *question = question.trim().to_string();
                }
            }

            while options.len() < 4 {
                options.push(String::new());
            }
            return options;
        }

        // 下游把全空的占位列表视作"未检出选项"
        vec![String::new(); 4]
    }

    fn detect_type(&self, question: &str, options: &[String]) -> QuestionType {
        let text = question.to_lowercase();

        // 有两个以上非空选项，或题干里残留选项标记，视为选择题
        let non_empty = options.iter().filter(|o| !o.trim().is_empty()).count();
        if non_empty >= 2 {
            return QuestionType::Mcq;
        }
        if text.contains("(a)") && text.contains("(b)") {
            return QuestionType::Mcq;
        }
        if self.mcq_paren_re.is_match(&text) || self.mcq_bare_re.is_match(&text) {
            return QuestionType::Mcq;
        }

        if NUMERICAL_KEYWORDS.iter().any(|k| text.contains(k)) {
            return QuestionType::Numerical;
        }

        QuestionType::Descriptive
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Difficulty;

    #[test]
    fn bracketed_marks_are_parsed_and_removed() {
        let fields = FieldExtractor::new().extract("State the pumping lemma [3 marks]");
        assert_eq!(fields.marks, 3);
        assert_eq!(fields.question, "State the pumping lemma");
    }

    #[test]
    fn paren_and_colon_marks_forms() {
        let extractor = FieldExtractor::new();

        // 第一种写法的括号可选，因此 "(2 marks)" 里命中的是 "2 marks"，
        // 括号壳留在题干里，等人工复核清理
        let fields = extractor.extract("Explain paging in brief (2 marks)");
        assert_eq!(fields.marks, 2);
        assert_eq!(fields.question, "Explain paging in brief ()");

        let fields = extractor.extract("Derive the recurrence marks: 5");
        assert_eq!(fields.marks, 5);
        assert_eq!(fields.question, "Derive the recurrence");
    }

    #[test]
    fn bare_marks_without_brackets_also_match() {
        // 第一种写法的方括号是可选的，"2 marks" 也会被识别
        let fields = FieldExtractor::new().extract("Solve for x, 2 marks");
        assert_eq!(fields.marks, 2);
    }

    #[test]
    fn missing_marks_defaults_to_one() {
        let fields = FieldExtractor::new().extract("Define a context free grammar");
        assert_eq!(fields.marks, 1);
        assert_eq!(fields.question, "Define a context free grammar");
    }

    #[test]
    fn two_options_padded_to_four() {
        let fields = FieldExtractor::new().extract("Which one is a stack operation? (a) push (b) pop");
        assert_eq!(fields.options, vec!["push", "pop", "", ""]);
        assert_eq!(fields.question, "Which one is a stack operation?");
        assert_eq!(fields.question_type, QuestionType::Mcq);
    }

    #[test]
    fn three_options_padded_to_four() {
        let fields = FieldExtractor::new().extract("Pick the closure property (a) union (b) star (c) reversal");
        assert_eq!(fields.options, vec!["union", "star", "reversal", ""]);
    }

    #[test]
    fn options_at_text_start_leave_question_untouched() {
        // 第一个选项标记在0位时不截断题干
        let fields = FieldExtractor::new().extract("(a) red (b) green (c) blue (d) black");
        assert_eq!(fields.options, vec!["red", "green", "blue", "black"]);
        assert_eq!(fields.question, "(a) red (b) green (c) blue (d) black");
    }

    #[test]
    fn no_options_yields_placeholder() {
        let fields = FieldExtractor::new().extract("Write short notes on thrashing");
        assert_eq!(fields.options, vec!["", "", "", ""]);
        assert_eq!(fields.question_type, QuestionType::Descriptive);
    }

    #[test]
    fn numerical_keywords_detected() {
        let extractor = FieldExtractor::new();
        let fields = extractor.extract("Calculate the turnaround time of the schedule");
        assert_eq!(fields.question_type, QuestionType::Numerical);

        let fields = extractor.extract("How many page faults occur under LRU here");
        assert_eq!(fields.question_type, QuestionType::Numerical);
    }

    #[test]
    fn leftover_option_markers_imply_mcq() {
        // 选项没有提齐，但题干里残留的标记仍按选择题处理
        let fields = FieldExtractor::new().extract("Pick either option (a) alone from the list");
        assert_eq!(fields.options, vec!["", "", "", ""]);
        assert_eq!(fields.question_type, QuestionType::Mcq);
    }

    #[test]
    fn difficulty_follows_marks() {
        assert_eq!(Difficulty::from_marks(1), Difficulty::Easy);
        assert_eq!(Difficulty::from_marks(2), Difficulty::Medium);
        assert_eq!(Difficulty::from_marks(3), Difficulty::Hard);
        assert_eq!(Difficulty::from_marks(5), Difficulty::Hard);
    }
}
