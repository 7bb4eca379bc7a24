use regex::Regex;
use tracing::debug;

/// 一个候选题块：序号 + 原始文本
#[derive(Debug, Clone)]
pub struct Candidate {
    /// 从标记里解析出的题号；解析不到时取1起始的顺序位置
    pub ordinal: usize,
    pub body: String,
}

/// 题目分段器。维护三种互相竞争的标记策略，
/// 按"匹配数最多者胜、并列按优先级"的规则选出一种，
/// 全部落空时退化为按空行切段
pub struct Segmenter {
    strategies: Vec<(Regex, &'static str)>,
    collapse_re: Regex,
    paragraph_re: Regex,
}

/// 候选题块的最小长度（字符数），低于此值的块静默丢弃
const MIN_BLOCK_CHARS: usize = 10;

/// 空行切段回退策略里，段落须超过的长度
const MIN_PARAGRAPH_CHARS: usize = 20;

impl Segmenter {
    pub fn new() -> Self {
        // 策略按优先级排列：并列时先尝试的获胜（严格大于才更新）
        let strategies = vec![
            // 策略1: Q.1 / Q1 / Q 1 / Question 1
            (
                Regex::new(r"(?i)(?:q\.?\s*|question\s*)(\d+)\s*[.):]?").unwrap(),
                "q_marker",
            ),
            // 策略2: 行首的 1. / 1) / 1: / 1]
            (
                Regex::new(r"(?m)^\s*(\d+)\s*[.):\]]").unwrap(),
                "bare_number",
            ),
            // 策略3: 空行分隔、可带 Q 前缀的编号块
            (
                Regex::new(r"(?i)(?:\A|\n\n)\s*(?:q\.?\s*)?(\d+)[.):]?").unwrap(),
                "blank_delimited",
            ),
        ];
        Self {
            strategies,
            collapse_re: Regex::new(r"\n{3,}").unwrap(),
            paragraph_re: Regex::new(r"\n{2,}").unwrap(),
        }
    }

    /// 把整段文本切成候选题块。纯函数，永不报错；
    /// 识别不出任何块时返回空列表，由调用方决定如何处理
    pub fn segment(&self, text: &str) -> Vec<Candidate> {
        let clean = self.normalize(text);

        // 各策略独立跑一遍，取匹配数最多的那组（严格大于，保证并列时优先级高者胜）
        let mut best: Vec<Candidate> = Vec::new();
        for (marker_re, name) in &self.strategies {
            let candidates = Self::split_by_markers(marker_re, &clean);
            debug!("策略 {} 匹配 {} 个题块", name, candidates.len());
            if candidates.len() > best.len() {
                best = candidates;
            }
        }

        // 回退：按空行切段，仅保留足够长的段落，按顺序编号
        if best.is_empty() {
            best = self
                .paragraph_re
                .split(&clean)
                .map(|p| p.trim())
                .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
                .enumerate()
                .map(|(idx, p)| Candidate {
                    ordinal: idx + 1,
                    body: p.to_string(),
                })
                .collect();
            debug!("标记策略全部落空，空行切段得到 {} 个段落", best.len());
        }

        // 过短的块静默丢弃。注意先丢弃后不重排序号，
        // 被丢弃的块仍占用一个顺序位置
        best.retain(|c| c.body.chars().count() >= MIN_BLOCK_CHARS);
        best
    }

    fn normalize(&self, text: &str) -> String {
        let unified = text.replace("\r\n", "\n");
        self.collapse_re
            .replace_all(&unified, "\n\n")
            .trim()
            .to_string()
    }

    /// 用标记正则找出所有题目起点，相邻标记之间的文本即为题块内容。
    /// 标记策略不用先行断言，直接按位置切片
    fn split_by_markers(marker_re: &Regex, text: &str) -> Vec<Candidate> {
        let markers: Vec<_> = marker_re.captures_iter(text).collect();
        let mut candidates = Vec::with_capacity(markers.len());

        for (idx, cap) in markers.iter().enumerate() {
            let whole = cap.get(0).unwrap();
            let body_start = whole.end();
            let body_end = markers
                .get(idx + 1)
                .map(|next| next.get(0).unwrap().start())
                .unwrap_or(text.len());
            let body = text[body_start..body_end].trim().to_string();

            // 题号为0或解析失败时回退到顺序位置
            let ordinal = cap
                .get(1)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .filter(|&n| n != 0)
                .unwrap_or(idx + 1);

            candidates.push(Candidate { ordinal, body });
        }

        candidates
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q_markers_split_into_blocks() {
        let text = "Q.1 What is a binary search tree?\nQ.2 Explain virtual memory paging.";
        let blocks = Segmenter::new().segment(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].ordinal, 1);
        assert_eq!(blocks[0].body, "What is a binary search tree?");
        assert_eq!(blocks[1].ordinal, 2);
        assert_eq!(blocks[1].body, "Explain virtual memory paging.");
    }

    #[test]
    fn question_word_marker_is_recognized() {
        let text = "Question 3: Define a semaphore with one example.";
        let blocks = Segmenter::new().segment(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].ordinal, 3);
        assert_eq!(blocks[0].body, "Define a semaphore with one example.");
    }

    #[test]
    fn bare_numbers_at_line_start() {
        let text = "1. Describe the OSI reference model.\n2) Compare TCP with UDP briefly.";
        let blocks = Segmenter::new().segment(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].ordinal, 1);
        assert_eq!(blocks[1].ordinal, 2);
        assert!(blocks[1].body.starts_with("Compare TCP"));
    }

    #[test]
    fn crlf_and_blank_runs_are_normalized() {
        let text = "Q.1 first question body here\r\n\r\n\r\n\r\nQ.2 second question body here";
        let blocks = Segmenter::new().segment(text);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn paragraph_fallback_numbers_sequentially() {
        let text = "the quick brown fox leaps\n\na gentle breeze moves the leaf";
        let blocks = Segmenter::new().segment(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].ordinal, 1);
        assert_eq!(blocks[1].ordinal, 2);
    }

    #[test]
    fn short_paragraphs_are_not_fallback_candidates() {
        // 回退路径要求段落超过20字符
        let blocks = Segmenter::new().segment("short\n\ntiny bit");
        assert!(blocks.is_empty());
    }

    #[test]
    fn minimum_block_length_boundary() {
        // 9字符被丢弃，10字符保留
        let nine = "Q.1 abcdefghi";
        assert!(Segmenter::new().segment(nine).is_empty());

        let ten = "Q.1 abcdefghij";
        let blocks = Segmenter::new().segment(ten);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body, "abcdefghij");
    }

    #[test]
    fn discarded_block_keeps_its_sequence_slot() {
        // 题号0解析回退到顺序位置；前两个块过短被丢弃，
        // 但第三个块的顺序号不前移
        let text = "0. tiny\n0) also tiny\n0] the real long question body";
        let blocks = Segmenter::new().segment(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].ordinal, 3);
        assert_eq!(blocks[0].body, "the real long question body");
    }

    #[test]
    fn zero_ordinal_falls_back_to_sequence_position() {
        let text = "Q.0 this question body is long enough";
        let blocks = Segmenter::new().segment(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].ordinal, 1);
    }

    #[test]
    fn marker_count_tie_prefers_earlier_strategy() {
        // 策略1（Q标记）与策略2（行首数字）各命中一处，
        // 并列时严格大于的比较保住先尝试的策略1：
        // 整段文本归为一道题，行首的 "3." 留在题干里
        let text = "see Q.1 compare queue and stack\n3. explain priority queue operations clearly";
        let blocks = Segmenter::new().segment(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].ordinal, 1);
        assert!(blocks[0].body.contains("3. explain"));
    }
}
