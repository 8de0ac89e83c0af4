//! 试卷数据结构
//!
//! `ExamStructure` 永远包含 A、B、C 三个部分（按顺序），即使某部分为空。

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 试卷部分字母
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionLetter {
    A,
    B,
    C,
}

impl SectionLetter {
    pub const ALL: [SectionLetter; 3] = [SectionLetter::A, SectionLetter::B, SectionLetter::C];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionLetter::A => "A",
            SectionLetter::B => "B",
            SectionLetter::C => "C",
        }
    }

    /// 在 `ExamStructure::sections` 中的下标
    pub fn index(self) -> usize {
        match self {
            SectionLetter::A => 0,
            SectionLetter::B => 1,
            SectionLetter::C => 2,
        }
    }

    /// 启发式提取路径的默认分值
    pub fn default_points(self) -> u32 {
        match self {
            SectionLetter::A => 1,
            SectionLetter::B => 5,
            SectionLetter::C => 10,
        }
    }

    /// AI 结构化提取路径允许的分值范围
    pub fn points_range(self) -> (u32, u32) {
        match self {
            SectionLetter::A => (1, 2),
            SectionLetter::B => (5, 10),
            SectionLetter::C => (10, 20),
        }
    }

    pub fn default_description(self) -> &'static str {
        match self {
            SectionLetter::A => "Multiple Choice Questions",
            SectionLetter::B => "Short Answer Questions",
            SectionLetter::C => "Long Answer/Essay Questions",
        }
    }

    /// 循环推进：A → B → C → A
    pub fn next(self) -> Self {
        match self {
            SectionLetter::A => SectionLetter::B,
            SectionLetter::B => SectionLetter::C,
            SectionLetter::C => SectionLetter::A,
        }
    }

    /// 解析单个字母（大小写不敏感），只接受 A/B/C
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => Some(SectionLetter::A),
            "B" => Some(SectionLetter::B),
            "C" => Some(SectionLetter::C),
            _ => None,
        }
    }
}

impl fmt::Display for SectionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "open-ended")]
    OpenEnded,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::OpenEnded => "open-ended",
        }
    }
}

/// 选择题选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl QuestionOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_correct: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub correct_answer: String,
    pub points: u32,
    pub section: SectionLetter,
}

impl Question {
    pub fn is_multiple_choice(&self) -> bool {
        self.question_type == QuestionType::MultipleChoice
    }

    /// 选择题或者带有选项的题目（AI 路径可能出现类型与选项不一致的情况）
    pub fn looks_like_multiple_choice(&self) -> bool {
        self.is_multiple_choice() || !self.options.is_empty()
    }

    /// 移动到另一部分，分值随之改为该部分的默认分值
    pub fn move_to(&mut self, section: SectionLetter) {
        if self.section != section {
            self.section = section;
            self.points = section.default_points();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    name: SectionLetter,
    pub description: String,
    pub questions: Vec<Question>,
}

impl Section {
    pub fn new(name: SectionLetter) -> Self {
        Self {
            name,
            description: name.default_description().to_string(),
            questions: Vec::new(),
        }
    }

    pub fn name(&self) -> SectionLetter {
        self.name
    }
}

/// 提取过程的附加信息（按题目 id 索引）
///
/// 记录每道题创建时所在的部分，供 AI 重新归类时使用；不参与序列化。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionMetadata {
    origin_sections: BTreeMap<u32, SectionLetter>,
}

impl ExtractionMetadata {
    pub fn record_origin(&mut self, id: u32, section: SectionLetter) {
        self.origin_sections.entry(id).or_insert(section);
    }

    pub fn origin_of(&self, id: u32) -> Option<SectionLetter> {
        self.origin_sections.get(&id).copied()
    }
}

/// 试卷结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawExam")]
pub struct ExamStructure {
    sections: Vec<Section>,
    #[serde(skip)]
    metadata: ExtractionMetadata,
}

/// 反序列化的中间形态，校验后才转换成 `ExamStructure`
#[derive(Deserialize)]
struct RawExam {
    sections: Vec<Section>,
}

impl TryFrom<RawExam> for ExamStructure {
    type Error = String;

    /// 部分必须恰好是 A、B、C（按顺序）；题目的创建部分按所在部分记录
    fn try_from(raw: RawExam) -> Result<Self, Self::Error> {
        let names: Vec<SectionLetter> = raw.sections.iter().map(Section::name).collect();
        if names != SectionLetter::ALL {
            return Err(format!("sections must be exactly A, B, C in order, got {:?}", names));
        }

        let mut metadata = ExtractionMetadata::default();
        for section in &raw.sections {
            for question in &section.questions {
                metadata.record_origin(question.id, section.name());
            }
        }
        Ok(Self {
            sections: raw.sections,
            metadata,
        })
    }
}

impl Default for ExamStructure {
    fn default() -> Self {
        Self::new()
    }
}

impl ExamStructure {
    /// 创建包含 A、B、C 三个空部分的试卷
    pub fn new() -> Self {
        Self {
            sections: SectionLetter::ALL.iter().map(|&l| Section::new(l)).collect(),
            metadata: ExtractionMetadata::default(),
        }
    }

    /// 创建空试卷，沿用另一份试卷各部分的描述
    pub fn with_descriptions_of(other: &ExamStructure) -> Self {
        let mut exam = Self::new();
        for letter in SectionLetter::ALL {
            exam.section_mut(letter).description = other.section(letter).description.clone();
        }
        exam
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, letter: SectionLetter) -> &Section {
        &self.sections[letter.index()]
    }

    pub fn section_mut(&mut self, letter: SectionLetter) -> &mut Section {
        &mut self.sections[letter.index()]
    }

    pub fn metadata(&self) -> &ExtractionMetadata {
        &self.metadata
    }

    /// 追加题目到其 `section` 字段所指的部分，并记录创建时所在部分
    pub fn push_question(&mut self, question: Question) {
        self.metadata.record_origin(question.id, question.section);
        self.section_mut(question.section).questions.push(question);
    }

    /// 题目创建时所在部分（没有记录时取当前部分）
    pub fn origin_section_of(&self, question: &Question) -> SectionLetter {
        self.metadata.origin_of(question.id).unwrap_or(question.section)
    }

    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| s.questions.iter())
    }

    /// 按 id 查找题目（可变）
    pub fn question_mut(&mut self, id: u32) -> Option<&mut Question> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.questions.iter_mut())
            .find(|q| q.id == id)
    }

    /// 拆分为题目列表（按部分顺序）以及附加信息
    pub fn into_parts(self) -> (Vec<Section>, ExtractionMetadata) {
        (self.sections, self.metadata)
    }

    /// 从拆分结果恢复，保证附加信息不丢失
    pub fn with_metadata(mut self, metadata: ExtractionMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// 每个部分内按 id 排序
    pub fn sort_sections_by_id(&mut self) {
        for section in &mut self.sections {
            section.questions.sort_by_key(|q| q.id);
        }
    }
}
