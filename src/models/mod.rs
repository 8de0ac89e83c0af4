pub mod exam;

pub use exam::{
    ExamStructure, ExtractionMetadata, Question, QuestionOption, QuestionType, Section,
    SectionLetter,
};
