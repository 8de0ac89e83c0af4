pub mod ai_categorizer;
pub mod ai_extractor;
pub mod distribution_auditor;
pub mod llm_service;
pub mod text_acquirer;
pub mod warn_writer;

pub use ai_categorizer::{categorize_questions_with_ai, AiCategorizer};
pub use ai_extractor::{extract_questions_with_ai, AiExtractor};
pub use distribution_auditor::{needs_ai, SectionCounts};
pub use llm_service::{LlmBackend, LlmService};
pub use text_acquirer::{acquire_text, parse_pdf, parse_word};
pub use warn_writer::WarnWriter;
