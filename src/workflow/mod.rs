pub mod exam_flow;
pub mod file_ctx;

pub use exam_flow::{ExamFlow, PipelineStage};
pub use file_ctx::FileCtx;
