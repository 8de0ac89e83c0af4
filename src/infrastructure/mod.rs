pub mod decoders;

pub use decoders::{decode_docx, decode_pdf, read_text};
