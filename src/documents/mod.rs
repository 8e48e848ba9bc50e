mod extractor;

pub use extractor::{DocumentExtractor, DocxExtractor, document_xml_to_text, extract_docx_text};
