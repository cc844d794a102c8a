mod index;
mod tokenizer;

pub use index::{ItemIndex, SearchHit, SearchOptions};
pub use tokenizer::tokenize;
