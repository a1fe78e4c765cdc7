pub mod interface;
pub mod llm_translator;

pub use interface::*;
pub use llm_translator::*;
