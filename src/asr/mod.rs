pub mod interface;
pub mod openai_whisper_asr;

pub use interface::*;
pub use openai_whisper_asr::*;
