pub mod campaign;
pub mod llm;
pub mod logging;
pub mod storage;
