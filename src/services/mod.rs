pub mod due;
pub mod generator;
pub mod llm_provider;
pub mod session;
pub mod trainer;
