pub mod melody_pipeline;
pub mod logger;
