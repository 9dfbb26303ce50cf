pub mod captions;
pub mod cli;
pub mod client;
pub mod config;
pub mod dto;
pub mod errors;
pub mod llm;
pub mod pipeline;
pub mod server;
pub mod video_id;
pub mod view;
