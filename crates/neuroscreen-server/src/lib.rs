pub mod config;
pub mod gemini;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod server;

pub use config::{AppConfig, GeminiSettings, LoggingConfig, ModelConfig, ServerConfig};
pub use observability::{apply_logging_level, init_tracing};
pub use server::{AppState, NeuroscreenServer, ServerBuilder, build_app};
