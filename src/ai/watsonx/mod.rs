pub mod client;
pub mod direct;
pub mod managed;
pub mod types;

pub use client::WatsonxHttpClient;
pub use direct::DirectHttpClient;
pub use managed::ModelInference;
pub use types::TextGenerationRequest;
