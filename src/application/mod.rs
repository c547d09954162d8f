// Application layer - Use cases and service traits
pub mod assembler;
pub mod binder;
pub mod healer;
pub mod model_gateway;
pub mod orchestrator;
pub mod retry;
pub mod source_detector;
