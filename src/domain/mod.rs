// Domain layer - Core dashboard and data source models
pub mod layout;
pub mod registry;
pub mod source;
