// Model endpoint configuration and credential access
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub model: ModelSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelSettings {
    pub host: String,
    pub architect_model: String,
    pub vision_model: String,
    pub api_key_env: String,
}

pub fn load_model_config() -> anyhow::Result<ModelConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/model"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Credential accessor invoked before every external call. The credential is
/// externally mutable state (the host may rotate it), so it is never cached
/// at startup.
pub type CredentialProvider = Arc<dyn Fn() -> Option<String> + Send + Sync>;

pub fn env_credential_provider(var: String) -> CredentialProvider {
    Arc::new(move || {
        std::env::var(&var)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    })
}
