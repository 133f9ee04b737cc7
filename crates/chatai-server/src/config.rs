use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are ChatAI, a helpful, concise assistant.";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model: String,
    pub system_prompt: String,
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    model: ModelSection,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModelSection {
    #[serde(default = "default_model")]
    name: String,
    #[serde(default = "default_system_prompt")]
    system_prompt: String,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            name: default_model(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        if let Some(file_config) = load_from_file()? {
            return Ok(Self {
                host: file_config.server.host,
                port: file_config.server.port,
                model: file_config.model.name,
                system_prompt: file_config.model.system_prompt,
            });
        }

        Ok(Self::from_env())
    }

    fn from_env() -> Self {
        let host = env::var("CHATAI_HOST").unwrap_or_else(|_| default_host());
        let port = env::var("CHATAI_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or_else(default_port);
        let model = env::var("CHATAI_MODEL").unwrap_or_else(|_| default_model());
        let system_prompt =
            env::var("CHATAI_SYSTEM_PROMPT").unwrap_or_else(|_| default_system_prompt());

        Self {
            host,
            port,
            model,
            system_prompt,
        }
    }
}

fn load_from_file() -> anyhow::Result<Option<FileConfig>> {
    let config_path = env::var("CHATAI_CONFIG").ok();
    let path = if let Some(path) = config_path {
        Some(path)
    } else if Path::new("chatai.toml").exists() {
        Some("chatai.toml".to_string())
    } else {
        None
    };

    let Some(path) = path else {
        return Ok(None);
    };

    let contents = fs::read_to_string(&path)
        .map_err(|err| anyhow::anyhow!("Failed to read config {}: {}", path, err))?;
    let parsed: FileConfig = toml::from_str(&contents)
        .map_err(|err| anyhow::anyhow!("Failed to parse config {}: {}", path, err))?;
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: FileConfig = toml::from_str("").unwrap();
        assert_eq!(parsed.server.host, "0.0.0.0");
        assert_eq!(parsed.server.port, 3000);
        assert_eq!(parsed.model.name, DEFAULT_MODEL);
        assert_eq!(parsed.model.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn partial_sections_keep_unset_defaults() {
        let parsed: FileConfig = toml::from_str(
            "[server]\nport = 8080\n\n[model]\nname = \"gpt-4.1\"\n",
        )
        .unwrap();
        assert_eq!(parsed.server.host, "0.0.0.0");
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.model.name, "gpt-4.1");
        assert_eq!(parsed.model.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }
}
