use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::net::SocketAddr;

// 配置文件在编译时嵌入二进制
const CONFIG_TOML: &str = include_str!("../../configs.toml");

static GLOBAL_APP_CONFIG: Lazy<std::result::Result<AppConfig, String>> =
    Lazy::new(|| load_config_from_toml_str(CONFIG_TOML).map_err(|e| e.to_string()));

/// 顶层应用配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub registry: RegistryConfig,
}

/// 用于解析 TOML 的临时结构
#[derive(Deserialize)]
struct AppConfigFile {
    /// [server] 表
    server: ServerConfigToml,

    /// [registry] 表（可选）
    #[serde(default)]
    registry: RegistryConfig,
}

// ============= Server 配置 =============

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

#[derive(Deserialize)]
struct ServerConfigToml {
    bind_addr: String,
}

impl TryFrom<ServerConfigToml> for ServerConfig {
    type Error = Error;

    fn try_from(t: ServerConfigToml) -> Result<Self> {
        let bind_addr = t
            .bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("Invalid bind_addr '{}': {}", t.bind_addr, e)))?;
        Ok(ServerConfig { bind_addr })
    }
}

// ============= Registry 配置 =============

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Maximum number of action log lines kept; 0 disables the log.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_history_limit() -> usize {
    256
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

// ============= 配置加载函数 =============

/// 从 TOML 字符串加载应用配置
pub fn load_config_from_toml_str(s: &str) -> Result<AppConfig> {
    let parsed: AppConfigFile = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;

    Ok(AppConfig {
        server: ServerConfig::try_from(parsed.server)?,
        registry: parsed.registry,
    })
}

/// The configuration embedded from `configs.toml`, parsed once.
pub fn app_config() -> Result<AppConfig> {
    (*GLOBAL_APP_CONFIG).clone().map_err(Error::Config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_listens_on_port_3000() {
        let config = app_config().unwrap();
        assert_eq!(config.server.bind_addr.port(), 3000);
        assert!(config.server.bind_addr.ip().is_unspecified());
    }

    #[test]
    fn registry_section_is_optional() {
        let config = load_config_from_toml_str(
            r#"
            [server]
            bind_addr = "127.0.0.1:8080"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind_addr.port(), 8080);
        assert_eq!(config.registry.history_limit, 256);
    }

    #[test]
    fn invalid_bind_addr_is_config_error() {
        let err = load_config_from_toml_str(
            r#"
            [server]
            bind_addr = "not-an-address"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("not-an-address")));
    }

    #[test]
    fn missing_server_section_is_config_error() {
        let err = load_config_from_toml_str("[registry]\nhistory_limit = 4\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
