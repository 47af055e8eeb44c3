// config.rs — 配置管理模块
// 遵循 Unix 风格：从 ~/.config/apod-desktop/config.toml 读取配置
// 优先级：命令行参数 > 环境变量 > 配置文件 > 默认值

use crate::error::{ApodError, Result};
use crate::store::FileNaming;
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellexpand::tilde;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 环境变量中的 API Key，优先于配置文件
pub const API_KEY_ENV: &str = "NASA_API_KEY";

/// 展开路径中的 ~ 和环境变量 ($HOME, ${XDG_PICTURES_DIR} 等)
/// 相对路径则相对于 $HOME
fn expand_path(path_str: &str) -> PathBuf {
    let expanded = shellexpand::full(path_str)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| tilde(path_str).into_owned());
    let p = PathBuf::from(expanded);
    if p.is_absolute() { p } else { home_dir().join(p) }
}

fn home_dir() -> PathBuf {
    PathBuf::from(tilde("~").into_owned())
}

/// 映射 config.toml 文件内容的嵌套结构体
#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct ConfigFile {
    #[serde(default)]
    common: CommonConfig,
    #[serde(default)]
    api: ApiFileConfig,
}

#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct CommonConfig {
    /// 图片保存目录，命令行未指定目录时使用 (支持 ~、$HOME 等环境变量)
    #[serde(default)]
    image_dir: Option<String>,
    /// 本地文件命名方式 (url / date / hash)，默认 url
    #[serde(default)]
    naming: FileNaming,
    /// 优先下载高清原图
    #[serde(default)]
    prefer_hd: bool,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct ApiFileConfig {
    /// APOD 接口地址
    #[serde(default = "default_base_url")]
    base_url: String,
    /// NASA API Key，未配置时使用公共的 DEMO_KEY（有较低的频率限制）
    #[serde(default)]
    api_key: Option<String>,
    /// 请求超时（秒）
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl Default for ApiFileConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.nasa.gov/planetary/apod".to_string()
}
fn default_api_key() -> String {
    "DEMO_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

/// 传给 APOD 客户端的接口配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 应用全局配置项
pub struct AppConfig {
    /// 配置文件所在路径
    pub config_path: PathBuf,
    /// 文件中的内容（保存时原样写回，不包含环境变量）
    file: ConfigFile,
    /// 环境变量中的 API Key
    env_api_key: Option<String>,
}

impl AppConfig {
    /// 从默认位置加载配置
    pub fn load() -> Result<Self> {
        let home = env::var("HOME")
            .map_err(|_| ApodError::Config("cannot determine $HOME".to_string()))?;
        let config_path = PathBuf::from(home)
            .join(".config")
            .join("apod-desktop")
            .join("config.toml");

        let env_api_key = env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        Ok(Self::from_path(config_path, env_api_key))
    }

    /// 从指定文件加载配置，文件不存在时使用默认值
    pub fn from_path(config_path: PathBuf, env_api_key: Option<String>) -> Self {
        let file = Self::load_config_from_file(&config_path).unwrap_or_default();
        Self {
            config_path,
            file,
            env_api_key,
        }
    }

    /// 辅助函数：解析 TOML 配置文件
    /// 文件存在但无法解析时打印警告并回退到默认值
    fn load_config_from_file(path: &Path) -> Option<ConfigFile> {
        let content = fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("ignoring invalid config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// 接口配置：环境变量中的 Key 优先
    pub fn api(&self) -> ApiConfig {
        let api_key = self
            .env_api_key
            .clone()
            .or_else(|| self.file.api.api_key.clone())
            .unwrap_or_else(default_api_key);

        ApiConfig {
            base_url: self.file.api.base_url.clone(),
            api_key,
            timeout_secs: self.file.api.timeout_secs,
        }
    }

    /// 配置的图片目录（已展开）
    pub fn image_dir(&self) -> Option<PathBuf> {
        self.file.common.image_dir.as_deref().map(expand_path)
    }

    pub fn naming(&self) -> FileNaming {
        self.file.common.naming
    }

    pub fn prefer_hd(&self) -> bool {
        self.file.common.prefer_hd
    }

    /// 修改一个配置项（不自动保存）
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_key" => self.file.api.api_key = Some(value.to_string()),
            "base_url" => self.file.api.base_url = value.to_string(),
            "image_dir" | "dir" => self.file.common.image_dir = Some(value.to_string()),
            "naming" => self.file.common.naming = value.parse().map_err(ApodError::Config)?,
            "prefer_hd" | "hd" => {
                self.file.common.prefer_hd = value
                    .parse()
                    .map_err(|_| ApodError::Config(format!("expected true or false, got '{value}'")))?
            }
            "timeout" | "timeout_secs" => {
                self.file.api.timeout_secs = value
                    .parse()
                    .map_err(|_| ApodError::Config(format!("expected seconds, got '{value}'")))?
            }
            _ => return Err(ApodError::Config(format!("unknown key '{key}'"))),
        }
        Ok(())
    }

    /// 将配置保存回文件
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(&self.file)
            .map_err(|e| ApodError::Config(e.to_string()))?;
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }

    /// 获取配置文件的 JSON Schema
    pub fn get_schema() -> String {
        let schema = schemars::schema_for!(ConfigFile);
        serde_json::to_string_pretty(&schema).unwrap_or_else(|e| format!("# {e}"))
    }

    /// 将当前配置转换为 TOML 字符串
    pub fn to_toml(&self) -> String {
        let toml_str = toml::to_string_pretty(&self.file)
            .unwrap_or_else(|_| "# Error serializing config".to_string());

        // toml 库不支持带注释序列化，所以手动插入
        toml_str.replace(
            "[api]",
            &format!("[api]\n# 环境变量 {API_KEY_ENV} 优先于 api_key"),
        )
    }
}

/// 隐藏 API Key 中间部分，用于展示
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return key.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
