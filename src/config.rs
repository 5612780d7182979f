//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `BEE__*` 覆盖（双下划线表示嵌套，如 `BEE__WHATSAPP__ACCESS_TOKEN=xxx`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::BookingError;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub whatsapp: WhatsappSection,
    #[serde(default)]
    pub agenda: AgendaSection,
    #[serde(default)]
    pub business: BusinessSection,
}

/// [server] 段：监听地址与端口
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// [whatsapp] 段：Cloud API 凭据、Webhook 验证令牌、发送超时
#[derive(Debug, Clone, Deserialize)]
pub struct WhatsappSection {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub phone_number_id: String,
    #[serde(default = "default_verify_token")]
    pub verify_token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// 单次发送超时（秒）
    #[serde(default = "default_send_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WhatsappSection {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            phone_number_id: String::new(),
            verify_token: default_verify_token(),
            api_base: default_api_base(),
            timeout_secs: default_send_timeout_secs(),
        }
    }
}

fn default_verify_token() -> String {
    "bee".to_string()
}

fn default_api_base() -> String {
    "https://graph.facebook.com/v18.0".to_string()
}

fn default_send_timeout_secs() -> u64 {
    15
}

/// [agenda] 段：日程接收人与「今天」所用的时区偏移
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AgendaSection {
    /// 运营者的 WhatsApp 号码；缺失时日程推送报错
    pub operator_identity: Option<String>,
    /// 相对 UTC 的分钟偏移（如 UTC+8 为 480）
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

/// [business] 段：FAQ 回复中使用的商家信息
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessSection {
    #[serde(default = "default_business_name")]
    pub name: String,
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_hours")]
    pub hours: String,
    #[serde(default = "default_prices")]
    pub prices: Vec<String>,
    #[serde(default = "default_payment")]
    pub payment: String,
}

impl Default for BusinessSection {
    fn default() -> Self {
        Self {
            name: default_business_name(),
            address: default_address(),
            hours: default_hours(),
            prices: default_prices(),
            payment: default_payment(),
        }
    }
}

fn default_business_name() -> String {
    "Bee Studio".to_string()
}

fn default_address() -> String {
    "12 Market Street, Ground Floor".to_string()
}

fn default_hours() -> String {
    "Mon-Sat 09:00-18:00, Sunday closed".to_string()
}

fn default_prices() -> Vec<String> {
    vec![
        "Basic session (30 min): $40".into(),
        "Standard session (60 min): $70".into(),
        "Premium package (90 min + extras): $110".into(),
    ]
}

fn default_payment() -> String {
    "We accept cash, card and bank transfer. A 20% deposit confirms your slot.".to_string()
}

/// 从 config 目录加载配置，环境变量 BEE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 BEE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, BookingError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("BEE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    Ok(c.try_deserialize()?)
}
