// ==========================================
// 电商卖家库存决策支持系统 - 客户配置
// ==========================================
// 职责: 客户清单加载与查询
// 存储: JSON 配置文件 (客户 ID → 报表文件路径集)
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::types::{SalesWindow, SeasonMonth};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ==========================================
// ReportPaths - 单客户报表文件路径集
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportPaths {
    /// 在售清单报表（必需）
    pub listings: Option<PathBuf>,

    /// 库存快照报表（必需）
    pub inventory: Option<PathBuf>,

    /// 滚动窗口销售报表，键为 "t7".."t365"
    #[serde(default)]
    pub sales: BTreeMap<String, PathBuf>,

    /// 第三方仓 (AWD) 报表（可选）
    #[serde(default)]
    pub awd: Option<PathBuf>,

    /// 季节月度历史销售报表，键为 "aug".."dec"（可选）
    #[serde(default)]
    pub monthly: BTreeMap<String, PathBuf>,
}

impl ReportPaths {
    /// 解析销售窗口键；无法识别的键忽略
    pub fn sales_windows(&self) -> BTreeMap<SalesWindow, PathBuf> {
        self.sales
            .iter()
            .filter_map(|(key, path)| SalesWindow::from_key(key).map(|w| (w, path.clone())))
            .collect()
    }

    /// 解析季节月份键；无法识别的键忽略
    pub fn monthly_months(&self) -> BTreeMap<SeasonMonth, PathBuf> {
        self.monthly
            .iter()
            .filter_map(|(key, path)| {
                let month = match key.trim().to_lowercase().as_str() {
                    "aug" | "august" | "8" => Some(SeasonMonth::Aug),
                    "sep" | "september" | "9" => Some(SeasonMonth::Sep),
                    "oct" | "october" | "10" => Some(SeasonMonth::Oct),
                    "nov" | "november" | "11" => Some(SeasonMonth::Nov),
                    "dec" | "december" | "12" => Some(SeasonMonth::Dec),
                    _ => None,
                };
                month.map(|m| (m, path.clone()))
            })
            .collect()
    }
}

// ==========================================
// ClientConfig - 单客户配置
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// 客户展示名
    pub display_name: String,

    /// 报表文件路径集
    #[serde(default)]
    pub reports: ReportPaths,

    /// 预测默认增长系数（缺省时引擎用 1.1）
    #[serde(default)]
    pub default_growth_factor: Option<f64>,

    /// AWD 报表表头行（0 起算；缺省 3，AWD 导出前三行为说明）
    #[serde(default)]
    pub awd_header_row: Option<usize>,
}

// ==========================================
// ClientConfigStore - 客户配置仓库
// ==========================================
#[derive(Debug)]
pub struct ClientConfigStore {
    clients: BTreeMap<String, ClientConfig>,
}

impl ClientConfigStore {
    /// 从 JSON 配置文件加载
    ///
    /// 文件格式: {"clients": {"client_id": {...}, ...}}
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::ConfigFileNotFound(path.display().to_string()));
        }

        let raw = fs::read_to_string(path)?;
        let file: ClientConfigFile = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::ConfigParseError(e.to_string()))?;

        for (client_id, config) in &file.clients {
            if let Some(growth) = config.default_growth_factor {
                if !(growth.is_finite() && growth > 0.0) {
                    return Err(ConfigError::InvalidValue {
                        key: format!("clients.{}.default_growth_factor", client_id),
                        message: format!("增长系数必须为正数: {}", growth),
                    });
                }
            }
        }

        Ok(Self {
            clients: file.clients,
        })
    }

    /// 从已构造的客户映射创建（测试与内嵌场景）
    pub fn from_clients(clients: BTreeMap<String, ClientConfig>) -> Self {
        Self { clients }
    }

    /// 查询单客户配置；不存在即配置缺失错误
    pub fn get(&self, client_id: &str) -> ConfigResult<&ClientConfig> {
        self.clients
            .get(client_id)
            .ok_or_else(|| ConfigError::ClientNotFound {
                client_id: client_id.to_string(),
            })
    }

    /// 全部客户 ID（字典序）
    pub fn client_ids(&self) -> Vec<&str> {
        self.clients.keys().map(|k| k.as_str()).collect()
    }
}

#[derive(Debug, Deserialize)]
struct ClientConfigFile {
    clients: BTreeMap<String, ClientConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_load_and_get_client() {
        let f = write_config(
            r#"{
                "clients": {
                    "acme": {
                        "display_name": "Acme Outdoors",
                        "reports": {
                            "listings": "/data/acme/listings.csv",
                            "inventory": "/data/acme/inventory.csv",
                            "sales": {"t30": "/data/acme/sales_t30.csv", "t90": "/data/acme/sales_t90.csv"},
                            "monthly": {"aug": "/data/acme/aug.csv"}
                        },
                        "default_growth_factor": 1.2
                    }
                }
            }"#,
        );
        let store = ClientConfigStore::load(f.path()).unwrap();
        let client = store.get("acme").unwrap();
        assert_eq!(client.display_name, "Acme Outdoors");
        assert_eq!(client.default_growth_factor, Some(1.2));

        let windows = client.reports.sales_windows();
        assert!(windows.contains_key(&SalesWindow::T30));
        assert!(windows.contains_key(&SalesWindow::T90));
        assert_eq!(
            client.reports.monthly_months().keys().next(),
            Some(&SeasonMonth::Aug)
        );
    }

    #[test]
    fn test_unknown_client_is_missing_config() {
        let f = write_config(r#"{"clients": {}}"#);
        let store = ClientConfigStore::load(f.path()).unwrap();
        let err = store.get("ghost-client").unwrap_err();
        assert!(matches!(err, ConfigError::ClientNotFound { .. }));
    }

    #[test]
    fn test_invalid_growth_factor_rejected() {
        let f = write_config(
            r#"{"clients": {"a": {"display_name": "A", "default_growth_factor": -1.0}}}"#,
        );
        let err = ClientConfigStore::load(f.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let err = ClientConfigStore::load(Path::new("/no/such/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFileNotFound(_)));
    }
}
