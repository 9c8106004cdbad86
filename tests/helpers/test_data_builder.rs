#![allow(dead_code)]
// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use seller_insight::config::{ClientConfig, ReportPaths};
use seller_insight::domain::types::{FulfillmentChannel, ListingStatus};
use seller_insight::domain::{InventoryRecord, ListingRecord, SalesRecord};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

// ==========================================
// ListingRecord 构建器
// ==========================================

pub struct ListingBuilder {
    sku: String,
    asin: Option<String>,
    status: ListingStatus,
    fulfillment_channel: FulfillmentChannel,
    title: String,
    price: f64,
}

impl ListingBuilder {
    pub fn new(sku: &str) -> Self {
        Self {
            sku: sku.to_string(),
            asin: None,
            status: ListingStatus::Active,
            fulfillment_channel: FulfillmentChannel::Fba,
            title: format!("{sku} test product"),
            price: 10.0,
        }
    }

    pub fn asin(mut self, asin: &str) -> Self {
        self.asin = Some(asin.to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.status = ListingStatus::Inactive;
        self
    }

    pub fn merchant(mut self) -> Self {
        self.fulfillment_channel = FulfillmentChannel::Merchant;
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn build(self) -> ListingRecord {
        ListingRecord {
            sku: self.sku,
            asin: self.asin,
            status: self.status,
            fulfillment_channel: self.fulfillment_channel,
            title: self.title,
            price: self.price,
        }
    }
}

// ==========================================
// InventoryRecord 构建器
// ==========================================

pub struct InventoryBuilder {
    record: InventoryRecord,
}

impl InventoryBuilder {
    pub fn new(sku: &str) -> Self {
        Self {
            record: InventoryRecord {
                sku: sku.to_string(),
                asin: None,
                title: None,
                fulfillable_quantity: 0,
                reserved_quantity: 0,
                inbound_working: 0,
                inbound_shipped: 0,
                inbound_receiving: 0,
                future_supply_buyable: 0,
                reserved_future_supply: 0,
                total_quantity: 0,
                health_status: None,
                snapshot_date: None,
            },
        }
    }

    pub fn asin(mut self, asin: &str) -> Self {
        self.record.asin = Some(asin.to_string());
        self
    }

    pub fn fulfillable(mut self, qty: i64) -> Self {
        self.record.fulfillable_quantity = qty;
        self
    }

    pub fn reserved(mut self, qty: i64) -> Self {
        self.record.reserved_quantity = qty;
        self
    }

    pub fn inbound(mut self, working: i64, shipped: i64, receiving: i64) -> Self {
        self.record.inbound_working = working;
        self.record.inbound_shipped = shipped;
        self.record.inbound_receiving = receiving;
        self
    }

    pub fn total(mut self, qty: i64) -> Self {
        self.record.total_quantity = qty;
        self
    }

    pub fn health(mut self, status: &str) -> Self {
        self.record.health_status = Some(status.to_string());
        self
    }

    pub fn snapshot(mut self, date: NaiveDate) -> Self {
        self.record.snapshot_date = Some(date);
        self
    }

    pub fn build(self) -> InventoryRecord {
        self.record
    }
}

// ==========================================
// SalesRecord 辅助
// ==========================================

pub fn sales_row(asin: &str, units: i64, revenue: f64) -> SalesRecord {
    SalesRecord {
        asin: Some(asin.to_string()),
        sku: None,
        title: "Test Product Widget".to_string(),
        units,
        revenue,
    }
}

pub fn sales_row_with_sku(sku: &str, asin: &str, units: i64, revenue: f64) -> SalesRecord {
    SalesRecord {
        asin: Some(asin.to_string()),
        sku: Some(sku.to_string()),
        title: "Test Product Widget".to_string(),
        units,
        revenue,
    }
}

// ==========================================
// 报表 CSV 夹具 - 端到端测试用
// ==========================================

pub struct ReportFixture {
    dir: PathBuf,
    config: ClientConfig,
}

impl ReportFixture {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            config: ClientConfig {
                display_name: "Test Client".to_string(),
                reports: ReportPaths::default(),
                default_growth_factor: None,
                awd_header_row: None,
            },
        }
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    /// 行格式: (sku, asin, status, channel, title, price)
    pub fn listings(mut self, rows: &[(&str, &str, &str, &str, &str, f64)]) -> Self {
        let mut csv =
            String::from("seller-sku,asin1,status,fulfillment-channel,item-name,price\n");
        for (sku, asin, status, channel, title, price) in rows {
            csv.push_str(&format!("{sku},{asin},{status},{channel},{title},{price}\n"));
        }
        self.config.reports.listings = Some(self.write("listings.csv", &csv));
        self
    }

    /// 行格式: (sku, asin, fulfillable, reserved, shipped)
    pub fn inventory(mut self, snapshot: &str, rows: &[(&str, &str, i64, i64, i64)]) -> Self {
        let mut csv = String::from(
            "sku,asin,afn-fulfillable-quantity,afn-reserved-quantity,afn-inbound-shipped-quantity,afn-total-quantity,snapshot-date\n",
        );
        for (sku, asin, fulfillable, reserved, shipped) in rows {
            let total = fulfillable + reserved;
            csv.push_str(&format!(
                "{sku},{asin},{fulfillable},{reserved},{shipped},{total},{snapshot}\n"
            ));
        }
        self.config.reports.inventory = Some(self.write("inventory.csv", &csv));
        self
    }

    /// 行格式: (asin, sku, title, units, revenue)
    pub fn sales(mut self, window_key: &str, rows: &[(&str, &str, &str, i64, f64)]) -> Self {
        let mut csv =
            String::from("(Child) ASIN,SKU,Title,Units Ordered,Ordered Product Sales\n");
        for (asin, sku, title, units, revenue) in rows {
            csv.push_str(&format!("{asin},{sku},{title},{units},${revenue}\n"));
        }
        let path = self.write(&format!("sales_{window_key}.csv"), &csv);
        self.config
            .reports
            .sales
            .insert(window_key.to_string(), path);
        self
    }

    /// 四个必需销售窗口写入同一份行集
    pub fn sales_all_mandatory(mut self, rows: &[(&str, &str, &str, i64, f64)]) -> Self {
        for key in ["t30", "t60", "t90", "t365"] {
            self = self.sales(key, rows);
        }
        self
    }

    /// 行格式: (sku, inbound, available, reserved, outbound)；表头在第 4 行
    pub fn awd(mut self, rows: &[(&str, i64, i64, i64, i64)]) -> Self {
        let mut csv = String::from(
            "AWD Inventory Report,,,,\nGenerated by test fixture,,,,\n,,,,\nSKU,Inbound to AWD (Units),Available in AWD (Units),Reserved in AWD (Units),Outbound to FBA (Units)\n",
        );
        for (sku, inbound, available, reserved, outbound) in rows {
            csv.push_str(&format!("{sku},{inbound},{available},{reserved},{outbound}\n"));
        }
        self.config.reports.awd = Some(self.write("awd.csv", &csv));
        self
    }

    /// 行格式: (asin, sku, title, units, revenue)
    pub fn monthly(mut self, month_key: &str, rows: &[(&str, &str, &str, i64, f64)]) -> Self {
        let mut csv =
            String::from("(Child) ASIN,SKU,Title,Units Ordered,Ordered Product Sales\n");
        for (asin, sku, title, units, revenue) in rows {
            csv.push_str(&format!("{asin},{sku},{title},{units},${revenue}\n"));
        }
        let path = self.write(&format!("monthly_{month_key}.csv"), &csv);
        self.config
            .reports
            .monthly
            .insert(month_key.to_string(), path);
        self
    }

    pub fn growth_factor(mut self, g: f64) -> Self {
        self.config.default_growth_factor = Some(g);
        self
    }

    pub fn into_config(self) -> ClientConfig {
        self.config
    }

    /// 封装成单客户配置仓库
    pub fn into_store(self, client_id: &str) -> seller_insight::config::ClientConfigStore {
        let mut clients = BTreeMap::new();
        clients.insert(client_id.to_string(), self.config);
        seller_insight::config::ClientConfigStore::from_clients(clients)
    }
}
