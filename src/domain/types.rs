// ==========================================
// 电商卖家库存决策支持系统 - 领域类型定义
// ==========================================
// 依据: 报表字段规范（listings / inventory / sales 报表的取值域）
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 在售状态 (Listing Status)
// ==========================================
// 报表取值不保证规范，其他取值统一归入 Other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Active,
    Inactive,
    Incomplete,
    Other,
}

impl ListingStatus {
    /// 从报表原始值解析（大小写不敏感）
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "active" => ListingStatus::Active,
            "inactive" => ListingStatus::Inactive,
            "incomplete" => ListingStatus::Incomplete,
            _ => ListingStatus::Other,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ListingStatus::Active)
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingStatus::Active => write!(f, "ACTIVE"),
            ListingStatus::Inactive => write!(f, "INACTIVE"),
            ListingStatus::Incomplete => write!(f, "INCOMPLETE"),
            ListingStatus::Other => write!(f, "OTHER"),
        }
    }
}

// ==========================================
// 履约渠道 (Fulfillment Channel)
// ==========================================
// FBA 型: 平台仓发货 (历史报表中记作 AMAZON_NA / AFN)
// 商家型: 卖家自发货 (DEFAULT / Merchant / MFN)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentChannel {
    Fba,
    Merchant,
    Other,
}

impl FulfillmentChannel {
    /// 从报表原始值解析
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "AMAZON_NA" | "AFN" => FulfillmentChannel::Fba,
            "DEFAULT" | "Merchant" | "MFN" => FulfillmentChannel::Merchant,
            _ => FulfillmentChannel::Other,
        }
    }

    pub fn is_fba(&self) -> bool {
        matches!(self, FulfillmentChannel::Fba)
    }
}

impl fmt::Display for FulfillmentChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FulfillmentChannel::Fba => write!(f, "FBA"),
            FulfillmentChannel::Merchant => write!(f, "MERCHANT"),
            FulfillmentChannel::Other => write!(f, "OTHER"),
        }
    }
}

// ==========================================
// 销售窗口 (Sales Window)
// ==========================================
// 各滚动窗口销售报表，窗口天数参与日均流失计算
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SalesWindow {
    T7,
    T30,
    T60,
    T90,
    T180,
    T365,
}

impl SalesWindow {
    /// 窗口天数
    pub fn days(&self) -> i64 {
        match self {
            SalesWindow::T7 => 7,
            SalesWindow::T30 => 30,
            SalesWindow::T60 => 60,
            SalesWindow::T90 => 90,
            SalesWindow::T180 => 180,
            SalesWindow::T365 => 365,
        }
    }

    /// 从配置键解析（"t7".."t365"）
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "t7" => Some(SalesWindow::T7),
            "t30" => Some(SalesWindow::T30),
            "t60" => Some(SalesWindow::T60),
            "t90" => Some(SalesWindow::T90),
            "t180" => Some(SalesWindow::T180),
            "t365" => Some(SalesWindow::T365),
            _ => None,
        }
    }

    /// 是否为批处理必需窗口（缺失即整批失败）
    pub fn is_mandatory(&self) -> bool {
        matches!(
            self,
            SalesWindow::T30 | SalesWindow::T60 | SalesWindow::T90 | SalesWindow::T365
        )
    }

    /// 全部窗口（升序）
    pub fn all() -> [SalesWindow; 6] {
        [
            SalesWindow::T7,
            SalesWindow::T30,
            SalesWindow::T60,
            SalesWindow::T90,
            SalesWindow::T180,
            SalesWindow::T365,
        ]
    }
}

impl fmt::Display for SalesWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.days())
    }
}

// ==========================================
// 季节月份 (Season Month)
// ==========================================
// 预测规划覆盖的五个历史月份 (8-12 月)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeasonMonth {
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl SeasonMonth {
    /// 季节月份（时间顺序）
    pub fn all() -> [SeasonMonth; 5] {
        [
            SeasonMonth::Aug,
            SeasonMonth::Sep,
            SeasonMonth::Oct,
            SeasonMonth::Nov,
            SeasonMonth::Dec,
        ]
    }

    /// 公历月号
    pub fn month_number(&self) -> u32 {
        match self {
            SeasonMonth::Aug => 8,
            SeasonMonth::Sep => 9,
            SeasonMonth::Oct => 10,
            SeasonMonth::Nov => 11,
            SeasonMonth::Dec => 12,
        }
    }

    /// 当月天数（8-12 月无闰月问题）
    pub fn days_in_month(&self) -> i64 {
        match self {
            SeasonMonth::Aug | SeasonMonth::Oct | SeasonMonth::Dec => 31,
            SeasonMonth::Sep | SeasonMonth::Nov => 30,
        }
    }

    /// 指定年份的当月第一天
    pub fn first_day(&self, year: i32) -> NaiveDate {
        // 月号固定在 8..=12，不会失败
        NaiveDate::from_ymd_opt(year, self.month_number(), 1)
            .expect("season month first day must be valid")
    }
}

impl fmt::Display for SeasonMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonMonth::Aug => write!(f, "Aug"),
            SeasonMonth::Sep => write!(f, "Sep"),
            SeasonMonth::Oct => write!(f, "Oct"),
            SeasonMonth::Nov => write!(f, "Nov"),
            SeasonMonth::Dec => write!(f, "Dec"),
        }
    }
}

// ==========================================
// 营收分层 (Revenue Tier)
// ==========================================
// A: 累计营收前 50%; B: 50-80%; C: 80-95%; D: 其余
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevenueTier {
    A,
    B,
    C,
    D,
}

impl fmt::Display for RevenueTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevenueTier::A => write!(f, "A"),
            RevenueTier::B => write!(f, "B"),
            RevenueTier::C => write!(f, "C"),
            RevenueTier::D => write!(f, "D"),
        }
    }
}
