//! Analytics event entity for per-click tracking
//!
//! 事件一经写入即不可变（append-only）。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "analytics_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 所属链接 id（必填；链接删除后事件可能悬挂，由级联策略决定）
    pub link_id: String,
    /// 短码冗余存储，加速单链接查询
    pub short_code: String,
    pub ip_address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    /// mobile / tablet / desktop / unknown
    pub device: String,
    pub browser: String,
    pub os: String,
    pub country: String,
    pub city: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub referrer: Option<String>,
    /// 分类后的来源标签（Facebook / Google / direct / 裸域名）
    pub referrer_source: String,
    pub is_qr_scan: bool,
    pub clicked_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
