//! 分析事件表迁移
//!
//! 创建 analytics_events 表，每次成功重定向追加一行：
//! - 访客信息（IP、原始 UA）
//! - 分类结果（device / browser / os / referrer_source）
//! - 地理占位（country / city，无 geo 解析器时为 "Unknown"）
//! - QR 扫码标记与点击时间戳

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 analytics_events 表
        manager
            .create_table(
                Table::create()
                    .table(AnalyticsEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalyticsEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::LinkId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::ShortCode)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::IpAddress)
                            .string_len(45)
                            .null(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::UserAgent).text().null())
                    .col(
                        ColumnDef::new(AnalyticsEvents::Device)
                            .string_len(16)
                            .not_null()
                            .default("unknown"),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::Browser)
                            .string_len(100)
                            .not_null()
                            .default("unknown"),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::Os)
                            .string_len(100)
                            .not_null()
                            .default("unknown"),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::Country)
                            .string_len(100)
                            .not_null()
                            .default("Unknown"),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::City)
                            .string_len(100)
                            .not_null()
                            .default("Unknown"),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::Referrer).text().null())
                    .col(
                        ColumnDef::new(AnalyticsEvents::ReferrerSource)
                            .string_len(255)
                            .not_null()
                            .default("direct"),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::IsQrScan)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::ClickedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 link_id 索引（单链接聚合查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_link_id")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::LinkId)
                    .to_owned(),
            )
            .await?;

        // 创建 clicked_at 索引（时间范围查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_clicked_at")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::ClickedAt)
                    .to_owned(),
            )
            .await?;

        // 创建复合索引（单链接时间序列查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_code_time")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::ShortCode)
                    .col(AnalyticsEvents::ClickedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除索引
        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_code_time")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_clicked_at")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_link_id")
                    .to_owned(),
            )
            .await?;

        // 删除表
        manager
            .drop_table(Table::drop().table(AnalyticsEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AnalyticsEvents {
    #[sea_orm(iden = "analytics_events")]
    Table,
    Id,
    LinkId,
    ShortCode,
    IpAddress,
    UserAgent,
    Device,
    Browser,
    Os,
    Country,
    City,
    Referrer,
    ReferrerSource,
    IsQrScan,
    ClickedAt,
}
