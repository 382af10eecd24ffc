pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m020250901_000001_links_table;
mod m020250902_000001_analytics_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m020250901_000001_links_table::Migration),
            Box::new(m020250902_000001_analytics_events::Migration),
        ]
    }
}
