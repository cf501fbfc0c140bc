pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_reference_tables;
mod m20240101_000002_create_exchange_symbols;
mod m20240101_000003_create_candles;
mod m20240101_000004_seed_reference_rows;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_reference_tables::Migration),
            Box::new(m20240101_000002_create_exchange_symbols::Migration),
            Box::new(m20240101_000003_create_candles::Migration),
            Box::new(m20240101_000004_seed_reference_rows::Migration),
        ]
    }
}
