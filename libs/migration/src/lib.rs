pub use sea_orm_migration::prelude::*;

mod m20250901_000000_bootstrap;
mod m20250901_000001_create_users;
mod m20250901_000002_create_clubs;
mod m20250901_000003_create_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000000_bootstrap::Migration),
            Box::new(m20250901_000001_create_users::Migration),
            Box::new(m20250901_000002_create_clubs::Migration),
            Box::new(m20250901_000003_create_events::Migration),
        ]
    }
}
