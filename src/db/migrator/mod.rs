use sea_orm_migration::prelude::*;

mod m20241101_add_users;
mod m20241108_add_refresh_tokens;
mod m20241115_add_chirps;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241101_add_users::Migration),
            Box::new(m20241108_add_refresh_tokens::Migration),
            Box::new(m20241115_add_chirps::Migration),
        ]
    }
}
