#![allow(dead_code)]

use sea_orm::{ActiveValue::Set, Database, DatabaseConnection, DbErr, EntityTrait};
use sea_orm_migration::prelude::*;

pub mod product_entity;

/// Route builder and translation logs to the test output; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_target(false)
        .compact()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Six products across two categories, ids 1..=6 in insertion order
pub async fn setup_test_db_with_products() -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;

    let products = [
        ("Desk Lamp", "lighting", 40, 10),
        ("Floor Lamp", "lighting", 120, 0),
        ("Office Chair", "furniture", 250, 5),
        ("Standing Desk", "furniture", 600, 2),
        ("Lamp_Shade 50%", "lighting", 15, 30),
        ("Bookshelf", "furniture", 180, 7),
    ]
    .into_iter()
    .map(|(name, category, price, stock)| product_entity::ActiveModel {
        name: Set(name.to_string()),
        category: Set(category.to_string()),
        price: Set(price),
        stock: Set(stock),
        ..Default::default()
    });

    product_entity::Entity::insert_many(products).exec(&db).await?;

    Ok(db)
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateProductTable)]
    }
}

pub struct CreateProductTable;

#[async_trait::async_trait]
impl MigrationName for CreateProductTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_product_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateProductTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(ProductEntity)
            .if_not_exists()
            .col(
                ColumnDef::new(ProductColumn::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(ProductColumn::Name).string().not_null())
            .col(ColumnDef::new(ProductColumn::Category).string().not_null())
            .col(ColumnDef::new(ProductColumn::Price).integer().not_null())
            .col(
                ColumnDef::new(ProductColumn::Stock)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductEntity).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum ProductColumn {
    Id,
    Name,
    Category,
    Price,
    Stock,
}

impl Iden for ProductColumn {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(
            s,
            "{}",
            match self {
                Self::Id => "id",
                Self::Name => "name",
                Self::Category => "category",
                Self::Price => "price",
                Self::Stock => "stock",
            }
        )
        .unwrap();
    }
}

#[derive(Debug)]
pub struct ProductEntity;

impl Iden for ProductEntity {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "products").unwrap();
    }
}
