use crudquery::{
    ComparisonFilter, ConditionTree, DataType, EntitySource, LeafPredicate, NestedFilter,
    Operator, PageInfo, ParamMap, QueryBuilder, RangeFilter, SearchMode,
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DbErr};
use serde_json::{Value, json};

mod common;
use common::{product_entity, setup_test_db_with_products};

type Products = EntitySource<product_entity::Entity>;

async fn products() -> Products {
    let db = setup_test_db_with_products()
        .await
        .expect("Failed to set up test database");
    EntitySource::new(db)
}

fn params(pairs: &[(&str, &str)]) -> ParamMap {
    pairs.iter().copied().collect()
}

fn names(records: &[Value]) -> Vec<&str> {
    records
        .iter()
        .map(|record| record["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_search_is_case_insensitive_across_fields() {
    let source = products().await;
    let records = QueryBuilder::new(params(&[("searchTerm", "LAMP"), ("sort", "price")]))
        .search(&["name", "category"])
        .sort()
        .execute(&source)
        .await
        .unwrap();

    assert_eq!(names(&records), vec!["Lamp_Shade 50%", "Desk Lamp", "Floor Lamp"]);
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let source = products().await;
    let records = QueryBuilder::new(params(&[("searchTerm", "50%"), ("sort", "id")]))
        .search(&["name"])
        .sort()
        .execute(&source)
        .await
        .unwrap();
    assert_eq!(names(&records), vec!["Lamp_Shade 50%"]);

    let records = QueryBuilder::new(params(&[("searchTerm", "k_l"), ("sort", "id")]))
        .search(&["name"])
        .sort()
        .execute(&source)
        .await
        .unwrap();
    assert!(records.is_empty(), "underscore must not match any character: {records:?}");
}

#[tokio::test]
async fn test_case_insensitive_matching_with_non_ascii_text() {
    let source = products().await;
    product_entity::ActiveModel {
        name: Set("Café Table".to_string()),
        category: Set("furniture".to_string()),
        price: Set(90),
        stock: Set(3),
        ..Default::default()
    }
    .insert(source.connection())
    .await
    .unwrap();

    let records = QueryBuilder::new(params(&[("searchTerm", "café"), ("sort", "id")]))
        .search(&["name"])
        .sort()
        .execute(&source)
        .await
        .unwrap();
    assert_eq!(names(&records), vec!["Café Table"]);

    let records = QueryBuilder::new(ParamMap::new())
        .raw_filter([(
            "name",
            ConditionTree::from(LeafPredicate::equals("café table").insensitive()),
        )])
        .execute(&source)
        .await
        .unwrap();
    assert_eq!(names(&records), vec!["Café Table"]);
}

#[tokio::test]
async fn test_equality_and_bracket_filters() {
    let source = products().await;
    let records = QueryBuilder::new(params(&[
        ("category", "furniture"),
        ("price[gte]", "200"),
        ("sort", "-price"),
    ]))
    .filter(&["category", "price[gte]"])
    .sort()
    .execute(&source)
    .await
    .unwrap();

    assert_eq!(names(&records), vec!["Standing Desk", "Office Chair"]);
}

#[tokio::test]
async fn test_pagination_and_count_total() {
    let source = products().await;
    let builder = QueryBuilder::new(params(&[("sort", "id"), ("page", "2"), ("limit", "4")]))
        .sort()
        .paginate();

    let records = builder.execute(&source).await.unwrap();
    assert_eq!(names(&records), vec!["Lamp_Shade 50%", "Bookshelf"]);

    let info = builder.count_total(&source).await.unwrap();
    assert_eq!(
        info,
        PageInfo {
            page: 2,
            limit: 4,
            total: 6,
            total_page: 2
        }
    );
    assert_eq!(
        serde_json::to_value(info).unwrap(),
        json!({"page": 2, "limit": 4, "total": 6, "totalPage": 2})
    );
}

#[tokio::test]
async fn test_count_ignores_paging() {
    let source = products().await;
    let info = QueryBuilder::new(params(&[("category", "lighting"), ("limit", "1")]))
        .filter(&["category"])
        .paginate()
        .count_total(&source)
        .await
        .unwrap();

    assert_eq!(info.total, 3);
    assert_eq!(info.total_page, 3);
}

#[tokio::test]
async fn test_range_and_comparison_filters() {
    let source = products().await;
    let records = QueryBuilder::new(params(&[
        ("minPrice", "100"),
        ("maxPrice", "300"),
        ("sort", "price"),
    ]))
    .filter_by_range(&[RangeFilter::new("price", "minPrice", "maxPrice", DataType::Number)])
    .sort()
    .execute(&source)
    .await
    .unwrap();
    assert_eq!(names(&records), vec!["Floor Lamp", "Bookshelf", "Office Chair"]);

    // Each comparison is its own OR entry.
    let records = QueryBuilder::new(params(&[("soldOut", "0"), ("plenty", "20"), ("sort", "id")]))
        .filter_by_comparison(&[
            ComparisonFilter::new("stock", "soldOut", Operator::Lte, DataType::Number),
            ComparisonFilter::new("stock", "plenty", Operator::Gte, DataType::Number),
        ])
        .sort()
        .execute(&source)
        .await
        .unwrap();
    assert_eq!(names(&records), vec!["Floor Lamp", "Lamp_Shade 50%"]);
}

#[tokio::test]
async fn test_raw_filter_combines_with_field_filters() {
    let source = products().await;
    let records = QueryBuilder::new(params(&[("category", "lighting"), ("sort", "id")]))
        .filter(&["category"])
        .raw_filter([(
            "stock",
            ConditionTree::from(LeafPredicate::new().with(Operator::Gt, 0_i64)),
        )])
        .sort()
        .execute(&source)
        .await
        .unwrap();

    assert_eq!(names(&records), vec!["Desk Lamp", "Lamp_Shade 50%"]);
}

#[tokio::test]
async fn test_projection_returns_listed_fields_only() {
    let source = products().await;
    let records = QueryBuilder::new(params(&[("fields", "id,name"), ("sort", "id"), ("limit", "2")]))
        .sort()
        .paginate()
        .fields()
        .execute(&source)
        .await
        .unwrap();

    assert_eq!(
        records,
        vec![
            json!({"id": 1, "name": "Desk Lamp"}),
            json!({"id": 2, "name": "Floor Lamp"})
        ]
    );
}

#[tokio::test]
async fn test_relation_path_is_reported_as_error() {
    let source = products().await;
    let builder = QueryBuilder::new(params(&[("city", "Oslo")]))
        .nested_filter(&[NestedFilter::new("supplier.address", ["city"]).mode(SearchMode::Exact)]);

    let result = builder.execute(&source).await;
    assert!(
        matches!(&result, Err(DbErr::Custom(message)) if message.contains("supplier.address.city")),
        "{result:?}"
    );
    assert!(builder.count_total(&source).await.is_err());
}
