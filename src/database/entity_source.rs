use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select, Value,
    sea_query::{Alias, Expr, Func, LikeExpr, SimpleExpr},
};

use crate::core::{DataSource, QuerySpec};
use crate::filtering::{ConditionTree, FilterSpec, LeafPredicate, Operator, SortDirection};
use crate::models::ConditionValue;

const LIKE_ESCAPE: char = '!';

/// Escape LIKE wildcards so user text only ever matches literally
fn escape_like_wildcards(input: &str) -> String {
    input
        .replace(LIKE_ESCAPE, "!!")
        .replace('%', "!%")
        .replace('_', "!_")
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// Runs composed queries against a single sea-orm entity.
///
/// Field names in the query are used as column names as-is. Conditions that
/// reach through a relation path, and `include`, cannot be expressed on one
/// table and are rejected with [`DbErr::Custom`].
pub struct EntitySource<E> {
    db: DatabaseConnection,
    entity: PhantomData<fn() -> E>,
}

impl<E: EntityTrait> EntitySource<E> {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            entity: PhantomData,
        }
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl<E> DataSource for EntitySource<E>
where
    E: EntityTrait,
    E::Model: Sync,
{
    type Record = serde_json::Value;
    type Error = DbErr;

    async fn find_many(&self, query: &QuerySpec) -> Result<Vec<Self::Record>, Self::Error> {
        let select = build_select::<E>(query)?;
        tracing::trace!(
            sql = %select.build(self.db.get_database_backend()),
            "Running find_many"
        );
        select.into_json().all(&self.db).await
    }

    async fn count(&self, filter: &FilterSpec) -> Result<u64, Self::Error> {
        let condition = build_condition(filter)?;
        E::find().filter(condition).count(&self.db).await
    }
}

/// Translate a `where` clause into a sea-orm [`Condition`].
///
/// Top-level fields, the `OR` list (as one `Condition::any`) and every `AND`
/// group (each as one `Condition::all`) are all required to hold.
///
/// # Errors
///
/// [`DbErr::Custom`] for any condition nested under a relation path.
pub fn build_condition(filter: &FilterSpec) -> Result<Condition, DbErr> {
    let mut condition = Condition::all();

    for (field, tree) in filter.fields() {
        let leaf = tree
            .as_leaf()
            .ok_or_else(|| relation_path_error(field, tree))?;
        condition = condition.add(leaf_condition(field, leaf));
    }

    if !filter.or().is_empty() {
        let mut any = Condition::any();
        for tree in filter.or() {
            any = any.add(tree_condition(tree)?);
        }
        condition = condition.add(any);
    }

    for group in filter.and() {
        let mut all = Condition::all();
        for tree in group {
            all = all.add(tree_condition(tree)?);
        }
        condition = condition.add(all);
    }

    Ok(condition)
}

/// Build the full `SELECT` for a composed query.
///
/// A negative `skip` is treated as zero and a negative `take` as no limit.
///
/// # Errors
///
/// [`DbErr::Custom`] when the query uses `include` or a relation path.
pub fn build_select<E: EntityTrait>(query: &QuerySpec) -> Result<Select<E>, DbErr> {
    if query.include.as_ref().is_some_and(|include| !include.is_empty()) {
        return Err(DbErr::Custom(
            "Including related entities is not supported for a single entity".to_string(),
        ));
    }

    let mut select = E::find().filter(build_condition(&query.where_clause)?);

    if let Some(order_by) = &query.order_by {
        for entry in order_by {
            let column: SimpleExpr = Expr::col(Alias::new(&entry.field)).into();
            select = select.order_by(column, entry.direction.into());
        }
    }

    if let Some(skip) = query.skip {
        select = select.offset(u64::try_from(skip).unwrap_or(0));
    }

    if let Some(take) = query.take
        && let Ok(take) = u64::try_from(take)
    {
        select = select.limit(take);
    }

    if let Some(selection) = &query.select {
        let fields: Vec<&String> = selection
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(field, _)| field)
            .collect();
        if !fields.is_empty() {
            select = select.select_only();
            for field in fields {
                QueryTrait::query(&mut select)
                    .expr_as(Expr::col(Alias::new(field)), Alias::new(field));
            }
        }
    }

    Ok(select)
}

fn relation_path_error(field: &str, tree: &ConditionTree) -> DbErr {
    let (path, _) = tree.path();
    let mut full = vec![field];
    full.extend(path);
    DbErr::Custom(format!(
        "Relation path `{}` cannot be filtered on a single entity",
        full.join(".")
    ))
}

fn tree_condition(tree: &ConditionTree) -> Result<Condition, DbErr> {
    match tree.path() {
        (path, leaf) if path.len() == 1 => Ok(leaf_condition(path[0], leaf)),
        (path, _) => Err(DbErr::Custom(format!(
            "Relation path `{}` cannot be filtered on a single entity",
            path.join(".")
        ))),
    }
}

fn leaf_condition(field: &str, leaf: &LeafPredicate) -> Condition {
    leaf.comparisons()
        .fold(Condition::all(), |condition, (operator, value)| {
            condition.add(comparison_expr(field, operator, value, leaf.is_case_insensitive()))
        })
}

fn comparison_expr(
    field: &str,
    operator: Operator,
    value: &ConditionValue,
    insensitive: bool,
) -> SimpleExpr {
    let fold_case = insensitive && matches!(value, ConditionValue::String(_));
    let target = if fold_case {
        Expr::expr(Func::upper(Expr::col(Alias::new(field))))
    } else {
        Expr::col(Alias::new(field))
    };

    if operator.is_pattern() {
        let text = escape_like_wildcards(&value_text(value));
        let pattern = match operator {
            Operator::StartsWith => format!("{text}%"),
            Operator::EndsWith => format!("%{text}"),
            _ => format!("%{text}%"),
        };
        // Both sides go through the database's UPPER so they fold alike
        if fold_case {
            return Expr::cust_with_exprs(
                format!("$1 LIKE UPPER($2) ESCAPE '{LIKE_ESCAPE}'"),
                [SimpleExpr::from(target), Expr::val(pattern).into()],
            );
        }
        return target.like(LikeExpr::new(pattern).escape(LIKE_ESCAPE));
    }

    let operand: SimpleExpr = match value {
        ConditionValue::String(text) if fold_case => Func::upper(Expr::val(text.clone())).into(),
        other => to_value(other).into(),
    };
    match operator {
        Operator::Not => target.ne(operand),
        Operator::Lt => target.lt(operand),
        Operator::Lte => target.lte(operand),
        Operator::Gt => target.gt(operand),
        Operator::Gte => target.gte(operand),
        _ => target.eq(operand),
    }
}

/// Integral numbers bind as integers so they compare cleanly with integer columns
#[allow(clippy::cast_possible_truncation)]
fn to_value(value: &ConditionValue) -> Value {
    match value {
        ConditionValue::String(text) => Value::from(text.clone()),
        ConditionValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 => {
            Value::from(*n as i64)
        }
        ConditionValue::Number(n) => Value::from(*n),
        ConditionValue::Date(date) => Value::from(*date),
        ConditionValue::Boolean(flag) => Value::from(*flag),
    }
}

fn value_text(value: &ConditionValue) -> String {
    match value {
        ConditionValue::String(text) => text.clone(),
        ConditionValue::Number(n) => n.to_string(),
        ConditionValue::Date(date) => date.to_rfc3339(),
        ConditionValue::Boolean(flag) => flag.to_string(),
    }
}
