//! End-to-end SELECT rendering through the MySQL dialect.

use quarry_sql_core::ast::{Expr, JsonArraySource, JsonField, SelectStatement};
use quarry_sql_core::{FormatError, SqlFormatter, ToValue};
use quarry_sql_mysql::MySqlDialect;

fn formatter() -> SqlFormatter<MySqlDialect> {
    SqlFormatter::new(MySqlDialect::new())
}

#[test]
fn selects_json_path_with_derived_alias() {
    let select = SelectStatement::from_table("SimpleOrders")
        .column(Expr::member("SimpleOrders.id").unwrap())
        .column(Expr::member("SimpleOrders.customer.description").unwrap());
    assert_eq!(
        formatter().format_select(&select).unwrap(),
        "SELECT `SimpleOrders`.`id` AS `id`, \
         json_extract(`SimpleOrders`.`customer`, '$.description') AS `customer` \
         FROM `SimpleOrders`"
    );
}

#[test]
fn selects_nested_json_path() {
    let select = SelectStatement::from_table("SimpleOrders")
        .column(Expr::member("SimpleOrders.customer.address.streetAddress").unwrap());
    assert_eq!(
        formatter().format_select(&select).unwrap(),
        "SELECT json_extract(`SimpleOrders`.`customer`, '$.address.streetAddress') \
         AS `customer` FROM `SimpleOrders`"
    );
}

#[test]
fn json_object_preserves_input_order() {
    let select = SelectStatement::from_table("People").column_as(
        Expr::json_object(vec![
            JsonField::new("familyName", Expr::qualified("People", "familyName")),
            JsonField::new("givenName", Expr::qualified("People", "givenName")),
        ]),
        "name",
    );
    assert_eq!(
        formatter().format_select(&select).unwrap(),
        "SELECT JSON_OBJECT('familyName', `People`.`familyName`, \
         'givenName', `People`.`givenName`) AS `name` FROM `People`"
    );
}

#[test]
fn json_array_of_scalars_keeps_order() {
    let expr = Expr::JsonArray(JsonArraySource::Values(vec![
        "user".to_value(),
        "customer".to_value(),
        "admin".to_value(),
    ]));
    assert_eq!(
        formatter().format_expr(&expr).unwrap(),
        "JSON_ARRAY('user', 'customer', 'admin')"
    );
}

#[test]
fn json_array_of_column_emits_quoted_reference() {
    let expr = Expr::JsonArray(JsonArraySource::Column {
        table: Some(String::from("Orders")),
        name: String::from("tags"),
    });
    assert_eq!(formatter().format_expr(&expr).unwrap(), "`Orders`.`tags`");
}

#[test]
fn json_path_key_with_quote_is_escaped() {
    let select = SelectStatement::from_table("People")
        .column(Expr::member("People.profile.o'brien").unwrap());
    assert_eq!(
        formatter().format_select(&select).unwrap(),
        "SELECT json_extract(`People`.`profile`, '$.o\\'brien') AS `profile` FROM `People`"
    );
}

#[test]
fn json_array_over_query_aggregates_objects() {
    let nested = SelectStatement::from_table("Orders")
        .column(Expr::qualified("Orders", "id"))
        .column(Expr::qualified("Orders", "total"))
        .filter(Expr::qualified("Orders", "customer").eq(42));
    let expr = Expr::JsonArray(JsonArraySource::Query(Box::new(nested)));
    assert_eq!(
        formatter().format_expr(&expr).unwrap(),
        "(SELECT JSON_ARRAYAGG(JSON_OBJECT('id', `Orders`.`id`, 'total', `Orders`.`total`)) \
         AS `Orders` FROM `Orders` WHERE (`Orders`.`customer` = 42))"
    );
}

#[test]
fn json_array_over_query_without_from_is_rejected() {
    let nested = SelectStatement::default().column(Expr::column("id"));
    let expr = Expr::JsonArray(JsonArraySource::Query(Box::new(nested)));
    assert!(matches!(
        formatter().format_expr(&expr),
        Err(FormatError::UnsupportedJsonShape(_))
    ));
}

#[test]
fn group_array_of_objects_renders_aggregate() {
    let select = SelectStatement::from_table("Orders")
        .column_as(
            Expr::json_group_array(Expr::json_object(vec![JsonField::new(
                "id",
                Expr::qualified("Orders", "id"),
            )])),
            "items",
        )
        .group_by(Expr::qualified("Orders", "customer"));
    assert_eq!(
        formatter().format_select(&select).unwrap(),
        "SELECT JSON_ARRAYAGG(JSON_OBJECT('id', `Orders`.`id`)) AS `items` \
         FROM `Orders` GROUP BY `Orders`.`customer`"
    );
}

#[test]
fn forced_alias_requires_derivable_name() {
    let select = SelectStatement::from_table("Orders").column(Expr::count(Expr::column("id")));
    assert!(matches!(
        formatter().format_select(&select),
        Err(FormatError::MissingAlias(_))
    ));
}

#[test]
fn explicit_alias_satisfies_forced_aliasing() {
    let select =
        SelectStatement::from_table("Orders").column_as(Expr::count(Expr::qualified("Orders", "id")), "total");
    assert_eq!(
        formatter().format_select(&select).unwrap(),
        "SELECT COUNT(`Orders`.`id`) AS `total` FROM `Orders`"
    );
}

#[test]
fn casts_render_mysql_shapes() {
    use quarry_sql_core::ast::CastKind;

    let select = SelectStatement::from_table("Orders")
        .column_as(
            Expr::qualified("Orders", "total").cast(CastKind::Integer),
            "total",
        )
        .column_as(
            Expr::qualified("Orders", "id").cast(CastKind::Text),
            "id",
        );
    assert_eq!(
        formatter().format_select(&select).unwrap(),
        "SELECT FLOOR(CAST(`Orders`.`total` AS DECIMAL(19,8))) AS `total`, \
         CAST(`Orders`.`id` AS CHAR) AS `id` FROM `Orders`"
    );
}
