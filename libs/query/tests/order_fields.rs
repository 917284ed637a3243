use lynx_query::{parse, OrderDirection, QueryFormatErrorKind, QueryStringBuilder};

#[test]
fn order_single_field_with_direction() {
    let params = parse("order=username DESC").unwrap();
    assert_eq!(params.order().len(), 1);
    assert_eq!(params.order()[0].field(), "username");
    assert_eq!(params.order()[0].order(), OrderDirection::Desc);
}

#[test]
fn order_defaults_to_ascending() {
    let params = parse("sort=username").unwrap();
    assert_eq!(params.order()[0].order(), OrderDirection::Asc);
}

#[test]
fn order_multiple_items() {
    let params = parse("order=username,lastname DESC,firstname").unwrap();
    let order = params.order();
    assert_eq!(order.len(), 3);
    assert_eq!(
        (order[0].field(), order[0].order()),
        ("username", OrderDirection::Asc)
    );
    assert_eq!(
        (order[1].field(), order[1].order()),
        ("lastname", OrderDirection::Desc)
    );
    assert_eq!(
        (order[2].field(), order[2].order()),
        ("firstname", OrderDirection::Asc)
    );
}

#[test]
fn order_dedup_first_wins() {
    let params = parse("order=a,b,a DESC").unwrap();
    let order = params.order();
    assert_eq!(order.len(), 2);
    assert_eq!((order[0].field(), order[0].order()), ("a", OrderDirection::Asc));
    assert_eq!((order[1].field(), order[1].order()), ("b", OrderDirection::Asc));
}

#[test]
fn order_empty_value_is_ignored() {
    let params = parse("order=").unwrap();
    assert!(params.order().is_empty());
}

#[test]
fn order_empty_field_is_malformed() {
    let err = parse("order= ASC").unwrap_err();
    assert_eq!(err.kind, QueryFormatErrorKind::Malformed);
    assert_eq!(err.key, "order");

    let err = parse("sort=+DESC").unwrap_err();
    assert_eq!(err.kind, QueryFormatErrorKind::Malformed);
    assert_eq!(err.key, "sort");
}

#[test]
fn order_unknown_direction() {
    let err = parse("order=username DESCENDING").unwrap_err();
    assert_eq!(err.kind, QueryFormatErrorKind::NoSuchConstant);
}

#[test]
fn order_last_key_wins() {
    let params = parse("order=username&sort=lastname DESC").unwrap();
    assert_eq!(params.order().len(), 1);
    assert_eq!(params.order()[0].field(), "lastname");
    assert_eq!(params.order()[0].order(), OrderDirection::Desc);
}

#[test]
fn order_allow_list() {
    let params = QueryStringBuilder::new()
        .allow_order(|o| o.field() == "email")
        .query("order=username DESC,email ASC")
        .build()
        .unwrap();
    assert_eq!(params.order().len(), 1);
    assert_eq!(params.order()[0].field(), "email");
    assert_eq!(params.order()[0].order(), OrderDirection::Asc);
}

#[test]
fn order_disabled() {
    let params = QueryStringBuilder::new()
        .enable_order(false)
        .query("order=name ASC")
        .build()
        .unwrap();
    assert!(params.order().is_empty());
}

#[test]
fn fields_list() {
    let params = parse("fields=username,email").unwrap();
    assert_eq!(params.fields(), ["username", "email"]);
}

#[test]
fn fields_alias_skips_empty_and_duplicates() {
    let params = parse("select=username,,email,username,").unwrap();
    assert_eq!(params.fields(), ["username", "email"]);
}

#[test]
fn fields_last_key_wins() {
    let params = parse("fields=username&select=email").unwrap();
    assert_eq!(params.fields(), ["email"]);
}

#[test]
fn fields_allow_list() {
    let params = QueryStringBuilder::new()
        .allow_field(|f| f == "email")
        .query("fields=username,email")
        .build()
        .unwrap();
    assert_eq!(params.fields(), ["email"]);
}

#[test]
fn fields_disabled() {
    let params = QueryStringBuilder::new()
        .enable_fields(false)
        .query("fields=name,email")
        .build()
        .unwrap();
    assert!(params.fields().is_empty());
}

#[test]
fn all_allow_lists_together() {
    let allowed = ["email"];
    let params = QueryStringBuilder::new()
        .allow_field(move |f| allowed.contains(&f))
        .allow_order(move |o| allowed.contains(&o.field()))
        .allow_filter(move |f| allowed.contains(&f.field()))
        .query("fields=username,email&order=username DESC,email&filter=username:eq:test email:isnull")
        .build()
        .unwrap();

    assert_eq!(params.fields(), ["email"]);
    assert_eq!(params.order().len(), 1);
    assert_eq!(params.order()[0].field(), "email");
    assert_eq!(params.filters().len(), 1);
    assert_eq!(params.filters()[0].field(), "email");
}

#[test]
fn dedup_holds_across_thousands_of_items() {
    let fields: Vec<String> = (0..4000).map(|i| format!("f{}", i % 500)).collect();
    let joined = fields.join(",");
    let params = QueryStringBuilder::new()
        .max_query_length(64 * 1024)
        .query(&format!(
            "fields={joined}&order={joined}&filter=id:in:[{joined}]"
        ))
        .build()
        .unwrap();

    assert_eq!(params.fields().len(), 500);
    assert_eq!(params.fields()[499], "f499");
    assert_eq!(params.order().len(), 500);
    assert_eq!(params.order()[1].field(), "f1");
    assert_eq!(params.filters()[0].values().len(), 500);
}
