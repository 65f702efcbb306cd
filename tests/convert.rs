use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::error::Error as _;

use rstest::rstest;
use rust_decimal::Decimal;
use serde::Deserialize;
use sniffjson::{from_reader, from_slice, from_str, parse, ErrorKind, NumberKind, NumericError};

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
struct Items {
    name: String,
    price: f64,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
struct Person {
    age: i64,
    first_name: String,
    id: String,
    items: Items,
    last_name: Vec<i32>,
    friends: Vec<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
struct AnnotatedItem {
    name: String,
    price: Option<f64>,
    #[serde(rename = "tipus")]
    kind: String,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
struct ComplexPerson {
    id: i32,
    name: String,
    items: Vec<AnnotatedItem>,
}

const PERSON: &str = r#"{
    "age": 36,
    "firstName": "Ada",
    "id": "p-17",
    "items": {"name": "orange", "price": 25.5, "type": "food"},
    "lastName": [1, 2, 3, 4, 5],
    "friends": ["Rose", "Martha", "Donna", "Emilia", "Clara"]
}"#;

#[rstest]
fn nested_record_with_lists() {
    let person: Person = from_str(PERSON).unwrap();
    assert_eq!(person.age, 36);
    assert_eq!(person.first_name, "Ada");
    assert_eq!(person.id, "p-17");
    assert_eq!(
        person.items,
        Items {
            name: "orange".into(),
            price: 25.5,
            kind: "food".into(),
        }
    );
    assert_eq!(person.last_name, vec![1, 2, 3, 4, 5]);
    assert_eq!(
        person.friends,
        vec!["Rose", "Martha", "Donna", "Emilia", "Clara"]
    );
}

#[rstest]
fn renamed_fields_inside_list_of_records() {
    let text = r#"{"id": 333, "name": "clock", "items": [
        {"name": "gear", "price": 12, "tipus": "part"},
        {"name": "bearing", "price": 4, "tipus": "part"}
    ]}"#;
    let person: ComplexPerson = from_str(text).unwrap();
    assert_eq!(person.id, 333);
    assert_eq!(person.name, "clock");
    assert_eq!(person.items.len(), 2);
    assert_eq!(person.items[0].name, "gear");
    assert_eq!(person.items[0].price, Some(12.0));
    assert_eq!(person.items[1].kind, "part");
}

#[rstest]
fn missing_and_unknown_fields() {
    let item: AnnotatedItem = from_str(r#"{"name": "nut", "colour": "grey"}"#).unwrap();
    assert_eq!(
        item,
        AnnotatedItem {
            name: "nut".into(),
            price: None,
            kind: String::new(),
        }
    );
}

#[rstest]
fn null_record_is_default() {
    let person: ComplexPerson = from_str("null").unwrap();
    assert_eq!(person, ComplexPerson::default());
    let item: AnnotatedItem = from_str(r#"{"name": null, "price": null}"#).unwrap();
    assert_eq!(item.name, "");
    assert_eq!(item.price, None);
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Contact {
    first_name: String,
    age: i64,
    items: Items,
    scores: [u16; 3],
    pair: (i32, String),
}

#[rstest]
fn null_reaches_every_target_kind() {
    assert_eq!(from_str::<[i32; 3]>("null").unwrap(), [0, 0, 0]);
    assert_eq!(from_str::<(i32, String)>("null").unwrap(), (0, String::new()));
    assert_eq!(from_str::<char>("null").unwrap(), '\0');
    assert_eq!(from_str::<Option<Contact>>("null").unwrap(), None);
    assert_eq!(
        from_str::<Contact>("null").unwrap(),
        Contact {
            first_name: String::new(),
            age: 0,
            items: Items::default(),
            scores: [0, 0, 0],
            pair: (0, String::new()),
        }
    );

    let contact: Contact = from_str(
        r#"{"firstName": "Clara", "age": null, "items": null, "scores": null, "pair": [7, null]}"#,
    )
    .unwrap();
    assert_eq!(contact.first_name, "Clara");
    assert_eq!(contact.age, 0);
    assert_eq!(contact.scores, [0, 0, 0]);
    assert_eq!(contact.pair, (7, String::new()));
}

#[rstest]
#[case("1e30", 1e30)]
#[case("1e-30", 1e-30)]
#[case("123456789012345678901234567890", 1.2345678901234568e29)]
fn wide_magnitudes_convert_to_floats(#[case] text: &str, #[case] expected: f64) {
    assert_eq!(from_str::<f64>(text).unwrap(), expected);
}

#[rstest]
fn wide_integers_stay_exact() {
    assert_eq!(
        from_str::<u128>("123456789012345678901234567890").unwrap(),
        123_456_789_012_345_678_901_234_567_890
    );
    let err = from_str::<i64>("1e30").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NumericConversion);
    assert_eq!(
        err.to_string(),
        "1000000000000000000000000000000 does not fit exactly in i64"
    );
}

#[rstest]
fn collection_targets() {
    let v: Vec<i32> = from_str("[3, 1, 3]").unwrap();
    assert_eq!(v, vec![3, 1, 3]);
    let d: VecDeque<u8> = from_str("[3, 1, 3]").unwrap();
    assert_eq!(d, VecDeque::from(vec![3, 1, 3]));
    let h: HashSet<i64> = from_str("[3, 1, 3]").unwrap();
    assert_eq!(h, HashSet::from([1, 3]));
    let b: BTreeSet<String> = from_str(r#"["pear", "apple", "pear"]"#).unwrap();
    assert_eq!(b.into_iter().collect::<Vec<_>>(), vec!["apple", "pear"]);
    let m: BTreeMap<String, Vec<f32>> = from_str(r#"{"b": [0.5], "a": []}"#).unwrap();
    assert_eq!(m["b"], vec![0.5]);
    assert!(m["a"].is_empty());
}

#[rstest]
fn mixed_array_into_untyped_json() {
    let json: serde_json::Value = from_str(r#"[1, 2, 3.55, "apple", null]"#).unwrap();
    assert_eq!(json, serde_json::json!([1, 2, 3.55, "apple", null]));
}

#[rstest]
#[case("98792291989151591", 98792291989151591i64)]
#[case("44", 44)]
#[case("-7.000", -7)]
fn exact_integers(#[case] text: &str, #[case] expected: i64) {
    assert_eq!(from_str::<i64>(text).unwrap(), expected);
}

#[rstest]
fn floats_and_decimals() {
    assert_eq!(from_str::<f32>("56.159").unwrap(), 56.159f32);
    assert_eq!(from_str::<f64>("12.226").unwrap(), 12.226);
    assert_eq!(from_str::<f64>("44.345").unwrap(), 44.345);
    let value = parse("44.345").unwrap();
    assert_eq!(
        value.as_number().unwrap().convert::<Decimal>(),
        Ok(Decimal::new(44345, 3))
    );
}

#[rstest]
fn fractional_into_integer_fails() {
    let err = from_str::<i32>("44.345").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NumericConversion);
    assert_eq!(
        err.to_string(),
        "44.345 is not an integer, cannot convert to i32"
    );
}

#[rstest]
#[case::byte("300")]
#[case::negative("-1")]
fn out_of_range_integer_fails(#[case] text: &str) {
    let err = from_str::<u8>(text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NumericConversion);
}

#[rstest]
fn nested_failure_keeps_cause() {
    let err = from_str::<ComplexPerson>(r#"{"id": 1.5, "name": "x"}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
    assert!(
        err.to_string()
            .starts_with("could not convert to ComplexPerson the following JSON:"),
        "{err}"
    );
    let cause = err.source().expect("nested cause");
    assert_eq!(
        cause.to_string(),
        NumericError::NotAnInteger {
            value: "1.5".into(),
            target: NumberKind::I32,
        }
        .to_string()
    );
    assert_eq!(err.root_cause().kind(), ErrorKind::NumericConversion);
}

#[rstest]
fn mismatched_shapes_fail() {
    let err = from_str::<Vec<i32>>(r#"{"a": 1}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
    let err = from_str::<String>("[1]").unwrap_err();
    assert_eq!(
        err.to_string(),
        "could not convert to string the following JSON: [1]"
    );
}

#[rstest]
fn parse_errors_surface_from_typed_entry_points() {
    assert_eq!(
        from_str::<Person>("{\"age\": }").unwrap_err().kind(),
        ErrorKind::Parse
    );
    assert_eq!(
        from_slice::<Vec<i32>>(b"[1, \xff]").unwrap_err().kind(),
        ErrorKind::Parse
    );
}

#[rstest]
fn reader_and_slice_inputs() {
    let person: Person = from_reader(PERSON.as_bytes()).unwrap();
    assert_eq!(person.friends.len(), 5);
    let scores: Vec<u32> = from_slice(b"[4, 2, 5]").unwrap();
    assert_eq!(scores, vec![4, 2, 5]);
}
