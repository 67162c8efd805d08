use wirejson::json::Value;
use wirejson::{Error, Registry, Wire};

#[derive(PartialEq, Debug, Wire)]
struct Person {
    #[wire(rename = "Name")]
    name: String,
    #[wire(rename = "Age")]
    age: Option<i32>,
}

#[test]
fn test_absent_field_is_omitted() {
    let registry = Registry::new();

    let ann = Person {
        name: "Ann".to_owned(),
        age: None,
    };
    assert_eq!(registry.serialize(&ann).unwrap(), r#"{"Name":"Ann"}"#);

    let ann = Person {
        name: "Ann".to_owned(),
        age: Some(5),
    };
    assert_eq!(registry.serialize(&ann).unwrap(), r#"{"Name":"Ann","Age":5}"#);
}

#[test]
fn test_absent_or_null_decodes_to_none() {
    let registry = Registry::new();
    let expected = Person {
        name: "Ann".to_owned(),
        age: None,
    };
    assert_eq!(registry.deserialize::<Person>(r#"{"Name":"Ann"}"#).unwrap(), expected);
    assert_eq!(
        registry.deserialize::<Person>(r#"{"Name":"Ann","Age":null}"#).unwrap(),
        expected
    );
}

#[test]
fn test_missing_scalar_is_zero() {
    let person: Person = Registry::new().deserialize("{}").unwrap();
    assert_eq!(
        person,
        Person {
            name: String::new(),
            age: None,
        }
    );
}

#[derive(PartialEq, Debug, Wire)]
struct Team {
    lead: Person,
    members: Vec<Person>,
}

#[test]
fn test_missing_compound_is_a_mismatch() {
    let registry = Registry::new();
    let err = registry
        .deserialize::<Team>(r#"{"lead":{"Name":"Ann"}}"#)
        .unwrap_err();
    match err {
        Error::DecodeMismatch { found, .. } => assert_eq!(*found, Value::Null),
        other => panic!("unexpected {:?}", other),
    }
}

#[derive(PartialEq, Debug, Wire)]
struct Layered {
    value: Option<Option<i32>>,
    values: Vec<Option<i32>>,
}

#[test]
fn test_nested_options() {
    let registry = Registry::new();
    let layered = Layered {
        value: Some(None),
        values: vec![None, Some(2)],
    };
    let j = registry.serialize(&layered).unwrap();
    assert_eq!(j, r#"{"value":null,"values":[null,2]}"#);

    // `null` for the outer option reads as absent.
    assert_eq!(
        registry.deserialize::<Layered>(&j).unwrap(),
        Layered {
            value: None,
            values: vec![None, Some(2)],
        }
    );
}

#[test]
fn test_top_level_option_is_nullable() {
    let registry = Registry::new();
    assert_eq!(registry.serialize(&None::<String>).unwrap(), "null");
    assert_eq!(registry.serialize(&Some("x".to_owned())).unwrap(), r#""x""#);
    assert_eq!(registry.deserialize::<Option<u8>>("null").unwrap(), None);
    assert_eq!(registry.deserialize::<Option<u8>>("7").unwrap(), Some(7));
}

#[derive(PartialEq, Debug, Wire)]
enum Contact {
    Email { address: String, label: Option<String> },
}

#[test]
fn test_optional_case_field() {
    let registry = Registry::new();
    let contact = Contact::Email {
        address: "a@b.c".to_owned(),
        label: None,
    };
    let j = registry.serialize(&contact).unwrap();
    assert_eq!(j, r#"{"$":0,"address":"a@b.c"}"#);
    assert_eq!(registry.deserialize::<Contact>(&j).unwrap(), contact);
}
