use wirejson::{Error, Registry, Wire};

#[derive(PartialEq, Debug, Wire)]
#[wire(tag = "kind")]
enum Tag {
    A,
    #[wire(rename = "renamedB")]
    B,
}

#[derive(PartialEq, Debug, Wire)]
struct Example {
    x: String,
    t1: Tag,
    t2: Tag,
    n: Nested,
}

#[derive(PartialEq, Debug, Wire)]
struct Nested {
    y: Option<Vec<String>>,
    z: Option<String>,
}

fn example() -> Example {
    Example {
        x: "X".to_owned(),
        t1: Tag::A,
        t2: Tag::B,
        n: Nested {
            y: Some(vec!["Y".to_owned(), "Y".to_owned()]),
            z: None,
        },
    }
}

#[test]
fn test_de() {
    let j = r#" {x: "X", "t1": {"kind": "A"}, "t2": {"kind": "renamedB"}, "n": {"y": ["Y", "Y"]}} "#;
    let actual: Example = Registry::new().deserialize(j).unwrap();
    assert_eq!(actual, example());
}

#[test]
fn test_ser() {
    let actual = Registry::new().serialize(&example()).unwrap();
    let expected = r#"{"x":"X","t1":{"kind":"A"},"t2":{"kind":"renamedB"},"n":{"y":["Y","Y"]}}"#;
    assert_eq!(actual, expected);
}

#[derive(PartialEq, Debug, Wire)]
struct Pair(i32, String);

#[derive(PartialEq, Debug, Wire)]
struct Marker;

#[test]
fn test_tuple_structs() {
    let registry = Registry::new();

    let j = registry.serialize(&Pair(1, "a".to_owned())).unwrap();
    assert_eq!(j, r#"[1,"a"]"#);
    assert_eq!(registry.deserialize::<Pair>(&j).unwrap(), Pair(1, "a".to_owned()));
    assert!(matches!(
        registry.deserialize::<Pair>(r#"[1]"#),
        Err(Error::DecodeMismatch { .. })
    ));

    assert_eq!(registry.serialize(&Marker).unwrap(), "[]");
    assert_eq!(registry.deserialize::<Marker>("[]").unwrap(), Marker);
}

#[derive(PartialEq, Debug, Clone, Copy, Wire)]
#[repr(u8)]
enum Level {
    Low = 1,
    High = 5,
}

#[test]
fn test_repr_enum() {
    let registry = Registry::new();
    assert_eq!(registry.serialize(&Level::High).unwrap(), "5");
    assert_eq!(registry.deserialize::<Level>("1").unwrap(), Level::Low);
    assert!(matches!(
        registry.deserialize::<Level>("3"),
        Err(Error::DecodeMismatch { .. })
    ));
}

#[derive(PartialEq, Debug, Wire)]
struct Wrapper<T> {
    #[wire(rename = "Inner")]
    inner: T,
    all: Vec<T>,
}

#[test]
fn test_generic() {
    let registry = Registry::new();
    let value = Wrapper {
        inner: 1u8,
        all: vec![2, 3],
    };
    let j = registry.serialize(&value).unwrap();
    assert_eq!(j, r#"{"Inner":1,"all":[2,3]}"#);
    assert_eq!(registry.deserialize::<Wrapper<u8>>(&j).unwrap(), value);

    let nested = Wrapper {
        inner: Pair(0, String::new()),
        all: vec![],
    };
    let j = registry.serialize(&nested).unwrap();
    assert_eq!(j, r#"{"Inner":[0,""],"all":[]}"#);
    assert_eq!(registry.deserialize::<Wrapper<Pair>>(&j).unwrap(), nested);
}

#[derive(PartialEq, Debug, Wire)]
#[wire(tag = "op")]
enum Command {
    #[wire(rename = "mv")]
    Move {
        #[wire(rename = "dx")]
        x: i32,
        y: i32,
    },
    #[wire(constant = "noop")]
    Noop,
}

#[test]
fn test_variant_and_field_options() {
    let registry = Registry::new();

    let mv = Command::Move { x: 1, y: -2 };
    let j = registry.serialize(&mv).unwrap();
    assert_eq!(j, r#"{"op":"mv","dx":1,"y":-2}"#);
    assert_eq!(registry.deserialize::<Command>(&j).unwrap(), mv);

    assert_eq!(registry.serialize(&Command::Noop).unwrap(), r#""noop""#);
    assert_eq!(registry.deserialize::<Command>(r#""noop""#).unwrap(), Command::Noop);
}

#[test]
fn test_unknown_fields_are_ignored() {
    let j = r#"{"extra": [1, {"deep": true}], "y": null, "z": "z"}"#;
    let nested: Nested = Registry::new().deserialize(j).unwrap();
    assert_eq!(
        nested,
        Nested {
            y: None,
            z: Some("z".to_owned()),
        }
    );
}

#[test]
fn test_shape_mismatch() {
    let registry = Registry::new();
    match registry.deserialize::<Example>("[1, 2]") {
        Err(Error::DecodeMismatch { found, .. }) => assert!(found.as_array().is_some()),
        other => panic!("unexpected {:?}", other),
    }
}

#[cfg(feature = "chrono")]
#[test]
fn test_field_date_format() {
    use chrono::{NaiveDate, NaiveDateTime};

    #[derive(PartialEq, Debug, Wire)]
    struct Meeting {
        #[wire(date_format = "%d/%m/%Y %H:%M")]
        at: NaiveDateTime,
        created: NaiveDateTime,
    }

    let at = NaiveDate::from_ymd_opt(2024, 2, 29)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let meeting = Meeting { at, created: at };

    let registry = Registry::new();
    let j = registry.serialize(&meeting).unwrap();
    assert_eq!(j, r#"{"at":"29\/02\/2024 09:30","created":"2024-02-29T09:30:00"}"#);
    assert_eq!(registry.deserialize::<Meeting>(&j).unwrap(), meeting);
}
