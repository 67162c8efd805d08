use std::any::Any;

use wirejson::json::Value;
use wirejson::shape::{FieldShape, OpaqueField, OpaqueShape, Shape};
use wirejson::{Error, Registry, Wire};

#[derive(PartialEq, Debug, Clone, Copy)]
struct Celsius(f64);

impl Wire for Celsius {
    fn shape() -> Shape {
        Shape::Scalar
    }
}

#[derive(PartialEq, Debug, Wire)]
struct Reading {
    sensor: String,
    temperature: Celsius,
    history: Vec<Celsius>,
}

fn celsius_registry() -> Registry {
    Registry::builder()
        .scalar::<Celsius>(
            |c| Value::number(c.0.to_string()),
            |j| match j {
                Value::Number(text) => text
                    .parse()
                    .map(Celsius)
                    .map_err(|_| Error::decode_mismatch("Celsius", j, "bad number")),
                _ => Err(Error::decode_mismatch("Celsius", j, "expected a number")),
            },
        )
        .build()
}

#[test]
fn test_registered_scalar() {
    let registry = celsius_registry();
    let reading = Reading {
        sensor: "roof".to_owned(),
        temperature: Celsius(21.5),
        history: vec![Celsius(-3.0), Celsius(0.25)],
    };
    let j = registry.serialize(&reading).unwrap();
    assert_eq!(
        j,
        r#"{"sensor":"roof","temperature":21.5,"history":[-3,0.25]}"#
    );
    assert_eq!(registry.deserialize::<Reading>(&j).unwrap(), reading);
}

#[test]
fn test_unregistered_scalar() {
    let err = Registry::new().codec::<Reading>().unwrap_err();
    match err {
        Error::Unsupported { ty, .. } => assert!(ty.ends_with("Reading")),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_builtin_override() {
    let registry = Registry::builder()
        .scalar::<u8>(
            |b| Ok(Value::string(format!("{:02x}", b))),
            |j| {
                let text = j
                    .as_str()
                    .ok_or_else(|| Error::decode_mismatch("u8", j, "expected hex"))?;
                u8::from_str_radix(text, 16)
                    .map_err(|_| Error::decode_mismatch("u8", j, "expected hex"))
            },
        )
        .build();
    assert_eq!(registry.serialize(&vec![10u8, 255]).unwrap(), r#"["0a","ff"]"#);
    assert_eq!(registry.deserialize::<Vec<u8>>(r#"["0a"]"#).unwrap(), vec![10]);
    // Other integers are untouched.
    assert_eq!(registry.serialize(&10u16).unwrap(), "10");
}

struct Handle {
    id: u32,
}

fn handle_id(v: &dyn Any) -> wirejson::Result<&dyn Any> {
    Ok(&wirejson::shape::downcast_ref::<Handle>(v)?.id)
}

fn set_handle_id(v: &mut dyn Any, x: Box<dyn Any>) -> wirejson::Result<()> {
    wirejson::shape::downcast_mut::<Handle>(v)?.id = wirejson::shape::unbox(x)?;
    Ok(())
}

impl Wire for Handle {
    fn shape() -> Shape {
        Shape::Opaque(OpaqueShape {
            fields: vec![OpaqueField {
                field: FieldShape::new("id", wirejson::shape::TypeRef::of::<u32>(), handle_id),
                serializable: true,
                set: set_handle_id,
            }],
            create: None,
        })
    }
}

#[test]
fn test_opaque_without_constructor() {
    match Registry::new().codec::<Handle>() {
        Err(Error::Unsupported { ty, .. }) => assert!(ty.ends_with("Handle")),
        other => panic!("unexpected {:?}", other.map(|_| ())),
    }
}

#[derive(PartialEq, Debug, Wire)]
#[wire(opaque)]
struct Session {
    user: String,
    #[wire(rename = "ttl")]
    seconds: u32,
    #[wire(skip)]
    cache: Vec<u8>,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            user: "guest".to_owned(),
            seconds: 60,
            cache: vec![1, 2, 3],
        }
    }
}

#[test]
fn test_opaque_struct() {
    let registry = Registry::new();
    let session = Session {
        user: "ann".to_owned(),
        seconds: 5,
        cache: vec![],
    };
    let j = registry.serialize(&session).unwrap();
    assert_eq!(j, r#"{"user":"ann","ttl":5}"#);

    // The skipped field comes from `Default`.
    let back: Session = registry.deserialize(&j).unwrap();
    assert_eq!(back.cache, vec![1, 2, 3]);
    assert_eq!((back.user.as_str(), back.seconds), ("ann", 5));

    // So do members the object lacks.
    let partial: Session = registry.deserialize(r#"{"user":"bo","cache":[9]}"#).unwrap();
    assert_eq!(
        partial,
        Session {
            user: "bo".to_owned(),
            seconds: 60,
            cache: vec![1, 2, 3],
        }
    );

    assert_eq!(registry.build_default::<Session>().unwrap(), Session::default());
}
