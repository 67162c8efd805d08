use std::sync::Arc;

use wirejson::{Registry, Wire};

#[derive(PartialEq, Debug, Wire)]
enum Tree {
    Leaf,
    Node { value: i32, children: Vec<Tree> },
}

fn node(value: i32, children: Vec<Tree>) -> Tree {
    Tree::Node { value, children }
}

#[test]
fn test_tree_three_levels() {
    let tree = node(
        1,
        vec![
            node(2, vec![node(4, vec![]), Tree::Leaf]),
            node(3, vec![Tree::Leaf]),
        ],
    );

    let registry = Registry::new();
    let j = registry.serialize(&tree).unwrap();
    assert_eq!(
        j,
        concat!(
            r#"{"$":1,"value":1,"children":["#,
            r#"{"$":1,"value":2,"children":[{"$":1,"value":4,"children":[]},{"$":0}]},"#,
            r#"{"$":1,"value":3,"children":[{"$":0}]}"#,
            r#"]}"#,
        )
    );
    assert_eq!(registry.deserialize::<Tree>(&j).unwrap(), tree);
}

#[derive(PartialEq, Debug, Wire)]
struct List {
    head: i32,
    tail: Option<Box<List>>,
}

#[test]
fn test_linked_list() {
    let list = List {
        head: 1,
        tail: Some(Box::new(List {
            head: 2,
            tail: Some(Box::new(List { head: 3, tail: None })),
        })),
    };

    let registry = Registry::new();
    let j = registry.serialize(&list).unwrap();
    assert_eq!(j, r#"{"head":1,"tail":{"head":2,"tail":{"head":3}}}"#);
    assert_eq!(registry.deserialize::<List>(&j).unwrap(), list);
}

#[derive(PartialEq, Debug, Wire)]
struct Department {
    name: String,
    staff: Vec<Employee>,
}

#[derive(PartialEq, Debug, Wire)]
struct Employee {
    name: String,
    manages: Option<Arc<Department>>,
}

#[test]
fn test_mutual_recursion() {
    let registry = Registry::new();
    let department = Department {
        name: "ops".to_owned(),
        staff: vec![Employee {
            name: "ann".to_owned(),
            manages: Some(Arc::new(Department {
                name: "night".to_owned(),
                staff: vec![],
            })),
        }],
    };

    // Derive from the other end of the cycle first.
    let employee = Employee {
        name: "bob".to_owned(),
        manages: None,
    };
    assert_eq!(registry.serialize(&employee).unwrap(), r#"{"name":"bob"}"#);

    let j = registry.serialize(&department).unwrap();
    assert_eq!(
        j,
        r#"{"name":"ops","staff":[{"name":"ann","manages":{"name":"night","staff":[]}}]}"#
    );
    assert_eq!(registry.deserialize::<Department>(&j).unwrap(), department);
}

struct Exploding;

impl Wire for Exploding {
    fn shape() -> wirejson::shape::Shape {
        panic!("shape of Exploding is not available")
    }
}

#[derive(Wire)]
struct Holder {
    parts: Vec<Exploding>,
}

#[test]
fn test_panicking_shape_leaves_registry_usable() {
    let registry = Registry::new();
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = registry.codec::<Holder>();
    }));
    assert!(outcome.is_err());

    // Recursive types still get their codecs published afterwards.
    let tree = node(1, vec![node(2, vec![Tree::Leaf])]);
    let j = registry.serialize(&tree).unwrap();
    assert_eq!(registry.deserialize::<Tree>(&j).unwrap(), tree);

    let list = List {
        head: 1,
        tail: Some(Box::new(List { head: 2, tail: None })),
    };
    let j = registry.serialize(&list).unwrap();
    assert_eq!(j, r#"{"head":1,"tail":{"head":2}}"#);
    assert_eq!(registry.deserialize::<List>(&j).unwrap(), list);

    // The failed type is derived again, and fails the same way.
    let again = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = registry.codec::<Holder>();
    }));
    assert!(again.is_err());
}
