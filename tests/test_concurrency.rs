use std::sync::{Arc, Barrier};
use std::thread;

use once_cell::sync::Lazy;
use wirejson::{Registry, Wire};

#[derive(PartialEq, Debug, Clone, Wire)]
enum Expr {
    Num(i64),
    Add { left: Box<Expr>, right: Box<Expr> },
    Call { name: String, args: Vec<Expr> },
}

#[derive(PartialEq, Debug, Clone, Wire)]
struct Program {
    body: Vec<Expr>,
    result: Option<Box<Expr>>,
}

fn program(seed: i64) -> Program {
    Program {
        body: vec![
            Expr::Num(seed),
            Expr::Add {
                left: Box::new(Expr::Num(1)),
                right: Box::new(Expr::Call {
                    name: format!("f{}", seed),
                    args: vec![Expr::Num(seed * 2)],
                }),
            },
        ],
        result: Some(Box::new(Expr::Num(-seed))),
    }
}

const THREADS: usize = 8;

#[test]
fn test_racing_first_use() {
    let registry = Arc::new(Registry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles = (0..THREADS)
        .map(|i| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let value = program(i as i64);
                barrier.wait();
                // Half the threads start from the inner type.
                if i % 2 == 0 {
                    registry.codec::<Expr>().unwrap();
                }
                let j = registry.serialize(&value).unwrap();
                let back: Program = registry.deserialize(&j).unwrap();
                assert_eq!(back, value);
                j
            })
        })
        .collect::<Vec<_>>();

    let outputs = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect::<Vec<_>>();
    for (i, j) in outputs.iter().enumerate() {
        assert_eq!(*j, Registry::new().serialize(&program(i as i64)).unwrap());
    }
}

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

#[test]
fn test_shared_static_registry() {
    let handles = (0..THREADS)
        .map(|i| {
            thread::spawn(move || {
                let value = vec![program(i as i64); 3];
                let j = REGISTRY.serialize(&value).unwrap();
                REGISTRY.deserialize::<Vec<Program>>(&j).unwrap() == value
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
