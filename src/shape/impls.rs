use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::shape::{
    downcast_ref, take, unbox, ArrayShape, MapShape, OptionShape, PointerShape, SeqKind,
    SeqShape, Shape, TupleShape, TypeRef, Wire,
};
use crate::Stack;

macro_rules! scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl Wire for $ty {
            fn shape() -> Shape {
                Shape::Scalar
            }
        }
    )*};
}

scalar!(
    (),
    bool,
    char,
    String,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
    std::time::Duration,
);

#[cfg(feature = "chrono")]
scalar!(
    chrono::DateTime<chrono::Utc>,
    chrono::DateTime<chrono::FixedOffset>,
    chrono::NaiveDateTime,
    chrono::TimeDelta,
);

#[cfg(feature = "uuid")]
scalar!(uuid::Uuid);

#[cfg(feature = "decimal")]
scalar!(rust_decimal::Decimal);

impl<T: Wire> Wire for Option<T> {
    fn shape() -> Shape {
        Shape::Option(OptionShape {
            inner: TypeRef::of::<T>(),
            get: |v| Ok(downcast_ref::<Option<T>>(v)?.as_ref().map(|x| x as &dyn Any)),
            some: |v| Ok(Box::new(Some(unbox::<T>(v)?))),
            none: || Box::new(None::<T>),
        })
    }
}

impl<T: Wire> Wire for Box<T> {
    fn shape() -> Shape {
        Shape::Pointer(PointerShape {
            inner: TypeRef::of::<T>(),
            get: |v| Ok(&**downcast_ref::<Box<T>>(v)? as &dyn Any),
            wrap: |v| Ok(Box::new(Box::new(unbox::<T>(v)?))),
        })
    }
}

impl<T: Wire> Wire for Arc<T> {
    fn shape() -> Shape {
        Shape::Pointer(PointerShape {
            inner: TypeRef::of::<T>(),
            get: |v| Ok(&**downcast_ref::<Arc<T>>(v)? as &dyn Any),
            wrap: |v| Ok(Box::new(Arc::new(unbox::<T>(v)?))),
        })
    }
}

impl<T: Wire, const N: usize> Wire for [T; N] {
    fn shape() -> Shape {
        Shape::Array(ArrayShape {
            item: TypeRef::of::<T>(),
            len: N,
            items: |v| {
                Ok(downcast_ref::<[T; N]>(v)?
                    .iter()
                    .map(|x| x as &dyn Any)
                    .collect())
            },
            build: |items| {
                let items = items.into_iter().map(unbox::<T>).collect::<Result<Vec<T>>>()?;
                let array: [T; N] = items
                    .try_into()
                    .map_err(|_| Error::encode_mismatch(std::any::type_name::<[T; N]>(), "wrong length"))?;
                Ok(Box::new(array))
            },
        })
    }
}

macro_rules! seq {
    ($kind:ident, $ty:ident < T $(: $bound:ident $(+ $more:ident)*)? >) => {
        impl<T: Wire $(+ $bound $(+ $more)*)?> Wire for $ty<T> {
            fn shape() -> Shape {
                Shape::Seq(SeqShape {
                    kind: SeqKind::$kind,
                    item: TypeRef::of::<T>(),
                    items: |v| {
                        Ok(downcast_ref::<$ty<T>>(v)?
                            .iter()
                            .map(|x| x as &dyn Any)
                            .collect())
                    },
                    build: |items| {
                        Ok(Box::new(
                            items
                                .into_iter()
                                .map(unbox::<T>)
                                .collect::<Result<$ty<T>>>()?,
                        ))
                    },
                })
            }
        }
    };
}

seq!(Vec, Vec<T>);
seq!(Deque, VecDeque<T>);
seq!(List, LinkedList<T>);
seq!(Set, BTreeSet<T: Ord>);
seq!(Stack, Stack<T>);

impl<T, S> Wire for HashSet<T, S>
where
    T: Wire + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    fn shape() -> Shape {
        Shape::Seq(SeqShape {
            kind: SeqKind::Set,
            item: TypeRef::of::<T>(),
            items: |v| {
                Ok(downcast_ref::<HashSet<T, S>>(v)?
                    .iter()
                    .map(|x| x as &dyn Any)
                    .collect())
            },
            build: |items| {
                Ok(Box::new(
                    items
                        .into_iter()
                        .map(unbox::<T>)
                        .collect::<Result<HashSet<T, S>>>()?,
                ))
            },
        })
    }
}

fn unbox_entries<K: Any, V: Any>(
    entries: Vec<(Box<dyn Any>, Box<dyn Any>)>,
) -> impl Iterator<Item = Result<(K, V)>> {
    entries
        .into_iter()
        .map(|(k, v)| Ok((unbox::<K>(k)?, unbox::<V>(v)?)))
}

impl<K, V, S> Wire for HashMap<K, V, S>
where
    K: Wire + Eq + Hash,
    V: Wire,
    S: BuildHasher + Default + 'static,
{
    fn shape() -> Shape {
        Shape::Map(MapShape {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
            entries: |v| {
                Ok(downcast_ref::<HashMap<K, V, S>>(v)?
                    .iter()
                    .map(|(k, v)| (k as &dyn Any, v as &dyn Any))
                    .collect())
            },
            build: |entries| {
                Ok(Box::new(
                    unbox_entries::<K, V>(entries).collect::<Result<HashMap<K, V, S>>>()?,
                ))
            },
        })
    }
}

impl<K: Wire + Ord, V: Wire> Wire for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::Map(MapShape {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
            entries: |v| {
                Ok(downcast_ref::<BTreeMap<K, V>>(v)?
                    .iter()
                    .map(|(k, v)| (k as &dyn Any, v as &dyn Any))
                    .collect())
            },
            build: |entries| {
                Ok(Box::new(
                    unbox_entries::<K, V>(entries).collect::<Result<BTreeMap<K, V>>>()?,
                ))
            },
        })
    }
}

macro_rules! tuple {
    ($($n:tt $t:ident),+) => {
        impl<$($t: Wire),+> Wire for ($($t,)+) {
            fn shape() -> Shape {
                Shape::Tuple(TupleShape {
                    items: vec![$(TypeRef::of::<$t>()),+],
                    get: |v, i| {
                        let tuple = downcast_ref::<($($t,)+)>(v)?;
                        match i {
                            $($n => Ok(&tuple.$n as &dyn Any),)+
                            _ => Err(Error::encode_mismatch(
                                std::any::type_name::<($($t,)+)>(),
                                "tuple index out of range",
                            )),
                        }
                    },
                    build: |items| {
                        let mut items = items.into_iter();
                        Ok(Box::new(($(take::<$t>(&mut items)?,)+)))
                    },
                })
            }
        }
    };
}

tuple!(0 A);
tuple!(0 A, 1 B);
tuple!(0 A, 1 B, 2 C);
tuple!(0 A, 1 B, 2 C, 3 D);
tuple!(0 A, 1 B, 2 C, 3 D, 4 E);
tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);
