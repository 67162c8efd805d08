//! Runtime description of types.
//!
//! Every type the engine can encode implements [`Wire`], which returns a
//! [`Shape`]: what kind of type it is, its fields or cases, and erased
//! accessors to read a value apart and put one together. The engine walks
//! shapes instead of reflecting on types. `#[derive(Wire)]` writes the impl
//! for structs and enums; this module implements it for std types.
//!
//! A hand-written impl looks like what the derive generates:
//!
//! ```rust
//! use std::any::Any;
//! use wirejson::shape::{downcast_ref, take, FieldShape, RecordShape, Shape, TypeRef};
//! use wirejson::Wire;
//!
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Wire for Point {
//!     fn shape() -> Shape {
//!         Shape::Record(RecordShape {
//!             fields: vec![
//!                 FieldShape::new("x", TypeRef::of::<i32>(), |v| {
//!                     Ok(&downcast_ref::<Point>(v)?.x as &dyn Any)
//!                 }),
//!                 FieldShape::new("y", TypeRef::of::<i32>(), |v| {
//!                     Ok(&downcast_ref::<Point>(v)?.y as &dyn Any)
//!                 }),
//!             ],
//!             build: |args| {
//!                 let mut args = args.into_iter();
//!                 Ok(Box::new(Point {
//!                     x: take(&mut args)?,
//!                     y: take(&mut args)?,
//!                 }))
//!             },
//!         })
//!     }
//! }
//! ```

mod impls;

use std::any::{type_name, Any, TypeId};
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};

/// Trait for types the engine can derive a codec for.
///
/// [Refer to the module documentation for an example.][self]
pub trait Wire: Any + Sized {
    fn shape() -> Shape;
}

/// Handle on a type: its identity plus a way to obtain its shape on demand.
///
/// Shapes of nested types are only built when the engine asks for them, so a
/// type that refers to itself describes itself in finite time.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    shape: fn() -> Shape,
}

impl TypeRef {
    pub fn of<T: Wire>() -> TypeRef {
        TypeRef {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            shape: T::shape,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> Shape {
        (self.shape)()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl Debug for TypeRef {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.name)
    }
}

/// Borrow part of a value, e.g. one field of a struct.
pub type Getter = fn(&dyn Any) -> Result<&dyn Any>;

/// Construct a value from its parts, given in declaration order.
pub type Builder = fn(Vec<Box<dyn Any>>) -> Result<Box<dyn Any>>;

/// Borrow all elements of a container, in wire order.
pub type Items = fn(&dyn Any) -> Result<Vec<&dyn Any>>;

/// What kind of type something is, as far as the wire is concerned.
pub enum Shape {
    /// Leaf type handled by the registry's scalar table.
    Scalar,
    /// Fixed-size array `[T; N]`.
    Array(ArrayShape),
    /// Tuples and tuple structs.
    Tuple(TupleShape),
    /// Enums whose cases carry data (tagged unions).
    Union(UnionShape),
    /// Structs with named fields.
    Record(RecordShape),
    /// Data-less enums with an integer representation.
    Enum(EnumShape),
    /// Associative containers.
    Map(MapShape),
    /// Ordered containers.
    Seq(SeqShape),
    /// `Option<T>`.
    Option(OptionShape),
    /// Owning pointers, encoded as what they point to.
    Pointer(PointerShape),
    /// Structs described by their full field list, rebuilt by mutating a
    /// default instance.
    Opaque(OpaqueShape),
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Scalar => "scalar",
            Shape::Array(_) => "array",
            Shape::Tuple(_) => "tuple",
            Shape::Union(_) => "union",
            Shape::Record(_) => "record",
            Shape::Enum(_) => "enum",
            Shape::Map(_) => "map",
            Shape::Seq(_) => "sequence",
            Shape::Option(_) => "option",
            Shape::Pointer(_) => "pointer",
            Shape::Opaque(_) => "opaque",
        }
    }
}

pub struct ArrayShape {
    pub item: TypeRef,
    pub len: usize,
    pub items: Items,
    pub build: Builder,
}

pub struct TupleShape {
    pub items: Vec<TypeRef>,
    pub get: fn(&dyn Any, usize) -> Result<&dyn Any>,
    pub build: Builder,
}

/// A named (or positional) field of a struct or enum case.
pub struct FieldShape {
    /// Rust name, or the position for tuple fields.
    pub name: &'static str,
    pub wire_name: &'static str,
    pub ty: TypeRef,
    pub date_format: Option<&'static str>,
    pub get: Getter,
}

impl FieldShape {
    /// Field whose wire name is its Rust name.
    pub fn new(name: &'static str, ty: TypeRef, get: Getter) -> Self {
        FieldShape {
            name,
            wire_name: name,
            ty,
            date_format: None,
            get,
        }
    }

    pub fn rename(mut self, wire_name: &'static str) -> Self {
        self.wire_name = wire_name;
        self
    }

    pub fn date_format(mut self, format: &'static str) -> Self {
        self.date_format = Some(format);
        self
    }
}

pub struct RecordShape {
    pub fields: Vec<FieldShape>,
    pub build: Builder,
}

/// Scalar a whole union case collapses to on the wire.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Constant {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'static str),
}

/// How the cases of a union are told apart on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnionTag {
    /// `"$": <case index>`.
    Standard,
    /// `"<field>": "<case wire name>"`.
    Named(&'static str),
    /// No tag; each case is recognized by a field only it carries.
    Untagged,
}

pub struct CaseShape {
    pub name: &'static str,
    pub wire_name: &'static str,
    pub fields: Vec<FieldShape>,
    /// Fields are positional (tuple variant).
    pub positional: bool,
    pub constant: Option<Constant>,
    pub build: Builder,
}

/// Date format for one field of one case, declared on the union itself.
#[derive(Clone, Copy, Debug)]
pub struct CaseDateFormat {
    pub case: &'static str,
    pub field: &'static str,
    pub format: &'static str,
}

pub struct UnionShape {
    pub cases: Vec<CaseShape>,
    pub tag: UnionTag,
    /// The single data-less case may be written as `null`.
    pub null_case: bool,
    pub date_formats: Vec<CaseDateFormat>,
    pub case_of: fn(&dyn Any) -> Result<usize>,
}

pub struct EnumShape {
    pub repr: TypeRef,
    pub to_repr: fn(&dyn Any) -> Result<Box<dyn Any>>,
    /// `None` when no variant has that discriminant.
    pub from_repr: fn(Box<dyn Any>) -> Result<Option<Box<dyn Any>>>,
    pub first: fn() -> Box<dyn Any>,
}

pub struct MapShape {
    pub key: TypeRef,
    pub value: TypeRef,
    pub entries: fn(&dyn Any) -> Result<Vec<(&dyn Any, &dyn Any)>>,
    pub build: fn(Vec<(Box<dyn Any>, Box<dyn Any>)>) -> Result<Box<dyn Any>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeqKind {
    Vec,
    Deque,
    List,
    Set,
    /// Items are listed top first and built in push order.
    Stack,
}

pub struct SeqShape {
    pub kind: SeqKind,
    pub item: TypeRef,
    pub items: Items,
    pub build: Builder,
}

pub struct OptionShape {
    pub inner: TypeRef,
    pub get: fn(&dyn Any) -> Result<Option<&dyn Any>>,
    pub some: fn(Box<dyn Any>) -> Result<Box<dyn Any>>,
    pub none: fn() -> Box<dyn Any>,
}

pub struct PointerShape {
    pub inner: TypeRef,
    pub get: Getter,
    pub wrap: fn(Box<dyn Any>) -> Result<Box<dyn Any>>,
}

pub struct OpaqueField {
    pub field: FieldShape,
    /// Left at its default value and never written when `false`.
    pub serializable: bool,
    pub set: fn(&mut dyn Any, Box<dyn Any>) -> Result<()>,
}

pub struct OpaqueShape {
    pub fields: Vec<OpaqueField>,
    pub create: Option<fn() -> Box<dyn Any>>,
}

/// Typed view of an erased value.
pub fn downcast_ref<T: Any>(v: &dyn Any) -> Result<&T> {
    v.downcast_ref::<T>().ok_or_else(Error::type_mismatch::<T>)
}

pub fn downcast_mut<T: Any>(v: &mut dyn Any) -> Result<&mut T> {
    v.downcast_mut::<T>().ok_or_else(Error::type_mismatch::<T>)
}

pub fn unbox<T: Any>(v: Box<dyn Any>) -> Result<T> {
    v.downcast::<T>()
        .map(|b| *b)
        .map_err(|_| Error::type_mismatch::<T>())
}

/// Next constructor argument, typed.
pub fn take<T: Any>(args: &mut impl Iterator<Item = Box<dyn Any>>) -> Result<T> {
    match args.next() {
        Some(arg) => unbox(arg),
        None => Err(Error::encode_mismatch(
            type_name::<T>(),
            "missing constructor argument",
        )),
    }
}
