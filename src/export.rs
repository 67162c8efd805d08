pub use std::any::{type_name, Any};
pub use std::boxed::Box;
pub use std::default::Default;
pub use std::option::Option::{None, Some};
pub use std::result::Result::{Err, Ok};
pub use std::vec::Vec;

pub use crate::error::Error;
pub use crate::shape::{
    downcast_mut, downcast_ref, take, unbox, CaseDateFormat, CaseShape, Constant, EnumShape,
    FieldShape, OpaqueField, OpaqueShape, RecordShape, Shape, TupleShape, TypeRef, UnionShape,
    UnionTag,
};
pub use crate::Wire;
