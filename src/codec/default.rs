//! Smallest structurally valid value of a type, built without any input.

use std::any::Any;

use crate::codec::TypeDescriptor;
use crate::error::{Error, Result};
use crate::json::Value;
use crate::registry::Registry;
use crate::shape::{FieldShape, Shape, TypeRef};

/// Deeper than this, the type is taken to have no finite default.
const MAX_DEPTH: usize = 64;

pub(crate) fn build(registry: &Registry, ty: TypeRef, depth: usize) -> Result<Box<dyn Any>> {
    if depth > MAX_DEPTH {
        return Err(Error::unsupported(
            ty.name(),
            "default value nests too deep; the first case may refer to the type itself",
        ));
    }
    if registry.scalars().contains(ty.id()) {
        return registry
            .codec_for(TypeDescriptor::of(ty))?
            .decode(&Value::Null);
    }

    let depth = depth + 1;
    match ty.shape() {
        Shape::Scalar => Err(Error::unsupported(ty.name(), "no scalar codec registered")),
        Shape::Array(array) => {
            let items = (0..array.len)
                .map(|_| build(registry, array.item, depth))
                .collect::<Result<Vec<_>>>()?;
            (array.build)(items)
        }
        Shape::Tuple(tuple) => {
            let items = tuple
                .items
                .iter()
                .map(|&item| build(registry, item, depth))
                .collect::<Result<Vec<_>>>()?;
            (tuple.build)(items)
        }
        Shape::Union(union) => match union.cases.first() {
            Some(case) => (case.build)(fields(registry, &case.fields, depth)?),
            None => Err(Error::unsupported(ty.name(), "union has no cases")),
        },
        Shape::Record(record) => (record.build)(fields(registry, &record.fields, depth)?),
        Shape::Enum(repr) => Ok((repr.first)()),
        Shape::Map(map) => (map.build)(Vec::new()),
        Shape::Seq(seq) => (seq.build)(Vec::new()),
        Shape::Option(option) => Ok((option.none)()),
        Shape::Pointer(pointer) => (pointer.wrap)(build(registry, pointer.inner, depth)?),
        Shape::Opaque(opaque) => match opaque.create {
            Some(create) => Ok(create()),
            None => Err(Error::unsupported(
                ty.name(),
                "opaque type has no default constructor",
            )),
        },
    }
}

fn fields(registry: &Registry, fields: &[FieldShape], depth: usize) -> Result<Vec<Box<dyn Any>>> {
    fields
        .iter()
        .map(|field| build(registry, field.ty, depth))
        .collect()
}
