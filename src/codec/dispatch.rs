//! Builds a codec from a type's shape.
//!
//! Nested types are requested from the registry, so every type in the graph
//! goes through the cache and a type that refers to itself gets a forwarding
//! codec instead of being derived again.

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use crate::codec::union::{self, CaseEncoding, UnionPlan};
use crate::codec::{mismatch, Codec, TypeDescriptor};
use crate::error::{Error, Result};
use crate::json::{Object, Value};
use crate::registry::Registry;
use crate::shape::{
    downcast_ref, ArrayShape, CaseShape, EnumShape, FieldShape, Getter, MapShape,
    OpaqueShape, OptionShape, PointerShape, RecordShape, SeqKind, SeqShape, Shape, TupleShape,
    UnionShape,
};

/// Stands in for members missing from an incoming object.
static NULL: Value = Value::Null;

pub(crate) fn derive(registry: &Registry, desc: &TypeDescriptor) -> Result<Codec> {
    if let Some(codec) = registry.scalars().codec(desc) {
        return Ok(codec);
    }

    let ty = desc.ty.name();
    let shape = desc.ty.shape();
    match shape {
        Shape::Option(option) if desc.is_optional_field => {
            optional(registry, desc, option, true)
        }
        Shape::Scalar => Err(Error::unsupported(ty, "no scalar codec registered")),
        Shape::Array(array) => fixed_array(registry, desc, array),
        Shape::Tuple(tuple) => positional(registry, desc, tuple),
        Shape::Union(union) => tagged_union(registry, desc, union),
        Shape::Record(record) => object(registry, ty, record),
        Shape::Enum(repr) => enumeration(registry, ty, repr),
        Shape::Map(map) => associative(registry, desc, map),
        Shape::Seq(seq) => sequence(registry, desc, seq),
        Shape::Option(option) => optional(registry, desc, option, false),
        Shape::Pointer(pointer) => transparent(registry, desc, pointer),
        Shape::Opaque(opaque) => opaque_object(registry, ty, opaque),
    }
}

/// A field or case member: its wire name, how to reach it, and its codec.
struct Member {
    wire_name: &'static str,
    get: Getter,
    codec: Codec,
}

/// Members written as the entries of one JSON object, in declaration order.
struct ObjectFields {
    members: Vec<Member>,
}

impl ObjectFields {
    fn derive(
        registry: &Registry,
        fields: &[FieldShape],
        case: Option<(&UnionShape, &CaseShape)>,
    ) -> Result<Self> {
        let members = fields
            .iter()
            .map(|field| {
                let desc = TypeDescriptor::resolve(field.ty, Some(field), case);
                Ok(Member {
                    wire_name: field.wire_name,
                    get: field.get,
                    codec: registry.codec_for(desc)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ObjectFields { members })
    }

    fn encode_into(&self, v: &dyn Any, object: &mut Object) -> Result<()> {
        for member in &self.members {
            if let Some(value) = member.codec.encode_member((member.get)(v)?)? {
                object.insert(member.wire_name, value);
            }
        }
        Ok(())
    }

    /// Decoded members in declaration order; a missing member is decoded
    /// from `null`.
    fn decode(&self, object: &Object) -> Result<Vec<Box<dyn Any>>> {
        self.members
            .iter()
            .map(|member| {
                let value = object.get(member.wire_name).unwrap_or(&NULL);
                member.codec.decode(value)
            })
            .collect()
    }
}

fn object(registry: &Registry, ty: &'static str, record: RecordShape) -> Result<Codec> {
    let fields = Arc::new(ObjectFields::derive(registry, &record.fields, None)?);
    let build = record.build;

    let encoder = fields.clone();
    Ok(Codec::new(
        move |v| {
            let mut object = Object::with_capacity(encoder.members.len());
            encoder.encode_into(v, &mut object)?;
            Ok(Value::Object(object))
        },
        move |j| match j {
            Value::Object(object) => build(fields.decode(object)?),
            _ => mismatch(ty, j, "expected an object"),
        },
    ))
}

fn optional(
    registry: &Registry,
    desc: &TypeDescriptor,
    option: OptionShape,
    omit_none: bool,
) -> Result<Codec> {
    let inner = registry.codec_for(desc.inner(option.inner))?;
    let OptionShape { get, some, none, .. } = option;

    let encoder = inner.clone();
    let codec = Codec::new(
        move |v| match get(v)? {
            Some(x) => encoder.encode(x),
            None => Ok(Value::Null),
        },
        move |j| match j {
            Value::Null => Ok(none()),
            _ => some(inner.decode(j)?),
        },
    );

    if omit_none {
        Ok(codec.omit_when(move |v| Ok(get(v)?.is_none())))
    } else {
        Ok(codec)
    }
}

fn transparent(registry: &Registry, desc: &TypeDescriptor, pointer: PointerShape) -> Result<Codec> {
    let inner = registry.codec_for(desc.inner(pointer.inner))?;
    let PointerShape { get, wrap, .. } = pointer;

    let encoder = inner.clone();
    Ok(Codec::new(
        move |v| encoder.encode(get(v)?),
        move |j| wrap(inner.decode(j)?),
    ))
}

fn elements<'a>(ty: &'static str, j: &'a Value, len: Option<usize>) -> Result<&'a [Value]> {
    match (j, len) {
        (Value::Array(items), Some(n)) if items.len() != n => {
            mismatch(ty, j, &format!("expected {} elements, found {}", n, items.len()))
        }
        (Value::Array(items), _) => Ok(items),
        _ => mismatch(ty, j, "expected an array"),
    }
}

fn fixed_array(registry: &Registry, desc: &TypeDescriptor, array: ArrayShape) -> Result<Codec> {
    let ty = desc.ty.name();
    let item = registry.codec_for(desc.inner(array.item))?;
    let ArrayShape {
        len, items, build, ..
    } = array;

    let encoder = item.clone();
    Ok(Codec::new(
        move |v| {
            items(v)?
                .into_iter()
                .map(|x| encoder.encode(x))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        },
        move |j| {
            let decoded = elements(ty, j, Some(len))?
                .iter()
                .map(|x| item.decode(x))
                .collect::<Result<Vec<_>>>()?;
            build(decoded)
        },
    ))
}

fn positional(registry: &Registry, desc: &TypeDescriptor, tuple: TupleShape) -> Result<Codec> {
    let ty = desc.ty.name();
    let codecs = Arc::new(
        tuple
            .items
            .iter()
            .map(|&item| registry.codec_for(TypeDescriptor::of(item)))
            .collect::<Result<Vec<_>>>()?,
    );
    let TupleShape { get, build, .. } = tuple;

    let encoders = codecs.clone();
    Ok(Codec::new(
        move |v| {
            encoders
                .iter()
                .enumerate()
                .map(|(i, codec)| codec.encode(get(v, i)?))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        },
        move |j| {
            let decoded = elements(ty, j, Some(codecs.len()))?
                .iter()
                .zip(codecs.iter())
                .map(|(x, codec)| codec.decode(x))
                .collect::<Result<Vec<_>>>()?;
            build(decoded)
        },
    ))
}

fn enumeration(registry: &Registry, ty: &'static str, shape: EnumShape) -> Result<Codec> {
    let repr = registry.codec_for(TypeDescriptor::of(shape.repr))?;
    let EnumShape {
        to_repr, from_repr, ..
    } = shape;

    let encoder = repr.clone();
    Ok(Codec::new(
        move |v| encoder.encode(&*to_repr(v)?),
        move |j| match from_repr(repr.decode(j)?)? {
            Some(value) => Ok(value),
            None => mismatch(ty, j, "no variant has this value"),
        },
    ))
}

fn associative(registry: &Registry, desc: &TypeDescriptor, map: MapShape) -> Result<Codec> {
    let ty = desc.ty.name();
    let value = registry.codec_for(desc.inner(map.value))?;
    let MapShape { entries, build, .. } = map;

    if map.key.is::<String>() {
        let encoder = value.clone();
        return Ok(Codec::new(
            move |v| {
                let entries = entries(v)?;
                let mut object = Object::with_capacity(entries.len());
                for (k, x) in entries {
                    object.insert(downcast_ref::<String>(k)?.clone(), encoder.encode(x)?);
                }
                Ok(Value::Object(object))
            },
            move |j| match j {
                Value::Object(object) => {
                    let mut seen = HashSet::new();
                    let mut decoded = Vec::with_capacity(object.len());
                    for (k, x) in object.iter() {
                        // First occurrence wins, as in `Object::get`.
                        if seen.insert(k.as_str()) {
                            decoded.push((Box::new(k.clone()) as Box<dyn Any>, value.decode(x)?));
                        }
                    }
                    build(decoded)
                }
                _ => mismatch(ty, j, "expected an object"),
            },
        ));
    }

    let key = registry.codec_for(TypeDescriptor::of(map.key))?;
    let (key_encoder, value_encoder) = (key.clone(), value.clone());
    Ok(Codec::new(
        move |v| {
            entries(v)?
                .into_iter()
                .map(|(k, x)| {
                    Ok(Value::Array(vec![
                        key_encoder.encode(k)?,
                        value_encoder.encode(x)?,
                    ]))
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        },
        move |j| {
            let decoded = elements(ty, j, None)?
                .iter()
                .map(|pair| match elements(ty, pair, Some(2))? {
                    [k, x] => Ok((key.decode(k)?, value.decode(x)?)),
                    _ => mismatch(ty, pair, "expected a key and a value"),
                })
                .collect::<Result<Vec<_>>>()?;
            build(decoded)
        },
    ))
}

fn sequence(registry: &Registry, desc: &TypeDescriptor, seq: SeqShape) -> Result<Codec> {
    let ty = desc.ty.name();
    let item = registry.codec_for(desc.inner(seq.item))?;
    let SeqShape {
        kind, items, build, ..
    } = seq;

    let encoder = item.clone();
    Ok(Codec::new(
        move |v| {
            items(v)?
                .into_iter()
                .map(|x| encoder.encode(x))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        },
        move |j| {
            let mut decoded = elements(ty, j, None)?
                .iter()
                .map(|x| item.decode(x))
                .collect::<Result<Vec<_>>>()?;
            // Written top first, rebuilt bottom first.
            if kind == SeqKind::Stack {
                decoded.reverse();
            }
            build(decoded)
        },
    ))
}

enum CaseCodec {
    Fields(ObjectFields),
    Inline { get: Getter, codec: Codec },
    Scalar,
}

struct UnionCodec {
    ty: &'static str,
    shape: UnionShape,
    plan: UnionPlan,
    cases: Vec<CaseCodec>,
}

fn tagged_union(registry: &Registry, desc: &TypeDescriptor, shape: UnionShape) -> Result<Codec> {
    let ty = desc.ty.name();
    let plan = union::plan(ty, &shape, desc.is_nullable_union)?;

    let mut cases = Vec::with_capacity(shape.cases.len());
    for (case, encoding) in shape.cases.iter().zip(&plan.cases) {
        let site = Some((&shape, case));
        cases.push(match encoding {
            CaseEncoding::Normal => CaseCodec::Fields(ObjectFields::derive(registry, &case.fields, site)?),
            CaseEncoding::InlineRecord => {
                let field = &case.fields[0];
                CaseCodec::Inline {
                    get: field.get,
                    codec: registry.codec_for(TypeDescriptor::resolve(field.ty, Some(field), site))?,
                }
            }
            CaseEncoding::Constant(_) => CaseCodec::Scalar,
        });
    }

    let union = Arc::new(UnionCodec {
        ty,
        shape,
        plan,
        cases,
    });
    let encoder = union.clone();
    Ok(Codec::new(
        move |v| encoder.encode(v),
        move |j| union.decode(j),
    ))
}

impl UnionCodec {
    fn encode(&self, v: &dyn Any) -> Result<Value> {
        let i = (self.shape.case_of)(v)?;
        if let Some(scalar) = self.plan.scalar(self.ty, i)? {
            return Ok(scalar);
        }

        let mut object = Object::new();
        if let Some((name, tag)) = self.plan.tag(&self.shape, i) {
            object.insert(name, tag);
        }
        match &self.cases[i] {
            CaseCodec::Fields(fields) => fields.encode_into(v, &mut object)?,
            CaseCodec::Inline { get, codec } => match codec.encode(get(v)?)? {
                Value::Object(inner) => object.extend(inner),
                _ => {
                    return Err(Error::encode_mismatch(
                        self.ty,
                        "inline record did not encode to an object",
                    ))
                }
            },
            CaseCodec::Scalar => {}
        }
        Ok(Value::Object(object))
    }

    fn decode(&self, j: &Value) -> Result<Box<dyn Any>> {
        let i = self.plan.select(self.ty, &self.shape, j)?;
        let case = &self.shape.cases[i];
        let args = match (&self.cases[i], j) {
            (CaseCodec::Fields(fields), Value::Object(object)) => fields.decode(object)?,
            (CaseCodec::Fields(fields), _) if fields.members.is_empty() => Vec::new(),
            (CaseCodec::Fields(_), _) => return mismatch(self.ty, j, "expected an object"),
            (CaseCodec::Inline { codec, .. }, _) => vec![codec.decode(j)?],
            (CaseCodec::Scalar, _) => Vec::new(),
        };
        (case.build)(args)
    }
}

fn opaque_object(registry: &Registry, ty: &'static str, opaque: OpaqueShape) -> Result<Codec> {
    let create = opaque
        .create
        .ok_or_else(|| Error::unsupported(ty, "opaque type has no default constructor"))?;

    let mut members = Vec::new();
    let mut setters = Vec::new();
    for field in opaque.fields.iter().filter(|f| f.serializable) {
        let desc = TypeDescriptor::resolve(field.field.ty, Some(&field.field), None);
        members.push(Member {
            wire_name: field.field.wire_name,
            get: field.field.get,
            codec: registry.codec_for(desc)?,
        });
        setters.push(field.set);
    }
    let fields = Arc::new(ObjectFields { members });

    let encoder = fields.clone();
    Ok(Codec::new(
        move |v| {
            let mut object = Object::with_capacity(encoder.members.len());
            encoder.encode_into(v, &mut object)?;
            Ok(Value::Object(object))
        },
        move |j| {
            let object = match j {
                Value::Object(object) => object,
                _ => return mismatch(ty, j, "expected an object"),
            };
            let mut value = create();
            for (member, set) in fields.members.iter().zip(&setters) {
                // Members the object lacks keep their default.
                if let Some(x) = object.get(member.wire_name) {
                    set(&mut *value, member.codec.decode(x)?)?;
                }
            }
            Ok(value)
        },
    ))
}

