//! How the cases of a union are told apart on the wire.
//!
//! A case is written either as a bare scalar (the `null` case of a nullable
//! union, or a constant case) or as an object. Objects carry a discriminator
//! member unless the union is untagged, in which case every object case is
//! recognized by a witness: a field name no other object case has.

use std::collections::HashSet;

use log::trace;

use crate::codec::descriptor::null_case;
use crate::codec::mismatch;
use crate::error::{Error, Result};
use crate::json::{number, Object, Value};
use crate::shape::{CaseShape, Constant, Shape, UnionShape, UnionTag};

/// Member holding the case index under the standard discriminator.
pub const STANDARD_TAG: &str = "$";

#[derive(Clone, Debug, PartialEq)]
pub enum CaseEncoding {
    /// Object with the case's own fields.
    Normal,
    /// Object with the fields of the case's single record field.
    InlineRecord,
    /// The whole case is this scalar.
    Constant(Constant),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Discriminator {
    /// `"$": <index>`.
    Standard,
    /// `"<name>": "<case wire name>"`.
    Named(&'static str),
    /// Witness field names with their case index, in the order they are
    /// tried when decoding.
    NoField(Vec<(&'static str, usize)>),
}

#[derive(Debug)]
pub struct UnionPlan {
    pub cases: Vec<CaseEncoding>,
    pub discriminator: Discriminator,
    /// Case written as `null`, for nullable unions.
    pub null_case: Option<usize>,
}

/// Decides the encoding of every case of `union`.
///
/// `ty` names the union in errors. Fails when a constant case carries
/// fields, or when an untagged union has a case without a witness.
pub fn plan(ty: &'static str, union: &UnionShape, nullable: bool) -> Result<UnionPlan> {
    let null_case = if nullable { null_case(union) } else { None };

    let cases = union
        .cases
        .iter()
        .map(|case| case_encoding(ty, case))
        .collect::<Result<Vec<_>>>()?;

    let discriminator = match union.tag {
        UnionTag::Standard => Discriminator::Standard,
        UnionTag::Named(name) => Discriminator::Named(name),
        UnionTag::Untagged => {
            let objects = (0..cases.len())
                .filter(|&i| Some(i) != null_case && !matches!(cases[i], CaseEncoding::Constant(_)))
                .map(|i| (i, object_fields(union, &cases, i)))
                .collect::<Vec<_>>();
            Discriminator::NoField(infer_witnesses(ty, union, &objects)?)
        }
    };

    trace!("{}: {:?}, null case {:?}", ty, discriminator, null_case);
    Ok(UnionPlan {
        cases,
        discriminator,
        null_case,
    })
}

fn case_encoding(ty: &'static str, case: &CaseShape) -> Result<CaseEncoding> {
    if let Some(constant) = case.constant {
        if !case.fields.is_empty() {
            return Err(Error::unsupported(
                ty,
                format!("constant case `{}` has fields", case.name),
            ));
        }
        return Ok(CaseEncoding::Constant(constant));
    }
    match case.fields.as_slice() {
        [only] if case.positional && matches!(only.ty.shape(), Shape::Record(_)) => {
            Ok(CaseEncoding::InlineRecord)
        }
        _ => Ok(CaseEncoding::Normal),
    }
}

/// Wire names of the members an object case writes besides the tag.
fn object_fields(union: &UnionShape, cases: &[CaseEncoding], i: usize) -> Vec<&'static str> {
    let case = &union.cases[i];
    match cases[i] {
        CaseEncoding::InlineRecord => match case.fields[0].ty.shape() {
            Shape::Record(record) => record.fields.iter().map(|f| f.wire_name).collect(),
            _ => Vec::new(),
        },
        _ => case.fields.iter().map(|f| f.wire_name).collect(),
    }
}

/// For each object case, the first of its field names that no other object
/// case carries.
fn infer_witnesses(
    ty: &'static str,
    union: &UnionShape,
    objects: &[(usize, Vec<&'static str>)],
) -> Result<Vec<(&'static str, usize)>> {
    let mut table = Vec::with_capacity(objects.len());
    for (i, names) in objects {
        let others: HashSet<&str> = objects
            .iter()
            .filter(|(j, _)| j != i)
            .flat_map(|(_, names)| names.iter().copied())
            .collect();
        match names.iter().find(|name| !others.contains(*name)) {
            Some(witness) => table.push((*witness, *i)),
            None => {
                return Err(Error::AmbiguousUnion {
                    ty,
                    case: union.cases[*i].name.to_owned(),
                })
            }
        }
    }
    Ok(table)
}

impl UnionPlan {
    /// Encoding of case `i` when it is written as a bare scalar.
    pub fn scalar(&self, ty: &'static str, i: usize) -> Result<Option<Value>> {
        if self.null_case == Some(i) {
            return Ok(Some(Value::Null));
        }
        match &self.cases[i] {
            CaseEncoding::Constant(c) => constant_value(ty, c).map(Some),
            _ => Ok(None),
        }
    }

    /// Discriminator member written first in the object of case `i`.
    pub fn tag(&self, union: &UnionShape, i: usize) -> Option<(&'static str, Value)> {
        match self.discriminator {
            Discriminator::Standard => Some((STANDARD_TAG, Value::Number(number::format_int(i)))),
            Discriminator::Named(name) => Some((name, Value::string(union.cases[i].wire_name))),
            Discriminator::NoField(_) => None,
        }
    }

    /// Index of the case `j` encodes.
    pub fn select(&self, ty: &'static str, union: &UnionShape, j: &Value) -> Result<usize> {
        if let (Value::Null, Some(i)) = (j, self.null_case) {
            return Ok(i);
        }
        match j {
            Value::Object(object) => self.select_object(ty, union, object, j),
            Value::Array(_) => mismatch(ty, j, "expected an object or a constant"),
            scalar => self
                .cases
                .iter()
                .position(|c| match c {
                    CaseEncoding::Constant(c) => constant_matches(c, scalar),
                    _ => false,
                })
                .map_or_else(|| mismatch(ty, j, "no case has this constant"), Ok),
        }
    }

    fn select_object(
        &self,
        ty: &'static str,
        union: &UnionShape,
        object: &Object,
        j: &Value,
    ) -> Result<usize> {
        match &self.discriminator {
            Discriminator::Standard => match object.get(STANDARD_TAG) {
                Some(Value::Number(text)) => match text.parse::<usize>() {
                    Ok(i) if i < union.cases.len() => Ok(i),
                    _ => mismatch(ty, j, "case index out of range"),
                },
                _ => mismatch(ty, j, "missing case index `$`"),
            },
            Discriminator::Named(name) => match object.get(name) {
                Some(Value::String(wire_name)) => union
                    .cases
                    .iter()
                    .position(|c| c.wire_name == wire_name.as_str())
                    .map_or_else(|| mismatch(ty, j, "unknown case name"), Ok),
                _ => mismatch(ty, j, &format!("missing discriminator `{}`", name)),
            },
            Discriminator::NoField(table) => table
                .iter()
                .find(|(witness, _)| object.contains_key(witness))
                .map(|&(_, i)| i)
                .map_or_else(|| mismatch(ty, j, "no witness field present"), Ok),
        }
    }
}

pub(crate) fn constant_value(ty: &'static str, constant: &Constant) -> Result<Value> {
    Ok(match *constant {
        Constant::Null => Value::Null,
        Constant::Bool(b) => Value::bool(b),
        Constant::Int(n) => Value::Number(number::format_int(n)),
        Constant::Float(n) => Value::Number(
            number::format_f64(n)
                .ok_or_else(|| Error::encode_mismatch(ty, "non-finite constant"))?,
        ),
        Constant::Str(s) => Value::string(s),
    })
}

fn constant_matches(constant: &Constant, j: &Value) -> bool {
    match (*constant, j) {
        (Constant::Null, Value::Null) => true,
        (Constant::Bool(b), Value::True) => b,
        (Constant::Bool(b), Value::False) => !b,
        (Constant::Str(s), Value::String(text)) => s == text,
        (Constant::Int(n), Value::Number(text)) => match text.parse::<i64>() {
            Ok(m) => m == n,
            Err(_) => text.parse::<f64>().map_or(false, |m| m == n as f64),
        },
        (Constant::Float(n), Value::Number(text)) => text.parse::<f64>().map_or(false, |m| m == n),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{FieldShape, TypeRef};
    use std::any::Any;

    fn field(name: &'static str) -> FieldShape {
        FieldShape::new(name, TypeRef::of::<i32>(), |v| Ok(v as &dyn Any))
    }

    fn case(name: &'static str, fields: &[&'static str]) -> CaseShape {
        CaseShape {
            name,
            wire_name: name,
            fields: fields.iter().copied().map(field).collect(),
            positional: false,
            constant: None,
            build: |_| Ok(Box::new(())),
        }
    }

    fn untagged(cases: Vec<CaseShape>) -> UnionShape {
        UnionShape {
            cases,
            tag: UnionTag::Untagged,
            null_case: false,
            date_formats: Vec::new(),
            case_of: |_| Ok(0),
        }
    }

    fn object(names: &[&str]) -> Value {
        Value::Object(names.iter().map(|n| (*n, Value::Null)).collect())
    }

    #[test]
    fn shared_field_is_ambiguous() {
        let union = untagged(vec![case("A", &["x"]), case("B", &["y"]), case("C", &["x", "z"])]);
        match plan("T", &union, false) {
            Err(Error::AmbiguousUnion { ty, case }) => {
                assert_eq!(ty, "T");
                assert_eq!(case, "A");
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn first_unique_name_is_the_witness() {
        let union = untagged(vec![
            case("A", &["x", "a1", "a2"]),
            case("B", &["x", "b"]),
            case("C", &["c"]),
        ]);
        let plan = plan("T", &union, false).unwrap();
        assert_eq!(
            plan.discriminator,
            Discriminator::NoField(vec![("a1", 0), ("b", 1), ("c", 2)])
        );

        assert_eq!(plan.select("T", &union, &object(&["x", "b"])).unwrap(), 1);
        assert_eq!(plan.select("T", &union, &object(&["c", "a1"])).unwrap(), 0);
        assert!(plan.select("T", &union, &object(&["x"])).is_err());
    }

    #[test]
    fn constants_are_not_witness_candidates() {
        let mut none = case("None", &[]);
        none.constant = Some(Constant::Str("none"));
        let union = untagged(vec![none, case("Some", &["value"])]);
        let plan = plan("T", &union, false).unwrap();
        assert_eq!(plan.discriminator, Discriminator::NoField(vec![("value", 1)]));
        assert_eq!(plan.scalar("T", 0).unwrap(), Some(Value::string("none")));
        assert_eq!(plan.select("T", &union, &Value::string("none")).unwrap(), 0);
        assert!(plan.select("T", &union, &Value::string("other")).is_err());
    }

    #[test]
    fn constant_with_fields_is_rejected() {
        let mut bad = case("A", &["x"]);
        bad.constant = Some(Constant::Int(1));
        let union = untagged(vec![bad]);
        assert!(matches!(plan("T", &union, false), Err(Error::Unsupported { .. })));
    }

    #[test]
    fn numeric_constants_compare_by_value() {
        assert!(constant_matches(&Constant::Int(1), &Value::Number("1.0".to_owned())));
        assert!(constant_matches(&Constant::Float(0.5), &Value::Number("5e-1".to_owned())));
        assert!(!constant_matches(&Constant::Int(1), &Value::string("1")));
    }

    #[test]
    fn standard_and_named_tags() {
        let mut union = untagged(vec![case("A", &[]), case("B", &["x"])]);
        union.tag = UnionTag::Standard;
        let standard = plan("T", &union, true).unwrap();
        assert_eq!(standard.scalar("T", 0).unwrap(), Some(Value::Null));
        assert_eq!(standard.tag(&union, 1), Some(("$", Value::Number("1".to_owned()))));
        assert_eq!(standard.select("T", &union, &Value::Null).unwrap(), 0);

        union.tag = UnionTag::Named("kind");
        let named = plan("T", &union, false).unwrap();
        assert_eq!(named.scalar("T", 0).unwrap(), None);
        let j = Value::Object(vec![("kind", Value::string("B"))].into_iter().collect());
        assert_eq!(named.select("T", &union, &j).unwrap(), 1);
    }
}
