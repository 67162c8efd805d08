use crate::shape::{CaseShape, FieldShape, Shape, TypeRef, UnionShape};

/// Facts about a type at one declaration site.
///
/// The same Rust type can need different codecs depending on where it is
/// declared: `Option<T>` as a struct field is left out when `None`, and a
/// date field may carry its own format. The registry caches codecs by
/// descriptor, not by bare type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub ty: TypeRef,
    /// Declared as a record or case field of type `Option<_>`.
    pub is_optional_field: bool,
    /// A small union whose only data-less case is written as `null`.
    pub is_nullable_union: bool,
    /// `None` means the default round-trip format.
    pub date_format: Option<&'static str>,
}

impl TypeDescriptor {
    /// Descriptor of a type used outside any field, e.g. at top level or as a
    /// sequence element.
    pub fn of(ty: TypeRef) -> Self {
        TypeDescriptor::resolve(ty, None, None)
    }

    /// Descriptor of `ty` declared as `field`, which belongs to `case` of a
    /// union when given.
    pub fn resolve(
        ty: TypeRef,
        field: Option<&FieldShape>,
        case: Option<(&UnionShape, &CaseShape)>,
    ) -> Self {
        let shape = ty.shape();

        let is_optional_field = field.is_some() && matches!(shape, Shape::Option(_));

        let date_format = field.and_then(|field| {
            field.date_format.or_else(|| {
                let (union, case) = case?;
                union
                    .date_formats
                    .iter()
                    .find(|f| f.case == case.name && f.field == field.name)
                    .map(|f| f.format)
            })
        });

        TypeDescriptor {
            ty,
            is_optional_field,
            is_nullable_union: is_nullable_union(&shape),
            date_format,
        }
    }

    /// Descriptor of the type wrapped by this one, keeping the date format of
    /// the declaration site.
    pub fn inner(&self, ty: TypeRef) -> Self {
        TypeDescriptor {
            date_format: self.date_format,
            ..TypeDescriptor::of(ty)
        }
    }
}

fn is_nullable_union(shape: &Shape) -> bool {
    match shape {
        Shape::Union(union) => {
            union.null_case
                && union.cases.len() < 4
                && union.cases.iter().filter(|c| c.fields.is_empty()).count() == 1
        }
        _ => false,
    }
}

/// Index of the case written as `null` in a nullable union.
pub(crate) fn null_case(union: &UnionShape) -> Option<usize> {
    union.cases.iter().position(|c| c.fields.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{CaseDateFormat, UnionTag};
    use std::any::Any;

    fn case(name: &'static str, fields: Vec<FieldShape>) -> CaseShape {
        CaseShape {
            name,
            wire_name: name,
            fields,
            positional: false,
            constant: None,
            build: |_| Ok(Box::new(())),
        }
    }

    fn field(name: &'static str) -> FieldShape {
        FieldShape::new(name, TypeRef::of::<String>(), |v| Ok(v as &dyn Any))
    }

    fn union(null_case: bool, cases: Vec<CaseShape>) -> UnionShape {
        UnionShape {
            cases,
            tag: UnionTag::Standard,
            null_case,
            date_formats: vec![CaseDateFormat {
                case: "B",
                field: "at",
                format: "%Y",
            }],
            case_of: |_| Ok(0),
        }
    }

    #[test]
    fn nullable_needs_small_union_with_one_empty_case() {
        let ok = union(true, vec![case("A", vec![]), case("B", vec![field("x")])]);
        assert!(is_nullable_union(&Shape::Union(ok)));

        let unmarked = union(false, vec![case("A", vec![]), case("B", vec![field("x")])]);
        assert!(!is_nullable_union(&Shape::Union(unmarked)));

        let two_empty = union(true, vec![case("A", vec![]), case("B", vec![])]);
        assert!(!is_nullable_union(&Shape::Union(two_empty)));

        let too_many = union(
            true,
            vec![
                case("A", vec![]),
                case("B", vec![field("x")]),
                case("C", vec![field("y")]),
                case("D", vec![field("z")]),
            ],
        );
        assert!(!is_nullable_union(&Shape::Union(too_many)));
    }

    #[test]
    fn option_is_optional_only_as_a_field() {
        let ty = TypeRef::of::<Option<i32>>();
        assert!(!TypeDescriptor::of(ty).is_optional_field);
        let f = FieldShape::new("age", ty, |v| Ok(v as &dyn Any));
        assert!(TypeDescriptor::resolve(ty, Some(&f), None).is_optional_field);
    }

    #[test]
    fn date_format_prefers_the_field() {
        let u = union(false, vec![case("A", vec![]), case("B", vec![field("at")])]);
        let ty = TypeRef::of::<String>();

        let plain = field("at");
        let desc = TypeDescriptor::resolve(ty, Some(&plain), Some((&u, &u.cases[1])));
        assert_eq!(desc.date_format, Some("%Y"));

        let own = field("at").date_format("%d");
        let desc = TypeDescriptor::resolve(ty, Some(&own), Some((&u, &u.cases[1])));
        assert_eq!(desc.date_format, Some("%d"));

        let desc = TypeDescriptor::resolve(ty, Some(&plain), Some((&u, &u.cases[0])));
        assert_eq!(desc.date_format, None);
    }
}
