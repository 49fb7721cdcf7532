//! Declarative catalog of remote operation variants.
//!
//! Each logical method maps to a closed set of concrete remote operations,
//! distinguished only by which parameter roles are present and whether each
//! carries a single item or a collection. The tables below are the complete
//! decision surface: resolution never consults anything else.

use std::collections::BTreeMap;

use crate::alias::Role;
use crate::error::{DriverError, DriverResult};

/// A caller-facing logical method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Add,
    Get,
    Set,
    Browse,
    Audit,
    Time,
}

impl Method {
    /// The method's caller-facing name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Method::Add => "add",
            Method::Get => "get",
            Method::Set => "set",
            Method::Browse => "browse",
            Method::Audit => "audit",
            Method::Time => "time",
        }
    }
}

/// Whether a parameter slot takes a single item or a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    One,
    Many,
}

/// One concrete remote operation signature.
#[derive(Debug, PartialEq, Eq)]
pub struct Variant {
    /// Wire operation identifier.
    pub op: &'static str,
    /// Required parameter roles, in transmission order.
    pub params: &'static [(Role, Arity)],
}

use self::Arity::{Many, One};
use crate::alias::Role::{Criteria, End, Key, Phrase, Record, Start, Timestamp, Value};

static ADD_VARIANTS: &[Variant] = &[
    Variant {
        op: "add_key_value",
        params: &[(Key, One), (Value, One)],
    },
    Variant {
        op: "add_key_value_record",
        params: &[(Key, One), (Value, One), (Record, One)],
    },
    Variant {
        op: "add_key_value_records",
        params: &[(Key, One), (Value, One), (Record, Many)],
    },
];

static GET_VARIANTS: &[Variant] = &[
    Variant {
        op: "get_key_record",
        params: &[(Key, One), (Record, One)],
    },
    Variant {
        op: "get_key_record_time",
        params: &[(Key, One), (Record, One), (Timestamp, One)],
    },
    Variant {
        op: "get_key_records",
        params: &[(Key, One), (Record, Many)],
    },
    Variant {
        op: "get_key_records_time",
        params: &[(Key, One), (Record, Many), (Timestamp, One)],
    },
    Variant {
        op: "get_keys_record",
        params: &[(Key, Many), (Record, One)],
    },
    Variant {
        op: "get_keys_record_time",
        params: &[(Key, Many), (Record, One), (Timestamp, One)],
    },
    Variant {
        op: "get_keys_records",
        params: &[(Key, Many), (Record, Many)],
    },
    Variant {
        op: "get_keys_records_time",
        params: &[(Key, Many), (Record, Many), (Timestamp, One)],
    },
    Variant {
        op: "get_criteria",
        params: &[(Criteria, One)],
    },
    Variant {
        op: "get_criteria_time",
        params: &[(Criteria, One), (Timestamp, One)],
    },
    Variant {
        op: "get_key_criteria",
        params: &[(Key, One), (Criteria, One)],
    },
    Variant {
        op: "get_key_criteria_time",
        params: &[(Key, One), (Criteria, One), (Timestamp, One)],
    },
    Variant {
        op: "get_keys_criteria",
        params: &[(Key, Many), (Criteria, One)],
    },
    Variant {
        op: "get_keys_criteria_time",
        params: &[(Key, Many), (Criteria, One), (Timestamp, One)],
    },
];

static SET_VARIANTS: &[Variant] = &[
    Variant {
        op: "set_key_value",
        params: &[(Key, One), (Value, One)],
    },
    Variant {
        op: "set_key_value_record",
        params: &[(Key, One), (Value, One), (Record, One)],
    },
    Variant {
        op: "set_key_value_records",
        params: &[(Key, One), (Value, One), (Record, Many)],
    },
];

static BROWSE_VARIANTS: &[Variant] = &[
    Variant {
        op: "browse_key",
        params: &[(Key, One)],
    },
    Variant {
        op: "browse_keys",
        params: &[(Key, Many)],
    },
    Variant {
        op: "browse_key_time",
        params: &[(Key, One), (Timestamp, One)],
    },
    Variant {
        op: "browse_keys_time",
        params: &[(Key, Many), (Timestamp, One)],
    },
];

static AUDIT_VARIANTS: &[Variant] = &[
    Variant {
        op: "audit_record",
        params: &[(Record, One)],
    },
    Variant {
        op: "audit_record_start",
        params: &[(Record, One), (Start, One)],
    },
    Variant {
        op: "audit_record_start_end",
        params: &[(Record, One), (Start, One), (End, One)],
    },
    Variant {
        op: "audit_key_record",
        params: &[(Key, One), (Record, One)],
    },
    Variant {
        op: "audit_key_record_start",
        params: &[(Key, One), (Record, One), (Start, One)],
    },
    Variant {
        op: "audit_key_record_start_end",
        params: &[(Key, One), (Record, One), (Start, One), (End, One)],
    },
];

static TIME_VARIANTS: &[Variant] = &[
    Variant {
        op: "time",
        params: &[],
    },
    Variant {
        op: "time_phrase",
        params: &[(Phrase, One)],
    },
];

/// Returns the operation variants declared for `method`.
pub fn variants_for(method: Method) -> &'static [Variant] {
    match method {
        Method::Add => ADD_VARIANTS,
        Method::Get => GET_VARIANTS,
        Method::Set => SET_VARIANTS,
        Method::Browse => BROWSE_VARIANTS,
        Method::Audit => AUDIT_VARIANTS,
        Method::Time => TIME_VARIANTS,
    }
}

/// Roles bindable for `method`, in canonical positional order.
///
/// Positional arguments bind to the first unbound role, in this order,
/// that accepts their shape.
pub fn roles_for(method: Method) -> &'static [Role] {
    match method {
        Method::Add | Method::Set => &[Key, Value, Record],
        Method::Get => &[Key, Criteria, Record, Timestamp],
        Method::Browse => &[Key, Timestamp],
        Method::Audit => &[Key, Record, Start, End],
        Method::Time => &[Phrase],
    }
}

/// Selects the variant whose role set and per-role arity exactly match
/// `observed`.
///
/// Zero exact matches fall back to a minimal-superset probe so the caller
/// hears about the specific role that is missing; anything else is a
/// resolution failure. More than one exact match means the registry itself
/// declares overlapping variants, which is a defect and is never resolved
/// by priority.
pub fn match_variant(
    method: Method,
    observed: &BTreeMap<Role, Arity>,
) -> DriverResult<&'static Variant> {
    let variants = variants_for(method);

    let mut exact = variants.iter().filter(|v| {
        v.params.len() == observed.len()
            && v.params
                .iter()
                .all(|(role, arity)| observed.get(role) == Some(arity))
    });

    match (exact.next(), exact.next()) {
        (Some(variant), None) => Ok(variant),
        (Some(a), Some(b)) => Err(DriverError::resolution(
            method.name(),
            format!(
                "argument shape matches both `{}` and `{}`; the operation registry is ambiguous",
                a.op, b.op
            ),
        )),
        (None, _) => missing_roles(method, observed),
    }
}

/// Zero exact matches: if exactly one variant is a minimal superset of the
/// observed roles (agreeing on arity where they overlap), the call is
/// merely incomplete and the first unresolved role is reported by name.
fn missing_roles(
    method: Method,
    observed: &BTreeMap<Role, Arity>,
) -> DriverResult<&'static Variant> {
    if observed.is_empty() {
        return Err(DriverError::resolution(
            method.name(),
            "no operation variant matches the supplied arguments",
        ));
    }

    let supersets: Vec<&Variant> = variants_for(method)
        .iter()
        .filter(|v| {
            observed.iter().all(|(role, arity)| {
                v.params
                    .iter()
                    .any(|(r, a)| r == role && a == arity)
            })
        })
        .collect();

    let minimal = supersets.iter().map(|v| v.params.len()).min();
    if let Some(len) = minimal {
        let mut smallest = supersets.iter().filter(|v| v.params.len() == len);
        if let (Some(variant), None) = (smallest.next(), smallest.next()) {
            if let Some((role, _)) = variant
                .params
                .iter()
                .find(|(role, _)| !observed.contains_key(role))
            {
                return Err(DriverError::MissingArgument {
                    method: method.name(),
                    role: role.name(),
                });
            }
        }
    }

    Err(DriverError::resolution(
        method.name(),
        "no operation variant matches the supplied arguments",
    ))
}
