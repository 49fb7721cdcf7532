//! Call resolution.
//!
//! Given a logical method and its raw arguments, the resolver decides which
//! remote operation was intended and assembles that operation's ordered
//! parameter list in wire form. Pure computation; nothing here touches the
//! network.

use std::collections::BTreeMap;

use stratum_types::{Timestamp, Value};
use stratum_wire::{WireParam, WireValue};

use crate::alias::{self, Role};
use crate::args::{Argument, CallArgs};
use crate::error::{DriverError, DriverResult};
use crate::registry::{self, Arity, Method};
use crate::time;

/// Resolves a call into a wire operation identifier and its ordered
/// parameters.
///
/// The session triple (credential, transaction, environment) is appended
/// by the dispatching client, not here.
pub fn resolve(method: Method, args: CallArgs) -> DriverResult<(&'static str, Vec<WireParam>)> {
    let (mut positional, mut named) = args.into_parts();

    // A trailing bundle is named arguments, not a positional value.
    if matches!(positional.last(), Some(Argument::Bundle(_))) {
        if let Some(Argument::Bundle(bundle)) = positional.pop() {
            named.merge(bundle);
        }
    }

    let roles = registry::roles_for(method);
    let mut bound: BTreeMap<Role, Argument> = BTreeMap::new();
    let mut positional_roles: Vec<Role> = Vec::new();
    let mut prefix: Vec<(Role, Arity)> = Vec::new();

    // Positional binding: each argument takes the first role, in canonical
    // order, that accepts its shape AND continues some variant's declared
    // parameter order after the roles already bound. The second condition
    // keeps, say, a text argument after a record from binding the key slot
    // when no variant declares a key there.
    for (index, arg) in positional.into_iter().enumerate() {
        if matches!(arg, Argument::Bundle(_)) {
            return Err(DriverError::resolution(
                method.name(),
                format!(
                    "a named-argument bundle must be the trailing argument (found at position {})",
                    index + 1
                ),
            ));
        }
        let arity = arity_of(&arg);
        let role = roles.iter().copied().find(|role| {
            !bound.contains_key(role)
                && accepts(*role, &arg)
                && extends_a_variant(method, &prefix, *role, arity)
        });
        match role {
            Some(role) => {
                positional_roles.push(role);
                prefix.push((role, arity));
                bound.insert(role, arg);
            }
            None => {
                return Err(DriverError::resolution(
                    method.name(),
                    format!("argument at position {} fits no parameter role", index + 1),
                ));
            }
        }
    }

    // Named binding through the alias table.
    for &role in roles {
        let Some(arg) = alias::resolve(&named, role) else {
            continue;
        };
        if positional_roles.contains(&role) {
            return Err(DriverError::resolution(
                method.name(),
                format!(
                    "`{}` was supplied both positionally and as a named argument",
                    role.name()
                ),
            ));
        }
        if !accepts(role, arg) {
            return Err(DriverError::resolution(
                method.name(),
                format!("named argument for `{}` has the wrong shape", role.name()),
            ));
        }
        bound.insert(role, arg.clone());
    }

    let observed: BTreeMap<Role, Arity> = bound
        .iter()
        .map(|(role, arg)| (*role, arity_of(arg)))
        .collect();

    let variant = registry::match_variant(method, &observed)?;

    // Emit parameters in the variant's declared order, never call-site
    // order.
    let mut params = Vec::with_capacity(variant.params.len());
    for (role, _) in variant.params {
        let arg = bound.remove(role).ok_or(DriverError::MissingArgument {
            method: method.name(),
            role: role.name(),
        })?;
        params.push(to_wire_param(method, *role, arg)?);
    }

    Ok((variant.op, params))
}

fn arity_of(arg: &Argument) -> Arity {
    match arg {
        Argument::Many(_) => Arity::Many,
        _ => Arity::One,
    }
}

/// Whether binding `role` next would keep the positional roles bound so
/// far a prefix of at least one declared variant.
fn extends_a_variant(method: Method, prefix: &[(Role, Arity)], role: Role, arity: Arity) -> bool {
    registry::variants_for(method).iter().any(|v| {
        v.params.len() > prefix.len()
            && v.params[..prefix.len()] == prefix[..]
            && v.params[prefix.len()] == (role, arity)
    })
}

/// Whether `role` accepts an argument of this shape.
///
/// Key, criteria, and phrase slots take text; record slots take integers;
/// temporal slots take an absolute instant, an integer, or a textual time
/// expression. Value slots take any scalar. Collections are accepted only
/// where the role is declared collection-capable, and only when every
/// element fits.
fn accepts(role: Role, arg: &Argument) -> bool {
    match arg {
        Argument::One(value) => accepts_scalar(role, value),
        Argument::Many(items) => {
            collection_capable(role) && items.iter().all(|v| accepts_scalar(role, v))
        }
        Argument::Bundle(_) => false,
    }
}

fn accepts_scalar(role: Role, value: &Value) -> bool {
    match role {
        Role::Key | Role::Criteria | Role::Phrase => matches!(value, Value::Text(_)),
        Role::Record => matches!(value, Value::Integer(_)),
        Role::Timestamp | Role::Start | Role::End => matches!(
            value,
            Value::Integer(_) | Value::Timestamp(_) | Value::Text(_)
        ),
        Role::Value => !matches!(value, Value::Null),
    }
}

fn collection_capable(role: Role) -> bool {
    matches!(role, Role::Key | Role::Value | Role::Record)
}

fn to_wire_param(method: Method, role: Role, arg: Argument) -> DriverResult<WireParam> {
    match arg {
        Argument::One(value) => {
            let value = if temporal(role) {
                normalize_instant(value)?
            } else {
                value
            };
            Ok(WireParam::Value(WireValue::encode(&value)))
        }
        Argument::Many(items) => Ok(WireParam::List(
            items.iter().map(WireValue::encode).collect(),
        )),
        Argument::Bundle(_) => Err(DriverError::resolution(
            method.name(),
            "a named-argument bundle cannot fill a parameter slot",
        )),
    }
}

fn temporal(role: Role) -> bool {
    matches!(role, Role::Timestamp | Role::Start | Role::End)
}

/// Temporal slots carry absolute instants on the wire. Integers are taken
/// as already-absolute; text goes through the time parser.
fn normalize_instant(value: Value) -> DriverResult<Value> {
    match value {
        Value::Timestamp(_) => Ok(value),
        Value::Integer(micros) => Ok(Value::Timestamp(Timestamp::from_micros(micros))),
        Value::Text(phrase) => Ok(Value::Timestamp(time::parse_phrase(&phrase)?)),
        other => Err(DriverError::TimeParse(other.to_string())),
    }
}
