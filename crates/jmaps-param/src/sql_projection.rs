//! SQL projection: flattening a parameter tree into the dotted-key JSON
//! map used for fingerprinting and cache schemas.

use crate::error::ParamError;
use crate::node::{JParam, NodeKind};
use jmaps_core::{sql_type_tag, SqlScalar, SqlType};
use std::collections::BTreeMap;

impl JParam {
    /// Flatten this subtree into a dotted-key map.
    ///
    /// - A `Dict` includes a child iff `child.used() || show_unused`.
    /// - `Invisible` children are omitted unless `show_invisible`.
    /// - `Buffer`/`YBuffer` project like a `Dict` over their args plus a
    ///   `"{key}.var"` entry carrying the bound function's name.
    /// - `XBuffer` replaces its own entry with its (cast) output; its
    ///   args never appear.
    /// - When `return_schema` is set, every scalar entry becomes its
    ///   canonical SQL type tag instead of its value.
    pub fn get_sql_data(
        &mut self,
        show_unused: bool,
        show_invisible: bool,
        return_schema: bool,
    ) -> Result<BTreeMap<String, serde_json::Value>, ParamError> {
        let mut out = BTreeMap::new();
        self.project_into(None, show_unused, show_invisible, return_schema, &mut out)?;
        Ok(out)
    }

    fn project_into(
        &mut self,
        prefix: Option<&str>,
        show_unused: bool,
        show_invisible: bool,
        return_schema: bool,
        out: &mut BTreeMap<String, serde_json::Value>,
    ) -> Result<(), ParamError> {
        match &mut self.kind {
            NodeKind::Value { value, dtype } => {
                let key = prefix.unwrap_or("$value").to_string();
                let entry = project_scalar(value, *dtype, return_schema)?;
                out.insert(key, entry);
            }
            NodeKind::Dict(children) => {
                for (name, child) in children.iter_mut() {
                    if !include_child(child, show_unused, show_invisible) {
                        continue;
                    }
                    let child_prefix = match prefix {
                        Some(p) => format!("{p}.{name}"),
                        None => name.clone(),
                    };
                    child.project_into(Some(&child_prefix), show_unused, show_invisible, return_schema, out)?;
                }
            }
            NodeKind::Invisible(inner) => {
                inner.project_into(prefix, show_unused, show_invisible, return_schema, out)?;
            }
            NodeKind::Buffer(b) | NodeKind::YBuffer(b) => {
                let key_prefix = prefix.unwrap_or("$value").to_string();
                for (name, child) in b.args_mut().iter_mut() {
                    if !include_child(child, show_unused, show_invisible) {
                        continue;
                    }
                    let child_prefix = format!("{key_prefix}.{name}");
                    child.project_into(Some(&child_prefix), show_unused, show_invisible, return_schema, out)?;
                }
                out.insert(
                    format!("{key_prefix}.var"),
                    serde_json::Value::String(b.var_name.clone()),
                );
            }
            NodeKind::XBuffer(b, dtype) => {
                let key = prefix.unwrap_or("$value").to_string();
                let output = b.evaluate();
                let entry = project_scalar(&output, *dtype, return_schema)?;
                out.insert(key, entry);
            }
            NodeKind::Refer(r) => {
                let path = r.path_string();
                let inner = r
                    .resolved_mut()
                    .ok_or(ParamError::ReferNotInitialized { path })?;
                inner.project_into(prefix, show_unused, show_invisible, return_schema, out)?;
            }
        }
        Ok(())
    }
}

fn include_child(child: &JParam, show_unused: bool, show_invisible: bool) -> bool {
    if !(child.used() || show_unused) {
        return false;
    }
    if matches!(child.kind, NodeKind::Invisible(_)) && !show_invisible {
        return false;
    }
    true
}

fn project_scalar(
    value: &jmaps_core::JValue,
    dtype: Option<SqlType>,
    return_schema: bool,
) -> Result<serde_json::Value, ParamError> {
    if return_schema {
        let tag = sql_type_tag(value, dtype)?;
        Ok(serde_json::Value::String(tag.to_string()))
    } else {
        let scalar = jmaps_core::cast_sql_value(value, dtype)?;
        Ok(scalar_to_json(scalar))
    }
}

fn scalar_to_json(scalar: SqlScalar) -> serde_json::Value {
    match scalar {
        SqlScalar::Bool(b) => serde_json::Value::Bool(b),
        SqlScalar::Int(i) => serde_json::Value::Number(i.into()),
        SqlScalar::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        SqlScalar::Str(s) => serde_json::Value::String(s),
    }
}
