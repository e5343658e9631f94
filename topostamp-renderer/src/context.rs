//! Instance context → [`tera::Context`] binding.
//!
//! Bound names:
//!
//! | Name               | Value                                        |
//! |--------------------|----------------------------------------------|
//! | `index`            | instance ordinal                             |
//! | `name`             | instance name                                |
//! | `idOffset`         | identifier base for the instance             |
//! | `instance_count`   | number of instances in the run               |
//! | `search_locations` | request search locations, as strings         |
//! | `params`           | per-instance parameters, as one object       |
//! | *each param key*   | the same parameters, bound at top level      |
//!
//! `template_name`, `template_index` and `template_offset` alias `name`,
//! `index` and `idOffset`; existing `topology-templates` libraries use them.

use topostamp_core::types::{InstanceContext, RESERVED_CONTEXT_KEYS};

use crate::error::RenderError;

/// Build the tera context for one instance.
///
/// Parameter keys that collide with built-in names are not merged at top
/// level; they stay reachable through `params`.
pub fn to_tera_context(ctx: &InstanceContext) -> Result<tera::Context, RenderError> {
    let mut tera_ctx = tera::Context::from_serialize(ctx).map_err(RenderError::Context)?;
    tera_ctx.insert("template_name", &ctx.name);
    tera_ctx.insert("template_index", &ctx.index);
    tera_ctx.insert("template_offset", &ctx.id_offset);
    for (key, value) in &ctx.params {
        if RESERVED_CONTEXT_KEYS.contains(&key.as_str()) {
            continue;
        }
        tera_ctx.insert(key.as_str(), value);
    }
    Ok(tera_ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use topostamp_core::types::InstanceName;

    fn make_ctx() -> InstanceContext {
        let mut params = Map::new();
        params.insert("queue_depth".into(), json!(8));
        params.insert("name".into(), json!("shadow"));
        InstanceContext {
            index: 2,
            name: InstanceName::from("radio"),
            id_offset: 0x200,
            instance_count: 3,
            search_locations: vec!["/fprime".into()],
            params,
        }
    }

    #[test]
    fn builtins_and_params_are_bound() {
        let ctx = to_tera_context(&make_ctx()).expect("context conversion");
        let json = ctx.into_json();
        assert_eq!(json["index"], json!(2));
        assert_eq!(json["idOffset"], json!(512));
        assert_eq!(json["queue_depth"], json!(8));
        assert_eq!(json["params"]["queue_depth"], json!(8));
        assert_eq!(json["search_locations"], json!(["/fprime"]));
    }

    #[test]
    fn template_prefixed_aliases_are_bound() {
        let json = to_tera_context(&make_ctx()).unwrap().into_json();
        assert_eq!(json["template_name"], json!("radio"));
        assert_eq!(json["template_index"], json!(2));
        assert_eq!(json["template_offset"], json!(512));
    }

    #[test]
    fn params_never_shadow_builtins() {
        let json = to_tera_context(&make_ctx()).unwrap().into_json();
        assert_eq!(json["name"], json!("radio"));
        assert_eq!(json["params"]["name"], json!("shadow"));
    }
}
