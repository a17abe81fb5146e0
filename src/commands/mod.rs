//! Generic command executor.
//!
//! Every resource subcommand funnels into the same handful of verb
//! handlers; which resource they act on is configuration (the
//! descriptor), not code.

use crate::cli::{
    CreateArgs, DescriptorAction, ListArgs, MeaAction, ReadAction, ResourceAction, ShowArgs,
    UpdateArgs,
};
use crate::display::{print_output, print_success};
use anyhow::{bail, Context, Result};
use apmec_api::Apmec;
use apmec_core::resources::{ResourceDescriptor, MEA, MEAD};
use apmec_core::wrap_resource;
use serde_json::{json, Value};
use std::path::Path;

pub fn run_resource(sdk: &Apmec, desc: &ResourceDescriptor, action: ResourceAction) -> Result<()> {
    match action {
        ResourceAction::List(args) => do_list(sdk, desc, &args),
        ResourceAction::Show(args) => do_show(sdk, desc, &args),
        ResourceAction::Create(args) => {
            let body = build_create_body(desc, &args)?;
            let result = sdk.create(desc, body)?;
            print_output(&result, &[]);
            Ok(())
        }
        ResourceAction::Update(args) => do_update(sdk, desc, &args),
        ResourceAction::Delete(args) => {
            sdk.delete(desc, &args.id)?;
            print_success(&format!("Deleted {} {}", desc.name, args.id));
            Ok(())
        }
    }
}

pub fn run_descriptor(
    sdk: &Apmec,
    desc: &ResourceDescriptor,
    action: DescriptorAction,
) -> Result<()> {
    match action {
        DescriptorAction::List(args) => do_list(sdk, desc, &args),
        DescriptorAction::Show(args) => do_show(sdk, desc, &args),
        DescriptorAction::Create(args) => {
            let body = build_create_body(desc, &args)?;
            // The MEAD service catalog entry is injected client-side.
            let result = if *desc == MEAD {
                sdk.create_mead(body)?
            } else {
                sdk.create(desc, body)?
            };
            print_output(&result, &[]);
            Ok(())
        }
        DescriptorAction::Delete(args) => {
            sdk.delete(desc, &args.id)?;
            print_success(&format!("Deleted {} {}", desc.name, args.id));
            Ok(())
        }
    }
}

pub fn run_mea(sdk: &Apmec, action: MeaAction) -> Result<()> {
    match action {
        MeaAction::List(args) => do_list(sdk, &MEA, &args),
        MeaAction::Show(args) => do_show(sdk, &MEA, &args),
        MeaAction::Create(args) => {
            let body = build_create_body(&MEA, &args)?;
            let result = sdk.create(&MEA, body)?;
            print_output(&result, &[]);
            Ok(())
        }
        MeaAction::Update(args) => do_update(sdk, &MEA, &args),
        MeaAction::Delete(args) => {
            sdk.delete(&MEA, &args.id)?;
            print_success(&format!("Deleted mea {}", args.id));
            Ok(())
        }
        MeaAction::Scale { id, attrs, file } => {
            let body = load_attrs(attrs.as_deref(), file.as_deref())?;
            if body.get("scale").is_none() {
                bail!("Scale body must be a 'scale' envelope");
            }
            let result = sdk.scale_mea(&id, body)?;
            print_output(&result, &[]);
            Ok(())
        }
        MeaAction::Resources { id } => {
            let result = sdk.list_mea_resources(&id, &[])?;
            print_output(&result, &[]);
            Ok(())
        }
        MeaAction::Events(args) => {
            let params = list_params(&args);
            let result = sdk.list_resource_events("mea", &params)?;
            print_output(&result, &args.fields);
            Ok(())
        }
    }
}

pub fn run_event(sdk: &Apmec, action: ReadAction) -> Result<()> {
    match action {
        ReadAction::List(args) => {
            let params = list_params(&args);
            let result = sdk.list_events(&params)?;
            print_output(&result, &args.fields);
            Ok(())
        }
        ReadAction::Show(args) => {
            let result = sdk.show_event(&args.id, &[])?;
            print_output(&result, &args.fields);
            Ok(())
        }
    }
}

pub fn run_extension(sdk: &Apmec, action: ReadAction) -> Result<()> {
    match action {
        ReadAction::List(args) => {
            let result = sdk.list_extensions(&[])?;
            print_output(&result, &args.fields);
            Ok(())
        }
        ReadAction::Show(args) => {
            let result = sdk.show_extension(&args.id, &[])?;
            print_output(&result, &args.fields);
            Ok(())
        }
    }
}

fn do_list(sdk: &Apmec, desc: &ResourceDescriptor, args: &ListArgs) -> Result<()> {
    let params = list_params(args);
    let result = sdk.list(desc, &params)?;
    print_output(&result, &args.fields);
    Ok(())
}

fn do_show(sdk: &Apmec, desc: &ResourceDescriptor, args: &ShowArgs) -> Result<()> {
    let result = sdk.show(desc, &args.id, &[])?;
    print_output(&result, &args.fields);
    Ok(())
}

fn do_update(sdk: &Apmec, desc: &ResourceDescriptor, args: &UpdateArgs) -> Result<()> {
    let attrs = load_attrs(args.attrs.as_deref(), args.file.as_deref())?;
    if !attrs.is_object() {
        bail!("Update attributes must be a mapping");
    }
    let result = sdk.update(desc, &args.id, wrap_resource(desc.name, attrs))?;
    print_output(&result, &[]);
    Ok(())
}

/// Translate list flags into query parameters. Repeated sort keys and
/// directions encode as repeated parameters.
fn list_params(args: &ListArgs) -> Vec<(String, String)> {
    let mut params = Vec::new();
    if let Some(page_size) = args.page_size {
        params.push(("limit".to_string(), page_size.to_string()));
    }
    for key in &args.sort_key {
        params.push(("sort_key".to_string(), key.clone()));
    }
    for dir in &args.sort_dir {
        params.push(("sort_dir".to_string(), dir.clone()));
    }
    if args.page_reverse {
        params.push(("page_reverse".to_string(), "true".to_string()));
    }
    params
}

/// Wrap create attributes into the resource envelope, folding the
/// `--name`/`--description` shortcuts into the payload.
fn build_create_body(desc: &ResourceDescriptor, args: &CreateArgs) -> Result<Value> {
    let mut attrs = load_attrs(args.attrs.as_deref(), args.file.as_deref())?;
    if !attrs.is_object() {
        bail!("Create attributes must be a mapping");
    }
    if let Some(name) = &args.name {
        attrs["name"] = json!(name);
    }
    if let Some(description) = &args.description {
        attrs["description"] = json!(description);
    }
    Ok(wrap_resource(desc.name, attrs))
}

/// Load attributes from the inline JSON string or a YAML/JSON file.
/// YAML is a superset of JSON, so `.json` files parse too.
fn load_attrs(inline: Option<&str>, file: Option<&Path>) -> Result<Value> {
    match (inline, file) {
        (Some(text), _) => {
            serde_json::from_str(text).context("Invalid JSON in --attrs")
        }
        (None, Some(path)) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Unable to read {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML/JSON in {}", path.display()))
        }
        (None, None) => Ok(json!({})),
    }
}
