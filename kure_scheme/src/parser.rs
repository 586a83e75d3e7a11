use kube::core::DynamicObject;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, trace, warn};

use crate::error::Error;
use crate::gvk::Gvk;
use crate::object::Object;
use crate::registry;

/// Options controlling how the Parser treats documents whose GVK is not in
/// the Scheme Registry.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParseOptions {
    /// When true, an unrecognized GVK decodes to [`Object::Free`] instead of
    /// failing the document.
    pub allow_unstructured: bool,
}

/// Parses a multi-document YAML byte stream into a list of [`Object`]s.
///
/// Per-document failures are collected rather than aborting the whole
/// stream: the return value always contains every document that parsed
/// successfully, plus `Some(Error::Aggregate(_))` iff at least one document
/// failed. Empty documents (a lone `---`, blank input) are skipped silently.
#[instrument(skip_all, fields(allow_unstructured = opts.allow_unstructured))]
pub fn parse(input: &str, opts: &ParseOptions) -> (Vec<Object>, Option<Error>) {
    let mut objects = Vec::new();
    let mut errors = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(input).enumerate() {
        match parse_document(index, document, opts) {
            Ok(Some(obj)) => objects.push(obj),
            Ok(None) => trace!(index, "skipped empty document"),
            Err(err) => errors.push(err),
        }
    }

    debug!(parsed = objects.len(), failed = errors.len(), "parse complete");
    (objects, Error::aggregate(errors))
}

fn parse_document(
    index: usize,
    document: serde_yaml::Deserializer<'_>,
    opts: &ParseOptions,
) -> Result<Option<Object>, Error> {
    let yaml_value = serde_yaml::Value::deserialize(document).map_err(|source| Error::ParseInvalid {
        index,
        source: Box::new(source),
    })?;
    if yaml_value.is_null() {
        return Ok(None);
    }

    let json_value: Value = serde_json::to_value(&yaml_value).map_err(|source| Error::ParseInvalid {
        index,
        source: Box::new(source),
    })?;

    let api_version = json_value
        .pointer("/apiVersion")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let kind = json_value.pointer("/kind").and_then(Value::as_str).unwrap_or_default();
    let gvk = Gvk::from_api_version(api_version, kind);

    match registry::decode(index, &gvk, json_value.clone())? {
        Some((value, type_name)) => Ok(Some(Object::Typed { gvk, type_name, value })),
        None if opts.allow_unstructured => {
            warn!(index, %gvk, "unrecognized kind, falling back to unstructured");
            let dynamic: DynamicObject = serde_json::from_value(json_value).map_err(|_| Error::TypeMismatch {
                index,
                gvk: gvk.clone(),
            })?;
            Ok(Some(Object::Free(dynamic)))
        }
        None => Err(Error::UnsupportedKind { index, gvk }),
    }
}

/// Parses every `*.yaml`/`*.yml` file directly under `dir`, in sorted
/// directory-then-filename order, concatenating their objects and
/// aggregating their errors.
#[instrument(skip(opts))]
pub fn parse_dir(dir: &std::path::Path, opts: &ParseOptions) -> (Vec<Object>, Option<Error>) {
    let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            matches!(
                e.path().extension().and_then(std::ffi::OsStr::to_str),
                Some("yaml") | Some("yml")
            )
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();

    let mut objects = Vec::new();
    let mut errors = Vec::new();
    for path in paths {
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let (objs, err) = parse(&contents, opts);
                objects.extend(objs);
                if let Some(err) = err {
                    errors.push(err);
                }
            }
            Err(source) => errors.push(Error::FileIo { path, source }),
        }
    }

    (objects, Error::aggregate(errors))
}
