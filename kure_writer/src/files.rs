use kure_layout::{ApplicationFileMode, FilePer, ManifestLayout};
use kure_scheme::Object;

use crate::config::WriterConfig;
use crate::error::{Error, Result};
use crate::path::to_repo_path;

/// One manifest file's worth of Objects, in the order they were generated.
pub struct FileGroup<'a> {
    pub name: String,
    pub objects: Vec<&'a Object>,
}

/// The result of grouping a directory's resources into files: the file
/// groups themselves, plus which child directories got a Flux Kustomization
/// stand-in file rather than a bare directory reference (§4.8).
pub struct Grouped<'a> {
    pub files: Vec<FileGroup<'a>>,
    /// `(child name, stand-in file name)` pairs.
    pub integrated_children: Vec<(String, String)>,
}

fn is_flux_kustomization(object: &Object) -> bool {
    let gvk = object.gvk();
    gvk.group == "kustomize.toolkit.fluxcd.io" && gvk.kind == "Kustomization"
}

/// For a Flux Kustomization stand-in object, the child directory (if any,
/// among `layout.children`) whose own planned path its `spec.path` matches.
fn integrated_target<'a>(object: &Object, layout: &'a ManifestLayout) -> Option<&'a ManifestLayout> {
    let document = object.to_value();
    let spec_path = document.pointer("/spec/path").and_then(|v| v.as_str())?;
    layout.children.iter().find(|child| to_repo_path(&child.path) == spec_path)
}

/// Splits a directory's resources into named file groups per
/// `ApplicationFileMode`/`FilePer` (§4.8 step 2).
///
/// Flux Kustomization stand-in objects (see [`is_flux_kustomization`]) are
/// pulled out first and named `flux-system-kustomization-{child}.yaml`
/// whenever their `spec.path` corresponds to one of this directory's own
/// children; this is `FluxPlacement::Integrated`'s colocation convention.
/// Everything else is grouped by `ApplicationFileMode`/`FilePer` as usual.
/// `Single` takes priority over `FilePer` and collapses the whole
/// directory's remaining resources into one file, since Application
/// identity is not recoverable once `ApplicationGrouping::Flat` has merged
/// several Applications' objects into the same `ManifestLayout` (see
/// DESIGN.md).
pub fn group_files<'a>(
    layout: &'a ManifestLayout,
    config: &WriterConfig,
    file_mode: ApplicationFileMode,
    file_per: FilePer,
) -> Result<Grouped<'a>> {
    if layout.resources.is_empty() {
        return Ok(Grouped {
            files: Vec::new(),
            integrated_children: Vec::new(),
        });
    }

    let mut integrated_children = Vec::new();
    let mut stand_ins = Vec::new();
    let mut rest = Vec::new();
    for object in &layout.resources {
        if is_flux_kustomization(object) {
            if let Some(child) = integrated_target(object, layout) {
                let file_name = format!("flux-system-kustomization-{}.yaml", child.name);
                integrated_children.push((child.name.clone(), file_name.clone()));
                stand_ins.push(FileGroup {
                    name: file_name,
                    objects: vec![object],
                });
                continue;
            }
        }
        rest.push(object);
    }

    let mut files = stand_ins;
    if !rest.is_empty() {
        files.extend(group_rest(layout, &rest, config, file_mode, file_per));
    }
    check_unique_names(&layout.path, &files)?;
    Ok(Grouped { files, integrated_children })
}

fn group_rest<'a>(
    layout: &'a ManifestLayout,
    rest: &[&'a Object],
    config: &WriterConfig,
    file_mode: ApplicationFileMode,
    file_per: FilePer,
) -> Vec<FileGroup<'a>> {
    if matches!(file_mode, ApplicationFileMode::Single) {
        let name = (config.single_file_name)(&layout.name);
        return vec![FileGroup {
            name,
            objects: rest.to_vec(),
        }];
    }

    match file_per {
        FilePer::Resource => rest
            .iter()
            .map(|object| FileGroup {
                name: (config.file_name)(object),
                objects: vec![*object],
            })
            .collect(),
        FilePer::Kind => group_by_kind(rest, config),
    }
}

fn group_by_kind<'a>(rest: &[&'a Object], config: &WriterConfig) -> Vec<FileGroup<'a>> {
    let mut names: Vec<String> = Vec::new();
    let mut groups: Vec<FileGroup<'a>> = Vec::new();
    for object in rest {
        let name = (config.kind_file_name)(object);
        if let Some(pos) = names.iter().position(|n| n == &name) {
            groups[pos].objects.push(object);
        } else {
            names.push(name.clone());
            groups.push(FileGroup {
                name,
                objects: vec![*object],
            });
        }
    }
    groups
}

fn check_unique_names(dir: &std::path::Path, groups: &[FileGroup<'_>]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for group in groups {
        if !seen.insert(group.name.as_str()) {
            return Err(Error::DuplicateFileName {
                dir: dir.to_path_buf(),
                name: group.name.clone(),
            });
        }
    }
    Ok(())
}
