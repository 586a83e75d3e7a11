use std::fs;
use std::path::Path;

use kure_layout::{LayoutRules, ManifestLayout};
use kure_scheme::Object;
use tracing::{debug, instrument};

use crate::config::WriterConfig;
use crate::error::Error;
use crate::files::group_files;
use crate::kustomization;

/// Writes a planned `ManifestLayout` tree to disk under `config.base_path`
/// (§4.8). Only emittable directories (ones that carry a resource of their
/// own or have an emittable descendant, per P4) are created.
#[instrument(skip_all, fields(base = %config.base_path.display()))]
pub fn write(layout: &ManifestLayout, config: &WriterConfig, rules: &LayoutRules) -> crate::error::Result<()> {
    write_dir(layout, config, rules)
}

fn write_dir(layout: &ManifestLayout, config: &WriterConfig, rules: &LayoutRules) -> crate::error::Result<()> {
    if !layout.is_emittable() {
        return Ok(());
    }

    let abs_dir = config.base_path.join(&layout.path);
    fs::create_dir_all(&abs_dir).map_err(|e| Error::file_io(&abs_dir, e))?;
    debug!(dir = %abs_dir.display(), "created directory");

    let grouped = group_files(layout, config, rules.application_file_mode, rules.file_per)?;
    for file in &grouped.files {
        let path = abs_dir.join(&file.name);
        write_file(&path, &file.objects, config.strip)?;
    }

    let emittable_children: Vec<&ManifestLayout> =
        layout.children.iter().filter(|c| c.is_emittable()).collect();
    let child_names: Vec<String> = emittable_children.iter().map(|c| c.name.clone()).collect();
    let content = kustomization::build(rules.kustomization_mode, &grouped.files, &child_names, &grouped.integrated_children);
    let index_path = abs_dir.join("kustomization.yaml");
    fs::write(&index_path, content).map_err(|e| Error::file_io(&index_path, e))?;
    debug!(path = %index_path.display(), "wrote kustomization.yaml");

    for child in emittable_children {
        write_dir(child, config, rules)?;
    }
    Ok(())
}

fn write_file(path: &Path, objects: &[&Object], strip: kure_scheme::StripLevel) -> crate::error::Result<()> {
    let owned: Vec<Object> = objects.iter().map(|o| (*o).clone()).collect();
    let mut content = kure_scheme::serialize(&owned, strip)?;
    content.push('\n');
    fs::write(path, content).map_err(|e| Error::file_io(path, e))?;
    debug!(path = %path.display(), objects = owned.len(), "wrote manifest file");
    Ok(())
}
