use std::io::Write;

use kure_layout::{LayoutRules, ManifestLayout};
use kure_scheme::Object;
use tar::{Builder, Header};
use tracing::{debug, instrument};

use crate::config::WriterConfig;
use crate::error::Error;
use crate::files::group_files;
use crate::kustomization;
use crate::path::to_repo_path;

/// Writes a planned `ManifestLayout` tree into a tar archive, mirroring
/// [`crate::fs::write`] bit-for-bit modulo tar-header fields: forward-slash
/// entry names, every directory listing sorted, and fixed header metadata
/// (mtime/uid/gid all zero) so two runs over equal input produce a
/// byte-identical archive (§4.8, P2).
#[instrument(skip_all)]
pub fn write<W: Write>(layout: &ManifestLayout, config: &WriterConfig, rules: &LayoutRules, into: W) -> crate::error::Result<()> {
    let mut builder = Builder::new(into);
    write_dir(layout, config, rules, &mut builder)?;
    builder.into_inner().map_err(|e| Error::file_io(&config.base_path, e))?;
    Ok(())
}

fn write_dir<W: Write>(
    layout: &ManifestLayout,
    config: &WriterConfig,
    rules: &LayoutRules,
    builder: &mut Builder<W>,
) -> crate::error::Result<()> {
    if !layout.is_emittable() {
        return Ok(());
    }

    let dir_entry = to_repo_path(&config.base_path.join(&layout.path));
    let grouped = group_files(layout, config, rules.application_file_mode, rules.file_per)?;
    for file in &grouped.files {
        let entry_path = format!("{dir_entry}/{}", file.name);
        append_file(builder, &entry_path, &file.objects, config.strip)?;
    }

    let emittable_children: Vec<&ManifestLayout> = layout.children.iter().filter(|c| c.is_emittable()).collect();
    let child_names: Vec<String> = emittable_children.iter().map(|c| c.name.clone()).collect();
    let content = kustomization::build(rules.kustomization_mode, &grouped.files, &child_names, &grouped.integrated_children);
    let index_entry = format!("{dir_entry}/kustomization.yaml");
    append_bytes(builder, &index_entry, content.as_bytes())?;
    debug!(entry = %index_entry, "appended kustomization.yaml");

    for child in emittable_children {
        write_dir(child, config, rules, builder)?;
    }
    Ok(())
}

fn append_file<W: Write>(builder: &mut Builder<W>, entry_path: &str, objects: &[&Object], strip: kure_scheme::StripLevel) -> crate::error::Result<()> {
    let owned: Vec<Object> = objects.iter().map(|o| (*o).clone()).collect();
    let mut content = kure_scheme::serialize(&owned, strip)?;
    content.push('\n');
    append_bytes(builder, entry_path, content.as_bytes())?;
    debug!(entry = entry_path, objects = owned.len(), "appended manifest file");
    Ok(())
}

fn append_bytes<W: Write>(builder: &mut Builder<W>, entry_path: &str, data: &[u8]) -> crate::error::Result<()> {
    let mut header = Header::new_ustar();
    header.set_size(data.len() as u64);
    header.set_mtime(0);
    header.set_mode(0o644);
    header.set_uid(0);
    header.set_gid(0);
    header.set_path(entry_path).map_err(|e| Error::file_io(entry_path, e))?;
    header.set_cksum();
    builder.append(&header, data).map_err(|e| Error::file_io(entry_path, e))
}
