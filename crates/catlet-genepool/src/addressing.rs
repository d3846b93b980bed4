//! # Gene Pool Addressing
//!
//! Pure functions mapping geneset and gene identities to their location in
//! the pool, and back. No function here touches the filesystem.
//!
//! ## Bijectivity
//!
//! Every valid identity has exactly one path. Architecture segments are
//! omitted when an axis is `any`: `any/any` has no segment, `hyperv/any`
//! has one (`hyperv`), everything else has two. The inverse functions
//! reject paths that are not the canonical rendering of an identity (for
//! example `volumes/any/sda.vhdx`), so `parse(render(x)) == x` and
//! `render(parse(p)) == p` whenever `parse(p)` succeeds.

use std::path::{Component, Path, PathBuf};

use catlet_core::{
    Architecture, GeneIdentifier, GeneName, GeneSetIdentifier, GeneType, UniqueGeneIdentifier,
};

/// File name of a geneset tag manifest.
pub const MANIFEST_FILE_NAME: &str = "geneset-tag.json";

/// File name of the catlet gene.
pub const CATLET_FILE_NAME: &str = "catlet.json";

/// Directory holding volume genes.
pub const VOLUMES_DIR: &str = "volumes";

/// Directory holding fodder genes.
pub const FODDER_DIR: &str = "fodder";

/// Extension of volume gene files.
pub const VOLUME_EXTENSION: &str = "vhdx";

/// Extension of fodder gene files.
pub const FODDER_EXTENSION: &str = "json";

/// Extension appended to a path to form its lock file.
pub const LOCK_EXTENSION: &str = "lock";

/// Directory of a geneset tag: `<pool>/<org>/<set>/<tag>`.
pub fn geneset_path(pool: &Path, id: &GeneSetIdentifier) -> PathBuf {
    pool.join(id.organization()).join(id.geneset()).join(id.tag())
}

/// Manifest of a geneset tag: `<pool>/<org>/<set>/<tag>/geneset-tag.json`.
pub fn manifest_path(pool: &Path, id: &GeneSetIdentifier) -> PathBuf {
    geneset_path(pool, id).join(MANIFEST_FILE_NAME)
}

/// Architecture path segments; empty for `any/any`.
fn architecture_segments(arch: &Architecture) -> Vec<&str> {
    if arch.is_any() {
        Vec::new()
    } else if arch.is_any_processor() {
        vec![arch.hypervisor()]
    } else {
        vec![arch.hypervisor(), arch.processor()]
    }
}

/// Location of a gene file.
///
/// Catlet genes are architecture independent and always live at
/// `catlet.json`.
pub fn gene_path(pool: &Path, gene: &UniqueGeneIdentifier) -> PathBuf {
    let base = geneset_path(pool, gene.gene_set());
    let (dir, extension) = match gene.gene_type() {
        GeneType::Catlet => return base.join(CATLET_FILE_NAME),
        GeneType::Volume => (VOLUMES_DIR, VOLUME_EXTENSION),
        GeneType::Fodder => (FODDER_DIR, FODDER_EXTENSION),
    };
    let mut path = base.join(dir);
    for segment in architecture_segments(&gene.architecture) {
        path.push(segment);
    }
    path.push(format!("{}.{extension}", gene.id.name));
    path
}

/// Lock file guarding a pool path: the path with `.lock` appended.
pub fn lock_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".");
    os.push(LOCK_EXTENSION);
    PathBuf::from(os)
}

/// Lock file of a geneset tag's manifest.
pub fn manifest_lock_path(pool: &Path, id: &GeneSetIdentifier) -> PathBuf {
    lock_path(&manifest_path(pool, id))
}

/// Lock file of a gene.
pub fn gene_lock_path(pool: &Path, gene: &UniqueGeneIdentifier) -> PathBuf {
    lock_path(&gene_path(pool, gene))
}

fn relative_segments<'a>(pool: &Path, path: &'a Path) -> Option<Vec<&'a str>> {
    let relative = path.strip_prefix(pool).ok()?;
    relative
        .components()
        .map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect()
}

/// Identify the geneset tag of a directory or manifest path.
///
/// Accepts `<pool>/<org>/<set>/<tag>` and
/// `<pool>/<org>/<set>/<tag>/geneset-tag.json`.
pub fn parse_geneset_path(pool: &Path, path: &Path) -> Option<GeneSetIdentifier> {
    let segments = relative_segments(pool, path)?;
    let id = match segments.as_slice() {
        [org, set, tag] | [org, set, tag, MANIFEST_FILE_NAME] => {
            GeneSetIdentifier::new(org, set, tag).ok()?
        }
        _ => return None,
    };
    // Reject non-canonical spellings (e.g. upper case directories).
    let canonical = if segments.len() == 4 {
        manifest_path(pool, &id)
    } else {
        geneset_path(pool, &id)
    };
    (canonical == path).then_some(id)
}

/// Identify the gene stored at a path.
pub fn parse_gene_path(pool: &Path, path: &Path) -> Option<UniqueGeneIdentifier> {
    let segments = relative_segments(pool, path)?;
    let (org, set, tag, rest) = match segments.as_slice() {
        [org, set, tag, rest @ ..] => (*org, *set, *tag, rest),
        _ => return None,
    };
    let gene_set = GeneSetIdentifier::new(org, set, tag).ok()?;

    let gene = match rest {
        [CATLET_FILE_NAME] => UniqueGeneIdentifier::new(
            GeneIdentifier::catlet(gene_set),
            Architecture::any(),
        ),
        [dir, arch @ .., file] => {
            let (gene_type, extension) = match *dir {
                VOLUMES_DIR => (GeneType::Volume, VOLUME_EXTENSION),
                FODDER_DIR => (GeneType::Fodder, FODDER_EXTENSION),
                _ => return None,
            };
            let architecture = match arch {
                [] => Architecture::any(),
                [hypervisor] => Architecture::new(hypervisor, "any").ok()?,
                [hypervisor, processor] => Architecture::new(hypervisor, processor).ok()?,
                _ => return None,
            };
            let stem = file.strip_suffix(&format!(".{extension}"))?;
            let name = GeneName::new(stem).ok()?;
            UniqueGeneIdentifier::new(GeneIdentifier::new(gene_type, gene_set, name), architecture)
        }
        _ => return None,
    };
    (gene_path(pool, &gene) == path).then_some(gene)
}
