//! Shared fixture: a gene pool on disk, written the way a pool populator
//! would lay it out.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;

use catlet_core::{Architecture, GeneHash, GeneName, GeneSetIdentifier, GeneType};
use catlet_genepool::memory::unique_gene;
use catlet_genepool::{addressing, GeneManifestEntry, GenesetTagManifest, LocalGenePool};
use tempfile::TempDir;

pub fn set(value: &str) -> GeneSetIdentifier {
    GeneSetIdentifier::parse(value).unwrap()
}

pub fn name(value: &str) -> GeneName {
    GeneName::new(value).unwrap()
}

pub fn arch(value: &str) -> Architecture {
    Architecture::parse(value).unwrap()
}

pub struct PoolFixture {
    dir: TempDir,
    manifests: BTreeMap<GeneSetIdentifier, GenesetTagManifest>,
}

impl PoolFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            manifests: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn reader(&self) -> LocalGenePool {
        LocalGenePool::new(self.root())
    }

    fn manifest(&mut self, id: &GeneSetIdentifier) -> &mut GenesetTagManifest {
        self.manifests
            .entry(id.clone())
            .or_insert_with(|| GenesetTagManifest::new(id.clone()))
    }

    fn save(&self, id: &GeneSetIdentifier) {
        let manifest = &self.manifests[id];
        let path = addressing::manifest_path(self.root(), id);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_vec_pretty(manifest).unwrap()).unwrap();
    }

    fn write_gene(
        &mut self,
        gene_type: GeneType,
        id: &GeneSetIdentifier,
        gene: &GeneName,
        architecture: &Architecture,
        content: &[u8],
    ) -> GeneHash {
        let unique = unique_gene(gene_type, id, gene, architecture);
        let path = addressing::gene_path(self.root(), &unique);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
        GeneHash::compute(content)
    }

    pub fn reference(mut self, from: &str, to: &str) -> Self {
        let from = set(from);
        self.manifest(&from).reference = Some(set(to));
        self.save(&from);
        self
    }

    pub fn catlet(mut self, geneset: &str, config: &str) -> Self {
        let id = set(geneset);
        let hash = self.write_gene(
            GeneType::Catlet,
            &id,
            &GeneName::catlet(),
            &Architecture::any(),
            config.as_bytes(),
        );
        self.manifest(&id).catlet = Some(hash);
        self.save(&id);
        self
    }

    pub fn fodder(mut self, geneset: &str, gene: &str, architecture: &str, config: &str) -> Self {
        let (id, gene, architecture) = (set(geneset), name(gene), arch(architecture));
        let hash =
            self.write_gene(GeneType::Fodder, &id, &gene, &architecture, config.as_bytes());
        self.manifest(&id).fodder.push(GeneManifestEntry {
            name: gene,
            hash,
            architecture,
        });
        self.save(&id);
        self
    }

    pub fn volume(mut self, geneset: &str, gene: &str, architecture: &str, data: &[u8]) -> Self {
        let (id, gene, architecture) = (set(geneset), name(gene), arch(architecture));
        let hash = self.write_gene(GeneType::Volume, &id, &gene, &architecture, data);
        self.manifest(&id).volumes.push(GeneManifestEntry {
            name: gene,
            hash,
            architecture,
        });
        self.save(&id);
        self
    }

    /// Overwrite a gene file without touching its manifest hash.
    pub fn tamper(&self, geneset: &str, gene_type: GeneType, gene: &str, architecture: &str) {
        let unique = unique_gene(gene_type, &set(geneset), &name(gene), &arch(architecture));
        std::fs::write(addressing::gene_path(self.root(), &unique), b"tampered").unwrap();
    }
}
