//! # Gene and Geneset Identifiers
//!
//! Identifier newtypes for everything stored in the gene pool. Each
//! identifier is a distinct type, so a [`GeneName`] cannot be passed where a
//! [`GeneSetIdentifier`] is expected.
//!
//! ## Syntax
//!
//! - Geneset: `<organization>/<geneset>[/<tag>]`, tag defaults to `latest`.
//! - Gene reference: `gene:<organization>/<geneset>[/<tag>]:<gene name>`.
//!
//! All segments are normalized to lower case before validation. Organization
//! names allow `[a-z0-9-]`; geneset names, tags and gene names additionally
//! allow `.` so that versions like `1.0` are valid tags. Segments must start
//! and end with a letter or digit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::architecture::Architecture;
use crate::error::IdentifierError;

/// Tag used when a geneset identifier omits one.
pub const LATEST_TAG: &str = "latest";

/// Name of the single catlet gene of every geneset.
pub const CATLET_GENE_NAME: &str = "catlet";

/// Prefix that marks a configuration `source` as a gene reference.
pub const GENE_REFERENCE_PREFIX: &str = "gene:";

const MAX_SEGMENT_LENGTH: usize = 50;

fn validate_segment(value: &str, allow_dots: bool) -> Result<(), String> {
    if value.is_empty() {
        return Err("segment must not be empty".to_string());
    }
    if value.len() > MAX_SEGMENT_LENGTH {
        return Err(format!(
            "segment \"{value}\" is longer than {MAX_SEGMENT_LENGTH} characters"
        ));
    }
    let bytes = value.as_bytes();
    let edge_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if !edge_ok(bytes[0]) || !edge_ok(bytes[bytes.len() - 1]) {
        return Err(format!(
            "segment \"{value}\" must start and end with a letter or digit"
        ));
    }
    let invalid = bytes
        .iter()
        .find(|b| !(edge_ok(**b) || **b == b'-' || (allow_dots && **b == b'.')));
    match invalid {
        Some(b) => Err(format!(
            "segment \"{value}\" contains invalid character '{}'",
            *b as char
        )),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// GeneSetIdentifier
// ---------------------------------------------------------------------------

/// Identifies one tag of a geneset: `organization/geneset/tag`.
///
/// The tag may be symbolic (`latest`) or a concrete version. Whether a tag
/// is an alias for another tag is a property of the pool, not of the
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeneSetIdentifier {
    organization: String,
    geneset: String,
    tag: String,
}

impl GeneSetIdentifier {
    /// Create a geneset identifier from its three segments.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidGeneSet`] if any segment is invalid.
    pub fn new(organization: &str, geneset: &str, tag: &str) -> Result<Self, IdentifierError> {
        let organization = organization.trim().to_ascii_lowercase();
        let geneset = geneset.trim().to_ascii_lowercase();
        let tag = tag.trim().to_ascii_lowercase();
        let rendered = format!("{organization}/{geneset}/{tag}");
        let fail = |reason: String| IdentifierError::InvalidGeneSet {
            value: rendered.clone(),
            reason,
        };
        validate_segment(&organization, false).map_err(fail)?;
        validate_segment(&geneset, true).map_err(fail)?;
        validate_segment(&tag, true).map_err(fail)?;
        Ok(Self {
            organization,
            geneset,
            tag,
        })
    }

    /// Parse `organization/geneset[/tag]`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidGeneSet`] for malformed input.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let parts: Vec<&str> = value.trim().split('/').collect();
        match parts.as_slice() {
            [org, set] => Self::new(org, set, LATEST_TAG),
            [org, set, tag] => Self::new(org, set, tag),
            _ => Err(IdentifierError::InvalidGeneSet {
                value: value.to_string(),
                reason: "expected organization/geneset[/tag]".to_string(),
            }),
        }
    }

    /// The organization segment.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// The geneset name segment.
    pub fn geneset(&self) -> &str {
        &self.geneset
    }

    /// The tag segment.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for GeneSetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.organization, self.geneset, self.tag)
    }
}

impl FromStr for GeneSetIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GeneSetIdentifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GeneSetIdentifier> for String {
    fn from(id: GeneSetIdentifier) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// GeneName
// ---------------------------------------------------------------------------

/// The name of a gene inside a geneset (e.g. `sda`, `catlet`, `food1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeneName(String);

impl GeneName {
    /// Create a gene name, normalizing to lower case.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidGeneName`] if the name is invalid.
    pub fn new(value: &str) -> Result<Self, IdentifierError> {
        let name = value.trim().to_ascii_lowercase();
        validate_segment(&name, true).map_err(|reason| IdentifierError::InvalidGeneName {
            value: value.to_string(),
            reason,
        })?;
        Ok(Self(name))
    }

    /// The name of the catlet gene.
    pub fn catlet() -> Self {
        Self(CATLET_GENE_NAME.to_string())
    }

    /// Whether this is the catlet gene name.
    pub fn is_catlet(&self) -> bool {
        self.0 == CATLET_GENE_NAME
    }

    /// Access the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GeneName {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<GeneName> for String {
    fn from(name: GeneName) -> Self {
        name.0
    }
}

// ---------------------------------------------------------------------------
// GeneType
// ---------------------------------------------------------------------------

/// The kind of artifact a gene is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneType {
    /// The stored catlet configuration of a geneset.
    Catlet,
    /// A disk template (opaque `.vhdx` bytes).
    Volume,
    /// A reusable configuration fragment.
    Fodder,
}

impl GeneType {
    /// Returns the lowercase type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Catlet => "catlet",
            Self::Volume => "volume",
            Self::Fodder => "fodder",
        }
    }
}

impl fmt::Display for GeneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneType {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catlet" => Ok(Self::Catlet),
            "volume" => Ok(Self::Volume),
            "fodder" => Ok(Self::Fodder),
            _ => Err(IdentifierError::InvalidGeneType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// GeneIdentifier / UniqueGeneIdentifier
// ---------------------------------------------------------------------------

/// A typed gene inside a geneset, independent of architecture.
///
/// Displays as the gene reference syntax `gene:org/set/tag:name`; the type
/// is not part of the textual reference and is decided by where the
/// reference appears (drive sources are volumes, fodder sources are fodder).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeneIdentifier {
    /// The geneset containing the gene.
    pub gene_set: GeneSetIdentifier,
    /// The kind of gene.
    pub gene_type: GeneType,
    /// The gene name.
    pub name: GeneName,
}

impl GeneIdentifier {
    /// Create a gene identifier.
    pub fn new(gene_type: GeneType, gene_set: GeneSetIdentifier, name: GeneName) -> Self {
        Self {
            gene_set,
            gene_type,
            name,
        }
    }

    /// The catlet gene of a geneset.
    pub fn catlet(gene_set: GeneSetIdentifier) -> Self {
        Self::new(GeneType::Catlet, gene_set, GeneName::catlet())
    }

    /// Parse a textual gene reference and attach the given type.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidGeneReference`] for malformed input.
    pub fn parse(gene_type: GeneType, reference: &str) -> Result<Self, IdentifierError> {
        let (gene_set, name) = parse_gene_reference(reference)?;
        Ok(Self::new(gene_type, gene_set, name))
    }

    /// Render the gene reference string (`gene:org/set/tag:name`).
    pub fn reference(&self) -> String {
        format_gene_reference(&self.gene_set, &self.name)
    }
}

impl fmt::Display for GeneIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:{}", GENE_REFERENCE_PREFIX, self.gene_set, self.name)
    }
}

/// One concrete, content-addressed artifact: a gene plus its architecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UniqueGeneIdentifier {
    /// The gene.
    pub id: GeneIdentifier,
    /// The architecture variant of the gene.
    pub architecture: Architecture,
}

impl UniqueGeneIdentifier {
    /// Create a unique gene identifier.
    pub fn new(id: GeneIdentifier, architecture: Architecture) -> Self {
        Self { id, architecture }
    }

    /// The gene type.
    pub fn gene_type(&self) -> GeneType {
        self.id.gene_type
    }

    /// The geneset containing the gene.
    pub fn gene_set(&self) -> &GeneSetIdentifier {
        &self.id.gene_set
    }
}

impl fmt::Display for UniqueGeneIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.id.gene_type, self.id, self.architecture)
    }
}

/// Whether a configuration `source` uses the gene reference syntax.
///
/// Only the prefix is checked; use [`parse_gene_reference`] to validate.
pub fn is_gene_reference(source: &str) -> bool {
    source
        .trim()
        .get(..GENE_REFERENCE_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(GENE_REFERENCE_PREFIX))
}

/// Parse `gene:<organization>/<geneset>[/<tag>]:<name>`.
///
/// # Errors
///
/// Returns [`IdentifierError::InvalidGeneReference`] when the prefix or the
/// `:` separator is missing, or when a segment is invalid.
pub fn parse_gene_reference(
    reference: &str,
) -> Result<(GeneSetIdentifier, GeneName), IdentifierError> {
    let fail = |reason: String| IdentifierError::InvalidGeneReference {
        value: reference.to_string(),
        reason,
    };
    let trimmed = reference.trim();
    if !is_gene_reference(trimmed) {
        return Err(fail(format!("must start with '{GENE_REFERENCE_PREFIX}'")));
    }
    let rest = &trimmed[GENE_REFERENCE_PREFIX.len()..];
    let (set_part, name_part) = rest
        .split_once(':')
        .ok_or_else(|| fail("expected gene:<geneset>:<name>".to_string()))?;
    if name_part.contains(':') {
        return Err(fail("unexpected ':' in gene name".to_string()));
    }
    let gene_set = GeneSetIdentifier::parse(set_part).map_err(|e| fail(e.to_string()))?;
    let name = GeneName::new(name_part).map_err(|e| fail(e.to_string()))?;
    Ok((gene_set, name))
}

/// Render `gene:<geneset>:<name>`.
pub fn format_gene_reference(gene_set: &GeneSetIdentifier, name: &GeneName) -> String {
    format!("{GENE_REFERENCE_PREFIX}{gene_set}:{name}")
}
