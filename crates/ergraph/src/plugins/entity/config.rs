//! Decorator vocabulary for entity extraction

use serde::{Deserialize, Serialize};

use crate::plugins::er::RelationshipKind;

/// What a recognized decorator means for the member it decorates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRole {
    /// Database-generated key, always numeric
    GeneratedKey,
    /// Explicit key with a declared type
    ExplicitKey,
    Column,
    Relationship(RelationshipKind),
}

/// Decorator names recognized by the entity extractor
///
/// Names are matched against the last segment of a decorator, so
/// `@typeorm.Column()` matches `Column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub entity_markers: Vec<String>,
    pub generated_key_markers: Vec<String>,
    pub explicit_key_markers: Vec<String>,
    pub column_markers: Vec<String>,
    pub one_to_many_markers: Vec<String>,
    pub many_to_one_markers: Vec<String>,
    pub one_to_one_markers: Vec<String>,
    pub many_to_many_markers: Vec<String>,
    /// Suffix of the same-file companion class merged into an entity
    pub base_suffix: String,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            entity_markers: names(&["Entity"]),
            generated_key_markers: names(&["PrimaryGeneratedColumn"]),
            explicit_key_markers: names(&["PrimaryColumn"]),
            column_markers: names(&[
                "Column",
                "CreateDateColumn",
                "UpdateDateColumn",
                "DeleteDateColumn",
                "VersionColumn",
            ]),
            one_to_many_markers: names(&[RelationshipKind::OneToMany.decorator_name()]),
            many_to_one_markers: names(&[RelationshipKind::ManyToOne.decorator_name()]),
            one_to_one_markers: names(&[RelationshipKind::OneToOne.decorator_name()]),
            many_to_many_markers: names(&[RelationshipKind::ManyToMany.decorator_name()]),
            base_suffix: "Base".to_string(),
        }
    }
}

impl ExtractorConfig {
    fn relationship_markers(&self, kind: RelationshipKind) -> &[String] {
        match kind {
            RelationshipKind::OneToMany => &self.one_to_many_markers,
            RelationshipKind::ManyToOne => &self.many_to_one_markers,
            RelationshipKind::OneToOne => &self.one_to_one_markers,
            RelationshipKind::ManyToMany => &self.many_to_many_markers,
        }
    }

    /// Role of a decorator base name, if it is a recognized marker
    pub fn role_of(&self, name: &str) -> Option<MarkerRole> {
        let listed = |list: &[String]| list.iter().any(|n| n == name);

        if listed(&self.generated_key_markers) {
            Some(MarkerRole::GeneratedKey)
        } else if listed(&self.explicit_key_markers) {
            Some(MarkerRole::ExplicitKey)
        } else if listed(&self.column_markers) {
            Some(MarkerRole::Column)
        } else {
            RelationshipKind::ALL
                .into_iter()
                .find(|&kind| listed(self.relationship_markers(kind)))
                .map(MarkerRole::Relationship)
        }
    }
}
