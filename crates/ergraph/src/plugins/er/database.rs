//! Schema graph database
//!
//! Stores the entities, enums and relationship edges extracted in one run.

use crate::core::{Database, DiagnosticKind, Diagnostics};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;

/// A scalar column of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    /// Canonical type token
    #[serde(rename = "type")]
    pub ty: String,
    pub is_primary_key: bool,
    pub is_optional: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            is_primary_key: false,
            is_optional: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.is_optional = optional;
        self
    }
}

/// Cardinality of a relationship edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelationshipKind {
    /// `||--o{`
    OneToMany,
    /// `}o--||`
    ManyToOne,
    /// `||--||`
    OneToOne,
    /// `}o--o{`
    ManyToMany,
}

impl RelationshipKind {
    pub const ALL: [RelationshipKind; 4] = [
        RelationshipKind::OneToMany,
        RelationshipKind::ManyToOne,
        RelationshipKind::OneToOne,
        RelationshipKind::ManyToMany,
    ];

    /// Mermaid ER cardinality symbol
    pub fn symbol(self) -> &'static str {
        match self {
            RelationshipKind::OneToMany => "||--o{",
            RelationshipKind::ManyToOne => "}o--||",
            RelationshipKind::OneToOne => "||--||",
            RelationshipKind::ManyToMany => "}o--o{",
        }
    }

    /// Default decorator name declaring this kind
    pub fn decorator_name(self) -> &'static str {
        match self {
            RelationshipKind::OneToMany => "OneToMany",
            RelationshipKind::ManyToOne => "ManyToOne",
            RelationshipKind::OneToOne => "OneToOne",
            RelationshipKind::ManyToMany => "ManyToMany",
        }
    }
}

/// A directed reference from the declaring entity to a target entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipEdge {
    pub from_entity: String,
    pub to_entity: String,
    pub kind: RelationshipKind,
    /// Property on the declaring side holding the reference
    pub property_name: String,
    /// Property on the target side named by the inverse lambda, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse_property: Option<String>,
}

impl RelationshipEdge {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: RelationshipKind,
        property: impl Into<String>,
    ) -> Self {
        Self {
            from_entity: from.into(),
            to_entity: to.into(),
            kind,
            property_name: property.into(),
            inverse_property: None,
        }
    }

    pub fn with_inverse(mut self, inverse: impl Into<String>) -> Self {
        self.inverse_property = Some(inverse.into());
        self
    }
}

/// An extracted entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    pub fields: Vec<Field>,
    pub relationships: Vec<RelationshipEdge>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: None,
            fields: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn with_table_name(mut self, table: impl Into<String>) -> Self {
        self.table_name = Some(table.into());
        self
    }

    /// Append a field unless one with the same name exists; returns whether it was added
    pub fn add_field(&mut self, field: Field) -> bool {
        if self.field(&field.name).is_some() {
            return false;
        }
        self.fields.push(field);
        true
    }

    pub fn add_relationship(&mut self, edge: RelationshipEdge) {
        self.relationships.push(edge);
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_primary_key)
    }

    /// Fields with primary keys first, otherwise in declaration order
    pub fn sorted_fields(&self) -> Vec<&Field> {
        let mut fields: Vec<&Field> = self.fields.iter().collect();
        fields.sort_by_key(|f| !f.is_primary_key);
        fields
    }
}

/// An extracted enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDef {
    pub name: String,
    pub members: Vec<String>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn with_members(mut self, members: Vec<String>) -> Self {
        self.members = members;
        self
    }
}

/// Summary counts for a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SchemaStats {
    pub entity_count: usize,
    pub enum_count: usize,
    /// Every extracted edge, including dangling ones
    pub edge_count: usize,
    /// Edges that survive pruning
    pub rendered_edge_count: usize,
}

/// All entities, enums and edges of one run
///
/// Entities and enums keep first-insertion order; inserting a name that is
/// already present replaces the record in place. The edge list is append-only
/// and keeps every edge ever inserted, so edges of a replaced entity remain.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaGraph {
    entities: Vec<Entity>,
    #[serde(skip)]
    entity_index: HashMap<String, usize>,
    enums: Vec<EnumDef>,
    #[serde(skip)]
    enum_index: HashMap<String, usize>,
    edges: Vec<RelationshipEdge>,
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from extraction results in scan order
    pub fn assemble(
        entities: impl IntoIterator<Item = Entity>,
        enums: impl IntoIterator<Item = EnumDef>,
    ) -> Self {
        let mut graph = Self::new();
        for entity in entities {
            graph.insert_entity(entity);
        }
        for def in enums {
            graph.insert_enum(def);
        }
        graph
    }

    /// Insert an entity and record its edges; returns the record it replaced
    pub fn insert_entity(&mut self, entity: Entity) -> Option<Entity> {
        self.edges.extend(entity.relationships.iter().cloned());
        match self.entity_index.get(&entity.name) {
            Some(&index) => Some(std::mem::replace(&mut self.entities[index], entity)),
            None => {
                self.entity_index
                    .insert(entity.name.clone(), self.entities.len());
                self.entities.push(entity);
                None
            }
        }
    }

    /// Insert an enum; returns the record it replaced
    pub fn insert_enum(&mut self, def: EnumDef) -> Option<EnumDef> {
        match self.enum_index.get(&def.name) {
            Some(&index) => Some(std::mem::replace(&mut self.enums[index], def)),
            None => {
                self.enum_index.insert(def.name.clone(), self.enums.len());
                self.enums.push(def);
                None
            }
        }
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entity_index.get(name).map(|&i| &self.entities[i])
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enum_index.get(name).map(|&i| &self.enums[i])
    }

    pub fn contains_entity(&self, name: &str) -> bool {
        self.entity_index.contains_key(name)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn enums(&self) -> &[EnumDef] {
        &self.enums
    }

    /// Raw edge list in extraction order
    pub fn raw_edges(&self) -> &[RelationshipEdge] {
        &self.edges
    }

    fn is_renderable(&self, edge: &RelationshipEdge) -> bool {
        self.contains_entity(&edge.from_entity) && self.contains_entity(&edge.to_entity)
    }

    /// Edges whose endpoints are both present, in extraction order
    pub fn renderable_edges(&self) -> impl Iterator<Item = &RelationshipEdge> {
        self.edges.iter().filter(|e| self.is_renderable(e))
    }

    /// Edges that reference an entity missing from the graph
    pub fn dangling_edges(&self) -> impl Iterator<Item = &RelationshipEdge> {
        self.edges.iter().filter(|e| !self.is_renderable(e))
    }

    /// One diagnostic per dangling edge
    pub fn dangling_diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for edge in self.dangling_edges() {
            let missing = if self.contains_entity(&edge.from_entity) {
                &edge.to_entity
            } else {
                &edge.from_entity
            };
            diagnostics.push(DiagnosticKind::DanglingRelationship {
                from: edge.from_entity.clone(),
                to: missing.clone(),
                property: edge.property_name.clone(),
            });
        }
        diagnostics
    }

    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn enum_names(&self) -> Vec<&str> {
        self.enums.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn stats(&self) -> SchemaStats {
        SchemaStats {
            entity_count: self.entities.len(),
            enum_count: self.enums.len(),
            edge_count: self.edges.len(),
            rendered_edge_count: self.renderable_edges().count(),
        }
    }
}

impl Database for SchemaGraph {
    type Node = Entity;
    type Edge = RelationshipEdge;

    fn add_node(&mut self, node: Self::Node) -> Result<()> {
        self.insert_entity(node);
        Ok(())
    }

    fn add_edge(&mut self, edge: Self::Edge) -> Result<()> {
        self.edges.push(edge);
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        self.entity(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.entities.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> {
        self.edges.iter()
    }

    fn clear(&mut self) {
        self.entities.clear();
        self.entity_index.clear();
        self.enums.clear();
        self.enum_index.clear();
        self.edges.clear();
    }

    fn node_count(&self) -> usize {
        self.entities.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee() -> Entity {
        let mut entity = Entity::new("Employee");
        entity.add_field(Field::new("firstname", "string"));
        entity.add_field(Field::new("id", "number").primary_key());
        entity.add_relationship(RelationshipEdge::new(
            "Employee",
            "LeaveRequest",
            RelationshipKind::OneToMany,
            "leaveRequestList",
        ));
        entity
    }

    #[test]
    fn test_add_field_first_wins() {
        let mut entity = Entity::new("A");
        assert!(entity.add_field(Field::new("code", "string")));
        assert!(!entity.add_field(Field::new("code", "number")));
        assert_eq!(entity.fields.len(), 1);
        assert_eq!(entity.field("code").unwrap().ty, "string");
    }

    #[test]
    fn test_sorted_fields_primary_first_stable() {
        let mut entity = employee();
        entity.add_field(Field::new("lastname", "string"));
        let names: Vec<_> = entity.sorted_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "firstname", "lastname"]);
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut graph = SchemaGraph::new();
        graph.insert_entity(employee());
        graph.insert_entity(Entity::new("LeaveRequest"));
        let replaced = graph.insert_entity(Entity::new("Employee").with_table_name("staff"));

        assert!(replaced.is_some());
        assert_eq!(graph.entity_names(), vec!["Employee", "LeaveRequest"]);
        assert_eq!(
            graph.entity("Employee").unwrap().table_name.as_deref(),
            Some("staff")
        );
        // Edges of the replaced record stay in the raw list.
        assert_eq!(graph.raw_edges().len(), 1);
    }

    #[test]
    fn test_renderable_and_dangling_edges() {
        let graph = SchemaGraph::assemble(vec![employee()], vec![]);
        assert_eq!(graph.renderable_edges().count(), 0);
        assert_eq!(graph.dangling_edges().count(), 1);

        let diagnostics = graph.dangling_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics
            .iter()
            .next()
            .unwrap()
            .to_string()
            .contains("'LeaveRequest'"));
    }

    #[test]
    fn test_stats() {
        let graph = SchemaGraph::assemble(
            vec![employee(), Entity::new("LeaveRequest")],
            vec![EnumDef::new("StatusEnum").with_members(vec!["OPEN".to_string()])],
        );
        assert_eq!(
            graph.stats(),
            SchemaStats {
                entity_count: 2,
                enum_count: 1,
                edge_count: 1,
                rendered_edge_count: 1,
            }
        );
    }

    #[test]
    fn test_enum_last_wins() {
        let mut graph = SchemaGraph::new();
        graph.insert_enum(EnumDef::new("A").with_members(vec!["X".to_string()]));
        graph.insert_enum(EnumDef::new("A").with_members(vec!["Y".to_string()]));
        assert_eq!(graph.enums().len(), 1);
        assert_eq!(graph.enum_def("A").unwrap().members, vec!["Y"]);
    }

    #[test]
    fn test_relationship_symbols() {
        assert_eq!(RelationshipKind::OneToMany.symbol(), "||--o{");
        assert_eq!(RelationshipKind::ManyToOne.symbol(), "}o--||");
        assert_eq!(RelationshipKind::OneToOne.symbol(), "||--||");
        assert_eq!(RelationshipKind::ManyToMany.symbol(), "}o--o{");
    }
}
