//! Entity extractor
//!
//! Turns one `.entity.ts` file into an [`Entity`]. The decorated class and the
//! same-file classes it builds on (its `extends` clause, followed
//! transitively, plus the `<Name>Base` companion) form one scope. Members of
//! that scope are visited in source order and classified by their decorators.

use std::collections::HashMap;
use tracing::{debug, span, trace, Level};

use super::chumsky_parser::{
    is_type_thunk, leading_string_literal, option_is_true, parse_relationship_args,
};
use super::config::{ExtractorConfig, MarkerRole};
use crate::core::{
    normalize_type_detailed, sanitize_identifier, scan_declarations, scan_members,
    type_expression, ClassDecl, Declaration, Decorator, DiagnosticKind, Diagnostics, Extractor,
    MaskedSource, Member, PropertyDecl,
};
use crate::plugins::er::{Entity, Field, RelationshipEdge, RelationshipKind};

pub const ENTITY_FILE_SUFFIX: &str = ".entity.ts";

/// Extracts entities from decorated model classes
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    config: ExtractorConfig,
    suffix: String,
}

/// Fields and edges collected across the scope before ordering
#[derive(Default)]
struct Collected {
    keys: Vec<Field>,
    columns: Vec<Field>,
    edges: Vec<RelationshipEdge>,
}

impl EntityExtractor {
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            config,
            suffix: ENTITY_FILE_SUFFIX.to_string(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The entity class followed by the same-file classes it builds on, in source order
    fn resolve_scope<'c>(
        &self,
        classes: &'c [ClassDecl],
        entity: &'c ClassDecl,
    ) -> Vec<&'c ClassDecl> {
        let mut by_name: HashMap<&str, &ClassDecl> = HashMap::new();
        for class in classes {
            by_name.entry(class.name.as_str()).or_insert(class);
        }

        let mut scope = vec![entity];
        let mut pending: Vec<String> = entity.heritage.clone();
        pending.push(format!("{}{}", entity.name, self.config.base_suffix));

        while let Some(name) = pending.pop() {
            let Some(&class) = by_name.get(name.as_str()) else {
                continue;
            };
            if scope.iter().any(|c| c.span == class.span) {
                continue;
            }
            trace!(entity = %entity.name, class = %class.name, "merging class into scope");
            scope.push(class);
            pending.extend(class.heritage.iter().cloned());
        }

        scope.sort_by_key(|c| c.span.start);
        scope
    }

    fn visit_member(
        &self,
        source: &MaskedSource<'_>,
        entity: &str,
        member: &Member,
        collected: &mut Collected,
        diagnostics: &mut Diagnostics,
    ) {
        for decorator in &member.decorators {
            let Some(role) = self.config.role_of(decorator.base_name()) else {
                continue;
            };
            let Some(property) = &member.property else {
                debug!(decorator = %decorator.name, "marker without property");
                diagnostics.push(DiagnosticKind::MissingProperty {
                    decorator: decorator.name.clone(),
                });
                continue;
            };

            match role {
                MarkerRole::GeneratedKey => {
                    let field = Field::new(sanitize_identifier(&property.name), "number")
                        .primary_key()
                        .with_optional(property.optional);
                    collected.keys.push(field);
                }
                MarkerRole::ExplicitKey => {
                    let field = self.build_field(source, property, decorator, diagnostics);
                    collected.keys.push(field.primary_key());
                }
                MarkerRole::Column => {
                    if decorator.args_in(source.code()).is_some_and(is_type_thunk) {
                        debug!(property = %property.name, "skipping embedded column");
                        diagnostics.push(DiagnosticKind::EmbeddedColumnSkipped {
                            property: property.name.clone(),
                        });
                        continue;
                    }
                    let field = self.build_field(source, property, decorator, diagnostics);
                    collected.columns.push(field);
                }
                MarkerRole::Relationship(kind) => {
                    match self.build_edge(source, entity, kind, property, decorator) {
                        Some(edge) => collected.edges.push(edge),
                        None => {
                            debug!(
                                decorator = %decorator.name,
                                property = %property.name,
                                "unparsed relationship"
                            );
                            diagnostics.push(DiagnosticKind::UnparsedRelationship {
                                decorator: decorator.name.clone(),
                                property: property.name.clone(),
                            });
                        }
                    }
                }
            }
        }
    }

    fn build_field(
        &self,
        source: &MaskedSource<'_>,
        property: &PropertyDecl,
        decorator: &Decorator,
        diagnostics: &mut Diagnostics,
    ) -> Field {
        let raw = type_expression(source.code(), source.commentless(), property.type_span.clone());
        let normalized = normalize_type_detailed(raw);
        let name = sanitize_identifier(&property.name);

        if normalized.is_fallback() {
            diagnostics.push(DiagnosticKind::TypeFallback {
                field: name.clone(),
                raw: raw.to_string(),
                token: normalized.token.clone(),
            });
        }

        let nullable_option = decorator
            .args_in(source.code())
            .is_some_and(|args| option_is_true(args, "nullable"));
        let optional = property.optional || normalized.nullable || nullable_option;

        Field::new(name, normalized.token).with_optional(optional)
    }

    fn build_edge(
        &self,
        source: &MaskedSource<'_>,
        entity: &str,
        kind: RelationshipKind,
        property: &PropertyDecl,
        decorator: &Decorator,
    ) -> Option<RelationshipEdge> {
        let parsed = parse_relationship_args(decorator.args_in(source.code())?)?;
        let edge = RelationshipEdge::new(entity, parsed.target, kind, property.name.clone());
        Some(match parsed.inverse {
            Some(inverse) => edge.with_inverse(inverse),
            None => edge,
        })
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for EntityExtractor {
    type Output = Entity;

    fn extract(&self, text: &str, diagnostics: &mut Diagnostics) -> Option<Entity> {
        let extract_span = span!(Level::DEBUG, "extract_entity", input_len = text.len());
        let _enter = extract_span.enter();

        let source = MaskedSource::new(text);
        let classes: Vec<ClassDecl> = scan_declarations(source.code())
            .into_iter()
            .filter_map(|declaration| match declaration {
                Declaration::Class(class) => Some(class),
                Declaration::Enum(_) => None,
            })
            .collect();

        let Some((entity_class, marker)) = classes.iter().find_map(|class| {
            class
                .has_decorator(&self.config.entity_markers)
                .map(|marker| (class, marker))
        }) else {
            debug!(classes = classes.len(), "no entity class");
            diagnostics.push(DiagnosticKind::NotAnEntity);
            return None;
        };

        let mut entity = Entity::new(entity_class.name.clone());
        if let Some(table) = marker
            .args_in(source.commentless())
            .and_then(leading_string_literal)
        {
            entity = entity.with_table_name(table);
        }

        let mut collected = Collected::default();
        for class in self.resolve_scope(&classes, entity_class) {
            for member in scan_members(source.code(), class.body.clone()) {
                self.visit_member(&source, &entity.name, &member, &mut collected, diagnostics);
            }
        }

        for field in collected.keys.into_iter().chain(collected.columns) {
            let name = field.name.clone();
            if !entity.add_field(field) {
                trace!(field = %name, "duplicate field ignored");
            }
        }
        for edge in collected.edges {
            entity.add_relationship(edge);
        }

        let keys: Vec<String> = entity.primary_keys().map(|f| f.name.clone()).collect();
        if keys.len() > 1 {
            diagnostics.push(DiagnosticKind::MultiplePrimaryKeys { names: keys });
        }

        debug!(
            entity = %entity.name,
            fields = entity.fields.len(),
            relationships = entity.relationships.len(),
            "Extracted entity"
        );
        Some(entity)
    }

    fn name(&self) -> &'static str {
        "entity"
    }

    fn file_suffix(&self) -> &str {
        &self.suffix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPLOYEE: &str = r#"import { Entity, Column, OneToMany, PrimaryGeneratedColumn } from 'typeorm';
import { LeaveRequest } from './leave-request.entity';

export class EmployeeBase {
  @PrimaryGeneratedColumn()
  id: number;

  @Column({ nullable: true })
  @IsOptional()
  title: string; // Mr. {Ms.}

  @Column()
  firstname: string;

  @Column({ type: 'date', nullable: true })
  birthDate: Date | null;

  @OneToMany(
    () => LeaveRequest,
    (leaveRequest) => leaveRequest.employee,
    { cascade: true },
  )
  leaveRequestList: LeaveRequest[];

  @Column(() => Address)
  address: Address;

  @Expose({ toPlainOnly: true })
  get displayName() {
    return this.title + ' ' + this.firstname;
  }
}

@Entity('employees')
@Reflect.metadata(WithStampable, true)
export class Employee extends mixin(EmployeeBase, StampableEntity) {}
"#;

    fn extract(text: &str) -> (Option<Entity>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let entity = EntityExtractor::new().extract(text, &mut diagnostics);
        (entity, diagnostics)
    }

    fn field_names(entity: &Entity) -> Vec<&str> {
        entity.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_extractor_metadata() {
        let extractor = EntityExtractor::new();
        assert_eq!(extractor.name(), "entity");
        assert!(extractor.can_extract("employee.entity.ts"));
        assert!(!extractor.can_extract("employee.dto.ts"));
    }

    #[test]
    fn test_extract_employee() {
        let (entity, diagnostics) = extract(EMPLOYEE);
        let entity = entity.unwrap();

        assert_eq!(entity.name, "Employee");
        assert_eq!(entity.table_name.as_deref(), Some("employees"));
        assert_eq!(field_names(&entity), vec!["id", "title", "firstname", "birthDate"]);

        let id = entity.field("id").unwrap();
        assert!(id.is_primary_key);
        assert_eq!(id.ty, "number");

        let title = entity.field("title").unwrap();
        assert!(title.is_optional);
        assert_eq!(title.ty, "string");

        let birth = entity.field("birthDate").unwrap();
        assert_eq!(birth.ty, "Date");
        assert!(birth.is_optional);

        assert!(!entity.field("firstname").unwrap().is_optional);

        assert_eq!(
            entity.relationships,
            vec![RelationshipEdge::new(
                "Employee",
                "LeaveRequest",
                RelationshipKind::OneToMany,
                "leaveRequestList"
            )
            .with_inverse("employee")]
        );

        assert!(diagnostics.iter().any(|d| matches!(
            &d.kind,
            DiagnosticKind::EmbeddedColumnSkipped { property } if property == "address"
        )));
        assert_eq!(diagnostics.warning_count(), 0);
    }

    #[test]
    fn test_not_an_entity() {
        let (entity, diagnostics) =
            extract("export class Address {\n  @Column()\n  street: string;\n}\n");
        assert!(entity.is_none());
        assert_eq!(
            diagnostics.iter().next().map(|d| d.kind.clone()),
            Some(DiagnosticKind::NotAnEntity)
        );
    }

    #[test]
    fn test_entity_marker_in_comment_ignored() {
        let (entity, _) =
            extract("// @Entity()\nexport class Draft {\n  @Column()\n  name: string;\n}\n");
        assert!(entity.is_none());
    }

    #[test]
    fn test_primary_keys_first_and_deduplicated() {
        let text = r#"
@Entity()
export class Shift {
  @Column()
  name: string;

  @PrimaryColumn()
  code: string;

  @Column()
  name: number;
}
"#;
        let (entity, diagnostics) = extract(text);
        let entity = entity.unwrap();
        assert_eq!(field_names(&entity), vec!["code", "name"]);
        assert_eq!(entity.field("name").unwrap().ty, "string");
        assert!(entity.field("code").unwrap().is_primary_key);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_multiple_primary_keys_warn() {
        let text = r#"
@Entity()
export class Token {
  @PrimaryGeneratedColumn()
  id: number;

  @PrimaryColumn()
  code: string;
}
"#;
        let (entity, diagnostics) = extract(text);
        let entity = entity.unwrap();
        assert_eq!(entity.primary_keys().count(), 2);
        assert!(diagnostics.iter().any(|d| matches!(
            &d.kind,
            DiagnosticKind::MultiplePrimaryKeys { names } if names == &["id", "code"]
        )));
    }

    #[test]
    fn test_base_convention_without_extends() {
        let text = r#"
export class LeaveRequestBase {
  @PrimaryGeneratedColumn()
  id: number;

  @ManyToOne(() => Employee, (employee) => employee.leaveRequestList)
  @JoinColumn({ name: 'employee_id' })
  employee: Employee;
}

export class Unrelated {
  @Column()
  ignored: string;
}

@Entity()
export class LeaveRequest extends BaseEntity {
  @Column()
  reason?: string;
}
"#;
        let (entity, _) = extract(text);
        let entity = entity.unwrap();
        assert_eq!(field_names(&entity), vec!["id", "reason"]);
        assert!(entity.field("reason").unwrap().is_optional);
        assert_eq!(entity.relationships.len(), 1);
        assert_eq!(entity.relationships[0].to_entity, "Employee");
        assert_eq!(entity.relationships[0].kind, RelationshipKind::ManyToOne);
        assert_eq!(entity.relationships[0].property_name, "employee");
    }

    #[test]
    fn test_transitive_heritage() {
        let text = r#"
export class Named {
  @Column()
  name: string;
}

export class Coded extends Named {
  @PrimaryColumn()
  code: string;
}

@Entity()
export class Site extends Coded {}
"#;
        let (entity, _) = extract(text);
        assert_eq!(field_names(&entity.unwrap()), vec!["code", "name"]);
    }

    #[test]
    fn test_unparsed_relationship_and_missing_property() {
        let text = r#"
@Entity()
export class Audit {
  @ManyToOne('Employee')
  actor: Employee;

  @Column()
  doSomething() {}

  @Column()
}
"#;
        let (entity, diagnostics) = extract(text);
        assert!(entity.unwrap().relationships.is_empty());
        let kinds: Vec<_> = diagnostics.iter().map(|d| d.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::UnparsedRelationship {
                    decorator: "ManyToOne".to_string(),
                    property: "actor".to_string(),
                },
                DiagnosticKind::MissingProperty {
                    decorator: "Column".to_string(),
                },
                DiagnosticKind::MissingProperty {
                    decorator: "Column".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_type_fallback_reported() {
        let text = "@Entity()\nexport class Geo {\n  @Column('jsonb')\n  point: { lat: number; lng: number };\n}\n";
        let (entity, diagnostics) = extract(text);
        assert_eq!(entity.unwrap().field("point").unwrap().ty, "object");
        assert!(diagnostics.iter().any(|d| matches!(
            &d.kind,
            DiagnosticKind::TypeFallback { field, token, .. } if field == "point" && token == "object"
        )));
    }

    #[test]
    fn test_all_relationship_kinds_in_source_order() {
        let text = r#"
@Entity()
export class Company {
  @OneToOne(() => Address)
  @JoinColumn()
  address: Address;

  @ManyToMany(() => Tag, (tag) => tag.companies)
  @JoinTable()
  tags: Tag[];

  @OneToMany(() => Shift, (shift) => shift.company)
  shifts: Shift[];

  @ManyToOne(() => Group, { onDelete: 'CASCADE' })
  group: Group;
}
"#;
        let (entity, _) = extract(text);
        let kinds: Vec<_> = entity
            .unwrap()
            .relationships
            .iter()
            .map(|e| (e.kind, e.to_entity.clone()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (RelationshipKind::OneToOne, "Address".to_string()),
                (RelationshipKind::ManyToMany, "Tag".to_string()),
                (RelationshipKind::OneToMany, "Shift".to_string()),
                (RelationshipKind::ManyToOne, "Group".to_string()),
            ]
        );
    }
}
