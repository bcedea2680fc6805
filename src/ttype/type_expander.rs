use itertools::Itertools;
use phlint_code_info::code_location::HPos;
use phlint_code_info::codebase_info::CodebaseInfo;
use phlint_code_info::issue::{Issue, IssueKind};
use phlint_code_info::t_atomic::TAtomic;
use phlint_code_info::t_union::TUnion;

use crate::template::{inferred_type_replacer, TemplateResult};
use crate::{get_mixed, get_nothing};

#[derive(Debug)]
pub enum StaticClassType<'a> {
    None,
    Name(&'a str),
    Object(&'a TAtomic),
}

/// How aggressively `expand_union` rewrites contextual and named references.
pub struct TypeExpansionOptions<'a> {
    pub self_class: Option<&'a str>,
    pub static_class_type: StaticClassType<'a>,
    pub parent_class: Option<&'a str>,

    pub evaluate_class_constants: bool,
    pub expand_type_aliases: bool,

    /// Where to report unresolvable references; `None` silences them.
    pub expansion_pos: Option<&'a HPos>,
}

impl Default for TypeExpansionOptions<'_> {
    fn default() -> Self {
        Self {
            self_class: None,
            static_class_type: StaticClassType::None,
            parent_class: None,
            evaluate_class_constants: true,
            expand_type_aliases: true,
            expansion_pos: None,
        }
    }
}

/// Resolves contextual class names (`self`, `static`, `parent`), class
/// constants, and type aliases inside a union, recursing into every nested
/// type parameter.
pub fn expand_union(
    codebase: &CodebaseInfo,
    return_type: &mut TUnion,
    options: &TypeExpansionOptions,
    issues: &mut Vec<Issue>,
) {
    let mut new_return_type_parts = Vec::new();

    let mut skipped_keys = Vec::new();

    let return_type_types = return_type
        .types
        .iter_mut()
        .map(|(k, v)| (k.clone(), v))
        .collect_vec();

    for (return_type_key, return_type_part) in return_type_types {
        let mut skip_key = false;
        expand_atomic(
            return_type_part,
            codebase,
            options,
            &mut skip_key,
            &mut new_return_type_parts,
            issues,
        );

        if skip_key {
            skipped_keys.push(return_type_key);
        }
    }

    if !skipped_keys.is_empty() {
        for skipped_key in &skipped_keys {
            return_type.types.remove(skipped_key);
        }

        for new_part in new_return_type_parts {
            return_type.add_type(new_part);
        }

        if return_type.types.is_empty() {
            *return_type = get_nothing();
        }
    }
}

fn expand_atomic(
    return_type_part: &mut TAtomic,
    codebase: &CodebaseInfo,
    options: &TypeExpansionOptions,
    skip_key: &mut bool,
    new_return_type_parts: &mut Vec<TAtomic>,
    issues: &mut Vec<Issue>,
) {
    // renaming changes the atomic's identity key, so the member has to go
    // back through `add_type` to keep the union keyed correctly
    let mut renamed = false;

    match return_type_part {
        TAtomic::TArray {
            key_param,
            value_param,
            ..
        } => {
            expand_union(codebase, key_param, options, issues);
            expand_union(codebase, value_param, options, issues);
        }
        TAtomic::TList { type_param, .. } => {
            expand_union(codebase, type_param, options, issues);
        }
        TAtomic::TKeyedArray {
            known_items,
            params,
            ..
        } => {
            for (_, (_, item_type)) in known_items.iter_mut() {
                let mut new_item_type = (**item_type).clone();
                expand_union(codebase, &mut new_item_type, options, issues);
                *item_type = std::sync::Arc::new(new_item_type);
            }

            if let Some((key_param, value_param)) = params {
                expand_union(codebase, key_param, options, issues);
                expand_union(codebase, value_param, options, issues);
            }
        }
        TAtomic::TIterable {
            key_param,
            value_param,
        } => {
            expand_union(codebase, key_param, options, issues);
            expand_union(codebase, value_param, options, issues);
        }
        TAtomic::TClosure {
            params,
            return_type,
            ..
        } => {
            for param in params.iter_mut() {
                if let Some(param_type) = &mut param.signature_type {
                    expand_union(codebase, param_type, options, issues);
                }
            }

            if let Some(return_type) = return_type {
                expand_union(codebase, return_type, options, issues);
            }
        }
        TAtomic::TNamedObject {
            name, type_params, ..
        } => {
            if name == "this" || name == "static" {
                match options.static_class_type {
                    StaticClassType::None => (),
                    StaticClassType::Name(static_name) => {
                        *name = static_name.to_string();
                        renamed = true;
                    }
                    StaticClassType::Object(static_object) => {
                        *skip_key = true;
                        new_return_type_parts.push(static_object.clone());
                        return;
                    }
                }
            } else if name == "self" {
                if let Some(self_class) = options.self_class {
                    *name = self_class.to_string();
                    renamed = true;
                }
            } else if name == "parent" {
                if let Some(parent_class) = options.parent_class {
                    *name = parent_class.to_string();
                    renamed = true;
                }
            }

            if let Some(type_params) = type_params {
                for type_param in type_params.iter_mut() {
                    expand_union(codebase, type_param, options, issues);
                }
            }
        }
        TAtomic::TClassString { as_name, as_type } => {
            if as_name == "self" || as_name == "this" || as_name == "static" {
                let resolved = match (as_name.as_str(), &options.static_class_type) {
                    ("self", _) => options.self_class.map(|c| c.to_string()),
                    (_, StaticClassType::Name(static_name)) => Some(static_name.to_string()),
                    (_, StaticClassType::Object(TAtomic::TNamedObject { name, .. })) => {
                        Some(name.clone())
                    }
                    _ => options.self_class.map(|c| c.to_string()),
                };

                if let Some(resolved) = resolved {
                    *as_name = resolved.clone();
                    *as_type = Some(Box::new(TAtomic::TNamedObject {
                        name: resolved,
                        type_params: None,
                        is_this: false,
                        extra_types: None,
                    }));
                    renamed = true;
                }
            }
        }
        TAtomic::TTemplateParam { as_type, .. } => {
            expand_union(codebase, as_type, options, issues);
        }
        TAtomic::TClassTypeConstant {
            class_type,
            member_name,
        } => {
            if !options.evaluate_class_constants {
                return;
            }

            let class_name = match class_type.as_ref() {
                TAtomic::TNamedObject { name, .. } => match name.as_str() {
                    "self" | "this" | "static" => options.self_class.map(|c| c.to_string()),
                    _ => Some(name.clone()),
                },
                _ => None,
            };

            let constant_type = class_name
                .as_deref()
                .and_then(|class_name| codebase.get_class_constant_type(class_name, member_name));

            if let Some(mut constant_type) = constant_type {
                expand_union(codebase, &mut constant_type, options, issues);

                *skip_key = true;
                new_return_type_parts.extend(constant_type.types.into_values());
            } else if class_name
                .as_deref()
                .map(|class_name| codebase.class_or_interface_exists(class_name))
                .unwrap_or(false)
            {
                // the class exists but the constant doesn't
                if let Some(pos) = options.expansion_pos {
                    issues.push(Issue::new(
                        IssueKind::InvalidDocblock,
                        format!(
                            "Unknown type constant {}::{}",
                            class_name.unwrap_or_default(),
                            member_name
                        ),
                        pos.clone(),
                    ));
                }

                *skip_key = true;
                new_return_type_parts.extend(get_mixed().types.into_values());
            }
        }
        TAtomic::TTypeAlias { name, type_params } => {
            if !options.expand_type_aliases {
                if let Some(type_params) = type_params {
                    for type_param in type_params.iter_mut() {
                        expand_union(codebase, type_param, options, issues);
                    }
                }
                return;
            }

            let type_definition = if let Some(type_definition) = codebase.type_definitions.get(name)
            {
                type_definition
            } else {
                if let Some(pos) = options.expansion_pos {
                    issues.push(Issue::new(
                        IssueKind::InvalidDocblock,
                        format!("Unknown type alias {}", name),
                        pos.clone(),
                    ));
                }

                *skip_key = true;
                new_return_type_parts.extend(get_mixed().types.into_values());
                return;
            };

            let mut actual_type = type_definition.actual_type.clone();

            if let Some(type_params) = type_params {
                let mut template_result = TemplateResult::default();

                for (i, (param_name, (defining_entity, _))) in
                    type_definition.template_types.iter().enumerate()
                {
                    let bound_type = type_params.get(i).cloned().unwrap_or(get_mixed());
                    template_result.add_lower_bound(
                        param_name.clone(),
                        defining_entity.clone(),
                        bound_type,
                    );
                }

                actual_type = inferred_type_replacer::replace(&actual_type, &template_result, Some(codebase));
            }

            expand_union(codebase, &mut actual_type, options, issues);

            *skip_key = true;
            new_return_type_parts.extend(actual_type.types.into_values());
        }
        _ => (),
    }

    if renamed {
        *skip_key = true;
        new_return_type_parts.push(return_type_part.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{get_int, get_string, wrap_atomic};
    use phlint_code_info::classlike_info::{ClassLikeInfo, ClassLikeKind};
    use phlint_code_info::type_definition_info::TypeDefinitionInfo;
    use indexmap::IndexMap;

    fn expansion_codebase() -> CodebaseInfo {
        let mut codebase = CodebaseInfo::new();

        let mut config = ClassLikeInfo::new("Config".to_string(), ClassLikeKind::Class);
        config
            .constant_types
            .insert("TIMEOUT".to_string(), get_int());
        codebase.add_classlike(config);

        codebase.type_definitions.insert(
            "UserId".to_string(),
            TypeDefinitionInfo {
                actual_type: get_int(),
                template_types: IndexMap::new(),
            },
        );

        codebase
    }

    #[test]
    fn self_resolves_to_current_class() {
        let codebase = expansion_codebase();
        let mut union = crate::get_named_object("self".to_string());
        let mut issues = Vec::new();

        expand_union(
            &codebase,
            &mut union,
            &TypeExpansionOptions {
                self_class: Some("Config"),
                ..Default::default()
            },
            &mut issues,
        );

        assert_eq!(union.get_id(), "Config");
    }

    #[test]
    fn renamed_members_are_rekeyed_and_deduped() {
        let codebase = expansion_codebase();
        let mut union = crate::get_named_object("Config".to_string());
        union.add_type(TAtomic::TNamedObject {
            name: "self".to_string(),
            type_params: None,
            is_this: false,
            extra_types: None,
        });
        let mut issues = Vec::new();

        expand_union(
            &codebase,
            &mut union,
            &TypeExpansionOptions {
                self_class: Some("Config"),
                ..Default::default()
            },
            &mut issues,
        );

        assert_eq!(union.types.len(), 1);
        assert!(union.has_type("Config"));
        assert_eq!(union.get_id(), "Config");
    }

    #[test]
    fn class_constants_expand_to_their_type() {
        let codebase = expansion_codebase();
        let mut union = wrap_atomic(TAtomic::TClassTypeConstant {
            class_type: Box::new(TAtomic::TNamedObject {
                name: "Config".to_string(),
                type_params: None,
                is_this: false,
                extra_types: None,
            }),
            member_name: "TIMEOUT".to_string(),
        });
        let mut issues = Vec::new();

        expand_union(
            &codebase,
            &mut union,
            &TypeExpansionOptions::default(),
            &mut issues,
        );

        assert_eq!(union.get_id(), "int");
        assert!(issues.is_empty());
    }

    #[test]
    fn type_aliases_expand_recursively() {
        let codebase = expansion_codebase();
        let mut union = wrap_atomic(TAtomic::TTypeAlias {
            name: "UserId".to_string(),
            type_params: None,
        });
        let mut issues = Vec::new();

        expand_union(
            &codebase,
            &mut union,
            &TypeExpansionOptions::default(),
            &mut issues,
        );

        assert_eq!(union.get_id(), "int");
    }

    #[test]
    fn unknown_alias_becomes_mixed_and_reports() {
        let codebase = expansion_codebase();
        let mut union = wrap_atomic(TAtomic::TTypeAlias {
            name: "Unknown".to_string(),
            type_params: None,
        });
        let pos = HPos::new("a.php", 1, 1);
        let mut issues = Vec::new();

        expand_union(
            &codebase,
            &mut union,
            &TypeExpansionOptions {
                expansion_pos: Some(&pos),
                ..Default::default()
            },
            &mut issues,
        );

        assert!(union.is_mixed());
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0].kind, IssueKind::InvalidDocblock));
    }

    #[test]
    fn nested_params_are_expanded() {
        let codebase = expansion_codebase();
        let mut union = wrap_atomic(TAtomic::TArray {
            key_param: Box::new(get_string()),
            value_param: Box::new(wrap_atomic(TAtomic::TTypeAlias {
                name: "UserId".to_string(),
                type_params: None,
            })),
            non_empty: false,
        });
        let mut issues = Vec::new();

        expand_union(
            &codebase,
            &mut union,
            &TypeExpansionOptions::default(),
            &mut issues,
        );

        assert_eq!(union.get_id(), "array<string, int>");
    }
}
