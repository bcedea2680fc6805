use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::classlike_info::{ClassLikeInfo, ClassLikeKind};
use crate::t_union::TUnion;
use crate::type_definition_info::TypeDefinitionInfo;

/// Read-only whole-program knowledge the type engine consults: classlike
/// existence and ancestry, methods, constants, and type aliases. Everything
/// is keyed by fully-qualified name. Lookups that miss degrade to "assume
/// compatible" in the comparators, so an incomplete codebase only ever costs
/// precision, not correctness.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CodebaseInfo {
    pub classlike_infos: FxHashMap<String, ClassLikeInfo>,
    pub type_definitions: FxHashMap<String, TypeDefinitionInfo>,
}

impl CodebaseInfo {
    pub fn new() -> Self {
        Self {
            classlike_infos: FxHashMap::default(),
            type_definitions: FxHashMap::default(),
        }
    }

    pub fn class_exists(&self, fq_class_name: &str) -> bool {
        if let Some(classlike_info) = self.classlike_infos.get(fq_class_name) {
            classlike_info.kind == ClassLikeKind::Class
        } else {
            false
        }
    }

    pub fn interface_exists(&self, fq_interface_name: &str) -> bool {
        if let Some(classlike_info) = self.classlike_infos.get(fq_interface_name) {
            classlike_info.kind == ClassLikeKind::Interface
        } else {
            false
        }
    }

    pub fn class_or_interface_exists(&self, fq_name: &str) -> bool {
        self.class_exists(fq_name) || self.interface_exists(fq_name)
    }

    pub fn class_extends(&self, child_class: &str, parent_class: &str) -> bool {
        if let Some(classlike_info) = self.classlike_infos.get(child_class) {
            classlike_info.all_parent_classes.contains(parent_class)
        } else {
            false
        }
    }

    pub fn class_implements(&self, fq_class_name: &str, interface: &str) -> bool {
        if let Some(classlike_info) = self.classlike_infos.get(fq_class_name) {
            classlike_info.all_class_interfaces.contains(interface)
        } else {
            false
        }
    }

    pub fn interface_extends(&self, child_interface: &str, parent_interface: &str) -> bool {
        if let Some(classlike_info) = self.classlike_infos.get(child_interface) {
            classlike_info.all_parent_interfaces.contains(parent_interface)
        } else {
            false
        }
    }

    pub fn class_extends_or_implements(&self, child: &str, ancestor: &str) -> bool {
        self.class_extends(child, ancestor)
            || self.class_implements(child, ancestor)
            || self.interface_extends(child, ancestor)
    }

    pub fn method_exists(&self, fq_classlike_name: &str, method_name: &str) -> bool {
        if let Some(classlike_info) = self.classlike_infos.get(fq_classlike_name) {
            if classlike_info.methods.contains(method_name) {
                return true;
            }

            for parent in classlike_info
                .all_parent_classes
                .iter()
                .chain(classlike_info.all_parent_interfaces.iter())
            {
                if let Some(parent_info) = self.classlike_infos.get(parent) {
                    if parent_info.methods.contains(method_name) {
                        return true;
                    }
                }
            }
        }

        false
    }

    pub fn get_class_constant_type(
        &self,
        fq_class_name: &str,
        constant_name: &str,
    ) -> Option<TUnion> {
        if let Some(classlike_info) = self.classlike_infos.get(fq_class_name) {
            if let Some(constant_type) = classlike_info.constant_types.get(constant_name) {
                return Some(constant_type.clone());
            }

            for parent in &classlike_info.all_parent_classes {
                if let Some(parent_info) = self.classlike_infos.get(parent) {
                    if let Some(constant_type) = parent_info.constant_types.get(constant_name) {
                        return Some(constant_type.clone());
                    }
                }
            }
        }

        None
    }

    pub fn get_classlike_info(&self, fq_name: &str) -> Option<&ClassLikeInfo> {
        self.classlike_infos.get(fq_name)
    }

    pub fn add_classlike(&mut self, classlike_info: ClassLikeInfo) {
        self.classlike_infos
            .insert(classlike_info.name.clone(), classlike_info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_codebase() -> CodebaseInfo {
        let mut codebase = CodebaseInfo::new();

        let mut iterator =
            ClassLikeInfo::new("Iterator".to_string(), ClassLikeKind::Interface);
        iterator.methods.insert("current".to_string());
        codebase.add_classlike(iterator);

        let mut animal = ClassLikeInfo::new("Animal".to_string(), ClassLikeKind::Class);
        animal.methods.insert("speak".to_string());
        codebase.add_classlike(animal);

        let mut dog = ClassLikeInfo::new("Dog".to_string(), ClassLikeKind::Class);
        dog.direct_parent_class = Some("Animal".to_string());
        dog.all_parent_classes.insert("Animal".to_string());
        dog.all_class_interfaces.insert("Iterator".to_string());
        codebase.add_classlike(dog);

        codebase
    }

    #[test]
    fn ancestry_queries() {
        let codebase = sample_codebase();
        assert!(codebase.class_exists("Dog"));
        assert!(codebase.interface_exists("Iterator"));
        assert!(!codebase.class_exists("Iterator"));
        assert!(codebase.class_extends("Dog", "Animal"));
        assert!(codebase.class_implements("Dog", "Iterator"));
        assert!(codebase.class_extends_or_implements("Dog", "Iterator"));
        assert!(!codebase.class_extends("Animal", "Dog"));
    }

    #[test]
    fn method_lookup_walks_ancestors() {
        let codebase = sample_codebase();
        assert!(codebase.method_exists("Animal", "speak"));
        assert!(codebase.method_exists("Dog", "speak"));
        assert!(!codebase.method_exists("Dog", "fetch"));
        assert!(!codebase.method_exists("Unknown", "speak"));
    }
}
