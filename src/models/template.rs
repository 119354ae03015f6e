//! Built-in rule template model.

use serde::{Deserialize, Serialize};

use crate::models::rule::RuleRecord;

/// A named, categorized starting point for a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub category: String,
    pub description: String,
    pub rule: RuleRecord,
}

/// Template as listed to the operator, with its rendered rule text.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummary {
    pub name: String,
    pub category: String,
    pub description: String,
    pub rule_text: String,
    pub rule_data: RuleRecord,
}

impl From<&Template> for TemplateSummary {
    fn from(template: &Template) -> Self {
        Self {
            name: template.name.clone(),
            category: template.category.clone(),
            description: template.description.clone(),
            rule_text: template.rule.to_string(),
            rule_data: template.rule.clone(),
        }
    }
}
