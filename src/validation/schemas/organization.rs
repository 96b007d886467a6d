//! Departments and positions.

use serde_json::{Map, Value};

use super::common::{code, money, number_of, one_of, page_fields, text, text_between};
use crate::config::POSITION_LEVELS;
use crate::validation::error::ErrorCode;
use crate::validation::registry::SchemaName;
use crate::validation::rules::{Context, CrossRule, Field, Kind, Schema};

pub fn schemas() -> Vec<(SchemaName, Schema)> {
    let department = create_department();
    let position = create_position();
    vec![
        (SchemaName::UpdateDepartment, department.partial()),
        (SchemaName::CreateDepartment, department),
        (SchemaName::UpdatePosition, position.partial()),
        (SchemaName::CreatePosition, position),
        (SchemaName::IdParam, id_param()),
        (SchemaName::ListQuery, list_query()),
    ]
}

fn create_department() -> Schema {
    Schema::new(vec![
        Field::required("name", text_between(2, 100)),
        Field::required("code", code(r"^[A-Z]{2,10}$", "must be 2-10 capital letters")),
        Field::optional("description", text(500)),
        Field::optional("managerId", Kind::Uuid),
        Field::with_default("isActive", Kind::Boolean, true),
    ])
}

fn create_position() -> Schema {
    Schema::new(vec![
        Field::required("title", text_between(2, 100)),
        Field::required("departmentId", Kind::Uuid),
        Field::optional("level", one_of(POSITION_LEVELS)),
        Field::optional("description", text(1000)),
        Field::optional("minSalary", money()),
        Field::optional("maxSalary", money()),
        Field::with_default("isActive", Kind::Boolean, true),
    ])
    .with_rules(vec![CrossRule {
        field: "maxSalary",
        requires: &["minSalary", "maxSalary"],
        code: ErrorCode::NumberMin,
        check: salary_band_ordered,
    }])
}

fn id_param() -> Schema {
    Schema::new(vec![Field::required("id", Kind::Uuid)])
}

fn list_query() -> Schema {
    let mut fields = page_fields();
    fields.extend([
        Field::optional("search", text(100)),
        Field::optional("isActive", Kind::Boolean),
    ]);
    Schema::new(fields)
}

fn salary_band_ordered(value: &Map<String, Value>, _: &Context) -> Result<(), String> {
    match (number_of(value, "minSalary"), number_of(value, "maxSalary")) {
        (Some(min), Some(max)) if max < min => {
            Err("\"maxSalary\" must be greater than or equal to \"minSalary\"".to_string())
        }
        _ => Ok(()),
    }
}
