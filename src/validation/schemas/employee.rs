//! Employee record schemas, including the nested salary structure.

use serde_json::json;

use super::common::{
    code, digits, email, employee_code, int_between, money, money_or_zero, one_of,
    one_of_any_case, page_fields, past_date, person_name, phone, text, text_between,
};
use crate::config::{
    CURRENCIES, DEFAULT_CURRENCY, DEFAULT_EMPLOYMENT_TYPE, DEFAULT_EMPLOYEE_STATUS,
    DEFAULT_PAY_FREQUENCY, DEFAULT_TAX_REGIME, EMPLOYEE_STATUSES, EMPLOYMENT_TYPES, GENDERS,
    MARITAL_STATUSES, MIN_EMPLOYEE_AGE_YEARS, PAY_FREQUENCIES, TAX_REGIMES,
};
use crate::validation::registry::SchemaName;
use crate::validation::rules::{DateRule, Field, Kind, Schema};

pub fn schemas() -> Vec<(SchemaName, Schema)> {
    let create = create_employee();
    let update = create.partial();
    vec![
        (SchemaName::CreateEmployee, create),
        (SchemaName::UpdateEmployee, update),
        (SchemaName::EmployeeQuery, employee_query()),
    ]
}

fn create_employee() -> Schema {
    Schema::new(vec![
        Field::required("employeeId", employee_code()),
        Field::required("firstName", person_name(2, 50)),
        Field::required("lastName", person_name(2, 50)),
        Field::required("email", email()),
        Field::optional("phone", phone()),
        Field::optional(
            "dateOfBirth",
            Kind::Date(DateRule {
                not_future: true,
                min_age_years: Some(MIN_EMPLOYEE_AGE_YEARS),
                weekday: None,
            }),
        ),
        Field::optional("gender", one_of_any_case(GENDERS)),
        Field::optional("maritalStatus", one_of(MARITAL_STATUSES)),
        Field::optional("address", Kind::Object(address())),
        Field::required("departmentId", Kind::Uuid),
        Field::required("positionId", Kind::Uuid),
        Field::optional("managerId", Kind::Uuid),
        Field::required("hireDate", past_date()),
        Field::with_default(
            "employmentType",
            one_of(EMPLOYMENT_TYPES),
            DEFAULT_EMPLOYMENT_TYPE,
        ),
        Field::with_default("status", one_of(EMPLOYEE_STATUSES), DEFAULT_EMPLOYEE_STATUS),
        Field::optional("probationPeriod", int_between(0, 24)),
        Field::optional("noticePeriod", int_between(0, 365)),
        Field::optional("salary", Kind::Object(salary())),
        Field::optional(
            "panNumber",
            code(
                r"^[A-Z]{5}[0-9]{4}[A-Z]$",
                "must be a valid PAN (e.g. ABCDE1234F)",
            ),
        ),
        Field::optional(
            "aadhaarNumber",
            digits(r"^\d{12}$", "must be exactly 12 digits"),
        ),
        Field::optional("uanNumber", digits(r"^\d{12}$", "must be exactly 12 digits")),
        Field::optional("esiNumber", digits(r"^\d{17}$", "must be exactly 17 digits")),
        Field::optional("bankDetails", Kind::Object(bank_details())),
        Field::optional("emergencyContact", Kind::Object(emergency_contact())),
    ])
}

fn address() -> Schema {
    Schema::new(vec![
        Field::optional("street", text(200)),
        Field::optional("city", text(100)),
        Field::optional("state", text(100)),
        Field::optional("zipCode", digits(r"^\d{6}$", "must be exactly 6 digits")),
        Field::with_default("country", text(100), "India"),
    ])
}

fn bank_details() -> Schema {
    Schema::new(vec![
        Field::required(
            "accountNumber",
            digits(r"^\d{9,18}$", "must be between 9 and 18 digits"),
        ),
        Field::required("bankName", text_between(2, 100)),
        Field::required(
            "ifscCode",
            code(
                r"^[A-Z]{4}0[A-Z0-9]{6}$",
                "must be a valid IFSC code (e.g. SBIN0001234)",
            ),
        ),
        Field::optional("accountHolderName", person_name(2, 100)),
    ])
}

fn emergency_contact() -> Schema {
    Schema::new(vec![
        Field::required("name", person_name(2, 100)),
        Field::required("relationship", text_between(2, 50)),
        Field::required("phone", phone()),
    ])
}

/// Salary structure; every sub-object defaults to all-zero amounts.
fn salary() -> Schema {
    Schema::new(vec![
        Field::required("basicSalary", money()),
        Field::with_default("currency", one_of_any_case(CURRENCIES), DEFAULT_CURRENCY),
        Field::with_default(
            "payFrequency",
            one_of_any_case(PAY_FREQUENCIES),
            DEFAULT_PAY_FREQUENCY,
        ),
        Field::optional("effectiveFrom", super::common::date()),
        Field::with_default("allowances", Kind::Object(allowances()), json!({})),
        Field::with_default("deductions", Kind::Object(deductions()), json!({})),
        Field::with_default("benefits", Kind::Object(benefits()), json!({})),
        Field::with_default("taxInformation", Kind::Object(tax_information()), json!({})),
    ])
}

fn allowances() -> Schema {
    Schema::new(vec![
        money_or_zero("hra"),
        money_or_zero("transport"),
        money_or_zero("medical"),
        money_or_zero("food"),
        money_or_zero("special"),
        money_or_zero("other"),
    ])
}

fn deductions() -> Schema {
    Schema::new(vec![
        money_or_zero("providentFund"),
        money_or_zero("professionalTax"),
        money_or_zero("incomeTax"),
        money_or_zero("esi"),
        money_or_zero("loan"),
        money_or_zero("other"),
    ])
}

fn benefits() -> Schema {
    Schema::new(vec![
        money_or_zero("healthInsurance"),
        money_or_zero("lifeInsurance"),
        money_or_zero("mealVouchers"),
        money_or_zero("other"),
    ])
}

fn tax_information() -> Schema {
    Schema::new(vec![
        Field::with_default("taxRegime", one_of_any_case(TAX_REGIMES), DEFAULT_TAX_REGIME),
        money_or_zero("exemptions"),
        money_or_zero("declaredInvestments"),
        money_or_zero("previousEmployerIncome"),
    ])
}

fn employee_query() -> Schema {
    let mut fields = page_fields();
    fields.extend([
        Field::optional("departmentId", Kind::Uuid),
        Field::optional("positionId", Kind::Uuid),
        Field::optional("status", one_of(EMPLOYEE_STATUSES)),
        Field::optional("employmentType", one_of(EMPLOYMENT_TYPES)),
    ]);
    Schema::new(fields)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    use crate::validation::{validate_at, ErrorCode, SchemaName};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 6, 0, 0).unwrap()
    }

    fn employee() -> Value {
        json!({
            "employeeId": "EMP1001",
            "firstName": "Priya",
            "lastName": "Sharma",
            "email": "Priya.Sharma@Example.com",
            "departmentId": "6f1c1f0e-4a39-4f1e-9c39-0d8b5f6b8a11",
            "positionId": "0e5d6b2a-8e3a-4c55-a7f1-2b6f3f9e4c22",
            "hireDate": "2023-04-01"
        })
    }

    fn with(mut base: Value, key: &str, value: Value) -> Value {
        base.as_object_mut().unwrap().insert(key.to_string(), value);
        base
    }

    #[test]
    fn test_minimal_employee_gets_defaults() {
        let outcome = validate_at(SchemaName::CreateEmployee, &employee(), now()).unwrap();
        let value = outcome.value().unwrap();

        assert_eq!(value["email"], json!("priya.sharma@example.com"));
        assert_eq!(value["employmentType"], json!("Full-time"));
        assert_eq!(value["status"], json!("Active"));
        assert!(!value.contains_key("salary"));
    }

    #[test]
    fn test_salary_sub_objects_default_to_zero() {
        let payload = with(employee(), "salary", json!({ "basicSalary": 50000, "payFrequency": "monthly" }));
        let outcome = validate_at(SchemaName::CreateEmployee, &payload, now()).unwrap();
        let salary = &outcome.value().unwrap()["salary"];

        assert_eq!(salary["payFrequency"], json!("Monthly"));
        assert_eq!(salary["currency"], json!("INR"));
        assert_eq!(salary["allowances"]["hra"], json!(0));
        assert_eq!(salary["deductions"]["providentFund"], json!(0));
        assert_eq!(salary["benefits"]["healthInsurance"], json!(0));
        assert_eq!(salary["taxInformation"]["taxRegime"], json!("New"));
    }

    #[test]
    fn test_negative_basic_salary_is_the_only_error() {
        let payload = with(employee(), "salary", json!({ "basicSalary": -5 }));
        let outcome = validate_at(SchemaName::CreateEmployee, &payload, now()).unwrap();
        let errors = outcome.errors().unwrap();

        assert_eq!(errors.len(), 1);
        let error = errors.get("salary.basicSalary").unwrap();
        assert_eq!(error.code, ErrorCode::NumberMin);
    }

    #[test]
    fn test_nested_allowance_path() {
        let payload = with(
            employee(),
            "salary",
            json!({ "basicSalary": 1000, "allowances": { "hra": "lots" } }),
        );
        let outcome = validate_at(SchemaName::CreateEmployee, &payload, now()).unwrap();

        assert_eq!(
            outcome.errors().unwrap().get("salary.allowances.hra").unwrap().code,
            ErrorCode::NumberBase
        );
    }

    #[test]
    fn test_money_upper_bound() {
        let payload = with(employee(), "salary", json!({ "basicSalary": 10_000_000.01 }));
        let outcome = validate_at(SchemaName::CreateEmployee, &payload, now()).unwrap();

        assert_eq!(
            outcome.errors().unwrap().get("salary.basicSalary").unwrap().code,
            ErrorCode::NumberMax
        );
    }

    #[test]
    fn test_age_boundary() {
        let exactly_eighteen = with(employee(), "dateOfBirth", json!("2006-06-15"));
        let outcome = validate_at(SchemaName::CreateEmployee, &exactly_eighteen, now()).unwrap();
        assert!(outcome.is_valid());

        let one_day_short = with(employee(), "dateOfBirth", json!("2006-06-16"));
        let outcome = validate_at(SchemaName::CreateEmployee, &one_day_short, now()).unwrap();
        assert_eq!(
            outcome.errors().unwrap().get("dateOfBirth").unwrap().code,
            ErrorCode::Custom
        );
    }

    #[test]
    fn test_future_hire_date_rejected() {
        let payload = with(employee(), "hireDate", json!("2024-06-16"));
        let outcome = validate_at(SchemaName::CreateEmployee, &payload, now()).unwrap();

        assert_eq!(
            outcome.errors().unwrap().get("hireDate").unwrap().code,
            ErrorCode::DateMax
        );
    }

    #[test]
    fn test_identifier_patterns() {
        let payload = with(
            with(employee(), "panNumber", json!("abcde1234f")),
            "phone",
            json!("98765"),
        );
        let outcome = validate_at(SchemaName::CreateEmployee, &payload, now()).unwrap();
        let errors = outcome.errors().unwrap();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("phone").unwrap().message, "\"phone\" must be exactly 10 digits");
    }

    #[test]
    fn test_update_requires_at_least_one_field() {
        let outcome = validate_at(SchemaName::UpdateEmployee, &json!({}), now()).unwrap();

        assert_eq!(outcome.errors().unwrap().get("value").unwrap().code, ErrorCode::ObjectMin);
    }

    #[test]
    fn test_update_does_not_apply_top_level_defaults() {
        let outcome =
            validate_at(SchemaName::UpdateEmployee, &json!({ "firstName": "Asha" }), now()).unwrap();
        let value = outcome.value().unwrap();

        assert_eq!(value.len(), 1);
        assert_eq!(value["firstName"], json!("Asha"));
    }

    #[test]
    fn test_normalized_value_is_stable() {
        let payload = with(employee(), "salary", json!({ "basicSalary": "45000.5" }));
        let first = validate_at(SchemaName::CreateEmployee, &payload, now())
            .unwrap()
            .into_result()
            .unwrap();
        let second = validate_at(SchemaName::CreateEmployee, &Value::Object(first.clone()), now())
            .unwrap()
            .into_result()
            .unwrap();

        assert_eq!(first, second);
    }
}
