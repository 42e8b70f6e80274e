use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::MaritalStatus;

/// Which branch of the property picker the user went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyChoiceType {
    Building,
    Flat,
}

/// Raw property picker state. Any combination of ids may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyChoice {
    pub property_type: Option<PropertyChoiceType>,
    pub building_id: Option<String>,
    pub apartment_id: Option<String>,
    pub flat_id: Option<String>,
}

impl PropertyChoice {
    pub fn apartment(building_id: &str, apartment_id: &str) -> Self {
        Self {
            property_type: Some(PropertyChoiceType::Building),
            building_id: Some(building_id.to_string()),
            apartment_id: Some(apartment_id.to_string()),
            flat_id: None,
        }
    }

    pub fn flat(flat_id: &str) -> Self {
        Self {
            property_type: Some(PropertyChoiceType::Flat),
            building_id: None,
            apartment_id: None,
            flat_id: Some(flat_id.to_string()),
        }
    }
}

/// Tenant form exactly as submitted: free text for numbers and dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantForm {
    pub full_name: String,
    pub father_name: Option<String>,
    pub phone: String,
    pub alternate_phone: Option<String>,
    pub email: Option<String>,
    pub permanent_address: Option<String>,
    pub occupation: String,
    pub monthly_income: Option<String>,
    pub family_size: Option<u8>,
    pub marital_status: Option<MaritalStatus>,
    pub agreement_number: String,
    pub start_date: String,
    pub end_date: String,
    pub rent_amount: Option<String>,
    pub security_deposit: Option<String>,
    pub rent_due_day: Option<u8>,
    pub move_in_date: Option<String>,
    pub is_active: Option<bool>,
    pub property: PropertyChoice,
}

/// Form after required-field and format checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTenantForm {
    pub full_name: String,
    pub father_name: Option<String>,
    pub phone: String,
    pub alternate_phone: Option<String>,
    pub email: Option<String>,
    pub permanent_address: Option<String>,
    pub occupation: String,
    pub monthly_income: Option<u32>,
    pub family_size: Option<u8>,
    pub marital_status: Option<MaritalStatus>,
    pub agreement_number: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_amount: Option<u32>,
    pub security_deposit: Option<u32>,
    pub rent_due_day: Option<u8>,
    pub move_in_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
    pub property: PropertyChoice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

/// Every field-level problem found in one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    pub issues: Vec<FieldIssue>,
}

impl FormError {
    pub fn has_issue(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid tenant form")?;
        for (index, issue) in self.issues.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{} {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FormError {}

struct Collector {
    issues: Vec<FieldIssue>,
}

impl Collector {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            field,
            message: message.into(),
        });
    }

    fn required(&mut self, field: &'static str, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, "is required");
        }
        trimmed.to_string()
    }

    fn required_date(&mut self, field: &'static str, value: &str) -> Option<NaiveDate> {
        if value.trim().is_empty() {
            self.push(field, "is required");
            return None;
        }
        self.date(field, value)
    }

    fn date(&mut self, field: &'static str, value: &str) -> Option<NaiveDate> {
        match parse_date(value) {
            Ok(date) => Some(date),
            Err(message) => {
                self.push(field, message);
                None
            }
        }
    }

    fn optional_date(&mut self, field: &'static str, value: Option<&str>) -> Option<NaiveDate> {
        value
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| self.date(field, raw))
    }

    fn amount(&mut self, field: &'static str, value: Option<&str>) -> Option<u32> {
        let raw = value.map(str::trim).filter(|raw| !raw.is_empty())?;
        match parse_amount(raw) {
            Some(amount) => Some(amount),
            None => {
                self.push(field, format!("'{raw}' is not a whole, non-negative amount"));
                None
            }
        }
    }
}

/// Parse a form date. Accepts `YYYY-MM-DD` and full ISO-8601 timestamps.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    let date_part = trimmed.split_once('T').map_or(trimmed, |(date, _)| date);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|err| format!("'{raw}' is not a YYYY-MM-DD date ({err})"))
}

fn parse_amount(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(|ch| *ch != ',' && *ch != '_').collect();
    digits.parse::<u32>().ok()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(str::to_string)
}

impl TenantForm {
    /// Check required fields and coerce text inputs into typed values.
    pub fn validate(&self) -> Result<ValidatedTenantForm, FormError> {
        let mut collector = Collector { issues: Vec::new() };

        let full_name = collector.required("full_name", &self.full_name);
        let phone = collector.required("phone", &self.phone);
        let occupation = collector.required("occupation", &self.occupation);
        let agreement_number = collector.required("agreement_number", &self.agreement_number);
        let start_date = collector.required_date("start_date", &self.start_date);
        let end_date = collector.required_date("end_date", &self.end_date);

        let monthly_income = collector.amount("monthly_income", self.monthly_income.as_deref());
        let rent_amount = collector.amount("rent_amount", self.rent_amount.as_deref());
        let security_deposit =
            collector.amount("security_deposit", self.security_deposit.as_deref());
        let move_in_date = collector.optional_date("move_in_date", self.move_in_date.as_deref());

        if let Some(day) = self.rent_due_day {
            if !(1..=31).contains(&day) {
                collector.push("rent_due_day", format!("{day} is not a day of the month"));
            }
        }

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                collector.push("end_date", format!("{end} is before the start date {start}"));
            }
        }

        match (start_date, end_date) {
            (Some(start_date), Some(end_date)) if collector.issues.is_empty() => {
                Ok(ValidatedTenantForm {
                    full_name,
                    father_name: non_blank(&self.father_name),
                    phone,
                    alternate_phone: non_blank(&self.alternate_phone),
                    email: non_blank(&self.email),
                    permanent_address: non_blank(&self.permanent_address),
                    occupation,
                    monthly_income,
                    family_size: self.family_size,
                    marital_status: self.marital_status,
                    agreement_number,
                    start_date,
                    end_date,
                    rent_amount,
                    security_deposit,
                    rent_due_day: self.rent_due_day,
                    move_in_date,
                    is_active: self.is_active,
                    property: self.property.clone(),
                })
            }
            _ => Err(FormError {
                issues: collector.issues,
            }),
        }
    }
}
