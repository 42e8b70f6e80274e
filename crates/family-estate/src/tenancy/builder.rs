use chrono::{DateTime, Duration, Utc};

use super::domain::{ContactInfo, PersonalInfo, RentalAgreement, Tenant, TenantId};
use super::form::ValidatedTenantForm;
use super::resolver::ResolvedAssignment;

pub const DEFAULT_RENT_DUE_DAY: u8 = 5;
pub const DEPOSIT_RENT_MULTIPLIER: u32 = 2;

/// Assembles complete `Tenant` records from validated form input.
#[derive(Debug, Clone, Copy)]
pub struct TenantRecordBuilder {
    now: DateTime<Utc>,
}

impl TenantRecordBuilder {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Fresh tenant: new id, both timestamps set to `now`, unedited sections defaulted.
    pub fn create(&self, form: ValidatedTenantForm, resolved: ResolvedAssignment) -> Tenant {
        self.assemble(form, resolved, None)
    }

    /// Edited tenant: id and `created_at` kept, sections the form does not cover carried over.
    pub fn rebuild(
        &self,
        existing: &Tenant,
        form: ValidatedTenantForm,
        resolved: ResolvedAssignment,
    ) -> Tenant {
        self.assemble(form, resolved, Some(existing))
    }

    fn updated_at(&self, existing: Option<&Tenant>) -> DateTime<Utc> {
        match existing {
            Some(previous) if self.now <= previous.updated_at => {
                previous.updated_at + Duration::milliseconds(1)
            }
            _ => self.now,
        }
    }

    fn assemble(
        &self,
        form: ValidatedTenantForm,
        resolved: ResolvedAssignment,
        existing: Option<&Tenant>,
    ) -> Tenant {
        let previous_agreement = existing.map(|tenant| &tenant.rental_agreement);
        let previous_personal = existing.map(|tenant| &tenant.personal_info);

        // A blank rent keeps the agreed rent while the tenant stays on the same unit;
        // the unit's stored rent only applies to new placements.
        let agreed_rent = existing
            .filter(|tenant| tenant.assignment == resolved.assignment)
            .map(|tenant| tenant.rental_agreement.rent_amount);
        let rent_amount = form
            .rent_amount
            .or(agreed_rent)
            .or(resolved.rent_amount)
            .or(previous_agreement.map(|agreement| agreement.rent_amount))
            .unwrap_or(0);
        let security_deposit = form
            .security_deposit
            .or_else(|| {
                previous_agreement
                    .filter(|agreement| agreement.rent_amount == rent_amount)
                    .map(|agreement| agreement.security_deposit)
            })
            .unwrap_or_else(|| rent_amount.saturating_mul(DEPOSIT_RENT_MULTIPLIER));

        let rental_agreement = RentalAgreement {
            agreement_number: form.agreement_number,
            start_date: form.start_date,
            end_date: form.end_date,
            rent_amount,
            security_deposit,
            rent_due_day: form
                .rent_due_day
                .or(previous_agreement.map(|agreement| agreement.rent_due_day))
                .unwrap_or(DEFAULT_RENT_DUE_DAY),
            maintenance_charge: previous_agreement
                .map(|agreement| agreement.maintenance_charge)
                .unwrap_or_default(),
            notice_period_days: previous_agreement
                .map(|agreement| agreement.notice_period_days)
                .unwrap_or_default(),
            special_terms: previous_agreement
                .map(|agreement| agreement.special_terms.clone())
                .unwrap_or_default(),
        };

        let personal_info = PersonalInfo {
            full_name: form.full_name,
            father_name: form.father_name,
            date_of_birth: previous_personal.and_then(|info| info.date_of_birth),
            occupation: form.occupation,
            monthly_income: form.monthly_income,
            family_size: form
                .family_size
                .or(previous_personal.map(|info| info.family_size))
                .unwrap_or(1),
            marital_status: form
                .marital_status
                .or(previous_personal.map(|info| info.marital_status))
                .unwrap_or_default(),
        };

        let contact_info = ContactInfo {
            phone: form.phone,
            alternate_phone: form.alternate_phone,
            email: form.email,
            permanent_address: form.permanent_address,
        };

        Tenant {
            id: existing
                .map(|tenant| tenant.id.clone())
                .unwrap_or_else(TenantId::generate),
            personal_info,
            contact_info,
            emergency_contact: existing
                .map(|tenant| tenant.emergency_contact.clone())
                .unwrap_or_default(),
            identification: existing
                .map(|tenant| tenant.identification.clone())
                .unwrap_or_default(),
            references: existing
                .map(|tenant| tenant.references.clone())
                .unwrap_or_default(),
            documents: existing
                .map(|tenant| tenant.documents.clone())
                .unwrap_or_default(),
            move_in_date: form
                .move_in_date
                .or(existing.and_then(|tenant| tenant.move_in_date))
                .or(Some(rental_agreement.start_date)),
            move_out_date: existing.and_then(|tenant| tenant.move_out_date),
            is_active: form
                .is_active
                .or(existing.map(|tenant| tenant.is_active))
                .unwrap_or(true),
            assignment: resolved.assignment,
            created_at: existing.map_or(self.now, |tenant| tenant.created_at),
            updated_at: self.updated_at(existing),
            rental_agreement,
        }
    }
}
