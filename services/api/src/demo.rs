use crate::infra::{catalog_from, InMemoryNotifier, InMemoryPropertyStore, InMemoryTenantStore};
use chrono::{Local, NaiveDate};
use clap::Args;
use family_estate::dashboard::{write_roster, DashboardSummary};
use family_estate::error::AppError;
use family_estate::properties::PropertyRef;
use family_estate::tenancy::form::parse_date;
use family_estate::tenancy::{
    PropertyChoice, PropertySync, TenancyError, TenancyService, TenantForm,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// JSON property catalog to start from (defaults to the built-in demo portfolio).
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
    /// Reporting date for the dashboard (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RosterArgs {
    /// JSON property catalog to export (defaults to the built-in demo portfolio).
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

/// Print the occupancy roster of a seed catalog as CSV on stdout.
pub(crate) fn run_roster(args: RosterArgs) -> Result<(), AppError> {
    let catalog = catalog_from(args.seed.as_deref())?;
    let stdout = std::io::stdout();
    write_roster(&catalog, &[], stdout.lock()).map_err(TenancyError::from)?;
    Ok(())
}

fn demo_form(name: &str, agreement: &str, property: PropertyChoice) -> TenantForm {
    TenantForm {
        full_name: name.to_string(),
        phone: "9800000001".to_string(),
        occupation: "Shopkeeper".to_string(),
        agreement_number: agreement.to_string(),
        start_date: "2025-04-01".to_string(),
        end_date: "2026-03-31".to_string(),
        property,
        ..TenantForm::default()
    }
}

fn print_sync(writes: &[PropertySync]) {
    for write in writes {
        let state = if write.occupied { "occupied" } else { "vacant" };
        match &write.error {
            None => println!("    {} -> {}", write.property, state),
            Some(err) => println!("    {} -> {} FAILED ({})", write.property, state, err),
        }
    }
}

fn print_dashboard(summary: &DashboardSummary) {
    println!(
        "  {} buildings | apartments {}/{} occupied | flats {}/{} occupied | land {}/{} leased",
        summary.buildings,
        summary.apartments.occupied,
        summary.apartments.total,
        summary.flats.occupied,
        summary.flats.total,
        summary.lands.occupied,
        summary.lands.total
    );
    println!(
        "  {} active tenants ({} unassigned) | occupancy {:.0}% | monthly rent roll {}",
        summary.active_tenants,
        summary.unassigned_tenants,
        summary.occupancy_rate * 100.0,
        summary.monthly_rent_roll
    );
    for agreement in &summary.expiring_agreements {
        println!(
            "  - {} ({}) ends {} in {} days",
            agreement.tenant_name,
            agreement.agreement_number,
            agreement.end_date,
            agreement.days_remaining
        );
    }
}

/// Walk a tenant through create, move and removal against in-memory stores.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let catalog = catalog_from(args.seed.as_deref())?;
    let notifier = Arc::new(InMemoryNotifier::default());
    let service = TenancyService::new(
        Arc::new(InMemoryPropertyStore::seeded(catalog)),
        Arc::new(InMemoryTenantStore::default()),
        notifier.clone(),
    );

    println!("Family estate tenancy demo");

    let apartment = service.create_tenant(&demo_form(
        "Asha Verma",
        "AGR-2025-01",
        PropertyChoice::apartment("B1", "A12"),
    ))?;
    println!(
        "\n- Added {} with rent {} (deposit {})",
        apartment.tenant.personal_info.full_name,
        apartment.tenant.rental_agreement.rent_amount,
        apartment.tenant.rental_agreement.security_deposit
    );
    print_sync(&apartment.occupancy);

    let flat = service.create_tenant(&demo_form(
        "Imran Shaikh",
        "AGR-2025-02",
        PropertyChoice::flat("F1"),
    ))?;
    println!("- Added {}", flat.tenant.personal_info.full_name);
    print_sync(&flat.occupancy);

    let moved = service.update_tenant(
        &apartment.tenant.id,
        &demo_form(
            "Asha Verma",
            "AGR-2025-01",
            PropertyChoice::apartment("B1", "A11"),
        ),
    )?;
    println!(
        "- Moved {} to a new apartment (rent now {})",
        moved.tenant.personal_info.full_name, moved.tenant.rental_agreement.rent_amount
    );
    print_sync(&moved.occupancy);

    println!("\nDashboard as of {}", today);
    print_dashboard(&service.dashboard(today)?);

    let removal = service.remove_tenant_from_property(&PropertyRef::flat("F1"))?;
    println!("\n- Vacated flat F1, removed {} tenant(s)", removal.removed.len());
    print_sync(&removal.occupancy);

    let drifts = service.audit()?;
    if drifts.is_empty() {
        println!("\nOccupancy audit: consistent");
    } else {
        println!("\nOccupancy audit: {} issue(s)", drifts.len());
        for drift in &drifts {
            println!("  - {:?}", drift);
        }
    }

    println!("\nNotifications");
    for event in notifier.events() {
        println!("  [{:?}] {}", event.level, event.message);
    }

    println!("\nOccupancy roster");
    print!("{}", service.roster()?);

    Ok(())
}
