//! Built-in healthcare role catalog loaded at startup.

use rolegate_application::CatalogService;
use rolegate_core::AppError;
use rolegate_domain::{PermissionSet, RoleName};
use tracing::info;

const HEALTHCARE_CATALOG: &[(&str, &[&str])] = &[
    (
        "Doctor",
        &[
            "view_profile_information",
            "update_profile_information",
            "view_patient_information",
            "view_ehr_of_patient",
        ],
    ),
    (
        "Doctor (Patient Profile Management)",
        &[
            "view_consultations",
            "view_surgeries",
            "view_patient_evaluations",
            "manage_patient_evaluations",
            "view_prescribe_medications",
            "view_disease_related_warnings",
        ],
    ),
    (
        "Doctor (Appointment Scheduling)",
        &[
            "view_appointment",
            "cancel_appointment",
            "change_appointment_status",
            "update_availability_timing",
            "view_appointment_history",
        ],
    ),
    (
        "Doctor (AI Diagnostic)",
        &[
            "search_for_models",
            "use_models",
            "view_diagnostic_results",
            "interpret_results",
            "request_model_training",
        ],
    ),
    (
        "Doctor (Lab Diagnostic)",
        &[
            "view_lab_test_results",
            "request_lab_tests",
            "communicate_results",
            "view_lab_test_catalog",
        ],
    ),
    (
        "Doctor (Pharmacy)",
        &[
            "view_prescriptions",
            "prescribe_medications",
            "request_prescription_updates",
        ],
    ),
    (
        "Doctor (Patient Monitoring)",
        &[
            "view_patient_data",
            "update_patient_thresholds",
            "acknowledge_alerts",
            "add_patient_notes",
        ],
    ),
    (
        "Doctor (Health Analytics)",
        &[
            "view_patient_reports",
            "generate_patient_reports",
            "request_readmission_risk",
        ],
    ),
    (
        "Patient",
        &[
            "view_profile_information",
            "update_profile_information",
            "view_medical_history",
            "view_appointments",
            "view_own_ehr",
            "view_prescriptions",
            "request_prescription_updates",
        ],
    ),
    (
        "Patient (Profile Management)",
        &[
            "view_diagnoses",
            "discuss_diagnoses",
            "view_evaluations",
            "view_medications",
        ],
    ),
    (
        "Patient (Appointment Scheduling)",
        &[
            "reschedule_appointment",
            "view_available_slots",
            "book_appointment",
            "view_appointment_history",
        ],
    ),
    (
        "Patient (AI Diagnostic)",
        &[
            "search_for_models",
            "use_models",
            "view_diagnostic_results",
            "interpret_results",
            "request_model_training",
        ],
    ),
    (
        "Patient (Billing Insurance)",
        &[
            "view_own_bills",
            "make_payments",
            "view_claim_status",
            "update_information",
            "submit_inquiries",
        ],
    ),
    (
        "Patient (Lab Diagnostic)",
        &[
            "view_lab_results",
            "book_lab_test",
            "communicate_with_doctor",
            "view_lab_test_catalog",
        ],
    ),
    (
        "Patient (Monitoring Health)",
        &[
            "view_health_data",
            "receive_notifications",
            "download_own_reports",
        ],
    ),
    (
        "Nurse 2",
        &[
            "view_lab_test_results",
            "add_lab_test_notes",
            "view_lab_test_catalog",
            "acknowledge_alerts",
            "add_patient_care_notes",
            "view_patient_medications",
        ],
    ),
    (
        "Receptionist",
        &[
            "view_profile",
            "update_profile",
            "view_appointments",
            "view_patient_bills",
            "update_contact_info",
        ],
    ),
    (
        "Receptionist (Appointment Scheduling)",
        &[
            "cancel_appointment",
            "change_appointment_status",
            "reschedule_appointment",
            "view_appointment_history",
        ],
    ),
    (
        "Receptionist (Medical Billing)",
        &[
            "process_payments",
            "check_basic_eligibility",
            "update_contact_info",
            "log_interactions",
            "escalate_issues",
        ],
    ),
    (
        "AI Specialist",
        &[
            "view_profile",
            "update_profile",
            "upload_dataset",
            "delete_dataset",
            "train_model",
        ],
    ),
    (
        "AI Specialist 2",
        &[
            "upload_model",
            "delete_model",
            "view_uploaded_models",
            "train_custom_model",
        ],
    ),
    (
        "Manager",
        &[
            "view_profile",
            "update_profile",
            "manage_bills",
            "process_payments",
        ],
    ),
    (
        "Manager 2",
        &[
            "generate_reports",
            "view_hospital_reports",
            "generate_hospital_reports",
            "configure_system",
            "manage_claims",
            "view_logs",
            "check_eligibility_for_claim",
        ],
    ),
    (
        "Insurance Coordinator",
        &[
            "view_bills",
            "view_profile",
            "update_profile",
            "track_claims",
            "check_eligibility",
        ],
    ),
    (
        "Insurance Coordinator 2",
        &[
            "manage_claims",
            "update_insurance_info",
            "generate_insurance_reports",
            "communicate_insurance",
        ],
    ),
    (
        "Lab Technician",
        &[
            "view_profile",
            "update_profile",
            "view_lab_test_bookings",
            "update_lab_test_results",
            "view_lab_test_catalog",
        ],
    ),
    (
        "Lab Technician 2",
        &[
            "schedule_lab_appointments",
            "manage_lab_equipment",
            "view_patient_history",
            "generate_test_reports",
            "access_test_samples",
            "manage_lab_staff",
            "view_lab_quality_control",
        ],
    ),
    (
        "Pharmacist",
        &[
            "view_profile",
            "update_profile",
            "view_inventory",
            "update_inventory",
            "process_prescriptions",
            "update_prescription_status",
        ],
    ),
    (
        "Pharmacist 2",
        &[
            "view_patient_prescriptions",
            "manage_drug_interactions",
            "process_refills",
            "monitor_drug_stock_levels",
            "generate_inventory_reports",
            "approve_medication_orders",
            "manage_billing",
            "generate_reports",
        ],
    ),
    (
        "Admin",
        &[
            "grant_permissions",
            "grant_role",
            "reduce_permissions",
            "remove_role",
        ],
    ),
];

/// Parses the built-in catalog into role names and permission sets.
pub fn healthcare_catalog() -> Result<Vec<(RoleName, PermissionSet)>, AppError> {
    HEALTHCARE_CATALOG
        .iter()
        .map(|(name, permissions)| {
            Ok((
                RoleName::new(*name)?,
                PermissionSet::parse(permissions.iter().copied())?,
            ))
        })
        .collect()
}

/// Creates the catalog roles that do not exist yet.
pub async fn seed_healthcare_catalog(catalog_service: &CatalogService) -> Result<(), AppError> {
    let created = catalog_service.seed_catalog(healthcare_catalog()?).await?;
    info!(created, total = HEALTHCARE_CATALOG.len(), "healthcare catalog seeded");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::healthcare_catalog;

    #[test]
    fn sub_roles_follow_their_primary() {
        let catalog = healthcare_catalog().unwrap_or_default();
        let names: Vec<&str> = catalog.iter().map(|(name, _)| name.as_str()).collect();

        assert!(!catalog.is_empty());
        for (name, permissions) in &catalog {
            assert!(!permissions.is_empty());
            if name.is_sub_role() {
                assert!(names.contains(&name.primary_name()));
            }
        }
    }

    #[test]
    fn names_are_unique() {
        let catalog = healthcare_catalog().unwrap_or_default();
        let mut names: Vec<&str> = catalog.iter().map(|(name, _)| name.as_str()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), total);
    }
}
