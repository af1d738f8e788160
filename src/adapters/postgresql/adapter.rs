//! PostgreSQL adapter implementing the storage trait
//!
//! Every operation runs in its own transaction on a pooled connection. The
//! prescription mutators lock the prescription row with `FOR UPDATE` before
//! re-checking its status, and fulfillment additionally locks the medication
//! rows in name order so concurrent fulfillments cannot deadlock or lose a
//! stock decrement.

use crate::adapters::database::traits::PharmacyStore;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    doctor_from_row, line_from_row, map_db_error, medication_from_row, patient_from_row,
    pharmacist_from_row, prescription_from_row, DOCTOR_COLUMNS, LINE_COLUMNS,
    MEDICATION_COLUMNS, PATIENT_COLUMNS, PHARMACIST_COLUMNS, PRESCRIPTION_COLUMNS,
};
use crate::core::prescription::lifecycle::{lock_order, plan_fulfillment, StockPlan};
use crate::domain::{
    Doctor, DoctorUpdate, LicenseNumber, Medication, MedicationName, MedicationUpdate, NewDoctor,
    NewMedication, NewPatient, NewPharmacist, NewPrescriptionLine, Pagination, Patient,
    PatientUpdate, Pharmacist, PharmacistUpdate, PharmacyError, Prescription, PrescriptionDraft,
    PrescriptionFilter, PrescriptionLine, PrescriptionPage, PrescriptionPatch, PrescriptionStatus,
    PrescriptionSummary, Result, Ssn,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_postgres::Transaction;

/// PostgreSQL implementation of [`PharmacyStore`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

/// Loads the lines of every listed prescription, keyed by prescription id
async fn load_lines(
    tx: &Transaction<'_>,
    ids: &[i64],
) -> Result<HashMap<i64, Vec<PrescriptionLine>>> {
    let mut lines: HashMap<i64, Vec<PrescriptionLine>> = HashMap::new();
    if ids.is_empty() {
        return Ok(lines);
    }

    let query = format!(
        "SELECT {LINE_COLUMNS} FROM prescription_medications \
         WHERE prescription_id = ANY($1) ORDER BY id"
    );
    for row in tx.query(&query, &[&ids]).await? {
        let prescription_id: i64 = row.try_get("prescription_id")?;
        lines
            .entry(prescription_id)
            .or_default()
            .push(line_from_row(&row)?);
    }
    Ok(lines)
}

/// Maps header rows and attaches their lines, preserving row order
async fn with_lines(
    tx: &Transaction<'_>,
    rows: &[tokio_postgres::Row],
) -> Result<Vec<Prescription>> {
    let mut prescriptions = rows
        .iter()
        .map(prescription_from_row)
        .collect::<Result<Vec<_>>>()?;
    let ids: Vec<i64> = prescriptions.iter().map(|rx| rx.id).collect();
    let mut lines = load_lines(tx, &ids).await?;
    for prescription in &mut prescriptions {
        prescription.medications = lines.remove(&prescription.id).unwrap_or_default();
    }
    Ok(prescriptions)
}

/// Loads one prescription, optionally taking a row lock on it
async fn fetch_prescription(
    tx: &Transaction<'_>,
    id: i64,
    for_update: bool,
) -> Result<Option<Prescription>> {
    let query = format!(
        "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions p WHERE p.id = $1{}",
        if for_update { " FOR UPDATE" } else { "" }
    );
    let rows = tx.query(&query, &[&id]).await?;
    Ok(with_lines(tx, &rows).await?.into_iter().next())
}

async fn require_patient(tx: &Transaction<'_>, ssn: &Ssn) -> Result<()> {
    let rows = tx
        .query("SELECT 1 FROM patients WHERE ssn = $1", &[&ssn.as_str()])
        .await?;
    if rows.is_empty() {
        return Err(PharmacyError::not_found("Patient"));
    }
    Ok(())
}

async fn require_doctor(tx: &Transaction<'_>, license: &LicenseNumber) -> Result<()> {
    let rows = tx
        .query(
            "SELECT 1 FROM doctors WHERE license_number = $1",
            &[&license.as_str()],
        )
        .await?;
    if rows.is_empty() {
        return Err(PharmacyError::not_found("Doctor"));
    }
    Ok(())
}

/// Checks every line's medication in line order, then inserts the lines
async fn insert_lines(
    tx: &Transaction<'_>,
    prescription_id: i64,
    lines: &[NewPrescriptionLine],
) -> Result<()> {
    for line in lines {
        let rows = tx
            .query(
                "SELECT 1 FROM medications WHERE name = $1 FOR KEY SHARE",
                &[&line.medication_name.as_str()],
            )
            .await?;
        if rows.is_empty() {
            return Err(PharmacyError::not_found(format!(
                "Medication {}",
                line.medication_name
            )));
        }
    }

    for line in lines {
        tx.execute(
            "INSERT INTO prescription_medications \
             (prescription_id, medication_name, dosage, frequency, duration) \
             VALUES ($1, $2, $3, $4, $5)",
            &[
                &prescription_id,
                &line.medication_name.as_str(),
                &line.dosage,
                &line.frequency,
                &line.duration,
            ],
        )
        .await
        .map_err(map_db_error)?;
    }
    Ok(())
}

/// Deletes one natural-key row unless a prescription still references it
async fn restrict_delete(
    tx: &Transaction<'_>,
    entity: &str,
    lock_query: &str,
    reference_query: &str,
    delete_query: &str,
    key: &str,
) -> Result<()> {
    if tx.query(lock_query, &[&key]).await?.is_empty() {
        return Err(PharmacyError::not_found(entity));
    }
    if !tx.query(reference_query, &[&key]).await?.is_empty() {
        return Err(PharmacyError::Conflict(format!(
            "{entity} {key} is referenced by existing prescriptions"
        )));
    }
    tx.execute(delete_query, &[&key])
        .await
        .map_err(map_db_error)?;
    Ok(())
}

#[async_trait]
impl PharmacyStore for PostgreSQLAdapter {
    fn backend_name(&self) -> &str {
        "postgresql"
    }

    async fn ping(&self) -> Result<()> {
        self.client.ping().await
    }

    async fn insert_patient(
        &self,
        patient: &NewPatient,
        hashed_password: &str,
    ) -> Result<Patient> {
        let client = self.client.connection().await?;
        let query = format!(
            "INSERT INTO patients \
             (ssn, name, date_of_birth, contact_info, allergies, email, hashed_password) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {PATIENT_COLUMNS}"
        );
        let row = client
            .query_one(
                &query,
                &[
                    &patient.ssn.as_str(),
                    &patient.name,
                    &patient.date_of_birth,
                    &patient.contact_info,
                    &patient.allergies,
                    &patient.email,
                    &hashed_password,
                ],
            )
            .await
            .map_err(map_db_error)?;
        patient_from_row(&row)
    }

    async fn find_patient_by_ssn(&self, ssn: &Ssn) -> Result<Option<Patient>> {
        let client = self.client.connection().await?;
        let query = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE ssn = $1");
        client
            .query_opt(&query, &[&ssn.as_str()])
            .await?
            .as_ref()
            .map(patient_from_row)
            .transpose()
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>> {
        let client = self.client.connection().await?;
        let query = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE email = $1");
        client
            .query_opt(&query, &[&email])
            .await?
            .as_ref()
            .map(patient_from_row)
            .transpose()
    }

    async fn list_patients(&self) -> Result<Vec<Patient>> {
        let client = self.client.connection().await?;
        let query = format!("SELECT {PATIENT_COLUMNS} FROM patients ORDER BY id");
        client
            .query(&query, &[])
            .await?
            .iter()
            .map(patient_from_row)
            .collect()
    }

    async fn update_patient(&self, ssn: &Ssn, update: &PatientUpdate) -> Result<Patient> {
        let client = self.client.connection().await?;
        let query = format!(
            "UPDATE patients SET \
             name = COALESCE($2, name), \
             date_of_birth = COALESCE($3, date_of_birth), \
             contact_info = COALESCE($4, contact_info), \
             allergies = COALESCE($5, allergies), \
             updated_at = NOW() \
             WHERE ssn = $1 RETURNING {PATIENT_COLUMNS}"
        );
        client
            .query_opt(
                &query,
                &[
                    &ssn.as_str(),
                    &update.name,
                    &update.date_of_birth,
                    &update.contact_info,
                    &update.allergies,
                ],
            )
            .await
            .map_err(map_db_error)?
            .as_ref()
            .map(patient_from_row)
            .transpose()?
            .ok_or_else(|| PharmacyError::not_found("Patient"))
    }

    async fn delete_patient(&self, ssn: &Ssn) -> Result<()> {
        let mut client = self.client.connection().await?;
        let tx = client.transaction().await?;
        restrict_delete(
            &tx,
            "Patient",
            "SELECT 1 FROM patients WHERE ssn = $1 FOR UPDATE",
            "SELECT 1 FROM prescriptions WHERE patient_ssn = $1 LIMIT 1",
            "DELETE FROM patients WHERE ssn = $1",
            ssn.as_str(),
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn insert_doctor(&self, doctor: &NewDoctor, hashed_password: &str) -> Result<Doctor> {
        let client = self.client.connection().await?;
        let query = format!(
            "INSERT INTO doctors \
             (license_number, name, specialization, contact_info, email, hashed_password) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {DOCTOR_COLUMNS}"
        );
        let row = client
            .query_one(
                &query,
                &[
                    &doctor.license_number.as_str(),
                    &doctor.name,
                    &doctor.specialization,
                    &doctor.contact_info,
                    &doctor.email,
                    &hashed_password,
                ],
            )
            .await
            .map_err(map_db_error)?;
        doctor_from_row(&row)
    }

    async fn find_doctor_by_license(&self, license: &LicenseNumber) -> Result<Option<Doctor>> {
        let client = self.client.connection().await?;
        let query = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE license_number = $1");
        client
            .query_opt(&query, &[&license.as_str()])
            .await?
            .as_ref()
            .map(doctor_from_row)
            .transpose()
    }

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>> {
        let client = self.client.connection().await?;
        let query = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE email = $1");
        client
            .query_opt(&query, &[&email])
            .await?
            .as_ref()
            .map(doctor_from_row)
            .transpose()
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        let client = self.client.connection().await?;
        let query = format!("SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY id");
        client
            .query(&query, &[])
            .await?
            .iter()
            .map(doctor_from_row)
            .collect()
    }

    async fn update_doctor(
        &self,
        license: &LicenseNumber,
        update: &DoctorUpdate,
    ) -> Result<Doctor> {
        let client = self.client.connection().await?;
        let query = format!(
            "UPDATE doctors SET \
             name = COALESCE($2, name), \
             specialization = COALESCE($3, specialization), \
             contact_info = COALESCE($4, contact_info), \
             updated_at = NOW() \
             WHERE license_number = $1 RETURNING {DOCTOR_COLUMNS}"
        );
        client
            .query_opt(
                &query,
                &[
                    &license.as_str(),
                    &update.name,
                    &update.specialization,
                    &update.contact_info,
                ],
            )
            .await
            .map_err(map_db_error)?
            .as_ref()
            .map(doctor_from_row)
            .transpose()?
            .ok_or_else(|| PharmacyError::not_found("Doctor"))
    }

    async fn delete_doctor(&self, license: &LicenseNumber) -> Result<()> {
        let mut client = self.client.connection().await?;
        let tx = client.transaction().await?;
        restrict_delete(
            &tx,
            "Doctor",
            "SELECT 1 FROM doctors WHERE license_number = $1 FOR UPDATE",
            "SELECT 1 FROM prescriptions WHERE doctor_license = $1 LIMIT 1",
            "DELETE FROM doctors WHERE license_number = $1",
            license.as_str(),
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn insert_pharmacist(
        &self,
        pharmacist: &NewPharmacist,
        hashed_password: &str,
    ) -> Result<Pharmacist> {
        let client = self.client.connection().await?;
        let query = format!(
            "INSERT INTO pharmacists (license_number, name, email, hashed_password) \
             VALUES ($1, $2, $3, $4) RETURNING {PHARMACIST_COLUMNS}"
        );
        let row = client
            .query_one(
                &query,
                &[
                    &pharmacist.license_number.as_str(),
                    &pharmacist.name,
                    &pharmacist.email,
                    &hashed_password,
                ],
            )
            .await
            .map_err(map_db_error)?;
        pharmacist_from_row(&row)
    }

    async fn find_pharmacist_by_license(
        &self,
        license: &LicenseNumber,
    ) -> Result<Option<Pharmacist>> {
        let client = self.client.connection().await?;
        let query =
            format!("SELECT {PHARMACIST_COLUMNS} FROM pharmacists WHERE license_number = $1");
        client
            .query_opt(&query, &[&license.as_str()])
            .await?
            .as_ref()
            .map(pharmacist_from_row)
            .transpose()
    }

    async fn find_pharmacist_by_email(&self, email: &str) -> Result<Option<Pharmacist>> {
        let client = self.client.connection().await?;
        let query = format!("SELECT {PHARMACIST_COLUMNS} FROM pharmacists WHERE email = $1");
        client
            .query_opt(&query, &[&email])
            .await?
            .as_ref()
            .map(pharmacist_from_row)
            .transpose()
    }

    async fn list_pharmacists(&self) -> Result<Vec<Pharmacist>> {
        let client = self.client.connection().await?;
        let query = format!("SELECT {PHARMACIST_COLUMNS} FROM pharmacists ORDER BY id");
        client
            .query(&query, &[])
            .await?
            .iter()
            .map(pharmacist_from_row)
            .collect()
    }

    async fn update_pharmacist(
        &self,
        license: &LicenseNumber,
        update: &PharmacistUpdate,
    ) -> Result<Pharmacist> {
        let client = self.client.connection().await?;
        let query = format!(
            "UPDATE pharmacists SET name = COALESCE($2, name), updated_at = NOW() \
             WHERE license_number = $1 RETURNING {PHARMACIST_COLUMNS}"
        );
        client
            .query_opt(&query, &[&license.as_str(), &update.name])
            .await
            .map_err(map_db_error)?
            .as_ref()
            .map(pharmacist_from_row)
            .transpose()?
            .ok_or_else(|| PharmacyError::not_found("Pharmacist"))
    }

    async fn delete_pharmacist(&self, license: &LicenseNumber) -> Result<()> {
        let client = self.client.connection().await?;
        let deleted = client
            .execute(
                "DELETE FROM pharmacists WHERE license_number = $1",
                &[&license.as_str()],
            )
            .await
            .map_err(map_db_error)?;
        if deleted == 0 {
            return Err(PharmacyError::not_found("Pharmacist"));
        }
        Ok(())
    }

    async fn insert_medication(&self, medication: &NewMedication) -> Result<Medication> {
        let client = self.client.connection().await?;
        let query = format!(
            "INSERT INTO medications \
             (name, description, dosage_form, strength, stock_quantity, price) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {MEDICATION_COLUMNS}"
        );
        let row = client
            .query_one(
                &query,
                &[
                    &medication.name.as_str(),
                    &medication.description,
                    &medication.dosage_form,
                    &medication.strength,
                    &medication.stock_quantity,
                    &medication.price,
                ],
            )
            .await
            .map_err(map_db_error)?;
        medication_from_row(&row)
    }

    async fn find_medication_by_name(&self, name: &MedicationName) -> Result<Option<Medication>> {
        let client = self.client.connection().await?;
        let query = format!("SELECT {MEDICATION_COLUMNS} FROM medications WHERE name = $1");
        client
            .query_opt(&query, &[&name.as_str()])
            .await?
            .as_ref()
            .map(medication_from_row)
            .transpose()
    }

    async fn list_medications(&self) -> Result<Vec<Medication>> {
        let client = self.client.connection().await?;
        let query = format!("SELECT {MEDICATION_COLUMNS} FROM medications ORDER BY name");
        client
            .query(&query, &[])
            .await?
            .iter()
            .map(medication_from_row)
            .collect()
    }

    async fn update_medication(
        &self,
        name: &MedicationName,
        update: &MedicationUpdate,
    ) -> Result<Medication> {
        let client = self.client.connection().await?;
        let query = format!(
            "UPDATE medications SET description = $2, dosage_form = $3, strength = $4, \
             price = $5 WHERE name = $1 RETURNING {MEDICATION_COLUMNS}"
        );
        client
            .query_opt(
                &query,
                &[
                    &name.as_str(),
                    &update.description,
                    &update.dosage_form,
                    &update.strength,
                    &update.price,
                ],
            )
            .await
            .map_err(map_db_error)?
            .as_ref()
            .map(medication_from_row)
            .transpose()?
            .ok_or_else(|| PharmacyError::not_found("Medication"))
    }

    async fn delete_medication(&self, name: &MedicationName) -> Result<()> {
        let mut client = self.client.connection().await?;
        let tx = client.transaction().await?;
        restrict_delete(
            &tx,
            "Medication",
            "SELECT 1 FROM medications WHERE name = $1 FOR UPDATE",
            "SELECT 1 FROM prescription_medications WHERE medication_name = $1 LIMIT 1",
            "DELETE FROM medications WHERE name = $1",
            name.as_str(),
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn insert_prescription(&self, draft: &PrescriptionDraft) -> Result<Prescription> {
        let mut client = self.client.connection().await?;
        let tx = client.transaction().await?;

        require_patient(&tx, &draft.patient_ssn).await?;
        require_doctor(&tx, &draft.doctor_license).await?;

        let row = tx
            .query_one(
                "INSERT INTO prescriptions (patient_ssn, doctor_license, date_issued, status) \
                 VALUES ($1, $2, $3, $4) RETURNING id",
                &[
                    &draft.patient_ssn.as_str(),
                    &draft.doctor_license.as_str(),
                    &draft.date_issued,
                    &PrescriptionStatus::Pending.as_str(),
                ],
            )
            .await
            .map_err(map_db_error)?;
        let id: i64 = row.try_get("id")?;
        insert_lines(&tx, id, &draft.medications).await?;

        let prescription = fetch_prescription(&tx, id, false)
            .await?
            .ok_or_else(|| PharmacyError::not_found("Prescription"))?;
        tx.commit().await?;
        Ok(prescription)
    }

    async fn find_prescription(&self, id: i64) -> Result<Option<Prescription>> {
        let mut client = self.client.connection().await?;
        let tx = client.transaction().await?;
        let prescription = fetch_prescription(&tx, id, false).await?;
        tx.commit().await?;
        Ok(prescription)
    }

    async fn list_prescriptions_for_doctor(
        &self,
        license: &LicenseNumber,
    ) -> Result<Vec<Prescription>> {
        let mut client = self.client.connection().await?;
        let tx = client.transaction().await?;
        let query = format!(
            "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions p \
             WHERE p.doctor_license = $1 ORDER BY p.date_issued DESC, p.id DESC"
        );
        let rows = tx.query(&query, &[&license.as_str()]).await?;
        let prescriptions = with_lines(&tx, &rows).await?;
        tx.commit().await?;
        Ok(prescriptions)
    }

    async fn list_prescriptions_for_patient(&self, ssn: &Ssn) -> Result<Vec<Prescription>> {
        let mut client = self.client.connection().await?;
        let tx = client.transaction().await?;
        let query = format!(
            "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions p \
             WHERE p.patient_ssn = $1 ORDER BY p.date_issued DESC, p.id DESC"
        );
        let rows = tx.query(&query, &[&ssn.as_str()]).await?;
        let prescriptions = with_lines(&tx, &rows).await?;
        tx.commit().await?;
        Ok(prescriptions)
    }

    async fn search_prescriptions(
        &self,
        filter: &PrescriptionFilter,
        page: Pagination,
    ) -> Result<PrescriptionPage> {
        const FILTER: &str = "($1::TEXT IS NULL OR p.patient_ssn = $1) \
             AND ($2::TEXT IS NULL OR p.doctor_license = $2) \
             AND ($3::TEXT IS NULL OR p.status = $3) \
             AND ($4::DATE IS NULL OR p.date_issued >= $4) \
             AND ($5::DATE IS NULL OR p.date_issued <= $5)";

        let patient_ssn = filter.patient_ssn.as_ref().map(Ssn::as_str);
        let doctor_license = filter.doctor_license.as_ref().map(LicenseNumber::as_str);
        let status = filter.status.map(|s| s.as_str());
        let skip = i64::try_from(page.skip).unwrap_or(i64::MAX);
        let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);

        let mut client = self.client.connection().await?;
        let tx = client.transaction().await?;

        let count_query = format!("SELECT COUNT(*) AS total FROM prescriptions p WHERE {FILTER}");
        let total: i64 = tx
            .query_one(
                &count_query,
                &[
                    &patient_ssn,
                    &doctor_license,
                    &status,
                    &filter.start_date,
                    &filter.end_date,
                ],
            )
            .await?
            .try_get("total")?;

        let page_query = format!(
            "SELECT {PRESCRIPTION_COLUMNS}, pa.name AS patient_name, d.name AS doctor_name \
             FROM prescriptions p \
             LEFT JOIN patients pa ON pa.ssn = p.patient_ssn \
             LEFT JOIN doctors d ON d.license_number = p.doctor_license \
             WHERE {FILTER} \
             ORDER BY p.date_issued DESC, p.id DESC OFFSET $6 LIMIT $7"
        );
        let rows = tx
            .query(
                &page_query,
                &[
                    &patient_ssn,
                    &doctor_license,
                    &status,
                    &filter.start_date,
                    &filter.end_date,
                    &skip,
                    &limit,
                ],
            )
            .await?;

        let prescriptions = with_lines(&tx, &rows).await?;
        tx.commit().await?;

        let items = prescriptions
            .into_iter()
            .zip(rows.iter())
            .map(|(prescription, row)| -> Result<PrescriptionSummary> {
                Ok(PrescriptionSummary {
                    prescription,
                    patient_name: row.try_get("patient_name")?,
                    doctor_name: row.try_get("doctor_name")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PrescriptionPage {
            total: u64::try_from(total).unwrap_or(0),
            skip: page.skip,
            limit: page.limit,
            items,
        })
    }

    async fn update_prescription(
        &self,
        id: i64,
        patch: &PrescriptionPatch,
    ) -> Result<Prescription> {
        let mut client = self.client.connection().await?;
        let tx = client.transaction().await?;

        let current = fetch_prescription(&tx, id, true)
            .await?
            .ok_or_else(|| PharmacyError::not_found("Prescription"))?;
        current.ensure_mutable()?;

        if let Some(ssn) = &patch.patient_ssn {
            require_patient(&tx, ssn).await?;
            tx.execute(
                "UPDATE prescriptions SET patient_ssn = $2 WHERE id = $1",
                &[&id, &ssn.as_str()],
            )
            .await
            .map_err(map_db_error)?;
        }
        if let Some(lines) = &patch.medications {
            tx.execute(
                "DELETE FROM prescription_medications WHERE prescription_id = $1",
                &[&id],
            )
            .await?;
            insert_lines(&tx, id, lines).await?;
        }

        let updated = fetch_prescription(&tx, id, false)
            .await?
            .ok_or_else(|| PharmacyError::not_found("Prescription"))?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn fulfill_prescription(&self, id: i64) -> Result<Prescription> {
        let mut client = self.client.connection().await?;
        let tx = client.transaction().await?;

        let mut prescription = fetch_prescription(&tx, id, true)
            .await?
            .ok_or_else(|| PharmacyError::not_found("Prescription"))?;
        prescription.mark_fulfilled()?;

        let names: Vec<String> = lock_order(&prescription.medications)
            .into_iter()
            .map(String::from)
            .collect();
        let rows = tx
            .query(
                "SELECT name, stock_quantity FROM medications \
                 WHERE name = ANY($1) ORDER BY name FOR UPDATE",
                &[&names],
            )
            .await?;
        let mut stock = StockPlan::new();
        for row in &rows {
            let name: String = row.try_get("name")?;
            let name = MedicationName::new(name).map_err(PharmacyError::Database)?;
            stock.insert(name, row.try_get("stock_quantity")?);
        }

        let plan = plan_fulfillment(&prescription.medications, &stock)?;
        for (name, level) in &plan {
            tx.execute(
                "UPDATE medications SET stock_quantity = $2 WHERE name = $1",
                &[&name.as_str(), level],
            )
            .await
            .map_err(map_db_error)?;
        }
        tx.execute(
            "UPDATE prescriptions SET status = $2 WHERE id = $1",
            &[&id, &prescription.status.as_str()],
        )
        .await?;

        tx.commit().await?;
        Ok(prescription)
    }

    async fn delete_prescription(&self, id: i64) -> Result<()> {
        let mut client = self.client.connection().await?;
        let tx = client.transaction().await?;

        let current = fetch_prescription(&tx, id, true)
            .await?
            .ok_or_else(|| PharmacyError::not_found("Prescription"))?;
        current.ensure_mutable()?;

        tx.execute("DELETE FROM prescriptions WHERE id = $1", &[&id])
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
