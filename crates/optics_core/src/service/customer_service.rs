//! Customer and exam use-case service.
//!
//! # Responsibility
//! - Provide the entry points UI and CLI callers use for customers and the
//!   three exam types.
//! - Validate input before anything reaches a repository.
//!
//! # Invariants
//! - Service APIs never bypass validation or repository contracts.
//! - Service layer remains storage-agnostic; `SqliteCustomerService` only
//!   wires the SQLite repositories in.

use crate::model::contact_lenses::ContactLensesMeasurements;
use crate::model::customer::{Customer, CustomerId};
use crate::model::exam::{ExamId, ExamInput, ExamMeasurements, ExamRecord};
use crate::model::glasses::GlassesMeasurements;
use crate::model::refraction::RefractionMeasurements;
use crate::repo::contact_lenses_repo::SqliteContactLensesRepository;
use crate::repo::customer_repo::{CustomerRepository, SqliteCustomerRepository};
use crate::repo::exam_repo::ExamRepository;
use crate::repo::glasses_repo::SqliteGlassesRepository;
use crate::repo::refraction_repo::SqliteRefractionRepository;
use crate::repo::RepoResult;
use crate::service::validation::{
    ensure_customer_exists, is_valid_ssn, rejected, validate_customer, validate_exam,
    ValidationError,
};
use crate::service::{ServiceError, ServiceResult};
use chrono::NaiveDateTime;
use log::info;
use rusqlite::Connection;

/// Use-case service over one customer store and three exam stores.
pub struct CustomerService<C, R, G, L> {
    customers: C,
    refraction: R,
    glasses: G,
    contact_lenses: L,
}

/// Service wired to SQLite repositories sharing one connection.
pub type SqliteCustomerService<'conn> = CustomerService<
    SqliteCustomerRepository<'conn>,
    SqliteRefractionRepository<'conn>,
    SqliteGlassesRepository<'conn>,
    SqliteContactLensesRepository<'conn>,
>;

impl<'conn> SqliteCustomerService<'conn> {
    /// Builds every SQLite repository over `conn`.
    ///
    /// Fails when the connection was not opened through `open_db` or its
    /// schema lacks a required table or column.
    pub fn try_from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteCustomerRepository::try_new(conn)?,
            SqliteRefractionRepository::try_new(conn)?,
            SqliteGlassesRepository::try_new(conn)?,
            SqliteContactLensesRepository::try_new(conn)?,
        ))
    }
}

impl<C, R, G, L> CustomerService<C, R, G, L>
where
    C: CustomerRepository,
    R: ExamRepository<RefractionMeasurements>,
    G: ExamRepository<GlassesMeasurements>,
    L: ExamRepository<ContactLensesMeasurements>,
{
    pub fn new(customers: C, refraction: R, glasses: G, contact_lenses: L) -> Self {
        Self {
            customers,
            refraction,
            glasses,
            contact_lenses,
        }
    }

    /// Validates and inserts a customer card.
    ///
    /// # Contract
    /// - Rejects a card whose ssn is already registered.
    /// - Returns the card with its assigned id.
    pub fn add_customer(&self, customer: Customer) -> ServiceResult<Customer> {
        self.check_customer(&customer)?;
        let created = self.customers.add_customer(&customer)?;
        info!(
            "event=customer_add module=service status=ok customer_id={}",
            created.id.unwrap_or_default()
        );
        Ok(created)
    }

    /// Gets one customer by id; non-positive ids are invalid arguments.
    pub fn get_customer(&self, id: CustomerId) -> ServiceResult<Option<Customer>> {
        if id <= 0 {
            return Err(ServiceError::InvalidArgument(format!(
                "customer_id must be a positive integer, got {id}"
            )));
        }
        Ok(self.customers.get_customer(id)?)
    }

    /// Gets one customer by ssn; the ssn must be exactly 9 digits.
    pub fn get_customer_by_ssn(&self, ssn: &str) -> ServiceResult<Option<Customer>> {
        let ssn = ssn.trim();
        if !is_valid_ssn(ssn) {
            return Err(ServiceError::InvalidArgument(format!(
                "ssn must be exactly 9 digits, got `{ssn}`"
            )));
        }
        Ok(self.customers.get_customer_by_ssn(ssn)?)
    }

    pub fn list_customers(&self) -> ServiceResult<Vec<Customer>> {
        Ok(self.customers.list_customers()?)
    }

    /// Searches first name, last name and ssn.
    pub fn search_customers(&self, query: &str) -> ServiceResult<Vec<Customer>> {
        Ok(self.customers.search_by_name_or_ssn(query)?)
    }

    pub fn search_customers_by_name(&self, query: &str) -> ServiceResult<Vec<Customer>> {
        Ok(self.customers.search_by_name(query)?)
    }

    /// Validates and overwrites a stored card; returns whether a row changed.
    pub fn update_customer(&self, customer: &Customer) -> ServiceResult<bool> {
        if customer.id.is_none() {
            return Err(ServiceError::InvalidArgument(
                "cannot update a customer without an id".to_string(),
            ));
        }
        self.check_customer(customer)?;
        Ok(self.customers.update_customer(customer)?)
    }

    /// Deletes a customer and, through the store, all of its exams.
    pub fn delete_customer(&self, id: CustomerId) -> ServiceResult<bool> {
        let deleted = self.customers.delete_customer(id)?;
        info!("event=customer_delete module=service status=ok customer_id={id} deleted={deleted}");
        Ok(deleted)
    }

    pub fn add_refraction_test(
        &self,
        customer_id: CustomerId,
        input: ExamInput<RefractionMeasurements>,
    ) -> ServiceResult<ExamRecord<RefractionMeasurements>> {
        self.add_exam(&self.refraction, customer_id, input)
    }

    pub fn get_refraction_test(
        &self,
        id: ExamId,
    ) -> ServiceResult<Option<ExamRecord<RefractionMeasurements>>> {
        Ok(self.refraction.get_test(id)?)
    }

    pub fn get_refraction_history(
        &self,
        customer_id: CustomerId,
    ) -> ServiceResult<Vec<ExamRecord<RefractionMeasurements>>> {
        self.history(&self.refraction, customer_id)
    }

    pub fn get_latest_refraction(
        &self,
        customer_id: CustomerId,
    ) -> ServiceResult<Option<ExamRecord<RefractionMeasurements>>> {
        self.latest(&self.refraction, customer_id)
    }

    pub fn update_refraction_test(
        &self,
        customer_id: CustomerId,
        exam_id: ExamId,
        input: ExamInput<RefractionMeasurements>,
    ) -> ServiceResult<bool> {
        self.update_exam(&self.refraction, customer_id, exam_id, input)
    }

    pub fn delete_refraction_test(&self, id: ExamId) -> ServiceResult<bool> {
        Ok(self.refraction.delete_test(id)?)
    }

    pub fn add_glasses_test(
        &self,
        customer_id: CustomerId,
        input: ExamInput<GlassesMeasurements>,
    ) -> ServiceResult<ExamRecord<GlassesMeasurements>> {
        self.add_exam(&self.glasses, customer_id, input)
    }

    pub fn get_glasses_test(
        &self,
        id: ExamId,
    ) -> ServiceResult<Option<ExamRecord<GlassesMeasurements>>> {
        Ok(self.glasses.get_test(id)?)
    }

    pub fn get_glasses_history(
        &self,
        customer_id: CustomerId,
    ) -> ServiceResult<Vec<ExamRecord<GlassesMeasurements>>> {
        self.history(&self.glasses, customer_id)
    }

    pub fn get_latest_glasses(
        &self,
        customer_id: CustomerId,
    ) -> ServiceResult<Option<ExamRecord<GlassesMeasurements>>> {
        self.latest(&self.glasses, customer_id)
    }

    pub fn update_glasses_test(
        &self,
        customer_id: CustomerId,
        exam_id: ExamId,
        input: ExamInput<GlassesMeasurements>,
    ) -> ServiceResult<bool> {
        self.update_exam(&self.glasses, customer_id, exam_id, input)
    }

    pub fn delete_glasses_test(&self, id: ExamId) -> ServiceResult<bool> {
        Ok(self.glasses.delete_test(id)?)
    }

    pub fn add_contact_lenses_test(
        &self,
        customer_id: CustomerId,
        input: ExamInput<ContactLensesMeasurements>,
    ) -> ServiceResult<ExamRecord<ContactLensesMeasurements>> {
        self.add_exam(&self.contact_lenses, customer_id, input)
    }

    pub fn get_contact_lenses_test(
        &self,
        id: ExamId,
    ) -> ServiceResult<Option<ExamRecord<ContactLensesMeasurements>>> {
        Ok(self.contact_lenses.get_test(id)?)
    }

    pub fn get_contact_lenses_history(
        &self,
        customer_id: CustomerId,
    ) -> ServiceResult<Vec<ExamRecord<ContactLensesMeasurements>>> {
        self.history(&self.contact_lenses, customer_id)
    }

    pub fn get_latest_contact_lenses(
        &self,
        customer_id: CustomerId,
    ) -> ServiceResult<Option<ExamRecord<ContactLensesMeasurements>>> {
        self.latest(&self.contact_lenses, customer_id)
    }

    pub fn update_contact_lenses_test(
        &self,
        customer_id: CustomerId,
        exam_id: ExamId,
        input: ExamInput<ContactLensesMeasurements>,
    ) -> ServiceResult<bool> {
        self.update_exam(&self.contact_lenses, customer_id, exam_id, input)
    }

    pub fn delete_contact_lenses_test(&self, id: ExamId) -> ServiceResult<bool> {
        Ok(self.contact_lenses.delete_test(id)?)
    }

    /// Shape rules plus ssn uniqueness against every other stored card.
    fn check_customer(&self, customer: &Customer) -> ServiceResult<()> {
        validate_customer(customer).map_err(|err| rejected(err, "customer"))?;
        if let Some(existing) = self.customers.get_customer_by_ssn(&customer.ssn)? {
            if existing.id != customer.id {
                return Err(rejected(
                    ValidationError::DuplicateSsn(customer.ssn.clone()),
                    "customer",
                )
                .into());
            }
        }
        Ok(())
    }

    fn add_exam<M, E>(
        &self,
        repo: &E,
        customer_id: CustomerId,
        input: ExamInput<M>,
    ) -> ServiceResult<ExamRecord<M>>
    where
        M: ExamMeasurements,
        E: ExamRepository<M>,
    {
        let exam_date = validate_exam(&self.customers, customer_id, &input)?;
        let mut record = into_record(customer_id, exam_date, input);
        let id = repo.add_test(&record)?;
        record.id = Some(id);
        info!(
            "event=exam_add module=service status=ok kind={} exam_id={id} customer_id={customer_id}",
            M::KIND.as_str()
        );
        Ok(record)
    }

    fn history<M, E>(&self, repo: &E, customer_id: CustomerId) -> ServiceResult<Vec<ExamRecord<M>>>
    where
        M: ExamMeasurements,
        E: ExamRepository<M>,
    {
        ensure_customer_exists(&self.customers, customer_id)?;
        Ok(repo.list_tests_for_customer(customer_id)?)
    }

    fn latest<M, E>(&self, repo: &E, customer_id: CustomerId) -> ServiceResult<Option<ExamRecord<M>>>
    where
        M: ExamMeasurements,
        E: ExamRepository<M>,
    {
        Ok(self.history(repo, customer_id)?.into_iter().next())
    }

    /// Overwrites exam `exam_id`; it must belong to `customer_id`.
    fn update_exam<M, E>(
        &self,
        repo: &E,
        customer_id: CustomerId,
        exam_id: ExamId,
        input: ExamInput<M>,
    ) -> ServiceResult<bool>
    where
        M: ExamMeasurements,
        E: ExamRepository<M>,
    {
        let exam_date = validate_exam(&self.customers, customer_id, &input)?;
        let Some(existing) = repo.get_test(exam_id)? else {
            return Ok(false);
        };
        if existing.customer_id != customer_id {
            return Err(ServiceError::InvalidArgument(format!(
                "{} exam {exam_id} belongs to customer {}, not {customer_id}",
                M::KIND.as_str(),
                existing.customer_id
            )));
        }

        let mut record = into_record(customer_id, exam_date, input);
        record.id = Some(exam_id);
        let updated = repo.update_test(&record)?;
        info!(
            "event=exam_update module=service status=ok kind={} exam_id={exam_id} updated={updated}",
            M::KIND.as_str()
        );
        Ok(updated)
    }
}

fn into_record<M: ExamMeasurements>(
    customer_id: CustomerId,
    exam_date: NaiveDateTime,
    input: ExamInput<M>,
) -> ExamRecord<M> {
    ExamRecord {
        id: None,
        customer_id,
        exam_date: exam_date.into(),
        examiner: input.examiner,
        measurements: input.measurements,
        notes: input.notes,
    }
}
