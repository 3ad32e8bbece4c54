//! Invoice repository.
//!
//! Creation (manual or derived from a booking), listing with the
//! overdue overlay, and payment application. Payment application is
//! the one hot path: validation happens in `gigbooks_core::billing`,
//! then this layer persists the outcome in a single transaction with a
//! compare-and-set on `paid_amount` so two concurrent payments cannot
//! both apply against the same starting state.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use gigbooks_core::billing::{
    self, apply_payment, derive_from_booking, effective_status, generate_invoice_number,
    BillingError, InvoiceState, PaymentCredit, PaymentInput,
};

use crate::entities::{bank_accounts, bookings, invoice_payments, invoices, sea_orm_active_enums};
use crate::repositories::booking::{self as booking_repo, BookingWithServices};

/// How many times invoice number generation retries on a collision.
const NUMBER_RETRIES: u32 = 5;

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// Booking not found.
    #[error("Booking not found: {0}")]
    BookingNotFound(Uuid),

    /// The booking already has an invoice.
    #[error("Booking {0} already has an invoice")]
    DuplicateForBooking(Uuid),

    /// Could not allocate a free invoice number.
    #[error("Could not generate a unique invoice number")]
    NumberExhausted,

    /// The payment or amount violates a billing rule.
    #[error("Billing rule violation: {0}")]
    Billing(#[from] BillingError),

    /// The receiving bank account does not exist.
    #[error("Bank account not found: {0}")]
    AccountNotFound(Uuid),

    /// The invoice changed between read and write; the caller may retry.
    #[error("Invoice changed concurrently; retry the payment")]
    ConcurrentModification,

    /// The invoice has recorded payments and cannot be deleted.
    #[error("Invoice has {0} recorded payments and cannot be deleted")]
    HasPayments(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an invoice by hand.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// Client billed.
    pub client_name: String,
    /// Amount billed; must be positive.
    pub amount: Decimal,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Payment deadline.
    pub due_date: NaiveDate,
    /// Originating booking, if any.
    pub booking_id: Option<Uuid>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Input for updating an invoice's descriptive fields.
///
/// `amount` can only change while nothing has been paid.
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoiceInput {
    /// Client billed.
    pub client_name: Option<String>,
    /// Amount billed.
    pub amount: Option<Decimal>,
    /// Payment deadline.
    pub due_date: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: Option<Option<String>>,
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Filter by effective status (overdue included).
    pub status: Option<billing::InvoiceStatus>,
    /// Only invoices issued on or after this date.
    pub from: Option<NaiveDate>,
    /// Only invoices issued on or before this date.
    pub to: Option<NaiveDate>,
    /// Filter by client name.
    pub client_name: Option<String>,
}

/// Input for recording a payment against an invoice.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// Payment amount.
    pub amount: Decimal,
    /// Cash or bank.
    pub method: billing::PaymentMethod,
    /// Receiving bank account; required iff `method` is bank.
    pub bank_account_id: Option<Uuid>,
    /// When the payment was received.
    pub paid_on: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// An invoice with its read-time effective status.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InvoiceView {
    /// The stored invoice.
    #[serde(flatten)]
    pub invoice: invoices::Model,
    /// Status with the overdue overlay applied.
    pub effective_status: billing::InvoiceStatus,
}

/// Invoice repository for CRUD and payment application.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an invoice by hand.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the referenced
    /// booking is missing or already invoiced, a free invoice number
    /// cannot be found, or the database operation fails.
    pub async fn create_invoice(
        &self,
        input: CreateInvoiceInput,
    ) -> Result<invoices::Model, InvoiceError> {
        if input.amount <= Decimal::ZERO {
            return Err(BillingError::ZeroAmount.into());
        }

        if let Some(booking_id) = input.booking_id {
            self.check_booking_free(booking_id).await?;
        }

        let invoice_number = self.allocate_number(input.issue_date).await?;

        let now = chrono::Utc::now().into();
        let invoice = invoices::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_number: Set(invoice_number),
            client_name: Set(input.client_name),
            issue_date: Set(input.issue_date),
            due_date: Set(input.due_date),
            amount: Set(input.amount),
            paid_amount: Set(Decimal::ZERO),
            status: Set(sea_orm_active_enums::InvoiceStatus::Pending),
            payment_method: Set(sea_orm_active_enums::PaymentMethod::Unpaid),
            bank_account_id: Set(None),
            booking_id: Set(input.booking_id),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let invoice = invoice.insert(&self.db).await?;
        Ok(invoice)
    }

    /// Derives an invoice from a booking: amount from the income-bearing
    /// service lines, due date thirty days out, notes describing the
    /// engagement.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is missing or already invoiced,
    /// a free invoice number cannot be found, or the database operation
    /// fails.
    pub async fn create_for_booking(
        &self,
        booking_id: Uuid,
        today: NaiveDate,
    ) -> Result<invoices::Model, InvoiceError> {
        let record = self.load_booking(booking_id).await?;
        self.check_booking_free(booking_id).await?;

        let domain = booking_repo::to_domain(&record);
        let mut draft = derive_from_booking(&domain, today);
        draft.invoice_number = self.allocate_number(draft.issue_date).await?;

        if draft.amount <= Decimal::ZERO {
            return Err(BillingError::ZeroAmount.into());
        }

        let now = chrono::Utc::now().into();
        let invoice = invoices::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_number: Set(draft.invoice_number),
            client_name: Set(draft.client_name),
            issue_date: Set(draft.issue_date),
            due_date: Set(draft.due_date),
            amount: Set(draft.amount),
            paid_amount: Set(Decimal::ZERO),
            status: Set(sea_orm_active_enums::InvoiceStatus::Pending),
            payment_method: Set(sea_orm_active_enums::PaymentMethod::Unpaid),
            bank_account_id: Set(None),
            booking_id: Set(draft.booking_id),
            notes: Set(draft.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let invoice = invoice.insert(&self.db).await?;
        Ok(invoice)
    }

    /// Lists a page of invoices with the overdue overlay applied and
    /// the total count of matches, newest first.
    ///
    /// Filtering by `Overdue` matches unpaid invoices past their due
    /// date regardless of stored status. Because the effective status
    /// only exists after the overlay runs, the page is cut from the
    /// overlaid list rather than in SQL.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_invoices(
        &self,
        filter: InvoiceFilter,
        today: NaiveDate,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<InvoiceView>, u64), InvoiceError> {
        let mut query = invoices::Entity::find()
            .order_by_desc(invoices::Column::IssueDate)
            .order_by_desc(invoices::Column::CreatedAt);

        if let Some(from) = filter.from {
            query = query.filter(invoices::Column::IssueDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(invoices::Column::IssueDate.lte(to));
        }
        if let Some(client_name) = filter.client_name {
            query = query.filter(invoices::Column::ClientName.contains(&client_name));
        }

        let rows = query.all(&self.db).await?;

        let views: Vec<InvoiceView> = rows
            .into_iter()
            .map(|invoice| overlay(invoice, today))
            .filter(|view| {
                filter
                    .status
                    .is_none_or(|wanted| view.effective_status == wanted)
            })
            .collect();

        Ok(paginate(views, offset, limit))
    }

    /// Finds an invoice by ID with the overdue overlay applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_invoice_by_id(
        &self,
        id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<InvoiceView>, InvoiceError> {
        let invoice = invoices::Entity::find_by_id(id).one(&self.db).await?;
        Ok(invoice.map(|invoice| overlay(invoice, today)))
    }

    /// Updates an invoice's descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing, the amount is being
    /// changed after payments were recorded, the new amount would drop
    /// below zero, or the database operation fails.
    pub async fn update_invoice(
        &self,
        id: Uuid,
        input: UpdateInvoiceInput,
    ) -> Result<invoices::Model, InvoiceError> {
        let invoice = invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        if let Some(new_amount) = input.amount {
            if invoice.paid_amount > Decimal::ZERO {
                let payments = self.count_payments(id).await?;
                return Err(InvoiceError::HasPayments(payments));
            }
            if new_amount <= Decimal::ZERO {
                return Err(BillingError::ZeroAmount.into());
            }
        }

        let now = chrono::Utc::now().into();
        let mut active: invoices::ActiveModel = invoice.into();

        if let Some(client_name) = input.client_name {
            active.client_name = Set(client_name);
        }
        if let Some(amount) = input.amount {
            active.amount = Set(amount);
        }
        if let Some(due_date) = input.due_date {
            active.due_date = Set(due_date);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes an invoice, refusing if payments were recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing, has payments, or the
    /// database operation fails.
    pub async fn delete_invoice(&self, id: Uuid) -> Result<(), InvoiceError> {
        let invoice = invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        let payments = self.count_payments(id).await?;
        if payments > 0 || invoice.paid_amount > Decimal::ZERO {
            return Err(InvoiceError::HasPayments(payments));
        }

        invoices::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    /// Records a payment against an invoice.
    ///
    /// Validation and the state transition come from the billing rules;
    /// this method persists them atomically:
    /// 1. conditional update of the invoice guarded on the old
    ///    `paid_amount`,
    /// 2. credit to the receiving account (balance for bank payments,
    ///    undeposited pool on the default account for cash),
    /// 3. insert of the immutable payment row.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing or settled, the
    /// payment violates a billing rule, the receiving account is
    /// missing, the invoice changed concurrently, or the database
    /// operation fails.
    pub async fn record_payment(
        &self,
        invoice_id: Uuid,
        input: RecordPaymentInput,
    ) -> Result<invoice_payments::Model, InvoiceError> {
        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find_by_id(invoice_id)
            .one(&txn)
            .await?
            .ok_or(InvoiceError::NotFound(invoice_id))?;

        let default_account_id = match input.method {
            billing::PaymentMethod::Cash => bank_accounts::Entity::find()
                .filter(bank_accounts::Column::IsDefault.eq(true))
                .one(&txn)
                .await?
                .map(|account| account.id),
            billing::PaymentMethod::Bank => None,
        };

        let state = InvoiceState {
            amount: invoice.amount,
            paid_amount: invoice.paid_amount,
            due_date: invoice.due_date,
        };
        let payment = PaymentInput {
            amount: input.amount,
            method: input.method,
            bank_account_id: input.bank_account_id,
            paid_on: input.paid_on,
            notes: input.notes.clone(),
        };

        let outcome = apply_payment(&state, &payment, default_account_id)?;

        let now: chrono::DateTime<chrono::FixedOffset> = chrono::Utc::now().into();
        let result = invoices::Entity::update_many()
            .col_expr(
                invoices::Column::PaidAmount,
                Expr::value(outcome.new_paid_amount),
            )
            .col_expr(
                invoices::Column::Status,
                Expr::value(stored_status(outcome.new_status)),
            )
            .col_expr(
                invoices::Column::PaymentMethod,
                Expr::value(stored_method(input.method)),
            )
            .col_expr(
                invoices::Column::BankAccountId,
                Expr::value(Some(outcome.credit.account_id())),
            )
            .col_expr(invoices::Column::UpdatedAt, Expr::value(now))
            .filter(invoices::Column::Id.eq(invoice_id))
            .filter(invoices::Column::PaidAmount.eq(invoice.paid_amount))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            tracing::warn!(invoice_id = %invoice_id, "Payment lost the paid_amount guard");
            return Err(InvoiceError::ConcurrentModification);
        }

        credit_account(&txn, outcome.credit, input.amount).await?;

        let row = invoice_payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            amount: Set(input.amount),
            method: Set(stored_method(input.method)),
            bank_account_id: Set(input.bank_account_id),
            paid_on: Set(input.paid_on),
            notes: Set(input.notes),
            created_at: Set(now),
        };

        let row = row.insert(&txn).await?;
        txn.commit().await?;

        Ok(row)
    }

    /// Lists the payments recorded against an invoice, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing or the database query
    /// fails.
    pub async fn list_payments(
        &self,
        invoice_id: Uuid,
    ) -> Result<Vec<invoice_payments::Model>, InvoiceError> {
        let invoice = invoices::Entity::find_by_id(invoice_id).one(&self.db).await?;
        if invoice.is_none() {
            return Err(InvoiceError::NotFound(invoice_id));
        }

        let rows = invoice_payments::Entity::find()
            .filter(invoice_payments::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_payments::Column::PaidOn)
            .order_by_asc(invoice_payments::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    /// Generates an invoice number, retrying on collisions.
    async fn allocate_number(&self, issue_date: NaiveDate) -> Result<String, InvoiceError> {
        for _ in 0..NUMBER_RETRIES {
            let candidate = generate_invoice_number(issue_date);
            let taken = invoices::Entity::find()
                .filter(invoices::Column::InvoiceNumber.eq(&candidate))
                .one(&self.db)
                .await?
                .is_some();

            if !taken {
                return Ok(candidate);
            }
        }

        Err(InvoiceError::NumberExhausted)
    }

    /// Loads a booking with its service lines.
    async fn load_booking(&self, booking_id: Uuid) -> Result<BookingWithServices, InvoiceError> {
        let booking = bookings::Entity::find_by_id(booking_id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::BookingNotFound(booking_id))?;

        let services = crate::entities::booking_services::Entity::find()
            .filter(crate::entities::booking_services::Column::BookingId.eq(booking_id))
            .all(&self.db)
            .await?;

        Ok(BookingWithServices { booking, services })
    }

    /// Rejects a booking that already has an invoice.
    async fn check_booking_free(&self, booking_id: Uuid) -> Result<(), InvoiceError> {
        let existing = invoices::Entity::find()
            .filter(invoices::Column::BookingId.eq(booking_id))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(InvoiceError::DuplicateForBooking(booking_id));
        }

        Ok(())
    }

    /// Counts payment rows for an invoice.
    async fn count_payments(&self, invoice_id: Uuid) -> Result<u64, InvoiceError> {
        use sea_orm::PaginatorTrait;

        let count = invoice_payments::Entity::find()
            .filter(invoice_payments::Column::InvoiceId.eq(invoice_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}

/// Credits a payment to the receiving account: the balance for bank
/// payments, the undeposited pool for cash.
async fn credit_account<C: ConnectionTrait>(
    conn: &C,
    credit: PaymentCredit,
    amount: Decimal,
) -> Result<(), InvoiceError> {
    let now: chrono::DateTime<chrono::FixedOffset> = chrono::Utc::now().into();
    let account_id = credit.account_id();

    let column = match credit {
        PaymentCredit::Undeposited(_) => bank_accounts::Column::Undeposited,
        PaymentCredit::BankBalance(_) => bank_accounts::Column::Balance,
    };

    let result = bank_accounts::Entity::update_many()
        .col_expr(column, Expr::col(column).add(amount))
        .col_expr(bank_accounts::Column::UpdatedAt, Expr::value(now))
        .filter(bank_accounts::Column::Id.eq(account_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(InvoiceError::AccountNotFound(account_id));
    }

    Ok(())
}

/// Cuts one page out of an in-memory list, returning it with the
/// pre-cut total.
#[must_use]
pub fn paginate<T>(items: Vec<T>, offset: u64, limit: u64) -> (Vec<T>, u64) {
    let total = u64::try_from(items.len()).unwrap_or(u64::MAX);

    let page = items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect();

    (page, total)
}

/// Applies the overdue overlay to a stored invoice.
#[must_use]
pub fn overlay(invoice: invoices::Model, today: NaiveDate) -> InvoiceView {
    let state = InvoiceState {
        amount: invoice.amount,
        paid_amount: invoice.paid_amount,
        due_date: invoice.due_date,
    };

    InvoiceView {
        effective_status: effective_status(&state, today),
        invoice,
    }
}

/// Maps a billing status to its stored form. Overdue is a read overlay
/// and is stored as pending.
#[must_use]
pub fn stored_status(status: billing::InvoiceStatus) -> sea_orm_active_enums::InvoiceStatus {
    match status {
        billing::InvoiceStatus::Paid => sea_orm_active_enums::InvoiceStatus::Paid,
        billing::InvoiceStatus::Partial => sea_orm_active_enums::InvoiceStatus::Partial,
        billing::InvoiceStatus::Pending | billing::InvoiceStatus::Overdue => {
            sea_orm_active_enums::InvoiceStatus::Pending
        }
    }
}

/// Maps a billing payment method to its stored form.
#[must_use]
pub fn stored_method(method: billing::PaymentMethod) -> sea_orm_active_enums::PaymentMethod {
    match method {
        billing::PaymentMethod::Cash => sea_orm_active_enums::PaymentMethod::Cash,
        billing::PaymentMethod::Bank => sea_orm_active_enums::PaymentMethod::Bank,
    }
}
