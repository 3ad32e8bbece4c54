//! Expense repository.
//!
//! Expenses are flat records with a category string, a deductible flag,
//! and a recurring-monthly flag. The summary endpoint aggregates them
//! per category and per deductibility for the tax estimate screen.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::entities::expenses;

/// Error types for expense operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    /// Expense not found.
    #[error("Expense not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Date the expense was incurred.
    pub incurred_on: NaiveDate,
    /// What the money was spent on.
    pub description: String,
    /// Category label.
    pub category: String,
    /// Amount spent.
    pub amount: Decimal,
    /// Whether this counts against taxable income.
    pub tax_deductible: bool,
    /// Whether this recurs every month.
    pub is_monthly: bool,
}

/// Input for updating an expense.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    /// Date the expense was incurred.
    pub incurred_on: Option<NaiveDate>,
    /// What the money was spent on.
    pub description: Option<String>,
    /// Category label.
    pub category: Option<String>,
    /// Amount spent.
    pub amount: Option<Decimal>,
    /// Whether this counts against taxable income.
    pub tax_deductible: Option<bool>,
    /// Whether this recurs every month.
    pub is_monthly: Option<bool>,
}

/// Filter options for listing expenses.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Filter by category.
    pub category: Option<String>,
    /// Only expenses on or after this date.
    pub from: Option<NaiveDate>,
    /// Only expenses on or before this date.
    pub to: Option<NaiveDate>,
    /// Filter by deductibility.
    pub tax_deductible: Option<bool>,
    /// Filter by recurring-monthly flag.
    pub is_monthly: Option<bool>,
}

/// Per-category aggregate.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CategoryTotal {
    /// Category label.
    pub category: String,
    /// Sum of amounts in the category.
    pub total: Decimal,
    /// Number of expenses in the category.
    pub count: u64,
}

/// Expense aggregates for one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExpenseSummary {
    /// Year the summary covers.
    pub year: i32,
    /// Sum of all expense amounts.
    pub total: Decimal,
    /// Sum of tax-deductible amounts.
    pub deductible_total: Decimal,
    /// Sum of recurring-monthly amounts.
    pub monthly_total: Decimal,
    /// Totals per category, ordered by category name.
    pub by_category: Vec<CategoryTotal>,
}

/// Expense repository for CRUD and yearly aggregation.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an expense.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_expense(
        &self,
        input: CreateExpenseInput,
    ) -> Result<expenses::Model, ExpenseError> {
        let now = chrono::Utc::now().into();
        let expense = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            incurred_on: Set(input.incurred_on),
            description: Set(input.description),
            category: Set(input.category),
            amount: Set(input.amount),
            tax_deductible: Set(input.tax_deductible),
            is_monthly: Set(input.is_monthly),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let expense = expense.insert(&self.db).await?;
        Ok(expense)
    }

    /// Lists a page of expenses, most recent first, with the total
    /// count of matching rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_expenses(
        &self,
        filter: ExpenseFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<expenses::Model>, u64), ExpenseError> {
        let mut query = expenses::Entity::find();

        if let Some(category) = filter.category {
            query = query.filter(expenses::Column::Category.eq(category));
        }
        if let Some(from) = filter.from {
            query = query.filter(expenses::Column::IncurredOn.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(expenses::Column::IncurredOn.lte(to));
        }
        if let Some(deductible) = filter.tax_deductible {
            query = query.filter(expenses::Column::TaxDeductible.eq(deductible));
        }
        if let Some(monthly) = filter.is_monthly {
            query = query.filter(expenses::Column::IsMonthly.eq(monthly));
        }

        let total = query.clone().count(&self.db).await?;

        let rows = query
            .order_by_desc(expenses::Column::IncurredOn)
            .order_by_desc(expenses::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Finds an expense by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_expense_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<expenses::Model>, ExpenseError> {
        let expense = expenses::Entity::find_by_id(id).one(&self.db).await?;
        Ok(expense)
    }

    /// Updates an expense.
    ///
    /// # Errors
    ///
    /// Returns an error if the expense is not found or the database
    /// operation fails.
    pub async fn update_expense(
        &self,
        id: Uuid,
        input: UpdateExpenseInput,
    ) -> Result<expenses::Model, ExpenseError> {
        let expense = expenses::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ExpenseError::NotFound(id))?;

        let now = chrono::Utc::now().into();
        let mut active: expenses::ActiveModel = expense.into();

        if let Some(incurred_on) = input.incurred_on {
            active.incurred_on = Set(incurred_on);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(amount) = input.amount {
            active.amount = Set(amount);
        }
        if let Some(tax_deductible) = input.tax_deductible {
            active.tax_deductible = Set(tax_deductible);
        }
        if let Some(is_monthly) = input.is_monthly {
            active.is_monthly = Set(is_monthly);
        }
        active.updated_at = Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes an expense.
    ///
    /// # Errors
    ///
    /// Returns an error if the expense is not found or the database
    /// operation fails.
    pub async fn delete_expense(&self, id: Uuid) -> Result<(), ExpenseError> {
        let result = expenses::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(ExpenseError::NotFound(id));
        }

        Ok(())
    }

    /// Summarizes expenses for one calendar year.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn summarize_year(&self, year: i32) -> Result<ExpenseSummary, ExpenseError> {
        let rows = expenses::Entity::find()
            .order_by_asc(expenses::Column::IncurredOn)
            .all(&self.db)
            .await?;

        let in_year: Vec<expenses::Model> = rows
            .into_iter()
            .filter(|e| e.incurred_on.year() == year)
            .collect();

        Ok(summarize(year, &in_year))
    }
}

/// Aggregates a set of expenses into a yearly summary.
#[must_use]
pub fn summarize(year: i32, rows: &[expenses::Model]) -> ExpenseSummary {
    let mut total = Decimal::ZERO;
    let mut deductible_total = Decimal::ZERO;
    let mut monthly_total = Decimal::ZERO;
    let mut per_category: BTreeMap<String, (Decimal, u64)> = BTreeMap::new();

    for row in rows {
        total += row.amount;
        if row.tax_deductible {
            deductible_total += row.amount;
        }
        if row.is_monthly {
            monthly_total += row.amount;
        }
        let entry = per_category
            .entry(row.category.clone())
            .or_insert((Decimal::ZERO, 0));
        entry.0 += row.amount;
        entry.1 += 1;
    }

    let by_category = per_category
        .into_iter()
        .map(|(category, (cat_total, count))| CategoryTotal {
            category,
            total: cat_total,
            count,
        })
        .collect();

    ExpenseSummary {
        year,
        total,
        deductible_total,
        monthly_total,
        by_category,
    }
}
