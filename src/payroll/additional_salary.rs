//! One-off salary rows raised by overtime, arrears, corrections and claims.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::ConfigLoader;
use crate::error::{HrmsError, HrmsResult};
use crate::models::{AdditionalSalary, DocStatus};
use crate::store::Database;

const DOCTYPE: &str = "Additional Salary";

/// What an additional salary row pays and which record raised it.
#[derive(Debug, Clone)]
pub struct AdditionalSalaryRequest<'a> {
    /// Employee paid.
    pub employee: &'a str,
    /// Company of the employee.
    pub company: &'a str,
    /// Currency of the amount.
    pub currency: &'a str,
    /// Salary component paid through.
    pub salary_component: &'a str,
    /// Amount of the row.
    pub amount: Decimal,
    /// The salary slip period this row lands in.
    pub payroll_date: NaiveDate,
    /// Record type that raised the row.
    pub ref_doctype: &'a str,
    /// Record that raised the row.
    pub ref_docname: &'a str,
}

/// Creates and submits an additional salary row, returning its name.
///
/// The earning/deduction type is taken from the salary component.
pub fn submit_additional_salary(
    config: &ConfigLoader,
    db: &mut Database,
    request: AdditionalSalaryRequest<'_>,
) -> HrmsResult<String> {
    let component = config.get_salary_component(request.salary_component)?;
    if component.disabled {
        return Err(HrmsError::validation(
            DOCTYPE,
            format!("Salary Component {} is disabled", request.salary_component),
        ));
    }

    let name = db.insert(AdditionalSalary {
        name: String::new(),
        employee: request.employee.to_string(),
        company: request.company.to_string(),
        salary_component: request.salary_component.to_string(),
        component_type: component.component_type,
        amount: request.amount,
        payroll_date: request.payroll_date,
        currency: request.currency.to_string(),
        ref_doctype: request.ref_doctype.to_string(),
        ref_docname: request.ref_docname.to_string(),
        overwrite_salary_structure_amount: false,
        docstatus: DocStatus::Submitted,
    });

    debug!(
        additional_salary = %name,
        employee = %request.employee,
        component = %request.salary_component,
        amount = %request.amount,
        reference = %request.ref_docname,
        "Submitted additional salary"
    );
    Ok(name)
}

/// Submitted additional salary rows raised by a record.
pub fn additional_salaries_for<'a>(
    db: &'a Database,
    ref_doctype: &str,
    ref_docname: &str,
) -> Vec<&'a AdditionalSalary> {
    db.additional_salaries
        .iter()
        .filter(|row| {
            row.ref_doctype == ref_doctype
                && row.ref_docname == ref_docname
                && row.docstatus.is_submitted()
        })
        .collect()
}
