//! sea-orm models for the payroll analytics schema.
//!
//! Primary keys are auto-increment integers, money columns are
//! `DECIMAL(18,2)` and calendar fields are plain dates. Absence rows carry a
//! full timestamp in `occurred_at` so hour-of-day analytics stay possible.

pub mod absence;
pub mod absence_type;
pub mod audit_log;
pub mod compensation;
pub mod department;
pub mod employee;
pub mod employee_exit;
pub mod employee_start;
pub mod location;
pub mod org_unit;
pub mod pay_grade;
pub mod payroll;
pub mod payroll_item;
pub mod user;

pub mod prelude {
    pub use super::absence::Entity as Absence;
    pub use super::absence_type::Entity as AbsenceType;
    pub use super::audit_log::Entity as AuditLog;
    pub use super::compensation::Entity as Compensation;
    pub use super::department::Entity as Department;
    pub use super::employee::Entity as Employee;
    pub use super::employee_exit::Entity as EmployeeExit;
    pub use super::employee_start::Entity as EmployeeStart;
    pub use super::location::Entity as Location;
    pub use super::org_unit::Entity as OrgUnit;
    pub use super::pay_grade::Entity as PayGrade;
    pub use super::payroll::Entity as Payroll;
    pub use super::payroll_item::Entity as PayrollItem;
    pub use super::user::Entity as User;
}
