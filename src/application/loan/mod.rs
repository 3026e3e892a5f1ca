mod late_loans;
mod loan_service;
mod queries;

pub use late_loans::{LateLoan, find_late_loans};
pub use loan_service::{
    ReturnReceipt, give_item, loan_history, loan_item, renew_loan, return_item, schedule_loan,
};
pub use queries::{ItemStatus, LoanSummary, item_status, loan_summary, member_loans};
