//! Paid-versus-total check on a freshly created accounting invoice.

use crate::error::SyncError;
use crate::models::PaymentStatus;

/// The accounting invoice must be fully paid by the charge it was issued for.
/// A difference is never corrected automatically.
pub fn verify(status: &PaymentStatus) -> Result<(), SyncError> {
    if status.total_amount != status.paid_amount {
        tracing::error!(
            series = %status.series,
            number = %status.number,
            total = %status.total_amount,
            paid = %status.paid_amount,
            "Accounting invoice amount mismatch"
        );
        return Err(SyncError::Mismatch {
            series: status.series.clone(),
            number: status.number.clone(),
            total: status.total_amount,
            paid: status.paid_amount,
        });
    }

    Ok(())
}
