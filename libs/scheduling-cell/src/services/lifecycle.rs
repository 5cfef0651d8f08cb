// libs/scheduling-cell/src/services/lifecycle.rs
use shared_models::BookingStatus;

use crate::models::BookingError;

/// States reachable from `status` in a single transition.
pub fn valid_transitions(status: BookingStatus) -> &'static [BookingStatus] {
    match status {
        BookingStatus::Pending => &[BookingStatus::Confirmed, BookingStatus::Cancelled],
        BookingStatus::Confirmed => &[BookingStatus::Cancelled, BookingStatus::Completed],
        BookingStatus::Cancelled | BookingStatus::Completed => &[],
    }
}

/// Gate every status change through the transition table. Terminal states
/// never move again; completion requires a prior confirmation.
pub fn validate_transition(from: BookingStatus, to: BookingStatus) -> Result<(), BookingError> {
    if from.is_terminal() {
        return Err(BookingError::AlreadyTerminal);
    }
    if valid_transitions(from).contains(&to) {
        return Ok(());
    }
    if to == BookingStatus::Completed {
        return Err(BookingError::NotConfirmed);
    }
    Err(BookingError::InvalidTransition { from, to })
}
