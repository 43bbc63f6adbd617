use crate::domain::{FilterError, FilterSet, RangeField};

/// Rejects any range whose upper bound sits below its lower bound. Ranges
/// with a single bound, or none, always pass.
pub fn validate(filters: &FilterSet) -> Result<(), FilterError> {
    for field in RangeField::ALL {
        let range = filters.range(field);
        if let (Some(from), Some(to)) = (range.from, range.to) {
            if to < from {
                return Err(FilterError::InvalidRange(field));
            }
        }
    }
    Ok(())
}
