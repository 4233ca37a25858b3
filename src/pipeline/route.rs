//! Alert topic and payload construction

use super::aggregate::Aggregate;
use super::evaluate::BoundsCheck;

/// A routed alert, ready for publishing
///
/// Exists only long enough to be handed to the bus; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// `{country}/{state}/{city}/{owner}/in`
    pub topic: String,

    /// `ALERT {measurement} {min} {max}` with post-substitution bounds
    pub message: String,

    /// Name of the breaching measurement (for logging)
    pub measurement_name: String,
}

impl Alert {
    /// Build the alert for a breaching aggregate
    ///
    /// Topic components are taken verbatim from device metadata. No
    /// escaping or normalization happens here; a location name containing
    /// `/` produces an ambiguous topic and that is accepted as-is.
    pub fn build(aggregate: &Aggregate, check: &BoundsCheck) -> Alert {
        let topic = format!(
            "{}/{}/{}/{}/in",
            aggregate.country, aggregate.state, aggregate.city, aggregate.owner
        );

        let message = format!(
            "ALERT {} {} {}",
            aggregate.measurement_name, check.effective_min, check.effective_max
        );

        Alert {
            topic,
            message,
            measurement_name: aggregate.measurement_name.clone(),
        }
    }
}
