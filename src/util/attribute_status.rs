use crate::models::smart::{Attribute, AttributeStatus, Ideal};
use crate::thresholds::MetadataLookup;

pub const THRESHOLD_REASON: &str = "Attribute is failing recommended SMART threshold";

/// Derive the attribute's status from its threshold and the family's
/// metadata. Existing flags and reasons are only ever added to.
///
/// Attributes without a threshold, or with an id the table doesn't know,
/// are left as they are.
pub fn evaluate<'a, L>(attr: &'a mut Attribute, lookup: &L) -> &'a mut Attribute
where
    L: MetadataLookup + ?Sized,
{
    if !attr.has_threshold() {
        return attr;
    }
    let meta = match lookup.lookup(attr.family, &attr.id) {
        Some(m) => m,
        None    => return attr,
    };

    let failing = match meta.ideal {
        Ideal::Low  => attr.value > attr.threshold,
        Ideal::High => attr.value < attr.threshold,
    };
    if failing {
        tracing::debug!(
            family = %attr.family, id = %attr.id, value = attr.value, threshold = attr.threshold,
            "attribute failing threshold"
        );
        attr.mark(AttributeStatus::FAILED_SCRUTINY, THRESHOLD_REASON);
    }
    attr
}

pub fn evaluate_all<L>(attrs: &mut [Attribute], lookup: &L)
where
    L: MetadataLookup + ?Sized,
{
    for attr in attrs.iter_mut() {
        evaluate(attr, lookup);
    }
}
