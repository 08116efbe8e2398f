//! Casedesk core rules
//!
//! Form validation for case-study submissions and the invalidation-based
//! cache over the public listing.

pub mod listing;
pub mod validation;

pub use listing::ListingCache;
pub use validation::{
    ALLOWED_IMAGE_TYPES, CaseStudyInput, ImageMeta, MAX_IMAGE_BYTES, ValidationMode,
    ValidationReport, parse_section_items, validate_case_study,
};
