pub mod markup;
pub mod rate_form;

pub use markup::validate_markup;
pub use rate_form::{RateForm, TagValueRow};

/// Catalog keys used for form errors.
pub mod error_keys {
    pub const MEASUREMENT_REQUIRED: &str = "cost_models.add_rate_form.error_message.measurement_required";
    pub const DUPLICATE: &str = "cost_models.add_rate_form.error_message.duplicate";
    pub const REQUIRED: &str = "cost_models.add_rate_form.error_message.required";
    pub const RATE_NOT_NUMBER: &str = "cost_models.add_rate_form.error_message.rate_not_number";
    pub const RATE_NEGATIVE: &str = "cost_models.add_rate_form.error_message.rate_negative";
    pub const TAG_KEY_REQUIRED: &str = "cost_models.add_rate_form.error_message.tag_key_required";
    pub const TAG_VALUE_REQUIRED: &str = "cost_models.add_rate_form.error_message.tag_value_required";
    pub const TAG_VALUE_DUPLICATE: &str = "cost_models.add_rate_form.error_message.tag_value_duplicate";
    pub const INVALID_MARKUP: &str = "cost_models_wizard.markup.invalid_markup_text";
}
