pub mod catalog_handler;
pub mod function_handler;
pub mod inquiry_handler;
pub mod notification_handler;
pub mod quote_handler;
pub mod review_handler;

use uuid::Uuid;
use validator::Validate;

use crate::util::error::HandlerError;

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, HandlerError> {
    Uuid::parse_str(raw).map_err(|_| HandlerError::bad_request(format!("Invalid {} id", what)))
}

pub(crate) fn validate_payload<T: Validate>(payload: &T) -> Result<(), HandlerError> {
    payload.validate().map_err(HandlerError::validation)
}
