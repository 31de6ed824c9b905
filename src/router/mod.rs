pub mod catalog_router;
pub mod function_router;
pub mod inquiry_router;
pub mod notification_router;
pub mod quote_router;
pub mod review_router;
