pub mod auth_service;
pub mod background;
pub mod catalog_service;
pub mod email_dispatch_service;
pub mod feedback;
pub mod gotrue_provider;
pub mod inquiry_service;
pub mod notification_service;
pub mod quote_cart;
pub mod quote_service;
pub mod recommendation_service;
pub mod resource;
pub mod review_service;
