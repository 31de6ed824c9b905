pub mod function_dto;
pub mod inquiry_dto;
pub mod quote_dto;
pub mod review_dto;
