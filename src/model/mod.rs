pub mod category;
pub mod company_details;
pub mod inquiry;
pub mod notification;
pub mod partner;
pub mod product;
pub mod quote;
pub mod review;
pub mod team_member;
pub mod user;
