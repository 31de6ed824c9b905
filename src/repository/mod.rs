pub mod repository_error;
pub mod table_client;
pub mod rest_table_client;
pub mod memory_table_client;
pub mod table;

pub mod category_repo;
pub mod company_details_repo;
pub mod inquiry_repo;
pub mod notification_repo;
pub mod partner_repo;
pub mod product_repo;
pub mod profile_repo;
pub mod quote_repo;
pub mod review_repo;
pub mod team_repo;
