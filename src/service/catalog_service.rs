use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::model::category::{Category, CategoryInput};
use crate::model::company_details::{CompanyDetails, CompanyDetailsInput};
use crate::model::partner::{Partner, PartnerInput};
use crate::model::product::{Product, ProductInput};
use crate::model::team_member::{TeamMember, TeamMemberInput};
use crate::repository::category_repo::CategoryRepository;
use crate::repository::company_details_repo::CompanyDetailsRepository;
use crate::repository::partner_repo::PartnerRepository;
use crate::repository::product_repo::ProductRepository;
use crate::repository::table_client::TableClient;
use crate::repository::team_repo::TeamRepository;
use crate::util::error::ServiceError;

fn found<T>(row: Option<T>, what: &str, key: impl std::fmt::Display) -> Result<T, ServiceError> {
    row.ok_or_else(|| ServiceError::NotFound(format!("{} {} not found", what, key)))
}

fn validated<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input.validate().map_err(|e| ServiceError::InvalidInput(e.to_string()))
}

/// Public site content and its admin maintenance.
#[derive(Clone)]
pub struct CatalogService {
    pub products: ProductRepository,
    pub categories: CategoryRepository,
    pub team: TeamRepository,
    pub partners: PartnerRepository,
    pub company: CompanyDetailsRepository,
}

impl CatalogService {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self {
            products: ProductRepository::new(client.clone()),
            categories: CategoryRepository::new(client.clone()),
            team: TeamRepository::new(client.clone()),
            partners: PartnerRepository::new(client.clone()),
            company: CompanyDetailsRepository::new(client),
        }
    }

    pub async fn products(&self, category_id: Option<Uuid>) -> Result<Vec<Product>, ServiceError> {
        let res = match category_id {
            Some(category_id) => self.products.get_by_category(category_id).await,
            None => self.products.get_all().await,
        };
        res.map_err(ServiceError::from)
    }

    pub async fn product(&self, id: Uuid) -> Result<Product, ServiceError> {
        found(self.products.get_by_id(id).await?, "Product", id)
    }

    #[instrument(skip(self, input))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ServiceError> {
        validated(input)?;
        Ok(self.products.create(input).await?)
    }

    pub async fn update_product(&self, id: Uuid, input: &ProductInput) -> Result<Product, ServiceError> {
        validated(input)?;
        Ok(self.products.update(id, input).await?)
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        Ok(self.products.delete(id).await?)
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(self.categories.get_all().await?)
    }

    pub async fn category_by_slug(&self, slug: &str) -> Result<Category, ServiceError> {
        found(self.categories.get_by_slug(slug).await?, "Category", slug)
    }

    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ServiceError> {
        validated(input)?;
        Ok(self.categories.create(input).await?)
    }

    pub async fn update_category(&self, id: Uuid, input: &CategoryInput) -> Result<Category, ServiceError> {
        validated(input)?;
        Ok(self.categories.update(id, input).await?)
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), ServiceError> {
        Ok(self.categories.delete(id).await?)
    }

    pub async fn team(&self) -> Result<Vec<TeamMember>, ServiceError> {
        Ok(self.team.get_all().await?)
    }

    pub async fn create_team_member(&self, input: &TeamMemberInput) -> Result<TeamMember, ServiceError> {
        validated(input)?;
        Ok(self.team.create(input).await?)
    }

    pub async fn update_team_member(&self, id: Uuid, input: &TeamMemberInput) -> Result<TeamMember, ServiceError> {
        validated(input)?;
        Ok(self.team.update(id, input).await?)
    }

    pub async fn delete_team_member(&self, id: Uuid) -> Result<(), ServiceError> {
        Ok(self.team.delete(id).await?)
    }

    pub async fn partners(&self) -> Result<Vec<Partner>, ServiceError> {
        Ok(self.partners.get_all().await?)
    }

    pub async fn create_partner(&self, input: &PartnerInput) -> Result<Partner, ServiceError> {
        validated(input)?;
        Ok(self.partners.create(input).await?)
    }

    pub async fn update_partner(&self, id: Uuid, input: &PartnerInput) -> Result<Partner, ServiceError> {
        validated(input)?;
        Ok(self.partners.update(id, input).await?)
    }

    pub async fn delete_partner(&self, id: Uuid) -> Result<(), ServiceError> {
        Ok(self.partners.delete(id).await?)
    }

    pub async fn company_details(&self) -> Result<CompanyDetails, ServiceError> {
        found(self.company.get().await?, "Company details", "row")
    }

    pub async fn update_company_details(&self, input: &CompanyDetailsInput) -> Result<CompanyDetails, ServiceError> {
        validated(input)?;
        Ok(self.company.update(input).await?)
    }
}
