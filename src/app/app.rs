use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::{AppConfig, BackendConfig, EmailConfig, JwtConfig, LlmConfig, RateLimitConfig};
use crate::handler::function_handler::FunctionState;
use crate::middlewares::admin_middleware::AuthState;
use crate::repository::inquiry_repo::InquiryRepository;
use crate::repository::notification_repo::NotificationRepository;
use crate::repository::profile_repo::ProfileRepository;
use crate::repository::quote_repo::QuoteRepository;
use crate::repository::rest_table_client::RestTableClient;
use crate::repository::review_repo::ReviewRepository;
use crate::repository::table_client::TableClient;
use crate::router::catalog_router::catalog_router;
use crate::router::function_router::function_router;
use crate::router::inquiry_router::inquiry_router;
use crate::router::notification_router::{notification_feed_router, notification_router};
use crate::router::quote_router::quote_router;
use crate::router::review_router::review_router;
use crate::service::background::BackgroundTasks;
use crate::service::catalog_service::CatalogService;
use crate::service::email_dispatch_service::EmailDispatchService;
use crate::service::inquiry_service::InquiryService;
use crate::service::notification_service::{NotificationPoller, NotificationService};
use crate::service::quote_service::QuoteServiceImpl;
use crate::service::recommendation_service::RecommendationService;
use crate::service::review_service::ReviewService;
use crate::util::email::SmtpEmailService;
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::rate_limiter::AttemptLimiter;

/// Everything the HTTP layer needs, wired over one table client.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub quotes: Arc<QuoteServiceImpl>,
    pub inquiries: Arc<InquiryService>,
    pub reviews: Arc<ReviewService>,
    pub notifications: Arc<NotificationService>,
    pub functions: Arc<FunctionState>,
    pub auth_state: Arc<AuthState>,
    pub background: BackgroundTasks,
}

impl AppServices {
    pub fn build(
        client: Arc<dyn TableClient>,
        jwt_config: JwtConfig,
        limiter: AttemptLimiter,
        email_dispatch: Option<Arc<EmailDispatchService>>,
        recommendations: Option<Arc<RecommendationService>>,
    ) -> Self {
        let background = BackgroundTasks::new();
        let notification_repo = NotificationRepository::new(client.clone());
        let profile_repo = ProfileRepository::new(client.clone());

        let quotes = Arc::new(QuoteServiceImpl::new(
            QuoteRepository::new(client.clone()),
            notification_repo.clone(),
            profile_repo.clone(),
            email_dispatch.clone(),
            background.clone(),
        ));
        let inquiries = Arc::new(InquiryService::new(
            InquiryRepository::new(client.clone()),
            notification_repo.clone(),
            email_dispatch.clone(),
            limiter.clone(),
            background.clone(),
        ));
        let reviews = Arc::new(ReviewService::new(
            ReviewRepository::new(client.clone()),
            notification_repo.clone(),
            limiter.clone(),
            background.clone(),
        ));

        AppServices {
            catalog: Arc::new(CatalogService::new(client)),
            quotes,
            inquiries,
            reviews,
            notifications: Arc::new(NotificationService::new(notification_repo)),
            functions: Arc::new(FunctionState { email_dispatch, recommendations, limiter }),
            auth_state: Arc::new(AuthState {
                jwt_utils: Arc::new(JwtTokenUtilsImpl::new(jwt_config)),
                profiles: profile_repo,
            }),
            background,
        }
    }

    fn routes(&self) -> Router {
        Router::new()
            .merge(catalog_router(self.catalog.clone(), self.auth_state.clone()))
            .merge(quote_router(self.quotes.clone(), self.auth_state.clone()))
            .merge(inquiry_router(self.inquiries.clone(), self.auth_state.clone()))
            .merge(review_router(self.reviews.clone(), self.auth_state.clone()))
            .merge(notification_router(self.notifications.clone(), self.auth_state.clone()))
            .merge(function_router(self.functions.clone()))
            .route("/health", get(|| async { "OK" }))
    }

    fn with_layers(routes: Router) -> Router {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
        routes.layer(TraceLayer::new_for_http()).layer(cors)
    }

    pub fn router(&self) -> Router {
        Self::with_layers(self.routes())
    }

    /// Adds `GET /notifications/feed`, served from a running poller's cache.
    pub fn router_with_feed(&self, poller: &NotificationPoller) -> Router {
        Self::with_layers(
            self.routes()
                .merge(notification_feed_router(poller.feed(), self.auth_state.clone())),
        )
    }
}

pub struct App {
    config: AppConfig,
    router: Router,
    pub services: AppServices,
    poller: NotificationPoller,
}

impl App {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = AppConfig::from_env()?;
        let backend_config = BackendConfig::from_env()?;
        let jwt_config = JwtConfig::from_env()?;
        let rate_limit_config = RateLimitConfig::from_env()?;

        let client: Arc<dyn TableClient> = Arc::new(RestTableClient::new(&backend_config)?);

        // Email and recommendations are optional; the rest of the site runs without them.
        let email_dispatch = match EmailConfig::from_env() {
            Ok(email_config) => {
                let admin_email = email_config.admin_email.clone();
                let company_name = email_config.from_name.clone();
                match SmtpEmailService::new(email_config) {
                    Ok(mailer) => Some(Arc::new(EmailDispatchService::new(Arc::new(mailer), admin_email, company_name))),
                    Err(e) => {
                        error!("Email service disabled: {}", e);
                        None
                    }
                }
            }
            Err(e) => {
                warn!("Email config not loaded, notification email disabled: {}", e);
                None
            }
        };
        let recommendations = match LlmConfig::from_env() {
            Ok(llm_config) => Some(Arc::new(RecommendationService::new(llm_config)?)),
            Err(e) => {
                warn!("LLM config not loaded, recommendations disabled: {}", e);
                None
            }
        };

        let services = AppServices::build(
            client,
            jwt_config,
            AttemptLimiter::from_config(&rate_limit_config),
            email_dispatch,
            recommendations,
        );
        let poller = NotificationPoller::spawn(
            NotificationService::clone(&services.notifications),
            config.notification_poll_interval,
        );
        let router = services.router_with_feed(&poller);

        Ok(App { config, router, services, poller })
    }

    pub async fn start(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = SocketAddr::new(self.config.host.parse()?, self.config.port);
        info!("Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
            })
            .await?;

        info!("Shutting down, waiting for background tasks");
        self.poller.stop();
        self.services.background.drain().await;
        Ok(())
    }
}
