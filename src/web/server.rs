use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware, web, App, HttpServer};
use log::info;

use crate::analysis::{InvestorAnalysis, OverallAnalysis, StartupAnalysis};
use crate::config::DashboardConfig;
use crate::core::component::AnalysisComponent;
use crate::core::dataset::Dataset;
use crate::web::handlers;

/// Shared application state for web handlers
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub overall: Arc<OverallAnalysis>,
    pub startup: Arc<StartupAnalysis>,
    pub investor: Arc<InvestorAnalysis>,
    pub config: Arc<DashboardConfig>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, config: DashboardConfig) -> Self {
        let analysis = &config.analysis;
        Self {
            overall: Arc::new(OverallAnalysis::new(dataset.clone(), analysis.clone())),
            startup: Arc::new(StartupAnalysis::new(dataset.clone(), analysis.clone())),
            investor: Arc::new(InvestorAnalysis::new(dataset.clone(), analysis.clone())),
            dataset,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// The analyses in sidebar order
    pub fn components(&self) -> Vec<&dyn AnalysisComponent> {
        vec![
            self.overall.as_ref() as &dyn AnalysisComponent,
            self.startup.as_ref(),
            self.investor.as_ref(),
        ]
    }
}

/// Register page and API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // System APIs
            .route("/system/status", web::get().to(handlers::system::get_system_status))
            .route("/system/components", web::get().to(handlers::system::get_components))
            // Overall analysis APIs
            .route("/overall/summary", web::get().to(handlers::overall::get_summary))
            .route("/overall/mom", web::get().to(handlers::overall::get_mom))
            .route("/overall/sectors", web::get().to(handlers::overall::get_sectors))
            .route("/overall/types", web::get().to(handlers::overall::get_types))
            .route("/overall/cities", web::get().to(handlers::overall::get_cities))
            .route("/overall/investors", web::get().to(handlers::overall::get_investors))
            .route("/overall/yoy", web::get().to(handlers::overall::get_yoy))
            .route("/overall/heatmap", web::get().to(handlers::overall::get_heatmap))
            // Startup APIs
            .route("/startups", web::get().to(handlers::startup::list_startups))
            .route("/startups/{name}", web::get().to(handlers::startup::get_startup))
            // Investor APIs
            .route("/investors", web::get().to(handlers::investor::list_investors))
            .route("/investors/{name}", web::get().to(handlers::investor::get_investor)),
    )
    // Page routes
    .route("/", web::get().to(handlers::pages::index))
    .route("/overall", web::get().to(handlers::pages::overall))
    .route("/startup", web::get().to(handlers::pages::startup))
    .route("/investor", web::get().to(handlers::pages::investor));
}

/// Stylesheets and other assets under `/static`
pub fn static_files(dir: &Path) -> fs::Files {
    fs::Files::new("/static", dir)
}

/// Build the dashboard HTTP server; the caller drives it to completion
pub fn start_web_server(state: AppState) -> std::io::Result<Server> {
    let config = state.config.clone();
    let address = config.bind_address();
    info!("Starting web server on http://{}", address);

    let app_state = web::Data::new(state);
    let static_dir = config.web.static_dir.clone();

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(app_state.clone())
            // Static files
            .service(static_files(&static_dir))
            .configure(configure)
            // Default route for 404
            .default_service(web::to(handlers::pages::not_found))
    });
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    Ok(server.bind(address)?.run())
}
