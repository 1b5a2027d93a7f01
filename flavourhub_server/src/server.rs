use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use checkout_engine::{
    traits::{MenuStore, OrderLedger, PaymentGateway},
    CheckoutFlowApi,
    MemoryLedger,
    MemoryMenuStore,
    MenuApi,
};
use log::*;

use crate::{
    auth::AdminSessionGate,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::paystack::PaystackGateway,
    routes::{
        health,
        service_info,
        AdminLoginRoute,
        AdminOrdersRoute,
        CreateOrderRoute,
        GetMenuRoute,
        InitializePaymentRoute,
        ReplaceMenuRoute,
        VerifyPaymentRoute,
    },
};

/// Request bodies larger than this are refused before they reach a handler.
pub const MAX_JSON_PAYLOAD: usize = 1024 * 1024;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let srv = create_server_instance(config)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// JSON extractor settings shared by every route. Malformed bodies produce the same `{"error": ...}` shape as every
/// other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().limit(MAX_JSON_PAYLOAD).error_handler(|err, _req| {
        debug!("💻️ Could not read JSON request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

/// Registers every route. The server mounts these twice: under `/api` and at the root, for older storefront builds.
pub fn configure_routes<G, L, M>(cfg: &mut web::ServiceConfig)
where
    G: PaymentGateway + 'static,
    L: OrderLedger + 'static,
    M: MenuStore + 'static,
{
    cfg.service(service_info)
        .service(health)
        .service(InitializePaymentRoute::<G, L>::new())
        .service(VerifyPaymentRoute::<G, L>::new())
        .service(AdminOrdersRoute::<G, L>::new())
        .service(CreateOrderRoute::<G, L>::new())
        .service(AdminLoginRoute::new())
        .service(GetMenuRoute::<M>::new())
        .service(ReplaceMenuRoute::<M>::new());
}

pub fn create_server_instance(config: ServerConfig) -> Result<Server, ServerError> {
    let gateway = PaystackGateway::new(config.paystack.clone());
    if !gateway.is_configured() {
        warn!(
            "🚨️ FH_PAYSTACK_SECRET_KEY is not set. The server will start, but every payment request will fail until \
             it is configured. 🚨️"
        );
    }
    // Shared state lives outside the factory closure so that every worker sees the same ledger and menu.
    let checkout_api = web::Data::new(CheckoutFlowApi::new(gateway, MemoryLedger::new(), config.checkout.clone()));
    let menu_api = web::Data::new(MenuApi::new(MemoryMenuStore::new()));
    let gate = web::Data::new(AdminSessionGate::new(&config.admin)?);
    info!("🔐️ Admin sessions last {} minutes", gate.session_duration().num_minutes());
    let options = web::Data::new(ServerOptions::from_config(&config));
    info!("💻️ Orders and the menu are kept in memory and will be lost when the server stops.");

    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("fh::access_log"))
            .app_data(checkout_api.clone())
            .app_data(menu_api.clone())
            .app_data(gate.clone())
            .app_data(options.clone())
            .app_data(json_config())
            .service(
                web::scope("/api").configure(configure_routes::<PaystackGateway, MemoryLedger, MemoryMenuStore>),
            )
            .configure(configure_routes::<PaystackGateway, MemoryLedger, MemoryMenuStore>)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
