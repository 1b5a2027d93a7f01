//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every gateway call in here is awaited, so a slow Paystack response
//! only holds up the request that is waiting for it.
use actix_web::{get, http::StatusCode, web, HttpRequest, HttpResponse, Responder};
use checkout_engine::{
    checkout_objects::NewCheckout,
    db_types::PaymentReference,
    traits::{MenuStore, OrderLedger, PaymentGateway},
    CheckoutFlowApi,
    MenuApi,
    MenuPayload,
};
use log::*;
use serde_json::Value;

use crate::{
    auth::{AdminClaims, AdminSessionGate},
    config::ServerOptions,
    data_objects::{
        order_submission_from_json,
        InitializePaymentRequest,
        InitializePaymentResponse,
        LoginRequest,
        LoginResponse,
        OrderResponse,
        ServiceInfo,
        VerifyPaymentResponse,
    },
    errors::ServerError,
    helpers::remote_ip_label,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro.
// Extra paths after `|` register the same handler under an alias.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal $(| $alias:literal)*) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
            impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    for (i, path) in [$path $(, $alias)*].into_iter().enumerate() {
                        let mut res = actix_web::Resource::new(path);
                        if i == 0 {
                            res = res.name(stringify!($name));
                        }
                        let res = res.guard(actix_web::guard::$method()).to($name);
                        actix_web::dev::HttpServiceFactory::register(res, config);
                    }
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal $(| $alias:literal)* impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                for (i, path) in [$path $(, $alias)*].into_iter().enumerate() {
                    let mut res = actix_web::Resource::new(path);
                    if i == 0 {
                        res = res.name(stringify!($name));
                    }
                    let res = res.guard(actix_web::guard::$method()).to($name::< $( [< T $bounds:camel >], )+>);
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires admin) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::AdminGuardFactory::new());
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/")]
pub async fn service_info() -> impl Responder {
    HttpResponse::Ok().json(ServiceInfo { ok: true, service: "flavourhub-paystack-backend".into() })
}

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(initialize_payment => Post "/payments/initialize" | "/paystack/initialize" impl PaymentGateway, OrderLedger);
/// Starts a checkout and returns what the storefront needs to open the Paystack popup.
///
/// No order is created here. The storefront must call the verify route (or submit the order with its reference)
/// once the customer has paid.
pub async fn initialize_payment<G, L>(
    req: HttpRequest,
    body: web::Json<InitializePaymentRequest>,
    api: web::Data<CheckoutFlowApi<G, L>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError>
where
    G: PaymentGateway,
    L: OrderLedger,
{
    debug!("💻️ POST initialize payment from {}", remote_ip_label(&req, &options));
    let checkout = NewCheckout::try_from(body.into_inner())?;
    let result = api.initialize_payment(checkout).await?;
    Ok(HttpResponse::Ok().json(InitializePaymentResponse::new(result, &options.paystack_public_key)))
}

route!(verify_payment => Get "/payments/verify/{reference}" | "/paystack/verify/{reference}" impl PaymentGateway, OrderLedger);
/// Asks Paystack whether the payment for `reference` went through, and records the order if it did.
///
/// * 200 with `paid: true` once settled, however many times this is called.
/// * 200 with `paid: false` if the payment failed or was abandoned.
/// * 202 with `retryable: true` if Paystack does not have a final answer yet.
pub async fn verify_payment<G, L>(
    path: web::Path<String>,
    api: web::Data<CheckoutFlowApi<G, L>>,
) -> Result<HttpResponse, ServerError>
where
    G: PaymentGateway,
    L: OrderLedger,
{
    let reference = PaymentReference::from(path.into_inner());
    debug!("💻️ GET verify payment {reference}");
    let outcome = api.verify_payment(&reference).await?;
    let response = VerifyPaymentResponse::try_from(outcome)?;
    let status = if response.retryable { StatusCode::ACCEPTED } else { StatusCode::OK };
    Ok(HttpResponse::build(status).json(response))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl PaymentGateway, OrderLedger);
pub async fn create_order<G, L>(
    req: HttpRequest,
    body: web::Json<Value>,
    api: web::Data<CheckoutFlowApi<G, L>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError>
where
    G: PaymentGateway,
    L: OrderLedger,
{
    debug!("💻️ POST order from {}", remote_ip_label(&req, &options));
    let submission = order_submission_from_json(body.into_inner())?;
    let order = api.submit_order(submission).await.map_err(|e| {
        info!("💻️ Order was not recorded. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(OrderResponse { success: true, order }))
}

route!(admin_orders => Get "/orders/admin" impl PaymentGateway, OrderLedger where requires admin);
pub async fn admin_orders<G, L>(
    _claims: AdminClaims,
    api: web::Data<CheckoutFlowApi<G, L>>,
) -> Result<HttpResponse, ServerError>
where
    G: PaymentGateway,
    L: OrderLedger,
{
    debug!("💻️ GET admin orders");
    let orders = api.orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(admin_login => Post "/admin/login");
pub async fn admin_login(
    req: HttpRequest,
    body: web::Json<LoginRequest>,
    gate: web::Data<AdminSessionGate>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let token = gate.login(&body.password).map_err(|e| {
        warn!("💻️ Failed admin login from {}", remote_ip_label(&req, &options));
        e
    })?;
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

//----------------------------------------------   Menu  ----------------------------------------------------
route!(get_menu => Get "/menu" impl MenuStore);
pub async fn get_menu<M: MenuStore>(api: web::Data<MenuApi<M>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET menu");
    let menu = api
        .current_menu()
        .await?
        .ok_or_else(|| ServerError::NoRecordFound("No menu has been published yet.".to_string()))?;
    Ok(HttpResponse::Ok().json(menu))
}

route!(replace_menu => Put "/admin/menu" impl MenuStore where requires admin);
pub async fn replace_menu<M: MenuStore>(
    _claims: AdminClaims,
    body: web::Json<MenuPayload>,
    api: web::Data<MenuApi<M>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ PUT admin menu");
    let menu = api.replace_menu(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(menu))
}
