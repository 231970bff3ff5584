//! Payment method API endpoints.

use api_types::payment_method::{PaymentMethodNew, PaymentMethodView, Service};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, to_api_currency, to_engine_currency};
use engine::users;

fn to_engine_service(service: Service) -> engine::PaymentMethodService {
    match service {
        Service::Stripe => engine::PaymentMethodService::Stripe,
        Service::Paypal => engine::PaymentMethodService::Paypal,
        Service::Collective => engine::PaymentMethodService::Collective,
    }
}

fn map_service(service: engine::PaymentMethodService) -> Service {
    match service {
        engine::PaymentMethodService::Stripe => Service::Stripe,
        engine::PaymentMethodService::Paypal => Service::Paypal,
        engine::PaymentMethodService::Collective => Service::Collective,
    }
}

/// Handle requests for creating a payment method on an administered account.
pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PaymentMethodNew>,
) -> Result<Json<PaymentMethodView>, ServerError> {
    let currency = payload
        .currency
        .map(to_engine_currency)
        .unwrap_or_default();

    let mut cmd = engine::NewPaymentMethodCmd::new(
        payload.account,
        to_engine_service(payload.service),
        currency,
        user.email,
    );
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }

    let payment_method = state.engine.new_payment_method(cmd).await?;
    Ok(Json(PaymentMethodView {
        token: payment_method.token,
        account_id: payment_method.account_id,
        service: map_service(payment_method.service),
        currency: to_api_currency(payment_method.currency),
        name: payment_method.name,
    }))
}
