pub mod admin;
pub mod appointments;
pub mod auth;
pub mod documents;
pub mod health;
pub mod patients;
pub mod settings;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(patients::patients_routes)
            .configure(documents::documents_routes)
            .configure(settings::settings_routes)
            .configure(appointments::appointments_routes)
            .configure(auth::auth_routes)
            .configure(admin::admin_routes),
    );
}
